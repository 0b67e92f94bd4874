pub mod audit;
pub mod note;
pub mod visit;

pub use audit::*;
pub use note::*;
pub use visit::*;
