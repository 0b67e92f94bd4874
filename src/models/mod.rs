pub mod extraction;
pub mod note;
pub mod status;
pub mod visit;

pub use extraction::*;
pub use note::*;
pub use status::*;
pub use visit::*;
