pub mod findings;
pub mod json_recovery;
pub mod merge;
pub mod parser;
pub mod vitals;

pub use findings::*;
pub use json_recovery::*;
pub use merge::*;
pub use parser::*;
pub use vitals::*;
