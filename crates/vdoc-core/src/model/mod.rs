pub mod catalog;
pub mod names;

pub use catalog::*;
pub use names::QualifiedName;
