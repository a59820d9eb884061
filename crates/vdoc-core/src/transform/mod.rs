pub mod annotations;
pub mod normalize;

pub use annotations::strip_annotations;
pub use normalize::{normalize, normalize_filtered};
