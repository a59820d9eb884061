pub mod error;
pub mod markdown;
pub mod renderer;
pub mod writer;

pub use error::EmitError;
pub use renderer::HtmlRenderer;
pub use writer::SiteWriter;
