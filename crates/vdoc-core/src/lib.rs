pub mod checks;
pub mod config;
pub mod error;
pub mod model;
pub mod pages;
pub mod parse;
pub mod paths;
pub mod pipeline;
pub mod report;
pub mod transform;
pub mod verbs;

use error::FetchError;
use parse::ComponentDoc;
use paths::PagePath;

/// The template a page is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    Index,
    Component,
    Package,
    Service,
    Operation,
    Structure,
    Enumeration,
    Constant,
    Warnings,
    Internal,
    ApiIndex,
}

impl PageKind {
    pub const ALL: [PageKind; 11] = [
        PageKind::Index,
        PageKind::Component,
        PageKind::Package,
        PageKind::Service,
        PageKind::Operation,
        PageKind::Structure,
        PageKind::Enumeration,
        PageKind::Constant,
        PageKind::Warnings,
        PageKind::Internal,
        PageKind::ApiIndex,
    ];

    pub fn template_name(&self) -> &'static str {
        match self {
            PageKind::Index => "index.html",
            PageKind::Component => "component.html",
            PageKind::Package => "package.html",
            PageKind::Service => "service.html",
            PageKind::Operation => "operation.html",
            PageKind::Structure => "structure.html",
            PageKind::Enumeration => "enumeration.html",
            PageKind::Constant => "constant.html",
            PageKind::Warnings => "warnings.html",
            PageKind::Internal => "internal.html",
            PageKind::ApiIndex => "apiindex.html",
        }
    }
}

/// A planned page: where it goes, which template renders it, and the data bag it gets.
#[derive(Debug, Clone)]
pub struct Page {
    pub path: PagePath,
    pub kind: PageKind,
    pub data: serde_json::Value,
}

/// Renders and persists pages.
pub trait PageSink {
    type Error: std::error::Error + Send + Sync + 'static;
    fn emit(&mut self, page: Page) -> Result<(), Self::Error>;
}

/// Collects pages in memory.
impl PageSink for Vec<Page> {
    type Error = std::convert::Infallible;

    fn emit(&mut self, page: Page) -> Result<(), Self::Error> {
        self.push(page);
        Ok(())
    }
}

/// Where component documents come from.
pub trait MetamodelSource {
    /// Identifiers of every component. Failure aborts the run.
    fn list_components(&self) -> Result<Vec<String>, FetchError>;

    /// A single component document. Failure skips the component.
    fn fetch_component(&self, id: &str) -> Result<ComponentDoc, FetchError>;
}

/// Optional per-page examples, already rendered to HTML.
pub trait ExampleSource {
    fn example_html(&self, page_dir: &str) -> Option<String>;
}

/// Never has examples.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExamples;

impl ExampleSource for NoExamples {
    fn example_html(&self, _page_dir: &str) -> Option<String> {
        None
    }
}
