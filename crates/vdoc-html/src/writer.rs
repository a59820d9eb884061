use std::fs;
use std::path::{Path, PathBuf};

use vdoc_core::{Page, PageSink};

use crate::error::EmitError;
use crate::renderer::HtmlRenderer;

/// Renders pages and writes them under an output root.
pub struct SiteWriter {
    root: PathBuf,
    renderer: HtmlRenderer,
    written: usize,
}

impl SiteWriter {
    pub fn new(root: impl Into<PathBuf>, renderer: HtmlRenderer) -> Self {
        Self {
            root: root.into(),
            renderer,
            written: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Pages written so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

impl PageSink for SiteWriter {
    type Error = EmitError;

    fn emit(&mut self, page: Page) -> Result<(), EmitError> {
        let html = self.renderer.render(&page)?;
        let path = self.root.join(page.path.to_path_buf());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| EmitError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::write(&path, html).map_err(|source| EmitError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("wrote {}", path.display());
        self.written += 1;
        Ok(())
    }
}
