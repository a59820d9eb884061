use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use vdoc_core::MetamodelSource;
use vdoc_core::error::FetchError;
use vdoc_core::parse::{self, ComponentDoc};

/// Saved metadata responses: `components.json` plus one `<id>.json` per component.
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub const LIST_FILE: &'static str = "components.json";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read(&self, path: &Path) -> Result<String, FetchError> {
        fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => FetchError::NotFound(path.display().to_string()),
            _ => FetchError::Transport {
                url: path.display().to_string(),
                source: Box::new(e),
            },
        })
    }
}

impl MetamodelSource for DirectorySource {
    fn list_components(&self) -> Result<Vec<String>, FetchError> {
        let body = self.read(&self.dir.join(Self::LIST_FILE))?;
        Ok(parse::component_list_from_json(&body)?)
    }

    fn fetch_component(&self, id: &str) -> Result<ComponentDoc, FetchError> {
        let body = self.read(&self.dir.join(format!("{id}.json")))?;
        Ok(parse::component_from_json(&body)?)
    }
}
