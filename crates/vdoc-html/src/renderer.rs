use std::fs;
use std::path::Path;

use heck::ToTitleCase;
use minijinja::Environment;
use vdoc_core::Page;

use crate::error::EmitError;

/// Built-in templates, keyed by the name pages refer to them by.
const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("macros.html", include_str!("../templates/macros.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("component.html", include_str!("../templates/component.html")),
    ("package.html", include_str!("../templates/package.html")),
    ("service.html", include_str!("../templates/service.html")),
    ("operation.html", include_str!("../templates/operation.html")),
    ("structure.html", include_str!("../templates/structure.html")),
    ("enumeration.html", include_str!("../templates/enumeration.html")),
    ("constant.html", include_str!("../templates/constant.html")),
    ("warnings.html", include_str!("../templates/warnings.html")),
    ("internal.html", include_str!("../templates/internal.html")),
    ("apiindex.html", include_str!("../templates/apiindex.html")),
];

/// `power_on` -> `Power On`.
fn heading(value: String) -> String {
    value.to_title_case()
}

/// Renders pages with minijinja.
pub struct HtmlRenderer {
    env: Environment<'static>,
}

impl HtmlRenderer {
    /// A renderer using only the built-in templates.
    pub fn new() -> Result<Self, EmitError> {
        Self::with_overrides(None)
    }

    /// A renderer whose templates can be replaced file by file from `dir`.
    ///
    /// A file in `dir` named like a built-in template (`service.html`, `layout.html`, ...)
    /// takes its place; anything else in the directory is ignored.
    pub fn with_overrides(dir: Option<&Path>) -> Result<Self, EmitError> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_filter("heading", heading);

        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }

        if let Some(dir) = dir {
            for &(name, _) in TEMPLATES {
                let path = dir.join(name);
                if !path.is_file() {
                    continue;
                }
                let source = fs::read_to_string(&path).map_err(|source| EmitError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                log::info!("using template {}", path.display());
                env.add_template_owned(name.to_string(), source)?;
            }
        }

        Ok(Self { env })
    }

    pub fn render(&self, page: &Page) -> Result<String, EmitError> {
        let template = self.env.get_template(page.kind.template_name())?;
        Ok(template.render(&page.data)?)
    }
}
