use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::checks::{Warning, WarningKind};
use crate::model::QualifiedName;
use crate::parse::type_info::{ENUMERATION_RESOURCE, STRUCTURE_RESOURCE};

/// How a pure-uppercase path segment is rewritten, so `VM` and `vm` siblings do not collide on
/// case-insensitive filesystems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseCollision {
    /// `VM` becomes `VM_`.
    #[default]
    Suffix,
    /// The segment is upper-cased, which leaves pure-uppercase segments as they are.
    Uppercase,
}

/// At least one letter and no lowercase letter.
pub fn is_pure_uppercase(segment: &str) -> bool {
    segment.chars().any(char::is_alphabetic) && !segment.chars().any(char::is_lowercase)
}

pub fn disambiguate(segment: &str, strategy: CaseCollision) -> String {
    if !is_pure_uppercase(segment) {
        return segment.to_string();
    }
    match strategy {
        CaseCollision::Suffix => format!("{segment}_"),
        CaseCollision::Uppercase => segment.to_uppercase(),
    }
}

/// A page location relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PagePath {
    dirs: Vec<String>,
    file: String,
}

impl PagePath {
    /// A page directly under the output root.
    pub fn root(file: impl Into<String>) -> Self {
        Self {
            dirs: Vec::new(),
            file: file.into(),
        }
    }

    pub fn nested(dirs: Vec<String>, file: impl Into<String>) -> Self {
        Self {
            dirs,
            file: file.into(),
        }
    }

    pub fn dirs(&self) -> &[String] {
        &self.dirs
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// The directory part, `/`-joined. Empty for root pages.
    pub fn dir(&self) -> String {
        self.dirs.join("/")
    }

    /// `/`-joined path including the file name, usable as a root-relative link.
    pub fn href(&self) -> String {
        if self.dirs.is_empty() {
            self.file.clone()
        } else {
            format!("{}/{}", self.dir(), self.file)
        }
    }

    /// Relative prefix leading from this page back to the output root.
    pub fn base(&self) -> String {
        "../".repeat(self.dirs.len())
    }

    pub fn to_path_buf(&self) -> PathBuf {
        let mut path: PathBuf = self.dirs.iter().collect();
        path.push(&self.file);
        path
    }
}

impl fmt::Display for PagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

/// The flat output buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Structures,
    Enumerations,
    Constants,
}

impl Bucket {
    /// The bucket a referenced metamodel resource type is written to.
    pub fn for_resource(resource_type: &str) -> Option<Bucket> {
        match resource_type {
            STRUCTURE_RESOURCE => Some(Bucket::Structures),
            ENUMERATION_RESOURCE => Some(Bucket::Enumerations),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Structures => "structures",
            Bucket::Enumerations => "enumerations",
            Bucket::Constants => "constants",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Bucket::Structures => "Structure",
            Bucket::Enumerations => "Enumeration",
            Bucket::Constants => "Constant",
        }
    }
}

/// Plans every page of a run.
///
/// The planner remembers which qualified name owns each flat short-name slot for the whole
/// run. A second, different entity with the same short name is planned under its qualified
/// name instead of overwriting the first.
#[derive(Debug, Clone, Default)]
pub struct PathPlanner {
    strategy: CaseCollision,
    claims: HashMap<(Bucket, String), QualifiedName>,
}

impl PathPlanner {
    pub fn new(strategy: CaseCollision) -> Self {
        Self {
            strategy,
            claims: HashMap::new(),
        }
    }

    pub fn strategy(&self) -> CaseCollision {
        self.strategy
    }

    /// Directory segments for a qualified name.
    pub fn segments(&self, name: &QualifiedName) -> Vec<String> {
        name.segments()
            .map(|s| disambiguate(s, self.strategy))
            .collect()
    }

    /// Directory segments for an explicit `/`-separated path.
    pub fn explicit_segments(&self, path: &str) -> Vec<String> {
        path.split('/')
            .filter(|s| !s.is_empty())
            .map(|s| disambiguate(s, self.strategy))
            .collect()
    }

    /// `{component}.html` at the root.
    pub fn component_page(&self, name: &QualifiedName) -> PagePath {
        PagePath::root(format!("{name}.html"))
    }

    pub fn package_page(&self, name: &QualifiedName) -> PagePath {
        PagePath::nested(self.segments(name), "index.html")
    }

    pub fn service_page(&self, name: &QualifiedName) -> PagePath {
        PagePath::nested(self.segments(name), "index.html")
    }

    pub fn operation_page(&self, service: &QualifiedName, operation: &str) -> PagePath {
        let mut dirs = self.segments(service);
        dirs.push(disambiguate(operation, self.strategy));
        PagePath::nested(dirs, "index.html")
    }

    /// Claim the flat page for an entity, returning a collision warning if its short name is
    /// already owned by a different entity.
    pub fn claim_flat(&mut self, bucket: Bucket, name: &QualifiedName) -> (PagePath, Option<Warning>) {
        let key = (bucket, name.short_name().to_string());
        match self.claims.get(&key) {
            None => {
                self.claims.insert(key, name.clone());
                (short_page(bucket, name), None)
            }
            Some(owner) if owner == name => (short_page(bucket, name), None),
            Some(owner) => {
                let page = qualified_page(bucket, name);
                let warning = Warning::new(
                    WarningKind::NameCollision,
                    format!(
                        "{} {} shares its short name with {}; written to {}.",
                        bucket.label(),
                        name,
                        owner,
                        page
                    ),
                    page.href(),
                );
                (page, Some(warning))
            }
        }
    }

    /// Fix the owner of a still unclaimed short-name slot when an entity is referenced before
    /// it is declared. A later claim by the same entity keeps the short page; a different
    /// entity claiming the slot collides as usual.
    pub fn reserve_flat(&mut self, bucket: Bucket, name: &QualifiedName) -> PagePath {
        let key = (bucket, name.short_name().to_string());
        self.claims.entry(key).or_insert_with(|| name.clone());
        self.flat_page(bucket, name)
    }

    /// Where the flat page of an entity is, without claiming it.
    pub fn flat_page(&self, bucket: Bucket, name: &QualifiedName) -> PagePath {
        let key = (bucket, name.short_name().to_string());
        match self.claims.get(&key) {
            Some(owner) if owner != name => qualified_page(bucket, name),
            _ => short_page(bucket, name),
        }
    }
}

fn short_page(bucket: Bucket, name: &QualifiedName) -> PagePath {
    PagePath::nested(
        vec![bucket.as_str().to_string()],
        format!("{}.html", name.short_name()),
    )
}

fn qualified_page(bucket: Bucket, name: &QualifiedName) -> PagePath {
    PagePath::nested(vec![bucket.as_str().to_string()], format!("{name}.html"))
}
