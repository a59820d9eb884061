use std::collections::BTreeMap;
use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::Serialize;

use crate::checks::{Warning, WarningKind};
use crate::verbs::{StandardVerb, Verb, VerbInference};

/// Counters for one component or a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub structures: usize,
    pub enumerations: usize,
    pub constants: usize,
    pub get: usize,
    pub put: usize,
    pub post: usize,
    pub patch: usize,
    pub delete: usize,
    pub unknown: usize,
    pub internal: usize,
    pub warnings: BTreeMap<WarningKind, usize>,
}

impl Totals {
    /// Count a public operation under its verb. Custom and undetermined verbs count as unknown.
    pub fn record_verb(&mut self, inference: &VerbInference) {
        match inference.standard() {
            Some(StandardVerb::Get) => self.get += 1,
            Some(StandardVerb::Put) => self.put += 1,
            Some(StandardVerb::Post) => self.post += 1,
            Some(StandardVerb::Patch) => self.patch += 1,
            Some(StandardVerb::Delete) => self.delete += 1,
            None => self.unknown += 1,
        }
    }

    pub fn verb_count(&self, verb: StandardVerb) -> usize {
        match verb {
            StandardVerb::Get => self.get,
            StandardVerb::Put => self.put,
            StandardVerb::Post => self.post,
            StandardVerb::Patch => self.patch,
            StandardVerb::Delete => self.delete,
        }
    }

    pub fn warning_count(&self, kind: WarningKind) -> usize {
        self.warnings.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_warnings(&self) -> usize {
        self.warnings.values().sum()
    }

    /// Public operations with a standard verb.
    pub fn public_apis(&self) -> usize {
        self.get + self.put + self.post + self.patch + self.delete
    }

    pub fn merge(&mut self, other: &Totals) {
        self.structures += other.structures;
        self.enumerations += other.enumerations;
        self.constants += other.constants;
        self.get += other.get;
        self.put += other.put;
        self.post += other.post;
        self.patch += other.patch;
        self.delete += other.delete;
        self.unknown += other.unknown;
        self.internal += other.internal;
        for (kind, count) in &other.warnings {
            *self.warnings.entry(*kind).or_default() += count;
        }
    }

    /// Console rendering of the totals.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let rows = [
            ("GET count", self.get),
            ("DELETE count", self.delete),
            ("PUT count", self.put),
            ("POST count", self.post),
            ("PATCH count", self.patch),
            ("Unknown Verbs", self.unknown),
            ("Structures", self.structures),
            ("Enumerations", self.enumerations),
            ("Constants", self.constants),
            ("Internal", self.internal),
            ("Warnings", self.total_warnings()),
            ("Total public APIs", self.public_apis()),
        ];
        let _ = writeln!(out, "API Totals:");
        for (label, count) in rows {
            let _ = writeln!(out, "{label:<18}: {count}");
        }
        out
    }
}

/// An operation of an internal service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternalApi {
    /// `<service>.<operation>`.
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationEntry {
    pub name: String,
    pub href: String,
    pub verb: Option<String>,
    pub internal: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceEntry {
    pub href: String,
    pub internal: bool,
    pub operations: Vec<OperationEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageEntry {
    pub href: String,
    pub services: IndexMap<String, ServiceEntry>,
}

/// Everything recorded while emitting one component, merged into the run [`Report`] once the
/// component is fully emitted.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    pub name: String,
    pub totals: Totals,
    pub warnings: Vec<Warning>,
    pub internal_apis: Vec<InternalApi>,
    pub packages: IndexMap<String, PackageEntry>,
    #[serde(skip)]
    show_warnings: bool,
}

impl ComponentReport {
    pub fn new(name: impl Into<String>, show_warnings: bool) -> Self {
        Self {
            name: name.into(),
            totals: Totals::default(),
            warnings: Vec::new(),
            internal_apis: Vec::new(),
            packages: IndexMap::new(),
            show_warnings,
        }
    }

    /// Record a warning. No deduplication: recording the same warning twice counts twice.
    pub fn warn(&mut self, warning: Warning) {
        if self.show_warnings {
            log::warn!("{}", warning.message);
        } else {
            log::debug!("{}", warning.message);
        }
        *self.totals.warnings.entry(warning.kind).or_default() += 1;
        self.warnings.push(warning);
    }

    /// Count an operation of a public service, or list it as internal.
    pub fn record_operation(&mut self, name: String, path: String, inference: &VerbInference, internal: bool) {
        match inference {
            VerbInference::Unknown => {
                log::debug!("undetermined method: {name}");
            }
            VerbInference::Explicit(Verb::Custom(method)) => {
                log::warn!("unknown HTTP verb {method} on {name}");
            }
            _ => {}
        }
        if internal {
            self.totals.internal += 1;
            self.internal_apis.push(InternalApi { name, path });
        } else {
            self.totals.record_verb(inference);
        }
    }
}

/// A component that could not be fetched.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedComponent {
    pub name: String,
    pub reason: String,
}

/// The result of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub totals: Totals,
    pub per_component: IndexMap<String, Totals>,
    pub warnings: Vec<Warning>,
    pub internal_apis: Vec<InternalApi>,
    pub api_index: IndexMap<String, IndexMap<String, PackageEntry>>,
    pub components: Vec<String>,
    pub skipped: Vec<SkippedComponent>,
}

impl Report {
    /// Merge a finished component. Two listed ids may serve documents with the same component
    /// name; their counts and index entries are merged under that name.
    pub fn absorb(&mut self, component: ComponentReport) {
        self.totals.merge(&component.totals);
        match self.per_component.get_mut(&component.name) {
            Some(totals) => {
                log::debug!("merging repeated component {}", component.name);
                totals.merge(&component.totals);
            }
            None => {
                self.per_component
                    .insert(component.name.clone(), component.totals);
                self.components.push(component.name.clone());
            }
        }
        self.warnings.extend(component.warnings);
        self.internal_apis.extend(component.internal_apis);
        self.api_index
            .entry(component.name)
            .or_default()
            .extend(component.packages);
    }

    pub fn skip(&mut self, name: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedComponent {
            name: name.into(),
            reason: reason.into(),
        });
    }

    /// Sum of the per-component totals; equals `totals` by construction.
    pub fn component_sum(&self) -> Totals {
        let mut sum = Totals::default();
        for totals in self.per_component.values() {
            sum.merge(totals);
        }
        sum
    }
}
