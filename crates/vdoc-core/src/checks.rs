use std::fmt;

use serde::Serialize;

use crate::model::{Operation, Package, Service};

/// The rule a warning was raised by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    ListWithoutGet,
    NotPlural,
    InvalidOutputWrapper,
    MissingRequestMapping,
    EmptyPackage,
    NameCollision,
}

impl WarningKind {
    pub const ALL: [WarningKind; 6] = [
        WarningKind::ListWithoutGet,
        WarningKind::NotPlural,
        WarningKind::InvalidOutputWrapper,
        WarningKind::MissingRequestMapping,
        WarningKind::EmptyPackage,
        WarningKind::NameCollision,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::ListWithoutGet => "list",
            WarningKind::NotPlural => "plural",
            WarningKind::InvalidOutputWrapper => "wrapper",
            WarningKind::MissingRequestMapping => "request",
            WarningKind::EmptyPackage => "package",
            WarningKind::NameCollision => "collision",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A data-shape warning about the source metamodel. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
    /// Planned page directory the warning refers to.
    pub path: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            path: path.into(),
        }
    }
}

/// A package with no services, enumerations, or structures.
pub fn check_package(package: &Package, path: &str) -> Option<Warning> {
    package.is_empty().then(|| {
        Warning::new(
            WarningKind::EmptyPackage,
            format!(
                "Package: {} has no services, enumerations, or structures.",
                package.name
            ),
            path,
        )
    })
}

/// Service-level rules: list-without-get and non-plural list.
pub fn check_service(service: &Service, path: &str) -> Vec<Warning> {
    let mut warnings = Vec::new();
    if !service.has_operation("list") {
        return warnings;
    }

    if !service.has_operation("get") {
        warnings.push(Warning::new(
            WarningKind::ListWithoutGet,
            format!(
                "Service ({}) supports a \"list\" operation but \"get\" is not implemented leaving no way to fetch a single item from the returned list.",
                service.name
            ),
            path,
        ));
    }

    if !service.short_name().ends_with('s') {
        warnings.push(Warning::new(
            WarningKind::NotPlural,
            format!(
                "Service ({}) supports a \"list\" but is not plural.",
                service.name
            ),
            path,
        ));
    }

    warnings
}

/// Operation-level rules: output wrapper shape and request mapping presence.
pub fn check_operation(service: &Service, operation: &Operation, path: &str) -> Vec<Warning> {
    let mut warnings = Vec::new();

    if !operation.output.is_valid_output() {
        let raw = serde_json::to_string(&operation.output).unwrap_or_default();
        warnings.push(Warning::new(
            WarningKind::InvalidOutputWrapper,
            format!(
                "\"value\" wrapper is not an object nor an array of objects. Path: {path} Value Type: {raw}."
            ),
            path,
        ));
    }

    if operation.request_mapping.is_empty() {
        warnings.push(Warning::new(
            WarningKind::MissingRequestMapping,
            format!(
                "Operation ({}.{}) missing @RequestMapping. ({}/{})",
                service.name, operation.name, service.name, operation.name
            ),
            path,
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::model::{PackageId, QualifiedName};
    use crate::parse::{RequestMapping, TypeDescriptor};

    fn operation(name: &str) -> Operation {
        Operation {
            name: name.to_string(),
            documentation: String::new(),
            params: Vec::new(),
            output: TypeDescriptor::default(),
            output_documentation: String::new(),
            errors: Vec::new(),
            metadata: Vec::new(),
            request_mapping: RequestMapping {
                method: None,
                path: Some(format!("/{name}")),
            },
        }
    }

    fn service(name: &str, operations: &[&str]) -> Service {
        Service {
            name: QualifiedName::new(name),
            package: PackageId(0),
            documentation: String::new(),
            operations: operations.iter().map(|op| operation(op)).collect(),
            structures: Vec::new(),
            enumerations: Vec::new(),
            constants: Vec::new(),
            internal: false,
            released: None,
        }
    }

    #[test]
    fn test_list_without_get() {
        let svc = service("com.example.Things", &["list"]);
        let warnings = check_service(&svc, "com/example/Things");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::ListWithoutGet);
        assert!(warnings[0].message.contains("no way to fetch a single item"));
        assert_eq!(warnings[0].path, "com/example/Things");
    }

    #[test]
    fn test_not_plural() {
        let svc = service("com.example.Thing", &["get", "list"]);
        let warnings = check_service(&svc, "p");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::NotPlural);
    }

    #[test]
    fn test_no_list_no_warnings() {
        let svc = service("com.example.Thing", &["get", "create"]);
        assert!(check_service(&svc, "p").is_empty());
    }

    #[test]
    fn test_rules_are_pure() {
        let svc = service("com.example.Thing", &["list"]);
        assert_eq!(check_service(&svc, "p"), check_service(&svc, "p"));
    }

    #[test]
    fn test_invalid_output_wrapper() {
        let svc = service("com.example.Things", &[]);
        let mut op = operation("count");
        op.output = TypeDescriptor::Builtin {
            builtin_type: "LONG".into(),
        };
        let warnings = check_operation(&svc, &op, "com/example/Things/count");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::InvalidOutputWrapper);
        assert!(warnings[0].message.contains("com/example/Things/count"));
        assert!(warnings[0].message.contains(r#""builtin_type":"LONG""#));
    }

    #[test]
    fn test_missing_request_mapping() {
        let svc = service("com.example.Things", &[]);
        let mut op = operation("reset");
        op.request_mapping = RequestMapping::default();
        let warnings = check_operation(&svc, &op, "p");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::MissingRequestMapping);
        assert!(warnings[0].message.contains("com.example.Things.reset"));
    }

    #[test]
    fn test_valid_operation() {
        let svc = service("com.example.Things", &[]);
        assert!(check_operation(&svc, &operation("get"), "p").is_empty());
    }

    #[test]
    fn test_empty_package() {
        let mut package = Package {
            name: QualifiedName::new("com.example.empty"),
            documentation: String::new(),
            services: IndexMap::new(),
            structures: None,
            enumerations: IndexMap::new(),
            declared_structures: Vec::new(),
            declared_enumerations: Vec::new(),
        };
        let warning = check_package(&package, "com/example/empty").unwrap();
        assert_eq!(warning.kind, WarningKind::EmptyPackage);

        package.services.insert("Things".into(), crate::model::ServiceId(0));
        assert!(check_package(&package, "com/example/empty").is_none());
    }
}
