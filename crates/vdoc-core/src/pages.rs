use serde::Serialize;
use serde_json::{Value, json};

use crate::checks::Warning;
use crate::model::*;
use crate::parse::TypeDescriptor;
use crate::paths::{Bucket, PagePath, PathPlanner};
use crate::report::Report;
use crate::verbs::{VerbInference, infer_verb};
use crate::{Page, PageKind};

/// Run-wide values every template can use.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteInfo {
    /// Name of the output directory.
    pub root: String,
    pub testbed: Option<String>,
    pub versions: Vec<String>,
}

/// Builds the data bag of every page kind.
///
/// Links come from the run's [`PathPlanner`], so each `href` matches the path the linked page
/// is written to. Hrefs are root-relative; templates prefix them with `base`.
pub struct PageBuilder<'a> {
    planner: &'a PathPlanner,
    site: &'a SiteInfo,
    components: &'a [String],
}

impl<'a> PageBuilder<'a> {
    pub fn new(planner: &'a PathPlanner, site: &'a SiteInfo, components: &'a [String]) -> Self {
        Self {
            planner,
            site,
            components,
        }
    }

    fn finish(&self, kind: PageKind, path: PagePath, title: impl Into<String>, mut data: Value) -> Page {
        if let Value::Object(ref mut map) = data {
            map.insert("title".to_string(), Value::String(title.into()));
            map.insert("base".to_string(), Value::String(path.base()));
            map.insert("site".to_string(), json!(self.site));
            map.insert("nav".to_string(), Value::Array(self.component_links()));
        }
        Page { path, kind, data }
    }

    fn component_links(&self) -> Vec<Value> {
        self.components.iter().map(|name| self.component_link(name)).collect()
    }

    fn component_link(&self, name: &str) -> Value {
        json!({
            "name": name,
            "href": self.planner.component_page(&QualifiedName::new(name)).href(),
        })
    }

    fn type_ref(&self, t: &TypeDescriptor) -> Value {
        let href = t.referenced_resource().and_then(|(kind, id)| {
            let bucket = Bucket::for_resource(kind)?;
            Some(self.planner.flat_page(bucket, &QualifiedName::new(id)).href())
        });
        json!({ "display": t.display(), "href": href })
    }

    fn fields(&self, fields: &[Field]) -> Vec<Value> {
        fields
            .iter()
            .map(|f| {
                json!({
                    "name": f.name,
                    "type": self.type_ref(&f.field_type),
                    "documentation": f.documentation,
                })
            })
            .collect()
    }

    fn package_link(&self, package: &Package) -> Value {
        json!({
            "name": package.name,
            "short": package.short_name(),
            "href": self.planner.package_page(&package.name).href(),
            "documentation": package.documentation,
        })
    }

    fn service_link(&self, service: &Service) -> Value {
        json!({
            "name": service.name,
            "short": service.short_name(),
            "href": self.planner.service_page(&service.name).href(),
            "internal": service.internal,
            "released": service.released,
        })
    }

    fn flat_link(&self, bucket: Bucket, name: &QualifiedName) -> Value {
        json!({
            "name": name,
            "short": name.short_name(),
            "href": self.planner.flat_page(bucket, name).href(),
        })
    }

    fn structure_links<'c>(&self, structures: impl Iterator<Item = &'c Structure>) -> Vec<Value> {
        let mut names: Vec<&QualifiedName> = structures.map(|s| &s.name).collect();
        names.sort();
        names
            .into_iter()
            .map(|n| self.flat_link(Bucket::Structures, n))
            .collect()
    }

    fn enumeration_links<'c>(&self, enumerations: impl Iterator<Item = &'c Enumeration>) -> Vec<Value> {
        let mut names: Vec<&QualifiedName> = enumerations.map(|e| &e.name).collect();
        names.sort();
        names
            .into_iter()
            .map(|n| self.flat_link(Bucket::Enumerations, n))
            .collect()
    }

    pub fn component(&self, catalog: &Catalog) -> Page {
        let component = &catalog.component;
        let packages: Vec<Value> = catalog
            .packages()
            .map(|(_, p)| self.package_link(p))
            .collect();

        let mut services: Vec<&Service> = catalog
            .packages()
            .flat_map(|(id, _)| catalog.services_of(id).map(|(_, s)| s))
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));

        let data = json!({
            "component": {
                "name": component.name,
                "documentation": component.documentation,
            },
            "packages": packages,
            "services": services.iter().map(|s| self.service_link(s)).collect::<Vec<_>>(),
            "structures": self.structure_links(catalog.structures().map(|(_, s)| s)),
            "enumerations": self.enumeration_links(catalog.enumerations().map(|(_, e)| e)),
        });
        self.finish(
            PageKind::Component,
            self.planner.component_page(&component.name),
            component.name.to_string(),
            data,
        )
    }

    pub fn package(&self, catalog: &Catalog, id: PackageId, warnings: &[Warning]) -> Page {
        let package = catalog.package(id);
        let structures = package
            .structures
            .iter()
            .flat_map(|index| index.values())
            .map(|&sid| catalog.structure(sid));
        let enumerations = package
            .enumerations
            .values()
            .map(|&eid| catalog.enumeration(eid));

        let data = json!({
            "package": {
                "name": package.name,
                "short": package.short_name(),
                "documentation": package.documentation,
            },
            "component": {
                "name": catalog.component.name,
                "href": self.planner.component_page(&catalog.component.name).href(),
            },
            "services": catalog.services_of(id).map(|(_, s)| self.service_link(s)).collect::<Vec<_>>(),
            "structures": self.structure_links(structures),
            "enumerations": self.enumeration_links(enumerations),
            "packages": catalog.packages().map(|(_, p)| self.package_link(p)).collect::<Vec<_>>(),
            "warnings": warnings,
        });
        self.finish(
            PageKind::Package,
            self.planner.package_page(&package.name),
            package.name.to_string(),
            data,
        )
    }

    pub fn service(
        &self,
        catalog: &Catalog,
        id: ServiceId,
        warnings: &[Warning],
        examples: Option<String>,
    ) -> Page {
        let service = catalog.service(id);
        let package = catalog.package(service.package);
        let operations: Vec<Value> = service
            .operations
            .iter()
            .map(|op| {
                json!({
                    "name": op.name,
                    "href": self.planner.operation_page(&service.name, &op.name).href(),
                    "verb": infer_verb(op).verb().map(|v| v.to_string()),
                })
            })
            .collect();
        let constants: Vec<Value> = service
            .constants
            .iter()
            .map(|&cid| {
                let c = catalog.constant(cid);
                json!({
                    "name": c.name,
                    "short": c.name.short_name(),
                    "href": self.planner.flat_page(Bucket::Constants, &c.name).href(),
                    "kind": c.kind,
                    "value": c.value,
                })
            })
            .collect();

        let data = json!({
            "service": {
                "name": service.name,
                "short": service.short_name(),
                "documentation": service.documentation,
                "internal": service.internal,
                "released": service.released,
            },
            "package": self.package_link(package),
            "operations": operations,
            "structures": self.structure_links(service.structures.iter().map(|&sid| catalog.structure(sid))),
            "enumerations": self.enumeration_links(service.enumerations.iter().map(|&eid| catalog.enumeration(eid))),
            "constants": constants,
            "warnings": warnings,
            "examples": examples,
        });
        self.finish(
            PageKind::Service,
            self.planner.service_page(&service.name),
            service.short_name().to_string(),
            data,
        )
    }

    pub fn operation(
        &self,
        catalog: &Catalog,
        id: ServiceId,
        operation: &Operation,
        inference: &VerbInference,
        warnings: &[Warning],
        examples: Option<String>,
    ) -> Page {
        let service = catalog.service(id);
        let errors: Vec<Value> = operation
            .errors
            .iter()
            .map(|e| {
                json!({
                    "name": e.structure,
                    "short": e.structure.short_name(),
                    "href": self.planner.flat_page(Bucket::Structures, &e.structure).href(),
                    "documentation": e.documentation,
                })
            })
            .collect();
        let siblings: Vec<Value> = service
            .operations
            .iter()
            .map(|op| {
                json!({
                    "name": op.name,
                    "href": self.planner.operation_page(&service.name, &op.name).href(),
                    "current": op.name == operation.name,
                })
            })
            .collect();

        let data = json!({
            "operation": {
                "name": operation.name,
                "documentation": operation.documentation,
                "verb": inference.verb().map(|v| v.to_string()),
                "verb_explicit": inference.is_explicit(),
                "request_path": operation.request_mapping.path,
                "params": self.fields(&operation.params),
                "output": {
                    "type": self.type_ref(&operation.output),
                    "documentation": operation.output_documentation,
                },
                "errors": errors,
            },
            "service": self.service_link(service),
            "operations": siblings,
            "internal": service.internal,
            "warnings": warnings,
            "examples": examples,
        });
        self.finish(
            PageKind::Operation,
            self.planner.operation_page(&service.name, &operation.name),
            format!("{}.{}", service.short_name(), operation.name),
            data,
        )
    }

    pub fn structure(&self, structure: &Structure, path: PagePath) -> Page {
        let data = json!({
            "structure": {
                "name": structure.name,
                "short": structure.name.short_name(),
                "kind": structure.kind,
                "documentation": structure.documentation,
                "fields": self.fields(&structure.fields),
            },
        });
        let title = structure.name.short_name().to_string();
        self.finish(PageKind::Structure, path, title, data)
    }

    pub fn enumeration(&self, enumeration: &Enumeration, path: PagePath) -> Page {
        let data = json!({
            "enumeration": {
                "name": enumeration.name,
                "short": enumeration.name.short_name(),
                "documentation": enumeration.documentation,
                "values": enumeration.values,
            },
        });
        let title = enumeration.name.short_name().to_string();
        self.finish(PageKind::Enumeration, path, title, data)
    }

    pub fn constant(&self, constant: &Constant, path: PagePath) -> Page {
        let data = json!({
            "constant": {
                "name": constant.name,
                "short": constant.name.short_name(),
                "kind": constant.kind,
                "value": constant.value,
                "documentation": constant.documentation,
            },
        });
        let title = constant.name.short_name().to_string();
        self.finish(PageKind::Constant, path, title, data)
    }

    pub fn index(&self, report: &Report) -> Page {
        let totals = &report.totals;
        let data = json!({
            "items": report.components.iter().map(|c| self.component_link(c)).collect::<Vec<_>>(),
            "skipped": report.skipped,
            "stats": {
                "totals": totals,
                "public_apis": totals.public_apis(),
                "internal": report.internal_apis.len(),
                "warnings": report.warnings.len(),
            },
        });
        self.finish(PageKind::Index, PagePath::root("index.html"), "API Reference", data)
    }

    pub fn warnings(&self, report: &Report) -> Page {
        let warnings: Vec<Value> = report
            .warnings
            .iter()
            .map(|w| {
                json!({
                    "kind": w.kind,
                    "message": w.message,
                    "path": w.path,
                    "href": warning_href(&w.path),
                })
            })
            .collect();
        self.finish(
            PageKind::Warnings,
            PagePath::root("warnings.html"),
            "Warnings",
            json!({ "warnings": warnings }),
        )
    }

    pub fn internal(&self, report: &Report) -> Page {
        let apis: Vec<Value> = report
            .internal_apis
            .iter()
            .map(|api| {
                json!({
                    "name": api.name,
                    "path": api.path,
                    "href": warning_href(&api.path),
                })
            })
            .collect();
        self.finish(
            PageKind::Internal,
            PagePath::root("internal.html"),
            "Internal APIs",
            json!({ "apis": apis }),
        )
    }

    pub fn api_index(&self, report: &Report) -> Page {
        self.finish(
            PageKind::ApiIndex,
            PagePath::root("apiindex.html"),
            "API Index",
            json!({ "apis": report.api_index }),
        )
    }
}

/// Link target for a recorded path: flat pages are files, everything else a directory.
fn warning_href(path: &str) -> String {
    if path.ends_with(".html") {
        path.to_string()
    } else if path.is_empty() {
        "index.html".to_string()
    } else {
        format!("{path}/index.html")
    }
}
