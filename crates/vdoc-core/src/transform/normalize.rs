use indexmap::IndexMap;

use super::annotations::strip_annotations;
use crate::model::*;
use crate::parse::component::{
    ComponentDoc, ConstantInfo, EnumerationInfo, FieldInfo, OperationInfo, PackageInfo,
    ServiceInfo, StructureInfo,
};
use crate::parse::metadata::{is_internal, released_version};
use crate::parse::{Keyed, RequestMapping};

/// Normalize every package of a component.
pub fn normalize(doc: &ComponentDoc) -> Catalog {
    normalize_filtered(doc, |_| true)
}

/// Normalize the packages of a component whose qualified name passes `keep`.
pub fn normalize_filtered(doc: &ComponentDoc, keep: impl Fn(&str) -> bool) -> Catalog {
    let mut catalog = Catalog::new(Component {
        name: QualifiedName::new(&doc.info.name),
        documentation: strip_annotations(&doc.info.documentation),
    });

    for pkg in sorted_by_key(&doc.info.packages) {
        if !keep(&pkg.key) {
            log::debug!("skipping package {} of {}", pkg.key, doc.info.name);
            continue;
        }
        add_package(&mut catalog, pkg);
    }

    catalog
}

fn sorted_by_key<T>(items: &[Keyed<T>]) -> Vec<&Keyed<T>> {
    let mut sorted: Vec<&Keyed<T>> = items.iter().collect();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));
    sorted
}

fn add_package(catalog: &mut Catalog, pkg: &Keyed<PackageInfo>) {
    let name = QualifiedName::new(&pkg.key);
    if catalog.packages_by_name.contains_key(&name) {
        log::debug!("package {name} listed twice, keeping the first");
        return;
    }
    let id = PackageId(catalog.packages.len());

    let mut structures: IndexMap<String, StructureId> = IndexMap::new();
    let mut enumerations: IndexMap<String, EnumerationId> = IndexMap::new();
    let mut declared_structures = Vec::new();
    let mut declared_enumerations = Vec::new();

    for s in sorted_by_key(&pkg.value.structures) {
        let sid = intern_structure(catalog, s);
        structures.insert(catalog.structure(sid).name.short_name().to_string(), sid);
        declared_structures.push(sid);
    }
    for e in sorted_by_key(&pkg.value.enumerations) {
        let eid = intern_enumeration(catalog, e);
        enumerations.insert(catalog.enumeration(eid).name.short_name().to_string(), eid);
        declared_enumerations.push(eid);
    }

    let mut services = IndexMap::new();
    for svc in sorted_by_key(&pkg.value.services) {
        let service_id = add_service(catalog, id, svc);
        let service = catalog.service(service_id);
        services.insert(service.short_name().to_string(), service_id);

        // service-scoped types are visible at package scope
        for &sid in &service.structures {
            let short = catalog.structure(sid).name.short_name().to_string();
            structures.entry(short).or_insert(sid);
        }
        for &eid in &service.enumerations {
            let short = catalog.enumeration(eid).name.short_name().to_string();
            enumerations.entry(short).or_insert(eid);
        }
    }

    let package = Package {
        name: name.clone(),
        documentation: strip_annotations(&pkg.value.documentation),
        services,
        structures: (!structures.is_empty()).then_some(structures),
        enumerations,
        declared_structures,
        declared_enumerations,
    };

    let short = package.short_name().to_string();
    catalog.packages.push(package);
    catalog.packages_by_name.insert(name, id);
    if let Some(existing) = catalog.packages_by_short.get(&short) {
        log::debug!(
            "package short name {short} already taken by {}, {} reachable by qualified name only",
            catalog.package(*existing).name,
            catalog.package(id).name
        );
    } else {
        catalog.packages_by_short.insert(short, id);
    }
}

fn add_service(catalog: &mut Catalog, package: PackageId, svc: &Keyed<ServiceInfo>) -> ServiceId {
    let name = QualifiedName::new(&svc.key);
    if let Some(&existing) = catalog.services_by_name.get(&name) {
        return existing;
    }

    let structures = sorted_by_key(&svc.value.structures)
        .into_iter()
        .map(|s| intern_structure(catalog, s))
        .collect();
    let enumerations = sorted_by_key(&svc.value.enumerations)
        .into_iter()
        .map(|e| intern_enumeration(catalog, e))
        .collect();
    let constants = sorted_by_key(&svc.value.constants)
        .into_iter()
        .map(|c| add_constant(catalog, &name, c))
        .collect();

    let operations = sorted_by_key(&svc.value.operations)
        .into_iter()
        .map(convert_operation)
        .collect();

    let id = ServiceId(catalog.services.len());
    catalog.services.push(Service {
        internal: is_internal(&svc.value.metadata),
        released: released_version(&svc.value.metadata),
        name: name.clone(),
        package,
        documentation: strip_annotations(&svc.value.documentation),
        operations,
        structures,
        enumerations,
        constants,
    });
    catalog.services_by_name.insert(name, id);
    id
}

fn convert_operation(op: &Keyed<OperationInfo>) -> Operation {
    let name = if op.key.is_empty() {
        op.value.name.clone()
    } else {
        op.key.clone()
    };
    Operation {
        name,
        documentation: strip_annotations(&op.value.documentation),
        params: op.value.params.iter().map(convert_field).collect(),
        output: op.value.output.output_type.clone(),
        output_documentation: strip_annotations(&op.value.output.documentation),
        errors: op
            .value
            .errors
            .iter()
            .map(|e| ErrorRef {
                structure: QualifiedName::new(&e.structure_id),
                documentation: strip_annotations(&e.documentation),
            })
            .collect(),
        request_mapping: RequestMapping::from_metadata(&op.value.metadata),
        metadata: op.value.metadata.clone(),
    }
}

fn convert_field(field: &FieldInfo) -> Field {
    Field {
        name: field.name.clone(),
        field_type: field.field_type.clone(),
        documentation: strip_annotations(&field.documentation),
    }
}

fn intern_structure(catalog: &mut Catalog, s: &Keyed<StructureInfo>) -> StructureId {
    let name = QualifiedName::new(&s.key);
    if let Some(&existing) = catalog.structures_by_name.get(&name) {
        return existing;
    }
    let id = StructureId(catalog.structures.len());
    catalog.structures.push(Structure {
        name: name.clone(),
        kind: s.value.kind.clone(),
        documentation: strip_annotations(&s.value.documentation),
        fields: s.value.fields.iter().map(convert_field).collect(),
    });
    catalog.structures_by_name.insert(name, id);
    id
}

fn intern_enumeration(catalog: &mut Catalog, e: &Keyed<EnumerationInfo>) -> EnumerationId {
    let name = QualifiedName::new(&e.key);
    if let Some(&existing) = catalog.enumerations_by_name.get(&name) {
        return existing;
    }
    let id = EnumerationId(catalog.enumerations.len());
    catalog.enumerations.push(Enumeration {
        name: name.clone(),
        documentation: strip_annotations(&e.value.documentation),
        values: e
            .value
            .values
            .iter()
            .map(|v| EnumerationValue {
                value: v.value.clone(),
                documentation: strip_annotations(&v.documentation),
            })
            .collect(),
    });
    catalog.enumerations_by_name.insert(name, id);
    id
}

fn add_constant(catalog: &mut Catalog, service: &QualifiedName, c: &Keyed<ConstantInfo>) -> ConstantId {
    let id = ConstantId(catalog.constants.len());
    catalog.constants.push(Constant {
        name: service.child(&c.key),
        kind: c.value.kind.clone(),
        value: c.value.display_value(),
        documentation: strip_annotations(&c.value.documentation),
    });
    id
}
