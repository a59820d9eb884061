use indexmap::IndexMap;
use serde::Serialize;

use super::names::QualifiedName;
use crate::parse::{MetadataEntry, RequestMapping, TypeDescriptor};

macro_rules! arena_id {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
            #[serde(transparent)]
            pub struct $name(pub(crate) usize);
        )*
    };
}

arena_id!(PackageId, ServiceId, StructureId, EnumerationId, ConstantId);

/// The component a catalog was built from.
#[derive(Debug, Clone)]
pub struct Component {
    pub name: QualifiedName,
    pub documentation: String,
}

/// A package with its lookup indexes.
///
/// `services`, `structures` and `enumerations` are keyed by short name. Structures and
/// enumerations declared inside services are promoted into the package-level indexes; the
/// `declared_*` lists hold only what the package itself declares.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: QualifiedName,
    pub documentation: String,
    pub services: IndexMap<String, ServiceId>,
    /// `None` when neither the package nor its services declare any structure.
    pub structures: Option<IndexMap<String, StructureId>>,
    pub enumerations: IndexMap<String, EnumerationId>,
    pub declared_structures: Vec<StructureId>,
    pub declared_enumerations: Vec<EnumerationId>,
}

impl Package {
    pub fn short_name(&self) -> &str {
        self.name.short_name()
    }

    /// No services, enumerations, or structures of its own.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
            && self.declared_structures.is_empty()
            && self.declared_enumerations.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Service {
    pub name: QualifiedName,
    pub package: PackageId,
    pub documentation: String,
    /// Sorted by operation name.
    pub operations: Vec<Operation>,
    pub structures: Vec<StructureId>,
    pub enumerations: Vec<EnumerationId>,
    pub constants: Vec<ConstantId>,
    pub internal: bool,
    pub released: Option<String>,
}

impl Service {
    pub fn short_name(&self) -> &str {
        self.name.short_name()
    }

    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.name == name)
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operation(name).is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Operation {
    pub name: String,
    pub documentation: String,
    pub params: Vec<Field>,
    pub output: TypeDescriptor,
    pub output_documentation: String,
    pub errors: Vec<ErrorRef>,
    pub metadata: Vec<MetadataEntry>,
    pub request_mapping: RequestMapping,
}

#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(skip)]
    pub field_type: TypeDescriptor,
    pub documentation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorRef {
    pub structure: QualifiedName,
    pub documentation: String,
}

#[derive(Debug, Clone)]
pub struct Structure {
    pub name: QualifiedName,
    pub kind: Option<String>,
    pub documentation: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone)]
pub struct Enumeration {
    pub name: QualifiedName,
    pub documentation: String,
    pub values: Vec<EnumerationValue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnumerationValue {
    pub value: String,
    pub documentation: String,
}

#[derive(Debug, Clone)]
pub struct Constant {
    pub name: QualifiedName,
    pub kind: Option<String>,
    pub value: String,
    pub documentation: String,
}

/// The normalized, indexed view of one component.
///
/// Entities live in arenas and are referenced by id; every index resolves to the same arena
/// slot, so an entity looked up by short name and by qualified name is the same entity.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub component: Component,
    pub(crate) packages: Vec<Package>,
    pub(crate) services: Vec<Service>,
    pub(crate) structures: Vec<Structure>,
    pub(crate) enumerations: Vec<Enumeration>,
    pub(crate) constants: Vec<Constant>,
    pub(crate) packages_by_short: IndexMap<String, PackageId>,
    pub(crate) packages_by_name: IndexMap<QualifiedName, PackageId>,
    pub(crate) services_by_name: IndexMap<QualifiedName, ServiceId>,
    pub(crate) structures_by_name: IndexMap<QualifiedName, StructureId>,
    pub(crate) enumerations_by_name: IndexMap<QualifiedName, EnumerationId>,
}

impl Catalog {
    pub(crate) fn new(component: Component) -> Self {
        Self {
            component,
            packages: Vec::new(),
            services: Vec::new(),
            structures: Vec::new(),
            enumerations: Vec::new(),
            constants: Vec::new(),
            packages_by_short: IndexMap::new(),
            packages_by_name: IndexMap::new(),
            services_by_name: IndexMap::new(),
            structures_by_name: IndexMap::new(),
            enumerations_by_name: IndexMap::new(),
        }
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    pub fn service(&self, id: ServiceId) -> &Service {
        &self.services[id.0]
    }

    pub fn structure(&self, id: StructureId) -> &Structure {
        &self.structures[id.0]
    }

    pub fn enumeration(&self, id: EnumerationId) -> &Enumeration {
        &self.enumerations[id.0]
    }

    pub fn constant(&self, id: ConstantId) -> &Constant {
        &self.constants[id.0]
    }

    /// Packages in qualified-name order.
    pub fn packages(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages_by_name.values().map(|&id| (id, self.package(id)))
    }

    /// Services of a package in short-name order.
    pub fn services_of(&self, package: PackageId) -> impl Iterator<Item = (ServiceId, &Service)> {
        self.package(package)
            .services
            .values()
            .map(|&id| (id, self.service(id)))
    }

    pub fn services(&self) -> impl Iterator<Item = (ServiceId, &Service)> {
        self.services
            .iter()
            .enumerate()
            .map(|(i, s)| (ServiceId(i), s))
    }

    pub fn structures(&self) -> impl Iterator<Item = (StructureId, &Structure)> {
        self.structures
            .iter()
            .enumerate()
            .map(|(i, s)| (StructureId(i), s))
    }

    pub fn enumerations(&self) -> impl Iterator<Item = (EnumerationId, &Enumeration)> {
        self.enumerations
            .iter()
            .enumerate()
            .map(|(i, e)| (EnumerationId(i), e))
    }

    pub fn constants(&self) -> impl Iterator<Item = (ConstantId, &Constant)> {
        self.constants
            .iter()
            .enumerate()
            .map(|(i, c)| (ConstantId(i), c))
    }

    pub fn package_id_by_short(&self, short: &str) -> Option<PackageId> {
        self.packages_by_short.get(short).copied()
    }

    pub fn package_id_by_name(&self, name: &str) -> Option<PackageId> {
        self.packages_by_name.get(&QualifiedName::from(name)).copied()
    }

    pub fn package_by_short(&self, short: &str) -> Option<&Package> {
        self.package_id_by_short(short).map(|id| self.package(id))
    }

    pub fn package_by_name(&self, name: &str) -> Option<&Package> {
        self.package_id_by_name(name).map(|id| self.package(id))
    }

    pub fn service_by_name(&self, name: &str) -> Option<&Service> {
        self.services_by_name
            .get(&QualifiedName::from(name))
            .map(|&id| self.service(id))
    }

    pub fn structure_by_name(&self, name: &str) -> Option<&Structure> {
        self.structures_by_name
            .get(&QualifiedName::from(name))
            .map(|&id| self.structure(id))
    }

    pub fn enumeration_by_name(&self, name: &str) -> Option<&Enumeration> {
        self.enumerations_by_name
            .get(&QualifiedName::from(name))
            .map(|&id| self.enumeration(id))
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }
}
