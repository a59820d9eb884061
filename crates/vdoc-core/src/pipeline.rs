use indexmap::IndexMap;

use crate::checks::{check_operation, check_package, check_service};
use crate::config::VdocConfig;
use crate::error::PipelineError;
use crate::model::{Catalog, QualifiedName};
use crate::parse::TypeDescriptor;
use crate::pages::{PageBuilder, SiteInfo};
use crate::paths::{Bucket, CaseCollision, PathPlanner};
use crate::report::{ComponentReport, OperationEntry, PackageEntry, Report, ServiceEntry};
use crate::transform::normalize_filtered;
use crate::verbs::infer_verb;
use crate::{ExampleSource, MetamodelSource, Page, PageSink};

/// Settings of a single run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Document non-public components too.
    pub include_internal: bool,
    /// Emit the metadata as served, without shared-package filtering.
    pub raw: bool,
    pub show_warnings: bool,
    pub non_public_components: Vec<String>,
    pub shared_package: Option<String>,
    pub case_collision: CaseCollision,
    pub site: SiteInfo,
}

impl RunOptions {
    pub fn from_config(config: &VdocConfig) -> Self {
        Self {
            include_internal: false,
            raw: false,
            show_warnings: false,
            non_public_components: config.non_public_components.clone(),
            shared_package: config.shared_package.clone(),
            case_collision: config.case_collision,
            site: SiteInfo {
                root: String::new(),
                testbed: Some(config.testbed.name.clone()),
                versions: config.versions.clone(),
            },
        }
    }
}

/// Sorted, de-duplicated component identifiers, minus the non-public ones unless internal
/// APIs are requested.
pub fn public_components(mut ids: Vec<String>, options: &RunOptions) -> Vec<String> {
    ids.sort();
    ids.dedup();
    if !options.include_internal {
        ids.retain(|id| !options.non_public_components.contains(id));
    }
    ids
}

/// Whether `package` is emitted as part of `component`.
///
/// The shared package is repeated in several components; it is only emitted by the component
/// of the same name, and that component emits nothing else.
pub fn keep_package(component: &str, package: &str, options: &RunOptions) -> bool {
    if options.raw {
        return true;
    }
    match options.shared_package.as_deref() {
        None => true,
        Some(shared) => (component == shared) == (package == shared),
    }
}

/// Run the whole pipeline, returning the aggregated report.
///
/// A failing component list is fatal. A failing component is logged, recorded as skipped,
/// and the run moves on. Sink errors are fatal.
pub fn run<S, E, K>(
    source: &S,
    examples: &E,
    sink: &mut K,
    options: &RunOptions,
) -> Result<Report, PipelineError>
where
    S: MetamodelSource + ?Sized,
    E: ExampleSource + ?Sized,
    K: PageSink,
{
    let ids = source
        .list_components()
        .map_err(PipelineError::Bootstrap)?;
    let components = public_components(ids, options);
    log::info!("documenting {} components", components.len());

    let mut planner = PathPlanner::new(options.case_collision);
    let mut report = Report::default();

    for id in &components {
        log::info!("processing {id}");
        let doc = match source.fetch_component(id) {
            Ok(doc) => doc,
            Err(e) => {
                log::error!("failed to fetch component {id}: {e}");
                report.skip(id.as_str(), e.to_string());
                continue;
            }
        };

        let catalog = normalize_filtered(&doc, |package| {
            keep_package(&doc.info.name, package, options)
        });
        if catalog.package_count() == 0 {
            log::info!("{id} has no packages to document");
            continue;
        }

        let component = emit_component(&catalog, &mut planner, examples, sink, options, &components)?;
        report.absorb(component);
    }

    let builder = PageBuilder::new(&planner, &options.site, &components);
    emit(sink, builder.index(&report))?;
    emit(sink, builder.warnings(&report))?;
    emit(sink, builder.internal(&report))?;
    emit(sink, builder.api_index(&report))?;

    Ok(report)
}

fn emit_component<E, K>(
    catalog: &Catalog,
    planner: &mut PathPlanner,
    examples: &E,
    sink: &mut K,
    options: &RunOptions,
    components: &[String],
) -> Result<ComponentReport, PipelineError>
where
    E: ExampleSource + ?Sized,
    K: PageSink,
{
    let mut report = ComponentReport::new(catalog.component.name.as_str(), options.show_warnings);

    // Flat pages are claimed up front so every link below resolves to the final location.
    let mut structures = Vec::new();
    for (id, structure) in catalog.structures() {
        let (path, warning) = planner.claim_flat(Bucket::Structures, &structure.name);
        if let Some(warning) = warning {
            report.warn(warning);
        }
        structures.push((id, path));
    }
    let mut enumerations = Vec::new();
    for (id, enumeration) in catalog.enumerations() {
        let (path, warning) = planner.claim_flat(Bucket::Enumerations, &enumeration.name);
        if let Some(warning) = warning {
            report.warn(warning);
        }
        enumerations.push((id, path));
    }
    let mut constants = Vec::new();
    for (id, constant) in catalog.constants() {
        let (path, warning) = planner.claim_flat(Bucket::Constants, &constant.name);
        if let Some(warning) = warning {
            report.warn(warning);
        }
        constants.push((id, path));
    }

    reserve_references(catalog, planner);

    let planner = &*planner;
    let builder = PageBuilder::new(planner, &options.site, components);

    for (package_id, package) in catalog.packages() {
        let package_path = planner.package_page(&package.name);
        let package_warnings: Vec<_> = check_package(package, &package_path.dir())
            .into_iter()
            .collect();
        let mut entry = PackageEntry {
            href: package_path.href(),
            services: IndexMap::new(),
        };

        for (service_id, service) in catalog.services_of(package_id) {
            let service_path = planner.service_page(&service.name);
            let service_dir = service_path.dir();
            let service_warnings = check_service(service, &service_dir);
            for warning in &service_warnings {
                report.warn(warning.clone());
            }

            let mut service_entry = ServiceEntry {
                href: service_path.href(),
                internal: service.internal,
                operations: Vec::with_capacity(service.operations.len()),
            };

            for operation in &service.operations {
                let operation_path = planner.operation_page(&service.name, &operation.name);
                let operation_dir = operation_path.dir();
                let inference = infer_verb(operation);
                report.record_operation(
                    format!("{}.{}", service.name, operation.name),
                    operation_dir.clone(),
                    &inference,
                    service.internal,
                );
                service_entry.operations.push(OperationEntry {
                    name: operation.name.clone(),
                    href: operation_path.href(),
                    verb: inference.verb().map(|v| v.to_string()),
                    internal: service.internal,
                });

                let warnings = check_operation(service, operation, &operation_dir);
                let page = builder.operation(
                    catalog,
                    service_id,
                    operation,
                    &inference,
                    &warnings,
                    examples.example_html(&operation_dir),
                );
                for warning in warnings {
                    report.warn(warning);
                }
                emit(sink, page)?;
            }

            emit(
                sink,
                builder.service(
                    catalog,
                    service_id,
                    &service_warnings,
                    examples.example_html(&service_dir),
                ),
            )?;
            entry
                .services
                .insert(service.name.to_string(), service_entry);
        }

        emit(sink, builder.package(catalog, package_id, &package_warnings))?;
        for warning in package_warnings {
            report.warn(warning);
        }
        report.packages.insert(package.name.to_string(), entry);
    }

    for (id, path) in structures {
        emit(sink, builder.structure(catalog.structure(id), path))?;
        report.totals.structures += 1;
    }
    for (id, path) in enumerations {
        emit(sink, builder.enumeration(catalog.enumeration(id), path))?;
        report.totals.enumerations += 1;
    }
    for (id, path) in constants {
        emit(sink, builder.constant(catalog.constant(id), path))?;
        report.totals.constants += 1;
    }

    emit(sink, builder.component(catalog))?;
    Ok(report)
}

/// Reserve the flat slot of every structure and enumeration the component links to, so a
/// link to an entity of a later component stays valid when that component is emitted.
fn reserve_references(catalog: &Catalog, planner: &mut PathPlanner) {
    let mut reserve = |t: &TypeDescriptor| {
        if let Some((kind, id)) = t.referenced_resource()
            && let Some(bucket) = Bucket::for_resource(kind)
        {
            planner.reserve_flat(bucket, &QualifiedName::new(id));
        }
    };
    for (_, structure) in catalog.structures() {
        structure.fields.iter().for_each(|f| reserve(&f.field_type));
    }
    for (_, service) in catalog.services() {
        for operation in &service.operations {
            operation.params.iter().for_each(|f| reserve(&f.field_type));
            reserve(&operation.output);
        }
    }
    for (_, service) in catalog.services() {
        for error in service.operations.iter().flat_map(|op| &op.errors) {
            planner.reserve_flat(Bucket::Structures, &error.structure);
        }
    }
}

fn emit<K: PageSink>(sink: &mut K, page: Page) -> Result<(), PipelineError> {
    let path = page.path.href();
    log::debug!("emitting {path}");
    sink.emit(page).map_err(|e| PipelineError::Emit {
        path,
        source: Box::new(e),
    })
}
