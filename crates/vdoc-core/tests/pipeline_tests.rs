use std::collections::HashMap;

use serde_json::{Value, json};

use vdoc_core::checks::WarningKind;
use vdoc_core::error::{FetchError, PipelineError};
use vdoc_core::parse::{self, ComponentDoc};
use vdoc_core::paths::CaseCollision;
use vdoc_core::pipeline::{self, RunOptions};
use vdoc_core::{ExampleSource, MetamodelSource, NoExamples, Page, PageKind, PageSink};

const COMPONENTS: &str = include_str!("fixtures/components.json");
const WIDGETS: &str = include_str!("fixtures/widgets.json");
const THING: &str = include_str!("fixtures/thing.json");
const VCENTER: &str = include_str!("fixtures/vcenter.json");

struct MemorySource {
    ids: Vec<String>,
    docs: HashMap<String, String>,
}

impl MemorySource {
    fn new(ids: &[&str], docs: &[(&str, &str)]) -> Self {
        Self {
            ids: ids.iter().map(|s| s.to_string()).collect(),
            docs: docs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }

    fn full() -> Self {
        let mut source = Self::new(
            &[],
            &[
                ("com.example", WIDGETS),
                ("com.example.things", THING),
                ("com.vmware.vcenter", VCENTER),
            ],
        );
        source.ids = parse::component_list_from_json(COMPONENTS).unwrap();
        source
    }
}

impl MetamodelSource for MemorySource {
    fn list_components(&self) -> Result<Vec<String>, FetchError> {
        Ok(self.ids.clone())
    }

    fn fetch_component(&self, id: &str) -> Result<ComponentDoc, FetchError> {
        let json = self
            .docs
            .get(id)
            .ok_or_else(|| FetchError::NotFound(id.to_string()))?;
        Ok(parse::component_from_json(json)?)
    }
}

struct BrokenSource;

impl MetamodelSource for BrokenSource {
    fn list_components(&self) -> Result<Vec<String>, FetchError> {
        Err(FetchError::Status {
            url: "https://vc/rest/com/vmware/vapi/metadata/metamodel/component".into(),
            status: 503,
        })
    }

    fn fetch_component(&self, id: &str) -> Result<ComponentDoc, FetchError> {
        Err(FetchError::NotFound(id.to_string()))
    }
}

struct FixedExamples;

impl ExampleSource for FixedExamples {
    fn example_html(&self, page_dir: &str) -> Option<String> {
        (page_dir == "com/example/widgets/Widgets/list").then(|| "<p>curl</p>".to_string())
    }
}

/// A component with one package and one service. The service's `get` returns the structure
/// `returns`, and the service declares `structures`.
fn component_json(component: &str, service: &str, returns: Option<&str>, structures: &[&str]) -> String {
    let package = service.rsplit_once('.').map_or(service, |(package, _)| package);
    let operations: Vec<Value> = returns
        .map(|target| {
            json!({
                "key": "get",
                "value": {
                    "name": "get",
                    "output": {
                        "type": {
                            "category": "USER_DEFINED",
                            "user_defined_type": {
                                "resource_type": "com.vmware.vapi.structure",
                                "resource_id": target,
                            },
                        },
                    },
                },
            })
        })
        .into_iter()
        .collect();
    let structures: Vec<Value> = structures
        .iter()
        .map(|name| json!({ "key": name, "value": { "name": name, "type": "STRUCTURE", "fields": [] } }))
        .collect();
    json!({
        "value": {
            "info": {
                "name": component,
                "packages": [{
                    "key": package,
                    "value": {
                        "name": package,
                        "services": [{
                            "key": service,
                            "value": { "name": service, "operations": operations, "structures": structures },
                        }],
                    },
                }],
            },
        },
    })
    .to_string()
}

fn options() -> RunOptions {
    RunOptions {
        non_public_components: vec!["vapi_common".into()],
        shared_package: Some("com.vmware.cis".into()),
        ..RunOptions::default()
    }
}

fn find<'a>(pages: &'a [Page], href: &str) -> &'a Page {
    pages
        .iter()
        .find(|p| p.path.href() == href)
        .unwrap_or_else(|| panic!("no page at {href}"))
}

fn hrefs(pages: &[Page]) -> Vec<String> {
    pages.iter().map(|p| p.path.href()).collect()
}

#[test]
fn test_widgets_scenario() {
    let source = MemorySource::new(&["com.example"], &[("com.example", WIDGETS)]);
    let mut pages: Vec<Page> = Vec::new();
    let report = pipeline::run(&source, &NoExamples, &mut pages, &options()).unwrap();

    assert_eq!(report.totals.get, 2);
    assert_eq!(report.totals.unknown, 0);
    assert_eq!(report.totals.warning_count(WarningKind::ListWithoutGet), 0);
    assert_eq!(report.totals.warning_count(WarningKind::NotPlural), 0);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let service = find(&pages, "com/example/widgets/Widgets/index.html");
    assert_eq!(service.kind, PageKind::Service);
    let operations: Vec<_> = pages
        .iter()
        .filter(|p| p.kind == PageKind::Operation)
        .map(|p| p.path.href())
        .collect();
    assert_eq!(
        operations,
        vec![
            "com/example/widgets/Widgets/get/index.html",
            "com/example/widgets/Widgets/list/index.html",
        ]
    );

    let list = find(&pages, "com/example/widgets/Widgets/list/index.html");
    assert_eq!(list.data["operation"]["verb"], "GET");
    assert_eq!(list.data["operation"]["verb_explicit"], false);
    assert_eq!(list.data["operation"]["request_path"], "/example/widgets");
    assert_eq!(list.data["base"], "../../../../../");
}

#[test]
fn test_singular_service_with_list_only() {
    let source = MemorySource::new(&["com.example.things"], &[("com.example.things", THING)]);
    let mut pages: Vec<Page> = Vec::new();
    let report = pipeline::run(&source, &NoExamples, &mut pages, &options()).unwrap();

    assert_eq!(report.totals.warning_count(WarningKind::ListWithoutGet), 1);
    assert_eq!(report.totals.warning_count(WarningKind::NotPlural), 1);
    assert_eq!(report.totals.total_warnings(), 2);
    assert_eq!(report.totals.get, 1);

    let list = find(&pages, "com/example/Thing/list/index.html");
    assert_eq!(list.data["operation"]["verb"], "GET");

    let service = find(&pages, "com/example/Thing/index.html");
    assert_eq!(service.data["warnings"].as_array().unwrap().len(), 2);
}

#[test]
fn test_full_run_totals() {
    let mut pages: Vec<Page> = Vec::new();
    let report = pipeline::run(&MemorySource::full(), &NoExamples, &mut pages, &options()).unwrap();

    assert_eq!(
        report.components,
        vec!["com.example", "com.example.things", "com.vmware.vcenter"]
    );
    assert!(report.skipped.is_empty());

    let totals = &report.totals;
    assert_eq!(totals.get, 5);
    assert_eq!(totals.post, 1);
    assert_eq!(totals.patch, 1);
    assert_eq!(totals.put, 0);
    // `relocate` has no table entry, `inspect` maps to HEAD
    assert_eq!(totals.unknown, 2);
    assert_eq!(totals.internal, 2);
    assert_eq!(totals.structures, 3);
    assert_eq!(totals.enumerations, 1);
    assert_eq!(totals.constants, 1);
    assert_eq!(totals.public_apis(), 7);

    assert_eq!(report.component_sum(), report.totals);
    assert_eq!(report.per_component["com.vmware.vcenter"].get, 2);
    assert_eq!(report.per_component["com.example"].get, 2);
    assert_eq!(report.per_component["com.example.things"].get, 1);
}

#[test]
fn test_full_run_warnings() {
    let mut pages: Vec<Page> = Vec::new();
    let report = pipeline::run(&MemorySource::full(), &NoExamples, &mut pages, &options()).unwrap();
    let totals = &report.totals;

    assert_eq!(totals.warning_count(WarningKind::ListWithoutGet), 1);
    assert_eq!(totals.warning_count(WarningKind::NotPlural), 2);
    assert_eq!(totals.warning_count(WarningKind::InvalidOutputWrapper), 1);
    assert_eq!(totals.warning_count(WarningKind::MissingRequestMapping), 1);
    assert_eq!(totals.warning_count(WarningKind::EmptyPackage), 1);
    // `VM.Info` collides with `Widgets.Info`, `VM.Summary` with the referenced `Thing.Summary`
    assert_eq!(totals.warning_count(WarningKind::NameCollision), 2);
    assert_eq!(report.warnings.len(), totals.total_warnings());

    let missing = report
        .warnings
        .iter()
        .find(|w| w.kind == WarningKind::MissingRequestMapping)
        .unwrap();
    assert!(missing.message.contains("com.vmware.vcenter.VM.relocate"));
    assert_eq!(missing.path, "com/vmware/vcenter/VM_/relocate");

    let wrapper = report
        .warnings
        .iter()
        .find(|w| w.kind == WarningKind::InvalidOutputWrapper)
        .unwrap();
    assert!(wrapper.message.contains("\"builtin_type\":\"ID\""));
}

#[test]
fn test_explicit_mapping_wins() {
    let mut pages: Vec<Page> = Vec::new();
    pipeline::run(&MemorySource::full(), &NoExamples, &mut pages, &options()).unwrap();

    let power_on = find(&pages, "com/vmware/vcenter/VM_/power_on/index.html");
    assert_eq!(power_on.data["operation"]["verb"], "PATCH");
    assert_eq!(power_on.data["operation"]["verb_explicit"], true);

    let inspect = find(&pages, "com/vmware/vcenter/VM_/inspect/index.html");
    assert_eq!(inspect.data["operation"]["verb"], "HEAD");

    let relocate = find(&pages, "com/vmware/vcenter/VM_/relocate/index.html");
    assert!(relocate.data["operation"]["verb"].is_null());
}

#[test]
fn test_internal_services_are_listed_separately() {
    let mut pages: Vec<Page> = Vec::new();
    let report = pipeline::run(&MemorySource::full(), &NoExamples, &mut pages, &options()).unwrap();

    let names: Vec<_> = report.internal_apis.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["com.vmware.vcenter.Debug.get", "com.vmware.vcenter.Debug.set"]
    );
    assert_eq!(report.internal_apis[0].path, "com/vmware/vcenter/Debug/get");

    let internal = find(&pages, "internal.html");
    assert_eq!(internal.data["apis"].as_array().unwrap().len(), 2);
    assert_eq!(
        internal.data["apis"][0]["href"],
        "com/vmware/vcenter/Debug/get/index.html"
    );
}

#[test]
fn test_shared_package_is_filtered() {
    let mut pages: Vec<Page> = Vec::new();
    pipeline::run(&MemorySource::full(), &NoExamples, &mut pages, &options()).unwrap();
    assert!(
        !hrefs(&pages).iter().any(|h| h.starts_with("com/vmware/cis/")),
        "shared package emitted by a foreign component"
    );

    let raw = RunOptions {
        raw: true,
        ..options()
    };
    let mut pages: Vec<Page> = Vec::new();
    pipeline::run(&MemorySource::full(), &NoExamples, &mut pages, &raw).unwrap();
    find(&pages, "com/vmware/cis/Session/index.html");
}

#[test]
fn test_flat_name_collision_gets_qualified_page() {
    let mut pages: Vec<Page> = Vec::new();
    pipeline::run(&MemorySource::full(), &NoExamples, &mut pages, &options()).unwrap();

    let first = find(&pages, "structures/Info.html");
    assert_eq!(first.data["structure"]["name"], "com.example.widgets.Widgets.Info");
    let second = find(&pages, "structures/com.vmware.vcenter.VM.Info.html");
    assert_eq!(second.data["structure"]["name"], "com.vmware.vcenter.VM.Info");
    let summary = find(&pages, "structures/com.vmware.vcenter.VM.Summary.html");
    assert_eq!(summary.data["structure"]["name"], "com.vmware.vcenter.VM.Summary");

    let get = find(&pages, "com/vmware/vcenter/VM_/get/index.html");
    assert_eq!(
        get.data["operation"]["output"]["type"]["href"],
        "structures/com.vmware.vcenter.VM.Info.html"
    );
}

#[test]
fn test_forward_reference_keeps_its_flat_page() {
    let a = component_json("a", "a.p.Users", Some("c.p.Things.Info"), &[]);
    let b = component_json("b", "b.p.Others", None, &["b.p.Others.Info"]);
    let c = component_json("c", "c.p.Things", None, &["c.p.Things.Info"]);
    let source = MemorySource::new(
        &["a", "b", "c"],
        &[("a", a.as_str()), ("b", b.as_str()), ("c", c.as_str())],
    );
    let mut pages: Vec<Page> = Vec::new();
    let report = pipeline::run(&source, &NoExamples, &mut pages, &options()).unwrap();

    let get = find(&pages, "a/p/Users/get/index.html");
    let href = get.data["operation"]["output"]["type"]["href"].as_str().unwrap();
    assert_eq!(href, "structures/Info.html");
    assert_eq!(find(&pages, href).data["structure"]["name"], "c.p.Things.Info");

    let other = find(&pages, "structures/b.p.Others.Info.html");
    assert_eq!(other.data["structure"]["name"], "b.p.Others.Info");
    assert_eq!(report.totals.warning_count(WarningKind::NameCollision), 1);
}

#[test]
fn test_type_links_resolve_to_flat_pages() {
    let mut pages: Vec<Page> = Vec::new();
    pipeline::run(&MemorySource::full(), &NoExamples, &mut pages, &options()).unwrap();

    let info = find(&pages, "structures/Info.html");
    let color = &info.data["structure"]["fields"][0]["type"];
    assert_eq!(color["display"], "Color");
    assert_eq!(color["href"], "enumerations/Color.html");
    find(&pages, "enumerations/Color.html");
    find(&pages, "constants/RESOURCE_TYPE.html");
}

#[test]
fn test_repeated_component_name_is_merged() {
    let source = MemorySource::new(
        &["com.example", "com.example.mirror"],
        &[("com.example", WIDGETS), ("com.example.mirror", WIDGETS)],
    );
    let mut pages: Vec<Page> = Vec::new();
    let report = pipeline::run(&source, &NoExamples, &mut pages, &options()).unwrap();

    assert_eq!(report.totals.get, 4);
    assert_eq!(report.component_sum(), report.totals);
    assert_eq!(report.per_component["com.example"].get, 4);
    assert_eq!(report.components, vec!["com.example"]);

    let index = find(&pages, "index.html");
    assert_eq!(index.data["items"].as_array().unwrap().len(), 1);
}

#[test]
fn test_uppercase_strategy_keeps_segments() {
    let opts = RunOptions {
        case_collision: CaseCollision::Uppercase,
        ..options()
    };
    let mut pages: Vec<Page> = Vec::new();
    pipeline::run(&MemorySource::full(), &NoExamples, &mut pages, &opts).unwrap();
    find(&pages, "com/vmware/vcenter/VM/index.html");
}

#[test]
fn test_run_level_pages_are_emitted() {
    let mut pages: Vec<Page> = Vec::new();
    let report = pipeline::run(&MemorySource::full(), &NoExamples, &mut pages, &options()).unwrap();

    let index = find(&pages, "index.html");
    assert_eq!(index.kind, PageKind::Index);
    assert_eq!(index.data["items"].as_array().unwrap().len(), 3);
    assert_eq!(index.data["stats"]["public_apis"], 7);

    let warnings = find(&pages, "warnings.html");
    assert_eq!(
        warnings.data["warnings"].as_array().unwrap().len(),
        report.warnings.len()
    );

    let api_index = find(&pages, "apiindex.html");
    let vm = &api_index.data["apis"]["com.vmware.vcenter"]["com.vmware.vcenter"]["services"]
        ["com.vmware.vcenter.VM"];
    assert_eq!(vm["operations"].as_array().unwrap().len(), 6);

    find(&pages, "com.example.html");
    find(&pages, "com.vmware.vcenter.html");
    find(&pages, "com/vmware/vcenter/empty/index.html");
}

#[test]
fn test_examples_are_attached() {
    let source = MemorySource::new(&["com.example"], &[("com.example", WIDGETS)]);
    let mut pages: Vec<Page> = Vec::new();
    pipeline::run(&source, &FixedExamples, &mut pages, &options()).unwrap();

    let list = find(&pages, "com/example/widgets/Widgets/list/index.html");
    assert_eq!(list.data["examples"], "<p>curl</p>");
    let get = find(&pages, "com/example/widgets/Widgets/get/index.html");
    assert!(get.data["examples"].is_null());
}

#[test]
fn test_bootstrap_failure_is_fatal() {
    let mut pages: Vec<Page> = Vec::new();
    let err = pipeline::run(&BrokenSource, &NoExamples, &mut pages, &options()).unwrap_err();
    assert!(matches!(err, PipelineError::Bootstrap(FetchError::Status { status: 503, .. })));
    assert!(pages.is_empty());
}

#[test]
fn test_component_failure_is_skipped() {
    let source = MemorySource::new(
        &["com.example", "com.missing"],
        &[("com.example", WIDGETS)],
    );
    let mut pages: Vec<Page> = Vec::new();
    let report = pipeline::run(&source, &NoExamples, &mut pages, &options()).unwrap();

    assert_eq!(report.components, vec!["com.example"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "com.missing");
    assert_eq!(report.totals.get, 2);
    find(&pages, "index.html");
}

#[test]
fn test_non_public_components_need_internal_flag() {
    let source = MemorySource::new(&["vapi_common"], &[("vapi_common", WIDGETS)]);

    let mut pages: Vec<Page> = Vec::new();
    let report = pipeline::run(&source, &NoExamples, &mut pages, &options()).unwrap();
    assert!(report.components.is_empty());

    let opts = RunOptions {
        include_internal: true,
        ..options()
    };
    let mut pages: Vec<Page> = Vec::new();
    let report = pipeline::run(&source, &NoExamples, &mut pages, &opts).unwrap();
    assert_eq!(report.totals.get, 2);
}

#[derive(Debug, thiserror::Error)]
#[error("disk full")]
struct DiskFull;

struct FailingSink;

impl PageSink for FailingSink {
    type Error = DiskFull;

    fn emit(&mut self, _page: Page) -> Result<(), DiskFull> {
        Err(DiskFull)
    }
}

#[test]
fn test_sink_errors_are_fatal() {
    let source = MemorySource::new(&["com.example"], &[("com.example", WIDGETS)]);
    let err = pipeline::run(&source, &NoExamples, &mut FailingSink, &options()).unwrap_err();
    match err {
        PipelineError::Emit { path, .. } => {
            assert_eq!(path, "com/example/widgets/Widgets/get/index.html")
        }
        other => panic!("unexpected error: {other}"),
    }
}
