use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::paths::CaseCollision;

/// Top-level project configuration loaded from `.vdoc.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VdocConfig {
    /// Metadata service host; resolved from the testbed registry when absent.
    pub host: Option<String>,
    pub scheme: String,
    pub metamodel_path: String,
    pub output: String,
    /// Directory whose templates override the built-in ones.
    pub templates: Option<String>,
    pub testbed: TestbedConfig,
    pub examples_url: String,
    pub case_collision: CaseCollision,
    /// Entries of the version dropdown rendered on every page.
    pub versions: Vec<String>,
    /// Components skipped unless internal APIs are requested.
    pub non_public_components: Vec<String>,
    /// Package repeated across components; only emitted by its own component.
    pub shared_package: Option<String>,
    /// Accept self-signed certificates of lab hosts.
    pub insecure_tls: bool,
    pub timeout_secs: Option<u64>,
}

impl Default for VdocConfig {
    fn default() -> Self {
        Self {
            host: None,
            scheme: "https".to_string(),
            metamodel_path: "/rest/com/vmware/vapi/metadata/metamodel/component".to_string(),
            output: "./reference".to_string(),
            templates: None,
            testbed: TestbedConfig::default(),
            examples_url: "https://raw.githubusercontent.com/strefethen/samples/master/"
                .to_string(),
            case_collision: CaseCollision::Suffix,
            versions: ["main", "cloud", "layer1", "v6.7.1", "v6.7.0", "v6.5.2"]
                .into_iter()
                .map(String::from)
                .collect(),
            non_public_components: [
                "data_service",
                "vapi_common",
                "vmon_vapi_provider",
                "vcenter_api",
                "vcenter_cis_api",
                "com.vmware.vapi.vcenter",
                "com.vmware.vapi.rest.navigation",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            shared_package: Some("com.vmware.cis".to_string()),
            insecure_tls: true,
            timeout_secs: None,
        }
    }
}

/// Which testbed to document and where to look it up.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TestbedConfig {
    pub name: String,
    /// JSON registry mapping testbed names to their hosts.
    pub registry_url: Option<String>,
}

impl Default for TestbedConfig {
    fn default() -> Self {
        Self {
            name: "layer1".to_string(),
            registry_url: None,
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".vdoc.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<VdocConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: VdocConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# vdoc configuration
# host: vcenter.example.com        # metadata service host
scheme: https
metamodel_path: /rest/com/vmware/vapi/metadata/metamodel/component
output: ./reference
# templates: ./templates           # override built-in page templates
testbed:
  name: layer1
  # registry_url: http://testbeds.example.com/peek
examples_url: https://raw.githubusercontent.com/strefethen/samples/master/
case_collision: suffix             # suffix | uppercase
versions: [main, cloud, layer1, v6.7.1, v6.7.0, v6.5.2]
non_public_components:
  - data_service
  - vapi_common
  - vmon_vapi_provider
  - vcenter_api
  - vcenter_cis_api
  - com.vmware.vapi.vcenter
  - com.vmware.vapi.rest.navigation
shared_package: com.vmware.cis
insecure_tls: true
# timeout_secs: 30
"#
}
