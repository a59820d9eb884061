use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use vdoc_core::error::{FetchError, ParseError};
use vdoc_core::parse::{self, ComponentDoc};
use vdoc_core::{ExampleSource, MetamodelSource};
use vdoc_html::markdown;

fn transport(url: &str, err: reqwest::Error) -> FetchError {
    FetchError::Transport {
        url: url.to_string(),
        source: Box::new(err),
    }
}

fn build_client(insecure_tls: bool, timeout: Option<Duration>) -> Result<Client, FetchError> {
    Client::builder()
        .danger_accept_invalid_certs(insecure_tls)
        .timeout(timeout)
        .build()
        .map_err(|e| transport("<client>", e))
}

/// GET `url` and return the body of a 200 response.
fn get_text(client: &Client, url: &str) -> Result<String, FetchError> {
    log::info!("GET {url}");
    let response = client.get(url).send().map_err(|e| transport(url, e))?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().map_err(|e| transport(url, e))
}

/// The metamodel component endpoints of a metadata service.
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    /// `base_url` is the component listing endpoint, e.g.
    /// `https://vc/rest/com/vmware/vapi/metadata/metamodel/component`.
    pub fn new(
        base_url: impl Into<String>,
        insecure_tls: bool,
        timeout: Option<Duration>,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(insecure_tls, timeout)?,
            base_url: base_url.into(),
        })
    }
}

impl MetamodelSource for HttpSource {
    fn list_components(&self) -> Result<Vec<String>, FetchError> {
        let body = get_text(&self.client, &self.base_url)?;
        Ok(parse::component_list_from_json(&body)?)
    }

    fn fetch_component(&self, id: &str) -> Result<ComponentDoc, FetchError> {
        let url = format!("{}/id:{id}", self.base_url);
        let body = get_text(&self.client, &url)?;
        Ok(parse::component_from_json(&body)?)
    }
}

/// Resolve the metadata host of a testbed from the registry at `registry_url`.
pub fn resolve_testbed_host(
    registry_url: &str,
    testbed: &str,
    timeout: Option<Duration>,
) -> Result<String, FetchError> {
    let client = build_client(false, timeout)?;
    let body = get_text(&client, registry_url)?;
    host_from_registry(&body, testbed)
}

/// `{"<testbed>": [{"vc": [{"systemPNID": "<host>"}]}]}` -> `<host>`.
pub fn host_from_registry(body: &str, testbed: &str) -> Result<String, FetchError> {
    let registry: serde_json::Value = serde_json::from_str(body).map_err(ParseError::from)?;
    registry
        .get(testbed)
        .and_then(|entries| entries.get(0))
        .and_then(|entry| entry.get("vc"))
        .and_then(|vcs| vcs.get(0))
        .and_then(|vc| vc.get("systemPNID"))
        .and_then(|host| host.as_str())
        .map(String::from)
        .ok_or_else(|| FetchError::NotFound(format!("testbed {testbed} in registry")))
}

/// Markdown examples published next to the reference, one document per page directory.
pub struct HttpExamples {
    client: Client,
    base_url: String,
}

impl HttpExamples {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(false, timeout)?,
            base_url: base_url.into(),
        })
    }

    fn url(&self, page_dir: &str) -> String {
        format!("{}{page_dir}.md", self.base_url)
    }
}

impl ExampleSource for HttpExamples {
    fn example_html(&self, page_dir: &str) -> Option<String> {
        let url = self.url(page_dir);
        match get_text(&self.client, &url) {
            Ok(body) => Some(markdown::to_html(&body)),
            Err(e) => {
                log::debug!("no examples for {page_dir}: {e}");
                None
            }
        }
    }
}
