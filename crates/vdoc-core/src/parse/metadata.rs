use serde::{Deserialize, Serialize};

use super::Keyed;

/// A metadata annotation such as `RequestMapping`, `Internal` or `Released`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    #[serde(default)]
    pub value: MetadataElements,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetadataElements {
    #[serde(default)]
    pub elements: Vec<Keyed<ElementValue>>,
}

/// A single annotation element value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list_value: Vec<String>,
}

impl ElementValue {
    pub fn as_text(&self) -> Option<String> {
        if let Some(ref s) = self.string_value {
            return Some(s.clone());
        }
        if let Some(n) = self.long_value {
            return Some(n.to_string());
        }
        if !self.list_value.is_empty() {
            return Some(self.list_value.join(", "));
        }
        None
    }
}

/// The `RequestMapping` annotation of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RequestMapping {
    pub method: Option<String>,
    pub path: Option<String>,
}

impl RequestMapping {
    /// Extract the request mapping from an operation's metadata.
    ///
    /// The `method` element carries the HTTP verb and the `value` element the URL template.
    /// Later entries override earlier ones.
    pub fn from_metadata(metadata: &[MetadataEntry]) -> Self {
        let mut mapping = RequestMapping::default();
        for entry in metadata.iter().filter(|m| m.key == "RequestMapping") {
            for element in &entry.value.elements {
                match element.key.as_str() {
                    "method" => mapping.method = element.value.string_value.clone(),
                    "value" => mapping.path = element.value.string_value.clone(),
                    _ => {}
                }
            }
        }
        mapping
    }

    pub fn is_empty(&self) -> bool {
        self.method.is_none() && self.path.is_none()
    }
}

/// Value of the first element of the first metadata entry named `key`.
pub fn first_element_value<'a>(metadata: &'a [MetadataEntry], key: &str) -> Option<&'a ElementValue> {
    metadata
        .iter()
        .filter(|m| m.key == key)
        .find_map(|m| m.value.elements.first().map(|e| &e.value))
}

/// Whether the metadata carries `Internal` with a `"true"` string value.
pub fn is_internal(metadata: &[MetadataEntry]) -> bool {
    first_element_value(metadata, "Internal")
        .and_then(|v| v.string_value.as_deref())
        .is_some_and(|v| v == "true")
}

/// The `Released` version marker, if present.
pub fn released_version(metadata: &[MetadataEntry]) -> Option<String> {
    first_element_value(metadata, "Released").and_then(ElementValue::as_text)
}
