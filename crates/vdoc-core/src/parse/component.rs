use serde::{Deserialize, Serialize};

use super::Keyed;
use super::metadata::MetadataEntry;
use super::type_info::TypeDescriptor;

/// A component document as returned by `metamodel/component/id:{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDoc {
    pub info: ComponentInfo,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub name: String,

    #[serde(default)]
    pub documentation: String,

    #[serde(default)]
    pub packages: Vec<Keyed<PackageInfo>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PackageInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub documentation: String,

    #[serde(default)]
    pub services: Vec<Keyed<ServiceInfo>>,

    #[serde(default)]
    pub structures: Vec<Keyed<StructureInfo>>,

    #[serde(default)]
    pub enumerations: Vec<Keyed<EnumerationInfo>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub documentation: String,

    #[serde(default)]
    pub operations: Vec<Keyed<OperationInfo>>,

    #[serde(default)]
    pub structures: Vec<Keyed<StructureInfo>>,

    #[serde(default)]
    pub enumerations: Vec<Keyed<EnumerationInfo>>,

    #[serde(default)]
    pub constants: Vec<Keyed<ConstantInfo>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub documentation: String,

    #[serde(default)]
    pub params: Vec<FieldInfo>,

    #[serde(default)]
    pub output: OutputInfo,

    #[serde(default)]
    pub errors: Vec<ErrorInfo>,

    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputInfo {
    #[serde(rename = "type", default)]
    pub output_type: TypeDescriptor,

    #[serde(default)]
    pub documentation: String,
}

/// An operation parameter or structure field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,

    #[serde(rename = "type", default)]
    pub field_type: TypeDescriptor,

    #[serde(default)]
    pub documentation: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataEntry>,
}

/// A declared error of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub structure_id: String,

    #[serde(default)]
    pub documentation: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructureInfo {
    #[serde(default)]
    pub name: String,

    /// `STRUCTURE` or `ERROR`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub documentation: String,

    #[serde(default)]
    pub fields: Vec<FieldInfo>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnumerationInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub documentation: String,

    #[serde(default)]
    pub values: Vec<EnumerationValueInfo>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumerationValueInfo {
    pub value: String,

    #[serde(default)]
    pub documentation: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConstantInfo {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default)]
    pub value: serde_json::Value,

    #[serde(default)]
    pub documentation: String,
}

impl ConstantInfo {
    /// Render the constant's primitive (or list of primitives) value as text.
    pub fn display_value(&self) -> String {
        fn primitive(v: &serde_json::Value) -> Option<String> {
            let p = v.get("primitive_value").unwrap_or(v);
            ["string_value", "long_value", "double_value", "boolean_value"]
                .iter()
                .find_map(|k| p.get(k))
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
        }

        if let Some(list) = self.value.get("list_value").and_then(|l| l.as_array()) {
            return list
                .iter()
                .filter_map(primitive)
                .collect::<Vec<_>>()
                .join(", ");
        }
        primitive(&self.value).unwrap_or_default()
    }
}
