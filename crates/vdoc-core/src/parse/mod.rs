pub mod component;
pub mod metadata;
pub mod type_info;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
pub use component::*;
pub use metadata::{ElementValue, MetadataEntry, RequestMapping};
pub use type_info::TypeDescriptor;

/// A `{key, value}` pair, the metamodel's encoding of ordered maps.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Keyed<T> {
    pub key: String,
    pub value: T,
}

/// The `{"value": ...}` envelope the metadata service wraps every response in.
#[derive(Debug, Clone, Deserialize)]
struct Envelope<T> {
    value: T,
}

/// Parse a component document from its service response.
pub fn component_from_json(input: &str) -> Result<ComponentDoc, ParseError> {
    unwrap_envelope(input)
}

/// Parse the list of component identifiers from the bootstrap response.
pub fn component_list_from_json(input: &str) -> Result<Vec<String>, ParseError> {
    unwrap_envelope(input)
}

fn unwrap_envelope<T: DeserializeOwned>(input: &str) -> Result<T, ParseError> {
    let envelope: Envelope<T> = serde_json::from_str(input)?;
    Ok(envelope.value)
}
