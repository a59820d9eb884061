use std::fmt;

use serde::Serialize;

use crate::model::Operation;

/// The verbs that have their own counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StandardVerb {
    Get,
    Put,
    Post,
    Patch,
    Delete,
}

impl StandardVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardVerb::Get => "GET",
            StandardVerb::Put => "PUT",
            StandardVerb::Post => "POST",
            StandardVerb::Patch => "PATCH",
            StandardVerb::Delete => "DELETE",
        }
    }

    pub fn parse(method: &str) -> Option<Self> {
        match method {
            "GET" => Some(StandardVerb::Get),
            "PUT" => Some(StandardVerb::Put),
            "POST" => Some(StandardVerb::Post),
            "PATCH" => Some(StandardVerb::Patch),
            "DELETE" => Some(StandardVerb::Delete),
            _ => None,
        }
    }
}

/// An HTTP method as carried by the source data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verb {
    Standard(StandardVerb),
    /// Any other literal supplied by a request mapping, kept verbatim.
    Custom(String),
}

impl Verb {
    pub fn from_method(method: &str) -> Self {
        StandardVerb::parse(method)
            .map(Verb::Standard)
            .unwrap_or_else(|| Verb::Custom(method.to_string()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Verb::Standard(v) => v.as_str(),
            Verb::Custom(s) => s,
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an operation's verb was determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerbInference {
    Explicit(Verb),
    Inferred(StandardVerb),
    Unknown,
}

impl VerbInference {
    pub fn verb(&self) -> Option<Verb> {
        match self {
            VerbInference::Explicit(v) => Some(v.clone()),
            VerbInference::Inferred(v) => Some(Verb::Standard(*v)),
            VerbInference::Unknown => None,
        }
    }

    /// The verb for counting purposes; custom and unknown verbs have no counter.
    pub fn standard(&self) -> Option<StandardVerb> {
        match self {
            VerbInference::Explicit(Verb::Standard(v)) | VerbInference::Inferred(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, VerbInference::Explicit(_))
    }
}

use StandardVerb::{Delete, Get, Post, Put};

/// Operation names with a known verb. No name appears twice.
pub const VERB_TABLE: &[(&str, StandardVerb)] = &[
    ("get", Get),
    ("list", Get),
    ("stats", Get),
    ("fingerprint", Get),
    ("progress", Get),
    ("list_attachable_tags", Get),
    ("list_attached_tags", Get),
    ("list_attached_objects", Get),
    ("list_attached_objects_on_tags", Get),
    ("list_all_attached_objects_on_tags", Get),
    ("list_attached_tags_on_objects", Get),
    ("list_detail", Get),
    ("query_detail", Get),
    ("list_used_categories", Get),
    ("list_tags_for_category", Get),
    ("list_tags_for_categories", Get),
    ("list_used_tags", Get),
    ("find", Get),
    ("probe", Get),
    ("preview", Get),
    ("get_by_datastore_path", Get),
    ("get_datastore_path", Get),
    ("get_item_state", Get),
    ("get_item_states", Get),
    ("query", Get),
    ("batch_has_privileges", Get),
    ("has_privileges", Get),
    ("batch_query", Get),
    ("find_tags_by_name", Get),
    ("get_all_categories", Get),
    ("get_all_tags", Get),
    ("get_categories", Get),
    ("get_tags", Get),
    ("set", Put),
    ("create", Post),
    ("add", Post),
    ("add_to_used_by", Post),
    ("attach", Post),
    ("copy", Post),
    ("detach", Post),
    ("reload", Post),
    ("attach_tag_to_multiple_objects", Post),
    ("detach_tag_from_multiple_objects", Post),
    ("attach_multiple_tags_to_object", Post),
    ("detach_multiple_tags_from_object", Post),
    ("release_session", Post),
    ("remove_item_targets", Post),
    ("filter", Post),
    ("remove_items", Post),
    ("renew_session", Post),
    ("set_item_source", Post),
    ("add_item_targets", Post),
    ("add_items", Post),
    ("create_session", Post),
    ("cancel", Post),
    ("complete", Post),
    ("enable", Post),
    ("hash", Post),
    ("limits", Post),
    ("mount", Post),
    ("unmount", Post),
    ("disable", Post),
    ("fail", Post),
    ("keep_alive", Post),
    ("remove", Post),
    ("test", Post),
    ("evict", Post),
    ("validate", Post),
    ("sync", Post),
    ("deploy", Post),
    ("prepare", Post),
    ("create_for_resource_pool", Post),
    ("create_probe_import_session", Post),
    ("try_instantiate", Post),
    ("instantiate", Post),
    ("remove_from_used_by", Post),
    ("revoke_propagating_permissions", Post),
    ("update", Post),
    ("login", Post),
    ("logout", Post),
    ("delete", Delete),
];

/// Look up an operation name in [`VERB_TABLE`].
pub fn verb_for_name(name: &str) -> Option<StandardVerb> {
    VERB_TABLE
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, verb)| *verb)
}

/// Determine the verb of an operation. An explicit `RequestMapping` method always wins;
/// otherwise the name is looked up in [`VERB_TABLE`].
pub fn infer_verb(operation: &Operation) -> VerbInference {
    if let Some(ref method) = operation.request_mapping.method {
        return VerbInference::Explicit(Verb::from_method(method));
    }
    match verb_for_name(&operation.name) {
        Some(verb) => VerbInference::Inferred(verb),
        None => VerbInference::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::parse::{RequestMapping, TypeDescriptor};

    #[test]
    fn test_table_has_no_duplicates() {
        let mut seen = HashSet::new();
        for (name, _) in VERB_TABLE {
            assert!(seen.insert(*name), "{name} appears twice in the verb table");
        }
    }

    #[test]
    fn test_verb_for_name() {
        assert_eq!(verb_for_name("list"), Some(Get));
        assert_eq!(verb_for_name("set"), Some(Put));
        assert_eq!(verb_for_name("create"), Some(Post));
        assert_eq!(verb_for_name("delete"), Some(Delete));
        assert_eq!(verb_for_name("relocate"), None);
    }

    fn unmapped(name: &str) -> Operation {
        Operation {
            name: name.to_string(),
            documentation: String::new(),
            params: Vec::new(),
            output: TypeDescriptor::default(),
            output_documentation: String::new(),
            errors: Vec::new(),
            metadata: Vec::new(),
            request_mapping: RequestMapping::default(),
        }
    }

    #[test]
    fn test_every_tabled_name_is_inferred() {
        for (name, verb) in VERB_TABLE {
            assert_eq!(
                infer_verb(&unmapped(name)),
                VerbInference::Inferred(*verb),
                "{name}"
            );
        }
        assert_eq!(infer_verb(&unmapped("relocate")), VerbInference::Unknown);
    }

    #[test]
    fn test_explicit_method_beats_table() {
        let mut op = unmapped("get");
        op.request_mapping.method = Some("POST".into());
        assert_eq!(
            infer_verb(&op),
            VerbInference::Explicit(Verb::Standard(StandardVerb::Post))
        );
    }

    #[test]
    fn test_lookup_is_exact() {
        assert_eq!(verb_for_name("List"), None);
        assert_eq!(verb_for_name("list_widgets"), None);
    }

    #[test]
    fn test_verb_from_method() {
        assert_eq!(Verb::from_method("PATCH"), Verb::Standard(StandardVerb::Patch));
        assert_eq!(Verb::from_method("OPTIONS"), Verb::Custom("OPTIONS".to_string()));
        assert_eq!(Verb::from_method("get").as_str(), "get");
    }
}
