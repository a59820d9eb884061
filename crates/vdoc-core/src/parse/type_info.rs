use serde::{Deserialize, Serialize};

/// Resource type carried by user-defined references to structures.
pub const STRUCTURE_RESOURCE: &str = "com.vmware.vapi.structure";

/// Resource type carried by user-defined references to enumerations.
pub const ENUMERATION_RESOURCE: &str = "com.vmware.vapi.enumeration";

/// A metamodel type descriptor, tagged by its `category` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeDescriptor {
    Builtin {
        builtin_type: String,
    },
    UserDefined {
        user_defined_type: UserDefinedType,
    },
    Generic {
        generic_instantiation: GenericInstantiation,
    },
    #[serde(other)]
    Other,
}

/// Reference to a named resource (structure or enumeration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDefinedType {
    pub resource_type: String,
    #[serde(default)]
    pub resource_id: String,
}

/// A generic instantiation such as `LIST<T>` or `MAP<K, V>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericInstantiation {
    pub generic_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<Box<TypeDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_key_type: Option<Box<TypeDescriptor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_value_type: Option<Box<TypeDescriptor>>,
}

impl Default for TypeDescriptor {
    fn default() -> Self {
        TypeDescriptor::Builtin {
            builtin_type: "VOID".to_string(),
        }
    }
}

impl TypeDescriptor {
    pub fn is_void(&self) -> bool {
        matches!(self, TypeDescriptor::Builtin { builtin_type } if builtin_type == "VOID")
    }

    pub fn is_structure_ref(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::UserDefined { user_defined_type } if user_defined_type.resource_type == STRUCTURE_RESOURCE
        )
    }

    /// Whether this descriptor is an acceptable `value` wrapper for an operation output:
    /// void, a structure, or a list of acceptable outputs.
    pub fn is_valid_output(&self) -> bool {
        match self {
            TypeDescriptor::Builtin { .. } => self.is_void(),
            TypeDescriptor::UserDefined { .. } => self.is_structure_ref(),
            TypeDescriptor::Generic {
                generic_instantiation,
            } => {
                generic_instantiation.generic_type == "LIST"
                    && generic_instantiation
                        .element_type
                        .as_deref()
                        .is_some_and(TypeDescriptor::is_valid_output)
            }
            TypeDescriptor::Other => false,
        }
    }

    /// The qualified id of the structure or enumeration this descriptor refers to, if any.
    pub fn referenced_resource(&self) -> Option<(&str, &str)> {
        match self {
            TypeDescriptor::UserDefined { user_defined_type } => Some((
                user_defined_type.resource_type.as_str(),
                user_defined_type.resource_id.as_str(),
            )),
            TypeDescriptor::Generic {
                generic_instantiation,
            } => generic_instantiation
                .element_type
                .as_deref()
                .or(generic_instantiation.map_value_type.as_deref())
                .and_then(TypeDescriptor::referenced_resource),
            _ => None,
        }
    }

    /// Human-readable rendering, e.g. `list<Info>` or `optional<string>`.
    pub fn display(&self) -> String {
        match self {
            TypeDescriptor::Builtin { builtin_type } => builtin_type.to_lowercase(),
            TypeDescriptor::UserDefined { user_defined_type } => user_defined_type
                .resource_id
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .to_string(),
            TypeDescriptor::Generic {
                generic_instantiation: g,
            } => {
                let generic = g.generic_type.to_lowercase();
                match (&g.element_type, &g.map_key_type, &g.map_value_type) {
                    (_, Some(key), Some(value)) => {
                        format!("{generic}<{}, {}>", key.display(), value.display())
                    }
                    (Some(element), _, _) => format!("{generic}<{}>", element.display()),
                    _ => generic,
                }
            }
            TypeDescriptor::Other => "unknown".to_string(),
        }
    }
}
