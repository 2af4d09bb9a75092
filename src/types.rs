//! Resolved type model
//!
//! The render-agnostic output of resolution. Trees are built once per
//! definition and handed to a renderer read-only.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Polymorphism
// =============================================================================

/// How an object came to be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nature {
    /// Plain object
    #[default]
    None,
    /// Merged from several schemas, no subtype selector
    Composition,
    /// Merged from several schemas, at least one carrying a discriminator
    Inheritance,
}

/// Polymorphism descriptor of an [`ObjectType`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polymorphism {
    pub nature: Nature,
    /// Property whose value selects the concrete subtype
    pub discriminator: Option<String>,
}

impl Polymorphism {
    pub fn new(nature: Nature, discriminator: Option<String>) -> Self {
        Self { nature, discriminator }
    }
}

// =============================================================================
// Type Variants
// =============================================================================

/// Leaf scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicType {
    pub name: Option<String>,
    pub unique_name: Option<String>,
    /// Primitive kind (`string`, `integer`, ..., `object` when undeclared)
    pub kind: String,
    pub format: Option<String>,
}

/// Closed value set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: Option<String>,
    pub unique_name: Option<String>,
    pub values: Vec<String>,
}

/// Homogeneous sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayType {
    pub name: Option<String>,
    pub unique_name: Option<String>,
    pub items: Box<Type>,
}

/// String-keyed dictionary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapType {
    pub name: Option<String>,
    pub unique_name: Option<String>,
    pub value: Box<Type>,
}

/// Structured record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectType {
    pub name: Option<String>,
    pub unique_name: Option<String>,
    pub polymorphism: Polymorphism,
    pub properties: IndexMap<String, Type>,
}

impl ObjectType {
    pub fn new(
        name: Option<String>,
        polymorphism: Polymorphism,
        properties: IndexMap<String, Type>,
    ) -> Self {
        Self {
            unique_name: name.clone(),
            name,
            polymorphism,
            properties,
        }
    }

    /// Name-only object standing in for a target that could not be expanded
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(Some(name.into()), Polymorphism::default(), IndexMap::new())
    }
}

/// Indirection: the name resolves elsewhere, and this is what it resolves to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefType {
    /// Name the reference was made under; defaults to the target's name
    pub name: Option<String>,
    pub unique_name: Option<String>,
    /// Where the target's documentation lives
    pub locator: String,
    pub target: Box<Type>,
}

/// A resolved type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Type {
    Basic(BasicType),
    Enum(EnumType),
    Array(ArrayType),
    Map(MapType),
    Object(ObjectType),
    Ref(RefType),
}

impl Type {
    pub fn basic(kind: impl Into<String>, name: Option<String>, format: Option<String>) -> Self {
        Type::Basic(BasicType {
            unique_name: name.clone(),
            name,
            kind: kind.into(),
            format,
        })
    }

    pub fn enumeration(name: Option<String>, values: Vec<String>) -> Self {
        Type::Enum(EnumType {
            unique_name: name.clone(),
            name,
            values,
        })
    }

    pub fn array(name: Option<String>, items: Type) -> Self {
        Type::Array(ArrayType {
            unique_name: name.clone(),
            name,
            items: Box::new(items),
        })
    }

    pub fn map(name: Option<String>, value: Type) -> Self {
        Type::Map(MapType {
            unique_name: name.clone(),
            name,
            value: Box::new(value),
        })
    }

    pub fn reference(locator: impl Into<String>, target: Type) -> Self {
        Type::Ref(RefType {
            name: target.name().map(String::from),
            unique_name: target.unique_name().map(String::from),
            locator: locator.into(),
            target: Box::new(target),
        })
    }

    /// Display name
    pub fn name(&self) -> Option<&str> {
        match self {
            Type::Basic(t) => t.name.as_deref(),
            Type::Enum(t) => t.name.as_deref(),
            Type::Array(t) => t.name.as_deref(),
            Type::Map(t) => t.name.as_deref(),
            Type::Object(t) => t.name.as_deref(),
            Type::Ref(t) => t.name.as_deref(),
        }
    }

    /// Uniqueness-qualified name
    pub fn unique_name(&self) -> Option<&str> {
        match self {
            Type::Basic(t) => t.unique_name.as_deref(),
            Type::Enum(t) => t.unique_name.as_deref(),
            Type::Array(t) => t.unique_name.as_deref(),
            Type::Map(t) => t.unique_name.as_deref(),
            Type::Object(t) => t.unique_name.as_deref(),
            Type::Ref(t) => t.unique_name.as_deref(),
        }
    }

    /// Rename a type that is still being built.
    ///
    /// Sets both names. A reference is renamed itself; its target keeps
    /// the name it was resolved under.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        match self {
            Type::Basic(mut t) => {
                t.name = Some(name.clone());
                t.unique_name = Some(name);
                Type::Basic(t)
            }
            Type::Enum(mut t) => {
                t.name = Some(name.clone());
                t.unique_name = Some(name);
                Type::Enum(t)
            }
            Type::Array(mut t) => {
                t.name = Some(name.clone());
                t.unique_name = Some(name);
                Type::Array(t)
            }
            Type::Map(mut t) => {
                t.name = Some(name.clone());
                t.unique_name = Some(name);
                Type::Map(t)
            }
            Type::Object(mut t) => {
                t.name = Some(name.clone());
                t.unique_name = Some(name);
                Type::Object(t)
            }
            Type::Ref(mut t) => {
                t.name = Some(name.clone());
                t.unique_name = Some(name);
                Type::Ref(t)
            }
        }
    }

    /// Follow reference wrappers down to the concrete type
    pub fn dereference(&self) -> &Type {
        match self {
            Type::Ref(r) => {
                tracing::trace!(name = ?r.name, locator = %r.locator, "dereferencing {}", self);
                r.target.dereference()
            }
            other => other,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self {
            Type::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn is_ref(&self) -> bool {
        matches!(self, Type::Ref(_))
    }
}

impl From<ObjectType> for Type {
    fn from(object: ObjectType) -> Self {
        Type::Object(object)
    }
}

/// Dereference an optional type. `None` stays `None`.
pub fn resolve_reference(ty: Option<&Type>) -> Option<&Type> {
    ty.map(Type::dereference)
}

/// Short schema label, independent of any output format
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic(t) => match &t.format {
                Some(format) => write!(f, "{} ({})", t.kind, format),
                None => write!(f, "{}", t.kind),
            },
            Type::Enum(t) => write!(f, "enum ({})", t.values.join(", ")),
            Type::Array(t) => write!(f, "< {} > array", t.items),
            Type::Map(t) => write!(f, "< string, {} > map", t.value),
            Type::Object(t) => write!(f, "{}", t.name.as_deref().unwrap_or("object")),
            Type::Ref(t) => write!(f, "{}", t.name.as_deref().or(t.target.name()).unwrap_or("object")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Type {
        let mut props = IndexMap::new();
        props.insert("id".to_string(), Type::basic("string", None, None));
        ObjectType::new(Some("UserTitle".into()), Polymorphism::default(), props).into()
    }

    #[test]
    fn test_dereference_identity_on_concrete() {
        let t = Type::basic("integer", Some("Count".into()), Some("int64".into()));
        assert_eq!(t.dereference(), &t);
    }

    #[test]
    fn test_dereference_chain() {
        let inner = Type::reference("#c", user());
        let outer = Type::reference("#b", inner);
        assert_eq!(outer.dereference(), &user());
    }

    #[test]
    fn test_resolve_reference_absent() {
        assert_eq!(resolve_reference(None), None);
    }

    #[test]
    fn test_reference_takes_target_name() {
        let r = Type::reference("#user", user());
        assert_eq!(r.name(), Some("UserTitle"));
        assert_eq!(r.unique_name(), Some("UserTitle"));
    }

    #[test]
    fn test_with_name_on_ref_keeps_target_name() {
        let renamed = Type::reference("#user", user()).with_name("User");
        assert_eq!(renamed.name(), Some("User"));
        assert_eq!(renamed.unique_name(), Some("User"));
        assert_eq!(renamed.dereference().name(), Some("UserTitle"));
        match renamed {
            Type::Ref(r) => assert_eq!(r.locator, "#user"),
            other => panic!("Expected Ref, got {:?}", other),
        }
    }

    #[test]
    fn test_display_labels() {
        let ints = Type::array(None, Type::basic("integer", None, Some("int32".into())));
        assert_eq!(ints.to_string(), "< integer (int32) > array");

        let dict = Type::map(None, Type::basic("string", None, None));
        assert_eq!(dict.to_string(), "< string, string > map");

        let status = Type::enumeration(None, vec!["on".into(), "off".into()]);
        assert_eq!(status.to_string(), "enum (on, off)");

        assert_eq!(Type::reference("#u", user()).to_string(), "UserTitle");
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_value(Type::basic("boolean", None, None)).unwrap();
        assert_eq!(json["type"], "basic");
        assert_eq!(json["kind"], "boolean");
    }
}
