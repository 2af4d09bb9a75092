//! Input schema shapes
//!
//! Raw Swagger 2.0 / OpenAPI 3 schema JSON is parsed once into [`SchemaNode`],
//! a closed set of shapes the resolver matches on exhaustively. No type
//! decisions happen here beyond picking the shape.

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagnostics::Diagnostics;
use crate::error::{ResolveError, Result};

/// Named schema definitions, in document order
pub type Definitions = IndexMap<String, SchemaNode>;

// =============================================================================
// Schema Node
// =============================================================================

/// One schema node, classified by shape at parse time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchemaNode {
    /// `{"$ref": "..."}`
    Reference(Reference),
    /// `{"allOf": [...]}`
    Composed(ComposedSchema),
    /// `{"type": "array", "items": ...}`
    Array(ArraySchema),
    /// Any other schema: scalar, enum, object or map
    Model(ModelSchema),
}

/// An `allOf` composition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComposedSchema {
    pub title: Option<String>,
    /// `None` when the composition list itself is absent (`"allOf": null`)
    pub all_of: Option<Vec<SchemaNode>>,
}

/// An array schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySchema {
    pub title: Option<String>,
    pub items: Box<SchemaNode>,
}

/// A plain (non-composed, non-reference) schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Declared primitive kind (`type`)
    pub kind: Option<String>,
    pub format: Option<String>,
    pub title: Option<String>,
    /// Enumerated literals, stringified in declaration order
    pub enum_values: Option<Vec<String>>,
    pub properties: Option<IndexMap<String, SchemaNode>>,
    pub additional_properties: Option<Box<SchemaNode>>,
    pub discriminator: Option<String>,
}

impl ModelSchema {
    pub fn with_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }
}

impl SchemaNode {
    /// Shorthand for a `$ref` node
    pub fn reference(ref_str: impl Into<String>) -> Self {
        Self::Reference(Reference::new(ref_str))
    }

    /// Parse a schema node from JSON, failing on the first malformed node
    pub fn from_json(value: &Value) -> Result<Self> {
        NodeParser { diagnostics: None }.node(value, "#")
    }

    /// Title declared on the node itself, if any
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Reference(_) => None,
            Self::Composed(c) => c.title.as_deref(),
            Self::Array(a) => a.title.as_deref(),
            Self::Model(m) => m.title.as_deref(),
        }
    }
}

// =============================================================================
// References
// =============================================================================

/// How a `$ref` string addresses its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefFormat {
    /// Same document (`#/definitions/User`, or a bare `User`)
    Internal,
    /// Another document by relative path (`./common.json#/definitions/Id`)
    Relative,
    /// Another document by absolute URL
    Url,
}

/// A `$ref` pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// The `$ref` string, with bare names expanded to `#/definitions/<name>`
    pub reference: String,
    pub format: RefFormat,
}

impl Reference {
    pub fn new(ref_str: impl Into<String>) -> Self {
        let raw = ref_str.into();
        let format = ref_format(&raw);

        // Swagger accepts `"$ref": "User"` as shorthand for a local definition
        let reference = if format == RefFormat::Internal && !raw.starts_with('#') {
            format!("#/definitions/{}", raw)
        } else {
            raw
        };

        Self { reference, format }
    }

    /// Last pointer segment, decoded (`User` for `#/definitions/User`)
    pub fn simple_name(&self) -> String {
        let fragment = match self.reference.split_once('#') {
            Some((_, fragment)) => fragment,
            None => self.reference.as_str(),
        };
        let segment = fragment.rsplit('/').next().unwrap_or(fragment);
        decode_pointer_segment(segment)
    }

    /// Key used against the definitions map: the simple name for internal
    /// references, the whole reference string otherwise
    pub fn lookup_name(&self) -> String {
        match self.format {
            RefFormat::Internal => self.simple_name(),
            RefFormat::Relative | RefFormat::Url => self.reference.clone(),
        }
    }
}

fn ref_format(raw: &str) -> RefFormat {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        RefFormat::Url
    } else if raw.starts_with('#') {
        RefFormat::Internal
    } else if raw.starts_with("./")
        || raw.starts_with("../")
        || raw.starts_with('/')
        || raw.contains('#')
        || raw.ends_with(".json")
        || raw.ends_with(".yaml")
        || raw.ends_with(".yml")
    {
        RefFormat::Relative
    } else {
        RefFormat::Internal
    }
}

/// Decodes a JSON Pointer segment (`~1`, `~0` and percent escapes)
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded).decode_utf8_lossy().into_owned()
}

// =============================================================================
// Parsing
// =============================================================================

/// Walks schema JSON. Strict without a collector; with one, a malformed
/// node degrades to an untyped model and a warning instead of an error.
struct NodeParser<'d> {
    diagnostics: Option<&'d mut Diagnostics>,
}

impl NodeParser<'_> {
    fn node(&mut self, value: &Value, pointer: &str) -> Result<SchemaNode> {
        let parsed = self.parse(value, pointer);
        match (parsed, self.diagnostics.as_deref_mut()) {
            (Err(ResolveError::InvalidSchema { pointer, message }), Some(diagnostics)) => {
                diagnostics.malformed_schema(&pointer, &message);
                Ok(SchemaNode::Model(ModelSchema::default()))
            }
            (parsed, _) => parsed,
        }
    }

    fn parse(&mut self, value: &Value, pointer: &str) -> Result<SchemaNode> {
        // `true` / `false` are valid JSON Schemas that constrain nothing we classify
        if value.is_boolean() {
            return Ok(SchemaNode::Model(ModelSchema::default()));
        }

        let obj = value
            .as_object()
            .ok_or_else(|| ResolveError::invalid_schema(pointer, "schema must be a JSON object"))?;

        if let Some(ref_value) = obj.get("$ref") {
            let ref_str = ref_value
                .as_str()
                .ok_or_else(|| ResolveError::invalid_schema(pointer, "$ref must be a string"))?;
            return Ok(SchemaNode::reference(ref_str));
        }

        let title = optional_str(value, "title", pointer)?;

        if let Some(all_of) = obj.get("allOf") {
            let all_of = match all_of {
                Value::Null => None,
                Value::Array(items) => Some(
                    items
                        .iter()
                        .enumerate()
                        .map(|(i, item)| self.node(item, &format!("{}/allOf/{}", pointer, i)))
                        .collect::<Result<Vec<_>>>()?,
                ),
                _ => return Err(ResolveError::invalid_schema(pointer, "allOf must be an array")),
            };
            return Ok(SchemaNode::Composed(ComposedSchema { title, all_of }));
        }

        let kind = schema_kind(value, pointer)?;
        if kind.as_deref() == Some("array") || obj.contains_key("items") {
            let items = match obj.get("items") {
                Some(items) => self.node(items, &format!("{}/items", pointer))?,
                None => SchemaNode::Model(ModelSchema::default()),
            };
            return Ok(SchemaNode::Array(ArraySchema {
                title,
                items: Box::new(items),
            }));
        }

        let enum_values = match obj.get("enum") {
            None | Some(Value::Null) => None,
            Some(Value::Array(values)) => Some(values.iter().map(literal_to_string).collect()),
            Some(_) => return Err(ResolveError::invalid_schema(pointer, "enum must be an array")),
        };

        let properties = match obj.get("properties") {
            None | Some(Value::Null) => None,
            Some(Value::Object(props)) => {
                let mut parsed = IndexMap::with_capacity(props.len());
                for (name, prop) in props {
                    let prop_pointer = format!("{}/properties/{}", pointer, name.replace('~', "~0").replace('/', "~1"));
                    parsed.insert(name.clone(), self.node(prop, &prop_pointer)?);
                }
                Some(parsed)
            }
            Some(_) => return Err(ResolveError::invalid_schema(pointer, "properties must be an object")),
        };

        let additional_properties = match obj.get("additionalProperties") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => None,
            // `true` admits any value, which classifies like an untyped schema
            Some(Value::Bool(true)) => Some(Box::new(SchemaNode::Model(ModelSchema::default()))),
            Some(schema) => Some(Box::new(
                self.node(schema, &format!("{}/additionalProperties", pointer))?,
            )),
        };

        // Swagger 2.0 uses a bare property name, OAS 3 an object with `propertyName`
        let discriminator = match obj.get("discriminator") {
            None | Some(Value::Null) => None,
            Some(Value::String(name)) => Some(name.clone()),
            Some(Value::Object(d)) => d.get("propertyName").and_then(Value::as_str).map(String::from),
            Some(_) => {
                return Err(ResolveError::invalid_schema(
                    pointer,
                    "discriminator must be a string or an object",
                ))
            }
        };

        Ok(SchemaNode::Model(ModelSchema {
            kind,
            format: optional_str(value, "format", pointer)?,
            title,
            enum_values,
            properties,
            additional_properties,
            discriminator,
        }))
    }
}

fn optional_str(value: &Value, key: &str, pointer: &str) -> Result<Option<String>> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ResolveError::invalid_schema(pointer, format!("{} must be a string", key))),
    }
}

/// `type` as a string, or the first non-`null` entry of an OAS 3.1 type array
fn schema_kind(value: &Value, pointer: &str) -> Result<Option<String>> {
    match value.get("type") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Array(kinds)) => Ok(kinds
            .iter()
            .filter_map(Value::as_str)
            .find(|kind| *kind != "null")
            .map(String::from)),
        Some(_) => Err(ResolveError::invalid_schema(
            pointer,
            "type must be a string or an array of strings",
        )),
    }
}

fn literal_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Extract named definitions from a Swagger 2.0 (`definitions`) or
/// OpenAPI 3 (`components.schemas`) document.
///
/// Malformed schema nodes degrade to untyped models; the warnings are only
/// emitted through `tracing`. Use [`parse_definitions_with`] to collect them.
pub fn parse_definitions(document: &Value) -> Result<Definitions> {
    parse_definitions_with(document, &mut Diagnostics::new())
}

/// [`parse_definitions`], recording malformed nodes into `diagnostics`
pub fn parse_definitions_with(document: &Value, diagnostics: &mut Diagnostics) -> Result<Definitions> {
    let (section, pointer) = if let Some(defs) = document.get("definitions") {
        (defs, "#/definitions")
    } else if let Some(schemas) = document.get("components").and_then(|c| c.get("schemas")) {
        (schemas, "#/components/schemas")
    } else {
        return Ok(Definitions::new());
    };

    let entries = section
        .as_object()
        .ok_or_else(|| ResolveError::invalid_schema(pointer, "definitions must be an object"))?;

    let mut parser = NodeParser {
        diagnostics: Some(diagnostics),
    };
    let mut definitions = Definitions::with_capacity(entries.len());
    for (name, schema) in entries {
        let node = parser.node(schema, &format!("{}/{}", pointer, name))?;
        definitions.insert(name.clone(), node);
    }
    Ok(definitions)
}

/// Parse a JSON document and extract its definitions
pub fn parse_definitions_str(json: &str) -> Result<Definitions> {
    let document: Value = serde_json::from_str(json)?;
    parse_definitions(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;
    use serde_json::json;

    #[test]
    fn test_ref_wins_over_siblings() {
        let node = SchemaNode::from_json(&json!({
            "$ref": "#/definitions/Pet",
            "allOf": [{"type": "string"}]
        }))
        .unwrap();
        assert_eq!(node, SchemaNode::reference("#/definitions/Pet"));
    }

    #[test]
    fn test_ref_formats() {
        assert_eq!(Reference::new("#/definitions/Pet").format, RefFormat::Internal);
        assert_eq!(Reference::new("Pet").format, RefFormat::Internal);
        assert_eq!(Reference::new("./common.json#/definitions/Id").format, RefFormat::Relative);
        assert_eq!(Reference::new("common.yaml").format, RefFormat::Relative);
        assert_eq!(
            Reference::new("https://example.com/api.json#/definitions/Id").format,
            RefFormat::Url
        );
    }

    #[test]
    fn test_lookup_names() {
        assert_eq!(Reference::new("Pet").lookup_name(), "Pet");
        assert_eq!(Reference::new("Pet").reference, "#/definitions/Pet");
        assert_eq!(Reference::new("#/components/schemas/Pet").lookup_name(), "Pet");
        assert_eq!(
            Reference::new("./common.json#/definitions/Id").lookup_name(),
            "./common.json#/definitions/Id"
        );
    }

    #[test]
    fn test_simple_name_decodes_pointer() {
        let r = Reference::new("#/definitions/User%20Profile~1v2");
        assert_eq!(r.simple_name(), "User Profile/v2");
    }

    #[test]
    fn test_array_without_items_gets_untyped_items() {
        let node = SchemaNode::from_json(&json!({"type": "array"})).unwrap();
        match node {
            SchemaNode::Array(arr) => {
                assert_eq!(*arr.items, SchemaNode::Model(ModelSchema::default()));
            }
            other => panic!("Expected Array, got {:?}", other),
        }
    }

    #[test]
    fn test_null_all_of_is_kept_as_absent() {
        let node = SchemaNode::from_json(&json!({"allOf": null, "title": "Empty"})).unwrap();
        assert_eq!(
            node,
            SchemaNode::Composed(ComposedSchema {
                title: Some("Empty".into()),
                all_of: None,
            })
        );
    }

    #[test]
    fn test_model_fields() {
        let node = SchemaNode::from_json(&json!({
            "type": "object",
            "title": "Pet",
            "discriminator": {"propertyName": "petType"},
            "properties": {
                "name": {"type": "string"},
                "age": {"type": "integer", "format": "int32"}
            }
        }))
        .unwrap();

        let SchemaNode::Model(model) = node else {
            panic!("Expected Model");
        };
        assert_eq!(model.discriminator.as_deref(), Some("petType"));
        let names: Vec<_> = model.properties.unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["name", "age"]);
    }

    #[test]
    fn test_enum_literals_are_stringified() {
        let node = SchemaNode::from_json(&json!({"enum": ["a", 1, true]})).unwrap();
        let SchemaNode::Model(model) = node else {
            panic!("Expected Model");
        };
        assert_eq!(model.enum_values.unwrap(), vec!["a", "1", "true"]);
    }

    #[test]
    fn test_additional_properties_forms() {
        let open = SchemaNode::from_json(&json!({"additionalProperties": true})).unwrap();
        let closed = SchemaNode::from_json(&json!({"additionalProperties": false})).unwrap();
        let SchemaNode::Model(open) = open else { panic!() };
        let SchemaNode::Model(closed) = closed else { panic!() };
        assert!(open.additional_properties.is_some());
        assert!(closed.additional_properties.is_none());
    }

    #[test]
    fn test_malformed_shape_reports_pointer() {
        let err = SchemaNode::from_json(&json!({
            "properties": {"tags": {"allOf": "nope"}}
        }))
        .unwrap_err();
        match err {
            ResolveError::InvalidSchema { pointer, .. } => {
                assert_eq!(pointer, "#/properties/tags");
            }
            other => panic!("Expected InvalidSchema, got {:?}", other),
        }
    }

    #[test]
    fn test_type_array_takes_first_non_null() {
        let node = SchemaNode::from_json(&json!({"type": ["null", "string"], "format": "uuid"})).unwrap();
        let SchemaNode::Model(model) = node else { panic!("Expected Model") };
        assert_eq!(model.kind.as_deref(), Some("string"));

        let node = SchemaNode::from_json(&json!({"type": ["array", "null"], "items": {"type": "integer"}})).unwrap();
        assert!(matches!(node, SchemaNode::Array(_)));

        let node = SchemaNode::from_json(&json!({"type": ["null"]})).unwrap();
        assert_eq!(node, SchemaNode::Model(ModelSchema::default()));
    }

    #[test]
    fn test_boolean_schemas_are_untyped() {
        let node = SchemaNode::from_json(&json!({
            "properties": {"anything": true, "nothing": false},
            "items": true
        }))
        .unwrap();
        let SchemaNode::Array(array) = node else { panic!("Expected Array") };
        assert_eq!(*array.items, SchemaNode::Model(ModelSchema::default()));

        let node = SchemaNode::from_json(&json!({"properties": {"anything": true}})).unwrap();
        let SchemaNode::Model(model) = node else { panic!("Expected Model") };
        assert_eq!(model.properties.unwrap()["anything"], SchemaNode::Model(ModelSchema::default()));
    }

    #[test]
    fn test_malformed_node_degrades_locally() {
        let document = json!({
            "openapi": "3.1.0",
            "components": {
                "schemas": {
                    "Pet": {
                        "properties": {
                            "name": {"type": ["string", "null"]},
                            "age": {"type": 7},
                            "owner": {"$ref": 42}
                        }
                    },
                    "Tag": {"type": "string"}
                }
            }
        });
        let mut diagnostics = Diagnostics::new();
        let defs = parse_definitions_with(&document, &mut diagnostics).unwrap();

        assert_eq!(defs["Tag"], SchemaNode::Model(ModelSchema::with_kind("string")));
        let SchemaNode::Model(pet) = &defs["Pet"] else { panic!("Expected Model") };
        let props = pet.properties.as_ref().unwrap();
        assert_eq!(props["name"], SchemaNode::Model(ModelSchema::with_kind("string")));
        assert_eq!(props["age"], SchemaNode::Model(ModelSchema::default()));
        assert_eq!(props["owner"], SchemaNode::Model(ModelSchema::default()));

        assert_eq!(diagnostics.count(DiagnosticCode::MalformedSchema), 2);
        assert_eq!(diagnostics.all()[0].subject, "#/components/schemas/Pet/properties/age");
    }

    #[test]
    fn test_parse_definitions_swagger_and_oas3() {
        let swagger = json!({"definitions": {"B": {"type": "string"}, "A": {"type": "integer"}}});
        let defs = parse_definitions(&swagger).unwrap();
        assert_eq!(defs.keys().collect::<Vec<_>>(), vec!["B", "A"]);

        let oas3 = json!({"components": {"schemas": {"Pet": {"type": "object"}}}});
        assert!(parse_definitions(&oas3).unwrap().contains_key("Pet"));

        assert!(parse_definitions(&json!({"paths": {}})).unwrap().is_empty());
    }
}
