//! Schema Type Resolver
//!
//! Normalizes the named schema definitions of a Swagger / OpenAPI document
//! into a render-agnostic type tree: `$ref` chains are expanded, `allOf`
//! compositions are merged, polymorphism and discriminators are inferred, and
//! every definition is classified as an object, array, map, enum or basic type.
//!
//! ## Architecture
//!
//! ```text
//! JSON ──parse──▶ SchemaNode ──Resolver──▶ Type ──▶ renderer
//!                 (schema)     (resolver)   (types)
//!                                 │
//!                                 ├── DocumentLocator (locator)
//!                                 └── Diagnostics     (diagnostics)
//! ```
//!
//! ## Example
//!
//! ```
//! use schema_resolver::{parse_definitions_str, InlineLocator, Resolver};
//!
//! let definitions = parse_definitions_str(r##"{
//!     "definitions": {
//!         "Pet": {"properties": {"name": {"type": "string"}}},
//!         "Cat": {"allOf": [{"$ref": "#/definitions/Pet"}]}
//!     }
//! }"##).unwrap();
//!
//! let locator = InlineLocator::new("definitions-");
//! let mut resolver = Resolver::new(&definitions, &locator);
//! let types = resolver.resolve_all().unwrap();
//! assert!(types["Cat"].as_object().unwrap().properties.contains_key("name"));
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod locator;
pub mod resolver;
pub mod schema;
pub mod types;

pub use config::{CyclePolicy, LocatorConfig, LocatorMode, ResolverConfig};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use error::{ResolveError, Result};
pub use locator::{normalize_name, DocumentLocator, InlineLocator, SeparateFileLocator};
pub use resolver::{resolve, Resolver, DEFAULT_KIND, INLINE_TITLE};
pub use schema::{
    parse_definitions, parse_definitions_str, parse_definitions_with, ArraySchema,
    ComposedSchema, Definitions, ModelSchema, RefFormat, Reference, SchemaNode,
};
pub use types::{
    resolve_reference, ArrayType, BasicType, EnumType, MapType, Nature, ObjectType, Polymorphism,
    RefType, Type,
};
