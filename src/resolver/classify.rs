//! Plain Schema Classification
//!
//! Decides which type a non-composed, non-reference schema represents.
//! First match wins: map, enum, object, basic.

use indexmap::IndexMap;

use super::Resolver;
use crate::diagnostics::DiagnosticCode;
use crate::error::Result;
use crate::schema::ModelSchema;
use crate::types::{Nature, ObjectType, Polymorphism, Type};

/// Kind given to a basic schema that declares no `type`
pub const DEFAULT_KIND: &str = "object";

/// Name given to a basic schema that declares no `title`
pub const INLINE_TITLE: &str = "-inline";

impl<'a> Resolver<'a> {
    /// Classify a plain schema node
    pub fn classify(&mut self, model: &ModelSchema) -> Result<Type> {
        self.classify_model(model, None)
    }

    pub(super) fn classify_model(&mut self, model: &ModelSchema, name: Option<&str>) -> Result<Type> {
        let title = name.map(String::from).or_else(|| model.title.clone());

        if let Some(additional) = &model.additional_properties {
            let value = self.resolve_node(additional, None)?;
            return Ok(Type::map(title, value));
        }

        if let Some(values) = &model.enum_values {
            return Ok(Type::enumeration(title, values.clone()));
        }

        if let Some(props) = &model.properties {
            let mut properties = IndexMap::with_capacity(props.len());
            for (prop_name, prop) in props {
                properties.insert(prop_name.clone(), self.resolve_node(prop, None)?);
            }
            // A lone discriminator is recorded, but only a merge makes it inheritance
            let polymorphism = Polymorphism::new(Nature::None, model.discriminator.clone());
            return Ok(ObjectType::new(title, polymorphism, properties).into());
        }

        let kind = match &model.kind {
            Some(kind) => kind.clone(),
            None => {
                self.diagnostics.warning(
                    title.as_deref().unwrap_or(INLINE_TITLE),
                    DiagnosticCode::MissingType,
                    "Basic type has no type",
                );
                DEFAULT_KIND.to_string()
            }
        };

        let title = match title {
            Some(title) => title,
            None => {
                self.diagnostics.warning(
                    INLINE_TITLE,
                    DiagnosticCode::MissingTitle,
                    format!("Basic type '{}' has no title", kind),
                );
                INLINE_TITLE.to_string()
            }
        };

        Ok(Type::basic(kind, Some(title), model.format.clone()))
    }
}
