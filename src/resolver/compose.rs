//! `allOf` Composition
//!
//! Components are resolved in declaration order and merged into one object.
//! Later components overwrite same-named properties of earlier ones, and the
//! composed object takes the name of the last component.

use indexmap::IndexMap;

use super::Resolver;
use crate::error::Result;
use crate::schema::ComposedSchema;
use crate::types::{Nature, ObjectType, Polymorphism, Type};

impl<'a> Resolver<'a> {
    /// Resolve an `allOf` composition into a single object
    pub fn resolve_composed(&mut self, composed: &ComposedSchema) -> Result<ObjectType> {
        self.compose(composed, None)
    }

    pub(super) fn compose(&mut self, composed: &ComposedSchema, name: Option<&str>) -> Result<ObjectType> {
        let mut properties = IndexMap::new();
        let mut polymorphism = Polymorphism::default();
        let mut result_name = composed.title.clone();

        let components = composed.all_of.as_deref().unwrap_or_default();
        if !components.is_empty() {
            polymorphism.nature = Nature::Composition;
        }

        for component in components {
            let resolved = self.resolve_node(component, None)?;
            let concrete = self.into_concrete(resolved);

            // Overwritten every round: the last component names the result
            result_name = concrete.name().map(String::from);

            if let Type::Object(object) = concrete {
                if let Some(discriminator) = object.polymorphism.discriminator {
                    polymorphism.nature = Nature::Inheritance;
                    polymorphism.discriminator = Some(discriminator);
                }
                properties.extend(object.properties);
            }
        }

        let name = name.map(String::from).or(result_name);
        Ok(ObjectType::new(name, polymorphism, properties))
    }
}
