//! Schema Resolution
//!
//! Turns [`SchemaNode`]s into resolved [`Type`] trees:
//! - **classify**: plain schemas (map, enum, object, basic)
//! - **compose**: `allOf` merging and polymorphism inference
//! - **cycles**: which definitions sit on a `$ref` cycle
//! - this module: dispatch, `$ref` expansion and cycle handling
//!
//! A [`Resolver`] borrows the definitions and locator for its lifetime and
//! owns the diagnostics it collects. Independent definitions may be resolved
//! on separate threads with one resolver each.

mod classify;
mod compose;
mod cycles;

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::config::{CyclePolicy, ResolverConfig};
use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::error::{ResolveError, Result};
use crate::locator::DocumentLocator;
use crate::schema::{Definitions, Reference, SchemaNode};
use crate::types::{ObjectType, Type};

pub use classify::{DEFAULT_KIND, INLINE_TITLE};

/// Resolves schema nodes against a fixed set of definitions
pub struct Resolver<'a> {
    definitions: &'a Definitions,
    locator: &'a dyn DocumentLocator,
    config: ResolverConfig,
    diagnostics: Diagnostics,
    /// Reference names currently being expanded, outermost first
    ref_path: Vec<String>,
    /// Definitions that can reach themselves through `$ref`s
    cyclic: HashSet<String>,
    /// Cyclic definitions already expanded in the current top-level call
    expanded: HashSet<String>,
}

impl<'a> Resolver<'a> {
    pub fn new(definitions: &'a Definitions, locator: &'a dyn DocumentLocator) -> Self {
        Self::with_config(definitions, locator, ResolverConfig::default())
    }

    pub fn with_config(
        definitions: &'a Definitions,
        locator: &'a dyn DocumentLocator,
        config: ResolverConfig,
    ) -> Self {
        let diagnostics = if config.record_traces {
            Diagnostics::with_traces()
        } else {
            Diagnostics::new()
        };
        Self {
            definitions,
            locator,
            config,
            diagnostics,
            ref_path: Vec::new(),
            cyclic: cycles::cyclic_definitions(definitions),
            expanded: HashSet::new(),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Resolve a schema node.
    ///
    /// `None` is a caller error and fails with [`ResolveError::InvalidArgument`].
    pub fn resolve(&mut self, model: Option<&SchemaNode>) -> Result<Type> {
        let model = model.ok_or_else(|| ResolveError::InvalidArgument("model must not be null".to_string()))?;
        self.expanded.clear();
        self.resolve_node(model, None)
    }

    /// Resolve a definition under its own name
    pub fn resolve_named(&mut self, name: &str, model: &SchemaNode) -> Result<Type> {
        if self.ref_path.is_empty() {
            self.expanded.clear();
        }
        self.ref_path.push(name.to_string());
        let result = self.resolve_node(model, Some(name));
        self.ref_path.pop();
        result
    }

    /// Resolve every definition, in declaration order
    pub fn resolve_all(&mut self) -> Result<IndexMap<String, Type>> {
        let definitions = self.definitions;
        let mut resolved = IndexMap::with_capacity(definitions.len());
        for (name, model) in definitions {
            let ty = self.resolve_named(name, model)?;
            resolved.insert(name.clone(), ty);
        }
        Ok(resolved)
    }

    /// Follow reference wrappers down to the concrete type, recording each step
    pub fn resolve_reference<'t>(&mut self, ty: Option<&'t Type>) -> Option<&'t Type> {
        let mut current = ty?;
        while let Type::Ref(r) = current {
            self.trace_dereference(current);
            current = &r.target;
        }
        Some(current)
    }

    /// Owned counterpart of [`Self::resolve_reference`]
    fn into_concrete(&mut self, mut ty: Type) -> Type {
        while ty.is_ref() {
            self.trace_dereference(&ty);
            if let Type::Ref(r) = ty {
                ty = *r.target;
            }
        }
        ty
    }

    fn trace_dereference(&mut self, ty: &Type) {
        let name = ty.name().unwrap_or("-");
        self.diagnostics.trace(
            name,
            DiagnosticCode::Dereference,
            format!("Resolving type {}: {}", name, ty),
        );
    }

    /// Dispatch on the node shape. `name`, when given, is the name the node
    /// is being resolved under and overrides anything the node declares.
    pub(crate) fn resolve_node(&mut self, node: &SchemaNode, name: Option<&str>) -> Result<Type> {
        let subject = name.or_else(|| node.title()).unwrap_or(INLINE_TITLE);
        self.diagnostics.trace(
            subject,
            DiagnosticCode::Classify,
            format!("Getting type of {} model", shape_label(node)),
        );

        match node {
            SchemaNode::Composed(composed) => {
                Ok(Type::Object(self.compose(composed, name)?))
            }
            SchemaNode::Array(array) => {
                let items = self.resolve_node(&array.items, None)?;
                Ok(Type::array(name.map(String::from), items))
            }
            SchemaNode::Reference(reference) => {
                let resolved = self.resolve_ref(reference)?;
                Ok(match name {
                    Some(name) => resolved.with_name(name),
                    None => resolved,
                })
            }
            SchemaNode::Model(model) => self.classify_model(model, name),
        }
    }

    fn resolve_ref(&mut self, reference: &Reference) -> Result<Type> {
        let ref_name = reference.lookup_name();
        let locator = self.locator.locate(&ref_name);

        // Within one top-level call a cyclic definition is expanded once;
        // later occurrences are cut like a direct cycle
        if self.ref_path.contains(&ref_name) || self.expanded.contains(&ref_name) {
            return match self.config.cycle_policy {
                CyclePolicy::Break => {
                    self.diagnostics.reference_cycle(&ref_name, &self.ref_path);
                    Ok(Type::reference(locator, ObjectType::placeholder(ref_name).into()))
                }
                CyclePolicy::Fail => {
                    let mut path = self.ref_path.clone();
                    path.push(ref_name);
                    Err(ResolveError::ReferenceCycle { path })
                }
            };
        }

        let definitions = self.definitions;
        let target = match definitions.get(&ref_name) {
            Some(definition) => {
                if self.config.cycle_policy == CyclePolicy::Break && self.cyclic.contains(&ref_name) {
                    self.expanded.insert(ref_name.clone());
                }
                self.resolve_named(&ref_name, definition)?
            }
            None => {
                self.diagnostics.unresolved_ref(&ref_name, &reference.reference);
                ObjectType::placeholder(ref_name).into()
            }
        };

        Ok(Type::reference(locator, target))
    }
}

fn shape_label(node: &SchemaNode) -> &'static str {
    match node {
        SchemaNode::Reference(_) => "reference",
        SchemaNode::Composed(_) => "composed",
        SchemaNode::Array(_) => "array",
        SchemaNode::Model(_) => "plain",
    }
}

/// Resolve one schema node against `definitions`.
///
/// Diagnostics are emitted through `tracing` only; use a [`Resolver`] to
/// collect them.
pub fn resolve(
    model: Option<&SchemaNode>,
    definitions: &Definitions,
    locator: &dyn DocumentLocator,
) -> Result<Type> {
    Resolver::new(definitions, locator).resolve(model)
}
