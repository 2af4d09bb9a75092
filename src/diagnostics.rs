//! Diagnostics
//!
//! Collects the non-fatal events emitted while resolving: degraded results
//! (malformed schemas, missing type or title, unresolved or cyclic references) and trace
//! events for classification and dereference steps. Every item is mirrored
//! to `tracing`; nothing recorded here feeds back into resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Basic schema has no `type`; defaulted to `object`
    MissingType,
    /// Basic schema has no `title`; defaulted to `-inline`
    MissingTitle,
    /// `$ref` target not found in definitions
    UnresolvedRef,
    /// `$ref` to a cyclic definition that is being, or was already, expanded
    ReferenceCycle,
    /// Schema node could not be read; parsed as an untyped model
    MalformedSchema,
    /// One step through a reference wrapper
    Dereference,
    /// A schema node is being classified
    Classify,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingType => "W001",
            Self::MissingTitle => "W002",
            Self::UnresolvedRef => "W003",
            Self::ReferenceCycle => "W004",
            Self::MalformedSchema => "W005",
            Self::Dereference => "T001",
            Self::Classify => "T002",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingType
            | Self::MissingTitle
            | Self::UnresolvedRef
            | Self::ReferenceCycle
            | Self::MalformedSchema => Severity::Warning,

            Self::Dereference | Self::Classify => Severity::Trace,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Trace,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Definition or reference the event is about
    pub subject: String,
    pub code: DiagnosticCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(subject: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.subject
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one resolver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
    /// Store trace items too, not only emit them
    #[serde(skip)]
    record_traces: bool,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector that also keeps trace events
    pub fn with_traces() -> Self {
        Self {
            items: Vec::new(),
            record_traces: true,
        }
    }

    /// Add a diagnostic item
    pub fn push(&mut self, item: DiagnosticItem) {
        match item.severity() {
            Severity::Trace => {
                tracing::trace!(code = %item.code, subject = %item.subject, "{}", item.message);
                if !self.record_traces {
                    return;
                }
            }
            Severity::Warning => {
                tracing::warn!(code = %item.code, subject = %item.subject, "{}", item.message);
            }
        }
        self.items.push(item);
    }

    pub fn warning(&mut self, subject: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) {
        self.push(DiagnosticItem::new(subject, code, message));
    }

    pub fn trace(&mut self, subject: impl Into<String>, code: DiagnosticCode, message: impl Into<String>) {
        self.push(DiagnosticItem::new(subject, code, message));
    }

    /// Add diagnostic for unresolved ref
    pub fn unresolved_ref(&mut self, ref_name: &str, reference: &str) {
        self.push(DiagnosticItem::new(
            ref_name,
            DiagnosticCode::UnresolvedRef,
            format!("$ref target '{}' not found in definitions", reference),
        ));
    }

    /// Add diagnostic for a reference cycle broken with a placeholder
    pub fn reference_cycle(&mut self, ref_name: &str, path: &[String]) {
        self.push(
            DiagnosticItem::new(
                ref_name,
                DiagnosticCode::ReferenceCycle,
                format!("'{}' is part of a reference cycle; expansion stopped", ref_name),
            )
            .with_context(format!("Path: {} -> {}", path.join(" -> "), ref_name)),
        );
    }

    /// Add diagnostic for a schema node that was replaced by an untyped model
    pub fn malformed_schema(&mut self, pointer: &str, message: &str) {
        self.push(
            DiagnosticItem::new(
                pointer,
                DiagnosticCode::MalformedSchema,
                "Malformed schema read as an untyped model",
            )
            .with_context(message),
        );
    }

    pub fn has_warnings(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Warning)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    /// Number of recorded events with this code
    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.items.iter().filter(|i| i.code == code).count()
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Merge another Diagnostics into this one
    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Format warnings for display, followed by a count
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in self.warnings() {
            output.push_str(&format!("{}\n", item));
        }

        if self.has_warnings() {
            output.push_str(&format!("\n{} warning(s)\n", self.warning_count()));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}
