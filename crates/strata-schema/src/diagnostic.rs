use derive_more::Display;
use serde::Serialize;
use std::fmt;

///
/// DiagnosticKind
///
/// Compile-round error taxonomy. Every diagnostic is deterministic given the
/// input; nothing in the compiler is retried.
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
#[remain::sorted]
pub enum DiagnosticKind {
    /// Codec reference with the wrong number of type parameters.
    #[display("arity")]
    Arity,
    /// Illegal annotation combination.
    #[display("configuration")]
    Configuration,
    /// Unresolved cross-entity or user-defined-type reference.
    #[display("reference")]
    Reference,
    /// No persistent fields, no partition key, invalid key ordering, or an
    /// identifier over the schema length caps.
    #[display("structural")]
    Structural,
    /// Unsupported or mismatched persisted type.
    #[display("type")]
    Type,
}

///
/// Diagnostic
///
/// One failure bound to the originating class and (optionally) field, so a
/// hosting toolchain can attribute it to a source location.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub class: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        class: impl Into<String>,
        field: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            class: class.into(),
            field: field.map(ToString::to_string),
            message: message.into(),
        }
    }

    pub fn configuration(class: &str, field: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Configuration, class, Some(field), message)
    }

    pub fn type_error(class: &str, field: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Type, class, Some(field), message)
    }

    pub fn arity(class: &str, field: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Arity, class, Some(field), message)
    }

    pub fn structural(class: &str, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Structural, class, None, message)
    }

    pub fn reference(class: &str, field: Option<&str>, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Reference, class, field, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(
                f,
                "{} error: field '{}' of class '{}': {}",
                self.kind, field, self.class, self.message
            ),
            None => write!(f, "{} error: class '{}': {}", self.kind, self.class, self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

///
/// Diagnostics
///
/// Round-level aggregation. Individual fields and entities fail fast, but a
/// round collects everything before reporting, maximizing diagnostic yield.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn merge(&mut self, other: Self) {
        self.items.extend(other.items);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Ok iff the round produced no diagnostics.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Export for host toolchains.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.items)
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            items: vec![diagnostic],
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
