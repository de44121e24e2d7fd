//! Compilation driver: one round per invocation. A round discovers every
//! annotated declaration, builds all entity metadata against a fresh
//! parsing context, aggregates diagnostics across entities, and emits
//! artifacts only when the whole round is error-free. No state survives
//! across rounds.

pub mod discover;
mod emit;

pub use emit::{Artifact, Artifacts};

use strata_schema::{build::build_entity, context::GlobalParsingContext, diagnostic::Diagnostics};
use thiserror::Error as ThisError;

///
/// CompileError
///

#[derive(Debug, ThisError)]
pub enum CompileError {
    #[error("failed to parse input declarations: {0}")]
    Parse(#[from] syn::Error),

    #[error("compilation round failed with {n} diagnostic(s):\n{diags}", n = .0.len(), diags = .0)]
    Invalid(Diagnostics),
}

impl CompileError {
    /// The round's diagnostics, if the failure was a validation one.
    #[must_use]
    pub const fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            Self::Invalid(diagnostics) => Some(diagnostics),
            Self::Parse(_) => None,
        }
    }
}

/// Compile one round from source text.
pub fn compile_source(source: &str) -> Result<Artifacts, CompileError> {
    let file = syn::parse_file(source)?;
    compile_file(&file)
}

/// Compile one round from a parsed file. Entities may be declared in any
/// order; cross-entity references are deferred and backfilled before
/// emission, so correctness does not depend on declaration order.
pub fn compile_file(file: &syn::File) -> Result<Artifacts, CompileError> {
    let mut ctx = GlobalParsingContext::new();
    let mut errs = Diagnostics::new();

    let defs = discover::discover(file, &mut ctx, &mut errs);

    let mut signatures = Vec::new();
    for def in &defs {
        match build_entity(def, &mut ctx) {
            Ok(signature) => signatures.push(signature),
            Err(diagnostics) => errs.merge(diagnostics),
        }
    }

    // All-or-nothing: no partial artifacts for a failed round.
    if !errs.is_empty() {
        return Err(CompileError::Invalid(errs));
    }

    emit::emit(&ctx, &mut signatures).map_err(CompileError::Invalid)
}
