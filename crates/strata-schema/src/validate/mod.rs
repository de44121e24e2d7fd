//! Field-level validation: annotation compatibility matrices and key
//! ordinal checks. Each validator appends to the caller's diagnostics
//! rather than failing on the first finding.

pub mod compat;
pub mod keys;
