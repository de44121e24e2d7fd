pub mod build;
pub mod context;
pub mod diagnostic;
pub mod node;
pub mod resolve;
pub mod types;
pub mod validate;

/// Maximum length for entity and user-defined-type identifiers.
pub const MAX_ENTITY_NAME_LEN: usize = 48;

/// Maximum length for field identifiers.
pub const MAX_FIELD_NAME_LEN: usize = 48;
