mod codec;
mod entity;
mod field;
mod key;
mod udt;

pub use self::codec::*;
pub use self::entity::*;
pub use self::field::*;
pub use self::key::*;
pub use self::udt::*;
