//! The registration class model: what runtime reflection would discover,
//! declared explicitly once per type.

mod class;
mod declared;
mod member;

pub use class::{ClassLevel, ClassShape, ClassShapeBuilder, Mirrored};
pub use declared::{ClassId, DeclaredType};
pub use member::{FieldShape, MethodShape, Visibility};
