//! Member classification: which declared members participate in plans.

use crate::annotations::Ignore;
use crate::shape::{FieldShape, MethodShape, Visibility};

/// Check if a declared method counts as a bean setter.
///
/// The name must start with `set` and carry a non-empty suffix; the method
/// must be a non-static, single-parameter void method not declared on the
/// universal base type and not marked [`Ignore`]. Visibility is deliberately
/// not checked, so non-public setters still participate.
pub fn should_include_setter(method: &MethodShape) -> bool {
    method.name().starts_with("set")
        && method.name().len() > 3
        && !method.is_from_universal_base()
        && !method.is_static()
        && method.return_type().is_none()
        && method.param_len() == 1
        && !method.annotations().contains::<Ignore>()
}

/// Check if a declared field participates in plans.
///
/// The field must be public, non-static, non-transient, not declared on the
/// universal base type, and not marked [`Ignore`].
pub fn should_include_field(field: &FieldShape) -> bool {
    !field.is_from_universal_base()
        && field.visibility() == Visibility::Public
        && !field.is_static()
        && !field.is_transient()
        && !field.annotations().contains::<Ignore>()
}
