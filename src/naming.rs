//! Bean-name derivation and field-descriptor construction.

use crate::annotations::{AnnotationSet, FieldOptions};
use crate::descriptor::FieldDescriptor;
use crate::error::EncodingError;
use crate::shape::{DeclaredType, FieldShape, MethodShape, Visibility};
use crate::token::PrimitiveKind;

/// Lowercases the first character of a derived bean name.
fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns the name override from [`FieldOptions`], if one is declared.
fn override_name(annotations: &AnnotationSet) -> Option<&'static str> {
    annotations
        .get::<FieldOptions>()
        .filter(|opts| !opts.name.is_empty())
        .map(|opts| opts.name)
}

/// Derives the logical field name of a classified setter: `setFoo` becomes
/// `foo`.
///
/// A name without a `set` prefix is a registration error, reported even when
/// an override name is present.
pub fn setter_field_name(method: &MethodShape) -> Result<String, EncodingError> {
    let suffix = method
        .name()
        .strip_prefix("set")
        .filter(|s| !s.is_empty())
        .ok_or(EncodingError::UnknownBeanPrefix {
            method: method.name(),
        })?;
    Ok(lower_first(suffix))
}

/// Returns the decoding key of a classified setter: the override name if
/// declared, otherwise the derived bean name.
///
/// The bean name is derived first, so a malformed setter name errors even
/// when the override would have hidden it.
pub fn setter_decoding_key(method: &MethodShape) -> Result<String, EncodingError> {
    let derived = setter_field_name(method)?;
    Ok(match override_name(method.annotations()) {
        Some(name) => name.to_owned(),
        None => derived,
    })
}

/// Returns the decoding key of a classified field: the override name if
/// declared, otherwise the declared field name.
pub fn field_decoding_key(field: &FieldShape) -> String {
    match override_name(field.annotations()) {
        Some(name) => name.to_owned(),
        None => field.name().to_owned(),
    }
}

/// Derives the encoded field name of a method, or `None` if the method is
/// not a bean getter.
///
/// A getter is a public, non-static, zero-parameter, non-void method not
/// declared on the universal base type. Its name must start with `get`, or
/// with `is` when the return type is the boolean primitive; an override name
/// takes precedence over both prefixes.
pub fn getter_name(method: &MethodShape) -> Option<String> {
    if method.is_from_universal_base()
        || method.visibility() != Visibility::Public
        || method.is_static()
        || method.param_len() != 0
        || method.return_type().is_none()
    {
        return None;
    }
    if let Some(name) = override_name(method.annotations()) {
        return Some(name.to_owned());
    }
    let name = method.name();
    if let Some(suffix) = name.strip_prefix("get").filter(|s| !s.is_empty()) {
        return Some(lower_first(suffix));
    }
    if method.return_type().and_then(DeclaredType::primitive_kind)
        == Some(PrimitiveKind::Boolean)
        && let Some(suffix) = name.strip_prefix("is").filter(|s| !s.is_empty())
    {
        return Some(lower_first(suffix));
    }
    None
}

/// Builds the descriptor of one plan field: the decoding key plus every
/// extra-property annotation on the member whose allow-list permits the
/// member's declared value type.
pub fn build_field_descriptor(
    key: &str,
    annotations: &AnnotationSet,
    value_type: &DeclaredType,
) -> FieldDescriptor {
    let raw = value_type.raw();
    let mut builder = FieldDescriptor::builder(key);
    for entry in annotations.entries() {
        if entry.extra().is_some_and(|spec| spec.permits(raw)) {
            builder = builder.with_property_entry(entry.clone());
        }
    }
    builder.build()
}
