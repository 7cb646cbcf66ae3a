use core::any::{Any, TypeId};
use core::fmt;
use std::sync::Arc;

use crate::token::{PrimitiveKind, RawType};

// -----------------------------------------------------------------------------
// Annotation

/// A typed metadata tag attachable to a class member.
///
/// Annotations have no behavior of their own; the plans carry them along so
/// that downstream wire writers can interpret them. An annotation type may
/// additionally declare itself an *extra property* by returning a spec from
/// [`extra_property`](Annotation::extra_property) — only such annotations are
/// copied from a member onto its [`FieldDescriptor`](crate::FieldDescriptor).
///
/// # Examples
///
/// ```
/// use objbind::{Annotation, ExtraPropertySpec};
///
/// /// Tells the wire writer to encode the field as an enum ordinal.
/// #[derive(Debug, Clone, Copy)]
/// struct AsOrdinal;
///
/// impl Annotation for AsOrdinal {
///     fn extra_property() -> Option<ExtraPropertySpec> {
///         Some(ExtraPropertySpec::new().allow::<String>())
///     }
/// }
/// ```
pub trait Annotation: Any + Send + Sync + fmt::Debug {
    /// Declares this annotation type as an extra property, optionally
    /// restricted to an allow-list of member value types.
    ///
    /// The default is `None`: the annotation stays on the member and never
    /// travels with the descriptor.
    fn extra_property() -> Option<ExtraPropertySpec>
    where
        Self: Sized,
    {
        None
    }
}

// -----------------------------------------------------------------------------
// ExtraPropertySpec

/// Declares that an annotation type carries cross-cutting metadata, gated by
/// an allow-list of permitted member value types.
///
/// An empty allow-list permits every value type.
#[derive(Clone, Debug, Default)]
pub struct ExtraPropertySpec {
    allowed: Vec<RawType>,
}

impl ExtraPropertySpec {
    /// Creates an unrestricted spec.
    #[inline]
    pub const fn new() -> Self {
        Self {
            allowed: Vec::new(),
        }
    }

    /// Permits members whose declared value type is the class type `T`.
    #[inline]
    pub fn allow<T: Any>(mut self) -> Self {
        self.allowed.push(RawType::of::<T>());
        self
    }

    /// Permits members declared with the given primitive kind.
    #[inline]
    pub fn allow_primitive(mut self, kind: PrimitiveKind) -> Self {
        self.allowed.push(RawType::Primitive(kind));
        self
    }

    /// Returns `true` if a member with the given raw value type may carry
    /// the annotation.
    ///
    /// Members whose declared type has no raw identity (arrays, unresolved
    /// type variables) only pass an empty allow-list.
    pub fn permits(&self, raw: Option<RawType>) -> bool {
        self.allowed.is_empty() || raw.is_some_and(|r| self.allowed.contains(&r))
    }
}

// -----------------------------------------------------------------------------
// AnnotationSet

/// One stored annotation plus the extra-property spec its type declared.
///
/// The spec is captured when the annotation is inserted, since it cannot be
/// recovered later from the erased value.
#[derive(Clone)]
pub(crate) struct AnnotationEntry {
    value: Arc<dyn Annotation>,
    extra: Option<ExtraPropertySpec>,
}

impl AnnotationEntry {
    #[inline]
    pub(crate) fn type_id(&self) -> TypeId {
        (*self.value).type_id()
    }

    #[inline]
    pub(crate) fn value(&self) -> &dyn Annotation {
        &*self.value
    }

    #[inline]
    pub(crate) fn extra(&self) -> Option<&ExtraPropertySpec> {
        self.extra.as_ref()
    }
}

/// A collection of annotations for a member or a field descriptor.
///
/// Annotations are stored by their concrete type; there can only be one
/// annotation per type. Values are reference-counted so that attaching a
/// member's annotation to a descriptor shares rather than clones it.
///
/// # Examples
///
/// ```
/// use objbind::{AnnotationSet, FieldOptions, Ignore};
///
/// let set = AnnotationSet::new()
///     .with(FieldOptions::named("renamed"))
///     .with(Ignore);
///
/// assert_eq!(set.len(), 2);
/// assert!(set.contains::<Ignore>());
/// assert_eq!(set.get::<FieldOptions>().unwrap().name, "renamed");
/// ```
#[derive(Clone, Default)]
pub struct AnnotationSet {
    entries: Vec<AnnotationEntry>,
}

impl AnnotationSet {
    /// A static reference to an empty set, so accessors never need to hand
    /// out `Option<&AnnotationSet>`.
    pub(crate) const EMPTY: &'static Self = &Self::new();

    /// Creates an empty set.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds an annotation, consuming and returning the set.
    #[inline]
    pub fn with<A: Annotation>(mut self, value: A) -> Self {
        self.insert(value);
        self
    }

    /// Adds an annotation. A later insertion of the same type replaces the
    /// earlier value.
    pub fn insert<A: Annotation>(&mut self, value: A) {
        self.insert_entry(AnnotationEntry {
            value: Arc::new(value),
            extra: A::extra_property(),
        });
    }

    pub(crate) fn insert_entry(&mut self, entry: AnnotationEntry) {
        self.entries.retain(|e| e.type_id() != entry.type_id());
        self.entries.push(entry);
    }

    /// Returns the annotation of type `A`, if present.
    pub fn get<A: Annotation>(&self) -> Option<&A> {
        self.entries.iter().find_map(|e| {
            let any: &dyn Any = e.value();
            any.downcast_ref::<A>()
        })
    }

    /// Returns `true` if an annotation of type `A` is present.
    #[inline]
    pub fn contains<A: Annotation>(&self) -> bool {
        let id = TypeId::of::<A>();
        self.entries.iter().any(|e| e.type_id() == id)
    }

    /// Returns an iterator over the stored annotations.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &dyn Annotation> {
        self.entries.iter().map(AnnotationEntry::value)
    }

    #[inline]
    pub(crate) fn entries(&self) -> impl Iterator<Item = &AnnotationEntry> {
        self.entries.iter()
    }

    /// Returns the number of stored annotations.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no annotations are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for AnnotationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// Built-in member annotations

/// Per-member encoding options: an override name and/or inline decoding.
///
/// An empty `name` means "use the derived bean name"; a non-empty one
/// overrides the derived name unconditionally. `inline` merges the member's
/// sub-object into the parent encoding rather than nesting it under its own
/// key, and is only legal on members declared as a single registered class.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FieldOptions {
    pub name: &'static str,
    pub inline: bool,
}

impl FieldOptions {
    /// Options with no override and no inlining.
    #[inline]
    pub const fn new() -> Self {
        Self {
            name: "",
            inline: false,
        }
    }

    /// Options overriding the derived field name.
    #[inline]
    pub const fn named(name: &'static str) -> Self {
        Self {
            name,
            inline: false,
        }
    }

    /// Options opting the member into inline decoding.
    #[inline]
    pub const fn inline() -> Self {
        Self {
            name: "",
            inline: true,
        }
    }
}

impl Annotation for FieldOptions {}

/// Excludes a member from both plans entirely.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Ignore;

impl Annotation for Ignore {}

// -----------------------------------------------------------------------------
// Tests
