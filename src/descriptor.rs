use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::annotations::{Annotation, AnnotationEntry, AnnotationSet};

// -----------------------------------------------------------------------------
// FieldDescriptor

/// The canonical identity of one logical field in the structured encoding.
///
/// Identity is the name string: two descriptors are equal (and hash equal)
/// iff their names are equal. A descriptor additionally carries the extra
/// properties attached during plan construction, which the wire writer may
/// interpret. Immutable once built, and cheap to clone.
///
/// # Examples
///
/// ```
/// use objbind::FieldDescriptor;
///
/// let plain = FieldDescriptor::of("userName");
/// let built = FieldDescriptor::builder("userName").build();
/// assert_eq!(plain, built);
/// ```
#[derive(Clone)]
pub struct FieldDescriptor {
    name: Arc<str>,
    // Use `Option` to reduce unnecessary heap requests (when empty content).
    properties: Option<Arc<AnnotationSet>>,
}

impl FieldDescriptor {
    /// Creates a descriptor with no extra properties.
    #[inline]
    pub fn of(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            properties: None,
        }
    }

    /// Starts building a descriptor with the given name.
    #[inline]
    pub fn builder(name: impl Into<Arc<str>>) -> FieldDescriptorBuilder {
        FieldDescriptorBuilder {
            name: name.into(),
            properties: AnnotationSet::new(),
        }
    }

    /// Returns the field name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the attached extra properties.
    #[inline]
    pub fn properties(&self) -> &AnnotationSet {
        match &self.properties {
            Some(set) => set,
            None => AnnotationSet::EMPTY,
        }
    }

    /// Returns the extra property of type `A`, if attached.
    #[inline]
    pub fn property<A: Annotation>(&self) -> Option<&A> {
        self.properties().get::<A>()
    }

    /// Returns `true` if an extra property of type `A` is attached.
    #[inline]
    pub fn has_property<A: Annotation>(&self) -> bool {
        self.properties().contains::<A>()
    }
}

impl PartialEq for FieldDescriptor {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for FieldDescriptor {}

impl Hash for FieldDescriptor {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("properties", self.properties())
            .finish()
    }
}

impl fmt::Display for FieldDescriptor {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// -----------------------------------------------------------------------------
// FieldDescriptorBuilder

/// Builder for [`FieldDescriptor`].
pub struct FieldDescriptorBuilder {
    name: Arc<str>,
    properties: AnnotationSet,
}

impl FieldDescriptorBuilder {
    /// Attaches an extra property.
    #[inline]
    pub fn with_property<A: Annotation>(mut self, value: A) -> Self {
        self.properties.insert(value);
        self
    }

    pub(crate) fn with_property_entry(mut self, entry: AnnotationEntry) -> Self {
        self.properties.insert_entry(entry);
        self
    }

    /// Finishes the descriptor.
    pub fn build(self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name,
            properties: if self.properties.is_empty() {
                None
            } else {
                Some(Arc::new(self.properties))
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
