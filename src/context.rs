//! Contracts between the plans and the surrounding serialization engine.
//!
//! Nothing in this module touches bytes: the encode context is responsible
//! for actual serialization, the decode and creation contexts for locating
//! and handing back decoded values, and the instance creator for the
//! construction strategy. The plans only orchestrate.

use core::any::Any;

use crate::descriptor::FieldDescriptor;
use crate::error::EncodingError;
use crate::token::{ClassToken, PrimitiveKind, TypeToken};

// -----------------------------------------------------------------------------
// FieldRef

/// The flavor of a [`FieldRef`]: fetched through the generic boxed getter,
/// or through one of the eight type-specific primitive getters.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FieldRefKind {
    Boxed,
    Primitive(PrimitiveKind),
}

/// An opaque handle to one field of a single decode session.
///
/// The decode context assigns the slot when the plan asks it to locate a
/// field in the incoming data; the creation context redeems it for the
/// decoded value. References are scoped to one decode invocation and must
/// never be reused across sessions.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FieldRef {
    slot: usize,
    kind: FieldRefKind,
}

impl FieldRef {
    /// Creates a boxed reference for the given context slot.
    #[inline]
    pub const fn boxed(slot: usize) -> Self {
        Self {
            slot,
            kind: FieldRefKind::Boxed,
        }
    }

    /// Creates a primitive-typed reference for the given context slot.
    #[inline]
    pub const fn primitive(kind: PrimitiveKind, slot: usize) -> Self {
        Self {
            slot,
            kind: FieldRefKind::Primitive(kind),
        }
    }

    /// Returns the context-assigned slot.
    #[inline]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Returns the reference flavor.
    #[inline]
    pub const fn kind(&self) -> FieldRefKind {
        self.kind
    }

    /// Returns `true` for a boxed reference.
    #[inline]
    pub const fn is_boxed(&self) -> bool {
        matches!(self.kind, FieldRefKind::Boxed)
    }
}

// -----------------------------------------------------------------------------
// Encode side

/// Sink for one object's encoded fields.
pub trait ObjectEncoderContext {
    /// Adds a nested value keyed by the field descriptor.
    fn add(
        &mut self,
        descriptor: &FieldDescriptor,
        value: Box<dyn Any>,
    ) -> Result<(), EncodingError>;

    /// Merges a sub-object's fields directly into this object.
    fn inline(&mut self, value: Box<dyn Any>) -> Result<(), EncodingError>;
}

/// Encodes instances of one class against an encode context.
pub trait ObjectEncoder: Send + Sync {
    fn encode(
        &self,
        value: &dyn Any,
        ctx: &mut dyn ObjectEncoderContext,
    ) -> Result<(), EncodingError>;
}

// -----------------------------------------------------------------------------
// Decode side

/// Source of field references for one decode session.
///
/// The eight primitive-typed requests avoid boxing and preserve exact
/// numeric width; everything else goes through [`decode_boxed`] with a
/// fully-resolved type token, or through [`decode_inline`] for flattened
/// sub-objects.
///
/// [`decode_boxed`]: ObjectDecoderContext::decode_boxed
/// [`decode_inline`]: ObjectDecoderContext::decode_inline
pub trait ObjectDecoderContext {
    /// Returns the resolved token of the class being decoded, including its
    /// type arguments.
    fn type_token(&self) -> &ClassToken;

    /// Returns the resolved type argument at `index`, if present.
    fn type_argument(&self, index: usize) -> Option<&TypeToken> {
        self.type_token().argument(index)
    }

    /// Locates a field of the given resolved type in the incoming data.
    fn decode_boxed(
        &mut self,
        descriptor: FieldDescriptor,
        ty: TypeToken,
    ) -> Result<FieldRef, EncodingError>;

    /// Decodes a flattened sub-object of the given class with the given
    /// nested decoder.
    fn decode_inline(
        &mut self,
        token: ClassToken,
        decoder: &dyn ObjectDecoder,
    ) -> Result<FieldRef, EncodingError>;

    fn decode_int(&mut self, descriptor: FieldDescriptor) -> Result<FieldRef, EncodingError>;
    fn decode_long(&mut self, descriptor: FieldDescriptor) -> Result<FieldRef, EncodingError>;
    fn decode_short(&mut self, descriptor: FieldDescriptor) -> Result<FieldRef, EncodingError>;
    fn decode_byte(&mut self, descriptor: FieldDescriptor) -> Result<FieldRef, EncodingError>;
    fn decode_double(&mut self, descriptor: FieldDescriptor) -> Result<FieldRef, EncodingError>;
    fn decode_float(&mut self, descriptor: FieldDescriptor) -> Result<FieldRef, EncodingError>;
    fn decode_char(&mut self, descriptor: FieldDescriptor) -> Result<FieldRef, EncodingError>;
    fn decode_boolean(&mut self, descriptor: FieldDescriptor) -> Result<FieldRef, EncodingError>;
}

/// Decodes instances of one class in two phases: [`decode`] resolves every
/// field reference against the incoming data, and the returned creator
/// instantiates the object and pushes the decoded values through its
/// accessors.
///
/// [`decode`]: ObjectDecoder::decode
pub trait ObjectDecoder: Send + Sync {
    fn decode<'a>(
        &'a self,
        ctx: &mut dyn ObjectDecoderContext,
    ) -> Result<TypeCreator<'a>, EncodingError>;
}

/// Source of already-decoded values during instantiation (phase two).
pub trait CreationContext {
    /// Takes the decoded value behind a boxed reference.
    fn take_boxed(&mut self, field: &FieldRef) -> Result<Box<dyn Any>, EncodingError>;

    fn get_int(&mut self, field: &FieldRef) -> Result<i32, EncodingError>;
    fn get_long(&mut self, field: &FieldRef) -> Result<i64, EncodingError>;
    fn get_short(&mut self, field: &FieldRef) -> Result<i16, EncodingError>;
    fn get_byte(&mut self, field: &FieldRef) -> Result<i8, EncodingError>;
    fn get_double(&mut self, field: &FieldRef) -> Result<f64, EncodingError>;
    fn get_float(&mut self, field: &FieldRef) -> Result<f32, EncodingError>;
    fn get_char(&mut self, field: &FieldRef) -> Result<char, EncodingError>;
    fn get_boolean(&mut self, field: &FieldRef) -> Result<bool, EncodingError>;
}

// -----------------------------------------------------------------------------
// TypeCreator

/// The deferred second phase of a decode: instantiate the target object and
/// populate it from a live creation context.
///
/// Borrowing the plan keeps a creator tied to the decode session that
/// produced it; it cannot outlive the plan or be replayed.
pub struct TypeCreator<'a> {
    create: Box<dyn FnOnce(&mut dyn CreationContext) -> Result<Box<dyn Any>, EncodingError> + 'a>,
}

impl<'a> TypeCreator<'a> {
    /// Wraps an instantiation closure.
    #[inline]
    pub fn new(
        create: impl FnOnce(&mut dyn CreationContext) -> Result<Box<dyn Any>, EncodingError> + 'a,
    ) -> Self {
        Self {
            create: Box::new(create),
        }
    }

    /// Runs the instantiation.
    #[inline]
    pub fn create(self, ctx: &mut dyn CreationContext) -> Result<Box<dyn Any>, EncodingError> {
        (self.create)(ctx)
    }
}

// -----------------------------------------------------------------------------
// InstanceCreator

/// Produces new, uninitialized instances of a class.
///
/// The construction strategy is external to the plans; the default
/// [`ShapeInstantiator`](crate::plan::ShapeInstantiator) uses the
/// constructor thunk registered on the class shape, but callers may swap in
/// builders, pools, or anything else.
pub trait InstanceCreator: Send + Sync {
    fn new_instance(&self, token: &ClassToken) -> Result<Box<dyn Any>, EncodingError>;
}
