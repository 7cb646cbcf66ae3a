use core::any::{Any, TypeId};
use core::fmt;

use crate::shape::{FieldShape, MethodShape};
use crate::token::ClassToken;

// -----------------------------------------------------------------------------
// ClassLevel

/// One level of a class hierarchy: the members a single class declares,
/// as opposed to the members it inherits.
///
/// Members of every level operate on the concrete registered Rust type;
/// a superclass level is a view onto the same instance, not a separate one.
pub struct ClassLevel {
    name: &'static str,
    fields: Vec<FieldShape>,
    methods: Vec<MethodShape>,
}

impl ClassLevel {
    /// Creates an empty level.
    #[inline]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Declares a field at this level.
    #[inline]
    pub fn with_field(mut self, field: FieldShape) -> Self {
        self.fields.push(field);
        self
    }

    /// Declares a method at this level.
    #[inline]
    pub fn with_method(mut self, method: MethodShape) -> Self {
        self.methods.push(method);
        self
    }

    /// Returns the declaring class name of this level.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the fields declared at this level, in declaration order.
    #[inline]
    pub fn fields(&self) -> &[FieldShape] {
        &self.fields
    }

    /// Returns the methods declared at this level, in declaration order.
    #[inline]
    pub fn methods(&self) -> &[MethodShape] {
        &self.methods
    }
}

impl fmt::Debug for ClassLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassLevel")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ClassShape

type ConstructFn = fn() -> Box<dyn Any>;

/// The registered member table of one class: the stand-in for runtime
/// reflection.
///
/// A shape lists the class's own members plus one [`ClassLevel`] per
/// superclass, most-derived first. It is built once (typically inside a
/// `OnceLock` behind [`Mirrored::class_shape`]), is immutable afterwards,
/// and is safe to share across threads.
///
/// # Examples
///
/// ```
/// use std::sync::OnceLock;
/// use objbind::{ClassShape, DeclaredType, FieldShape, Mirrored};
///
/// #[derive(Default)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Mirrored for Point {
///     fn class_shape() -> &'static ClassShape {
///         static SHAPE: OnceLock<ClassShape> = OnceLock::new();
///         SHAPE.get_or_init(|| {
///             ClassShape::builder::<Point>("Point")
///                 .field(FieldShape::new::<Point, i32>("x", DeclaredType::INT, |p, v| p.x = v))
///                 .field(FieldShape::new::<Point, i32>("y", DeclaredType::INT, |p, v| p.y = v))
///                 .default_constructor::<Point>()
///                 .build()
///         })
///     }
/// }
///
/// assert_eq!(Point::class_shape().name(), "Point");
/// ```
pub struct ClassShape {
    name: &'static str,
    id: TypeId,
    type_params: Vec<&'static str>,
    levels: Vec<ClassLevel>,
    construct: Option<ConstructFn>,
}

impl ClassShape {
    /// Starts building the shape of the Rust type `T`.
    pub fn builder<T: Any>(name: &'static str) -> ClassShapeBuilder {
        ClassShapeBuilder {
            name,
            id: TypeId::of::<T>(),
            type_params: Vec::new(),
            own: ClassLevel::new(name),
            supers: Vec::new(),
            construct: None,
        }
    }

    /// Returns the class name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the `TypeId` of the mirrored Rust type.
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the declared type-parameter names, in declaration order.
    #[inline]
    pub fn type_params(&self) -> &[&'static str] {
        &self.type_params
    }

    /// Returns every hierarchy level, most-derived first.
    #[inline]
    pub fn levels(&self) -> &[ClassLevel] {
        &self.levels
    }

    /// Returns the level of the class itself.
    #[inline]
    pub fn own_level(&self) -> &ClassLevel {
        &self.levels[0]
    }

    /// Check if the given type matches this shape.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Returns a resolved token for this class, without type arguments.
    #[inline]
    pub fn token(&'static self) -> ClassToken {
        ClassToken::from_parts(self.id, self.name, Some(self), Vec::new())
    }

    pub(crate) fn construct(&self) -> Option<ConstructFn> {
        self.construct
    }
}

impl fmt::Debug for ClassShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassShape")
            .field("name", &self.name)
            .field("type_params", &self.type_params)
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// ClassShapeBuilder

/// Builder for [`ClassShape`].
pub struct ClassShapeBuilder {
    name: &'static str,
    id: TypeId,
    type_params: Vec<&'static str>,
    own: ClassLevel,
    supers: Vec<ClassLevel>,
    construct: Option<ConstructFn>,
}

impl ClassShapeBuilder {
    /// Declares a type parameter. Order matters: it is the index used to
    /// look up the matching type argument at decode time.
    #[inline]
    pub fn type_param(mut self, name: &'static str) -> Self {
        self.type_params.push(name);
        self
    }

    /// Declares a field on the class itself.
    #[inline]
    pub fn field(mut self, field: FieldShape) -> Self {
        self.own = self.own.with_field(field);
        self
    }

    /// Declares a method on the class itself.
    #[inline]
    pub fn method(mut self, method: MethodShape) -> Self {
        self.own = self.own.with_method(method);
        self
    }

    /// Appends a superclass level. Call in hierarchy order, nearest
    /// superclass first; the universal base type is never listed.
    #[inline]
    pub fn extends(mut self, level: ClassLevel) -> Self {
        self.supers.push(level);
        self
    }

    /// Registers a custom construction thunk.
    #[inline]
    pub fn constructed_by(mut self, construct: ConstructFn) -> Self {
        self.construct = Some(construct);
        self
    }

    /// Registers `T::default()` as the construction strategy.
    #[inline]
    pub fn default_constructor<T: Any + Default>(self) -> Self {
        self.constructed_by(|| Box::new(T::default()))
    }

    /// Finishes the shape.
    pub fn build(self) -> ClassShape {
        let mut levels = Vec::with_capacity(1 + self.supers.len());
        levels.push(self.own);
        levels.extend(self.supers);
        ClassShape {
            name: self.name,
            id: self.id,
            type_params: self.type_params,
            levels,
            construct: self.construct,
        }
    }
}

// -----------------------------------------------------------------------------
// Mirrored

/// A type that registered a [`ClassShape`] for itself.
///
/// Implementors build the shape once and cache it in a `OnceLock` static;
/// every plan for the type is derived from this single shape.
pub trait Mirrored: Any {
    /// Returns the registered shape of this type.
    fn class_shape() -> &'static ClassShape;
}

// -----------------------------------------------------------------------------
// Tests
