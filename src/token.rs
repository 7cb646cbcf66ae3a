use core::any::{Any, TypeId};
use core::fmt;

use crate::shape::{ClassShape, Mirrored};

// -----------------------------------------------------------------------------
// PrimitiveKind

/// The eight primitive kinds that take the unboxed decode path.
///
/// Each kind maps to one Rust scalar: `Int` = `i32`, `Long` = `i64`,
/// `Short` = `i16`, `Byte` = `i8`, `Double` = `f64`, `Float` = `f32`,
/// `Char` = `char`, `Boolean` = `bool`.
///
/// A member declared with a primitive kind is fetched through the matching
/// type-specific context method, preserving exact numeric width. The same
/// scalar declared as an opaque class instead goes through the generic boxed
/// path — the two declarations are distinct types as far as plans and
/// extra-property allow-lists are concerned.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PrimitiveKind {
    Int,
    Long,
    Short,
    Byte,
    Double,
    Float,
    Char,
    Boolean,
}

impl PrimitiveKind {
    /// Returns the kind name as written in declarations.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::Double => "double",
            Self::Float => "float",
            Self::Char => "char",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// -----------------------------------------------------------------------------
// RawType

/// Erased type identity, used by extra-property allow-lists.
///
/// A primitive-declared member never matches a class entry and vice versa,
/// so an allow-list can distinguish an unboxed `int` from a boxed `i32`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RawType {
    Primitive(PrimitiveKind),
    Class(TypeId),
}

impl RawType {
    /// The raw identity of the class type `T`.
    #[inline]
    pub fn of<T: Any>() -> Self {
        Self::Class(TypeId::of::<T>())
    }
}

// -----------------------------------------------------------------------------
// ClassToken

/// Identity of a single resolved class: its `TypeId`, its display name, its
/// registered [`ClassShape`] (if any), and fully-resolved type arguments.
///
/// Opaque classes — leaf types like `String` that carry no shape — can still
/// be named by a token; they travel through the generic boxed decode path and
/// can never be decoded inline.
#[derive(Clone)]
pub struct ClassToken {
    id: TypeId,
    name: &'static str,
    shape: Option<&'static ClassShape>,
    args: Box<[TypeToken]>,
}

impl ClassToken {
    /// Creates a token for a registered class with no type arguments.
    pub fn of<T: Mirrored>() -> Self {
        let shape = T::class_shape();
        Self {
            id: TypeId::of::<T>(),
            name: shape.name(),
            shape: Some(shape),
            args: Box::new([]),
        }
    }

    /// Creates a token for a leaf class with no registered shape.
    pub fn opaque<T: Any>(name: &'static str) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name,
            shape: None,
            args: Box::new([]),
        }
    }

    pub(crate) fn from_parts(
        id: TypeId,
        name: &'static str,
        shape: Option<&'static ClassShape>,
        args: Vec<TypeToken>,
    ) -> Self {
        Self {
            id,
            name,
            shape,
            args: args.into(),
        }
    }

    /// Attaches resolved type arguments.
    #[inline]
    pub fn with_args(mut self, args: Vec<TypeToken>) -> Self {
        self.args = args.into();
        self
    }

    /// Returns the `TypeId` of the class.
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the class name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the registered shape, or `None` for an opaque class.
    #[inline]
    pub const fn shape(&self) -> Option<&'static ClassShape> {
        self.shape
    }

    /// Returns the resolved type arguments.
    #[inline]
    pub fn arguments(&self) -> &[TypeToken] {
        &self.args
    }

    /// Returns the resolved type argument at `index`, if present.
    #[inline]
    pub fn argument(&self, index: usize) -> Option<&TypeToken> {
        self.args.get(index)
    }

    /// Check if the given type matches this token.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for ClassToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.args == other.args
    }
}

impl Eq for ClassToken {}

impl fmt::Debug for ClassToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)?;
        if !self.args.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Display for ClassToken {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// -----------------------------------------------------------------------------
// TypeToken

/// A fully-resolved type, with every type variable already substituted.
///
/// This is what decode contexts receive for the generic boxed path. It is the
/// resolved counterpart of [`DeclaredType`](crate::shape::DeclaredType),
/// which may still mention the enclosing class's type parameters.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TypeToken {
    Primitive(PrimitiveKind),
    Class(ClassToken),
    Array(Box<TypeToken>),
}

impl TypeToken {
    /// Returns the class token, if this is a single class type.
    #[inline]
    pub const fn as_class(&self) -> Option<&ClassToken> {
        match self {
            Self::Class(token) => Some(token),
            _ => None,
        }
    }

    /// Returns `true` for one of the eight primitive kinds.
    #[inline]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Check if this token resolves to the class type `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        match self {
            Self::Class(token) => token.is::<T>(),
            _ => false,
        }
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => fmt::Display::fmt(kind, f),
            Self::Class(token) => fmt::Display::fmt(token, f),
            Self::Array(component) => write!(f, "{component}[]"),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
