use core::any::{Any, TypeId, type_name};
use core::fmt;

use crate::shape::{ClassShape, Mirrored};
use crate::token::{PrimitiveKind, RawType};

// -----------------------------------------------------------------------------
// ClassId

/// Deferred identity of a class named inside a [`DeclaredType`].
///
/// The shape pointer is a function so that mutually-recursive class shapes
/// can reference each other without forcing initialization order.
#[derive(Clone, Copy)]
pub struct ClassId {
    id: TypeId,
    name: &'static str,
    // `ClassShape` is created on first access; using a function pointer delays it.
    shape: Option<fn() -> &'static ClassShape>,
}

impl ClassId {
    /// Identity of the registered class `T`.
    #[inline]
    pub fn of<T: Mirrored>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            shape: Some(T::class_shape),
        }
    }

    /// Identity of a leaf class with no registered shape.
    #[inline]
    pub fn opaque<T: Any>(name: &'static str) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name,
            shape: None,
        }
    }

    /// Returns the `TypeId`.
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the class name used in diagnostics.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the registered shape, or `None` for an opaque class.
    #[inline]
    pub fn shape(&self) -> Option<&'static ClassShape> {
        self.shape.map(|f| f())
    }

    /// Check if the given type matches this one.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl fmt::Debug for ClassId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// -----------------------------------------------------------------------------
// DeclaredType

/// The declared type of a class member, possibly generic.
///
/// Unlike a [`TypeToken`](crate::token::TypeToken), a declared type may
/// mention the enclosing class's type parameters via
/// [`Variable`](DeclaredType::Variable); the decoder plan substitutes those
/// with the actual arguments of the decode context's type token.
#[derive(Clone, Debug)]
pub enum DeclaredType {
    Primitive(PrimitiveKind),
    Class {
        class: ClassId,
        args: Vec<DeclaredType>,
    },
    Array(Box<DeclaredType>),
    /// One of the enclosing class's own type parameters, by name.
    Variable(&'static str),
}

impl DeclaredType {
    pub const INT: Self = Self::Primitive(PrimitiveKind::Int);
    pub const LONG: Self = Self::Primitive(PrimitiveKind::Long);
    pub const SHORT: Self = Self::Primitive(PrimitiveKind::Short);
    pub const BYTE: Self = Self::Primitive(PrimitiveKind::Byte);
    pub const DOUBLE: Self = Self::Primitive(PrimitiveKind::Double);
    pub const FLOAT: Self = Self::Primitive(PrimitiveKind::Float);
    pub const CHAR: Self = Self::Primitive(PrimitiveKind::Char);
    pub const BOOLEAN: Self = Self::Primitive(PrimitiveKind::Boolean);

    /// The registered class `T`, without type arguments.
    #[inline]
    pub fn class_of<T: Mirrored>() -> Self {
        Self::Class {
            class: ClassId::of::<T>(),
            args: Vec::new(),
        }
    }

    /// The registered class `T` applied to the given type arguments.
    #[inline]
    pub fn generic_class_of<T: Mirrored>(args: Vec<DeclaredType>) -> Self {
        Self::Class {
            class: ClassId::of::<T>(),
            args,
        }
    }

    /// A leaf class with no registered shape.
    #[inline]
    pub fn opaque<T: Any>(name: &'static str) -> Self {
        Self::Class {
            class: ClassId::opaque::<T>(name),
            args: Vec::new(),
        }
    }

    /// An array of the given component type.
    #[inline]
    pub fn array(component: DeclaredType) -> Self {
        Self::Array(Box::new(component))
    }

    /// Returns the primitive kind, if this is a primitive declaration.
    #[inline]
    pub const fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Returns the erased raw identity used by extra-property allow-lists.
    ///
    /// Arrays and unresolved type variables have none.
    #[inline]
    pub fn raw(&self) -> Option<RawType> {
        match self {
            Self::Primitive(kind) => Some(RawType::Primitive(*kind)),
            Self::Class { class, .. } => Some(RawType::Class(class.id())),
            Self::Array(_) | Self::Variable(_) => None,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => fmt::Display::fmt(kind, f),
            Self::Class { class, args } => {
                f.write_str(class.name())?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            Self::Array(component) => write!(f, "{component}[]"),
            Self::Variable(name) => f.write_str(name),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
