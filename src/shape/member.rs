use core::any::{Any, type_name};
use core::fmt;

use crate::annotations::{Annotation, AnnotationSet};
use crate::error::AccessError;
use crate::shape::DeclaredType;

// -----------------------------------------------------------------------------
// Visibility

/// Member visibility, as declared in the registered shape.
///
/// Only public fields and public getters participate in plans; setter
/// methods are deliberately not visibility-checked.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

// -----------------------------------------------------------------------------
// Accessor thunks

type GetterThunk = Box<dyn Fn(&dyn Any) -> Result<Box<dyn Any>, AccessError> + Send + Sync>;
type SetterThunk = Box<dyn Fn(&mut dyn Any, Box<dyn Any>) -> Result<(), AccessError> + Send + Sync>;

fn getter_thunk<T: Any, V: Any>(get: fn(&T) -> Result<V, AccessError>) -> GetterThunk {
    Box::new(move |obj| {
        let obj = obj
            .downcast_ref::<T>()
            .ok_or(AccessError::InstanceType {
                expected: type_name::<T>(),
            })?;
        Ok(Box::new(get(obj)?) as Box<dyn Any>)
    })
}

fn setter_thunk<T: Any, V: Any>(set: fn(&mut T, V)) -> SetterThunk {
    Box::new(move |obj, value| {
        let obj = obj
            .downcast_mut::<T>()
            .ok_or(AccessError::InstanceType {
                expected: type_name::<T>(),
            })?;
        let value = value.downcast::<V>().map_err(|_| AccessError::ValueType {
            expected: type_name::<V>(),
        })?;
        set(obj, *value);
        Ok(())
    })
}

// -----------------------------------------------------------------------------
// FieldShape

/// A declared field of a registered class.
///
/// Defaults to a public, non-static, non-transient field declared on the
/// class itself; the `with_*` modifiers adjust that. The setter thunk writes
/// a decoded value into an instance of the concrete registered type.
///
/// # Examples
///
/// ```
/// use objbind::{DeclaredType, FieldShape};
///
/// struct Point {
///     x: i32,
/// }
///
/// let shape = FieldShape::new::<Point, i32>("x", DeclaredType::INT, |p, v| p.x = v);
/// assert_eq!(shape.name(), "x");
/// ```
pub struct FieldShape {
    name: &'static str,
    declared: DeclaredType,
    visibility: Visibility,
    is_static: bool,
    is_transient: bool,
    from_universal_base: bool,
    annotations: AnnotationSet,
    set: Option<SetterThunk>,
}

impl FieldShape {
    /// Creates a public field of class `T` with value type `V`.
    pub fn new<T: Any, V: Any>(
        name: &'static str,
        declared: DeclaredType,
        set: fn(&mut T, V),
    ) -> Self {
        Self {
            name,
            declared,
            visibility: Visibility::Public,
            is_static: false,
            is_transient: false,
            from_universal_base: false,
            annotations: AnnotationSet::new(),
            set: Some(setter_thunk::<T, V>(set)),
        }
    }

    /// Creates a field with no executable body, for shape modeling only.
    pub fn raw(name: &'static str, declared: DeclaredType) -> Self {
        Self {
            name,
            declared,
            visibility: Visibility::Public,
            is_static: false,
            is_transient: false,
            from_universal_base: false,
            annotations: AnnotationSet::new(),
            set: None,
        }
    }

    /// Sets the declared visibility.
    #[inline]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Marks the field as static.
    #[inline]
    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Marks the field as transient.
    #[inline]
    pub fn with_transient(mut self) -> Self {
        self.is_transient = true;
        self
    }

    /// Marks the field as declared on the universal base type.
    #[inline]
    pub fn from_universal_base(mut self) -> Self {
        self.from_universal_base = true;
        self
    }

    /// Attaches an annotation.
    #[inline]
    pub fn annotate<A: Annotation>(mut self, value: A) -> Self {
        self.annotations.insert(value);
        self
    }

    /// Returns the declared field name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared type.
    #[inline]
    pub const fn declared(&self) -> &DeclaredType {
        &self.declared
    }

    /// Returns the declared visibility.
    #[inline]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Returns `true` if the field is static.
    #[inline]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Returns `true` if the field is transient.
    #[inline]
    pub const fn is_transient(&self) -> bool {
        self.is_transient
    }

    /// Returns `true` if the field is declared on the universal base type.
    #[inline]
    pub const fn is_from_universal_base(&self) -> bool {
        self.from_universal_base
    }

    /// Returns the attached annotations.
    #[inline]
    pub const fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub(crate) fn set_value(
        &self,
        obj: &mut dyn Any,
        value: Box<dyn Any>,
    ) -> Result<(), AccessError> {
        match &self.set {
            Some(set) => set(obj, value),
            None => Err(AccessError::NotInvocable { member: self.name }),
        }
    }
}

impl fmt::Debug for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldShape")
            .field("name", &self.name)
            .field("declared", &self.declared)
            .field("visibility", &self.visibility)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// MethodShape

enum MethodBody {
    Getter(GetterThunk),
    Setter(SetterThunk),
}

/// A declared method of a registered class.
///
/// Only bean-style accessors matter to the plans: single-parameter void
/// `setX` methods on the decode side, zero-parameter non-void `getX`/`isX`
/// methods on the encode side. Anything else is simply never classified in.
pub struct MethodShape {
    name: &'static str,
    visibility: Visibility,
    is_static: bool,
    from_universal_base: bool,
    params: Vec<DeclaredType>,
    /// `None` means the method returns void.
    return_type: Option<DeclaredType>,
    annotations: AnnotationSet,
    body: Option<MethodBody>,
}

impl MethodShape {
    /// Creates a public zero-parameter getter returning `returns`.
    pub fn getter<T: Any, V: Any>(
        name: &'static str,
        returns: DeclaredType,
        get: fn(&T) -> V,
    ) -> Self {
        Self {
            name,
            visibility: Visibility::Public,
            is_static: false,
            from_universal_base: false,
            params: Vec::new(),
            return_type: Some(returns),
            annotations: AnnotationSet::new(),
            body: Some(MethodBody::Getter(Box::new(move |obj| {
                let obj = obj
                    .downcast_ref::<T>()
                    .ok_or(AccessError::InstanceType {
                        expected: type_name::<T>(),
                    })?;
                Ok(Box::new(get(obj)) as Box<dyn Any>)
            }))),
        }
    }

    /// Creates a public getter whose body may fail.
    pub fn try_getter<T: Any, V: Any>(
        name: &'static str,
        returns: DeclaredType,
        get: fn(&T) -> Result<V, AccessError>,
    ) -> Self {
        Self {
            name,
            visibility: Visibility::Public,
            is_static: false,
            from_universal_base: false,
            params: Vec::new(),
            return_type: Some(returns),
            annotations: AnnotationSet::new(),
            body: Some(MethodBody::Getter(getter_thunk::<T, V>(get))),
        }
    }

    /// Creates a public single-parameter void setter.
    pub fn setter<T: Any, V: Any>(
        name: &'static str,
        param: DeclaredType,
        set: fn(&mut T, V),
    ) -> Self {
        Self {
            name,
            visibility: Visibility::Public,
            is_static: false,
            from_universal_base: false,
            params: vec![param],
            return_type: None,
            annotations: AnnotationSet::new(),
            body: Some(MethodBody::Setter(setter_thunk::<T, V>(set))),
        }
    }

    /// Creates a method with no executable body, for shape modeling only.
    pub fn raw(
        name: &'static str,
        params: Vec<DeclaredType>,
        return_type: Option<DeclaredType>,
    ) -> Self {
        Self {
            name,
            visibility: Visibility::Public,
            is_static: false,
            from_universal_base: false,
            params,
            return_type,
            annotations: AnnotationSet::new(),
            body: None,
        }
    }

    /// Sets the declared visibility.
    #[inline]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Marks the method as static.
    #[inline]
    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Marks the method as declared on the universal base type.
    #[inline]
    pub fn from_universal_base(mut self) -> Self {
        self.from_universal_base = true;
        self
    }

    /// Attaches an annotation.
    #[inline]
    pub fn annotate<A: Annotation>(mut self, value: A) -> Self {
        self.annotations.insert(value);
        self
    }

    /// Returns the declared method name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared visibility.
    #[inline]
    pub const fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Returns `true` if the method is static.
    #[inline]
    pub const fn is_static(&self) -> bool {
        self.is_static
    }

    /// Returns `true` if the method is declared on the universal base type.
    #[inline]
    pub const fn is_from_universal_base(&self) -> bool {
        self.from_universal_base
    }

    /// Returns the number of declared parameters.
    #[inline]
    pub fn param_len(&self) -> usize {
        self.params.len()
    }

    /// Returns the declared parameter type at `index`, if present.
    #[inline]
    pub fn param(&self, index: usize) -> Option<&DeclaredType> {
        self.params.get(index)
    }

    /// Returns the declared return type; `None` means void.
    #[inline]
    pub const fn return_type(&self) -> Option<&DeclaredType> {
        self.return_type.as_ref()
    }

    /// Returns the attached annotations.
    #[inline]
    pub const fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub(crate) fn invoke_getter(&self, obj: &dyn Any) -> Result<Box<dyn Any>, AccessError> {
        match &self.body {
            Some(MethodBody::Getter(get)) => get(obj),
            _ => Err(AccessError::NotInvocable { member: self.name }),
        }
    }

    pub(crate) fn invoke_setter(
        &self,
        obj: &mut dyn Any,
        value: Box<dyn Any>,
    ) -> Result<(), AccessError> {
        match &self.body {
            Some(MethodBody::Setter(set)) => set(obj, value),
            _ => Err(AccessError::NotInvocable { member: self.name }),
        }
    }
}

impl fmt::Debug for MethodShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodShape")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .field("annotations", &self.annotations)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
