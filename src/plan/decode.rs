use core::any::{Any, TypeId};
use core::fmt;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::annotations::{AnnotationSet, FieldOptions};
use crate::classify;
use crate::context::{
    CreationContext, FieldRef, InstanceCreator, ObjectDecoder, ObjectDecoderContext, TypeCreator,
};
use crate::descriptor::FieldDescriptor;
use crate::error::{AccessError, EncodingError};
use crate::naming;
use crate::shape::{ClassShape, DeclaredType, FieldShape, MethodShape, Mirrored};
use crate::token::{ClassToken, PrimitiveKind, TypeToken};

// -----------------------------------------------------------------------------
// Bindings

enum SetterBinding {
    Field(&'static FieldShape),
    Method(&'static MethodShape),
}

impl SetterBinding {
    fn set(&self, obj: &mut dyn Any, value: Box<dyn Any>) -> Result<(), AccessError> {
        match self {
            Self::Field(field) => field.set_value(obj, value),
            Self::Method(method) => method.invoke_setter(obj, value),
        }
    }
}

struct DecodeBinding {
    descriptor: FieldDescriptor,
    setter: SetterBinding,
    declared: &'static DeclaredType,
    inline: Option<Arc<DecoderPlan>>,
}

// -----------------------------------------------------------------------------
// DecoderPlan

/// The compiled decode program of one class.
///
/// Construction classifies setters and public fields across every hierarchy
/// level and resolves each member's decoding key, descriptor and inline
/// sub-plan up front, so that registration mistakes fail before any data is
/// seen. Decoding then runs in two phases: [`decode`](ObjectDecoder::decode)
/// asks the context to locate every field, and the returned creator
/// instantiates the object and pushes the located values through the setters.
///
/// Bindings are keyed by the derived bean name. Setter methods claim names
/// across the whole hierarchy before any field does, and within each pass a
/// more derived level claims a name first.
pub struct DecoderPlan {
    shape: &'static ClassShape,
    bindings: Vec<(String, DecodeBinding)>,
    creator: Arc<dyn InstanceCreator>,
}

impl DecoderPlan {
    fn build(
        shape: &'static ClassShape,
        creator: &Arc<dyn InstanceCreator>,
    ) -> Result<Self, EncodingError> {
        let mut bindings: Vec<(String, DecodeBinding)> = Vec::new();

        // Setter methods of every level claim their names first, so a setter
        // shadows a same-named field even across levels.
        for level in shape.levels() {
            for method in level.methods() {
                if !classify::should_include_setter(method) {
                    continue;
                }
                let logical = naming::setter_field_name(method)?;
                if bindings.iter().any(|(claimed, _)| *claimed == logical) {
                    continue;
                }
                // Classified setters always have exactly one parameter.
                let Some(declared) = method.param(0) else {
                    continue;
                };
                let key = naming::setter_decoding_key(method)?;
                let descriptor =
                    naming::build_field_descriptor(&key, method.annotations(), declared);
                let inline =
                    resolve_inline(shape, &logical, method.annotations(), declared, creator)?;
                bindings.push((
                    logical,
                    DecodeBinding {
                        descriptor,
                        setter: SetterBinding::Method(method),
                        declared,
                        inline,
                    },
                ));
            }
        }

        for level in shape.levels() {
            for field in level.fields() {
                if !classify::should_include_field(field) {
                    continue;
                }
                let logical = field.name();
                if bindings.iter().any(|(claimed, _)| claimed == logical) {
                    continue;
                }
                let key = naming::field_decoding_key(field);
                let declared = field.declared();
                let descriptor =
                    naming::build_field_descriptor(&key, field.annotations(), declared);
                let inline =
                    resolve_inline(shape, logical, field.annotations(), declared, creator)?;
                bindings.push((
                    logical.to_owned(),
                    DecodeBinding {
                        descriptor,
                        setter: SetterBinding::Field(field),
                        declared,
                        inline,
                    },
                ));
            }
        }

        Ok(Self {
            shape,
            bindings,
            creator: Arc::clone(creator),
        })
    }

    /// Returns the shape the plan was compiled from.
    #[inline]
    pub fn shape(&self) -> &'static ClassShape {
        self.shape
    }

    /// Returns the resolved field descriptors, in decode order.
    #[inline]
    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.bindings.iter().map(|(_, binding)| &binding.descriptor)
    }

    /// Returns the number of decoded fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if the plan decodes no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn resolve_field(
        &self,
        binding: &DecodeBinding,
        ctx: &mut dyn ObjectDecoderContext,
    ) -> Result<FieldRef, EncodingError> {
        if let Some(kind) = binding.declared.primitive_kind() {
            let descriptor = binding.descriptor.clone();
            return match kind {
                PrimitiveKind::Int => ctx.decode_int(descriptor),
                PrimitiveKind::Long => ctx.decode_long(descriptor),
                PrimitiveKind::Short => ctx.decode_short(descriptor),
                PrimitiveKind::Byte => ctx.decode_byte(descriptor),
                PrimitiveKind::Double => ctx.decode_double(descriptor),
                PrimitiveKind::Float => ctx.decode_float(descriptor),
                PrimitiveKind::Char => ctx.decode_char(descriptor),
                PrimitiveKind::Boolean => ctx.decode_boolean(descriptor),
            };
        }
        if let Some(nested) = &binding.inline {
            let token = match self.resolve_type(binding.declared, &*ctx)? {
                TypeToken::Class(token) => token,
                other => {
                    return Err(EncodingError::InvalidInline {
                        field: binding.descriptor.name().to_owned(),
                        class: self.shape.name(),
                        ty: other.to_string(),
                    });
                }
            };
            return ctx.decode_inline(token, &**nested);
        }
        let ty = self.resolve_type(binding.declared, &*ctx)?;
        ctx.decode_boxed(binding.descriptor.clone(), ty)
    }

    /// Substitutes the enclosing class's type parameters with the context's
    /// resolved type arguments, recursively through class arguments and
    /// array components.
    fn resolve_type(
        &self,
        declared: &DeclaredType,
        ctx: &dyn ObjectDecoderContext,
    ) -> Result<TypeToken, EncodingError> {
        match declared {
            DeclaredType::Primitive(kind) => Ok(TypeToken::Primitive(*kind)),
            DeclaredType::Variable(param) => {
                let index = self
                    .shape
                    .type_params()
                    .iter()
                    .position(|declared| declared == param);
                index
                    .and_then(|i| ctx.type_argument(i))
                    .cloned()
                    .ok_or(EncodingError::UnresolvedTypeParameter {
                        param: *param,
                        class: self.shape.name(),
                    })
            }
            DeclaredType::Class { class, args } => {
                let mut resolved = Vec::with_capacity(args.len());
                for arg in args {
                    resolved.push(self.resolve_type(arg, ctx)?);
                }
                Ok(TypeToken::Class(ClassToken::from_parts(
                    class.id(),
                    class.name(),
                    class.shape(),
                    resolved,
                )))
            }
            DeclaredType::Array(component) => Ok(TypeToken::Array(Box::new(
                self.resolve_type(component, ctx)?,
            ))),
        }
    }

    fn instantiate(
        &self,
        token: &ClassToken,
        refs: HashMap<&str, FieldRef>,
        ctx: &mut dyn CreationContext,
    ) -> Result<Box<dyn Any>, EncodingError> {
        let mut instance = self.creator.new_instance(token)?;
        for (name, binding) in &self.bindings {
            let Some(field_ref) = refs.get(name.as_str()) else {
                return Err(EncodingError::MissingFieldRef {
                    field: name.clone(),
                    class: self.shape.name(),
                });
            };
            let value: Box<dyn Any> = if field_ref.is_boxed() {
                ctx.take_boxed(field_ref)?
            } else {
                match binding.declared.primitive_kind() {
                    Some(PrimitiveKind::Int) => Box::new(ctx.get_int(field_ref)?),
                    Some(PrimitiveKind::Long) => Box::new(ctx.get_long(field_ref)?),
                    Some(PrimitiveKind::Short) => Box::new(ctx.get_short(field_ref)?),
                    Some(PrimitiveKind::Byte) => Box::new(ctx.get_byte(field_ref)?),
                    Some(PrimitiveKind::Double) => Box::new(ctx.get_double(field_ref)?),
                    Some(PrimitiveKind::Float) => Box::new(ctx.get_float(field_ref)?),
                    Some(PrimitiveKind::Char) => Box::new(ctx.get_char(field_ref)?),
                    Some(PrimitiveKind::Boolean) => Box::new(ctx.get_boolean(field_ref)?),
                    None => {
                        return Err(EncodingError::UnsupportedType {
                            ty: binding.declared.to_string(),
                        });
                    }
                }
            };
            binding
                .setter
                .set(&mut *instance, value)
                .map_err(|source| EncodingError::Field {
                    field: binding.descriptor.name().to_owned(),
                    class: self.shape.name(),
                    source,
                })?;
        }
        Ok(instance)
    }
}

impl fmt::Debug for DecoderPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderPlan")
            .field("shape", &self.shape.name())
            .field("fields", &self.bindings.iter().map(|(name, _)| name).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ObjectDecoder for DecoderPlan {
    fn decode<'a>(
        &'a self,
        ctx: &mut dyn ObjectDecoderContext,
    ) -> Result<TypeCreator<'a>, EncodingError> {
        let mut refs: HashMap<&'a str, FieldRef> = HashMap::with_capacity(self.bindings.len());
        for (name, binding) in &self.bindings {
            let field_ref = self.resolve_field(binding, ctx)?;
            refs.insert(name.as_str(), field_ref);
        }
        let token = ctx.type_token().clone();
        Ok(TypeCreator::new(move |creation| {
            self.instantiate(&token, refs, creation)
        }))
    }
}

fn resolve_inline(
    shape: &'static ClassShape,
    field: &str,
    annotations: &AnnotationSet,
    declared: &'static DeclaredType,
    creator: &Arc<dyn InstanceCreator>,
) -> Result<Option<Arc<DecoderPlan>>, EncodingError> {
    if !annotations
        .get::<FieldOptions>()
        .is_some_and(|opts| opts.inline)
    {
        return Ok(None);
    }
    let nested = match declared {
        DeclaredType::Class { class, .. } => class.shape(),
        _ => None,
    };
    let Some(nested) = nested else {
        return Err(EncodingError::InvalidInline {
            field: field.to_owned(),
            class: shape.name(),
            ty: declared.to_string(),
        });
    };
    Ok(Some(Arc::new(DecoderPlan::build(nested, creator)?)))
}

// -----------------------------------------------------------------------------
// ShapeInstantiator

/// The default construction strategy: the constructor thunk registered on
/// the target's [`ClassShape`].
pub struct ShapeInstantiator;

impl InstanceCreator for ShapeInstantiator {
    fn new_instance(&self, token: &ClassToken) -> Result<Box<dyn Any>, EncodingError> {
        let shape = token.shape().ok_or_else(|| EncodingError::Instantiation {
            class: token.name(),
            reason: "class has no registered shape".to_owned(),
        })?;
        let construct = shape.construct().ok_or_else(|| EncodingError::Instantiation {
            class: shape.name(),
            reason: "no constructor registered".to_owned(),
        })?;
        Ok(construct())
    }
}

// -----------------------------------------------------------------------------
// DecoderPlanProvider

/// Builds and caches [`DecoderPlan`]s by class.
///
/// All plans from one provider share a single [`InstanceCreator`];
/// [`new`](DecoderPlanProvider::new) wires in the [`ShapeInstantiator`].
pub struct DecoderPlanProvider {
    creator: Arc<dyn InstanceCreator>,
    cache: RwLock<HashMap<TypeId, Arc<DecoderPlan>>>,
}

impl DecoderPlanProvider {
    /// Creates a provider that constructs through registered shapes.
    pub fn new() -> Self {
        Self::with_creator(Arc::new(ShapeInstantiator))
    }

    /// Creates a provider with a custom construction strategy.
    pub fn with_creator(creator: Arc<dyn InstanceCreator>) -> Self {
        Self {
            creator,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached plan for the registered class `T`, compiling it on
    /// first use.
    pub fn get<T: Mirrored>(&self) -> Result<Arc<DecoderPlan>, EncodingError> {
        self.get_shape(T::class_shape())
    }

    /// Returns the cached plan for a shape, compiling it on first use.
    pub fn get_shape(&self, shape: &'static ClassShape) -> Result<Arc<DecoderPlan>, EncodingError> {
        if let Some(plan) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&shape.id())
        {
            return Ok(Arc::clone(plan));
        }
        let plan = Arc::new(DecoderPlan::build(shape, &self.creator)?);
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(shape.id()).or_insert(plan)))
    }
}

impl Default for DecoderPlanProvider {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FieldRefKind;
    use crate::shape::{ClassId, ClassLevel};
    use std::sync::OnceLock;

    // A decode context backed by a name -> value map. Implements the
    // creation side too, so one instance drives a whole decode.
    struct MapCtx {
        token: ClassToken,
        values: HashMap<&'static str, Box<dyn Any>>,
        slots: Vec<Option<Box<dyn Any>>>,
    }

    impl MapCtx {
        fn new<T: Mirrored>() -> Self {
            Self::with_token(ClassToken::of::<T>())
        }

        fn with_token(token: ClassToken) -> Self {
            Self {
                token,
                values: HashMap::new(),
                slots: Vec::new(),
            }
        }

        fn value(mut self, name: &'static str, value: impl Any) -> Self {
            self.values.insert(name, Box::new(value));
            self
        }

        fn stash(&mut self, name: &str, kind: FieldRefKind) -> Result<FieldRef, EncodingError> {
            let value = self
                .values
                .remove(name)
                .ok_or_else(|| EncodingError::context(format!("no test value for `{name}`")))?;
            self.slots.push(Some(value));
            let slot = self.slots.len() - 1;
            Ok(match kind {
                FieldRefKind::Boxed => FieldRef::boxed(slot),
                FieldRefKind::Primitive(kind) => FieldRef::primitive(kind, slot),
            })
        }

        fn take<V: Any>(&mut self, field: &FieldRef) -> Result<V, EncodingError> {
            let value = self.slots[field.slot()]
                .take()
                .ok_or_else(|| EncodingError::context("slot already taken"))?;
            value
                .downcast::<V>()
                .map(|v| *v)
                .map_err(|_| EncodingError::context("test value has the wrong type"))
        }
    }

    impl ObjectDecoderContext for MapCtx {
        fn type_token(&self) -> &ClassToken {
            &self.token
        }

        fn decode_boxed(
            &mut self,
            descriptor: FieldDescriptor,
            _ty: TypeToken,
        ) -> Result<FieldRef, EncodingError> {
            self.stash(descriptor.name(), FieldRefKind::Boxed)
        }

        fn decode_inline(
            &mut self,
            _token: ClassToken,
            _decoder: &dyn ObjectDecoder,
        ) -> Result<FieldRef, EncodingError> {
            Err(EncodingError::context("inline is not exercised here"))
        }

        fn decode_int(&mut self, d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
            self.stash(d.name(), FieldRefKind::Primitive(PrimitiveKind::Int))
        }
        fn decode_long(&mut self, d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
            self.stash(d.name(), FieldRefKind::Primitive(PrimitiveKind::Long))
        }
        fn decode_short(&mut self, d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
            self.stash(d.name(), FieldRefKind::Primitive(PrimitiveKind::Short))
        }
        fn decode_byte(&mut self, d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
            self.stash(d.name(), FieldRefKind::Primitive(PrimitiveKind::Byte))
        }
        fn decode_double(&mut self, d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
            self.stash(d.name(), FieldRefKind::Primitive(PrimitiveKind::Double))
        }
        fn decode_float(&mut self, d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
            self.stash(d.name(), FieldRefKind::Primitive(PrimitiveKind::Float))
        }
        fn decode_char(&mut self, d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
            self.stash(d.name(), FieldRefKind::Primitive(PrimitiveKind::Char))
        }
        fn decode_boolean(&mut self, d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
            self.stash(d.name(), FieldRefKind::Primitive(PrimitiveKind::Boolean))
        }
    }

    impl CreationContext for MapCtx {
        fn take_boxed(&mut self, field: &FieldRef) -> Result<Box<dyn Any>, EncodingError> {
            self.slots[field.slot()]
                .take()
                .ok_or_else(|| EncodingError::context("slot already taken"))
        }

        fn get_int(&mut self, f: &FieldRef) -> Result<i32, EncodingError> {
            self.take(f)
        }
        fn get_long(&mut self, f: &FieldRef) -> Result<i64, EncodingError> {
            self.take(f)
        }
        fn get_short(&mut self, f: &FieldRef) -> Result<i16, EncodingError> {
            self.take(f)
        }
        fn get_byte(&mut self, f: &FieldRef) -> Result<i8, EncodingError> {
            self.take(f)
        }
        fn get_double(&mut self, f: &FieldRef) -> Result<f64, EncodingError> {
            self.take(f)
        }
        fn get_float(&mut self, f: &FieldRef) -> Result<f32, EncodingError> {
            self.take(f)
        }
        fn get_char(&mut self, f: &FieldRef) -> Result<char, EncodingError> {
            self.take(f)
        }
        fn get_boolean(&mut self, f: &FieldRef) -> Result<bool, EncodingError> {
            self.take(f)
        }
    }

    fn decode_with<T: Mirrored>(mut ctx: MapCtx) -> Result<T, EncodingError> {
        let provider = DecoderPlanProvider::new();
        let plan = provider.get::<T>()?;
        let creator = plan.decode(&mut ctx)?;
        let instance = creator.create(&mut ctx)?;
        instance
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| EncodingError::context("decoded the wrong type"))
    }

    // ---- test classes ----

    #[derive(Default)]
    struct Shadowed {
        via_setter: i32,
        via_field: i32,
    }

    impl Mirrored for Shadowed {
        fn class_shape() -> &'static ClassShape {
            static SHAPE: OnceLock<ClassShape> = OnceLock::new();
            SHAPE.get_or_init(|| {
                ClassShape::builder::<Shadowed>("Shadowed")
                    .field(FieldShape::new::<Shadowed, i32>(
                        "count",
                        DeclaredType::INT,
                        |s, v| s.via_field = v,
                    ))
                    .method(MethodShape::setter::<Shadowed, i32>(
                        "setCount",
                        DeclaredType::INT,
                        |s, v| s.via_setter = v * 2,
                    ))
                    .default_constructor::<Shadowed>()
                    .build()
            })
        }
    }

    #[derive(Default)]
    struct Layered {
        own: i32,
        base: i32,
    }

    impl Mirrored for Layered {
        fn class_shape() -> &'static ClassShape {
            static SHAPE: OnceLock<ClassShape> = OnceLock::new();
            SHAPE.get_or_init(|| {
                ClassShape::builder::<Layered>("Layered")
                    .method(MethodShape::setter::<Layered, i32>(
                        "setX",
                        DeclaredType::INT,
                        |s, v| s.own = v,
                    ))
                    .extends(
                        ClassLevel::new("Base").with_method(MethodShape::setter::<Layered, i32>(
                            "setX",
                            DeclaredType::INT,
                            |s, v| s.base = v,
                        )),
                    )
                    .default_constructor::<Layered>()
                    .build()
            })
        }
    }

    #[derive(Default)]
    struct Scalars {
        i: i32,
        l: i64,
        s: i16,
        b: i8,
        d: f64,
        f: f32,
        c: char,
        flag: bool,
    }

    impl Mirrored for Scalars {
        fn class_shape() -> &'static ClassShape {
            static SHAPE: OnceLock<ClassShape> = OnceLock::new();
            SHAPE.get_or_init(|| {
                ClassShape::builder::<Scalars>("Scalars")
                    .field(FieldShape::new::<Scalars, i32>("i", DeclaredType::INT, |o, v| o.i = v))
                    .field(FieldShape::new::<Scalars, i64>("l", DeclaredType::LONG, |o, v| o.l = v))
                    .field(FieldShape::new::<Scalars, i16>("s", DeclaredType::SHORT, |o, v| o.s = v))
                    .field(FieldShape::new::<Scalars, i8>("b", DeclaredType::BYTE, |o, v| o.b = v))
                    .field(FieldShape::new::<Scalars, f64>("d", DeclaredType::DOUBLE, |o, v| o.d = v))
                    .field(FieldShape::new::<Scalars, f32>("f", DeclaredType::FLOAT, |o, v| o.f = v))
                    .field(FieldShape::new::<Scalars, char>("c", DeclaredType::CHAR, |o, v| o.c = v))
                    .field(FieldShape::new::<Scalars, bool>(
                        "flag",
                        DeclaredType::BOOLEAN,
                        |o, v| o.flag = v,
                    ))
                    .default_constructor::<Scalars>()
                    .build()
            })
        }
    }

    #[derive(Default, Debug)]
    struct Holder {
        value: Option<String>,
    }

    impl Mirrored for Holder {
        fn class_shape() -> &'static ClassShape {
            static SHAPE: OnceLock<ClassShape> = OnceLock::new();
            SHAPE.get_or_init(|| {
                ClassShape::builder::<Holder>("Holder")
                    .type_param("T")
                    .method(MethodShape::setter::<Holder, String>(
                        "setValue",
                        DeclaredType::Variable("T"),
                        |h, v| h.value = Some(v),
                    ))
                    .default_constructor::<Holder>()
                    .build()
            })
        }
    }

    #[derive(Default)]
    struct BadInline {
        data: Vec<i32>,
    }

    impl Mirrored for BadInline {
        fn class_shape() -> &'static ClassShape {
            static SHAPE: OnceLock<ClassShape> = OnceLock::new();
            SHAPE.get_or_init(|| {
                ClassShape::builder::<BadInline>("BadInline")
                    .method(
                        MethodShape::setter::<BadInline, Vec<i32>>(
                            "setData",
                            DeclaredType::array(DeclaredType::INT),
                            |o, v| o.data = v,
                        )
                        .annotate(FieldOptions::inline()),
                    )
                    .default_constructor::<BadInline>()
                    .build()
            })
        }
    }

    // ---- tests ----

    #[test]
    fn setter_shadows_field_with_same_name() {
        let ctx = MapCtx::new::<Shadowed>().value("count", 21i32);
        let decoded: Shadowed = decode_with(ctx).unwrap();
        assert_eq!(decoded.via_setter, 42);
        assert_eq!(decoded.via_field, 0);

        let provider = DecoderPlanProvider::new();
        assert_eq!(provider.get::<Shadowed>().unwrap().len(), 1);
    }

    #[test]
    fn derived_setter_shadows_superclass_setter() {
        let ctx = MapCtx::new::<Layered>().value("x", 7i32);
        let decoded: Layered = decode_with(ctx).unwrap();
        assert_eq!(decoded.own, 7);
        assert_eq!(decoded.base, 0);
    }

    #[test]
    fn primitives_take_their_typed_paths() {
        let ctx = MapCtx::new::<Scalars>()
            .value("i", 1i32)
            .value("l", 2i64)
            .value("s", 3i16)
            .value("b", 4i8)
            .value("d", 5.5f64)
            .value("f", 6.5f32)
            .value("c", 'x')
            .value("flag", true);
        let decoded: Scalars = decode_with(ctx).unwrap();
        assert_eq!(decoded.i, 1);
        assert_eq!(decoded.l, 2);
        assert_eq!(decoded.s, 3);
        assert_eq!(decoded.b, 4);
        assert_eq!(decoded.d, 5.5);
        assert_eq!(decoded.f, 6.5);
        assert_eq!(decoded.c, 'x');
        assert!(decoded.flag);
    }

    #[test]
    fn type_variable_resolves_through_the_context_token() {
        let token =
            ClassToken::of::<Holder>().with_args(vec![TypeToken::Class(ClassToken::opaque::<
                String,
            >("String"))]);
        let ctx = MapCtx::with_token(token).value("value", "hello".to_owned());
        let decoded: Holder = decode_with(ctx).unwrap();
        assert_eq!(decoded.value.as_deref(), Some("hello"));
    }

    #[test]
    fn missing_type_argument_is_reported() {
        let ctx = MapCtx::new::<Holder>().value("value", "hello".to_owned());
        let err = decode_with::<Holder>(ctx).unwrap_err();
        assert!(matches!(
            err,
            EncodingError::UnresolvedTypeParameter {
                param: "T",
                class: "Holder"
            }
        ));
    }

    #[test]
    fn substitution_recurses_into_arrays_and_type_arguments() {
        #[derive(Default, Debug)]
        struct Tags {
            tags: Vec<String>,
        }
        impl Mirrored for Tags {
            fn class_shape() -> &'static ClassShape {
                static SHAPE: OnceLock<ClassShape> = OnceLock::new();
                SHAPE.get_or_init(|| {
                    ClassShape::builder::<Tags>("Tags")
                        .type_param("T")
                        .method(MethodShape::setter::<Tags, Vec<String>>(
                            "setTags",
                            DeclaredType::array(DeclaredType::Variable("T")),
                            |t, v| t.tags = v,
                        ))
                        .method(MethodShape::setter::<Tags, Vec<String>>(
                            "setPool",
                            DeclaredType::Class {
                                class: ClassId::opaque::<Vec<String>>("List"),
                                args: vec![DeclaredType::Variable("T")],
                            },
                            |t, v| t.tags = v,
                        ))
                        .default_constructor::<Tags>()
                        .build()
                })
            }
        }

        struct TypeRecorder {
            token: ClassToken,
            seen: Vec<String>,
        }

        impl ObjectDecoderContext for TypeRecorder {
            fn type_token(&self) -> &ClassToken {
                &self.token
            }
            fn decode_boxed(
                &mut self,
                _d: FieldDescriptor,
                ty: TypeToken,
            ) -> Result<FieldRef, EncodingError> {
                self.seen.push(ty.to_string());
                Ok(FieldRef::boxed(self.seen.len() - 1))
            }
            fn decode_inline(
                &mut self,
                _token: ClassToken,
                _decoder: &dyn ObjectDecoder,
            ) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_int(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_long(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_short(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_byte(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_double(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_float(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_char(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_boolean(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
        }

        let provider = DecoderPlanProvider::new();
        let plan = provider.get::<Tags>().unwrap();
        let token = ClassToken::of::<Tags>().with_args(vec![TypeToken::Class(
            ClassToken::opaque::<String>("String"),
        )]);
        let mut ctx = TypeRecorder {
            token,
            seen: Vec::new(),
        };
        plan.decode(&mut ctx).unwrap();
        assert_eq!(ctx.seen, ["String[]", "List<String>"]);
    }

    #[test]
    fn inline_on_a_type_variable_fails_at_plan_construction() {
        #[derive(Default)]
        struct GenericInline {
            value: String,
        }
        impl Mirrored for GenericInline {
            fn class_shape() -> &'static ClassShape {
                static SHAPE: OnceLock<ClassShape> = OnceLock::new();
                SHAPE.get_or_init(|| {
                    ClassShape::builder::<GenericInline>("GenericInline")
                        .type_param("T")
                        .method(
                            MethodShape::setter::<GenericInline, String>(
                                "setValue",
                                DeclaredType::Variable("T"),
                                |g, v| g.value = v,
                            )
                            .annotate(FieldOptions::inline()),
                        )
                        .default_constructor::<GenericInline>()
                        .build()
                })
            }
        }

        let provider = DecoderPlanProvider::new();
        let err = provider.get::<GenericInline>().unwrap_err();
        assert!(matches!(
            err,
            EncodingError::InvalidInline { ref field, class: "GenericInline", .. } if field == "value"
        ));
    }

    #[test]
    fn inline_on_a_non_class_type_fails_at_plan_construction() {
        let provider = DecoderPlanProvider::new();
        let err = provider.get::<BadInline>().unwrap_err();
        assert!(matches!(
            err,
            EncodingError::InvalidInline { ref field, class: "BadInline", .. } if field == "data"
        ));
    }

    #[test]
    fn boxed_ref_for_a_non_primitive_declaration_round_trips() {
        #[derive(Default)]
        struct Named {
            name: String,
        }
        impl Mirrored for Named {
            fn class_shape() -> &'static ClassShape {
                static SHAPE: OnceLock<ClassShape> = OnceLock::new();
                SHAPE.get_or_init(|| {
                    ClassShape::builder::<Named>("Named")
                        .method(MethodShape::setter::<Named, String>(
                            "setName",
                            DeclaredType::opaque::<String>("String"),
                            |n, v| n.name = v,
                        ))
                        .default_constructor::<Named>()
                        .build()
                })
            }
        }

        let ctx = MapCtx::new::<Named>().value("name", "ada".to_owned());
        let decoded: Named = decode_with(ctx).unwrap();
        assert_eq!(decoded.name, "ada");
    }

    #[test]
    fn primitive_ref_for_a_boxed_declaration_is_unsupported() {
        // A context that hands back a primitive reference where the plan
        // asked for a boxed one.
        struct Hostile {
            token: ClassToken,
        }

        impl ObjectDecoderContext for Hostile {
            fn type_token(&self) -> &ClassToken {
                &self.token
            }
            fn decode_boxed(
                &mut self,
                _d: FieldDescriptor,
                _ty: TypeToken,
            ) -> Result<FieldRef, EncodingError> {
                Ok(FieldRef::primitive(PrimitiveKind::Int, 0))
            }
            fn decode_inline(
                &mut self,
                _token: ClassToken,
                _decoder: &dyn ObjectDecoder,
            ) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_int(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_long(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_short(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_byte(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_double(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_float(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_char(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn decode_boolean(&mut self, _d: FieldDescriptor) -> Result<FieldRef, EncodingError> {
                Err(EncodingError::context("unused"))
            }
        }

        #[derive(Default)]
        struct Named {
            name: String,
        }
        impl Mirrored for Named {
            fn class_shape() -> &'static ClassShape {
                static SHAPE: OnceLock<ClassShape> = OnceLock::new();
                SHAPE.get_or_init(|| {
                    ClassShape::builder::<Named>("Named2")
                        .method(MethodShape::setter::<Named, String>(
                            "setName",
                            DeclaredType::opaque::<String>("String"),
                            |n, v| n.name = v,
                        ))
                        .default_constructor::<Named>()
                        .build()
                })
            }
        }

        let provider = DecoderPlanProvider::new();
        let plan = provider.get::<Named>().unwrap();
        let mut ctx = Hostile {
            token: ClassToken::of::<Named>(),
        };
        let creator = plan.decode(&mut ctx).unwrap();

        struct NoValues;
        impl CreationContext for NoValues {
            fn take_boxed(&mut self, _f: &FieldRef) -> Result<Box<dyn Any>, EncodingError> {
                Err(EncodingError::context("unused"))
            }
            fn get_int(&mut self, _f: &FieldRef) -> Result<i32, EncodingError> {
                Ok(0)
            }
            fn get_long(&mut self, _f: &FieldRef) -> Result<i64, EncodingError> {
                Ok(0)
            }
            fn get_short(&mut self, _f: &FieldRef) -> Result<i16, EncodingError> {
                Ok(0)
            }
            fn get_byte(&mut self, _f: &FieldRef) -> Result<i8, EncodingError> {
                Ok(0)
            }
            fn get_double(&mut self, _f: &FieldRef) -> Result<f64, EncodingError> {
                Ok(0.0)
            }
            fn get_float(&mut self, _f: &FieldRef) -> Result<f32, EncodingError> {
                Ok(0.0)
            }
            fn get_char(&mut self, _f: &FieldRef) -> Result<char, EncodingError> {
                Ok('\0')
            }
            fn get_boolean(&mut self, _f: &FieldRef) -> Result<bool, EncodingError> {
                Ok(false)
            }
        }

        let err = creator.create(&mut NoValues).unwrap_err();
        assert!(matches!(err, EncodingError::UnsupportedType { .. }));
    }

    #[test]
    fn missing_constructor_is_an_instantiation_error() {
        struct NoCtor;
        impl Mirrored for NoCtor {
            fn class_shape() -> &'static ClassShape {
                static SHAPE: OnceLock<ClassShape> = OnceLock::new();
                SHAPE.get_or_init(|| ClassShape::builder::<NoCtor>("NoCtor").build())
            }
        }

        let err = ShapeInstantiator
            .new_instance(&ClassToken::of::<NoCtor>())
            .unwrap_err();
        assert!(matches!(
            err,
            EncodingError::Instantiation { class: "NoCtor", .. }
        ));
    }

    #[test]
    fn provider_caches_by_class() {
        let provider = DecoderPlanProvider::new();
        let first = provider.get::<Shadowed>().unwrap();
        let second = provider.get::<Shadowed>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn method_named_exactly_set_is_not_classified() {
        #[derive(Default)]
        struct Bare;
        impl Mirrored for Bare {
            fn class_shape() -> &'static ClassShape {
                static SHAPE: OnceLock<ClassShape> = OnceLock::new();
                SHAPE.get_or_init(|| {
                    ClassShape::builder::<Bare>("Bare")
                        .method(MethodShape::raw("set", vec![DeclaredType::INT], None))
                        .default_constructor::<Bare>()
                        .build()
                })
            }
        }

        let provider = DecoderPlanProvider::new();
        assert!(provider.get::<Bare>().unwrap().is_empty());
    }
}
