use core::any::{Any, TypeId};
use core::fmt;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::annotations::{FieldOptions, Ignore};
use crate::context::{ObjectEncoder, ObjectEncoderContext};
use crate::descriptor::FieldDescriptor;
use crate::error::EncodingError;
use crate::naming;
use crate::shape::{ClassShape, MethodShape, Mirrored};

// -----------------------------------------------------------------------------
// EncoderPlan

struct EncodeBinding {
    inline: bool,
    getter: &'static MethodShape,
}

/// The compiled encode program of one class: every classified getter, in a
/// stable order, with its field descriptor resolved up front.
///
/// Fields are ordered most-derived level first, declaration order within a
/// level; when two levels derive the same field name, the more derived
/// getter wins and the other is dropped.
pub struct EncoderPlan {
    shape: &'static ClassShape,
    bindings: Vec<(FieldDescriptor, EncodeBinding)>,
}

impl EncoderPlan {
    /// Compiles the encode plan of a shape.
    ///
    /// Only getters participate: public, non-static, zero-parameter,
    /// non-void methods with a `get`/`is` name or an override. Declared
    /// fields are decode-only.
    pub fn build(shape: &'static ClassShape) -> Self {
        let mut bindings: Vec<(FieldDescriptor, EncodeBinding)> = Vec::new();
        for level in shape.levels() {
            for method in level.methods() {
                if method.annotations().contains::<Ignore>() {
                    continue;
                }
                let Some(name) = naming::getter_name(method) else {
                    continue;
                };
                if bindings.iter().any(|(d, _)| d.name() == name) {
                    continue;
                }
                // Classified getters always declare a return type.
                let Some(returns) = method.return_type() else {
                    continue;
                };
                let descriptor =
                    naming::build_field_descriptor(&name, method.annotations(), returns);
                let inline = method
                    .annotations()
                    .get::<FieldOptions>()
                    .is_some_and(|opts| opts.inline);
                bindings.push((descriptor, EncodeBinding { inline, getter: method }));
            }
        }
        Self { shape, bindings }
    }

    /// Returns the shape the plan was compiled from.
    #[inline]
    pub fn shape(&self) -> &'static ClassShape {
        self.shape
    }

    /// Returns the resolved field descriptors, in encode order.
    #[inline]
    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.bindings.iter().map(|(descriptor, _)| descriptor)
    }

    /// Returns the number of encoded fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if the plan encodes no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Debug for EncoderPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderPlan")
            .field("shape", &self.shape.name())
            .field("fields", &self.descriptors().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ObjectEncoder for EncoderPlan {
    fn encode(
        &self,
        value: &dyn Any,
        ctx: &mut dyn ObjectEncoderContext,
    ) -> Result<(), EncodingError> {
        for (descriptor, binding) in &self.bindings {
            let fetched =
                binding
                    .getter
                    .invoke_getter(value)
                    .map_err(|source| EncodingError::Field {
                        field: descriptor.name().to_owned(),
                        class: self.shape.name(),
                        source,
                    })?;
            if binding.inline {
                ctx.inline(fetched)?;
            } else {
                ctx.add(descriptor, fetched)?;
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// EncoderPlanProvider

/// Builds and caches [`EncoderPlan`]s by class.
pub struct EncoderPlanProvider {
    cache: RwLock<HashMap<TypeId, Arc<EncoderPlan>>>,
}

impl EncoderPlanProvider {
    /// Creates a provider with an empty cache.
    pub fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the cached plan for the registered class `T`, compiling it on
    /// first use.
    pub fn get<T: Mirrored>(&self) -> Arc<EncoderPlan> {
        self.get_shape(T::class_shape())
    }

    /// Returns the cached plan for a shape, compiling it on first use.
    pub fn get_shape(&self, shape: &'static ClassShape) -> Arc<EncoderPlan> {
        if let Some(plan) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&shape.id())
        {
            return Arc::clone(plan);
        }
        let plan = Arc::new(EncoderPlan::build(shape));
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(shape.id()).or_insert(plan))
    }
}

impl Default for EncoderPlanProvider {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// Tests
