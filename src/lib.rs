//! Shape-driven bridge between plain data objects and a generic
//! structured-encoding model.
//!
//! `objbind` compiles per-class *plans* out of explicitly registered class
//! shapes and replays them against instances. The encode plan walks a class's
//! bean getters and feeds each value to an [`ObjectEncoderContext`]; the
//! decode plan classifies setters and public fields, resolves their names and
//! types up front, and decodes in two phases through an
//! [`ObjectDecoderContext`] and a [`CreationContext`]. The wire format lives
//! entirely in those context implementations; this crate only maps objects
//! onto logical fields.
//!
//! # Registering a class
//!
//! A type opts in by implementing [`Mirrored`] and describing itself as a
//! [`ClassShape`]: its fields and accessor methods, their declared types,
//! annotations and hierarchy levels. The shape plays the role runtime
//! reflection would, so the classification rules are bean-style:
//!
//! - decode uses `setXyz` methods (any visibility) and public fields;
//! - encode uses public `getXyz` methods, plus `isXyz` for the boolean
//!   primitive;
//! - [`FieldOptions`] overrides a derived name or flattens a nested object,
//!   [`Ignore`] excludes a member entirely;
//! - a more derived declaration shadows a less derived one of the same name,
//!   and on the decode side a setter shadows a same-named field.
//!
//! ```
//! use std::sync::OnceLock;
//! use objbind::{
//!     ClassShape, DeclaredType, EncoderPlanProvider, FieldShape, MethodShape, Mirrored,
//! };
//!
//! #[derive(Default)]
//! struct User {
//!     name: String,
//!     age: i32,
//! }
//!
//! impl Mirrored for User {
//!     fn class_shape() -> &'static ClassShape {
//!         static SHAPE: OnceLock<ClassShape> = OnceLock::new();
//!         SHAPE.get_or_init(|| {
//!             ClassShape::builder::<User>("User")
//!                 .method(MethodShape::getter::<User, String>(
//!                     "getName",
//!                     DeclaredType::opaque::<String>("String"),
//!                     |u| u.name.clone(),
//!                 ))
//!                 .method(MethodShape::setter::<User, String>(
//!                     "setName",
//!                     DeclaredType::opaque::<String>("String"),
//!                     |u, v| u.name = v,
//!                 ))
//!                 .field(FieldShape::new::<User, i32>("age", DeclaredType::INT, |u, v| {
//!                     u.age = v
//!                 }))
//!                 .default_constructor::<User>()
//!                 .build()
//!         })
//!     }
//! }
//!
//! let plans = EncoderPlanProvider::new();
//! let plan = plans.get::<User>();
//! let names: Vec<_> = plan.descriptors().map(|d| d.name().to_owned()).collect();
//! assert_eq!(names, ["name"]);
//! ```
//!
//! # Generic classes
//!
//! A shape declares its type parameters by name and members may reference
//! them via [`DeclaredType::Variable`]; the decode context's
//! [`ClassToken`] supplies the actual arguments, and the plan substitutes
//! them recursively before asking the context for the field.

pub mod annotations;
pub mod classify;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod naming;
pub mod plan;
pub mod shape;
pub mod token;

pub use annotations::{Annotation, AnnotationSet, ExtraPropertySpec, FieldOptions, Ignore};
pub use context::{
    CreationContext, FieldRef, FieldRefKind, InstanceCreator, ObjectDecoder, ObjectDecoderContext,
    ObjectEncoder, ObjectEncoderContext, TypeCreator,
};
pub use descriptor::{FieldDescriptor, FieldDescriptorBuilder};
pub use error::{AccessError, EncodingError};
pub use plan::{DecoderPlan, DecoderPlanProvider, EncoderPlan, EncoderPlanProvider, ShapeInstantiator};
pub use shape::{
    ClassId, ClassLevel, ClassShape, ClassShapeBuilder, DeclaredType, FieldShape, MethodShape,
    Mirrored, Visibility,
};
pub use token::{ClassToken, PrimitiveKind, RawType, TypeToken};
