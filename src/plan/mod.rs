//! Plans: the per-class encode and decode programs compiled from a
//! registered [`ClassShape`](crate::shape::ClassShape).
//!
//! A plan is built once per class, classifies and names the shape's members
//! up front, and is then replayed against any number of instances. The
//! providers cache plans by `TypeId`.

mod decode;
mod encode;

pub use decode::{DecoderPlan, DecoderPlanProvider, ShapeInstantiator};
pub use encode::{EncoderPlan, EncoderPlanProvider};
