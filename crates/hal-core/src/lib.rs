//! Hardware-independent contracts, registry, and dispatch facade for
//! the NeuronOS ternary-matmul hardware abstraction layer.
//!
//! This crate defines what a backend is (a [`backend::BackendDescriptor`],
//! a plain record of function pointers plus metadata — never a trait
//! object), how backends are registered and selected
//! ([`registry::Registry`]), and how the hot path dispatches into the
//! active one ([`dispatch`], as inherent methods on `Registry`). It has
//! no knowledge of any concrete CPU or GPU backend: those live in
//! `neuronos-hal-cpu` and `neuronos-hal-gpu`, and are wired together by
//! the `neuronos-hal` facade crate.

pub mod backend;
pub mod dispatch;
pub mod error;
pub mod features;
pub mod kernel;
pub mod registry;
pub mod tier;

pub use backend::{BackendDescriptor, BackendDescriptorView, BackendType};
pub use error::{DispatchStatus, HalError};
pub use features::FeatureBits;
pub use kernel::{
    pack_group, pack_ternary, unpack_group, unpack_ternary, BackendInitFn, BackendShutdownFn, GemmFn, GemvFn,
    KernelConfig, QuantizeFn, VecDotFn, BYTES_PER_GROUP, GROUP_SIZE,
};
pub use registry::{HalState, Registry, MAX_BACKENDS};
pub use tier::{classify as classify_device_tier, DeviceTier, Profile};
