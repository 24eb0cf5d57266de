//! CPU-side capability probe and ternary-matmul kernel backends.
//!
//! Exposes [`probe::probe`] (component A, §4.3), the always-feasible
//! [`scalar`] reference backend (component F, §4.4), and feature-gated
//! accelerated backends (component G, §4.5). [`roster::compiled_in_backends`]
//! is what the `neuronos-hal` facade crate feeds into the registry at
//! `init()`.

#![allow(clippy::missing_safety_doc)]

pub mod probe;
pub mod scalar;
pub mod roster;

#[cfg(target_arch = "x86_64")]
pub mod x86_avx2;
#[cfg(target_arch = "x86_64")]
pub mod x86_avx_vnni;
#[cfg(target_arch = "aarch64")]
pub mod arm_neon;

pub use probe::probe;
pub use roster::compiled_in_backends;
