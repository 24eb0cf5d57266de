//! Compile-time backend roster (§4.2: "registers the compile-time
//! roster of backends"). The scalar backend is unconditional; every
//! accelerated backend is cfg-gated to the target and Cargo feature
//! that implements it, so a binary built for, say, `aarch64` never
//! carries dead x86 code.

use neuronos_hal_core::BackendDescriptor;

/// All backends this crate was compiled with, scalar first. The
/// registry's selector, not this function, decides which one runs.
pub fn compiled_in_backends() -> Vec<BackendDescriptor> {
    let mut roster = vec![crate::scalar::descriptor()];

    #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
    {
        roster.push(crate::x86_avx2::descriptor());
    }

    #[cfg(all(target_arch = "x86_64", feature = "avx-vnni"))]
    {
        roster.push(crate::x86_avx_vnni::descriptor());
    }

    #[cfg(all(target_arch = "aarch64", feature = "neon"))]
    {
        roster.push(crate::arm_neon::descriptor());
    }

    roster
}
