//! Capability Probe (§4.3, component A).
//!
//! Detects ISA features at runtime on x86/x86-64 and ARM/aarch64, and
//! falls back to compile-time inference on every other target. Never
//! executes an instruction that would fault on the host: detection
//! goes through `std::is_x86_feature_detected!`/`is_aarch64_feature_detected!`,
//! which read CPUID / the OS-exposed capability word rather than probing
//! by trapping.

use neuronos_hal_core::FeatureBits;

/// Probes the current host once. Cheap enough to call more than once,
/// but the facade crate caches the result behind its `OnceLock`.
pub fn probe() -> FeatureBits {
    let mut bits = FeatureBits::none();

    #[cfg(target_arch = "x86_64")]
    {
        bits |= probe_x86_64();
    }

    #[cfg(target_arch = "aarch64")]
    {
        bits |= probe_aarch64();
    }

    #[cfg(target_arch = "riscv64")]
    {
        bits |= probe_riscv();
    }

    #[cfg(target_arch = "wasm32")]
    {
        bits |= probe_wasm();
    }

    bits
}

#[cfg(target_arch = "x86_64")]
fn probe_x86_64() -> FeatureBits {
    let mut bits = FeatureBits::none();
    if is_x86_feature_detected!("sse3") {
        bits |= FeatureBits::SSE3;
    }
    if is_x86_feature_detected!("ssse3") {
        bits |= FeatureBits::SSSE3;
    }
    if is_x86_feature_detected!("avx") {
        bits |= FeatureBits::AVX;
    }
    if is_x86_feature_detected!("avx2") {
        bits |= FeatureBits::AVX2;
    }
    if is_x86_feature_detected!("avx512f") {
        bits |= FeatureBits::AVX512F;
    }
    if is_x86_feature_detected!("avx512vnni") {
        bits |= FeatureBits::AVX512_VNNI;
    }
    if is_x86_feature_detected!("fma") {
        bits |= FeatureBits::FMA;
    }
    // `avxvnni` (the non-AVX-512 VNNI extension) is gated behind a
    // nightly-only std feature on stable Rust; treat AVX512-VNNI as the
    // sole source of the AVX_VNNI bit until std exposes the AVX-VNNI
    // detection string on stable.
    if is_x86_feature_detected!("avx512vnni") {
        bits |= FeatureBits::AVX_VNNI;
    }
    bits
}

#[cfg(target_arch = "aarch64")]
fn probe_aarch64() -> FeatureBits {
    // NEON is mandatory on aarch64; DOTPROD is mandatory on Apple
    // silicon and optional elsewhere (§4.3).
    let mut bits = FeatureBits::NEON;
    if cfg!(target_vendor = "apple") {
        bits |= FeatureBits::DOTPROD;
    } else if is_aarch64_feature_detected!("dotprod") {
        bits |= FeatureBits::DOTPROD;
    }
    if is_aarch64_feature_detected!("sve") {
        bits |= FeatureBits::SVE;
    }
    if is_aarch64_feature_detected!("sve2") {
        bits |= FeatureBits::SVE2;
    }
    if is_aarch64_feature_detected!("i8mm") {
        bits |= FeatureBits::I8MM;
    }
    bits
}

#[cfg(target_arch = "riscv64")]
fn probe_riscv() -> FeatureBits {
    // No stable runtime detection macro for RVV; rely on the
    // compile-time target feature instead (§4.3: "compile-time
    // inference only").
    if cfg!(target_feature = "v") {
        FeatureBits::RVV
    } else {
        FeatureBits::none()
    }
}

#[cfg(target_arch = "wasm32")]
fn probe_wasm() -> FeatureBits {
    if cfg!(target_feature = "simd128") {
        FeatureBits::WASM_SIMD
    } else {
        FeatureBits::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_never_panics_on_this_host() {
        let _ = probe();
    }

    #[cfg(target_arch = "aarch64")]
    #[test]
    fn aarch64_always_reports_neon() {
        assert!(probe().satisfies(FeatureBits::NEON));
    }
}
