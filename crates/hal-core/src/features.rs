//! Capability feature bitmask (§3, component A).
//!
//! A fixed 32-bit set of named flags partitioned into ISA families.
//! Populated once at init by the capability probe; read-only thereafter.

use bitflags::bitflags;

bitflags! {
    /// Probed CPU/GPU capability bits. A backend's `required_features`
    /// must be a subset of this mask to be eligible for selection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FeatureBits: u32 {
        // x86 / x86-64
        const SSE3          = 1 << 0;
        const SSSE3         = 1 << 1;
        const AVX           = 1 << 2;
        const AVX2          = 1 << 3;
        const AVX_VNNI      = 1 << 4;
        const AVX512F       = 1 << 5;
        const AVX512_VNNI   = 1 << 6;
        const FMA           = 1 << 7;

        // ARM / aarch64
        const NEON          = 1 << 8;
        const DOTPROD       = 1 << 9;
        const SVE           = 1 << 10;
        const SVE2          = 1 << 11;
        const I8MM          = 1 << 12;

        // RISC-V
        const RVV           = 1 << 13;

        // WebAssembly
        const WASM_SIMD     = 1 << 14;

        // GPU kinds (presence only; the GPU device probe in
        // `neuronos-hal-gpu` is the source of the detailed record)
        const GPU_CUDA      = 1 << 24;
        const GPU_VULKAN    = 1 << 25;
        const GPU_METAL     = 1 << 26;
        const GPU_OPENCL    = 1 << 27;
    }
}

impl FeatureBits {
    /// The empty mask, i.e. the requirement every scalar backend declares.
    pub fn none() -> Self {
        Self::empty()
    }

    /// True iff every bit `required` sets is also set in `self`.
    pub fn satisfies(self, required: FeatureBits) -> bool {
        self.contains(required)
    }
}
