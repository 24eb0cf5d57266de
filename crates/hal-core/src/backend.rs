//! Backend descriptor (§3, component C): the record a backend registers
//! with the HAL. Immutable after registration, held by value.

use crate::features::FeatureBits;
use crate::kernel::{BackendInitFn, BackendShutdownFn, GemmFn, GemvFn, KernelConfig, QuantizeFn, VecDotFn};

/// Enumerated backend type tag, used by `select_backend` and reported
/// in diagnostics. New accelerated backends add a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BackendType {
    Scalar,
    Avx2,
    AvxVnni,
    Neon,
    RiscvVector,
    WasmSimd,
    Gpu,
}

impl BackendType {
    pub fn as_str(self) -> &'static str {
        match self {
            BackendType::Scalar => "scalar",
            BackendType::Avx2 => "avx2",
            BackendType::AvxVnni => "avx-vnni",
            BackendType::Neon => "neon",
            BackendType::RiscvVector => "riscv-vector",
            BackendType::WasmSimd => "wasm-simd",
            BackendType::Gpu => "gpu",
        }
    }
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority bands from §3. Higher wins during selection; ties broken
/// by earlier registration order.
pub mod priority {
    pub const SCALAR: i32 = 0;
    pub const SIMD: i32 = 50;
    pub const AVX_VNNI: i32 = 75;
    pub const GPU: i32 = 100;
}

/// A registered backend. Copies are cheap: every field is either
/// `Copy` or a `&'static str`/function pointer, matching the design
/// note that backends are "plain records of function references plus
/// metadata" rather than trait objects.
#[derive(Debug, Clone, Copy)]
pub struct BackendDescriptor {
    pub name: &'static str,
    pub backend_type: BackendType,
    pub priority: i32,
    pub required_features: FeatureBits,
    pub kernel_config: KernelConfig,
    pub vec_dot: VecDotFn,
    pub quantize: QuantizeFn,
    pub gemv: Option<GemvFn>,
    pub gemm: Option<GemmFn>,
    pub init: Option<BackendInitFn>,
    pub shutdown: Option<BackendShutdownFn>,
}

impl BackendDescriptor {
    /// True iff every feature this backend requires is present in `probed`.
    pub fn is_feasible(&self, probed: FeatureBits) -> bool {
        probed.satisfies(self.required_features)
    }

    pub fn view(&self) -> BackendDescriptorView {
        BackendDescriptorView {
            name: self.name.to_string(),
            backend_type: self.backend_type,
            priority: self.priority,
            required_features: self.required_features.bits(),
            kernel_config: self.kernel_config,
            has_gemv: self.gemv.is_some(),
            has_gemm: self.gemm.is_some(),
        }
    }
}

/// Read-only, serializable projection of a [`BackendDescriptor`] for
/// diagnostics (`get_active_backend`, `get_backend`, `print_info`).
/// Function pointers aren't meaningful to print, so the view omits them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BackendDescriptorView {
    pub name: String,
    pub backend_type: BackendType,
    pub priority: i32,
    pub required_features: u32,
    pub kernel_config: KernelConfig,
    pub has_gemv: bool,
    pub has_gemm: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchStatus;

    unsafe fn noop_vec_dot(
        _n: usize,
        _out: *mut f32,
        _out_stride: usize,
        _weights: *const u8,
        _weight_row_stride: usize,
        _acts: *const i8,
        _act_row_stride: usize,
        _nrc: usize,
    ) -> DispatchStatus {
        DispatchStatus::Ok
    }

    unsafe fn noop_quantize(_src: *const f32, _dst: *mut u8, _nrow: usize, _n_per_row: usize, _qw: *const f32) -> usize {
        0
    }

    fn test_descriptor(priority: i32, required: FeatureBits) -> BackendDescriptor {
        BackendDescriptor {
            name: "test",
            backend_type: BackendType::Scalar,
            priority,
            required_features: required,
            kernel_config: KernelConfig::scalar_default(),
            vec_dot: noop_vec_dot,
            quantize: noop_quantize,
            gemv: None,
            gemm: None,
            init: None,
            shutdown: None,
        }
    }

    #[test]
    fn feasibility_is_subset_check() {
        let d = test_descriptor(priority::SIMD, FeatureBits::AVX2);
        assert!(d.is_feasible(FeatureBits::AVX2 | FeatureBits::FMA));
        assert!(!d.is_feasible(FeatureBits::FMA));
    }

    #[test]
    fn view_omits_function_pointers_but_keeps_shape() {
        let d = test_descriptor(priority::SCALAR, FeatureBits::none());
        let v = d.view();
        assert_eq!(v.name, "test");
        assert!(!v.has_gemv);
        assert!(!v.has_gemm);
    }
}
