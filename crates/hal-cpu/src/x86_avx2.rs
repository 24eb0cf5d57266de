//! AVX2 accelerated backend (§4.5, component G).
//!
//! Unpacks ternary codes with the same bit layout as the scalar
//! reference, then vectorizes the multiply-accumulate with 8-wide
//! 32-bit lanes. Declares `AVX2` in `required_features`; the kernel
//! uses no FMA instruction, so the mask names only what the code
//! actually needs.

use neuronos_hal_core::{
    unpack_group, BackendDescriptor, BackendType, DispatchStatus, FeatureBits, KernelConfig, BYTES_PER_GROUP,
    GROUP_SIZE,
};

pub fn descriptor() -> BackendDescriptor {
    BackendDescriptor {
        name: "x86-avx2",
        backend_type: BackendType::Avx2,
        priority: neuronos_hal_core::backend::priority::SIMD,
        required_features: FeatureBits::AVX2,
        kernel_config: KernelConfig::scalar_default(),
        vec_dot,
        quantize,
        gemv: None,
        gemm: None,
        init: None,
        shutdown: None,
    }
}

/// # Safety
/// See [`neuronos_hal_core::VecDotFn`]. Caller must additionally ensure
/// the host supports AVX2 (the registry only activates this descriptor
/// when it is in the probed feature mask).
#[target_feature(enable = "avx2")]
unsafe fn vec_dot(
    n: usize,
    out: *mut f32,
    out_stride: usize,
    weights: *const u8,
    weight_row_stride: usize,
    acts: *const i8,
    act_row_stride: usize,
    nrc: usize,
) -> DispatchStatus {
    use std::arch::x86_64::*;

    if n == 0 || n % GROUP_SIZE != 0 {
        return DispatchStatus::Invalid;
    }
    let groups = n / GROUP_SIZE;
    let mut unpacked = [0i32; GROUP_SIZE];

    for row in 0..nrc {
        let w_row = weights.add(row * weight_row_stride);
        let a_row = acts.add(row * act_row_stride);
        let mut acc_vec = _mm256_setzero_si256();

        for g in 0..groups {
            let group_bytes = std::slice::from_raw_parts(w_row.add(g * BYTES_PER_GROUP), BYTES_PER_GROUP);
            let packed: &[u8; BYTES_PER_GROUP] = group_bytes.try_into().expect("slice has exactly BYTES_PER_GROUP len");
            unpack_group(packed, &mut unpacked);

            for lane in (0..GROUP_SIZE).step_by(8) {
                let w = _mm256_loadu_si256(unpacked.as_ptr().add(lane) as *const __m256i);
                let mut acts8 = [0i32; 8];
                for k in 0..8 {
                    acts8[k] = *a_row.add(g * GROUP_SIZE + lane + k) as i32;
                }
                let a = _mm256_loadu_si256(acts8.as_ptr() as *const __m256i);
                acc_vec = _mm256_add_epi32(acc_vec, _mm256_mullo_epi32(w, a));
            }
        }

        *out.add(row * out_stride) = horizontal_sum_epi32(acc_vec) as f32;
    }

    DispatchStatus::Ok
}

#[target_feature(enable = "avx2")]
unsafe fn horizontal_sum_epi32(v: std::arch::x86_64::__m256i) -> i32 {
    let mut lanes = [0i32; 8];
    std::arch::x86_64::_mm256_storeu_si256(lanes.as_mut_ptr() as *mut std::arch::x86_64::__m256i, v);
    lanes.iter().sum()
}

/// # Safety
/// See [`neuronos_hal_core::QuantizeFn`]. Delegates to the scalar
/// rounding rule; AVX2 buys throughput on the hot `vec_dot` path, not
/// on the comparatively rare quantization pass.
#[target_feature(enable = "avx2")]
unsafe fn quantize(src: *const f32, dst: *mut u8, nrow: usize, n_per_row: usize, quant_weights: *const f32) -> usize {
    crate::scalar::quantize_ref(src, dst, nrow, n_per_row, quant_weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_requires_avx2() {
        let d = descriptor();
        assert!(d.is_feasible(FeatureBits::AVX2));
        assert!(d.is_feasible(FeatureBits::AVX2 | FeatureBits::FMA));
        assert!(!d.is_feasible(FeatureBits::none()));
    }

    #[test]
    fn matches_scalar_reference_when_avx2_is_available() {
        if !is_x86_feature_detected!("avx2") {
            return;
        }
        let mut src = [0f32; GROUP_SIZE];
        for (i, v) in src.iter_mut().enumerate() {
            *v = ((i % 5) as f32) - 2.0;
        }
        let mut packed = [0u8; BYTES_PER_GROUP];
        unsafe { quantize(src.as_ptr(), packed.as_mut_ptr(), 1, GROUP_SIZE, std::ptr::null()) };

        let acts = [3i8; GROUP_SIZE];
        let mut avx_out = [0f32; 1];
        let mut scalar_out = [0f32; 1];
        unsafe {
            vec_dot(GROUP_SIZE, avx_out.as_mut_ptr(), 1, packed.as_ptr(), BYTES_PER_GROUP, acts.as_ptr(), GROUP_SIZE, 1);
            (crate::scalar::descriptor().vec_dot)(
                GROUP_SIZE,
                scalar_out.as_mut_ptr(),
                1,
                packed.as_ptr(),
                BYTES_PER_GROUP,
                acts.as_ptr(),
                GROUP_SIZE,
                1,
            );
        }
        assert_eq!(avx_out[0], scalar_out[0]);
    }
}
