//! ARM NEON accelerated backend (§4.5, component G).
//!
//! Declares `NEON` in `required_features`; on aarch64 this is always
//! present (§4.3), so in practice NEON is the priority-50 default
//! whenever no higher-priority backend is feasible.

use neuronos_hal_core::{
    unpack_group, BackendDescriptor, BackendType, DispatchStatus, FeatureBits, KernelConfig, BYTES_PER_GROUP,
    GROUP_SIZE,
};

pub fn descriptor() -> BackendDescriptor {
    BackendDescriptor {
        name: "arm-neon",
        backend_type: BackendType::Neon,
        priority: neuronos_hal_core::backend::priority::SIMD,
        required_features: FeatureBits::NEON,
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
/// See [`neuronos_hal_core::VecDotFn`]. Caller must ensure the host
/// supports NEON (guaranteed on every aarch64 target, §4.3).
#[target_feature(enable = "neon")]
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
    use std::arch::aarch64::*;

    if n == 0 || n % GROUP_SIZE != 0 {
        return DispatchStatus::Invalid;
    }
    let groups = n / GROUP_SIZE;
    let mut unpacked = [0i32; GROUP_SIZE];

    for row in 0..nrc {
        let w_row = weights.add(row * weight_row_stride);
        let a_row = acts.add(row * act_row_stride);
        let mut acc_vec = vdupq_n_s32(0);

        for g in 0..groups {
            let group_bytes = std::slice::from_raw_parts(w_row.add(g * BYTES_PER_GROUP), BYTES_PER_GROUP);
            let packed: &[u8; BYTES_PER_GROUP] = group_bytes.try_into().expect("slice has exactly BYTES_PER_GROUP len");
            unpack_group(packed, &mut unpacked);

            for lane in (0..GROUP_SIZE).step_by(4) {
                let w = vld1q_s32(unpacked.as_ptr().add(lane));
                let mut acts4 = [0i32; 4];
                for k in 0..4 {
                    acts4[k] = *a_row.add(g * GROUP_SIZE + lane + k) as i32;
                }
                let a = vld1q_s32(acts4.as_ptr());
                acc_vec = vmlaq_s32(acc_vec, w, a);
            }
        }

        let mut lanes = [0i32; 4];
        vst1q_s32(lanes.as_mut_ptr(), acc_vec);
        *out.add(row * out_stride) = lanes.iter().sum::<i32>() as f32;
    }

    DispatchStatus::Ok
}

/// # Safety
/// See [`neuronos_hal_core::QuantizeFn`]. Shares the scalar rounding rule.
#[target_feature(enable = "neon")]
unsafe fn quantize(src: *const f32, dst: *mut u8, nrow: usize, n_per_row: usize, quant_weights: *const f32) -> usize {
    crate::scalar::quantize_ref(src, dst, nrow, n_per_row, quant_weights)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_requires_neon() {
        let d = descriptor();
        assert!(d.is_feasible(FeatureBits::NEON));
        assert!(!d.is_feasible(FeatureBits::none()));
    }

    #[cfg(target_arch = "aarch64")]
    #[test]
    fn matches_scalar_reference() {
        let mut src = [0f32; GROUP_SIZE];
        for (i, v) in src.iter_mut().enumerate() {
            *v = ((i % 5) as f32) - 2.0;
        }
        let mut packed = [0u8; BYTES_PER_GROUP];
        unsafe { quantize(src.as_ptr(), packed.as_mut_ptr(), 1, GROUP_SIZE, std::ptr::null()) };

        let acts = [3i8; GROUP_SIZE];
        let mut neon_out = [0f32; 1];
        let mut scalar_out = [0f32; 1];
        unsafe {
            vec_dot(GROUP_SIZE, neon_out.as_mut_ptr(), 1, packed.as_ptr(), BYTES_PER_GROUP, acts.as_ptr(), GROUP_SIZE, 1);
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
        assert_eq!(neon_out[0], scalar_out[0]);
    }
}
