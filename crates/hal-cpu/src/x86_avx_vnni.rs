//! AVX-512 VNNI accelerated backend (§4.5, §4.5 "AVX-VNNI path",
//! component G).
//!
//! Uses the unsigned-by-signed dot-product instruction: it accumulates
//! `Σ(raw_code · act)` over the raw two-bit codes {0,1,2} (not the
//! unpacked ternary {−1,0,1}) and recovers the signed-ternary sum by
//! subtracting `Σ act` once per group, since `raw_code = ternary + 1`.
//! Processes 8 weight rows per inner step; this tiling is private to
//! the backend and not part of the dispatch contract.

use neuronos_hal_core::{
    pack_group, BackendDescriptor, BackendType, DispatchStatus, FeatureBits, KernelConfig, BYTES_PER_GROUP,
    GROUP_SIZE,
};

const ROWS_PER_STEP: usize = 8;

pub fn descriptor() -> BackendDescriptor {
    BackendDescriptor {
        name: "x86-avx-vnni",
        backend_type: BackendType::AvxVnni,
        priority: neuronos_hal_core::backend::priority::AVX_VNNI,
        required_features: FeatureBits::AVX512F | FeatureBits::AVX512_VNNI | FeatureBits::AVX_VNNI,
        kernel_config: KernelConfig {
            row_block: ROWS_PER_STEP,
            col_block: 1,
            parallel: ROWS_PER_STEP,
            qk: GROUP_SIZE,
        },
        vec_dot,
        quantize,
        gemv: None,
        gemm: None,
        init: None,
        shutdown: None,
    }
}

/// Unpacks one group's raw two-bit codes (not yet mapped to ternary)
/// into `out`, matching the VNNI path's unsigned-by-signed formulation.
fn unpack_raw_codes(packed: &[u8; BYTES_PER_GROUP], out: &mut [u8; GROUP_SIZE]) {
    for (g, chunk) in out.chunks_exact_mut(BYTES_PER_GROUP).enumerate() {
        let shift = 6 - 2 * g as u32;
        for (lane, slot) in chunk.iter_mut().enumerate() {
            *slot = (packed[lane] >> shift) & 0b11;
        }
    }
}

/// # Safety
/// See [`neuronos_hal_core::VecDotFn`]. Caller must ensure the host
/// supports AVX-512F and AVX-512-VNNI.
#[target_feature(enable = "avx512f,avx512vnni")]
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
    let mut raw = [0u8; GROUP_SIZE];

    let mut row = 0;
    while row < nrc {
        let rows_here = ROWS_PER_STEP.min(nrc - row);
        for r in 0..rows_here {
            let w_row = weights.add((row + r) * weight_row_stride);
            let a_row = acts.add((row + r) * act_row_stride);

            let mut dp_acc = _mm512_setzero_si512();
            let mut act_sum: i64 = 0;

            for g in 0..groups {
                let group_bytes =
                    std::slice::from_raw_parts(w_row.add(g * BYTES_PER_GROUP), BYTES_PER_GROUP);
                let packed: &[u8; BYTES_PER_GROUP] =
                    group_bytes.try_into().expect("slice has exactly BYTES_PER_GROUP len");
                unpack_raw_codes(packed, &mut raw);

                for lane in (0..GROUP_SIZE).step_by(64) {
                    let codes = _mm512_loadu_si512(raw.as_ptr().add(lane) as *const i32);
                    let mut act_bytes = [0u8; 64];
                    for k in 0..64 {
                        let a = *a_row.add(g * GROUP_SIZE + lane + k);
                        act_sum += a as i64;
                        act_bytes[k] = a as u8;
                    }
                    let act_vec = _mm512_loadu_si512(act_bytes.as_ptr() as *const i32);
                    dp_acc = _mm512_dpbusd_epi32(dp_acc, codes, act_vec);
                }
            }

            let raw_dot = horizontal_sum_epi32(dp_acc) as i64;
            *out.add((row + r) * out_stride) = (raw_dot - act_sum) as f32;
        }
        row += rows_here;
    }

    DispatchStatus::Ok
}

#[target_feature(enable = "avx512f")]
unsafe fn horizontal_sum_epi32(v: std::arch::x86_64::__m512i) -> i32 {
    let mut lanes = [0i32; 16];
    std::arch::x86_64::_mm512_storeu_si512(lanes.as_mut_ptr() as *mut i32, v);
    lanes.iter().sum()
}

/// # Safety
/// See [`neuronos_hal_core::QuantizeFn`]. Shares the scalar rounding
/// rule; only `vec_dot` benefits from the VNNI path.
#[target_feature(enable = "avx512f")]
unsafe fn quantize(src: *const f32, dst: *mut u8, nrow: usize, n_per_row: usize, quant_weights: *const f32) -> usize {
    crate::scalar::quantize_ref(src, dst, nrow, n_per_row, quant_weights)
}
