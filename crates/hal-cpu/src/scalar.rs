//! Reference Scalar Backend (§4.4, component F): the portable
//! correctness oracle. Unpack, multiply, accumulate, cast once — no
//! vector instructions, no feature requirements, always feasible.

use neuronos_hal_core::{
    pack_group, unpack_group, BackendDescriptor, BackendType, DispatchStatus, FeatureBits, KernelConfig,
    BYTES_PER_GROUP, GROUP_SIZE,
};

/// Builds the always-registered scalar descriptor (priority 0, no
/// required features, no lifecycle hooks needed).
pub fn descriptor() -> BackendDescriptor {
    BackendDescriptor {
        name: "scalar",
        backend_type: BackendType::Scalar,
        priority: neuronos_hal_core::backend::priority::SCALAR,
        required_features: FeatureBits::none(),
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
/// See [`neuronos_hal_core::VecDotFn`].
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
    if n == 0 || n % GROUP_SIZE != 0 {
        return DispatchStatus::Invalid;
    }
    let groups = n / GROUP_SIZE;
    let mut unpacked = [0i32; GROUP_SIZE];

    for row in 0..nrc {
        let w_row = weights.add(row * weight_row_stride);
        let a_row = acts.add(row * act_row_stride);
        let mut acc: i64 = 0;

        for g in 0..groups {
            let group_bytes = std::slice::from_raw_parts(w_row.add(g * BYTES_PER_GROUP), BYTES_PER_GROUP);
            let packed: &[u8; BYTES_PER_GROUP] = group_bytes.try_into().expect("slice has exactly BYTES_PER_GROUP len");
            unpack_group(packed, &mut unpacked);

            for lane in 0..GROUP_SIZE {
                let act = *a_row.add(g * GROUP_SIZE + lane) as i64;
                acc += unpacked[lane] as i64 * act;
            }
        }

        *out.add(row * out_stride) = acc as f32;
    }

    DispatchStatus::Ok
}

/// # Safety
/// See [`neuronos_hal_core::QuantizeFn`].
unsafe fn quantize(src: *const f32, dst: *mut u8, nrow: usize, n_per_row: usize, quant_weights: *const f32) -> usize {
    quantize_ref(src, dst, nrow, n_per_row, quant_weights)
}

/// Shared max-abs (or importance-weighted) rounding rule every CPU
/// backend in this crate quantizes with; only `vec_dot` throughput
/// differs between them (§4.5.3).
///
/// # Safety
/// See [`neuronos_hal_core::QuantizeFn`].
pub(crate) unsafe fn quantize_ref(src: *const f32, dst: *mut u8, nrow: usize, n_per_row: usize, quant_weights: *const f32) -> usize {
    if n_per_row == 0 || n_per_row % GROUP_SIZE != 0 {
        return 0;
    }
    let groups = n_per_row / GROUP_SIZE;
    let bytes_per_row = groups * BYTES_PER_GROUP;
    let mut values = [0i8; GROUP_SIZE];

    for row in 0..nrow {
        let src_row = std::slice::from_raw_parts(src.add(row * n_per_row), n_per_row);
        let qw_row = if quant_weights.is_null() {
            None
        } else {
            Some(std::slice::from_raw_parts(quant_weights.add(row * n_per_row), n_per_row))
        };

        for g in 0..groups {
            let chunk = &src_row[g * GROUP_SIZE..(g + 1) * GROUP_SIZE];
            let qw_chunk = qw_row.map(|q| &q[g * GROUP_SIZE..(g + 1) * GROUP_SIZE]);

            let scale = chunk
                .iter()
                .enumerate()
                .map(|(i, v)| v.abs() * qw_chunk.map_or(1.0, |q| q[i]))
                .fold(0.0f32, f32::max)
                .max(f32::EPSILON);

            for (i, &v) in chunk.iter().enumerate() {
                let weight = qw_chunk.map_or(1.0, |q| q[i]);
                let normalized = (v * weight) / scale;
                values[i] = if normalized > 0.5 {
                    1
                } else if normalized < -0.5 {
                    -1
                } else {
                    0
                };
            }

            let mut packed = [0u8; BYTES_PER_GROUP];
            pack_group(&values, &mut packed);
            let dst_row = dst.add(row * bytes_per_row + g * BYTES_PER_GROUP);
            std::ptr::copy_nonoverlapping(packed.as_ptr(), dst_row, BYTES_PER_GROUP);
        }
    }

    nrow * bytes_per_row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_is_always_feasible() {
        let d = descriptor();
        assert!(d.is_feasible(FeatureBits::none()));
    }

    #[test]
    fn quantize_then_vec_dot_recovers_the_dominant_sign() {
        let d = descriptor();
        let mut src = [0f32; GROUP_SIZE];
        for (i, v) in src.iter_mut().enumerate() {
            *v = if i % 2 == 0 { 1.0 } else { -1.0 };
        }
        let mut packed = [0u8; BYTES_PER_GROUP];
        let written = unsafe { (d.quantize)(src.as_ptr(), packed.as_mut_ptr(), 1, GROUP_SIZE, std::ptr::null()) };
        assert_eq!(written, BYTES_PER_GROUP);

        let acts = [1i8; GROUP_SIZE];
        let mut out = [0f32; 1];
        let status =
            unsafe { (d.vec_dot)(GROUP_SIZE, out.as_mut_ptr(), 1, packed.as_ptr(), BYTES_PER_GROUP, acts.as_ptr(), GROUP_SIZE, 1) };
        assert!(status.is_ok());
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn vec_dot_rejects_misaligned_n() {
        let d = descriptor();
        let mut out = [0f32; 1];
        let status = unsafe {
            (d.vec_dot)(GROUP_SIZE - 1, out.as_mut_ptr(), 1, [0u8; BYTES_PER_GROUP].as_ptr(), BYTES_PER_GROUP, [0i8; GROUP_SIZE].as_ptr(), GROUP_SIZE, 1)
        };
        assert_eq!(status, DispatchStatus::Invalid);
    }

    #[test]
    fn quantize_rejects_misaligned_n_per_row() {
        let src = [0f32; GROUP_SIZE - 1];
        let mut dst = [0u8; BYTES_PER_GROUP];
        let written = unsafe { quantize(src.as_ptr(), dst.as_mut_ptr(), 1, GROUP_SIZE - 1, std::ptr::null()) };
        assert_eq!(written, 0);
    }
}
