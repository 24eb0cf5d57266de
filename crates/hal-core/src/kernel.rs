//! Kernel contracts (§3, §4.1, component B): the four kernel signatures
//! and the packed-ternary (I2_S) data layout.

use crate::error::DispatchStatus;

/// Number of ternary weights packed into one 32-byte group (all current backends).
pub const GROUP_SIZE: usize = 128;

/// Bytes used to pack one `GROUP_SIZE`-element group (2 bits/weight).
pub const BYTES_PER_GROUP: usize = GROUP_SIZE / 4;

/// Batched dot product: `nrc` rows of an I2_S weight matrix against one
/// signed-8-bit activation vector, producing `nrc` f32 outputs.
///
/// # Safety
/// `weights` must point to at least `nrc` rows of `weight_row_stride`
/// packed bytes each; `acts` to at least `nrc` rows of `act_row_stride`
/// signed bytes; `out` to at least `nrc` strided f32 slots. `n` must be
/// a multiple of the backend's `kernel_config.qk`.
pub type VecDotFn = unsafe fn(
    n: usize,
    out: *mut f32,
    out_stride: usize,
    weights: *const u8,
    weight_row_stride: usize,
    acts: *const i8,
    act_row_stride: usize,
    nrc: usize,
) -> DispatchStatus;

/// Quantizes `nrow` rows of `n_per_row` f32 weights each into I2_S,
/// writing `dst` and returning the number of bytes written.
///
/// `quant_weights`, if non-null, is a per-element importance prior with
/// the same shape as `src`; when null the quantizer uses uniform
/// weighting. `n_per_row` must be a multiple of `qk`.
///
/// # Safety
/// `src` must point to `nrow * n_per_row` valid f32s; `dst` to a buffer
/// at least `nrow * ceil(n_per_row / GROUP_SIZE) * BYTES_PER_GROUP`
/// bytes; `quant_weights`, if non-null, to `nrow * n_per_row` valid f32s.
pub type QuantizeFn =
    unsafe fn(src: *const f32, dst: *mut u8, nrow: usize, n_per_row: usize, quant_weights: *const f32) -> usize;

/// Matrix–vector / matrix–matrix product: `out = weights . acts^T`.
///
/// `gemv` and `gemm` share a signature; `gemm` differs only in that
/// `acts` holds more than one activation row (the AVX-VNNI and GPU
/// backends may specialize the two, the scalar reference does not).
///
/// # Safety
/// Same buffer-sizing obligations as `VecDotFn`, generalized over
/// `n_rows` weight rows and `n_cols` activation rows.
pub type GemvFn = unsafe fn(
    n: usize,
    out: *mut f32,
    out_stride: usize,
    weights: *const u8,
    acts: *const i8,
    n_rows: usize,
    n_cols: usize,
) -> DispatchStatus;

pub type GemmFn = GemvFn;

/// Lifecycle hook run once when a backend becomes active. Returns
/// `false` to signal `INIT_FAILED`.
pub type BackendInitFn = fn() -> bool;

/// Lifecycle hook run once when a backend stops being active, or at
/// `shutdown()`. Never fails (§7: "errors during shutdown are swallowed").
pub type BackendShutdownFn = fn();

/// Per-backend tiling configuration (§3). The engine reads this to
/// size its outer loops; it never changes after registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KernelConfig {
    /// Weight rows processed together by `gemm`/`gemv` tiling.
    pub row_block: usize,
    /// Activation columns processed together by `gemm` tiling.
    pub col_block: usize,
    /// Vector-lane multiplier (e.g. rows processed per `vec_dot` call
    /// on the AVX-VNNI "ultra-parallel" path).
    pub parallel: usize,
    /// Quantization group size. Must equal the block size the kernel
    /// assumes, and must divide every `n` passed to a kernel (invariant 4).
    pub qk: usize,
}

impl KernelConfig {
    /// The configuration every backend in this HAL uses today: groups
    /// of 128 weights, one row at a time, no extra parallel multiplier.
    pub const fn scalar_default() -> Self {
        Self {
            row_block: 1,
            col_block: 1,
            parallel: 1,
            qk: GROUP_SIZE,
        }
    }
}

/// Maps a two-bit I2_S code to its ternary value.
#[inline]
pub fn unpack_ternary(code: u8) -> i32 {
    match code & 0b11 {
        0 => -1,
        1 => 0,
        2 => 1,
        // 3 is not a valid I2_S code; backends never produce it, but a
        // corrupt buffer must not panic on the hot path.
        _ => 0,
    }
}

/// Maps a ternary value to its two-bit I2_S code.
#[inline]
pub fn pack_ternary(value: i8) -> u8 {
    match value {
        -1 => 0,
        0 => 1,
        1 => 2,
        _ => 1,
    }
}

/// Unpacks one group (`GROUP_SIZE` ternary values) from `BYTES_PER_GROUP`
/// packed bytes into `out` (scalar reference shape: §4.4).
///
/// Bit layout: for group plane `g` in `0..4`, the `g`-th ternary value
/// of lane byte `b` sits at bits `(6 - 2*g)..(7 - 2*g)`, most-significant
/// plane first.
pub fn unpack_group(packed: &[u8; BYTES_PER_GROUP], out: &mut [i32; GROUP_SIZE]) {
    for (g, chunk) in out.chunks_exact_mut(BYTES_PER_GROUP).enumerate() {
        let shift = 6 - 2 * g as u32;
        for (lane, slot) in chunk.iter_mut().enumerate() {
            let code = (packed[lane] >> shift) & 0b11;
            *slot = unpack_ternary(code);
        }
    }
}

/// Packs one group (`GROUP_SIZE` ternary values in `{-1, 0, 1}`) into
/// `BYTES_PER_GROUP` bytes, the inverse of [`unpack_group`].
pub fn pack_group(values: &[i8; GROUP_SIZE], packed: &mut [u8; BYTES_PER_GROUP]) {
    packed.fill(0);
    for (g, chunk) in values.chunks_exact(BYTES_PER_GROUP).enumerate() {
        let shift = 6 - 2 * g as u32;
        for (lane, &value) in chunk.iter().enumerate() {
            packed[lane] |= pack_ternary(value) << shift;
        }
    }
}
