//! Hot-path dispatch (§4, component E): `vec_dot`/`quantize`/`gemv`/`gemm`
//! forwarded to the active backend, with `gemv`/`gemm` synthesized from
//! `vec_dot` when a backend doesn't supply its own (§4.6 fallback rule).
//!
//! Every function here is allocation-free and returns [`DispatchStatus`]
//! rather than propagating a [`crate::error::HalError`]: there is no
//! out-of-band error channel on the hot path (§7).

use crate::error::DispatchStatus;
use crate::registry::Registry;

impl Registry {
    /// `nrc` rows of `weights` against one activation row, `n` columns.
    ///
    /// `n` must be a multiple of the active backend's `qk` (invariant 4);
    /// violating this returns `DispatchStatus::Invalid` rather than
    /// reading out of bounds.
    pub fn vec_dot(
        &self,
        n: usize,
        out: &mut [f32],
        weights: &[u8],
        weight_row_stride: usize,
        acts: &[i8],
        act_row_stride: usize,
        nrc: usize,
    ) -> DispatchStatus {
        let Some(backend) = self.get_active() else {
            return DispatchStatus::NoBackend;
        };
        if n == 0 || n % backend.kernel_config.qk != 0 {
            return DispatchStatus::Invalid;
        }
        if out.len() < nrc || weights.len() < nrc * weight_row_stride || acts.len() < nrc * act_row_stride {
            return DispatchStatus::Invalid;
        }

        // SAFETY: slice lengths were just checked against the strides and
        // row count the backend contract requires.
        unsafe {
            (backend.vec_dot)(
                n,
                out.as_mut_ptr(),
                1,
                weights.as_ptr(),
                weight_row_stride,
                acts.as_ptr(),
                act_row_stride,
                nrc,
            )
        }
    }

    /// Quantizes `nrow` rows of `n_per_row` f32 weights into the active
    /// backend's packed format, returning bytes written or `None` if
    /// there is no active backend or `n_per_row` isn't a multiple of `qk`.
    pub fn quantize(
        &self,
        src: &[f32],
        dst: &mut [u8],
        nrow: usize,
        n_per_row: usize,
        quant_weights: Option<&[f32]>,
    ) -> Option<usize> {
        let backend = self.get_active()?;
        if n_per_row == 0 || n_per_row % backend.kernel_config.qk != 0 {
            return None;
        }
        if src.len() < nrow * n_per_row {
            return None;
        }
        if let Some(qw) = quant_weights {
            if qw.len() < nrow * n_per_row {
                return None;
            }
        }

        let qw_ptr = quant_weights.map_or(std::ptr::null(), |qw| qw.as_ptr());
        // SAFETY: buffer sizes were checked above; `dst` capacity is the
        // caller's obligation per the `QuantizeFn` contract (it cannot be
        // validated without knowing the backend's group layout up front).
        Some(unsafe { (backend.quantize)(src.as_ptr(), dst.as_mut_ptr(), nrow, n_per_row, qw_ptr) })
    }

    /// Matrix-vector product: `n_rows` weight rows against one activation
    /// column of `n` elements. `n_cols` is part of the shared `gemv`/`gemm`
    /// kernel signature (§3) but `gemv` only ever handles a single
    /// activation column; callers with more than one column must use
    /// [`Registry::gemm`] instead. Uses the backend's own `gemv` if it has
    /// one, otherwise synthesizes it with one batched `vec_dot` call over
    /// all rows (§4.6).
    pub fn gemv(&self, n: usize, out: &mut [f32], weights: &[u8], acts: &[i8], n_rows: usize, n_cols: usize) -> DispatchStatus {
        if n_cols != 1 {
            return DispatchStatus::Invalid;
        }
        let Some(backend) = self.get_active() else {
            return DispatchStatus::NoBackend;
        };
        if n == 0 || n % backend.kernel_config.qk != 0 {
            return DispatchStatus::Invalid;
        }
        let weight_row_stride = n / 4;
        if out.len() < n_rows || weights.len() < n_rows * weight_row_stride || acts.len() < n {
            return DispatchStatus::Invalid;
        }

        if let Some(gemv) = backend.gemv {
            // SAFETY: lengths checked against the derived row stride above.
            return unsafe { gemv(n, out.as_mut_ptr(), 1, weights.as_ptr(), acts.as_ptr(), n_rows, n_cols) };
        }

        self.vec_dot(n, out, weights, weight_row_stride, acts, 0, n_rows)
    }

    /// Matrix-matrix product: `n_rows` weight rows against `n_cols`
    /// activation rows of `n` elements each. Falls back to one `gemv`
    /// call per activation column when the backend has no dedicated
    /// `gemm` (§4.7).
    pub fn gemm(
        &self,
        n: usize,
        out: &mut [f32],
        out_row_stride: usize,
        weights: &[u8],
        acts: &[i8],
        act_row_stride: usize,
        n_rows: usize,
        n_cols: usize,
    ) -> DispatchStatus {
        let Some(backend) = self.get_active() else {
            return DispatchStatus::NoBackend;
        };
        if n == 0 || n % backend.kernel_config.qk != 0 {
            return DispatchStatus::Invalid;
        }
        let weight_row_stride = n / 4;
        if out.len() < n_cols * out_row_stride
            || weights.len() < n_rows * weight_row_stride
            || acts.len() < n_cols * act_row_stride
        {
            return DispatchStatus::Invalid;
        }

        if let Some(gemm) = backend.gemm {
            // SAFETY: lengths checked against the derived strides above.
            return unsafe {
                gemm(n, out.as_mut_ptr(), out_row_stride, weights.as_ptr(), acts.as_ptr(), n_rows, n_cols)
            };
        }

        for col in 0..n_cols {
            let act_col = &acts[col * act_row_stride..];
            let out_col = &mut out[col * out_row_stride..];
            let status = self.gemv(n, out_col, weights, act_col, n_rows, 1);
            if !status.is_ok() {
                return status;
            }
        }
        DispatchStatus::Ok
    }
}
