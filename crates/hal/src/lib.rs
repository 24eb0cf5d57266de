//! Process-wide HAL facade (§6 "Engine-facing surface").
//!
//! Wires the hardware-independent registry in `neuronos-hal-core`
//! together with the concrete CPU probe/backends in `neuronos-hal-cpu`
//! and the GPU device probe in `neuronos-hal-gpu`, and owns the single
//! global [`Registry`] instance the rest of the process dispatches
//! through. This is the only crate an embedding engine depends on
//! directly; everything else is reached through this API.
//!
//! Control-plane calls (`init`, `register_backend`, `select_backend`,
//! `shutdown`) take the registry's write lock and must come from one
//! controlling thread (§5). After `init` returns, `vec_dot`/`quantize`/
//! `gemv`/`gemm` only ever take the read lock, so any number of threads
//! may dispatch concurrently with no contention among themselves.

use std::sync::{OnceLock, RwLock};

use neuronos_hal_core::{
    BackendDescriptor, BackendDescriptorView, BackendType, DispatchStatus, FeatureBits, HalError, KernelConfig,
    Registry,
};

pub use neuronos_hal_core::{DeviceTier, Profile};

static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();

fn registry() -> &'static RwLock<Registry> {
    REGISTRY.get_or_init(|| RwLock::new(Registry::new()))
}

/// Probes hardware, seeds the registry with the compile-time backend
/// roster, and selects the highest-priority feasible backend.
/// Idempotent (§4.2).
pub fn init() -> Result<(), HalError> {
    let mut probed = neuronos_hal_cpu::probe();

    #[cfg(feature = "gpu")]
    if let Some(gpu) = neuronos_hal_gpu::probe_gpu() {
        probed |= neuronos_hal_gpu::gpu_presence_bits(&gpu);
    }

    let roster = neuronos_hal_cpu::compiled_in_backends();
    let mut reg = registry().write().expect("HAL registry lock poisoned");
    reg.init(probed, roster)
}

/// Fires every backend's `shutdown` hook and clears the registry,
/// returning the HAL to `UNINITIALIZED` (§4.8).
pub fn shutdown() {
    registry().write().expect("HAL registry lock poisoned").shutdown();
}

/// The probed capability bitmask (empty before `init`).
pub fn get_features() -> FeatureBits {
    registry().read().expect("HAL registry lock poisoned").get_features()
}

/// A read-only view of the active backend, or `None` before `init` /
/// after `shutdown`.
pub fn get_active_backend() -> Option<BackendDescriptorView> {
    registry().read().expect("HAL registry lock poisoned").get_active_view()
}

/// Switches the active backend to the earliest-registered descriptor of
/// `backend_type`. Leaves the current selection untouched on failure.
pub fn select_backend(backend_type: BackendType) -> Result<(), HalError> {
    registry().write().expect("HAL registry lock poisoned").select(backend_type)
}

/// Registers an additional backend descriptor. Permitted in any state
/// (§4.8); does not affect the active selection until the next `init`
/// or `select_backend` call.
pub fn register_backend(descriptor: BackendDescriptor) -> Result<(), HalError> {
    registry().write().expect("HAL registry lock poisoned").register(descriptor)
}

pub fn get_backend_count() -> usize {
    registry().read().expect("HAL registry lock poisoned").count()
}

pub fn get_backend(index: usize) -> Option<BackendDescriptorView> {
    registry().read().expect("HAL registry lock poisoned").get_view(index)
}

/// The active backend's kernel tiling configuration, or `None` before `init`.
pub fn get_kernel_config() -> Option<KernelConfig> {
    registry().read().expect("HAL registry lock poisoned").get_kernel_config()
}

/// The [`Profile`] this crate was built with, selected by the
/// `full`/`lite`/`minimal` Cargo features (§4.7, `[ADD] 2`). Ties
/// resolve to the most restrictive profile enabled, so a build that
/// accidentally enables more than one feature degrades safely.
pub fn compile_time_profile() -> Profile {
    if cfg!(feature = "minimal") {
        Profile::Minimal
    } else if cfg!(feature = "lite") {
        Profile::Lite
    } else {
        Profile::Full
    }
}

/// Classifies this host into a coarse device tier (§4.7) from total
/// system RAM and the given [`Profile`]. `profile` is a parameter
/// rather than always autodetected, since an engine embedding this HAL
/// may want to classify under a profile other than the one the HAL
/// itself was compiled with; pass [`compile_time_profile`] to use this
/// build's own profile.
pub fn detect_device_tier(profile: Profile) -> DeviceTier {
    let mut sys = sysinfo::System::new();
    sys.refresh_memory();
    neuronos_hal_core::classify_device_tier(sys.total_memory(), profile)
}

/// Batched dot product on the active backend (§4.1). See
/// [`neuronos_hal_core::Registry::vec_dot`] for the exact contract.
#[allow(clippy::too_many_arguments)]
pub fn vec_dot(
    n: usize,
    out: &mut [f32],
    weights: &[u8],
    weight_row_stride: usize,
    acts: &[i8],
    act_row_stride: usize,
    nrc: usize,
) -> DispatchStatus {
    registry()
        .read()
        .expect("HAL registry lock poisoned")
        .vec_dot(n, out, weights, weight_row_stride, acts, act_row_stride, nrc)
}

pub fn quantize(src: &[f32], dst: &mut [u8], nrow: usize, n_per_row: usize, quant_weights: Option<&[f32]>) -> Option<usize> {
    registry()
        .read()
        .expect("HAL registry lock poisoned")
        .quantize(src, dst, nrow, n_per_row, quant_weights)
}

pub fn gemv(n: usize, out: &mut [f32], weights: &[u8], acts: &[i8], n_rows: usize, n_cols: usize) -> DispatchStatus {
    registry().read().expect("HAL registry lock poisoned").gemv(n, out, weights, acts, n_rows, n_cols)
}

#[allow(clippy::too_many_arguments)]
pub fn gemm(
    n: usize,
    out: &mut [f32],
    out_row_stride: usize,
    weights: &[u8],
    acts: &[i8],
    act_row_stride: usize,
    n_rows: usize,
    n_cols: usize,
) -> DispatchStatus {
    registry()
        .read()
        .expect("HAL registry lock poisoned")
        .gemm(n, out, out_row_stride, weights, acts, act_row_stride, n_rows, n_cols)
}

/// Aggregate diagnostic view of the HAL's current state (§6: "Diagnostic
/// output. Human-readable; format not part of the contract."). Printed
/// by [`print_info`] and serialized by [`print_info_json`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct HalInfo {
    pub features: u32,
    pub active_backend: Option<BackendDescriptorView>,
    pub backend_count: usize,
    pub backends: Vec<BackendDescriptorView>,
}

fn collect_info() -> HalInfo {
    let reg = registry().read().expect("HAL registry lock poisoned");
    let backend_count = reg.count();
    let backends = (0..backend_count).filter_map(|i| reg.get_view(i)).collect();
    HalInfo {
        features: reg.get_features().bits(),
        active_backend: reg.get_active_view(),
        backend_count,
        backends,
    }
}

/// Prints a human-readable dump of the registry to stdout (§6).
pub fn print_info() {
    let info = collect_info();
    println!("neuronos-hal: {} backend(s) registered, features=0x{:08x}", info.backend_count, info.features);
    for backend in &info.backends {
        let marker = if info.active_backend.as_ref().map(|a| &a.name) == Some(&backend.name) { "*" } else { " " };
        println!(
            "{marker} {:<16} priority={:<4} required=0x{:08x} qk={}",
            backend.name, backend.priority, backend.required_features, backend.kernel_config.qk
        );
    }
}

/// Same information as [`print_info`], as a JSON value an engine-side
/// diagnostics page can embed directly.
pub fn print_info_json() -> serde_json::Value {
    serde_json::to_value(collect_info()).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn init_then_shutdown_round_trips_the_state_machine() {
        shutdown();
        init().unwrap();
        assert!(get_active_backend().is_some());
        assert!(get_backend_count() >= 1);
        shutdown();
        assert!(get_active_backend().is_none());
        assert_eq!(get_backend_count(), 0);
    }

    #[test]
    #[serial]
    fn init_is_idempotent_across_the_facade() {
        shutdown();
        init().unwrap();
        let first = get_active_backend().unwrap().name;
        init().unwrap();
        assert_eq!(get_active_backend().unwrap().name, first);
        shutdown();
    }

    #[test]
    #[serial]
    fn dispatch_before_init_reports_no_backend() {
        shutdown();
        let mut out = [0f32; 1];
        let status = vec_dot(128, &mut out, &[0u8; 32], 32, &[0i8; 128], 128, 1);
        assert_eq!(status, DispatchStatus::NoBackend);
    }

    #[test]
    fn compile_time_profile_matches_the_default_feature_set() {
        // The workspace's default feature set for this crate is `full`.
        assert_eq!(compile_time_profile(), Profile::Full);
    }

    #[test]
    #[serial]
    fn print_info_json_reflects_active_backend() {
        shutdown();
        init().unwrap();
        let json = print_info_json();
        assert!(json["active_backend"]["name"].is_string());
        shutdown();
    }
}
