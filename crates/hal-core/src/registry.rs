//! Registry & Selector (§3, §4.2, §4.8, component D).
//!
//! A fixed-capacity, append-only table of [`BackendDescriptor`]s plus
//! an `active_index`. The registry itself is hardware-independent: it
//! knows nothing about CPU probing or concrete kernels. The facade
//! crate (`neuronos-hal`) is responsible for probing features and
//! handing this registry a roster of compiled-in backends to seed with
//! at `init()` (§2, "initialization calls A, seeds D with F and G").

use crate::backend::{BackendDescriptor, BackendDescriptorView};
use crate::error::HalError;
use crate::features::FeatureBits;
use crate::kernel::KernelConfig;

/// Hard capacity bound on the number of registered backends (§3, §6).
pub const MAX_BACKENDS: usize = 16;

/// HAL lifecycle state (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalState {
    Uninitialized,
    Initialized,
}

/// Fixed-capacity backend table and selector.
///
/// `register`/`select`/`init`/`shutdown` are not safe against
/// concurrent mutation and must be called from one controlling thread
/// (§5). Once `init()` has returned, treat the registry as read-only;
/// dispatch then requires no locking.
pub struct Registry {
    entries: Vec<BackendDescriptor>,
    active_index: Option<usize>,
    features: FeatureBits,
    state: HalState,
}

impl Registry {
    /// An empty, uninitialized registry. Registration is permitted in
    /// any state and does not transition the state machine (§4.8).
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(MAX_BACKENDS),
            active_index: None,
            features: FeatureBits::none(),
            state: HalState::Uninitialized,
        }
    }

    pub fn state(&self) -> HalState {
        self.state
    }

    /// Appends a by-value copy of `descriptor`. Duplicate types are
    /// permitted; selection resolves ties by priority then by earlier
    /// registration order.
    pub fn register(&mut self, descriptor: BackendDescriptor) -> Result<(), HalError> {
        if descriptor.name.is_empty() {
            return Err(HalError::Invalid("backend name must be non-empty"));
        }
        if self.entries.len() >= MAX_BACKENDS {
            return Err(HalError::Invalid("registry is at MAX_BACKENDS capacity"));
        }
        log::debug!(
            "registering backend '{}' ({:?}, priority {})",
            descriptor.name,
            descriptor.backend_type,
            descriptor.priority
        );
        self.entries.push(descriptor);
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, index: usize) -> Option<&BackendDescriptor> {
        self.entries.get(index)
    }

    pub fn get_view(&self, index: usize) -> Option<BackendDescriptorView> {
        self.entries.get(index).map(BackendDescriptor::view)
    }

    pub fn get_active(&self) -> Option<&BackendDescriptor> {
        self.active_index.and_then(|i| self.entries.get(i))
    }

    pub fn get_active_view(&self) -> Option<BackendDescriptorView> {
        self.get_active().map(BackendDescriptor::view)
    }

    pub fn get_features(&self) -> FeatureBits {
        self.features
    }

    pub fn get_kernel_config(&self) -> Option<KernelConfig> {
        self.get_active().map(|b| b.kernel_config)
    }

    /// Highest-priority feasible entry, ties broken by earlier
    /// registration order (invariant 1).
    fn best_feasible(&self) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_feasible(self.features))
            .max_by_key(|(i, d)| (d.priority, std::cmp::Reverse(*i)))
            .map(|(i, _)| i)
    }

    /// Seeds the registry with `probed` features and `roster`, then
    /// selects and initializes the highest-priority feasible backend.
    ///
    /// Idempotent: a second call without an intervening `shutdown()` is
    /// a no-op returning `Ok(())` with the active backend unchanged.
    pub fn init(
        &mut self,
        probed: FeatureBits,
        roster: impl IntoIterator<Item = BackendDescriptor>,
    ) -> Result<(), HalError> {
        if self.state == HalState::Initialized {
            log::debug!("init() called while already initialized; no-op");
            return Ok(());
        }

        self.features = probed;
        for descriptor in roster {
            self.register(descriptor)?;
        }

        let chosen = self.best_feasible().ok_or(HalError::NoBackend)?;
        self.activate(chosen)?;
        self.state = HalState::Initialized;
        Ok(())
    }

    /// Picks the earliest-registered backend of `backend_type`. Returns
    /// `UNSUPPORTED` without touching the active selection if that
    /// backend isn't registered or isn't feasible on this hardware.
    pub fn select(&mut self, backend_type: crate::backend::BackendType) -> Result<(), HalError> {
        let candidate = self
            .entries
            .iter()
            .position(|d| d.backend_type == backend_type)
            .ok_or(HalError::Unsupported)?;

        if !self.entries[candidate].is_feasible(self.features) {
            return Err(HalError::Unsupported);
        }

        self.activate(candidate)
    }

    /// Runs the previous backend's `shutdown` hook, then the new
    /// backend's `init` hook. A failed `init` leaves no active backend.
    fn activate(&mut self, index: usize) -> Result<(), HalError> {
        if let Some(previous) = self.active_index.take() {
            if let Some(shutdown) = self.entries[previous].shutdown {
                shutdown();
            }
        }

        let descriptor = &self.entries[index];
        if let Some(init) = descriptor.init {
            if !init() {
                return Err(HalError::InitFailed(descriptor.name.to_string()));
            }
        }
        log::info!("activated backend '{}'", descriptor.name);
        self.active_index = Some(index);
        Ok(())
    }

    /// Fires every registered `shutdown` hook in registration order and
    /// clears the table. Idempotent; errors inside hooks are swallowed
    /// (§7: "shutdown must always succeed structurally").
    pub fn shutdown(&mut self) {
        for descriptor in &self.entries {
            if let Some(shutdown) = descriptor.shutdown {
                shutdown();
            }
        }
        self.entries.clear();
        self.active_index = None;
        self.features = FeatureBits::none();
        self.state = HalState::Uninitialized;
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
