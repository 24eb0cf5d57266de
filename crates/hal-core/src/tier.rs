//! Tier & Profile Classifier (§4.7, component I).
//!
//! Compile-time `Profile` gates which surrounding features a build
//! carries; it never changes kernel semantics. `DeviceTier` is a
//! coarse, advisory label derived from RAM (and sandbox profile) that
//! the model-selection layer outside this HAL uses for auto-selection.

/// Compile-time build profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Profile {
    /// All backends and the GPU probe compiled in.
    Full,
    /// CPU backends only; no GPU probe.
    Lite,
    /// Scalar backend only (e.g. a browser-style WASM sandbox).
    Minimal,
}

/// Coarse device capability label (§4.7, GLOSSARY). Ordered roughly by
/// capability, but callers should treat it as an opaque hint rather
/// than a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum DeviceTier {
    /// ≥ 32 GiB RAM.
    S,
    /// ≥ 2 GiB RAM.
    A,
    /// Running under a browser-style sandbox profile, regardless of RAM.
    B,
    /// ≥ 64 MiB RAM.
    C,
    /// Below every other threshold.
    D,
}

const GIB: u64 = 1024 * 1024 * 1024;
const MIB: u64 = 1024 * 1024;

/// Classifies a device from its total RAM in bytes and build profile.
/// The sandbox override (`Profile::Minimal`) always wins over RAM, per
/// §4.7: a sandboxed runtime can report a large heap quota that has no
/// bearing on the host's real memory budget.
pub fn classify(total_ram_bytes: u64, profile: Profile) -> DeviceTier {
    if profile == Profile::Minimal {
        return DeviceTier::B;
    }
    if total_ram_bytes >= 32 * GIB {
        DeviceTier::S
    } else if total_ram_bytes >= 2 * GIB {
        DeviceTier::A
    } else if total_ram_bytes >= 64 * MIB {
        DeviceTier::C
    } else {
        DeviceTier::D
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive_at_their_lower_bound() {
        assert_eq!(classify(32 * GIB, Profile::Full), DeviceTier::S);
        assert_eq!(classify(32 * GIB - 1, Profile::Full), DeviceTier::A);
        assert_eq!(classify(2 * GIB, Profile::Full), DeviceTier::A);
        assert_eq!(classify(2 * GIB - 1, Profile::Full), DeviceTier::C);
        assert_eq!(classify(64 * MIB, Profile::Full), DeviceTier::C);
        assert_eq!(classify(64 * MIB - 1, Profile::Full), DeviceTier::D);
    }

    #[test]
    fn minimal_profile_always_reports_b_regardless_of_ram() {
        assert_eq!(classify(128 * GIB, Profile::Minimal), DeviceTier::B);
        assert_eq!(classify(0, Profile::Minimal), DeviceTier::B);
    }

    #[test]
    fn zero_ram_is_tier_d() {
        assert_eq!(classify(0, Profile::Full), DeviceTier::D);
    }
}
