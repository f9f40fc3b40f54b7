//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When the seeded catalog changes, update only this file.

// ============================================================================
// Tonearms
// ============================================================================

/// SME 3009, 12 g effective mass, no separate headshell weight
pub const TONEARM_ID: &str = "sme-3009";

/// Tonearm brand
pub const TONEARM_BRAND: &str = "SME";

/// Tonearm effective mass in grams
pub const TONEARM_EFFECTIVE_MASS: f64 = 12.0;

// ============================================================================
// Cartridges
// ============================================================================

/// MM cartridge, 6 g, 20 cu/mN. Resonates near 8.4 Hz on the test arm.
pub const CARTRIDGE_MM_ID: &str = "at-vm95e";

/// MC cartridge, 6 g, 10 cu/mN, 0.3 mV, 5 Ω. Resonates near 11.9 Hz.
pub const CARTRIDGE_MC_ID: &str = "dl-103";

/// MM cartridge with no recorded weight, 30 cu/mN
pub const CARTRIDGE_NO_WEIGHT_ID: &str = "mystery-mm";

/// Compliance of the unweighed cartridge
pub const CARTRIDGE_NO_WEIGHT_COMPLIANCE: f64 = 30.0;

/// MC cartridge with no recorded weight and no MC cartridge of similar
/// compliance to estimate from
pub const CARTRIDGE_NO_REFERENCE_ID: &str = "orphan-mc";

/// Measured MM cartridges whose compliance lies within the estimation band
/// around `CARTRIDGE_NO_WEIGHT_COMPLIANCE`: (id, compliance, weight)
pub const REFERENCE_MM_CARTRIDGES: [(&str, f64, f64); 5] = [
    ("ref-mm-1", 26.0, 5.0),
    ("ref-mm-2", 28.0, 5.5),
    ("ref-mm-3", 30.0, 6.0),
    ("ref-mm-4", 32.0, 6.5),
    ("ref-mm-5", 34.0, 7.0),
];

/// Median weight of `REFERENCE_MM_CARTRIDGES`
pub const REFERENCE_MEDIAN_WEIGHT: f64 = 6.0;

/// Total number of seeded cartridges
pub const CARTRIDGE_COUNT: usize = 4 + REFERENCE_MM_CARTRIDGES.len();

// ============================================================================
// Step-up transformers and phono preamps
// ============================================================================

/// SUT with 100 Ω input impedance and 1:10 turns ratio
pub const SUT_ID: &str = "denon-au300";

/// SUT with no electrical data on record
pub const SUT_UNSPECIFIED_ID: &str = "unbranded-sut";

/// Phono preamp without an MC input
pub const PREAMP_MM_ONLY_ID: &str = "mm-only-stage";

/// An id that matches nothing in the catalog
pub const MISSING_ID: &str = "does-not-exist";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the test server to start
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness checks
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Timeout for individual HTTP requests
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
