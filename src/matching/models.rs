//! Request, response and result types of the matching engine.

use crate::catalog_store::{CartridgeInfo, PhonoPreampInfo, SutInfo, TonearmInfo, WeightEstimationInfo};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of weight estimation for one cartridge.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightEstimate {
    /// Grams.
    pub weight: f64,
    pub estimated: bool,
    /// Present iff `estimated`.
    pub info: Option<WeightEstimationInfo>,
}

// =============================================================================
// Resonance
// =============================================================================

/// Where a resonance frequency falls relative to the optimal band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResonanceVerdict {
    TooLow,
    SlightlyLow,
    NearLowerEdge,
    Ideal,
    NearUpperEdge,
    SlightlyHigh,
    TooHigh,
}

impl ResonanceVerdict {
    pub fn is_optimal(&self) -> bool {
        matches!(
            self,
            ResonanceVerdict::NearLowerEdge | ResonanceVerdict::Ideal | ResonanceVerdict::NearUpperEdge
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResonanceResult {
    /// Grams: arm effective mass + cartridge + headshell.
    pub total_mass: f64,
    /// Hz.
    pub resonance_frequency: f64,
    pub is_optimal: bool,
    pub verdict: ResonanceVerdict,
    pub recommendation: String,
}

// =============================================================================
// Step-up transformer
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadVerdict {
    Optimal,
    /// Load impedance below the recommended minimum.
    OverLoaded,
    /// Load impedance far above the internal impedance.
    UnderLoaded,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoltageVerdict {
    Optimal,
    LowGain,
    ExcessiveGain,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SutMatchingResult {
    /// Ohms presented to the cartridge.
    pub cartridge_load_impedance: f64,
    /// Ohms.
    pub cartridge_internal_impedance: f64,
    /// Ohms.
    pub recommended_min_load: f64,
    /// mV delivered to the MM input.
    pub output_voltage: f64,
    /// dB.
    pub voltage_gain: f64,
    pub turns_ratio: f64,
    pub is_load_optimal: bool,
    pub is_voltage_optimal: bool,
    pub load_verdict: LoadVerdict,
    pub voltage_verdict: VoltageVerdict,
    pub recommendation: String,
}

// =============================================================================
// Overall result
// =============================================================================

/// Overall grade. Ordered from worst to best.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Compatibility {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compatibility::Poor => "Poor",
            Compatibility::Fair => "Fair",
            Compatibility::Good => "Good",
            Compatibility::Excellent => "Excellent",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingResult {
    pub resonance: ResonanceResult,
    pub sut: Option<SutMatchingResult>,
    pub overall_compatibility: Compatibility,
    pub detailed_analysis: String,
}

// =============================================================================
// Request / response envelope
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatcherRequest {
    #[serde(default)]
    pub tonearm_id: String,
    #[serde(default)]
    pub cartridge_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sut_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phono_preamp_id: Option<String>,
    /// Grams. Replaces the tonearm's recorded headshell weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headshell_weight: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedComponents {
    pub tonearm: TonearmInfo,
    /// Carries the estimated weight, flagged, when the record had none.
    pub cartridge: CartridgeInfo,
    pub sut: Option<SutInfo>,
    pub phono_preamp: Option<PhonoPreampInfo>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatcherResponse {
    pub components: ResolvedComponents,
    pub matching: MatchingResult,
    /// RFC 3339, UTC.
    pub timestamp: String,
}
