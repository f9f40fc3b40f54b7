//! Overall compatibility grading.
//!
//! Resonance dominates: a mechanically unsuitable pairing can mistrack or
//! damage records, while an electrical mismatch mostly affects level and tone.

use super::models::{Compatibility, ResonanceResult, ResonanceVerdict, SutMatchingResult};
use crate::catalog_store::{CartridgeType, PhonoPreampInfo, WeightEstimationInfo};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResonanceStanding {
    Favorable,
    Marginal,
    Unfavorable,
}

impl From<ResonanceVerdict> for ResonanceStanding {
    fn from(verdict: ResonanceVerdict) -> Self {
        match verdict {
            ResonanceVerdict::NearLowerEdge
            | ResonanceVerdict::Ideal
            | ResonanceVerdict::NearUpperEdge => ResonanceStanding::Favorable,
            ResonanceVerdict::SlightlyLow | ResonanceVerdict::SlightlyHigh => {
                ResonanceStanding::Marginal
            }
            ResonanceVerdict::TooLow | ResonanceVerdict::TooHigh => ResonanceStanding::Unfavorable,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SutStanding {
    Favorable,
    Partial,
    Unfavorable,
}

impl From<&SutMatchingResult> for SutStanding {
    fn from(result: &SutMatchingResult) -> Self {
        match (result.is_load_optimal, result.is_voltage_optimal) {
            (true, true) => SutStanding::Favorable,
            (false, false) => SutStanding::Unfavorable,
            _ => SutStanding::Partial,
        }
    }
}

/// Grade from the two standings alone.
pub fn grade(resonance: ResonanceStanding, sut: Option<SutStanding>) -> Compatibility {
    use Compatibility::*;
    match (resonance, sut) {
        (ResonanceStanding::Favorable, None | Some(SutStanding::Favorable)) => Excellent,
        (ResonanceStanding::Favorable, Some(_)) => Good,
        (ResonanceStanding::Marginal, Some(SutStanding::Unfavorable)) => Poor,
        (ResonanceStanding::Marginal, _) => Fair,
        (ResonanceStanding::Unfavorable, _) => Poor,
    }
}

/// How an MC cartridge gets its gain when no SUT is in the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GainStaging {
    #[default]
    Adequate,
    /// The selected phono preamp states it has no MC input. Carries the MM
    /// stage gain in dB when recorded.
    NoMcInput { mm_gain_db: Option<f64> },
    /// No SUT and no phono preamp were given.
    Unverified,
}

pub fn assess_gain_staging(
    cartridge_type: CartridgeType,
    sut_requested: bool,
    phono_preamp: Option<&PhonoPreampInfo>,
) -> GainStaging {
    if cartridge_type != CartridgeType::MovingCoil || sut_requested {
        return GainStaging::Adequate;
    }
    match phono_preamp {
        Some(preamp) if preamp.has_mc_input == Some(false) => GainStaging::NoMcInput {
            mm_gain_db: preamp.gain_db.filter(|g| g.is_finite()),
        },
        Some(_) => GainStaging::Adequate,
        None => GainStaging::Unverified,
    }
}

/// Facts outside the two sub-results that shape the verdict or its narrative.
#[derive(Clone, Debug, Default)]
pub struct AnalysisContext {
    /// Why SUT analysis was dropped, when it was.
    pub sut_skipped: Option<String>,
    pub gain_staging: GainStaging,
    pub estimated_weight: Option<WeightEstimationInfo>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Assessment {
    pub overall_compatibility: Compatibility,
    pub detailed_analysis: String,
}

pub fn aggregate(
    resonance: &ResonanceResult,
    sut: Option<&SutMatchingResult>,
    context: &AnalysisContext,
) -> Assessment {
    let mut overall = grade(resonance.verdict.into(), sut.map(SutStanding::from));

    let mut parts: Vec<String> = vec![resonance.recommendation.clone()];
    if let Some(sut) = sut {
        parts.push(sut.recommendation.clone());
    }
    if let Some(reason) = &context.sut_skipped {
        parts.push(format!(
            "Step-up transformer analysis was skipped: {}.",
            reason
        ));
    }
    match context.gain_staging {
        GainStaging::Adequate => {}
        GainStaging::NoMcInput { mm_gain_db } => {
            overall = overall.min(Compatibility::Fair);
            let stage = match mm_gain_db {
                Some(gain) => format!("The phono preamp's {:.0} dB MM stage", gain),
                None => "The phono preamp".to_string(),
            };
            parts.push(format!(
                "{} has no moving-coil input and no step-up transformer was selected; the cartridge's output is too low to drive an MM input directly.",
                stage
            ));
        }
        GainStaging::Unverified => parts.push(
            "Moving-coil cartridges need an MC phono input or a step-up transformer; make sure the phono stage provides enough gain."
                .to_string(),
        ),
    }
    if let Some(info) = &context.estimated_weight {
        parts.push(format!(
            "The cartridge weight is an estimate ({}); check it against the manufacturer's figure.",
            info.source
        ));
    }

    Assessment {
        overall_compatibility: overall,
        detailed_analysis: parts.join(" "),
    }
}
