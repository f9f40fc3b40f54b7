//! Tonearm/cartridge resonance.

use super::error::MatchingError;
use super::models::{ResonanceResult, ResonanceVerdict};
use super::settings::MatchingSettings;
use crate::catalog_store::TonearmInfo;
use std::f64::consts::PI;

/// Resonance frequency in Hz of a moving mass (g) on a suspension of the given
/// compliance (cu/mN).
pub fn resonance_frequency(total_mass: f64, compliance: f64) -> f64 {
    1000.0 / (2.0 * PI * (total_mass * compliance).sqrt())
}

pub fn classify_resonance(frequency: f64, settings: &MatchingSettings) -> ResonanceVerdict {
    let min = settings.resonance_min_hz;
    let max = settings.resonance_max_hz;
    if frequency < min - settings.borderline_margin_hz {
        ResonanceVerdict::TooLow
    } else if frequency < min {
        ResonanceVerdict::SlightlyLow
    } else if frequency < min + settings.edge_margin_hz {
        ResonanceVerdict::NearLowerEdge
    } else if frequency <= max - settings.edge_margin_hz {
        ResonanceVerdict::Ideal
    } else if frequency <= max {
        ResonanceVerdict::NearUpperEdge
    } else if frequency <= max + settings.borderline_margin_hz {
        ResonanceVerdict::SlightlyHigh
    } else {
        ResonanceVerdict::TooHigh
    }
}

pub fn resonance_recommendation(
    verdict: ResonanceVerdict,
    frequency: f64,
    settings: &MatchingSettings,
) -> String {
    let band = format!(
        "{}-{} Hz",
        settings.resonance_min_hz, settings.resonance_max_hz
    );
    match verdict {
        ResonanceVerdict::TooLow => format!(
            "Resonance of {:.1} Hz is too low (optimal {}): the arm will follow record warps and footfall, risking mistracking. Choose a lighter tonearm or a less compliant cartridge.",
            frequency, band
        ),
        ResonanceVerdict::SlightlyLow => format!(
            "Resonance of {:.1} Hz is borderline, slightly below the optimal {} band; warped records may cause some woofer pumping. A lighter headshell would help.",
            frequency, band
        ),
        ResonanceVerdict::NearLowerEdge => format!(
            "Resonance of {:.1} Hz is within the optimal {} band but borderline, close to the lower edge.",
            frequency, band
        ),
        ResonanceVerdict::Ideal => format!(
            "Resonance of {:.1} Hz sits well inside the optimal {} band.",
            frequency, band
        ),
        ResonanceVerdict::NearUpperEdge => format!(
            "Resonance of {:.1} Hz is within the optimal {} band but borderline, close to the upper edge.",
            frequency, band
        ),
        ResonanceVerdict::SlightlyHigh => format!(
            "Resonance of {:.1} Hz is borderline, slightly above the optimal {} band; some colouration of the low bass is possible. Extra headshell mass would bring it down.",
            frequency, band
        ),
        ResonanceVerdict::TooHigh => format!(
            "Resonance of {:.1} Hz is too high (optimal {}): it reaches into the audible range and can cause distortion and mistracking. Choose a heavier tonearm or a more compliant cartridge.",
            frequency, band
        ),
    }
}

/// Resonance of `tonearm` carrying a cartridge of `cartridge_weight` grams.
///
/// `headshell_override` replaces the tonearm's recorded headshell weight.
pub fn analyze_resonance(
    tonearm: &TonearmInfo,
    cartridge_weight: f64,
    compliance: Option<f64>,
    headshell_override: Option<f64>,
    settings: &MatchingSettings,
) -> Result<ResonanceResult, MatchingError> {
    if !tonearm.effective_mass.is_finite() || tonearm.effective_mass <= 0.0 {
        return Err(MatchingError::InvalidMass(format!(
            "tonearm '{}' has an effective mass of {} g",
            tonearm.identity.id, tonearm.effective_mass
        )));
    }
    if !cartridge_weight.is_finite() || cartridge_weight <= 0.0 {
        return Err(MatchingError::InvalidMass(format!(
            "cartridge weight of {} g",
            cartridge_weight
        )));
    }
    let headshell_weight = headshell_override
        .or(tonearm.headshell_weight)
        .unwrap_or(0.0);
    if !headshell_weight.is_finite() || headshell_weight < 0.0 {
        return Err(MatchingError::InvalidMass(format!(
            "headshell weight of {} g",
            headshell_weight
        )));
    }

    let compliance = match compliance {
        Some(c) if c.is_finite() && c > 0.0 => c,
        Some(c) => {
            return Err(MatchingError::InvalidCompliance(format!(
                "cartridge compliance of {} cu/mN",
                c
            )))
        }
        None => {
            return Err(MatchingError::InvalidCompliance(
                "the cartridge has no recorded compliance".to_string(),
            ))
        }
    };

    let total_mass = tonearm.effective_mass + cartridge_weight + headshell_weight;
    if total_mass <= 0.0 {
        return Err(MatchingError::InvalidMass(format!(
            "total moving mass of {} g",
            total_mass
        )));
    }

    let frequency = resonance_frequency(total_mass, compliance);
    let verdict = classify_resonance(frequency, settings);

    Ok(ResonanceResult {
        total_mass,
        resonance_frequency: frequency,
        is_optimal: frequency >= settings.resonance_min_hz
            && frequency <= settings.resonance_max_hz,
        verdict,
        recommendation: resonance_recommendation(verdict, frequency, settings),
    })
}
