//! Cartridge to step-up transformer electrical matching.

use super::error::MatchingError;
use super::models::{LoadVerdict, SutMatchingResult, VoltageVerdict};
use super::settings::MatchingSettings;
use crate::catalog_store::{CartridgeInfo, CartridgeType, PhonoPreampInfo, SutInfo};

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

pub fn classify_load(load: f64, internal_impedance: f64, settings: &MatchingSettings) -> LoadVerdict {
    if load < internal_impedance * settings.sut_load_multiplier {
        LoadVerdict::OverLoaded
    } else if load > internal_impedance * settings.sut_max_load_multiplier {
        LoadVerdict::UnderLoaded
    } else {
        LoadVerdict::Optimal
    }
}

pub fn classify_voltage(output_voltage: f64, settings: &MatchingSettings) -> VoltageVerdict {
    if output_voltage < settings.mm_sensitivity_min_mv {
        VoltageVerdict::LowGain
    } else if output_voltage > settings.mm_sensitivity_max_mv {
        VoltageVerdict::ExcessiveGain
    } else {
        VoltageVerdict::Optimal
    }
}

fn load_recommendation(
    verdict: LoadVerdict,
    load: f64,
    internal_impedance: f64,
    min_load: f64,
    settings: &MatchingSettings,
) -> String {
    match verdict {
        LoadVerdict::Optimal => format!(
            "The {:.0} Ω load suits the cartridge's {} Ω internal impedance (recommended minimum {:.0} Ω).",
            load, internal_impedance, min_load
        ),
        LoadVerdict::OverLoaded => format!(
            "The {:.0} Ω load is below the recommended minimum of {:.0} Ω for a {} Ω cartridge; expect high-frequency roll-off and reduced output. A SUT with a lower turns ratio or higher primary impedance would load it less.",
            load, min_load, internal_impedance
        ),
        LoadVerdict::UnderLoaded => format!(
            "The {:.0} Ω load is more than {}× the cartridge's {} Ω internal impedance; the cartridge is lightly loaded and the treble may sound bright.",
            load, settings.sut_max_load_multiplier, internal_impedance
        ),
    }
}

fn voltage_recommendation(
    verdict: VoltageVerdict,
    output_voltage: f64,
    gain_db: f64,
    turns_ratio: f64,
    settings: &MatchingSettings,
) -> String {
    let window = format!(
        "{}-{} mV",
        settings.mm_sensitivity_min_mv, settings.mm_sensitivity_max_mv
    );
    match verdict {
        VoltageVerdict::Optimal => format!(
            "Its {:.1} dB of gain (1:{:.1}) delivers {:.2} mV, within the {} MM input window.",
            gain_db, turns_ratio, output_voltage, window
        ),
        VoltageVerdict::LowGain => format!(
            "Its {:.1} dB of gain (1:{:.1}) delivers only {:.2} mV, below the {} MM input window; expect low level and more noise. A higher-ratio SUT would suit this cartridge better.",
            gain_db, turns_ratio, output_voltage, window
        ),
        VoltageVerdict::ExcessiveGain => format!(
            "Its {:.1} dB of gain (1:{:.1}) delivers {:.2} mV, above the {} MM input window; the phono stage may overload. A lower-ratio SUT would suit this cartridge better.",
            gain_db, turns_ratio, output_voltage, window
        ),
    }
}

/// Electrical compatibility of `cartridge` feeding `sut`.
///
/// Returns `Ok(None)` when no SUT is given. When the SUT does not record its
/// input impedance, the load is the MM input impedance (from `phono_preamp`, or
/// the configured default) reflected through the turns ratio.
pub fn match_sut(
    cartridge: &CartridgeInfo,
    sut: Option<&SutInfo>,
    phono_preamp: Option<&PhonoPreampInfo>,
    settings: &MatchingSettings,
) -> Result<Option<SutMatchingResult>, MatchingError> {
    let Some(sut) = sut else {
        return Ok(None);
    };

    let internal_impedance = positive(cartridge.internal_impedance).ok_or_else(|| {
        MatchingError::MissingElectricalSpec(format!(
            "cartridge '{}' has no internal impedance on record",
            cartridge.identity.id
        ))
    })?;
    let cartridge_output = positive(cartridge.output_voltage).ok_or_else(|| {
        MatchingError::MissingElectricalSpec(format!(
            "cartridge '{}' has no output voltage on record",
            cartridge.identity.id
        ))
    })?;

    let recorded_gain = sut.gain_db.filter(|g| g.is_finite());
    let turns_ratio = positive(sut.turns_ratio)
        .or_else(|| recorded_gain.map(|g| 10f64.powf(g / 20.0)))
        .ok_or_else(|| {
            MatchingError::MissingElectricalSpec(format!(
                "SUT '{}' has neither a turns ratio nor a gain on record",
                sut.identity.id
            ))
        })?;
    if positive(Some(turns_ratio)).is_none() {
        return Err(MatchingError::MissingElectricalSpec(format!(
            "SUT '{}' gain of {} dB gives no usable turns ratio",
            sut.identity.id,
            recorded_gain.unwrap_or_default()
        )));
    }
    let voltage_gain = recorded_gain.unwrap_or_else(|| 20.0 * turns_ratio.log10());

    let load = match positive(sut.input_impedance) {
        Some(impedance) => impedance,
        None => {
            let secondary_load = phono_preamp
                .and_then(|p| positive(p.mm_input_impedance))
                .unwrap_or(settings.default_mm_input_impedance);
            secondary_load / (turns_ratio * turns_ratio)
        }
    };

    let recommended_min_load = internal_impedance * settings.sut_load_multiplier;
    let output_voltage = cartridge_output * turns_ratio;
    if positive(Some(load)).is_none() || positive(Some(output_voltage)).is_none() {
        return Err(MatchingError::MissingElectricalSpec(format!(
            "SUT '{}' at 1:{} gives no usable load or output voltage",
            sut.identity.id, turns_ratio
        )));
    }
    let load_verdict = classify_load(load, internal_impedance, settings);
    let voltage_verdict = classify_voltage(output_voltage, settings);

    let mut recommendation = format!(
        "{} {}",
        load_recommendation(
            load_verdict,
            load,
            internal_impedance,
            recommended_min_load,
            settings
        ),
        voltage_recommendation(
            voltage_verdict,
            output_voltage,
            voltage_gain,
            turns_ratio,
            settings
        )
    );
    if cartridge.cartridge_type == CartridgeType::MovingMagnet {
        recommendation.push_str(
            " Note that a SUT is normally bypassed for moving-magnet cartridges, which connect straight to the MM input.",
        );
    }

    Ok(Some(SutMatchingResult {
        cartridge_load_impedance: load,
        cartridge_internal_impedance: internal_impedance,
        recommended_min_load,
        output_voltage,
        voltage_gain,
        turns_ratio,
        is_load_optimal: load >= recommended_min_load,
        is_voltage_optimal: voltage_verdict == VoltageVerdict::Optimal,
        load_verdict,
        voltage_verdict,
        recommendation,
    }))
}
