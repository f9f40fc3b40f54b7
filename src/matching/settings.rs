use anyhow::{bail, Result};

/// Numeric thresholds used by the matching engine.
///
/// Defaults follow common audio engineering practice; every value can be
/// overridden from the `[matching]` section of the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingSettings {
    /// Lower edge of the optimal resonance band, Hz.
    pub resonance_min_hz: f64,
    /// Upper edge of the optimal resonance band, Hz.
    pub resonance_max_hz: f64,
    /// Distance inside the band at which a frequency counts as borderline, Hz.
    pub edge_margin_hz: f64,
    /// Distance outside the band still considered only slightly off, Hz.
    pub borderline_margin_hz: f64,
    /// Minimum load as a multiple of the cartridge internal impedance.
    pub sut_load_multiplier: f64,
    /// Above this multiple of the internal impedance the cartridge is lightly loaded.
    pub sut_max_load_multiplier: f64,
    /// MM input sensitivity window, mV.
    pub mm_sensitivity_min_mv: f64,
    pub mm_sensitivity_max_mv: f64,
    /// Assumed MM input impedance when no phono preamp is given, ohms.
    pub default_mm_input_impedance: f64,
    /// Half-width of the compliance band for weight estimation, cu/mN.
    pub weight_compliance_band: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            resonance_min_hz: 8.0,
            resonance_max_hz: 12.0,
            edge_margin_hz: 0.5,
            borderline_margin_hz: 2.0,
            sut_load_multiplier: 10.0,
            sut_max_load_multiplier: 100.0,
            mm_sensitivity_min_mv: 2.5,
            mm_sensitivity_max_mv: 10.0,
            default_mm_input_impedance: 47_000.0,
            weight_compliance_band: 5.0,
        }
    }
}

impl MatchingSettings {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("resonance_min_hz", self.resonance_min_hz),
            ("resonance_max_hz", self.resonance_max_hz),
            ("sut_load_multiplier", self.sut_load_multiplier),
            ("sut_max_load_multiplier", self.sut_max_load_multiplier),
            ("mm_sensitivity_min_mv", self.mm_sensitivity_min_mv),
            ("mm_sensitivity_max_mv", self.mm_sensitivity_max_mv),
            ("default_mm_input_impedance", self.default_mm_input_impedance),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                bail!("matching.{} must be a positive number, got {}", name, value);
            }
        }

        let non_negative = [
            ("edge_margin_hz", self.edge_margin_hz),
            ("borderline_margin_hz", self.borderline_margin_hz),
            ("weight_compliance_band", self.weight_compliance_band),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                bail!("matching.{} must not be negative, got {}", name, value);
            }
        }

        if self.resonance_min_hz >= self.resonance_max_hz {
            bail!(
                "matching.resonance_min_hz ({}) must be below resonance_max_hz ({})",
                self.resonance_min_hz,
                self.resonance_max_hz
            );
        }
        if self.edge_margin_hz * 2.0 > self.resonance_max_hz - self.resonance_min_hz {
            bail!(
                "matching.edge_margin_hz ({}) is wider than half the resonance band",
                self.edge_margin_hz
            );
        }
        if self.sut_load_multiplier >= self.sut_max_load_multiplier {
            bail!(
                "matching.sut_load_multiplier ({}) must be below sut_max_load_multiplier ({})",
                self.sut_load_multiplier,
                self.sut_max_load_multiplier
            );
        }
        if self.mm_sensitivity_min_mv >= self.mm_sensitivity_max_mv {
            bail!(
                "matching.mm_sensitivity_min_mv ({}) must be below mm_sensitivity_max_mv ({})",
                self.mm_sensitivity_min_mv,
                self.mm_sensitivity_max_mv
            );
        }
        Ok(())
    }
}
