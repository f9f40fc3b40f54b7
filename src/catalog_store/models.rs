//! Component catalog models.
//!
//! Every component shares a [`ComponentIdentity`] (flattened into the JSON
//! representation) and carries only the physical/electrical properties the
//! matching engine may need. Unknown properties are `None`, never zero.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Enumerations
// =============================================================================

/// The kinds of component the catalog stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    Tonearm,
    Cartridge,
    Sut,
    PhonoPreamp,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Tonearm,
        ComponentKind::Cartridge,
        ComponentKind::Sut,
        ComponentKind::PhonoPreamp,
    ];

    /// Parse the URL path segment used by the catalog routes.
    pub fn from_path_segment(s: &str) -> Option<Self> {
        match s {
            "tonearm" => Some(ComponentKind::Tonearm),
            "cartridge" => Some(ComponentKind::Cartridge),
            "sut" => Some(ComponentKind::Sut),
            "phono-preamp" => Some(ComponentKind::PhonoPreamp),
            _ => None,
        }
    }

    pub fn path_segment(&self) -> &'static str {
        match self {
            ComponentKind::Tonearm => "tonearm",
            ComponentKind::Cartridge => "cartridge",
            ComponentKind::Sut => "sut",
            ComponentKind::PhonoPreamp => "phono-preamp",
        }
    }

    /// Name of the table holding this kind of component.
    pub fn table_name(&self) -> &'static str {
        match self {
            ComponentKind::Tonearm => "tonearms",
            ComponentKind::Cartridge => "cartridges",
            ComponentKind::Sut => "step_up_transformers",
            ComponentKind::PhonoPreamp => "phono_preamps",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentKind::Tonearm => "Tonearm",
            ComponentKind::Cartridge => "Cartridge",
            ComponentKind::Sut => "Step-up transformer",
            ComponentKind::PhonoPreamp => "Phono preamp",
        };
        f.write_str(name)
    }
}

/// Cartridge generator type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartridgeType {
    #[serde(rename = "MM")]
    MovingMagnet,
    #[serde(rename = "MC")]
    MovingCoil,
}

impl CartridgeType {
    /// Convert from database string representation
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "MM" => Some(CartridgeType::MovingMagnet),
            "MC" => Some(CartridgeType::MovingCoil),
            _ => None,
        }
    }

    /// Convert to database string representation
    pub fn to_db_str(&self) -> &'static str {
        match self {
            CartridgeType::MovingMagnet => "MM",
            CartridgeType::MovingCoil => "MC",
        }
    }
}

impl fmt::Display for CartridgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}

/// How the headshell attaches to the arm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeadshellType {
    /// Part of the arm wand, already included in the effective mass.
    Integrated,
    /// Removable headshell (SME-type bayonet etc.), weighed separately.
    Detachable,
}

impl HeadshellType {
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "INTEGRATED" => Some(HeadshellType::Integrated),
            "DETACHABLE" => Some(HeadshellType::Detachable),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            HeadshellType::Integrated => "INTEGRATED",
            HeadshellType::Detachable => "DETACHABLE",
        }
    }
}

// =============================================================================
// Component records
// =============================================================================

/// Fields common to every catalog component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentIdentity {
    pub id: String,
    pub brand: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TonearmInfo {
    #[serde(flatten)]
    pub identity: ComponentIdentity,
    /// Grams, excluding cartridge.
    pub effective_mass: f64,
    /// Millimetres, pivot to stylus.
    pub effective_length: Option<f64>,
    pub arm_type: Option<String>,
    pub headshell_type: Option<HeadshellType>,
    /// Grams. Only meaningful when the headshell is not part of the arm.
    pub headshell_weight: Option<f64>,
}

/// Provenance of an estimated cartridge weight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEstimationInfo {
    /// The estimation method, stated verbatim.
    pub source: String,
    /// Size of the reference population used.
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartridgeInfo {
    #[serde(flatten)]
    pub identity: ComponentIdentity,
    #[serde(rename = "type")]
    pub cartridge_type: CartridgeType,
    /// Grams.
    pub weight: Option<f64>,
    #[serde(default)]
    pub weight_estimated: bool,
    #[serde(default)]
    pub weight_estimation_info: Option<WeightEstimationInfo>,
    /// Dynamic compliance at 10 Hz, cu/mN.
    pub compliance: Option<f64>,
    /// Millivolts at the reference groove velocity.
    pub output_voltage: Option<f64>,
    /// Ohms.
    pub internal_impedance: Option<f64>,
}

impl CartridgeInfo {
    /// Returns a copy carrying a derived weight, flagged as non-authoritative.
    pub fn with_estimated_weight(&self, weight: f64, info: WeightEstimationInfo) -> Self {
        CartridgeInfo {
            weight: Some(weight),
            weight_estimated: true,
            weight_estimation_info: Some(info),
            ..self.clone()
        }
    }
}

/// Step-up transformer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SutInfo {
    #[serde(flatten)]
    pub identity: ComponentIdentity,
    /// Ohms, primary side as seen by the cartridge.
    pub input_impedance: Option<f64>,
    /// Rated voltage gain, dB.
    pub gain_db: Option<f64>,
    /// Secondary:primary voltage ratio, e.g. 10.0 for 1:10.
    pub turns_ratio: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhonoPreampInfo {
    #[serde(flatten)]
    pub identity: ComponentIdentity,
    /// Ohms presented by the moving-magnet input.
    pub mm_input_impedance: Option<f64>,
    pub has_mc_input: Option<bool>,
    /// MM stage gain, dB.
    pub gain_db: Option<f64>,
}

/// Any catalog component, tagged by kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ComponentInfo {
    Tonearm(TonearmInfo),
    Cartridge(CartridgeInfo),
    Sut(SutInfo),
    PhonoPreamp(PhonoPreampInfo),
}

impl ComponentInfo {
    pub fn identity(&self) -> &ComponentIdentity {
        match self {
            ComponentInfo::Tonearm(t) => &t.identity,
            ComponentInfo::Cartridge(c) => &c.identity,
            ComponentInfo::Sut(s) => &s.identity,
            ComponentInfo::PhonoPreamp(p) => &p.identity,
        }
    }
}

/// Lightweight listing entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub kind: ComponentKind,
    #[serde(flatten)]
    pub identity: ComponentIdentity,
}

/// Inclusive compliance range used to select a reference population.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComplianceBand {
    pub min: f64,
    pub max: f64,
}

impl ComplianceBand {
    /// A band of `half_width` either side of `center`, floored at zero.
    pub fn around(center: f64, half_width: f64) -> Self {
        ComplianceBand {
            min: (center - half_width).max(0.0),
            max: center + half_width,
        }
    }

    pub fn contains(&self, compliance: f64) -> bool {
        compliance >= self.min && compliance <= self.max
    }
}
