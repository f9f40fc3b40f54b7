//! Compatibility matching engine.
//!
//! Data flows one way: the handler resolves components, then weight
//! estimation, resonance analysis, SUT matching and aggregation run in turn.

mod compatibility;
mod error;
mod handler;
mod models;
mod resonance;
mod settings;
mod sut;
mod weight;

pub use compatibility::{
    aggregate, assess_gain_staging, grade, AnalysisContext, Assessment, GainStaging,
    ResonanceStanding, SutStanding,
};
pub use error::MatchingError;
pub use handler::MatchRequestHandler;
pub use models::*;
pub use resonance::{analyze_resonance, classify_resonance, resonance_frequency};
pub use settings::MatchingSettings;
pub use sut::{classify_load, classify_voltage, match_sut};
pub use weight::estimate_weight;
