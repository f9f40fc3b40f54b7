//! Public entry point of the matching engine.

use super::compatibility::{aggregate, assess_gain_staging, AnalysisContext};
use super::error::MatchingError;
use super::models::*;
use super::resonance::analyze_resonance;
use super::settings::MatchingSettings;
use super::sut::match_sut;
use super::weight::estimate_weight;
use crate::catalog_store::{ComponentKind, ComponentStore};
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves the requested components and runs the full analysis.
#[derive(Clone)]
pub struct MatchRequestHandler {
    store: Arc<dyn ComponentStore>,
    settings: MatchingSettings,
}

fn optional_id(id: &Option<String>) -> Option<&str> {
    id.as_deref().map(str::trim).filter(|id| !id.is_empty())
}

fn required_id<'a>(id: &'a str, field: &str) -> Result<&'a str, MatchingError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(MatchingError::InvalidRequest(format!("{} is required", field)));
    }
    Ok(id)
}

fn not_found(kind: ComponentKind, id: &str) -> MatchingError {
    MatchingError::ComponentNotFound {
        kind,
        id: id.to_string(),
    }
}

impl MatchRequestHandler {
    pub fn new(store: Arc<dyn ComponentStore>, settings: MatchingSettings) -> Self {
        Self { store, settings }
    }

    pub fn settings(&self) -> &MatchingSettings {
        &self.settings
    }

    /// Runs the match and stamps the response with the current UTC time.
    pub fn calculate_matching(
        &self,
        request: &MatcherRequest,
    ) -> Result<MatcherResponse, MatchingError> {
        let (components, matching) = self.evaluate(request)?;
        Ok(MatcherResponse {
            components,
            matching,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    /// Resolution and analysis without the timestamp.
    ///
    /// Identical requests against unchanged data give identical results.
    pub fn evaluate(
        &self,
        request: &MatcherRequest,
    ) -> Result<(ResolvedComponents, MatchingResult), MatchingError> {
        let tonearm_id = required_id(&request.tonearm_id, "tonearmId")?;
        let cartridge_id = required_id(&request.cartridge_id, "cartridgeId")?;
        if let Some(weight) = request.headshell_weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(MatchingError::InvalidMass(format!(
                    "headshell weight override of {} g",
                    weight
                )));
            }
        }

        let tonearm = self
            .store
            .get_tonearm(tonearm_id)?
            .ok_or_else(|| not_found(ComponentKind::Tonearm, tonearm_id))?;
        let cartridge = self
            .store
            .get_cartridge(cartridge_id)?
            .ok_or_else(|| not_found(ComponentKind::Cartridge, cartridge_id))?;
        let sut = match optional_id(&request.sut_id) {
            Some(id) => Some(
                self.store
                    .get_sut(id)?
                    .ok_or_else(|| not_found(ComponentKind::Sut, id))?,
            ),
            None => None,
        };
        let phono_preamp = match optional_id(&request.phono_preamp_id) {
            Some(id) => Some(
                self.store
                    .get_phono_preamp(id)?
                    .ok_or_else(|| not_found(ComponentKind::PhonoPreamp, id))?,
            ),
            None => None,
        };

        let weight = estimate_weight(&cartridge, self.store.as_ref(), &self.settings)?;
        let resonance = analyze_resonance(
            &tonearm,
            weight.weight,
            cartridge.compliance,
            request.headshell_weight,
            &self.settings,
        )?;

        let mut context = AnalysisContext {
            gain_staging: assess_gain_staging(
                cartridge.cartridge_type,
                sut.is_some(),
                phono_preamp.as_ref(),
            ),
            estimated_weight: weight.info.clone(),
            ..Default::default()
        };
        let sut_result = match match_sut(
            &cartridge,
            sut.as_ref(),
            phono_preamp.as_ref(),
            &self.settings,
        ) {
            Ok(result) => result,
            Err(MatchingError::MissingElectricalSpec(reason)) => {
                warn!(
                    "Skipping SUT analysis for cartridge {}: {}",
                    cartridge.identity.id, reason
                );
                context.sut_skipped = Some(reason);
                None
            }
            Err(err) => return Err(err),
        };

        let assessment = aggregate(&resonance, sut_result.as_ref(), &context);
        debug!(
            "Matched tonearm {} with cartridge {}: {:.2} Hz, {}",
            tonearm.identity.id,
            cartridge.identity.id,
            resonance.resonance_frequency,
            assessment.overall_compatibility
        );

        let cartridge = match weight.info {
            Some(info) => cartridge.with_estimated_weight(weight.weight, info),
            None => cartridge,
        };

        Ok((
            ResolvedComponents {
                tonearm,
                cartridge,
                sut,
                phono_preamp,
            },
            MatchingResult {
                resonance,
                sut: sut_result,
                overall_compatibility: assessment.overall_compatibility,
                detailed_analysis: assessment.detailed_analysis,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::{
        CartridgeInfo, CartridgeType, ComponentIdentity, InMemoryComponentStore, PhonoPreampInfo,
        SutInfo, TonearmInfo, WritableComponentStore,
    };

    fn identity(id: &str) -> ComponentIdentity {
        ComponentIdentity {
            id: id.to_string(),
            brand: "Brand".to_string(),
            model: id.to_string(),
            image_url: None,
        }
    }

    fn cartridge(
        id: &str,
        cartridge_type: CartridgeType,
        weight: Option<f64>,
        compliance: Option<f64>,
    ) -> CartridgeInfo {
        CartridgeInfo {
            identity: identity(id),
            cartridge_type,
            weight,
            weight_estimated: false,
            weight_estimation_info: None,
            compliance,
            output_voltage: Some(0.4),
            internal_impedance: Some(5.0),
        }
    }

    fn seeded_store() -> Arc<InMemoryComponentStore> {
        let store = InMemoryComponentStore::new();
        store
            .insert_tonearm(&TonearmInfo {
                identity: identity("arm-12g"),
                effective_mass: 12.0,
                effective_length: None,
                arm_type: None,
                headshell_type: None,
                headshell_weight: None,
            })
            .unwrap();
        store
            .insert_cartridge(&cartridge("mm-20", CartridgeType::MovingMagnet, Some(6.0), Some(20.0)))
            .unwrap();
        store
            .insert_cartridge(&cartridge("mc-10", CartridgeType::MovingCoil, Some(6.0), Some(10.0)))
            .unwrap();
        store
            .insert_cartridge(&cartridge("mc-noweight", CartridgeType::MovingCoil, None, Some(12.0)))
            .unwrap();
        store
            .insert_cartridge(&cartridge("mm-nocompliance", CartridgeType::MovingMagnet, Some(6.0), None))
            .unwrap();
        store
            .insert_cartridge(&cartridge("mm-unmatched", CartridgeType::MovingMagnet, None, Some(40.0)))
            .unwrap();
        store
            .insert_sut(&SutInfo {
                identity: identity("sut-100"),
                input_impedance: Some(100.0),
                gain_db: None,
                turns_ratio: Some(10.0),
            })
            .unwrap();
        store
            .insert_sut(&SutInfo {
                identity: identity("sut-unspecified"),
                input_impedance: None,
                gain_db: None,
                turns_ratio: None,
            })
            .unwrap();
        store
            .insert_phono_preamp(&PhonoPreampInfo {
                identity: identity("mm-only-preamp"),
                mm_input_impedance: Some(47_000.0),
                has_mc_input: Some(false),
                gain_db: Some(40.0),
            })
            .unwrap();
        Arc::new(store)
    }

    fn handler() -> MatchRequestHandler {
        MatchRequestHandler::new(seeded_store(), MatchingSettings::default())
    }

    fn request(tonearm: &str, cartridge: &str) -> MatcherRequest {
        MatcherRequest {
            tonearm_id: tonearm.to_string(),
            cartridge_id: cartridge.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn resonance_only_match() {
        let response = handler()
            .calculate_matching(&request("arm-12g", "mm-20"))
            .unwrap();

        assert!(response.matching.sut.is_none());
        assert!(response.matching.resonance.is_optimal);
        assert_eq!(
            response.matching.overall_compatibility,
            Compatibility::Excellent
        );
        assert!(response.components.sut.is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&response.timestamp).is_ok());
    }

    #[test]
    fn mc_with_sut_is_fully_analysed() {
        let response = handler()
            .calculate_matching(&MatcherRequest {
                sut_id: Some("sut-100".to_string()),
                ..request("arm-12g", "mc-10")
            })
            .unwrap();

        let sut = response.matching.sut.unwrap();
        assert!(sut.is_load_optimal);
        assert!(sut.is_voltage_optimal);
        assert_eq!(
            response.matching.overall_compatibility,
            Compatibility::Excellent
        );
        assert_eq!(response.components.sut.unwrap().identity.id, "sut-100");
    }

    #[test]
    fn missing_components_are_reported_by_kind() {
        let handler = handler();
        match handler.calculate_matching(&request("nope", "mm-20")) {
            Err(MatchingError::ComponentNotFound { kind, id }) => {
                assert_eq!(kind, ComponentKind::Tonearm);
                assert_eq!(id, "nope");
            }
            other => panic!("unexpected: {:?}", other),
        }

        let err = handler
            .calculate_matching(&MatcherRequest {
                phono_preamp_id: Some("ghost".to_string()),
                ..request("arm-12g", "mm-20")
            })
            .unwrap_err();
        assert!(matches!(
            err,
            MatchingError::ComponentNotFound {
                kind: ComponentKind::PhonoPreamp,
                ..
            }
        ));
    }

    #[test]
    fn blank_ids_are_rejected_and_blank_optionals_ignored() {
        let handler = handler();
        assert!(matches!(
            handler.calculate_matching(&request(" ", "mm-20")),
            Err(MatchingError::InvalidRequest(_))
        ));

        let response = handler
            .calculate_matching(&MatcherRequest {
                sut_id: Some("".to_string()),
                ..request("arm-12g", "mm-20")
            })
            .unwrap();
        assert!(response.components.sut.is_none());
    }

    #[test]
    fn negative_headshell_override_is_rejected() {
        let err = handler()
            .calculate_matching(&MatcherRequest {
                headshell_weight: Some(-1.0),
                ..request("arm-12g", "mm-20")
            })
            .unwrap_err();
        assert!(matches!(err, MatchingError::InvalidMass(_)));
    }

    #[test]
    fn missing_compliance_fails_the_request() {
        let err = handler()
            .calculate_matching(&request("arm-12g", "mm-nocompliance"))
            .unwrap_err();
        assert!(matches!(err, MatchingError::InvalidCompliance(_)));
    }

    #[test]
    fn weightless_cartridge_without_references_fails_the_request() {
        let err = handler()
            .calculate_matching(&request("arm-12g", "mm-unmatched"))
            .unwrap_err();
        assert!(
            matches!(err, MatchingError::InsufficientReferenceData { .. }),
            "unexpected: {:?}",
            err
        );
        assert_eq!(err.code(), "insufficient_reference_data");
    }

    #[test]
    fn incomplete_sut_degrades_to_resonance_only() {
        let response = handler()
            .calculate_matching(&MatcherRequest {
                sut_id: Some("sut-unspecified".to_string()),
                ..request("arm-12g", "mc-10")
            })
            .unwrap();

        assert!(response.matching.sut.is_none());
        assert!(response
            .matching
            .detailed_analysis
            .contains("analysis was skipped"));
        // The SUT record itself is still echoed back.
        assert!(response.components.sut.is_some());
    }

    #[test]
    fn estimated_weight_is_flagged_in_response() {
        let response = handler()
            .calculate_matching(&request("arm-12g", "mc-noweight"))
            .unwrap();

        let cartridge = response.components.cartridge;
        assert!(cartridge.weight_estimated);
        assert_eq!(cartridge.weight, Some(6.0));
        assert_eq!(cartridge.weight_estimation_info.unwrap().count, 1);
        assert!(response.matching.detailed_analysis.contains("estimate"));
    }

    #[test]
    fn mc_into_mm_only_preamp_is_capped() {
        let response = handler()
            .calculate_matching(&MatcherRequest {
                phono_preamp_id: Some("mm-only-preamp".to_string()),
                ..request("arm-12g", "mc-10")
            })
            .unwrap();
        assert_eq!(response.matching.overall_compatibility, Compatibility::Fair);
        assert!(response.matching.detailed_analysis.contains("40 dB MM stage"));
    }

    #[test]
    fn matching_is_idempotent() {
        let handler = handler();
        let req = MatcherRequest {
            sut_id: Some("sut-100".to_string()),
            headshell_weight: Some(4.5),
            ..request("arm-12g", "mc-noweight")
        };

        let first = serde_json::to_string(&handler.evaluate(&req).unwrap().1).unwrap();
        let second = serde_json::to_string(&handler.evaluate(&req).unwrap().1).unwrap();
        assert_eq!(first, second);
    }
}
