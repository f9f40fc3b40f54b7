//! Cartridge weight estimation from a reference population.

use super::error::MatchingError;
use super::models::WeightEstimate;
use super::settings::MatchingSettings;
use crate::catalog_store::{CartridgeInfo, ComplianceBand, ComponentStore, WeightEstimationInfo};
use tracing::debug;

/// Returns the cartridge's weight, estimating it when the record has none.
///
/// The reference population is every cartridge of the same type with a
/// measured weight whose compliance lies within
/// `settings.weight_compliance_band` of this cartridge's compliance. Without a
/// compliance figure the population is every same-type cartridge. The estimate
/// is the population median.
pub fn estimate_weight(
    cartridge: &CartridgeInfo,
    reference: &dyn ComponentStore,
    settings: &MatchingSettings,
) -> Result<WeightEstimate, MatchingError> {
    if let Some(weight) = cartridge.weight {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(MatchingError::InvalidMass(format!(
                "cartridge '{}' has a recorded weight of {} g",
                cartridge.identity.id, weight
            )));
        }
        return Ok(WeightEstimate {
            weight,
            estimated: false,
            info: None,
        });
    }

    let band = cartridge
        .compliance
        .filter(|c| c.is_finite() && *c > 0.0)
        .map(|c| ComplianceBand::around(c, settings.weight_compliance_band));
    let weights = reference.query_cartridge_weights(cartridge.cartridge_type, band)?;

    let Some(weight) = median(&weights) else {
        let criteria = match band {
            Some(band) => format!("with compliance {:.1}-{:.1} cu/mN", band.min, band.max),
            None => "on record".to_string(),
        };
        return Err(MatchingError::InsufficientReferenceData {
            cartridge_type: cartridge.cartridge_type,
            criteria,
        });
    };

    let source = match band {
        Some(band) => format!(
            "median weight of {} {} cartridges with compliance {:.1}-{:.1} cu/mN",
            weights.len(),
            cartridge.cartridge_type,
            band.min,
            band.max
        ),
        None => format!(
            "median weight of {} {} cartridges (compliance unknown, matched by type only)",
            weights.len(),
            cartridge.cartridge_type
        ),
    };
    debug!(
        "Estimated weight of cartridge {} as {:.2} g ({})",
        cartridge.identity.id, weight, source
    );

    Ok(WeightEstimate {
        weight,
        estimated: true,
        info: Some(WeightEstimationInfo {
            source,
            count: weights.len(),
        }),
    })
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::{
        CartridgeType, ComponentIdentity, InMemoryComponentStore, WritableComponentStore,
    };

    fn cartridge(
        id: &str,
        cartridge_type: CartridgeType,
        weight: Option<f64>,
        compliance: Option<f64>,
    ) -> CartridgeInfo {
        CartridgeInfo {
            identity: ComponentIdentity {
                id: id.to_string(),
                brand: "Grado".to_string(),
                model: id.to_string(),
                image_url: None,
            },
            cartridge_type,
            weight,
            weight_estimated: false,
            weight_estimation_info: None,
            compliance,
            output_voltage: None,
            internal_impedance: None,
        }
    }

    fn reference_with(cartridges: &[CartridgeInfo]) -> InMemoryComponentStore {
        let store = InMemoryComponentStore::new();
        for c in cartridges {
            store.insert_cartridge(c).unwrap();
        }
        store
    }

    #[test]
    fn measured_weight_is_returned_unchanged() {
        let store = InMemoryComponentStore::new();
        let target = cartridge("c", CartridgeType::MovingMagnet, Some(6.3), Some(20.0));

        let estimate = estimate_weight(&target, &store, &MatchingSettings::default()).unwrap();
        assert_eq!(estimate.weight, 6.3);
        assert!(!estimate.estimated);
        assert!(estimate.info.is_none());
    }

    #[test]
    fn zero_weight_is_rejected() {
        let store = InMemoryComponentStore::new();
        let target = cartridge("c", CartridgeType::MovingMagnet, Some(0.0), Some(20.0));

        let err = estimate_weight(&target, &store, &MatchingSettings::default()).unwrap_err();
        assert!(matches!(err, MatchingError::InvalidMass(_)));
    }

    #[test]
    fn missing_weight_uses_median_of_five_in_band() {
        let store = reference_with(&[
            cartridge("r1", CartridgeType::MovingMagnet, Some(5.0), Some(16.0)),
            cartridge("r2", CartridgeType::MovingMagnet, Some(5.5), Some(18.0)),
            cartridge("r3", CartridgeType::MovingMagnet, Some(6.0), Some(20.0)),
            cartridge("r4", CartridgeType::MovingMagnet, Some(6.5), Some(22.0)),
            cartridge("r5", CartridgeType::MovingMagnet, Some(7.5), Some(25.0)),
            // Outside the band or of another type.
            cartridge("r6", CartridgeType::MovingMagnet, Some(12.0), Some(35.0)),
            cartridge("r7", CartridgeType::MovingCoil, Some(9.0), Some(20.0)),
        ]);
        let target = cartridge("c", CartridgeType::MovingMagnet, None, Some(20.0));

        let estimate = estimate_weight(&target, &store, &MatchingSettings::default()).unwrap();
        assert!(estimate.estimated);
        assert_eq!(estimate.weight, 6.0);
        let info = estimate.info.unwrap();
        assert_eq!(info.count, 5);
        assert_eq!(
            info.source,
            "median weight of 5 MM cartridges with compliance 15.0-25.0 cu/mN"
        );
    }

    #[test]
    fn even_population_averages_middle_values() {
        let store = reference_with(&[
            cartridge("r1", CartridgeType::MovingCoil, Some(8.0), Some(10.0)),
            cartridge("r2", CartridgeType::MovingCoil, Some(9.0), Some(12.0)),
        ]);
        let target = cartridge("c", CartridgeType::MovingCoil, None, Some(11.0));

        let estimate = estimate_weight(&target, &store, &MatchingSettings::default()).unwrap();
        assert_eq!(estimate.weight, 8.5);
        assert_eq!(estimate.info.unwrap().count, 2);
    }

    #[test]
    fn unknown_compliance_falls_back_to_type() {
        let store = reference_with(&[
            cartridge("r1", CartridgeType::MovingCoil, Some(8.0), Some(10.0)),
            cartridge("r2", CartridgeType::MovingCoil, Some(10.0), None),
            cartridge("r3", CartridgeType::MovingCoil, Some(11.0), Some(30.0)),
        ]);
        let target = cartridge("c", CartridgeType::MovingCoil, None, None);

        let estimate = estimate_weight(&target, &store, &MatchingSettings::default()).unwrap();
        assert_eq!(estimate.weight, 10.0);
        let info = estimate.info.unwrap();
        assert_eq!(info.count, 3);
        assert!(info.source.contains("matched by type only"));
    }

    #[test]
    fn empty_population_is_an_error() {
        let store = reference_with(&[cartridge(
            "r1",
            CartridgeType::MovingMagnet,
            Some(6.0),
            Some(40.0),
        )]);
        let target = cartridge("c", CartridgeType::MovingMagnet, None, Some(10.0));

        let err = estimate_weight(&target, &store, &MatchingSettings::default()).unwrap_err();
        match err {
            MatchingError::InsufficientReferenceData {
                cartridge_type,
                criteria,
            } => {
                assert_eq!(cartridge_type, CartridgeType::MovingMagnet);
                assert_eq!(criteria, "with compliance 5.0-15.0 cu/mN");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn median_of_unsorted_values() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[]), None);
    }
}
