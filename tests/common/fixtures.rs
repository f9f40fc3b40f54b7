//! Test fixture creation for the component catalog

use super::constants::*;
use anyhow::Result;
use std::path::PathBuf;
use tempfile::TempDir;
use turntable_catalog_server::catalog_store::{
    CartridgeInfo, CartridgeType, ComponentIdentity, PhonoPreampInfo, SqliteComponentStore,
    SutInfo, TonearmInfo, WritableComponentStore,
};

fn identity(id: &str, brand: &str, model: &str) -> ComponentIdentity {
    ComponentIdentity {
        id: id.to_string(),
        brand: brand.to_string(),
        model: model.to_string(),
        image_url: None,
    }
}

fn cartridge(
    identity: ComponentIdentity,
    cartridge_type: CartridgeType,
    weight: Option<f64>,
    compliance: Option<f64>,
) -> CartridgeInfo {
    CartridgeInfo {
        identity,
        cartridge_type,
        weight,
        weight_estimated: false,
        weight_estimation_info: None,
        compliance,
        output_voltage: None,
        internal_impedance: None,
    }
}

/// Creates a temporary catalog database seeded with the components named in
/// `constants`.
/// Returns (temp_dir, catalog_db_path)
pub fn create_test_catalog() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let catalog_db_path = dir.path().join("catalog.db");
    let store = SqliteComponentStore::new(&catalog_db_path, 1)?;

    store.insert_tonearm(&TonearmInfo {
        identity: identity(TONEARM_ID, TONEARM_BRAND, "3009 Series II"),
        effective_mass: TONEARM_EFFECTIVE_MASS,
        effective_length: Some(229.0),
        arm_type: Some("gimbal".to_string()),
        headshell_type: None,
        headshell_weight: None,
    })?;

    store.insert_cartridge(&CartridgeInfo {
        output_voltage: Some(3.3),
        ..cartridge(
            identity(CARTRIDGE_MM_ID, "Audio-Technica", "VM95E"),
            CartridgeType::MovingMagnet,
            Some(6.0),
            Some(20.0),
        )
    })?;
    store.insert_cartridge(&CartridgeInfo {
        output_voltage: Some(0.3),
        internal_impedance: Some(5.0),
        ..cartridge(
            identity(CARTRIDGE_MC_ID, "Denon", "DL-103"),
            CartridgeType::MovingCoil,
            Some(6.0),
            Some(10.0),
        )
    })?;
    store.insert_cartridge(&cartridge(
        identity(CARTRIDGE_NO_WEIGHT_ID, "Unknown", "Mystery MM"),
        CartridgeType::MovingMagnet,
        None,
        Some(CARTRIDGE_NO_WEIGHT_COMPLIANCE),
    ))?;
    store.insert_cartridge(&CartridgeInfo {
        output_voltage: Some(0.5),
        internal_impedance: Some(10.0),
        ..cartridge(
            identity(CARTRIDGE_NO_REFERENCE_ID, "Obscure", "Orphan MC"),
            CartridgeType::MovingCoil,
            None,
            Some(40.0),
        )
    })?;
    for (id, compliance, weight) in REFERENCE_MM_CARTRIDGES {
        store.insert_cartridge(&cartridge(
            identity(id, "Reference", id),
            CartridgeType::MovingMagnet,
            Some(weight),
            Some(compliance),
        ))?;
    }

    store.insert_sut(&SutInfo {
        identity: identity(SUT_ID, "Denon", "AU-300LC"),
        input_impedance: Some(100.0),
        gain_db: Some(20.0),
        turns_ratio: Some(10.0),
    })?;
    store.insert_sut(&SutInfo {
        identity: identity(SUT_UNSPECIFIED_ID, "Unbranded", "Step-up"),
        input_impedance: None,
        gain_db: None,
        turns_ratio: None,
    })?;

    store.insert_phono_preamp(&PhonoPreampInfo {
        identity: identity(PREAMP_MM_ONLY_ID, "Rega", "Fono Mini"),
        mm_input_impedance: Some(47_000.0),
        has_mc_input: Some(false),
        gain_db: Some(40.0),
    })?;

    Ok((dir, catalog_db_path))
}
