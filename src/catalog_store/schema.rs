//! SQLite schema definitions for the component catalog database.
//!
//! Components reference their brand by rowid; public lookups go through the
//! text `id` column, which is unique per table.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

const BRAND_FK: ForeignKey = ForeignKey {
    foreign_table: "brands",
    foreign_column: "rowid",
    on_delete: ForeignKeyOnChange::Restrict,
};

const BRANDS_TABLE: Table = Table {
    name: "brands",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true, is_unique = true),
    ],
    indices: &[],
};

const TONEARMS_TABLE: Table = Table {
    name: "tonearms",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "brand_rowid",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&BRAND_FK)
        ),
        sqlite_column!("model", &SqlType::Text, non_null = true),
        sqlite_column!("image_url", &SqlType::Text),
        sqlite_column!("effective_mass", &SqlType::Real, non_null = true), // grams
        sqlite_column!("effective_length", &SqlType::Real), // mm
        sqlite_column!("arm_type", &SqlType::Text),
        sqlite_column!("headshell_type", &SqlType::Text), // 'INTEGRATED', 'DETACHABLE'
        sqlite_column!("headshell_weight", &SqlType::Real), // grams
    ],
    indices: &[("idx_tonearms_brand", "brand_rowid")],
};

const CARTRIDGES_TABLE: Table = Table {
    name: "cartridges",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "brand_rowid",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&BRAND_FK)
        ),
        sqlite_column!("model", &SqlType::Text, non_null = true),
        sqlite_column!("image_url", &SqlType::Text),
        sqlite_column!("cartridge_type", &SqlType::Text, non_null = true), // 'MM', 'MC'
        sqlite_column!("weight", &SqlType::Real), // grams, NULL when unknown
        sqlite_column!("compliance", &SqlType::Real), // cu/mN at 10 Hz
        sqlite_column!("output_voltage", &SqlType::Real), // mV
        sqlite_column!("internal_impedance", &SqlType::Real), // ohms
    ],
    indices: &[
        ("idx_cartridges_brand", "brand_rowid"),
        ("idx_cartridges_type_compliance", "cartridge_type, compliance"),
    ],
};

const SUTS_TABLE: Table = Table {
    name: "step_up_transformers",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "brand_rowid",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&BRAND_FK)
        ),
        sqlite_column!("model", &SqlType::Text, non_null = true),
        sqlite_column!("image_url", &SqlType::Text),
        sqlite_column!("input_impedance", &SqlType::Real), // ohms
        sqlite_column!("gain_db", &SqlType::Real),
        sqlite_column!("turns_ratio", &SqlType::Real),
    ],
    indices: &[("idx_suts_brand", "brand_rowid")],
};

const PHONO_PREAMPS_TABLE: Table = Table {
    name: "phono_preamps",
    columns: &[
        sqlite_column!("rowid", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("id", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "brand_rowid",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&BRAND_FK)
        ),
        sqlite_column!("model", &SqlType::Text, non_null = true),
        sqlite_column!("image_url", &SqlType::Text),
        sqlite_column!("mm_input_impedance", &SqlType::Real), // ohms
        sqlite_column!("has_mc_input", &SqlType::Integer), // 0/1, NULL when unknown
        sqlite_column!("gain_db", &SqlType::Real),
    ],
    indices: &[("idx_phono_preamps_brand", "brand_rowid")],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        BRANDS_TABLE,
        TONEARMS_TABLE,
        CARTRIDGES_TABLE,
        SUTS_TABLE,
        PHONO_PREAMPS_TABLE,
    ],
    migration: None,
}];

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_creates_successfully() {
        let conn = Connection::open_in_memory().unwrap();
        let schema = &CATALOG_VERSIONED_SCHEMAS[0];
        schema.create(&conn).unwrap();
        schema.validate(&conn).unwrap();
    }

    #[test]
    fn test_component_requires_existing_brand() {
        let conn = Connection::open_in_memory().unwrap();
        CATALOG_VERSIONED_SCHEMAS[0].create(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO tonearms (id, brand_rowid, model, effective_mass) VALUES ('t1', 42, 'EPA-100', 14.0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_component_ids_are_unique() {
        let conn = Connection::open_in_memory().unwrap();
        CATALOG_VERSIONED_SCHEMAS[0].create(&conn).unwrap();
        conn.execute("INSERT INTO brands (name) VALUES ('Ortofon')", [])
            .unwrap();

        conn.execute(
            "INSERT INTO cartridges (id, brand_rowid, model, cartridge_type) VALUES ('c1', 1, 'SPU', 'MC')",
            [],
        )
        .unwrap();
        let duplicate = conn.execute(
            "INSERT INTO cartridges (id, brand_rowid, model, cartridge_type) VALUES ('c1', 1, 'MC20', 'MC')",
            [],
        );
        assert!(duplicate.is_err());
    }
}
