//! SQLite-backed component catalog.

use super::models::*;
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::{ComponentStore, WritableComponentStore};
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::info;

/// SQLite-backed component store.
///
/// Writes go through a single connection; reads are spread round-robin over a
/// small pool of read-only connections.
#[derive(Clone)]
pub struct SqliteComponentStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let latest_version = CATALOG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &CATALOG_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating catalog db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    if db_version < BASE_DB_VERSION as i64 {
        bail!(
            "Database has user_version {} and is not a component catalog",
            db_version
        );
    }

    let mut current_version = (db_version - BASE_DB_VERSION as i64) as usize;
    if current_version > latest_version {
        bail!(
            "Catalog db version {} is newer than supported version {}",
            current_version,
            latest_version
        );
    }

    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in CATALOG_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating catalog db from version {} to {}",
                    current_version, schema.version
                );
                migration_fn(&tx)?;
            }
            current_version = schema.version;
        }
        tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
        tx.commit()?;
    }

    latest_schema
        .validate(conn)
        .context("Catalog db schema validation failed")
}

const TONEARM_COLUMNS: &str = "t.id, b.name, t.model, t.image_url, t.effective_mass, \
     t.effective_length, t.arm_type, t.headshell_type, t.headshell_weight";

const CARTRIDGE_COLUMNS: &str = "c.id, b.name, c.model, c.image_url, c.cartridge_type, \
     c.weight, c.compliance, c.output_voltage, c.internal_impedance";

const SUT_COLUMNS: &str =
    "s.id, b.name, s.model, s.image_url, s.input_impedance, s.gain_db, s.turns_ratio";

const PHONO_PREAMP_COLUMNS: &str =
    "p.id, b.name, p.model, p.image_url, p.mm_input_impedance, p.has_mc_input, p.gain_db";

fn identity_from_row(row: &Row) -> rusqlite::Result<ComponentIdentity> {
    Ok(ComponentIdentity {
        id: row.get(0)?,
        brand: row.get(1)?,
        model: row.get(2)?,
        image_url: row.get(3)?,
    })
}

fn unknown_enum_value(column: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        format!("unknown value '{}'", value).into(),
    )
}

fn tonearm_from_row(row: &Row) -> rusqlite::Result<TonearmInfo> {
    let headshell_type = match row.get::<_, Option<String>>(7)? {
        Some(s) => Some(HeadshellType::from_db_str(&s).ok_or_else(|| unknown_enum_value(7, &s))?),
        None => None,
    };
    Ok(TonearmInfo {
        identity: identity_from_row(row)?,
        effective_mass: row.get(4)?,
        effective_length: row.get(5)?,
        arm_type: row.get(6)?,
        headshell_type,
        headshell_weight: row.get(8)?,
    })
}

fn cartridge_from_row(row: &Row) -> rusqlite::Result<CartridgeInfo> {
    let type_str: String = row.get(4)?;
    let cartridge_type =
        CartridgeType::from_db_str(&type_str).ok_or_else(|| unknown_enum_value(4, &type_str))?;
    Ok(CartridgeInfo {
        identity: identity_from_row(row)?,
        cartridge_type,
        weight: row.get(5)?,
        weight_estimated: false,
        weight_estimation_info: None,
        compliance: row.get(6)?,
        output_voltage: row.get(7)?,
        internal_impedance: row.get(8)?,
    })
}

fn sut_from_row(row: &Row) -> rusqlite::Result<SutInfo> {
    Ok(SutInfo {
        identity: identity_from_row(row)?,
        input_impedance: row.get(4)?,
        gain_db: row.get(5)?,
        turns_ratio: row.get(6)?,
    })
}

fn phono_preamp_from_row(row: &Row) -> rusqlite::Result<PhonoPreampInfo> {
    Ok(PhonoPreampInfo {
        identity: identity_from_row(row)?,
        mm_input_impedance: row.get(4)?,
        has_mc_input: row.get::<_, Option<i64>>(5)?.map(|v| v != 0),
        gain_db: row.get(6)?,
    })
}

impl SqliteComponentStore {
    /// Open (creating if needed) the catalog database at `db_path`.
    ///
    /// `read_pool_size` connections are opened for concurrent lookups.
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open catalog database at {:?}", db_path_ref))?;

        migrate_if_needed(&mut write_conn)?;
        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        write_conn.pragma_update(None, "foreign_keys", "ON")?;

        let mut read_pool = Vec::with_capacity(read_pool_size.max(1));
        for _ in 0..read_pool_size.max(1) {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        let store = SqliteComponentStore {
            read_pool,
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_index: Arc::new(AtomicUsize::new(0)),
        };

        info!(
            "Opened component catalog: {} tonearms, {} cartridges, {} SUTs, {} phono preamps",
            store.count_components(ComponentKind::Tonearm),
            store.count_components(ComponentKind::Cartridge),
            store.count_components(ComponentKind::Sut),
            store.count_components(ComponentKind::PhonoPreamp),
        );

        Ok(store)
    }

    fn get_read_conn(&self) -> Arc<Mutex<Connection>> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        self.read_pool[index].clone()
    }

    fn with_read_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.get_read_conn();
        let conn = conn
            .lock()
            .map_err(|_| anyhow!("Catalog read connection poisoned"))?;
        f(&conn)
    }

    fn with_write_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self
            .write_conn
            .lock()
            .map_err(|_| anyhow!("Catalog write connection poisoned"))?;
        f(&conn)
    }

    /// Get the brand rowid for `name`, creating the brand if missing.
    fn ensure_brand(conn: &Connection, name: &str) -> Result<i64> {
        conn.execute(
            "INSERT OR IGNORE INTO brands (name) VALUES (?1)",
            params![name],
        )?;
        Ok(conn.query_row(
            "SELECT rowid FROM brands WHERE name = ?1",
            params![name],
            |r| r.get(0),
        )?)
    }

    fn query_one<T>(
        &self,
        sql: &str,
        id: &str,
        map: fn(&Row) -> rusqlite::Result<T>,
    ) -> Result<Option<T>> {
        self.with_read_conn(|conn| {
            conn.query_row(sql, params![id], map)
                .optional()
                .with_context(|| format!("Failed to load component {}", id))
        })
    }
}

impl ComponentStore for SqliteComponentStore {
    fn get_tonearm(&self, id: &str) -> Result<Option<TonearmInfo>> {
        self.query_one(
            &format!(
                "SELECT {} FROM tonearms t JOIN brands b ON b.rowid = t.brand_rowid WHERE t.id = ?1",
                TONEARM_COLUMNS
            ),
            id,
            tonearm_from_row,
        )
    }

    fn get_cartridge(&self, id: &str) -> Result<Option<CartridgeInfo>> {
        self.query_one(
            &format!(
                "SELECT {} FROM cartridges c JOIN brands b ON b.rowid = c.brand_rowid WHERE c.id = ?1",
                CARTRIDGE_COLUMNS
            ),
            id,
            cartridge_from_row,
        )
    }

    fn get_sut(&self, id: &str) -> Result<Option<SutInfo>> {
        self.query_one(
            &format!(
                "SELECT {} FROM step_up_transformers s JOIN brands b ON b.rowid = s.brand_rowid WHERE s.id = ?1",
                SUT_COLUMNS
            ),
            id,
            sut_from_row,
        )
    }

    fn get_phono_preamp(&self, id: &str) -> Result<Option<PhonoPreampInfo>> {
        self.query_one(
            &format!(
                "SELECT {} FROM phono_preamps p JOIN brands b ON b.rowid = p.brand_rowid WHERE p.id = ?1",
                PHONO_PREAMP_COLUMNS
            ),
            id,
            phono_preamp_from_row,
        )
    }

    fn query_cartridge_weights(
        &self,
        cartridge_type: CartridgeType,
        compliance_band: Option<ComplianceBand>,
    ) -> Result<Vec<f64>> {
        self.with_read_conn(|conn| {
            let weights = match compliance_band {
                Some(band) => {
                    let mut stmt = conn.prepare_cached(
                        "SELECT weight FROM cartridges \
                         WHERE cartridge_type = ?1 AND weight IS NOT NULL AND weight > 0 \
                         AND compliance IS NOT NULL AND compliance BETWEEN ?2 AND ?3 \
                         ORDER BY weight",
                    )?;
                    let rows = stmt.query_map(
                        params![cartridge_type.to_db_str(), band.min, band.max],
                        |r| r.get::<_, f64>(0),
                    )?;
                    rows.collect::<rusqlite::Result<Vec<f64>>>()?
                }
                None => {
                    let mut stmt = conn.prepare_cached(
                        "SELECT weight FROM cartridges \
                         WHERE cartridge_type = ?1 AND weight IS NOT NULL AND weight > 0 \
                         ORDER BY weight",
                    )?;
                    let rows = stmt
                        .query_map(params![cartridge_type.to_db_str()], |r| r.get::<_, f64>(0))?;
                    rows.collect::<rusqlite::Result<Vec<f64>>>()?
                }
            };
            Ok(weights)
        })
    }

    fn list_components(&self, kind: ComponentKind) -> Result<Vec<ComponentSummary>> {
        self.with_read_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT x.id, b.name, x.model, x.image_url FROM {} x \
                 JOIN brands b ON b.rowid = x.brand_rowid ORDER BY b.name, x.model",
                kind.table_name()
            ))?;
            let rows = stmt.query_map([], |row| {
                Ok(ComponentSummary {
                    kind,
                    identity: identity_from_row(row)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    fn count_components(&self, kind: ComponentKind) -> usize {
        self.with_read_conn(|conn| {
            Ok(conn.query_row(
                &format!("SELECT COUNT(*) FROM {}", kind.table_name()),
                [],
                |r| r.get::<_, i64>(0),
            )?)
        })
        .map(|count| count as usize)
        .unwrap_or(0)
    }
}

impl WritableComponentStore for SqliteComponentStore {
    fn insert_tonearm(&self, tonearm: &TonearmInfo) -> Result<()> {
        self.with_write_conn(|conn| {
            let brand_rowid = Self::ensure_brand(conn, &tonearm.identity.brand)?;
            conn.execute(
                "INSERT INTO tonearms (id, brand_rowid, model, image_url, effective_mass, \
                 effective_length, arm_type, headshell_type, headshell_weight) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    tonearm.identity.id,
                    brand_rowid,
                    tonearm.identity.model,
                    tonearm.identity.image_url,
                    tonearm.effective_mass,
                    tonearm.effective_length,
                    tonearm.arm_type,
                    tonearm.headshell_type.map(|h| h.to_db_str()),
                    tonearm.headshell_weight,
                ],
            )
            .with_context(|| format!("Failed to insert tonearm {}", tonearm.identity.id))?;
            Ok(())
        })
    }

    fn insert_cartridge(&self, cartridge: &CartridgeInfo) -> Result<()> {
        // Derived weights are never persisted as if they were measured.
        let measured_weight = if cartridge.weight_estimated {
            None
        } else {
            cartridge.weight
        };
        self.with_write_conn(|conn| {
            let brand_rowid = Self::ensure_brand(conn, &cartridge.identity.brand)?;
            conn.execute(
                "INSERT INTO cartridges (id, brand_rowid, model, image_url, cartridge_type, \
                 weight, compliance, output_voltage, internal_impedance) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    cartridge.identity.id,
                    brand_rowid,
                    cartridge.identity.model,
                    cartridge.identity.image_url,
                    cartridge.cartridge_type.to_db_str(),
                    measured_weight,
                    cartridge.compliance,
                    cartridge.output_voltage,
                    cartridge.internal_impedance,
                ],
            )
            .with_context(|| format!("Failed to insert cartridge {}", cartridge.identity.id))?;
            Ok(())
        })
    }

    fn insert_sut(&self, sut: &SutInfo) -> Result<()> {
        self.with_write_conn(|conn| {
            let brand_rowid = Self::ensure_brand(conn, &sut.identity.brand)?;
            conn.execute(
                "INSERT INTO step_up_transformers (id, brand_rowid, model, image_url, \
                 input_impedance, gain_db, turns_ratio) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    sut.identity.id,
                    brand_rowid,
                    sut.identity.model,
                    sut.identity.image_url,
                    sut.input_impedance,
                    sut.gain_db,
                    sut.turns_ratio,
                ],
            )
            .with_context(|| format!("Failed to insert SUT {}", sut.identity.id))?;
            Ok(())
        })
    }

    fn insert_phono_preamp(&self, preamp: &PhonoPreampInfo) -> Result<()> {
        self.with_write_conn(|conn| {
            let brand_rowid = Self::ensure_brand(conn, &preamp.identity.brand)?;
            conn.execute(
                "INSERT INTO phono_preamps (id, brand_rowid, model, image_url, \
                 mm_input_impedance, has_mc_input, gain_db) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    preamp.identity.id,
                    brand_rowid,
                    preamp.identity.model,
                    preamp.identity.image_url,
                    preamp.mm_input_impedance,
                    preamp.has_mc_input.map(|v| v as i64),
                    preamp.gain_db,
                ],
            )
            .with_context(|| format!("Failed to insert phono preamp {}", preamp.identity.id))?;
            Ok(())
        })
    }
}
