//! In-memory component store, for tests and fixtures.

use super::models::*;
use super::trait_def::{ComponentStore, WritableComponentStore};
use anyhow::{anyhow, bail, Result};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Components {
    tonearms: HashMap<String, TonearmInfo>,
    cartridges: HashMap<String, CartridgeInfo>,
    suts: HashMap<String, SutInfo>,
    phono_preamps: HashMap<String, PhonoPreampInfo>,
}

/// A `ComponentStore` kept entirely in memory.
///
/// Mirrors the SQLite store's behavior: ids are unique per kind, listings are
/// ordered by brand then model, and estimated weights are dropped on insert.
#[derive(Default)]
pub struct InMemoryComponentStore {
    components: Mutex<Components>,
}

impl InMemoryComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_components<T>(&self, f: impl FnOnce(&mut Components) -> Result<T>) -> Result<T> {
        let mut guard = self
            .components
            .lock()
            .map_err(|_| anyhow!("In-memory component store poisoned"))?;
        f(&mut guard)
    }
}

fn insert_unique<T>(map: &mut HashMap<String, T>, id: &str, value: T) -> Result<()> {
    if map.contains_key(id) {
        bail!("Component {} already exists", id);
    }
    map.insert(id.to_string(), value);
    Ok(())
}

fn sorted_summaries<'a>(
    kind: ComponentKind,
    identities: impl Iterator<Item = &'a ComponentIdentity>,
) -> Vec<ComponentSummary> {
    let mut summaries: Vec<ComponentSummary> = identities
        .map(|identity| ComponentSummary {
            kind,
            identity: identity.clone(),
        })
        .collect();
    summaries.sort_by(|a, b| {
        (&a.identity.brand, &a.identity.model).cmp(&(&b.identity.brand, &b.identity.model))
    });
    summaries
}

impl ComponentStore for InMemoryComponentStore {
    fn get_tonearm(&self, id: &str) -> Result<Option<TonearmInfo>> {
        self.with_components(|c| Ok(c.tonearms.get(id).cloned()))
    }

    fn get_cartridge(&self, id: &str) -> Result<Option<CartridgeInfo>> {
        self.with_components(|c| Ok(c.cartridges.get(id).cloned()))
    }

    fn get_sut(&self, id: &str) -> Result<Option<SutInfo>> {
        self.with_components(|c| Ok(c.suts.get(id).cloned()))
    }

    fn get_phono_preamp(&self, id: &str) -> Result<Option<PhonoPreampInfo>> {
        self.with_components(|c| Ok(c.phono_preamps.get(id).cloned()))
    }

    fn query_cartridge_weights(
        &self,
        cartridge_type: CartridgeType,
        compliance_band: Option<ComplianceBand>,
    ) -> Result<Vec<f64>> {
        self.with_components(|c| {
            let mut weights: Vec<f64> = c
                .cartridges
                .values()
                .filter(|cart| cart.cartridge_type == cartridge_type)
                .filter(|cart| match compliance_band {
                    Some(band) => cart.compliance.is_some_and(|value| band.contains(value)),
                    None => true,
                })
                .filter_map(|cart| cart.weight)
                .filter(|weight| *weight > 0.0)
                .collect();
            weights.sort_by(|a, b| a.total_cmp(b));
            Ok(weights)
        })
    }

    fn list_components(&self, kind: ComponentKind) -> Result<Vec<ComponentSummary>> {
        self.with_components(|c| {
            Ok(match kind {
                ComponentKind::Tonearm => {
                    sorted_summaries(kind, c.tonearms.values().map(|t| &t.identity))
                }
                ComponentKind::Cartridge => {
                    sorted_summaries(kind, c.cartridges.values().map(|t| &t.identity))
                }
                ComponentKind::Sut => sorted_summaries(kind, c.suts.values().map(|t| &t.identity)),
                ComponentKind::PhonoPreamp => {
                    sorted_summaries(kind, c.phono_preamps.values().map(|t| &t.identity))
                }
            })
        })
    }

    fn count_components(&self, kind: ComponentKind) -> usize {
        self.with_components(|c| {
            Ok(match kind {
                ComponentKind::Tonearm => c.tonearms.len(),
                ComponentKind::Cartridge => c.cartridges.len(),
                ComponentKind::Sut => c.suts.len(),
                ComponentKind::PhonoPreamp => c.phono_preamps.len(),
            })
        })
        .unwrap_or(0)
    }
}

impl WritableComponentStore for InMemoryComponentStore {
    fn insert_tonearm(&self, tonearm: &TonearmInfo) -> Result<()> {
        self.with_components(|c| {
            insert_unique(&mut c.tonearms, &tonearm.identity.id, tonearm.clone())
        })
    }

    fn insert_cartridge(&self, cartridge: &CartridgeInfo) -> Result<()> {
        let mut stored = cartridge.clone();
        if stored.weight_estimated {
            stored.weight = None;
            stored.weight_estimated = false;
            stored.weight_estimation_info = None;
        }
        self.with_components(|c| insert_unique(&mut c.cartridges, &cartridge.identity.id, stored))
    }

    fn insert_sut(&self, sut: &SutInfo) -> Result<()> {
        self.with_components(|c| insert_unique(&mut c.suts, &sut.identity.id, sut.clone()))
    }

    fn insert_phono_preamp(&self, preamp: &PhonoPreampInfo) -> Result<()> {
        self.with_components(|c| {
            insert_unique(&mut c.phono_preamps, &preamp.identity.id, preamp.clone())
        })
    }
}
