//! Storage traits for the component catalog.
//!
//! `ComponentStore` is the read side the matching engine resolves records
//! through; `WritableComponentStore` adds typed inserts used by fixtures and
//! catalog tooling.

use super::models::*;
use anyhow::Result;

/// Trait for component storage backends.
///
/// Lookups return `Ok(None)` when no component has the given id; `Err` is
/// reserved for storage failures.
pub trait ComponentStore: Send + Sync {
    // =========================================================================
    // Component Retrieval
    // =========================================================================

    fn get_tonearm(&self, id: &str) -> Result<Option<TonearmInfo>>;

    fn get_cartridge(&self, id: &str) -> Result<Option<CartridgeInfo>>;

    fn get_sut(&self, id: &str) -> Result<Option<SutInfo>>;

    fn get_phono_preamp(&self, id: &str) -> Result<Option<PhonoPreampInfo>>;

    /// Get any component by kind, tagged.
    fn get_component(&self, kind: ComponentKind, id: &str) -> Result<Option<ComponentInfo>> {
        Ok(match kind {
            ComponentKind::Tonearm => self.get_tonearm(id)?.map(ComponentInfo::Tonearm),
            ComponentKind::Cartridge => self.get_cartridge(id)?.map(ComponentInfo::Cartridge),
            ComponentKind::Sut => self.get_sut(id)?.map(ComponentInfo::Sut),
            ComponentKind::PhonoPreamp => {
                self.get_phono_preamp(id)?.map(ComponentInfo::PhonoPreamp)
            }
        })
    }

    // =========================================================================
    // Reference Data
    // =========================================================================

    /// Measured (non-null, positive) weights of cartridges of the given type.
    ///
    /// When `compliance_band` is set, only cartridges whose recorded
    /// compliance falls inside the band are included.
    fn query_cartridge_weights(
        &self,
        cartridge_type: CartridgeType,
        compliance_band: Option<ComplianceBand>,
    ) -> Result<Vec<f64>>;

    // =========================================================================
    // Listing & Counts
    // =========================================================================

    /// List components of a kind, ordered by brand then model.
    fn list_components(&self, kind: ComponentKind) -> Result<Vec<ComponentSummary>>;

    /// Number of components of a kind (for metrics).
    fn count_components(&self, kind: ComponentKind) -> usize;
}

/// Extension trait for stores that accept new components.
///
/// The brand is taken from `identity.brand` and created on first use.
pub trait WritableComponentStore: ComponentStore {
    fn insert_tonearm(&self, tonearm: &TonearmInfo) -> Result<()>;

    fn insert_cartridge(&self, cartridge: &CartridgeInfo) -> Result<()>;

    fn insert_sut(&self, sut: &SutInfo) -> Result<()>;

    fn insert_phono_preamp(&self, preamp: &PhonoPreampInfo) -> Result<()>;
}
