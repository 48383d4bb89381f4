//! Immutable registry of named utility tariffs.

use std::collections::BTreeMap;

use super::{TariffSnapshot, TierSchedule};
use crate::viability::ViabilityError;

/// Read-only mapping from tariff identifier to snapshot.
///
/// Passed explicitly to the orchestrator so tests and callers can substitute their own tariffs.
#[derive(Debug, Clone, Default)]
pub struct TariffRegistry {
    tariffs: BTreeMap<String, TariffSnapshot>,
}

impl TariffRegistry {
    /// Builds a registry from snapshots, keyed by their `id`. Later duplicates replace earlier ones.
    pub fn new(tariffs: impl IntoIterator<Item = TariffSnapshot>) -> Self {
        Self {
            tariffs: tariffs.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    /// Built-in 2025 snapshots for the Rio de Janeiro utilities.
    pub fn builtin() -> Self {
        Self::new([light_2025(), enel_rj_2025(), ceral_2025()])
    }

    /// Resolves `id` to its snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ViabilityError::UnknownTariff`] listing the known identifiers.
    pub fn resolve(&self, id: &str) -> Result<&TariffSnapshot, ViabilityError> {
        self.tariffs
            .get(id)
            .ok_or_else(|| ViabilityError::UnknownTariff {
                id: id.to_string(),
                known: self.ids().map(str::to_string).collect(),
            })
    }

    /// Known identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tariffs.keys().map(String::as_str)
    }

    /// All snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &TariffSnapshot> {
        self.tariffs.values()
    }
}

/// Light SESA, 2025 homologated values.
pub fn light_2025() -> TariffSnapshot {
    TariffSnapshot {
        id: "light".to_string(),
        name: "Light SESA".to_string(),
        base: 0.863297,
        tusd: 0.4972349297,
        te: 0.366062,
        fio_b: 0.19705238,
        pis: 0.0107,
        cofins: 0.0494,
        icms: TierSchedule::standard_icms(),
        cosip: TierSchedule::standard_cosip(),
    }
}

/// Enel Distribuição Rio, 2025.
pub fn enel_rj_2025() -> TariffSnapshot {
    TariffSnapshot {
        id: "enel-rj".to_string(),
        name: "Enel Distribuição Rio".to_string(),
        base: 0.831402,
        tusd: 0.485,
        te: 0.358,
        fio_b: 0.190512,
        pis: 0.0107,
        cofins: 0.0494,
        icms: TierSchedule::standard_icms(),
        cosip: TierSchedule::standard_cosip(),
    }
}

/// Ceral, Companhia Energética Rio das Antas, 2025.
pub fn ceral_2025() -> TariffSnapshot {
    TariffSnapshot {
        id: "ceral".to_string(),
        name: "Ceral - Companhia Energética Rio das Antas".to_string(),
        base: 0.810215,
        tusd: 0.465,
        te: 0.345,
        fio_b: 0.182034,
        pis: 0.0107,
        cofins: 0.0494,
        icms: TierSchedule::standard_icms(),
        cosip: TierSchedule::standard_cosip(),
    }
}
