use std::sync::Arc;

use sos_client::domain::{ParseError, ReadingTable};

use crate::{
    config::StationConfig,
    ordering::{sort_by_order, OrderCache},
    store::ReadingStore,
};

pub mod daily;
pub mod hourly;
pub mod interruptions;
pub mod mode_threshold;
pub mod monthly;
pub mod numeric;

pub use daily::{CurrentStats, EnergyDeltaStats, IncomersPeakMin, StationPeakMin};
pub use hourly::{DeltaRecord, HourlyReview};
pub use interruptions::{InterruptionDetail, InterruptionSummary, OutageCounts};
pub use mode_threshold::{ModeThreshold, PeakPeriod};
pub use monthly::MonthlyEnergy;

#[derive(thiserror::Error, Debug)]
pub enum ReviewError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] ParseError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Computes review reports from a reading store.
///
/// Every report is a fresh read-only computation; the only state kept between
/// calls is the shared display-order cache.
pub struct ReviewEngine {
    store: Arc<dyn ReadingStore>,
    orders: Arc<OrderCache>,
    station: StationConfig,
}

impl ReviewEngine {
    pub fn new(store: Arc<dyn ReadingStore>, orders: Arc<OrderCache>, station: StationConfig) -> Self {
        Self {
            store,
            orders,
            station,
        }
    }

    pub fn station(&self) -> &StationConfig {
        &self.station
    }

    fn store(&self) -> &dyn ReadingStore {
        self.store.as_ref()
    }

    /// Sorts records into the master-table order of `table`.
    async fn in_display_order<T, F>(
        &self,
        table: ReadingTable,
        mut records: Vec<T>,
        code_of: F,
    ) -> Result<Vec<T>, ReviewError>
    where
        F: Fn(&T) -> &str,
    {
        let order = self.orders.get_or_load(self.store(), table).await?;
        sort_by_order(&mut records, &order, code_of);
        Ok(records)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::{str::FromStr, sync::Arc};

    use rust_decimal::Decimal;
    use sos_client::domain::{Reading, TimeSlot};
    use time::Date;

    use super::ReviewEngine;
    use crate::{config::StationConfig, ordering::OrderCache, store::MemoryStore};

    pub fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    pub fn slot(s: &str) -> TimeSlot {
        s.parse().unwrap()
    }

    /// Reading with current and both counters; other fields unset.
    pub fn reading(code: &str, date: Date, time: &str, current: &str, export: &str, import: &str) -> Reading {
        Reading {
            code: code.to_string(),
            date,
            time: slot(time),
            current: dec(current),
            voltage: None,
            emc_export: Some(dec(export)),
            emc_import: Some(dec(import)),
            mf_export: None,
            mf_import: None,
        }
    }

    pub fn current(code: &str, date: Date, time: &str, current: &str) -> Reading {
        reading(code, date, time, current, "0", "0")
    }

    pub fn engine(store: MemoryStore) -> ReviewEngine {
        ReviewEngine::new(Arc::new(store), Arc::new(OrderCache::new()), StationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::{anyhow, Result};
    use sos_client::domain::{FeederType, Interruption, Reading, ReadingTable, TimeSlot, YearMonth};
    use time::{macros::date, Date};

    use super::{ReviewEngine, ReviewError};
    use crate::{config::StationConfig, ordering::OrderCache, store::ReadingStore};

    struct OfflineStore;

    #[async_trait::async_trait]
    impl ReadingStore for OfflineStore {
        fn database_key(&self) -> &str {
            "offline"
        }

        async fn readings_at(&self, _: ReadingTable, _: Date, _: TimeSlot) -> Result<Vec<Reading>> {
            Err(anyhow!("store offline"))
        }

        async fn readings_on(&self, _: ReadingTable, _: Date) -> Result<Vec<Reading>> {
            Err(anyhow!("store offline"))
        }

        async fn readings_on_dates_at(&self, _: ReadingTable, _: &[Date], _: TimeSlot) -> Result<Vec<Reading>> {
            Err(anyhow!("store offline"))
        }

        async fn readings_for_codes_on(&self, _: ReadingTable, _: Date, _: &[String]) -> Result<Vec<Reading>> {
            Err(anyhow!("store offline"))
        }

        async fn readings_for_code_in_month(&self, _: ReadingTable, _: &str, _: YearMonth) -> Result<Vec<Reading>> {
            Err(anyhow!("store offline"))
        }

        async fn display_order(&self, _: ReadingTable) -> Result<Vec<String>> {
            Err(anyhow!("store offline"))
        }

        async fn interruptions(&self, _: YearMonth, _: FeederType) -> Result<Vec<Interruption>> {
            Err(anyhow!("store offline"))
        }
    }

    fn offline_engine() -> ReviewEngine {
        ReviewEngine::new(Arc::new(OfflineStore), Arc::new(OrderCache::new()), StationConfig::default())
    }

    #[tokio::test]
    async fn store_failures_surface_unchanged() {
        let engine = offline_engine();
        let june = YearMonth::new(2025, 6).unwrap();

        let err = engine
            .daily_current_stats(date!(2025 - 06 - 02), ReadingTable::Ht)
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewError::Store(_)), "got {err:?}");
        assert_eq!(err.to_string(), "store offline");

        let err = engine.ht_interruption_counts(june).await.unwrap_err();
        assert!(matches!(err, ReviewError::Store(_)), "got {err:?}");
        assert_eq!(err.to_string(), "store offline");

        let err = engine.mode_threshold(june, None).await.unwrap_err();
        assert!(matches!(err, ReviewError::Store(_)), "got {err:?}");
    }
}
