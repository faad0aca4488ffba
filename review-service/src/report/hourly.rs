use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sos_client::domain::{ParseError, Reading, ReadingTable, TimeSlot};
use time::Date;

use super::{numeric::rounded_delta, ReviewEngine, ReviewError};

/// Energy-meter advance of one code over the hour ending at the requested slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaRecord {
    pub code: String,
    pub current: Decimal,
    pub emc_export: Option<Decimal>,
    pub emc_import: Option<Decimal>,
    /// `None` when the delta cannot be computed, which is not the same as no advance.
    pub delta_emc_export: Option<Decimal>,
    pub delta_emc_import: Option<Decimal>,
}

/// The hourly review page: all three tables plus the station load.
#[derive(Debug, Clone, Serialize)]
pub struct HourlyReview {
    pub date: Date,
    pub time: TimeSlot,
    pub eht: Vec<DeltaRecord>,
    pub tf: Vec<DeltaRecord>,
    pub ht: Vec<DeltaRecord>,
    pub station_load: Option<Decimal>,
}

fn counter_delta(current: Option<Decimal>, previous: Option<Decimal>) -> Option<Decimal> {
    Some(rounded_delta(current?, previous?))
}

/// Pairs each current reading with the same code's reading one hour earlier.
///
/// A delta exists only when the slot is hourly, the previous reading exists and
/// both currents are strictly positive; a non-positive current marks the meter
/// as offline for that reading.
pub fn compute_deltas(slot: TimeSlot, current: Vec<Reading>, previous: &[Reading]) -> Vec<DeltaRecord> {
    let previous: HashMap<&str, &Reading> = previous.iter().map(|r| (r.code.as_str(), r)).collect();

    current
        .into_iter()
        .map(|curr| {
            let prev = previous
                .get(curr.code.as_str())
                .filter(|prev| slot.is_hourly() && curr.current > Decimal::ZERO && prev.current > Decimal::ZERO);

            let (delta_emc_export, delta_emc_import) = match prev {
                Some(prev) => (
                    counter_delta(curr.emc_export, prev.emc_export),
                    counter_delta(curr.emc_import, prev.emc_import),
                ),
                None => (None, None),
            };

            DeltaRecord {
                code: curr.code,
                current: curr.current,
                emc_export: curr.emc_export,
                emc_import: curr.emc_import,
                delta_emc_export,
                delta_emc_import,
            }
        })
        .collect()
}

/// Station load `main_incomer - bus_tie`.
///
/// A negative reading is invalid: when only one side is negative the other
/// side is the load on its own. Missing readings, or both sides invalid, give
/// no load.
pub fn station_load_from(main_incomer: Option<Decimal>, bus_tie: Option<Decimal>) -> Option<Decimal> {
    let (main, tie) = (main_incomer?, bus_tie?);
    match (main < Decimal::ZERO, tie < Decimal::ZERO) {
        (true, true) => None,
        (true, false) => Some(tie),
        (false, true) => Some(main),
        (false, false) => Some(main - tie),
    }
}

fn require_allowed(slot: TimeSlot) -> Result<(), ReviewError> {
    if slot.is_allowed() {
        Ok(())
    } else {
        Err(ParseError::Slot(slot.to_string()).into())
    }
}

impl ReviewEngine {
    /// Hourly energy deltas for every code of `table` read at `date` / `slot`,
    /// in display order.
    pub async fn hourly_delta(
        &self,
        table: ReadingTable,
        date: Date,
        slot: TimeSlot,
    ) -> Result<Vec<DeltaRecord>, ReviewError> {
        let records = self.unordered_hourly_delta(table, date, slot).await?;
        self.in_display_order(table, records, |r| r.code.as_str()).await
    }

    /// Like [`hourly_delta`](Self::hourly_delta), restricted to `codes`.
    pub async fn hourly_delta_for(
        &self,
        table: ReadingTable,
        date: Date,
        slot: TimeSlot,
        codes: &[String],
    ) -> Result<Vec<DeltaRecord>, ReviewError> {
        let mut records = self.unordered_hourly_delta(table, date, slot).await?;
        records.retain(|r| codes.contains(&r.code));
        self.in_display_order(table, records, |r| r.code.as_str()).await
    }

    pub(crate) async fn unordered_hourly_delta(
        &self,
        table: ReadingTable,
        date: Date,
        slot: TimeSlot,
    ) -> Result<Vec<DeltaRecord>, ReviewError> {
        require_allowed(slot)?;

        let current = self.store().readings_at(table, date, slot).await?;
        let previous = match slot.previous_hourly(date) {
            Some((prev_date, prev_slot)) if !current.is_empty() => {
                self.store().readings_at(table, prev_date, prev_slot).await?
            }
            _ => Vec::new(),
        };

        Ok(compute_deltas(slot, current, &previous))
    }

    /// Station load at one point in time, from the 110 kV main incomer and bus tie.
    pub async fn station_load(&self, date: Date, slot: TimeSlot) -> Result<Option<Decimal>, ReviewError> {
        require_allowed(slot)?;

        let readings = self.store().readings_at(ReadingTable::Eht, date, slot).await?;
        let current_of = |code: &str| readings.iter().find(|r| r.code == code).map(|r| r.current);

        Ok(station_load_from(
            current_of(&self.station().main_incomer),
            current_of(&self.station().bus_tie),
        ))
    }

    /// Deltas of all three tables and the station load for one slot, fetched concurrently.
    pub async fn hourly_review(&self, date: Date, slot: TimeSlot) -> Result<HourlyReview, ReviewError> {
        let (eht, tf, ht, station_load) = tokio::try_join!(
            self.hourly_delta(ReadingTable::Eht, date, slot),
            self.hourly_delta(ReadingTable::Tf, date, slot),
            self.hourly_delta(ReadingTable::Ht, date, slot),
            self.station_load(date, slot),
        )?;

        Ok(HourlyReview {
            date,
            time: slot,
            eht,
            tf,
            ht,
            station_load,
        })
    }
}
