use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use anyhow::Result;
use sos_client::domain::{FeederType, Interruption, Reading, ReadingTable, TimeSlot, YearMonth};
use time::Date;

use super::ReadingStore;

/// In-process reading store. Rows are returned in insertion order unless the
/// trait asks for slot order.
#[derive(Default)]
pub struct MemoryStore {
    readings: Vec<(ReadingTable, Reading)>,
    orders: HashMap<ReadingTable, Vec<String>>,
    interruptions: Vec<(FeederType, Interruption)>,
    order_loads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_readings(mut self, table: ReadingTable, readings: impl IntoIterator<Item = Reading>) -> Self {
        self.readings.extend(readings.into_iter().map(|r| (table, r)));
        self
    }

    pub fn with_order<S: Into<String>>(mut self, table: ReadingTable, codes: impl IntoIterator<Item = S>) -> Self {
        self.orders.insert(table, codes.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_interruptions(
        mut self,
        feeder_type: FeederType,
        interruptions: impl IntoIterator<Item = Interruption>,
    ) -> Self {
        self.interruptions
            .extend(interruptions.into_iter().map(|i| (feeder_type, i)));
        self
    }

    /// How many times an order list was requested.
    pub fn order_loads(&self) -> usize {
        self.order_loads.load(Ordering::Relaxed)
    }

    fn select<F>(&self, table: ReadingTable, pred: F) -> Vec<Reading>
    where
        F: Fn(&Reading) -> bool,
    {
        self.readings
            .iter()
            .filter(|(t, r)| *t == table && pred(r))
            .map(|(_, r)| r.clone())
            .collect()
    }

    fn select_in_slot_order<F>(&self, table: ReadingTable, pred: F) -> Vec<Reading>
    where
        F: Fn(&Reading) -> bool,
    {
        let mut rows = self.select(table, pred);
        rows.sort_by_key(|r| r.time);
        rows
    }
}

#[async_trait::async_trait]
impl ReadingStore for MemoryStore {
    fn database_key(&self) -> &str {
        "memory"
    }

    async fn readings_at(&self, table: ReadingTable, date: Date, slot: TimeSlot) -> Result<Vec<Reading>> {
        Ok(self.select(table, |r| r.date == date && r.time == slot))
    }

    async fn readings_on(&self, table: ReadingTable, date: Date) -> Result<Vec<Reading>> {
        Ok(self.select_in_slot_order(table, |r| r.date == date))
    }

    async fn readings_on_dates_at(
        &self,
        table: ReadingTable,
        dates: &[Date],
        slot: TimeSlot,
    ) -> Result<Vec<Reading>> {
        Ok(self.select(table, |r| r.time == slot && dates.contains(&r.date)))
    }

    async fn readings_for_codes_on(
        &self,
        table: ReadingTable,
        date: Date,
        codes: &[String],
    ) -> Result<Vec<Reading>> {
        Ok(self.select_in_slot_order(table, |r| r.date == date && codes.contains(&r.code)))
    }

    async fn readings_for_code_in_month(
        &self,
        table: ReadingTable,
        code: &str,
        month: YearMonth,
    ) -> Result<Vec<Reading>> {
        Ok(self.select(table, |r| r.code == code && month.contains(r.date)))
    }

    async fn display_order(&self, table: ReadingTable) -> Result<Vec<String>> {
        self.order_loads.fetch_add(1, Ordering::Relaxed);
        Ok(self.orders.get(&table).cloned().unwrap_or_default())
    }

    async fn interruptions(&self, month: YearMonth, feeder_type: FeederType) -> Result<Vec<Interruption>> {
        let mut rows: Vec<Interruption> = self
            .interruptions
            .iter()
            .filter(|(ft, i)| *ft == feeder_type && month.contains(i.started.date()))
            .map(|(_, i)| i.clone())
            .collect();
        rows.sort_by_key(|i| i.started);
        Ok(rows)
    }
}
