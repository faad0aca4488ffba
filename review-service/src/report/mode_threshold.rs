use std::{collections::HashMap, ops::RangeInclusive};

use rust_decimal::Decimal;
use serde::Serialize;
use sos_client::domain::{Reading, ReadingTable, TimeSlot, YearMonth};
use time::Date;

use super::{
    numeric::{first_max_by_key, percent},
    ReviewEngine, ReviewError,
};

const MORNING: RangeInclusive<u16> = 5 * 60..=8 * 60 + 59;
const EVENING: RangeInclusive<u16> = 18 * 60..=22 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakPeriod {
    Day,
    Night,
}

/// Dominant load of a feeder over a month and how closely readings track it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModeThreshold {
    pub mode_current: Option<Decimal>,
    pub peak_period: Option<PeakPeriod>,
    pub max_current: Option<Decimal>,
    pub max_date: Option<Date>,
    pub max_time: Option<TimeSlot>,
    pub count_in_range: Option<usize>,
    /// Share of readings inside the band, as a percentage rounded to two
    /// decimal places.
    pub percent_in_range: Option<Decimal>,
    pub range_lower: Option<Decimal>,
    pub range_upper: Option<Decimal>,
}

/// Most frequent value; on equal counts the value seen first wins.
pub fn mode_of(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    let mut counts: HashMap<Decimal, (usize, usize)> = HashMap::new();
    for (seen, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, seen)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (a_count, a_seen)), (_, (b_count, b_seen))| {
            a_count.cmp(b_count).then(b_seen.cmp(a_seen))
        })
        .map(|(value, _)| value)
}

fn window_mode(readings: &[Reading], window: &RangeInclusive<u16>) -> Option<Decimal> {
    mode_of(
        readings
            .iter()
            .filter(|r| window.contains(&r.time.minute_of_day()))
            .map(|r| r.current),
    )
}

/// Mode and band statistics over one code's readings of a month.
///
/// `readings` must already be restricted to valid currents and sorted by date
/// and time.
pub fn mode_threshold_from(readings: &[Reading]) -> ModeThreshold {
    if readings.is_empty() {
        return ModeThreshold::default();
    }

    let morning = window_mode(readings, &MORNING);
    let evening = window_mode(readings, &EVENING);
    let (mode_current, peak_period) = match (morning, evening) {
        (Some(m), Some(e)) if m >= e => (Some(m), Some(PeakPeriod::Day)),
        (Some(m), None) => (Some(m), Some(PeakPeriod::Day)),
        (_, Some(e)) => (Some(e), Some(PeakPeriod::Night)),
        (None, None) => (None, None),
    };

    let max = first_max_by_key(readings, |r| r.current);

    let mut summary = ModeThreshold {
        mode_current,
        peak_period,
        max_current: max.map(|r| r.current),
        max_date: max.map(|r| r.date),
        max_time: max.map(|r| r.time),
        ..Default::default()
    };

    if let Some(mode) = mode_current {
        let lower = mode * Decimal::new(9, 1);
        let upper = mode * Decimal::new(11, 1);
        let count = readings
            .iter()
            .filter(|r| lower <= r.current && r.current <= upper)
            .count();

        summary.range_lower = Some(lower);
        summary.range_upper = Some(upper);
        summary.count_in_range = Some(count);
        summary.percent_in_range = percent(Decimal::from(count), Decimal::from(readings.len()));
    }

    summary
}

impl ReviewEngine {
    /// Mode-threshold summary of one 11 kV feeder for `month`; `code` defaults
    /// to the configured mode feeder.
    pub async fn mode_threshold(&self, month: YearMonth, code: Option<&str>) -> Result<ModeThreshold, ReviewError> {
        let code = code.unwrap_or(&self.station().mode_feeder);
        let mut readings = self
            .store()
            .readings_for_code_in_month(ReadingTable::Ht, code, month)
            .await?;
        readings.retain(Reading::has_valid_current);
        readings.sort_by_key(|r| (r.date, r.time));
        tracing::debug!(code, %month, rows = readings.len(), "mode threshold readings");

        Ok(mode_threshold_from(&readings))
    }
}
