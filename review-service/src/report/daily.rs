use std::collections::{BTreeMap, HashMap};

use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::Serialize;
use sos_client::domain::{Reading, ReadingTable, TimeSlot};
use time::Date;

use super::{
    hourly::DeltaRecord,
    numeric::{first_max_by_key, first_min_by_key},
    ReviewEngine, ReviewError,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentStats {
    pub code: String,
    pub min: Decimal,
    pub min_time: TimeSlot,
    pub max: Decimal,
    pub max_time: TimeSlot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnergyDeltaStats {
    pub code: String,
    pub max_import: Option<Decimal>,
    pub t_max_import: Option<TimeSlot>,
    pub min_import: Option<Decimal>,
    pub t_min_import: Option<TimeSlot>,
    pub max_export: Option<Decimal>,
    pub t_max_export: Option<TimeSlot>,
    pub min_export: Option<Decimal>,
    pub t_min_export: Option<TimeSlot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationPeakMin {
    pub peak: Option<Decimal>,
    pub peak_time: Option<TimeSlot>,
    pub min: Option<Decimal>,
    pub min_time: Option<TimeSlot>,
    pub min_voltage: Option<Decimal>,
    pub min_voltage_time: Option<TimeSlot>,
    pub max_voltage: Option<Decimal>,
    pub max_voltage_time: Option<TimeSlot>,
    pub main_incomer_max_load: Option<Decimal>,
    pub main_incomer_max_load_time: Option<TimeSlot>,
    pub bus_tie_max_load: Option<Decimal>,
    pub bus_tie_max_load_time: Option<TimeSlot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncomersPeakMin {
    pub peak: Option<Decimal>,
    pub peak_time: Option<TimeSlot>,
    pub min: Option<Decimal>,
    pub min_time: Option<TimeSlot>,
    pub min_voltage: Option<Decimal>,
    pub min_voltage_time: Option<TimeSlot>,
    pub max_voltage: Option<Decimal>,
    pub max_voltage_time: Option<TimeSlot>,
}

type Sample = (TimeSlot, Decimal);

fn split(sample: Option<Sample>) -> (Option<Decimal>, Option<TimeSlot>) {
    match sample {
        Some((time, value)) => (Some(value), Some(time)),
        None => (None, None),
    }
}

/// Groups `items` by code, keeping codes in first-seen order.
fn group_by_code<T, F>(items: impl IntoIterator<Item = T>, code_of: F) -> Vec<(String, Vec<T>)>
where
    F: Fn(&T) -> &str,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<T>)> = Vec::new();

    for item in items {
        let code = code_of(&item).to_string();
        match index.get(&code) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(code.clone(), groups.len());
                groups.push((code, vec![item]));
            }
        }
    }

    groups
}

/// Per-code minimum and maximum current over one day's readings.
///
/// Invalid (negative) currents are skipped; ties go to the earliest slot.
pub fn current_stats(readings: &[Reading]) -> Vec<CurrentStats> {
    let mut valid: Vec<&Reading> = readings.iter().filter(|r| r.has_valid_current()).collect();
    valid.sort_by_key(|r| r.time);

    group_by_code(valid, |r| r.code.as_str())
        .into_iter()
        .filter_map(|(code, rows)| {
            let min = first_min_by_key(rows.iter().copied(), |r| r.current)?;
            let max = first_max_by_key(rows.iter().copied(), |r| r.current)?;
            Some(CurrentStats {
                code,
                min: min.current,
                min_time: min.time,
                max: max.current,
                max_time: max.time,
            })
        })
        .collect()
}

/// Extremes of the hourly deltas of each code across a day.
///
/// `hours` holds the delta records of each hourly slot in slot order. A code
/// is reported when it was read at least once; directions without any
/// computable delta stay empty.
pub fn energy_delta_stats(hours: &[(TimeSlot, Vec<DeltaRecord>)]) -> Vec<EnergyDeltaStats> {
    let samples = hours
        .iter()
        .flat_map(|(time, records)| records.iter().map(move |r| (*time, r)));

    group_by_code(samples, |(_, r)| r.code.as_str())
        .into_iter()
        .map(|(code, rows)| {
            let imports: Vec<Sample> = rows
                .iter()
                .filter_map(|(t, r)| r.delta_emc_import.map(|v| (*t, v)))
                .collect();
            let exports: Vec<Sample> = rows
                .iter()
                .filter_map(|(t, r)| r.delta_emc_export.map(|v| (*t, v)))
                .collect();

            let (max_import, t_max_import) = split(first_max_by_key(imports.iter().copied(), |s| s.1));
            let (min_import, t_min_import) = split(first_min_by_key(imports.iter().copied(), |s| s.1));
            let (max_export, t_max_export) = split(first_max_by_key(exports.iter().copied(), |s| s.1));
            let (min_export, t_min_export) = split(first_min_by_key(exports.iter().copied(), |s| s.1));

            EnergyDeltaStats {
                code,
                max_import,
                t_max_import,
                min_import,
                t_min_import,
                max_export,
                t_max_export,
                min_export,
                t_min_export,
            }
        })
        .collect()
}

/// Minimum and maximum voltage over `readings`, skipping missing or negative values.
fn voltage_extremes(readings: &[&Reading]) -> (Option<Sample>, Option<Sample>) {
    let mut voltages: Vec<Sample> = readings
        .iter()
        .filter_map(|r| r.voltage.filter(|v| *v >= Decimal::ZERO).map(|v| (r.time, v)))
        .collect();
    voltages.sort_by_key(|s| s.0);

    (
        first_min_by_key(voltages.iter().copied(), |s| s.1),
        first_max_by_key(voltages.iter().copied(), |s| s.1),
    )
}

/// Day peak/min of `main_incomer - bus_tie`, voltage extremes of both feeders
/// and each feeder's own peak current.
pub fn station_peak_min_from(readings: &[Reading], main_incomer: &str, bus_tie: &str) -> StationPeakMin {
    let relevant: Vec<&Reading> = readings
        .iter()
        .filter(|r| r.code == main_incomer || r.code == bus_tie)
        .collect();

    // Per slot: (main incomer current, bus tie current), valid readings only.
    let mut by_slot: BTreeMap<TimeSlot, (Option<Decimal>, Option<Decimal>)> = BTreeMap::new();
    for r in relevant.iter().filter(|r| r.has_valid_current()) {
        let entry = by_slot.entry(r.time).or_default();
        let side = if r.code == main_incomer { &mut entry.0 } else { &mut entry.1 };
        *side = Some(side.map_or(r.current, |c| c.max(r.current)));
    }

    let loads: Vec<Sample> = by_slot
        .iter()
        .filter_map(|(t, (main, tie))| Some((*t, (*main)? - (*tie)?)))
        .collect();
    let main_currents: Vec<Sample> = by_slot.iter().filter_map(|(t, (m, _))| m.map(|v| (*t, v))).collect();
    let tie_currents: Vec<Sample> = by_slot.iter().filter_map(|(t, (_, b))| b.map(|v| (*t, v))).collect();

    let (peak, peak_time) = split(first_max_by_key(loads.iter().copied(), |s| s.1));
    let (min, min_time) = split(first_min_by_key(loads.iter().copied(), |s| s.1));
    let (min_v, max_v) = voltage_extremes(&relevant);
    let (min_voltage, min_voltage_time) = split(min_v);
    let (max_voltage, max_voltage_time) = split(max_v);
    let (main_incomer_max_load, main_incomer_max_load_time) =
        split(first_max_by_key(main_currents.iter().copied(), |s| s.1));
    let (bus_tie_max_load, bus_tie_max_load_time) = split(first_max_by_key(tie_currents.iter().copied(), |s| s.1));

    StationPeakMin {
        peak,
        peak_time,
        min,
        min_time,
        min_voltage,
        min_voltage_time,
        max_voltage,
        max_voltage_time,
        main_incomer_max_load,
        main_incomer_max_load_time,
        bus_tie_max_load,
        bus_tie_max_load_time,
    }
}

/// Day peak/min of the summed incomer currents and the incomers' voltage extremes.
pub fn incomers_peak_min_from(readings: &[Reading], incomers: &[String]) -> IncomersPeakMin {
    let relevant: Vec<&Reading> = readings.iter().filter(|r| incomers.contains(&r.code)).collect();

    let mut totals: BTreeMap<TimeSlot, Decimal> = BTreeMap::new();
    for r in relevant.iter().filter(|r| r.has_valid_current()) {
        *totals.entry(r.time).or_insert(Decimal::ZERO) += r.current;
    }

    let (peak, peak_time) = split(first_max_by_key(totals.iter().map(|(t, v)| (*t, *v)), |s| s.1));
    let (min, min_time) = split(first_min_by_key(totals.iter().map(|(t, v)| (*t, *v)), |s| s.1));
    let (min_v, max_v) = voltage_extremes(&relevant);
    let (min_voltage, min_voltage_time) = split(min_v);
    let (max_voltage, max_voltage_time) = split(max_v);

    IncomersPeakMin {
        peak,
        peak_time,
        min,
        min_time,
        min_voltage,
        min_voltage_time,
        max_voltage,
        max_voltage_time,
    }
}

impl ReviewEngine {
    pub async fn daily_current_stats(
        &self,
        date: Date,
        table: ReadingTable,
    ) -> Result<Vec<CurrentStats>, ReviewError> {
        let readings = self.store().readings_on(table, date).await?;
        let stats = current_stats(&readings);
        self.in_display_order(table, stats, |s| s.code.as_str()).await
    }

    /// Extremes of the day's hourly energy deltas. The 24 slots are independent
    /// and fetched concurrently.
    pub async fn daily_energy_delta_stats(
        &self,
        date: Date,
        table: ReadingTable,
    ) -> Result<Vec<EnergyDeltaStats>, ReviewError> {
        let slots: Vec<TimeSlot> = TimeSlot::hourly_slots().collect();
        let deltas = try_join_all(
            slots
                .iter()
                .map(|slot| self.unordered_hourly_delta(table, date, *slot)),
        )
        .await?;

        let hours: Vec<(TimeSlot, Vec<DeltaRecord>)> = slots.into_iter().zip(deltas).collect();
        let stats = energy_delta_stats(&hours);
        self.in_display_order(table, stats, |s| s.code.as_str()).await
    }

    pub async fn station_peak_min(&self, date: Date) -> Result<StationPeakMin, ReviewError> {
        let station = self.station();
        let codes = [station.main_incomer.clone(), station.bus_tie.clone()];
        let readings = self
            .store()
            .readings_for_codes_on(ReadingTable::Eht, date, &codes)
            .await?;

        Ok(station_peak_min_from(&readings, &station.main_incomer, &station.bus_tie))
    }

    pub async fn incomers_peak_min(&self, date: Date) -> Result<IncomersPeakMin, ReviewError> {
        let incomers = &self.station().incomers;
        let readings = self
            .store()
            .readings_for_codes_on(ReadingTable::Ht, date, incomers)
            .await?;

        Ok(incomers_peak_min_from(&readings, incomers))
    }
}
