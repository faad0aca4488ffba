use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;
use sos_client::domain::{Reading, ReadingTable, TimeSlot, YearMonth};
use time::Date;

use super::{numeric::scaled_energy, ReviewEngine, ReviewError};

/// Net energy of one code over a month, from the midnight counter readings
/// bounding it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonthlyEnergy {
    pub code: String,
    pub initial_export: Option<Decimal>,
    pub final_export: Option<Decimal>,
    pub initial_import: Option<Decimal>,
    pub final_import: Option<Decimal>,
    pub mf_export: Option<Decimal>,
    pub mf_import: Option<Decimal>,
    pub actual_export_energy: Option<Decimal>,
    pub actual_import_energy: Option<Decimal>,
}

fn energy(final_reading: Option<Decimal>, initial_reading: Option<Decimal>, mf: Option<Decimal>) -> Option<Decimal> {
    Some(scaled_energy(final_reading?, initial_reading?, mf?))
}

#[derive(Default)]
struct Boundary<'a> {
    initial: Option<&'a Reading>,
    fin: Option<&'a Reading>,
}

/// Pairs the initial (`initial_date`) and final (`final_date`) readings of each
/// code. Codes keep the order they first appear in `readings`; a repeated
/// reading for the same code and date replaces the earlier one.
pub fn monthly_energy_from(readings: &[Reading], initial_date: Date, final_date: Date) -> Vec<MonthlyEnergy> {
    let mut order: Vec<&str> = Vec::new();
    let mut bounds: HashMap<&str, Boundary<'_>> = HashMap::new();

    for r in readings {
        if r.date != final_date && r.date != initial_date {
            continue;
        }

        let entry = bounds.entry(r.code.as_str()).or_insert_with(|| {
            order.push(r.code.as_str());
            Boundary::default()
        });
        if r.date == final_date {
            entry.fin = Some(r);
        } else {
            entry.initial = Some(r);
        }
    }

    order
        .into_iter()
        .map(|code| {
            let b = &bounds[code];
            let ir = b.initial;
            let fr = b.fin;

            let initial_export = ir.and_then(|r| r.emc_export);
            let initial_import = ir.and_then(|r| r.emc_import);
            let final_export = fr.and_then(|r| r.emc_export);
            let final_import = fr.and_then(|r| r.emc_import);
            let mf_export = fr.and_then(|r| r.mf_export).or_else(|| ir.and_then(|r| r.mf_export));
            let mf_import = fr.and_then(|r| r.mf_import).or_else(|| ir.and_then(|r| r.mf_import));

            MonthlyEnergy {
                code: code.to_string(),
                initial_export,
                final_export,
                initial_import,
                final_import,
                mf_export,
                mf_import,
                actual_export_energy: energy(final_export, initial_export, mf_export),
                actual_import_energy: energy(final_import, initial_import, mf_import),
            }
        })
        .collect()
}

impl ReviewEngine {
    /// Energy per code for `month`, read between midnight of the previous
    /// month's last day and midnight of this month's last day.
    ///
    /// Records keep store order; they are not sorted by the master list.
    pub async fn monthly_energy(&self, month: YearMonth, table: ReadingTable) -> Result<Vec<MonthlyEnergy>, ReviewError> {
        let initial_date = month.previous().last_day();
        let final_date = month.last_day();

        let readings = self
            .store()
            .readings_on_dates_at(table, &[initial_date, final_date], TimeSlot::END_OF_DAY)
            .await?;
        tracing::debug!(%table, %month, rows = readings.len(), "monthly boundary readings");

        Ok(monthly_energy_from(&readings, initial_date, final_date))
    }
}
