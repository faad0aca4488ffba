use rust_decimal::Decimal;
use time::Date;

use super::{calendar::parse_display_date, ParseError, TimeSlot};

/// Raw reading row as stored: date and time are display strings.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReadingRow {
    pub code: String,
    pub dateobserved: String,
    pub timeobserved: String,
    pub current: Decimal,
    pub voltage: Option<Decimal>,
    pub emc_export: Option<Decimal>,
    pub emc_import: Option<Decimal>,
    pub mf_export: Option<Decimal>,
    pub mf_import: Option<Decimal>,
}

/// One periodic measurement of a feeder or transformer.
///
/// A negative `current` marks an invalid or offline reading.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reading {
    pub code: String,
    pub date: Date,
    pub time: TimeSlot,
    pub current: Decimal,
    pub voltage: Option<Decimal>,
    pub emc_export: Option<Decimal>,
    pub emc_import: Option<Decimal>,
    pub mf_export: Option<Decimal>,
    pub mf_import: Option<Decimal>,
}

impl Reading {
    pub fn has_valid_current(&self) -> bool {
        self.current >= Decimal::ZERO
    }
}

impl TryFrom<ReadingRow> for Reading {
    type Error = ParseError;

    fn try_from(row: ReadingRow) -> Result<Self, Self::Error> {
        Ok(Reading {
            date: parse_display_date(&row.dateobserved)?,
            time: row.timeobserved.parse()?,
            code: row.code,
            current: row.current,
            voltage: row.voltage,
            emc_export: row.emc_export,
            emc_import: row.emc_import,
            mf_export: row.mf_export,
            mf_import: row.mf_import,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn row(date: &str, time: &str) -> ReadingRow {
        ReadingRow {
            code: "KOTTAYAM".to_string(),
            dateobserved: date.to_string(),
            timeobserved: time.to_string(),
            current: Decimal::new(1205, 1),
            voltage: Some(Decimal::new(112, 0)),
            emc_export: Some(Decimal::new(1_234_500, 3)),
            emc_import: None,
            mf_export: Some(Decimal::ONE),
            mf_import: None,
        }
    }

    #[test]
    fn row_converts_display_date_and_slot() {
        let reading = Reading::try_from(row("05-03-2025", "24:00")).unwrap();
        assert_eq!(reading.date, date!(2025 - 03 - 05));
        assert_eq!(reading.time, TimeSlot::END_OF_DAY);
        assert_eq!(reading.emc_export.map(|v| v.scale()), Some(3));
    }

    #[test]
    fn row_with_bad_date_is_rejected() {
        assert!(matches!(
            Reading::try_from(row("2025-03-05", "24:00")),
            Err(ParseError::Date(_))
        ));
        assert!(matches!(
            Reading::try_from(row("05-03-2025", "25:00")),
            Err(ParseError::Slot(_))
        ));
    }
}
