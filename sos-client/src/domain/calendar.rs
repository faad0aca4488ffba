use std::fmt;
use std::str::FromStr;

use time::{macros::format_description, Date, Month};

use super::ParseError;

/// Formats a date the way the reading tables store it: `DD-MM-YYYY`.
pub fn display_date(date: Date) -> String {
    format!("{:02}-{:02}-{:04}", date.day(), u8::from(date.month()), date.year())
}

/// Parses a stored `DD-MM-YYYY` date.
pub fn parse_display_date(s: &str) -> Result<Date, ParseError> {
    Date::parse(s.trim(), format_description!("[day]-[month]-[year]"))
        .map_err(|_| ParseError::Date(s.to_string()))
}

/// Parses a calendar-form `YYYY-MM-DD` date as entered by operators.
pub fn parse_calendar_date(s: &str) -> Result<Date, ParseError> {
    Date::parse(s.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| ParseError::Date(s.to_string()))
}

/// A calendar month, written `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: Month,
}

impl YearMonth {
    pub fn new(year: i32, month: u8) -> Result<Self, ParseError> {
        let month = Month::try_from(month).map_err(|_| ParseError::Month(format!("{year:04}-{month:02}")))?;
        // Reject years the calendar cannot represent.
        Date::from_calendar_date(year, month, 1).map_err(|_| ParseError::Month(format!("{year:04}-{month}")))?;
        Ok(Self { year, month })
    }

    pub fn of(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Date {
        // Validated in the constructors.
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MIN)
    }

    pub fn last_day(&self) -> Date {
        self.next()
            .first_day()
            .previous_day()
            .unwrap_or_else(|| self.first_day())
    }

    pub fn days(&self) -> u8 {
        self.last_day().day()
    }

    pub fn minutes(&self) -> i64 {
        i64::from(self.days()) * 24 * 60
    }

    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn previous(&self) -> Self {
        match self.month {
            Month::January => Self {
                year: self.year - 1,
                month: Month::December,
            },
            m => Self {
                year: self.year,
                month: m.previous(),
            },
        }
    }

    pub fn next(&self) -> Self {
        match self.month {
            Month::December => Self {
                year: self.year + 1,
                month: Month::January,
            },
            m => Self {
                year: self.year,
                month: m.next(),
            },
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, u8::from(self.month))
    }
}

impl FromStr for YearMonth {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (y, m) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| ParseError::Month(s.to_string()))?;
        if y.len() != 4 || m.len() != 2 {
            return Err(ParseError::Month(s.to_string()));
        }
        let year: i32 = y.parse().map_err(|_| ParseError::Month(s.to_string()))?;
        let month: u8 = m.parse().map_err(|_| ParseError::Month(s.to_string()))?;
        YearMonth::new(year, month).map_err(|_| ParseError::Month(s.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for YearMonth {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn display_date_round_trips_through_store_format() {
        let d = date!(2024 - 12 - 31);
        assert_eq!(display_date(d), "31-12-2024");
        assert_eq!(parse_display_date("31-12-2024").unwrap(), d);
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert!(parse_display_date("2024-12-31").is_err());
        assert!(parse_display_date("31-02-2024").is_err());
        assert!(parse_calendar_date("31-12-2024").is_err());
        assert_eq!(parse_calendar_date("2024-12-31").unwrap(), date!(2024 - 12 - 31));
    }

    #[test]
    fn month_boundaries() {
        let feb: YearMonth = "2024-02".parse().unwrap();
        assert_eq!(feb.first_day(), date!(2024 - 02 - 01));
        assert_eq!(feb.last_day(), date!(2024 - 02 - 29));
        assert_eq!(feb.days(), 29);
        assert_eq!(feb.previous().last_day(), date!(2024 - 01 - 31));

        let jan: YearMonth = "2025-01".parse().unwrap();
        assert_eq!(jan.previous().to_string(), "2024-12");
        assert_eq!(jan.previous().last_day(), date!(2024 - 12 - 31));

        let dec: YearMonth = "2024-12".parse().unwrap();
        assert_eq!(dec.last_day(), date!(2024 - 12 - 31));
        assert_eq!(dec.next().to_string(), "2025-01");
    }

    #[test]
    fn thirty_day_month_has_43200_minutes() {
        let june: YearMonth = "2025-06".parse().unwrap();
        assert_eq!(june.minutes(), 43_200);
    }

    #[test]
    fn malformed_months_are_rejected() {
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("2025-1".parse::<YearMonth>().is_err());
        assert!("06-2025".parse::<YearMonth>().is_err());
        assert!("".parse::<YearMonth>().is_err());
    }
}
