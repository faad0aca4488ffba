use std::fmt;
use std::str::FromStr;

use time::Date;

use super::ParseError;

/// Half-hour slots read in addition to the hourly ones (morning and evening peaks).
const HALF_HOUR_SLOTS: [u8; 7] = [5, 6, 7, 8, 18, 19, 20];

/// Clock time at which a reading is taken, `"HH:MM"`.
///
/// The end of day is written `24:00`, so the hourly slots of a date run
/// `01:00..=24:00` and `24:00` orders after every other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot {
    hour: u8,
    minute: u8,
}

impl TimeSlot {
    pub const END_OF_DAY: TimeSlot = TimeSlot { hour: 24, minute: 0 };

    pub fn new(hour: u8, minute: u8) -> Result<Self, ParseError> {
        if minute > 59 || hour > 24 || (hour == 24 && minute != 0) {
            return Err(ParseError::Slot(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    pub fn minute_of_day(&self) -> u16 {
        u16::from(self.hour) * 60 + u16::from(self.minute)
    }

    pub fn is_hourly(&self) -> bool {
        self.minute == 0 && self.hour >= 1
    }

    pub fn is_allowed(&self) -> bool {
        self.is_hourly() || (self.minute == 30 && HALF_HOUR_SLOTS.contains(&self.hour))
    }

    /// All slots at which readings are taken, in clock order.
    pub fn allowed() -> Vec<TimeSlot> {
        let mut slots: Vec<TimeSlot> = Self::hourly_slots().collect();
        slots.extend(HALF_HOUR_SLOTS.iter().map(|&hour| TimeSlot { hour, minute: 30 }));
        slots.sort();
        slots
    }

    /// `01:00`, `02:00`, ..., `24:00`.
    pub fn hourly_slots() -> impl Iterator<Item = TimeSlot> {
        (1..=24).map(|hour| TimeSlot { hour, minute: 0 })
    }

    /// Parses `HH:MM` and rejects times that are not reading slots.
    pub fn parse_allowed(s: &str) -> Result<Self, ParseError> {
        let slot: TimeSlot = s.parse()?;
        if !slot.is_allowed() {
            return Err(ParseError::Slot(s.to_string()));
        }
        Ok(slot)
    }

    /// The hourly slot preceding this one, rolling `01:00` back to `24:00`
    /// of the previous day. Half-hour slots have no predecessor.
    pub fn previous_hourly(&self, date: Date) -> Option<(Date, TimeSlot)> {
        if !self.is_hourly() {
            return None;
        }
        if self.hour == 1 {
            return date.previous_day().map(|d| (d, Self::END_OF_DAY));
        }
        Some((
            date,
            TimeSlot {
                hour: self.hour - 1,
                minute: 0,
            },
        ))
    }
}

/// Latest allowed slot at or before `minute_of_day` on `date`.
///
/// Before the first slot of the day (`01:00`) the latest reading is the
/// `24:00` reading of the previous date.
pub fn closest_allowed_slot(date: Date, minute_of_day: u16) -> (Date, TimeSlot) {
    let latest = TimeSlot::allowed()
        .into_iter()
        .take_while(|slot| slot.minute_of_day() <= minute_of_day)
        .last();

    match latest {
        Some(slot) => (date, slot),
        None => (date.previous_day().unwrap_or(date), TimeSlot::END_OF_DAY),
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeSlot {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (h, m) = trimmed
            .split_once(':')
            .ok_or_else(|| ParseError::Slot(s.to_string()))?;
        if h.len() != 2 || m.len() != 2 {
            return Err(ParseError::Slot(s.to_string()));
        }
        let hour: u8 = h.parse().map_err(|_| ParseError::Slot(s.to_string()))?;
        let minute: u8 = m.parse().map_err(|_| ParseError::Slot(s.to_string()))?;
        TimeSlot::new(hour, minute).map_err(|_| ParseError::Slot(s.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TimeSlot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn slot(s: &str) -> TimeSlot {
        s.parse().unwrap()
    }

    #[test]
    fn allowed_slots_are_hourly_plus_peak_half_hours() {
        let allowed = TimeSlot::allowed();
        assert_eq!(allowed.len(), 31);
        assert_eq!(allowed.first(), Some(&slot("01:00")));
        assert_eq!(allowed.last(), Some(&slot("24:00")));
        assert!(allowed.contains(&slot("05:30")));
        assert!(allowed.contains(&slot("20:30")));
        assert!(!allowed.contains(&slot("21:30")));
        assert!(allowed.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn parse_allowed_rejects_off_grid_times() {
        assert!(TimeSlot::parse_allowed("07:30").is_ok());
        assert!(TimeSlot::parse_allowed("24:00").is_ok());
        assert!(TimeSlot::parse_allowed("10:30").is_err());
        assert!(TimeSlot::parse_allowed("00:00").is_err());
        assert!(TimeSlot::parse_allowed("24:30").is_err());
        assert!(TimeSlot::parse_allowed("7:00").is_err());
    }

    #[test]
    fn first_slot_of_year_rolls_back_to_previous_midnight() {
        let prev = slot("01:00").previous_hourly(date!(2025 - 01 - 01));
        assert_eq!(prev, Some((date!(2024 - 12 - 31), TimeSlot::END_OF_DAY)));
    }

    #[test]
    fn previous_hourly_stays_on_same_date() {
        let prev = slot("24:00").previous_hourly(date!(2025 - 03 - 10));
        assert_eq!(prev, Some((date!(2025 - 03 - 10), slot("23:00"))));
    }

    #[test]
    fn half_hour_slots_have_no_predecessor() {
        assert_eq!(slot("06:30").previous_hourly(date!(2025 - 03 - 10)), None);
    }

    #[test]
    fn closest_slot_before_first_reading_is_previous_midnight() {
        let (d, s) = closest_allowed_slot(date!(2025 - 03 - 01), 30);
        assert_eq!(d, date!(2025 - 02 - 28));
        assert_eq!(s, TimeSlot::END_OF_DAY);
    }

    #[test]
    fn closest_slot_picks_latest_at_or_before() {
        let d = date!(2025 - 03 - 01);
        assert_eq!(closest_allowed_slot(d, 7 * 60 + 45), (d, slot("07:30")));
        assert_eq!(closest_allowed_slot(d, 11 * 60 + 59), (d, slot("11:00")));
        assert_eq!(closest_allowed_slot(d, 23 * 60 + 59), (d, slot("23:00")));
    }
}
