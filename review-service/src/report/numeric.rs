use rust_decimal::Decimal;

/// Decimal places of a value as stored (`3.100` has three).
pub fn decimal_places(value: Decimal) -> u32 {
    value.scale()
}

/// `current - previous`, rounded to the finer of the two operands' precisions.
pub fn rounded_delta(current: Decimal, previous: Decimal) -> Decimal {
    let places = decimal_places(current).max(decimal_places(previous));
    (current - previous).round_dp(places)
}

/// Meter advance scaled by the multiplying factor, rounded to the finer of the
/// two readings' precisions.
pub fn scaled_energy(final_reading: Decimal, initial_reading: Decimal, mf: Decimal) -> Decimal {
    let places = decimal_places(final_reading).max(decimal_places(initial_reading));
    ((final_reading - initial_reading) * mf).round_dp(places)
}

/// `part / whole * 100` to two places; `None` when `whole` is zero.
pub fn percent(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    Some((part / whole * Decimal::ONE_HUNDRED).round_dp(2))
}

/// First item carrying the largest key.
pub fn first_max_by_key<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Option<T>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    items.into_iter().fold(None, |best, item| match best {
        Some(b) if key(&item) <= key(&b) => Some(b),
        _ => Some(item),
    })
}

/// First item carrying the smallest key.
pub fn first_min_by_key<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Option<T>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    items.into_iter().fold(None, |best, item| match best {
        Some(b) if key(&item) >= key(&b) => Some(b),
        _ => Some(item),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn delta_keeps_finest_operand_precision() {
        let delta = rounded_delta(d("3.100"), d("1.0"));
        assert_eq!(delta, d("2.100"));
        assert_eq!(delta.to_string(), "2.100");
    }

    #[test]
    fn integer_operands_give_integer_delta() {
        assert_eq!(decimal_places(d("1500")), 0);
        assert_eq!(rounded_delta(d("1500"), d("1498")).to_string(), "2");
    }

    #[test]
    fn energy_is_scaled_then_rounded() {
        assert_eq!(scaled_energy(d("1500.50"), d("1000.0"), d("1.0")), d("500.50"));
        assert_eq!(scaled_energy(d("1500.50"), d("1000.0"), d("1.0")).to_string(), "500.50");
        assert_eq!(scaled_energy(d("10.125"), d("10.000"), d("2000")), d("250"));
        assert_eq!(scaled_energy(d("0.1234"), d("0.1"), d("0.5")), d("0.0117"));
    }

    #[test]
    fn availability_style_percent() {
        let pct = percent(d("43080"), d("43200")).unwrap();
        assert_eq!(pct, Decimal::new(9972, 2));
        assert_eq!(percent(Decimal::ONE, Decimal::ZERO), None);
    }

    #[test]
    fn extremes_prefer_first_occurrence() {
        let items = [("01:00", 5), ("02:00", 9), ("03:00", 2), ("04:00", 9), ("05:00", 2)];
        assert_eq!(first_max_by_key(items, |i| i.1), Some(("02:00", 9)));
        assert_eq!(first_min_by_key(items, |i| i.1), Some(("03:00", 2)));
        assert_eq!(first_max_by_key(Vec::<(&str, i32)>::new(), |i| i.1), None);
    }
}
