use nhelper_domain::Ratio;

/// Token rendered wherever a ratio or percentage has no defined value.
pub const UNDEFINED_TOKEN: &str = "-";

/// Formats whole seconds as `1h1m1s`, dropping leading zero units
/// (`65` -> `1m5s`, `0` -> `0s`). Fractions are truncated and anything that
/// is negative or not finite counts as zero.
pub fn format_seconds_to_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours == 0 && minutes == 0 {
        format!("{secs}s")
    } else if hours == 0 {
        format!("{minutes}m{secs}s")
    } else {
        format!("{hours}h{minutes}m{secs}s")
    }
}

/// Formats a ratio as a percentage with two decimals, or [`UNDEFINED_TOKEN`].
pub fn format_percent(ratio: Ratio) -> String {
    match ratio.value() {
        Some(value) => format!("{:.2}%", clean_zero(value * 100.0)),
        None => UNDEFINED_TOKEN.to_string(),
    }
}

/// Formats a money amount with two decimals.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", clean_zero(amount))
}

fn clean_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_drop_leading_zero_units() {
        assert_eq!(format_seconds_to_time(0.0), "0s");
        assert_eq!(format_seconds_to_time(59.0), "59s");
        assert_eq!(format_seconds_to_time(65.0), "1m5s");
        assert_eq!(format_seconds_to_time(3600.0), "1h0m0s");
        assert_eq!(format_seconds_to_time(3661.0), "1h1m1s");
    }

    #[test]
    fn seconds_tolerate_bad_input() {
        assert_eq!(format_seconds_to_time(-10.0), "0s");
        assert_eq!(format_seconds_to_time(f64::NAN), "0s");
        assert_eq!(format_seconds_to_time(61.9), "1m1s");
    }

    #[test]
    fn percent_never_prints_nan() {
        assert_eq!(format_percent(Ratio::Defined(1.0 / 3.0)), "33.33%");
        assert_eq!(format_percent(Ratio::Undefined), "-");
        assert_eq!(format_percent(Ratio::of(1.0, 0.0)), "-");
    }

    #[test]
    fn amounts_do_not_show_negative_zero() {
        assert_eq!(format_amount(-0.0), "0.00");
        assert_eq!(format_amount(-30.0), "-30.00");
    }
}
