//! Display formatting for derived metrics. Missing values render as a
//! placeholder; a real numeric zero renders as "0".

const PLACEHOLDER: &str = "-";

/// Rounded count with grouped thousands, e.g. 12456.7 -> "12,457".
pub fn format_count(value: Option<f64>) -> String {
    match value {
        Some(number) => group_thousands(number.round() as i64),
        None => PLACEHOLDER.to_string(),
    }
}

/// Rounded duration in hours, e.g. 25.6 -> "26h".
pub fn format_hours(value: Option<f64>) -> String {
    match value {
        Some(hours) => format!("{}h", hours.round() as i64),
        None => PLACEHOLDER.to_string(),
    }
}

/// Fraction rendered as a rounded percentage, e.g. 0.875 -> "88%".
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(fraction) => format!("{}%", (fraction * 100.0).round() as i64),
        None => PLACEHOLDER.to_string(),
    }
}

/// One-decimal rendering used for per-ticket averages.
pub fn format_decimal(value: f64) -> String {
    format!("{value:.1}")
}

fn group_thousands(number: i64) -> String {
    let digits = number.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (index, digit) in digits.chars().enumerate() {
        let remaining = digits.len() - index;
        if index > 0 && remaining % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if number < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
