// SPDX-License-Identifier: MIT OR Apache-2.0
//! Label text.

/// Format a value in billions as `$1,234 B`; zero formats as nothing
pub fn format_value(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return String::new();
    }

    let rounded = value.abs().round();
    if rounded == 0.0 {
        return "$0 B".to_string();
    }

    let digits = format!("{rounded:.0}");
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped} B")
}
