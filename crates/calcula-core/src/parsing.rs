//! Parsing and formatting of user-typed quantities and currency amounts.
//!
//! Amounts follow the Brazilian convention (`1.234,56`) but plain decimal
//! points (`1234.56`) are accepted too.

use num_format::{Buffer, CustomFormat, Grouping};

/// Parses a positive whole quantity.
///
/// Whitespace is ignored and a decimal comma is read as a point, so `"3,0"`
/// is accepted while `"3,5"` is not.
pub fn parse_quantity(input: &str) -> Option<u32> {
    let normalized: String = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    let parsed: f64 = normalized.parse().ok()?;
    if !parsed.is_finite() || parsed <= 0.0 || parsed.fract() != 0.0 || parsed > u32::MAX as f64 {
        return None;
    }
    Some(parsed as u32)
}

/// Parses a positive currency amount.
///
/// Everything except digits, `.` and `,` is dropped first (so `"R$ 12,90"`
/// works). Then:
/// - both separators present: `.` groups thousands, `,` is the decimal mark
/// - only `,`: it is the decimal mark
/// - several `.`: only the last one is the decimal mark
pub fn parse_currency(input: &str) -> Option<f64> {
    let sanitized: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if sanitized.is_empty() {
        return None;
    }

    let has_comma = sanitized.contains(',');
    let has_dot = sanitized.contains('.');

    let normalized = if has_comma && has_dot {
        sanitized.replace('.', "").replace(',', ".")
    } else if has_comma {
        sanitized.replace(',', ".")
    } else if sanitized.matches('.').count() > 1 {
        let last_dot = sanitized.rfind('.').unwrap_or(0);
        sanitized
            .char_indices()
            .filter(|(index, c)| *c != '.' || *index == last_dot)
            .map(|(_, c)| c)
            .collect()
    } else {
        sanitized
    };

    let parsed: f64 = normalized.parse().ok()?;
    if !parsed.is_finite() || parsed <= 0.0 {
        return None;
    }
    Some(parsed)
}

/// Formats an amount as Brazilian reais, e.g. `R$ 1.234,56`.
///
/// `None` renders as `-`.
pub fn format_brl(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return "-".to_string();
    };

    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = cents / 100;
    let fraction = cents % 100;

    let grouped = match CustomFormat::builder()
        .grouping(Grouping::Standard)
        .separator(".")
        .build()
    {
        Ok(format) => {
            let mut buffer = Buffer::new();
            buffer.write_formatted(&whole, &format);
            buffer.as_str().to_string()
        }
        Err(_) => whole.to_string(),
    };

    format!("{}R$ {},{:02}", sign, grouped, fraction)
}

/// Renders an amount the way a user would type it back into the form (`10,5`).
pub fn format_decimal_comma(value: f64) -> String {
    value.to_string().replace('.', ",")
}
