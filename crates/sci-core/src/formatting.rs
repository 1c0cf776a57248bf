/// Format a number the pt-BR way: `.` between thousands, `,` before a fixed
/// number of decimal places.
///
/// Non-finite input formats as zero.
///
/// # Examples
///
/// ```
/// use sci_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1.234,5");
/// assert_eq!(format_number(1234567.0, 0), "1.234.567");
/// assert_eq!(format_number(0.0, 2), "0,00");
/// assert_eq!(format_number(-9876.5, 1), "-9.876,5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let value = if value.is_finite() { value } else { 0.0 };

    // Work in integer units of the last decimal place. The epsilon nudges
    // exact binary midpoints (1.005 and friends) up before rounding.
    let factor = 10_f64.powi(decimals as i32);
    let abs_value = value.abs();
    let epsilon = f64::EPSILON * abs_value * factor;
    let scaled = ((abs_value * factor) + epsilon).round();
    let negative = value < 0.0 && scaled > 0.0;

    let scaled = scaled as u64;
    let unit = 10_u64.pow(decimals);
    let grouped = group_thousands(&(scaled / unit).to_string());

    let body = if decimals == 0 {
        grouped
    } else {
        format!(
            "{},{:0width$}",
            grouped,
            scaled % unit,
            width = decimals as usize
        )
    };

    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

/// Format a KPI value with at most one fractional digit, dropping a
/// trailing `,0`.
///
/// # Examples
///
/// ```
/// use sci_core::formatting::format_decimal;
///
/// assert_eq!(format_decimal(1234.56), "1.234,6");
/// assert_eq!(format_decimal(12.0), "12");
/// assert_eq!(format_decimal(0.04), "0");
/// ```
pub fn format_decimal(value: f64) -> String {
    let formatted = format_number(value, 1);
    match formatted.strip_suffix(",0") {
        Some(whole) => whole.to_string(),
        None => formatted,
    }
}

/// Format a percentage with [`format_decimal`] and a `%` suffix.
///
/// # Examples
///
/// ```
/// use sci_core::formatting::format_percent;
///
/// assert_eq!(format_percent(85.714), "85,7%");
/// assert_eq!(format_percent(100.0), "100%");
/// ```
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_decimal(value))
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero to avoid division by zero.
///
/// # Examples
///
/// ```
/// use sci_core::formatting::percentage;
///
/// assert!((percentage(50.0, 200.0, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    let raw = (part / whole) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

/// Arithmetic mean, or `0.0` for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert a `.` every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push('.');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
