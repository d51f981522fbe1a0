// Parsing and formatting helpers.
//
// The open-data export is hand-maintained, so amounts show up as `1234.5`,
// `1234,5` or `1.234,50` depending on the year. Everything here turns those
// into plain numbers, and back into Spanish-formatted text for the console.
use num_format::{Locale, ToFormattedString};

/// Parse an amount while tolerating both `.` and `,` as decimal separator.
///
/// - Trims whitespace and a trailing `€`.
/// - Rejects values that contain alphabetic characters.
/// - When both separators appear, the last one is the decimal separator.
/// - A single separator occurring more than once is a thousands separator.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim().trim_end_matches('€').trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let dots = s.matches('.').count();
    let commas = s.matches(',').count();
    let normalized = match (dots, commas) {
        (0, 0) => s,
        (_, 0) if dots > 1 => s.replace('.', ""),
        (_, 0) => s,
        (0, 1) => s.replace(',', "."),
        (0, _) => s.replace(',', ""),
        _ => {
            let last_dot = s.rfind('.').unwrap_or(0);
            let last_comma = s.rfind(',').unwrap_or(0);
            if last_comma > last_dot {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
    };
    normalized.parse::<f64>().ok()
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i32>().ok()
}

/// Format an amount in euros with Spanish grouping, e.g. `1.234.567,89 €`.
///
/// Digits are grouped on the rounded text, so amounts beyond the `i64`
/// range keep every digit and values that round to zero carry no sign.
pub fn format_euros(n: f64) -> String {
    let s = format!("{:.2}", n.abs());
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));
    let neg = n < 0.0 && s.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let grouped = group_digits(int_part, Locale::es.separator());
    let sign = if neg { "-" } else { "" };
    format!("{sign}{grouped},{frac_part} €")
}

fn group_digits(digits: &str, sep: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * sep.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::es)
}

/// Render a year list the way the chart titles show it: `[2018, 2019]`.
pub fn format_years(years: &[i32]) -> String {
    let inner: Vec<String> = years.iter().map(|y| y.to_string()).collect();
    format!("[{}]", inner.join(", "))
}
