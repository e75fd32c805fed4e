/// Group an unsigned digit string Indian-style: last 3 digits, then twos.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut with_commas = String::new();
    for (i, c) in head.chars().rev().enumerate() {
        if i > 0 && i % 2 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let head: String = with_commas.chars().rev().collect();
    format!("{head},{tail}")
}

/// Format a rupee amount in Indian digit grouping, rounded to whole rupees:
/// 1234567.0 -> 12,34,567
pub fn inr(val: f64) -> String {
    if !val.is_finite() {
        return val.to_string();
    }
    let rounded = val.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let grouped = group_indian(&digits);
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Two-decimal variant used by the flows report: 1234.5 -> 1,234.50
pub fn inr_precise(val: f64) -> String {
    if !val.is_finite() {
        return String::new();
    }
    let negative = val < 0.0;
    let cents = format!("{:.2}", val.abs());
    let parts: Vec<&str> = cents.split('.').collect();
    let grouped = group_indian(parts[0]);
    if negative {
        format!("-{grouped}.{}", parts[1])
    } else {
        format!("{grouped}.{}", parts[1])
    }
}
