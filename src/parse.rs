use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

// Currency symbols, percent signs, commas and whitespace that show up inside
// hand-keyed amount cells.
static AMOUNT_JUNK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[₹$€£%,\s]").unwrap());

// ------------------------------------------------------------------
// Line tokenizer
// ------------------------------------------------------------------

/// Split one daybook line into trimmed fields.
///
/// Handles quoted fields with embedded commas and doubled-quote escapes.
/// An unterminated quote swallows the rest of the line into the final field
/// rather than erroring. Trailing empty fields are preserved.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut cur = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                if chars.peek() == Some(&'"') {
                    cur.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                cur.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == ',' {
            fields.push(cur.trim().to_string());
            cur.clear();
        } else {
            cur.push(ch);
        }
    }
    fields.push(cur.trim().to_string());
    fields
}

// ------------------------------------------------------------------
// Dates
// ------------------------------------------------------------------

/// Parse a day-first date cell: `5/4/2025`, `05-04-2025` and `05.04.2025`
/// all mean 5 April 2025. Returns None for anything that does not name a
/// real calendar day between 1900 and 2100.
pub fn parse_date_dmy(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.trim().replace(['-', '.'], "/");
    let parts: Vec<&str> = cleaned.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let year: i32 = parts[2].trim().parse().ok()?;
    if !(1..=31).contains(&day) || !(1..=12).contains(&month) || !(1900..=2100).contains(&year) {
        return None;
    }
    // Rejects 30 Feb and friends.
    NaiveDate::from_ymd_opt(year, month, day)
}

// ------------------------------------------------------------------
// Amounts
// ------------------------------------------------------------------

/// Coerce an amount cell to a number. Empty cells are 0, commas are
/// stripped, parentheses or a trailing hyphen mean negative, anything
/// unparseable is 0.
pub fn parse_amount(raw: &str) -> f64 {
    to_amount(raw.trim())
}

/// Lenient variant for sheets where amounts arrive with currency symbols,
/// percent signs or stray whitespace baked in.
pub fn clean_amount(raw: &str) -> f64 {
    let cleaned = AMOUNT_JUNK.replace_all(raw, "");
    to_amount(cleaned.trim())
}

fn to_amount(raw: &str) -> f64 {
    if raw.is_empty() {
        return 0.0;
    }
    // Negative markers come off before the comma strip.
    let (body, negative) = if let Some(inner) = raw.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        (inner, true)
    } else if let Some(inner) = raw.strip_suffix('-') {
        (inner, true)
    } else {
        (raw, false)
    };
    let val: f64 = match body.replace(',', "").trim().parse() {
        Ok(v) if f64::is_finite(v) => v,
        _ => return 0.0,
    };
    if negative {
        -val
    } else {
        val
    }
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_line_plain() {
        assert_eq!(split_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(split_line(" a , b "), vec!["a", "b"]);
    }

    #[test]
    fn test_split_line_quoted_comma() {
        // A naive split on ',' would give four fields here.
        assert_eq!(split_line(r#"a,"b,c",d"#), vec!["a", "b,c", "d"]);
    }

    #[test]
    fn test_split_line_doubled_quotes() {
        assert_eq!(split_line(r#""KURIAN ""KP"" PHILIP",SML"#), vec![r#"KURIAN "KP" PHILIP"#, "SML"]);
    }

    #[test]
    fn test_split_line_trailing_empty() {
        assert_eq!(split_line("a,b,"), vec!["a", "b", ""]);
        assert_eq!(split_line(",,"), vec!["", "", ""]);
    }

    #[test]
    fn test_split_line_unterminated_quote() {
        // Rest of the line lands in the last field instead of erroring.
        assert_eq!(split_line(r#"a,"b,c"#), vec!["a", "b,c"]);
    }

    #[test]
    fn test_parse_date_separators() {
        let want = NaiveDate::from_ymd_opt(2025, 4, 5).unwrap();
        assert_eq!(parse_date_dmy("5/4/2025"), Some(want));
        assert_eq!(parse_date_dmy("05-04-2025"), Some(want));
        assert_eq!(parse_date_dmy("05.04.2025"), Some(want));
    }

    #[test]
    fn test_parse_date_rejects_impossible() {
        assert_eq!(parse_date_dmy("30/02/2025"), None);
        assert_eq!(parse_date_dmy("31/04/2025"), None);
        assert_eq!(parse_date_dmy("01/13/2025"), None);
        assert_eq!(parse_date_dmy("01/01/1899"), None);
        assert_eq!(parse_date_dmy("01/01/25"), None);
        assert_eq!(parse_date_dmy("2025/04/05/x"), None);
        assert_eq!(parse_date_dmy("April 5"), None);
    }

    #[test]
    fn test_parse_date_leap_day() {
        assert!(parse_date_dmy("29/02/2024").is_some());
        assert_eq!(parse_date_dmy("29/02/2025"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("  "), 0.0);
        assert_eq!(parse_amount("1,234.56"), 1234.56);
        // Re-parsing a cleaned number changes nothing.
        assert_eq!(parse_amount("1234.56"), 1234.56);
        assert_eq!(parse_amount("(500)"), -500.0);
        assert_eq!(parse_amount("(2,000)"), -2000.0);
        assert_eq!(parse_amount("500-"), -500.0);
        assert_eq!(parse_amount("-750"), -750.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("NaN"), 0.0);
        assert_eq!(parse_amount("inf"), 0.0);
    }

    #[test]
    fn test_clean_amount() {
        assert_eq!(clean_amount("₹ 1,500"), 1500.0);
        assert_eq!(clean_amount("$2,000.50"), 2000.5);
        assert_eq!(clean_amount("12%"), 12.0);
        assert_eq!(clean_amount("( 2,000 )"), -2000.0);
        assert_eq!(clean_amount("n/a"), 0.0);
    }
}
