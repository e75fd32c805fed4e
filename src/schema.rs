//! Daybook column names, company tables and the product-column taxonomy.
//!
//! Every report reads the same sheet, so the names live here once instead
//! of being re-declared per report.

// ------------------------------------------------------------------
// Canonical daybook columns
// ------------------------------------------------------------------

pub const COL_DATE: &str = "DATE";
pub const COL_COMPANY: &str = "COMPANY NAME";
pub const COL_BRANCH: &str = "BRANCH";
pub const COL_STAFF: &str = "STAFF NAME";
pub const COL_CUSTOMER: &str = "CUSTOMER NAME";
pub const COL_STATUS: &str = "STATUS";
pub const COL_FRESH_OLD: &str = "FRESH/OLD";
pub const COL_INF_TOTAL: &str = "INF Total";
pub const COL_OUT_TOTAL: &str = "OUT Total";
pub const COL_NET: &str = "Net";

/// Individual inflow columns summed by the fresh/old report.
pub const INF_COLUMNS: &[&str] = &[
    "SML NCD INF",
    "SML SD INF",
    "SML GB INF",
    "VFL NCD INF",
    "VFL SD INF",
    "VFL GB INF",
    "SNL FD INF",
    "LLP INF",
];

/// Individual outflow columns summed by the fresh/old report.
pub const OUT_COLUMNS: &[&str] = &[
    "VFL NCD OUT",
    "VFL BD OUT",
    "SML PURCHASE",
    "SML NCD OUT",
    "SML SD OUT",
    "SML GB OUT",
    "LLP OUT",
];

// ------------------------------------------------------------------
// Companies
// ------------------------------------------------------------------

pub const COMPANIES: &[(&str, &str)] = &[
    ("SML FINANCE LTD", "SML"),
    ("BRD FINANCE LTD", "BRD"),
    ("VANCHINAD FINANCE (P) LTD", "VFL"),
    ("SANGEETH NIDHI LTD", "SNL"),
];

/// Short display name for a company; unknown names pass through.
pub fn short_company(name: &str) -> &str {
    COMPANIES
        .iter()
        .find(|(full, _)| *full == name)
        .map(|(_, short)| *short)
        .unwrap_or(name)
}

/// Seeded monthly quota per company, amounts in rupees.
pub const DEFAULT_TARGETS: &[(&str, f64)] = &[
    ("SML FINANCE LTD", 5_000_000.0),
    ("BRD FINANCE LTD", 2_000_000.0),
    ("VANCHINAD FINANCE (P) LTD", 3_000_000.0),
    ("SANGEETH NIDHI LTD", 1_500_000.0),
];

// ------------------------------------------------------------------
// Row tags
// ------------------------------------------------------------------

pub const STATUS_RESIGNED: &str = "RESIGNED";

/// FRESH/OLD values counted as fresh business.
pub const FRESH_TAGS: &[&str] = &["FRESH CUSTOMER", "FRESH CUSTOMER/FRESH STAFF"];

/// The subset of [`FRESH_TAGS`] where the staff member is also new.
pub const FRESH_STAFF_TAG: &str = "FRESH CUSTOMER/FRESH STAFF";

/// FRESH/OLD values counted as old business. The empty cell counts as old.
pub const OLD_TAGS: &[&str] = &["OLD", "OLD CUSTOMER", "", "FRESH CUSTOMER/MINIMUM AMT NIL"];

/// The staff report grew its own fresh list before the tags settled down.
pub const STAFF_FRESH_TAGS: &[&str] = &["FRESH CUSTOMER", "FRESH CUSTOMER/STAFF", "FRESH STAFF"];

// ------------------------------------------------------------------
// Product taxonomy
// ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowSide {
    Inflow,
    Outflow,
}

impl FlowSide {
    fn from_token(tok: &str) -> Option<Self> {
        match tok {
            "INF" => Some(FlowSide::Inflow),
            "OUT" => Some(FlowSide::Outflow),
            _ => None,
        }
    }
}

/// A product column parsed out of a header like `SML NCD INF`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductColumn {
    pub company: String,
    pub product: String,
    pub side: FlowSide,
}

/// Parse `<COMPANY> <PRODUCT..> <INF|OUT>` headers. Two-token headers like
/// `LLP INF` use the company token as the product; `SML PURCHASE` is the
/// one outflow column without a direction suffix. Totals columns and the
/// dimension columns never match.
pub fn parse_product_column(header: &str) -> Option<ProductColumn> {
    let parts: Vec<&str> = header.trim().split_whitespace().collect();
    if parts.len() >= 3 {
        let side = FlowSide::from_token(parts[parts.len() - 1])?;
        Some(ProductColumn {
            company: parts[0].to_string(),
            product: parts[1..parts.len() - 1].join(" "),
            side,
        })
    } else if parts.len() == 2 {
        if let Some(side) = FlowSide::from_token(parts[1]) {
            Some(ProductColumn {
                company: parts[0].to_string(),
                product: parts[0].to_string(),
                side,
            })
        } else if parts[1] == "PURCHASE" {
            Some(ProductColumn {
                company: parts[0].to_string(),
                product: "PURCHASE".to_string(),
                side: FlowSide::Outflow,
            })
        } else {
            None
        }
    } else {
        None
    }
}

/// Human name for a product code in report output.
pub fn product_display_name(code: &str) -> String {
    if code.is_empty() {
        return "No Product Specified".to_string();
    }
    match code.to_uppercase().as_str() {
        "BD" | "SD" => "Subdebt/Bond".to_string(),
        "FD" => "Fixed Deposit".to_string(),
        "GB" => "Golden Bond".to_string(),
        "LLP" => "LLP".to_string(),
        "NCD" => "NCD".to_string(),
        "PURCHASE" => "Purchase/Outflow".to_string(),
        _ => code.to_string(),
    }
}

// ------------------------------------------------------------------
// Monthly summary sheet
// ------------------------------------------------------------------

// The summary sheet comes from a different export and its headers drift,
// so matching is done on uppercased, whitespace-free forms.
pub const SUMMARY_INFLOW_ALIASES: &[&str] = &["TOTAL INFLOW", "INF TOTAL"];
pub const SUMMARY_OUTFLOW_ALIASES: &[&str] = &["TOTAL OUTFLOW", "OUT TOTAL"];
pub const SUMMARY_NET_ALIASES: &[&str] = &["NET"];
pub const SUMMARY_DATE_ALIASES: &[&str] = &["DATE"];
pub const SUMMARY_COMPANY_ALIASES: &[&str] = &["COMPANY NAME"];

fn squeeze(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// Locate the first header matching any alias, comparing squeezed forms.
pub fn find_summary_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    let targets: Vec<String> = aliases.iter().map(|a| squeeze(a)).collect();
    headers.iter().position(|h| targets.contains(&squeeze(h)))
}

// ------------------------------------------------------------------
// Per-report header requirements (used by `munim check`)
// ------------------------------------------------------------------

pub const REPORT_REQUIREMENTS: &[(&str, &[&str])] = &[
    ("flows", &[COL_DATE, COL_CUSTOMER, COL_STAFF, COL_COMPANY, COL_INF_TOTAL, COL_OUT_TOTAL, COL_NET]),
    ("branches", &[COL_DATE, COL_BRANCH, COL_STAFF, COL_INF_TOTAL, COL_OUT_TOTAL]),
    ("rank", &[COL_DATE, COL_COMPANY, COL_BRANCH, COL_INF_TOTAL, COL_OUT_TOTAL]),
    ("gainers", &[COL_DATE, COL_STAFF, COL_COMPANY, COL_STATUS, COL_NET]),
    ("targets", &[COL_DATE, COL_COMPANY, COL_INF_TOTAL, COL_OUT_TOTAL]),
    ("participation", &[COL_DATE, COL_STAFF, COL_COMPANY, COL_INF_TOTAL, COL_OUT_TOTAL]),
    ("fresh-old", &[COL_DATE, COL_FRESH_OLD, COL_CUSTOMER, COL_COMPANY, COL_STAFF]),
    ("staff", &[COL_DATE, COL_STAFF, COL_CUSTOMER, COL_INF_TOTAL, COL_OUT_TOTAL, COL_NET]),
    ("resigned", &[COL_DATE, COL_STAFF, COL_STATUS, COL_COMPANY, COL_INF_TOTAL, COL_OUT_TOTAL]),
    ("performers", &[COL_DATE, COL_STAFF, COL_INF_TOTAL, COL_NET]),
];
