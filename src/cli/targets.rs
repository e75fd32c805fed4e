use comfy_table::{Cell, Table};

use crate::error::{MunimError, Result};
use crate::fmt::inr;
use crate::schema;
use crate::settings::{load_settings, save_settings};

pub fn list() -> Result<()> {
    let settings = load_settings();
    if settings.targets.is_empty() {
        println!("No targets configured. Run `munim targets set <company> <amount>`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Company", "Monthly Target"]);
    for (company, amount) in &settings.targets {
        table.add_row(vec![Cell::new(company), Cell::new(inr(*amount))]);
    }
    println!("Monthly Targets\n{table}");
    Ok(())
}

pub fn set(company: &str, amount: f64) -> Result<()> {
    let full = canonical_company(company)?;
    let mut settings = load_settings();
    settings.targets.insert(full.to_string(), amount);
    save_settings(&settings)?;
    println!("Target for {} set to {}", full, inr(amount));
    Ok(())
}

pub fn unset(company: &str) -> Result<()> {
    let full = canonical_company(company)?;
    let mut settings = load_settings();
    if settings.targets.remove(full).is_none() {
        println!("No target was set for {full}");
        return Ok(());
    }
    save_settings(&settings)?;
    println!("Removed target for {full}");
    Ok(())
}

/// Matches a full name or short code against the group roster,
/// case-insensitively.
fn canonical_company(name: &str) -> Result<&'static str> {
    let wanted = name.trim();
    schema::COMPANIES
        .iter()
        .find(|(full, short)| {
            full.eq_ignore_ascii_case(wanted) || short.eq_ignore_ascii_case(wanted)
        })
        .map(|(full, _)| *full)
        .ok_or_else(|| MunimError::UnknownCompany(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_company_full_name() {
        assert_eq!(
            canonical_company("SML FINANCE LTD").unwrap(),
            "SML FINANCE LTD"
        );
    }

    #[test]
    fn test_canonical_company_short_code_any_case() {
        assert_eq!(canonical_company("vfl").unwrap(), "VANCHINAD FINANCE (P) LTD");
        assert_eq!(canonical_company(" Snl ").unwrap(), "SANGEETH NIDHI LTD");
    }

    #[test]
    fn test_canonical_company_unknown() {
        let err = canonical_company("ACME BANK").unwrap_err();
        assert!(err.to_string().contains("ACME BANK"));
    }
}
