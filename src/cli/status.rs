use std::collections::BTreeSet;

use crate::error::Result;
use crate::schema;
use crate::settings::load_settings;
use crate::sheet::{Sheet, Window};

pub fn run() -> Result<()> {
    let settings = load_settings();

    println!(
        "Daybook:    {}",
        if settings.daybook.is_empty() {
            "(not set)"
        } else {
            &settings.daybook
        }
    );
    println!("Targets:    {} companies", settings.targets.len());

    if settings.daybook.is_empty() {
        println!();
        println!("No daybook registered. Run `munim load <file>` to get started.");
        return Ok(());
    }

    let path = std::path::PathBuf::from(&settings.daybook);
    if !path.exists() {
        println!();
        println!("Daybook file not found. Run `munim load <file>` to point at a new one.");
        return Ok(());
    }

    let sheet = Sheet::load(&path, Window::reporting())?;

    let company_col = sheet.col(schema::COL_COMPANY);
    let branch_col = sheet.col(schema::COL_BRANCH);
    let staff_col = sheet.col(schema::COL_STAFF);

    let mut companies = BTreeSet::new();
    let mut branches = BTreeSet::new();
    let mut staff = BTreeSet::new();
    for row in &sheet.rows {
        let company = row.cell(company_col).trim();
        if !company.is_empty() {
            companies.insert(company.to_uppercase());
        }
        let branch = row.cell(branch_col).trim();
        if !branch.is_empty() {
            branches.insert(branch.to_uppercase());
        }
        let name = row.cell(staff_col).trim();
        if !name.is_empty() {
            staff.insert(name.to_uppercase());
        }
    }

    println!("Window:     {}", sheet.window);

    println!();
    println!("Rows:       {}", sheet.rows.len());
    println!("Dropped:    {}", sheet.dropped);
    println!("Companies:  {}", companies.len());
    println!("Branches:   {}", branches.len());
    println!("Staff:      {}", staff.len());

    Ok(())
}
