use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::schema;
use crate::sheet::Scope;

use super::load_sheet;

/// Audit the daybook header against every report's required columns.
pub fn run(file: Option<String>) -> Result<()> {
    let sheet = load_sheet(file.as_deref(), &Scope::default(), false)?;

    let mut table = Table::new();
    table.set_header(vec!["Report", "Status", "Missing Columns"]);

    let mut broken = 0;
    for (report, required) in schema::REPORT_REQUIREMENTS {
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|name| sheet.col(name).is_none())
            .collect();
        if missing.is_empty() {
            table.add_row(vec![
                Cell::new(*report),
                Cell::new("ok".green().to_string()),
                Cell::new(""),
            ]);
        } else {
            broken += 1;
            table.add_row(vec![
                Cell::new(*report),
                Cell::new("missing".red().to_string()),
                Cell::new(missing.join(", ")),
            ]);
        }
    }

    println!("Header Audit: {}\n{table}", sheet.path.display());

    let product_columns = sheet
        .headers
        .iter()
        .filter(|h| schema::parse_product_column(h).is_some())
        .count();
    println!();
    println!("Rows in window:    {}", sheet.rows.len());
    println!("Rows dropped:      {}", sheet.dropped);
    println!("Product columns:   {product_columns}");

    if broken > 0 {
        println!();
        let note = "Reports with missing columns still run; the absent columns simply \
                    contribute nothing. Only `report summary` aborts outright, and it reads \
                    its own file with Total Inflow / Total Outflow / NET / DATE headers \
                    (INF Total, OUT Total and Net are accepted as aliases).";
        println!("{}", textwrap::fill(note, 78));
    }
    Ok(())
}
