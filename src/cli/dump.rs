use comfy_table::{Cell, Table};

use crate::error::Result;
use crate::fmt::inr;
use crate::parse::parse_amount;
use crate::schema;

use super::{build_scope, load_sheet};

/// Print the ingested daybook rows after filtering, with amount columns
/// regrouped in Indian notation.
#[allow(clippy::too_many_arguments)]
pub fn run(
    file: Option<String>,
    month: Option<String>,
    company: Option<String>,
    branch: Option<String>,
    staff: Option<String>,
    from_date: Option<String>,
    to_date: Option<String>,
) -> Result<()> {
    let scope = build_scope(month, company, branch, staff, from_date, to_date)?;
    let sheet = load_sheet(file.as_deref(), &scope, false)?;

    let rows: Vec<_> = sheet.select(&scope).collect();
    if rows.is_empty() {
        println!("No rows found.");
        return Ok(());
    }

    let numeric: Vec<bool> = sheet
        .headers
        .iter()
        .map(|h| {
            schema::parse_product_column(h).is_some()
                || h.as_str() == schema::COL_INF_TOTAL
                || h.as_str() == schema::COL_OUT_TOTAL
                || h.as_str() == schema::COL_NET
        })
        .collect();
    let date_col = sheet.col(schema::COL_DATE);

    let mut table = Table::new();
    table.set_header(sheet.headers.clone());
    for row in &rows {
        let cells: Vec<Cell> = sheet
            .headers
            .iter()
            .enumerate()
            .map(|(i, _)| {
                if Some(i) == date_col {
                    Cell::new(row.date.format("%d/%m/%Y").to_string())
                } else if numeric[i] {
                    Cell::new(inr(parse_amount(row.cell(Some(i)))))
                } else {
                    Cell::new(row.cell(Some(i)))
                }
            })
            .collect();
        table.add_row(cells);
    }

    println!(
        "Daybook ({} rows, {} dropped)\n{table}",
        rows.len(),
        sheet.dropped
    );
    Ok(())
}
