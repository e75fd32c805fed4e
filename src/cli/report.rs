use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::error::{MunimError, Result};
use crate::fmt::{inr, inr_precise};
use crate::reports::{self, RankView};
use crate::schema::short_company;
use crate::settings::load_settings;

use super::{build_scope, daybook_path, load_sheet};

fn net_str(net: f64) -> String {
    if net >= 0.0 {
        inr(net).green().to_string()
    } else {
        inr(net).red().to_string()
    }
}

fn net_str_precise(net: f64) -> String {
    if net >= 0.0 {
        inr_precise(net).green().to_string()
    } else {
        inr_precise(net).red().to_string()
    }
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

pub fn summary(
    file: Option<String>,
    month: Option<String>,
    company: Option<String>,
) -> Result<()> {
    let scope = build_scope(month, company, None, None, None, None)?;
    let path = daybook_path(file.as_deref())?;
    let data = reports::summary(&path, &scope)?;

    if data.buckets.is_empty() {
        println!("No summary rows found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Month", "Company", "Inflow", "Outflow", "Net"]);
    for b in &data.buckets {
        table.add_row(vec![
            Cell::new(b.month.to_string()),
            Cell::new(&b.company),
            Cell::new(inr(b.totals.inflow)),
            Cell::new(inr(b.totals.outflow)),
            Cell::new(net_str(b.totals.net())),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(inr(data.grand.inflow)),
        Cell::new(inr(data.grand.outflow)),
        Cell::new(net_str(data.grand.net())),
    ]);
    println!("Monthly Company Summary\n{table}");
    Ok(())
}

// ---------------------------------------------------------------------------
// flows
// ---------------------------------------------------------------------------

pub fn flows(file: Option<String>, month: Option<String>, company: Option<String>) -> Result<()> {
    let scope = build_scope(month, company, None, None, None, None)?;
    let sheet = load_sheet(file.as_deref(), &scope, false)?;
    let data = reports::flows(&sheet, &scope);

    if data.unique_rows == 0 {
        println!("No rows found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Company", "Inflow", "Outflow", "Net"]);
    for c in &data.companies {
        table.add_row(vec![
            Cell::new(&c.company),
            Cell::new(inr_precise(c.totals.inflow)),
            Cell::new(inr_precise(c.totals.outflow)),
            Cell::new(net_str_precise(c.totals.net())),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(inr_precise(data.overall.inflow)),
        Cell::new(inr_precise(data.overall.outflow)),
        Cell::new(net_str_precise(data.overall.net())),
    ]);
    println!(
        "Company Inflow & Outflow ({} unique rows)\n{table}",
        data.unique_rows
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// branches
// ---------------------------------------------------------------------------

pub fn branches(
    file: Option<String>,
    month: Option<String>,
    branch: Option<String>,
    from_date: Option<String>,
    to_date: Option<String>,
) -> Result<()> {
    let scope = build_scope(month, None, branch, None, from_date, to_date)?;
    let sheet = load_sheet(file.as_deref(), &scope, false)?;
    let data = reports::branches(&sheet, &scope);

    if data.branches.is_empty() {
        println!("No rows found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Branch", "Inflow", "Outflow", "Net"]);
    for b in &data.branches {
        table.add_row(vec![
            Cell::new(&b.branch),
            Cell::new(inr(b.totals.inflow)),
            Cell::new(inr(b.totals.outflow)),
            Cell::new(net_str(b.totals.net())),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(inr(data.overall.inflow)),
        Cell::new(inr(data.overall.outflow)),
        Cell::new(net_str(data.overall.net())),
    ]);
    println!("Branch Performance\n{table}");

    if let Some(drill) = &data.drilldown {
        if drill.staff.is_empty() {
            println!("\nNo rows for branch '{}'.", drill.branch);
        } else {
            let mut stable = Table::new();
            stable.set_header(vec!["Staff", "Inflow", "Outflow", "Net"]);
            for s in &drill.staff {
                stable.add_row(vec![
                    Cell::new(&s.staff),
                    Cell::new(inr(s.totals.inflow)),
                    Cell::new(inr(s.totals.outflow)),
                    Cell::new(net_str(s.totals.net())),
                ]);
            }
            println!("\nStaff at {}\n{stable}", drill.branch);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// rank
// ---------------------------------------------------------------------------

pub fn rank(
    file: Option<String>,
    company: String,
    view: String,
    month: Option<String>,
    from_date: Option<String>,
    to_date: Option<String>,
) -> Result<()> {
    let view = match view.as_str() {
        "top5" => RankView::Top,
        "bottom5" => RankView::Bottom,
        "growth" => RankView::Growth,
        "degrowth" => RankView::Degrowth,
        other => {
            return Err(MunimError::Other(format!(
                "Unknown view '{other}' (expected top5, bottom5, growth, degrowth)"
            )));
        }
    };
    let company_filter = if company.trim().eq_ignore_ascii_case("all") {
        None
    } else {
        Some(company)
    };
    let scope = build_scope(month, company_filter, None, None, from_date, to_date)?;
    let sheet = load_sheet(file.as_deref(), &scope, false)?;
    let data = reports::rank(&sheet, &scope, view);

    if data.fell_back {
        eprintln!(
            "{}",
            "growth views need a single --month; showing the plain net ranking instead".yellow()
        );
    }
    if data.entries.is_empty() {
        println!("No branches qualify.");
        return Ok(());
    }

    let title = match view {
        RankView::Top => "Top 5 Branches by Net",
        RankView::Bottom => "Bottom 5 Branches by Net",
        RankView::Growth => "Branch Growth vs. Previous Month",
        RankView::Degrowth => "Branch Degrowth vs. Previous Month",
    };

    let mut table = Table::new();
    table.set_header(vec!["#", "Company", "Branch", "Inflow", "Outflow", "Net", "Prev Net", "Change"]);
    for (i, e) in data.entries.iter().enumerate() {
        let (prev, change) = match e.prev_net {
            Some(p) => (inr(p), net_str(e.totals.net() - p)),
            None => ("-".to_string(), "-".to_string()),
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(short_company(&e.company)),
            Cell::new(&e.branch),
            Cell::new(inr(e.totals.inflow)),
            Cell::new(inr(e.totals.outflow)),
            Cell::new(net_str(e.totals.net())),
            Cell::new(prev),
            Cell::new(change),
        ]);
    }
    println!("{title}\n{table}");
    Ok(())
}

// ---------------------------------------------------------------------------
// gainers
// ---------------------------------------------------------------------------

fn standing_rows(table: &mut Table, list: &[reports::StaffStanding]) {
    for (i, s) in list.iter().enumerate() {
        let name = if s.resigned {
            format!("{} (resigned)", s.staff).red().to_string()
        } else {
            s.staff.clone()
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(name),
            Cell::new(short_company(&s.company)),
            Cell::new(net_str(s.net)),
        ]);
    }
}

pub fn gainers(file: Option<String>, month: Option<String>, company: Option<String>) -> Result<()> {
    let scope = build_scope(month, company, None, None, None, None)?;
    let sheet = load_sheet(file.as_deref(), &scope, false)?;
    if sheet.select(&scope).next().is_none() {
        println!("No rows found.");
        return Ok(());
    }
    let data = reports::gainers(&sheet, &scope);

    if data.gainers.is_empty() {
        println!("Top Gainers\nNone.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["#", "Staff", "Company", "Net"]);
        standing_rows(&mut table, &data.gainers);
        println!("Top Gainers\n{table}");
    }

    if data.losers.is_empty() {
        println!("\nTop Losers\nNone.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["#", "Staff", "Company", "Net"]);
        standing_rows(&mut table, &data.losers);
        println!("\nTop Losers\n{table}");
    }

    if data.all_gainers.len() > data.gainers.len() {
        let mut table = Table::new();
        table.set_header(vec!["#", "Staff", "Company", "Net"]);
        standing_rows(&mut table, &data.all_gainers);
        println!("\nAll Gainers ({})\n{table}", data.all_gainers.len());
    }
    if data.all_losers.len() > data.losers.len() {
        let mut table = Table::new();
        table.set_header(vec!["#", "Staff", "Company", "Net"]);
        standing_rows(&mut table, &data.all_losers);
        println!("\nAll Losers ({})\n{table}", data.all_losers.len());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// targets
// ---------------------------------------------------------------------------

pub fn targets(file: Option<String>, month: Option<String>, company: Option<String>) -> Result<()> {
    let scope = build_scope(month, company, None, None, None, None)?;
    let sheet = load_sheet(file.as_deref(), &scope, false)?;
    let settings = load_settings();
    let data = reports::targets(&sheet, &scope, &settings.targets);

    if data.cells.is_empty() {
        println!("No targets configured. Run `munim targets set <COMPANY> <AMOUNT>`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Company", "Month", "Target", "Achieved", "%", "Shortfall"]);
    for c in &data.cells {
        let pct = c.achieved_pct();
        let pct_str = if pct >= 100.0 {
            format!("{pct:.1}%").green().to_string()
        } else {
            format!("{pct:.1}%").normal().to_string()
        };
        table.add_row(vec![
            Cell::new(short_company(&c.company)),
            Cell::new(c.month.to_string()),
            Cell::new(inr(c.target)),
            Cell::new(net_str(c.achieved)),
            Cell::new(pct_str),
            Cell::new(inr(c.shortfall())),
        ]);
    }
    println!("Target vs. Achievement\n{table}");
    Ok(())
}

// ---------------------------------------------------------------------------
// participation
// ---------------------------------------------------------------------------

pub fn participation(
    file: Option<String>,
    month: Option<String>,
    company: Option<String>,
    staff: Option<String>,
) -> Result<()> {
    let scope = build_scope(month, company, None, staff, None, None)?;
    let sheet = load_sheet(file.as_deref(), &scope, false)?;
    let data = reports::participation(&sheet, &scope);

    if data.buckets.is_empty() {
        println!("No rows found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Month", "Company", "Unique", "New", "New %", "Repeating", "Repeating %", "Inflow", "Net",
    ]);
    for b in &data.buckets {
        table.add_row(vec![
            Cell::new(b.month.to_string()),
            Cell::new(short_company(&b.company)),
            Cell::new(b.unique_staff),
            Cell::new(b.new_staff),
            Cell::new(format!("{:.2}%", b.new_pct())),
            Cell::new(b.repeating_staff),
            Cell::new(format!("{:.2}%", b.repeating_pct())),
            Cell::new(inr(b.totals.inflow)),
            Cell::new(net_str(b.totals.net())),
        ]);
    }
    println!("Employee Participation\n{table}");

    if let Some((staff, entries)) = &data.drilldown {
        if entries.is_empty() {
            println!("\nNo rows for staff '{staff}'.");
        } else {
            let mut dtable = Table::new();
            dtable.set_header(vec!["Month", "Company", "Inflow", "Outflow", "Net"]);
            for e in entries {
                dtable.add_row(vec![
                    Cell::new(e.month.to_string()),
                    Cell::new(short_company(&e.company)),
                    Cell::new(inr(e.totals.inflow)),
                    Cell::new(inr(e.totals.outflow)),
                    Cell::new(net_str(e.totals.net())),
                ]);
            }
            println!("\nParticipation of {staff}\n{dtable}");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// fresh-old
// ---------------------------------------------------------------------------

pub fn fresh_old(file: Option<String>, month: Option<String>, company: Option<String>) -> Result<()> {
    let scope = build_scope(month, company, None, None, None, None)?;
    let sheet = load_sheet(file.as_deref(), &scope, true)?;
    let data = reports::fresh_old(&sheet, &scope);

    if data.monthly.is_empty() {
        println!("No rows found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Business", "Inflow", "Net", "Customers"]);
    table.add_row(vec![
        Cell::new("Fresh".green().bold()),
        Cell::new(inr(data.fresh.inflow)),
        Cell::new(net_str(data.fresh.net())),
        Cell::new(data.fresh_customers),
    ]);
    table.add_row(vec![
        Cell::new("Old"),
        Cell::new(inr(data.old.inflow)),
        Cell::new(net_str(data.old.net())),
        Cell::new(data.old_customers),
    ]);
    println!("Fresh vs. Old Business ({})\n{table}", sheet.window);
    println!("Customers brought by fresh staff: {}", data.fresh_staff_customers);

    if !data.staff_fresh.is_empty() {
        let mut stable = Table::new();
        stable.set_header(vec!["Staff", "Fresh Customers", "Inflow", "Avg Inflow"]);
        for s in &data.staff_fresh {
            stable.add_row(vec![
                Cell::new(&s.staff),
                Cell::new(s.customers),
                Cell::new(inr(s.inflow)),
                Cell::new(inr(s.average_inflow())),
            ]);
        }
        println!("\nFresh Customers by Staff\n{stable}");
    }

    let mut mtable = Table::new();
    mtable.set_header(vec![
        "Month", "Fresh Inflow", "Fresh Net", "Fresh Cust", "Fresh Staff Cust", "Old Inflow", "Old Net",
    ]);
    for m in &data.monthly {
        mtable.add_row(vec![
            Cell::new(m.month.to_string()),
            Cell::new(inr(m.fresh.inflow)),
            Cell::new(net_str(m.fresh.net())),
            Cell::new(m.fresh_customers),
            Cell::new(m.fresh_staff_customers),
            Cell::new(inr(m.old.inflow)),
            Cell::new(net_str(m.old.net())),
        ]);
    }
    println!("\nMonthly Trend (whole window)\n{mtable}");

    if !data.companies.is_empty() {
        let mut ctable = Table::new();
        ctable.set_header(vec!["Company", "Fresh Inflow", "Fresh Net", "Old Inflow", "Old Net"]);
        for c in &data.companies {
            ctable.add_row(vec![
                Cell::new(short_company(&c.company)),
                Cell::new(inr(c.fresh.inflow)),
                Cell::new(net_str(c.fresh.net())),
                Cell::new(inr(c.old.inflow)),
                Cell::new(net_str(c.old.net())),
            ]);
        }
        println!("\nCompany-wise Split\n{ctable}");
    }

    let note = "Rows tagged FRESH CUSTOMER or FRESH CUSTOMER/FRESH STAFF count as fresh; \
                OLD, OLD CUSTOMER, blank, and FRESH CUSTOMER/MINIMUM AMT NIL count as old. \
                Rows with any other tag are left out of the split.";
    println!("\n{}", textwrap::fill(note, 78));
    Ok(())
}

// ---------------------------------------------------------------------------
// staff
// ---------------------------------------------------------------------------

pub fn staff(staff: String, file: Option<String>, month: Option<String>) -> Result<()> {
    let scope = build_scope(month, None, None, Some(staff.clone()), None, None)?;
    let sheet = load_sheet(file.as_deref(), &scope, true)?;
    let data = reports::staff_report(&sheet, &scope);

    if data.monthly.is_empty() {
        println!("No rows found for staff '{staff}'.");
        return Ok(());
    }

    println!("Staff Report: {staff}");
    println!("Window:     {}", sheet.window);
    println!("Inflow:     {}", inr(data.totals.inflow));
    println!("Outflow:    {}", inr(data.totals.outflow));
    println!("Net:        {}", net_str(data.totals.net()));
    println!("Customers:  {}", data.customer_count);
    println!("Churn rate: {:.2}%", data.churn_pct);

    if !data.fresh_customers.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Fresh Customer", "Inflow"]);
        for c in &data.fresh_customers {
            table.add_row(vec![Cell::new(&c.customer), Cell::new(inr(c.inflow))]);
        }
        println!("\nFresh Customers\n{table}");
    }

    if !data.repeat_customers.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Repeat Customer", "Transactions", "Net"]);
        for c in &data.repeat_customers {
            table.add_row(vec![
                Cell::new(&c.customer),
                Cell::new(c.transactions),
                Cell::new(net_str(c.net)),
            ]);
        }
        println!("\nRepeat Customers\n{table}");
    }

    let mut mtable = Table::new();
    mtable.set_header(vec!["Month", "Inflow", "Outflow", "Net", "Cumulative Net"]);
    for m in &data.monthly {
        mtable.add_row(vec![
            Cell::new(m.month.to_string()),
            Cell::new(inr(m.totals.inflow)),
            Cell::new(inr(m.totals.outflow)),
            Cell::new(net_str(m.totals.net())),
            Cell::new(net_str(m.cumulative_net)),
        ]);
    }
    println!("\nMonthly Breakup\n{mtable}");

    if !data.products.is_empty() {
        let mut ptable = Table::new();
        ptable.set_header(vec!["Company", "Product", "Inflow", "Outflow", "Net"]);
        for p in &data.products {
            ptable.add_row(vec![
                Cell::new(&p.company),
                Cell::new(&p.product),
                Cell::new(inr(p.totals.inflow)),
                Cell::new(inr(p.totals.outflow)),
                Cell::new(net_str(p.totals.net())),
            ]);
        }
        println!("\nProduct Breakdown\n{ptable}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// resigned
// ---------------------------------------------------------------------------

pub fn resigned(file: Option<String>, month: Option<String>, company: Option<String>) -> Result<()> {
    let scope = build_scope(month, company, None, None, None, None)?;
    let sheet = load_sheet(file.as_deref(), &scope, false)?;
    let data = reports::resigned(&sheet, &scope);

    if data.overall_staff == 0 {
        println!("No resigned staff rows found.");
        return Ok(());
    }

    println!("Resigned Staff Business");
    println!("Window:  {}", sheet.window);
    println!("Inflow:  {}", inr(data.overall.inflow));
    println!("Outflow: {}", inr(data.overall.outflow));
    println!("Net:     {}", net_str(data.overall.net()));
    println!("Staff:   {}", data.overall_staff);

    if data.companies.is_empty() {
        println!("\nNo resigned rows match the filters.");
        return Ok(());
    }

    let mut ctable = Table::new();
    ctable.set_header(vec!["Company", "Inflow", "Outflow", "Net", "Staff"]);
    for c in &data.companies {
        ctable.add_row(vec![
            Cell::new(short_company(&c.company)),
            Cell::new(inr(c.totals.inflow)),
            Cell::new(inr(c.totals.outflow)),
            Cell::new(net_str(c.totals.net())),
            Cell::new(c.staff),
        ]);
    }
    println!("\nCompany-wise Summary\n{ctable}");

    let mut mtable = Table::new();
    mtable.set_header(vec!["Month", "Inflow", "Outflow", "Net"]);
    for m in &data.monthly {
        mtable.add_row(vec![
            Cell::new(m.month.to_string()),
            Cell::new(inr(m.totals.inflow)),
            Cell::new(inr(m.totals.outflow)),
            Cell::new(net_str(m.totals.net())),
        ]);
    }
    println!("\nMonthly Breakup\n{mtable}");
    Ok(())
}

// ---------------------------------------------------------------------------
// performers
// ---------------------------------------------------------------------------

pub fn performers(file: Option<String>, month: Option<String>, min_net: f64) -> Result<()> {
    let scope = build_scope(month, None, None, None, None, None)?;
    let sheet = load_sheet(file.as_deref(), &scope, false)?;
    let data = reports::performers(&sheet, &scope, min_net);

    if data.performers.is_empty() {
        println!("No staff meet the {} net threshold.", inr(data.min_net));
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Staff", "Net"]);
    for (i, p) in data.performers.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&p.staff),
            Cell::new(net_str(p.net)),
        ]);
    }
    println!("Performers (net >= {})\n{table}", inr(data.min_net));
    println!("Total inflow: {}", inr(data.total_inflow));
    println!("Total net:    {}", net_str(data.total_net));

    if !data.products.is_empty() {
        let mut ptable = Table::new();
        ptable.set_header(vec!["Product", "Inflow", "Outflow", "Net", "Contribution"]);
        for p in &data.products {
            ptable.add_row(vec![
                Cell::new(&p.product),
                Cell::new(inr(p.totals.inflow)),
                Cell::new(inr(p.totals.outflow)),
                Cell::new(net_str(p.totals.net())),
                Cell::new(format!("{:.2}%", p.contribution_pct)),
            ]);
        }
        println!("\nProduct Mix\n{ptable}");
    }
    Ok(())
}
