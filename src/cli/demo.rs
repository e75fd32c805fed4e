use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fmt::inr;
use crate::schema;
use crate::sheet::Window;

/// One field agent of the sample daybook.
struct DemoStaff {
    name: &'static str,
    branch: &'static str,
    company: &'static str,
    resigned: bool,
}

const STAFF: &[DemoStaff] = &[
    DemoStaff { name: "ANITHA MENON", branch: "KOCHI", company: "SML FINANCE LTD", resigned: false },
    DemoStaff { name: "BINU THOMAS", branch: "TRISSUR", company: "BRD FINANCE LTD", resigned: false },
    DemoStaff { name: "CLARA VARGHESE", branch: "KOLLAM", company: "VANCHINAD FINANCE (P) LTD", resigned: false },
    DemoStaff { name: "DEEPAK NAIR", branch: "KOCHI", company: "SANGEETH NIDHI LTD", resigned: false },
    DemoStaff { name: "ELSAMMA JOSE", branch: "KOTTAYAM", company: "SML FINANCE LTD", resigned: true },
    DemoStaff { name: "FIROZ KHAN", branch: "TRISSUR", company: "BRD FINANCE LTD", resigned: false },
    DemoStaff { name: "GEETHA KUMARI", branch: "", company: "VANCHINAD FINANCE (P) LTD", resigned: false },
    DemoStaff { name: "HARI PRASAD", branch: "KOLLAM", company: "SML FINANCE LTD", resigned: false },
];

/// Resigned staff stop producing rows after this many months of the window.
const RESIGNED_ACTIVE_MONTHS: usize = 4;

const CUSTOMERS: &[&str] = &[
    "MARIYAMMA CHACKO",
    "KP VARKEY",
    "SOSAMMA PHILIP",
    "ABDUL RAHIM",
    "THRESIAMMA JOSEPH",
    "GOPALAN NAIR",
    "ALICE MATHEW",
    "SUKUMARAN PILLAI",
    "FATHIMA BEEVI",
    "CHERIYAN KURIAKOSE",
    "LALITHA DEVI",
    "OUSEPH VAREED",
];

/// FRESH/OLD tags rotated across rows. The empty tag lands on redemption
/// rows, which real clerks leave untagged.
const TAGS: &[&str] = &[
    "FRESH CUSTOMER",
    "OLD",
    "OLD CUSTOMER",
    "FRESH CUSTOMER/FRESH STAFF",
    "",
];

/// Inflow product column and base amount, rotated per row.
const INFLOWS: &[(&str, f64)] = &[
    ("SML NCD INF", 250_000.0),
    ("VFL NCD INF", 180_000.0),
    ("SNL FD INF", 90_000.0),
    ("SML SD INF", 140_000.0),
    ("LLP INF", 60_000.0),
    ("VFL GB INF", 120_000.0),
];

/// Outflow product column and base amount.
const OUTFLOWS: &[(&str, f64)] = &[
    ("SML PURCHASE", 70_000.0),
    ("VFL NCD OUT", 40_000.0),
    ("SML NCD OUT", 55_000.0),
    ("LLP OUT", 25_000.0),
];

/// Lines the ingest pass must drop: an impossible date, a dateless note and
/// a row from before the reporting window.
const MALFORMED: &[&str] = &[
    "31/02/2026,KOCHI,ANITHA MENON,MALABAR TILES,SML FINANCE LTD,,OLD",
    "pending,TRISSUR,BINU THOMAS,KP STORES,BRD FINANCE LTD,,OLD",
    "15/03/2024,KOLLAM,HARI PRASAD,OLD LEDGER ROW,SML FINANCE LTD,,OLD",
];

/// Full daybook header: the seven dimension columns, every product column
/// and the three row totals.
fn header() -> Vec<String> {
    let mut cols: Vec<String> = [
        schema::COL_DATE,
        schema::COL_BRANCH,
        schema::COL_STAFF,
        schema::COL_CUSTOMER,
        schema::COL_COMPANY,
        schema::COL_STATUS,
        schema::COL_FRESH_OLD,
    ]
    .iter()
    .map(|c| c.to_string())
    .collect();
    cols.extend(schema::INF_COLUMNS.iter().map(|c| c.to_string()));
    cols.extend(schema::OUT_COLUMNS.iter().map(|c| c.to_string()));
    cols.push(schema::COL_INF_TOTAL.to_string());
    cols.push(schema::COL_OUT_TOTAL.to_string());
    cols.push(schema::COL_NET.to_string());
    cols
}

/// Render an amount cell the way exported sheets carry them: Indian
/// grouping, quoted once commas appear.
fn amount_cell(val: f64) -> String {
    if val.abs() >= 1000.0 {
        format!("\"{}\"", inr(val))
    } else {
        format!("{val}")
    }
}

/// Build the demo rows, two per staff per month across the reporting
/// window. Everything is keyed off a row index so repeated runs produce
/// the same file.
fn generate_rows() -> Vec<Vec<String>> {
    let header = header();
    let width = header.len();
    let col = |name: &str| header.iter().position(|h| h == name).unwrap();
    let inf_total_col = col(schema::COL_INF_TOTAL);
    let out_total_col = col(schema::COL_OUT_TOTAL);
    let net_col = col(schema::COL_NET);

    let mut rows = Vec::new();
    for (mi, month) in Window::reporting().months().iter().enumerate() {
        for (si, staff) in STAFF.iter().enumerate() {
            if staff.resigned && mi >= RESIGNED_ACTIVE_MONTHS {
                continue;
            }
            for j in 0..2usize {
                let idx = (mi * STAFF.len() + si) * 2 + j;
                let day = 3 + (idx * 7) % 24;
                let vary = 1.0 + ((idx % 9) as f64 - 4.0) * 0.05;

                let inflow = if idx % 5 == 4 {
                    0.0
                } else {
                    let (_, base) = INFLOWS[idx % INFLOWS.len()];
                    (base * vary).round()
                };
                let outflow = if idx % 3 == 0 || idx % 5 == 4 {
                    let (_, base) = OUTFLOWS[idx % OUTFLOWS.len()];
                    (base * vary).round()
                } else {
                    0.0
                };

                let mut cells = vec![String::new(); width];
                cells[0] = format!("{:02}/{:02}/{}", day, month.month, month.year);
                cells[1] = staff.branch.to_string();
                cells[2] = staff.name.to_string();
                cells[3] = CUSTOMERS[(si * 3 + mi + j * 5) % CUSTOMERS.len()].to_string();
                cells[4] = staff.company.to_string();
                if staff.resigned {
                    cells[5] = schema::STATUS_RESIGNED.to_string();
                }
                cells[6] = TAGS[idx % TAGS.len()].to_string();
                if inflow != 0.0 {
                    cells[col(INFLOWS[idx % INFLOWS.len()].0)] = amount_cell(inflow);
                }
                if outflow != 0.0 {
                    cells[col(OUTFLOWS[idx % OUTFLOWS.len()].0)] = amount_cell(outflow);
                }
                cells[inf_total_col] = amount_cell(inflow);
                cells[out_total_col] = amount_cell(outflow);
                cells[net_col] = amount_cell(inflow - outflow);
                rows.push(cells);
            }
        }
    }
    rows
}

fn render_csv() -> String {
    let mut out = String::new();
    out.push_str(&header().join(","));
    out.push('\n');
    for cells in generate_rows() {
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    for line in MALFORMED {
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn write_daybook(path: &Path) -> Result<usize> {
    let rows = generate_rows().len();
    std::fs::write(path, render_csv())?;
    Ok(rows)
}

pub fn run(output: Option<String>) -> Result<()> {
    let path = PathBuf::from(output.unwrap_or_else(|| "munim-demo.csv".to_string()));
    let rows = write_daybook(&path)?;

    println!(
        "Sample daybook written to {} ({} rows, plus {} malformed lines ingest will drop)",
        path.display(),
        rows,
        MALFORMED.len()
    );
    println!();
    println!("Try these next:");
    println!("  munim load {}", path.display());
    println!("  munim check");
    println!("  munim report flows");
    println!("  munim report rank --company all --view top5");
    println!("  munim report fresh-old");
    println!("  munim report gainers");

    Ok(())
}
