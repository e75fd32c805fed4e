use std::fs;

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const COLUMNS: &[&str] = &[
    "DATE",
    "BRANCH",
    "STAFF NAME",
    "CUSTOMER NAME",
    "COMPANY NAME",
    "STATUS",
    "FRESH/OLD",
    "SML NCD INF",
    "SML SD INF",
    "SML GB INF",
    "VFL NCD INF",
    "VFL SD INF",
    "VFL GB INF",
    "SNL FD INF",
    "LLP INF",
    "VFL NCD OUT",
    "VFL BD OUT",
    "SML PURCHASE",
    "SML NCD OUT",
    "SML SD OUT",
    "SML GB OUT",
    "LLP OUT",
    "INF Total",
    "OUT Total",
    "Net",
];

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Result<Fixture> {
        Ok(Fixture {
            dir: TempDir::new()?,
        })
    }

    fn write_csv(&self, name: &str, header: &str, rows: &[String]) -> Result<String> {
        let path = self.dir.path().join(name);
        let mut text = header.to_string();
        text.push('\n');
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        fs::write(&path, text)?;
        Ok(path.to_string_lossy().to_string())
    }

    fn write_daybook(&self, rows: &[String]) -> Result<String> {
        self.write_csv("daybook.csv", &COLUMNS.join(","), rows)
    }

    /// Every invocation gets its HOME pointed at the temp dir so settings
    /// stay isolated per test.
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("munim").unwrap();
        cmd.env("HOME", self.dir.path());
        cmd
    }
}

/// One daybook line with the inflow landing in SML NCD INF and the outflow
/// in SML PURCHASE.
#[allow(clippy::too_many_arguments)]
fn row(
    date: &str,
    branch: &str,
    staff: &str,
    customer: &str,
    company: &str,
    status: &str,
    tag: &str,
    inflow: f64,
    outflow: f64,
) -> String {
    let mut cells = vec![String::new(); COLUMNS.len()];
    cells[0] = date.into();
    cells[1] = branch.into();
    cells[2] = staff.into();
    cells[3] = customer.into();
    cells[4] = company.into();
    cells[5] = status.into();
    cells[6] = tag.into();
    if inflow != 0.0 {
        cells[7] = format!("{inflow}");
    }
    if outflow != 0.0 {
        cells[17] = format!("{outflow}");
    }
    cells[22] = format!("{inflow}");
    cells[23] = format!("{outflow}");
    cells[24] = format!("{}", inflow - outflow);
    cells.join(",")
}

fn sample_rows() -> Vec<String> {
    vec![
        row(
            "05/04/2025",
            "KOCHI",
            "ANITHA MENON",
            "MARIYAMMA CHACKO",
            "SML FINANCE LTD",
            "",
            "FRESH CUSTOMER",
            1500.0,
            0.0,
        ),
        row(
            "18/04/2025",
            "KOCHI",
            "ANITHA MENON",
            "KP VARKEY",
            "SML FINANCE LTD",
            "",
            "OLD",
            300.0,
            150.0,
        ),
        row(
            "07/05/2025",
            "TRISSUR",
            "BINU THOMAS",
            "SOSAMMA PHILIP",
            "BRD FINANCE LTD",
            "RESIGNED",
            "OLD CUSTOMER",
            0.0,
            400.0,
        ),
    ]
}

#[test]
fn test_no_daybook_configured() -> Result<()> {
    let fx = Fixture::new()?;
    fx.cmd()
        .args(["report", "flows"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No daybook configured"));
    Ok(())
}

#[test]
fn test_flows_with_file_flag() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args(["report", "flows", "--file", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 unique rows"))
        .stdout(predicate::str::contains("SML FINANCE LTD"))
        .stdout(predicate::str::contains("1,800.00"));
    Ok(())
}

#[test]
fn test_load_registers_daybook() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args(["load", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered"))
        .stdout(predicate::str::contains("3 rows"));

    fx.cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("daybook.csv"))
        .stdout(predicate::str::contains("Rows:"));

    // Reports no longer need --file.
    fx.cmd()
        .args(["report", "flows"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BRD FINANCE LTD"));
    Ok(())
}

#[test]
fn test_load_missing_file() -> Result<()> {
    let fx = Fixture::new()?;
    fx.cmd()
        .args(["load", "/no/such/daybook.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Daybook not found"));
    Ok(())
}

#[test]
fn test_dump_company_filter_is_case_insensitive() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args(["dump", "--file", &file, "--company", "brd finance ltd"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BINU THOMAS"))
        .stdout(predicate::str::contains("ANITHA MENON").not());
    Ok(())
}

#[test]
fn test_dump_empty_scope() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args(["dump", "--file", &file, "--branch", "NOWHERE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No rows found."));
    Ok(())
}

#[test]
fn test_from_without_to_rejected() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args(["report", "branches", "--file", &file, "--from", "2025-04-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--from requires --to"));
    Ok(())
}

#[test]
fn test_bad_date_flag_rejected() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args([
            "report", "branches", "--file", &file, "--from", "04/05/2025", "--to", "2025-05-31",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected YYYY-MM-DD"));
    Ok(())
}

#[test]
fn test_rank_top5() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args(["report", "rank", "--file", &file, "--company", "all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Top 5 Branches by Net"))
        .stdout(predicate::str::contains("KOCHI"));
    Ok(())
}

#[test]
fn test_rank_unknown_view() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args([
            "report", "rank", "--file", &file, "--company", "all", "--view", "middle",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown view 'middle'"));
    Ok(())
}

#[test]
fn test_rank_growth_needs_single_month() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args([
            "report", "rank", "--file", &file, "--company", "all", "--view", "growth",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("single --month"));
    Ok(())
}

#[test]
fn test_gainers_marks_resigned() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args(["report", "gainers", "--file", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("Top Gainers"))
        .stdout(predicate::str::contains("ANITHA MENON"))
        .stdout(predicate::str::contains("(resigned)"));
    Ok(())
}

#[test]
fn test_targets_report_uses_defaults() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args(["report", "targets", "--file", &file, "--month", "2025-04"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SML FINANCE LTD"))
        .stdout(predicate::str::contains("50,00,000"));
    Ok(())
}

#[test]
fn test_targets_set_and_list() -> Result<()> {
    let fx = Fixture::new()?;
    fx.cmd()
        .args(["targets", "set", "vfl", "750000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VANCHINAD FINANCE (P) LTD"))
        .stdout(predicate::str::contains("7,50,000"));
    fx.cmd()
        .args(["targets", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("7,50,000"));
    Ok(())
}

#[test]
fn test_targets_set_unknown_company() -> Result<()> {
    let fx = Fixture::new()?;
    fx.cmd()
        .args(["targets", "set", "ACME BANK", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown company"));
    Ok(())
}

#[test]
fn test_summary_missing_columns() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_csv(
        "summary.csv",
        "DATE,COMPANY NAME,TOTAL INFLOW",
        &["April 2025,SML FINANCE LTD,5000".to_string()],
    )?;
    fx.cmd()
        .args(["report", "summary", "--file", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required columns"))
        .stderr(predicate::str::contains("Total Outflow"));
    Ok(())
}

#[test]
fn test_summary_accepts_alias_headers() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_csv(
        "summary.csv",
        "DATE,COMPANY NAME,INF Total,OUT Total,Net",
        &[
            "April 2025,SML FINANCE LTD,5000,1000,4000".to_string(),
            "May 2025,BRD FINANCE LTD,2000,500,1500".to_string(),
        ],
    )?;
    fx.cmd()
        .args(["report", "summary", "--file", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("Monthly Company Summary"))
        .stdout(predicate::str::contains("April 2025"))
        .stdout(predicate::str::contains("7,000"));
    Ok(())
}

#[test]
fn test_check_reports_header_health() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args(["check", "--file", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("Header Audit"))
        .stdout(predicate::str::contains("fresh-old"));
    Ok(())
}

#[test]
fn test_check_flags_missing_columns() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_csv(
        "thin.csv",
        "DATE,BRANCH,INF Total",
        &["05/04/2025,KOCHI,100".to_string()],
    )?;
    fx.cmd()
        .args(["check", "--file", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("missing"))
        .stdout(predicate::str::contains("STAFF NAME"));
    Ok(())
}

#[test]
fn test_demo_output_feeds_reports() -> Result<()> {
    let fx = Fixture::new()?;
    let out = fx.dir.path().join("demo.csv");
    let out = out.to_string_lossy().to_string();
    fx.cmd()
        .args(["demo", "--output", &out])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample daybook written"));

    fx.cmd()
        .args(["check", "--file", &out])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));

    fx.cmd()
        .args(["report", "fresh-old", "--file", &out])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fresh"));
    Ok(())
}

#[test]
fn test_staff_report() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args(["report", "staff", "ANITHA MENON", "--file", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("ANITHA MENON"))
        .stdout(predicate::str::contains("Customers"));
    Ok(())
}

#[test]
fn test_resigned_report() -> Result<()> {
    let fx = Fixture::new()?;
    let file = fx.write_daybook(&sample_rows())?;
    fx.cmd()
        .args(["report", "resigned", "--file", &file])
        .assert()
        .success()
        .stdout(predicate::str::contains("BINU THOMAS").or(predicate::str::contains("Resigned")));
    Ok(())
}

#[test]
fn test_completions_emit_script() -> Result<()> {
    let fx = Fixture::new()?;
    fx.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("munim"));
    Ok(())
}

#[test]
fn test_empty_daybook_rejected() -> Result<()> {
    let fx = Fixture::new()?;
    let path = fx.dir.path().join("empty.csv");
    fs::write(&path, "")?;
    let file = path.to_string_lossy().to_string();
    fx.cmd()
        .args(["report", "flows", "--file", &file])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
    Ok(())
}
