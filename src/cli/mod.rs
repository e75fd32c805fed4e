pub mod check;
pub mod completions;
pub mod demo;
pub mod dump;
pub mod load;
pub mod report;
pub mod status;
pub mod targets;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::error::{MunimError, Result};
use crate::settings;
use crate::sheet::{MonthKey, Scope, Sheet, Window};

// ---------------------------------------------------------------------------
// Shared flag plumbing
// ---------------------------------------------------------------------------

fn parse_date_flag(name: &str, raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        MunimError::Other(format!("Invalid --{name} '{raw}' (expected YYYY-MM-DD)"))
    })
}

/// Turn the common filter flags into a [`Scope`]. An unparseable `--month`
/// simply filters nothing; a half-open date range is a usage error.
pub(crate) fn build_scope(
    month: Option<String>,
    company: Option<String>,
    branch: Option<String>,
    staff: Option<String>,
    from_date: Option<String>,
    to_date: Option<String>,
) -> Result<Scope> {
    match (&from_date, &to_date) {
        (Some(_), None) => {
            return Err(MunimError::Other(
                "--from requires --to (both date boundaries must be specified)".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(MunimError::Other(
                "--to requires --from (both date boundaries must be specified)".to_string(),
            ));
        }
        _ => {}
    }
    let from = match from_date {
        Some(raw) => Some(parse_date_flag("from", &raw)?),
        None => None,
    };
    let to = match to_date {
        Some(raw) => Some(parse_date_flag("to", &raw)?),
        None => None,
    };
    Ok(Scope {
        month: month.as_deref().and_then(MonthKey::parse),
        company,
        branch,
        staff,
        from,
        to,
    })
}

/// Validity window for a report: an explicit date range overrides the
/// report's default window.
pub(crate) fn window_for(scope: &Scope, fiscal: bool) -> Window {
    if let (Some(from), Some(to)) = (scope.from, scope.to) {
        Window { start: from, end: to }
    } else if fiscal {
        Window::fiscal()
    } else {
        Window::reporting()
    }
}

/// The daybook file to read: `--file` wins, then the remembered path.
pub(crate) fn daybook_path(file: Option<&str>) -> Result<PathBuf> {
    if let Some(f) = file {
        return Ok(PathBuf::from(settings::shellexpand_path(f)));
    }
    let settings = settings::load_settings();
    if settings.daybook.is_empty() {
        return Err(MunimError::NoDaybook);
    }
    Ok(PathBuf::from(settings.daybook))
}

pub(crate) fn load_sheet(file: Option<&str>, scope: &Scope, fiscal: bool) -> Result<Sheet> {
    let path = daybook_path(file)?;
    Sheet::load(&path, window_for(scope, fiscal))
}

// ---------------------------------------------------------------------------
// Command tree
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "munim", about = "Deposit-mobilization reporting CLI for the group daybook.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remember a daybook CSV so later commands can omit --file.
    Load {
        /// Path to the daybook CSV export
        file: String,
    },
    /// Show settings and snapshot statistics for the remembered daybook.
    Status,
    /// Audit the daybook header against each report's required columns.
    Check {
        /// Daybook CSV (overrides the remembered file)
        #[arg(long)]
        file: Option<String>,
    },
    /// Print every validated daybook row.
    Dump {
        #[arg(long)]
        file: Option<String>,
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        branch: Option<String>,
        #[arg(long)]
        staff: Option<String>,
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
    },
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Manage monthly company targets.
    Targets {
        #[command(subcommand)]
        command: TargetsCommands,
    },
    /// Write a deterministic sample daybook to explore munim.
    Demo {
        /// Output path (default: munim-demo.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Print a shell completion script.
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Monthly company summary from a lenient summary sheet.
    Summary {
        #[arg(long)]
        file: Option<String>,
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        company: Option<String>,
    },
    /// Company inflow/outflow with duplicate-row stripping.
    Flows {
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        company: Option<String>,
    },
    /// Branch performance, with a per-staff drill-down via --branch.
    Branches {
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        branch: Option<String>,
        /// Start date: YYYY-MM-DD
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date: YYYY-MM-DD
        #[arg(long = "to")]
        to_date: Option<String>,
    },
    /// Branch ranker: top5, bottom5, growth, degrowth.
    Rank {
        #[arg(long)]
        file: Option<String>,
        /// Company to rank, or 'all'
        #[arg(long)]
        company: String,
        /// View: top5, bottom5, growth, degrowth
        #[arg(long, default_value = "top5")]
        view: String,
        #[arg(long)]
        month: Option<String>,
        #[arg(long = "from")]
        from_date: Option<String>,
        #[arg(long = "to")]
        to_date: Option<String>,
    },
    /// Staff gainers and losers by net.
    Gainers {
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        company: Option<String>,
    },
    /// Target vs. achievement per company and month.
    Targets {
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        company: Option<String>,
    },
    /// Employee participation: unique, new, and repeating staff.
    Participation {
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        company: Option<String>,
        /// Staff drill-down
        #[arg(long)]
        staff: Option<String>,
    },
    /// Fresh vs. old business over the fiscal year.
    FreshOld {
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        company: Option<String>,
    },
    /// Individual staff report over the fiscal year.
    Staff {
        /// Staff name
        staff: String,
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        month: Option<String>,
    },
    /// Resigned staff business.
    Resigned {
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        company: Option<String>,
    },
    /// Performer product study.
    Performers {
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        month: Option<String>,
        /// Minimum staff net to count as a performer
        #[arg(long = "min-net", default_value = "0")]
        min_net: f64,
    },
}

#[derive(Subcommand)]
pub enum TargetsCommands {
    /// List the configured monthly targets.
    List,
    /// Set the monthly target for a company.
    Set {
        /// Full company name, e.g. 'SML FINANCE LTD'
        company: String,
        /// Monthly target amount in rupees
        amount: f64,
    },
    /// Remove a company's target.
    Unset {
        /// Full company name
        company: String,
    },
}
