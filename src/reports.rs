use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{MunimError, Result};
use crate::parse;
use crate::schema::{self, FlowSide};
use crate::sheet::{month_from_name, MonthKey, Scope, Sheet};

// ---------------------------------------------------------------------------
// Bucket totals
// ---------------------------------------------------------------------------

/// Running inflow and outflow for one aggregation bucket. Net is always
/// derived from the two sums, never accumulated on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub inflow: f64,
    pub outflow: f64,
}

impl Totals {
    pub fn add(&mut self, inflow: f64, outflow: f64) {
        self.inflow += inflow;
        self.outflow += outflow;
    }

    pub fn net(&self) -> f64 {
        self.inflow - self.outflow
    }
}

fn pct(part: f64, total: f64) -> f64 {
    if total != 0.0 {
        part / total * 100.0
    } else {
        0.0
    }
}

fn display_branch(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "Unassigned Branch".to_string()
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Monthly company summary
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct SummaryBucket {
    pub month: MonthKey,
    pub company: String,
    pub totals: Totals,
}

#[derive(Debug)]
pub struct SummaryReport {
    pub buckets: Vec<SummaryBucket>,
    pub grand: Totals,
}

/// The summary sheet is a separate export with its own header drift and
/// month-name date cells, so it gets parsed here rather than through the
/// daybook snapshot.
pub fn summary(path: &Path, scope: &Scope) -> Result<SummaryReport> {
    if !path.exists() {
        return Err(MunimError::MissingDaybook(path.display().to_string()));
    }
    let text = fs::read_to_string(path)?;
    summary_from_csv(&text, path, scope)
}

fn summary_from_csv(text: &str, path: &Path, scope: &Scope) -> Result<SummaryReport> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());
    let header_line = lines
        .next()
        .ok_or_else(|| MunimError::EmptyDaybook(path.display().to_string()))?;
    let headers = parse::split_line(header_line);

    let inflow_col = schema::find_summary_column(&headers, schema::SUMMARY_INFLOW_ALIASES);
    let outflow_col = schema::find_summary_column(&headers, schema::SUMMARY_OUTFLOW_ALIASES);
    let net_col = schema::find_summary_column(&headers, schema::SUMMARY_NET_ALIASES);
    let date_col = schema::find_summary_column(&headers, schema::SUMMARY_DATE_ALIASES);
    let company_col = schema::find_summary_column(&headers, schema::SUMMARY_COMPANY_ALIASES);

    let mut missing = Vec::new();
    if inflow_col.is_none() {
        missing.push("Total Inflow".to_string());
    }
    if outflow_col.is_none() {
        missing.push("Total Outflow".to_string());
    }
    if net_col.is_none() {
        missing.push("NET".to_string());
    }
    if date_col.is_none() {
        missing.push("DATE".to_string());
    }
    if !missing.is_empty() {
        return Err(MunimError::MissingColumns(missing));
    }

    let mut buckets: BTreeMap<(MonthKey, String), Totals> = BTreeMap::new();
    for line in lines {
        let cells = parse::split_line(line);
        let cell = |col: Option<usize>| {
            col.and_then(|i| cells.get(i)).map(|s| s.as_str()).unwrap_or("")
        };
        let Some(month) = parse_month_cell(cell(date_col)) else {
            continue;
        };
        let company = match cell(company_col).trim() {
            "" => "N/A".to_string(),
            c => c.to_string(),
        };
        buckets
            .entry((month, company))
            .or_default()
            .add(parse::clean_amount(cell(inflow_col)), parse::clean_amount(cell(outflow_col)));
    }

    // The month and company filters narrow the aggregated buckets, and the
    // grand totals cover exactly what is shown.
    let mut out = Vec::new();
    let mut grand = Totals::default();
    for ((month, company), totals) in buckets {
        if let Some(m) = scope.month {
            if month != m {
                continue;
            }
        }
        if let Some(want) = &scope.company {
            if !want.trim().eq_ignore_ascii_case(&company) {
                continue;
            }
        }
        grand.add(totals.inflow, totals.outflow);
        out.push(SummaryBucket { month, company, totals });
    }
    Ok(SummaryReport { buckets: out, grand })
}

/// Month of a summary date cell: `April 2025`, a bare `APRIL`, or a
/// day-first numeric date. Bare month names land in the fiscal year that
/// runs April 2025 to March 2026.
fn parse_month_cell(raw: &str) -> Option<MonthKey> {
    let parts: Vec<&str> = raw.trim().split_whitespace().collect();
    match parts.as_slice() {
        [name, year] => {
            let month = month_from_name(name)?;
            let year: i32 = year.parse().ok()?;
            if (1900..=2100).contains(&year) {
                return Some(MonthKey { year, month });
            }
            None
        }
        [single] => {
            if let Some(month) = month_from_name(single) {
                let year = if month <= 3 { 2026 } else { 2025 };
                return Some(MonthKey { year, month });
            }
            parse::parse_date_dmy(single).map(MonthKey::of)
        }
        _ => parse::parse_date_dmy(raw).map(MonthKey::of),
    }
}

// ---------------------------------------------------------------------------
// Company inflow / outflow
// ---------------------------------------------------------------------------

pub struct CompanyFlow {
    pub company: String,
    pub totals: Totals,
}

pub struct FlowsReport {
    pub companies: Vec<CompanyFlow>,
    pub overall: Totals,
    /// Row count after the duplicate-export strip.
    pub unique_rows: usize,
}

/// The daybook export occasionally doubles rows, so identical
/// date/customer/staff/company/amount rows collapse to one before
/// aggregation.
pub fn flows(sheet: &Sheet, scope: &Scope) -> FlowsReport {
    let date = sheet.col(schema::COL_DATE);
    let customer = sheet.col(schema::COL_CUSTOMER);
    let staff = sheet.col(schema::COL_STAFF);
    let company = sheet.col(schema::COL_COMPANY);
    let inf = sheet.col(schema::COL_INF_TOTAL);
    let out = sheet.col(schema::COL_OUT_TOTAL);
    let net = sheet.col(schema::COL_NET);

    let mut seen = HashSet::new();
    let mut companies: BTreeMap<String, Totals> = BTreeMap::new();
    let mut overall = Totals::default();
    let mut unique_rows = 0usize;

    for row in sheet.select(scope) {
        let key = [
            row.cell(date),
            row.cell(customer),
            row.cell(staff),
            row.cell(company),
            row.cell(inf),
            row.cell(out),
            row.cell(net),
        ]
        .join("|");
        if !seen.insert(key) {
            continue;
        }
        unique_rows += 1;
        let inflow = parse::parse_amount(row.cell(inf));
        let outflow = parse::parse_amount(row.cell(out));
        let name = match row.cell(company).trim() {
            "" => "N/A".to_string(),
            c => c.to_string(),
        };
        companies.entry(name).or_default().add(inflow, outflow);
        overall.add(inflow, outflow);
    }

    FlowsReport {
        companies: companies
            .into_iter()
            .map(|(company, totals)| CompanyFlow { company, totals })
            .collect(),
        overall,
        unique_rows,
    }
}

// ---------------------------------------------------------------------------
// Branch performance
// ---------------------------------------------------------------------------

pub struct BranchPerf {
    pub branch: String,
    pub totals: Totals,
}

pub struct StaffPerf {
    pub staff: String,
    pub totals: Totals,
}

pub struct BranchesReport {
    pub branches: Vec<BranchPerf>,
    pub overall: Totals,
    pub drilldown: Option<BranchDrilldown>,
}

pub struct BranchDrilldown {
    pub branch: String,
    pub staff: Vec<StaffPerf>,
}

pub fn branches(sheet: &Sheet, scope: &Scope) -> BranchesReport {
    // The branch flag selects a drill-down on the fallback-applied name,
    // so row filtering runs without it.
    let mut row_scope = scope.clone();
    let branch_filter = row_scope.branch.take();

    let branch_col = sheet.col(schema::COL_BRANCH);
    let staff_col = sheet.col(schema::COL_STAFF);
    let inf = sheet.col(schema::COL_INF_TOTAL);
    let out = sheet.col(schema::COL_OUT_TOTAL);

    let mut branches: BTreeMap<String, Totals> = BTreeMap::new();
    let mut staff: BTreeMap<String, Totals> = BTreeMap::new();
    let mut overall = Totals::default();

    for row in sheet.select(&row_scope) {
        let name = display_branch(row.cell(branch_col));
        let inflow = parse::parse_amount(row.cell(inf));
        let outflow = parse::parse_amount(row.cell(out));
        branches.entry(name.clone()).or_default().add(inflow, outflow);
        overall.add(inflow, outflow);

        if let Some(want) = &branch_filter {
            if want.trim().eq_ignore_ascii_case(&name) {
                staff
                    .entry(row.cell(staff_col).trim().to_string())
                    .or_default()
                    .add(inflow, outflow);
            }
        }
    }

    let drilldown = branch_filter.map(|branch| BranchDrilldown {
        branch,
        staff: staff
            .into_iter()
            .map(|(staff, totals)| StaffPerf { staff, totals })
            .collect(),
    });

    BranchesReport {
        branches: branches
            .into_iter()
            .map(|(branch, totals)| BranchPerf { branch, totals })
            .collect(),
        overall,
        drilldown,
    }
}

// ---------------------------------------------------------------------------
// Branch ranker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankView {
    Top,
    Bottom,
    Growth,
    Degrowth,
}

pub struct RankedBranch {
    pub company: String,
    pub branch: String,
    pub totals: Totals,
    /// Net of the preceding calendar month, when that bucket exists.
    pub prev_net: Option<f64>,
}

pub struct RankReport {
    pub view: RankView,
    pub entries: Vec<RankedBranch>,
    /// Growth views need a single-month scope; otherwise they degrade to
    /// a plain net-descending ranking.
    pub fell_back: bool,
}

pub fn rank(sheet: &Sheet, scope: &Scope, view: RankView) -> RankReport {
    let company_col = sheet.col(schema::COL_COMPANY);
    let branch_col = sheet.col(schema::COL_BRANCH);
    let inf = sheet.col(schema::COL_INF_TOTAL);
    let out = sheet.col(schema::COL_OUT_TOTAL);

    let single_month = scope.month.filter(|_| !scope.has_range());

    let mut entries: Vec<RankedBranch> = if let Some(m) = single_month {
        // Month buckets over the whole window so the preceding month is
        // there for the growth comparison.
        let mut dateless = scope.clone();
        dateless.month = None;
        let mut monthly: BTreeMap<(String, String, MonthKey), Totals> = BTreeMap::new();
        for row in sheet.select(&dateless) {
            let key = (
                row.cell(company_col).trim().to_string(),
                display_branch(row.cell(branch_col)),
                row.month(),
            );
            monthly
                .entry(key)
                .or_default()
                .add(parse::parse_amount(row.cell(inf)), parse::parse_amount(row.cell(out)));
        }
        let mut out_entries = Vec::new();
        for ((company, branch, month), totals) in &monthly {
            if *month != m {
                continue;
            }
            let prev = monthly
                .get(&(company.clone(), branch.clone(), m.prev()))
                .map(Totals::net);
            out_entries.push(RankedBranch {
                company: company.clone(),
                branch: branch.clone(),
                totals: *totals,
                prev_net: prev,
            });
        }
        out_entries
    } else {
        let mut period: BTreeMap<(String, String), Totals> = BTreeMap::new();
        for row in sheet.select(scope) {
            let key = (
                row.cell(company_col).trim().to_string(),
                display_branch(row.cell(branch_col)),
            );
            period
                .entry(key)
                .or_default()
                .add(parse::parse_amount(row.cell(inf)), parse::parse_amount(row.cell(out)));
        }
        period
            .into_iter()
            .map(|((company, branch), totals)| RankedBranch {
                company,
                branch,
                totals,
                prev_net: None,
            })
            .collect()
    };

    let mut fell_back = false;
    match view {
        RankView::Top => {
            entries.sort_by(|a, b| b.totals.net().total_cmp(&a.totals.net()));
            entries.truncate(5);
        }
        RankView::Bottom => {
            entries.sort_by(|a, b| a.totals.net().total_cmp(&b.totals.net()));
            entries.truncate(5);
        }
        RankView::Growth | RankView::Degrowth => {
            if single_month.is_some() {
                let delta = |e: &RankedBranch| e.totals.net() - e.prev_net.unwrap_or(0.0);
                if view == RankView::Growth {
                    entries.retain(|e| matches!(e.prev_net, Some(p) if e.totals.net() > p));
                    entries.sort_by(|a, b| delta(b).total_cmp(&delta(a)));
                } else {
                    entries.retain(|e| matches!(e.prev_net, Some(p) if e.totals.net() < p));
                    entries.sort_by(|a, b| delta(a).total_cmp(&delta(b)));
                }
            } else {
                fell_back = true;
                entries.sort_by(|a, b| b.totals.net().total_cmp(&a.totals.net()));
            }
        }
    }

    RankReport { view, entries, fell_back }
}

// ---------------------------------------------------------------------------
// Staff gainers & losers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StaffStanding {
    pub staff: String,
    pub company: String,
    pub net: f64,
    pub resigned: bool,
}

pub struct GainersReport {
    pub gainers: Vec<StaffStanding>,
    pub losers: Vec<StaffStanding>,
    pub all_gainers: Vec<StaffStanding>,
    pub all_losers: Vec<StaffStanding>,
}

/// Per-staff sum of the sheet's row nets. Any row carrying a RESIGNED
/// status marks the staff member for the whole report.
pub fn gainers(sheet: &Sheet, scope: &Scope) -> GainersReport {
    let staff_col = sheet.col(schema::COL_STAFF);
    let company_col = sheet.col(schema::COL_COMPANY);
    let status_col = sheet.col(schema::COL_STATUS);
    let net_col = sheet.col(schema::COL_NET);

    let mut acc: BTreeMap<String, StaffStanding> = BTreeMap::new();
    for row in sheet.select(scope) {
        let name = row.cell(staff_col).trim();
        if name.is_empty() {
            continue;
        }
        let entry = acc.entry(name.to_string()).or_insert_with(|| StaffStanding {
            staff: name.to_string(),
            company: row.cell(company_col).trim().to_string(),
            net: 0.0,
            resigned: false,
        });
        entry.net += parse::parse_amount(row.cell(net_col));
        if row.cell(status_col).trim().eq_ignore_ascii_case(schema::STATUS_RESIGNED) {
            entry.resigned = true;
        }
    }

    let mut all_gainers: Vec<StaffStanding> =
        acc.values().filter(|s| s.net > 0.0).cloned().collect();
    all_gainers.sort_by(|a, b| b.net.total_cmp(&a.net));
    let mut all_losers: Vec<StaffStanding> =
        acc.values().filter(|s| s.net < 0.0).cloned().collect();
    all_losers.sort_by(|a, b| a.net.total_cmp(&b.net));

    GainersReport {
        gainers: all_gainers.iter().take(10).cloned().collect(),
        losers: all_losers.iter().take(10).cloned().collect(),
        all_gainers,
        all_losers,
    }
}

// ---------------------------------------------------------------------------
// Target vs. achievement
// ---------------------------------------------------------------------------

pub struct TargetCell {
    pub company: String,
    pub month: MonthKey,
    pub target: f64,
    pub achieved: f64,
}

impl TargetCell {
    pub fn achieved_pct(&self) -> f64 {
        pct(self.achieved, self.target)
    }

    pub fn shortfall(&self) -> f64 {
        self.target - self.achieved
    }
}

pub struct TargetsReport {
    pub cells: Vec<TargetCell>,
}

/// Every targeted company gets a cell for every month in scope, zero
/// achievement included, so dry months stay visible.
pub fn targets(sheet: &Sheet, scope: &Scope, quotas: &BTreeMap<String, f64>) -> TargetsReport {
    let company_col = sheet.col(schema::COL_COMPANY);
    let inf = sheet.col(schema::COL_INF_TOTAL);
    let out = sheet.col(schema::COL_OUT_TOTAL);

    let months: Vec<MonthKey> = match scope.month {
        Some(m) => vec![m],
        None => sheet.window.months(),
    };

    let mut cells: BTreeMap<(String, MonthKey), TargetCell> = BTreeMap::new();
    for (company, target) in quotas {
        if let Some(want) = &scope.company {
            if !want.trim().eq_ignore_ascii_case(company) {
                continue;
            }
        }
        for month in &months {
            cells.insert(
                (company.clone(), *month),
                TargetCell {
                    company: company.clone(),
                    month: *month,
                    target: *target,
                    achieved: 0.0,
                },
            );
        }
    }

    for row in sheet.select(scope) {
        let company = row.cell(company_col).trim();
        if let Some(cell) = cells.get_mut(&(company.to_string(), row.month())) {
            cell.achieved +=
                parse::parse_amount(row.cell(inf)) - parse::parse_amount(row.cell(out));
        }
    }

    TargetsReport { cells: cells.into_values().collect() }
}

// ---------------------------------------------------------------------------
// Employee participation
// ---------------------------------------------------------------------------

pub struct ParticipationBucket {
    pub month: MonthKey,
    pub company: String,
    pub unique_staff: usize,
    pub new_staff: usize,
    pub repeating_staff: usize,
    pub totals: Totals,
}

impl ParticipationBucket {
    pub fn new_pct(&self) -> f64 {
        pct(self.new_staff as f64, self.unique_staff as f64)
    }

    pub fn repeating_pct(&self) -> f64 {
        pct(self.repeating_staff as f64, self.unique_staff as f64)
    }
}

pub struct ParticipationEntry {
    pub month: MonthKey,
    pub company: String,
    pub totals: Totals,
}

pub struct ParticipationReport {
    pub buckets: Vec<ParticipationBucket>,
    pub drilldown: Option<(String, Vec<ParticipationEntry>)>,
}

/// New/repeating is scope-relative: a staff member seen in exactly one
/// month of the filtered data is new, in more than one repeating.
pub fn participation(sheet: &Sheet, scope: &Scope) -> ParticipationReport {
    let mut row_scope = scope.clone();
    let staff_filter = row_scope.staff.take();

    let staff_col = sheet.col(schema::COL_STAFF);
    let company_col = sheet.col(schema::COL_COMPANY);
    let inf = sheet.col(schema::COL_INF_TOTAL);
    let out = sheet.col(schema::COL_OUT_TOTAL);

    // First pass: bucket totals, staff sets, and a per-company presence
    // map of which months each staff member appears in.
    let mut buckets: BTreeMap<(MonthKey, String), (HashSet<String>, Totals)> = BTreeMap::new();
    let mut presence: BTreeMap<(String, String), HashSet<MonthKey>> = BTreeMap::new();
    let mut drill: BTreeMap<(MonthKey, String), Totals> = BTreeMap::new();

    for row in sheet.select(&row_scope) {
        let staff = row.cell(staff_col).trim().to_string();
        let company = row.cell(company_col).trim().to_string();
        if staff.is_empty() || company.is_empty() {
            continue;
        }
        let inflow = parse::parse_amount(row.cell(inf));
        let outflow = parse::parse_amount(row.cell(out));
        let month = row.month();

        let (staff_set, totals) = buckets.entry((month, company.clone())).or_default();
        staff_set.insert(staff.clone());
        totals.add(inflow, outflow);

        presence
            .entry((company.clone(), staff.clone()))
            .or_default()
            .insert(month);

        if let Some(want) = &staff_filter {
            if want.trim().eq_ignore_ascii_case(&staff) {
                drill.entry((month, company)).or_default().add(inflow, outflow);
            }
        }
    }

    // Second pass: classify each bucket's staff against the presence map.
    let mut out_buckets = Vec::new();
    for ((month, company), (staff_set, totals)) in buckets {
        let mut new_staff = 0;
        let mut repeating_staff = 0;
        for staff in &staff_set {
            match presence.get(&(company.clone(), staff.clone())).map(|m| m.len()) {
                Some(n) if n > 1 => repeating_staff += 1,
                Some(1) => new_staff += 1,
                _ => {}
            }
        }
        out_buckets.push(ParticipationBucket {
            month,
            company,
            unique_staff: staff_set.len(),
            new_staff,
            repeating_staff,
            totals,
        });
    }

    let drilldown = staff_filter.map(|staff| {
        let entries = drill
            .into_iter()
            .map(|((month, company), totals)| ParticipationEntry { month, company, totals })
            .collect();
        (staff, entries)
    });

    ParticipationReport { buckets: out_buckets, drilldown }
}

// ---------------------------------------------------------------------------
// Fresh vs. old business
// ---------------------------------------------------------------------------

pub struct StaffFresh {
    pub staff: String,
    pub customers: usize,
    pub inflow: f64,
}

impl StaffFresh {
    pub fn average_inflow(&self) -> f64 {
        if self.customers > 0 {
            self.inflow / self.customers as f64
        } else {
            0.0
        }
    }
}

pub struct FreshOldMonth {
    pub month: MonthKey,
    pub fresh: Totals,
    pub old: Totals,
    pub fresh_customers: usize,
    pub fresh_staff_customers: usize,
}

pub struct CompanyFreshOld {
    pub company: String,
    pub fresh: Totals,
    pub old: Totals,
}

pub struct FreshOldReport {
    pub fresh: Totals,
    pub old: Totals,
    pub fresh_customers: usize,
    pub old_customers: usize,
    pub fresh_staff_customers: usize,
    pub staff_fresh: Vec<StaffFresh>,
    pub monthly: Vec<FreshOldMonth>,
    pub companies: Vec<CompanyFreshOld>,
}

/// Fresh/old split over the fiscal year. Per-row flows come from the
/// individual product columns, each cell rounded before summing, rather
/// than the sheet's total columns.
pub fn fresh_old(sheet: &Sheet, scope: &Scope) -> FreshOldReport {
    let customer_col = sheet.col(schema::COL_CUSTOMER);
    let staff_col = sheet.col(schema::COL_STAFF);
    let company_col = sheet.col(schema::COL_COMPANY);
    let tag_col = sheet.col(schema::COL_FRESH_OLD);
    let inf_cols: Vec<Option<usize>> = schema::INF_COLUMNS.iter().map(|c| sheet.col(c)).collect();
    let out_cols: Vec<Option<usize>> = schema::OUT_COLUMNS.iter().map(|c| sheet.col(c)).collect();

    let row_flows = |row: &crate::sheet::Row| {
        let inflow: f64 = inf_cols
            .iter()
            .map(|c| parse::parse_amount(row.cell(*c)).round())
            .sum();
        let outflow: f64 = out_cols
            .iter()
            .map(|c| parse::parse_amount(row.cell(*c)).round())
            .sum();
        (inflow, outflow)
    };
    let tag_of = |row: &crate::sheet::Row| row.cell(tag_col).trim().to_uppercase();
    let is_fresh = |tag: &str| schema::FRESH_TAGS.contains(&tag);
    let is_old = |tag: &str| schema::OLD_TAGS.contains(&tag);

    let mut fresh = Totals::default();
    let mut old = Totals::default();
    let mut fresh_customers = HashSet::new();
    let mut old_customers = HashSet::new();
    let mut fresh_staff_customers = HashSet::new();
    let mut staff_fresh: BTreeMap<String, (HashSet<String>, f64)> = BTreeMap::new();
    let mut companies: BTreeMap<String, (Totals, Totals)> = BTreeMap::new();

    for row in sheet.select(scope) {
        let tag = tag_of(row);
        let (inflow, outflow) = row_flows(row);
        let customer = row.cell(customer_col).trim().to_string();
        let company = row.cell(company_col).trim().to_string();

        if is_fresh(&tag) {
            fresh.add(inflow, outflow);
            if !customer.is_empty() {
                fresh_customers.insert(customer.clone());
                if tag == schema::FRESH_STAFF_TAG {
                    fresh_staff_customers.insert(customer.clone());
                }
                let staff = row.cell(staff_col).trim().to_string();
                if !staff.is_empty() {
                    let entry = staff_fresh.entry(staff).or_default();
                    entry.0.insert(customer);
                    entry.1 += inflow;
                }
            }
            if !company.is_empty() {
                companies.entry(company).or_default().0.add(inflow, outflow);
            }
        } else if is_old(&tag) {
            old.add(inflow, outflow);
            if !customer.is_empty() {
                old_customers.insert(customer);
            }
            if !company.is_empty() {
                companies.entry(company).or_default().1.add(inflow, outflow);
            }
        }
    }

    // Monthly trend over the whole window, the month filter notwithstanding.
    let mut monthly_scope = scope.clone();
    monthly_scope.month = None;
    monthly_scope.from = None;
    monthly_scope.to = None;
    let mut monthly: BTreeMap<MonthKey, FreshOldMonth> = BTreeMap::new();
    let mut monthly_fresh_customers: BTreeMap<MonthKey, HashSet<String>> = BTreeMap::new();
    let mut monthly_fresh_staff: BTreeMap<MonthKey, HashSet<String>> = BTreeMap::new();
    for row in sheet.select(&monthly_scope) {
        let tag = tag_of(row);
        let (inflow, outflow) = row_flows(row);
        let month = row.month();
        let entry = monthly.entry(month).or_insert_with(|| FreshOldMonth {
            month,
            fresh: Totals::default(),
            old: Totals::default(),
            fresh_customers: 0,
            fresh_staff_customers: 0,
        });
        if is_fresh(&tag) {
            entry.fresh.add(inflow, outflow);
            let customer = row.cell(customer_col).trim().to_string();
            if !customer.is_empty() {
                monthly_fresh_customers.entry(month).or_default().insert(customer.clone());
                if tag == schema::FRESH_STAFF_TAG {
                    monthly_fresh_staff.entry(month).or_default().insert(customer);
                }
            }
        } else if is_old(&tag) {
            entry.old.add(inflow, outflow);
        }
    }
    let monthly = monthly
        .into_iter()
        .map(|(month, mut entry)| {
            entry.fresh_customers = monthly_fresh_customers.get(&month).map_or(0, HashSet::len);
            entry.fresh_staff_customers = monthly_fresh_staff.get(&month).map_or(0, HashSet::len);
            entry
        })
        .collect();

    let mut staff_fresh: Vec<StaffFresh> = staff_fresh
        .into_iter()
        .map(|(staff, (customers, inflow))| StaffFresh {
            staff,
            customers: customers.len(),
            inflow,
        })
        .collect();
    staff_fresh.sort_by(|a, b| b.customers.cmp(&a.customers));

    FreshOldReport {
        fresh,
        old,
        fresh_customers: fresh_customers.len(),
        old_customers: old_customers.len(),
        fresh_staff_customers: fresh_staff_customers.len(),
        staff_fresh,
        monthly,
        companies: companies
            .into_iter()
            .map(|(company, (fresh, old))| CompanyFreshOld { company, fresh, old })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Individual staff report
// ---------------------------------------------------------------------------

pub struct CustomerInflow {
    pub customer: String,
    pub inflow: f64,
}

pub struct RepeatCustomer {
    pub customer: String,
    pub transactions: usize,
    pub net: f64,
}

pub struct StaffMonth {
    pub month: MonthKey,
    pub totals: Totals,
    pub cumulative_net: f64,
}

pub struct ProductTotals {
    pub company: String,
    pub product: String,
    pub totals: Totals,
}

pub struct StaffReport {
    pub totals: Totals,
    pub customer_count: usize,
    pub churn_pct: f64,
    pub fresh_customers: Vec<CustomerInflow>,
    pub repeat_customers: Vec<RepeatCustomer>,
    pub monthly: Vec<StaffMonth>,
    pub products: Vec<ProductTotals>,
}

pub fn staff_report(sheet: &Sheet, scope: &Scope) -> StaffReport {
    let customer_col = sheet.col(schema::COL_CUSTOMER);
    let tag_col = sheet.col(schema::COL_FRESH_OLD);
    let inf = sheet.col(schema::COL_INF_TOTAL);
    let out = sheet.col(schema::COL_OUT_TOTAL);

    // Product columns resolved once from the header row.
    let product_cols: Vec<(usize, schema::ProductColumn)> = sheet
        .headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| schema::parse_product_column(h).map(|p| (i, p)))
        .collect();

    let mut totals = Totals::default();
    let mut customers: BTreeMap<String, (Totals, usize)> = BTreeMap::new();
    let mut fresh: BTreeMap<String, f64> = BTreeMap::new();
    let mut monthly: BTreeMap<MonthKey, Totals> = BTreeMap::new();
    let mut products: BTreeMap<(String, String), Totals> = BTreeMap::new();

    for row in sheet.select(scope) {
        let inflow = parse::parse_amount(row.cell(inf));
        let outflow = parse::parse_amount(row.cell(out));
        totals.add(inflow, outflow);
        monthly.entry(row.month()).or_default().add(inflow, outflow);

        let customer = row.cell(customer_col).trim().to_string();
        if !customer.is_empty() {
            let entry = customers.entry(customer.clone()).or_default();
            entry.0.add(inflow, outflow);
            entry.1 += 1;

            let tag = row.cell(tag_col).trim().to_uppercase();
            if schema::STAFF_FRESH_TAGS.contains(&tag.as_str()) {
                *fresh.entry(customer).or_default() += inflow;
            }
        }

        for (idx, col) in &product_cols {
            let value = parse::parse_amount(row.cell(Some(*idx)));
            if value == 0.0 {
                continue;
            }
            let entry = products
                .entry((col.company.clone(), col.product.clone()))
                .or_default();
            match col.side {
                FlowSide::Inflow => entry.add(value, 0.0),
                FlowSide::Outflow => entry.add(0.0, value),
            }
        }
    }

    let customer_count = customers.len();
    let negative = customers.values().filter(|(t, _)| t.net() < 0.0).count();
    let churn_pct = pct(negative as f64, customer_count as f64);

    let mut repeat_customers: Vec<RepeatCustomer> = customers
        .iter()
        .filter(|(_, (_, n))| *n > 1)
        .map(|(customer, (t, n))| RepeatCustomer {
            customer: customer.clone(),
            transactions: *n,
            net: t.net(),
        })
        .collect();
    repeat_customers.sort_by(|a, b| b.net.total_cmp(&a.net));

    let mut cumulative = 0.0;
    let monthly = monthly
        .into_iter()
        .map(|(month, totals)| {
            cumulative += totals.net();
            StaffMonth { month, totals, cumulative_net: cumulative }
        })
        .collect();

    StaffReport {
        totals,
        customer_count,
        churn_pct,
        fresh_customers: fresh
            .into_iter()
            .map(|(customer, inflow)| CustomerInflow { customer, inflow })
            .collect(),
        repeat_customers,
        monthly,
        products: products
            .into_iter()
            .map(|((company, product), totals)| ProductTotals { company, product, totals })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Resigned staff
// ---------------------------------------------------------------------------

pub struct CompanyResigned {
    pub company: String,
    pub totals: Totals,
    pub staff: usize,
}

pub struct ResignedMonth {
    pub month: MonthKey,
    pub totals: Totals,
}

pub struct ResignedReport {
    pub overall: Totals,
    pub overall_staff: usize,
    pub companies: Vec<CompanyResigned>,
    pub monthly: Vec<ResignedMonth>,
}

pub fn resigned(sheet: &Sheet, scope: &Scope) -> ResignedReport {
    let staff_col = sheet.col(schema::COL_STAFF);
    let company_col = sheet.col(schema::COL_COMPANY);
    let status_col = sheet.col(schema::COL_STATUS);
    let inf = sheet.col(schema::COL_INF_TOTAL);
    let out = sheet.col(schema::COL_OUT_TOTAL);

    let is_resigned = |row: &crate::sheet::Row| {
        row.cell(status_col).trim().eq_ignore_ascii_case(schema::STATUS_RESIGNED)
    };

    // The overall summary spans every resigned row in the window no matter
    // what filters are set.
    let mut overall = Totals::default();
    let mut overall_staff = HashSet::new();
    for row in sheet.rows.iter().filter(|r| is_resigned(r)) {
        overall.add(parse::parse_amount(row.cell(inf)), parse::parse_amount(row.cell(out)));
        let staff = row.cell(staff_col).trim();
        if !staff.is_empty() {
            overall_staff.insert(staff.to_string());
        }
    }

    let mut companies: BTreeMap<String, (Totals, HashSet<String>)> = BTreeMap::new();
    let mut monthly: BTreeMap<MonthKey, Totals> = BTreeMap::new();
    for row in sheet.select(scope).filter(|r| is_resigned(r)) {
        let inflow = parse::parse_amount(row.cell(inf));
        let outflow = parse::parse_amount(row.cell(out));
        monthly.entry(row.month()).or_default().add(inflow, outflow);

        let company = row.cell(company_col).trim().to_string();
        if company.is_empty() {
            continue;
        }
        let entry = companies.entry(company).or_default();
        entry.0.add(inflow, outflow);
        let staff = row.cell(staff_col).trim();
        if !staff.is_empty() {
            entry.1.insert(staff.to_string());
        }
    }

    ResignedReport {
        overall,
        overall_staff: overall_staff.len(),
        companies: companies
            .into_iter()
            .map(|(company, (totals, staff))| CompanyResigned {
                company,
                totals,
                staff: staff.len(),
            })
            .collect(),
        monthly: monthly
            .into_iter()
            .map(|(month, totals)| ResignedMonth { month, totals })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Performer product study
// ---------------------------------------------------------------------------

pub struct Performer {
    pub staff: String,
    pub net: f64,
}

pub struct ProductMix {
    pub product: String,
    pub totals: Totals,
    pub contribution_pct: f64,
}

pub struct PerformersReport {
    pub min_net: f64,
    pub performers: Vec<Performer>,
    pub total_inflow: f64,
    pub total_net: f64,
    pub products: Vec<ProductMix>,
}

/// Staff whose summed row net clears the threshold, plus the product mix
/// across their transactions grouped by display name.
pub fn performers(sheet: &Sheet, scope: &Scope, min_net: f64) -> PerformersReport {
    let staff_col = sheet.col(schema::COL_STAFF);
    let inf = sheet.col(schema::COL_INF_TOTAL);
    let net_col = sheet.col(schema::COL_NET);

    let product_cols: Vec<(usize, schema::ProductColumn)> = sheet
        .headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| schema::parse_product_column(h).map(|p| (i, p)))
        .collect();

    let rows: Vec<&crate::sheet::Row> = sheet.select(scope).collect();

    let mut per_staff: BTreeMap<String, f64> = BTreeMap::new();
    for row in &rows {
        let name = row.cell(staff_col).trim();
        if name.is_empty() {
            continue;
        }
        *per_staff.entry(name.to_string()).or_default() +=
            parse::parse_amount(row.cell(net_col));
    }

    let mut performers: Vec<Performer> = per_staff
        .into_iter()
        .filter(|(_, net)| *net >= min_net)
        .map(|(staff, net)| Performer { staff, net })
        .collect();
    performers.sort_by(|a, b| b.net.total_cmp(&a.net));
    let names: HashSet<&str> = performers.iter().map(|p| p.staff.as_str()).collect();

    let mut total_inflow = 0.0;
    let mut total_net = 0.0;
    let mut products: BTreeMap<String, Totals> = BTreeMap::new();
    for row in &rows {
        if !names.contains(row.cell(staff_col).trim()) {
            continue;
        }
        total_inflow += parse::parse_amount(row.cell(inf));
        total_net += parse::parse_amount(row.cell(net_col));

        for (idx, col) in &product_cols {
            let value = parse::parse_amount(row.cell(Some(*idx)));
            if value == 0.0 {
                continue;
            }
            let entry = products
                .entry(schema::product_display_name(&col.product))
                .or_default();
            match col.side {
                FlowSide::Inflow => entry.add(value, 0.0),
                FlowSide::Outflow => entry.add(0.0, value),
            }
        }
    }

    let mut products: Vec<ProductMix> = products
        .into_iter()
        .map(|(product, totals)| ProductMix {
            product,
            totals,
            contribution_pct: if total_net > 0.0 {
                totals.net() / total_net * 100.0
            } else {
                0.0
            },
        })
        .collect();
    products.sort_by(|a, b| b.totals.net().total_cmp(&a.totals.net()));

    PerformersReport {
        min_net,
        performers,
        total_inflow,
        total_net,
        products,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::Window;

    fn sheet_from(text: &str) -> Sheet {
        Sheet::from_csv(text, Path::new("test.csv"), Window::fiscal()).unwrap()
    }

    const DAYBOOK: &str = "\
DATE,BRANCH,STAFF NAME,CUSTOMER NAME,COMPANY NAME,STATUS,FRESH/OLD,SML NCD INF,LLP INF,SML PURCHASE,INF Total,OUT Total,Net
01/04/2025,KOCHI,ANITA,ACME TRADERS,SML FINANCE LTD,,FRESH CUSTOMER,500,0,100,500,100,400
05/04/2025,KOCHI,ANITA,ACME TRADERS,SML FINANCE LTD,,OLD,300,0,50,300,50,250
10/04/2025,TRISSUR,BINU,KP STORES,BRD FINANCE LTD,RESIGNED,OLD CUSTOMER,0,200,0,200,0,200
15/05/2025,KOCHI,ANITA,NEW HOPE LLC,SML FINANCE LTD,,FRESH CUSTOMER/FRESH STAFF,1000,0,0,1000,0,1000
20/05/2025,TRISSUR,BINU,KP STORES,BRD FINANCE LTD,RESIGNED,OLD,0,0,400,0,400,-400
";

    #[test]
    fn test_flows_bucket_invariant() {
        let sheet = sheet_from(DAYBOOK);
        let report = flows(&sheet, &Scope::default());
        assert_eq!(report.unique_rows, 5);
        for company in &report.companies {
            let t = company.totals;
            assert_eq!(t.net(), t.inflow - t.outflow);
        }
        let sml = report.companies.iter().find(|c| c.company == "SML FINANCE LTD").unwrap();
        assert_eq!(sml.totals.inflow, 1800.0);
        assert_eq!(sml.totals.outflow, 150.0);
        assert_eq!(sml.totals.net(), 1650.0);
        assert_eq!(report.overall.net(), 1450.0);
    }

    #[test]
    fn test_flows_deduplicates_repeated_rows() {
        let mut text = DAYBOOK.to_string();
        // Re-append an existing line verbatim.
        text.push_str("01/04/2025,KOCHI,ANITA,ACME TRADERS,SML FINANCE LTD,,FRESH CUSTOMER,500,0,100,500,100,400\n");
        let sheet = sheet_from(&text);
        assert_eq!(sheet.rows.len(), 6);
        let report = flows(&sheet, &Scope::default());
        assert_eq!(report.unique_rows, 5);
        assert_eq!(report.overall.net(), 1450.0);
    }

    #[test]
    fn test_same_bucket_accumulates() {
        let sheet = sheet_from(
            "DATE,COMPANY NAME,INF Total,OUT Total,Net\n\
             01/04/2025,ACME,500,100,400\n\
             02/04/2025,ACME,300,50,250\n",
        );
        let report = flows(&sheet, &Scope::default());
        assert_eq!(report.companies.len(), 1);
        assert_eq!(report.companies[0].totals.inflow, 800.0);
        assert_eq!(report.companies[0].totals.outflow, 150.0);
        assert_eq!(report.companies[0].totals.net(), 650.0);
    }

    #[test]
    fn test_branches_unassigned_fallback() {
        let sheet = sheet_from(
            "DATE,BRANCH,STAFF NAME,INF Total,OUT Total\n\
             01/04/2025,,ANITA,500,0\n\
             02/04/2025,KOCHI,BINU,300,100\n",
        );
        let report = branches(&sheet, &Scope::default());
        assert_eq!(report.branches.len(), 2);
        assert!(report.branches.iter().any(|b| b.branch == "Unassigned Branch"));
        assert_eq!(report.overall.inflow, 800.0);
    }

    #[test]
    fn test_branches_drilldown() {
        let sheet = sheet_from(DAYBOOK);
        let scope = Scope { branch: Some("KOCHI".to_string()), ..Scope::default() };
        let report = branches(&sheet, &scope);
        // The main table still covers every branch.
        assert_eq!(report.branches.len(), 2);
        let drill = report.drilldown.unwrap();
        assert_eq!(drill.branch, "KOCHI");
        assert_eq!(drill.staff.len(), 1);
        assert_eq!(drill.staff[0].staff, "ANITA");
        assert_eq!(drill.staff[0].totals.net(), 1650.0);
    }

    #[test]
    fn test_rank_top_truncates_and_sorts() {
        let mut text = String::from("DATE,COMPANY NAME,BRANCH,INF Total,OUT Total\n");
        for (i, branch) in ["A", "B", "C", "D", "E", "F", "G"].iter().enumerate() {
            text.push_str(&format!("01/04/2025,SML FINANCE LTD,{},{},0\n", branch, (i + 1) * 100));
        }
        let sheet = sheet_from(&text);
        let report = rank(&sheet, &Scope::default(), RankView::Top);
        assert_eq!(report.entries.len(), 5);
        assert_eq!(report.entries[0].branch, "G");
        assert_eq!(report.entries[0].totals.net(), 700.0);
        let nets: Vec<f64> = report.entries.iter().map(|e| e.totals.net()).collect();
        let mut sorted = nets.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        assert_eq!(nets, sorted);

        let bottom = rank(&sheet, &Scope::default(), RankView::Bottom);
        assert_eq!(bottom.entries[0].branch, "A");
    }

    #[test]
    fn test_rank_growth_single_month() {
        let sheet = sheet_from(
            "DATE,COMPANY NAME,BRANCH,INF Total,OUT Total\n\
             01/04/2025,SML FINANCE LTD,KOCHI,100,0\n\
             01/05/2025,SML FINANCE LTD,KOCHI,400,0\n\
             01/04/2025,SML FINANCE LTD,TRISSUR,500,0\n\
             01/05/2025,SML FINANCE LTD,TRISSUR,200,0\n\
             01/05/2025,SML FINANCE LTD,KOLLAM,900,0\n",
        );
        let scope = Scope { month: MonthKey::parse("2025-05"), ..Scope::default() };

        let growth = rank(&sheet, &scope, RankView::Growth);
        assert!(!growth.fell_back);
        // KOLLAM has no April bucket, TRISSUR shrank; only KOCHI grew.
        assert_eq!(growth.entries.len(), 1);
        assert_eq!(growth.entries[0].branch, "KOCHI");
        assert_eq!(growth.entries[0].prev_net, Some(100.0));

        let degrowth = rank(&sheet, &scope, RankView::Degrowth);
        assert_eq!(degrowth.entries.len(), 1);
        assert_eq!(degrowth.entries[0].branch, "TRISSUR");
    }

    #[test]
    fn test_rank_growth_falls_back_without_month() {
        let sheet = sheet_from(DAYBOOK);
        let report = rank(&sheet, &Scope::default(), RankView::Growth);
        assert!(report.fell_back);
        assert!(!report.entries.is_empty());
    }

    #[test]
    fn test_rank_january_rolls_back_to_december() {
        let sheet = sheet_from(
            "DATE,COMPANY NAME,BRANCH,INF Total,OUT Total\n\
             10/12/2025,SML FINANCE LTD,KOCHI,100,0\n\
             10/01/2026,SML FINANCE LTD,KOCHI,300,0\n",
        );
        let scope = Scope { month: MonthKey::parse("2026-01"), ..Scope::default() };
        let report = rank(&sheet, &scope, RankView::Growth);
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].prev_net, Some(100.0));
    }

    #[test]
    fn test_gainers_and_losers() {
        let sheet = sheet_from(DAYBOOK);
        let report = gainers(&sheet, &Scope::default());
        assert_eq!(report.gainers.len(), 1);
        assert_eq!(report.gainers[0].staff, "ANITA");
        assert_eq!(report.gainers[0].net, 1650.0);
        assert!(!report.gainers[0].resigned);
        assert_eq!(report.losers.len(), 1);
        assert_eq!(report.losers[0].staff, "BINU");
        assert_eq!(report.losers[0].net, -200.0);
        assert!(report.losers[0].resigned);
        assert!(report.all_gainers.iter().all(|s| s.net > 0.0));
        assert!(report.all_losers.iter().all(|s| s.net < 0.0));
    }

    #[test]
    fn test_gainers_marks_resigned() {
        let sheet = sheet_from(
            "DATE,STAFF NAME,COMPANY NAME,STATUS,Net\n\
             01/04/2025,BINU,BRD FINANCE LTD,,-300\n\
             02/04/2025,BINU,BRD FINANCE LTD,RESIGNED,-100\n",
        );
        let report = gainers(&sheet, &Scope::default());
        assert_eq!(report.losers.len(), 1);
        assert_eq!(report.losers[0].net, -400.0);
        assert!(report.losers[0].resigned);
    }

    #[test]
    fn test_targets_preseeds_zero_months() {
        let sheet = sheet_from(DAYBOOK);
        let mut quotas = BTreeMap::new();
        quotas.insert("SML FINANCE LTD".to_string(), 1000.0);
        let report = targets(&sheet, &Scope::default(), &quotas);
        // One cell per fiscal month even where nothing was achieved.
        assert_eq!(report.cells.len(), 12);
        let april = report
            .cells
            .iter()
            .find(|c| c.month == MonthKey { year: 2025, month: 4 })
            .unwrap();
        assert_eq!(april.achieved, 650.0);
        assert_eq!(april.achieved_pct(), 65.0);
        assert_eq!(april.shortfall(), 350.0);
        let june = report
            .cells
            .iter()
            .find(|c| c.month == MonthKey { year: 2025, month: 6 })
            .unwrap();
        assert_eq!(june.achieved, 0.0);
        assert_eq!(june.achieved_pct(), 0.0);
    }

    #[test]
    fn test_targets_zero_quota_never_divides() {
        let cell = TargetCell {
            company: "X".to_string(),
            month: MonthKey { year: 2025, month: 4 },
            target: 0.0,
            achieved: 500.0,
        };
        assert_eq!(cell.achieved_pct(), 0.0);
    }

    #[test]
    fn test_participation_new_vs_repeating() {
        let sheet = sheet_from(DAYBOOK);
        let report = participation(&sheet, &Scope::default());
        // ANITA appears for SML in April and May; BINU for BRD both months.
        let sml_april = report
            .buckets
            .iter()
            .find(|b| b.company == "SML FINANCE LTD" && b.month.month == 4)
            .unwrap();
        assert_eq!(sml_april.unique_staff, 1);
        assert_eq!(sml_april.repeating_staff, 1);
        assert_eq!(sml_april.new_staff, 0);
        assert_eq!(sml_april.repeating_pct(), 100.0);
        assert_eq!(sml_april.totals.net(), 650.0);
    }

    #[test]
    fn test_participation_single_month_staff_is_new() {
        let sheet = sheet_from(
            "DATE,STAFF NAME,COMPANY NAME,INF Total,OUT Total\n\
             01/04/2025,ANITA,SML FINANCE LTD,100,0\n",
        );
        let report = participation(&sheet, &Scope::default());
        assert_eq!(report.buckets.len(), 1);
        assert_eq!(report.buckets[0].new_staff, 1);
        assert_eq!(report.buckets[0].new_pct(), 100.0);
    }

    #[test]
    fn test_participation_drilldown() {
        let sheet = sheet_from(DAYBOOK);
        let scope = Scope { staff: Some("ANITA".to_string()), ..Scope::default() };
        let report = participation(&sheet, &scope);
        let (name, entries) = report.drilldown.unwrap();
        assert_eq!(name, "ANITA");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].month.month, 4);
        assert_eq!(entries[0].totals.net(), 650.0);
    }

    #[test]
    fn test_fresh_old_split() {
        let sheet = sheet_from(DAYBOOK);
        let report = fresh_old(&sheet, &Scope::default());
        // Fresh rows: 500-100 and 1000-0 from the product columns.
        assert_eq!(report.fresh.inflow, 1500.0);
        assert_eq!(report.fresh.net(), 1400.0);
        // Old rows: 300-50, 200-0, 0-400.
        assert_eq!(report.old.inflow, 500.0);
        assert_eq!(report.old.net(), 50.0);
        assert_eq!(report.fresh_customers, 2);
        assert_eq!(report.old_customers, 2);
        assert_eq!(report.fresh_staff_customers, 1);
    }

    #[test]
    fn test_fresh_old_staff_table() {
        let sheet = sheet_from(DAYBOOK);
        let report = fresh_old(&sheet, &Scope::default());
        assert_eq!(report.staff_fresh.len(), 1);
        let anita = &report.staff_fresh[0];
        assert_eq!(anita.staff, "ANITA");
        assert_eq!(anita.customers, 2);
        assert_eq!(anita.inflow, 1500.0);
        assert_eq!(anita.average_inflow(), 750.0);
    }

    #[test]
    fn test_fresh_old_monthly_ignores_month_filter() {
        let sheet = sheet_from(DAYBOOK);
        let scope = Scope { month: MonthKey::parse("2025-04"), ..Scope::default() };
        let report = fresh_old(&sheet, &scope);
        // Summary narrows to April, the trend still spans both months.
        assert_eq!(report.fresh.inflow, 500.0);
        assert_eq!(report.monthly.len(), 2);
    }

    #[test]
    fn test_staff_report_totals_and_churn() {
        let sheet = sheet_from(DAYBOOK);
        let scope = Scope { staff: Some("BINU".to_string()), ..Scope::default() };
        let report = staff_report(&sheet, &scope);
        assert_eq!(report.totals.inflow, 200.0);
        assert_eq!(report.totals.net(), -200.0);
        assert_eq!(report.customer_count, 1);
        // KP STORES nets -200 overall.
        assert_eq!(report.churn_pct, 100.0);
        assert_eq!(report.repeat_customers.len(), 1);
        assert_eq!(report.repeat_customers[0].transactions, 2);
    }

    #[test]
    fn test_staff_report_cumulative_net() {
        let sheet = sheet_from(DAYBOOK);
        let scope = Scope { staff: Some("ANITA".to_string()), ..Scope::default() };
        let report = staff_report(&sheet, &scope);
        assert_eq!(report.monthly.len(), 2);
        assert_eq!(report.monthly[0].cumulative_net, 650.0);
        assert_eq!(report.monthly[1].cumulative_net, 1650.0);
    }

    #[test]
    fn test_staff_report_product_breakdown() {
        let sheet = sheet_from(DAYBOOK);
        let scope = Scope { staff: Some("ANITA".to_string()), ..Scope::default() };
        let report = staff_report(&sheet, &scope);
        let ncd = report
            .products
            .iter()
            .find(|p| p.company == "SML" && p.product == "NCD")
            .unwrap();
        assert_eq!(ncd.totals.inflow, 1800.0);
        let purchase = report
            .products
            .iter()
            .find(|p| p.product == "PURCHASE")
            .unwrap();
        assert_eq!(purchase.totals.outflow, 150.0);
    }

    #[test]
    fn test_resigned_overall_ignores_filters() {
        let sheet = sheet_from(DAYBOOK);
        let scope = Scope { month: MonthKey::parse("2025-04"), ..Scope::default() };
        let report = resigned(&sheet, &scope);
        // Overall spans both resigned rows despite the April filter.
        assert_eq!(report.overall.inflow, 200.0);
        assert_eq!(report.overall.outflow, 400.0);
        assert_eq!(report.overall_staff, 1);
        // Filtered sections honor it.
        assert_eq!(report.monthly.len(), 1);
        assert_eq!(report.monthly[0].totals.net(), 200.0);
    }

    #[test]
    fn test_resigned_company_summary() {
        let sheet = sheet_from(DAYBOOK);
        let report = resigned(&sheet, &Scope::default());
        assert_eq!(report.companies.len(), 1);
        assert_eq!(report.companies[0].company, "BRD FINANCE LTD");
        assert_eq!(report.companies[0].staff, 1);
        assert_eq!(report.companies[0].totals.net(), -200.0);
    }

    #[test]
    fn test_performers_threshold() {
        let sheet = sheet_from(DAYBOOK);
        let report = performers(&sheet, &Scope::default(), 1.0);
        assert_eq!(report.performers.len(), 1);
        assert_eq!(report.performers[0].staff, "ANITA");
        assert_eq!(report.total_net, 1650.0);
        assert_eq!(report.total_inflow, 1800.0);

        // A deep enough floor lets BINU in at -200.
        let report = performers(&sheet, &Scope::default(), -1000.0);
        assert_eq!(report.performers.len(), 2);
        assert_eq!(report.performers[1].staff, "BINU");
    }

    #[test]
    fn test_performers_product_mix() {
        let sheet = sheet_from(DAYBOOK);
        let report = performers(&sheet, &Scope::default(), 1.0);
        let ncd = report.products.iter().find(|p| p.product == "NCD").unwrap();
        assert_eq!(ncd.totals.inflow, 1800.0);
        let purchase = report
            .products
            .iter()
            .find(|p| p.product == "Purchase/Outflow")
            .unwrap();
        assert_eq!(purchase.totals.outflow, 150.0);
        // Contribution of NCD: 1800 / 1650.
        assert!((ncd.contribution_pct - 109.0909).abs() < 0.001);
    }

    #[test]
    fn test_performers_contribution_zero_total() {
        let sheet = sheet_from(
            "DATE,STAFF NAME,SML NCD INF,INF Total,Net\n\
             01/04/2025,ANITA,100,100,-100\n",
        );
        let report = performers(&sheet, &Scope::default(), -1000.0);
        assert!(report.total_net < 0.0);
        for product in &report.products {
            assert_eq!(product.contribution_pct, 0.0);
        }
    }

    #[test]
    fn test_summary_requires_critical_columns() {
        let err = summary_from_csv(
            "DATE,Total Inflow,Company Name\n01/04/2025,100,ACME\n",
            Path::new("s.csv"),
            &Scope::default(),
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Total Outflow"), "got: {msg}");
        assert!(msg.contains("NET"), "got: {msg}");
        assert!(!msg.contains("Total Inflow"), "got: {msg}");
    }

    #[test]
    fn test_summary_month_names_and_aliases() {
        let report = summary_from_csv(
            "DATE,INF Total,OUT Total,Net,Company Name\n\
             April 2025,\"1,000\",400,600,ACME\n\
             April 2025,500,100,400,ACME\n\
             MAY,200,50,150,ACME\n\
             JANUARY,300,0,300,ACME\n\
             notamonth,999,0,999,ACME\n",
            Path::new("s.csv"),
            &Scope::default(),
        )
        .unwrap();
        assert_eq!(report.buckets.len(), 3);
        // April bucket merges the two rows.
        assert_eq!(report.buckets[0].month, MonthKey { year: 2025, month: 4 });
        assert_eq!(report.buckets[0].totals.inflow, 1500.0);
        assert_eq!(report.buckets[0].totals.net(), 1000.0);
        // Bare MAY lands in 2025, bare JANUARY in 2026.
        assert_eq!(report.buckets[1].month, MonthKey { year: 2025, month: 5 });
        assert_eq!(report.buckets[2].month, MonthKey { year: 2026, month: 1 });
        assert_eq!(report.grand.inflow, 2000.0);
    }

    #[test]
    fn test_summary_company_fallback_and_filter() {
        let text = "DATE,Total Inflow,Total Outflow,NET\n\
                    April 2025,100,0,100\n";
        let report = summary_from_csv(text, Path::new("s.csv"), &Scope::default()).unwrap();
        assert_eq!(report.buckets[0].company, "N/A");

        let scope = Scope { company: Some("acme".to_string()), ..Scope::default() };
        let report = summary_from_csv(text, Path::new("s.csv"), &scope).unwrap();
        assert!(report.buckets.is_empty());
        assert_eq!(report.grand.inflow, 0.0);
    }
}
