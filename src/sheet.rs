//! Daybook ingestion. Each invocation reads the file once into an
//! immutable snapshot; reports take the snapshot by reference and nothing
//! mutates it afterwards.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDate};

use crate::error::{MunimError, Result};
use crate::parse;
use crate::schema;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Month number for an English month name, case-insensitive.
pub fn month_from_name(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name.trim()))
        .map(|i| i as u32 + 1)
}

// ---------------------------------------------------------------------------
// Validity windows
// ---------------------------------------------------------------------------

/// Inclusive date range a row must fall in to survive ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    /// Reporting window: April 2025 through the end of the current month.
    pub fn reporting() -> Self {
        let today = Local::now().date_naive();
        Window {
            start: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            end: month_end(today.year(), today.month()),
        }
    }

    /// The 2025-26 fiscal year. The fresh/old and staff reports always
    /// span the full year regardless of when they run.
    pub fn fiscal() -> Self {
        Window {
            start: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Every calendar month the window touches, in order.
    pub fn months(&self) -> Vec<MonthKey> {
        let mut out = Vec::new();
        let mut cur = MonthKey::of(self.start);
        let last = MonthKey::of(self.end);
        while cur <= last {
            out.push(cur);
            cur = cur.next();
        }
        out
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start.format("%d/%m/%Y"), self.end.format("%d/%m/%Y"))
    }
}

/// Last calendar day of a month.
pub fn month_end(year: i32, month: u32) -> NaiveDate {
    let first_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_next.and_then(|d| d.pred_opt()).unwrap()
}

// ---------------------------------------------------------------------------
// Month keys
// ---------------------------------------------------------------------------

/// Calendar month used as an aggregation dimension. Ordering is
/// chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        MonthKey { year: date.year(), month: date.month() }
    }

    /// Parse the `--month` flag, `2025-04` style.
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.trim().split('-').collect();
        if parts.len() != 2 {
            return None;
        }
        let year: i32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        if !(1..=12).contains(&month) || !(1900..=2100).contains(&year) {
            return None;
        }
        Some(MonthKey { year, month })
    }

    /// The preceding calendar month; January rolls back to December.
    pub fn prev(&self) -> Self {
        if self.month == 1 {
            MonthKey { year: self.year - 1, month: 12 }
        } else {
            MonthKey { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            MonthKey { year: self.year + 1, month: 1 }
        } else {
            MonthKey { year: self.year, month: self.month + 1 }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", MONTH_NAMES[(self.month - 1) as usize], self.year)
    }
}

// ---------------------------------------------------------------------------
// Rows and the snapshot
// ---------------------------------------------------------------------------

/// One validated daybook row: the parsed date plus the raw cells. Short
/// rows are right-padded with None up to the header count.
#[derive(Debug, Clone)]
pub struct Row {
    pub date: NaiveDate,
    cells: Vec<Option<String>>,
}

impl Row {
    /// Cell text at a looked-up column. Absent columns and padded cells
    /// read as empty, so downstream coercion sees them as zero.
    pub fn cell(&self, col: Option<usize>) -> &str {
        col.and_then(|i| self.cells.get(i))
            .and_then(|c| c.as_deref())
            .unwrap_or("")
    }

    pub fn month(&self) -> MonthKey {
        MonthKey::of(self.date)
    }
}

/// Immutable snapshot of one daybook file.
#[derive(Debug)]
pub struct Sheet {
    pub path: PathBuf,
    pub headers: Vec<String>,
    index: HashMap<String, usize>,
    pub rows: Vec<Row>,
    pub window: Window,
    /// Data lines dropped for an unparseable or out-of-window date.
    pub dropped: usize,
}

impl Sheet {
    pub fn load(path: &Path, window: Window) -> Result<Sheet> {
        if !path.exists() {
            return Err(MunimError::MissingDaybook(path.display().to_string()));
        }
        let text = fs::read_to_string(path)?;
        Sheet::from_csv(&text, path, window)
    }

    /// Parse CSV text into a snapshot. Rows whose date cell does not
    /// parse, or whose date falls outside the window, never make it in.
    pub fn from_csv(text: &str, path: &Path, window: Window) -> Result<Sheet> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header_line = lines
            .next()
            .ok_or_else(|| MunimError::EmptyDaybook(path.display().to_string()))?;
        let headers = parse::split_line(header_line);

        // First occurrence wins for duplicated header names.
        let mut index = HashMap::new();
        for (i, h) in headers.iter().enumerate() {
            index.entry(h.clone()).or_insert(i);
        }
        let date_col = index.get(schema::COL_DATE).copied();

        let mut rows = Vec::new();
        let mut dropped = 0usize;
        for line in lines {
            let Some(di) = date_col else {
                // Without a date column no row can be validated.
                dropped += 1;
                continue;
            };
            let mut cells: Vec<Option<String>> =
                parse::split_line(line).into_iter().map(Some).collect();
            if cells.len() < headers.len() {
                cells.resize(headers.len(), None);
            }
            let raw_date = cells.get(di).and_then(|c| c.as_deref()).unwrap_or("");
            match parse::parse_date_dmy(raw_date) {
                Some(date) if window.contains(date) => rows.push(Row { date, cells }),
                _ => dropped += 1,
            }
        }

        Ok(Sheet {
            path: path.to_path_buf(),
            headers,
            index,
            rows,
            window,
            dropped,
        })
    }

    /// Column position by exact header name.
    pub fn col(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows passing the scope's date and dimension filters.
    pub fn select<'a>(&'a self, scope: &'a Scope) -> impl Iterator<Item = &'a Row> {
        let company = self.col(schema::COL_COMPANY);
        let branch = self.col(schema::COL_BRANCH);
        let staff = self.col(schema::COL_STAFF);
        self.rows.iter().filter(move |row| {
            scope.admits_date(row.date)
                && match_dim(&scope.company, row.cell(company))
                && match_dim(&scope.branch, row.cell(branch))
                && match_dim(&scope.staff, row.cell(staff))
        })
    }
}

// ---------------------------------------------------------------------------
// Report scope
// ---------------------------------------------------------------------------

/// Filter flags shared by the report commands.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub month: Option<MonthKey>,
    pub company: Option<String>,
    pub branch: Option<String>,
    pub staff: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl Scope {
    /// An explicit date range beats the month filter when both are given.
    pub fn admits_date(&self, date: NaiveDate) -> bool {
        if self.from.is_some() || self.to.is_some() {
            if let Some(from) = self.from {
                if date < from {
                    return false;
                }
            }
            if let Some(to) = self.to {
                if date > to {
                    return false;
                }
            }
            return true;
        }
        match self.month {
            Some(m) => MonthKey::of(date) == m,
            None => true,
        }
    }

    pub fn has_range(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }
}

fn match_dim(filter: &Option<String>, value: &str) -> bool {
    match filter {
        Some(want) => want.trim().eq_ignore_ascii_case(value.trim()),
        None => true,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
