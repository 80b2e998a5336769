use serde::Serialize;

use crate::error::DataError;
use crate::table::{FIRST_CATEGORY_COLUMN, MemberRow, NAME_COLUMN, SheetTable, TOTAL_COLUMN};

pub const LEADERBOARD_SIZE: usize = 10;
pub const REDEEMED_LABEL: &str = "Points redeemed for prizes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub points: i64,
}

/// Which breakdown bucket a cell belongs to. The bucket, not the sign
/// written in the cell, decides the sign of the resulting amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Gain,
    Redeemed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedAmount {
    pub value: i64,
    pub bucket: Bucket,
}

/// Parses a sign-encoded category cell. Blank and zero cells are `None`.
pub fn parse_signed_cell(
    column: &str,
    raw: &str,
    bucket: Bucket,
) -> Result<Option<SignedAmount>, DataError> {
    let digits = raw.trim().trim_start_matches(['+', '-']);
    if digits.is_empty() {
        return Ok(None);
    }
    let magnitude = digits
        .parse::<i64>()
        .map_err(|_| non_numeric(column, raw))?;
    if magnitude == 0 {
        return Ok(None);
    }
    let value = match bucket {
        Bucket::Gain => magnitude,
        Bucket::Redeemed => -magnitude,
    };
    Ok(Some(SignedAmount { value, bucket }))
}

/// Running total in column B.
pub fn parse_total(table: &SheetTable, row: &MemberRow) -> Result<i64, DataError> {
    let column = table
        .headings
        .get(TOTAL_COLUMN)
        .map(String::as_str)
        .unwrap_or("Total");
    let Some(raw) = row.get(TOTAL_COLUMN) else {
        return Err(DataError::MissingColumn {
            name: row.get(NAME_COLUMN).cloned().unwrap_or_default(),
            column: column.to_string(),
        });
    };
    raw.trim()
        .parse::<i64>()
        .map_err(|_| non_numeric(column, raw))
}

/// Top `k` members by total, highest first. Ties keep sheet order. Rows
/// with both the name and total cells blank are spacer rows and are skipped;
/// a blank-name row with a total still has that total validated.
pub fn leaderboard(table: &SheetTable, k: usize) -> Result<Vec<LeaderboardEntry>, DataError> {
    let mut entries = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let name = row.get(NAME_COLUMN).map(|n| n.trim()).unwrap_or_default();
        if name.is_empty() {
            let total = row.get(TOTAL_COLUMN).map(|t| t.trim()).unwrap_or_default();
            if !total.is_empty() {
                parse_total(table, row)?;
            }
            continue;
        }
        entries.push(LeaderboardEntry {
            name: name.to_string(),
            points: parse_total(table, row)?,
        });
    }
    // sort_by is stable
    entries.sort_by(|a, b| b.points.cmp(&a.points));
    entries.truncate(k);
    Ok(entries)
}

/// All-time breakdown: every category column from C onward, as magnitudes.
/// The sign written in the cell is dropped, not re-applied.
pub fn total_breakdown(
    table: &SheetTable,
    row: &MemberRow,
) -> Result<Vec<BreakdownEntry>, DataError> {
    collect_gains(table, row, FIRST_CATEGORY_COLUMN..row.len())
}

/// Monthly breakdown: gain columns up to the last one, then the trailing
/// redeemed column as a negative entry.
pub fn monthly_breakdown(
    table: &SheetTable,
    row: &MemberRow,
) -> Result<Vec<BreakdownEntry>, DataError> {
    if row.len() <= FIRST_CATEGORY_COLUMN {
        return Ok(Vec::new());
    }
    let redeemed_idx = row.len() - 1;
    let mut out = collect_gains(table, row, FIRST_CATEGORY_COLUMN..redeemed_idx)?;

    let column = heading(table, redeemed_idx);
    if let Some(amount) = parse_signed_cell(column, &row[redeemed_idx], Bucket::Redeemed)? {
        out.push(BreakdownEntry {
            label: REDEEMED_LABEL.to_string(),
            amount: amount.value,
        });
    }
    Ok(out)
}

fn collect_gains(
    table: &SheetTable,
    row: &MemberRow,
    columns: std::ops::Range<usize>,
) -> Result<Vec<BreakdownEntry>, DataError> {
    let mut out = Vec::new();
    for idx in columns {
        let label = heading(table, idx);
        if let Some(amount) = parse_signed_cell(label, &row[idx], Bucket::Gain)? {
            out.push(BreakdownEntry {
                label: label.to_string(),
                amount: amount.value,
            });
        }
    }
    Ok(out)
}

fn heading(table: &SheetTable, idx: usize) -> &str {
    table.headings.get(idx).map(String::as_str).unwrap_or_default()
}

fn non_numeric(column: &str, raw: &str) -> DataError {
    DataError::NonNumeric {
        column: column.to_string(),
        value: raw.to_string(),
    }
}
