use tracing::debug;

use crate::error::FetchError;
use crate::sheet_client::{RangeSource, RawCellGrid};

pub const TOTAL_TAB: &str = "Total";
pub const NAME_COLUMN: usize = 0;
pub const TOTAL_COLUMN: usize = 1;
/// First per-category column on every tab.
pub const FIRST_CATEGORY_COLUMN: usize = 2;

pub type HeadingRow = Vec<String>;
pub type MemberRow = Vec<String>;

/// Heading row plus data rows, every row exactly as wide as the headings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub headings: HeadingRow,
    pub rows: Vec<MemberRow>,
}

impl SheetTable {
    pub fn from_grid(headings: HeadingRow, grid: RawCellGrid) -> Self {
        let width = headings.len();
        let rows = grid
            .into_iter()
            .map(|row| normalize_row(row, width))
            .collect();
        Self { headings, rows }
    }
}

/// Pads with empty cells or truncates so the row is exactly `width` long.
/// The backend drops trailing empty cells, so short rows are normal.
pub fn normalize_row(mut row: Vec<String>, width: usize) -> MemberRow {
    row.resize(width, String::new());
    row
}

/// Where the heading row and data rows live on a tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabLayout {
    pub tab: String,
    pub heading_row: u32,
    pub data_start_row: u32,
}

impl TabLayout {
    pub fn total() -> Self {
        Self {
            tab: TOTAL_TAB.to_string(),
            heading_row: 5,
            data_start_row: 6,
        }
    }

    /// Monthly tabs share row 3 between the heading and the first data pull.
    pub fn monthly(tab: &str) -> Self {
        Self {
            tab: tab.to_string(),
            heading_row: 3,
            data_start_row: 3,
        }
    }

    pub fn heading_range(&self) -> String {
        format!("{0}:{0}", self.heading_row)
    }

    pub fn data_range(&self, width: usize) -> String {
        format!("A{}:{}", self.data_start_row, column_letter(width.max(1) - 1))
    }
}

/// A1 column letters for a 0-based index: 0 -> A, 25 -> Z, 26 -> AA.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

pub async fn fetch_headings<S: RangeSource>(
    source: &S,
    layout: &TabLayout,
) -> Result<HeadingRow, FetchError> {
    let grid = source
        .fetch_range(&layout.tab, &layout.heading_range())
        .await?;
    Ok(grid.into_iter().next().unwrap_or_default())
}

/// Heading fetch, then a data fetch sized to the heading width.
pub async fn fetch_table<S: RangeSource>(
    source: &S,
    layout: &TabLayout,
) -> Result<SheetTable, FetchError> {
    let headings = fetch_headings(source, layout).await?;
    if headings.is_empty() {
        debug!(tab = %layout.tab, "heading row is empty");
        return Ok(SheetTable::default());
    }
    let grid = source
        .fetch_range(&layout.tab, &layout.data_range(headings.len()))
        .await?;
    Ok(SheetTable::from_grid(headings, grid))
}
