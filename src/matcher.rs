use crate::table::{MemberRow, NAME_COLUMN, SheetTable};

/// First token of a name cell, split on single spaces.
pub fn first_token(name: &str) -> &str {
    name.split(' ').next().unwrap_or_default()
}

/// First row (in table order) whose lower-cased first name token equals the
/// lower-cased query. Later duplicates are ignored.
pub fn find_by_first_name<'a>(table: &'a SheetTable, name: &str) -> Option<&'a MemberRow> {
    let wanted = name.to_lowercase();
    table.rows.iter().find(|row| {
        row.get(NAME_COLUMN)
            .is_some_and(|cell| first_token(cell).to_lowercase() == wanted)
    })
}
