/// Month keys and the tab holding each month, in lookup order. The order
/// decides which month a short fragment resolves to.
pub const MONTH_TABS: [(&str, &str); 12] = [
    ("january", "Jan 2022"),
    ("february", "Feb 2022"),
    ("march", "Mar 2022"),
    ("april", "Apr 2022"),
    ("may", "May 2022"),
    ("june", "Jun 2022"),
    ("july", "Jul 2022"),
    ("august", "Aug 2022"),
    ("september", "Sep 2021"),
    ("october", "Oct / Nov 2021"),
    ("november", "Oct / Nov 2021"),
    ("december", "Dec 2021"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    pub key: &'static str,
    pub tab: &'static str,
}

impl Month {
    /// "september" -> "September"
    pub fn title(&self) -> String {
        let mut chars = self.key.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// First month whose key contains the lower-cased fragment. An empty
/// fragment is a substring of every key and resolves to January.
pub fn resolve_month(fragment: &str) -> Option<Month> {
    let wanted = fragment.to_lowercase();
    MONTH_TABS
        .iter()
        .find(|(key, _)| key.contains(wanted.as_str()))
        .map(|&(key, tab)| Month { key, tab })
}
