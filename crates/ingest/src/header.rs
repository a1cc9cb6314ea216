/// Canonical field a CSV column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TradeDate,
    Symbol,
    Sector,
    Volume,
    Value,
    Price,
    Vwap,
}

/// Map one header cell to a canonical field.
///
/// Matching is case-insensitive substring matching in a fixed priority order;
/// the first rule that matches wins. `None` means the column is ignored.
pub fn map_header(header: &str) -> Option<Field> {
    let h = header.trim().to_lowercase();
    if h.contains("date") {
        Some(Field::TradeDate)
    } else if h == "symbol" || h.contains("code") {
        Some(Field::Symbol)
    } else if h.contains("sector") {
        Some(Field::Sector)
    } else if h.contains("vol") {
        Some(Field::Volume)
    } else if h.contains("val") || h.contains("turnover") {
        Some(Field::Value)
    } else if h.contains("price") && !h.contains("avg") {
        Some(Field::Price)
    } else if h.contains("vwap") || h.contains("avg") {
        Some(Field::Vwap)
    } else {
        None
    }
}

/// Column-to-field mapping for one file, in column order.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    columns: Vec<Option<Field>>,
}

impl ColumnMap {
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            columns: headers.into_iter().map(|h| map_header(h.as_ref())).collect(),
        }
    }

    /// Field fed by column `index`, `None` for ignored or extra columns.
    pub fn field(&self, index: usize) -> Option<Field> {
        self.columns.get(index).copied().flatten()
    }
}
