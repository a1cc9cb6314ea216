use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use common::{normalize_label, TradeRecord};

use crate::header::{ColumnMap, Field};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// Slash dates read month-first, dash and dot dates day-first. Day-first slash
// is only tried once month-first has failed (e.g. "25/12/2024").
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d-%B-%Y",
    "%B %d, %Y",
    "%B %d %Y",
];

/// Why a data row was not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    MissingDate,
    UnparseableDate(String),
    MissingSymbol,
    Unreadable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingDate => write!(f, "missing date"),
            SkipReason::UnparseableDate(raw) => write!(f, "unparseable date '{raw}'"),
            SkipReason::MissingSymbol => write!(f, "missing symbol"),
            SkipReason::Unreadable(e) => write!(f, "unreadable row: {e}"),
        }
    }
}

/// Parse a textual date into a calendar date. `None` when no known shape fits.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(s, "%Y%m%d").ok().or_else(|| {
            let (y, rest) = s.split_at(4);
            let (m, d) = rest.split_at(2);
            NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
        });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a numeric cell after stripping thousands separators and whitespace.
/// Non-numeric and non-finite content yields `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn non_negative(v: f64) -> Option<f64> {
    (v >= 0.0).then_some(v)
}

fn positive(v: f64) -> Option<f64> {
    (v > 0.0).then_some(v)
}

/// Turns raw CSV rows of one file into canonical trade records.
#[derive(Debug, Clone)]
pub struct RowNormalizer {
    columns: ColumnMap,
    default_sector: Option<String>,
}

#[derive(Default)]
struct RawFields<'a> {
    trade_date: Option<&'a str>,
    symbol: Option<&'a str>,
    sector: Option<&'a str>,
    volume: Option<&'a str>,
    value: Option<&'a str>,
    price: Option<&'a str>,
    vwap: Option<&'a str>,
}

impl RowNormalizer {
    pub fn new(columns: ColumnMap, default_sector: Option<&str>) -> Self {
        Self {
            columns,
            default_sector: default_sector.and_then(normalize_label),
        }
    }

    /// Normalize one data row. `source_row` is its 1-based position in the file.
    pub fn normalize(&self, fields: &[String], source_row: i64) -> Result<TradeRecord, SkipReason> {
        let mut raw = RawFields::default();
        for (i, cell) in fields.iter().enumerate() {
            let slot = match self.columns.field(i) {
                Some(Field::TradeDate) => &mut raw.trade_date,
                Some(Field::Symbol) => &mut raw.symbol,
                Some(Field::Sector) => &mut raw.sector,
                Some(Field::Volume) => &mut raw.volume,
                Some(Field::Value) => &mut raw.value,
                Some(Field::Price) => &mut raw.price,
                Some(Field::Vwap) => &mut raw.vwap,
                None => continue,
            };
            *slot = Some(cell.as_str());
        }

        let date_text = raw
            .trade_date
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(SkipReason::MissingDate)?;
        let trade_date =
            parse_date(date_text).ok_or_else(|| SkipReason::UnparseableDate(date_text.to_string()))?;
        let symbol = raw
            .symbol
            .and_then(normalize_label)
            .ok_or(SkipReason::MissingSymbol)?;

        let sector = raw
            .sector
            .and_then(normalize_label)
            .or_else(|| self.default_sector.clone());

        Ok(TradeRecord {
            trade_date,
            symbol,
            sector,
            volume: raw
                .volume
                .and_then(parse_number)
                .and_then(non_negative)
                .map(|v| v.trunc() as i64),
            value: raw.value.and_then(parse_number).and_then(non_negative),
            price: raw.price.and_then(parse_number).and_then(positive),
            vwap: raw.vwap.and_then(parse_number).and_then(positive),
            source_row,
            raw_json: serde_json::to_string(fields).unwrap_or_else(|_| "[]".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_iso_and_timestamped_dates() {
        assert_eq!(parse_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date(" 2024-01-15 10:30:00 "), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024-01-15T23:59:59+05:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("2024/01/15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("20240115"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn separator_decides_day_month_order() {
        assert_eq!(parse_date("01/02/2024"), Some(ymd(2024, 1, 2)));
        assert_eq!(parse_date("25/12/2024"), Some(ymd(2024, 12, 25)));
        assert_eq!(parse_date("01-02-2024"), Some(ymd(2024, 2, 1)));
        assert_eq!(parse_date("01.02.2024"), Some(ymd(2024, 2, 1)));
    }

    #[test]
    fn parses_month_names() {
        assert_eq!(parse_date("15 Jan 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("15-Jan-2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("Jan 15, 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_date("January 15, 2024"), Some(ymd(2024, 1, 15)));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-45"), None);
        assert_eq!(parse_date("99999999"), None);
    }

    #[test]
    fn numbers_strip_separators_and_whitespace() {
        assert_eq!(parse_number("1,234,567.50"), Some(1_234_567.5));
        assert_eq!(parse_number(" 12 000 "), Some(12_000.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn normalizes_a_full_row() {
        let columns = ColumnMap::from_headers(["Date", "Symbol", "Sector", "Volume", "Value", "Price", "VWAP"]);
        let n = RowNormalizer::new(columns, None);
        let rec = n
            .normalize(
                &row(&["2024-02-01", " abc ", "tech", "1,500", "15,300.75", "10.2", "10.19"]),
                4,
            )
            .unwrap();
        assert_eq!(rec.trade_date, ymd(2024, 2, 1));
        assert_eq!(rec.symbol, "ABC");
        assert_eq!(rec.sector.as_deref(), Some("TECH"));
        assert_eq!(rec.volume, Some(1500));
        assert_eq!(rec.value, Some(15_300.75));
        assert_eq!(rec.price, Some(10.2));
        assert_eq!(rec.vwap, Some(10.19));
        assert_eq!(rec.source_row, 4);
        assert_eq!(
            rec.raw_json,
            r#"["2024-02-01"," abc ","tech","1,500","15,300.75","10.2","10.19"]"#
        );
    }

    #[test]
    fn bad_numbers_become_null_without_failing_the_row() {
        let columns = ColumnMap::from_headers(["Date", "Code", "Vol", "Turnover", "Price"]);
        let n = RowNormalizer::new(columns, None);
        let rec = n
            .normalize(&row(&["2024-02-01", "X", "n/a", "-5", "0"]), 1)
            .unwrap();
        assert_eq!(rec.volume, None);
        assert_eq!(rec.value, None);
        assert_eq!(rec.price, None);
    }

    #[test]
    fn default_sector_fills_blank_sector() {
        let columns = ColumnMap::from_headers(["Date", "Code", "Sector"]);
        let n = RowNormalizer::new(columns.clone(), Some(" banks "));
        let filled = n.normalize(&row(&["2024-02-01", "X", "  "]), 1).unwrap();
        assert_eq!(filled.sector.as_deref(), Some("BANKS"));
        let kept = n.normalize(&row(&["2024-02-01", "X", "energy"]), 2).unwrap();
        assert_eq!(kept.sector.as_deref(), Some("ENERGY"));

        let no_default = RowNormalizer::new(columns, None);
        assert_eq!(no_default.normalize(&row(&["2024-02-01", "X", ""]), 3).unwrap().sector, None);
    }

    #[test]
    fn rows_without_date_or_symbol_are_skipped() {
        let columns = ColumnMap::from_headers(["Date", "Code"]);
        let n = RowNormalizer::new(columns, None);
        assert_eq!(n.normalize(&row(&["", "X"]), 1), Err(SkipReason::MissingDate));
        assert_eq!(
            n.normalize(&row(&["someday", "X"]), 2),
            Err(SkipReason::UnparseableDate("someday".into()))
        );
        assert_eq!(n.normalize(&row(&["2024-01-01", "  "]), 3), Err(SkipReason::MissingSymbol));
        assert_eq!(n.normalize(&row(&["2024-01-01"]), 4), Err(SkipReason::MissingSymbol));
    }

    #[test]
    fn later_duplicate_column_wins() {
        let columns = ColumnMap::from_headers(["Date", "Code", "Stock Code"]);
        let n = RowNormalizer::new(columns, None);
        let rec = n.normalize(&row(&["2024-01-01", "OLD", "new"]), 1).unwrap();
        assert_eq!(rec.symbol, "NEW");
    }
}
