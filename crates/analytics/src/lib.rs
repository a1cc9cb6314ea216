//! Read path: aggregations, momentum windows and signal report assembly
//! over the filtered trade record set.

pub mod aggregation;
pub mod momentum;
pub mod report;

pub use momentum::{trading_window, SymbolHistory};
pub use report::{build_report, run_query, AnalyticsReport, Forecast, Windows};
