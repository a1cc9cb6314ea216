pub mod classifier;
pub mod config;

pub use classifier::{shortlist, BuyChecks, SellChecks, SignalClassifier, SymbolInputs, SymbolMetrics};
pub use config::SignalThresholds;
