pub mod collector;

pub use collector::{CollectorConfig, SmuCollector};
