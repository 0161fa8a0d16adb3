pub mod smu;

pub use smu::SmuMetric;
