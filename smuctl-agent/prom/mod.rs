pub mod smu;

pub use smu::SmuMetricExporter;
