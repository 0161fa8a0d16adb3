//! Pure numeric helpers for building overclock message arguments

pub mod core_mask;
pub mod frequency;
pub mod topology;
pub mod voltage;

pub use core_mask::{core_mask, CoreAddress, CoreMaskScheme, CCD_SIZE};
pub use frequency::{multiplier_to_frequency, multipliers};
pub use topology::{core_count, cpu_name, derive_core_count, CoreCount, CoreTopology};
pub use voltage::{
    vid_to_voltage, vid_to_voltage_svi3, voltage_to_vid, voltage_to_vid_svi3, VoltageScheme,
};
