//! Per-family SMU register maps
//!
//! Each Zen generation moved the mailbox registers around inside the SMU
//! address space and assigned its own opcodes. This module provides one
//! [`SmuRegisterMap`](crate::mailbox::SmuRegisterMap) per layout; several
//! products share a layout.
//!
//! ## Layouts
//!
//! - **Zen** (`zen`) - Summit Ridge, Threadripper 1000
//! - **Zen+** (`zen_plus`) - Pinnacle Ridge, Colfax
//! - **Raven Ridge** (`raven_ridge`) - Raven Ridge APUs
//! - **Raven Ridge 2** (`raven_ridge2`) - Picasso APUs
//! - **Zen2** (`zen2`) - Matisse, Castle Peak, Renoir
//! - **Rome** (`rome`) - EPYC 7002

pub mod raven_ridge;
pub mod raven_ridge2;
pub mod rome;
pub mod zen;
pub mod zen2;
pub mod zen_plus;
