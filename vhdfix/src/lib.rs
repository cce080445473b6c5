//! vhdfix - fixed-size VHD conversion for cloud upload.
//!
//! Cloud platforms such as Azure only accept VHDs whose size is an exact
//! multiple of 1 MB. This crate drives an external image engine (`qemu-img`)
//! through three conversions:
//!
//! 1. source image (VMDK by default) → flat raw image
//! 2. raw image resized to the next MB boundary
//! 3. raw image → fixed VHD
//!
//! The engine sits behind the [`engine::Inspector`] and [`engine::Converter`]
//! traits so the sequencing in [`pipeline::Pipeline`] can be exercised
//! without `qemu-img` installed.

pub mod disk;
pub mod engine;
pub mod options;
pub mod pipeline;
pub mod util;

pub use disk::{Disk, DiskFormat, calc_target_size, checked_target_size};
pub use engine::{Converter, Inspector, QemuImg};
pub use options::VhdfixOptions;
pub use pipeline::{ConversionReport, Pipeline, SizePlan};

pub use vhdfix_shared::{Stage, VhdfixError, VhdfixResult};
