//! Disk image model and size arithmetic.
//!
//! This module provides:
//! - `Disk` - a disk image artifact on the filesystem
//! - `DiskFormat` - Disk format types (Vmdk, Raw, Vpc)
//! - `calc_target_size` - MB-aligned output size for a source image

mod image;
mod size;

pub use image::{Disk, DiskFormat};
pub use size::{calc_target_size, checked_target_size};
