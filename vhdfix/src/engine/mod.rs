//! Image engine interfaces.
//!
//! The pipeline only talks to the engine through these traits. [`QemuImg`]
//! is the production implementation; tests substitute an in-memory fake.

mod qemu;

use std::path::Path;

use vhdfix_shared::errors::VhdfixResult;

use crate::disk::Disk;

pub use qemu::{ImageInfo, QemuImg};

/// Reads image metadata.
pub trait Inspector {
    /// Virtual (guest-visible) size of `image` in bytes.
    ///
    /// Fails with `VhdfixError::Inspection`.
    fn virtual_size(&self, image: &Disk) -> VhdfixResult<u64>;
}

/// Performs the format conversions of the pipeline.
pub trait Converter {
    /// Convert `source` into a flat raw image at `raw_path`.
    ///
    /// Fails with `VhdfixError::Conversion`.
    fn convert_to_intermediate(&self, source: &Disk, raw_path: &Path) -> VhdfixResult<Disk>;

    /// Resize the raw image in place to exactly `target_bytes`.
    ///
    /// Only raw images may be resized. Fails with `VhdfixError::Resize`.
    fn resize(&self, raw: &Disk, target_bytes: u64) -> VhdfixResult<()>;

    /// Convert the raw image into a fixed-size VHD at `output_path`.
    ///
    /// Does not touch `raw`; removing it is the caller's decision. Fails with
    /// `VhdfixError::Conversion`.
    fn convert_to_output(&self, raw: &Disk, output_path: &Path) -> VhdfixResult<Disk>;
}
