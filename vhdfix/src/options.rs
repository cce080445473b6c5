//! Configuration for vhdfix.
//!
//! The only required input of a run is the source path, which the caller
//! passes to the pipeline directly. Everything here is optional and comes
//! from the environment.

use std::path::PathBuf;

use vhdfix_shared::constants::envs;
use vhdfix_shared::errors::VhdfixResult;

use crate::disk::DiskFormat;

/// Runtime options for a conversion run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VhdfixOptions {
    /// Explicit qemu-img binary. When `None`, qemu-img is searched in PATH.
    pub qemu_img: Option<PathBuf>,

    /// Format the source image is read as.
    ///
    /// Default: vmdk
    pub source_format: DiskFormat,
}

impl Default for VhdfixOptions {
    fn default() -> Self {
        Self {
            qemu_img: None,
            source_format: DiskFormat::Vmdk,
        }
    }
}

impl VhdfixOptions {
    /// Read options from `VHDFIX_QEMU_IMG` and `VHDFIX_SOURCE_FORMAT`.
    pub fn from_env() -> VhdfixResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Read options through `lookup`, which maps a variable name to its value.
    pub fn from_vars<F>(lookup: F) -> VhdfixResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();

        if let Some(path) = lookup(envs::QEMU_IMG).filter(|v| !v.is_empty()) {
            options.qemu_img = Some(PathBuf::from(path));
        }

        if let Some(format) = lookup(envs::SOURCE_FORMAT).filter(|v| !v.is_empty()) {
            options.source_format = format.parse()?;
        }

        Ok(options)
    }
}
