//! Disk image artifacts.
//!
//! A `Disk` is a path plus the format the engine should read it as. Unlike
//! an RAII handle it never deletes itself: the intermediate raw image must
//! survive a failed VHD conversion, so removal is always explicit.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use vhdfix_shared::errors::{VhdfixError, VhdfixResult};

/// Disk image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskFormat {
    /// VMware virtual disk.
    Vmdk,
    /// Flat, uncompressed image.
    Raw,
    /// Virtual PC / Hyper-V VHD (qemu-img calls it "vpc").
    Vpc,
}

impl DiskFormat {
    /// Format tag as understood by qemu-img's `-f` / `-O` options.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskFormat::Vmdk => "vmdk",
            DiskFormat::Raw => "raw",
            DiskFormat::Vpc => "vpc",
        }
    }
}

impl std::fmt::Display for DiskFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiskFormat {
    type Err = VhdfixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vmdk" => Ok(DiskFormat::Vmdk),
            "raw" => Ok(DiskFormat::Raw),
            "vpc" | "vhd" => Ok(DiskFormat::Vpc),
            other => Err(VhdfixError::Config(format!(
                "Unsupported disk format '{}' (expected vmdk, raw or vpc)",
                other
            ))),
        }
    }
}

/// A disk image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disk {
    path: PathBuf,
    format: DiskFormat,
}

impl Disk {
    /// Create a new Disk from path.
    ///
    /// # Arguments
    /// * `path` - Path to the disk file
    /// * `format` - Format the engine should read the file as
    pub fn new(path: impl Into<PathBuf>, format: DiskFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Get the disk path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the disk format.
    pub fn format(&self) -> DiskFormat {
        self.format
    }

    /// Path of an artifact stored next to this disk.
    ///
    /// The suffix is appended to the whole file name, so `disk.vmdk` with
    /// `.raw` gives `disk.vmdk.raw`.
    pub fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Whether the file currently exists.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Delete the disk file.
    pub fn remove(self) -> VhdfixResult<()> {
        std::fs::remove_file(&self.path).map_err(|e| {
            VhdfixError::Storage(format!(
                "Failed to remove disk {}: {}",
                self.path.display(),
                e
            ))
        })?;
        tracing::debug!("Removed disk: {}", self.path.display());
        Ok(())
    }
}
