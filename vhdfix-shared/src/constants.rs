//! Shared constants between the library and the CLI
//!
//! These values define the on-disk contract of a conversion run.

/// Size alignment required by the target cloud platform
pub mod alignment {
    /// One megabyte (1024 * 1024 bytes). Output disk sizes are multiples of this.
    pub const MB: u64 = 1024 * 1024;
}

/// File name suffixes for the artifacts produced next to the source image
pub mod suffix {
    /// Intermediate flat image, removed once the VHD exists
    pub const RAW: &str = ".raw";

    /// Final fixed-size VHD
    pub const VHD: &str = ".vhd";
}

/// Environment variables read by `VhdfixOptions::from_env`
pub mod envs {
    /// Explicit path to the qemu-img binary (otherwise searched in PATH)
    pub const QEMU_IMG: &str = "VHDFIX_QEMU_IMG";

    /// Source image format tag passed to qemu-img (default: vmdk)
    pub const SOURCE_FORMAT: &str = "VHDFIX_SOURCE_FORMAT";
}

/// External image engine
pub mod engine {
    /// Binary name searched in PATH
    pub const QEMU_IMG_BINARY: &str = "qemu-img";

    /// Options forcing a fixed VHD with exactly the declared size
    pub const VPC_FIXED_OPTIONS: &str = "subformat=fixed,force_size";
}
