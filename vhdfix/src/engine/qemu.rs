//! qemu-img backed engine.
//!
//! Every operation is one blocking `qemu-img` invocation. Stdout is only
//! consumed by `info`; stderr is captured and carried in the error so the
//! CLI can surface it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde::Deserialize;
use vhdfix_shared::constants::engine::{QEMU_IMG_BINARY, VPC_FIXED_OPTIONS};
use vhdfix_shared::errors::{VhdfixError, VhdfixResult};

use super::{Converter, Inspector};
use crate::disk::{Disk, DiskFormat};
use crate::options::VhdfixOptions;
use crate::util;

/// Subset of `qemu-img info --output json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ImageInfo {
    pub virtual_size: u64,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub actual_size: Option<u64>,
}

impl ImageInfo {
    /// Parse the JSON document printed by `qemu-img info --output json`.
    pub fn parse(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }
}

/// Engine implementation running the `qemu-img` binary.
#[derive(Debug, Clone)]
pub struct QemuImg {
    binary: PathBuf,
}

impl QemuImg {
    /// Use the qemu-img binary at `binary`.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Locate qemu-img from options (explicit override, then PATH).
    pub fn from_options(options: &VhdfixOptions) -> VhdfixResult<Self> {
        let binary = util::find_binary(QEMU_IMG_BINARY, options.qemu_img.as_deref())?;
        tracing::debug!(binary = %binary.display(), "Using qemu-img");
        Ok(Self::new(binary))
    }

    /// Path of the binary this engine runs.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn info_args(image: &Disk) -> Vec<OsString> {
        vec![
            "info".into(),
            "-f".into(),
            image.format().as_str().into(),
            "--output".into(),
            "json".into(),
            image.path().into(),
        ]
    }

    fn convert_args(
        source: &Disk,
        target_path: &Path,
        target_format: DiskFormat,
        options: Option<&str>,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "convert".into(),
            "-f".into(),
            source.format().as_str().into(),
            "-O".into(),
            target_format.as_str().into(),
        ];
        if let Some(options) = options {
            args.push("-o".into());
            args.push(options.into());
        }
        args.push(source.path().into());
        args.push(target_path.into());
        args
    }

    fn resize_args(raw: &Disk, target_bytes: u64) -> Vec<OsString> {
        vec![
            "resize".into(),
            "-f".into(),
            raw.format().as_str().into(),
            raw.path().into(),
            target_bytes.to_string().into(),
        ]
    }

    /// Run qemu-img with `args`, returning the process output.
    ///
    /// The `Err` side is a spawn failure message; the exit status is left
    /// to the caller.
    fn run(&self, args: &[OsString]) -> Result<Output, String> {
        tracing::debug!(
            "Running {} {}",
            self.binary.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| format!("Failed to run {}: {}", self.binary.display(), e))
    }

    /// Run and turn a spawn failure or non-zero exit into `(reason, exit_code)`.
    fn run_checked(&self, args: &[OsString]) -> Result<Output, (String, Option<i32>)> {
        let output = self.run(args).map_err(|reason| (reason, None))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output.status.code();
            return Err((
                format!("qemu-img {}: {}", describe_exit(code), stderr.trim()),
                code,
            ));
        }
        Ok(output)
    }
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

impl Inspector for QemuImg {
    fn virtual_size(&self, image: &Disk) -> VhdfixResult<u64> {
        let path = image.path().display().to_string();
        let output = self
            .run_checked(&Self::info_args(image))
            .map_err(|(reason, code)| VhdfixError::inspection(&path, reason, code))?;

        let info = ImageInfo::parse(&output.stdout).map_err(|e| {
            VhdfixError::inspection(
                &path,
                format!("Failed to parse qemu-img info output: {}", e),
                None,
            )
        })?;

        tracing::debug!(
            virtual_size = info.virtual_size,
            actual_size = ?info.actual_size,
            format = ?info.format,
            "Inspected {}",
            path
        );
        Ok(info.virtual_size)
    }
}

impl Converter for QemuImg {
    fn convert_to_intermediate(&self, source: &Disk, raw_path: &Path) -> VhdfixResult<Disk> {
        let args = Self::convert_args(source, raw_path, DiskFormat::Raw, None);
        self.run_checked(&args).map_err(|(reason, code)| {
            VhdfixError::conversion(
                source.path().display().to_string(),
                raw_path.display().to_string(),
                reason,
                code,
            )
        })?;
        Ok(Disk::new(raw_path, DiskFormat::Raw))
    }

    fn resize(&self, raw: &Disk, target_bytes: u64) -> VhdfixResult<()> {
        let path = raw.path().display().to_string();
        if raw.format() != DiskFormat::Raw {
            return Err(VhdfixError::resize(
                path,
                target_bytes,
                format!("only raw images can be resized, got {}", raw.format()),
                None,
            ));
        }

        self.run_checked(&Self::resize_args(raw, target_bytes))
            .map_err(|(reason, code)| VhdfixError::resize(path, target_bytes, reason, code))?;
        Ok(())
    }

    fn convert_to_output(&self, raw: &Disk, output_path: &Path) -> VhdfixResult<Disk> {
        let args = Self::convert_args(raw, output_path, DiskFormat::Vpc, Some(VPC_FIXED_OPTIONS));
        self.run_checked(&args).map_err(|(reason, code)| {
            VhdfixError::conversion(
                raw.path().display().to_string(),
                output_path.display().to_string(),
                reason,
                code,
            )
        })?;
        Ok(Disk::new(output_path, DiskFormat::Vpc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_parse_info() {
        let json = br#"{
            "virtual-size": 5242880,
            "filename": "disk.vmdk",
            "cluster-size": 65536,
            "format": "vmdk",
            "actual-size": 196608,
            "dirty-flag": false
        }"#;
        let info = ImageInfo::parse(json).unwrap();
        assert_eq!(info.virtual_size, 5_242_880);
        assert_eq!(info.format.as_deref(), Some("vmdk"));
        assert_eq!(info.actual_size, Some(196_608));
    }

    #[test]
    fn test_parse_info_rejects_bad_size() {
        assert!(ImageInfo::parse(br#"{"format": "vmdk"}"#).is_err());
        assert!(ImageInfo::parse(br#"{"virtual-size": -1}"#).is_err());
        assert!(ImageInfo::parse(br#"{"virtual-size": "big"}"#).is_err());
        assert!(ImageInfo::parse(b"qemu-img: not json").is_err());
    }

    #[test]
    fn test_info_args() {
        let disk = Disk::new("/vm/web.vmdk", DiskFormat::Vmdk);
        assert_eq!(
            strings(QemuImg::info_args(&disk)),
            ["info", "-f", "vmdk", "--output", "json", "/vm/web.vmdk"]
        );
    }

    #[test]
    fn test_convert_to_raw_args() {
        let disk = Disk::new("/vm/web.vmdk", DiskFormat::Vmdk);
        let args = QemuImg::convert_args(
            &disk,
            Path::new("/vm/web.vmdk.raw"),
            DiskFormat::Raw,
            None,
        );
        assert_eq!(
            strings(args),
            [
                "convert",
                "-f",
                "vmdk",
                "-O",
                "raw",
                "/vm/web.vmdk",
                "/vm/web.vmdk.raw"
            ]
        );
    }

    #[test]
    fn test_convert_to_vpc_args() {
        let raw = Disk::new("/vm/web.vmdk.raw", DiskFormat::Raw);
        let args = QemuImg::convert_args(
            &raw,
            Path::new("/vm/web.vmdk.vhd"),
            DiskFormat::Vpc,
            Some(VPC_FIXED_OPTIONS),
        );
        assert_eq!(
            strings(args),
            [
                "convert",
                "-f",
                "raw",
                "-O",
                "vpc",
                "-o",
                "subformat=fixed,force_size",
                "/vm/web.vmdk.raw",
                "/vm/web.vmdk.vhd"
            ]
        );
    }

    #[test]
    fn test_describe_exit() {
        assert_eq!(describe_exit(Some(1)), "exited with code 1");
        assert_eq!(describe_exit(None), "was terminated by a signal");
    }

    #[test]
    fn test_resize_args() {
        let raw = Disk::new("/vm/web.vmdk.raw", DiskFormat::Raw);
        assert_eq!(
            strings(QemuImg::resize_args(&raw, 6_291_456)),
            ["resize", "-f", "raw", "/vm/web.vmdk.raw", "6291456"]
        );
    }

    #[test]
    fn test_resize_refuses_non_raw() {
        let engine = QemuImg::new("/nonexistent/qemu-img");
        let source = Disk::new("/vm/web.vmdk", DiskFormat::Vmdk);
        let err = engine.resize(&source, 6_291_456).unwrap_err();
        assert!(matches!(err, VhdfixError::Resize { exit_code: None, .. }));
        assert!(err.to_string().contains("only raw images"));
    }

    #[test]
    fn test_missing_binary_is_inspection_error() {
        let engine = QemuImg::new("/nonexistent/qemu-img");
        let disk = Disk::new("/vm/web.vmdk", DiskFormat::Vmdk);
        let err = engine.virtual_size(&disk).unwrap_err();
        assert!(matches!(err, VhdfixError::Inspection { exit_code: None, .. }));
        assert!(err.to_string().contains("Failed to run"));
    }
}
