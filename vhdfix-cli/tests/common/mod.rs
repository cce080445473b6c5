#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock};
use std::time::Duration;
use tempfile::TempDir;

/// Stand-in for qemu-img. Sizes come from the source file's contents,
/// every invocation is appended to $FAKE_QEMU_LOG, and
/// $FAKE_QEMU_FAIL_VPC makes the VHD conversion fail with exit code 7.
const FAKE_QEMU_IMG: &str = r#"#!/bin/sh
echo "$*" >> "${FAKE_QEMU_LOG:-/dev/null}"
cmd="$1"
shift
case "$cmd" in
  info)
    for a in "$@"; do path="$a"; done
    if [ ! -f "$path" ]; then
      echo "qemu-img: Could not open '$path': No such file or directory" >&2
      exit 1
    fi
    printf '{"virtual-size": %s, "filename": "%s", "format": "vmdk"}\n' "$(cat "$path")" "$path"
    ;;
  convert)
    src=""
    dst=""
    for a in "$@"; do src="$dst"; dst="$a"; done
    case "$*" in
      *"-O vpc"*)
        if [ -n "$FAKE_QEMU_FAIL_VPC" ]; then
          echo "qemu-img: error while converting vpc: Operation not supported" >&2
          exit 7
        fi
        ;;
    esac
    cp "$src" "$dst"
    ;;
  resize)
    path=""
    size=""
    for a in "$@"; do path="$size"; size="$a"; done
    truncate -s "$size" "$path"
    echo "Image resized."
    ;;
  *)
    echo "qemu-img: unknown command '$cmd'" >&2
    exit 1
    ;;
esac
"#;

// Writing the script while another test forks can leave it busy (ETXTBSY)
static TEST_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

pub struct TestContext {
    pub cmd: Command,
    pub dir: TempDir,
    pub qemu_img: PathBuf,
    pub log: PathBuf,
    // Hold the lock until the test is done
    pub _guard: MutexGuard<'static, ()>,
}

impl TestContext {
    /// Write a source image whose reported virtual size is `virtual_size`.
    pub fn source(&self, name: &str, virtual_size: u64) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, virtual_size.to_string()).expect("Failed to write source image");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Engine invocations so far, one per line.
    pub fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path())
            .expect("Failed to list test dir")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name != "qemu-img" && name != "qemu.log")
            .collect();
        names.sort();
        names
    }
}

fn write_fake_engine(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("qemu-img");
    std::fs::write(&path, FAKE_QEMU_IMG).expect("Failed to write fake qemu-img");
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

pub fn vhdfix() -> TestContext {
    let lock = TEST_LOCK.get_or_init(|| Mutex::new(()));
    let guard = lock.lock().unwrap_or_else(|e| e.into_inner());

    let dir = TempDir::new().expect("Failed to create temp dir");
    let qemu_img = write_fake_engine(dir.path());
    let log = dir.path().join("qemu.log");

    let bin_path: &str = env!("CARGO_BIN_EXE_vhdfix");
    let mut cmd = Command::new(bin_path);
    cmd.timeout(Duration::from_secs(30));
    cmd.env("VHDFIX_QEMU_IMG", &qemu_img)
        .env("FAKE_QEMU_LOG", &log)
        .env_remove("VHDFIX_SOURCE_FORMAT")
        .env_remove("FAKE_QEMU_FAIL_VPC")
        .env_remove("RUST_LOG");

    TestContext {
        cmd,
        dir,
        qemu_img,
        log,
        _guard: guard,
    }
}
