use std::path::PathBuf;

use clap::Parser;

/// Fixes VMware images for upload to Azure.
///
/// Azure requires every VHD size to be a multiple of 1 MB. The image is
/// converted to raw, grown to the next MB boundary plus one MB, and written
/// as a fixed VHD next to the source (`<FILENAME>.vhd`).
#[derive(Parser, Debug)]
#[command(name = "vhdfix", author, version, about, long_about = None)]
pub struct Cli {
    /// VMDK filename
    #[arg(short, long, value_name = "FILENAME")]
    pub filename: PathBuf,
}
