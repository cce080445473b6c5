use vhdfix::{Disk, Pipeline, QemuImg, VhdfixOptions};

use crate::cli::Cli;

pub fn execute(args: Cli) -> anyhow::Result<()> {
    let options = VhdfixOptions::from_env()?;
    let engine = QemuImg::from_options(&options)?;
    let source = Disk::new(args.filename, options.source_format);

    let report = Pipeline::new(engine).run(&source, |sizes| {
        println!("Size of VM is: {} bytes", sizes.original_size);
        println!("New size of VM (Plus 1MB): {} bytes", sizes.target_size);
    })?;

    tracing::info!(output = %report.output.display(), "Conversion complete");
    Ok(())
}
