//! Conversion orchestration.
//!
//! ## Architecture
//!
//! A run walks a fixed, linear sequence of stages:
//!
//! ```text
//! Start ──→ Sized ──→ ConvertedRaw ──→ Resized ──→ ConvertedOutput ──→ Done
//!   info       convert -O raw     resize       convert -O vpc
//!                                              + remove <src>.raw
//! ```
//!
//! The first failing stage aborts the run. Nothing is rolled back: if the
//! VHD conversion fails, `<src>.raw` stays on disk for inspection. Once the
//! VHD exists, failing to remove `<src>.raw` fails the run.

use std::path::PathBuf;

use vhdfix_shared::constants::suffix;
use vhdfix_shared::errors::{Stage, VhdfixError, VhdfixResult};

use crate::disk::{Disk, checked_target_size};
use crate::engine::{Converter, Inspector};

/// Sizes decided before any conversion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizePlan {
    /// Virtual size of the source image in bytes.
    pub original_size: u64,
    /// Declared size of the output VHD in bytes.
    pub target_size: u64,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub sizes: SizePlan,
}

/// Drives an engine through the conversion stages.
pub struct Pipeline<E> {
    engine: E,
}

impl<E> Pipeline<E>
where
    E: Inspector + Converter,
{
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Convert `source` into `<source>.vhd`.
    ///
    /// `on_sized` is called once the sizes are known and before the first
    /// conversion starts.
    pub fn run<F>(&self, source: &Disk, on_sized: F) -> VhdfixResult<ConversionReport>
    where
        F: FnOnce(&SizePlan),
    {
        let mut stage = Stage::Start;
        let result = self.run_stages(source, on_sized, &mut stage);

        if let Err(e) = &result {
            tracing::error!(
                stage = %stage.next(),
                source = %source.path().display(),
                "Conversion aborted: {}",
                e
            );
        }
        result
    }

    fn run_stages<F>(
        &self,
        source: &Disk,
        on_sized: F,
        stage: &mut Stage,
    ) -> VhdfixResult<ConversionReport>
    where
        F: FnOnce(&SizePlan),
    {
        let raw_path = source.sibling_path(suffix::RAW);
        let output_path = source.sibling_path(suffix::VHD);

        let original_size = self.engine.virtual_size(source)?;
        let target_size = checked_target_size(original_size).ok_or_else(|| {
            VhdfixError::InvalidArgument(format!(
                "Virtual size {} of {} is too large to align",
                original_size,
                source.path().display()
            ))
        })?;
        let sizes = SizePlan {
            original_size,
            target_size,
        };
        advance(stage, Stage::Sized);
        tracing::info!(original_size, target_size, "Computed target size");
        on_sized(&sizes);

        let raw = self.engine.convert_to_intermediate(source, &raw_path)?;
        advance(stage, Stage::ConvertedRaw);

        self.engine.resize(&raw, target_size)?;
        advance(stage, Stage::Resized);

        let output = self.engine.convert_to_output(&raw, &output_path)?;
        advance(stage, Stage::ConvertedOutput);

        raw.remove()?;

        advance(stage, Stage::Done);
        Ok(ConversionReport {
            source: source.path().to_path_buf(),
            output: output.path().to_path_buf(),
            sizes,
        })
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    tracing::info!(from = %stage, to = %next, "Stage complete");
    *stage = next;
}
