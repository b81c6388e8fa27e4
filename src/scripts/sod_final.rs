use std::path::{Path, PathBuf};

use crate::submodules::{comparator::ModelComparator, errors::ComparatorResult, plot_config::ComparisonConfig};

/// Final-time profile comparison of the stellar Sod problems.
pub fn run(config: ComparisonConfig, data_dir: &Path, out_dir: &Path, dump_dir: Option<&Path>) -> ComparatorResult<Vec<PathBuf>> {
    let mut comparator = ModelComparator::new(config, data_dir, out_dir);
    if let Some(dir) = dump_dir {
        comparator = comparator.with_dump_dir(dir);
    }
    let written = comparator.run()?;
    log::info!("wrote {} figures for {} problems", written.len(), comparator.config.problems.len());
    Ok(written)
}
