use std::path::{Path, PathBuf};

use crate::utils::constants::DEFAULT_OUTPUT_DIR;

/// Path for one month's raster: {dir}/{prefix}_{month}.tif
///
/// The month number is left unpadded, so a full year runs from
/// `rainy_days_1.tif` to `rainy_days_12.tif`.
pub fn monthly_raster_path(dir: &Path, prefix: &str, month: u32) -> PathBuf {
    dir.join(format!("{}_{}.tif", prefix, month))
}

/// Default output directory for generated rasters
pub fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}
