use geo::{Contains, Point};
use ndarray::Array2;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::models::{Aoi, GridSpec, MonthlyRaster};
use crate::utils::constants::DEFAULT_RESOLUTION_DEG;
use crate::utils::progress::ProgressReporter;

/// Rasterizes an AOI footprint onto a regular grid and burns per-month
/// values over it.
///
/// A cell belongs to the footprint when its center point falls inside
/// the AOI geometry; cells whose centers fall outside carry NaN in every
/// output raster. Rows are tested in parallel.
pub struct AoiRasterizer {
    resolution: f64,
    max_workers: usize,
}

impl AoiRasterizer {
    pub fn new() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION_DEG,
            max_workers: num_cpus::get(),
        }
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Grid covering the AOI's bounding rectangle at this resolution
    pub fn grid_spec(&self, aoi: &Aoi) -> Result<GridSpec> {
        GridSpec::from_bounds(aoi.bounding_rect()?, self.resolution)
    }

    /// Membership mask over the grid: true where the cell center is
    /// inside the AOI
    pub fn footprint_mask(
        &self,
        aoi: &Aoi,
        spec: &GridSpec,
        progress: Option<&ProgressReporter>,
    ) -> Result<Array2<bool>> {
        let geometry = aoi.geometry();
        let spec = *spec;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let rows: Vec<Vec<bool>> = pool.install(|| {
            (0..spec.height)
                .into_par_iter()
                .map(|row| {
                    let cells = (0..spec.width)
                        .map(|col| {
                            let (x, y) = spec.pixel_center(row, col);
                            geometry.contains(&Point::new(x, y))
                        })
                        .collect();

                    if let Some(p) = progress {
                        p.increment(1);
                    }
                    cells
                })
                .collect()
        });

        let cells: Vec<bool> = rows.into_iter().flatten().collect();
        let mask = Array2::from_shape_vec((spec.height, spec.width), cells)?;

        debug!(
            inside = mask.iter().filter(|c| **c).count(),
            total = mask.len(),
            "rasterized footprint"
        );
        Ok(mask)
    }

    /// Burn one month's rainy-day count over the footprint
    pub fn burn_month(
        &self,
        spec: &GridSpec,
        mask: &Array2<bool>,
        month: u32,
        rainy_days: u32,
    ) -> Result<MonthlyRaster> {
        if mask.dim() != (spec.height, spec.width) {
            return Err(PipelineError::InvalidFormat(format!(
                "mask shape {:?} does not match a {}x{} grid",
                mask.dim(),
                spec.height,
                spec.width
            )));
        }

        let value = rainy_days as f32;
        let grid = mask.map(|inside| if *inside { value } else { f32::NAN });

        Ok(MonthlyRaster {
            month,
            rainy_days,
            spec: *spec,
            grid,
        })
    }
}

impl Default for AoiRasterizer {
    fn default() -> Self {
        Self::new()
    }
}
