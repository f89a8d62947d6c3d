use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use geo::Rect;
use ndarray::Array2;
use serde::Serialize;

use crate::error::{PipelineError, Result};

/// Geometry of an output raster: pixel grid dimensions plus the
/// georeferencing needed to place it.
///
/// The origin is the top-left corner; rows run north to south. Cell
/// counts are truncated from the extent/resolution ratio, matching the
/// usual GIS convention of dropping the partial trailing cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub width: usize,
    pub height: usize,
    pub min_x: f64,
    pub max_y: f64,
    pub resolution: f64,
}

impl GridSpec {
    pub fn from_bounds(bounds: Rect<f64>, resolution: f64) -> Result<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(PipelineError::InvalidFormat(format!(
                "resolution must be positive, got {}",
                resolution
            )));
        }

        let width = ((bounds.max().x - bounds.min().x) / resolution) as usize;
        let height = ((bounds.max().y - bounds.min().y) / resolution) as usize;
        if width == 0 || height == 0 {
            return Err(PipelineError::DegenerateGrid { width, height });
        }

        Ok(Self {
            width,
            height,
            min_x: bounds.min().x,
            max_y: bounds.max().y,
            resolution,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// Center of the cell at (row, col), row 0 at the top
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        let x = self.min_x + (col as f64 + 0.5) * self.resolution;
        let y = self.max_y - (row as f64 + 0.5) * self.resolution;
        (x, y)
    }

    /// ModelPixelScaleTag payload: cell size in x, y and a flat z
    pub fn model_pixel_scale(&self) -> [f64; 3] {
        [self.resolution, self.resolution, 0.0]
    }

    /// ModelTiepointTag payload tying raster (0,0) to the world origin
    pub fn model_tiepoint(&self) -> [f64; 6] {
        [0.0, 0.0, 0.0, self.min_x, self.max_y, 0.0]
    }
}

/// One month's output: the rainy-day count burned over the AOI footprint
#[derive(Debug, Clone)]
pub struct MonthlyRaster {
    pub month: u32,
    pub rainy_days: u32,
    pub spec: GridSpec,
    pub grid: Array2<f32>,
}

/// The files produced by one run, keyed by calendar month number.
///
/// Each month maps to exactly one path; a second insert for the same
/// month is an error rather than a silent overwrite.
#[derive(Debug, Clone, Serialize)]
pub struct RasterSet {
    name: String,
    files: BTreeMap<u32, PathBuf>,
}

impl RasterSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&mut self, month: u32, path: PathBuf) -> Result<()> {
        if !(1..=12).contains(&month) {
            return Err(PipelineError::InvalidMonth(month));
        }
        if self.files.contains_key(&month) {
            return Err(PipelineError::DuplicateMonth(month));
        }
        self.files.insert(month, path);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, month: u32) -> Option<&Path> {
        self.files.get(&month).map(PathBuf::as_path)
    }

    /// Months and paths in calendar order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Path)> {
        self.files.iter().map(|(m, p)| (*m, p.as_path()))
    }
}
