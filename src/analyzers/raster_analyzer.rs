use crate::readers::RasterData;

/// Summary statistics for one raster band
#[derive(Debug)]
pub struct RasterStats {
    pub width: usize,
    pub height: usize,
    pub valid_cells: usize,
    pub nodata_cells: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f32,
    pub pixel_scale: Option<(f64, f64)>,
    pub origin: Option<(f64, f64)>,
    pub epsg: Option<u16>,
}

impl RasterStats {
    pub fn total_cells(&self) -> usize {
        self.valid_cells + self.nodata_cells
    }

    pub fn coverage_percentage(&self) -> f64 {
        if self.total_cells() == 0 {
            return 0.0;
        }
        (self.valid_cells as f64 / self.total_cells() as f64) * 100.0
    }

    pub fn summary(&self) -> String {
        let values = if self.min.is_nan() || self.max.is_nan() {
            "No valid cells".to_string()
        } else {
            format!("{:.1} to {:.1} (mean {:.2})", self.min, self.max, self.mean)
        };

        let pixel_size = match self.pixel_scale {
            Some((x, y)) => format!("{} x {}", x, y),
            None => "unknown".to_string(),
        };

        let origin = match self.origin {
            Some((x, y)) => format!("({}, {})", x, y),
            None => "unknown".to_string(),
        };

        let crs = match self.epsg {
            Some(code) => format!("EPSG:{}", code),
            None => "not tagged".to_string(),
        };

        format!(
            "Dimensions: {}x{} pixels\n\
            Coverage: {}/{} cells valid ({:.1}%)\n\
            Values: {}\n\
            Pixel Size: {}\n\
            Origin: {}\n\
            CRS: {}",
            self.width,
            self.height,
            self.valid_cells,
            self.total_cells(),
            self.coverage_percentage(),
            values,
            pixel_size,
            origin,
            crs
        )
    }
}

pub struct RasterAnalyzer;

impl RasterAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, raster: &RasterData) -> RasterStats {
        let mut valid_cells = 0usize;
        let mut nodata_cells = 0usize;
        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f64;

        for value in raster.data.iter() {
            if !value.is_finite() || raster.is_nodata(*value) {
                nodata_cells += 1;
                continue;
            }

            valid_cells += 1;
            if *value < min {
                min = *value;
            }
            if *value > max {
                max = *value;
            }
            sum += f64::from(*value);
        }

        let mean = if valid_cells > 0 {
            (sum / valid_cells as f64) as f32
        } else {
            f32::NAN
        };
        if min == f32::INFINITY {
            min = f32::NAN;
        }
        if max == f32::NEG_INFINITY {
            max = f32::NAN;
        }

        RasterStats {
            width: raster.width,
            height: raster.height,
            valid_cells,
            nodata_cells,
            min,
            max,
            mean,
            pixel_scale: raster.pixel_scale,
            origin: raster.origin,
            epsg: raster.epsg,
        }
    }
}

impl Default for RasterAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
