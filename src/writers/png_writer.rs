use std::path::Path;

use clap::ValueEnum;
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::error::Result;
use crate::readers::RasterData;

/// Color ramps available for rendering rasters
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMap {
    Viridis,
    Blues,
    Grays,
}

const VIRIDIS_STOPS: [[f64; 3]; 5] = [
    [68.0, 1.0, 84.0],
    [59.0, 82.0, 139.0],
    [33.0, 145.0, 140.0],
    [94.0, 201.0, 98.0],
    [253.0, 231.0, 37.0],
];

const BLUES_STOPS: [[f64; 3]; 3] = [
    [247.0, 251.0, 255.0],
    [107.0, 174.0, 214.0],
    [8.0, 48.0, 107.0],
];

const GRAYS_STOPS: [[f64; 3]; 2] = [[250.0, 250.0, 250.0], [0.0, 0.0, 0.0]];

impl ColorMap {
    /// Sample the ramp at t in [0, 1]; t is clamped
    pub fn sample(&self, t: f64) -> [u8; 3] {
        let stops: &[[f64; 3]] = match self {
            ColorMap::Viridis => &VIRIDIS_STOPS,
            ColorMap::Blues => &BLUES_STOPS,
            ColorMap::Grays => &GRAYS_STOPS,
        };
        sample_stops(stops, t)
    }
}

fn sample_stops(stops: &[[f64; 3]], t: f64) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let scaled = t * (stops.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(stops.len() - 2);
    let frac = scaled - idx as f64;
    let lo = stops[idx];
    let hi = stops[idx + 1];
    [
        (lo[0] + (hi[0] - lo[0]) * frac).round() as u8,
        (lo[1] + (hi[1] - lo[1]) * frac).round() as u8,
        (lo[2] + (hi[2] - lo[2]) * frac).round() as u8,
    ]
}

fn finite_range(raster: &RasterData) -> Option<(f32, f32)> {
    let mut lo = f32::INFINITY;
    let mut hi = f32::NEG_INFINITY;
    for value in raster.data.iter() {
        if !value.is_finite() || raster.is_nodata(*value) {
            continue;
        }
        lo = lo.min(*value);
        hi = hi.max(*value);
    }
    (lo <= hi).then_some((lo, hi))
}

/// Renders raster data to a PNG.
///
/// Valid cells are normalized over the raster's finite value range and
/// mapped through the color ramp; nodata cells come out fully
/// transparent. A constant-valued raster maps to the low end of the
/// ramp, matching the usual normalize-then-colormap behavior, and a
/// raster with no valid cells at all renders as a blank transparent
/// image.
pub struct PngRenderer {
    colormap: ColorMap,
}

impl PngRenderer {
    pub fn new() -> Self {
        Self {
            colormap: ColorMap::Viridis,
        }
    }

    pub fn with_colormap(mut self, colormap: ColorMap) -> Self {
        self.colormap = colormap;
        self
    }

    pub fn render(&self, raster: &RasterData, path: &Path) -> Result<()> {
        let (lo, hi) = finite_range(raster).unwrap_or((0.0, 0.0));
        let span = if hi > lo { hi - lo } else { 1.0 };

        let mut image = RgbaImage::new(raster.width as u32, raster.height as u32);
        for ((row, col), value) in raster.data.indexed_iter() {
            let pixel = if raster.is_nodata(*value) || !value.is_finite() {
                Rgba([0, 0, 0, 0])
            } else {
                let t = f64::from((*value - lo) / span);
                let [r, g, b] = self.colormap.sample(t);
                Rgba([r, g, b, 255])
            };
            image.put_pixel(col as u32, row as u32, pixel);
        }

        image.save(path)?;
        debug!(
            path = %path.display(),
            min = lo,
            max = hi,
            colormap = ?self.colormap,
            "rendered PNG"
        );
        Ok(())
    }
}

impl Default for PngRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use tempfile::TempDir;

    fn raster(data: Array2<f32>) -> RasterData {
        RasterData {
            width: data.ncols(),
            height: data.nrows(),
            data,
            pixel_scale: None,
            origin: None,
            nodata: Some(f32::NAN),
            epsg: None,
        }
    }

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(ColorMap::Viridis.sample(0.0), [68, 1, 84]);
        assert_eq!(ColorMap::Viridis.sample(1.0), [253, 231, 37]);
        assert_eq!(ColorMap::Grays.sample(0.0), [250, 250, 250]);
        assert_eq!(ColorMap::Grays.sample(1.0), [0, 0, 0]);
    }

    #[test]
    fn test_ramp_clamps_out_of_range() {
        assert_eq!(ColorMap::Blues.sample(-0.5), ColorMap::Blues.sample(0.0));
        assert_eq!(ColorMap::Blues.sample(1.5), ColorMap::Blues.sample(1.0));
    }

    #[test]
    fn test_ramp_interpolates_between_stops() {
        // Halfway through a five-stop ramp lands exactly on the middle stop
        assert_eq!(ColorMap::Viridis.sample(0.5), [33, 145, 140]);
        assert_eq!(ColorMap::Grays.sample(0.5), [125, 125, 125]);
    }

    #[test]
    fn test_render_maps_values_and_clears_nodata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.png");
        let data =
            Array2::from_shape_vec((2, 2), vec![0.0, f32::NAN, 5.0, 10.0]).unwrap();

        PngRenderer::new().render(&raster(data), &path).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0).0, [68, 1, 84, 255]);
        assert_eq!(image.get_pixel(1, 0).0[3], 0);
        assert_eq!(image.get_pixel(0, 1).0, [33, 145, 140, 255]);
        assert_eq!(image.get_pixel(1, 1).0, [253, 231, 37, 255]);
    }

    #[test]
    fn test_render_constant_raster_uses_ramp_low_end() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flat.png");
        let data = Array2::from_elem((2, 3), 7.0);

        PngRenderer::new().render(&raster(data), &path).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.get_pixel(2, 1).0, [68, 1, 84, 255]);
    }

    #[test]
    fn test_render_all_nodata_is_fully_transparent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.png");
        let data = Array2::from_elem((2, 2), f32::NAN);

        PngRenderer::new().render(&raster(data), &path).unwrap();

        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.dimensions(), (2, 2));
        for pixel in image.pixels() {
            assert_eq!(pixel.0[3], 0);
        }
    }
}
