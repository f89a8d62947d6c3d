use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use ndarray::Array2;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::utils::constants::{
    GEO_KEY_GEOGRAPHIC_TYPE, GEO_KEY_PROJECTED_TYPE, TAG_GDAL_NODATA, TAG_GEO_KEY_DIRECTORY,
    TAG_MODEL_PIXEL_SCALE, TAG_MODEL_TIEPOINT,
};

/// Band 1 of a GeoTIFF with whatever georeferencing the file carried.
///
/// Samples are widened to f32 regardless of the stored format. Optional
/// fields stay `None` when the file is a plain TIFF without geo tags.
#[derive(Debug, Clone)]
pub struct RasterData {
    pub width: usize,
    pub height: usize,
    pub data: Array2<f32>,
    pub pixel_scale: Option<(f64, f64)>,
    pub origin: Option<(f64, f64)>,
    pub nodata: Option<f32>,
    pub epsg: Option<u16>,
}

impl RasterData {
    /// Whether a cell value stands for "no data" in this raster.
    ///
    /// NaN always counts, since an f32 NaN cannot carry data; a declared
    /// non-NaN nodata value is compared by equality.
    pub fn is_nodata(&self, value: f32) -> bool {
        if value.is_nan() {
            return true;
        }
        match self.nodata {
            Some(n) if !n.is_nan() => value == n,
            _ => false,
        }
    }
}

pub struct GeoTiffReader;

impl GeoTiffReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, path: &Path) -> Result<RasterData> {
        let file = File::open(path)?;
        let mut decoder = Decoder::new(BufReader::new(file))?.with_limits(Limits::unlimited());

        let (width, height) = decoder.dimensions()?;
        let data: Vec<f32> = match decoder.read_image()? {
            DecodingResult::U8(buf) => buf.into_iter().map(f32::from).collect(),
            DecodingResult::U16(buf) => buf.into_iter().map(f32::from).collect(),
            DecodingResult::U32(buf) => buf.into_iter().map(|v| v as f32).collect(),
            DecodingResult::U64(buf) => buf.into_iter().map(|v| v as f32).collect(),
            DecodingResult::I8(buf) => buf.into_iter().map(f32::from).collect(),
            DecodingResult::I16(buf) => buf.into_iter().map(f32::from).collect(),
            DecodingResult::I32(buf) => buf.into_iter().map(|v| v as f32).collect(),
            DecodingResult::I64(buf) => buf.into_iter().map(|v| v as f32).collect(),
            DecodingResult::F32(buf) => buf,
            DecodingResult::F64(buf) => buf.into_iter().map(|v| v as f32).collect(),
            _ => {
                return Err(PipelineError::InvalidFormat(format!(
                    "unsupported sample format in '{}'",
                    path.display()
                )))
            }
        };

        let samples = decoder
            .get_tag_u32(Tag::SamplesPerPixel)
            .ok()
            .filter(|&s| s > 0)
            .unwrap_or(1) as usize;

        let expected = width as usize * height as usize * samples;
        if data.len() != expected {
            return Err(PipelineError::InvalidFormat(format!(
                "'{}' holds {} samples for {}x{} pixels with {} per pixel",
                path.display(),
                data.len(),
                width,
                height,
                samples
            )));
        }

        // multi-band files decode interleaved; keep band 1
        let data: Vec<f32> = if samples > 1 {
            data.into_iter().step_by(samples).collect()
        } else {
            data
        };

        let pixel_scale = decoder
            .get_tag_f64_vec(Tag::Unknown(TAG_MODEL_PIXEL_SCALE))
            .ok()
            .filter(|v| v.len() >= 2)
            .map(|v| (v[0], v[1]));

        let origin = decoder
            .get_tag_f64_vec(Tag::Unknown(TAG_MODEL_TIEPOINT))
            .ok()
            .filter(|v| v.len() >= 6)
            .map(|v| (v[3], v[4]));

        let nodata = decoder
            .get_tag_ascii_string(Tag::Unknown(TAG_GDAL_NODATA))
            .ok()
            .and_then(|s| s.trim_end_matches('\0').trim().parse::<f32>().ok());

        let epsg = decoder
            .get_tag_u32_vec(Tag::Unknown(TAG_GEO_KEY_DIRECTORY))
            .ok()
            .and_then(|keys| epsg_from_geo_keys(&keys));

        debug!(
            file = %path.display(),
            width,
            height,
            samples,
            ?pixel_scale,
            ?epsg,
            "decoded raster"
        );

        Ok(RasterData {
            width: width as usize,
            height: height as usize,
            data: Array2::from_shape_vec((height as usize, width as usize), data)?,
            pixel_scale,
            origin,
            nodata,
            epsg,
        })
    }
}

impl Default for GeoTiffReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull the EPSG code out of a GeoKeyDirectory: entries are quads of
/// (key id, tag location, count, value), after a 4-slot header. A
/// projected CS key outranks the geographic one when both appear.
fn epsg_from_geo_keys(keys: &[u32]) -> Option<u16> {
    let mut geographic = None;
    for entry in keys.chunks_exact(4).skip(1) {
        let (key_id, location, value) = (entry[0], entry[1], entry[3]);
        if location != 0 {
            continue;
        }
        if key_id == u32::from(GEO_KEY_PROJECTED_TYPE) {
            return Some(value as u16);
        }
        if key_id == u32::from(GEO_KEY_GEOGRAPHIC_TYPE) {
            geographic = Some(value as u16);
        }
    }
    geographic
}
