use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::models::MonthlyRaster;
use crate::utils::constants::{
    EPSG_WGS84, GDAL_NODATA_VALUE, GEO_KEY_GEOGRAPHIC_TYPE, GEO_KEY_MODEL_TYPE,
    GEO_KEY_RASTER_TYPE, MODEL_TYPE_GEOGRAPHIC, RASTER_TYPE_PIXEL_IS_AREA, TAG_GDAL_NODATA,
    TAG_GEO_KEY_DIRECTORY, TAG_MODEL_PIXEL_SCALE, TAG_MODEL_TIEPOINT,
};
use crate::utils::filename::monthly_raster_path;

/// Writes monthly rasters as single-band 32-bit float GeoTIFFs.
///
/// Georeferencing is plain GeoTIFF: a pixel scale, one tiepoint anchoring
/// the top-left corner, a geographic key directory stamping EPSG:4326,
/// and the GDAL nodata convention marking NaN cells. Each file is
/// encoded into a temp file in the target directory and persisted into
/// place, so readers never see a half-written raster.
pub struct GeoTiffWriter;

impl GeoTiffWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write one raster to `path`, creating parent directories as needed
    pub fn write(&self, raster: &MonthlyRaster, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)?;
                parent
            }
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        self.encode(raster, &mut tmp)?;
        tmp.persist(path).map_err(|e| PipelineError::Io(e.error))?;

        debug!(
            path = %path.display(),
            month = raster.month,
            rainy_days = raster.rainy_days,
            "wrote GeoTIFF"
        );
        Ok(())
    }

    /// Write one raster into `dir` under the conventional monthly name
    /// and return the path
    pub fn write_monthly(
        &self,
        raster: &MonthlyRaster,
        dir: &Path,
        prefix: &str,
    ) -> Result<PathBuf> {
        let path = monthly_raster_path(dir, prefix, raster.month);
        self.write(raster, &path)?;
        Ok(path)
    }

    fn encode<W: Write + Seek>(&self, raster: &MonthlyRaster, writer: &mut W) -> Result<()> {
        let spec = &raster.spec;
        let mut encoder = TiffEncoder::new(writer)?;
        let mut image =
            encoder.new_image::<colortype::Gray32Float>(spec.width as u32, spec.height as u32)?;

        image.encoder().write_tag(
            Tag::Unknown(TAG_MODEL_PIXEL_SCALE),
            &spec.model_pixel_scale()[..],
        )?;
        image.encoder().write_tag(
            Tag::Unknown(TAG_MODEL_TIEPOINT),
            &spec.model_tiepoint()[..],
        )?;
        image.encoder().write_tag(
            Tag::Unknown(TAG_GEO_KEY_DIRECTORY),
            &self.geo_key_directory()[..],
        )?;
        image
            .encoder()
            .write_tag(Tag::Unknown(TAG_GDAL_NODATA), GDAL_NODATA_VALUE)?;

        let data = raster.grid.as_slice().ok_or_else(|| {
            PipelineError::InvalidFormat("raster grid is not contiguous".to_string())
        })?;
        image.write_data(data)?;
        Ok(())
    }

    /// GeoKeyDirectoryTag payload: the header quad, then one quad per key
    fn geo_key_directory(&self) -> [u16; 16] {
        [
            1, 1, 0, 3,
            GEO_KEY_MODEL_TYPE, 0, 1, MODEL_TYPE_GEOGRAPHIC,
            GEO_KEY_RASTER_TYPE, 0, 1, RASTER_TYPE_PIXEL_IS_AREA,
            GEO_KEY_GEOGRAPHIC_TYPE, 0, 1, EPSG_WGS84,
        ]
    }
}

impl Default for GeoTiffWriter {
    fn default() -> Self {
        Self::new()
    }
}
