pub mod aoi_reader;
pub mod geotiff_reader;

pub use aoi_reader::AoiReader;
pub use geotiff_reader::{GeoTiffReader, RasterData};
