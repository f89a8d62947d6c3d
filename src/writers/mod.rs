pub mod geotiff_writer;
pub mod png_writer;

pub use geotiff_writer::GeoTiffWriter;
pub use png_writer::{ColorMap, PngRenderer};
