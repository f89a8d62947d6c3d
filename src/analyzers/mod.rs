pub mod raster_analyzer;

pub use raster_analyzer::{RasterAnalyzer, RasterStats};
