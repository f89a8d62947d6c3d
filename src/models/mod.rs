pub mod aoi;
pub mod raster;
pub mod series;

pub use aoi::{Aoi, CrsKind};
pub use raster::{GridSpec, MonthlyRaster, RasterSet};
pub use series::{DailySeries, WeatherQuery};
