pub mod monthly_counter;
pub mod rasterizer;

pub use monthly_counter::RainyDayCounter;
pub use rasterizer::AoiRasterizer;
