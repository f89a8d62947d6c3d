pub mod constants;
pub mod filename;
pub mod progress;
pub mod projection;

pub use constants::*;
pub use filename::monthly_raster_path;
pub use progress::ProgressReporter;
pub use projection::{mercator_forward, mercator_inverse};
