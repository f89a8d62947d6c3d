/// Open-Meteo historical archive endpoint
pub const ARCHIVE_API_BASE_URL: &str = "https://archive-api.open-meteo.com";
pub const ARCHIVE_API_PATH: &str = "/v1/archive";
pub const DAILY_VARIABLE: &str = "precipitation_sum";

/// HTTP behavior
pub const HTTP_CACHE_DIR: &str = ".cache";
pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const RETRY_MIN_BACKOFF_MS: u64 = 200;
pub const RETRY_MAX_BACKOFF_SECS: u64 = 10;

/// Rasterization defaults
pub const DEFAULT_RAINY_THRESHOLD_MM: f32 = 1.0;
pub const DEFAULT_RESOLUTION_DEG: f64 = 0.01;
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_RASTER_PREFIX: &str = "rainy_days";

/// GeoTIFF tags the tiff crate has no named variants for
pub const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
pub const TAG_MODEL_TIEPOINT: u16 = 33922;
pub const TAG_GEO_KEY_DIRECTORY: u16 = 34735;
pub const TAG_GDAL_NODATA: u16 = 42113;
pub const GDAL_NODATA_VALUE: &str = "nan";

/// GeoKey ids and values used in the key directory
pub const GEO_KEY_MODEL_TYPE: u16 = 1024;
pub const GEO_KEY_RASTER_TYPE: u16 = 1025;
pub const GEO_KEY_GEOGRAPHIC_TYPE: u16 = 2048;
pub const GEO_KEY_PROJECTED_TYPE: u16 = 3072;
pub const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
pub const RASTER_TYPE_PIXEL_IS_AREA: u16 = 1;

/// EPSG codes
pub const EPSG_WGS84: u16 = 4326;
pub const EPSG_WORLD_MERCATOR: u16 = 3395;

/// Month display names, indexed by month number - 1
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
