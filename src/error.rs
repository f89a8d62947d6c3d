use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest_middleware::Error),

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Archive API rejected the request ({status}): {reason}")]
    Api { status: u16, reason: String },

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Grid shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("AOI '{0}' contains no polygon geometry")]
    EmptyAoi(String),

    #[error("Unusable coordinate reference system: {0}")]
    InvalidCrs(String),

    #[error("Series misaligned: {dates} dates but {values} values")]
    SeriesMisaligned { dates: usize, values: usize },

    #[error("Raster grid is degenerate ({width}x{height}); AOI extent is smaller than one cell")]
    DegenerateGrid { width: usize, height: usize },

    #[error("Month {0} already has a raster in this run")]
    DuplicateMonth(u32),

    #[error("Invalid calendar month: {0}")]
    InvalidMonth(u32),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required data: {0}")]
    MissingData(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}
