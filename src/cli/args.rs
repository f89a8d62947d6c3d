use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::constants::{
    DEFAULT_MAX_RETRIES, DEFAULT_RAINY_THRESHOLD_MM, DEFAULT_RESOLUTION_DEG,
};
use crate::writers::ColorMap;

#[derive(Parser)]
#[command(name = "rainraster")]
#[command(about = "Monthly rainy-day rasters for an area of interest")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate one rainy-day GeoTIFF per calendar month for an AOI
    Generate {
        #[arg(short, long, help = "AOI vector file (shapefile or GeoJSON)")]
        aoi: PathBuf,

        #[arg(short, long, help = "First day of the range (YYYY-MM-DD)")]
        start_date: String,

        #[arg(short, long, help = "Last day of the range (YYYY-MM-DD)")]
        end_date: String,

        #[arg(
            long,
            default_value_t = DEFAULT_RAINY_THRESHOLD_MM,
            help = "Daily precipitation above this counts as rainy (mm)"
        )]
        threshold: f32,

        #[arg(
            short,
            long,
            default_value_t = DEFAULT_RESOLUTION_DEG,
            help = "Raster cell size in degrees"
        )]
        resolution: f64,

        #[arg(short, long, help = "Output directory [default: output]")]
        output_dir: Option<PathBuf>,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,

        #[arg(long, default_value = "false", help = "Bypass the HTTP response cache")]
        no_cache: bool,

        #[arg(
            long,
            default_value_t = DEFAULT_MAX_RETRIES,
            help = "Retry attempts for failed archive requests"
        )]
        max_retries: u32,

        #[arg(long, default_value = "false", help = "Emit the output file map as JSON")]
        json: bool,
    },

    /// Print the AOI centroid the weather queries will use
    Centroid {
        #[arg(short, long, help = "AOI vector file (shapefile or GeoJSON)")]
        aoi: PathBuf,

        #[arg(long, default_value = "false", help = "Emit JSON instead of text")]
        json: bool,
    },

    /// Fetch the daily series and print monthly rainy-day counts
    Fetch {
        #[arg(short, long, help = "AOI vector file (shapefile or GeoJSON)")]
        aoi: Option<PathBuf>,

        #[arg(
            long,
            requires = "longitude",
            conflicts_with = "aoi",
            help = "Query latitude, as an alternative to an AOI file"
        )]
        latitude: Option<f64>,

        #[arg(long, requires = "latitude", conflicts_with = "aoi")]
        longitude: Option<f64>,

        #[arg(short, long, help = "First day of the range (YYYY-MM-DD)")]
        start_date: String,

        #[arg(short, long, help = "Last day of the range (YYYY-MM-DD)")]
        end_date: String,

        #[arg(long, default_value_t = DEFAULT_RAINY_THRESHOLD_MM)]
        threshold: f32,

        #[arg(long, default_value = "false", help = "Bypass the HTTP response cache")]
        no_cache: bool,

        #[arg(long, default_value = "false", help = "Emit JSON instead of text")]
        json: bool,
    },

    /// Summarize an existing raster and render it to a PNG
    View {
        #[arg(help = "GeoTIFF file to display")]
        file: PathBuf,

        #[arg(short, long, help = "Output PNG path [default: input with .png extension]")]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "viridis")]
        cmap: ColorMap,

        #[arg(long, help = "Title printed above the summary")]
        title: Option<String>,
    },
}
