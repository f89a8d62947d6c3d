use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

use crate::analyzers::RasterAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::error::{PipelineError, Result};
use crate::fetchers::OpenMeteoClient;
use crate::models::{RasterSet, WeatherQuery};
use crate::processors::{AoiRasterizer, RainyDayCounter};
use crate::readers::{AoiReader, GeoTiffReader};
use crate::utils::constants::{DEFAULT_RASTER_PREFIX, MONTH_NAMES};
use crate::utils::filename::default_output_dir;
use crate::utils::progress::ProgressReporter;
use crate::writers::{GeoTiffWriter, PngRenderer};

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Generate {
            aoi,
            start_date,
            end_date,
            threshold,
            resolution,
            output_dir,
            max_workers,
            no_cache,
            max_retries,
            json,
        } => {
            let started = Instant::now();
            let start = parse_date(&start_date)?;
            let end = parse_date(&end_date)?;
            let output_dir = output_dir.unwrap_or_else(default_output_dir);

            println!("Generating monthly rainy-day rasters...");
            println!("AOI file: {}", aoi.display());
            println!("Date range: {} to {}", start, end);
            println!("Threshold: {} mm, Resolution: {}", threshold, resolution);

            let area = AoiReader::new().read(&aoi)?;
            println!(
                "Loaded {} ({} polygons, {} CRS)",
                area.name(),
                area.polygon_count(),
                area.crs()
            );

            let (lat, lon) = area.centroid_lat_lon()?;
            println!("Centroid: {:.5}, {:.5}", lat, lon);

            let query = WeatherQuery::new(lat, lon, start, end);
            let mut client = OpenMeteoClient::new().with_max_retries(max_retries);
            if no_cache {
                client = client.without_cache();
            }

            let progress = ProgressReporter::new_spinner("Fetching daily precipitation...", false);
            let series = client.fetch_daily_precipitation(&query).await?;
            progress.finish_with_message(&format!(
                "Fetched {} days ({} missing)",
                series.len(),
                series.missing_count()
            ));

            let counter = RainyDayCounter::new().with_threshold(threshold);
            let counts = counter.count(&series);
            println!(
                "Months covered: {}, total rainy days: {}",
                counts.len(),
                counts.values().sum::<u32>()
            );

            let rasterizer = AoiRasterizer::new()
                .with_resolution(resolution)
                .with_max_workers(max_workers);
            let spec = rasterizer.grid_spec(&area)?;
            println!(
                "Grid: {}x{} cells at {} degrees",
                spec.width, spec.height, spec.resolution
            );

            let mask_progress =
                ProgressReporter::new(spec.height as u64, "Rasterizing footprint...", false);
            let mask = rasterizer.footprint_mask(&area, &spec, Some(&mask_progress))?;
            mask_progress.finish_with_message("Footprint rasterized");

            let writer = GeoTiffWriter::new();
            let mut rasters = RasterSet::new(DEFAULT_RASTER_PREFIX);

            let write_progress =
                ProgressReporter::new(counts.len() as u64, "Writing rasters...", false);
            for (&month, &rainy_days) in &counts {
                write_progress
                    .set_message(&format!("Writing {}...", MONTH_NAMES[(month - 1) as usize]));
                let raster = rasterizer.burn_month(&spec, &mask, month, rainy_days)?;
                let path = writer.write_monthly(&raster, &output_dir, DEFAULT_RASTER_PREFIX)?;
                rasters.insert(month, path)?;
                write_progress.increment(1);
            }
            write_progress.finish_with_message(&format!("Wrote {} rasters", rasters.len()));

            if json {
                println!("{}", serde_json::to_string_pretty(&rasters)?);
            } else {
                println!("\nOutput files:");
                for (month, path) in rasters.iter() {
                    println!(
                        "  {:<9} {}",
                        MONTH_NAMES[(month - 1) as usize],
                        path.display()
                    );
                }
            }
            println!(
                "\nGeneration complete in {:.1}s",
                started.elapsed().as_secs_f64()
            );
        }

        Commands::Centroid { aoi, json } => {
            let area = AoiReader::new().read(&aoi)?;
            let (lat, lon) = area.centroid_lat_lon()?;

            if json {
                let payload = serde_json::json!({
                    "name": area.name(),
                    "source": area.source(),
                    "crs": area.crs().to_string(),
                    "latitude": lat,
                    "longitude": lon,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "AOI: {} ({} polygons, {} CRS)",
                    area.name(),
                    area.polygon_count(),
                    area.crs()
                );
                println!("Centroid: latitude {:.6}, longitude {:.6}", lat, lon);
            }
        }

        Commands::Fetch {
            aoi,
            latitude,
            longitude,
            start_date,
            end_date,
            threshold,
            no_cache,
            json,
        } => {
            let start = parse_date(&start_date)?;
            let end = parse_date(&end_date)?;

            let (lat, lon, label) = match (aoi, latitude, longitude) {
                (Some(path), _, _) => {
                    let area = AoiReader::new().read(&path)?;
                    let (lat, lon) = area.centroid_lat_lon()?;
                    (lat, lon, area.name().to_string())
                }
                (None, Some(lat), Some(lon)) => (lat, lon, format!("{:.4}, {:.4}", lat, lon)),
                _ => {
                    return Err(PipelineError::Config(
                        "either --aoi or both --latitude and --longitude are required".to_string(),
                    ))
                }
            };

            let query = WeatherQuery::new(lat, lon, start, end);
            let mut client = OpenMeteoClient::new();
            if no_cache {
                client = client.without_cache();
            }

            let progress = ProgressReporter::new_spinner("Fetching daily precipitation...", false);
            let series = client.fetch_daily_precipitation(&query).await?;
            progress.finish_with_message(&format!("Fetched {} days", series.len()));

            let counter = RainyDayCounter::new().with_threshold(threshold);
            let counts = counter.count(&series);

            if json {
                let payload = serde_json::json!({
                    "location": label,
                    "latitude": lat,
                    "longitude": lon,
                    "start_date": start.to_string(),
                    "end_date": end.to_string(),
                    "threshold_mm": threshold,
                    "days": series.len(),
                    "missing_days": series.missing_count(),
                    "total_mm": series.total_mm(),
                    "rainy_days_per_month": counts,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("\nDaily precipitation at {} ({} to {})", label, start, end);
                println!("Days: {} total, {} missing", series.len(), series.missing_count());
                println!("Total precipitation: {:.1} mm", series.total_mm());
                if let Some((date, mm)) = series.max_day() {
                    println!("Wettest day: {} ({:.1} mm)", date, mm);
                }

                println!("\nRainy days per month (> {} mm):", counter.threshold_mm());
                for (month, count) in &counts {
                    println!("  {:<9} {}", MONTH_NAMES[(*month - 1) as usize], count);
                }
            }
        }

        Commands::View {
            file,
            output,
            cmap,
            title,
        } => {
            println!("Reading raster: {}", file.display());
            let raster = GeoTiffReader::new().read(&file)?;

            let stats = RasterAnalyzer::new().analyze(&raster);
            if let Some(title) = title {
                println!("\n{}", title);
            }
            println!("\n{}", stats.summary());

            let output = output.unwrap_or_else(|| file.with_extension("png"));
            PngRenderer::new().with_colormap(cmap).render(&raster, &output)?;
            println!("\nRendered {}", output.display());
        }
    }

    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?)
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let default_filter = if verbose {
        "rainraster=debug"
    } else {
        "rainraster=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}
