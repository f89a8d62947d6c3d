use std::fs;
use std::path::Path;

use geo::{BoundingRect, MultiPolygon, Polygon};
use geojson::GeoJson;
use shapefile::Shape;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};
use crate::models::{Aoi, CrsKind};

/// Loads an AOI polygon file into an [`Aoi`].
///
/// Shapefiles and GeoJSON are supported. GeoJSON is geographic by
/// definition; for shapefiles the CRS kind is sniffed from the sibling
/// `.prj`, falling back to a bounds heuristic when none exists.
pub struct AoiReader;

impl AoiReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read(&self, path: &Path) -> Result<Aoi> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let (geometry, crs) = match ext.as_str() {
            "shp" => self.read_shapefile(path)?,
            "geojson" | "json" => self.read_geojson(path)?,
            _ => {
                return Err(PipelineError::InvalidFormat(format!(
                    "unsupported AOI file '{}'; expected .shp, .geojson or .json",
                    path.display()
                )))
            }
        };

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "aoi".to_string());

        debug!(
            aoi = %name,
            polygons = geometry.0.len(),
            %crs,
            "loaded AOI geometry"
        );

        Aoi::new(name, path, geometry, crs)
    }

    fn read_shapefile(&self, path: &Path) -> Result<(MultiPolygon<f64>, CrsKind)> {
        let shapes = shapefile::read_shapes(path)?;

        let mut polygons: Vec<Polygon<f64>> = Vec::new();
        for shape in shapes {
            match shape {
                Shape::Polygon(polygon) => {
                    let multi: MultiPolygon<f64> = polygon.into();
                    polygons.extend(multi.0);
                }
                Shape::NullShape => {}
                _ => {
                    return Err(PipelineError::InvalidFormat(format!(
                        "non-polygon shape in '{}'; the AOI must be a polygon layer",
                        path.display()
                    )))
                }
            }
        }

        let geometry = MultiPolygon(polygons);
        let crs = match fs::read_to_string(path.with_extension("prj")) {
            Ok(wkt) => crs_from_wkt(&wkt).ok_or_else(|| {
                PipelineError::InvalidCrs(format!(
                    "cannot classify the WKT in '{}' as projected or geographic",
                    path.with_extension("prj").display()
                ))
            })?,
            Err(_) => {
                let crs = crs_from_bounds(&geometry);
                warn!(
                    "no .prj beside '{}'; assuming {} coordinates",
                    path.display(),
                    crs
                );
                crs
            }
        };

        Ok((geometry, crs))
    }

    fn read_geojson(&self, path: &Path) -> Result<(MultiPolygon<f64>, CrsKind)> {
        let raw = fs::read_to_string(path)?;
        let geojson: GeoJson = raw.parse()?;

        let mut polygons: Vec<Polygon<f64>> = Vec::new();
        match geojson {
            GeoJson::FeatureCollection(collection) => {
                for feature in collection.features {
                    if let Some(geometry) = feature.geometry {
                        collect_polygons(geo_types::Geometry::try_from(geometry)?, &mut polygons);
                    }
                }
            }
            GeoJson::Feature(feature) => {
                if let Some(geometry) = feature.geometry {
                    collect_polygons(geo_types::Geometry::try_from(geometry)?, &mut polygons);
                }
            }
            GeoJson::Geometry(geometry) => {
                collect_polygons(geo_types::Geometry::try_from(geometry)?, &mut polygons);
            }
        }

        // RFC 7946 fixes GeoJSON to WGS84
        Ok((MultiPolygon(polygons), CrsKind::Geographic))
    }
}

impl Default for AoiReader {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_polygons(geometry: geo_types::Geometry<f64>, out: &mut Vec<Polygon<f64>>) {
    match geometry {
        geo_types::Geometry::Polygon(polygon) => out.push(polygon),
        geo_types::Geometry::MultiPolygon(multi) => out.extend(multi.0),
        geo_types::Geometry::GeometryCollection(collection) => {
            for inner in collection.0 {
                collect_polygons(inner, out);
            }
        }
        other => {
            warn!("skipping non-polygon geometry in AOI: {}", kind_of(&other));
        }
    }
}

fn kind_of(geometry: &geo_types::Geometry<f64>) -> &'static str {
    match geometry {
        geo_types::Geometry::Point(_) => "Point",
        geo_types::Geometry::Line(_) => "Line",
        geo_types::Geometry::LineString(_) => "LineString",
        geo_types::Geometry::MultiPoint(_) => "MultiPoint",
        geo_types::Geometry::MultiLineString(_) => "MultiLineString",
        geo_types::Geometry::Rect(_) => "Rect",
        geo_types::Geometry::Triangle(_) => "Triangle",
        _ => "Geometry",
    }
}

/// Projected WKT nests a GEOGCS inside the PROJCS, so PROJCS wins
fn crs_from_wkt(wkt: &str) -> Option<CrsKind> {
    let upper = wkt.to_uppercase();
    if upper.contains("PROJCS") || upper.contains("PROJCRS") {
        return Some(CrsKind::Projected);
    }
    if upper.contains("GEOGCS") || upper.contains("GEOGCRS") {
        return Some(CrsKind::Geographic);
    }
    None
}

/// Coordinates that fit inside lon/lat ranges are taken as geographic
fn crs_from_bounds(geometry: &MultiPolygon<f64>) -> CrsKind {
    match geometry.bounding_rect() {
        Some(rect)
            if rect.min().x >= -180.0
                && rect.max().x <= 180.0
                && rect.min().y >= -90.0
                && rect.max().y <= 90.0 =>
        {
            CrsKind::Geographic
        }
        Some(_) => CrsKind::Projected,
        None => CrsKind::Geographic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn geojson_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".geojson")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn write_two_square_shapefile(path: &Path) {
        let left = shapefile::Polygon::new(shapefile::PolygonRing::Outer(vec![
            shapefile::Point::new(10.0, 50.0),
            shapefile::Point::new(10.2, 50.0),
            shapefile::Point::new(10.2, 50.5),
            shapefile::Point::new(10.0, 50.5),
        ]));
        let right = shapefile::Polygon::new(shapefile::PolygonRing::Outer(vec![
            shapefile::Point::new(10.3, 50.0),
            shapefile::Point::new(10.5, 50.0),
            shapefile::Point::new(10.5, 50.5),
            shapefile::Point::new(10.3, 50.5),
        ]));

        let builder = shapefile::dbase::TableWriterBuilder::new();
        let mut writer = shapefile::Writer::from_path(path, builder).unwrap();
        writer
            .write_shape_and_record(&left, &shapefile::dbase::Record::default())
            .unwrap();
        writer
            .write_shape_and_record(&right, &shapefile::dbase::Record::default())
            .unwrap();
    }

    #[test]
    fn test_read_feature_collection() -> Result<()> {
        let file = geojson_file(
            r#"{
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": {"name": "left"},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[10.0, 50.0], [10.2, 50.0], [10.2, 50.5], [10.0, 50.5], [10.0, 50.0]]]
                    }
                }, {
                    "type": "Feature",
                    "properties": {"name": "right"},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[10.3, 50.0], [10.5, 50.0], [10.5, 50.5], [10.3, 50.5], [10.3, 50.0]]]
                    }
                }]
            }"#,
        );

        let aoi = AoiReader::new().read(file.path())?;
        assert_eq!(aoi.polygon_count(), 2);
        assert_eq!(aoi.crs(), CrsKind::Geographic);

        let rect = aoi.bounding_rect()?;
        assert!((rect.min().x - 10.0).abs() < 1e-12);
        assert!((rect.max().x - 10.5).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_read_shapefile_with_prj() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two_squares.shp");
        write_two_square_shapefile(&path);
        fs::write(
            dir.path().join("two_squares.prj"),
            r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]]]"#,
        )
        .unwrap();

        let aoi = AoiReader::new().read(&path)?;
        assert_eq!(aoi.name(), "two_squares");
        assert_eq!(aoi.polygon_count(), 2);
        assert_eq!(aoi.crs(), CrsKind::Geographic);

        let rect = aoi.bounding_rect()?;
        assert!((rect.min().x - 10.0).abs() < 1e-9);
        assert!((rect.max().x - 10.5).abs() < 1e-9);

        let (lat, lon) = aoi.centroid_lat_lon()?;
        assert!((lon - 10.25).abs() < 1e-6, "centroid lon was {}", lon);
        assert!(lat > 50.2 && lat < 50.3, "centroid lat was {}", lat);
        Ok(())
    }

    #[test]
    fn test_read_shapefile_without_prj_uses_bounds_heuristic() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.shp");
        write_two_square_shapefile(&path);

        let aoi = AoiReader::new().read(&path)?;
        assert_eq!(aoi.polygon_count(), 2);
        assert_eq!(aoi.crs(), CrsKind::Geographic);
        Ok(())
    }

    #[test]
    fn test_unclassifiable_prj_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.shp");
        write_two_square_shapefile(&path);
        fs::write(dir.path().join("local.prj"), r#"LOCAL_CS["arbitrary"]"#).unwrap();

        let result = AoiReader::new().read(&path);
        assert!(matches!(result, Err(PipelineError::InvalidCrs(_))));
    }

    #[test]
    fn test_read_bare_geometry() -> Result<()> {
        let file = geojson_file(
            r#"{
                "type": "MultiPolygon",
                "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]]
            }"#,
        );

        let aoi = AoiReader::new().read(file.path())?;
        assert_eq!(aoi.polygon_count(), 1);
        Ok(())
    }

    #[test]
    fn test_geojson_without_polygons_is_empty() {
        let file = geojson_file(
            r#"{
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "Point", "coordinates": [10.0, 50.0]}
            }"#,
        );

        let result = AoiReader::new().read(file.path());
        assert!(matches!(result, Err(PipelineError::EmptyAoi(_))));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let file = geojson_file("{not json");
        let result = AoiReader::new().read(file.path());
        assert!(matches!(result, Err(PipelineError::GeoJson(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = AoiReader::new().read(Path::new("aoi.gpkg"));
        assert!(matches!(result, Err(PipelineError::InvalidFormat(_))));
    }

    #[test]
    fn test_crs_from_wkt_geographic() {
        let wkt = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]]]"#;
        assert_eq!(crs_from_wkt(wkt), Some(CrsKind::Geographic));
    }

    #[test]
    fn test_crs_from_wkt_projected_wins_over_nested_geogcs() {
        let wkt = r#"PROJCS["WGS 84 / World Mercator",GEOGCS["WGS 84",DATUM["WGS_1984"]],PROJECTION["Mercator_1SP"]]"#;
        assert_eq!(crs_from_wkt(wkt), Some(CrsKind::Projected));
    }

    #[test]
    fn test_crs_from_wkt_unknown() {
        assert_eq!(crs_from_wkt("LOCAL_CS[\"arbitrary\"]"), None);
    }

    #[test]
    fn test_crs_from_bounds_heuristic() {
        let geographic = MultiPolygon(vec![polygon![
            (x: -3.0, y: 55.0),
            (x: -2.0, y: 55.0),
            (x: -2.0, y: 56.0),
            (x: -3.0, y: 56.0),
            (x: -3.0, y: 55.0),
        ]]);
        assert_eq!(crs_from_bounds(&geographic), CrsKind::Geographic);

        let projected = MultiPolygon(vec![polygon![
            (x: 500_000.0, y: 4_000_000.0),
            (x: 501_000.0, y: 4_000_000.0),
            (x: 501_000.0, y: 4_001_000.0),
            (x: 500_000.0, y: 4_001_000.0),
            (x: 500_000.0, y: 4_000_000.0),
        ]]);
        assert_eq!(crs_from_bounds(&projected), CrsKind::Projected);
    }
}
