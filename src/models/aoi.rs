use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use geo::{BoundingRect, Centroid, Coord, MapCoords, MultiPolygon, Point, Rect};
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::utils::constants::EPSG_WORLD_MERCATOR;
use crate::utils::projection::{mercator_forward, mercator_inverse};

/// Kind of coordinate reference system the AOI source file uses.
///
/// Only the geographic/projected distinction matters here: geographic
/// geometry takes a detour through World Mercator before its centroid is
/// meaningful, projected geometry is already planar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrsKind {
    Geographic,
    Projected,
}

impl fmt::Display for CrsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrsKind::Geographic => write!(f, "geographic"),
            CrsKind::Projected => write!(f, "projected"),
        }
    }
}

/// Area of interest: the polygon geometry loaded from a vector file,
/// plus a lazily computed centroid cached for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct Aoi {
    name: String,
    source: PathBuf,
    geometry: MultiPolygon<f64>,
    crs: CrsKind,
    centroid: OnceLock<Point<f64>>,
}

impl Aoi {
    pub fn new(
        name: impl Into<String>,
        source: impl Into<PathBuf>,
        geometry: MultiPolygon<f64>,
        crs: CrsKind,
    ) -> Result<Self> {
        let name = name.into();
        if geometry.0.is_empty() || geometry.0.iter().all(|p| p.exterior().0.is_empty()) {
            return Err(PipelineError::EmptyAoi(name));
        }

        Ok(Self {
            name,
            source: source.into(),
            geometry,
            crs,
            centroid: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn crs(&self) -> CrsKind {
        self.crs
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.geometry
    }

    pub fn polygon_count(&self) -> usize {
        self.geometry.0.len()
    }

    /// Bounding rectangle of the full geometry, in source coordinates
    pub fn bounding_rect(&self) -> Result<Rect<f64>> {
        self.geometry
            .bounding_rect()
            .ok_or_else(|| PipelineError::EmptyAoi(self.name.clone()))
    }

    /// Geometry centroid, computed once and cached.
    ///
    /// Geographic geometry is projected to World Mercator, the planar
    /// centroid is taken there, and the result is inverted back to
    /// degrees. Projected geometry yields its planar centroid as-is;
    /// rejecting out-of-range coordinates is left to the fetch layer.
    pub fn centroid(&self) -> Result<Point<f64>> {
        if let Some(point) = self.centroid.get() {
            return Ok(*point);
        }

        let point = self.resolve_centroid()?;
        Ok(*self.centroid.get_or_init(|| point))
    }

    /// Centroid as the (latitude, longitude) pair the weather query wants
    pub fn centroid_lat_lon(&self) -> Result<(f64, f64)> {
        let point = self.centroid()?;
        Ok((point.y(), point.x()))
    }

    fn resolve_centroid(&self) -> Result<Point<f64>> {
        match self.crs {
            CrsKind::Geographic => {
                debug!(
                    aoi = %self.name,
                    epsg = EPSG_WORLD_MERCATOR,
                    "taking the planar centroid in World Mercator"
                );
                let projected = self.geometry.map_coords(|c| {
                    let (x, y) = mercator_forward(c.x, c.y);
                    Coord { x, y }
                });
                let center = projected
                    .centroid()
                    .ok_or_else(|| PipelineError::EmptyAoi(self.name.clone()))?;
                let (lon, lat) = mercator_inverse(center.x(), center.y());
                Ok(Point::new(lon, lat))
            }
            CrsKind::Projected => self
                .geometry
                .centroid()
                .ok_or_else(|| PipelineError::EmptyAoi(self.name.clone())),
        }
    }
}
