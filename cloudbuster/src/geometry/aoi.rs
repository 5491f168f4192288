//! The area of interest a selection run must cover.

use serde_json::Value;

use super::{Bounds, Footprint, GeometryError};

/// Immutable target polygon with its area and bounds computed up front.
///
/// Construction rejects shapes with no usable area, so everything
/// downstream can rely on `area() > 0` and on `bounds()` being defined.
#[derive(Debug, Clone)]
pub struct AreaOfInterest {
    shape: Footprint,
    area: f64,
    bounds: Bounds,
}

impl AreaOfInterest {
    /// Wrap an already decoded shape.
    pub fn new(shape: Footprint) -> Result<Self, GeometryError> {
        let raw_area = geo::Area::unsigned_area(&shape);
        if !raw_area.is_finite() {
            return Err(GeometryError::NonFiniteArea(raw_area));
        }
        if raw_area <= 0.0 {
            return Err(GeometryError::ZeroArea);
        }
        let bounds = super::bounds(&shape).ok_or(GeometryError::ZeroArea)?;

        Ok(Self {
            shape,
            area: raw_area,
            bounds,
        })
    }

    /// Decode the AOI from a GeoJSON value.
    pub fn from_geojson(value: &Value) -> Result<Self, GeometryError> {
        Self::new(super::footprint_from_geojson(value)?)
    }

    /// The AOI polygon.
    pub fn shape(&self) -> &Footprint {
        &self.shape
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}
