//! Geometry adapter over the `geo` crate.
//!
//! Everything the selector needs from polygon math lives here: area,
//! intersection area, set difference, bounds and GeoJSON decoding. The
//! functions are pure and tolerant: empty or degenerate shapes produce
//! zero areas instead of errors, so a bad scene footprint can never abort
//! a selection run.
//!
//! # Example
//!
//! ```
//! use cloudbuster::geometry::{self, Footprint};
//! use geo::{polygon, MultiPolygon};
//!
//! let square: Footprint = MultiPolygon::new(vec![polygon![
//!     (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0),
//! ]]);
//! let left: Footprint = MultiPolygon::new(vec![polygon![
//!     (x: 0.0, y: 0.0), (x: 0.5, y: 0.0), (x: 0.5, y: 1.0), (x: 0.0, y: 1.0),
//! ]]);
//!
//! assert!((geometry::intersection_area(&square, &left) - 0.5).abs() < 1e-9);
//! let rest = geometry::difference(&square, &left);
//! assert!((geometry::area(&rest) - 0.5).abs() < 1e-9);
//! ```

mod aoi;

pub use aoi::AreaOfInterest;

use geo::{Area, BooleanOps, BoundingRect, Geometry, Intersects, MultiPolygon};
use geojson::GeoJson;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Polygonal coverage of a scene, an AOI or a layer remainder.
pub type Footprint = MultiPolygon<f64>;

/// Errors raised while decoding geometry input.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// The value is not valid GeoJSON.
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(#[from] geojson::Error),

    /// The geometry decoded but has no area to cover.
    #[error("Geometry has no area")]
    ZeroArea,

    /// The geometry area is NaN or infinite.
    #[error("Geometry area is not finite: {0}")]
    NonFiniteArea(f64),
}

/// Axis-aligned bounds, serialized as `[minx, miny, maxx, maxy]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "[f64; 4]")]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl From<Bounds> for [f64; 4] {
    fn from(bounds: Bounds) -> Self {
        [bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y]
    }
}

/// Unsigned area of a shape. Non-finite results collapse to zero.
pub fn area(shape: &Footprint) -> f64 {
    let area = shape.unsigned_area();
    if area.is_finite() {
        area
    } else {
        0.0
    }
}

/// Area of the overlap between two shapes.
pub fn intersection_area(a: &Footprint, b: &Footprint) -> f64 {
    if !bounding_boxes_overlap(a, b) {
        return 0.0;
    }
    area(&a.intersection(b))
}

/// The part of `a` not covered by `b`.
///
/// May be empty when `b` covers all of `a`.
pub fn difference(a: &Footprint, b: &Footprint) -> Footprint {
    if !bounding_boxes_overlap(a, b) {
        return a.clone();
    }
    a.difference(b)
}

/// Bounds of a shape, or `None` for an empty shape.
pub fn bounds(shape: &Footprint) -> Option<Bounds> {
    shape.bounding_rect().map(|rect| Bounds {
        min_x: rect.min().x,
        min_y: rect.min().y,
        max_x: rect.max().x,
        max_y: rect.max().y,
    })
}

/// Decode a GeoJSON value into a footprint.
///
/// Accepts bare geometries, features and feature collections. Polygonal
/// members are kept; points and lines contribute nothing. Multi-member
/// inputs (geometry and feature collections) are unioned so overlapping
/// parts are not counted twice.
pub fn footprint_from_geojson(value: &Value) -> Result<Footprint, GeometryError> {
    let geojson = GeoJson::from_json_value(value.clone())?;

    let shape = match geojson {
        GeoJson::Geometry(geometry) => into_footprint(Geometry::<f64>::try_from(geometry)?),
        GeoJson::Feature(feature) => match feature.geometry {
            Some(geometry) => into_footprint(Geometry::<f64>::try_from(geometry)?),
            None => empty(),
        },
        GeoJson::FeatureCollection(collection) => {
            let mut merged = empty();
            for feature in collection.features {
                if let Some(geometry) = feature.geometry {
                    let part = into_footprint(Geometry::<f64>::try_from(geometry)?);
                    merged = merged.union(&part);
                }
            }
            merged
        }
    };

    Ok(shape)
}

/// An empty footprint.
pub fn empty() -> Footprint {
    MultiPolygon::new(Vec::new())
}

fn into_footprint(geometry: Geometry<f64>) -> Footprint {
    match geometry {
        Geometry::Polygon(polygon) => MultiPolygon::new(vec![polygon]),
        Geometry::MultiPolygon(multi) => multi,
        Geometry::Rect(rect) => MultiPolygon::new(vec![rect.to_polygon()]),
        Geometry::Triangle(triangle) => MultiPolygon::new(vec![triangle.to_polygon()]),
        Geometry::GeometryCollection(collection) => collection
            .into_iter()
            .map(into_footprint)
            .fold(empty(), |merged, part| merged.union(&part)),
        // Points and lines cover nothing
        _ => empty(),
    }
}

fn bounding_boxes_overlap(a: &Footprint, b: &Footprint) -> bool {
    match (a.bounding_rect(), b.bounding_rect()) {
        (Some(ra), Some(rb)) => ra.intersects(&rb),
        _ => false,
    }
}
