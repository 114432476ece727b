//! Parcel and road input: GeoJSON Feature/FeatureCollection parsing
//! into `sf_core` geometry types. No network I/O, no schema registry — the
//! accepted shape is exactly a GeoJSON `Polygon`/`MultiPolygon` feature for
//! the parcel and `LineString` features for adjacent roads.

use std::convert::TryFrom;
use std::path::Path;

use geo::{MultiPolygon as GeoMultiPolygon, Polygon as GeoPolygon};
use geojson::GeoJson;

use sf_core::geom::Polyline;
use sf_core::model::{ParcelGeometry, Road};

use crate::IoError;

/// Parse a parcel boundary from a single GeoJSON geometry/feature document.
///
/// Accepts a bare `Polygon`/`MultiPolygon` geometry, or a `Feature` wrapping
/// one, or the first such feature in a `FeatureCollection`.
pub fn parse_parcel_geojson(raw: &str) -> Result<ParcelGeometry, IoError> {
    let gj: GeoJson = raw.parse().map_err(|e| IoError::Geometry(format!("{e}")))?;
    let geometry = first_geometry(&gj).ok_or_else(|| {
        IoError::Geometry("no geometry found in parcel document".into())
    })?;

    if let Ok(p) = GeoPolygon::<f64>::try_from(geometry.clone()) {
        return Ok(ParcelGeometry::Polygon(p));
    }
    if let Ok(mp) = GeoMultiPolygon::<f64>::try_from(geometry.clone()) {
        return Ok(ParcelGeometry::MultiPolygon(mp));
    }
    Err(IoError::Geometry("parcel geometry must be Polygon or MultiPolygon".into()))
}

/// Parse a parcel boundary from a file on disk.
pub fn load_parcel_geojson(path: &Path) -> Result<ParcelGeometry, IoError> {
    let raw = std::fs::read_to_string(path)?;
    parse_parcel_geojson(&raw)
}

/// Parse adjacent roads from a GeoJSON `FeatureCollection` of `LineString`
/// features. A feature's `name` property (if a string) becomes `Road::name`.
pub fn parse_roads_geojson(raw: &str) -> Result<Vec<Road>, IoError> {
    let gj: GeoJson = raw.parse().map_err(|e| IoError::Geometry(format!("{e}")))?;
    let features = match gj {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(IoError::Geometry("roads document must be a FeatureCollection".into()))
        }
    };

    let mut roads = Vec::with_capacity(features.len());
    for feature in features {
        let Some(geom) = feature.geometry.clone() else { continue };
        let line = Polyline::try_from(geom)
            .map_err(|_| IoError::Geometry("road feature geometry must be a LineString".into()))?;
        let name = feature
            .properties
            .as_ref()
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        roads.push(Road { line, name });
    }
    Ok(roads)
}

pub fn load_roads_geojson(path: &Path) -> Result<Vec<Road>, IoError> {
    let raw = std::fs::read_to_string(path)?;
    parse_roads_geojson(&raw)
}

fn first_geometry(gj: &GeoJson) -> Option<geojson::Geometry> {
    match gj {
        GeoJson::Geometry(g) => Some(g.clone()),
        GeoJson::Feature(f) => f.geometry.clone(),
        GeoJson::FeatureCollection(fc) => fc.features.iter().find_map(|f| f.geometry.clone()),
    }
}
