//! GeoJSON feature collections in and out.
//!
//! Only `Polygon` and `MultiPolygon` geometries reach the core. Everything else
//! (other geometry types, null geometries, malformed positions) is filtered out
//! here and reported as a `SkippedFeature`, never coerced.

use geo::{Coord, LineString, Polygon};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FeatureError;
use crate::geom::Shape;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: String,
    pub features: Vec<Feature>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    #[serde(default)]
    pub geometry: Option<Value>,
}

/// The geometry types the splitter accepts. Positions may carry extra ordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PolygonalGeometry {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
}

/// One polygon handed to the pipeline, tagged with its source feature.
#[derive(Clone, Debug, PartialEq)]
pub struct InputPolygon {
    pub feature_index: usize,
    pub polygon: Polygon<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkippedFeature {
    pub feature_index: usize,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedFeatures {
    pub polygons: Vec<InputPolygon>,
    pub skipped: Vec<SkippedFeature>,
}

/// Parse a FeatureCollection, keeping polygonal features and reporting the rest.
pub fn read_feature_collection(text: &str) -> Result<ParsedFeatures, FeatureError> {
    let fc: FeatureCollection = serde_json::from_str(text)?;
    if fc.kind != "FeatureCollection" {
        return Err(FeatureError::NotACollection(fc.kind));
    }
    let mut out = ParsedFeatures::default();
    for (feature_index, feature) in fc.features.into_iter().enumerate() {
        match polygons_of(feature.geometry) {
            Ok(polys) => out.polygons.extend(
                polys
                    .into_iter()
                    .map(|polygon| InputPolygon {
                        feature_index,
                        polygon,
                    }),
            ),
            Err(reason) => out.skipped.push(SkippedFeature {
                feature_index,
                reason,
            }),
        }
    }
    Ok(out)
}

fn polygons_of(geometry: Option<Value>) -> Result<Vec<Polygon<f64>>, String> {
    let geometry = match geometry {
        Some(Value::Null) | None => return Err("feature has no geometry".to_string()),
        Some(g) => g,
    };
    let kind = geometry
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("<missing>")
        .to_string();
    let parsed: PolygonalGeometry = serde_json::from_value(geometry)
        .map_err(|e| format!("unsupported or malformed {kind} geometry: {e}"))?;
    match parsed {
        PolygonalGeometry::Polygon { coordinates } => Ok(vec![polygon_from_rings(&coordinates)?]),
        PolygonalGeometry::MultiPolygon { coordinates } => coordinates
            .iter()
            .map(|rings| polygon_from_rings(rings))
            .collect(),
    }
}

fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Result<Polygon<f64>, String> {
    let (exterior, holes) = rings
        .split_first()
        .ok_or_else(|| "polygon has no rings".to_string())?;
    let exterior = ring_from_positions(exterior)?;
    let holes = holes
        .iter()
        .map(|r| ring_from_positions(r))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon::new(exterior, holes))
}

fn ring_from_positions(positions: &[Vec<f64>]) -> Result<LineString<f64>, String> {
    let coords = positions
        .iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
            _ => Err(format!("bad position {p:?}")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

fn rings_to_positions(p: &Polygon<f64>) -> Vec<Vec<Vec<f64>>> {
    std::iter::once(p.exterior())
        .chain(p.interiors())
        .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect())
        .collect()
}

/// Build an output collection; each shape becomes one feature with empty properties.
pub fn to_feature_collection(shapes: &[Shape]) -> Result<FeatureCollection, FeatureError> {
    let features = shapes
        .iter()
        .map(|shape| {
            let geometry = match shape {
                Shape::Single(p) => PolygonalGeometry::Polygon {
                    coordinates: rings_to_positions(p),
                },
                Shape::Multi(mp) => PolygonalGeometry::MultiPolygon {
                    coordinates: mp.0.iter().map(rings_to_positions).collect(),
                },
            };
            Ok(Feature {
                kind: "Feature".to_string(),
                properties: Some(Map::new()),
                geometry: Some(serde_json::to_value(geometry)?),
            })
        })
        .collect::<Result<Vec<_>, FeatureError>>()?;
    Ok(FeatureCollection {
        kind: "FeatureCollection".to_string(),
        features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};

    const DOC: &str = r#"{
      "type": "FeatureCollection",
      "features": [
        {"type": "Feature", "properties": {"name": "a"},
         "geometry": {"type": "Polygon",
                      "coordinates": [[[0,0],[4,0],[4,4],[0,4],[0,0]],
                                      [[1,1],[2,1],[2,2],[1,2],[1,1]]]}},
        {"type": "Feature", "properties": null,
         "geometry": {"type": "MultiPolygon",
                      "coordinates": [[[[10,0,5],[11,0,5],[11,1,5],[10,0,5]]],
                                      [[[20,0],[21,0],[21,1],[20,1],[20,0]]]]}},
        {"type": "Feature", "properties": {},
         "geometry": {"type": "Point", "coordinates": [1, 2]}},
        {"type": "Feature", "properties": {}, "geometry": null},
        {"type": "Feature", "properties": {},
         "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1],[1,1],[0,0]]]}}
      ]
    }"#;

    #[test]
    fn keeps_polygonal_and_reports_the_rest() {
        let parsed = read_feature_collection(DOC).unwrap();
        assert_eq!(parsed.polygons.len(), 3);
        assert_eq!(parsed.polygons[0].feature_index, 0);
        assert_eq!(parsed.polygons[0].polygon.interiors().len(), 1);
        assert!((parsed.polygons[0].polygon.unsigned_area() - 15.0).abs() < 1e-12);
        assert_eq!(parsed.polygons[1].feature_index, 1);
        assert_eq!(parsed.polygons[2].feature_index, 1);
        let skipped: Vec<usize> = parsed.skipped.iter().map(|s| s.feature_index).collect();
        assert_eq!(skipped, vec![2, 3, 4]);
        assert!(parsed.skipped[0].reason.contains("Point"));
        assert!(parsed.skipped[2].reason.contains("bad position"));
    }

    #[test]
    fn rejects_non_collections() {
        let err = read_feature_collection(r#"{"type": "Feature", "features": []}"#).unwrap_err();
        assert!(matches!(err, FeatureError::NotACollection(k) if k == "Feature"));
        assert!(matches!(
            read_feature_collection("not json"),
            Err(FeatureError::Json(_))
        ));
    }

    #[test]
    fn writes_features_with_empty_properties() {
        let sq = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ];
        let multi = Shape::Multi(geo::MultiPolygon::new(vec![sq.clone(), sq.clone()]));
        let fc = to_feature_collection(&[Shape::Single(sq), multi]).unwrap();
        let v = serde_json::to_value(&fc).unwrap();
        assert_eq!(v["type"], "FeatureCollection");
        assert_eq!(v["features"][0]["type"], "Feature");
        assert_eq!(v["features"][0]["properties"], serde_json::json!({}));
        assert_eq!(v["features"][0]["geometry"]["type"], "Polygon");
        assert_eq!(
            v["features"][0]["geometry"]["coordinates"][0][1],
            serde_json::json!([1.0, 0.0])
        );
        assert_eq!(v["features"][1]["geometry"]["type"], "MultiPolygon");

        let text = serde_json::to_string(&fc).unwrap();
        let back = read_feature_collection(&text).unwrap();
        assert_eq!(back.polygons.len(), 3);
        assert!(back.skipped.is_empty());
    }
}
