use shared::GeoPoint;

/// Errors from parsing the `"[lng,lat]"` wire form.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoordError {
    #[error("malformed coordinate {0:?}")]
    Malformed(String),
}

/// Parse a `"[lng,lat]"` string (longitude first) into a point.
///
/// The text must carry exactly two comma-separated numeric parts inside
/// square brackets, and the parts must be finite and inside the valid
/// latitude/longitude ranges. A coordinate that fails to parse is an error,
/// never a default value.
pub fn decode(text: &str) -> Result<GeoPoint, CoordError> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(|| CoordError::Malformed(text.to_string()))?;

    let parts: Vec<&str> = inner.split(',').collect();
    let (lng_text, lat_text) = match parts.as_slice() {
        [lng, lat] => (*lng, *lat),
        _ => return Err(CoordError::Malformed(text.to_string())),
    };

    let lng: f64 = lng_text
        .trim()
        .parse()
        .map_err(|_| CoordError::Malformed(text.to_string()))?;
    let lat: f64 = lat_text
        .trim()
        .parse()
        .map_err(|_| CoordError::Malformed(text.to_string()))?;

    if !lng.is_finite() || !lat.is_finite() {
        return Err(CoordError::Malformed(text.to_string()));
    }
    if !(-180.0..=180.0).contains(&lng) || !(-90.0..=90.0).contains(&lat) {
        return Err(CoordError::Malformed(text.to_string()));
    }

    Ok(GeoPoint { lat, lng })
}

/// Serialize a point back to its `"[lng,lat]"` wire form.
///
/// Uses default float formatting, so `decode(encode(p)) == p` exactly.
pub fn encode(point: GeoPoint) -> String {
    format!("[{},{}]", point.lng, point.lat)
}

/// Decode a whole path, preserving travel order. Fails on the first
/// malformed element.
pub fn decode_path(texts: &[String]) -> Result<Vec<GeoPoint>, CoordError> {
    texts.iter().map(|text| decode(text)).collect()
}

pub fn encode_path(points: &[GeoPoint]) -> Vec<String> {
    points.iter().map(|&point| encode(point)).collect()
}
