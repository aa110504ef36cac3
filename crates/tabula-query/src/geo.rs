//! Geographic constraints.

use serde_json::{Value, json};
use std::fmt;

/// A circle confining results to `meters` around a center point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Latitude of the center.
    pub latitude: f64,
    /// Longitude of the center.
    pub longitude: f64,
    /// Radius in meters.
    pub meters: u32,
}

impl Circle {
    /// Creates a circle around `(latitude, longitude)`.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64, meters: u32) -> Self {
        Self {
            latitude,
            longitude,
            meters,
        }
    }

    /// Renders `{"$circle": {"$center": [lat, lon], "$meters": n}}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "$circle": {
                "$center": [self.latitude, self.longitude],
                "$meters": self.meters,
            }
        })
    }
}

impl fmt::Display for Circle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// A single geographic point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Renders `{"$point": [lat, lon]}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({ "$point": [self.latitude, self.longitude] })
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circle_json_shape() {
        let circle = Circle::new(34.06021, -118.41828, 5000);
        assert_eq!(
            circle.to_string(),
            r#"{"$circle":{"$center":[34.06021,-118.41828],"$meters":5000}}"#
        );
    }

    #[test]
    fn point_json_shape() {
        let point = Point::new(34.06021, -118.41828);
        assert_eq!(point.to_string(), r#"{"$point":[34.06021,-118.41828]}"#);
    }
}
