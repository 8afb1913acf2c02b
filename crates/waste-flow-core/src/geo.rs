// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::primitives::Kilometers;
use serde::Serialize;

/// Mean Earth radius used by the Haversine great-circle formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on Earth in decimal degrees.
///
/// Construction validates the coordinate ranges; out-of-range or
/// non-finite input is a caller contract violation and is rejected,
/// never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateRangeError> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || latitude.abs() > 90.0
            || longitude.abs() > 180.0
        {
            return Err(CoordinateRangeError::new(latitude, longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two points via the Haversine formula.
///
/// Symmetric, non-negative and zero exactly when both points coincide.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> Kilometers {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    Kilometers::new(EARTH_RADIUS_KM * c)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateRangeError {
    latitude: f64,
    longitude: f64,
}

impl CoordinateRangeError {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for CoordinateRangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "coordinates ({}, {}) are outside the valid range (|lat| <= 90, |lon| <= 180)",
            self.latitude, self.longitude
        )
    }
}

impl std::error::Error for CoordinateRangeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[inline]
    fn gp(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn test_identity_is_zero() {
        let p = gp(41.3851, 2.1734);
        assert_eq!(haversine_km(p, p).get(), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let a = gp(41.40, 2.15);
        let b = gp(41.38, 2.19);
        assert_eq!(haversine_km(a, b), haversine_km(b, a));
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        // One degree of arc on a 6371 km sphere is ~111.19 km.
        let d = haversine_km(gp(0.0, 0.0), gp(0.0, 1.0));
        assert!((d.get() - 111.195).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_antipodal_distance_is_half_circumference() {
        let d = haversine_km(gp(0.0, 0.0), gp(0.0, 180.0));
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((d.get() - half).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let err = GeoPoint::new(90.5, 0.0).unwrap_err();
        assert_eq!(err.latitude(), 90.5);
    }

    #[test]
    fn test_out_of_range_longitude_rejected() {
        assert!(GeoPoint::new(0.0, -180.01).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_boundary_values_accepted() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }
}
