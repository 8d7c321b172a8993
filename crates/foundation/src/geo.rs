/// Longitude/latitude pair in degrees (WGS84), in that order.
///
/// The order matches GeoJSON positions and the map renderer's camera API.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

impl From<[f64; 2]> for LngLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

/// Default map center: approximate center of Brazil.
pub const MAP_HOME: LngLat = LngLat::new(-54.0, -15.0);

/// Geographic centroid used when the user's position cannot be resolved.
pub const COUNTRY_CENTROID: LngLat = LngLat::new(-47.9292, -15.7801);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_order_is_lng_lat() {
        let p = LngLat::from([-47.9, -15.7]);
        assert_eq!(p.lng, -47.9);
        assert_eq!(p.lat, -15.7);
        assert_eq!(p.to_array(), [-47.9, -15.7]);
    }
}
