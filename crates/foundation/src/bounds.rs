use crate::geo::LngLat;

/// Axis-aligned bounding box in lng/lat degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// Bounds of a coordinate ring; `None` for an empty ring.
    ///
    /// Non-finite positions are skipped so a single bad vertex cannot poison the box.
    pub fn from_ring(ring: &[[f64; 2]]) -> Option<Self> {
        let mut iter = ring
            .iter()
            .filter(|p| p[0].is_finite() && p[1].is_finite());
        let first = iter.next()?;
        let mut out = Aabb2::new(*first, *first);
        for p in iter {
            out.extend(*p);
        }
        Some(out)
    }

    pub fn extend(&mut self, p: [f64; 2]) {
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    /// Midpoint of the box.
    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        )
    }

    /// `[[min_lng, min_lat], [max_lng, max_lat]]`, the shape the renderer's `fitBounds` takes.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [self.min, self.max]
    }

    pub fn contains(&self, p: LngLat) -> bool {
        p.lng >= self.min[0] && p.lng <= self.max[0] && p.lat >= self.min[1] && p.lat <= self.max[1]
    }
}
