use serde::{Deserialize, Serialize};

/// Geographic bounding box in WGS84 degrees.
///
/// Serialized as `[[west, south], [east, north]]`, the form map libraries
/// accept for initial camera bounds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct LngLatBounds {
    pub south_west: [f64; 2],
    pub north_east: [f64; 2],
}

impl LngLatBounds {
    pub fn new(south_west: [f64; 2], north_east: [f64; 2]) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn west(&self) -> f64 {
        self.south_west[0]
    }

    pub fn south(&self) -> f64 {
        self.south_west[1]
    }

    pub fn east(&self) -> f64 {
        self.north_east[0]
    }

    pub fn north(&self) -> f64 {
        self.north_east[1]
    }

    pub fn is_finite(&self) -> bool {
        self.south_west.iter().chain(&self.north_east).all(|v| v.is_finite())
    }
}

impl From<[[f64; 2]; 2]> for LngLatBounds {
    fn from([sw, ne]: [[f64; 2]; 2]) -> Self {
        Self::new(sw, ne)
    }
}

impl From<LngLatBounds> for [[f64; 2]; 2] {
    fn from(b: LngLatBounds) -> Self {
        [b.south_west, b.north_east]
    }
}

#[cfg(test)]
mod tests {
    use super::LngLatBounds;

    #[test]
    fn parses_corner_pairs() {
        let b: LngLatBounds = serde_json::from_str("[[2.2, 48.8], [2.5, 48.9]]").unwrap();
        assert_eq!(b.west(), 2.2);
        assert_eq!(b.south(), 48.8);
        assert_eq!(b.east(), 2.5);
        assert_eq!(b.north(), 48.9);
        assert!(b.is_finite());
    }
}
