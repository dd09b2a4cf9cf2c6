use serde::{Deserialize, Serialize};

use crate::value::Collection;

/// Lon/lat axis-aligned bounding box.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Bbox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Accepts 2D (`[w, s, e, n]`) and 3D (`[w, s, zmin, e, n, zmax]`) boxes.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        match *values {
            [w, s, e, n] => Some(Self::new(w, s, e, n)),
            [w, s, _, e, n, _] => Some(Self::new(w, s, e, n)),
            _ => None,
        }
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

/// Union of the overall extents of `collections`.
///
/// Collections without a usable bbox are skipped; `None` when none has one.
pub fn collections_extent<'a, I>(collections: I) -> Option<Bbox>
where
    I: IntoIterator<Item = &'a Collection>,
{
    collections
        .into_iter()
        .filter_map(Collection::bbox)
        .reduce(Bbox::union)
}
