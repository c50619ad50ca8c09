//! Named regions and the registry that routes records to them.
//!
//! Bounding boxes use WGS84 degrees with `x = longitude` and `y = latitude`.
//! Boxes may overlap; the registry order decides which region wins under
//! [`ClassificationPolicy::FirstMatch`](crate::ClassificationPolicy).

use std::{collections::HashSet, fmt, sync::LazyLock};

use geo::{Coord, Intersects, Rect};
use thiserror::Error;

/// Identifier of a region.
///
/// Identifiers double as storage table prefixes, so they are restricted to
/// ASCII letters, digits and underscores.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RegionId(String);

impl RegionId {
    /// Validate and wrap an identifier.
    ///
    /// # Examples
    /// ```
    /// use meteorfall_core::RegionId;
    ///
    /// assert!(RegionId::new("North_America").is_ok());
    /// assert!(RegionId::new("North America").is_err());
    /// ```
    pub fn new(id: impl Into<String>) -> Result<Self, RegionError> {
        let id = id.into();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if valid {
            Ok(Self(id))
        } else {
            Err(RegionError::InvalidId { id })
        }
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RegionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors raised while building regions or registries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    /// The identifier was empty or contained characters outside `[A-Za-z0-9_]`.
    #[error("region id {id:?} must be non-empty and use only ASCII letters, digits or '_'")]
    InvalidId {
        /// Rejected identifier.
        id: String,
    },
    /// A bound was NaN or infinite.
    #[error("region {id} has a non-finite bound")]
    NonFiniteBound {
        /// Region whose bounds were rejected.
        id: RegionId,
    },
    /// A minimum bound was not strictly below its maximum.
    #[error("region {id} must satisfy min < max on both axes (got {min:?} to {max:?})")]
    DegenerateBounds {
        /// Region whose bounds were rejected.
        id: RegionId,
        /// Supplied lower-left corner.
        min: Coord<f64>,
        /// Supplied upper-right corner.
        max: Coord<f64>,
    },
    /// Two regions in one registry shared an identifier.
    #[error("region {id} is registered more than once")]
    DuplicateId {
        /// Repeated identifier.
        id: RegionId,
    },
    /// A registry was built without any regions.
    #[error("a region registry needs at least one region")]
    Empty,
}

/// A named, axis-aligned geographic box.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use meteorfall_core::Region;
///
/// # fn main() -> Result<(), meteorfall_core::RegionError> {
/// let region = Region::new("Square", -10.0, -10.0, 10.0, 10.0)?;
/// assert!(region.contains(Coord { x: 10.0, y: -10.0 }));
/// assert!(!region.contains(Coord { x: 10.5, y: 0.0 }));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    id: RegionId,
    bounds: Rect<f64>,
}

impl Region {
    /// Validate and construct a region from `(min_lon, min_lat, max_lon, max_lat)`.
    pub fn new(
        id: impl Into<String>,
        min_longitude: f64,
        min_latitude: f64,
        max_longitude: f64,
        max_latitude: f64,
    ) -> Result<Self, RegionError> {
        let id = RegionId::new(id)?;
        let min = Coord {
            x: min_longitude,
            y: min_latitude,
        };
        let max = Coord {
            x: max_longitude,
            y: max_latitude,
        };
        if ![min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite()) {
            return Err(RegionError::NonFiniteBound { id });
        }
        // `Rect::new` would silently swap inverted corners.
        if min.x >= max.x || min.y >= max.y {
            return Err(RegionError::DegenerateBounds { id, min, max });
        }
        Ok(Self {
            id,
            bounds: Rect::new(min, max),
        })
    }

    /// Region identifier.
    #[must_use]
    pub const fn id(&self) -> &RegionId {
        &self.id
    }

    /// Bounding box of the region.
    #[must_use]
    pub const fn bounds(&self) -> Rect<f64> {
        self.bounds
    }

    /// Whether `coordinate` lies inside the box.
    ///
    /// Every edge is inclusive: `min ≤ lon ≤ max` and `min ≤ lat ≤ max`.
    #[must_use]
    pub fn contains(&self, coordinate: Coord<f64>) -> bool {
        // `Intersects` treats boundary points as inside the rectangle.
        self.bounds.intersects(&coordinate)
    }
}

/// The world regions as `(id, [min_lon, min_lat, max_lon, max_lat])`, in
/// registry order.
const WORLD_REGIONS: [(&str, [f64; 4]); 7] = [
    ("Africa_MiddleEast", [-17.8, -35.2, 62.2, 37.6]),
    ("Europe", [-24.1, 36.0, 32.0, 71.1]),
    ("Upper_Asia", [32.2, 35.8, 190.4, 72.7]),
    ("Lower_Asia", [58.2, -9.9, 154.0, 38.6]),
    ("Australia", [112.9, -43.8, 154.3, -11.1]),
    ("North_America", [-168.2, 12.8, -52.0, 71.5]),
    ("South_America", [-81.2, -55.8, -34.2, 12.6]),
];

static WORLD: LazyLock<RegionRegistry> = LazyLock::new(|| RegionRegistry {
    regions: WORLD_REGIONS
        .iter()
        .map(|&(id, [min_lon, min_lat, max_lon, max_lat])| Region {
            id: RegionId(id.to_owned()),
            bounds: Rect::new(
                Coord {
                    x: min_lon,
                    y: min_lat,
                },
                Coord {
                    x: max_lon,
                    y: max_lat,
                },
            ),
        })
        .collect(),
});

/// Ordered, read-only collection of regions.
///
/// Order is significant: it is the iteration order for classification and
/// therefore the tie-breaker for overlapping boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRegistry {
    regions: Vec<Region>,
}

impl RegionRegistry {
    /// Build a custom registry, rejecting empty input and repeated ids.
    ///
    /// # Examples
    /// ```
    /// use meteorfall_core::{Region, RegionRegistry};
    ///
    /// # fn main() -> Result<(), meteorfall_core::RegionError> {
    /// let registry = RegionRegistry::new(vec![
    ///     Region::new("West", -10.0, -10.0, 10.0, 10.0)?,
    ///     Region::new("East", 5.0, 5.0, 15.0, 15.0)?,
    /// ])?;
    /// assert_eq!(registry.len(), 2);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(regions: Vec<Region>) -> Result<Self, RegionError> {
        if regions.is_empty() {
            return Err(RegionError::Empty);
        }
        let mut seen = HashSet::new();
        for region in &regions {
            if !seen.insert(region.id()) {
                return Err(RegionError::DuplicateId {
                    id: region.id().clone(),
                });
            }
        }
        Ok(Self { regions })
    }

    /// The process-wide registry of the seven world regions.
    ///
    /// Order: Africa/Middle East, Europe, Upper Asia, Lower Asia, Australia,
    /// North America, South America.
    #[must_use]
    pub fn world() -> &'static Self {
        &WORLD
    }

    /// Regions in registry order.
    #[must_use]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Look up a region by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.id().as_str() == id)
    }

    /// Number of registered regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the registry holds no regions.
    ///
    /// Companion to [`RegionRegistry::len`]; [`RegionRegistry::new`] rejects
    /// empty input, so a constructed registry reports `false`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate over the regions in registry order.
    pub fn iter(&self) -> std::slice::Iter<'_, Region> {
        self.regions.iter()
    }
}

impl<'a> IntoIterator for &'a RegionRegistry {
    type Item = &'a Region;
    type IntoIter = std::slice::Iter<'a, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Regions of the world registry in registry order.
#[must_use]
pub fn list_regions() -> &'static [Region] {
    RegionRegistry::world().regions()
}
