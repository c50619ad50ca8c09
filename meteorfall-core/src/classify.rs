//! Coordinate-based classification of records into regions.
//!
//! Two policies exist because overlapping boxes force a choice:
//! - [`ClassificationPolicy::MultiMatch`] routes a record to every region
//!   whose box contains it.
//! - [`ClassificationPolicy::FirstMatch`] routes it only to the first such
//!   region in registry order.
//!
//! Containment is inclusive on every edge for both axes.

use std::{fmt, str::FromStr};

use geo::Coord;
use thiserror::Error;

use crate::{
    CoordinateError, CoordinateResolver, Record, RegionId, RegionRegistry,
    record::{LATITUDE_FIELD, LONGITUDE_FIELD},
};

/// How a record is assigned when several regions contain it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ClassificationPolicy {
    /// Assign to every containing region.
    #[default]
    MultiMatch,
    /// Assign to the first containing region in registry order.
    FirstMatch,
}

impl ClassificationPolicy {
    /// Kebab-case name used on the command line and in configuration files.
    ///
    /// # Examples
    /// ```
    /// use meteorfall_core::ClassificationPolicy;
    ///
    /// assert_eq!(ClassificationPolicy::FirstMatch.as_str(), "first-match");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MultiMatch => "multi-match",
            Self::FirstMatch => "first-match",
        }
    }
}

impl fmt::Display for ClassificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown classification policy '{0}' (expected multi-match or first-match)")]
pub struct ParsePolicyError(String);

impl FromStr for ClassificationPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "multi-match" | "multi" => Ok(Self::MultiMatch),
            "first-match" | "first" => Ok(Self::FirstMatch),
            _ => Err(ParsePolicyError(s.to_owned())),
        }
    }
}

/// Every region in `registry` containing `coordinate`, in registry order.
///
/// Region identifiers are unique within a registry, so each appears at most
/// once.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use meteorfall_core::{Region, RegionRegistry, classify};
///
/// # fn main() -> Result<(), meteorfall_core::RegionError> {
/// let registry = RegionRegistry::new(vec![
///     Region::new("West", -10.0, -10.0, 10.0, 10.0)?,
///     Region::new("East", 5.0, 5.0, 15.0, 15.0)?,
/// ])?;
/// let ids: Vec<_> = classify(Coord { x: 7.0, y: 7.0 }, &registry)
///     .into_iter()
///     .map(|id| id.to_string())
///     .collect();
/// assert_eq!(ids, ["West", "East"]);
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn classify(coordinate: Coord<f64>, registry: &RegionRegistry) -> Vec<RegionId> {
    registry
        .iter()
        .filter(|region| region.contains(coordinate))
        .map(|region| region.id().clone())
        .collect()
}

/// The first region in registry order containing `coordinate`.
#[must_use]
pub fn classify_first(coordinate: Coord<f64>, registry: &RegionRegistry) -> Option<RegionId> {
    registry
        .iter()
        .find(|region| region.contains(coordinate))
        .map(|region| region.id().clone())
}

/// Outcome of classifying one record.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// The record lacks `reclat` or `reclong` and is skipped.
    Unlocated,
    /// The record has coordinates; `regions` may be empty.
    Located {
        /// Resolved position (`x = longitude`, `y = latitude`).
        coordinate: Coord<f64>,
        /// Regions the record belongs to, in registry order.
        regions: Vec<RegionId>,
    },
}

impl Classification {
    /// Regions assigned to the record; empty when unlocated.
    #[must_use]
    pub fn regions(&self) -> &[RegionId] {
        match self {
            Self::Unlocated => &[],
            Self::Located { regions, .. } => regions,
        }
    }
}

/// Errors returned by [`Classifier::classify_record`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// A coordinate field was present but could not be resolved.
    #[error("invalid {field} value {value:?}: {source}")]
    InvalidCoordinate {
        /// Offending field (`reclat` or `reclong`).
        field: &'static str,
        /// Raw text of the field.
        value: String,
        /// Resolver failure.
        #[source]
        source: CoordinateError,
    },
}

/// Classifies records against a registry under a fixed policy.
///
/// # Examples
/// ```
/// use meteorfall_core::{
///     Classification, ClassificationPolicy, Classifier, DecimalResolver, Record,
///     RegionRegistry,
/// };
///
/// # fn main() -> Result<(), meteorfall_core::ClassifyError> {
/// let classifier = Classifier::new(
///     RegionRegistry::world(),
///     ClassificationPolicy::FirstMatch,
///     DecimalResolver,
/// );
/// let aachen = Record::from_iter([
///     ("name", "Aachen"),
///     ("reclat", "50.775000"),
///     ("reclong", "6.083330"),
/// ]);
/// let outcome = classifier.classify_record(&aachen)?;
/// assert_eq!(outcome.regions()[0].as_str(), "Europe");
///
/// let unlocated = Record::from_iter([("name", "Nowhere")]);
/// assert_eq!(classifier.classify_record(&unlocated)?, Classification::Unlocated);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Classifier<'r, R> {
    registry: &'r RegionRegistry,
    policy: ClassificationPolicy,
    resolver: R,
}

impl<'r, R: CoordinateResolver> Classifier<'r, R> {
    /// Build a classifier over `registry`.
    pub const fn new(registry: &'r RegionRegistry, policy: ClassificationPolicy, resolver: R) -> Self {
        Self {
            registry,
            policy,
            resolver,
        }
    }

    /// Registry the classifier routes into.
    #[must_use]
    pub const fn registry(&self) -> &'r RegionRegistry {
        self.registry
    }

    /// Active policy.
    #[must_use]
    pub const fn policy(&self) -> ClassificationPolicy {
        self.policy
    }

    /// Classify a single record.
    ///
    /// Records missing either coordinate field yield
    /// [`Classification::Unlocated`]. A present but unresolvable field yields
    /// [`ClassifyError::InvalidCoordinate`].
    pub fn classify_record(&self, record: &Record) -> Result<Classification, ClassifyError> {
        let (Some(latitude), Some(longitude)) = (record.latitude(), record.longitude()) else {
            return Ok(Classification::Unlocated);
        };
        let coordinate = Coord {
            x: self.resolve(LONGITUDE_FIELD, longitude)?,
            y: self.resolve(LATITUDE_FIELD, latitude)?,
        };
        let regions = match self.policy {
            ClassificationPolicy::MultiMatch => classify(coordinate, self.registry),
            ClassificationPolicy::FirstMatch => classify_first(coordinate, self.registry)
                .into_iter()
                .collect(),
        };
        Ok(Classification::Located {
            coordinate,
            regions,
        })
    }

    fn resolve(&self, field: &'static str, text: &str) -> Result<f64, ClassifyError> {
        self.resolver
            .resolve(text)
            .map_err(|source| ClassifyError::InvalidCoordinate {
                field,
                value: text.to_owned(),
                source,
            })
    }
}
