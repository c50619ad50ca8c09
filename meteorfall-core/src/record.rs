//! Meteorite-landing records and the rows persisted for each region.
//!
//! A [`Record`] is the raw, field-addressed form produced by a record source.
//! A [`RegionRow`] is the four-column projection written to a regional table.

use std::collections::BTreeMap;

/// Field holding the meteorite name.
pub const NAME_FIELD: &str = "name";
/// Field holding the recorded mass, in grams, as text.
pub const MASS_FIELD: &str = "mass";
/// Field holding the recorded latitude in decimal degrees, as text.
pub const LATITUDE_FIELD: &str = "reclat";
/// Field holding the recorded longitude in decimal degrees, as text.
pub const LONGITUDE_FIELD: &str = "reclong";

/// A single meteorite-landing record.
///
/// Records are opaque mappings from field name to text. Only the `name`,
/// `mass`, `reclat` and `reclong` fields carry meaning for the pipeline; any
/// other fields are kept so callers can inspect them.
///
/// # Examples
/// ```
/// use meteorfall_core::Record;
///
/// let record = Record::from_iter([("name", "Aachen"), ("reclat", "50.775")]);
/// assert_eq!(record.name(), Some("Aachen"));
/// assert_eq!(record.latitude(), Some("50.775"));
/// assert_eq!(record.longitude(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// Construct a record from an explicit field map.
    #[must_use]
    pub const fn new(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }

    /// Return the text stored under `field`, if present.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Meteorite name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get(NAME_FIELD)
    }

    /// Recorded mass as text.
    #[must_use]
    pub fn mass(&self) -> Option<&str> {
        self.get(MASS_FIELD)
    }

    /// Raw latitude text (`reclat`).
    #[must_use]
    pub fn latitude(&self) -> Option<&str> {
        self.get(LATITUDE_FIELD)
    }

    /// Raw longitude text (`reclong`).
    #[must_use]
    pub fn longitude(&self) -> Option<&str> {
        self.get(LONGITUDE_FIELD)
    }

    /// All fields carried by the record.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Row written to a regional table.
///
/// Every column is text. The coordinate columns hold the source text verbatim
/// rather than a re-rendered number, so a stored row always mirrors its
/// record. `name` and `mass` are `None` when the record omitted them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionRow {
    /// Meteorite name.
    pub name: Option<String>,
    /// Recorded mass.
    pub mass: Option<String>,
    /// Latitude text.
    pub reclat: String,
    /// Longitude text.
    pub reclong: String,
}

impl RegionRow {
    /// Build a row from its four columns.
    ///
    /// # Examples
    /// ```
    /// use meteorfall_core::RegionRow;
    ///
    /// let row = RegionRow::new("A", "10", "0", "0");
    /// assert_eq!(row.name.as_deref(), Some("A"));
    /// ```
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        mass: impl Into<String>,
        reclat: impl Into<String>,
        reclong: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            mass: Some(mass.into()),
            reclat: reclat.into(),
            reclong: reclong.into(),
        }
    }

    /// Project a record onto the persisted columns.
    ///
    /// Returns `None` when the record lacks either coordinate field; such
    /// records never reach a regional table.
    #[must_use]
    pub fn from_record(record: &Record) -> Option<Self> {
        let reclat = record.latitude()?;
        let reclong = record.longitude()?;
        Some(Self {
            name: record.name().map(str::to_owned),
            mass: record.mass().map(str::to_owned),
            reclat: reclat.to_owned(),
            reclong: reclong.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn row_mirrors_record_text() {
        let record = Record::from_iter([
            ("name", "Aachen"),
            ("mass", "21"),
            ("reclat", "50.775000"),
            ("reclong", "6.083330"),
            ("recclass", "L5"),
        ]);
        let row = RegionRow::from_record(&record).expect("record has coordinates");
        assert_eq!(row, RegionRow::new("Aachen", "21", "50.775000", "6.083330"));
    }

    #[rstest]
    #[case(&[("name", "B"), ("mass", "5")])]
    #[case(&[("name", "B"), ("reclat", "1.0")])]
    #[case(&[("name", "B"), ("reclong", "1.0")])]
    fn row_requires_both_coordinates(#[case] fields: &[(&str, &str)]) {
        let record = Record::from_iter(fields.iter().copied());
        assert!(RegionRow::from_record(&record).is_none());
    }

    #[rstest]
    fn missing_name_and_mass_become_none() {
        let record = Record::from_iter([("reclat", "0"), ("reclong", "0")]);
        let row = RegionRow::from_record(&record).expect("record has coordinates");
        assert_eq!(row.name, None);
        assert_eq!(row.mass, None);
    }
}
