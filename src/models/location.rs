//! Location model - data centers valid for a subscription

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A data center location exposed by the provider.
///
/// Identity is case-insensitive on `id` and `name`, exact on everything else,
/// matching how the ARM API reports the same location with varying casing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Fully qualified location id, e.g. `westus` or `westus/zone1`.
    pub id: String,
    /// Short name, e.g. `westus`.
    pub name: String,
    /// Localized name, e.g. `West US`.
    pub display_name: String,
    /// Longitude of the data center.
    pub longitude: f64,
    /// Latitude of the data center.
    pub latitude: f64,
}

impl Location {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
        longitude: f64,
        latitude: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            display_name: display_name.into(),
            longitude,
            latitude,
        }
    }

    /// Case-insensitive id test.
    pub fn matches_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id)
    }

    /// True when `self` is a proper ancestor of `other` in the containment
    /// hierarchy. Ancestry is id-path based: `westus` contains
    /// `westus/zone1`, compared segment-wise and case-insensitively.
    pub fn is_ancestor_of(&self, other: &Location) -> bool {
        let ancestor: Vec<&str> = self.id.split('/').collect();
        let descendant: Vec<&str> = other.id.split('/').collect();
        if ancestor.len() >= descendant.len() {
            return false;
        }
        ancestor
            .iter()
            .zip(descendant.iter())
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq_ignore_ascii_case(&other.id)
            && self.name.eq_ignore_ascii_case(&other.name)
            && self.display_name == other.display_name
            && self.longitude.to_bits() == other.longitude.to_bits()
            && self.latitude.to_bits() == other.latitude.to_bits()
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.to_lowercase().hash(state);
        self.name.to_lowercase().hash(state);
        self.display_name.hash(state);
        self.longitude.to_bits().hash(state);
        self.latitude.to_bits().hash(state);
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
