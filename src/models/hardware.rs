//! Hardware model - VM sizes (SKUs)

use crate::models::Location;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A VM size exposed by the provider, e.g. `Standard_A0`.
///
/// Identity is case-insensitive on `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hardware {
    pub id: String,
    pub name: String,
    /// The region the size was listed for, if region-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Number of virtual cores.
    pub cores: u32,
    /// Memory in MB.
    pub ram_mb: u32,
    /// OS disk size in GB.
    pub disk_gb: u32,
}

impl Hardware {
    pub fn new(id: impl Into<String>, cores: u32, ram_mb: u32, disk_gb: u32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            location: None,
            cores,
            ram_mb,
            disk_gb,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Case-insensitive id test.
    pub fn matches_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id)
    }
}

impl PartialEq for Hardware {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq_ignore_ascii_case(&other.id)
            && self.name.eq_ignore_ascii_case(&other.name)
            && self.location == other.location
            && self.cores == other.cores
            && self.ram_mb == other.ram_mb
            && self.disk_gb == other.disk_gb
    }
}

impl Eq for Hardware {}

impl Hash for Hardware {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.to_lowercase().hash(state);
        self.name.to_lowercase().hash(state);
        self.location.hash(state);
        self.cores.hash(state);
        self.ram_mb.hash(state);
        self.disk_gb.hash(state);
    }
}

impl std::fmt::Display for Hardware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_id_ignores_case() {
        let hw = Hardware::new("Standard_A0", 1, 768, 20);
        assert!(hw.matches_id("standard_a0"));
        assert!(!hw.matches_id("Standard_A1"));
    }

    #[test]
    fn test_identity_ignores_case() {
        let a = Hardware::new("Standard_A0", 1, 768, 20);
        let b = Hardware::new("STANDARD_A0", 1, 768, 20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_identity_exact_on_capacity() {
        let a = Hardware::new("Standard_A0", 1, 768, 20);
        let b = Hardware::new("Standard_A0", 2, 768, 20);
        assert_ne!(a, b);
    }
}
