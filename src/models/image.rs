//! Image model - marketplace and custom VM images

use crate::models::Location;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Operating system family of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Ubuntu,
    Debian,
    Centos,
    Rhel,
    Suse,
    Coreos,
    Windows,
    /// Catch-all for publisher strings the provider mapping does not know.
    #[serde(other)]
    Unrecognized,
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OsFamily::Ubuntu => "ubuntu",
            OsFamily::Debian => "debian",
            OsFamily::Centos => "centos",
            OsFamily::Rhel => "rhel",
            OsFamily::Suse => "suse",
            OsFamily::Coreos => "coreos",
            OsFamily::Windows => "windows",
            OsFamily::Unrecognized => "unrecognized",
        };
        write!(f, "{}", s)
    }
}

/// Image coordinates: marketplace publisher/offer/sku/version, or the
/// resource group + name pair for custom images.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_family: Option<OsFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// True for user-captured images rather than marketplace ones.
    #[serde(default)]
    pub custom: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_image_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
}

/// A VM image known to the provider.
///
/// Equality is case-insensitive on `id` and `name`, exact on location,
/// properties and tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub name: String,
    /// The location the image was fetched from, if it is region-scoped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub properties: ImageProperties,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl Image {
    pub fn new(id: impl Into<String>, name: impl Into<String>, properties: ImageProperties) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: None,
            properties,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Encode the image coordinates into the provider-unique id form:
    /// `location/publisher/offer/sku` for marketplace images,
    /// `resourceGroup/location/name` for custom ones.
    pub fn urn(&self) -> String {
        let location = self
            .location
            .as_ref()
            .map(|l| l.id.as_str())
            .unwrap_or_default();
        let p = &self.properties;
        if p.custom {
            format!(
                "{}/{}/{}",
                p.resource_group.as_deref().unwrap_or_default(),
                location,
                self.name
            )
        } else {
            format!(
                "{}/{}/{}/{}",
                location,
                p.publisher.as_deref().unwrap_or_default(),
                p.offer.as_deref().unwrap_or_default(),
                p.sku.as_deref().unwrap_or_default()
            )
        }
    }

    /// Decode a unique id back into image coordinates. Three fields mean a
    /// custom image, four a marketplace one.
    pub fn properties_from_urn(urn: &str) -> Result<ImageProperties> {
        let fields: Vec<&str> = urn.split('/').collect();
        match fields.as_slice() {
            [resource_group, _location, name] => Ok(ImageProperties {
                custom: true,
                resource_group: Some((*resource_group).to_string()),
                custom_image_id: Some((*name).to_string()),
                ..Default::default()
            }),
            [_location, publisher, offer, sku] => Ok(ImageProperties {
                publisher: Some((*publisher).to_string()),
                offer: Some((*offer).to_string()),
                sku: Some((*sku).to_string()),
                ..Default::default()
            }),
            _ => Err(Error::MalformedUrn(urn.to_string())),
        }
    }
}

impl PartialEq for Image {
    fn eq(&self, other: &Self) -> bool {
        self.id.eq_ignore_ascii_case(&other.id)
            && self.name.eq_ignore_ascii_case(&other.name)
            && self.location == other.location
            && self.properties == other.properties
            && self.tags == other.tags
    }
}

impl Eq for Image {}

impl Hash for Image {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.to_lowercase().hash(state);
        self.name.to_lowercase().hash(state);
        self.location.hash(state);
        self.properties.hash(state);
        self.tags.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ubuntu() -> Image {
        Image::new(
            "eastus/Canonical/UbuntuServer/16.04-LTS",
            "UbuntuServer",
            ImageProperties {
                os_family: Some(OsFamily::Ubuntu),
                publisher: Some("Canonical".into()),
                offer: Some("UbuntuServer".into()),
                sku: Some("16.04-LTS".into()),
                version: Some("16.04.201707270".into()),
                ..Default::default()
            },
        )
        .with_location(Location::new("eastus", "eastus", "East US", -79.8164, 36.6681))
    }

    #[test]
    fn test_identity_ignores_case_on_id_and_name() {
        let a = ubuntu();
        let mut b = ubuntu();
        b.id = b.id.to_uppercase();
        b.name = "ubuntuserver".into();
        assert_eq!(a, b);
    }

    #[test]
    fn test_identity_exact_on_tags() {
        let a = ubuntu();
        let b = ubuntu().with_tag("env", "prod");
        assert_ne!(a, b);
    }

    #[test]
    fn test_marketplace_urn() {
        assert_eq!(ubuntu().urn(), "eastus/Canonical/UbuntuServer/16.04-LTS");
    }

    #[test]
    fn test_custom_urn() {
        let img = Image::new(
            "rg/westus/golden",
            "golden",
            ImageProperties {
                custom: true,
                resource_group: Some("rg".into()),
                ..Default::default()
            },
        )
        .with_location(Location::new("westus", "westus", "West US", -122.417, 47.233));
        assert_eq!(img.urn(), "rg/westus/golden");
    }

    #[test]
    fn test_properties_from_urn() {
        let p = Image::properties_from_urn("eastus/Canonical/UbuntuServer/16.04-LTS").unwrap();
        assert!(!p.custom);
        assert_eq!(p.publisher.as_deref(), Some("Canonical"));
        assert_eq!(p.sku.as_deref(), Some("16.04-LTS"));

        let p = Image::properties_from_urn("rg/westus/golden").unwrap();
        assert!(p.custom);
        assert_eq!(p.resource_group.as_deref(), Some("rg"));
        assert_eq!(p.custom_image_id.as_deref(), Some("golden"));
    }

    #[test]
    fn test_malformed_urn() {
        assert!(Image::properties_from_urn("just-a-name").is_err());
        assert!(Image::properties_from_urn("a/b/c/d/e").is_err());
    }
}
