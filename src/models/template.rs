//! Template model - the resolved provisioning bundle

use crate::models::{Hardware, Image, Location};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Provisioning options carried through resolution unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateOptions {
    /// Inbound TCP ports to open on the provisioned instance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inbound_ports: Vec<u16>,
    /// Resource tags to apply.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    /// Resource group to provision into, if not the default one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group: Option<String>,
}

impl TemplateOptions {
    pub fn inbound_ports(mut self, ports: impl Into<Vec<u16>>) -> Self {
        self.inbound_ports = ports.into();
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn login_user(mut self, user: impl Into<String>) -> Self {
        self.login_user = Some(user.into());
        self
    }

    pub fn public_key(mut self, key: impl Into<String>) -> Self {
        self.public_key = Some(key.into());
        self
    }

    pub fn resource_group(mut self, group: impl Into<String>) -> Self {
        self.resource_group = Some(group.into());
        self
    }
}

/// The resolved (image, hardware, location, options) bundle, ready to
/// provision. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    image: Image,
    hardware: Hardware,
    location: Location,
    options: TemplateOptions,
}

impl Template {
    pub fn new(
        image: Image,
        hardware: Hardware,
        location: Location,
        options: TemplateOptions,
    ) -> Self {
        Self {
            image,
            hardware,
            location,
            options,
        }
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn hardware(&self) -> &Hardware {
        &self.hardware
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }
}
