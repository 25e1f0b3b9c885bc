//! Template resolution - turning partial constraints into a provisionable
//! Template
//!
//! Callers accumulate constraints on a `TemplateBuilder` (an explicit image
//! id, a hardware id, a location, minimum capacity...) and `build()` picks
//! one compatible (image, hardware, location) triple out of the provider
//! catalogs, or fails naming everything it considered.

use crate::catalog::{ImageCache, Supplier};
use crate::models::{Hardware, Image, Location, OsFamily, Template, TemplateOptions};
use crate::predicates::{
    hardware_matches_query, hardware_supports_image, image_id_equals_ignore_case,
    image_matches_query,
};
use crate::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// The constraints accumulated for one resolution.
///
/// Immutable: every `with_*` call returns an updated copy, so a query can be
/// shared or replayed freely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateQuery {
    pub image_id: Option<String>,
    pub hardware_id: Option<String>,
    pub location: Option<Location>,
    pub os_family: Option<OsFamily>,
    pub image_name_matches: Option<String>,
    pub image_version: Option<String>,
    pub min_cores: Option<u32>,
    pub min_ram_mb: Option<u32>,
    pub min_disk_gb: Option<u32>,
    pub options: Option<TemplateOptions>,
}

impl TemplateQuery {
    pub fn with_image_id(mut self, id: impl Into<String>) -> Self {
        self.image_id = Some(id.into());
        self
    }

    pub fn with_hardware_id(mut self, id: impl Into<String>) -> Self {
        self.hardware_id = Some(id.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_os_family(mut self, family: OsFamily) -> Self {
        self.os_family = Some(family);
        self
    }

    pub fn with_image_name_matches(mut self, fragment: impl Into<String>) -> Self {
        self.image_name_matches = Some(fragment.into());
        self
    }

    pub fn with_image_version(mut self, version: impl Into<String>) -> Self {
        self.image_version = Some(version.into());
        self
    }

    pub fn with_min_cores(mut self, cores: u32) -> Self {
        self.min_cores = Some(cores);
        self
    }

    pub fn with_min_ram_mb(mut self, ram_mb: u32) -> Self {
        self.min_ram_mb = Some(ram_mb);
        self
    }

    pub fn with_min_disk_gb(mut self, disk_gb: u32) -> Self {
        self.min_disk_gb = Some(disk_gb);
        self
    }

    pub fn with_options(mut self, options: TemplateOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// True when nothing besides options has been set since construction.
    pub fn is_unconstrained(&self) -> bool {
        self.image_id.is_none()
            && self.hardware_id.is_none()
            && self.location.is_none()
            && self.os_family.is_none()
            && self.image_name_matches.is_none()
            && self.image_version.is_none()
            && self.min_cores.is_none()
            && self.min_ram_mb.is_none()
            && self.min_disk_gb.is_none()
    }

    /// Copy the matchers implied by a resolved image, so hardware resolution
    /// stays consistent with the explicit image choice.
    pub fn narrowed_to_image(mut self, image: &Image) -> Self {
        if let Some(family) = image.properties.os_family {
            self.os_family = Some(family);
        }
        if let Some(version) = image.properties.version.clone() {
            self.image_version = Some(version);
        }
        self.image_name_matches = Some(image.name.clone());
        self
    }
}

impl fmt::Display for TemplateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(v) = &self.image_id {
            parts.push(format!("imageId={}", v));
        }
        if let Some(v) = &self.hardware_id {
            parts.push(format!("hardwareId={}", v));
        }
        if let Some(v) = &self.location {
            parts.push(format!("location={}", v));
        }
        if let Some(v) = &self.os_family {
            parts.push(format!("osFamily={}", v));
        }
        if let Some(v) = &self.image_name_matches {
            parts.push(format!("imageNameMatches={}", v));
        }
        if let Some(v) = &self.image_version {
            parts.push(format!("imageVersion={}", v));
        }
        if let Some(v) = self.min_cores {
            parts.push(format!("minCores={}", v));
        }
        if let Some(v) = self.min_ram_mb {
            parts.push(format!("minRamMb={}", v));
        }
        if let Some(v) = self.min_disk_gb {
            parts.push(format!("minDiskGb={}", v));
        }
        write!(f, "query({})", parts.join(", "))
    }
}

/// The injected, read-only collaborators every resolution reads from.
///
/// Suppliers are shared across concurrent builds; a builder instance is not.
pub struct Catalogs {
    pub locations: Arc<dyn Supplier<Arc<Vec<Location>>>>,
    pub images: Arc<dyn Supplier<Arc<Vec<Image>>>>,
    pub hardware: Arc<dyn Supplier<Arc<Vec<Hardware>>>>,
    pub default_location: Arc<dyn Supplier<Location>>,
    pub image_cache: Arc<ImageCache>,
}

/// Resolution strategy. Providers with nonstandard catalog semantics supply
/// their own implementation at construction time.
pub trait Resolve: Send + Sync {
    fn resolve(&self, query: &TemplateQuery, catalogs: &Catalogs) -> Result<Template>;
}

/// True when the current location is strictly wider than the candidate:
/// unset, or a proper ancestor in the containment hierarchy. Resolution only
/// ever narrows; it never widens.
pub fn currently_wider_than(current: Option<&Location>, candidate: Option<&Location>) -> bool {
    match (current, candidate) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(current), Some(candidate)) => current.is_ancestor_of(candidate),
    }
}

/// Default ordering for hardware candidates: smallest satisfying profile
/// first, by (cores, ram, disk), with the id as a deterministic tie-break.
pub fn default_hardware_ordering(a: &Hardware, b: &Hardware) -> Ordering {
    (a.cores, a.ram_mb, a.disk_gb, &a.id).cmp(&(b.cores, b.ram_mb, b.disk_gb, &b.id))
}

/// The ARM resolution strategy.
pub struct ArmResolver {
    hardware_ordering: fn(&Hardware, &Hardware) -> Ordering,
}

impl Default for ArmResolver {
    fn default() -> Self {
        Self {
            hardware_ordering: default_hardware_ordering,
        }
    }
}

impl ArmResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the hardware comparator (still smallest-first semantics: the
    /// minimum under the ordering wins).
    pub fn with_hardware_ordering(mut self, ordering: fn(&Hardware, &Hardware) -> Ordering) -> Self {
        self.hardware_ordering = ordering;
        self
    }

    /// Explicit image lookup: primary case-insensitive scan, then the keyed
    /// cache (which may refresh that single image), then a not-found error
    /// listing every id that was considered.
    fn load_image_with_id(&self, id: &str, images: &[Image], catalogs: &Catalogs) -> Result<Image> {
        if let Some(found) = images.iter().find(|i| image_id_equals_ignore_case(id)(i)) {
            return Ok(found.clone());
        }
        tracing::debug!(image_id = %id, "image not in memoized set, trying keyed cache");
        if let Some(found) = catalogs.image_cache.get(id)? {
            return Ok(found);
        }
        Err(Error::ImageNotFound {
            id: id.to_string(),
            searched: images.iter().map(|i| i.id.clone()).collect(),
        })
    }

    /// Explicit hardware lookup is an exact id match; VM size names are
    /// stable identifiers, unlike image ids.
    fn find_hardware_with_id(&self, id: &str, hardware: &[Hardware]) -> Result<Hardware> {
        hardware
            .iter()
            .find(|h| h.id == id)
            .cloned()
            .ok_or_else(|| Error::HardwareNotFound {
                id: id.to_string(),
                searched: hardware.iter().map(|h| h.id.clone()).collect(),
            })
    }

    /// Best hardware out of `candidates` that satisfies the query and can
    /// host at least one of `supported_images`.
    fn resolve_hardware(
        &self,
        candidates: &[Hardware],
        supported_images: &[&Image],
        query: &TemplateQuery,
    ) -> Result<Hardware> {
        candidates
            .iter()
            .filter(|h| hardware_matches_query(h, query))
            .filter(|h| supported_images.iter().any(|i| hardware_supports_image(h, i)))
            .min_by(|a, b| (self.hardware_ordering)(a, b))
            .cloned()
            .ok_or_else(|| Error::NoMatch(format!("hardware matching {}", query)))
    }

    /// Best image out of `supported_images` hostable on the chosen hardware:
    /// highest version, then name, then id.
    fn resolve_image(
        &self,
        hardware: &Hardware,
        supported_images: &[&Image],
        query: &TemplateQuery,
    ) -> Result<Image> {
        supported_images
            .iter()
            .filter(|i| hardware_supports_image(hardware, i))
            .max_by(|a, b| {
                (a.properties.version.as_deref(), &a.name, &a.id).cmp(&(
                    b.properties.version.as_deref(),
                    &b.name,
                    &b.id,
                ))
            })
            .map(|i| (*i).clone())
            .ok_or_else(|| {
                Error::NoMatch(format!(
                    "image on hardware({}) matching {}",
                    hardware.id, query
                ))
            })
    }
}

impl Resolve for ArmResolver {
    fn resolve(&self, query: &TemplateQuery, catalogs: &Catalogs) -> Result<Template> {
        tracing::debug!(params = %query, ">> searching");

        let images = catalogs.images.get()?;
        if images.is_empty() {
            return Err(Error::InvalidState("no images present".into()));
        }
        let hardware_set = catalogs.hardware.get()?;
        if hardware_set.is_empty() {
            return Err(Error::InvalidState("no hardware profiles present".into()));
        }

        let mut query = query.clone();

        let mut image = None;
        if let Some(id) = query.image_id.clone() {
            let found = self.load_image_with_id(&id, &images, catalogs)?;
            query = query.narrowed_to_image(&found);
            if currently_wider_than(query.location.as_ref(), found.location.as_ref()) {
                query.location = found.location.clone();
            }
            image = Some(found);
        }

        let mut hardware = None;
        if let Some(id) = query.hardware_id.clone() {
            let found = self.find_hardware_with_id(&id, &hardware_set)?;
            if currently_wider_than(query.location.as_ref(), found.location.as_ref()) {
                query.location = found.location.clone();
            }
            hardware = Some(found);
        }

        // No location id, and no image or hardware carrying one: scope the
        // search to the process-wide default.
        if query.location.is_none() {
            query.location = Some(catalogs.default_location.get()?);
        }

        let (image, hardware) = match image {
            None => {
                let supported: Vec<&Image> = images
                    .iter()
                    .filter(|i| image_matches_query(i, &query))
                    .collect();
                let hardware = match hardware {
                    Some(h) => h,
                    None => self.resolve_hardware(&hardware_set, &supported, &query)?,
                };
                let image = self.resolve_image(&hardware, &supported, &query)?;
                (image, hardware)
            }
            Some(resolved) => {
                let hardware = match hardware {
                    Some(h) => h,
                    None => self.resolve_hardware(&hardware_set, &[&resolved], &query)?,
                };
                (resolved, hardware)
            }
        };

        let location = query
            .location
            .clone()
            .ok_or_else(|| Error::InvalidState("no location resolved".into()))?;

        tracing::debug!(
            image = %image.id,
            hardware = %hardware.id,
            location = %location,
            "<< matched"
        );
        Ok(Template::new(
            image,
            hardware,
            location,
            query.options.unwrap_or_default(),
        ))
    }
}

/// Accumulates constraints and resolves them against the catalogs.
///
/// Not shareable across concurrent builds: create one per logical "build a
/// template" operation. The catalogs behind it are the shared part.
pub struct TemplateBuilder {
    catalogs: Arc<Catalogs>,
    options_provider: Arc<dyn Supplier<TemplateOptions>>,
    default_query: Arc<dyn Supplier<TemplateQuery>>,
    resolver: Arc<dyn Resolve>,
    query: TemplateQuery,
}

fn default_options() -> Result<TemplateOptions> {
    Ok(TemplateOptions::default())
}

fn unconstrained_query() -> Result<TemplateQuery> {
    Ok(TemplateQuery::default())
}

impl TemplateBuilder {
    pub fn new(catalogs: Arc<Catalogs>) -> Self {
        Self {
            catalogs,
            options_provider: Arc::new(default_options),
            default_query: Arc::new(unconstrained_query),
            resolver: Arc::new(ArmResolver::default()),
            query: TemplateQuery::default(),
        }
    }

    /// Swap the resolution strategy.
    pub fn with_resolver(mut self, resolver: Arc<dyn Resolve>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the default-options factory used when no options were set.
    pub fn with_options_provider(
        mut self,
        provider: Arc<dyn Supplier<TemplateOptions>>,
    ) -> Self {
        self.options_provider = provider;
        self
    }

    /// Replace the default-template query used by the unconstrained fast
    /// path.
    pub fn with_default_query(mut self, provider: Arc<dyn Supplier<TemplateQuery>>) -> Self {
        self.default_query = provider;
        self
    }

    pub fn image_id(mut self, id: impl Into<String>) -> Self {
        self.query = self.query.with_image_id(id);
        self
    }

    pub fn hardware_id(mut self, id: impl Into<String>) -> Self {
        self.query = self.query.with_hardware_id(id);
        self
    }

    /// Set the search location by id, resolved against the location catalog
    /// immediately; an unknown id fails here, before `build()`.
    pub fn location_id(mut self, id: &str) -> Result<Self> {
        let locations = self.catalogs.locations.get()?;
        let found = locations
            .iter()
            .find(|l| l.matches_id(id))
            .cloned()
            .ok_or_else(|| Error::LocationNotFound {
                id: id.to_string(),
                known: locations.iter().map(|l| l.id.clone()).collect(),
            })?;
        self.query.location = Some(found);
        Ok(self)
    }

    pub fn location(mut self, location: Location) -> Self {
        self.query = self.query.with_location(location);
        self
    }

    pub fn os_family(mut self, family: OsFamily) -> Self {
        self.query = self.query.with_os_family(family);
        self
    }

    pub fn image_name_matches(mut self, fragment: impl Into<String>) -> Self {
        self.query = self.query.with_image_name_matches(fragment);
        self
    }

    pub fn image_version(mut self, version: impl Into<String>) -> Self {
        self.query = self.query.with_image_version(version);
        self
    }

    pub fn min_cores(mut self, cores: u32) -> Self {
        self.query = self.query.with_min_cores(cores);
        self
    }

    pub fn min_ram_mb(mut self, ram_mb: u32) -> Self {
        self.query = self.query.with_min_ram_mb(ram_mb);
        self
    }

    pub fn min_disk_gb(mut self, disk_gb: u32) -> Self {
        self.query = self.query.with_min_disk_gb(disk_gb);
        self
    }

    pub fn options(mut self, options: TemplateOptions) -> Self {
        self.query = self.query.with_options(options);
        self
    }

    /// The constraints accumulated so far.
    pub fn query(&self) -> &TemplateQuery {
        &self.query
    }

    /// Resolve the accumulated constraints into a Template.
    ///
    /// Takes `&self`: building twice off an unmodified builder yields equal
    /// templates.
    pub fn build(&self) -> Result<Template> {
        if self.query.is_unconstrained() {
            tracing::debug!("nothing changed except options, delegating to default template");
            let mut default = self.default_query.get()?;
            if self.query.options.is_some() {
                default.options = self.query.options.clone();
            }
            return self.resolver.resolve(&default, &self.catalogs);
        }

        let mut query = self.query.clone();
        if query.options.is_none() {
            query.options = Some(self.options_provider.get()?);
        }
        self.resolver.resolve(&query, &self.catalogs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImageProperties, OsFamily};

    fn loc(id: &str) -> Location {
        Location::new(id, id, id, 0.0, 0.0)
    }

    #[test]
    fn test_unconstrained_query() {
        assert!(TemplateQuery::default().is_unconstrained());
        assert!(TemplateQuery::default()
            .with_options(TemplateOptions::default())
            .is_unconstrained());
        assert!(!TemplateQuery::default().with_min_cores(2).is_unconstrained());
    }

    #[test]
    fn test_wider_than_unset_current() {
        assert!(currently_wider_than(None, Some(&loc("westus"))));
    }

    #[test]
    fn test_wider_than_ancestor() {
        let region = loc("westus");
        let zone = loc("westus/zone1");
        assert!(currently_wider_than(Some(&region), Some(&zone)));
        assert!(!currently_wider_than(Some(&zone), Some(&region)));
        assert!(!currently_wider_than(Some(&region), Some(&region)));
    }

    #[test]
    fn test_wider_than_unset_candidate_never_adopts() {
        assert!(!currently_wider_than(None, None));
        assert!(!currently_wider_than(Some(&loc("westus")), None));
    }

    #[test]
    fn test_default_hardware_ordering_prefers_smallest() {
        let small = Hardware::new("Standard_A0", 1, 768, 20);
        let big = Hardware::new("Standard_A1", 2, 3584, 70);
        assert_eq!(default_hardware_ordering(&small, &big), Ordering::Less);
    }

    #[test]
    fn test_default_hardware_ordering_ties_on_id() {
        let a = Hardware::new("Standard_A1", 2, 3584, 70);
        let b = Hardware::new("Standard_B1", 2, 3584, 70);
        assert_eq!(default_hardware_ordering(&a, &b), Ordering::Less);
        assert_eq!(default_hardware_ordering(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_narrowed_to_image_copies_matchers() {
        let image = Image::new(
            "eastus/Canonical/UbuntuServer/16.04-LTS",
            "UbuntuServer",
            ImageProperties {
                os_family: Some(OsFamily::Ubuntu),
                version: Some("16.04.201707270".into()),
                ..Default::default()
            },
        );
        let query = TemplateQuery::default().narrowed_to_image(&image);
        assert_eq!(query.os_family, Some(OsFamily::Ubuntu));
        assert_eq!(query.image_version.as_deref(), Some("16.04.201707270"));
        assert_eq!(query.image_name_matches.as_deref(), Some("UbuntuServer"));
    }

    #[test]
    fn test_query_display_lists_set_fields() {
        let query = TemplateQuery::default()
            .with_image_id("img-1")
            .with_min_cores(4);
        let s = query.to_string();
        assert!(s.contains("imageId=img-1"));
        assert!(s.contains("minCores=4"));
        assert!(!s.contains("hardwareId"));
    }
}
