//! Reusable predicates over catalog entries
//!
//! Small boolean tests the resolver composes when filtering images and
//! hardware profiles against the accumulated query constraints.

use crate::builder::TemplateQuery;
use crate::models::{Hardware, Image, Location};

/// Predicate matching an image whose id equals `id` ignoring case.
pub fn image_id_equals_ignore_case(id: &str) -> impl Fn(&Image) -> bool + '_ {
    move |image| image.id.eq_ignore_ascii_case(id)
}

/// Predicate matching a hardware profile whose id equals `id` ignoring case.
pub fn hardware_id_equals_ignore_case(id: &str) -> impl Fn(&Hardware) -> bool + '_ {
    move |hardware| hardware.id.eq_ignore_ascii_case(id)
}

/// True when a catalog entry scoped to `candidate` is usable under `scope`.
///
/// An unset scope accepts anything; an unscoped entry is usable everywhere;
/// otherwise the two must be equal by id or related by ancestry in either
/// direction (a region-scoped image is usable in one of its zones, and a
/// zone-scoped SKU satisfies a region-wide query).
pub fn location_covers(scope: Option<&Location>, candidate: Option<&Location>) -> bool {
    match (scope, candidate) {
        (None, _) | (_, None) => true,
        (Some(scope), Some(candidate)) => {
            scope.matches_id(&candidate.id)
                || scope.is_ancestor_of(candidate)
                || candidate.is_ancestor_of(scope)
        }
    }
}

/// The "supported images" filter: OS family, name substring, version and
/// location compatibility against the query.
pub fn image_matches_query(image: &Image, query: &TemplateQuery) -> bool {
    if let Some(family) = query.os_family {
        if image.properties.os_family != Some(family) {
            return false;
        }
    }
    if let Some(fragment) = query.image_name_matches.as_deref() {
        if !image
            .name
            .to_lowercase()
            .contains(&fragment.to_lowercase())
        {
            return false;
        }
    }
    if let Some(version) = query.image_version.as_deref() {
        match image.properties.version.as_deref() {
            Some(v) if v.eq_ignore_ascii_case(version) => {}
            _ => return false,
        }
    }
    location_covers(query.location.as_ref(), image.location.as_ref())
}

/// Hardware filter: location compatibility plus minimum capacity.
pub fn hardware_matches_query(hardware: &Hardware, query: &TemplateQuery) -> bool {
    if let Some(min) = query.min_cores {
        if hardware.cores < min {
            return false;
        }
    }
    if let Some(min) = query.min_ram_mb {
        if hardware.ram_mb < min {
            return false;
        }
    }
    if let Some(min) = query.min_disk_gb {
        if hardware.disk_gb < min {
            return false;
        }
    }
    location_covers(query.location.as_ref(), hardware.location.as_ref())
}

/// True when a hardware profile can host a given image: today this is
/// location compatibility between the two catalog entries.
pub fn hardware_supports_image(hardware: &Hardware, image: &Image) -> bool {
    location_covers(hardware.location.as_ref(), image.location.as_ref())
}
