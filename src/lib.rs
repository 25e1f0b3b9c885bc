//! Azure ARM compute provider adapter
//!
//! Adapts the Azure Resource Manager catalog (images, VM sizes, locations)
//! to a vendor-neutral compute model. The heart of the crate is template
//! resolution: given partial, possibly conflicting constraints, pick one
//! compatible (image, hardware, location) triple deterministically, or fail
//! with an error naming everything that was considered.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use azure_arm_compute::{Catalogs, OsFamily, TemplateBuilder};
//! # fn catalogs() -> Arc<Catalogs> { unimplemented!() }
//!
//! let catalogs: Arc<Catalogs> = catalogs();
//!
//! let template = TemplateBuilder::new(catalogs)
//!     .os_family(OsFamily::Ubuntu)
//!     .min_cores(2)
//!     .location_id("westus")?
//!     .build()?;
//!
//! println!("{} on {}", template.image().id, template.hardware().id);
//! # Ok::<(), azure_arm_compute::Error>(())
//! ```

pub mod builder;
pub mod catalog;
pub mod error;
pub mod models;
pub mod predicates;

pub use builder::{ArmResolver, Catalogs, Resolve, TemplateBuilder, TemplateQuery};
pub use catalog::{ImageCache, ImageLoader, Memoized, Supplier};
pub use error::{Error, Result};
pub use models::{
    Hardware, Image, ImageProperties, Location, OsFamily, Template, TemplateOptions,
};
