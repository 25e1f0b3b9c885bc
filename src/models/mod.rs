//! Data models

mod hardware;
mod image;
mod location;
mod template;

pub use hardware::*;
pub use image::*;
pub use location::*;
pub use template::*;
