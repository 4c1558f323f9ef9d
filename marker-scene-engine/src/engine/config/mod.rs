/// Site configuration document and the `ar` section data model.
pub mod site_config;

/// Structured transform triples and the `"x y z"` boundary encoding.
pub mod transform;

pub use site_config::{ArConfig, ModelDescriptor, SiteConfig};
pub use transform::{TransformParams, format_vec3, parse_vec3};
