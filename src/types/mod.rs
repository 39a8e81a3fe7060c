// ABOUTME: Validated domain types shared across the verifier.
// ABOUTME: Endpoint names and container image references.

mod endpoint_name;
mod image_ref;

pub use endpoint_name::{EndpointName, EndpointNameError};
pub use image_ref::{ImageRef, ParseImageRefError};
