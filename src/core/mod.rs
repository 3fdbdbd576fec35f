//! Core business logic - framework-agnostic product operations.

/// Controllers called by the HTTP layer
pub mod controller;
/// Product service and error normalization
pub mod product;

pub use controller::{HealthController, HealthReport, ProductController};
pub use product::{ProductService, handle_service_errors};
