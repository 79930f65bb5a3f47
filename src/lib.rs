//! Client for the broker portal REST API and the property list state behind it.

pub mod analytics;
pub mod api;
pub mod error;
pub mod models;
pub mod settings;
pub mod store;

pub use api::{HttpPropertyApi, PropertyApi, SearchPage, UserApi};
pub use error::{ApiError, ApiResult};
pub use models::{BrokerId, Property, PropertyId, PropertyStatus};
pub use settings::Settings;
pub use store::{FilterState, PropertyListCoordinator, SortBy};
