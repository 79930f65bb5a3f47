use async_trait::async_trait;

use crate::api::types::{Credentials, LoginResponse, Registration, SearchPage, SearchRequest, User};
use crate::error::ApiResult;
use crate::models::{BrokerId, NewProperty, Property, PropertyId};

/// Property endpoints the portal talks to
/// The coordinator depends on this trait only, so tests can swap in a fake
#[async_trait]
pub trait PropertyApi: Send + Sync {
    /// Fetch one page of a broker's properties under the given filters
    async fn search(&self, request: &SearchRequest) -> ApiResult<SearchPage>;

    /// Fetch a single property record
    async fn get(&self, broker_id: Option<&BrokerId>, property_id: &PropertyId) -> ApiResult<Property>;

    async fn create(&self, property: &NewProperty) -> ApiResult<Property>;

    async fn update(
        &self,
        broker_id: &BrokerId,
        property_id: &PropertyId,
        property: &NewProperty,
    ) -> ApiResult<Property>;

    async fn delete(&self, broker_id: &BrokerId, property_id: &PropertyId) -> ApiResult<()>;
}

/// Broker account endpoints
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn register(&self, registration: &Registration) -> ApiResult<User>;

    async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse>;

    async fn get_user(&self, user_id: &BrokerId) -> ApiResult<User>;
}
