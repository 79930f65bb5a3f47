use serde::{Deserialize, Serialize};

use crate::models::{BrokerId, NewProperty, Property, PropertyId, PropertyStatus};
use crate::store::filters::{FilterState, SortBy};

/// Body of a property search request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub broker_id: Option<BrokerId>,
    pub page: u32,
    pub limit: u32,
    pub search_query: String,
    pub statuses: Vec<PropertyStatus>,
    pub property_types: Vec<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort_by: SortBy,
}

impl SearchRequest {
    pub fn new(broker_id: &BrokerId, filters: &FilterState, page: u32, limit: u32) -> Self {
        Self {
            broker_id: Some(broker_id.clone()),
            page,
            limit,
            search_query: filters.search_query.clone(),
            statuses: filters.statuses.iter().copied().collect(),
            property_types: filters.property_types.iter().cloned().collect(),
            min_price: filters.min_price,
            max_price: filters.max_price,
            sort_by: filters.sort_by,
        }
    }
}

/// Pagination metadata attached to a paginated search response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub limit: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// Which response shape the search endpoint answered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    Legacy,
    Paginated,
}

/// A search response, classified once when it is decoded
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPage {
    /// Bare list without metadata; treated as complete and unpaginated
    Legacy(Vec<Property>),
    Paginated {
        properties: Vec<Property>,
        pagination: PaginationMeta,
    },
}

impl SearchPage {
    pub fn mode(&self) -> ResponseMode {
        match self {
            SearchPage::Legacy(_) => ResponseMode::Legacy,
            SearchPage::Paginated { .. } => ResponseMode::Paginated,
        }
    }

    pub fn properties(&self) -> &[Property] {
        match self {
            SearchPage::Legacy(properties) => properties,
            SearchPage::Paginated { properties, .. } => properties,
        }
    }

    pub fn pagination(&self) -> Option<&PaginationMeta> {
        match self {
            SearchPage::Legacy(_) => None,
            SearchPage::Paginated { pagination, .. } => Some(pagination),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.properties().is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSearchResponse {
    Legacy(Vec<Property>),
    Paginated {
        properties: Vec<Property>,
        pagination: PaginationMeta,
    },
}

impl From<RawSearchResponse> for SearchPage {
    fn from(raw: RawSearchResponse) -> Self {
        match raw {
            RawSearchResponse::Legacy(properties) => SearchPage::Legacy(properties),
            RawSearchResponse::Paginated {
                properties,
                pagination,
            } => SearchPage::Paginated {
                properties,
                pagination,
            },
        }
    }
}

impl<'de> Deserialize<'de> for SearchPage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        RawSearchResponse::deserialize(deserializer).map(SearchPage::from)
    }
}

/// Body of an update request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest<'a> {
    pub broker_id: &'a BrokerId,
    pub property_id: &'a PropertyId,
    pub property_data: &'a NewProperty,
}

/// Body of a delete request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest<'a> {
    pub property_id: &'a PropertyId,
    pub broker_id: &'a BrokerId,
}

/// Registration form for a new broker account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
}

/// Login with either an email address or a phone number
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(rename = "emailOrphone")]
    pub email_or_phone: String,
    pub password: String,
}

/// Broker account as returned by the users endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id", alias = "userId")]
    pub id: BrokerId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
}

/// Successful login; the user's identifier is the broker identity
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    #[serde(default)]
    pub token: Option<String>,
}
