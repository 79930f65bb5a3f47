use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Maximum number of images a listing may carry
pub const MAX_IMAGES: usize = 5;

/// Identifier of a property record (`_id` on the wire)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(String);

impl PropertyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identity of the authenticated broker; scopes every property query
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrokerId(String);

impl BrokerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BrokerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BrokerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Lifecycle status of a listing
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Available,
    Booked,
    Unavailable,
}

impl PropertyStatus {
    pub const ALL: [PropertyStatus; 3] = [Self::Available, Self::Booked, Self::Unavailable];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Latitude/longitude pair picked on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Location information for a property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Location {
    pub address: String,
    pub city: String,
    pub district: String,
    pub locality: String,
    pub landmark: String,
    pub coordinates: Option<Coordinates>,
}

/// Owner contact details recorded by the broker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Owner {
    pub name: String,
    pub contact: String,
}

/// Engagement counters maintained by the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub views: u64,
    pub favorites: u64,
}

/// Core property data model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id", alias = "id")]
    pub id: PropertyId,
    pub broker_id: BrokerId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub property_type: String,
    #[serde(default)]
    pub rooms: String,
    #[serde(default)]
    pub furnishing: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub owner: Owner,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub floors: u32,
    pub price: i64,
    #[serde(default)]
    pub status: PropertyStatus,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub meta: Meta,
}

/// Payload for creating a listing; the server assigns the identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub broker_id: String,
    pub title: String,
    pub description: String,
    pub property_type: String,
    pub rooms: String,
    pub furnishing: String,
    pub location: Location,
    pub owner: Owner,
    pub pincode: String,
    pub area: f64,
    pub floors: u32,
    pub price: i64,
    pub status: PropertyStatus,
    pub images: Vec<String>,
    pub notes: Option<String>,
}

impl NewProperty {
    /// Check the form rules the portal enforces before submitting a listing
    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [
            ("brokerId", &self.broker_id),
            ("title", &self.title),
            ("description", &self.description),
            ("propertyType", &self.property_type),
            ("rooms", &self.rooms),
            ("furnishing", &self.furnishing),
            ("address", &self.location.address),
            ("city", &self.location.city),
            ("district", &self.location.district),
            ("locality", &self.location.locality),
            ("landmark", &self.location.landmark),
            ("ownerName", &self.owner.name),
            ("ownerContact", &self.owner.contact),
            ("pincode", &self.pincode),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ApiError::validation(field, "is required"));
            }
        }

        if self.price <= 0 {
            return Err(ApiError::validation("price", "must be greater than zero"));
        }
        if self.area <= 0.0 {
            return Err(ApiError::validation("area", "must be greater than zero"));
        }
        if self.location.coordinates.is_none() {
            return Err(ApiError::validation("coordinates", "set the location on the map"));
        }
        if self.images.is_empty() {
            return Err(ApiError::validation("images", "select at least one image"));
        }
        if self.images.len() > MAX_IMAGES {
            return Err(ApiError::validation(
                "images",
                format!("at most {MAX_IMAGES} images are allowed"),
            ));
        }

        Ok(())
    }
}
