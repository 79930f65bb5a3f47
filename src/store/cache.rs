use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::models::{Property, PropertyId};

/// When cached property details stop being served
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "policy")]
pub enum EvictionPolicy {
    /// Entries live for the whole session
    #[default]
    None,
    /// Entries are dropped or refreshed when the record is updated or deleted
    OnMutation,
    /// Entries expire after the given age
    Ttl {
        #[serde(with = "secs")]
        ttl: Duration,
    },
}

mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    property: Property,
    loaded_at: Instant,
}

/// Property details loaded on first view, keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct DetailCache {
    policy: EvictionPolicy,
    entries: HashMap<PropertyId, Entry>,
}

impl DetailCache {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
        }
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    /// A fresh entry, if any. Expired TTL entries are treated as absent
    pub fn get(&self, id: &PropertyId) -> Option<&Property> {
        let entry = self.entries.get(id)?;
        match self.policy {
            EvictionPolicy::Ttl { ttl } if entry.loaded_at.elapsed() >= ttl => None,
            _ => Some(&entry.property),
        }
    }

    pub fn contains(&self, id: &PropertyId) -> bool {
        self.get(id).is_some()
    }

    /// Store a record under the identifier it was requested by
    pub fn insert(&mut self, id: PropertyId, property: Property) {
        if let EvictionPolicy::Ttl { ttl } = self.policy {
            self.entries.retain(|_, entry| entry.loaded_at.elapsed() < ttl);
        }
        self.entries.insert(
            id,
            Entry {
                property,
                loaded_at: Instant::now(),
            },
        );
    }

    /// Apply the policy after a successful update
    pub fn on_updated(&mut self, id: &PropertyId, property: &Property) {
        if self.policy == EvictionPolicy::OnMutation && self.entries.contains_key(id) {
            self.insert(id.clone(), property.clone());
        }
    }

    /// Apply the policy after a successful delete
    pub fn on_deleted(&mut self, id: &PropertyId) {
        if self.policy == EvictionPolicy::OnMutation {
            self.entries.remove(id);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
