//! The property list coordinator.
//!
//! Owns what the broker currently sees: the loaded page, its pagination,
//! the filter selection, favorites and the detail cache. List fetches are
//! stamped with a request token; only the response to the most recently
//! issued fetch is ever applied, older responses are dropped on arrival.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::traits::PropertyApi;
use crate::api::types::{SearchPage, SearchRequest};
use crate::error::{ApiError, ApiResult};
use crate::models::{BrokerId, NewProperty, Property, PropertyId, PropertyStatus};
use crate::store::cache::{DetailCache, EvictionPolicy};
use crate::store::filters::{FilterState, SortBy};
use crate::store::pagination::{PaginationState, PAGE_SIZE};
use crate::store::persist::{PersistedState, StateStore};

const MISSING_BROKER: &str = "Broker identity is required to load properties";
const LIST_FAILURE: &str = "Failed to load properties";
const DETAIL_FAILURE: &str = "Failed to load property details";

/// Observable state of the property list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListState {
    pub properties: Vec<Property>,
    pub loading: bool,
    pub error: Option<String>,
    /// `None` while nothing is loaded or after a legacy (unpaginated) response
    pub pagination: Option<PaginationState>,
    pub filters: FilterState,
    pub current_page: u32,
    pub favorites: BTreeSet<PropertyId>,
    pub is_loading_detail: bool,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            loading: false,
            error: None,
            pagination: None,
            filters: FilterState::default(),
            current_page: 1,
            favorites: BTreeSet::new(),
            is_loading_detail: false,
        }
    }
}

struct Inner {
    list: ListState,
    cache: DetailCache,
    latest_request: u64,
    /// Latest detail request per property; entries are removed when answered
    pending_details: HashMap<PropertyId, u64>,
    detail_requests: u64,
}

/// Single source of truth for the visible property list
pub struct PropertyListCoordinator {
    api: Arc<dyn PropertyApi>,
    inner: Mutex<Inner>,
}

impl PropertyListCoordinator {
    pub fn new(api: Arc<dyn PropertyApi>) -> Self {
        Self::with_cache_policy(api, EvictionPolicy::default())
    }

    pub fn with_cache_policy(api: Arc<dyn PropertyApi>, policy: EvictionPolicy) -> Self {
        Self {
            api,
            inner: Mutex::new(Inner {
                list: ListState::default(),
                cache: DetailCache::new(policy),
                latest_request: 0,
                pending_details: HashMap::new(),
                detail_requests: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ListState {
        self.lock().list.clone()
    }

    pub fn properties(&self) -> Vec<Property> {
        self.lock().list.properties.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().list.loading
    }

    pub fn error(&self) -> Option<String> {
        self.lock().list.error.clone()
    }

    pub fn pagination(&self) -> Option<PaginationState> {
        self.lock().list.pagination
    }

    pub fn filters(&self) -> FilterState {
        self.lock().list.filters.clone()
    }

    pub fn current_page(&self) -> u32 {
        self.lock().list.current_page
    }

    pub fn favorites(&self) -> BTreeSet<PropertyId> {
        self.lock().list.favorites.clone()
    }

    pub fn is_favorite(&self, id: &PropertyId) -> bool {
        self.lock().list.favorites.contains(id)
    }

    pub fn is_loading_detail(&self) -> bool {
        self.lock().list.is_loading_detail
    }

    pub fn cached_detail(&self, id: &PropertyId) -> Option<Property> {
        self.lock().cache.get(id).cloned()
    }

    // --- list fetching ---

    /// Load one page under the current filters
    ///
    /// Never fails: errors land in [`ListState::error`] and the previously
    /// loaded list stays visible.
    pub async fn fetch_page(&self, broker_id: Option<&BrokerId>, page: u32) {
        let Some(broker_id) = broker_id else {
            self.reject_missing_broker();
            return;
        };

        let (token, filters) = self.begin_request();
        info!("Fetching page {} for broker {}", page, broker_id);

        match self.search(broker_id, &filters, page).await {
            Ok(result) => {
                self.display(token, result);
            }
            Err(err) => self.record_failure(token, &err),
        }

        self.finish(token);
    }

    /// Load the first non-empty page under the current filters
    ///
    /// Page 1 is requested first. When it is empty although the filtered set
    /// is not, the remaining pages are binary searched for the first one
    /// with results. Every non-empty probe is displayed as soon as it
    /// arrives, so the visible page only ever moves towards the answer.
    ///
    /// The search assumes matches are contiguous from the first non-empty
    /// page onward. Result sets scattered across isolated pages can make it
    /// settle on an empty page 1 even though later pages hold matches.
    pub async fn fetch_with_smart_pagination(&self, broker_id: Option<&BrokerId>) {
        let Some(broker_id) = broker_id else {
            self.reject_missing_broker();
            return;
        };

        let (token, filters) = self.begin_request();
        info!("Fetching first non-empty page for broker {}", broker_id);

        if let Err(err) = self.locate_first_page(token, broker_id, &filters).await {
            self.record_failure(token, &err);
        }

        self.finish(token);
    }

    async fn locate_first_page(
        &self,
        token: u64,
        broker_id: &BrokerId,
        filters: &FilterState,
    ) -> ApiResult<()> {
        let first = self.search(broker_id, filters, 1).await?;

        let needs_search = match first.pagination() {
            Some(meta) if first.is_empty() && meta.total_count > 0 => Some(meta.total_pages),
            _ => None,
        };

        let Some(total_pages) = needs_search else {
            self.display(token, first);
            return Ok(());
        };

        if !self.display(token, first) {
            return Ok(());
        }

        // page 1 is known to be empty
        let (mut low, mut high) = (2, total_pages);
        let mut found = None;

        while low <= high {
            let mid = low + (high - low) / 2;
            let probe = self.search(broker_id, filters, mid).await?;

            if !self.is_latest(token) {
                debug!("Smart pagination superseded at page {}", mid);
                return Ok(());
            }

            if probe.is_empty() {
                debug!("Page {} is empty, searching higher", mid);
                if mid == high {
                    break;
                }
                low = mid + 1;
            } else {
                debug!("Page {} has results, searching lower", mid);
                found = Some(mid);
                self.display(token, probe);
                high = mid - 1;
            }
        }

        match found {
            Some(page) => info!("Smart pagination settled on page {}", page),
            None => warn!(
                "No non-empty page found in 2..={} although results exist",
                total_pages
            ),
        }

        Ok(())
    }

    /// Jump straight to a page; no search for a non-empty one
    pub async fn set_current_page(&self, page: u32, broker_id: Option<&BrokerId>) {
        let page = {
            let mut inner = self.lock();
            let page = match inner.list.pagination {
                Some(pagination) => pagination.clamp_page(page),
                None => page.max(1),
            };
            inner.list.current_page = page;
            page
        };

        if broker_id.is_some() {
            self.fetch_page(broker_id, page).await;
        }
    }

    async fn search(
        &self,
        broker_id: &BrokerId,
        filters: &FilterState,
        page: u32,
    ) -> ApiResult<SearchPage> {
        let request = SearchRequest::new(broker_id, filters, page, PAGE_SIZE);
        self.api.search(&request).await
    }

    fn begin_request(&self) -> (u64, FilterState) {
        let mut inner = self.lock();
        inner.latest_request += 1;
        inner.list.loading = true;
        inner.list.error = None;
        (inner.latest_request, inner.list.filters.clone())
    }

    fn is_latest(&self, token: u64) -> bool {
        self.lock().latest_request == token
    }

    /// Replace the visible list; returns false when the response is stale
    fn display(&self, token: u64, result: SearchPage) -> bool {
        let mut inner = self.lock();
        if inner.latest_request != token {
            debug!("Discarding stale response for request {}", token);
            return false;
        }

        match result {
            SearchPage::Legacy(properties) => {
                debug!("Legacy response with {} properties", properties.len());
                inner.list.properties = properties;
                inner.list.pagination = None;
                inner.list.current_page = 1;
            }
            SearchPage::Paginated {
                properties,
                pagination,
            } => {
                let pagination = PaginationState::from_meta(&pagination);
                debug!(
                    "Page {}/{} with {} properties",
                    pagination.current_page,
                    pagination.total_pages,
                    properties.len()
                );
                inner.list.properties = properties;
                inner.list.current_page = pagination.current_page;
                inner.list.pagination = Some(pagination);
            }
        }

        true
    }

    fn record_failure(&self, token: u64, err: &ApiError) {
        let mut inner = self.lock();
        if inner.latest_request != token {
            debug!("Discarding stale failure for request {}", token);
            return;
        }
        warn!("Failed to load properties: {}", err);
        inner.list.error = Some(err.user_message(LIST_FAILURE));
    }

    fn finish(&self, token: u64) {
        let mut inner = self.lock();
        if inner.latest_request == token {
            inner.list.loading = false;
        }
    }

    fn reject_missing_broker(&self) {
        warn!("Refusing to fetch properties without a broker identity");
        self.lock().list.error = Some(MISSING_BROKER.to_string());
    }

    // --- filters ---

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.lock().list.filters.set_search_query(query);
    }

    pub fn toggle_status(&self, status: PropertyStatus) {
        self.lock().list.filters.toggle_status(status);
    }

    pub fn toggle_property_type(&self, property_type: impl Into<String>) {
        self.lock().list.filters.toggle_property_type(property_type);
    }

    pub fn set_price_range(&self, min: Option<i64>, max: Option<i64>) {
        self.lock().list.filters.set_price_range(min, max);
    }

    pub fn set_sort_by(&self, sort_by: SortBy) {
        self.lock().list.filters.sort_by = sort_by;
    }

    pub fn clear_filters(&self) {
        self.lock().list.filters.clear();
    }

    // --- details, favorites and mutations ---

    /// Load a property into the detail cache unless it is already there
    ///
    /// Only the most recent request for an identifier may update the cache
    /// or the shared error; earlier answers for it are dropped.
    pub async fn fetch_property_by_id(&self, id: &PropertyId, force: bool) {
        if id.as_str().is_empty() {
            return;
        }

        let (token, broker_id) = {
            let mut inner = self.lock();
            if !force && inner.cache.contains(id) {
                debug!("Detail cache hit for {}", id);
                return;
            }
            inner.detail_requests += 1;
            let token = inner.detail_requests;
            inner.pending_details.insert(id.clone(), token);
            inner.list.is_loading_detail = true;
            let broker_id = inner
                .list
                .properties
                .iter()
                .find(|p| &p.id == id)
                .map(|p| p.broker_id.clone());
            (token, broker_id)
        };

        let result = self.api.get(broker_id.as_ref(), id).await;

        let mut inner = self.lock();
        if inner.pending_details.get(id) != Some(&token) {
            debug!("Discarding stale detail response for {}", id);
            return;
        }
        inner.pending_details.remove(id);

        match result {
            Ok(property) => inner.cache.insert(id.clone(), property),
            Err(err) => {
                warn!("Failed to load property {}: {}", id, err);
                inner.list.error = Some(err.user_message(DETAIL_FAILURE));
            }
        }
        inner.list.is_loading_detail = !inner.pending_details.is_empty();
    }

    pub fn toggle_favorite(&self, id: &PropertyId) {
        let mut inner = self.lock();
        let favorites = &mut inner.list.favorites;
        if !favorites.remove(id) {
            favorites.insert(id.clone());
        }
    }

    /// Delete a property; the list is patched only after the server confirms
    ///
    /// Failures are returned to the caller and leave the shared error alone.
    pub async fn remove_property(
        &self,
        id: &PropertyId,
        broker_id: Option<&BrokerId>,
    ) -> ApiResult<()> {
        let broker_id = broker_id.ok_or(ApiError::MissingBroker)?;

        self.api.delete(broker_id, id).await.map_err(|err| {
            warn!("Failed to delete property {}: {}", id, err);
            err
        })?;

        let mut inner = self.lock();
        inner.list.properties.retain(|p| &p.id != id);
        inner.cache.on_deleted(id);
        info!("Deleted property {}", id);

        Ok(())
    }

    /// Validate and submit a new listing. Refetch to see it in the list
    pub async fn create_property(&self, property: &NewProperty) -> ApiResult<Property> {
        property.validate()?;
        let created = self.api.create(property).await?;
        info!("Created property {}", created.id);
        Ok(created)
    }

    /// Submit changes to a listing and patch the visible copy in place
    pub async fn update_property(
        &self,
        broker_id: &BrokerId,
        id: &PropertyId,
        property: &NewProperty,
    ) -> ApiResult<Property> {
        property.validate()?;
        let updated = self.api.update(broker_id, id, property).await?;

        let mut inner = self.lock();
        if let Some(slot) = inner.list.properties.iter_mut().find(|p| &p.id == id) {
            *slot = updated.clone();
        }
        inner.cache.on_updated(id, &updated);
        info!("Updated property {}", id);

        Ok(updated)
    }

    // --- persistence ---

    /// Persist favorites and filters
    pub async fn save_to(&self, store: &dyn StateStore) -> anyhow::Result<()> {
        let state = {
            let inner = self.lock();
            PersistedState::new(&inner.list.favorites, &inner.list.filters)
        };
        state.write(store).await
    }

    /// Rehydrate favorites and filters; returns false when nothing was stored
    pub async fn restore_from(&self, store: &dyn StateStore) -> anyhow::Result<bool> {
        let Some(state) = PersistedState::read(store).await? else {
            return Ok(false);
        };

        let mut inner = self.lock();
        inner.list.favorites = state.favorite_set();
        inner.list.filters = state.filters;
        debug!("Restored {} favorites", inner.list.favorites.len());

        Ok(true)
    }
}
