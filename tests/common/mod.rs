#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use broker_portal::api::types::{PaginationMeta, SearchRequest};
use broker_portal::models::NewProperty;
use broker_portal::{ApiError, ApiResult, BrokerId, Property, PropertyApi, PropertyId, SearchPage};
use serde_json::json;
use tokio::sync::Notify;

type Responder = Box<dyn Fn(&SearchRequest) -> ApiResult<SearchPage> + Send + Sync>;

pub fn property(id: &str, price: i64) -> Property {
    serde_json::from_value(json!({
        "_id": id,
        "brokerId": "broker-1",
        "propertyType": "apartment",
        "price": price,
        "status": "available",
        "location": { "address": format!("{id} MG Road"), "city": "Pune" },
        "createdAt": "2024-01-01T00:00:00Z"
    }))
    .unwrap()
}

/// A page of `count` listings named after the page they were served from
pub fn page(page: u32, total_pages: u32, total_count: u64, count: usize) -> SearchPage {
    SearchPage::Paginated {
        properties: (0..count)
            .map(|i| property(&format!("p{page}-{i}"), 1_000 * page as i64))
            .collect(),
        pagination: PaginationMeta {
            current_page: page,
            total_pages,
            total_count,
            limit: 12,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        },
    }
}

pub fn failure(message: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        message: message.to_string(),
    }
}

/// Scripted stand-in for the portal backend that records every call
pub struct FakeApi {
    responder: Mutex<Responder>,
    searches: Mutex<Vec<SearchRequest>>,
    detail_calls: Mutex<Vec<PropertyId>>,
    delete_calls: Mutex<Vec<PropertyId>>,
    fail_deletes: AtomicBool,
    fail_details: AtomicBool,
    gated_pages: Mutex<HashSet<u32>>,
    gated_detail_calls: Mutex<HashSet<usize>>,
    detail_id: Mutex<Option<String>>,
    pub gate_entered: Arc<Notify>,
    pub gate_release: Arc<Notify>,
}

impl FakeApi {
    pub fn new(responder: impl Fn(&SearchRequest) -> ApiResult<SearchPage> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            responder: Mutex::new(Box::new(responder)),
            searches: Mutex::new(Vec::new()),
            detail_calls: Mutex::new(Vec::new()),
            delete_calls: Mutex::new(Vec::new()),
            fail_deletes: AtomicBool::new(false),
            fail_details: AtomicBool::new(false),
            gated_pages: Mutex::new(HashSet::new()),
            gated_detail_calls: Mutex::new(HashSet::new()),
            detail_id: Mutex::new(None),
            gate_entered: Arc::new(Notify::new()),
            gate_release: Arc::new(Notify::new()),
        })
    }

    /// Pages of 12 where `has_results(page)` decides which pages carry listings
    pub fn paginated(
        total_pages: u32,
        total_count: u64,
        has_results: impl Fn(u32) -> bool + Send + Sync + 'static,
    ) -> Arc<Self> {
        Self::new(move |request| {
            let count = if has_results(request.page) { 12 } else { 0 };
            Ok(page(request.page, total_pages, total_count, count))
        })
    }

    pub fn respond_with(
        &self,
        responder: impl Fn(&SearchRequest) -> ApiResult<SearchPage> + Send + Sync + 'static,
    ) {
        *self.responder.lock().unwrap() = Box::new(responder);
    }

    /// Hold searches for `page` until `gate_release` is notified
    pub fn gate_page(&self, page: u32) {
        self.gated_pages.lock().unwrap().insert(page);
    }

    /// Hold the `call`-th detail request (1-based) until `gate_release` is notified
    pub fn gate_detail_call(&self, call: usize) {
        self.gated_detail_calls.lock().unwrap().insert(call);
    }

    /// Answer every detail request with a record carrying this `_id`
    pub fn answer_details_as(&self, id: &str) {
        *self.detail_id.lock().unwrap() = Some(id.to_string());
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn fail_details(&self) {
        self.fail_details.store(true, Ordering::SeqCst);
    }

    pub fn searches(&self) -> Vec<SearchRequest> {
        self.searches.lock().unwrap().clone()
    }

    pub fn searched_pages(&self) -> Vec<u32> {
        self.searches().iter().map(|r| r.page).collect()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.lock().unwrap().len()
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PropertyApi for FakeApi {
    async fn search(&self, request: &SearchRequest) -> ApiResult<SearchPage> {
        self.searches.lock().unwrap().push(request.clone());

        let gated = self.gated_pages.lock().unwrap().contains(&request.page);
        if gated {
            self.gate_entered.notify_one();
            self.gate_release.notified().await;
        }

        let responder = self.responder.lock().unwrap();
        (*responder)(request)
    }

    /// Detail records are priced by call number, so later answers are distinguishable
    async fn get(&self, _broker_id: Option<&BrokerId>, id: &PropertyId) -> ApiResult<Property> {
        let call = {
            let mut calls = self.detail_calls.lock().unwrap();
            calls.push(id.clone());
            calls.len()
        };

        let gated = self.gated_detail_calls.lock().unwrap().contains(&call);
        if gated {
            self.gate_entered.notify_one();
            self.gate_release.notified().await;
        }

        if self.fail_details.load(Ordering::SeqCst) {
            return Err(failure("Property not found"));
        }
        let answered_id = self
            .detail_id
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| id.as_str().to_string());
        Ok(property(&answered_id, call as i64))
    }

    async fn create(&self, property_data: &NewProperty) -> ApiResult<Property> {
        Ok(property("created", property_data.price))
    }

    async fn update(
        &self,
        _broker_id: &BrokerId,
        id: &PropertyId,
        property_data: &NewProperty,
    ) -> ApiResult<Property> {
        Ok(property(id.as_str(), property_data.price))
    }

    async fn delete(&self, _broker_id: &BrokerId, id: &PropertyId) -> ApiResult<()> {
        self.delete_calls.lock().unwrap().push(id.clone());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(failure("Delete rejected"));
        }
        Ok(())
    }
}
