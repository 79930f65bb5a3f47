mod common;

use broker_portal::{BrokerId, PropertyListCoordinator, PropertyStatus, SearchPage};
use common::{failure, page, property, FakeApi};

fn broker() -> BrokerId {
    BrokerId::new("broker-1")
}

/// ceil(log2(pages)) + 1
fn request_budget(pages: u32) -> usize {
    (f64::from(pages).log2().ceil() as usize) + 1
}

#[tokio::test]
async fn non_empty_first_page_needs_one_request() {
    let api = FakeApi::paginated(10, 120, |_| true);
    let coordinator = PropertyListCoordinator::new(api.clone());

    coordinator.fetch_with_smart_pagination(Some(&broker())).await;

    assert_eq!(api.searched_pages(), [1]);
    assert_eq!(coordinator.current_page(), 1);
    assert_eq!(coordinator.properties().len(), 12);
}

#[tokio::test]
async fn settles_on_page_seven_when_results_start_there() {
    let api = FakeApi::paginated(10, 48, |page| page >= 7);
    let coordinator = PropertyListCoordinator::new(api.clone());

    coordinator.fetch_with_smart_pagination(Some(&broker())).await;

    assert_eq!(coordinator.current_page(), 7);
    assert!(coordinator.properties().iter().all(|p| p.id.as_str().starts_with("p7-")));
    assert!(api.searches().len() <= request_budget(10));
    assert!(!coordinator.is_loading());
    assert!(coordinator.error().is_none());
}

#[tokio::test]
async fn converges_on_the_first_non_empty_page() {
    let api = FakeApi::paginated(10, 84, |page| page >= 4);
    let coordinator = PropertyListCoordinator::new(api.clone());

    coordinator.fetch_with_smart_pagination(Some(&broker())).await;

    assert_eq!(coordinator.current_page(), 4);
    // page 6 is shown first, then replaced by the better answer
    assert_eq!(api.searched_pages(), [1, 6, 3, 4]);
}

#[tokio::test]
async fn isolated_page_is_not_guaranteed_to_be_found() {
    // Known approximation: only page 7 holds results, and the search walks
    // past it. The broker is left on the empty first page.
    let api = FakeApi::paginated(10, 12, |page| page == 7);
    let coordinator = PropertyListCoordinator::new(api.clone());

    coordinator.fetch_with_smart_pagination(Some(&broker())).await;

    assert_eq!(api.searched_pages(), [1, 6, 8, 9, 10]);
    assert_eq!(coordinator.current_page(), 1);
    assert!(coordinator.properties().is_empty());
    assert!(api.searches().len() <= request_budget(10));
}

#[tokio::test]
async fn huge_page_count_ends_without_overflow() {
    let api = FakeApi::paginated(u32::MAX, 1, |_| false);
    let coordinator = PropertyListCoordinator::new(api.clone());

    coordinator.fetch_with_smart_pagination(Some(&broker())).await;

    assert_eq!(api.searched_pages().last(), Some(&u32::MAX));
    assert!(api.searches().len() <= request_budget(u32::MAX));
    assert_eq!(coordinator.current_page(), 1);
    assert!(coordinator.properties().is_empty());
    assert!(!coordinator.is_loading());
}

#[tokio::test]
async fn zero_matches_issue_no_probes() {
    let api = FakeApi::paginated(0, 0, |_| false);
    let coordinator = PropertyListCoordinator::new(api.clone());

    coordinator.fetch_with_smart_pagination(Some(&broker())).await;

    assert_eq!(api.searched_pages(), [1]);
    let pagination = coordinator.pagination().unwrap();
    assert_eq!(pagination.total_pages, 1);
    assert_eq!(pagination.total_count, 0);
    assert!(coordinator.properties().is_empty());
}

#[tokio::test]
async fn legacy_response_is_shown_as_is() {
    let api = FakeApi::new(|_| Ok(SearchPage::Legacy(vec![property("a", 5), property("b", 6)])));
    let coordinator = PropertyListCoordinator::new(api.clone());

    coordinator.fetch_with_smart_pagination(Some(&broker())).await;

    assert_eq!(api.searched_pages(), [1]);
    assert!(coordinator.pagination().is_none());
    assert_eq!(coordinator.properties().len(), 2);
}

#[tokio::test]
async fn default_filters_match_an_unfiltered_fetch() {
    let api = FakeApi::paginated(3, 30, |_| true);
    let coordinator = PropertyListCoordinator::new(api.clone());

    coordinator.fetch_page(Some(&broker()), 1).await;
    let unfiltered = coordinator.properties();

    coordinator.fetch_with_smart_pagination(Some(&broker())).await;

    assert_eq!(coordinator.properties(), unfiltered);
    let request = api.searches().pop().unwrap();
    assert!(request.search_query.is_empty());
    assert!(request.statuses.is_empty());
    assert!(request.property_types.is_empty());
    assert_eq!(request.min_price, None);
    assert_eq!(request.max_price, None);
}

#[tokio::test]
async fn probes_carry_the_current_filters() {
    let api = FakeApi::paginated(4, 20, |page| page >= 3);
    let coordinator = PropertyListCoordinator::new(api.clone());
    coordinator.set_search_query("villa");
    coordinator.toggle_status(PropertyStatus::Booked);
    coordinator.set_price_range(Some(100), None);

    coordinator.fetch_with_smart_pagination(Some(&broker())).await;

    for request in api.searches() {
        assert_eq!(request.search_query, "villa");
        assert_eq!(request.statuses, [PropertyStatus::Booked]);
        assert_eq!(request.min_price, Some(100));
        assert_eq!(request.limit, 12);
    }
}

#[tokio::test]
async fn failed_probe_keeps_best_known_page() {
    let api = FakeApi::new(|request| match request.page {
        1 | 2 | 3 => Ok(page(request.page, 10, 84, 0)),
        6 => Ok(page(6, 10, 84, 12)),
        _ => Err(failure("Backend down")),
    });
    let coordinator = PropertyListCoordinator::new(api.clone());

    coordinator.fetch_with_smart_pagination(Some(&broker())).await;

    // 6 has results, 3 is empty, 4 fails
    assert_eq!(api.searched_pages(), [1, 6, 3, 4]);
    assert_eq!(coordinator.current_page(), 6);
    assert_eq!(coordinator.error().as_deref(), Some("Backend down"));
    assert!(!coordinator.is_loading());
}

#[tokio::test]
async fn missing_broker_issues_no_request() {
    let api = FakeApi::paginated(1, 1, |_| true);
    let coordinator = PropertyListCoordinator::new(api.clone());

    coordinator.fetch_with_smart_pagination(None).await;

    assert!(api.searches().is_empty());
    assert!(coordinator.error().is_some());
}

#[tokio::test]
async fn newer_fetch_stops_an_inflight_search() {
    let api = FakeApi::paginated(10, 84, |page| page >= 2);
    api.gate_page(6);
    let coordinator = PropertyListCoordinator::new(api.clone());
    let broker = broker();

    let search = coordinator.fetch_with_smart_pagination(Some(&broker));
    let jump = async {
        api.gate_entered.notified().await;
        coordinator.fetch_page(Some(&broker), 2).await;
        api.gate_release.notify_one();
    };
    tokio::join!(search, jump);

    // the probe of page 6 came back stale, so the search stopped there
    assert_eq!(api.searched_pages(), [1, 6, 2]);
    assert_eq!(coordinator.current_page(), 2);
    assert!(!coordinator.is_loading());
}
