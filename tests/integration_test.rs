//! Integration tests for catalogr
//!
//! These tests run the HTTP client and the query driver against a local
//! mock catalog server and check the complete request/response workflows.

use catalogr::api::{ApiError, CatalogApi, HttpCatalogApi};
use catalogr::engine::{CatalogDriver, CatalogError, DriverEvent, EngineSettings, ResponseOutcome};
use catalogr::filters::{FilterState, PriceRange, SortOrder};
use catalogr::location::{MemoryUrlStore, UrlStore};
use catalogr::view::{EMPTY_MESSAGE, Pager, ResultsView};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper function to build a product body
fn product_json(id: &str, name: &str, price: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "price": price,
        "image": format!("https://img.test/{id}.png"),
        "image_list": null,
        "category_id": "c1",
        "tags": ["neon"],
        "created_at": "2024-10-01T10:00:00Z"
    })
}

/// Helper function to build a `GET /products` body
fn page_json(products: Vec<Value>, current: u32, last: u32, total: u64) -> Value {
    json!({
        "products": products,
        "metadata": {
            "current_page": current,
            "page_size": 12,
            "first_page": 1,
            "last_page": last,
            "total_records": total
        }
    })
}

fn settings() -> EngineSettings {
    EngineSettings {
        price_bounds: PriceRange::new(0, 200),
        page_size: 12,
        debounce: Duration::from_millis(100),
    }
}

async fn mount_vocabulary(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/categories"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"categories": ["Nature", "Abstract"]})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tags": ["neon", "leaf"]})))
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> HttpCatalogApi {
    HttpCatalogApi::new(&format!("{}/v1", server.uri()), Duration::from_secs(5)).unwrap()
}

async fn product_queries(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == "/v1/products")
        .map(|request| request.url.query().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_list_products_sends_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/products"))
        .and(query_param("category", "Nature"))
        .and(query_param("tags", "leaf,neon"))
        .and(query_param("price_to", "150"))
        .and(query_param("sort", "-price"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "12"))
        .and(query_param_is_missing("price_from"))
        .and(query_param_is_missing("name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![product_json("p1", "Green Leaf", 139)],
            2,
            3,
            25,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let filters = FilterState::builder(PriceRange::new(0, 200))
        .category("Nature")
        .tags(["neon", "leaf"])
        .price_range(0, 150)
        .sort_order(SortOrder::Descending)
        .build();
    let params = catalogr::query::QueryBuilder::new(PriceRange::new(0, 200))
        .build(&filters, catalogr::query::PageRequest::new(2, 12));

    let response = client(&server).list_products(&params).await.unwrap();
    assert_eq!(response.products.len(), 1);
    assert_eq!(response.products[0].name, "Green Leaf");
    assert_eq!(response.metadata.last_page, 3);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/categories"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string("the server encountered a problem"),
        )
        .mount(&server)
        .await;

    let err = client(&server).categories().await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert!(matches!(CatalogError::from(err), CatalogError::Network(_)));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"tags\": [1, 2"))
        .mount(&server)
        .await;

    let err = client(&server).tags().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
    assert!(matches!(CatalogError::from(err), CatalogError::Decode(_)));
}

#[tokio::test]
async fn test_product_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/products/abc123"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({
                "product": product_json("abc123", "Blue Wave", 1_000_000)
            })),
        )
        .mount(&server)
        .await;

    let product = client(&server).product("abc123").await.unwrap();
    assert_eq!(product.name, "Blue Wave");
    assert_eq!(product.price, 1_000_000);
    assert_eq!(product.tags, vec!["neon"]);
    assert!(product.image_list.is_empty());
}

#[tokio::test]
async fn test_driver_mounts_from_url() {
    let server = MockServer::start().await;
    mount_vocabulary(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![product_json("p1", "Green Leaf", 139), product_json("p2", "Fern", 80)],
            2,
            2,
            14,
        )))
        .mount(&server)
        .await;

    let store = MemoryUrlStore::new("?category=Nature&page=2&sort=-price");
    let mut driver = CatalogDriver::new(Arc::new(client(&server)), store.clone(), settings());
    driver.mount().await.unwrap();
    driver.settle().await;

    let engine = driver.engine();
    assert!(engine.status().is_ready());
    assert_eq!(engine.results().len(), 2);
    assert_eq!(engine.vocabulary().tags, vec!["neon", "leaf"]);
    assert_eq!(
        product_queries(&server).await,
        vec!["category=Nature&page=2&page_size=12&sort=-price"]
    );

    let pager = Pager::from_metadata(engine.metadata()).unwrap();
    assert!(pager.prev_enabled());
    assert!(!pager.next_enabled());
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn test_superseded_response_never_shown() {
    let server = MockServer::start().await;
    mount_vocabulary(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/products"))
        .and(query_param("category", "Nature"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json(vec![product_json("n1", "Green Leaf", 139)], 1, 1, 1))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/products"))
        .and(query_param("category", "Abstract"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_json(
                vec![product_json("a1", "Purple Haze", 159)],
                1,
                1,
                1,
            )),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/products"))
        .and(query_param_is_missing("category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], 0, 0, 0)))
        .mount(&server)
        .await;

    let store = MemoryUrlStore::new("");
    let mut driver = CatalogDriver::new(Arc::new(client(&server)), store.clone(), settings());
    driver.mount().await.unwrap();
    driver.settle().await;

    let draft = driver.engine().draft().clone();
    let first = driver
        .apply_filters(draft.clone().with_category(Some("Nature".into())))
        .unwrap();
    let second = driver
        .apply_filters(draft.with_category(Some("Abstract".into())))
        .unwrap();
    let events = driver.settle().await;

    assert!(events.contains(&DriverEvent::Response {
        token: first,
        outcome: ResponseOutcome::Stale
    }));
    assert!(events.contains(&DriverEvent::Response {
        token: second,
        outcome: ResponseOutcome::Applied
    }));
    assert_eq!(driver.engine().results()[0].name, "Purple Haze");
    assert_eq!(store.read(), "category=Abstract");
    assert_eq!(store.history(), vec!["", "category=Nature", "category=Abstract"]);
}

#[tokio::test]
async fn test_empty_catalog_slice() {
    let server = MockServer::start().await;
    mount_vocabulary(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/products"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"products": [], "metadata": {}})),
        )
        .mount(&server)
        .await;

    let store = MemoryUrlStore::new("category=Nonexistent");
    let mut driver = CatalogDriver::new(Arc::new(client(&server)), store, settings());
    driver.mount().await.unwrap();
    driver.settle().await;

    let engine = driver.engine();
    assert!(engine.status().is_ready());
    assert!(engine.results().is_empty());

    let view = ResultsView::new(engine.results(), engine.status());
    assert!(view.render().contains(EMPTY_MESSAGE));

    let pager = Pager::from_metadata(engine.metadata()).unwrap();
    assert!(!pager.prev_enabled());
    assert!(!pager.next_enabled());
}

#[tokio::test]
async fn test_typing_burst_sends_single_search() {
    let server = MockServer::start().await;
    mount_vocabulary(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], 0, 0, 0)))
        .mount(&server)
        .await;

    let store = MemoryUrlStore::new("");
    let mut driver = CatalogDriver::new(Arc::new(client(&server)), store.clone(), settings());
    driver.mount().await.unwrap();
    driver.settle().await;

    driver.update_search_term("n");
    driver.update_search_term("ne");
    driver.update_search_term("neo");
    driver.settle().await;

    let searches: Vec<_> = product_queries(&server)
        .await
        .into_iter()
        .filter(|query| query.contains("name="))
        .collect();
    assert_eq!(searches, vec!["name=neo&page=1&page_size=12&sort=price"]);
    assert_eq!(store.read(), "name=neo");
}

#[tokio::test]
async fn test_vocabulary_failure_blocks_first_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tags": []})))
        .mount(&server)
        .await;

    let store = MemoryUrlStore::new("");
    let mut driver = CatalogDriver::new(Arc::new(client(&server)), store, settings());

    let err = driver.mount().await.unwrap_err();
    assert!(matches!(err, CatalogError::Decode(_)));
    assert_eq!(driver.engine().status().error(), Some(&err));
    assert!(product_queries(&server).await.is_empty());
}

#[tokio::test]
async fn test_failed_page_then_retry() {
    let server = MockServer::start().await;
    mount_vocabulary(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/products"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![product_json("p1", "Green Leaf", 139)],
            1,
            1,
            1,
        )))
        .mount(&server)
        .await;

    let store = MemoryUrlStore::new("");
    let mut driver = CatalogDriver::new(Arc::new(client(&server)), store, settings());
    driver.mount().await.unwrap();
    driver.settle().await;
    assert!(matches!(driver.engine().status().error(), Some(CatalogError::Network(_))));
    assert!(driver.engine().results().is_empty());

    driver.change_page(1).unwrap();
    driver.settle().await;
    assert!(driver.engine().status().is_ready());
    assert_eq!(driver.engine().results().len(), 1);
}
