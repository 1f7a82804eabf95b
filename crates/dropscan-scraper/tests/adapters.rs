//! Adapter integration tests against a local `wiremock` server.
//!
//! No real network traffic is made; each test stands up its own server.

use std::sync::Arc;
use std::time::Duration;

use dropscan_core::RetailerSearchUrl;
use serde_json::json;
use wiremock::matchers::{header, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dropscan_scraper::{
    AdapterFailure, HttpFetcher, RenderProxy, RequestProfile, ShopifyAdapter, SourceAdapter,
    StorefrontAdapter, TrendingSource, TrendsFeed,
};

fn fetcher() -> Arc<HttpFetcher> {
    Arc::new(HttpFetcher::new(5, "dropscan-test/0.1", 0, 0).expect("failed to build test fetcher"))
}

fn product_page(products: &[(&str, &str)]) -> String {
    let items: Vec<serde_json::Value> = products
        .iter()
        .enumerate()
        .map(|(i, (name, price))| {
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "item": {"@type": "Product", "name": name, "offers": {"price": price}}
            })
        })
        .collect();
    let ld = json!({"@context": "https://schema.org", "@type": "ItemList", "itemListElement": items});
    format!(r#"<html><head><script type="application/ld+json">{ld}</script></head><body>results</body></html>"#)
}

fn storefront(server: &MockServer, render: RenderProxy) -> StorefrontAdapter {
    let retailer = RetailerSearchUrl {
        name: "acme".to_string(),
        url_template: format!("{}/search?q={{query}}", server.uri()),
    };
    StorefrontAdapter::new(&retailer, fetcher(), render)
}

fn no_render() -> RenderProxy {
    RenderProxy::new(None, None, Duration::from_secs(5)).expect("render proxy")
}

// ---------------------------------------------------------------------------
// Shopify predictive search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shopify_search_maps_products_and_drops_unpriced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/suggest.json"))
        .and(query_param("q", "desk lamp"))
        .and(query_param("resources[type]", "product"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": {"results": {"products": [
                {"title": "LED Desk Lamp", "price": "24.99", "image": "//cdn.shopify.com/lamp.jpg", "url": "/products/led-desk-lamp"},
                {"title": "Clip Lamp", "price": 12.5, "image": null, "url": "/products/clip-lamp"},
                {"title": "Gift Card", "price": "0.00", "url": "/products/gift-card"}
            ]}}
        })))
        .mount(&server)
        .await;

    let adapter = ShopifyAdapter::new(&server.uri(), fetcher());
    let listings = adapter
        .search("desk lamp", "home-kitchen", 10)
        .await
        .expect("search should succeed");

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].name, "LED Desk Lamp");
    assert!((listings[0].price - 24.99).abs() < f64::EPSILON);
    assert_eq!(
        listings[0].image_url.as_deref(),
        Some("https://cdn.shopify.com/lamp.jpg")
    );
    assert_eq!(listings[1].price, 12.5);
    assert!(listings.iter().all(|l| l.category == "home-kitchen"));
    assert!(listings.iter().all(|l| l.source.starts_with("shopify:")));
}

#[tokio::test]
async fn shopify_search_retries_with_browser_profile_when_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/suggest.json"))
        .and(header_regex("user-agent", "Mozilla"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": {"results": {"products": [
                {"title": "Yoga Mat", "price": "19.00"}
            ]}}
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/suggest.json"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = ShopifyAdapter::new(&server.uri(), fetcher());
    let listings = adapter.search("yoga mat", "fitness", 5).await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].name, "Yoga Mat");
}

#[tokio::test]
async fn shopify_server_error_is_a_status_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/suggest.json"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let adapter = ShopifyAdapter::new(&server.uri(), fetcher());
    let err = adapter.search("anything", "pets", 5).await.unwrap_err();
    assert_eq!(err, AdapterFailure::Status(502));
}

#[tokio::test]
async fn shopify_garbage_body_is_unparsable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/suggest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let adapter = ShopifyAdapter::new(&server.uri(), fetcher());
    let err = adapter.search("anything", "pets", 5).await.unwrap_err();
    assert!(matches!(err, AdapterFailure::Unparsable(_)));
}

// ---------------------------------------------------------------------------
// Storefront search pages
// ---------------------------------------------------------------------------

#[tokio::test]
async fn storefront_direct_fetch_reads_jsonld_and_respects_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "wireless earbuds"))
        .respond_with(ResponseTemplate::new(200).set_body_string(product_page(&[
            ("Earbuds Pro", "39.99"),
            ("Earbuds Lite", "$19.99"),
            ("Earbuds Max", "59.00"),
        ])))
        .mount(&server)
        .await;

    let adapter = storefront(&server, no_render());
    let listings = adapter
        .search("wireless earbuds", "electronics", 2)
        .await
        .unwrap();

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].name, "Earbuds Pro");
    assert_eq!(listings[1].price, 19.99);
    assert_eq!(listings[0].source, "acme");
}

#[tokio::test]
async fn storefront_uses_render_proxy_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .and(query_param("token", "secret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page(&[("Rendered Lamp", "30.00")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let render = RenderProxy::new(
        Some(server.uri()),
        Some("secret".to_string()),
        Duration::from_secs(5),
    )
    .unwrap();
    let adapter = storefront(&server, render);
    let listings = adapter.search("lamp", "home-kitchen", 5).await.unwrap();

    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].name, "Rendered Lamp");
}

#[tokio::test]
async fn storefront_falls_back_to_direct_fetch_when_render_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/content"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(product_page(&[("Direct Lamp", "22.00")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let render = RenderProxy::new(
        Some(server.uri()),
        Some("secret".to_string()),
        Duration::from_secs(5),
    )
    .unwrap();
    let adapter = storefront(&server, render);
    let listings = adapter.search("lamp", "home-kitchen", 5).await.unwrap();

    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].name, "Direct Lamp");
}

#[tokio::test]
async fn storefront_rate_limit_is_blocked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .mount(&server)
        .await;

    let adapter = storefront(&server, no_render());
    let err = adapter.search("lamp", "home-kitchen", 5).await.unwrap_err();
    assert!(matches!(err, AdapterFailure::Blocked(_)));
}

// ---------------------------------------------------------------------------
// Trending feed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn trends_feed_returns_limited_titles() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trending/rss"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<rss><channel><title>Trends</title>\
             <item><title>smart ring</title></item>\
             <item><title>cold plunge</title></item>\
             <item><title>sunset lamp</title></item>\
             </channel></rss>",
        ))
        .mount(&server)
        .await;

    let feed = TrendsFeed::new(format!("{}/trending/rss", server.uri()), fetcher());
    let keywords = feed.trending_keywords(2).await;
    assert_eq!(keywords, vec!["smart ring".to_string(), "cold plunge".to_string()]);
}

#[tokio::test]
async fn trends_feed_failure_yields_no_keywords() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trending/rss"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let feed = TrendsFeed::new(format!("{}/trending/rss", server.uri()), fetcher());
    assert!(feed.trending_keywords(5).await.is_empty());
}

// ---------------------------------------------------------------------------
// HTTP fetcher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetcher_default_profile_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products.json"))
        .and(header("user-agent", "dropscan-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fetcher()
        .get_text(
            &format!("{}/products.json", server.uri()),
            RequestProfile::Default,
        )
        .await
        .expect("default profile fetch");
    assert_eq!(body, "plain");
}

#[tokio::test]
async fn fetcher_browser_profile_sends_browser_agent_and_store_referer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header_regex("user-agent", "^Mozilla/5.0"))
        .and(header("referer", server.uri().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string("browser"))
        .expect(1)
        .mount(&server)
        .await;

    let body = fetcher()
        .get_text(&format!("{}/search?q=lamp", server.uri()), RequestProfile::Browser)
        .await
        .expect("browser profile fetch");
    assert_eq!(body, "browser");
}
