use crate::{create_test_config, listing_html};
use rating_harvester::harvest::{build_http_client, DiscoveryError, IdentifierDiscoverer};
use rating_harvester::{FetchError, Harvester, HarvestError};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/browse/boardgame/page/{}", page)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_discover_preserves_order_across_pages() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, listing_html(&["174430", "13"])).await;
    mount_listing(&mock_server, 2, listing_html(&[])).await;
    mount_listing(&mock_server, 3, listing_html(&["13", "822"])).await;

    let config = create_test_config(&mock_server.uri(), 3);
    let client = build_http_client(&config).expect("Failed to build client");
    let discoverer = IdentifierDiscoverer::new(&config, client).expect("Invalid config");

    let ids = discoverer.discover().await.expect("Discovery failed");
    let ids: Vec<&str> = ids.iter().map(|id| id.as_str()).collect();

    // Duplicates are kept, empty page 2 is not an error
    assert_eq!(ids, vec!["174430", "13", "13", "822"]);
}

#[tokio::test]
async fn test_discover_issues_one_request_per_page() {
    let mock_server = MockServer::start().await;

    for page in 1..=5 {
        mount_listing(&mock_server, page, listing_html(&[&page.to_string()])).await;
    }

    let config = create_test_config(&mock_server.uri(), 5);
    let client = build_http_client(&config).expect("Failed to build client");
    let discoverer = IdentifierDiscoverer::new(&config, client).expect("Invalid config");

    let ids = discoverer.discover().await.expect("Discovery failed");
    assert_eq!(ids.len(), 5);

    let requests = mock_server.received_requests().await.expect("Recording disabled");
    let paths: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    assert_eq!(
        paths,
        (1..=5)
            .map(|p| format!("/browse/boardgame/page/{}", p))
            .collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_discovery_failure_aborts_run() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, listing_html(&["1", "2"])).await;
    mount_listing(&mock_server, 2, listing_html(&["3"])).await;

    Mock::given(method("GET"))
        .and(path("/browse/boardgame/page/3"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Pages after the failure and every rating feed must stay untouched
    Mock::given(method("GET"))
        .and(path_regex(r"^/browse/boardgame/page/[45]$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&["9"])))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/xmlapi2/thing"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<items></items>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 5);
    let harvester = Harvester::new(&config).expect("Failed to create harvester");

    let result = harvester.run().await;
    match result {
        Err(HarvestError::Discovery(DiscoveryError::Fetch { page, source })) => {
            assert_eq!(page, 3);
            assert!(matches!(source, FetchError::Status { status: 500, .. }));
        }
        other => panic!("Expected discovery failure, got {:?}", other.map(|s| s.completed)),
    }
}

#[tokio::test]
async fn test_invalid_pattern_fails_before_any_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), 5);
    config.source.id_pattern = "href=\"/boardgame/(\\d+/".to_string();

    let result = Harvester::new(&config);
    assert!(matches!(result, Err(HarvestError::Config(_))));
}
