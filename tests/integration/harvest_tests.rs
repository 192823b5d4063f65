use crate::{create_test_config, listing_html, rating_xml};
use rating_harvester::config::FailurePolicyName;
use rating_harvester::harvest::{build_http_client, HttpRatingSource, IdentifierOutcome, Paginator, SkipReason};
use rating_harvester::{Harvester, Identifier, PageFailurePolicy};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_rating(server: &MockServer, id: &str, page: u32, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path("/xmlapi2/thing"))
        .and(query_param("id", id))
        .and(query_param("page", page.to_string()))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/xml")
}

/// Pages requested for an identifier, in request order
async fn requested_pages(server: &MockServer, id: &str) -> Vec<u32> {
    server
        .received_requests()
        .await
        .expect("Recording disabled")
        .iter()
        .filter(|r| r.url.path() == "/xmlapi2/thing")
        .filter(|r| r.url.query_pairs().any(|(k, v)| k == "id" && v == id))
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "page")
                .and_then(|(_, v)| v.parse().ok())
        })
        .collect()
}

fn http_paginator(base_url: &str, policy: PageFailurePolicy) -> Paginator<HttpRatingSource> {
    let config = create_test_config(base_url, 1);
    let client = build_http_client(&config).expect("Failed to build client");
    let source = HttpRatingSource::new(&config, client).expect("Invalid config");
    Paginator::new(source, policy, config.source.page_size)
}

#[tokio::test]
async fn test_full_harvest_run() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/browse/boardgame/page/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&["13", "42", "7"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    // 13: 250 ratings over three pages
    mount_rating(&mock_server, "13", 1, xml(rating_xml("Catan", "250", 1, 100)), 1).await;
    mount_rating(&mock_server, "13", 2, xml(rating_xml("Catan", "250", 2, 100)), 1).await;
    mount_rating(&mock_server, "13", 3, xml(rating_xml("Catan", "250", 3, 50)), 1).await;
    mount_rating(&mock_server, "13", 4, xml(rating_xml("Catan", "250", 4, 0)), 0).await;

    // 42: no data
    mount_rating(&mock_server, "42", 1, xml("<items></items>".to_string()), 1).await;
    mount_rating(&mock_server, "42", 2, xml("<items></items>".to_string()), 0).await;

    // 7: broken feed
    mount_rating(&mock_server, "7", 1, xml("<items><item>".to_string()), 1).await;

    let config = create_test_config(&mock_server.uri(), 1);
    let harvester = Harvester::new(&config).expect("Failed to create harvester");
    let stats = harvester.run().await.expect("Harvest failed");

    assert_eq!(stats.identifiers_discovered, 3);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.ratings_seen, 250);
    assert!(stats.finished_at.is_some());

    assert_eq!(requested_pages(&mock_server, "13").await, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_exact_multiple_fetches_single_page() {
    let mock_server = MockServer::start().await;

    mount_rating(&mock_server, "13", 1, xml(rating_xml("Catan", "100", 1, 100)), 1).await;
    mount_rating(&mock_server, "13", 2, xml(rating_xml("Catan", "100", 2, 0)), 0).await;

    let paginator = http_paginator(&mock_server.uri(), PageFailurePolicy::default());
    let report = paginator.fetch_all(Identifier::from("13")).await;

    assert_eq!(report.outcome, IdentifierOutcome::Completed);
    assert_eq!(report.name.as_deref(), Some("Catan"));
    assert_eq!(report.declared_total, Some(100));
    assert_eq!(report.pages_fetched, 1);
}

#[tokio::test]
async fn test_later_page_failure_stops_identifier() {
    let mock_server = MockServer::start().await;

    mount_rating(&mock_server, "13", 1, xml(rating_xml("Catan", "500", 1, 100)), 1).await;
    mount_rating(&mock_server, "13", 2, ResponseTemplate::new(503), 1).await;
    for page in 3..=5 {
        mount_rating(&mock_server, "13", page, xml(rating_xml("Catan", "500", page, 100)), 0).await;
    }

    let paginator = http_paginator(&mock_server.uri(), PageFailurePolicy::AbandonIdentifier);
    let report = paginator.fetch_all(Identifier::from("13")).await;

    assert_eq!(report.outcome, IdentifierOutcome::Abandoned { page: 2 });
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.ratings_seen, 100);
}

#[tokio::test]
async fn test_skip_page_policy_over_http() {
    let mock_server = MockServer::start().await;

    mount_rating(&mock_server, "13", 1, xml(rating_xml("Catan", "300", 1, 100)), 1).await;
    mount_rating(&mock_server, "13", 2, xml("<items><item></comments></items>".to_string()), 1).await;
    mount_rating(&mock_server, "13", 3, xml(rating_xml("Catan", "300", 3, 100)), 1).await;

    let paginator = http_paginator(&mock_server.uri(), PageFailurePolicy::SkipPage);
    let report = paginator.fetch_all(Identifier::from("13")).await;

    assert_eq!(
        report.outcome,
        IdentifierOutcome::Partial {
            failed_pages: vec![2]
        }
    );
    assert_eq!(report.ratings_seen, 200);
    assert_eq!(requested_pages(&mock_server, "13").await, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_invalid_total_skips_over_http() {
    let mock_server = MockServer::start().await;

    mount_rating(&mock_server, "13", 1, xml(rating_xml("Catan", "lots", 1, 10)), 1).await;
    mount_rating(&mock_server, "13", 2, xml(rating_xml("Catan", "lots", 2, 10)), 0).await;

    let paginator = http_paginator(&mock_server.uri(), PageFailurePolicy::default());
    let report = paginator.fetch_all(Identifier::from("13")).await;

    assert_eq!(
        report.outcome,
        IdentifierOutcome::Skipped(SkipReason::InvalidTotal("lots".to_string()))
    );
    assert_eq!(report.ratings_seen, 0);
}

#[tokio::test]
async fn test_retry_policy_from_config() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/browse/boardgame/page/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&["13"])))
        .mount(&mock_server)
        .await;

    mount_rating(&mock_server, "13", 1, xml(rating_xml("Catan", "200", 1, 100)), 1).await;
    mount_rating(&mock_server, "13", 2, ResponseTemplate::new(500), 3).await;

    let mut config = create_test_config(&mock_server.uri(), 1);
    config.fetcher.page_failure_policy = FailurePolicyName::RetryPage;
    config.fetcher.retry_attempts = 2;

    let harvester = Harvester::new(&config).expect("Failed to create harvester");
    let stats = harvester.run().await.expect("Harvest failed");

    assert_eq!(stats.abandoned, 1);
    assert_eq!(stats.pages_fetched, 1);
    assert_eq!(requested_pages(&mock_server, "13").await, vec![1, 2, 2, 2]);
}

const RATE_LIMIT_BODY: &str =
    "<errors><error><message>Rate limit exceeded.</message></error></errors>";

#[tokio::test]
async fn test_error_document_on_later_page_abandons() {
    let mock_server = MockServer::start().await;

    mount_rating(&mock_server, "13", 1, xml(rating_xml("Catan", "300", 1, 100)), 1).await;
    mount_rating(&mock_server, "13", 2, xml(RATE_LIMIT_BODY.to_string()), 1).await;
    mount_rating(&mock_server, "13", 3, xml(rating_xml("Catan", "300", 3, 100)), 0).await;

    let paginator = http_paginator(&mock_server.uri(), PageFailurePolicy::AbandonIdentifier);
    let report = paginator.fetch_all(Identifier::from("13")).await;

    assert_eq!(report.outcome, IdentifierOutcome::Abandoned { page: 2 });
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.ratings_seen, 100);
}

#[tokio::test]
async fn test_error_document_on_first_page_is_failure() {
    let mock_server = MockServer::start().await;

    mount_rating(&mock_server, "13", 1, xml(RATE_LIMIT_BODY.to_string()), 1).await;

    let paginator = http_paginator(&mock_server.uri(), PageFailurePolicy::default());
    let report = paginator.fetch_all(Identifier::from("13")).await;

    assert!(matches!(
        report.outcome,
        IdentifierOutcome::Skipped(SkipReason::FirstPageFailed(_))
    ));
}
