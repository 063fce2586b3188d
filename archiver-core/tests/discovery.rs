mod support;

use archiver_config::EnumerationPolicy;
use std::time::Duration;

use archiver_core::{
    AggregateDiscovery, ArchiverError, DiscoveredShow, EpisodeDiscovery,
    EpisodeStatus, ScrapeDiscovery, StatusMap,
};
use serde_json::json;
use support::{
    API_KEY, DOWNLOADED, client, client_with_timeout, listing_html,
    seasons_body,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

const INTERNAL_STATUS: &str = "/api/v2/internal/getEpisodeStatus";

const CONTIGUOUS: EnumerationPolicy = EnumerationPolicy::Contiguous;

fn numbers(show: &DiscoveredShow) -> Vec<(u32, u32)> {
    show.episodes.iter().map(|e| (e.season, e.number)).collect()
}

fn statuses() -> StatusMap {
    StatusMap::from_entries([
        (EpisodeStatus(4), "Downloaded"),
        (EpisodeStatus(6), "Archived"),
    ])
}

async fn mount_listing(server: &MockServer, series: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/manage/episodeStatuses"))
        .and(query_param("whichStatus", DOWNLOADED.to_string()))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_html(series)),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_seasons(
    server: &MockServer,
    series_id: &str,
    body: serde_json::Value,
) {
    Mock::given(method("GET"))
        .and(path(format!("/api/{API_KEY}/")))
        .and(query_param("cmd", "show.seasons"))
        .and(query_param("tvdbid", series_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn scrape_stops_probing_at_first_missing_season() {
    let server = MockServer::start().await;
    mount_listing(&server, &[("12345", "Gap Show"), ("777", "Clean Show")])
        .await;
    mount_seasons(
        &server,
        "12345",
        seasons_body(json!({
            "1": {"1": {"status": "Downloaded"}, "2": {"status": "Snatched"}},
            "3": {"1": {"status": "Downloaded"}}
        })),
    )
    .await;
    mount_seasons(
        &server,
        "777",
        seasons_body(json!({"1": {"1": {"status": "Archived"}}})),
    )
    .await;

    let discovery = ScrapeDiscovery::new(client(&server), CONTIGUOUS);
    let shows = discovery
        .discover(EpisodeStatus(DOWNLOADED), Some(&statuses()))
        .await
        .expect("discovery succeeds");

    assert_eq!(shows.len(), 1, "show without matches is dropped");
    let show = &shows[0];
    assert_eq!(show.series.id, "12345");
    assert_eq!(show.series.name, "Gap Show");
    assert_eq!(numbers(show), vec![(1, 1)]);
}

#[tokio::test]
async fn scrape_with_all_keys_reaches_sparse_seasons() {
    let server = MockServer::start().await;
    mount_listing(&server, &[("12345", "Gap Show")]).await;
    mount_seasons(
        &server,
        "12345",
        seasons_body(json!({
            "1": {"1": {"status": "Downloaded"}},
            "3": {"1": {"status": "Downloaded"}, "2": {"status": "Downloaded"}}
        })),
    )
    .await;

    let discovery =
        ScrapeDiscovery::new(client(&server), EnumerationPolicy::AllKeys);
    let shows = discovery
        .discover(EpisodeStatus(DOWNLOADED), Some(&statuses()))
        .await
        .unwrap();
    assert_eq!(numbers(&shows[0]), vec![(1, 1), (3, 1), (3, 2)]);
}

#[tokio::test]
async fn scrape_with_empty_listing_returns_nothing() {
    let server = MockServer::start().await;
    mount_listing(&server, &[]).await;

    let discovery = ScrapeDiscovery::new(client(&server), CONTIGUOUS);
    let shows = discovery
        .discover(EpisodeStatus(DOWNLOADED), Some(&statuses()))
        .await
        .unwrap();
    assert!(shows.is_empty());
}

#[tokio::test]
async fn scrape_requires_the_source_status_in_the_directory() {
    let server = MockServer::start().await;
    let discovery = ScrapeDiscovery::new(client(&server), CONTIGUOUS);

    let err = discovery
        .discover(EpisodeStatus(DOWNLOADED), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ArchiverError::Resolution { .. }));

    let only_archived =
        StatusMap::from_entries([(EpisodeStatus(6), "Archived")]);
    let err = discovery
        .discover(EpisodeStatus(DOWNLOADED), Some(&only_archived))
        .await
        .unwrap_err();
    assert!(matches!(err, ArchiverError::Resolution { .. }));
}

#[tokio::test]
async fn scrape_reports_failed_show_seasons_result() {
    let server = MockServer::start().await;
    mount_listing(&server, &[("12345", "Broken")]).await;
    mount_seasons(
        &server,
        "12345",
        json!({"result": "failure", "message": "Show not found", "data": {}}),
    )
    .await;

    let discovery = ScrapeDiscovery::new(client(&server), CONTIGUOUS);
    let err = discovery
        .discover(EpisodeStatus(DOWNLOADED), Some(&statuses()))
        .await
        .unwrap_err();
    assert!(matches!(err, ArchiverError::Decode { .. }));
    let message = err.to_string();
    assert!(message.contains("12345"), "{message}");
    assert!(!message.contains(API_KEY), "api key leaked: {message}");
}

#[tokio::test]
async fn scrape_rejects_mis_shaped_season_tree() {
    let server = MockServer::start().await;
    mount_listing(&server, &[("12345", "Odd")]).await;
    let tree = seasons_body(json!({"1": ["not", "a", "map"]}));
    mount_seasons(&server, "12345", tree).await;

    let discovery = ScrapeDiscovery::new(client(&server), CONTIGUOUS);
    let err = discovery
        .discover(EpisodeStatus(DOWNLOADED), Some(&statuses()))
        .await
        .unwrap_err();
    assert!(matches!(err, ArchiverError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn scrape_fails_when_management_page_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manage/episodeStatuses"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let discovery = ScrapeDiscovery::new(client(&server), CONTIGUOUS);
    let err = discovery
        .discover(EpisodeStatus(DOWNLOADED), Some(&statuses()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn aggregate_flattens_grouped_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(INTERNAL_STATUS))
        .and(query_param("status", "4"))
        .and(header("x-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "episodeStatus": {
                "tvdb12345": {
                    "name": "Show One",
                    "episodes": [
                        {"slug": "s01e02", "name": "Second"},
                        {"slug": "s01e01", "name": "Pilot"}
                    ]
                },
                "tvdb777": {
                    "name": "Show Two",
                    "episodes": [{"slug": "s02e05", "season": 2, "episode": 5}]
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let shows = AggregateDiscovery::new(client(&server))
        .discover(EpisodeStatus(DOWNLOADED), None)
        .await
        .expect("aggregate discovery succeeds");

    assert_eq!(shows.len(), 2);
    assert_eq!(shows[0].series.slug, "tvdb12345");
    assert_eq!(shows[0].series.name, "Show One");
    let slugs: Vec<_> = shows[0].episodes.iter().map(|e| e.slug()).collect();
    assert_eq!(slugs, vec!["s01e01", "s01e02"]);
    assert_eq!(numbers(&shows[1]), vec![(2, 5)]);
}

#[tokio::test]
async fn aggregate_with_no_shows_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(INTERNAL_STATUS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let shows = AggregateDiscovery::new(client(&server))
        .discover(EpisodeStatus(DOWNLOADED), None)
        .await
        .unwrap();
    assert!(shows.is_empty());
}

#[tokio::test]
async fn aggregate_fails_fast_on_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(INTERNAL_STATUS))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = AggregateDiscovery::new(client(&server))
        .discover(EpisodeStatus(DOWNLOADED), None)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ArchiverError::Server { status: 503, .. }),
        "{err:?}"
    );
}

#[tokio::test]
async fn aggregate_rejects_unexpected_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(INTERNAL_STATUS))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!(["tvdb1"])),
        )
        .mount(&server)
        .await;

    let err = AggregateDiscovery::new(client(&server))
        .discover(EpisodeStatus(DOWNLOADED), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ArchiverError::Decode { .. }));
}

#[tokio::test]
async fn aggregate_keeps_episodes_without_numbered_slugs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(INTERNAL_STATUS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "episodeStatus": {
                "tvdb1": {
                    "name": "Daily Show",
                    "episodes": [{"slug": "s01e01"}, {"slug": "2019-05-01"}]
                }
            }
        })))
        .mount(&server)
        .await;

    let shows = AggregateDiscovery::new(client(&server))
        .discover(EpisodeStatus(DOWNLOADED), None)
        .await
        .expect("free-form slugs do not fail discovery");

    let slugs: Vec<_> = shows[0].episodes.iter().map(|e| e.slug()).collect();
    assert_eq!(slugs.len(), 2);
    assert!(slugs.contains(&"2019-05-01".to_string()));
    assert!(slugs.contains(&"s01e01".to_string()));
}

#[tokio::test]
async fn slow_server_hits_the_client_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(INTERNAL_STATUS))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = client_with_timeout(&server, Duration::from_millis(300));
    let err = AggregateDiscovery::new(client)
        .discover(EpisodeStatus(DOWNLOADED), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ArchiverError::Transport { .. }), "{err:?}");
    assert!(err.is_timeout(), "{err:?}");
}
