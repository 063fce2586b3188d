#![allow(dead_code)]

use std::{net::TcpListener, time::Duration};

use archiver_config::{
    Config, EnumerationPolicy, HttpConfig, MigrationConfig, Protocol,
    TargetConfig,
};
use archiver_core::MedusaClient;
use serde_json::{Value, json};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

pub const API_KEY: &str = "testkey";
pub const DOWNLOADED: i32 = 4;
pub const ARCHIVED: i32 = 6;

pub fn config(server: &MockServer, protocol: Protocol) -> Config {
    Config {
        target: TargetConfig {
            base_url: Url::parse(&server.uri()).expect("mock server uri"),
            api_key: API_KEY.to_string(),
        },
        http: HttpConfig {
            timeout: Duration::from_secs(5),
            accept_invalid_certs: false,
        },
        migration: MigrationConfig {
            source_status: DOWNLOADED,
            target_status: ARCHIVED,
            protocol,
            enumeration: EnumerationPolicy::Contiguous,
            dry_run: false,
        },
    }
}

pub fn client(server: &MockServer) -> MedusaClient {
    client_with_timeout(server, Duration::from_secs(5))
}

pub fn client_with_timeout(
    server: &MockServer,
    timeout: Duration,
) -> MedusaClient {
    let mut config = config(server, Protocol::Internal);
    config.http.timeout = timeout;
    MedusaClient::new(&config.target, &config.http).expect("client builds")
}

/// Client pointed at a local port nothing listens on.
pub fn unreachable_client() -> MedusaClient {
    let port = TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("free local port")
        .port();
    let target = TargetConfig {
        base_url: Url::parse(&format!("http://127.0.0.1:{port}"))
            .expect("local url"),
        api_key: API_KEY.to_string(),
    };
    let http = HttpConfig {
        timeout: Duration::from_secs(5),
        accept_invalid_certs: false,
    };
    MedusaClient::new(&target, &http).expect("client builds")
}

pub fn status_config_body() -> Value {
    json!({
        "main": {"version": "1.0.0"},
        "consts": {
            "statuses": [
                {"value": -1, "name": "Unset"},
                {"value": 3, "name": "Wanted"},
                {"value": 4, "name": "Downloaded"},
                {"value": 5, "name": "Skipped"},
                {"value": 6, "name": "Archived"}
            ]
        }
    })
}

pub async fn mount_status_config(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v2/config"))
        .and(header("x-api-key", API_KEY))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(status_config_body()),
        )
        .mount(server)
        .await;
}

/// Management page listing `(series id, display name)` pairs.
pub fn listing_html(series: &[(&str, &str)]) -> String {
    let rows: String = series
        .iter()
        .map(|(id, name)| {
            format!(
                r#"<tr><th colspan="2" class="row-seasonheader">
                    <a href="/home/displayShow?seriesid={id}">{name}</a>
                    <input type="button" class="pull-right get_more_eps btn"
                           id="{id}" value="Expand" data-series-id="{id}">
                </th></tr>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><form action="changeEpisodeStatuses" method="post">
            <table class="defaultTable">{rows}</table>
        </form></body></html>"#
    )
}

/// `show.seasons` envelope around `data`.
pub fn seasons_body(data: Value) -> Value {
    json!({"result": "success", "message": "", "data": data})
}
