//! Integration tests for `OsmTileProvider` using wiremock HTTP mocks.

use ecotrack_core::model::Coordinate;
use ecotrack_core::ports::{MapError, MapProvider, MapSurface};
use ecotrack_provider_osm::OsmTileProvider;
use reqwest::Client;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(base_url: &str) -> OsmTileProvider {
    OsmTileProvider::new(Client::new(), base_url).expect("valid base url")
}

#[tokio::test]
async fn load_probes_root_tile_and_returns_surface() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/0/0/0.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
        .expect(1)
        .mount(&server)
        .await;

    let mut surface = provider(&server.uri()).load().await.expect("tile server is up");

    surface
        .set_view(Coordinate::new(34.052, -118.243), 14)
        .expect("fresh surface accepts views");
    assert_eq!(surface.zoom(), 14);
    let url = surface.tile_url(surface.center_tile()).expect("tile url");
    assert!(url.as_str().starts_with(&server.uri()));
    assert!(url.path().starts_with("/14/"));
}

#[tokio::test]
async fn load_fails_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/0/0/0.png"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = provider(&server.uri())
        .load()
        .await
        .expect_err("500 must fail the load");

    assert!(matches!(err, MapError::Load(_)));
}

#[tokio::test]
async fn load_fails_when_server_is_unreachable() {
    // Nothing listens on the discard port on test machines.
    let err = provider("http://127.0.0.1:9")
        .load()
        .await
        .expect_err("closed port must fail the load");

    assert!(matches!(err, MapError::Load(_)));
}

#[tokio::test]
async fn load_honours_base_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/osm/0/0/0.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/osm", server.uri());
    provider(&base).load().await.expect("nested base path");
}
