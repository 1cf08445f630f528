use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use std::{
    fs,
    path::PathBuf,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tower::ServiceExt;

use trackvault::db::{NewPlay, PlayRecord, TrackStorage};
use trackvault::router::{VaultState, vault_router};
use trackvault::spotify::SpotifyClient;

fn temp_database(tag: &str) -> (PathBuf, String) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "trackvault-{}-{}-{}.sqlite",
        tag,
        std::process::id(),
        nanos
    ));
    let database_url = format!("sqlite:{}", temp_path.display());
    (temp_path, database_url)
}

async fn test_app(tag: &str) -> (axum::Router, TrackStorage, PathBuf) {
    let (temp_path, database_url) = temp_database(tag);
    let storage = TrackStorage::connect(&database_url)
        .await
        .expect("failed to open test database");
    storage.init_schema().await.expect("schema init failed");

    let cfg = trackvault::config::Config::default();
    let spotify =
        Arc::new(SpotifyClient::new(storage.clone(), &cfg).expect("spotify client build failed"));
    let state = VaultState::new(storage.clone(), spotify);
    (vault_router(state), storage, temp_path)
}

async fn body_json<T: serde::de::DeserializeOwned>(resp: axum::response::Response) -> T {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body was not the expected JSON")
}

#[tokio::test]
async fn manual_insert_then_get_by_id_round_trips() {
    let (app, _storage, temp_path) = test_app("round-trip").await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/tracks?artist=Boards&album=Geogaddi&name=Gyroscope")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let inserted: PlayRecord = body_json(resp).await;

    assert_eq!(inserted.artist, "Boards");
    assert_eq!(inserted.album, "Geogaddi");
    assert_eq!(inserted.name, "Gyroscope");
    assert_eq!(inserted.uri, "");
    assert_eq!(inserted.played_at, None);
    assert!(inserted.id >= 1);
    assert!(!inserted.add_time.is_empty());

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/tracks/{}", inserted.id))
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: PlayRecord = body_json(resp).await;
    assert_eq!(fetched, inserted);

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn manual_insert_rejects_missing_required_fields() {
    let (app, _storage, temp_path) = test_app("validation").await;

    for uri in [
        "/api/tracks?album=Geogaddi&name=Gyroscope",
        "/api/tracks?artist=Boards&name=Gyroscope",
        "/api/tracks?artist=Boards&album=Geogaddi",
        "/api/tracks?artist=%20&album=Geogaddi&name=Gyroscope",
    ] {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::empty())
                    .expect("failed to build request"),
            )
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body_str = std::str::from_utf8(&bytes).unwrap();
        assert!(body_str.contains("INVALID_INPUT"), "uri: {uri}");
    }

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn get_unknown_id_returns_404() {
    let (app, _storage, temp_path) = test_app("missing-id").await;

    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/tracks/4242")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn pagination_windows_cover_65_records() {
    let (app, storage, temp_path) = test_app("pagination").await;

    for i in 1..=65 {
        storage
            .insert_track(&NewPlay {
                artist: format!("artist-{i}"),
                album: format!("album-{i}"),
                name: format!("track-{i}"),
                uri: String::new(),
                played_at: Some(format!("2026-08-25T10:{:02}:{:02}Z", i / 60, i % 60)),
            })
            .await
            .expect("insert failed");
    }

    let mut seen = Vec::new();
    for (page, expected_len) in [(0, 30), (1, 30), (2, 5)] {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/tracks?page={page}"))
                    .body(Body::empty())
                    .expect("failed to build request"),
            )
            .await
            .expect("request failed");
        assert_eq!(resp.status(), StatusCode::OK);
        let rows: Vec<PlayRecord> = body_json(resp).await;
        assert_eq!(rows.len(), expected_len, "page {page}");
        // Newest first within a page.
        for pair in rows.windows(2) {
            assert!(pair[0].id > pair[1].id);
        }
        seen.extend(rows.into_iter().map(|r| r.id));
    }
    // The three pages tile the full id range with no overlap or gap.
    assert_eq!(seen, (1..=65i64).rev().collect::<Vec<i64>>());

    // An omitted page parameter means page 0.
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/tracks")
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let rows: Vec<PlayRecord> = body_json(resp).await;
    assert_eq!(rows.first().map(|r| r.id), Some(65));
    assert_eq!(rows.len(), 30);

    let _ = fs::remove_file(&temp_path);
}
