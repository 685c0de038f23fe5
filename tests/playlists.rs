mod common;

use axum::http::StatusCode;
use common::*;
use mockito::{Matcher, Server};
use serde_json::json;
use spotify_relay::spotify::TRACK_FIELDS;
use tower::ServiceExt;

#[tokio::test]
async fn playlists_without_session_are_unauthorized() {
    let mut server = Server::new_async().await;
    let upstream = server
        .mock("GET", "/v1/me/playlists")
        .expect(0)
        .create_async()
        .await;
    let app = build_app(test_config(&server.url()));

    let missing = app.clone().oneshot(get("/playlists", None)).await.unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let unknown = app
        .oneshot(get("/playlists", Some(&session_header("no-such-session"))))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);

    upstream.assert_async().await;
}

#[tokio::test]
async fn playlists_are_filtered_to_owner() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server, "abc", "xyz", "alice").await;
    let playlists = server
        .mock("GET", "/v1/me/playlists")
        .match_header("authorization", "Bearer abc")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "items": [
                    {
                        "name": "Mine",
                        "id": "p1",
                        "href": "https://api.spotify.com/v1/playlists/p1",
                        "public": true,
                        "owner": { "id": "alice", "display_name": "Alice" }
                    },
                    {
                        "name": "Followed",
                        "id": "p2",
                        "href": "https://api.spotify.com/v1/playlists/p2",
                        "owner": { "id": "bob" }
                    },
                    {
                        "name": "Case differs",
                        "id": "p3",
                        "href": "https://api.spotify.com/v1/playlists/p3",
                        "owner": { "id": "Alice" }
                    }
                ],
                "total": 3
            })
            .to_string(),
        )
        .create_async()
        .await;
    let app = build_app(test_config(&server.url()));
    let session = app_login(&app).await;

    let response = app
        .oneshot(get("/playlists", Some(&session_header(&session))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!([{
            "name": "Mine",
            "id": "p1",
            "href": "https://api.spotify.com/v1/playlists/p1"
        }])
    );
    playlists.assert_async().await;
}

#[tokio::test]
async fn playlist_tracks_are_forwarded() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server, "abc", "xyz", "alice").await;
    let items = json!([
        {
            "track": {
                "name": "Song",
                "href": "https://api.spotify.com/v1/tracks/t1",
                "album": { "name": "Album", "href": "https://api.spotify.com/v1/albums/a1" }
            }
        }
    ]);
    let tracks = server
        .mock("GET", "/v1/playlists/p1/tracks")
        .match_header("authorization", "Bearer abc")
        .match_query(Matcher::UrlEncoded("fields".into(), TRACK_FIELDS.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "items": items }).to_string())
        .create_async()
        .await;
    let app = build_app(test_config(&server.url()));
    let session = app_login(&app).await;

    let response = app
        .oneshot(get("/playlist/p1", Some(&session_header(&session))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, items);
    tracks.assert_async().await;
}

#[tokio::test]
async fn refused_token_expires_session() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server, "abc", "xyz", "alice").await;
    let playlists = server
        .mock("GET", "/v1/me/playlists")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"status":401,"message":"The access token expired"}}"#)
        .expect(1)
        .create_async()
        .await;
    let app = build_app(test_config(&server.url()));
    let session = app_login(&app).await;

    let first = app
        .clone()
        .oneshot(get("/playlists", Some(&session_header(&session))))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

    // Expired sessions are answered locally.
    let second = app
        .oneshot(get("/playlists", Some(&session_header(&session))))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);

    playlists.assert_async().await;
}

#[tokio::test]
async fn upstream_outage_is_bad_gateway() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server, "abc", "xyz", "alice").await;
    let _tracks = server
        .mock("GET", "/v1/playlists/p1/tracks")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    let app = build_app(test_config(&server.url()));
    let session = app_login(&app).await;

    let response = app
        .oneshot(get("/playlist/p1", Some(&session_header(&session))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
