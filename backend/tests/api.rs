use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

use backend::recognition::Recognizer;
use backend::storage::MemoryStorage;

fn app() -> axum::Router {
    let dir = std::env::temp_dir();
    let state = backend::AppState::new(Box::new(MemoryStorage::new()), Recognizer::new(None))
        .with_folders(dir.join("league-uploads"), dir.join("league-exports"));

    backend::api::router(Arc::new(state))
}

async fn call(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

fn a_match(winner: &str) -> serde_json::Value {
    serde_json::json!({
        "date": "2025-12-05",
        "winner": winner,
        "radiant_players": [{"name": "a", "tags": ["MVP"]}, {"name": "b"}],
        "dire_players": [{"name": "c", "tags": ["僵"]}, {"name": "d"}],
    })
}

#[tokio::test]
async fn status_reports_recognizer() {
    let app = app();

    let (status, body) = call(&app, "GET", "/status", None).await;

    assert_eq!(StatusCode::OK, status);
    assert_eq!("running", body["status"]);
    assert_eq!(false, body["api_available"]);
}

#[tokio::test]
async fn match_lifecycle() {
    let app = app();

    let (status, body) = call(&app, "POST", "/match", Some(a_match("天辉"))).await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!(1, body["match_id"]);
    assert_eq!(false, body["invalid"]);

    let (_, body) = call(&app, "POST", "/match", Some(a_match("dire"))).await;
    assert_eq!(2, body["match_id"]);

    let (status, body) = call(&app, "GET", "/match/1", None).await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!("radiant", body["winner"]);

    let (_, body) = call(&app, "GET", "/matches", None).await;
    let ids: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_u64().unwrap())
        .collect();
    assert_eq!(vec![2, 1], ids);

    let (status, _) = call(&app, "PUT", "/match/2", Some(a_match("radiant"))).await;
    assert_eq!(StatusCode::OK, status);

    let (_, body) = call(&app, "GET", "/player/a", None).await;
    assert_eq!(2, body["total_games"]);
    assert_eq!(3.0, body["score"]);
    assert_eq!(2, body["mvp_count"]);

    let (status, _) = call(&app, "DELETE", "/match/1", None).await;
    assert_eq!(StatusCode::OK, status);
    let (status, body) = call(&app, "DELETE", "/match/1", None).await;
    assert_eq!(StatusCode::NOT_FOUND, status);
    assert_eq!(false, body["success"]);

    let (_, body) = call(&app, "GET", "/leaderboard", None).await;
    let board = body.as_array().unwrap();
    assert_eq!(4, board.len());
    assert_eq!(1, board[0]["rank"]);
    assert_eq!("a", board[0]["name"]);
}

#[tokio::test]
async fn invalid_input_is_rejected() {
    let app = app();

    let (status, _) = call(
        &app,
        "POST",
        "/match",
        Some(serde_json::json!({"radiant_players": [{"name": "a"}]})),
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status);

    let (status, _) = call(&app, "POST", "/match", Some(serde_json::json!({"winner": "radiant"}))).await;
    assert_eq!(StatusCode::BAD_REQUEST, status);

    let (status, _) = call(&app, "PUT", "/match/9", Some(a_match("radiant"))).await;
    assert_eq!(StatusCode::NOT_FOUND, status);

    let (status, _) = call(&app, "GET", "/player/nobody", None).await;
    assert_eq!(StatusCode::NOT_FOUND, status);

    let (status, _) = call(&app, "POST", "/set_api_key", Some(serde_json::json!({"api_key": "  "}))).await;
    assert_eq!(StatusCode::BAD_REQUEST, status);
}

#[tokio::test]
async fn overrides_drive_preview() {
    let app = app();

    for (name, level) in [("a", "elite"), ("b", "mid"), ("c", "中等"), ("d", "mid")] {
        let (status, _) = call(
            &app,
            "PUT",
            "/horse",
            Some(serde_json::json!({"name": name, "level": level})),
        )
        .await;
        assert_eq!(StatusCode::OK, status);
    }

    let (status, _) = call(
        &app,
        "PUT",
        "/horse",
        Some(serde_json::json!({"name": "e", "level": "legendary"})),
    )
    .await;
    assert_eq!(StatusCode::BAD_REQUEST, status);

    let (_, body) = call(
        &app,
        "POST",
        "/preview",
        Some(serde_json::json!({"radiant": ["a", "b"], "dire": ["c", "d"]})),
    )
    .await;
    assert_eq!(1, body["difference"]);
    assert_eq!(true, body["all_classified"]);

    let (_, body) = call(&app, "POST", "/match", Some(a_match("radiant"))).await;
    assert_eq!(0.5, body["compensation"]);

    let (_, body) = call(&app, "GET", "/horses", None).await;
    assert_eq!(
        serde_json::json!([
            {"name": "a", "horse_level": "elite"},
            {"name": "b", "horse_level": "mid"},
            {"name": "c", "horse_level": "mid"},
            {"name": "d", "horse_level": "mid"},
        ]),
        body
    );

    let (status, _) = call(&app, "DELETE", "/horse/a", None).await;
    assert_eq!(StatusCode::OK, status);
    let (status, _) = call(&app, "DELETE", "/horse/a", None).await;
    assert_eq!(StatusCode::NOT_FOUND, status);
}

#[tokio::test]
async fn api_key_keeps_other_settings() {
    let dir = tempfile::tempdir().unwrap();
    let env_file = dir.path().join(".env");
    std::fs::write(&env_file, "LEAGUE_DATA_FILE=/srv/league.json\nGEMINI_API_KEY=old\n").unwrap();

    let state = backend::AppState::new(Box::new(MemoryStorage::new()), Recognizer::new(None))
        .with_env_file(&env_file);
    let app = backend::api::router(Arc::new(state));

    let (status, _) = call(
        &app,
        "POST",
        "/set_api_key",
        Some(serde_json::json!({"api_key": "fresh"})),
    )
    .await;
    assert_eq!(StatusCode::OK, status);

    let (_, body) = call(&app, "GET", "/status", None).await;
    assert_eq!(true, body["api_available"]);

    assert_eq!(
        "LEAGUE_DATA_FILE=/srv/league.json\nGEMINI_API_KEY=fresh\n",
        std::fs::read_to_string(&env_file).unwrap()
    );
}

#[tokio::test]
async fn export_stays_in_its_folder() {
    let dir = tempfile::tempdir().unwrap();
    let exports = dir.path().join("exports");
    std::fs::write(dir.path().join("game_data.json"), "{}").unwrap();

    let state = backend::AppState::new(Box::new(MemoryStorage::new()), Recognizer::new(None))
        .with_folders(dir.path().join("uploads"), &exports);
    let app = backend::api::router(Arc::new(state));

    let (status, body) = call(&app, "GET", "/export", None).await;
    assert_eq!(StatusCode::OK, status);
    assert_eq!("dota_stats.csv", body["filename"]);
    assert!(exports.join("dota_stats.csv").exists());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/download/game_data.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(StatusCode::NOT_FOUND, response.status());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/download/dota_stats.csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(StatusCode::OK, response.status());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pending_recognition_does_not_block_key_changes() {
    // An endpoint that accepts connections but never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let (accepted_tx, accepted_rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        let mut accepted_tx = Some(accepted_tx);
        let mut open = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            open.push(socket);
            if let Some(tx) = accepted_tx.take() {
                let _ = tx.send(());
            }
        }
    });

    let dir = tempfile::tempdir().unwrap();
    let recognizer = Recognizer::new(Some("key".to_owned()))
        .with_endpoint(format!("http://{}/generate", address));
    let state = backend::AppState::new(Box::new(MemoryStorage::new()), recognizer)
        .with_folders(dir.path().join("uploads"), dir.path().join("exports"));
    let app = backend::api::router(Arc::new(state));

    let boundary = "leagueboundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"shot.png\"\r\nContent-Type: image/png\r\n\r\n",
            b = boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(&[0x89, b'P', b'N', b'G']);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let upload = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();
    let pending = tokio::spawn(app.clone().oneshot(upload));

    accepted_rx.await.unwrap();

    let (status, _) = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        call(
            &app,
            "POST",
            "/set_api_key",
            Some(serde_json::json!({"api_key": "other"})),
        ),
    )
    .await
    .unwrap();
    assert_eq!(StatusCode::OK, status);

    let (_, body) = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        call(&app, "GET", "/status", None),
    )
    .await
    .unwrap();
    assert_eq!(true, body["api_available"]);

    pending.abort();
}
