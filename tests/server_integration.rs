//! HTTP tests: the router is served on a free port and exercised with
//! `reqwest`, backed by both the SQLite and the in-memory store.

use serde_json::{json, Value};
use std::sync::Arc;
use strstat::config::Config;
use strstat::server::router;
use strstat::service::StringService;
use strstat::sqlite_store::SqliteStore;
use strstat::store::memory::InMemoryStore;
use strstat::store::Store;
use tempfile::TempDir;

fn test_config(tmp: &TempDir) -> Config {
    let config_content = format!(
        r#"
[db]
path = "{}"

[server]
bind = "127.0.0.1:0"
"#,
        tmp.path().join("strstat.sqlite").display()
    );
    toml::from_str(&config_content).unwrap()
}

/// Serve the router on an ephemeral port and return its base URL.
async fn spawn_server(store: Arc<dyn Store>) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(StringService::new(store));
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    (format!("http://{}", addr), handle)
}

async fn sqlite_store(tmp: &TempDir) -> Arc<dyn Store> {
    let cfg = test_config(tmp);
    let pool = strstat::db::connect(&cfg).await.unwrap();
    strstat::migrate::migrate_pool(&pool).await.unwrap();
    Arc::new(SqliteStore::new(pool))
}

async fn post_value(client: &reqwest::Client, base: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{}/strings", base))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (base, handle) = spawn_server(Arc::new(InMemoryStore::new())).await;

    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    handle.abort();
}

#[tokio::test]
async fn test_create_get_delete_sqlite() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = spawn_server(sqlite_store(&tmp).await).await;
    let client = reqwest::Client::new();

    let resp = post_value(&client, &base, json!({ "value": "A man a plan a canal Panama" })).await;
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["properties"]["is_palindrome"], true);
    assert_eq!(created["properties"]["word_count"], 7);
    assert_eq!(created["properties"]["length"], 27);
    assert_eq!(created["id"], created["properties"]["content_hash"]);
    assert!(created["created_at"].as_str().unwrap().ends_with('Z'));

    // Duplicate → 409 with the stored record attached
    let resp = post_value(&client, &base, json!({ "value": "A man a plan a canal Panama" })).await;
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(body["data"]["id"], created["id"]);

    // Lookup by exact value (percent-encoded path segment)
    let resp = client
        .get(format!("{}/strings/A%20man%20a%20plan%20a%20canal%20Panama", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let got: Value = resp.json().await.unwrap();
    assert_eq!(got, created);

    let resp = client
        .delete(format!("{}/strings/A%20man%20a%20plan%20a%20canal%20Panama", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .delete(format!("{}/strings/A%20man%20a%20plan%20a%20canal%20Panama", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "not_found");

    handle.abort();
}

#[tokio::test]
async fn test_create_validation() {
    let (base, handle) = spawn_server(Arc::new(InMemoryStore::new())).await;
    let client = reqwest::Client::new();

    for body in [json!({}), json!({ "value": 12 }), json!({ "value": "  " })] {
        let resp = post_value(&client, &base, body.clone()).await;
        assert_eq!(resp.status(), 400, "body {}", body);
        let err: Value = resp.json().await.unwrap();
        assert_eq!(err["error"]["code"], "bad_request");
    }

    let resp = client
        .post(format!("{}/strings", base))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    handle.abort();
}

#[tokio::test]
async fn test_list_filters_sqlite() {
    let tmp = TempDir::new().unwrap();
    let (base, handle) = spawn_server(sqlite_store(&tmp).await).await;
    let client = reqwest::Client::new();

    for v in ["level", "rotator", "hello there", "zigzag", "x"] {
        let resp = post_value(&client, &base, json!({ "value": v })).await;
        assert_eq!(resp.status(), 201);
    }

    let resp = client
        .get(format!(
            "{}/strings?is_palindrome=true&min_length=5&max_length=7&word_count=1&contains_character=t",
            base
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["value"], "rotator");
    assert_eq!(
        body["filters_applied"],
        json!({
            "is_palindrome": true,
            "min_length": 5,
            "max_length": 7,
            "word_count": 1,
            "contains_character": "t"
        })
    );

    // No filters: everything, newest first
    let body: Value = client
        .get(format!("{}/strings", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["count"], 5);
    assert_eq!(body["data"][0]["value"], "x");
    assert_eq!(body["filters_applied"], json!({}));

    // Invalid value → 400
    let resp = client
        .get(format!("{}/strings?min_length=abc", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("min_length"));

    // Inverted range → 422
    let resp = client
        .get(format!("{}/strings?min_length=9&max_length=2", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    handle.abort();
}

#[tokio::test]
async fn test_natural_language_endpoint() {
    let (base, handle) = spawn_server(Arc::new(InMemoryStore::new())).await;
    let client = reqwest::Client::new();

    for v in ["noon", "radar", "banana split", "abracadabra", "stats"] {
        post_value(&client, &base, json!({ "value": v })).await;
    }

    let resp = client
        .get(format!("{}/strings/filter-by-natural-language", base))
        .query(&[("query", "single word palindromic strings")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["count"], 3);
    assert_eq!(
        body["interpreted_query"]["original"],
        "single word palindromic strings"
    );
    assert_eq!(
        body["interpreted_query"]["parsed_filters"],
        json!({ "word_count": "1", "is_palindrome": "true" })
    );

    let resp = client
        .get(format!("{}/strings/filter-by-natural-language", base))
        .query(&[("query", "strings longer than 10 characters")])
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["filters_applied"]["min_length"], 11);

    let resp = client
        .get(format!("{}/strings/filter-by-natural-language", base))
        .query(&[("query", "xyz")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .get(format!("{}/strings/filter-by-natural-language", base))
        .query(&[("query", "palindromic strings that are not palindromic")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let resp = client
        .get(format!("{}/strings/filter-by-natural-language", base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    handle.abort();
}
