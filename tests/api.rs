use std::sync::Arc;

use quidproquo::{AppState, Config, db};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

async fn spawn() -> String {
    let db_pool = db::connect("sqlite::memory:", 1).await.unwrap();
    let app = quidproquo::app(AppState {
        db_pool,
        config: Arc::new(Config::default()),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{address}")
}

fn client() -> Client {
    Client::builder().cookie_store(true).build().unwrap()
}

async fn register(client: &Client, base: &str, name: &str) -> i64 {
    let email = format!("{}@example.com", name.to_lowercase());
    let reply: Value = client
        .post(format!("{base}/api/auth"))
        .json(&json!({
            "action": "register",
            "full_name": name,
            "email": email,
            "password": "correct horse",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply["success"], true, "{reply}");
    reply["data"]["id"].as_i64().unwrap()
}

#[tokio::test]
async fn guitar_lesson_from_request_to_review() {
    let base = spawn().await;
    let alice = client();
    let bob = client();

    let alice_id = register(&alice, &base, "Alice").await;

    let catalog: Value = alice
        .get(format!("{base}/api/skills"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let guitar = catalog["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|skill| skill["name"] == "Guitar")
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    let added = alice
        .post(format!("{base}/api/skills"))
        .json(&json!({ "skill_id": guitar, "skill_level": "intermediate", "type": "teaching" }))
        .send()
        .await
        .unwrap();
    assert_eq!(added.status(), StatusCode::OK);

    register(&bob, &base, "Bob").await;

    // search needs no session
    let found: Value = client()
        .get(format!("{base}/api/search?category=Music"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let results = found["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], alice_id);
    assert_eq!(results[0]["skills"][0]["skill_level"], "intermediate");

    let sent: Value = bob
        .post(format!("{base}/api/exchange"))
        .json(&json!({ "receiver_id": alice_id, "message": "Teach me barre chords?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let exchange_id = sent["data"]["exchange_id"].as_i64().unwrap();

    let again = bob
        .post(format!("{base}/api/exchange"))
        .json(&json!({ "receiver_id": alice_id, "message": "Hello?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::CONFLICT);
    let again: Value = again.json().await.unwrap();
    assert_eq!(again["success"], false);

    // reviewing before the lesson happened is refused
    let early = bob
        .post(format!("{base}/api/reviews"))
        .json(&json!({ "receiver_id": alice_id, "rating": 5, "comment": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(early.status(), StatusCode::FORBIDDEN);

    let received: Value = alice
        .get(format!("{base}/api/exchange?type=received"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(received["data"][0]["status"], "pending");
    assert_eq!(received["data"][0]["sender_name"], "Bob");

    // only the receiver decides
    let self_accept = bob
        .put(format!("{base}/api/exchange"))
        .json(&json!({ "exchange_id": exchange_id, "status": "accepted" }))
        .send()
        .await
        .unwrap();
    assert_eq!(self_accept.status(), StatusCode::FORBIDDEN);

    let accepted = alice
        .put(format!("{base}/api/exchange"))
        .json(&json!({ "exchange_id": exchange_id, "status": "accepted" }))
        .send()
        .await
        .unwrap();
    assert_eq!(accepted.status(), StatusCode::OK);

    let completed = bob
        .post(format!("{base}/api/exchange/{exchange_id}/complete"))
        .send()
        .await
        .unwrap();
    assert_eq!(completed.status(), StatusCode::OK);

    let reviewed = bob
        .post(format!("{base}/api/reviews"))
        .json(&json!({ "receiver_id": alice_id, "rating": 5, "comment": "Patient and clear" }))
        .send()
        .await
        .unwrap();
    assert_eq!(reviewed.status(), StatusCode::OK);

    let summary: Value = bob
        .get(format!("{base}/api/reviews?user_id={alice_id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(summary["data"]["stats"]["total_reviews"], 1);
    assert_eq!(summary["data"]["stats"]["average_rating"], 5.0);
    assert_eq!(summary["data"]["reviews"][0]["comment"], "Patient and clear");

    let board: Value = alice
        .get(format!("{base}/api/dashboard"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(board["data"]["stats"]["completed_exchanges"], 1);
    assert_eq!(board["data"]["stats"]["average_rating"], 5.0);
}

#[tokio::test]
async fn api_without_session_is_refused() {
    let base = spawn().await;
    let anonymous = client();

    for path in ["/api/dashboard", "/api/profile", "/api/exchange", "/api/skills"] {
        let res = anonymous.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
        let reply: Value = res.json().await.unwrap();
        assert_eq!(reply["success"], false);
        assert_eq!(reply["message"], "You must be logged in to perform this action");
    }
}

#[tokio::test]
async fn logout_ends_the_session() {
    let base = spawn().await;
    let carol = client();
    register(&carol, &base, "Carol").await;

    let res = carol.get(format!("{base}/api/profile")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    carol
        .post(format!("{base}/api/auth"))
        .json(&json!({ "action": "logout" }))
        .send()
        .await
        .unwrap();

    let res = carol.get(format!("{base}/api/profile")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_body_is_a_validation_error() {
    let base = spawn().await;
    let res = client()
        .post(format!("{base}/api/auth"))
        .json(&json!({ "action": "dance" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let reply: Value = res.json().await.unwrap();
    assert_eq!(reply["success"], false);
}

#[tokio::test]
async fn decision_outside_accept_or_reject_is_refused() {
    let base = spawn().await;
    let alice = client();
    let bob = client();
    let alice_id = register(&alice, &base, "Alice").await;
    register(&bob, &base, "Bob").await;

    let sent: Value = bob
        .post(format!("{base}/api/exchange"))
        .json(&json!({ "receiver_id": alice_id, "message": "Piano?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let exchange_id = sent["data"]["exchange_id"].as_i64().unwrap();

    for status in ["completed", "pending", "cancelled", "whatever"] {
        let res = alice
            .put(format!("{base}/api/exchange"))
            .json(&json!({ "exchange_id": exchange_id, "status": status }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{status}");
        let reply: Value = res.json().await.unwrap();
        assert_eq!(reply["success"], false);
    }

    let received: Value = alice
        .get(format!("{base}/api/exchange?type=received"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(received["data"][0]["id"], exchange_id);
    assert_eq!(received["data"][0]["status"], "pending");
}

#[tokio::test]
async fn search_page_must_be_an_integer() {
    let base = spawn().await;

    let res = client().get(format!("{base}/api/search?page=abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let far: Value = client()
        .get(format!("{base}/api/search?page={}", i64::MAX))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(far["success"], true);
    assert!(far["data"]["results"].as_array().unwrap().is_empty());
}

