use reqwest::Client;
use serde_json::{json, Value};

mod common;
use common::utils::{create_test_user_and_login, spawn_app, TestApp};

async fn put_profile(app: &TestApp, token: &str, body: Value) -> reqwest::Response {
    Client::new()
        .put(app.url("/api/health-profile"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to update health profile.")
}

#[tokio::test]
async fn profile_is_404_until_first_write() {
    let test_app = spawn_app().await;
    let (_, token) = create_test_user_and_login(&test_app).await;

    let response = Client::new()
        .get(test_app.url("/api/health-profile"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to fetch health profile.");

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn later_writes_only_replace_supplied_fields() {
    let test_app = spawn_app().await;
    let (_, token) = create_test_user_and_login(&test_app).await;

    let first = put_profile(
        &test_app,
        &token,
        json!({
            "height": "170cm",
            "weight": "65kg",
            "gender": "female",
            "age": 34,
            "family_history": {"diabetes": true}
        }),
    )
    .await;
    assert_eq!(200, first.status().as_u16());

    let second = put_profile(&test_app, &token, json!({"weight": "63kg", "age": "", "gender": ""})).await;
    assert_eq!(200, second.status().as_u16());
    let second: Value = second.json().await.unwrap();

    assert_eq!(second["weight"], "63kg");
    assert_eq!(second["height"], "170cm");
    assert_eq!(second["gender"], "female");
    assert_eq!(second["age"], 34);
    assert_eq!(second["family_history"]["diabetes"], true);

    let fetched: Value = Client::new()
        .get(test_app.url("/api/health-profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, second);
}

#[tokio::test]
async fn numeric_string_ages_are_accepted_and_out_of_range_rejected() {
    let test_app = spawn_app().await;
    let (_, token) = create_test_user_and_login(&test_app).await;

    let accepted = put_profile(&test_app, &token, json!({"age": "42"})).await;
    assert_eq!(200, accepted.status().as_u16());
    let accepted: Value = accepted.json().await.unwrap();
    assert_eq!(accepted["age"], 42);

    let rejected = put_profile(&test_app, &token, json!({"age": 400})).await;
    assert_eq!(400, rejected.status().as_u16());
    let body: Value = rejected.json().await.unwrap();
    assert_eq!(body["error"], "invalid_age");
}

#[tokio::test]
async fn profiles_are_per_user() {
    let test_app = spawn_app().await;
    let (_, first_token) = create_test_user_and_login(&test_app).await;
    let (_, second_token) = create_test_user_and_login(&test_app).await;

    put_profile(&test_app, &first_token, json!({"height": "180cm"})).await;

    let response = Client::new()
        .get(test_app.url("/api/health-profile"))
        .bearer_auth(&second_token)
        .send()
        .await
        .unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn concurrent_writes_for_one_owner_are_both_kept() {
    let test_app = spawn_app().await;
    let (_, token) = create_test_user_and_login(&test_app).await;

    let (height, weight) = tokio::join!(
        put_profile(&test_app, &token, json!({"height": "180cm"})),
        put_profile(&test_app, &token, json!({"weight": "80kg"})),
    );
    assert_eq!(200, height.status().as_u16());
    assert_eq!(200, weight.status().as_u16());
    let height: Value = height.json().await.unwrap();
    let weight: Value = weight.json().await.unwrap();
    assert_eq!(height["id"], weight["id"]);

    let stored: Value = Client::new()
        .get(test_app.url("/api/health-profile"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to fetch health profile.")
        .json()
        .await
        .unwrap();
    assert_eq!(stored["height"], "180cm");
    assert_eq!(stored["weight"], "80kg");
    assert_eq!(stored["id"], height["id"]);
}
