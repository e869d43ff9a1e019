use claim::assert_some;
use serde_json::json;

use crate::helpers::{json_body, TestApp};

#[tokio::test]
async fn unsubscribe_returns_200_and_deactivates_the_subscriber() {
    let test_app = TestApp::spawn_app().await;
    let body = json!({ "email": "test@test.com" });
    test_app.post_subscribe(&body).await;

    let response = test_app.post_unsubscribe(&body).await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        json_body(response).await["message"],
        "Successfully unsubscribed from the newsletter."
    );
    let subscriber = test_app.subscribers().await.remove(0);
    assert!(!subscriber.active);
    assert_some!(subscriber.unsubscribed_at);
}

#[tokio::test]
async fn unsubscribe_returns_404_for_an_unknown_email() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .post_unsubscribe(&json!({ "email": "ghost@test.com" }))
        .await;

    assert_eq!(404, response.status().as_u16());
    assert_eq!(
        json_body(response).await["error"],
        "Email not found in subscribers list"
    );
}

#[tokio::test]
async fn unsubscribe_returns_409_when_already_unsubscribed() {
    let test_app = TestApp::spawn_app().await;
    let body = json!({ "email": "test@test.com" });
    test_app.post_subscribe(&body).await;
    test_app.post_unsubscribe(&body).await;

    let response = test_app.post_unsubscribe(&body).await;

    assert_eq!(409, response.status().as_u16());
    assert_eq!(
        json_body(response).await["error"],
        "Email is already unsubscribed"
    );
}

#[tokio::test]
async fn unsubscribe_returns_400_for_missing_or_invalid_email() {
    let test_app = TestApp::spawn_app().await;

    let test_cases = vec![
        (json!({}), "missing email"),
        (json!({ "email": "" }), "empty email"),
        (json!({ "email": "test.com" }), "invalid email"),
    ];

    for (invalid_body, description) in test_cases {
        let response = test_app.post_unsubscribe(&invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            description
        );
    }
}

#[tokio::test]
async fn unsubscribe_link_with_a_valid_token_returns_200() {
    let test_app = TestApp::spawn_app().await;
    let email = "first.last+news@test.com";
    test_app.post_subscribe(&json!({ "email": email })).await;
    let token = test_app.token_for(email);

    let response = test_app
        .get_unsubscribe(&[("token", token.as_str()), ("email", email)])
        .await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        json_body(response).await["message"],
        "Successfully unsubscribed from the newsletter."
    );
    assert!(!test_app.subscribers().await[0].active);
}

#[tokio::test]
async fn unsubscribe_link_returns_400_when_a_parameter_is_missing() {
    let test_app = TestApp::spawn_app().await;
    let token = test_app.token_for("test@test.com");

    let test_cases: Vec<(Vec<(&str, &str)>, &str)> = vec![
        (vec![], "no parameters"),
        (vec![("token", token.as_str())], "missing email"),
        (vec![("email", "test@test.com")], "missing token"),
        (vec![("token", ""), ("email", "test@test.com")], "empty token"),
    ];

    for (query, description) in test_cases {
        let response = test_app.get_unsubscribe(&query).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when the link had {}",
            description
        );
    }
}

#[tokio::test]
async fn unsubscribe_link_with_a_malformed_query_returns_a_json_error() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .get_unsubscribe(&[("token", "a"), ("token", "b"), ("email", "a@x.com")])
        .await;

    assert_eq!(400, response.status().as_u16());
    let body = json_body(response).await;
    assert!(
        body["error"].as_str().unwrap().contains("duplicate field"),
        "Unexpected error body: {}",
        body
    );
}

#[tokio::test]
async fn unsubscribe_link_returns_403_for_a_wrong_token_whether_or_not_the_email_exists() {
    let test_app = TestApp::spawn_app().await;
    test_app
        .post_subscribe(&json!({ "email": "test@test.com" }))
        .await;
    let other_token = test_app.token_for("other@test.com");

    for email in ["test@test.com", "ghost@test.com"] {
        let response = test_app
            .get_unsubscribe(&[("token", other_token.as_str()), ("email", email)])
            .await;

        assert_eq!(403, response.status().as_u16());
        assert_eq!(
            json_body(response).await["error"],
            "Invalid unsubscribe token"
        );
    }
    assert!(test_app.subscribers().await[0].active);
}

#[tokio::test]
async fn unsubscribe_link_returns_404_for_a_valid_token_of_an_unknown_email() {
    let test_app = TestApp::spawn_app().await;
    let token = test_app.token_for("ghost@test.com");

    let response = test_app
        .get_unsubscribe(&[("token", token.as_str()), ("email", "ghost@test.com")])
        .await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn full_subscription_lifecycle() {
    let test_app = TestApp::spawn_app().await;
    let body = json!({ "email": "a@x.com" });
    let token = test_app.token_for("a@x.com");

    assert_eq!(200, test_app.post_subscribe(&body).await.status().as_u16());
    assert_eq!(409, test_app.post_subscribe(&body).await.status().as_u16());
    assert_eq!(200, test_app.post_unsubscribe(&body).await.status().as_u16());
    assert_eq!(409, test_app.post_unsubscribe(&body).await.status().as_u16());

    // The link keeps working once the email is inactive
    let response = test_app
        .get_unsubscribe(&[("token", token.as_str()), ("email", "a@x.com")])
        .await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        json_body(response).await["message"],
        "You are already unsubscribed from the newsletter."
    );
}
