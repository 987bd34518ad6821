use serde_json::json;
use substack_api::{
    ApiClient, ClientConfig, ErrorKind, SubstackError, User, resolve_handle_redirect_with,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new().with_api_root(server.uri())
}

fn user(server: &MockServer, handle: &str) -> User {
    User::with_config(handle, None, true, config(server)).unwrap()
}

fn profile_json(id: i64, handle: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Jane Writer",
        "handle": handle,
        "bio": "Writes things",
        "is_writer": true,
        "is_subscriber": false,
        "follower_count": 120
    })
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_profile_follows_redirect() {
    let server = MockServer::start().await;

    mount(&server, "/api/v1/users/old", ResponseTemplate::new(404), 1).await;
    mount(
        &server,
        "/api/v1/users/old/redirect",
        ResponseTemplate::new(200).set_body_json(json!({"new_handle": "new"})),
        1,
    )
    .await;
    mount(
        &server,
        "/api/v1/users/new",
        ResponseTemplate::new(200).set_body_json(json!({"user": profile_json(5, "new")})),
        1,
    )
    .await;

    let user = user(&server, "old");
    let profile = user.get_profile().await.unwrap();

    assert_eq!(profile.id, 5);
    assert_eq!(user.username(), "new");
    assert_eq!(user.original_username(), "old");
    assert!(user.was_redirected());

    // cached: no further requests
    assert_eq!(user.name().await.unwrap(), "Jane Writer");
    assert_eq!(user.follower_count().await.unwrap(), Some(120));
    assert!(user.is_writer().await.unwrap());
}

#[tokio::test]
async fn test_missing_redirect_keeps_original_error() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/api/v1/users/gone",
        ResponseTemplate::new(404).set_body_json(json!({"message": "User gone not found"})),
        1,
    )
    .await;
    mount(
        &server,
        "/api/v1/users/gone/redirect",
        ResponseTemplate::new(200).set_body_json(json!({})),
        1,
    )
    .await;

    let user = user(&server, "gone");
    let err = user.get_profile().await.unwrap_err();

    assert_eq!(err, SubstackError::not_found("User gone not found"));
    assert!(!user.was_redirected());
    assert_eq!(user.username(), "gone");
}

#[tokio::test]
async fn test_redirect_endpoint_not_found_means_no_redirect() {
    let server = MockServer::start().await;

    mount(&server, "/api/v1/users/gone/raw", ResponseTemplate::new(404), 1).await;
    mount(&server, "/api/v1/users/gone/redirect", ResponseTemplate::new(404), 1).await;

    let user = user(&server, "gone");
    let err = user.get_raw_data().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!user.was_redirected());
}

#[tokio::test]
async fn test_redirect_followed_at_most_once_per_call() {
    let server = MockServer::start().await;

    mount(&server, "/api/v1/users/old", ResponseTemplate::new(404), 1).await;
    mount(
        &server,
        "/api/v1/users/old/redirect",
        ResponseTemplate::new(200).set_body_json(json!({"new_handle": "newer"})),
        1,
    )
    .await;
    mount(&server, "/api/v1/users/newer", ResponseTemplate::new(404), 1).await;

    let user = user(&server, "old");
    let err = user.get_profile().await.unwrap_err();

    assert!(err.is_not_found());
    assert!(user.was_redirected());
    assert_eq!(user.username(), "newer");
}

#[tokio::test]
async fn test_redirect_disabled() {
    let server = MockServer::start().await;

    mount(&server, "/api/v1/users/old", ResponseTemplate::new(404), 1).await;
    mount(
        &server,
        "/api/v1/users/old/redirect",
        ResponseTemplate::new(200).set_body_json(json!({"new_handle": "new"})),
        0,
    )
    .await;

    let user = User::with_config("old", None, false, config(&server)).unwrap();
    let err = user.get_profile().await.unwrap_err();

    assert!(err.is_not_found());
    assert!(!user.was_redirected());
}

#[tokio::test]
async fn test_other_errors_skip_redirect() {
    let server = MockServer::start().await;

    mount(&server, "/api/v1/users/busy", ResponseTemplate::new(429), 1).await;
    mount(
        &server,
        "/api/v1/users/busy/redirect",
        ResponseTemplate::new(200).set_body_json(json!({"new_handle": "new"})),
        0,
    )
    .await;

    let err = user(&server, "busy").get_profile().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RateLimit);
}

#[tokio::test]
async fn test_redirect_endpoint_failure_keeps_original_error() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/api/v1/users/old",
        ResponseTemplate::new(404).set_body_json(json!({"message": "No user old"})),
        1,
    )
    .await;
    mount(&server, "/api/v1/users/old/redirect", ResponseTemplate::new(503), 1).await;
    mount(&server, "/api/v1/users/limited/raw", ResponseTemplate::new(404), 1).await;
    mount(&server, "/api/v1/users/limited/redirect", ResponseTemplate::new(429), 1).await;

    let user_old = user(&server, "old");
    let err = user_old.get_profile().await.unwrap_err();
    assert_eq!(err, SubstackError::not_found("No user old"));
    assert!(!user_old.was_redirected());
    assert_eq!(user_old.username(), "old");

    let limited = user(&server, "limited");
    let err = limited.get_raw_data().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(!limited.was_redirected());
}

#[tokio::test]
async fn test_later_calls_restart_from_original_handle() {
    let server = MockServer::start().await;

    mount(&server, "/api/v1/users/old/raw", ResponseTemplate::new(404), 1).await;
    mount(
        &server,
        "/api/v1/users/old/redirect",
        ResponseTemplate::new(200).set_body_json(json!({"new_handle": "new"})),
        2,
    )
    .await;
    mount(&server, "/api/v1/users/new/raw", ResponseTemplate::new(404), 3).await;

    let user = user(&server, "old");

    // first call: old -> redirect -> new, which is also missing
    assert!(user.get_raw_data().await.unwrap_err().is_not_found());
    assert_eq!(user.username(), "new");

    // second call: new is missing, redirect is looked up for "old" again and
    // "new" is retried once more
    assert!(user.get_raw_data().await.unwrap_err().is_not_found());
    assert!(user.was_redirected());
}

#[tokio::test]
async fn test_raw_data_and_subscriptions() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/api/v1/users/jane/raw",
        ResponseTemplate::new(200).set_body_json(json!({"id": 5, "publicationUsers": []})),
        1,
    )
    .await;
    mount(
        &server,
        "/api/v1/users/jane/subscriptions",
        ResponseTemplate::new(200).set_body_json(json!({
            "subscriptions": [{
                "id": 1,
                "publication_id": 2,
                "publication_name": "Example",
                "publication_subdomain": "example",
                "subscription_type": "paid",
                "created_at": "2024-01-01",
                "status": "active"
            }]
        })),
        1,
    )
    .await;

    let user = user(&server, "jane");
    let raw = user.get_raw_data().await.unwrap();
    assert_eq!(raw["id"], 5);

    let subscriptions = user.get_subscriptions().await.unwrap();
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0].publication_subdomain, "example");
}

#[tokio::test]
async fn test_subscriptions_not_found() {
    let server = MockServer::start().await;

    mount(&server, "/api/v1/users/nobody/subscriptions", ResponseTemplate::new(404), 1).await;
    mount(&server, "/api/v1/users/nobody/redirect", ResponseTemplate::new(200), 0).await;

    let err = user(&server, "nobody").get_subscriptions().await.unwrap_err();
    assert_eq!(err, SubstackError::not_found("User not found: nobody"));
}

#[tokio::test]
async fn test_standalone_probe() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/api/v1/users/old/redirect",
        ResponseTemplate::new(200).set_body_json(json!({"new_handle": "new"})),
        1,
    )
    .await;
    mount(&server, "/api/v1/users/broken/redirect", ResponseTemplate::new(500), 1).await;
    mount(
        &server,
        "/api/v1/users/same/redirect",
        ResponseTemplate::new(200).set_body_json(json!({"new_handle": null})),
        1,
    )
    .await;

    let client = ApiClient::with_config(config(&server), None).unwrap();

    assert_eq!(
        resolve_handle_redirect_with(&client, "old").await,
        Some("new".to_string())
    );
    assert_eq!(resolve_handle_redirect_with(&client, "broken").await, None);
    assert_eq!(resolve_handle_redirect_with(&client, "same").await, None);

    let unreachable =
        ApiClient::with_config(ClientConfig::new().with_api_root("http://127.0.0.1:1"), None)
            .unwrap();
    assert_eq!(resolve_handle_redirect_with(&unreachable, "old").await, None);
}
