use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use remote_collection::{
    ApiConfig, Collection, HttpTransport, Method, Params, Payload, ResponseMode, Transport, params,
};
use serde_json::json;

fn transport_for(server: &mockito::Server) -> HttpTransport {
    let config = ApiConfig::default().with_api_base(format!("{}/1.0", server.url()));
    HttpTransport::with_config(&config).unwrap()
}

#[tokio::test]
async fn test_get_resolves_relative_url_and_sends_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/1.0/accounts/1/lists")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ws.start".into(), "100".into()),
            Matcher::UrlEncoded("ws.size".into(), "100".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"start": 100, "entries": [], "total_size": 100}"#)
        .create_async()
        .await;

    let transport = transport_for(&server);
    let payload = transport
        .request(
            Method::Get,
            "/accounts/1/lists",
            &params([("ws.start", "100"), ("ws.size", "100")]),
            ResponseMode::Body,
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(
        payload,
        Payload::Body(json!({"start": 100, "entries": [], "total_size": 100}))
    );
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_post_sends_form_and_returns_headers() {
    let mut server = mockito::Server::new_async().await;
    let location = format!("{}/1.0/accounts/1/lists/9", server.url());
    let mock = server
        .mock("POST", "/1.0/accounts/1/lists")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ws.op".into(), "create".into()),
            Matcher::UrlEncoded("name".into(), "weekly".into()),
        ]))
        .with_status(201)
        .with_header("Location", &location)
        .create_async()
        .await;

    let transport = transport_for(&server);
    let payload = transport
        .request(
            Method::Post,
            "/accounts/1/lists",
            &params([("ws.op", "create"), ("name", "weekly")]),
            ResponseMode::Headers,
        )
        .await
        .unwrap();

    mock.assert_async().await;
    let headers = payload.into_headers().unwrap();
    assert_eq!(headers.get("location"), Some(&location));
}

#[tokio::test]
async fn test_absolute_url_is_not_prefixed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/elsewhere")
        .with_header("content-type", "application/json")
        .with_body("7")
        .create_async()
        .await;

    let transport = transport_for(&server);
    let url = format!("{}/elsewhere", server.url());
    let payload = transport
        .request(Method::Get, &url, &Params::new(), ResponseMode::Body)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(payload.into_body(), Some(json!(7)));
}

#[tokio::test]
async fn test_error_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/1.0/accounts")
        .with_status(404)
        .with_body("not found")
        .create_async()
        .await;

    let transport = transport_for(&server);
    let err = transport
        .request(Method::Get, "/accounts", &Params::new(), ResponseMode::Body)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_connection_failure_is_retried_then_reported() {
    let config = ApiConfig {
        api_base: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(2),
        max_retry: 2,
        ..ApiConfig::default()
    };
    let transport = HttpTransport::with_config(&config).unwrap();

    let result = transport
        .request(Method::Get, "/accounts", &Params::new(), ResponseMode::Body)
        .await;

    assert!(result.is_err());
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_collection_pages_over_http() {
    let mut server = mockito::Server::new_async().await;
    let base = format!("{}/1.0", server.url());
    let lists_url = format!("{base}/accounts/1/lists");

    let entries = |start: usize, end: usize| -> Vec<serde_json::Value> {
        (start..end)
            .map(|i| json!({"id": i, "self_link": format!("{lists_url}/{i}")}))
            .collect()
    };

    let first = server
        .mock("GET", "/1.0/accounts/1/lists")
        .match_query(Matcher::Exact(String::new()))
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "start": 0,
                "entries": entries(0, 2),
                "total_size": 5,
                "next_collection_link": format!("{lists_url}?ws.start=2&ws.size=2"),
            })
            .to_string(),
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", "/1.0/accounts/1/lists")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("ws.start".into(), "4".into()),
            Matcher::UrlEncoded("ws.size".into(), "2".into()),
        ]))
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "start": 4,
                "entries": entries(4, 5),
                "total_size": 5,
                "prev_collection_link": format!("{lists_url}?ws.start=2&ws.size=2"),
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let transport = Arc::new(transport_for(&server));
    let mut lists = Collection::load(Arc::clone(&transport), "/accounts/1/lists")
        .await
        .unwrap();

    let last = lists.get(4).await.unwrap();
    assert_eq!(last.url(), "/accounts/1/lists/4");
    assert!(Arc::ptr_eq(&last, &lists.get(4).await.unwrap()));
    assert_eq!(lists.page_size(), 2);

    first.assert_async().await;
    second.assert_async().await;
    assert_eq!(transport.request_count(), 2);
}
