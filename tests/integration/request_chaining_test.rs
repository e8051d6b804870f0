//! Request chaining integration tests
//!
//! A login request is "sent" by placing its result in the cache; later
//! requests that read the login response through request variables are
//! rechecked across every open document.

use super::Workspace;
use rest_client_core::ast::{DocumentParser, FsLoader, RequestNode};
use rest_client_core::language_server::diagnostics::{
    REQUEST_NOT_SENT, REQUEST_VARIABLE_UNRESOLVED,
};
use rest_client_core::language_server::{DiagnosticSeverity, VariableDiagnosticsProvider};
use rest_client_core::models::{HttpRequest, HttpResponse, TextDocument};
use rest_client_core::variables::{
    InMemoryRequestCache, RequestVariableCacheKey, RequestVariableCacheValue,
};
use serde_json::json;
use std::sync::Arc;

const AUTH: &str = "\
@host = https://api.example.com
@password = hunter2
";

const ORDERS: &str = "\
@@include auth.http

# @name login
POST {{host}}/login
Content-Type: application/json

{\"user\": \"ada\", \"password\": \"{{password}}\"}

###

GET {{host}}/orders
Authorization: Bearer {{login.response.body.$.token}}
X-Request-Id: {{login.response.headers.X-Request-Id}}

###

GET {{host}}/orders/{{login.response.body.$.lastOrder.id}}
Authorization: Bearer {{login.response.body.$.token}}
";

const BILLING: &str = "\
@@include auth.http

# @name login
POST {{host}}/login

###

GET {{host}}/bills?t={{login.response.body.$.token}}
";

fn login_response() -> HttpResponse {
    let mut response = HttpResponse::new(200, "OK".to_string());
    response.add_header(
        "content-type".to_string(),
        "application/json; charset=utf-8".to_string(),
    );
    response.add_header("x-request-id".to_string(), "req-42".to_string());
    response.set_body(json!({"token": "abc123", "user": {"id": 7}}).to_string());
    response
}

fn provider(cache: &InMemoryRequestCache) -> VariableDiagnosticsProvider<FsLoader> {
    VariableDiagnosticsProvider::new(DocumentParser::new(FsLoader), Arc::new(cache.clone()))
}

/// Mimics the client reporting that `login` was executed from `document`.
async fn send_login(
    provider: &VariableDiagnosticsProvider<FsLoader>,
    cache: &InMemoryRequestCache,
    document: &TextDocument,
) -> HttpRequest {
    let tree = provider.parser().parse(document).await.unwrap();
    let login: &RequestNode = tree
        .requests()
        .find(|r| r.name.as_deref() == Some("login"))
        .expect("document declares login");
    let request = login.request().expect("login should parse").clone();

    cache.insert(
        RequestVariableCacheKey::new("login", document.uri.clone()),
        RequestVariableCacheValue::new(request.clone(), login_response()),
    );
    request
}

#[tokio::test]
async fn test_request_chaining_before_and_after_send() {
    let workspace = Workspace::new();
    workspace.write("auth.http", AUTH).write("orders.http", ORDERS);
    let orders = workspace.open("orders.http");

    let cache = InMemoryRequestCache::new();
    let provider = provider(&cache);

    let pending = provider.check_variables(&orders).await.unwrap();
    assert_eq!(pending.len(), 4);
    assert!(pending
        .iter()
        .all(|d| d.code.as_deref() == Some(REQUEST_NOT_SENT)));

    let request = send_login(&provider, &cache, &orders).await;
    assert_eq!(request.url, "{{host}}/login");
    assert!(request.body.as_deref().unwrap().contains("{{password}}"));

    let resolved = provider.check_variables(&orders).await.unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].code.as_deref(), Some(REQUEST_VARIABLE_UNRESOLVED));
    assert_eq!(resolved[0].severity, DiagnosticSeverity::Warning);
    assert_eq!(resolved[0].range.start.line, 16);
    assert_eq!(provider.collection().get(&orders.uri), resolved);
}

#[tokio::test]
async fn test_request_results_are_scoped_to_the_sending_document() {
    let workspace = Workspace::new();
    workspace
        .write("auth.http", AUTH)
        .write("orders.http", ORDERS)
        .write("billing.http", BILLING);
    let orders = workspace.open("orders.http");
    let billing = workspace.open("billing.http");

    let cache = InMemoryRequestCache::new();
    let provider = provider(&cache);
    send_login(&provider, &cache, &orders).await;

    let results = provider.check_all([&orders, &billing]).await;
    assert_eq!(results.len(), 2);

    let (uri, billing_diagnostics) = &results[1];
    assert_eq!(uri, &billing.uri);
    assert_eq!(billing_diagnostics.len(), 1);
    assert_eq!(
        billing_diagnostics[0].message,
        "Request 'login' has not been sent"
    );
}

#[tokio::test]
async fn test_check_all_skips_documents_with_broken_includes() {
    let workspace = Workspace::new();
    workspace
        .write("auth.http", AUTH)
        .write("orders.http", ORDERS)
        .write("broken.http", "@@include missing.http\nGET {{nothing}}\n");
    let orders = workspace.open("orders.http");
    let broken = workspace.open("broken.http");

    let cache = InMemoryRequestCache::new();
    let provider = provider(&cache);

    let results = provider.check_all([&broken, &orders]).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, orders.uri);
    assert!(provider.collection().get(&broken.uri).is_empty());
}

#[tokio::test]
async fn test_forgetting_a_sent_request_restores_not_sent_diagnostics() {
    let workspace = Workspace::new();
    workspace.write("auth.http", AUTH).write("orders.http", ORDERS);
    let orders = workspace.open("orders.http");

    let cache = InMemoryRequestCache::new();
    let provider = provider(&cache);
    send_login(&provider, &cache, &orders).await;
    assert_eq!(provider.check_variables(&orders).await.unwrap().len(), 1);

    cache.remove_document(&orders.uri);
    assert!(cache.is_empty());

    let diagnostics = provider.check_variables(&orders).await.unwrap();
    assert_eq!(diagnostics.len(), 4);
}
