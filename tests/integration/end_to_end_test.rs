//! End-to-end tests: a small project on disk, parsed from its entry file
//! through includes down to evaluated requests and diagnostics.

use super::Workspace;
use rest_client_core::ast::{parse_document, Node};
use rest_client_core::language_server::{compute_diagnostics, provide_code_lens};
use rest_client_core::models::HttpMethod;
use rest_client_core::variables::{
    collect_definitions, collect_file_variables, scan_references, InMemoryRequestCache,
    ResponsePathResolver,
};
use std::collections::HashMap;

const SHARED: &str = "\
@host = https://api.example.com
@contentType = application/json
";

const USERS: &str = "\
@@include shared/vars.http

# @name listUsers
GET {{host}}/users?limit={{limit}} HTTP/1.1
Accept: {{contentType}}

###

// Create a user
POST {{host}}/users
Content-Type: {{contentType}}

{
  \"name\": \"Ada\"
}
";

fn project() -> Workspace {
    let workspace = Workspace::new();
    workspace
        .write("shared/vars.http", SHARED)
        .write("users.http", USERS);
    workspace
}

#[tokio::test]
async fn test_end_to_end_parse_workflow() {
    let workspace = project();
    let document = workspace.open("users.http");

    let tree = parse_document(&document).await.expect("Failed to parse project");

    let kinds: Vec<_> = tree.children.iter().map(Node::kind).collect();
    assert_eq!(kinds.len(), 3);
    assert_eq!(tree.includes().count(), 1);

    let requests: Vec<_> = tree.requests().collect();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].name.as_deref(), Some("listUsers"));
    assert_eq!(requests[1].name, None);

    let list = requests[0].request().expect("GET request should parse");
    assert_eq!(list.method, HttpMethod::GET);
    assert_eq!(list.url, "{{host}}/users?limit={{limit}}");
    assert_eq!(list.http_version.as_deref(), Some("HTTP/1.1"));
    assert_eq!(list.header("accept"), Some("{{contentType}}"));
    assert_eq!(list.file_path, workspace.path().join("users.http"));

    let create = requests[1].request().expect("POST request should parse");
    assert_eq!(create.method, HttpMethod::POST);
    assert!(create.body.as_deref().unwrap().contains("\"Ada\""));
}

#[tokio::test]
async fn test_end_to_end_variables_and_diagnostics() {
    let workspace = project();
    let document = workspace.open("users.http");
    let tree = parse_document(&document).await.unwrap();

    let variables = collect_file_variables(&tree);
    assert_eq!(variables.len(), 2);
    assert_eq!(variables["contentType"], "application/json");

    let definitions = collect_definitions(&tree, &HashMap::new());
    let references = scan_references(&document.text);
    assert_eq!(references.len(), 3);

    let diagnostics = compute_diagnostics(
        &document.uri,
        &definitions,
        &references,
        &InMemoryRequestCache::new(),
        &ResponsePathResolver,
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message, "limit is not found");
    assert_eq!(diagnostics[0].range.start.line, 3);

    let with_env = collect_definitions(
        &tree,
        &HashMap::from([("limit".to_string(), "10".to_string())]),
    );
    assert!(compute_diagnostics(
        &document.uri,
        &with_env,
        &references,
        &InMemoryRequestCache::new(),
        &ResponsePathResolver,
    )
    .is_empty());
}

#[tokio::test]
async fn test_end_to_end_code_lenses() {
    let workspace = project();
    let tree = parse_document(&workspace.open("users.http")).await.unwrap();

    let lenses = provide_code_lens(&tree);
    let lines: Vec<usize> = lenses.iter().map(|l| l.range.start.line).collect();
    assert_eq!(lines, vec![3, 9]);
}

#[tokio::test]
async fn test_end_to_end_included_file_edit_is_seen_on_reparse() {
    let workspace = project();
    let document = workspace.open("users.http");

    let before = collect_file_variables(&parse_document(&document).await.unwrap());
    assert_eq!(before["host"], "https://api.example.com");

    workspace.write("shared/vars.http", "@host = http://localhost:8080\n");
    let after = collect_file_variables(&parse_document(&document).await.unwrap());
    assert_eq!(after["host"], "http://localhost:8080");
    assert!(!after.contains_key("contentType"));
}
