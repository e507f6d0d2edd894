use gateway_core::GatewayConfig;
use gateway_test::TestApp;
use serde_json::json;

const YAML: &str = r#"
mcp:
  enabled: true
schema:
  Customer:
    name: "string!"
    email: "string"
"#;

fn test_app() -> TestApp {
    let config = GatewayConfig::from_yaml(YAML).unwrap();
    let router = gateway::GatewayBuilder::new(config).build().unwrap();
    TestApp::new(router)
}

#[tokio::test]
async fn create_then_get_a_customer() {
    let app = test_app();

    let created = app.post_json("/customers", &json!({"name": "Ada Lovelace"})).await.assert_created();
    let body: serde_json::Value = created.json();
    let id = body["data"]["id"].as_str().expect("created document has an id").to_string();

    app.get(&format!("/customers/{id}")).await.assert_ok();
}

#[tokio::test]
async fn list_empty_collection_returns_ok_with_empty_data() {
    let app = test_app();
    let res = app.get("/customers").await.assert_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["customers"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn get_missing_customer_is_not_found() {
    let app = test_app();
    app.get("/customers/does-not-exist").await.assert_not_found();
}

#[tokio::test]
async fn healthz_reports_up() {
    let app = test_app();
    let res = app.get("/healthz").await.assert_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["status"], "UP");
}

#[tokio::test]
async fn mcp_tools_list_includes_derived_customer_tools() {
    let app = test_app();
    let res = app
        .post_json("/mcp", &json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list", "params": {}}))
        .await
        .assert_ok();
    let body: serde_json::Value = res.json();
    let names: Vec<&str> = body["result"]["tools"].as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"customer.create"));
    assert!(names.contains(&"customer.list"));
}

#[tokio::test]
async fn mcp_tools_call_on_a_route_only_tool_is_a_server_error() {
    let app = test_app();
    let res = app
        .post_json(
            "/mcp",
            &json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "customer.list", "arguments": {}}}),
        )
        .await;
    res.assert_status(http::StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn security_headers_are_present_on_every_response() {
    let app = test_app();
    let res = app.get("/healthz").await;
    assert_eq!(res.headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(res.headers.get("x-frame-options").unwrap(), "DENY");
}
