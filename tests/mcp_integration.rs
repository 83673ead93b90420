//! Testes de integração para o protocolo MCP do Noema.

use std::io::Cursor;

use serde_json::{json, Value};

use noema::atoms::{Atom, AtomType};
use noema::mcp::{LineTransport, McpServer, ToolHandler};
use noema::CognitiveEngine;

/// Helper para criar uma linha JSON-RPC.
fn jsonrpc_request(id: u64, method: &str, params: Option<Value>) -> String {
    let mut req = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
    });
    if let Some(p) = params {
        req["params"] = p;
    }
    serde_json::to_string(&req).unwrap()
}

fn tool_call(id: u64, name: &str, arguments: Value) -> String {
    jsonrpc_request(
        id,
        "tools/call",
        Some(json!({ "name": name, "arguments": arguments })),
    )
}

/// Executa uma sessão completa e devolve as respostas, uma por linha.
async fn run_session(server: &mut McpServer, lines: &[String]) -> Vec<Value> {
    let input = lines.join("\n") + "\n";
    let mut transport = LineTransport::new(Cursor::new(input.into_bytes()), Vec::new());

    server.serve(&mut transport).await.unwrap();

    let output = String::from_utf8(transport.into_writer()).unwrap();
    output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// Texto do primeiro bloco de um resultado de ferramenta, como JSON.
fn tool_payload(response: &Value) -> Value {
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    serde_json::from_str(text).unwrap()
}

fn memory_server() -> McpServer {
    McpServer::with_handler(ToolHandler::with_engine(CognitiveEngine::default()))
}

// Testes do protocolo MCP
mod protocol_tests {
    use noema::mcp::{
        JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse, ToolResult, INTERNAL_ERROR,
        INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION,
    };
    use serde_json::json;

    #[test]
    fn test_json_rpc_id_number() {
        let id = JsonRpcId::Number(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");

        let deserialized: JsonRpcId = serde_json::from_str("42").unwrap();
        assert_eq!(deserialized, JsonRpcId::Number(42));
    }

    #[test]
    fn test_json_rpc_id_string() {
        let deserialized: JsonRpcId = serde_json::from_str("\"req-7\"").unwrap();
        assert_eq!(deserialized, JsonRpcId::String("req-7".to_string()));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(PARSE_ERROR, -32700);
        assert_eq!(INVALID_REQUEST, -32600);
        assert_eq!(METHOD_NOT_FOUND, -32601);
        assert_eq!(INVALID_PARAMS, -32602);
        assert_eq!(INTERNAL_ERROR, -32603);
        assert!(!PROTOCOL_VERSION.is_empty());
    }

    #[test]
    fn test_error_response_shape() {
        let response =
            JsonRpcResponse::error(Some(JsonRpcId::Number(3)), JsonRpcError::method_not_found("x"));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["id"], 3);
        assert_eq!(value["error"]["code"], METHOD_NOT_FOUND);
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_notification_has_no_id() {
        let request = JsonRpcRequest::new("notifications/initialized", None);
        assert!(request.is_notification());

        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_tool_result_error_flag() {
        let ok = serde_json::to_value(ToolResult::success("done")).unwrap();
        assert!(ok.get("isError").is_none());
        assert_eq!(ok["content"][0]["type"], "text");

        let err = serde_json::to_value(ToolResult::error("bad")).unwrap();
        assert_eq!(err["isError"], json!(true));
    }
}

// Sessões completas sobre o transporte
mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_and_list_tools() {
        let mut server = memory_server();
        let responses = run_session(
            &mut server,
            &[
                jsonrpc_request(1, "initialize", Some(json!({"protocolVersion": "2024-11-05"}))),
                r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#.to_string(),
                jsonrpc_request(2, "tools/list", None),
            ],
        )
        .await;

        // notificação não gera resposta
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "noema");
        assert!(server.is_initialized());

        let tools = responses[1]["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), ToolHandler::list_tools().len());
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn test_atom_tools_session() {
        let mut server = memory_server();
        let responses = run_session(
            &mut server,
            &[
                tool_call(
                    1,
                    "noema_add_atom",
                    json!({"atom": {"id": "f1", "type": "FunctionNode", "name": "getUserData"}}),
                ),
                tool_call(
                    2,
                    "noema_add_atom",
                    json!({"atom": {"type": "ConceptNode", "name": "user"}}),
                ),
                tool_call(3, "noema_query_atoms", json!({"pattern": {"type": "FunctionNode"}})),
                tool_call(4, "noema_remove_atom", json!({"id": "f1"})),
                tool_call(5, "noema_atom_count", json!({})),
            ],
        )
        .await;

        assert_eq!(responses.len(), 5);
        assert_eq!(tool_payload(&responses[0])["id"], "f1");

        let query = tool_payload(&responses[2]);
        assert_eq!(query["count"], 1);
        assert_eq!(query["atoms"][0]["name"], "getUserData");

        assert_eq!(tool_payload(&responses[3])["removed"], true);
        assert_eq!(tool_payload(&responses[4])["size"], 1);
    }

    #[tokio::test]
    async fn test_reason_over_session_store() {
        let mut server = memory_server();
        let responses = run_session(
            &mut server,
            &[
                tool_call(
                    1,
                    "noema_add_atom",
                    json!({"atom": {
                        "type": "ConceptNode", "name": "rain",
                        "truthValue": {"strength": 0.9, "confidence": 0.8}
                    }}),
                ),
                tool_call(
                    2,
                    "noema_add_atom",
                    json!({"atom": {
                        "type": "ImplicationLink",
                        "outgoing": [
                            {"type": "ConceptNode", "name": "rain"},
                            {"type": "ConceptNode", "name": "wet"}
                        ],
                        "truthValue": {"strength": 0.8, "confidence": 0.9}
                    }}),
                ),
                tool_call(3, "noema_reason", json!({"type": "deductive"})),
                tool_call(4, "noema_reason", json!({"type": "telepathic"})),
            ],
        )
        .await;

        let deduced = tool_payload(&responses[2]);
        assert_eq!(deduced["conclusion"][0]["name"], "wet");
        assert!((deduced["confidence"].as_f64().unwrap() - 0.72).abs() < 1e-9);

        // Tipo desconhecido: resultado normal com confiança 0, não erro RPC
        assert!(responses[3].get("error").is_none());
        let unknown = tool_payload(&responses[3]);
        assert_eq!(unknown["confidence"], 0.0);
        assert_eq!(unknown["metadata"]["error"], true);
    }

    #[tokio::test]
    async fn test_learning_tools_session() {
        let mut server = memory_server();
        let responses = run_session(
            &mut server,
            &[
                tool_call(
                    1,
                    "noema_feedback",
                    json!({
                        "feedback": {"rating": 5, "helpful": true},
                        "context": {"userId": "ana", "task": "completion"}
                    }),
                ),
                tool_call(
                    2,
                    "noema_get_adaptation_strategy",
                    json!({"userId": "ana", "domain": "completion"}),
                ),
                tool_call(3, "noema_create_model", json!({"type": "classifier"})),
                tool_call(4, "noema_update_model", json!({"id": "model-99", "trainingData": []})),
                tool_call(5, "noema_learning_stats", json!({})),
            ],
        )
        .await;

        assert!(tool_payload(&responses[0])["sessionId"]
            .as_str()
            .unwrap()
            .starts_with("session-"));

        let strategy = tool_payload(&responses[1]);
        assert!((strategy["effectiveness"].as_f64().unwrap() - 0.6).abs() < 1e-9);

        assert_eq!(tool_payload(&responses[2])["version"], 1);

        let missing = &responses[3]["result"];
        assert_eq!(missing["isError"], true);
        assert!(missing["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("model-99"));

        assert_eq!(tool_payload(&responses[4])["totalRecords"], 1);
    }

    #[tokio::test]
    async fn test_feedback_with_invalid_rating_is_not_recorded() {
        let mut server = memory_server();
        let responses = run_session(
            &mut server,
            &[
                tool_call(
                    1,
                    "noema_feedback",
                    json!({
                        "feedback": {"rating": 0, "helpful": true},
                        "context": {"userId": "ana"}
                    }),
                ),
                tool_call(2, "noema_learning_stats", json!({})),
            ],
        )
        .await;

        assert_eq!(responses[0]["result"]["isError"], true);
        assert!(responses[0]["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("rating"));
        assert_eq!(tool_payload(&responses[1])["totalRecords"], 0);
    }

    #[tokio::test]
    async fn test_protocol_errors_in_session() {
        let mut server = memory_server();
        let responses = run_session(
            &mut server,
            &[
                "{ not json".to_string(),
                r#"{"jsonrpc":"1.0","id":"old","method":"ping"}"#.to_string(),
                jsonrpc_request(2, "resources/list", None),
                jsonrpc_request(3, "tools/call", None),
                tool_call(4, "noema_teleport", json!({})),
                jsonrpc_request(5, "ping", None),
            ],
        )
        .await;

        assert_eq!(responses.len(), 6);

        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[0]["error"]["code"], -32700);

        assert_eq!(responses[1]["id"], "old");
        assert_eq!(responses[1]["error"]["code"], -32600);

        assert_eq!(responses[2]["error"]["code"], -32601);
        assert_eq!(responses[3]["error"]["code"], -32602);

        // Ferramenta desconhecida é falha de ferramenta, não erro RPC
        assert_eq!(responses[4]["result"]["isError"], true);

        assert_eq!(responses[5]["result"], json!({}));
    }
}

// Hooks através do ToolHandler
mod hook_tests {
    use super::*;
    use async_trait::async_trait;
    use noema::hooks::{Hook, HookContext, HookEvent, HookResult};
    use noema::NoemaResult;

    struct SkipAll;

    #[async_trait]
    impl Hook for SkipAll {
        fn name(&self) -> &str {
            "skip-all"
        }

        fn event(&self) -> HookEvent {
            HookEvent::PreReason
        }

        async fn execute(&self, _context: &HookContext<'_>) -> NoemaResult<HookResult> {
            Ok(HookResult::Skip)
        }
    }

    #[tokio::test]
    async fn test_pre_reason_skip() {
        let mut engine = CognitiveEngine::default();
        engine.add_atom(Atom::node(AtomType::ConceptNode, "rain"));

        let mut handler = ToolHandler::with_engine(engine);
        handler.hooks_mut().register(Box::new(SkipAll));

        let result = handler
            .handle_tool_call("noema_reason", json!({"type": "deductive"}))
            .await;
        assert!(!result.is_error);

        let payload: Value = serde_json::from_str(result.text()).unwrap();
        assert_eq!(payload["explanation"], "Skipped by hook");
        assert_eq!(payload["confidence"], 0.0);
    }

    #[tokio::test]
    async fn test_status_reports_metrics() {
        let handler = ToolHandler::with_engine(CognitiveEngine::default());
        handler
            .handle_tool_call("noema_reason", json!({"type": "deductive"}))
            .await;

        let status = handler.handle_tool_call("noema_status", json!({})).await;
        let payload: Value = serde_json::from_str(status.text()).unwrap();

        assert_eq!(payload["engine"]["atoms"], 0);
        assert!(payload["hooks"].as_u64().unwrap() >= 2);
        assert_eq!(payload["metrics"]["totalReasonings"], 1);
    }
}
