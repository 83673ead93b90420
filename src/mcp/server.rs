//! Servidor MCP do Noema.
//!
//! Lê requests JSON-RPC do transporte, despacha para o `ToolHandler` e
//! escreve as respostas. Notificações nunca recebem resposta.

use std::io::{BufRead, Write};

use serde_json::{json, Value};

use crate::types::config::Config;
use crate::NoemaResult;

use super::protocol::{
    CallToolParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult,
};
use super::tools::ToolHandler;
use super::transport::{Incoming, LineTransport, StdioTransport};

/// Servidor MCP do Noema.
pub struct McpServer {
    tools: ToolHandler,
    initialized: bool,
}

impl McpServer {
    /// Cria um servidor com o motor aberto a partir da config.
    pub fn new(config: Config) -> NoemaResult<Self> {
        Ok(Self::with_handler(ToolHandler::new(config)?))
    }

    pub fn with_handler(tools: ToolHandler) -> Self {
        Self {
            tools,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Serve sobre stdin/stdout até o cliente fechar a conexão.
    pub async fn run(&mut self) -> NoemaResult<()> {
        let mut transport = StdioTransport::stdio();
        self.serve(&mut transport).await
    }

    /// Loop principal sobre qualquer transporte.
    pub async fn serve<R: BufRead, W: Write>(
        &mut self,
        transport: &mut LineTransport<R, W>,
    ) -> NoemaResult<()> {
        tracing::info!("Noema MCP server starting");

        loop {
            let incoming = match transport.read_message() {
                Ok(Some(incoming)) => incoming,
                Ok(None) => {
                    tracing::info!("Client disconnected");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read message");
                    break;
                }
            };

            let response = match incoming {
                Incoming::Request(request) => {
                    if request.is_notification() {
                        self.handle_notification(&request);
                        continue;
                    }
                    self.handle_request(request).await
                }
                Incoming::Malformed(detail) => {
                    JsonRpcResponse::error(None, JsonRpcError::parse_error(detail))
                }
            };

            if let Err(e) = transport.write_response(&response) {
                tracing::error!(error = %e, "Failed to write response");
                break;
            }
        }

        tracing::info!("Noema MCP server stopped");
        Ok(())
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" | "initialized" => {
                tracing::info!("Client initialization complete");
            }
            "notifications/cancelled" => {
                tracing::debug!("Client cancelled a request");
            }
            other => {
                tracing::debug!(method = other, "Ignoring notification");
            }
        }
    }

    /// Processa uma request JSON-RPC com id.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!(method = %request.method, "Handling request");

        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::error(request.id, JsonRpcError::invalid_request());
        }

        match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "initialized" | "notifications/initialized" => {
                JsonRpcResponse::success(request.id, json!({}))
            }
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "shutdown" => self.handle_shutdown(request),

            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request).await,

            _ => {
                JsonRpcResponse::error(request.id, JsonRpcError::method_not_found(&request.method))
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════════════════

    fn handle_initialize(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::info!("Client initializing connection");
        self.initialized = true;
        to_response(request, &InitializeResult::default())
    }

    fn handle_shutdown(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        tracing::info!("Client requested shutdown");
        self.initialized = false;
        JsonRpcResponse::success(request.id, Value::Null)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Tools
    // ═══════════════════════════════════════════════════════════════════════

    fn handle_tools_list(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let result = ListToolsResult {
            tools: ToolHandler::list_tools(),
        };
        to_response(request, &result)
    }

    async fn handle_tools_call(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: CallToolParams = match request.params.clone() {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        JsonRpcError::invalid_params(format!("Invalid params: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    JsonRpcError::invalid_params("Missing params"),
                );
            }
        };

        let result = self
            .tools
            .handle_tool_call(&params.name, params.arguments)
            .await;

        to_response(request, &result)
    }
}

/// Serializa o resultado ou responde com erro interno.
fn to_response<T: serde::Serialize>(request: JsonRpcRequest, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(request.id, value),
        Err(e) => JsonRpcResponse::error(
            request.id,
            JsonRpcError::internal_error(format!("Failed to serialize result: {}", e)),
        ),
    }
}
