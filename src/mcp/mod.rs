//! Servidor MCP do Noema.
//!
//! Expõe as operações do motor cognitivo como ferramentas MCP sobre
//! JSON-RPC 2.0, uma mensagem por linha em stdin/stdout.
//!
//! ## Ferramentas Expostas
//!
//! - `noema_*_atom(s)` - grafo de conhecimento (add, query, update, remove,
//!   count, clear, export, import)
//! - `noema_recognize_patterns` - reconhecimento de patterns
//! - `noema_reason` - raciocínio multi-estratégia
//! - `noema_learn`, `noema_feedback` e demais - aprendizado e adaptação
//! - `noema_status` - status do motor e métricas
//!
//! ## Exemplo de Uso
//!
//! ```ignore
//! use noema::mcp::McpServer;
//! use noema::types::config::Config;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load_or_default();
//!     let mut server = McpServer::new(config).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

mod protocol;
mod server;
mod tools;
mod transport;

pub use protocol::{
    CallToolParams, InitializeResult, JsonRpcError, JsonRpcId, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, ServerCapabilities, ServerInfo, ToolContent, ToolDescription, ToolResult,
    ToolsCapability, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR, PROTOCOL_VERSION,
};

pub use server::McpServer;
pub use tools::ToolHandler;
pub use transport::{Incoming, LineTransport, StdioTransport};
