//! Transporte MCP por JSON delimitado por newline.
//!
//! Cada mensagem é um objeto JSON-RPC 2.0 completo em uma única linha:
//!
//! ```text
//! {"jsonrpc":"2.0","id":1,"method":"initialize","params":{...}}\n
//! {"jsonrpc":"2.0","id":1,"result":{...}}\n
//! ```
//!
//! O transporte é genérico sobre leitor e escritor; o servidor usa
//! stdin/stdout e os testes usam buffers em memória.

use std::io::{BufRead, BufReader, BufWriter, Stdin, Stdout, Write};

use crate::NoemaResult;

use super::protocol::{JsonRpcRequest, JsonRpcResponse};

/// Uma mensagem lida do cliente.
#[derive(Debug)]
pub enum Incoming {
    Request(JsonRpcRequest),
    /// Linha que não é JSON-RPC válido.
    Malformed(String),
}

/// Transporte newline-delimited sobre qualquer par leitor/escritor.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// Transporte sobre stdin/stdout.
pub type StdioTransport = LineTransport<BufReader<Stdin>, BufWriter<Stdout>>;

impl StdioTransport {
    pub fn stdio() -> Self {
        LineTransport::new(
            BufReader::new(std::io::stdin()),
            BufWriter::new(std::io::stdout()),
        )
    }
}

impl<R: BufRead, W: Write> LineTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Lê a próxima mensagem, pulando linhas em branco.
    ///
    /// Retorna `None` em EOF.
    pub fn read_message(&mut self) -> NoemaResult<Option<Incoming>> {
        let mut line = String::new();

        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let incoming = match serde_json::from_str::<JsonRpcRequest>(trimmed) {
                Ok(request) => {
                    tracing::debug!(
                        method = %request.method,
                        id = ?request.id,
                        "Received request"
                    );
                    Incoming::Request(request)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Malformed JSON-RPC message");
                    Incoming::Malformed(e.to_string())
                }
            };
            return Ok(Some(incoming));
        }
    }

    /// Escreve uma resposta como JSON compacto seguido de `\n`.
    pub fn write_response(&mut self, response: &JsonRpcResponse) -> NoemaResult<()> {
        let body = serde_json::to_string(response)?;

        self.writer.write_all(body.as_bytes())?;
        self.writer.write_all(b"\n")?;
        // Sem flush o cliente fica esperando a resposta
        self.writer.flush()?;

        tracing::debug!(
            id = ?response.id,
            is_error = response.is_error(),
            "Sent response"
        );

        Ok(())
    }

    /// Devolve o escritor, consumindo o transporte.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::JsonRpcId;
    use serde_json::json;
    use std::io::Cursor;

    fn transport(input: &str) -> LineTransport<Cursor<Vec<u8>>, Vec<u8>> {
        LineTransport::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn expect_request(incoming: Option<Incoming>) -> JsonRpcRequest {
        match incoming {
            Some(Incoming::Request(request)) => request,
            other => panic!("expected request, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_messages_and_blank_lines() {
        let mut t = transport(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n"
        ));

        let first = expect_request(t.read_message().unwrap());
        assert_eq!(first.method, "initialize");
        assert_eq!(first.id, Some(JsonRpcId::Number(1)));

        let second = expect_request(t.read_message().unwrap());
        assert_eq!(second.method, "tools/list");

        assert!(t.read_message().unwrap().is_none());
    }

    #[test]
    fn test_empty_input_is_eof() {
        assert!(transport("").read_message().unwrap().is_none());
        assert!(transport("\n\n").read_message().unwrap().is_none());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let mut t = transport("not valid json\n");
        assert!(matches!(t.read_message().unwrap(), Some(Incoming::Malformed(_))));
    }

    #[test]
    fn test_write_response_single_line() {
        let mut t = transport("");
        let response = JsonRpcResponse::success(Some(1.into()), json!({"status": "ok"}));
        t.write_response(&response).unwrap();

        let output = String::from_utf8(t.into_writer()).unwrap();
        assert!(output.ends_with('\n'));
        assert_eq!(output.lines().count(), 1);

        let parsed: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(parsed["jsonrpc"], "2.0");
        assert_eq!(parsed["result"]["status"], "ok");
    }
}
