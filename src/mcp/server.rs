//! Stdio server - newline-delimited JSON-RPC over stdin/stdout
//!
//! Provides:
//! - Framed line reader over any `AsyncRead`
//! - One spawned task per request
//! - A single writer task that owns the output stream
//!
//! Nothing but protocol messages is ever written to the output stream.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::codec::{FramedRead, FramedWrite};

use super::codec::{Frame, NdJsonCodec};
use super::handler::McpHandler;
use super::messages::{JsonRpcResponse, RpcError};
use crate::error::{KaliMcpError, Result};

/// Capacity of the response channel feeding the writer task
const RESPONSE_CHANNEL_CAPACITY: usize = 256;

pub struct StdioServer {
    handler: Arc<McpHandler>,
    max_message_bytes: usize,
}

impl StdioServer {
    pub fn new(handler: McpHandler, max_message_bytes: usize) -> Self {
        Self {
            handler: Arc::new(handler),
            max_message_bytes,
        }
    }

    /// Serve on the process's stdin/stdout until stdin closes
    pub async fn run(&self) -> Result<()> {
        log::info!("Kali MCP server running on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve on an arbitrary reader/writer pair until the reader hits EOF
    ///
    /// In-flight requests are drained before returning so every request
    /// read gets its response written.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<JsonRpcResponse>(RESPONSE_CHANNEL_CAPACITY);

        let max = self.max_message_bytes;
        let writer_task = tokio::spawn(async move {
            let mut sink = FramedWrite::new(writer, NdJsonCodec::<JsonRpcResponse>::with_max_length(max));
            while let Some(response) = rx.recv().await {
                if let Err(e) = sink.send(response).await {
                    log::error!("Failed to write response: {}", e);
                    return Err(KaliMcpError::Transport(format!("Failed to write response: {}", e)));
                }
            }
            Ok(())
        });

        let mut frames = FramedRead::new(reader, NdJsonCodec::<Value>::with_max_length(max));
        let mut tasks = JoinSet::new();
        let mut read_error = None;

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(Frame::Message(value)) => {
                    let handler = Arc::clone(&self.handler);
                    let tx = tx.clone();
                    tasks.spawn(async move {
                        if let Some(response) = handler.handle_value(value).await {
                            // Writer gone means output is closed; nothing left to do
                            let _ = tx.send(response).await;
                        }
                    });
                }
                Ok(Frame::Malformed(reason)) => {
                    log::warn!("{}", reason);
                    let response = JsonRpcResponse::error(None, RpcError::parse_error(reason));
                    if tx.send(response).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    log::error!("Failed to read from input: {}", e);
                    read_error = Some(KaliMcpError::Transport(format!("Failed to read input: {}", e)));
                    break;
                }
            }

            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = joined {
                    log::error!("Request task failed: {}", e);
                }
            }
        }

        log::info!("Input closed, waiting for {} in-flight requests", tasks.len());
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                log::error!("Request task failed: {}", e);
            }
        }

        drop(tx);
        let written = writer_task
            .await
            .map_err(|e| KaliMcpError::Transport(format!("Writer task failed: {}", e)))?;

        match read_error {
            Some(e) => Err(e),
            None => written,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Toolset;
    use crate::tools::{ToolRegistry, test_context};
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    fn server() -> StdioServer {
        let handler = McpHandler::new(ToolRegistry::for_toolsets(&[Toolset::Encoding]), test_context(|_| {}));
        StdioServer::new(handler, 1024 * 1024)
    }

    async fn exchange(input: &str) -> Vec<Value> {
        let (mut client, server_io) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server_io);

        let srv = server();
        let serve = tokio::spawn(async move { srv.serve(server_read, server_write).await });

        client.write_all(input.as_bytes()).await.unwrap();
        client.shutdown().await.unwrap();

        serve.await.unwrap().unwrap();

        let mut lines = BufReader::new(client).lines();
        let mut out = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            out.push(serde_json::from_str(&line).unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_serve_ping() {
        let out = exchange("{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n").await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["id"], 1);
        assert_eq!(out[0]["result"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_serve_malformed_then_valid() {
        let out = exchange("this is not json\n{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n").await;

        assert_eq!(out.len(), 2);
        let parse_error = out.iter().find(|v| v["id"].is_null()).unwrap();
        assert_eq!(parse_error["error"]["code"], -32700);
        assert!(out.iter().any(|v| v["id"] == 2));
    }

    #[tokio::test]
    async fn test_serve_notification_writes_nothing() {
        let out = exchange("{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n").await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_serve_unterminated_last_line() {
        let out = exchange("{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"ping\"}").await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0]["id"], 3);
    }

    #[tokio::test]
    async fn test_serve_responses_keep_ids() {
        let input = (1..=5)
            .map(|i| {
                format!(
                    "{{\"jsonrpc\":\"2.0\",\"id\":{},\"method\":\"tools/call\",\"params\":{{\"name\":\"base64_encode\",\"arguments\":{{\"content\":\"n{}\"}}}}}}\n",
                    i, i
                )
            })
            .collect::<String>();

        let out = exchange(&input).await;
        assert_eq!(out.len(), 5);

        let mut ids: Vec<i64> = out.iter().map(|v| v["id"].as_i64().unwrap()).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        for v in &out {
            assert_eq!(v["result"]["isError"], false);
        }
    }
}
