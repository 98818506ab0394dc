//! MCP transport and protocol - JSON-RPC 2.0 over newline-delimited stdio
//!
//! The server reads one message per line, handles each request on its own
//! task, and funnels responses through a single writer.

pub mod codec;
pub mod handler;
pub mod messages;
pub mod server;

pub use codec::{Frame, NdJsonCodec};
pub use handler::McpHandler;
pub use messages::{
    CallToolResult, ErrorCode, JsonRpcRequest, JsonRpcResponse, Methods, PROTOCOL_VERSION, RequestId, RpcError,
    SERVER_NAME,
};
pub use server::StdioServer;
