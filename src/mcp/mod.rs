//! Model Context Protocol (MCP) server implementation for CWE lookups.
//!
//! ## Modules
//!
//! - `server`: MCP server implementation with tool router
//! - `protocol`: Result and error envelopes returned by every tool
//! - `tools`: Tool implementations organized by domain

pub mod protocol;
pub(crate) mod server;
pub mod tools;

pub use server::McpServer;
