//! CWE MCP - Common Weakness Enumeration lookup server
//!
//! Exposes MITRE's public CWE REST API as MCP tools: content version,
//! weakness, category and view lookups, hierarchy navigation and keyword
//! search.

pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod mcp;
pub mod models;
pub mod services;
pub mod transport;
