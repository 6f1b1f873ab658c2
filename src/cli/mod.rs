//! CLI module for the CWE MCP server.
//!
//! Subcommands:
//! - `mcp`: Run the MCP server (stdio transport)
//! - `serve`: Run the MCP server (HTTP transport)

mod mcp;
mod serve;

use clap::{Parser, Subcommand};

/// CWE MCP - Common Weakness Enumeration lookup tools
#[derive(Parser)]
#[command(name = "cwe-mcp")]
#[command(about = "MCP server exposing MITRE's CWE REST API as tools")]
#[command(version)]
pub struct App {
    /// Run in verbose mode
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the MCP server (stdio transport for local use)
    Mcp,

    /// Run the MCP server (HTTP transport for remote access)
    Serve {
        /// Host address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value = "3000")]
        port: u16,
    },
}

impl App {
    /// Run the CLI application.
    pub async fn run(self) -> color_eyre::Result<()> {
        match self.command {
            Command::Mcp => self.run_mcp().await,
            Command::Serve { ref host, port } => self.run_serve(host, port).await,
        }
    }
}
