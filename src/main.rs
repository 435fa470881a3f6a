//! Gemini Image MCP Server
//!
//! MCP server that generates images from text prompts using the Gemini API
//! and replies with the paths of locally saved files.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use gemini_image_mcp::{
    ArtifactStore, Config, GeminiClient, GenerateHandler, ImageServer, McpServerBuilder,
    TransportArgs,
};

/// Command-line arguments for the image server.
#[derive(Parser, Debug)]
#[command(name = "gemini-image-mcp")]
#[command(about = "MCP server for image generation using Gemini")]
struct Args {
    /// Transport configuration
    #[command(flatten)]
    transport: TransportArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr: in stdio mode stdout carries the MCP protocol
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("gemini-image-mcp server starting...");

    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        output_dir = %config.output_dir.display(),
        model = %config.model,
        "Configuration loaded"
    );

    // An unusable output directory should fail startup, not the first tool call
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create output directory {}",
                config.output_dir.display()
            )
        })?;

    // Create the server handler
    let client = Arc::new(GeminiClient::new(&config));
    let store = ArtifactStore::new(config.output_dir.clone());
    let server = ImageServer::new(GenerateHandler::new(client, store));

    // Build and run the MCP server
    McpServerBuilder::new(server)
        .with_transport(args.transport.into_transport())
        .run()
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
