//! Gemini Image MCP Server Library
//!
//! This library provides an MCP server exposing a single tool that generates
//! images from text prompts via the Gemini API, saves them to a configured
//! local directory, and returns the saved file paths instead of inline image
//! data.

pub mod config;
pub mod error;
pub mod gemini;
pub mod handler;
pub mod server;
pub mod storage;
pub mod transport;

#[cfg(test)]
mod config_test;

pub use config::Config;
pub use error::{ConfigError, Error, Result};
pub use gemini::{GeminiClient, GeneratedImage, GenerationOutput, ImageGenerator};
pub use handler::{GenerateHandler, GenerateImageParams, GenerateImageResult};
pub use server::ImageServer;
pub use storage::ArtifactStore;
pub use transport::{
    McpServerBuilder, ServerError, Transport, TransportArgs, TransportMode, shutdown_channel,
};
