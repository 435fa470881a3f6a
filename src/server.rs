//! MCP Server implementation for the Gemini image server.
//!
//! This module provides the MCP server handler that exposes the
//! `generate_image_from_text` tool. Generated images are saved to the
//! configured output directory and the reply carries one file path per
//! image rather than inline image data, keeping responses small.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::{
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use crate::error::Error;
use crate::handler::{GenerateHandler, GenerateImageParams, GenerateImageResult};

/// Name of the single tool this server exposes.
pub const GENERATE_TOOL_NAME: &str = "generate_image_from_text";

/// MCP Server for image generation.
#[derive(Clone)]
pub struct ImageServer {
    /// Handler for image generation operations
    handler: Arc<GenerateHandler>,
}

/// Tool parameters wrapper for generate_image_from_text.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateImageToolParams {
    /// Text prompt describing the image to generate
    pub prompt: String,
}

impl From<GenerateImageToolParams> for GenerateImageParams {
    fn from(params: GenerateImageToolParams) -> Self {
        Self {
            prompt: params.prompt,
        }
    }
}

impl ImageServer {
    /// Create a new ImageServer around a generation handler.
    pub fn new(handler: GenerateHandler) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Generate images from a text prompt and reply with their file paths.
    pub async fn generate_image(
        &self,
        params: GenerateImageToolParams,
    ) -> Result<CallToolResult, McpError> {
        info!(prompt = %params.prompt, "Generating image");

        let result = self
            .handler
            .generate_image(params.into())
            .await
            .map_err(|e| match e {
                Error::Validation(_) => McpError::invalid_params(e.to_string(), None),
                Error::Io(_) => {
                    McpError::internal_error(format!("Failed to save image: {}", e), None)
                }
                other => {
                    McpError::internal_error(format!("Image generation failed: {}", other), None)
                }
            })?;

        // Convert result to MCP content
        let content = match result {
            GenerateImageResult::Saved(paths) => paths
                .into_iter()
                .map(|path| Content::text(path.display().to_string()))
                .collect(),
            GenerateImageResult::Empty { reason } => {
                let text = match reason {
                    Some(reason) => format!("No image was generated: {}", reason),
                    None => "No image was generated for this prompt.".to_string(),
                };
                vec![Content::text(text)]
            }
        };

        Ok(CallToolResult::success(content))
    }
}

impl ServerHandler for ImageServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Image generation server using Google's Gemini API. \
                 Use generate_image_from_text to create an image from a text prompt; \
                 the image is saved locally and the tool returns its file path."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _params: Option<rmcp::model::PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<rmcp::model::ListToolsResult, McpError>> + Send + '_
    {
        async move {
            use rmcp::model::{ListToolsResult, Tool};
            use schemars::schema_for;

            let schema = schema_for!(GenerateImageToolParams);
            let schema_value = serde_json::to_value(&schema).unwrap_or_default();
            let input_schema = match schema_value {
                serde_json::Value::Object(map) => Arc::new(map),
                _ => Arc::new(serde_json::Map::new()),
            };

            Ok(ListToolsResult {
                tools: vec![Tool {
                    name: Cow::Borrowed(GENERATE_TOOL_NAME),
                    description: Some(Cow::Borrowed(
                        "Generate an image from a text prompt using Gemini. \
                         The image is saved to the server's output directory and \
                         only the saved file's path is returned.",
                    )),
                    input_schema,
                    annotations: None,
                    icons: None,
                    meta: None,
                    output_schema: None,
                    title: None,
                }],
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        params: rmcp::model::CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move {
            match params.name.as_ref() {
                GENERATE_TOOL_NAME => {
                    let tool_params: GenerateImageToolParams = params
                        .arguments
                        .map(|args| serde_json::from_value(serde_json::Value::Object(args)))
                        .transpose()
                        .map_err(|e| {
                            McpError::invalid_params(format!("Invalid parameters: {}", e), None)
                        })?
                        .ok_or_else(|| McpError::invalid_params("Missing parameters", None))?;

                    self.generate_image(tool_params).await
                }
                _ => Err(McpError::invalid_params(
                    format!("Unknown tool: {}", params.name),
                    None,
                )),
            }
        }
    }
}
