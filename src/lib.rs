pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod prompt;
pub mod endpoint;
pub mod client;
pub mod service;
use serde::{Deserialize, Serialize};

/*

airob turns a landing page description (or an existing page plus change
instructions) into a prompt, sends it to a DeepSeek-compatible chat
completion endpoint and hands back the generated HTML.

airob/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and reply types
│   ├── error.rs        # Error type
│   ├── config.rs       # Endpoint config and process settings
│   ├── request.rs      # Generation / refinement requests, page response
│   ├── prompt.rs       # Prompt builder
│   ├── endpoint.rs     # Completion URL resolution
│   ├── client.rs       # CompletionClient: generate, stream, refine, probe
│   ├── service.rs      # Route contract for the HTTP layer
│   ├── main.rs         # airob-probe binary
│   └── providers/
│       ├── mod.rs
│       └── deepseek.rs # Wire types, event-stream decoding
└── tests/

*/

pub use client::CompletionClient;
pub use config::{EndpointConfig, RequestTimeouts, Settings};
pub use error::Error;
pub use request::{GenerationRequest, PageResponse, RefinementRequest};

/// AIROB API INTERFACE:

// ===== generate / refine =====

/// Raw upstream JSON on success
pub type CompletionReply = Result<serde_json::Value, crate::error::Error>;

// ===== generate_stream =====

/// One `choices[0].delta.content` chunk of a streamed reply
pub type StreamReply = Result<String, crate::error::Error>;

// ===== test_connection =====

/// Outcome of the connection probe. Serializes as
/// `{"status": "success" | "error", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProbeResult
{   Success
    {   message: String
      , data: ProbeData
    }
  , Error
    {   message: String
      , error_details: String
    }
}

impl ProbeResult
{   pub fn is_success(&self) -> bool
    {   matches!(self, ProbeResult::Success { .. })
    }

    pub fn message(&self) -> &str
    {   match self
        {   ProbeResult::Success { message, .. }
          | ProbeResult::Error { message, .. } => message
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeData
{   pub model: String
  , pub response: String
}
