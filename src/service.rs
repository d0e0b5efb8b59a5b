//! Route-layer contract, as plain functions an HTTP layer can call

use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::{debug, error};
use crate::client::CompletionClient;
use crate::config::Settings;
use crate::error::Error;
use crate::providers::deepseek::extract_content;
use crate::request::{GenerationRequest, PageResponse, RefinementRequest};
use crate::ProbeResult;

/// Style passed to the client when the request names none
pub const DEFAULT_PAGE_STYLE: &str = "modern";

/// Failure surfaced to the HTTP layer as `500 {"detail": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFailure
{   pub detail: String
  , #[serde(skip)]
    pub source: Option<Error>
}

impl ServiceFailure
{   pub fn status_code(&self) -> u16
    {   500
    }
}

impl From<Error> for ServiceFailure
{   fn from(e: Error) -> Self
    {   error!("Service call failed: {}", e);
        ServiceFailure
        {   detail: e.to_string()
          , source: Some(e)
        }
    }
}

/// `POST /generate`
pub async fn generate_page(
  client: &CompletionClient
, body: &Value
) -> Result<PageResponse, ServiceFailure>
{   let request = GenerationRequest::from_value(body);
    debug!("generate_page: {:?}", request);

    let prompt = crate::prompt::build_generation_prompt(&request);
    let style = request.style.as_deref()
      .unwrap_or(DEFAULT_PAGE_STYLE);

    let response = client.generate(&prompt, Some(style)).await?;
    Ok(PageResponse::from_html(extract_content(&response)?))
}

/// `POST /refine`; rejects missing fields before calling upstream
pub async fn refine_page(
  client: &CompletionClient
, body: &Value
) -> Result<PageResponse, ServiceFailure>
{   let request = RefinementRequest::from_value(body)?;
    debug!("refine_page: {}", request.instructions);

    let response = client
      .refine(&request.original_html, &request.instructions)
      .await?;
    Ok(PageResponse::from_html(extract_content(&response)?))
}

/// `GET /test-connection`
pub async fn test_connection(client: &CompletionClient) -> ProbeResult
{   client.test_connection().await
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus
{   pub configured: bool
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatuses
{   pub deepseek: ApiStatus
}

/// `GET /status` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus
{   pub status: String
  , pub version: String
  , pub apis: ApiStatuses
}

/// Local health summary; never contacts upstream
pub fn status(settings: &Settings) -> ServiceStatus
{   ServiceStatus
    {   status: "ok".to_string()
      , version: settings.version.clone()
      , apis: ApiStatuses
        {   deepseek: ApiStatus
            {   configured: !settings.endpoint.api_key.is_empty()
            }
        }
    }
}
