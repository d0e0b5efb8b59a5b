//! Settings for the completion endpoint and the surrounding service

use std::fmt;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use log::debug;
use crate::error::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Per-request timeouts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RequestTimeouts
{   /// generate and refine
    pub completion: Duration
  , /// test_connection
    pub probe: Duration
  , /// generate_stream, covering the whole streamed body
    pub stream: Duration
}

impl Default for RequestTimeouts
{   fn default() -> Self
    {   RequestTimeouts
        {   completion: Duration::from_secs(60)
          , probe: Duration::from_secs(30)
          , stream: Duration::from_secs(280)
        }
    }
}

/// Completion endpoint configuration.
/// The key is never serialized and `Debug` shows only its prefix.
#[derive(Clone, Serialize, Deserialize)]
pub struct EndpointConfig
{   /// Bearer token for the upstream API
    #[serde(skip_serializing)]
    pub api_key: String
  , /// Base URL, with or without the completion path
    pub base_url: String
  , /// Model name sent in every request
    pub model: String
  , /// Request timeouts
    pub timeouts: RequestTimeouts
}

impl EndpointConfig
{   /// Create a config with the default model and timeouts
    pub fn new(
      api_key: impl Into<String>
    , base_url: impl Into<String>
    ) -> Self
    {   EndpointConfig
        {   api_key: api_key.into()
          , base_url: base_url.into().trim().to_string()
          , model: DEFAULT_MODEL.to_string()
          , timeouts: RequestTimeouts::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self
    {   self.model = model.into();
        self
    }

    pub fn with_timeouts(mut self, timeouts: RequestTimeouts) -> Self
    {   self.timeouts = timeouts;
        self
    }

    /// First seven characters of the key, safe for logs
    pub fn masked_key(&self) -> String
    {   let prefix: String = self.api_key.chars().take(7).collect();
        format!("{}...", prefix)
    }
}

/// Process-level settings, loaded once at startup
#[derive(Clone, Serialize, Deserialize)]
pub struct Settings
{   pub project_name: String
  , pub version: String
  , pub api_prefix: String
  , pub endpoint: EndpointConfig
  , /// Token signing secret, consumed outside this crate
    #[serde(skip_serializing)]
    pub secret_key: String
  , pub access_token_expire_minutes: u64
  , pub cors_origins: Vec<String>
}

impl Settings
{   /// Load from process environment variables
    pub fn from_env() -> Result<Self, Error>
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
      F: Fn(&str) -> Option<String>
    {   let get = |name: &str| {
          lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        };
        let require = |name: &str| {
          get(name).ok_or_else(|| {
            Error::Configuration(format!("{} is not set", name))
          })
        };

        let api_key = require("DEEPSEEK_API_KEY")?;
        let secret_key = require("SECRET_KEY")?;
        let base_url = get("DEEPSEEK_API_BASE_URL")
          .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = get("DEEPSEEK_MODEL")
          .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let access_token_expire_minutes
          = match get("ACCESS_TOKEN_EXPIRE_MINUTES")
          {   Some(raw) => raw.parse::<u64>().map_err(|_| {
                Error::Configuration(format!(
                  "ACCESS_TOKEN_EXPIRE_MINUTES is not a number: {}",
                  raw
                ))
              })?
            , None => 60 * 24 * 7
          };

        let cors_origins = match get("BACKEND_CORS_ORIGINS")
        {   Some(raw) => raw
              .split(',')
              .map(|o| o.trim().to_string())
              .filter(|o| !o.is_empty())
              .collect()
          , None => default_cors_origins()
        };

        debug!("Loaded settings, base url: {}", base_url);

        Ok(Settings
        {   project_name: get("PROJECT_NAME")
              .unwrap_or_else(|| "AIROB API".to_string())
          , version: "0.1.0".to_string()
          , api_prefix: "/api/v1".to_string()
          , endpoint: EndpointConfig::new(api_key, base_url)
              .with_model(model)
          , secret_key
          , access_token_expire_minutes
          , cors_origins
        })
    }
}

impl fmt::Debug for EndpointConfig
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("EndpointConfig")
          .field("api_key", &self.masked_key())
          .field("base_url", &self.base_url)
          .field("model", &self.model)
          .field("timeouts", &self.timeouts)
          .finish()
    }
}

impl fmt::Debug for Settings
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.debug_struct("Settings")
          .field("project_name", &self.project_name)
          .field("version", &self.version)
          .field("api_prefix", &self.api_prefix)
          .field("endpoint", &self.endpoint)
          .field("secret_key", &"***")
          .field("access_token_expire_minutes", &self.access_token_expire_minutes)
          .field("cors_origins", &self.cors_origins)
          .finish()
    }
}

fn default_cors_origins() -> Vec<String>
{   vec![
      "http://localhost:3000".to_string()
    , "https://airob.vercel.app".to_string()
    , "https://*.vercel.app".to_string()
    ]
}
