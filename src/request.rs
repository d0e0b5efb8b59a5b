//! Caller-facing request and response types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::Error;

/// Description of a page to generate; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest
{   pub industry: Option<String>
  , pub page_type: Option<String>
  , pub style: Option<String>
  , #[serde(default)]
    pub key_features: Vec<String>
  , pub color_scheme: Option<String>
}

impl GenerationRequest
{   /// Build from a loosely typed body. Never fails: anything absent
    /// or of the wrong type falls back to the default.
    pub fn from_value(body: &Value) -> Self
    {   let text = |key: &str| {
          body.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
        };

        let key_features = match body.get("keyFeatures")
        {   Some(Value::Array(items)) => items
              .iter()
              .filter_map(Value::as_str)
              .map(str::to_string)
              .collect()
          , Some(Value::String(single)) => vec![single.clone()]
          , _ => vec![]
        };

        GenerationRequest
        {   industry: text("industry")
          , page_type: text("pageType")
          , style: text("style")
          , key_features
          , color_scheme: text("colorScheme")
        }
    }
}

/// An existing page plus the changes to apply to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementRequest
{   pub original_html: String
  , pub instructions: String
}

impl RefinementRequest
{   pub fn new(
      original_html: impl Into<String>
    , instructions: impl Into<String>
    ) -> Self
    {   RefinementRequest
        {   original_html: original_html.into()
          , instructions: instructions.into()
        }
    }

    /// Build from a loosely typed body; both fields are required
    pub fn from_value(body: &Value) -> Result<Self, Error>
    {   let field = |key: &str| {
          body.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
              Error::Validation(format!("missing field `{}`", key))
            })
        };

        Ok(RefinementRequest
        {   original_html: field("originalHtml")?
          , instructions: field("instructions")?
        })
    }
}

/// Generated page returned to the HTTP layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse
{   pub html: String
  , pub css: String
  , pub js: String
}

impl PageResponse
{   pub fn from_html(html: String) -> Self
    {   PageResponse
        {   html
          , css: String::new()
          , js: String::new()
        }
    }
}
