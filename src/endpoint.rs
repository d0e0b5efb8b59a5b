//! Completion URL resolution
//!
//! Operators configure the base URL as a bare host/version, as the full
//! completion URL, or with a partial or repeated completion path. All
//! three resolve to exactly one `/chat/completions` suffix.
//!
//! A partial URL is cut at the *first* `/chat/completions`, not at the
//! last `/chat`. Cutting at the first match collapses repeated paths and
//! leaves a `/chat` earlier in the host path alone; for every shape the
//! service is configured with it yields the same URL as cutting at the
//! anchor.

use log::trace;

pub const COMPLETION_PATH: &str = "/chat/completions";

/// How a configured base URL relates to the completion path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointShape
{   /// Already ends with the completion path
    Complete
  , /// Contains the completion path, but not as the suffix
    Partial
  , /// No completion path at all
    Bare
}

impl EndpointShape
{   pub fn classify(base_url: &str) -> Self
    {   if base_url.ends_with(COMPLETION_PATH)
        {   EndpointShape::Complete
        } else if base_url.contains(COMPLETION_PATH)
        {   EndpointShape::Partial
        } else
        {   EndpointShape::Bare
        }
    }
}

/// Resolve the URL to POST completions to. Idempotent.
pub fn resolve_endpoint_url(base_url: &str) -> String
{   let shape = EndpointShape::classify(base_url);
    trace!("Base url {} classified as {:?}", base_url, shape);

    match shape
    {   EndpointShape::Complete => base_url.to_string()
      , EndpointShape::Partial => {
          // cut at the first occurrence so repeats collapse too
          let cut = base_url.find(COMPLETION_PATH)
            .unwrap_or(base_url.len());
          format!("{}{}", &base_url[..cut], COMPLETION_PATH)
        }
      , EndpointShape::Bare => {
          format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            COMPLETION_PATH
          )
        }
    }
}
