use std::fmt;

/// Error type for prompt building, configuration and upstream calls
/// Implements Clone so results can be handed across tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Required setting is absent or unparsable
    Configuration(String)
  , /// Required request field is missing
    Validation(String)
  , /// Upstream answered with a non-success status
    UpstreamHttp
    {   status: u16
      , body: String
    }
  , /// Network failure, timeout or undecodable response
    UpstreamTransport
    {   message: String
      , timed_out: bool
    }
  , /// No choices[0].message.content in the upstream response
    NoChoicesInResponse
}

impl Error
{   /// Build a transport error from a reqwest failure
    pub fn from_transport(e: &reqwest::Error) -> Self
    {   Error::UpstreamTransport
        {   message: e.to_string()
          , timed_out: e.is_timeout()
        }
    }

    /// True when the upstream call exceeded its timeout
    pub fn is_timeout(&self) -> bool
    {   matches!(
          self,
          Error::UpstreamTransport { timed_out: true, .. }
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::Configuration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Validation(msg) => {
              write!(f, "Invalid request: {}", msg)
            }
          , Error::UpstreamHttp { status, body } => {
              write!(f,
                "Upstream returned status {}: {}",
                status, body
              )
            }
          , Error::UpstreamTransport { message, timed_out } => {
              if *timed_out
              {   write!(f, "Upstream request timed out: {}", message)
              } else
              {   write!(f, "Upstream transport error: {}", message)
              }
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
        }
    }
}

impl std::error::Error for Error {}
