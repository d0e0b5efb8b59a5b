use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::{error, trace};
use crate::error::Error;

// ===== Message Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub temperature: f32
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

impl ChatRequest
{   /// Single user message request
    pub fn single(
      model: &str
    , content: impl Into<String>
    , temperature: f32
    ) -> Self
    {   ChatRequest
        {   model: model.to_string()
          , messages: vec![ChatMessage::user(content)]
          , temperature
          , max_tokens: None
          , stream: None
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self
    {   self.max_tokens = Some(max_tokens);
        self
    }

    pub fn streaming(mut self) -> Self
    {   self.stream = Some(true);
        self
    }
}

// ===== Response access =====

/// `model` field of a raw completion response
pub fn response_model(response: &Value) -> Option<&str>
{   response.get("model").and_then(Value::as_str)
}

/// `choices[0].message.content` of a raw completion response
pub fn response_content(response: &Value) -> Option<&str>
{   response.get("choices")
      .and_then(|c| c.get(0))
      .and_then(|c| c.get("message"))
      .and_then(|m| m.get("content"))
      .and_then(Value::as_str)
}

/// Extract the assistant reply, failing when it is absent
pub fn extract_content(response: &Value)
  -> Result<String, Error>
{   response_content(response)
      .map(str::to_string)
      .ok_or_else(|| {
        error!("No choices in response");
        Error::NoChoicesInResponse
      })
}

fn malformed(what: &str) -> Error
{   Error::UpstreamTransport
    {   message: format!("malformed completion response: {}", what)
      , timed_out: false
    }
}

fn text_of(value: &Value) -> String
{   match value
    {   Value::String(s) => s.clone()
      , other => other.to_string()
    }
}

/// Model and reply for the connection probe. Missing keys fall back to
/// "未知" / "无回复"; keys present with the wrong shape are an error.
pub fn probe_data(response: &Value)
  -> Result<crate::ProbeData, Error>
{   let body = response.as_object()
      .ok_or_else(|| malformed("body is not a JSON object"))?;

    let model = body.get("model")
      .map(text_of)
      .unwrap_or_else(|| "未知".to_string());

    let reply = match body.get("choices")
    {   None => None
      , Some(choices) => {
          let first = choices.as_array()
            .and_then(|c| c.first())
            .ok_or_else(|| malformed("`choices` is not a non-empty array"))?;
          let first = first.as_object()
            .ok_or_else(|| malformed("`choices[0]` is not an object"))?;
          match first.get("message")
          {   None => None
            , Some(message) => message.as_object()
                .ok_or_else(|| malformed("`message` is not an object"))?
                .get("content")
                .map(text_of)
          }
        }
    };

    Ok(crate::ProbeData
    {   model
      , response: reply.unwrap_or_else(|| "无回复".to_string())
    })
}

// ===== Streaming =====

/// One decoded server-sent event from a streaming completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent
{   /// `choices[0].delta.content` of a chunk
    Delta(String)
  , /// `data: [DONE]`
    Done
}

/// Incremental decoder for `text/event-stream` completion bodies.
/// Bytes are buffered until a full line arrives, so chunk boundaries may
/// fall anywhere, including inside a multi-byte character.
#[derive(Debug, Default)]
pub struct SseDecoder
{   buffer: Vec<u8>
}

impl SseDecoder
{   pub fn new() -> Self
    {   SseDecoder::default()
    }

    pub fn push(&mut self, bytes: &[u8])
      -> Result<Vec<StreamEvent>, Error>
    {   self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n')
        {   let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = decode_line(line.trim())?
            {   events.push(event);
            }
        }
        Ok(events)
    }

    /// Flush a trailing line that had no newline
    pub fn finish(&mut self) -> Result<Option<StreamEvent>, Error>
    {   let rest = std::mem::take(&mut self.buffer);
        decode_line(String::from_utf8_lossy(&rest).trim())
    }
}

fn decode_line(line: &str) -> Result<Option<StreamEvent>, Error>
{   // blank separators, comments and non-data fields carry nothing
    let data = match line.strip_prefix("data:")
    {   Some(data) => data.trim()
      , None => return Ok(None)
    };
    if data.is_empty()
    {   return Ok(None);
    }
    if data == "[DONE]"
    {   return Ok(Some(StreamEvent::Done));
    }

    trace!("Stream chunk: {}", data);
    let chunk: Value = serde_json::from_str(data)
      .map_err(|e| malformed(&format!("stream chunk: {}", e)))?;

    Ok(chunk.get("choices")
      .and_then(|c| c.get(0))
      .and_then(|c| c.get("delta"))
      .and_then(|d| d.get("content"))
      .and_then(Value::as_str)
      .filter(|s| !s.is_empty())
      .map(|s| StreamEvent::Delta(s.to_string())))
}
