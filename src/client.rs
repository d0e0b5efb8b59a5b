use std::time::Duration;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;
use log::{debug, trace, error, info};
use crate::config::EndpointConfig;
use crate::error::Error;
use crate::providers::deepseek::{self, ChatRequest, StreamEvent};
use crate::request::RefinementRequest;
use crate::{CompletionReply, ProbeResult, StreamReply};

pub const DEFAULT_GENERATE_STYLE: &str = "professional";
pub const GENERATE_TEMPERATURE: f32 = 0.7;
pub const REFINE_TEMPERATURE: f32 = 0.5;
pub const PROBE_TEMPERATURE: f32 = 0.5;
pub const PROBE_MAX_TOKENS: usize = 50;
pub const PROBE_MESSAGE: &str
  = "你好，这是一条测试消息。请回复'连接成功'。";

/// Wrap a page prompt in the generator instructions
pub fn wrap_generation_prompt(prompt: &str, style: &str) -> String
{   format!(
"你是一个专业的网页内容生成AI，请根据以下要求生成网页内容:
风格: {style}
详细需求: {prompt}

输出格式要求:
- 返回完整HTML代码
- 包含CSS样式(内联)
- 移动端适配
- 包含常见的网页区块(导航、英雄区、功能展示、客户评价、CTA等)
"
    )
}

/// Client for the chat completion endpoint.
/// Holds only immutable configuration; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct CompletionClient
{   config: EndpointConfig
  , url: String
  , http_client: reqwest::Client
}

impl CompletionClient
{   pub fn new(config: EndpointConfig) -> Self
    {   let url = crate::endpoint::resolve_endpoint_url(
          &config.base_url
        );
        debug!("Creating CompletionClient for {}", url);
        CompletionClient
        {   config
          , url
          , http_client: reqwest::Client::new()
        }
    }

    /// Resolved completion URL
    pub fn url(&self) -> &str
    {   &self.url
    }

    pub fn config(&self) -> &EndpointConfig
    {   &self.config
    }

    /// Generate a page from a built prompt; `style` defaults to
    /// "professional". Returns the raw upstream JSON.
    pub async fn generate(
      &self
    , prompt: &str
    , style: Option<&str>
    ) -> CompletionReply
    {   let style = style.unwrap_or(DEFAULT_GENERATE_STYLE);
        debug!("generate with style: {}", style);

        let request = ChatRequest::single(
          &self.config.model
        , wrap_generation_prompt(prompt, style)
        , GENERATE_TEMPERATURE
        );
        self.post(&request, self.config.timeouts.completion).await
    }

    /// Streaming variant of `generate`. The POST and status check happen
    /// before this returns; the reply text then arrives on the receiver
    /// as `choices[0].delta.content` chunks, ending after `[DONE]` or on
    /// the first error. Dropping the receiver abandons the upstream body.
    pub async fn generate_stream(
      &self
    , prompt: &str
    , style: Option<&str>
    ) -> Result<mpsc::UnboundedReceiver<StreamReply>, Error>
    {   let style = style.unwrap_or(DEFAULT_GENERATE_STYLE);
        debug!("generate_stream with style: {}", style);

        let request = ChatRequest::single(
          &self.config.model
        , wrap_generation_prompt(prompt, style)
        , GENERATE_TEMPERATURE
        ).streaming();

        let response = self
          .open(&request, self.config.timeouts.stream)
          .await
          .map_err(|e| self.log_failure(e))?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
          relay_stream(response, tx).await;
        });
        Ok(rx)
    }

    /// Rework an existing page. Returns the raw upstream JSON.
    pub async fn refine(
      &self
    , original_html: &str
    , instructions: &str
    ) -> CompletionReply
    {   debug!("refine, original html {} bytes", original_html.len());

        let prompt = crate::prompt::build_refinement_prompt(
          &RefinementRequest::new(original_html, instructions)
        );
        let request = ChatRequest::single(
          &self.config.model
        , prompt
        , REFINE_TEMPERATURE
        );
        self.post(&request, self.config.timeouts.completion).await
    }

    /// Diagnostic probe; every failure becomes `ProbeResult::Error`
    pub async fn test_connection(&self) -> ProbeResult
    {   debug!("test_connection against {}", self.url);

        let request = ChatRequest::single(
          &self.config.model
        , PROBE_MESSAGE
        , PROBE_TEMPERATURE
        ).with_max_tokens(PROBE_MAX_TOKENS);

        let outcome = self.post(&request, self.config.timeouts.probe)
          .await
          .and_then(|response| deepseek::probe_data(&response));

        match outcome
        {   Ok(data) => {
              info!("Upstream connection ok");
              ProbeResult::Success
              {   message: "API连接成功".to_string()
                , data
              }
            }
          , Err(e) => {
              error!("Connection check failed: {}", e);
              let details = e.to_string();
              ProbeResult::Error
              {   message: format!("API连接失败: {}", details)
                , error_details: details
              }
            }
        }
    }

    /// One POST, no retry
    async fn post(
      &self
    , request: &ChatRequest
    , timeout: Duration
    ) -> CompletionReply
    {   trace!("Completion request: {:?}", request);

        let response = self.open(request, timeout)
          .await
          .map_err(|e| self.log_failure(e))?;

        response.json::<Value>().await
          .map_err(|e| self.log_failure(Error::from_transport(&e)))
    }

    fn log_failure(&self, e: Error) -> Error
    {   error!("Completion call failed: {}", e);
        error!("Request url: {}", self.url);
        error!("API key prefix: {}", self.config.masked_key());
        e
    }

    /// Send the request and check the status; the body is left unread
    async fn open(
      &self
    , request: &ChatRequest
    , timeout: Duration
    ) -> Result<reqwest::Response, Error>
    {   let response = self.http_client
          .post(&self.url)
          .bearer_auth(&self.config.api_key)
          .header("Content-Type", "application/json")
          .timeout(timeout)
          .json(request)
          .send()
          .await
          .map_err(|e| Error::from_transport(&e))?;

        let status = response.status();
        trace!("Completion response status: {}", status);

        if !status.is_success()
        {   let body = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            return Err(Error::UpstreamHttp
            {   status: status.as_u16()
              , body
            });
        }
        Ok(response)
    }
}

/// Decode the event stream and forward deltas until done, failure, or
/// the receiver goes away
async fn relay_stream(
  response: reqwest::Response
, tx: mpsc::UnboundedSender<StreamReply>
)
{   let mut body = response.bytes_stream();
    let mut decoder = deepseek::SseDecoder::new();

    while let Some(chunk) = body.next().await
    {   let events = match chunk
        {   Ok(bytes) => decoder.push(&bytes)
          , Err(e) => Err(Error::from_transport(&e))
        };
        let events = match events
        {   Ok(events) => events
          , Err(e) => {
              error!("Stream failed: {}", e);
              let _ = tx.send(Err(e));
              return;
            }
        };

        for event in events
        {   match event
            {   StreamEvent::Delta(text) => {
                  if tx.send(Ok(text)).is_err()
                  {   debug!("Stream receiver dropped");
                      return;
                  }
                }
              , StreamEvent::Done => {
                  debug!("Stream finished");
                  return;
                }
            }
        }
    }

    match decoder.finish()
    {   Ok(Some(StreamEvent::Delta(text))) => {
          let _ = tx.send(Ok(text));
        }
      , Ok(_) => {}
      , Err(e) => {
          let _ = tx.send(Err(e));
        }
    }
    debug!("Stream body ended");
}
