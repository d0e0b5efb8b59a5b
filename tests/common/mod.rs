//! In-process fake completion endpoint

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// What the fake upstream saw
#[derive(Debug, Clone)]
pub struct CapturedRequest
{   pub method: String
  , pub path: String
  , pub headers: Vec<(String, String)>
  , pub body: serde_json::Value
}

impl CapturedRequest
{   pub fn header(&self, name: &str) -> Option<&str>
    {   self.headers.iter()
          .find(|(k, _)| k.eq_ignore_ascii_case(name))
          .map(|(_, v)| v.as_str())
    }

    /// Content of the first message
    pub fn prompt(&self) -> &str
    {   self.body["messages"][0]["content"].as_str().unwrap_or_default()
    }
}

/// How the fake upstream answers
#[derive(Debug, Clone)]
pub enum Reply
{   /// Fixed body with `Content-Length`, after an optional delay
    Canned
    {   status: u16
      , body: String
      , delay: Duration
    }
  , /// `Transfer-Encoding: chunked`, one HTTP chunk per entry
    Chunked
    {   status: u16
      , content_type: String
      , chunks: Vec<Vec<u8>>
      , gap: Duration
    }
  , /// Completion whose content is the request's first message
    Echo
    {   delay: Duration
    }
}

pub struct FakeUpstream
{   /// `http://127.0.0.1:<port>/v1`
    pub base_url: String
  , pub requests: mpsc::UnboundedReceiver<CapturedRequest>
}

/// Serve every connection with the same reply
pub async fn serve_reply(reply: Reply) -> FakeUpstream
{   let listener = TcpListener::bind("127.0.0.1:0").await
      .expect("bind fake upstream");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = mpsc::unbounded_channel();
    let reply = Arc::new(reply);

    tokio::spawn(async move {
      loop
      {   let (stream, _) = match listener.accept().await
          {   Ok(conn) => conn
            , Err(_) => break
          };
          let tx = tx.clone();
          let reply = reply.clone();
          tokio::spawn(async move {
            serve(stream, &reply, tx).await;
          });
      }
    });

    FakeUpstream
    {   base_url: format!("http://{}/v1", addr)
      , requests: rx
    }
}

pub async fn spawn(
  status: u16
, body: &str
, delay: Duration
) -> FakeUpstream
{   serve_reply(Reply::Canned
    {   status
      , body: body.to_string()
      , delay
    }).await
}

pub async fn spawn_json(
  status: u16
, body: serde_json::Value
) -> FakeUpstream
{   spawn(status, &body.to_string(), Duration::ZERO).await
}

/// Event stream sent as chunked transfer encoding
pub async fn spawn_sse(chunks: Vec<Vec<u8>>) -> FakeUpstream
{   serve_reply(Reply::Chunked
    {   status: 200
      , content_type: "text/event-stream".to_string()
      , chunks
      , gap: Duration::from_millis(10)
    }).await
}

/// Address nothing listens on
pub async fn closed_base_url() -> String
{   let listener = TcpListener::bind("127.0.0.1:0").await
      .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}/v1", addr)
}

pub fn completion_body(model: &str, content: &str) -> serde_json::Value
{   serde_json::json!({
      "id": "chatcmpl-1",
      "object": "chat.completion",
      "model": model,
      "choices": [{
        "index": 0,
        "message": { "role": "assistant", "content": content },
        "finish_reason": "stop"
      }]
    })
}

/// `data: {...}\n\n` line carrying one delta
pub fn sse_delta(content: &str) -> String
{   let chunk = serde_json::json!({
      "id": "chatcmpl-1",
      "object": "chat.completion.chunk",
      "model": "deepseek-chat",
      "choices": [{
        "index": 0,
        "delta": { "content": content },
        "finish_reason": null
      }]
    });
    format!("data: {}\n\n", chunk)
}

pub const SSE_DONE: &str = "data: [DONE]\n\n";

async fn serve(
  mut stream: TcpStream
, reply: &Reply
, tx: mpsc::UnboundedSender<CapturedRequest>
)
{   let captured = match read_request(&mut stream).await
    {   Some(captured) => captured
      , None => return
    };
    let echoed = captured.prompt().to_string();
    let _ = tx.send(captured);

    match reply
    {   Reply::Canned { status, body, delay } => {
          if !delay.is_zero()
          {   tokio::time::sleep(*delay).await;
          }
          write_fixed(&mut stream, *status, "application/json", body).await;
        }
      , Reply::Echo { delay } => {
          tokio::time::sleep(*delay).await;
          let body = completion_body("deepseek-chat", &echoed).to_string();
          write_fixed(&mut stream, 200, "application/json", &body).await;
        }
      , Reply::Chunked { status, content_type, chunks, gap } => {
          let head = format!(
            "HTTP/1.1 {} Canned\r\nContent-Type: {}\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n",
            status,
            content_type
          );
          if stream.write_all(head.as_bytes()).await.is_err()
          {   return;
          }
          for chunk in chunks
          {   let mut frame = format!("{:x}\r\n", chunk.len()).into_bytes();
              frame.extend_from_slice(chunk);
              frame.extend_from_slice(b"\r\n");
              if stream.write_all(&frame).await.is_err()
              {   return;
              }
              let _ = stream.flush().await;
              tokio::time::sleep(*gap).await;
          }
          let _ = stream.write_all(b"0\r\n\r\n").await;
          let _ = stream.shutdown().await;
        }
    }
}

async fn write_fixed(
  stream: &mut TcpStream
, status: u16
, content_type: &str
, body: &str
)
{   let response = format!(
      "HTTP/1.1 {} Canned\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
      status,
      content_type,
      body.len(),
      body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// reqwest sends JSON bodies with `Content-Length`
async fn read_request(stream: &mut TcpStream) -> Option<CapturedRequest>
{   let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop
    {   if let Some(pos) = find(&buf, b"\r\n\r\n")
        {   break pos;
        }
        match stream.read(&mut chunk).await
        {   Ok(0) | Err(_) => return None
          , Ok(n) => buf.extend_from_slice(&chunk[..n])
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
      .filter_map(|l| l.split_once(':'))
      .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
      .collect();
    let content_length = headers.iter()
      .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
      .and_then(|(_, v)| v.parse::<usize>().ok())
      .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length
    {   match stream.read(&mut chunk).await
        {   Ok(0) | Err(_) => return None
          , Ok(n) => buf.extend_from_slice(&chunk[..n])
        }
    }

    let mut parts = request_line.split_whitespace();
    Some(CapturedRequest
    {   method: parts.next().unwrap_or_default().to_string()
      , path: parts.next().unwrap_or_default().to_string()
      , headers
      , body: serde_json::from_slice(
          &buf[body_start..body_start + content_length]
        ).unwrap_or(serde_json::Value::Null)
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize>
{   haystack.windows(needle.len()).position(|w| w == needle)
}
