//! In-process stand-in for the html2xhtml service.
//!
//! Speaks just enough HTTP/1.1 to answer one request per connection. Every
//! request is recorded verbatim, and the server counts how many connections
//! the client closed, so tests can assert that no socket outlives the call.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// What the mock answers with.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Fixed status line, content type and body.
    Fixed {
        status: u16,
        reason: &'static str,
        content_type: &'static str,
        body: Vec<u8>,
    },
    /// 200 with the request body sent straight back.
    Echo,
    /// Read the request, then never answer.
    Hang,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Reply::Fixed {
            status: 200,
            reason: "OK",
            content_type: "application/xhtml+xml; charset=UTF-8",
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn status(status: u16, reason: &'static str) -> Self {
        Reply::Fixed {
            status,
            reason,
            content_type: "text/html",
            body: format!("<html><body><h1>{status} {reason}</h1></body></html>").into_bytes(),
        }
    }
}

/// One request as seen on the wire.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> &str {
        self.target.split_once('?').map_or(self.target.as_str(), |(p, _)| p)
    }

    /// Query parameters in order of appearance.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let Some((_, query)) = self.target.split_once('?') else {
            return vec![];
        };
        query
            .split('&')
            .filter_map(|kv| kv.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

pub struct MockService {
    pub port: u16,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    accepted: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl MockService {
    pub async fn start(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let requests = Arc::new(Mutex::new(Vec::new()));
        let accepted = Arc::new(AtomicUsize::new(0));
        let closed = Arc::new(AtomicUsize::new(0));

        let handle = {
            let requests = Arc::clone(&requests);
            let accepted = Arc::clone(&accepted);
            let closed = Arc::clone(&closed);
            tokio::spawn(async move {
                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        return;
                    };
                    accepted.fetch_add(1, Ordering::SeqCst);
                    let reply = reply.clone();
                    let requests = Arc::clone(&requests);
                    let closed = Arc::clone(&closed);
                    tokio::spawn(async move {
                        if serve(stream, reply, requests).await {
                            closed.fetch_add(1, Ordering::SeqCst);
                        }
                    });
                }
            })
        };

        Self {
            port,
            requests,
            accepted,
            closed,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Wait up to five seconds for `n` client-side closes.
    pub async fn wait_closed(&self, n: usize) -> bool {
        for _ in 0..100 {
            if self.closed.load(Ordering::SeqCst) >= n {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Handle one connection. Returns true once the client has closed it.
async fn serve(
    mut stream: TcpStream,
    reply: Reply,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) -> bool {
    let Some(request) = read_request(&mut stream).await else {
        return false;
    };
    let echo_body = request.body.clone();
    requests.lock().unwrap().push(request);

    let response = match reply {
        Reply::Fixed {
            status,
            reason,
            content_type,
            body,
        } => encode_response(status, reason, content_type, &body),
        Reply::Echo => encode_response(200, "OK", "application/xhtml+xml", &echo_body),
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            return false;
        }
    };
    if stream.write_all(&response).await.is_err() {
        return false;
    }

    // No `Connection: close` is sent, so EOF here means the client hung up.
    let wait_eof = async {
        let mut buf = [0u8; 1024];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(_) => continue,
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait_eof)
        .await
        .is_ok()
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];

    let head_end = loop {
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        raw.extend_from_slice(&buf[..n]);
        if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&raw[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(0);

    let mut body = raw[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).await.ok()?;
        if n == 0 {
            return None;
        }
        body.extend_from_slice(&buf[..n]);
    }

    Some(RecordedRequest {
        method,
        target,
        headers,
        body,
    })
}

fn encode_response(status: u16, reason: &str, content_type: &str, body: &[u8]) -> Vec<u8> {
    let mut out = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\n\r\n",
        body.len()
    )
    .into_bytes();
    out.extend_from_slice(body);
    out
}
