//! One-shot HTTP responders for exercising the API clients without a network.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A canned HTTP response.
pub struct Canned {
    pub status: u16,
    pub reason: &'static str,
    pub body: String,
}

impl Canned {
    pub fn json(body: serde_json::Value) -> Self {
        Self {
            status: 200,
            reason: "OK",
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, reason: &'static str) -> Self {
        Self {
            status,
            reason,
            body: String::new(),
        }
    }

    pub fn text(status: u16, reason: &'static str, body: &str) -> Self {
        Self {
            status,
            reason,
            body: body.to_string(),
        }
    }
}

/// Serve the given responses, one per accepted connection, in order.
///
/// Returns the base URL (`http://127.0.0.1:<port>`) and a handle yielding the
/// raw requests that were received.
pub async fn serve(responses: Vec<Canned>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for canned in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut stream).await);

            let reply = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                canned.status,
                canned.reason,
                canned.body.len(),
                canned.body
            );
            stream.write_all(reply.as_bytes()).await.unwrap();
            stream.shutdown().await.ok();
        }
        requests
    });

    (base_url, handle)
}

/// Accept one connection, read the request, and close without answering.
pub async fn hang_up() -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        stream.shutdown().await.ok();
        request
    });

    (base_url, handle)
}

/// Bind a listener that only records whether anything connected.
pub async fn silent_listener() -> (String, TcpListener) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    (base_url, listener)
}

/// True if a connection arrives within a short grace period.
pub async fn was_contacted(listener: &TcpListener) -> bool {
    tokio::time::timeout(std::time::Duration::from_millis(100), listener.accept())
        .await
        .is_ok()
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);

            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}
