use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use roster_client::UserApiClient;
use serde_json::{Value, json};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub fn client_for(server: &MockServer) -> UserApiClient {
    UserApiClient::new(&server.uri(), Duration::from_secs(2)).expect("Failed to build client")
}

pub fn users_json(users: &[(i64, &str)]) -> Value {
    Value::Array(
        users
            .iter()
            .map(|(id, name)| json!({"id": id, "name": name}))
            .collect(),
    )
}

/// `GET /users` answering `users` for the next `times` calls.
pub fn list_users(users: &[(i64, &str)], times: u64) -> Mock {
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(users_json(users)))
        .up_to_n_times(times)
}

pub fn list_users_failing(status: u16) -> Mock {
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(status))
}

pub fn create_user(status: u16) -> Mock {
    Mock::given(method("POST"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(status))
}

/// Number of requests the server saw with the given method.
pub async fn count_requests(server: &MockServer, http_method: &str) -> usize {
    server
        .received_requests()
        .await
        .expect("Request recording is enabled")
        .iter()
        .filter(|r| r.method.as_str() == http_method)
        .count()
}

/// The method of every request, in arrival order.
pub async fn request_methods(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .expect("Request recording is enabled")
        .iter()
        .map(|r| r.method.to_string())
        .collect()
}

/// A `201 Created` that promises 100 body bytes and delivers 3.
pub const TRUNCATED_CREATED: &[u8] =
    b"HTTP/1.1 201 Created\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"i";

/// A complete `200 OK` carrying `body` as JSON.
pub fn json_ok(body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

/// Hand-written HTTP server for responses wiremock cannot produce.
///
/// Every connection gets one response chosen by request method, then the
/// connection is closed.
pub struct RawServer {
    pub url: String,
    methods: Arc<Mutex<Vec<String>>>,
}

impl RawServer {
    pub async fn start(respond: fn(&str) -> Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has an address");
        let methods = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&methods);
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let Some(method) = read_request(&mut stream).await else {
                        return;
                    };
                    seen.lock().unwrap().push(method.clone());
                    let _ = stream.write_all(&respond(&method)).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        Self {
            url: format!("http://{addr}"),
            methods,
        }
    }

    /// Methods of the requests received so far, in arrival order.
    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }
}

/// Read one request (head and `Content-Length` body) and return its method.
async fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    head.split_whitespace().next().map(str::to_string)
}
