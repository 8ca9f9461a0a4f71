//! Local HTTP server answering a fixed script of responses.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Response, Server, StatusCode};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
    pub accept: Option<String>,
    pub body: String,
}

impl Recorded {
    /// Decoded value of query parameter `name`.
    pub fn param(&self, name: &str) -> Option<String> {
        let query = self.url.split_once('?')?.1;
        url_decode_pairs(query)
            .into_iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

pub struct MockServer {
    pub base_url: String,
    recorded: Arc<Mutex<Vec<Recorded>>>,
    handle: thread::JoinHandle<()>,
}

impl MockServer {
    /// Serve `responses` (status, JSON body) in order, one per request.
    pub fn start(responses: Vec<(u16, String)>) -> Self {
        let server = Server::http("127.0.0.1:0").expect("http server");
        let base_url = format!("http://{}", server.server_addr());
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&recorded);

        let handle = thread::spawn(move || {
            for (status, body) in responses {
                let mut req = match server.recv_timeout(Duration::from_secs(10)) {
                    Ok(Some(req)) => req,
                    Ok(None) | Err(_) => break,
                };
                let header = |name: &'static str| {
                    req.headers()
                        .iter()
                        .find(|h| h.field.equiv(name))
                        .map(|h| h.value.as_str().to_string())
                };
                let authorization = header("Authorization");
                let accept = header("Accept");
                let mut request_body = String::new();
                let _ = req.as_reader().read_to_string(&mut request_body);
                sink.lock().unwrap().push(Recorded {
                    method: req.method().to_string(),
                    url: req.url().to_string(),
                    authorization,
                    accept,
                    body: request_body,
                });
                let content_type =
                    Header::from_bytes("Content-Type", "application/json").expect("header");
                let _ = req.respond(
                    Response::from_string(body)
                        .with_status_code(StatusCode(status))
                        .with_header(content_type),
                );
            }
        });

        Self {
            base_url,
            recorded,
            handle,
        }
    }

    /// Requests received so far, without waiting for the script.
    pub fn received(&self) -> Vec<Recorded> {
        self.recorded.lock().unwrap().clone()
    }

    /// Wait for the script to finish and return what was received.
    pub fn finish(self) -> Vec<Recorded> {
        self.handle.join().expect("server thread");
        let recorded = self.recorded.lock().unwrap();
        recorded.clone()
    }
}

fn url_decode_pairs(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            Some((decode(key), decode(value)))
        })
        .collect()
}

fn decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).unwrap_or("");
                if let Ok(byte) = u8::from_str_radix(hex, 16) {
                    out.push(byte);
                    i += 2;
                } else {
                    out.push(b'%');
                }
            }
            byte => out.push(byte),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
