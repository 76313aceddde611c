//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves fixed bodies keyed by request path (404 for anything else), with an
//! optional per-response delay. Raw routes send their bytes verbatim, for
//! odd status codes or truncated bodies. Records when each request arrived and when the
//! server started answering it, before the response is written, so a hit is
//! always visible once the client has its body.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// One served request.
#[derive(Debug, Clone)]
pub struct Hit {
    pub path: String,
    pub arrived: Instant,
    pub responded: Instant,
}

enum Route {
    Body(Vec<u8>),
    Raw(Vec<u8>),
}

#[derive(Clone)]
pub struct BodyServer {
    base: String,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl BodyServer {
    /// Full URL for `path` (e.g. `"/a.png"`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Requests answered so far, in the order responses started.
    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. Returns once it is listening; runs until the process exits.
pub fn start(bodies: HashMap<String, Vec<u8>>) -> BodyServer {
    start_with_delay(bodies, Duration::ZERO)
}

/// Like `start`, but waits `delay` before answering each request.
pub fn start_with_delay(bodies: HashMap<String, Vec<u8>>, delay: Duration) -> BodyServer {
    let routes = bodies
        .into_iter()
        .map(|(path, body)| (path, Route::Body(body)))
        .collect();
    serve(routes, delay)
}

/// Serves each value as the complete raw response (status line, headers, body)
/// and then closes the connection.
pub fn start_raw(responses: HashMap<String, Vec<u8>>) -> BodyServer {
    let routes = responses
        .into_iter()
        .map(|(path, raw)| (path, Route::Raw(raw)))
        .collect();
    serve(routes, Duration::ZERO)
}

fn serve(routes: HashMap<String, Route>, delay: Duration) -> BodyServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes = Arc::new(routes);
    let hits = Arc::new(Mutex::new(Vec::new()));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&server_hits);
            thread::spawn(move || handle(stream, &routes, delay, &hits));
        }
    });
    BodyServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    delay: Duration,
    hits: &Mutex<Vec<Hit>>,
) {
    let arrived = Instant::now();
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&buf);
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();

    if !delay.is_zero() {
        thread::sleep(delay);
    }

    let route = routes.get(&path);
    hits.lock().unwrap().push(Hit {
        path,
        arrived,
        responded: Instant::now(),
    });

    match route {
        Some(Route::Raw(raw)) => {
            let _ = stream.write_all(raw);
        }
        Some(Route::Body(body)) => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nContent-Type: application/octet-stream\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(body);
        }
        None => {
            let _ = stream.write_all(
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
            );
        }
    }
    let _ = stream.flush();
}

/// Deterministic body of `len` bytes, distinct per `seed`.
pub fn body(seed: u8, len: usize) -> Vec<u8> {
    (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
}
