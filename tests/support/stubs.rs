// ABOUTME: Local TCP and HTTP stubs standing in for the composed services.
// ABOUTME: Each stub runs on its own tokio task and is aborted when the handle drops.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const HOST: &str = "127.0.0.1";

/// Aborts the stub task on drop.
pub struct Stub {
    pub port: u16,
    handle: JoinHandle<()>,
}

impl Drop for Stub {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn html() -> Self {
        Self::new(
            200,
            "<!DOCTYPE html>\n<html>\n<head><title>Bank</title></head>\n<body></body>\n</html>\n",
        )
    }

    pub fn json() -> Self {
        Self::new(200, "{\"status\":\"ok\"}")
    }
}

/// A port nothing is listening on (bound once, then released).
pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind((HOST, 0)).unwrap();
    listener.local_addr().unwrap().port()
}

pub async fn bind(port: u16) -> TcpListener {
    TcpListener::bind((HOST, port)).await.unwrap()
}

/// Serve `replies` in order, repeating the last one.
pub async fn http(replies: Vec<HttpReply>) -> Stub {
    http_on(bind(0).await, replies)
}

pub fn http_on(listener: TcpListener, replies: Vec<HttpReply>) -> Stub {
    assert!(!replies.is_empty(), "stub needs at least one reply");
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let mut served = 0usize;
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let reply = replies[served.min(replies.len() - 1)].clone();
            served += 1;
            tokio::spawn(respond(stream, reply));
        }
    });
    Stub { port, handle }
}

async fn respond(mut stream: TcpStream, reply: HttpReply) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reason(reply.status),
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Accept connections and close them immediately, like a database port.
pub async fn tcp() -> Stub {
    tcp_on(bind(0).await)
}

pub fn tcp_on(listener: TcpListener) -> Stub {
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            drop(stream);
        }
    });
    Stub { port, handle }
}

/// Accept connections and never answer.
pub async fn silent() -> Stub {
    let listener = bind(0).await;
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    Stub { port, handle }
}

/// Answer `200 OK` with a body that never finishes, like a streaming endpoint.
pub async fn stalled_body(body_start: &str) -> Stub {
    let listener = bind(0).await;
    let port = listener.local_addr().unwrap().port();
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 1048576\r\n\r\n{body_start}"
    );
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let _ = stream.write_all(head.as_bytes()).await;
            held.push(stream);
        }
    });
    Stub { port, handle }
}

/// A listener whose accept queue is full and never drained.
///
/// On Linux further connects stall until the caller's timeout.
pub async fn saturated() -> Stub {
    let socket = tokio::net::TcpSocket::new_v4().unwrap();
    socket.bind((HOST.parse::<std::net::IpAddr>().unwrap(), 0).into()).unwrap();
    let listener = socket.listen(1).unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut fillers = Vec::new();
    for _ in 0..8 {
        let connect = TcpStream::connect((HOST, port));
        if let Ok(Ok(stream)) =
            tokio::time::timeout(std::time::Duration::from_millis(50), connect).await
        {
            fillers.push(stream);
        }
    }

    let handle = tokio::spawn(async move {
        let _held = (listener, fillers);
        std::future::pending::<()>().await;
    });
    Stub { port, handle }
}
