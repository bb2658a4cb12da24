//! SBI HTTP/2 Server
//!
//! HTTP/2 server implementation using hyper for SBI communication.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http2;
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

use crate::constants::{cause, content_type, status};
use crate::error::{SbiError, SbiResult};
use crate::message::{ProblemDetails, SbiHeader, SbiHttpMessage, SbiRequest, SbiResponse};

/// Default upper bound on a request body, in octets
pub const OGS_SBI_MAX_BODY_SIZE: usize = 64 * 1024;

/// Server configuration
#[derive(Debug, Clone)]
pub struct SbiServerConfig {
    /// Bind address
    pub addr: SocketAddr,
    /// Request bodies above this size are answered with 413
    pub max_body_size: usize,
}

impl Default for SbiServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 7777)))
    }
}

impl SbiServerConfig {
    /// Create a new server configuration
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            max_body_size: OGS_SBI_MAX_BODY_SIZE,
        }
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Create configuration with host and port
    pub fn with_host_port(host: impl AsRef<str>, port: u16) -> SbiResult<Self> {
        let host = host.as_ref();
        // Bare IPv6 literals need brackets before the port is appended
        let addr = if host.contains(':') && !host.starts_with('[') {
            format!("[{}]:{}", host, port)
        } else {
            format!("{}:{}", host, port)
        };
        let addr: SocketAddr = addr
            .parse()
            .map_err(|e| SbiError::InvalidUri(format!("Invalid address: {}", e)))?;
        Ok(Self::new(addr))
    }
}

/// Request handler trait
pub trait SbiRequestHandler: Send + Sync + 'static {
    /// Handle an incoming SBI request
    fn handle(&self, request: SbiRequest) -> Pin<Box<dyn Future<Output = SbiResponse> + Send>>;
}

/// Function-based request handler
impl<F, Fut> SbiRequestHandler for F
where
    F: Fn(SbiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = SbiResponse> + Send + 'static,
{
    fn handle(&self, request: SbiRequest) -> Pin<Box<dyn Future<Output = SbiResponse> + Send>> {
        Box::pin(self(request))
    }
}

/// Hyper service wrapper
struct SbiService<H: SbiRequestHandler> {
    handler: Arc<H>,
    max_body_size: usize,
}

impl<H: SbiRequestHandler> Clone for SbiService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            max_body_size: self.max_body_size,
        }
    }
}

impl<H: SbiRequestHandler> Service<Request<Incoming>> for SbiService<H> {
    type Response = Response<Full<Bytes>>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let handler = self.handler.clone();
        let max_body_size = self.max_body_size;

        Box::pin(async move {
            let sbi_response = match convert_request(req, max_body_size).await {
                Ok(sbi_request) => handler.handle(sbi_request).await,
                Err(response) => response,
            };
            Ok(convert_response(sbi_response))
        })
    }
}

/// Convert hyper request to SbiRequest
///
/// The body is read through a length limit; an oversized body yields the
/// 413 response to send instead of a request.
async fn convert_request<B>(
    req: Request<B>,
    max_body_size: usize,
) -> Result<SbiRequest, SbiResponse>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().to_string();
    let uri = req.uri().to_string();

    // Extract headers
    let mut http = SbiHttpMessage::new();
    for (key, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            http.set_header(key.to_string(), v.to_string());
        }
    }

    // Extract query parameters
    if let Some(query) = req.uri().query() {
        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=') {
                http.set_param(key.to_string(), value.to_string());
            }
        }
    }

    // Read body
    match Limited::new(req.into_body(), max_body_size).collect().await {
        Ok(body) => {
            let bytes = body.to_bytes();
            if !bytes.is_empty() {
                http.set_content(String::from_utf8_lossy(&bytes).to_string());
            }
        }
        Err(e) if e.is::<LengthLimitError>() => {
            log::warn!("{} {}: request body exceeds {} octets", method, uri, max_body_size);
            return Err(send_error(
                status::PAYLOAD_TOO_LARGE,
                "Payload Too Large",
                &format!("Request body exceeds {} octets", max_body_size),
                None,
            ));
        }
        Err(e) => log::warn!("Failed to read request body: {}", e),
    }

    Ok(SbiRequest {
        header: SbiHeader::with_method_uri(method, uri),
        http,
    })
}

/// Convert SbiResponse to hyper response
fn convert_response(sbi_response: SbiResponse) -> Response<Full<Bytes>> {
    let mut builder = Response::builder().status(sbi_response.status);

    for (key, value) in &sbi_response.http.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    let body = sbi_response
        .http
        .content
        .map(|c| Full::new(Bytes::from(c)))
        .unwrap_or_else(|| Full::new(Bytes::new()));

    builder.body(body).unwrap_or_else(|e| {
        log::error!("Failed to build HTTP response: {}", e);
        let mut response = Response::new(Full::new(Bytes::from("Internal Server Error")));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

/// Server state
enum ServerState {
    Stopped,
    Running(oneshot::Sender<()>),
}

/// SBI Server - HTTP/2 (prior knowledge) server for SBI communication
pub struct SbiServer {
    config: SbiServerConfig,
    state: Arc<Mutex<ServerState>>,
}

impl SbiServer {
    /// Create a new SBI server
    pub fn new(config: SbiServerConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(ServerState::Stopped)),
        }
    }

    /// Get the server configuration
    pub fn config(&self) -> &SbiServerConfig {
        &self.config
    }

    /// Start the server with a request handler
    ///
    /// Returns the bound address, which differs from the configured one
    /// when port 0 was requested.
    pub async fn start<H: SbiRequestHandler>(&self, handler: H) -> SbiResult<SocketAddr> {
        let mut state = self.state.lock().await;

        if matches!(*state, ServerState::Running(_)) {
            return Err(SbiError::ServerError("Server already running".to_string()));
        }

        let listener = TcpListener::bind(self.config.addr)
            .await
            .map_err(|e| SbiError::ServerError(format!("Failed to bind: {}", e)))?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        *state = ServerState::Running(shutdown_tx);
        drop(state);

        let handler = Arc::new(handler);
        let max_body_size = self.config.max_body_size;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    result = listener.accept() => {
                        match result {
                            Ok((stream, peer)) => {
                                log::debug!("SBI connection from {}", peer);
                                let io = TokioIo::new(stream);
                                let service = SbiService {
                                    handler: handler.clone(),
                                    max_body_size,
                                };

                                tokio::spawn(async move {
                                    if let Err(e) = http2::Builder::new(TokioExecutor::new())
                                        .serve_connection(io, service)
                                        .await
                                    {
                                        log::warn!("HTTP/2 connection error: {}", e);
                                    }
                                });
                            }
                            Err(e) => {
                                log::error!("Accept error: {}", e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        break;
                    }
                }
            }
        });

        Ok(local_addr)
    }

    /// Stop the server
    pub async fn stop(&self) -> SbiResult<()> {
        let mut state = self.state.lock().await;

        if let ServerState::Running(shutdown_tx) =
            std::mem::replace(&mut *state, ServerState::Stopped)
        {
            let _ = shutdown_tx.send(());
        }

        Ok(())
    }

    /// Check if the server is running
    pub async fn is_running(&self) -> bool {
        let state = self.state.lock().await;
        matches!(*state, ServerState::Running(_))
    }
}

/// Build an error response with a ProblemDetails body
pub fn send_error(status: u16, title: &str, detail: &str, cause: Option<&str>) -> SbiResponse {
    let problem = ProblemDetails::with_status(status as i32)
        .with_title(title)
        .with_detail(detail);

    let problem = if let Some(c) = cause {
        problem.with_cause(c)
    } else {
        problem
    };

    match serde_json::to_string(&problem) {
        Ok(body) => SbiResponse::with_status(status)
            .with_body(body, content_type::APPLICATION_PROBLEM_JSON),
        Err(_) => SbiResponse::with_status(status),
    }
}

/// Send a 400 Bad Request error response
pub fn send_bad_request(detail: &str, cause: Option<&str>) -> SbiResponse {
    send_error(status::BAD_REQUEST, "Bad Request", detail, cause)
}

/// Send a 403 Forbidden error response
pub fn send_forbidden(detail: &str, cause: Option<&str>) -> SbiResponse {
    send_error(status::FORBIDDEN, "Forbidden", detail, cause)
}

/// Send a 404 Not Found error response
pub fn send_not_found(detail: &str, cause: Option<&str>) -> SbiResponse {
    send_error(status::NOT_FOUND, "Not Found", detail, cause)
}

/// Send a 405 Method Not Allowed error response
pub fn send_method_not_allowed(method: &str, resource: &str) -> SbiResponse {
    send_error(
        status::METHOD_NOT_ALLOWED,
        "Method Not Allowed",
        &format!("Method {} not allowed for resource {}", method, resource),
        Some(cause::METHOD_NOT_ALLOWED),
    )
}

/// Send a 500 Internal Server Error response
pub fn send_internal_error(detail: &str, cause: Option<&str>) -> SbiResponse {
    send_error(status::INTERNAL_SERVER_ERROR, "Internal Server Error", detail, cause)
}

/// Send a 501 Not Implemented error response
pub fn send_not_implemented(detail: &str) -> SbiResponse {
    send_error(
        status::NOT_IMPLEMENTED,
        "Not Implemented",
        detail,
        Some(cause::NOT_IMPLEMENTED),
    )
}
