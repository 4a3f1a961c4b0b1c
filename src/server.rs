//! HTTP server implementation using hyper.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::header::HeaderValue;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto;
use tokio::net::TcpListener;
use tokio::sync::{Semaphore, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{Config, SharedConfig};
use crate::response::{HttpResponse, error_body};
use crate::router::{Context, RouteMatch, RouterHandle};
use crate::store::ProfileStore;

/// Maximum request body size in bytes (1 MB).
const MAX_BODY_SIZE: usize = 1_048_576;

/// Maximum number of concurrent connections.
const MAX_CONNECTIONS: usize = 128;

/// Timeout for reading request headers (slowloris protection).
const HEADER_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// Shared server state.
pub struct State {
    pub config: SharedConfig,
    pub store: Arc<dyn ProfileStore>,
    pub router: Arc<RouterHandle>,
}

/// Handle to a running server instance.
pub struct Server {
    addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<crate::Result<()>>,
}

impl Server {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shut down the accept loop and wait for it to finish.
    pub async fn shutdown(self) -> crate::Result<()> {
        let _ = self.shutdown_tx.send(());
        self.task.await.unwrap_or(Ok(()))
    }
}

/// The request origin, if it is on the allowlist.
fn allowed_origin<'a>(origin: Option<&'a str>, allowlist: &[String]) -> Option<&'a str> {
    origin.filter(|o| allowlist.iter().any(|allowed| allowed == o))
}

/// Add security, caching and CORS headers to a response.
fn add_standard_headers(response: &mut HttpResponse, origin: Option<&str>) {
    let headers = response.headers_mut();
    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    // Responses carry tokens and permission sets.
    headers.insert("Cache-Control", HeaderValue::from_static("no-store"));
    if let Some(origin) = origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        headers.insert("Access-Control-Allow-Origin", origin);
        headers.insert("Vary", HeaderValue::from_static("Origin"));
    }
}

fn preflight() -> HttpResponse {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Methods", "GET, POST, DELETE")
        .header("Access-Control-Allow-Headers", "Authorization, Content-Type")
        .header("Access-Control-Max-Age", "600")
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Handle an incoming HTTP request.
async fn handle_request(
    req: Request<Incoming>,
    state: Arc<State>,
) -> Result<HttpResponse, std::convert::Infallible> {
    let (parts, body) = req.into_parts();

    let origin = allowed_origin(
        parts.headers.get("origin").and_then(|v| v.to_str().ok()),
        &state.config.server.cors_origins,
    )
    .map(str::to_string);

    if parts.method == Method::OPTIONS && origin.is_some() {
        let mut response = preflight();
        add_standard_headers(&mut response, origin.as_deref());
        return Ok(response);
    }

    // Reject oversized bodies early via Content-Length header
    if let Some(len) = parts
        .headers
        .get(hyper::header::CONTENT_LENGTH)
        .and_then(|cl| cl.to_str().ok())
        .and_then(|cl| cl.parse::<usize>().ok())
        && len > MAX_BODY_SIZE
    {
        let mut response = error_body(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large");
        add_standard_headers(&mut response, origin.as_deref());
        return Ok(response);
    }

    // Read body with size limit (fallback for chunked encoding)
    let body_bytes = match BodyExt::collect(Limited::new(body, MAX_BODY_SIZE)).await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => {
            let mut response = error_body(StatusCode::PAYLOAD_TOO_LARGE, "Payload too large");
            add_standard_headers(&mut response, origin.as_deref());
            return Ok(response);
        }
    };

    let path = parts.uri.path().to_string();
    debug!(method = %parts.method, %path, "request");

    let mut response = match state.router.match_route(&parts.method, &path) {
        RouteMatch::Matched { handler, params } => {
            let ctx = Context {
                method: parts.method,
                uri: parts.uri,
                headers: parts.headers,
                params,
                body: body_bytes,
                config: Arc::clone(&state.config),
                store: Arc::clone(&state.store),
            };

            match handler(ctx).await {
                Ok(response) => response,
                Err(e) => e.into_response(),
            }
        }
        RouteMatch::MethodNotAllowed => {
            error_body(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
        }
        RouteMatch::NotFound => error_body(StatusCode::NOT_FOUND, "Not found"),
    };

    add_standard_headers(&mut response, origin.as_deref());
    Ok(response)
}

/// Bind, start accepting connections, and return a handle.
///
/// The returned [`Server`] exposes the bound address and a
/// [`shutdown`](Server::shutdown) method for graceful termination.
pub async fn start(
    config: Config,
    store: Arc<dyn ProfileStore>,
    router: Arc<RouterHandle>,
) -> crate::Result<Server> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    let state = Arc::new(State {
        config: Arc::new(config),
        store,
        router,
    });

    info!("Server listening on http://{}", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let semaphore = Arc::new(Semaphore::new(MAX_CONNECTIONS));

    let task = tokio::spawn(async move {
        tokio::pin!(shutdown_rx);

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, remote_addr) = result?;
                    let io = TokioIo::new(stream);

                    match semaphore.clone().try_acquire_owned() {
                        Ok(permit) => {
                            let state = Arc::clone(&state);
                            tokio::spawn(async move {
                                let service = service_fn(move |req| {
                                    let state = Arc::clone(&state);
                                    handle_request(req, state)
                                });

                                let mut builder = auto::Builder::new(TokioExecutor::new());
                                builder.http1()
                                    .timer(TokioTimer::new())
                                    .header_read_timeout(HEADER_READ_TIMEOUT);

                                if let Err(e) = builder.serve_connection(io, service).await {
                                    error!("Error serving connection from {}: {}", remote_addr, e);
                                }

                                drop(permit);
                            });
                        }
                        Err(_) => {
                            warn!("Connection limit reached, rejecting {}", remote_addr);
                            tokio::spawn(async move {
                                let service = service_fn(|_req: Request<Incoming>| async {
                                    Ok::<_, std::convert::Infallible>(error_body(
                                        StatusCode::SERVICE_UNAVAILABLE,
                                        "Service unavailable",
                                    ))
                                });

                                let mut builder = auto::Builder::new(TokioExecutor::new());
                                builder.http1()
                                    .timer(TokioTimer::new())
                                    .header_read_timeout(HEADER_READ_TIMEOUT);

                                let _ = builder.serve_connection(io, service).await;
                            });
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    info!("Server shutting down");
                    break;
                }
            }
        }

        Ok(())
    });

    Ok(Server {
        addr,
        shutdown_tx,
        task,
    })
}

/// Run the HTTP server until the accept loop ends.
pub async fn run(
    config: Config,
    store: Arc<dyn ProfileStore>,
    router: Arc<RouterHandle>,
) -> crate::Result<()> {
    let server = start(config, store, router).await?;
    server.task.await.unwrap_or(Ok(()))
}
