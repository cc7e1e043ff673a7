// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTTP listener.
//
// A single accept loop hands every connection to its own task. Each task
// reads one request, routes it, writes the response, and closes the socket.
// `stop` ends the accept loop; requests already in flight run to completion.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use spoolgate_core::config::ServerConfig;
use spoolgate_core::error::{Result, SpoolgateError};
use spoolgate_print::PrintService;

use crate::http::{self, HttpResponse, ReadError};
use crate::routes;

/// State shared with every connection task.
struct SharedState {
    service: PrintService,
    max_body_bytes: usize,
    active_connections: Arc<AtomicU32>,
}

/// The gateway's HTTP server.
pub struct HttpServer {
    /// Address to bind; port 0 picks a free port.
    bind_addr: SocketAddr,
    max_body_bytes: usize,
    service: PrintService,
    shutdown_signal: Arc<Notify>,
    task_handle: Option<JoinHandle<()>>,
    active_connections: Arc<AtomicU32>,
    /// Set while the listener is bound.
    local_addr: Option<SocketAddr>,
}

impl HttpServer {
    /// Create a stopped server. Call [`start`](Self::start) to bind.
    pub fn new(config: &ServerConfig, service: PrintService) -> Self {
        Self {
            bind_addr: SocketAddr::new(config.host, config.port),
            max_body_bytes: config.max_body_bytes,
            service,
            shutdown_signal: Arc::new(Notify::new()),
            task_handle: None,
            active_connections: Arc::new(AtomicU32::new(0)),
            local_addr: None,
        }
    }

    /// The bound address, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Number of connections currently being served.
    pub fn active_connections(&self) -> u32 {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Bind the listener and start accepting connections.
    ///
    /// # Errors
    ///
    /// Returns `SpoolgateError::Server` if the address cannot be bound.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if let Some(addr) = self.local_addr.filter(|_| self.is_running()) {
            debug!(%addr, "HTTP server already running");
            return Ok(addr);
        }

        let listener = TcpListener::bind(self.bind_addr)
            .await
            .map_err(|e| SpoolgateError::Server(format!("bind {}: {e}", self.bind_addr)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| SpoolgateError::Server(format!("local address: {e}")))?;

        info!(addr = %local_addr, "HTTP server listening");

        let shared = Arc::new(SharedState {
            service: self.service.clone(),
            max_body_bytes: self.max_body_bytes,
            active_connections: Arc::clone(&self.active_connections),
        });
        let shutdown = Arc::clone(&self.shutdown_signal);

        self.task_handle = Some(tokio::spawn(async move {
            Self::accept_loop(listener, shutdown, shared).await;
        }));
        self.local_addr = Some(local_addr);
        Ok(local_addr)
    }

    /// Stop accepting connections and wait for the accept loop to exit.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.task_handle.take() else {
            return Ok(());
        };

        info!(
            addr = ?self.local_addr,
            active = self.active_connections(),
            "stopping HTTP server"
        );
        self.shutdown_signal.notify_one();
        handle
            .await
            .map_err(|e| SpoolgateError::Server(format!("task join: {e}")))?;

        self.local_addr = None;
        info!("HTTP server stopped");
        Ok(())
    }

    async fn accept_loop(listener: TcpListener, shutdown: Arc<Notify>, shared: Arc<SharedState>) {
        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    debug!("accept loop received shutdown signal");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            let state = Arc::clone(&shared);
                            tokio::spawn(async move {
                                state.active_connections.fetch_add(1, Ordering::Relaxed);
                                if let Err(e) = Self::handle_connection(stream, peer_addr, &state).await {
                                    warn!(peer = %peer_addr, error = %e, "connection handler error");
                                }
                                state.active_connections.fetch_sub(1, Ordering::Relaxed);
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }
            }
        }
    }

    /// Serve a single request on `stream`.
    async fn handle_connection(
        mut stream: TcpStream,
        peer_addr: SocketAddr,
        state: &SharedState,
    ) -> Result<()> {
        let request = match http::read_request(&mut stream, state.max_body_bytes).await {
            Ok(Some(request)) => request,
            Ok(None) => {
                debug!(peer = %peer_addr, "connection closed before a request");
                return Ok(());
            }
            Err(ReadError::TooLarge(len)) => {
                warn!(peer = %peer_addr, bytes = len, limit = state.max_body_bytes, "request body too large");
                let response = HttpResponse::json(413, &serde_json::json!({ "error": "Payload too large" }));
                return http::write_response(&mut stream, &response).await;
            }
            Err(ReadError::Malformed(reason)) => {
                warn!(peer = %peer_addr, reason, "malformed HTTP request");
                let response = HttpResponse::json(400, &serde_json::json!({ "error": "Bad request" }));
                return http::write_response(&mut stream, &response).await;
            }
            Err(ReadError::Io(e)) => {
                return Err(SpoolgateError::Server(format!("read from {peer_addr}: {e}")));
            }
        };

        let response = routes::route(&request, &state.service).await;
        http::write_response(&mut stream, &response).await?;

        info!(
            peer = %peer_addr,
            method = %request.method,
            path = request.path(),
            status = response.status,
            "request served"
        );
        Ok(())
    }
}
