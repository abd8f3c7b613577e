//! Per-call choice between HTTP and WebSocket, probing in `auto` mode.

use std::sync::Arc;
use std::time::Duration;

use async_lock::OnceCell;
use async_trait::async_trait;

use crate::http::InscriptionHttp;
use crate::logging::Logger;
use crate::transport::{ConnectionMode, TransportKind};
use crate::ws::WsSession;

/// Bounded "can a session be opened right now" check.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self, endpoint: &str, timeout: Duration) -> bool;
}

/// Probes by completing a full Socket.IO handshake, then closing it.
pub struct SocketIoProbe {
    api_key: String,
}

impl SocketIoProbe {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ConnectivityProbe for SocketIoProbe {
    async fn probe(&self, endpoint: &str, timeout: Duration) -> bool {
        WsSession::probe(endpoint, &self.api_key, timeout).await
    }
}

/// WebSocket base endpoint, configured up front or fetched once from
/// `/inscriptions/websocket-servers`.
pub struct EndpointCache {
    http: InscriptionHttp,
    cell: OnceCell<Option<String>>,
    logger: Arc<dyn Logger>,
}

impl EndpointCache {
    pub fn new(http: InscriptionHttp, configured: Option<String>, logger: Arc<dyn Logger>) -> Self {
        let cell = match configured.filter(|url| !url.is_empty()) {
            Some(url) => OnceCell::from(Some(url)),
            None => OnceCell::new(),
        };
        Self { http, cell, logger }
    }

    /// The cached endpoint. The first call fetches the server list; a failed
    /// fetch is remembered as "no endpoint".
    pub async fn get(&self) -> Option<String> {
        self.cell
            .get_or_init(|| async {
                match self.http.websocket_servers().await {
                    Ok(servers) => {
                        let picked = servers.pick();
                        if picked.is_none() {
                            self.logger.debug("No active WebSocket servers advertised");
                        }
                        picked
                    }
                    Err(e) => {
                        self.logger.debug(&format!(
                            "Could not fetch WebSocket servers, will use HTTP only: {}",
                            e
                        ));
                        None
                    }
                }
            })
            .await
            .clone()
    }
}

pub struct TransportSelector {
    mode: ConnectionMode,
    endpoint: Arc<EndpointCache>,
    probe: Arc<dyn ConnectivityProbe>,
    probe_timeout: Duration,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for TransportSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSelector")
            .field("mode", &self.mode)
            .field("probe_timeout", &self.probe_timeout)
            .finish_non_exhaustive()
    }
}

impl TransportSelector {
    pub fn new(
        mode: ConnectionMode,
        endpoint: Arc<EndpointCache>,
        probe: Arc<dyn ConnectivityProbe>,
        probe_timeout: Duration,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            mode,
            endpoint,
            probe,
            probe_timeout,
            logger,
        }
    }

    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// Transport for the next call.
    ///
    /// `websocket` never probes; an unreachable endpoint surfaces later as a
    /// connection error. `auto` picks WebSocket only when an endpoint is
    /// known and the probe handshake succeeds.
    pub async fn select(&self) -> TransportKind {
        let kind = match self.mode {
            ConnectionMode::Http => TransportKind::Http,
            ConnectionMode::WebSocket => TransportKind::WebSocket,
            ConnectionMode::Auto => match self.endpoint.get().await {
                Some(endpoint) if self.probe.probe(&endpoint, self.probe_timeout).await => {
                    TransportKind::WebSocket
                }
                Some(endpoint) => {
                    self.logger
                        .info(&format!("WebSocket probe to {} failed, using HTTP", endpoint));
                    TransportKind::Http
                }
                None => TransportKind::Http,
            },
        };
        self.logger.info(&format!(
            "Using {:?} transport (connection mode {})",
            kind, self.mode
        ));
        kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::testing::RecordingLogger;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProbe {
        reachable: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ConnectivityProbe for FixedProbe {
        async fn probe(&self, _endpoint: &str, _timeout: Duration) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reachable
        }
    }

    fn probe(reachable: bool) -> Arc<FixedProbe> {
        Arc::new(FixedProbe {
            reachable,
            calls: AtomicUsize::new(0),
        })
    }

    fn http(url: &str) -> InscriptionHttp {
        InscriptionHttp::new(url, "k", Duration::from_secs(2)).unwrap()
    }

    fn selector(
        mode: ConnectionMode,
        endpoint: EndpointCache,
        probe: Arc<FixedProbe>,
    ) -> TransportSelector {
        TransportSelector::new(
            mode,
            Arc::new(endpoint),
            probe,
            Duration::from_secs(3),
            Arc::new(RecordingLogger::default()),
        )
    }

    fn configured(url: &str) -> EndpointCache {
        EndpointCache::new(
            http("http://127.0.0.1:9"),
            Some(url.to_string()),
            Arc::new(RecordingLogger::default()),
        )
    }

    #[tokio::test]
    async fn test_fixed_modes_never_probe() {
        let p = probe(false);
        let s = selector(ConnectionMode::Http, configured("wss://ws"), p.clone());
        assert_eq!(s.select().await, TransportKind::Http);

        let s = selector(ConnectionMode::WebSocket, configured("wss://ws"), p.clone());
        assert_eq!(s.select().await, TransportKind::WebSocket);
        assert_eq!(p.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auto_follows_probe() {
        let s = selector(ConnectionMode::Auto, configured("wss://ws"), probe(true));
        assert_eq!(s.select().await, TransportKind::WebSocket);

        let s = selector(ConnectionMode::Auto, configured("wss://ws"), probe(false));
        assert_eq!(s.select().await, TransportKind::Http);
    }

    #[tokio::test]
    async fn test_auto_without_endpoint_is_http() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/inscriptions/websocket-servers")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let cache = EndpointCache::new(http(&server.url()), None, Arc::new(RecordingLogger::default()));
        let p = probe(true);
        let s = selector(ConnectionMode::Auto, cache, p.clone());

        assert_eq!(s.select().await, TransportKind::Http);
        assert_eq!(s.select().await, TransportKind::Http);
        assert_eq!(p.calls.load(Ordering::SeqCst), 0);
        // The failed fetch is not repeated.
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_endpoint_fetched_once() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/inscriptions/websocket-servers")
            .with_status(200)
            .with_body(r#"{"servers":[{"url":"wss://b","status":"active"}]}"#)
            .expect(1)
            .create_async()
            .await;

        let cache = EndpointCache::new(http(&server.url()), None, Arc::new(RecordingLogger::default()));
        assert_eq!(cache.get().await.as_deref(), Some("wss://b"));
        assert_eq!(cache.get().await.as_deref(), Some("wss://b"));
        mock.assert_async().await;
    }
}
