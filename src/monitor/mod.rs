//! WebSocket subscription lifecycle and the discovery pipeline loop.
//!
//! One connection and one receive loop at a time. Downstream processing
//! of a candidate (fetch, parse, resolve, persist) runs to completion
//! before the next message is read; the transport's receive buffer is
//! the only slack under load.

pub mod dispatcher;

use std::sync::atomic::{ AtomicBool, Ordering };
use std::sync::Arc;
use std::time::{ Duration, Instant };

use futures_util::{ SinkExt, StreamExt };
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{ sleep, timeout };
use tokio_tungstenite::{ connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream };

use crate::config::Config;
use crate::database::Database;
use crate::endpoints::{ EndpointPool, EndpointRole };
use crate::errors::MonitorError;
use crate::logger::Logger;
use crate::monitor::dispatcher::{ NotificationDispatcher, Verdict };
use crate::pools::{ PoolInfo, PoolInfoParser };
use crate::tokens::SymbolResolver;
use crate::transactions::TransactionFetcher;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a single receive waits before re-checking the running flag,
/// keeping shutdown latency low even with no traffic.
const RECEIVE_WAIT: Duration = Duration::from_secs(2);

/// How long to wait for the subscribe acknowledgement.
const SUBSCRIBE_ACK_WAIT: Duration = Duration::from_secs(10);

/// Subscription lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Disconnected,
    Connecting,
    Subscribed,
    Listening,
    Reconnecting,
    Terminated,
}

/// Cloneable handle that requests a cooperative shutdown. The monitor
/// polls the flag between messages; an in-flight candidate is allowed
/// to finish.
#[derive(Clone)]
pub struct ShutdownHandle {
    running: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Deserialize)]
struct SubscribeReply {
    result: Option<u64>,
    error: Option<serde_json::Value>,
}

enum ListenOutcome {
    Stopped,
}

pub struct PoolMonitor {
    config: Config,
    endpoints: EndpointPool,
    dispatcher: NotificationDispatcher,
    fetcher: TransactionFetcher,
    parser: PoolInfoParser,
    resolver: SymbolResolver,
    database: Database,
    discovered_tx: mpsc::UnboundedSender<PoolInfo>,
    running: Arc<AtomicBool>,
    state: MonitorState,
    subscription_id: Option<u64>,
    reconnect_attempts: u32,
    notification_count: u64,
    pools_found: u64,
    last_heartbeat: Instant,
}

impl PoolMonitor {
    /// Build a monitor and the channel on which discovered pools are
    /// announced to the outside world.
    pub fn new(config: Config, database: Database) -> (Self, mpsc::UnboundedReceiver<PoolInfo>) {
        let (discovered_tx, discovered_rx) = mpsc::unbounded_channel();
        let endpoints = EndpointPool::new(
            config.rpc_endpoints.clone(),
            config.resolved_ws_endpoints()
        );

        let monitor = Self {
            endpoints,
            dispatcher: NotificationDispatcher::new(),
            fetcher: TransactionFetcher::new(config.fetch.clone()),
            parser: PoolInfoParser::new(config.program_id.clone()),
            resolver: SymbolResolver::new(),
            database,
            discovered_tx,
            running: Arc::new(AtomicBool::new(false)),
            state: MonitorState::Disconnected,
            subscription_id: None,
            reconnect_attempts: 0,
            notification_count: 0,
            pools_found: 0,
            last_heartbeat: Instant::now(),
            config,
        };

        (monitor, discovered_rx)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            running: self.running.clone(),
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn pools_found(&self) -> u64 {
        self.pools_found
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// Run until explicitly stopped or reconnect attempts are exhausted.
    ///
    /// Exhaustion is the only error this returns; everything else is
    /// absorbed by the reconnect loop.
    pub async fn run(&mut self) -> Result<(), MonitorError> {
        self.running.store(true, Ordering::SeqCst);
        self.last_heartbeat = Instant::now();
        Logger::monitor("Starting pool monitor");

        while self.is_running() {
            self.state = MonitorState::Connecting;
            match self.connect_and_listen().await {
                Ok(ListenOutcome::Stopped) => {
                    break;
                }
                Err(error) => {
                    self.reconnect_attempts += 1;
                    if self.reconnect_attempts >= self.config.max_reconnect_attempts {
                        Logger::error(
                            &format!(
                                "Max reconnection attempts reached ({}), giving up",
                                self.reconnect_attempts
                            )
                        );
                        self.state = MonitorState::Terminated;
                        return Err(MonitorError::ReconnectExhausted {
                            attempts: self.reconnect_attempts,
                        });
                    }

                    self.state = MonitorState::Reconnecting;
                    Logger::warn(
                        &format!(
                            "Connection lost ({}), reconnect attempt {}/{} in {}s",
                            error,
                            self.reconnect_attempts,
                            self.config.max_reconnect_attempts,
                            self.config.reconnect_interval_secs
                        )
                    );
                    // Rotate both roles: a flaky provider usually serves both
                    self.endpoints.rotate(EndpointRole::Ws);
                    self.endpoints.rotate(EndpointRole::Rpc);
                    sleep(Duration::from_secs(self.config.reconnect_interval_secs)).await;
                }
            }
        }

        self.state = MonitorState::Terminated;
        Logger::monitor("Pool monitor stopped");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn connect_and_listen(&mut self) -> Result<ListenOutcome, MonitorError> {
        let ws_url = self.endpoints.current(EndpointRole::Ws).to_string();
        Logger::monitor(&format!("Connecting to WebSocket: {}", ws_url));

        let (mut ws, _) = connect_async(ws_url.clone()).await.map_err(|e| MonitorError::Connect {
            endpoint: ws_url,
            message: e.to_string(),
        })?;

        self.subscribe(&mut ws).await?;
        self.state = MonitorState::Subscribed;
        // A successful subscription proves the endpoint is healthy again
        self.reconnect_attempts = 0;
        self.last_heartbeat = Instant::now();

        self.state = MonitorState::Listening;
        self.listen(&mut ws).await
    }

    async fn subscribe(&mut self, ws: &mut WsStream) -> Result<(), MonitorError> {
        let request =
            json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "logsSubscribe",
            "params": [
                {"mentions": [self.config.program_id]},
                {"commitment": "finalized"}
            ]
        });

        ws
            .send(Message::Text(request.to_string())).await
            .map_err(|e| MonitorError::Subscribe(e.to_string()))?;

        let raw = match timeout(SUBSCRIBE_ACK_WAIT, ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => text,
            Ok(Some(Ok(other))) => {
                return Err(
                    MonitorError::Subscribe(format!("unexpected acknowledgement frame: {}", other))
                );
            }
            Ok(Some(Err(e))) => {
                return Err(MonitorError::Subscribe(e.to_string()));
            }
            Ok(None) => {
                return Err(MonitorError::ConnectionClosed);
            }
            Err(_) => {
                return Err(
                    MonitorError::Subscribe("timed out waiting for acknowledgement".to_string())
                );
            }
        };

        let reply: SubscribeReply = serde_json
            ::from_str(&raw)
            .map_err(|e| MonitorError::Subscribe(format!("malformed acknowledgement: {}", e)))?;

        if let Some(error) = reply.error {
            return Err(MonitorError::Subscribe(error.to_string()));
        }

        let id = reply.result.ok_or_else(|| {
            MonitorError::Subscribe("acknowledgement carried no subscription id".to_string())
        })?;

        self.subscription_id = Some(id);
        Logger::success(&format!("Subscribed to program logs (subscription id {})", id));
        Logger::monitor(
            &format!("Listening for pool creation events from program {}", self.config.program_id)
        );

        Ok(())
    }

    async fn listen(&mut self, ws: &mut WsStream) -> Result<ListenOutcome, MonitorError> {
        loop {
            if !self.is_running() {
                self.unsubscribe(ws).await;
                return Ok(ListenOutcome::Stopped);
            }

            self.heartbeat();

            let message = match timeout(RECEIVE_WAIT, ws.next()).await {
                // No traffic; loop back to observe the running flag
                Err(_) => {
                    continue;
                }
                Ok(None) => {
                    return Err(MonitorError::ConnectionClosed);
                }
                Ok(Some(Err(e))) => {
                    return Err(MonitorError::Receive(e.to_string()));
                }
                Ok(Some(Ok(message))) => message,
            };

            match message {
                Message::Text(text) => self.handle_message(&text).await,
                Message::Close(_) => {
                    return Err(MonitorError::ConnectionClosed);
                }
                // Ping/pong handled by the transport, binary ignored
                _ => {}
            }
        }
    }

    /// Periodic throughput summary; no state change.
    fn heartbeat(&mut self) {
        let interval = Duration::from_secs(self.config.heartbeat_interval_secs);
        if self.last_heartbeat.elapsed() >= interval {
            Logger::monitor(
                &format!(
                    "Processed {} notifications in last {}s, total pools found: {}",
                    self.notification_count,
                    self.config.heartbeat_interval_secs,
                    self.pools_found
                )
            );
            self.notification_count = 0;
            self.last_heartbeat = Instant::now();
        }
    }

    async fn handle_message(&mut self, raw: &str) {
        match self.dispatcher.evaluate(raw) {
            Verdict::NotAnEvent => {}
            Verdict::Ignore => {
                self.notification_count += 1;
            }
            Verdict::Fetch(signature) => {
                self.notification_count += 1;
                Logger::pool(
                    &format!("Potential new pool detected in transaction: {}", signature)
                );
                self.process_candidate(&signature).await;
            }
        }
    }

    /// Fetch, parse, resolve, persist one claimed candidate.
    ///
    /// Failures here are logged and isolated to this candidate; the
    /// signature stays claimed either way.
    async fn process_candidate(&mut self, signature: &str) {
        let rpc_url = self.endpoints.current(EndpointRole::Rpc).to_string();

        let record = match self.fetcher.fetch(&rpc_url, signature).await {
            Ok(record) => record,
            Err(error) => {
                Logger::warn(&format!("Dropping candidate {}: {}", signature, error));
                return;
            }
        };

        if !self.parser.is_pool_initialization(&record) {
            Logger::debug(&format!("Transaction {} is not a pool initialization", signature));
            return;
        }

        let (mut pool, target_mint, pair_mint) = match self.parser.parse(&record) {
            Ok(parsed) => parsed,
            Err(error) => {
                Logger::debug(&format!("Could not parse pool info from {}: {}", signature, error));
                return;
            }
        };

        let token_symbol = self.resolver.resolve(&rpc_url, &target_mint).await;
        let pair_symbol = self.resolver.resolve(&rpc_url, &pair_mint).await;
        pool.token_symbol = token_symbol.clone();

        match self.database.save_pool(&pool, &token_symbol, &pair_symbol) {
            Ok(true) => {
                self.pools_found += 1;
                Logger::success(
                    &format!(
                        "New pool recorded: {} ({}-{})",
                        pool.address,
                        token_symbol,
                        pair_symbol
                    )
                );
                // Receiver may be gone; discovery itself already succeeded
                let _ = self.discovered_tx.send(pool);
            }
            Ok(false) => {
                Logger::database(&format!("Pool {} already recorded, skipping", pool.address));
            }
            Err(error) => {
                Logger::error(&format!("Failed to save pool {}: {}", pool.address, error));
            }
        }
    }

    /// Best-effort unsubscribe on explicit stop. Failure is logged, never
    /// escalated.
    async fn unsubscribe(&mut self, ws: &mut WsStream) {
        let Some(id) = self.subscription_id.take() else {
            return;
        };

        let request =
            json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "logsUnsubscribe",
            "params": [id]
        });

        match ws.send(Message::Text(request.to_string())).await {
            Ok(()) => Logger::monitor("Unsubscribed from program logs"),
            Err(error) => Logger::warn(&format!("Failed to unsubscribe cleanly: {}", error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::default();
        // Nothing listens on the discard port; connects are refused instantly
        config.rpc_endpoints = vec!["http://127.0.0.1:9".to_string()];
        config.ws_endpoints = vec!["ws://127.0.0.1:9".to_string()];
        config.reconnect_interval_secs = 0;
        config.max_reconnect_attempts = 3;
        config
    }

    #[tokio::test]
    async fn reconnect_attempts_are_bounded() {
        let database = Database::open(":memory:").unwrap();
        let (mut monitor, _discovered) = PoolMonitor::new(test_config(), database);

        let result = timeout(Duration::from_secs(30), monitor.run()).await.expect(
            "monitor did not terminate"
        );

        match result {
            Err(MonitorError::ReconnectExhausted { attempts }) => assert_eq!(attempts, 3),
            other => panic!("expected ReconnectExhausted, got {:?}", other),
        }
        assert_eq!(monitor.state(), MonitorState::Terminated);
        assert_eq!(monitor.reconnect_attempts(), 3);
    }

    #[tokio::test]
    async fn monitor_starts_disconnected() {
        let database = Database::open(":memory:").unwrap();
        let (monitor, _discovered) = PoolMonitor::new(test_config(), database);

        assert_eq!(monitor.state(), MonitorState::Disconnected);
        assert_eq!(monitor.pools_found(), 0);
        assert!(!monitor.shutdown_handle().is_running());
    }
}
