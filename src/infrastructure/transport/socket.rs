#[cfg(test)]
#[path = "socket_test.rs"]
mod tests;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use futures::SinkExt;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;

use crate::domain::models::Event;
use crate::domain::models::FrameContext;
use crate::domain::models::OutboundFrame;
use crate::domain::models::Status;

pub struct SocketOptions {
    pub server_url: String,
    pub context: FrameContext,
    pub heartbeat_interval: Duration,
}

/// Supervises one live connection to the assistant server. Status changes
/// and parsed inbound frames are delivered over the event channel handed in
/// at construction; outbound sends are fire-and-forget.
pub struct Socket {
    options: SocketOptions,
    events: mpsc::UnboundedSender<Event>,
    connected: Arc<AtomicBool>,
    outbound: Option<mpsc::UnboundedSender<WsMessage>>,
    cancel: Option<CancellationToken>,
}

impl Socket {
    pub fn new(options: SocketOptions, events: mpsc::UnboundedSender<Event>) -> Socket {
        return Socket {
            options,
            events,
            connected: Arc::new(AtomicBool::new(false)),
            outbound: None,
            cancel: None,
        };
    }

    pub fn is_connected(&self) -> bool {
        return self.connected.load(Ordering::SeqCst);
    }

    /// Dials the server. Resolves once the handshake completes; a live
    /// connection is reused rather than re-dialed.
    pub async fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        let res = connect_async(self.options.server_url.as_str()).await;
        let (stream, _) = match res {
            Ok(pair) => pair,
            Err(err) => {
                tracing::error!(error = ?err, url = self.options.server_url, "Connection failed");
                let _ = self.events.send(Event::SocketStatus(Status::Error));
                return Err(err.into());
            }
        };

        // Each connection gets its own liveness flag so a previous read
        // loop winding down cannot mark this one dead.
        self.connected = Arc::new(AtomicBool::new(true));
        let _ = self.events.send(Event::SocketStatus(Status::Connected));

        let (mut sink, mut source) = stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<WsMessage>();
        let token = CancellationToken::new();

        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                if let Err(err) = sink.send(message).await {
                    tracing::warn!(error = ?err, "Socket write failed");
                    break;
                }
            }
        });

        let events = self.events.clone();
        let connected = self.connected.clone();
        let read_token = token.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = read_token.cancelled() => break,
                    message = source.next() => match message {
                        Some(Ok(WsMessage::Text(payload))) => match serde_json::from_str(&payload) {
                            Ok(value) => {
                                let _ = events.send(Event::SocketFrame(value));
                            }
                            Err(err) => {
                                tracing::warn!(error = ?err, "Failed to parse inbound frame");
                            }
                        },
                        Some(Ok(WsMessage::Close(_))) => break,
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            tracing::warn!(error = ?err, "Socket read failed");
                            break;
                        }
                        None => break,
                    },
                }
            }

            connected.store(false, Ordering::SeqCst);
            read_token.cancel();
            let _ = events.send(Event::SocketStatus(Status::Disconnected));
        });

        let heartbeat_tx = outbound_tx.clone();
        let heartbeat_context = self.options.context.to_owned();
        let heartbeat_token = token.clone();
        let interval = self.options.heartbeat_interval;
        tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = heartbeat_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let frame = OutboundFrame::ping(heartbeat_context.to_owned());
                        match serde_json::to_string(&frame) {
                            Ok(payload) => {
                                if heartbeat_tx.send(WsMessage::Text(payload)).is_err() {
                                    break;
                                }
                            }
                            Err(_) => break,
                        }
                    }
                }
            }
        });

        self.outbound = Some(outbound_tx);
        self.cancel = Some(token);
        return Ok(());
    }

    /// Fire-and-forget. Sending while the socket is closed is a silent
    /// no-op; callers watch the status channel instead of a return value.
    pub fn send(&self, frame: &OutboundFrame) {
        if !self.is_connected() {
            return;
        }

        let sender = match &self.outbound {
            Some(sender) => sender,
            None => return,
        };

        match serde_json::to_string(frame) {
            Ok(payload) => {
                let _ = sender.send(WsMessage::Text(payload));
            }
            Err(err) => {
                tracing::warn!(error = ?err, "Failed to serialize outbound frame");
            }
        }
    }

    /// Idempotent. The read loop owns the disconnected status transition so
    /// a server-side close and a local disconnect report identically.
    pub fn disconnect(&mut self) {
        self.connected.store(false, Ordering::SeqCst);

        if let Some(sender) = self.outbound.take() {
            let _ = sender.send(WsMessage::Close(None));
        }
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}
