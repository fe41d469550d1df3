//! IPC Server for daemon communication
//!
//! Unix socket server that feeds method calls into the command bridge and
//! streams `add` events to the subscribed listener.

use anyhow::{Context, Result};
use flume::Sender;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

use super::ipc::{read_frame, write_frame, MAX_FRAME_SIZE};
use super::shared::{DaemonMessage, DaemonResponse, ErrorReply, PanelStatus};
use crate::panel::{Delivery, PanelContext};

/// IPC server for handling daemon communication
pub struct IpcServer {
    listener: UnixListener,
    context: Arc<PanelContext>,
    surface_name: String,
    shutdown_sender: Sender<()>,
    start_time: Instant,
}

impl IpcServer {
    /// Bind the server socket, replacing a stale socket file
    pub fn new(
        socket_path: &std::path::Path,
        context: Arc<PanelContext>,
        surface_name: impl Into<String>,
        shutdown_sender: Sender<()>,
    ) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .context("Failed to remove existing socket file")?;
        }

        let listener = UnixListener::bind(socket_path)
            .context("Failed to bind Unix socket")?;

        info!("IPC server bound to socket: {}", socket_path.display());

        Ok(IpcServer {
            listener,
            context,
            surface_name: surface_name.into(),
            shutdown_sender,
            start_time: Instant::now(),
        })
    }

    /// Accept connections until the surrounding task is dropped
    pub async fn run(self) -> Result<()> {
        info!("IPC server started");

        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    debug!("New IPC client connection");
                    let context = self.context.clone();
                    let surface_name = self.surface_name.clone();
                    let shutdown_sender = self.shutdown_sender.clone();
                    let start_time = self.start_time;

                    tokio::spawn(async move {
                        if let Err(e) = Self::handle_client(
                            stream, context, surface_name, shutdown_sender, start_time
                        ).await {
                            error!("Error handling IPC client: {:#}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept IPC connection: {}", e);
                }
            }
        }
    }

    /// Handle individual client connection
    async fn handle_client(
        mut stream: UnixStream,
        context: Arc<PanelContext>,
        surface_name: String,
        shutdown_sender: Sender<()>,
        start_time: Instant,
    ) -> Result<()> {
        let Some(message) = read_frame::<_, DaemonMessage>(&mut stream, MAX_FRAME_SIZE).await? else {
            debug!("Client closed connection before sending a message");
            return Ok(());
        };

        debug!("Received IPC message: {:?}", message);

        let response = match message {
            DaemonMessage::Invoke(call) => {
                let method = call.method.clone();
                let bridge_context = context.clone();
                // Surface calls may block on the platform notification server.
                let outcome = tokio::task::spawn_blocking(move || bridge_context.bridge().handle(&call))
                    .await
                    .context("Command task failed")?;

                match outcome {
                    None => {
                        debug!("Method '{}' not handled, closing without reply", method);
                        return Ok(());
                    }
                    Some(Ok(())) => DaemonResponse::Ok,
                    Some(Err(e)) => {
                        warn!("Method '{}' failed ({}): {}", method, e.category(), e);
                        DaemonResponse::Error(ErrorReply::from(&e))
                    }
                }
            }
            DaemonMessage::Subscribe => {
                return Self::stream_events(stream, context).await;
            }
            DaemonMessage::Wake => {
                let wake = context.wake_source();
                let delivery = tokio::task::spawn_blocking(move || wake.wake())
                    .await
                    .context("Wake task failed")?;
                DaemonResponse::Woke {
                    delivered: delivery == Delivery::Delivered,
                }
            }
            DaemonMessage::Status => match context.status() {
                Ok(snapshot) => DaemonResponse::Status(PanelStatus {
                    visible: snapshot.slot.is_visible(),
                    title: snapshot.slot.title,
                    shown_at: snapshot.slot.shown_at,
                    channel_registered: snapshot.channel_registered,
                    listener_attached: snapshot.listener_attached,
                    events_delivered: snapshot.events_delivered,
                    events_dropped: snapshot.events_dropped,
                    surface: surface_name,
                    uptime_secs: start_time.elapsed().as_secs(),
                }),
                Err(e) => DaemonResponse::Error(ErrorReply::from(&e)),
            },
            DaemonMessage::Shutdown => {
                info!("Received shutdown request via IPC");
                if let Err(e) = shutdown_sender.send_async(()).await {
                    warn!("Failed to send shutdown signal: {}", e);
                }
                DaemonResponse::Ok
            }
            DaemonMessage::Ping => DaemonResponse::Ok,
        };

        write_frame(&mut stream, &response).await?;

        debug!("Sent IPC response: {:?}", response);
        Ok(())
    }

    /// Keep the connection open as the attached listener
    async fn stream_events(stream: UnixStream, context: Arc<PanelContext>) -> Result<()> {
        let subscription = context.subscribe();
        let listener_id = subscription.id();
        let (mut reader, mut writer) = stream.into_split();

        write_frame(&mut writer, &DaemonResponse::Subscribed { listener_id }).await?;

        let mut scratch = [0u8; 64];
        loop {
            tokio::select! {
                event = subscription.recv_async() => {
                    match event {
                        Some(event) => {
                            write_frame(&mut writer, &DaemonResponse::Event(event)).await
                                .context("Failed to forward event to listener")?;
                        }
                        None => {
                            info!("Listener {} replaced by a newer subscriber", listener_id);
                            break;
                        }
                    }
                }

                // Subscribers never send after subscribing; a read only
                // completes when the peer hangs up.
                read = reader.read(&mut scratch) => {
                    match read {
                        Ok(0) | Err(_) => {
                            debug!("Listener {} disconnected", listener_id);
                            break;
                        }
                        Ok(_) => continue,
                    }
                }
            }
        }

        Ok(())
    }
}
