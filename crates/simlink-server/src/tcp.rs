//! TCP implementation of [`Transport`].
//!
//! [`TcpTransport`] binds one listener per channel. Each channel is served by
//! a worker thread that accepts one agent connection at a time and accepts
//! again after a disconnect. Inbound frames are read by a per-connection
//! reader thread into a queue drained by [`Transport::try_read`]; outbound
//! payloads are queued by [`Transport::send`] and written by the worker, so
//! neither call blocks the tick loop. Payloads queued while no agent is
//! connected are delivered once one connects.
//!
//! Every connection gets a reader, outbound-only channels included, so an
//! agent that hangs up is noticed even when nothing is being written. A
//! payload whose write fails is kept and sent first to the next agent.
//!
//! Dropping the transport stops every worker and closes every socket.

use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use simlink_core::config::ServerConfig;
use tracing::{debug, info, warn};

use crate::framing::{read_frame, write_frame};
use crate::protocol::Channel;
use crate::transport::Transport;

// ---------------------------------------------------------------------------
// TcpTransport
// ---------------------------------------------------------------------------

struct Endpoint {
    channel: Channel,
    local_addr: SocketAddr,
    outbound: Option<Sender<Vec<u8>>>,
    inbound: Option<Receiver<Vec<u8>>>,
    connected: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

/// Three-port TCP transport.
pub struct TcpTransport {
    endpoints: Vec<Endpoint>,
    shutdown: Arc<AtomicBool>,
}

impl TcpTransport {
    /// Bind the world-info, write and read listeners described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an IO error if any address cannot be bound or a worker thread
    /// cannot be spawned. Channels bound before the failure are torn down.
    pub fn bind(config: &ServerConfig) -> std::io::Result<Self> {
        let poll_interval = Duration::from_millis(config.poll_interval_ms.max(1));
        let mut transport = Self {
            endpoints: Vec::with_capacity(Channel::ALL.len()),
            shutdown: Arc::new(AtomicBool::new(false)),
        };

        for (channel, addr) in [
            (Channel::WorldInfo, config.world_addr()),
            (Channel::Write, config.write_addr()),
            (Channel::Read, config.read_addr()),
        ] {
            let endpoint = transport.spawn_endpoint(channel, &addr, poll_interval)?;
            transport.endpoints.push(endpoint);
        }

        Ok(transport)
    }

    fn spawn_endpoint(
        &self,
        channel: Channel,
        addr: &str,
        poll_interval: Duration,
    ) -> std::io::Result<Endpoint> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;

        let (outbound_tx, outbound_rx) = if channel.is_outbound() {
            let (tx, rx) = mpsc::channel();
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };
        let (inbound_tx, inbound_rx) = if channel.is_inbound() {
            let (tx, rx) = mpsc::channel();
            (Some(tx), Some(rx))
        } else {
            (None, None)
        };

        let connected = Arc::new(AtomicBool::new(false));
        let ctx = WorkerContext {
            channel,
            listener,
            outbound: outbound_rx,
            inbound: inbound_tx,
            connected: Arc::clone(&connected),
            shutdown: Arc::clone(&self.shutdown),
            poll_interval,
        };
        let worker = thread::Builder::new()
            .name(format!("simlink-{channel}"))
            .spawn(move || ctx.run())?;

        info!(%channel, %local_addr, "channel listening");
        Ok(Endpoint {
            channel,
            local_addr,
            outbound: outbound_tx,
            inbound: inbound_rx,
            connected,
            worker: Some(worker),
        })
    }

    fn endpoint(&self, channel: Channel) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.channel == channel)
    }

    /// Address the listener for `channel` is bound to.
    pub fn local_addr(&self, channel: Channel) -> Option<SocketAddr> {
        self.endpoint(channel).map(|e| e.local_addr)
    }

    /// Whether an agent is currently connected on `channel`.
    pub fn is_connected(&self, channel: Channel) -> bool {
        self.endpoint(channel)
            .is_some_and(|e| e.connected.load(Ordering::Acquire))
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, channel: Channel, payload: Vec<u8>) {
        match self.endpoint(channel).and_then(|e| e.outbound.as_ref()) {
            Some(tx) => {
                if tx.send(payload).is_err() {
                    debug!(%channel, "worker stopped, payload dropped");
                }
            }
            None => warn!(%channel, "send on inbound-only channel ignored"),
        }
    }

    fn try_read(&mut self, channel: Channel) -> Option<Vec<u8>> {
        match self.endpoint(channel).and_then(|e| e.inbound.as_ref()) {
            Some(rx) => rx.try_recv().ok(),
            None => {
                warn!(%channel, "read on outbound-only channel ignored");
                None
            }
        }
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        for endpoint in &mut self.endpoints {
            endpoint.outbound = None;
            if let Some(worker) = endpoint.worker.take() {
                if worker.join().is_err() {
                    warn!(channel = %endpoint.channel, "channel worker panicked");
                }
            }
        }
        info!("transport shut down");
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        for e in &self.endpoints {
            list.entry(&(e.channel, e.local_addr));
        }
        list.finish()
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

struct WorkerContext {
    channel: Channel,
    listener: TcpListener,
    outbound: Option<Receiver<Vec<u8>>>,
    inbound: Option<Sender<Vec<u8>>>,
    connected: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl WorkerContext {
    fn stopping(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    fn run(self) {
        let mut pending = None;
        while !self.stopping() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    info!(channel = %self.channel, %peer, "agent connected");
                    self.connected.store(true, Ordering::Release);
                    if let Err(e) = self.serve(stream, &mut pending) {
                        warn!(channel = %self.channel, error = %e, "connection setup failed");
                    }
                    self.connected.store(false, Ordering::Release);
                    info!(channel = %self.channel, %peer, "agent disconnected");
                }
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(self.poll_interval);
                }
                Err(e) => {
                    warn!(channel = %self.channel, error = %e, "accept failed");
                    thread::sleep(self.poll_interval);
                }
            }
        }
    }

    /// Serve one connection until the agent leaves or the transport stops.
    ///
    /// `pending` carries a payload that could not be written across
    /// connections; it is sent before anything else in the queue.
    fn serve(&self, stream: TcpStream, pending: &mut Option<Vec<u8>>) -> std::io::Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_nodelay(true)?;

        let alive = Arc::new(AtomicBool::new(true));
        let reader = spawn_reader(
            self.channel,
            stream.try_clone()?,
            self.inbound.clone(),
            Arc::clone(&alive),
        )?;

        let mut writer = stream;
        while !self.stopping() && alive.load(Ordering::Acquire) {
            let Some(rx) = &self.outbound else {
                thread::sleep(self.poll_interval);
                continue;
            };
            let payload = match pending.take() {
                Some(payload) => payload,
                None => match rx.recv_timeout(self.poll_interval) {
                    Ok(payload) => payload,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
            };
            if !alive.load(Ordering::Acquire) {
                *pending = Some(payload);
                break;
            }
            if let Err(e) = write_frame(&mut writer, &payload) {
                warn!(channel = %self.channel, error = %e, "write failed, payload kept for next agent");
                *pending = Some(payload);
                break;
            }
        }

        // Unblocks the reader thread.
        let _ = writer.shutdown(Shutdown::Both);
        if reader.join().is_err() {
            warn!(channel = %self.channel, "reader thread panicked");
        }
        Ok(())
    }
}

/// Read frames until the peer hangs up, then clear `alive`.
///
/// Without `tx` the channel is outbound-only and frames are discarded.
fn spawn_reader(
    channel: Channel,
    mut stream: TcpStream,
    tx: Option<Sender<Vec<u8>>>,
    alive: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("simlink-{channel}-reader"))
        .spawn(move || {
            loop {
                match read_frame(&mut stream) {
                    Ok(Some(payload)) => {
                        let Some(tx) = &tx else {
                            warn!(%channel, bytes = payload.len(), "frame on outbound-only channel discarded");
                            continue;
                        };
                        debug!(%channel, bytes = payload.len(), "frame received");
                        if tx.send(payload).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        debug!(%channel, error = %e, "read failed");
                        break;
                    }
                }
            }
            alive.store(false, Ordering::Release);
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
