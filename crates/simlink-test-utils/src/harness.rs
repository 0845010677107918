//! Ready-made sessions for integration tests.

use std::thread;
use std::time::{Duration, Instant};

use simlink_core::config::ServerConfig;
use simlink_server::client::SimClient;
use simlink_server::protocol::Channel;
use simlink_server::server::SessionController;
use simlink_server::tcp::TcpTransport;
use simlink_server::transport::{MemoryClient, MemoryTransport, memory_pair};

/// A session over the in-process transport plus the agent end feeding it.
pub fn memory_session(
    modes_count: i32,
    scenes_count: i32,
) -> (SessionController<MemoryTransport>, MemoryClient) {
    let (transport, client) = memory_pair();
    (
        SessionController::new(transport, modes_count, scenes_count),
        client,
    )
}

/// A session bound to OS-assigned ports on 127.0.0.1 with a connected client.
///
/// # Panics
///
/// Panics if binding or connecting fails.
pub fn tcp_session(
    modes_count: i32,
    scenes_count: i32,
) -> (SessionController<TcpTransport>, SimClient) {
    let config = ServerConfig::ephemeral(modes_count, scenes_count);
    let session = SessionController::bind(&config).expect("bind ephemeral ports");

    let addr = |channel| {
        session
            .transport()
            .local_addr(channel)
            .expect("channel is bound")
    };
    let client = SimClient::connect(
        addr(Channel::WorldInfo),
        addr(Channel::Write),
        addr(Channel::Read),
        Duration::from_secs(5),
    )
    .expect("connect to session");
    (session, client)
}

/// Call `f` until it yields `Some` or `timeout` elapses.
///
/// Polls are non-blocking, so TCP tests need a short wait for frames to
/// cross the loopback.
pub fn poll_until<T>(timeout: Duration, mut f: impl FnMut() -> Option<T>) -> Option<T> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(v) = f() {
            return Some(v);
        }
        if Instant::now() >= deadline {
            return None;
        }
        thread::sleep(Duration::from_millis(2));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
