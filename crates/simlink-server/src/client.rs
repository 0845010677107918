//! Blocking agent-side client for [`TcpTransport`](crate::tcp::TcpTransport).
//!
//! [`SimClient`] opens one connection per channel and speaks the same framed
//! JSON as the simulator. Reads block up to the configured timeout.

use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use simlink_core::types::{
    ControlCommand, EpisodeBounds, RewardValues, SceneSelection, SceneValues,
};
use tracing::debug;

use crate::codec::{JsonCodec, MessageCodec};
use crate::framing::{read_frame, write_frame};
use crate::protocol::{Channel, Inbound, InboundKind, Outbound, ProtocolError};

/// Agent end of a three-channel TCP session.
#[derive(Debug)]
pub struct SimClient {
    world: TcpStream,
    write: TcpStream,
    read: TcpStream,
    codec: JsonCodec,
}

impl SimClient {
    /// Connect to the world-info, write and read ports.
    ///
    /// `timeout` bounds each connect attempt and every later receive.
    ///
    /// # Errors
    ///
    /// Returns an IO error if any connection cannot be established.
    pub fn connect(
        world: SocketAddr,
        write: SocketAddr,
        read: SocketAddr,
        timeout: Duration,
    ) -> std::io::Result<Self> {
        let open = |addr: &SocketAddr| -> std::io::Result<TcpStream> {
            let stream = TcpStream::connect_timeout(addr, timeout)?;
            stream.set_read_timeout(Some(timeout))?;
            stream.set_nodelay(true)?;
            Ok(stream)
        };

        let client = Self {
            world: open(&world)?,
            write: open(&write)?,
            read: open(&read)?,
            codec: JsonCodec::new(),
        };
        debug!(%world, %write, %read, "client connected");
        Ok(client)
    }

    /// Encode `msg` and write it to its channel.
    pub fn send(&mut self, msg: &Inbound) -> Result<(), ProtocolError> {
        let payload = self.codec.encode_inbound(msg)?;
        let stream = match msg.kind() {
            InboundKind::Control => &mut self.read,
            InboundKind::SceneInit | InboundKind::EpisodeStart => &mut self.world,
        };
        write_frame(stream, &payload)
    }

    pub fn send_control(&mut self, steer: f32, gas: f32) -> Result<(), ProtocolError> {
        self.send(&Inbound::Control(ControlCommand::new(steer, gas)))
    }

    pub fn send_scene_init(&mut self, mode: i32, scene: i32) -> Result<(), ProtocolError> {
        self.send(&Inbound::SceneInit(SceneSelection::new(mode, scene)))
    }

    pub fn send_episode_start(
        &mut self,
        start_index: u64,
        end_index: u64,
    ) -> Result<(), ProtocolError> {
        self.send(&Inbound::EpisodeStart(EpisodeBounds::new(
            start_index,
            end_index,
        )))
    }

    /// Block until the next world-info message (`World` or `EpisodeReady`).
    pub fn recv_world_info(&mut self) -> Result<Outbound, ProtocolError> {
        Self::recv(&self.codec, &mut self.world, Channel::WorldInfo)
    }

    /// Block until the next write-channel message and require a reward.
    pub fn recv_reward(&mut self) -> Result<RewardValues, ProtocolError> {
        match Self::recv(&self.codec, &mut self.write, Channel::Write)? {
            Outbound::Reward(values) => Ok(values),
            other => Err(ProtocolError::UnexpectedKind {
                expected: "reward",
                got: other.type_name(),
            }),
        }
    }

    /// Block until the next write-channel message and require scene values.
    pub fn recv_scene(&mut self) -> Result<SceneValues, ProtocolError> {
        match Self::recv(&self.codec, &mut self.write, Channel::Write)? {
            Outbound::Scene(values) => Ok(values),
            other => Err(ProtocolError::UnexpectedKind {
                expected: "scene",
                got: other.type_name(),
            }),
        }
    }

    fn recv(
        codec: &JsonCodec,
        stream: &mut TcpStream,
        channel: Channel,
    ) -> Result<Outbound, ProtocolError> {
        let payload = read_frame(stream)?.ok_or_else(|| {
            ProtocolError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("{channel} channel closed"),
            ))
        })?;
        codec.decode_outbound(channel, &payload)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
