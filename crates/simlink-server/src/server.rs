//! Session controller: the single authority for session state and protocol
//! sequencing.
//!
//! [`SessionController`] exclusively owns a [`Transport`] and a
//! [`MessageCodec`]. It never drives a loop of its own; the simulation tick
//! loop pushes outbound values and polls inbound commands. Every poll returns
//! immediately with a [`Polled`] value. A missing payload and an undecodable
//! payload look the same to the caller: `received == false` plus a fixed
//! sentinel value.
//!
//! | Poll                        | Sentinel on failure |
//! |-----------------------------|---------------------|
//! | `try_read_control`          | steer 0.0, gas 0.0  |
//! | `try_read_scene_init`       | mode -1, scene -1   |
//! | `try_read_episode_start`    | start 0, end 0      |

use simlink_core::config::ServerConfig;
use simlink_core::error::ValidationError;
use simlink_core::types::{
    ControlCommand, EpisodeBounds, EpisodeReady, RewardValues, SceneSelection, SceneValues,
    UNSET_INDEX, WorldInfo,
};
use tracing::{debug, warn};

use crate::codec::{JsonCodec, MessageCodec};
use crate::protocol::{Inbound, InboundKind, Outbound};
use crate::state_machine::{PhaseTracker, SessionPhase};
use crate::tcp::TcpTransport;
use crate::transport::Transport;

// ---------------------------------------------------------------------------
// Polled
// ---------------------------------------------------------------------------

/// Outcome of a non-blocking poll.
///
/// When `received` is false, `value` holds the poll's sentinel and carries no
/// reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polled<T> {
    pub received: bool,
    pub value: T,
}

impl<T> Polled<T> {
    pub const fn hit(value: T) -> Self {
        Self {
            received: true,
            value,
        }
    }

    pub const fn miss(sentinel: T) -> Self {
        Self {
            received: false,
            value: sentinel,
        }
    }

    /// The decoded value, or `None` if nothing usable arrived.
    pub fn into_option(self) -> Option<T> {
        self.received.then_some(self.value)
    }
}

// ---------------------------------------------------------------------------
// SessionStats
// ---------------------------------------------------------------------------

/// Traffic counters for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Messages handed to the transport.
    pub messages_sent: u64,
    /// Payloads taken from the transport, decodable or not.
    pub messages_received: u64,
    /// Received payloads that failed to decode as the polled kind.
    pub decode_failures: u64,
    /// Polls that found nothing buffered.
    pub empty_polls: u64,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SessionState {
    mode: i32,
    scene: i32,
    reset_requested: bool,
    modes_count: i32,
    scenes_count: i32,
}

impl SessionState {
    const fn new(modes_count: i32, scenes_count: i32) -> Self {
        Self {
            mode: UNSET_INDEX,
            scene: UNSET_INDEX,
            reset_requested: false,
            modes_count,
            scenes_count,
        }
    }
}

const fn index_allowed(value: i32, count: i32) -> bool {
    value == UNSET_INDEX || (value >= 0 && value < count)
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Owns one session's state, transport and codec.
///
/// # Example
///
/// ```
/// use simlink_core::types::ControlCommand;
/// use simlink_server::protocol::Inbound;
/// use simlink_server::server::SessionController;
/// use simlink_server::transport::memory_pair;
///
/// let (transport, client) = memory_pair();
/// let mut session = SessionController::new(transport, 3, 5);
///
/// let polled = session.try_read_control();
/// assert!(!polled.received);
/// assert_eq!(polled.value, ControlCommand::NONE);
///
/// client.send(&Inbound::Control(ControlCommand::new(0.5, 1.0))).unwrap();
/// let polled = session.try_read_control();
/// assert!(polled.received);
/// assert_eq!(polled.value, ControlCommand::new(0.5, 1.0));
/// ```
#[derive(Debug)]
pub struct SessionController<T, C = JsonCodec> {
    transport: T,
    codec: C,
    state: SessionState,
    tracker: PhaseTracker,
    stats: SessionStats,
}

impl<T: Transport> SessionController<T> {
    /// Create a session over `transport` using the JSON codec.
    pub fn new(transport: T, modes_count: i32, scenes_count: i32) -> Self {
        Self::with_codec(transport, JsonCodec::new(), modes_count, scenes_count)
    }
}

impl SessionController<TcpTransport> {
    /// Bind a TCP transport from `config` and create a session over it.
    ///
    /// # Errors
    ///
    /// Returns an IO error if any channel cannot be bound.
    pub fn bind(config: &ServerConfig) -> std::io::Result<Self> {
        let transport = TcpTransport::bind(config)?;
        Ok(Self::new(transport, config.modes_count, config.scenes_count))
    }
}

impl<T: Transport, C: MessageCodec> SessionController<T, C> {
    /// Create a session with an explicit codec.
    pub fn with_codec(transport: T, codec: C, modes_count: i32, scenes_count: i32) -> Self {
        Self {
            transport,
            codec,
            state: SessionState::new(modes_count, scenes_count),
            tracker: PhaseTracker::new(),
            stats: SessionStats::default(),
        }
    }

    // -- outbound -----------------------------------------------------------

    /// Send measurements for the current tick on the write channel.
    pub fn send_reward(&mut self, values: &RewardValues) {
        self.send(&Outbound::Reward(values.clone()));
    }

    /// Send the loaded scene's description on the write channel.
    pub fn send_scene_values(&mut self, values: &SceneValues) {
        self.send(&Outbound::Scene(values.clone()));
    }

    /// Acknowledge a reset boundary with `ready = true` on the world-info
    /// channel. Each call sends one acknowledgment.
    pub fn send_end_reset(&mut self) {
        self.send(&Outbound::EpisodeReady(EpisodeReady { ready: true }));
        self.tracker.on_end_reset(self.state.reset_requested);
    }

    /// Send the configured mode and scene counts on the world-info channel.
    pub fn send_world(&mut self) {
        let world = WorldInfo {
            modes: self.state.modes_count,
            scenes: self.state.scenes_count,
        };
        self.send(&Outbound::World(world));
    }

    fn send(&mut self, msg: &Outbound) {
        match self.codec.encode_outbound(msg) {
            Ok(payload) => {
                let channel = msg.channel();
                debug!(%channel, kind = msg.type_name(), bytes = payload.len(), "sending");
                self.transport.send(channel, payload);
                self.stats.messages_sent += 1;
            }
            Err(e) => warn!(kind = msg.type_name(), error = %e, "encode failed, message dropped"),
        }
    }

    // -- inbound ------------------------------------------------------------

    /// Poll the read channel for a control command.
    ///
    /// Yields [`ControlCommand::NONE`] unless a command was decoded.
    pub fn try_read_control(&mut self) -> Polled<ControlCommand> {
        let polled = match self.poll(InboundKind::Control) {
            Some(Inbound::Control(cmd)) => Polled::hit(cmd),
            _ => Polled::miss(ControlCommand::NONE),
        };
        self.tracker.on_control_poll(polled.received);
        polled
    }

    /// Poll the world-info channel for a scene selection.
    ///
    /// Yields [`SceneSelection::UNSET`] unless a selection was decoded. Does
    /// not change the session's mode or scene.
    pub fn try_read_scene_init(&mut self) -> Polled<SceneSelection> {
        let polled = match self.poll(InboundKind::SceneInit) {
            Some(Inbound::SceneInit(sel)) => Polled::hit(sel),
            _ => Polled::miss(SceneSelection::UNSET),
        };
        self.tracker.on_scene_poll(polled.received);
        polled
    }

    /// Poll the world-info channel for episode bounds.
    ///
    /// Yields [`EpisodeBounds::EMPTY`] unless bounds were decoded.
    pub fn try_read_episode_start(&mut self) -> Polled<EpisodeBounds> {
        let polled = match self.poll(InboundKind::EpisodeStart) {
            Some(Inbound::EpisodeStart(bounds)) => Polled::hit(bounds),
            _ => Polled::miss(EpisodeBounds::EMPTY),
        };
        self.tracker.on_episode_poll(polled.received);
        polled
    }

    /// Take at most one payload from `kind`'s channel and decode it.
    ///
    /// A payload of another kind on the same channel is consumed and counts
    /// as a decode failure.
    fn poll(&mut self, kind: InboundKind) -> Option<Inbound> {
        let channel = kind.channel();
        let Some(payload) = self.transport.try_read(channel) else {
            self.stats.empty_polls += 1;
            return None;
        };
        self.stats.messages_received += 1;

        match self.codec.decode_expected(kind, &payload) {
            Ok(msg) => {
                debug!(%channel, kind = kind.name(), "received");
                Some(msg)
            }
            Err(e) => {
                self.stats.decode_failures += 1;
                debug!(%channel, expected = kind.name(), error = %e, "payload discarded");
                None
            }
        }
    }

    // -- state --------------------------------------------------------------

    /// Set the current mode. Accepts [`UNSET_INDEX`] or `0..modes_count`.
    ///
    /// Unlike a plain setter, anything else is rejected and the previous mode
    /// is kept, so [`mode`](Self::mode) reports the last *accepted* value and
    /// is always -1 or a valid index.
    pub fn set_mode(&mut self, mode: i32) -> Result<(), ValidationError> {
        if !index_allowed(mode, self.state.modes_count) {
            warn!(mode, modes_count = self.state.modes_count, "rejected mode");
            return Err(ValidationError::ModeOutOfRange {
                value: mode,
                count: self.state.modes_count,
            });
        }
        self.state.mode = mode;
        Ok(())
    }

    pub const fn mode(&self) -> i32 {
        self.state.mode
    }

    /// Set the current scene. Accepts [`UNSET_INDEX`] or `0..scenes_count`.
    ///
    /// Like [`set_mode`](Self::set_mode), out-of-range values are rejected
    /// rather than stored; the previous scene is kept.
    pub fn set_scene(&mut self, scene: i32) -> Result<(), ValidationError> {
        if !index_allowed(scene, self.state.scenes_count) {
            warn!(scene, scenes_count = self.state.scenes_count, "rejected scene");
            return Err(ValidationError::SceneOutOfRange {
                value: scene,
                count: self.state.scenes_count,
            });
        }
        self.state.scene = scene;
        Ok(())
    }

    pub const fn scene(&self) -> i32 {
        self.state.scene
    }

    pub const fn modes_count(&self) -> i32 {
        self.state.modes_count
    }

    pub const fn scenes_count(&self) -> i32 {
        self.state.scenes_count
    }

    pub fn set_reset(&mut self, reset: bool) {
        self.state.reset_requested = reset;
    }

    pub const fn reset_requested(&self) -> bool {
        self.state.reset_requested
    }

    pub const fn phase(&self) -> SessionPhase {
        self.tracker.phase()
    }

    pub const fn stats(&self) -> SessionStats {
        self.stats
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Channel, MAX_MESSAGE_SIZE, ProtocolError};
    use crate::transport::{MemoryClient, MemoryTransport, memory_pair};
    use simlink_core::types::{CameraImage, ImageKind, Vector2, Vector3};

    fn session(modes: i32, scenes: i32) -> (SessionController<MemoryTransport>, MemoryClient) {
        let (transport, client) = memory_pair();
        (SessionController::new(transport, modes, scenes), client)
    }

    fn sample_reward() -> RewardValues {
        RewardValues {
            player_location: Vector2::new(12.5, -4.0),
            player_acceleration: Vector3::new(0.5, 0.0, 0.0),
            forward_speed: 8.25,
            intersect_offroad: 0.125,
            game_timestamp: 3300,
            ..RewardValues::default()
        }
    }

    // ---- construction ----

    #[test]
    fn new_session_is_unset() {
        let (session, _client) = session(3, 5);
        assert_eq!(session.mode(), UNSET_INDEX);
        assert_eq!(session.scene(), UNSET_INDEX);
        assert!(!session.reset_requested());
        assert_eq!(session.modes_count(), 3);
        assert_eq!(session.scenes_count(), 5);
        assert_eq!(session.phase(), SessionPhase::Uninitialized);
        assert_eq!(session.stats(), SessionStats::default());
    }

    #[test]
    fn sessions_are_independent() {
        let (mut a, _ca) = session(3, 3);
        let (b, _cb) = session(3, 3);
        a.set_mode(1).unwrap();
        assert_eq!(b.mode(), UNSET_INDEX);
    }

    // ---- control polling ----

    #[test]
    fn control_absent_yields_zero_sentinel() {
        let (mut session, _client) = session(1, 1);
        let polled = session.try_read_control();
        assert_eq!(polled, Polled::miss(ControlCommand::new(0.0, 0.0)));
    }

    #[test]
    fn control_decoded_values_are_returned() {
        let (mut session, client) = session(1, 1);
        let cmd = ControlCommand::new(-0.3, 0.8);
        client.send(&Inbound::Control(cmd)).unwrap();
        assert_eq!(session.try_read_control(), Polled::hit(cmd));
    }

    #[test]
    fn control_from_exact_encoding() {
        let (mut session, client) = session(1, 1);
        let cmd = ControlCommand::new(0.0625, 0.5);
        let bytes = JsonCodec::new()
            .encode_inbound(&Inbound::Control(cmd))
            .unwrap();
        client.inject(Channel::Read, bytes);
        let polled = session.try_read_control();
        assert!(polled.received);
        assert_eq!(polled.value.steer, 0.0625);
        assert_eq!(polled.value.gas, 0.5);
    }

    #[test]
    fn control_malformed_yields_zero_sentinel() {
        let (mut session, client) = session(3, 5);
        session.set_mode(2).unwrap();
        session.set_scene(4).unwrap();
        session.set_reset(true);

        client.inject(Channel::Read, b"\x00garbage{".to_vec());
        let polled = session.try_read_control();
        assert!(!polled.received);
        assert_eq!(polled.value, ControlCommand::NONE);

        assert_eq!(session.mode(), 2);
        assert_eq!(session.scene(), 4);
        assert!(session.reset_requested());
    }

    #[test]
    fn control_commands_arrive_in_order() {
        let (mut session, client) = session(1, 1);
        for i in 0..4u8 {
            let cmd = ControlCommand::new(f32::from(i), 0.0);
            client.send(&Inbound::Control(cmd)).unwrap();
        }
        for i in 0..4u8 {
            assert_eq!(session.try_read_control().value.steer, f32::from(i));
        }
        assert!(!session.try_read_control().received);
    }

    #[test]
    fn each_poll_consumes_at_most_one_payload() {
        let (mut session, client) = session(1, 1);
        client.inject(Channel::Read, b"bad".to_vec());
        client
            .send(&Inbound::Control(ControlCommand::new(0.1, 0.1)))
            .unwrap();
        assert!(!session.try_read_control().received);
        assert!(session.try_read_control().received);
    }

    // ---- scene init polling ----

    #[test]
    fn scene_init_absent_yields_unset() {
        let (mut session, _client) = session(3, 5);
        assert_eq!(
            session.try_read_scene_init(),
            Polled::miss(SceneSelection::new(-1, -1))
        );
    }

    #[test]
    fn scene_init_malformed_yields_unset() {
        let (mut session, client) = session(3, 5);
        client.inject(Channel::WorldInfo, br#"{"type":"scene_init","mode":"two"}"#.to_vec());
        assert_eq!(
            session.try_read_scene_init(),
            Polled::miss(SceneSelection::UNSET)
        );
    }

    #[test]
    fn scene_init_does_not_touch_state() {
        let (mut session, client) = session(3, 5);
        client.send(&Inbound::SceneInit(SceneSelection::new(2, 4))).unwrap();
        assert_eq!(
            session.try_read_scene_init(),
            Polled::hit(SceneSelection::new(2, 4))
        );
        assert_eq!(session.mode(), UNSET_INDEX);
        assert_eq!(session.scene(), UNSET_INDEX);
    }

    #[test]
    fn scene_init_out_of_range_is_still_reported() {
        let (mut session, client) = session(2, 2);
        client.send(&Inbound::SceneInit(SceneSelection::new(7, 9))).unwrap();
        let polled = session.try_read_scene_init();
        assert!(polled.received);
        assert!(session.set_mode(polled.value.mode).is_err());
    }

    #[test]
    fn episode_start_on_scene_poll_is_consumed_as_failure() {
        let (mut session, client) = session(1, 1);
        client.send(&Inbound::EpisodeStart(EpisodeBounds::new(1, 2))).unwrap();
        assert!(!session.try_read_scene_init().received);
        assert!(!session.try_read_episode_start().received);
        assert_eq!(session.stats().decode_failures, 1);
    }

    // ---- episode start polling ----

    #[test]
    fn episode_start_absent_yields_zero_bounds() {
        let (mut session, _client) = session(1, 1);
        assert_eq!(
            session.try_read_episode_start(),
            Polled::miss(EpisodeBounds::new(0, 0))
        );
    }

    #[test]
    fn episode_start_malformed_yields_zero_bounds() {
        let (mut session, client) = session(1, 1);
        client.inject(
            Channel::WorldInfo,
            br#"{"type":"episode_start","start_index":-5,"end_index":3}"#.to_vec(),
        );
        assert_eq!(
            session.try_read_episode_start(),
            Polled::miss(EpisodeBounds::EMPTY)
        );
    }

    #[test]
    fn episode_start_decoded() {
        let (mut session, client) = session(1, 1);
        client.send(&Inbound::EpisodeStart(EpisodeBounds::new(3, 250))).unwrap();
        assert_eq!(
            session.try_read_episode_start(),
            Polled::hit(EpisodeBounds::new(3, 250))
        );
    }

    // ---- setters ----

    #[test]
    fn setters_report_last_value() {
        let (mut session, _client) = session(3, 5);
        session.set_mode(2).unwrap();
        session.set_mode(0).unwrap();
        session.set_scene(4).unwrap();
        assert_eq!(session.mode(), 0);
        assert_eq!(session.scene(), 4);

        session.set_mode(UNSET_INDEX).unwrap();
        assert_eq!(session.mode(), UNSET_INDEX);

        session.set_reset(true);
        assert!(session.reset_requested());
        session.set_reset(false);
        assert!(!session.reset_requested());
    }

    #[test]
    fn setters_are_independent_of_polls() {
        let (mut session, client) = session(3, 5);
        session.set_mode(1).unwrap();
        session.set_scene(3).unwrap();

        session.try_read_scene_init();
        client.send(&Inbound::SceneInit(SceneSelection::new(2, 4))).unwrap();
        session.try_read_scene_init();
        client.inject(Channel::WorldInfo, b"junk".to_vec());
        session.try_read_scene_init();

        assert_eq!(session.mode(), 1);
        assert_eq!(session.scene(), 3);
    }

    #[test]
    fn out_of_range_setters_keep_previous_value() {
        let (mut session, _client) = session(3, 5);
        session.set_mode(1).unwrap();
        session.set_scene(2).unwrap();

        assert_eq!(
            session.set_mode(3),
            Err(ValidationError::ModeOutOfRange { value: 3, count: 3 })
        );
        assert_eq!(
            session.set_scene(-2),
            Err(ValidationError::SceneOutOfRange { value: -2, count: 5 })
        );
        assert_eq!(session.mode(), 1);
        assert_eq!(session.scene(), 2);
    }

    // ---- outbound ----

    #[test]
    fn reward_then_scene_values_in_order() {
        let (mut session, client) = session(1, 1);
        let reward = sample_reward();
        let scene = SceneValues {
            possible_positions: vec![Vector2::new(0.0, 1.0)],
            projection_matrices: vec![[0.5; 16]],
        };
        session.send_reward(&reward);
        session.send_scene_values(&scene);

        let sent: Vec<_> = client
            .drain(Channel::Write)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(sent, vec![Outbound::Reward(reward), Outbound::Scene(scene)]);
        assert!(client.take_raw(Channel::WorldInfo).is_none());
    }

    #[test]
    fn full_hd_frames_are_delivered() {
        let (mut session, client) = session(1, 1);
        let frame = |kind| {
            let mut image = CameraImage {
                width: 1920,
                height: 1080,
                kind,
                data: Vec::new(),
            };
            let len = 1920 * 1080 * image.bytes_per_pixel();
            image.data = (0..len).map(|i| u8::try_from(i % 251).unwrap()).collect();
            image
        };
        let reward = RewardValues {
            images: vec![
                frame(ImageKind::Rgb),
                frame(ImageKind::Depth),
                frame(ImageKind::Segmentation),
            ],
            ..sample_reward()
        };

        session.send_reward(&reward);

        let raw = client.take_raw(Channel::Write).unwrap();
        assert!(raw.len() <= MAX_MESSAGE_SIZE);
        assert_eq!(session.stats().messages_sent, 1);
        assert_eq!(
            JsonCodec::new().decode_outbound(Channel::Write, &raw).unwrap(),
            Outbound::Reward(reward)
        );
    }

    #[test]
    fn end_reset_sends_one_ack_per_call() {
        let (mut session, client) = session(1, 1);
        for _ in 0..3 {
            session.send_end_reset();
        }
        let acks = client.drain(Channel::WorldInfo);
        assert_eq!(acks.len(), 3);
        for ack in acks {
            assert_eq!(ack.unwrap(), Outbound::EpisodeReady(EpisodeReady { ready: true }));
        }
    }

    #[test]
    fn world_reports_configured_counts() {
        let (mut session, client) = session(3, 5);
        session.send_world();
        assert_eq!(
            client.recv(Channel::WorldInfo).unwrap().unwrap(),
            Outbound::World(WorldInfo { modes: 3, scenes: 5 })
        );
    }

    // ---- phases ----

    #[test]
    fn phase_follows_negotiation() {
        let (mut session, client) = session(3, 5);
        session.try_read_scene_init();
        assert_eq!(session.phase(), SessionPhase::AwaitingSceneSelection);

        client.send(&Inbound::SceneInit(SceneSelection::new(0, 0))).unwrap();
        session.try_read_scene_init();
        assert_eq!(session.phase(), SessionPhase::AwaitingEpisodeStart);

        client.send(&Inbound::EpisodeStart(EpisodeBounds::new(0, 1))).unwrap();
        session.try_read_episode_start();
        assert_eq!(session.phase(), SessionPhase::Running);

        session.send_end_reset();
        assert_eq!(session.phase(), SessionPhase::Running);

        session.set_reset(true);
        session.send_end_reset();
        assert_eq!(session.phase(), SessionPhase::AwaitingEpisodeStart);
        assert!(session.reset_requested());
    }

    #[test]
    fn out_of_phase_messages_are_accepted() {
        let (mut session, client) = session(1, 1);
        client.send(&Inbound::Control(ControlCommand::new(1.0, 1.0))).unwrap();
        assert!(session.try_read_control().received);
        assert_eq!(session.phase(), SessionPhase::Uninitialized);
    }

    // ---- stats ----

    #[test]
    fn stats_separate_absence_from_decode_failure() {
        let (mut session, client) = session(1, 1);
        session.try_read_control();
        client.inject(Channel::Read, b"nope".to_vec());
        session.try_read_control();
        client.send(&Inbound::Control(ControlCommand::NONE)).unwrap();
        session.try_read_control();
        session.send_world();

        assert_eq!(
            session.stats(),
            SessionStats {
                messages_sent: 1,
                messages_received: 2,
                decode_failures: 1,
                empty_polls: 1,
            }
        );
    }

    // ---- codec and transport seams ----

    struct RefusingCodec;

    impl MessageCodec for RefusingCodec {
        fn encode_outbound(&self, _msg: &Outbound) -> Result<Vec<u8>, ProtocolError> {
            Err(ProtocolError::PayloadTooLarge { size: 1, max: 0 })
        }

        fn decode_inbound(&self, channel: Channel, bytes: &[u8]) -> Result<Inbound, ProtocolError> {
            JsonCodec::new().decode_inbound(channel, bytes)
        }

        fn encode_inbound(&self, msg: &Inbound) -> Result<Vec<u8>, ProtocolError> {
            JsonCodec::new().encode_inbound(msg)
        }

        fn decode_outbound(
            &self,
            channel: Channel,
            bytes: &[u8],
        ) -> Result<Outbound, ProtocolError> {
            JsonCodec::new().decode_outbound(channel, bytes)
        }
    }

    #[test]
    fn encode_failure_drops_message_quietly() {
        let (transport, client) = memory_pair();
        let mut session = SessionController::with_codec(transport, RefusingCodec, 1, 1);
        session.send_reward(&sample_reward());
        session.send_end_reset();
        assert!(client.take_raw(Channel::Write).is_none());
        assert!(client.take_raw(Channel::WorldInfo).is_none());
        assert_eq!(session.stats().messages_sent, 0);
    }

    #[test]
    fn works_over_boxed_transport() {
        let (transport, client) = memory_pair();
        let boxed: Box<dyn Transport> = Box::new(transport);
        let mut session = SessionController::new(boxed, 2, 2);
        client.send(&Inbound::SceneInit(SceneSelection::new(1, 1))).unwrap();
        assert!(session.try_read_scene_init().received);
    }

    #[test]
    fn polled_into_option() {
        assert_eq!(Polled::hit(3).into_option(), Some(3));
        assert_eq!(Polled::miss(-1).into_option(), None);
    }
}
