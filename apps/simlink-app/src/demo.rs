//! A toy vehicle driven through a session, standing in for a real simulator.

use std::f32::consts::TAU;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use simlink_core::types::{ControlCommand, RewardValues, SceneValues, Vector2, Vector3};
use simlink_server::server::SessionController;
use simlink_server::transport::Transport;
use tracing::{info, warn};

/// Spawn points per scene.
const POSITIONS_PER_SCENE: usize = 16;

/// Distance in metres at which the vehicle counts as arrived.
const ARRIVAL_RADIUS: f32 = 2.0;

// ---------------------------------------------------------------------------
// Scenes
// ---------------------------------------------------------------------------

/// Spawn points on a ring whose radius grows with the scene index, plus one
/// camera projection.
#[allow(clippy::cast_precision_loss)]
pub fn scene_values(scene: i32) -> SceneValues {
    let radius = 50.0 + 10.0 * scene.max(0) as f32;
    let possible_positions = (0..POSITIONS_PER_SCENE)
        .map(|i| {
            let angle = TAU * i as f32 / POSITIONS_PER_SCENE as f32;
            Vector2::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();
    SceneValues {
        possible_positions,
        projection_matrices: vec![perspective(90.0_f32.to_radians(), 4.0 / 3.0, 0.1, 1000.0)],
    }
}

/// Row-major perspective projection.
#[rustfmt::skip]
fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> [f32; 16] {
    let f = 1.0 / (fov_y / 2.0).tan();
    let depth = near - far;
    [
        f / aspect, 0.0, 0.0, 0.0,
        0.0, f, 0.0, 0.0,
        0.0, 0.0, (far + near) / depth, 2.0 * far * near / depth,
        0.0, 0.0, -1.0, 0.0,
    ]
}

// ---------------------------------------------------------------------------
// Vehicle
// ---------------------------------------------------------------------------

/// Point-mass car with throttle and steering.
#[derive(Debug, Clone, Default)]
pub struct Vehicle {
    position: Vector2,
    heading: f32,
    speed: f32,
    acceleration: f32,
    /// Throttle gain; higher modes drive harder.
    power: f32,
}

impl Vehicle {
    #[allow(clippy::cast_precision_loss)]
    pub fn spawn(position: Vector2, target: Vector2, mode: i32) -> Self {
        Self {
            position,
            heading: (target.y - position.y).atan2(target.x - position.x),
            speed: 0.0,
            acceleration: 0.0,
            power: 4.0 * (1.0 + 0.5 * mode.max(0) as f32),
        }
    }

    /// Advance by `dt` seconds under `control`.
    pub fn step(&mut self, control: ControlCommand, dt: f32) {
        let steer = control.steer.clamp(-1.0, 1.0);
        let gas = control.gas.clamp(-1.0, 1.0);
        self.acceleration = gas * self.power - 0.3 * self.speed;
        self.speed = (self.speed + self.acceleration * dt).max(0.0);
        self.heading += steer * 1.2 * dt;
        self.position.x += self.speed * self.heading.cos() * dt;
        self.position.y += self.speed * self.heading.sin() * dt;
    }

    pub fn distance_to(&self, target: Vector2) -> f32 {
        (target.x - self.position.x).hypot(target.y - self.position.y)
    }

    pub fn reward(&self, game_timestamp: u64) -> RewardValues {
        let (sin, cos) = self.heading.sin_cos();
        RewardValues {
            player_location: self.position,
            player_orientation: Vector3::new(cos, sin, 0.0),
            player_acceleration: Vector3::new(self.acceleration * cos, self.acceleration * sin, 0.0),
            forward_speed: self.speed * 3.6,
            platform_timestamp: platform_millis(),
            game_timestamp,
            ..RewardValues::default()
        }
    }
}

fn platform_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

// ---------------------------------------------------------------------------
// Tick loop
// ---------------------------------------------------------------------------

/// Settings for [`run`].
#[derive(Debug, Clone, Copy)]
pub struct DemoOptions {
    pub tick: Duration,
    /// Ticks before an episode is cut short.
    pub episode_ticks: u64,
    /// Stop after this many ticks in total.
    pub max_ticks: Option<u64>,
}

struct Episode {
    vehicle: Vehicle,
    target: Vector2,
    ticks: u64,
}

/// Drive `session` until `max_ticks` elapse.
///
/// Polls only the message kind the demo is waiting for, so a payload meant
/// for a later step is never consumed early on the shared world-info channel.
pub fn run<T: Transport>(session: &mut SessionController<T>, options: DemoOptions) {
    let dt = options.tick.as_secs_f32();
    let tick_ms = u64::try_from(options.tick.as_millis()).unwrap_or(u64::MAX);
    let mut scene: Option<SceneValues> = None;
    let mut episode: Option<Episode> = None;
    let mut game_ms = 0u64;
    let mut total_ticks = 0u64;

    session.send_world();

    while options.max_ticks.is_none_or(|max| total_ticks < max) {
        if let Some(ep) = episode.as_mut() {
            let control = session.try_read_control();
            ep.vehicle.step(control.value, dt);
            ep.ticks += 1;
            session.send_reward(&ep.vehicle.reward(game_ms));

            let arrived = ep.vehicle.distance_to(ep.target) < ARRIVAL_RADIUS;
            if arrived || ep.ticks >= options.episode_ticks {
                info!(ticks = ep.ticks, arrived, "episode finished");
                session.set_reset(true);
                session.send_end_reset();
                episode = None;
            }
        } else if let Some(loaded) = &scene {
            episode = start_episode(session, loaded);
        } else {
            scene = load_scene(session);
        }

        game_ms += tick_ms;
        total_ticks += 1;
        thread::sleep(options.tick);
    }

    let stats = session.stats();
    info!(
        phase = ?session.phase(),
        sent = stats.messages_sent,
        received = stats.messages_received,
        decode_failures = stats.decode_failures,
        "session finished"
    );
}

fn load_scene<T: Transport>(session: &mut SessionController<T>) -> Option<SceneValues> {
    let sel = session.try_read_scene_init().into_option()?;
    if let Err(e) = session.set_mode(sel.mode) {
        warn!(error = %e, "scene selection rejected");
        return None;
    }
    if let Err(e) = session.set_scene(sel.scene) {
        warn!(error = %e, "scene selection rejected");
        return None;
    }
    let scene = scene_values(sel.scene);
    session.send_scene_values(&scene);
    info!(mode = sel.mode, scene = sel.scene, "scene loaded");
    Some(scene)
}

fn start_episode<T: Transport>(
    session: &mut SessionController<T>,
    scene: &SceneValues,
) -> Option<Episode> {
    let bounds = session.try_read_episode_start().into_option()?;
    let (Some(from), Some(to)) = (
        scene.position(bounds.start_index),
        scene.position(bounds.end_index),
    ) else {
        warn!(
            start = bounds.start_index,
            end = bounds.end_index,
            positions = scene.possible_positions.len(),
            "episode bounds outside scene"
        );
        return None;
    };

    session.set_reset(false);
    session.send_end_reset();
    info!(start = bounds.start_index, end = bounds.end_index, "episode started");
    Some(Episode {
        vehicle: Vehicle::spawn(from, to, session.mode()),
        target: to,
        ticks: 0,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use simlink_core::types::{EpisodeBounds, EpisodeReady, SceneSelection};
    use simlink_server::protocol::{Channel, Inbound, Outbound};
    use simlink_server::state_machine::SessionPhase;
    use simlink_server::transport::memory_pair;

    #[test]
    fn scene_positions_grow_with_scene() {
        let near = scene_values(0);
        let far = scene_values(3);
        assert_eq!(near.possible_positions.len(), POSITIONS_PER_SCENE);
        assert!((near.possible_positions[0].x - 50.0).abs() < 1e-4);
        assert!((far.possible_positions[0].x - 80.0).abs() < 1e-4);
    }

    #[test]
    fn vehicle_accelerates_toward_target() {
        let mut car = Vehicle::spawn(Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0), 0);
        let before = car.distance_to(Vector2::new(10.0, 0.0));
        for _ in 0..20 {
            car.step(ControlCommand::new(0.0, 1.0), 0.05);
        }
        assert!(car.distance_to(Vector2::new(10.0, 0.0)) < before);
        assert!(car.reward(0).forward_speed > 0.0);
    }

    #[test]
    fn vehicle_never_reverses() {
        let mut car = Vehicle::default();
        car.step(ControlCommand::new(0.0, -1.0), 1.0);
        assert!(car.reward(0).forward_speed.abs() < f32::EPSILON);
    }

    #[test]
    fn demo_loop_runs_an_episode() {
        let (transport, client) = memory_pair();
        let mut session = SessionController::new(transport, 2, 2);

        client
            .send(&Inbound::SceneInit(SceneSelection::new(1, 0)))
            .unwrap();
        client
            .send(&Inbound::EpisodeStart(EpisodeBounds::new(0, 8)))
            .unwrap();

        let options = DemoOptions {
            tick: Duration::from_millis(1),
            episode_ticks: 3,
            max_ticks: Some(10),
        };
        run(&mut session, options);

        let world: Vec<_> = client
            .drain(Channel::WorldInfo)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert!(matches!(world[0], Outbound::World(_)));
        let acks = world
            .iter()
            .filter(|m| **m == Outbound::EpisodeReady(EpisodeReady { ready: true }))
            .count();
        assert_eq!(acks, 2);

        let rewards = client
            .drain(Channel::Write)
            .into_iter()
            .filter(|m| matches!(m, Ok(Outbound::Reward(_))))
            .count();
        assert_eq!(rewards, 3);
        assert_eq!(session.mode(), 1);
        assert_eq!(session.phase(), SessionPhase::AwaitingEpisodeStart);
        assert!(session.reset_requested());
    }

    #[test]
    fn episode_outside_scene_is_not_started() {
        let (transport, client) = memory_pair();
        let mut session = SessionController::new(transport, 1, 1);
        let scene = scene_values(0);
        let past_end = POSITIONS_PER_SCENE as u64;

        client
            .send(&Inbound::EpisodeStart(EpisodeBounds::new(0, past_end)))
            .unwrap();
        assert!(start_episode(&mut session, &scene).is_none());
        assert!(client.drain(Channel::WorldInfo).is_empty());

        client
            .send(&Inbound::EpisodeStart(EpisodeBounds::new(0, past_end - 1)))
            .unwrap();
        let episode = start_episode(&mut session, &scene).unwrap();
        assert_eq!(episode.target, scene.possible_positions[POSITIONS_PER_SCENE - 1]);
    }
}
