//! Sample outbound values with plausible, seed-dependent contents.

use rand::Rng;
use simlink_core::types::{
    CameraImage, ImageKind, RewardValues, SceneValues, Vector2, Vector3,
};

use crate::rng::seeded_rng;

/// A reward for one tick. Same seed, same values.
pub fn sample_reward(seed: u64) -> RewardValues {
    let mut rng = seeded_rng(seed);
    let heading: f32 = rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI);
    RewardValues {
        player_location: Vector2::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0)),
        player_orientation: Vector3::new(heading.cos(), heading.sin(), 0.0),
        player_acceleration: Vector3::new(rng.gen_range(-2.0..2.0), rng.gen_range(-2.0..2.0), 0.0),
        forward_speed: rng.gen_range(0.0..30.0),
        collision_general: 0.0,
        collision_pedestrian: 0.0,
        collision_car: rng.gen_range(0.0..1.0),
        intersect_other_lane: rng.gen_range(0.0..1.0),
        intersect_offroad: rng.gen_range(0.0..1.0),
        platform_timestamp: rng.gen_range(0..1_000_000),
        game_timestamp: seed.wrapping_mul(100),
        images: vec![sample_image(4, 2, ImageKind::Rgb, seed)],
    }
}

/// Scene values with `positions` start points and one projection matrix.
pub fn sample_scene(positions: usize, seed: u64) -> SceneValues {
    let mut rng = seeded_rng(seed);
    let possible_positions = (0..positions)
        .map(|_| Vector2::new(rng.gen_range(-500.0..500.0), rng.gen_range(-500.0..500.0)))
        .collect();
    let mut projection = [0.0f32; 16];
    for i in 0..4 {
        projection[i * 5] = 1.0;
    }
    SceneValues {
        possible_positions,
        projection_matrices: vec![projection],
    }
}

/// A camera image whose byte length matches its dimensions and kind.
pub fn sample_image(width: u32, height: u32, kind: ImageKind, seed: u64) -> CameraImage {
    let mut image = CameraImage {
        width,
        height,
        kind,
        data: Vec::new(),
    };
    let len = width as usize * height as usize * image.bytes_per_pixel();
    let mut rng = seeded_rng(seed);
    image.data = (0..len).map(|_| rng.r#gen::<u8>()).collect();
    image
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
