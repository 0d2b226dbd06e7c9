//! Per-tick scripted motion. Nothing here is physics: fish swim straight and bounce off a square
//! boundary, scripted animals follow fixed patrol/jitter/spin rules.

use std::time::Instant;

use glam::Vec3;
use rand::Rng;

use crate::kind::EntityKind;
use crate::registry::SceneRegistry;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatrolConfig {
    /// Units per second.
    pub speed: f32,
    pub min_x: f32,
    pub max_x: f32,
    /// Turn the model around (yaw + 180) on each reversal.
    pub flip_yaw: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub fish_speed: f32,
    /// Fish bounce when |x| or |z| reaches this.
    pub trace_radius: f32,
    /// Degrees.
    pub fin_amplitude: f32,
    /// Radians per millisecond.
    pub fin_frequency: f32,
    pub shark: PatrolConfig,
    pub squid: PatrolConfig,
    /// Height the seahorse is snapped back to each tick before jittering.
    pub seahorse_anchor_y: f32,
    pub seahorse_jitter_step: f32,
    /// Degrees per second.
    pub spinner_rate: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fish_speed: 0.5,
            trace_radius: 15.0,
            fin_amplitude: 1.0,
            fin_frequency: 0.15,
            shark: PatrolConfig {
                speed: 1.8,
                min_x: -1.0,
                max_x: 10.0,
                flip_yaw: true,
            },
            squid: PatrolConfig {
                speed: 0.55,
                min_x: -25.0,
                max_x: 15.0,
                flip_yaw: false,
            },
            seahorse_anchor_y: 1.0,
            seahorse_jitter_step: 0.03,
            spinner_rate: 10.0,
        }
    }
}

/// Per-entity animation state, chosen from the entity kind at load time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Motion {
    Static,
    Patrol {
        config: PatrolConfig,
        /// +1 or -1 along X.
        direction: f32,
        /// Accumulated turn-around yaw, degrees.
        yaw_offset: f32,
    },
    Jitter {
        anchor_y: f32,
        direction: f32,
        step: f32,
    },
    Spin {
        degrees_per_sec: f32,
        /// Replaces the manifest yaw.
        angle: f32,
    },
}

impl Motion {
    pub fn for_kind(kind: EntityKind, config: &SimulationConfig) -> Self {
        match kind {
            EntityKind::Shark => Motion::Patrol {
                config: config.shark,
                direction: 1.0,
                yaw_offset: 0.0,
            },
            EntityKind::Squid => Motion::Patrol {
                config: config.squid,
                direction: 1.0,
                yaw_offset: 0.0,
            },
            EntityKind::Seahorse => Motion::Jitter {
                anchor_y: config.seahorse_anchor_y,
                direction: 1.0,
                step: config.seahorse_jitter_step,
            },
            EntityKind::Spinner => Motion::Spin {
                degrees_per_sec: config.spinner_rate,
                angle: 0.0,
            },
            EntityKind::Terrain | EntityKind::Prop | EntityKind::Generic => Motion::Static,
        }
    }

    pub fn yaw(&self, base: f32) -> f32 {
        match self {
            Motion::Patrol { yaw_offset, .. } => base + yaw_offset,
            Motion::Spin { angle, .. } => *angle,
            Motion::Static | Motion::Jitter { .. } => base,
        }
    }

    fn step(&mut self, position: &mut Vec3, dt: f32, rng: &mut impl Rng) {
        match self {
            Motion::Static => {}
            Motion::Patrol {
                config,
                direction,
                yaw_offset,
            } => {
                position.x += config.speed * *direction * dt;
                if reflect(direction, position.x, config.min_x, config.max_x) && config.flip_yaw {
                    *yaw_offset = (*yaw_offset + 180.0) % 360.0;
                }
            }
            Motion::Jitter {
                anchor_y,
                direction,
                step,
            } => {
                *direction = -*direction;
                let jitter = rng.gen_range(-5i32..5) as f32;
                position.y = *anchor_y + jitter * *step * *direction;
            }
            Motion::Spin {
                degrees_per_sec,
                angle,
            } => {
                *angle = (*angle + *degrees_per_sec * dt) % 360.0;
            }
        }
    }
}

/// Reverses `direction` if `position` is at or past a bound while still heading outward.
/// Returns whether it flipped; a fish already heading back is left alone.
fn reflect(direction: &mut f32, position: f32, min: f32, max: f32) -> bool {
    let outward = (position >= max && *direction > 0.0) || (position <= min && *direction < 0.0);
    if outward {
        *direction = -*direction;
    }
    outward
}

/// Advances every entity by `dt` seconds. `time_ms` drives the fin oscillator.
pub fn advance(
    registry: &mut SceneRegistry,
    config: &SimulationConfig,
    dt: f32,
    time_ms: f64,
    rng: &mut impl Rng,
) {
    let radius = config.trace_radius;
    let fin_angle = config.fin_amplitude * (time_ms * config.fin_frequency as f64).sin() as f32;
    for fish in registry.fish_mut() {
        fish.position.x += fish.direction.x * config.fish_speed * dt;
        // y tracks the direction's y as an absolute height
        fish.position.y = fish.direction.y;
        fish.position.z += fish.direction.z * config.fish_speed * dt;
        reflect(&mut fish.direction.x, fish.position.x, -radius, radius);
        reflect(&mut fish.direction.z, fish.position.z, -radius, radius);
        fish.fin_angle = fin_angle;
    }
    for model in registry.models_mut() {
        model.motion.step(&mut model.position, dt, rng);
    }
}

/// Owns the tick clock; the first tick after creation advances by zero.
#[derive(Debug)]
pub struct Simulator {
    config: SimulationConfig,
    started: Instant,
    last_tick: Option<Instant>,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
            last_tick: None,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Measures wall time since the previous tick and advances the registry by it.
    pub fn tick(&mut self, registry: &mut SceneRegistry, rng: &mut impl Rng) {
        let now = Instant::now();
        let dt = self
            .last_tick
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_tick = Some(now);
        let time_ms = now.duration_since(self.started).as_secs_f64() * 1000.0;
        log::trace!("tick dt={:.4}s", dt);
        advance(registry, &self.config, dt, time_ms, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FishModel, Model, ModelPart};
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use render_api::{MeshHandle, ModelData};
    use std::sync::Arc;

    fn fish_at(position: Vec3, direction: Vec3) -> FishModel {
        FishModel {
            name: "fish".into(),
            body: Arc::new(ModelPart::default()),
            fin: Arc::new(ModelPart::default()),
            position,
            rotation_y: 0.0,
            direction,
            fin_angle: 0.0,
            texture: None,
            color: Vec3::ONE,
        }
    }

    fn model(kind: EntityKind, position: Vec3, config: &SimulationConfig) -> Model {
        Model {
            name: format!("{:?}", kind),
            kind,
            data: ModelData::default(),
            position,
            rotation_y: 45.0,
            mesh: MeshHandle(0),
            texture: None,
            motion: Motion::for_kind(kind, config),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn fish_reflects_once_per_crossing() {
        let config = SimulationConfig::default();
        let mut registry = SceneRegistry::new();
        registry.push_fish(fish_at(Vec3::new(14.9, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)));

        advance(&mut registry, &config, 1.0, 0.0, &mut rng());
        let fish = &registry.fish()[0];
        assert!(fish.position.x > config.trace_radius);
        assert!(fish.direction.x < 0.0);

        // still outside, already heading back: no second flip
        advance(&mut registry, &config, 0.1, 0.0, &mut rng());
        let fish = &registry.fish()[0];
        assert!(fish.position.x > config.trace_radius);
        assert!(fish.direction.x < 0.0);
    }

    #[test]
    fn fish_reflects_at_negative_bound() {
        let config = SimulationConfig::default();
        let mut registry = SceneRegistry::new();
        registry.push_fish(fish_at(Vec3::new(-14.9, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)));

        advance(&mut registry, &config, 1.0, 0.0, &mut rng());
        let fish = &registry.fish()[0];
        assert!(fish.position.x < -config.trace_radius);
        assert!(fish.direction.x > 0.0);

        advance(&mut registry, &config, 0.1, 0.0, &mut rng());
        let fish = &registry.fish()[0];
        assert!(fish.position.x < -config.trace_radius);
        assert!(fish.direction.x > 0.0);
    }

    #[test]
    fn fish_reflects_on_z_independently() {
        let config = SimulationConfig::default();
        let mut registry = SceneRegistry::new();
        registry.push_fish(fish_at(Vec3::new(0.0, 0.0, 14.9), Vec3::new(0.0, 0.0, 1.0)));
        registry.push_fish(fish_at(Vec3::new(0.0, 0.0, -14.9), Vec3::new(0.0, 0.0, -1.0)));

        advance(&mut registry, &config, 1.0, 0.0, &mut rng());
        let [near, far] = [&registry.fish()[0], &registry.fish()[1]];
        assert!(near.position.z > config.trace_radius);
        assert!(near.direction.z < 0.0);
        assert!(far.position.z < -config.trace_radius);
        assert!(far.direction.z > 0.0);
        assert_eq!(near.direction.x, 0.0);

        advance(&mut registry, &config, 0.1, 0.0, &mut rng());
        assert!(registry.fish()[0].direction.z < 0.0);
        assert!(registry.fish()[1].direction.z > 0.0);
    }

    #[test]
    fn fish_y_is_overwritten_by_direction_y() {
        let config = SimulationConfig::default();
        let mut registry = SceneRegistry::new();
        registry.push_fish(fish_at(Vec3::new(0.0, -8.0, -5.0), Vec3::new(2.0, 3.5, 0.0)));
        advance(&mut registry, &config, 0.5, 0.0, &mut rng());
        let fish = &registry.fish()[0];
        assert_eq!(fish.position.y, 3.5);
        assert_relative_eq!(fish.position.x, 0.5);
        assert_eq!(fish.position.z, -5.0);
        advance(&mut registry, &config, 0.5, 0.0, &mut rng());
        assert_eq!(registry.fish()[0].position.y, 3.5);
    }

    #[test]
    fn fin_angle_follows_time() {
        let config = SimulationConfig::default();
        let mut registry = SceneRegistry::new();
        registry.push_fish(fish_at(Vec3::ZERO, Vec3::X));
        let t = 10.0;
        advance(&mut registry, &config, 0.0, t, &mut rng());
        let expected = config.fin_amplitude * (t * 0.15f64).sin() as f32;
        assert_relative_eq!(registry.fish()[0].fin_angle, expected);
    }

    #[test]
    fn shark_turns_around_at_patrol_end() {
        let config = SimulationConfig::default();
        let mut registry = SceneRegistry::new();
        registry.push_model(model(EntityKind::Shark, Vec3::new(9.5, 0.0, -3.0), &config));

        advance(&mut registry, &config, 1.0, 0.0, &mut rng());
        let shark = &registry.models()[0];
        assert_relative_eq!(shark.position.x, 11.3, epsilon = 1e-5);
        assert_relative_eq!(shark.yaw(), 225.0);

        advance(&mut registry, &config, 0.1, 0.0, &mut rng());
        let shark = &registry.models()[0];
        assert!(shark.position.x < 11.3);
        assert_relative_eq!(shark.yaw(), 225.0);
    }

    #[test]
    fn squid_patrols_without_turning() {
        let config = SimulationConfig::default();
        let mut registry = SceneRegistry::new();
        registry.push_model(model(EntityKind::Squid, Vec3::new(14.9, 10.0, -10.0), &config));
        advance(&mut registry, &config, 1.0, 0.0, &mut rng());
        let squid = &registry.models()[0];
        assert!(matches!(squid.motion, Motion::Patrol { direction, .. } if direction < 0.0));
        assert_eq!(squid.yaw(), 45.0);
    }

    #[test]
    fn seahorse_jitters_around_fixed_anchor() {
        let config = SimulationConfig::default();
        let mut registry = SceneRegistry::new();
        // spawn height is discarded on the first tick
        registry.push_model(model(EntityKind::Seahorse, Vec3::new(30.0, 20.0, -40.0), &config));
        let mut rng = rng();
        let reach = 5.0 * config.seahorse_jitter_step + 1e-5;
        for _ in 0..100 {
            advance(&mut registry, &config, 0.016, 0.0, &mut rng);
            let seahorse = &registry.models()[0];
            assert!((seahorse.position.y - 1.0).abs() <= reach, "y = {}", seahorse.position.y);
            assert_eq!(seahorse.position.x, 30.0);
            assert_eq!(seahorse.position.z, -40.0);
        }
    }

    #[test]
    fn spinner_replaces_yaw() {
        let config = SimulationConfig::default();
        let mut registry = SceneRegistry::new();
        registry.push_model(model(EntityKind::Spinner, Vec3::ZERO, &config));
        advance(&mut registry, &config, 2.0, 0.0, &mut rng());
        assert_relative_eq!(registry.models()[0].yaw(), 20.0);
    }

    #[test]
    fn props_do_not_move() {
        let config = SimulationConfig::default();
        let mut registry = SceneRegistry::new();
        registry.push_model(model(EntityKind::Prop, Vec3::new(1.0, 2.0, 3.0), &config));
        advance(&mut registry, &config, 5.0, 0.0, &mut rng());
        assert_eq!(registry.models()[0].position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(registry.models()[0].yaw(), 45.0);
    }

    #[test]
    fn first_tick_advances_by_zero() {
        let mut sim = Simulator::new(SimulationConfig::default());
        let mut registry = SceneRegistry::new();
        registry.push_fish(fish_at(Vec3::new(1.0, 0.0, 2.0), Vec3::new(5.0, 0.0, 5.0)));
        sim.tick(&mut registry, &mut rng());
        assert_eq!(registry.fish()[0].position.x, 1.0);
        assert_eq!(registry.fish()[0].position.z, 2.0);
    }
}
