//! Driver binary: runs seeded foraging episodes against a minimal
//! kinematic physics stand-in and prints one JSON episode summary per line.
//!
//! The physics here is deliberately crude (force integration with linear
//! drag, sphere triggers for nectar and the arena boundary); it exists to
//! exercise the episode protocol end to end, not to be realistic.

use anyhow::Result;
use clap::Parser;
use forage_core::world::StepMetrics;
use forage_core::{
    ContactEvent, ContactTag, EnvConfig, Environment, Obstacle, ObstacleIndex,
    ResourceDescriptor,
};
use glam::Vec3;
use std::f32::consts::TAU;

/// Trigger radius of a nectar collider in the stand-in physics.
const NECTAR_TRIGGER_RADIUS: f32 = 0.1;
/// Synthetic contact id for the arena boundary.
const BOUNDARY_CONTACT_ID: u64 = 1_000;

#[derive(Parser, Debug)]
#[command(name = "forage", about = "Run seeded episodes of the nectar foraging environment")]
struct Args {
    /// Seed for the environment RNG.
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Number of episodes to run.
    #[arg(long, default_value_t = 3)]
    episodes: usize,
    /// Step limit per episode (also the training done-limit).
    #[arg(long, default_value_t = 2000)]
    steps: usize,
    /// Number of flowers arranged in a ring around the arena center.
    #[arg(long, default_value_t = 8)]
    flowers: usize,
    /// Record step metrics every N steps.
    #[arg(long, default_value_t = 50)]
    sample_every: usize,
    /// Pretty-print the JSON summaries.
    #[arg(long)]
    pretty: bool,
}

/// Flowers on a ring, axes tilted slightly outward like blooms on a bush.
fn flower_ring(count: usize, radius: f32, height: f32) -> Vec<ResourceDescriptor> {
    (0..count)
        .map(|i| {
            let theta = i as f32 / count as f32 * TAU;
            let outward = Vec3::new(theta.cos(), 0.0, theta.sin());
            ResourceDescriptor {
                anchor: outward * radius + Vec3::Y * height,
                local_offset: Vec3::ZERO,
                local_up: (Vec3::Y + outward * 0.3).normalize(),
                contact_id: i as u64 + 1,
            }
        })
        .collect()
}

/// A few solid trunks the spawn placer must avoid.
fn trunks() -> Vec<Obstacle> {
    [
        Vec3::new(0.0, 1.5, 0.0),
        Vec3::new(4.0, 1.5, -4.0),
        Vec3::new(-4.0, 1.5, 4.0),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, center)| Obstacle {
        center,
        radius: 0.8,
        contact_id: 100 + i as u64,
    })
    .collect()
}

struct KinematicBody {
    position: Vec3,
    velocity: Vec3,
    drag: f32,
}

impl KinematicBody {
    fn integrate(&mut self, force: Vec3, frozen: bool, dt: f32) {
        if frozen {
            self.velocity = Vec3::ZERO;
            return;
        }
        self.velocity += force * dt;
        self.velocity *= (1.0 - self.drag * dt).max(0.0);
        self.position += self.velocity * dt;
    }
}

/// Steer toward the tracked flower using only the observation vector plus
/// the agent's public pitch/yaw, the same information a policy would get.
fn seek_action(env: &Environment, observation: &[f32; 10]) -> [f32; 5] {
    let direction = Vec3::new(observation[4], observation[5], observation[6]);
    if direction.length_squared() < 1e-8 {
        return [0.0; 5];
    }
    let desired_pitch = (-direction.y).asin().to_degrees();
    let desired_yaw = direction.x.atan2(direction.z).to_degrees();
    let pitch_rate = ((desired_pitch - env.agent().pitch_degrees()) / 30.0).clamp(-1.0, 1.0);
    let yaw_error = {
        let mut e = desired_yaw - env.agent().yaw_degrees();
        while e > 180.0 {
            e -= 360.0;
        }
        while e <= -180.0 {
            e += 360.0;
        }
        e
    };
    let yaw_rate = (yaw_error / 30.0).clamp(-1.0, 1.0);
    [direction.x, direction.y, direction.z, pitch_rate, yaw_rate]
}

fn detect_contacts(
    env: &Environment,
    beak_tip: Vec3,
    position: Vec3,
    hit_boundary: bool,
) -> Vec<ContactEvent> {
    let mut contacts = Vec::new();
    for (id, flower) in env.area().iter() {
        if beak_tip.distance(flower.position()) < NECTAR_TRIGGER_RADIUS {
            contacts.push(ContactEvent {
                // Flower contact ids are assigned 1..=n in ring order.
                contact_id: id as u64 + 1,
                tag: ContactTag::Nectar,
                closest_point: beak_tip,
            });
        }
    }
    if hit_boundary {
        contacts.push(ContactEvent {
            contact_id: BOUNDARY_CONTACT_ID,
            tag: ContactTag::Boundary,
            closest_point: position,
        });
    }
    contacts
}

fn run_episode(env: &mut Environment, args: &Args) -> Result<forage_core::world::EpisodeSummary> {
    let mut observation = env.reset()?;
    let config = env.config().clone();
    let arena_radius = config.arena_diameter / 2.0;
    let mut body = KinematicBody {
        position: env.agent().position(),
        velocity: Vec3::ZERO,
        drag: 2.0,
    };
    let mut samples: Vec<StepMetrics> = Vec::new();

    for step in 1..=args.steps {
        let action = seek_action(env, &observation);
        let actuation = env.apply_action(&action);
        body.integrate(actuation.force, actuation.frozen, config.dt);

        // Keep the body inside the arena the way a wall collider would,
        // remembering that it touched the wall this step.
        let hit_boundary = body.position.length() > arena_radius;
        if hit_boundary {
            body.position = body.position.normalize() * arena_radius;
        }

        let beak_tip =
            body.position + actuation.orientation * Vec3::from_array(config.beak_tip_offset);
        let contacts = detect_contacts(env, beak_tip, body.position, hit_boundary);
        let frame = forage_core::PhysicsFrame {
            position: body.position,
            velocity: body.velocity,
            contacts,
        };
        let outcome = env.complete_step(&frame)?;
        observation = outcome.observation;

        if step % args.sample_every == 0 || step == args.steps || outcome.done {
            samples.push(env.collect_step_metrics(outcome.reward_delta));
        }
        if outcome.done {
            break;
        }
    }
    Ok(env.collect_episode_summary(samples))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = EnvConfig {
        seed: args.seed,
        max_episode_steps: args.steps,
        ..EnvConfig::default()
    };
    let mut env = Environment::try_new(
        config,
        flower_ring(args.flowers.max(1), 6.0, 1.5),
        Box::new(ObstacleIndex::new(trunks())),
    )?;

    for _ in 0..args.episodes {
        let summary = run_episode(&mut env, &args)?;
        let json = if args.pretty {
            serde_json::to_string_pretty(&summary)?
        } else {
            serde_json::to_string(&summary)?
        };
        println!("{json}");
        for event in env.drain_events() {
            // Visual side effects have no renderer here; surface them for
            // debugging when pretty output is requested.
            if args.pretty {
                eprintln!("event: {event:?}");
            }
        }
    }
    Ok(())
}
