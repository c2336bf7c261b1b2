use super::*;
use crate::area::ResourceDescriptor;
use crate::config::EnvConfigError;
use crate::resource::ResourceEvent;
use crate::spatial::{Obstacle, ObstacleIndex};
use glam::Vec3;

fn flower(contact_id: u64, anchor: Vec3, local_up: Vec3) -> ResourceDescriptor {
    ResourceDescriptor {
        anchor,
        local_offset: Vec3::ZERO,
        local_up,
        contact_id,
    }
}

fn test_config() -> EnvConfig {
    EnvConfig {
        // Beak tip at the agent origin keeps the geometry in tests exact.
        beak_tip_offset: [0.0, 0.0, 0.0],
        ..EnvConfig::default()
    }
}

fn make_env(config: EnvConfig, descriptors: Vec<ResourceDescriptor>) -> Environment {
    Environment::try_new(config, descriptors, Box::new(ObstacleIndex::empty())).unwrap()
}

fn frame_at(position: Vec3, contacts: Vec<ContactEvent>) -> PhysicsFrame {
    PhysicsFrame {
        position,
        velocity: Vec3::ZERO,
        contacts,
    }
}

fn nectar_contact(contact_id: u64, closest_point: Vec3) -> ContactEvent {
    ContactEvent {
        contact_id,
        tag: ContactTag::Nectar,
        closest_point,
    }
}

#[test]
fn try_new_rejects_invalid_config() {
    let config = EnvConfig {
        dt: 0.0,
        ..test_config()
    };
    assert!(matches!(
        Environment::try_new(
            config,
            vec![flower(1, Vec3::ZERO, Vec3::Y)],
            Box::new(ObstacleIndex::empty()),
        ),
        Err(EnvInitError::Config(EnvConfigError::InvalidTimestep))
    ));
}

#[test]
fn try_new_rejects_empty_resource_set() {
    assert!(matches!(
        Environment::try_new(test_config(), vec![], Box::new(ObstacleIndex::empty())),
        Err(EnvInitError::NoResources)
    ));
}

#[test]
fn try_new_rejects_duplicate_contact_ids() {
    let descriptors = vec![
        flower(1, Vec3::ZERO, Vec3::Y),
        flower(1, Vec3::X, Vec3::Y),
    ];
    assert!(matches!(
        Environment::try_new(test_config(), descriptors, Box::new(ObstacleIndex::empty())),
        Err(EnvInitError::Registration(AreaError::DuplicateContact {
            contact_id: 1
        }))
    ));
}

#[test]
fn reset_returns_a_live_observation() {
    let mut env = make_env(test_config(), vec![flower(1, Vec3::new(3.0, 1.5, 0.0), Vec3::Y)]);
    let obs = env.reset().unwrap();
    assert_eq!(obs.len(), OBSERVATION_LEN);
    assert!(obs.iter().any(|v| *v != 0.0));
    assert_eq!(env.step_index(), 0);
    assert_eq!(env.episode_index(), 1);
}

#[test]
fn reset_is_deterministic_for_equal_seeds() {
    let descriptors = || {
        vec![
            flower(1, Vec3::new(3.0, 1.5, 0.0), Vec3::Y),
            flower(2, Vec3::new(-3.0, 1.5, 0.0), Vec3::Y),
        ]
    };
    let mut a = make_env(test_config(), descriptors());
    let mut b = make_env(test_config(), descriptors());
    assert_eq!(a.reset().unwrap(), b.reset().unwrap());
}

#[test]
fn non_training_reset_spawns_in_front_of_a_flower() {
    let config = EnvConfig {
        training: false,
        ..test_config()
    };
    let mut env = make_env(config, vec![flower(1, Vec3::new(2.0, 1.0, 2.0), Vec3::Y)]);
    for _ in 0..8 {
        let obs = env.reset().unwrap();
        let distance = obs[9] * env.config().arena_diameter;
        assert!(distance >= 0.1 - 1e-4 && distance <= 0.2 + 1e-4);
    }
}

#[test]
fn reset_fails_fatally_when_placement_is_obstructed() {
    let everything = ObstacleIndex::new(vec![Obstacle {
        center: Vec3::ZERO,
        radius: 1000.0,
        contact_id: 99,
    }]);
    let mut env = Environment::try_new(
        test_config(),
        vec![flower(1, Vec3::new(3.0, 1.5, 0.0), Vec3::Y)],
        Box::new(everything),
    )
    .unwrap();
    match env.reset() {
        Err(ResetError::Placement(e)) => assert_eq!(e.attempts, 100),
        other => panic!("expected placement exhaustion, got {other:?}"),
    }
}

#[test]
fn feeding_at_the_beak_accumulates_nectar_and_reward() {
    let mut env = make_env(test_config(), vec![flower(1, Vec3::new(1.0, 1.0, 0.0), Vec3::Y)]);
    let at_flower = Vec3::new(1.0, 1.0, 0.0);
    let outcome = env
        .complete_step(&frame_at(at_flower, vec![nectar_contact(1, at_flower)]))
        .unwrap();

    // Identity orientation, flower up +Y: alignment dot is 0, bonus clamps away.
    assert!((outcome.reward_delta - env.config().base_feed_reward).abs() < 1e-6);
    assert!((env.agent().nectar_obtained() - env.config().feed_quantum).abs() < 1e-6);
    assert!((env.cumulative_reward() - outcome.reward_delta).abs() < 1e-6);
}

#[test]
fn aligned_feeding_earns_the_full_bonus() {
    // Flower axis along -Z: the default forward (+Z) is perfectly aligned.
    let mut env = make_env(
        test_config(),
        vec![flower(1, Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z)],
    );
    let at_flower = Vec3::new(0.0, 0.0, 1.0);
    let outcome = env
        .complete_step(&frame_at(at_flower, vec![nectar_contact(1, at_flower)]))
        .unwrap();
    let expected = env.config().base_feed_reward + env.config().aligned_feed_bonus;
    assert!((outcome.reward_delta - expected).abs() < 1e-6);
}

#[test]
fn every_accepted_contact_pays_the_base_reward_even_when_drained() {
    let config = EnvConfig {
        feed_quantum: 1.0,
        ..test_config()
    };
    let mut env = make_env(config, vec![flower(1, Vec3::new(1.0, 0.0, 0.0), Vec3::Y)]);
    let at_flower = Vec3::new(1.0, 0.0, 0.0);
    let outcome = env
        .complete_step(&frame_at(
            at_flower,
            vec![nectar_contact(1, at_flower), nectar_contact(1, at_flower)],
        ))
        .unwrap();

    // The first contact drains the flower; the second still pays the base
    // reward (alignment is perpendicular here, so no bonus on either).
    let expected = 2.0 * env.config().base_feed_reward;
    assert!((outcome.reward_delta - expected).abs() < 1e-6);
    assert!((env.agent().nectar_obtained() - 1.0).abs() < 1e-6);
}

#[test]
fn contacts_away_from_the_beak_are_ignored() {
    let mut env = make_env(test_config(), vec![flower(1, Vec3::new(1.0, 1.0, 0.0), Vec3::Y)]);
    let far_point = Vec3::new(1.0, 1.0, 0.5);
    let outcome = env
        .complete_step(&frame_at(Vec3::ZERO, vec![nectar_contact(1, far_point)]))
        .unwrap();
    assert_eq!(outcome.reward_delta, 0.0);
    assert_eq!(env.agent().nectar_obtained(), 0.0);
}

#[test]
fn unknown_nectar_contact_is_fatal() {
    let mut env = make_env(test_config(), vec![flower(1, Vec3::new(1.0, 1.0, 0.0), Vec3::Y)]);
    let err = env
        .complete_step(&frame_at(Vec3::ZERO, vec![nectar_contact(77, Vec3::ZERO)]))
        .unwrap_err();
    assert_eq!(err, StepError::UnknownContact { contact_id: 77 });
}

#[test]
fn observation_zeroes_once_every_flower_is_empty() {
    let config = EnvConfig {
        feed_quantum: 1.0,
        ..test_config()
    };
    let mut env = make_env(config, vec![flower(1, Vec3::new(1.0, 0.0, 0.0), Vec3::Y)]);
    let at_flower = Vec3::new(1.0, 0.0, 0.0);
    let outcome = env
        .complete_step(&frame_at(at_flower, vec![nectar_contact(1, at_flower)]))
        .unwrap();
    assert_eq!(env.area().active_count(), 0);
    assert_eq!(outcome.observation, [0.0; OBSERVATION_LEN]);
    assert_eq!(env.agent().nearest(), None);
}

#[test]
fn boundary_contact_penalizes_only_in_training() {
    let boundary = ContactEvent {
        contact_id: 500,
        tag: ContactTag::Boundary,
        closest_point: Vec3::ZERO,
    };
    let descriptors = || vec![flower(1, Vec3::new(1.0, 1.0, 0.0), Vec3::Y)];

    let mut training = make_env(test_config(), descriptors());
    let outcome = training
        .complete_step(&frame_at(Vec3::ZERO, vec![boundary]))
        .unwrap();
    assert!((outcome.reward_delta - training.config().boundary_penalty).abs() < 1e-6);

    let manual = EnvConfig {
        training: false,
        ..test_config()
    };
    let mut manual = make_env(manual, descriptors());
    let outcome = manual
        .complete_step(&frame_at(Vec3::ZERO, vec![boundary]))
        .unwrap();
    assert_eq!(outcome.reward_delta, 0.0);
}

#[test]
fn done_triggers_at_the_step_limit_in_training_only() {
    let config = EnvConfig {
        max_episode_steps: 3,
        ..test_config()
    };
    let mut env = make_env(config, vec![flower(1, Vec3::new(1.0, 1.0, 0.0), Vec3::Y)]);
    env.reset().unwrap();
    for expected_done in [false, false, true] {
        let outcome = env.complete_step(&frame_at(Vec3::ZERO, vec![])).unwrap();
        assert_eq!(outcome.done, expected_done);
    }

    let config = EnvConfig {
        training: false,
        max_episode_steps: 3,
        ..test_config()
    };
    let mut env = make_env(config, vec![flower(1, Vec3::new(1.0, 1.0, 0.0), Vec3::Y)]);
    env.reset().unwrap();
    for _ in 0..10 {
        let outcome = env.complete_step(&frame_at(Vec3::ZERO, vec![])).unwrap();
        assert!(!outcome.done);
    }
}

#[test]
fn freeze_suspends_actions_outside_training() {
    let config = EnvConfig {
        training: false,
        ..test_config()
    };
    let mut env = make_env(config, vec![flower(1, Vec3::new(1.0, 1.0, 0.0), Vec3::Y)]);
    env.reset().unwrap();
    env.freeze();
    let actuation = env.apply_action(&[1.0, 1.0, 1.0, 1.0, 1.0]);
    assert_eq!(actuation.force, Vec3::ZERO);
    assert!(actuation.frozen);

    env.unfreeze();
    let actuation = env.apply_action(&[0.0, 1.0, 0.0, 0.0, 0.0]);
    assert!(actuation.force.length() > 0.0);
    assert!(!actuation.frozen);
}

#[test]
#[should_panic(expected = "freeze is only valid outside training mode")]
fn freeze_during_training_is_a_contract_violation() {
    let mut env = make_env(test_config(), vec![flower(1, Vec3::new(1.0, 1.0, 0.0), Vec3::Y)]);
    env.freeze();
}

#[test]
fn reset_and_depletion_emit_resource_events() {
    let config = EnvConfig {
        feed_quantum: 1.0,
        ..test_config()
    };
    let mut env = make_env(config, vec![flower(1, Vec3::new(1.0, 0.0, 0.0), Vec3::Y)]);
    env.reset().unwrap();
    let events = env.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, ResourceEvent::ColorChanged(0, _))));

    let at_flower = env.area().get(0).position();
    env.complete_step(&frame_at(at_flower, vec![nectar_contact(1, at_flower)]))
        .unwrap();
    let events = env.drain_events();
    assert!(events.contains(&ResourceEvent::Deactivated(0)));
}

#[test]
fn step_metrics_track_reward_and_depletion() {
    let mut env = make_env(test_config(), vec![flower(1, Vec3::new(1.0, 1.0, 0.0), Vec3::Y)]);
    let at_flower = Vec3::new(1.0, 1.0, 0.0);
    let outcome = env
        .complete_step(&frame_at(at_flower, vec![nectar_contact(1, at_flower)]))
        .unwrap();
    let metrics = env.collect_step_metrics(outcome.reward_delta);
    assert_eq!(metrics.step, 1);
    assert_eq!(metrics.active_resources, 1);
    assert!(metrics.nearest_distance.unwrap() < 1e-5);
    assert!((metrics.nectar_obtained - env.config().feed_quantum).abs() < 1e-6);

    let summary = env.collect_episode_summary(vec![metrics]);
    assert_eq!(summary.schema_version, 1);
    assert_eq!(summary.steps, 1);
    assert!((summary.total_reward - outcome.reward_delta).abs() < 1e-6);
}
