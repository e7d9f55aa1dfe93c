//! Environment scenarios driven through the public runtime API.

use std::collections::BTreeMap;

use runtime::{RuntimeError, SocialEnv};
use world_content::{ContentFactory, TerrainPreset};
use world_core::{
    ActorAction, ActorSpawn, EnergyRules, Grid, ObjectSpawn, Operations, Position, WorldConfig,
    WorldSize,
};

fn flat_env(size: WorldSize) -> SocialEnv {
    SocialEnv::new(
        WorldConfig::new().with_size(size).with_seed(8),
        Grid::filled(size, Operations::TRAVERSABLE),
    )
}

#[test]
fn eat_food_ahead_through_the_environment() {
    let size = WorldSize::new(16, 16, 1);
    let mut terrain = Grid::filled(size, Operations::TRAVERSABLE);
    terrain.set(Position::new(9, 8, 0), Operations::EDIBLE);
    let mut env = SocialEnv::new(WorldConfig::new().with_size(size), terrain);
    let id = env
        .add_actor(ActorSpawn::at(Position::new(8, 8, 0)).facing(0.0))
        .unwrap();

    let observations = env.reset().unwrap();
    assert!(
        env.observation_space(id)
            .unwrap()
            .contains(&observations[&id])
    );

    let result = env
        .step(&BTreeMap::from([(id, ActorAction::idle().with_eat())]))
        .unwrap();
    assert!((result.infos[&id].energy - 109.3).abs() < 1e-9);
    assert!(result.rewards[&id] > 0.0);
    assert_eq!(
        env.state().terrain.get(Position::new(9, 8, 0)),
        Some(&Operations::TRAVERSABLE)
    );
}

#[test]
fn reset_makes_the_first_reward_relative_to_it() {
    let mut env = flat_env(WorldSize::new(6, 6, 1));
    let id = env.add_actor(ActorSpawn::at(Position::new(2, 2, 0))).unwrap();
    let idle = BTreeMap::from([(id, ActorAction::idle())]);

    let first = env.step(&idle).unwrap().rewards[&id];
    env.reset().unwrap();
    let second = env.step(&idle).unwrap().rewards[&id];
    assert!((first - second).abs() < 1e-12);
}

#[test]
fn resting_death_is_reported_once() {
    let mut env = flat_env(WorldSize::new(6, 6, 1));
    let id = env
        .add_actor(ActorSpawn::at(Position::new(2, 2, 0)).with_energy(0.1))
        .unwrap();
    env.reset().unwrap();
    let idle = BTreeMap::from([(id, ActorAction::idle())]);

    let result = env.step(&idle).unwrap();
    assert_eq!(result.dones.get(&id), Some(&true));
    let result = env.step(&idle).unwrap();
    assert!(!result.dones.contains_key(&id));
    assert!(env.observation_space(id).is_err());
}

#[test]
fn actor_with_exactly_one_rest_left_dies_resting() {
    let mut env = flat_env(WorldSize::new(6, 6, 1));
    let id = env
        .add_actor(
            ActorSpawn::at(Position::new(2, 2, 0)).with_energy(EnergyRules::RESTING_ENERGY_RATE),
        )
        .unwrap();
    env.reset().unwrap();
    let idle = BTreeMap::from([(id, ActorAction::idle())]);

    let result = env.step(&idle).unwrap();
    assert_eq!(result.infos[&id].energy, 0.0);
    assert_eq!(result.dones.get(&id), Some(&true));
    assert_eq!(env.actors().count(), 0);

    let result = env.step(&idle).unwrap();
    assert!(!result.dones.contains_key(&id));
}

#[test]
fn rejected_actions_do_not_stop_the_turn() {
    let mut env = flat_env(WorldSize::new(6, 6, 1));
    let bad = env.add_actor(ActorSpawn::at(Position::new(1, 1, 0))).unwrap();
    let good = env.add_actor(ActorSpawn::at(Position::new(4, 4, 0))).unwrap();
    let actions = BTreeMap::from([
        (bad, ActorAction::idle().with_forward(2.0)),
        (good, ActorAction::idle()),
    ]);

    let result = env.step(&actions).unwrap();
    assert!(result.infos[&bad].rejected.is_some());
    assert!(result.infos[&good].report.is_some());
}

#[test]
fn objects_show_up_in_the_text_render() {
    let mut env = flat_env(WorldSize::new(4, 2, 1));
    env.add_object(ObjectSpawn::new(Operations::LIFTABLE).at(Position::new(0, 0, 0)))
        .unwrap();
    env.add_object(
        ObjectSpawn::new(Operations::LIFTABLE)
            .at(Position::new(3, 0, 0))
            .with_signal(5),
    )
    .unwrap();

    let text = env.render_text(0);
    assert_eq!(text.lines().nth(1), Some("o..S"));
}

#[test]
fn builder_loads_bundled_content() {
    let env = SocialEnv::builder()
        .content(ContentFactory::bundled(), "meadow")
        .build()
        .unwrap();
    assert_eq!(env.config().seed, 7);
    assert_eq!(env.state().size(), WorldSize::new(16, 16, 1));
}

#[test]
fn builder_reports_missing_layouts() {
    let dir = tempfile::tempdir().unwrap();
    let result = SocialEnv::builder()
        .config(WorldConfig::new())
        .content(ContentFactory::new(dir.path()), "nowhere")
        .build();
    assert!(matches!(result, Err(RuntimeError::Content(_))));
}

#[test]
fn presets_fill_the_configured_size() {
    let size = WorldSize::new(12, 12, 3);
    let env = SocialEnv::builder()
        .config(WorldConfig::new().with_size(size).with_seed(2))
        .preset(TerrainPreset::Quarry)
        .build()
        .unwrap();
    assert_eq!(env.state().size(), size);
}
