//! Recording, persisting and training on episodes.

use runtime::{
    Agents, Episode, EpisodeReport, RandomFactory, SocialEnv, Zoo, interact, train,
};
use world_content::TerrainPreset;
use world_core::{WorldConfig, WorldSize};

fn meadow(seed: u64) -> SocialEnv {
    SocialEnv::builder()
        .config(
            WorldConfig::new()
                .with_size(WorldSize::new(12, 12, 1))
                .with_seed(seed),
        )
        .preset(TerrainPreset::Meadow)
        .build()
        .unwrap()
}

fn run(seed: u64) -> (SocialEnv, Episode, Agents) {
    let mut env = meadow(seed);
    let mut agents = Agents::new();
    Zoo::new(RandomFactory::new(seed))
        .populate(&mut env, &mut agents, 4)
        .unwrap();
    let episode = interact(&mut env, &mut agents, 25).unwrap();
    (env, episode, agents)
}

#[test]
fn random_agents_play_a_full_episode() {
    let (env, episode, mut agents) = run(3);
    assert!(episode.steps() > 0);
    assert!(episode.steps() <= 25);

    let report = EpisodeReport::from_episode(&episode);
    assert_eq!(report.agents, 4);
    assert!(report.mean_reward.abs() <= 1.0);
    assert_eq!(agents.len(), 4);

    train(&episode, &mut agents).unwrap();
    let retired = agents.retain_live(&env);
    assert_eq!(retired.len(), report.deaths);
}

#[test]
fn episodes_are_reproducible() {
    let (_, a, _) = run(11);
    let (_, b, _) = run(11);
    assert_eq!(a, b);
}

#[test]
fn episodes_survive_a_json_round_trip() {
    let (_, episode, _) = run(5);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episode.json");

    episode.save(&path).unwrap();
    let loaded = Episode::load(&path).unwrap();
    assert_eq!(loaded.frames.len(), episode.frames.len());
    assert_eq!(loaded.trajectories().len(), episode.trajectories().len());
}

#[test]
fn agents_checkpoint_to_disk() {
    let (_, _, agents) = run(6);
    let dir = tempfile::tempdir().unwrap();
    for id in agents.ids() {
        let path = dir.path().join(format!("agent-{}.json", id.0));
        agents.get(id).unwrap().save(&path).unwrap();
        assert!(path.exists());
    }
}
