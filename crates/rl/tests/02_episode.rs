use rl::{Episode, EpisodeDefect, Transition};

fn step(reward: f32, done: bool) -> Transition {
    Transition { state: vec![reward, -reward], action: 1, reward, done }
}

#[test]
fn complete_episode_ends_in_its_only_terminal() {
    let mut episode = Episode::new();
    for r in [1.0, 2.0] {
        episode.push(step(r, false));
    }
    assert_eq!(episode.validate(), Err(EpisodeDefect::Truncated));
    episode.push(step(3.0, true));
    assert_eq!(episode.validate(), Ok(()));
    assert_eq!(episode.len(), 3);
    assert_eq!(episode.total_reward(), 6.0);
    assert_eq!(episode.rewards().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn defects_are_reported_in_order_of_severity() {
    assert_eq!(Episode::new().validate(), Err(EpisodeDefect::Empty));

    let early: Episode = [step(1.0, false), step(1.0, true), step(1.0, true)].into_iter().collect();
    assert_eq!(early.validate(), Err(EpisodeDefect::EarlyTerminal(1)));

    let both: Episode = vec![step(1.0, true), step(1.0, false)].into();
    assert_eq!(both.validate(), Err(EpisodeDefect::EarlyTerminal(0)));
}

#[test]
fn defects_describe_themselves() {
    assert_eq!(EpisodeDefect::Empty.to_string(), "episode is empty");
    assert!(EpisodeDefect::EarlyTerminal(4).to_string().contains('4'));
}

#[test]
fn iteration_preserves_order() {
    let episode: Episode = (0..5).map(|i| step(i as f32, i == 4)).collect();
    let rewards: Vec<f32> = (&episode).into_iter().map(|t| t.reward).collect();
    assert_eq!(rewards, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    assert!(episode.is_complete());
}
