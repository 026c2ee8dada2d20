use crate::{Episode, RlError};

/// Summary of one learning update.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LearnStats {
    /// Episodes that contributed gradient.
    pub episodes: usize,
    /// Episodes skipped as malformed.
    pub skipped: usize,
    pub transitions: usize,
    /// Mean discounted return over the used transitions.
    pub mean_return: f32,
    /// Running baseline after the update.
    pub baseline: f32,
}

/// A learner with a discrete action set, driven by the trainer.
///
/// `act` takes `&self` and an external generator so that one agent can be
/// queried from every worker at once during a tick. `learn` is only called
/// between ticks, with exclusive access.
pub trait Agent: Sync {
    /// Observation width the agent expects.
    fn input_size(&self) -> usize;

    fn action_count(&self) -> usize;

    /// Samples an action for `state`.
    fn act(&self, state: &[f32], rng: &mut fastrand::Rng) -> usize;

    /// Updates the policy from complete episodes.
    ///
    /// # Errors
    ///
    /// Fails only if the underlying optimizer rejects the gradients.
    fn learn(&mut self, episodes: &[Episode]) -> Result<LearnStats, RlError>;
}
