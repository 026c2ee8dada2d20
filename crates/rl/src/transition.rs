use std::fmt;

/// One step of experience.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    /// Observation the action was chosen from.
    pub state: Vec<f32>,
    pub action: usize,
    pub reward: f32,
    /// Whether the environment terminated after this step.
    pub done: bool,
}

/// The transitions of one trajectory, in order.
///
/// A complete episode ends with the only terminal transition. Incomplete
/// sequences can still be held (the trainer drains partial buffers), but
/// [`Episode::validate`] reports why they are unusable for Monte-Carlo returns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Episode {
    transitions: Vec<Transition>,
}

/// All episodes gathered between two learning events.
pub type Batch = Vec<Episode>;

/// Why an [`Episode`] cannot be learned from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeDefect {
    Empty,
    /// The last transition is not terminal.
    Truncated,
    /// A transition before the last one is terminal.
    EarlyTerminal(usize),
}

impl fmt::Display for EpisodeDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "episode is empty"),
            Self::Truncated => write!(f, "episode does not end in a terminal transition"),
            Self::EarlyTerminal(t) => write!(f, "transition {t} is terminal but is not the last"),
        }
    }
}

impl Episode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Transition> {
        self.transitions.iter()
    }

    #[must_use]
    pub fn rewards(&self) -> impl ExactSizeIterator<Item = f32> + DoubleEndedIterator + '_ {
        self.transitions.iter().map(|t| t.reward)
    }

    #[must_use]
    pub fn total_reward(&self) -> f32 {
        self.rewards().sum()
    }

    /// # Errors
    ///
    /// Returns the first [`EpisodeDefect`] found.
    pub fn validate(&self) -> Result<(), EpisodeDefect> {
        let Some((last, rest)) = self.transitions.split_last() else {
            return Err(EpisodeDefect::Empty);
        };
        if let Some(t) = rest.iter().position(|t| t.done) {
            return Err(EpisodeDefect::EarlyTerminal(t));
        }
        if last.done {
            Ok(())
        } else {
            Err(EpisodeDefect::Truncated)
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }
}

impl From<Vec<Transition>> for Episode {
    fn from(transitions: Vec<Transition>) -> Self {
        Self { transitions }
    }
}

impl FromIterator<Transition> for Episode {
    fn from_iter<I: IntoIterator<Item = Transition>>(iter: I) -> Self {
        Self { transitions: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a Episode {
    type Item = &'a Transition;
    type IntoIter = std::slice::Iter<'a, Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.transitions.iter()
    }
}
