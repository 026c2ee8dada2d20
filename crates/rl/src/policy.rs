//! Categorical policy helpers shared by the agent and its tests.

/// Numerically stable softmax: the maximum logit is subtracted before
/// exponentiation, so large logits cannot overflow.
///
/// Degenerate inputs still yield a distribution. Mass is split evenly over
/// the `+inf` logits when there are any, and the result is uniform when the
/// logits are all `-inf` or contain a NaN.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let is_pos_inf = |z: f32| z.is_infinite() && z.is_sign_positive();
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if is_pos_inf(max) {
        let winners = logits.iter().filter(|&&z| is_pos_inf(z)).count() as f32;
        return logits.iter().map(|&z| if is_pos_inf(z) { 1.0 / winners } else { 0.0 }).collect();
    }
    let mut exps: Vec<f32> = logits.iter().map(|&z| (z - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        for e in &mut exps {
            *e /= sum;
        }
    } else {
        exps.fill(1.0 / logits.len() as f32);
    }
    exps
}

/// Draws an index from `probabilities` by walking the cumulative sum.
///
/// If rounding leaves the cumulative sum short of the draw, the last index
/// with non-zero probability is returned.
///
/// # Panics
///
/// Panics if `probabilities` is empty.
#[must_use]
pub fn sample_categorical(probabilities: &[f32], rng: &mut fastrand::Rng) -> usize {
    assert!(!probabilities.is_empty(), "cannot sample from an empty distribution");
    let draw = rng.f32();
    let mut cumulative = 0.0;
    for (i, &p) in probabilities.iter().enumerate() {
        cumulative += p;
        if draw < cumulative {
            return i;
        }
    }
    probabilities.iter().rposition(|&p| p > 0.0).unwrap_or(probabilities.len() - 1)
}

/// Discounted returns, computed backwards: `G[T-1] = r[T-1]` and
/// `G[t] = r[t] + gamma * G[t+1]`.
#[must_use]
pub fn discounted_returns<I>(rewards: I, gamma: f32) -> Vec<f32>
where
    I: IntoIterator<Item = f32>,
    I::IntoIter: DoubleEndedIterator + ExactSizeIterator,
{
    let rewards = rewards.into_iter();
    let mut returns = vec![0.0; rewards.len()];
    let mut running = 0.0;
    for (slot, r) in returns.iter_mut().rev().zip(rewards.rev()) {
        running = r + gamma * running;
        *slot = running;
    }
    returns
}

/// Index of the largest value; ties resolve to the lowest index.
#[must_use]
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
