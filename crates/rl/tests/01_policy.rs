use rl::policy::{argmax, discounted_returns, sample_categorical, softmax};

#[test]
fn softmax_survives_huge_logits() {
    let p = softmax(&[1000.0, 1000.0, 1.0]);
    assert!(p.iter().all(|v| v.is_finite() && *v >= 0.0));
    assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    assert!((p[0] - 0.5).abs() < 1e-6);
    assert!((p[1] - 0.5).abs() < 1e-6);
}

#[test]
fn softmax_of_degenerate_logits_is_still_a_distribution() {
    assert_eq!(softmax(&[f32::INFINITY, 0.0]), vec![1.0, 0.0]);
    assert_eq!(softmax(&[f32::INFINITY, -1.0, f32::INFINITY]), vec![0.5, 0.0, 0.5]);
    assert_eq!(softmax(&[f32::NEG_INFINITY; 4]), vec![0.25; 4]);
    assert_eq!(softmax(&[f32::NAN, 1.0]), vec![0.5, 0.5]);
    assert!(softmax(&[]).is_empty());
}

#[test]
fn softmax_is_shift_invariant() {
    let a = softmax(&[0.5, -1.0, 2.0]);
    let b = softmax(&[10.5, 9.0, 12.0]);
    for (x, y) in a.iter().zip(&b) {
        assert!((x - y).abs() < 1e-6);
    }
}

#[test]
fn discounted_returns_accumulate_backwards() {
    assert_eq!(discounted_returns([1.0, 1.0, 1.0], 0.5), vec![1.75, 1.5, 1.0]);
    assert_eq!(discounted_returns([3.0], 0.9), vec![3.0]);
    assert!(discounted_returns(Vec::<f32>::new(), 0.9).is_empty());
    assert_eq!(discounted_returns([1.0, 2.0], 0.0), vec![1.0, 2.0]);
}

#[test]
fn sampling_follows_probabilities() {
    let mut rng = fastrand::Rng::with_seed(11);
    let probs = [0.2, 0.0, 0.8];
    let mut counts = [0usize; 3];
    for _ in 0..10_000 {
        counts[sample_categorical(&probs, &mut rng)] += 1;
    }
    assert_eq!(counts[1], 0);
    assert!((1_700..2_300).contains(&counts[0]), "counts {counts:?}");
    assert!((7_700..8_300).contains(&counts[2]), "counts {counts:?}");
}

#[test]
fn sampling_falls_back_to_last_nonzero_entry() {
    // Mass sums short of one, so some draws land past the cumulative total.
    let mut rng = fastrand::Rng::with_seed(3);
    let probs = [0.0, 0.1, 0.0];
    for _ in 0..200 {
        assert_eq!(sample_categorical(&probs, &mut rng), 1);
    }
}

#[test]
fn argmax_prefers_first_maximum() {
    assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), 1);
    assert_eq!(argmax(&[-3.0]), 0);
}
