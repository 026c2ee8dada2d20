use ml::{
    Adam, AdamConfig, ActivationRegistry, Layer, Network, NnError, Optimizer, ParameterGradient,
    SgdConfig, SgdMomentum, IDENTITY,
};

fn small_net(seed: u64) -> Network {
    let registry = ActivationRegistry::with_defaults();
    let mut rng = fastrand::Rng::with_seed(seed);
    Network::mlp(&registry, &[3, 4, 2], "relu", "identity", &mut rng).unwrap()
}

fn random_grads(net: &Network, rng: &mut fastrand::Rng) -> Vec<ParameterGradient> {
    let mut grads = net.zero_gradients();
    for g in &mut grads {
        g.d_weights.data.iter_mut().for_each(|v| *v = rng.f32() - 0.5);
        g.d_biases.data.iter_mut().for_each(|v| *v = rng.f32() - 0.5);
    }
    grads
}

fn snapshot(net: &Network) -> Vec<(Vec<f32>, Vec<f32>)> {
    net.layers()
        .iter()
        .map(|l| (l.weights().data.clone(), l.biases().data.clone()))
        .collect()
}

#[test]
fn adam_zero_gradient_leaves_parameters_unchanged() {
    let mut net = small_net(1);
    let mut adam = Adam::new(&net, AdamConfig::default());
    let zeros = net.zero_gradients();

    // Fresh optimizer.
    let before = snapshot(&net);
    adam.step(&mut net, &zeros).unwrap();
    assert_eq!(before, snapshot(&net));

    // After real updates have built up non-zero moments.
    let mut rng = fastrand::Rng::with_seed(2);
    for _ in 0..5 {
        let grads = random_grads(&net, &mut rng);
        adam.step(&mut net, &grads).unwrap();
    }
    let before = snapshot(&net);
    for _ in 0..3 {
        adam.step(&mut net, &zeros).unwrap();
    }
    assert_eq!(before, snapshot(&net));
    assert_eq!(adam.timestep(), 10);
}

#[test]
fn adam_first_step_moves_by_learning_rate() {
    let mut net = Network::new();
    net.push(Layer::new(vec![0.0, 0.0], vec![0.0], 2, 1, IDENTITY).unwrap()).unwrap();
    let config = AdamConfig { learning_rate: 0.01, ..AdamConfig::default() };
    let mut adam = Adam::new(&net, config);

    let mut grads = net.zero_gradients();
    grads[0].d_weights.data = vec![2.0, -0.5];
    grads[0].d_biases.data = vec![1.0];
    adam.step(&mut net, &grads).unwrap();

    let w = &net.layers()[0].weights().data;
    let b = &net.layers()[0].biases().data;
    assert!((w[0] + 0.01).abs() < 1e-6, "{w:?}");
    assert!((w[1] - 0.01).abs() < 1e-6, "{w:?}");
    assert!((b[0] + 0.01).abs() < 1e-6, "{b:?}");
}

#[test]
fn adam_timestep_advances_once_per_step() {
    let mut net = small_net(3);
    let mut adam = Adam::new(&net, AdamConfig::default());
    assert_eq!(adam.timestep(), 1);
    let mut rng = fastrand::Rng::with_seed(4);
    for _ in 0..2 {
        let grads = random_grads(&net, &mut rng);
        adam.step(&mut net, &grads).unwrap();
    }
    assert_eq!(adam.timestep(), 3);
}

#[test]
fn mismatched_gradients_are_rejected_without_mutation() {
    let mut net = small_net(5);
    let other = Network::mlp(
        &ActivationRegistry::with_defaults(),
        &[3, 6, 2],
        "relu",
        "identity",
        &mut fastrand::Rng::with_seed(6),
    )
    .unwrap();
    let mut adam = Adam::new(&net, AdamConfig::default());
    let before = snapshot(&net);

    let err = adam.step(&mut net, &other.zero_gradients()).unwrap_err();
    assert!(matches!(err, NnError::ShapeMismatch { .. }));
    let truncated = net.zero_gradients()[..1].to_vec();
    let err = adam.step(&mut net, &truncated).unwrap_err();
    assert!(matches!(err, NnError::ShapeMismatch { context: "gradient count", .. }));

    assert_eq!(before, snapshot(&net));
    assert_eq!(adam.timestep(), 1);
}

#[test]
fn sgd_momentum_accumulates_velocity() {
    let mut net = Network::new();
    net.push(Layer::new(vec![1.0], vec![0.0], 1, 1, IDENTITY).unwrap()).unwrap();
    let mut sgd = SgdMomentum::new(&net, SgdConfig { learning_rate: 0.1, momentum: 0.9 });

    let mut grads = net.zero_gradients();
    grads[0].d_weights.data = vec![1.0];
    sgd.step(&mut net, &grads).unwrap();
    assert!((net.layers()[0].weights().data[0] - 0.9).abs() < 1e-6);
    sgd.step(&mut net, &grads).unwrap();
    assert!((net.layers()[0].weights().data[0] - 0.71).abs() < 1e-6);
    assert_eq!(net.layers()[0].biases().data[0], 0.0);
}
