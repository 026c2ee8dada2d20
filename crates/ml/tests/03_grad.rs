use ml::{ActivationRegistry, Layer, Network};

/// Linear probe `L = c · y` so that dL/dy = c.
fn probe_loss(net: &Network, x: &[f32], c: &[f32]) -> f32 {
    net.predict(x).iter().zip(c).map(|(y, c)| y * c).sum()
}

/// Rebuilds `net` with one parameter nudged by `delta`.
fn perturbed(net: &Network, layer_idx: usize, bias: bool, i: usize, delta: f32) -> Network {
    let mut out = Network::new();
    for (l, layer) in net.layers().iter().enumerate() {
        let mut w = layer.weights().data.clone();
        let mut b = layer.biases().data.clone();
        if l == layer_idx {
            if bias {
                b[i] += delta;
            } else {
                w[i] += delta;
            }
        }
        out.push(Layer::new(w, b, layer.in_dim(), layer.out_dim(), layer.activation()).unwrap())
            .unwrap();
    }
    out
}

#[test]
fn network_backward_matches_finite_differences() {
    let registry = ActivationRegistry::with_defaults();
    let mut rng = fastrand::Rng::with_seed(42);
    let net = Network::mlp(&registry, &[3, 4, 2], "tanh", "sigmoid", &mut rng).unwrap();
    let x = [0.9, -0.1, 0.3];
    let c = [1.0, -0.5];

    let (_, cache) = net.forward(&x);
    let grads = net.backward(&cache, &c);

    let eps = 1e-2;
    for (l, grad) in grads.iter().enumerate() {
        for (bias, analytic) in [(false, &grad.d_weights.data), (true, &grad.d_biases.data)] {
            for (i, &analytic) in analytic.iter().enumerate() {
                let plus = probe_loss(&perturbed(&net, l, bias, i, eps), &x, &c);
                let minus = probe_loss(&perturbed(&net, l, bias, i, -eps), &x, &c);
                let numerical = (plus - minus) / (2.0 * eps);
                let diff = (numerical - analytic).abs();
                assert!(
                    diff < 2e-3,
                    "grad check failed for layer {l} bias={bias} index {i}: numerical {numerical}, analytical {analytic}"
                );
            }
        }
    }
}
