use ml::{ActivationRegistry, Network, NnError};

fn sample_net(seed: u64) -> Network {
    let registry = ActivationRegistry::with_defaults();
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut net = Network::mlp(&registry, &[4, 3, 2], "relu", "identity", &mut rng).unwrap();
    // Give the biases non-zero values so they take part in the round trip.
    let grads = {
        let mut g = net.zero_gradients();
        for layer in &mut g {
            layer.d_biases.data.iter_mut().for_each(|b| *b = rng.f32() - 0.5);
        }
        g
    };
    let mut sgd = ml::SgdMomentum::new(&net, ml::SgdConfig { learning_rate: 1.0, momentum: 0.0 });
    ml::Optimizer::step(&mut sgd, &mut net, &grads).unwrap();
    net
}

fn to_text(net: &Network) -> String {
    let mut buf = Vec::new();
    net.write_to(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

#[test]
fn text_layout_matches_format() {
    let text = to_text(&sample_net(1));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(&lines[..6], &["# layers", "2", "# activation", "relu", "# weights", "3 4"]);
    assert_eq!(lines[6].split_whitespace().count(), 4);
    assert_eq!(lines[9], "# biases");
    assert_eq!(lines[10], "3");
    assert_eq!(lines[11].split_whitespace().count(), 3);
    assert_eq!(lines[12], "# activation");
    assert_eq!(lines[13], "identity");
}

#[test]
fn round_trip_in_memory_reproduces_outputs() {
    let registry = ActivationRegistry::with_defaults();
    let net = sample_net(2);
    let text = to_text(&net);
    let loaded = Network::read_from(text.as_bytes(), &registry).unwrap();

    assert_eq!(loaded.len(), net.len());
    for (a, b) in net.layers().iter().zip(loaded.layers()) {
        assert_eq!(a.activation().name(), b.activation().name());
        assert_eq!(a.weights(), b.weights());
        assert_eq!(a.biases(), b.biases());
    }
    let x = [0.3, -1.2, 0.8, 0.05];
    let expected = net.predict(&x);
    let actual = loaded.predict(&x);
    assert!(expected.iter().zip(&actual).all(|(e, a)| (e - a).abs() < 1e-6));
}

#[test]
fn round_trip_through_file() {
    let registry = ActivationRegistry::with_defaults();
    let net = sample_net(3);
    let path = std::env::temp_dir().join(format!("ml_round_trip_{}.mdl", std::process::id()));
    net.save(&path).unwrap();
    let loaded = Network::load(&path, &registry).unwrap();
    std::fs::remove_file(&path).ok();

    let x = [1.0, 0.5, -0.5, -1.0];
    assert_eq!(net.predict(&x), loaded.predict(&x));
}

#[test]
fn unknown_activation_fails_to_load() {
    let registry = ActivationRegistry::with_defaults();
    let text = to_text(&sample_net(4)).replacen("relu", "swish", 1);
    let err = Network::read_from(text.as_bytes(), &registry).unwrap_err();
    assert!(matches!(err, NnError::UnknownActivation(ref name) if name == "swish"));
}

#[test]
fn malformed_files_report_the_line() {
    let registry = ActivationRegistry::with_defaults();
    let text = to_text(&sample_net(5));

    let truncated: String = text.lines().take(8).map(|l| format!("{l}\n")).collect();
    let err = Network::read_from(truncated.as_bytes(), &registry).unwrap_err();
    assert!(matches!(err, NnError::Parse { .. }), "{err}");

    let bad_header = text.replacen("# weights", "# weight", 1);
    let err = Network::read_from(bad_header.as_bytes(), &registry).unwrap_err();
    assert!(matches!(err, NnError::Parse { line: 5, .. }), "{err}");

    let bad_number = text.replacen("\n3 4\n", "\n3 x\n", 1);
    let err = Network::read_from(bad_number.as_bytes(), &registry).unwrap_err();
    assert!(matches!(err, NnError::Parse { line: 6, .. }), "{err}");

    let overflowing = "# layers\n1\n# activation\nrelu\n# weights\n4294967296 4294967296\n1\n";
    let err = Network::read_from(overflowing.as_bytes(), &registry).unwrap_err();
    assert!(matches!(err, NnError::Parse { line: 6, .. }), "{err}");

    let huge_but_short = "# layers\n1\n# activation\nrelu\n# weights\n100000000 2\n1 2\n";
    let err = Network::read_from(huge_but_short.as_bytes(), &registry).unwrap_err();
    assert!(matches!(err, NnError::Parse { .. }), "{err}");
}

#[test]
fn missing_file_is_an_io_error() {
    let registry = ActivationRegistry::with_defaults();
    let err = Network::load("/definitely/not/here.mdl", &registry).unwrap_err();
    assert!(matches!(err, NnError::Io(_)));
}
