use super::*;

#[test]
fn test_argmax_takes_first_maximum() {
    assert_eq!(argmax(&array![0.1f32, 0.4, 0.4, 0.1].into_dyn()).unwrap(), 1);
    assert_eq!(argmax(&array![0.7f32, 0.1, 0.2].into_dyn()).unwrap(), 0);
    assert!(argmax(&Tensor::zeros(IxDyn(&[0]))).is_err());
}

#[test]
fn test_sample_never_draws_zero_probabilities() {
    let mut rng = StdRng::seed_from_u64(11);
    let probs = array![0.0f32, 0.5, 0.0, 0.5].into_dyn();
    for _ in 0..200 {
        let i = sample(&probs, 1.0, &mut rng).unwrap();
        assert!(i == 1 || i == 3);
    }
}

#[test]
fn test_sample_follows_the_distribution() {
    let mut rng = StdRng::seed_from_u64(5);
    let probs = array![0.2f32, 0.8].into_dyn();
    let draws = 10_000;
    let ones = (0..draws)
        .filter(|_| sample(&probs, 1.0, &mut rng).unwrap() == 1)
        .count();
    let frequency = ones as f64 / draws as f64;
    assert!((0.75..0.85).contains(&frequency), "frequency {}", frequency);
}

#[test]
fn test_temperature_sharpens_and_flattens() {
    let mut rng = StdRng::seed_from_u64(9);
    let probs = array![0.6f32, 0.4].into_dyn();
    assert!((0..200).all(|_| sample(&probs, 0.01, &mut rng).unwrap() == 0));

    let skewed = array![0.9f32, 0.1].into_dyn();
    let draws = 2_000;
    let ones = (0..draws)
        .filter(|_| sample(&skewed, 1000.0, &mut rng).unwrap() == 1)
        .count();
    let frequency = ones as f64 / draws as f64;
    assert!((0.4..0.6).contains(&frequency), "frequency {}", frequency);
}

#[test]
fn test_sample_rejects_bad_input() {
    let mut rng = StdRng::seed_from_u64(1);
    let probs = array![0.5f32, 0.5].into_dyn();
    assert!(sample(&probs, 0.0, &mut rng).is_err());
    assert!(sample(&probs, f64::NAN, &mut rng).is_err());
    assert!(sample(&array![0.0f32, 0.0].into_dyn(), 1.0, &mut rng).is_err());
}

#[test]
fn test_forced_end_gives_empty_output() {
    let mut rnn = abc_rnn(&[4], 21);
    rnn.mode_inference().unwrap();
    set_decoder_bias(&mut rnn, vec![0.0, 0.0, 0.0, 100.0]);

    let mut rng = StdRng::seed_from_u64(0);
    let prediction = rnn.predict(&GenerationConfig::default(), &mut rng).unwrap();
    assert_eq!(prediction.sampled, "");
    assert_eq!(prediction.greedy, "");
}

#[test]
fn test_output_length_is_capped() {
    let mut rnn = abc_rnn(&[4, 4], 22);
    rnn.mode_inference().unwrap();
    set_decoder_bias(&mut rnn, vec![20.0, 0.0, 0.0, 0.0]);

    let mut rng = StdRng::seed_from_u64(0);
    let greedy = rnn.generate(SamplingPolicy::Greedy, 5, &mut rng).unwrap();
    assert_eq!(greedy, "aaaaa");

    let sampled = rnn
        .generate(SamplingPolicy::Stochastic { temperature: 1.0 }, 7, &mut rng)
        .unwrap();
    assert_eq!(sampled.chars().count(), 7);

    assert_eq!(rnn.generate(SamplingPolicy::Greedy, 0, &mut rng).unwrap(), "");
}

#[test]
fn test_generation_restarts_from_zero_carry() {
    let mut rnn = abc_rnn(&[6], 23);
    rnn.mode_inference().unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let first = rnn.generate(SamplingPolicy::Greedy, 20, &mut rng).unwrap();
    let second = rnn.generate(SamplingPolicy::Greedy, 20, &mut rng).unwrap();
    assert_eq!(first, second);
    assert!(first.chars().all(|c| ['a', 'b', 'c'].contains(&c)));
}

#[test]
fn test_predict_requires_inference_mode() {
    let mut rnn = abc_rnn(&[4], 24);
    let mut rng = StdRng::seed_from_u64(0);
    assert!(matches!(
        rnn.predict(&GenerationConfig::default(), &mut rng),
        Err(ModelError::InvalidMode(_))
    ));

    rnn.mode_inference().unwrap();
    let config = GenerationConfig {
        temperature: -1.0,
        ..GenerationConfig::default()
    };
    assert!(matches!(
        rnn.predict(&config, &mut rng),
        Err(ModelError::InputValidationError(_))
    ));
}
