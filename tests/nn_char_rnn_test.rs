use rand::SeedableRng;
use rand::rngs::StdRng;
use rustyrnn::prelude::*;

fn build(text: &str, hidden_sizes: Vec<usize>, seed: u64) -> CharRnn {
    let config = ModelConfig {
        embedding_size: 5,
        hidden_sizes,
        seed: Some(seed),
        ..ModelConfig::default()
    };
    let mut rnn = CharRnn::from_config(&config, Vocabulary::from_text(text)).unwrap();
    rnn.mode_learn(3).unwrap();
    rnn.mode_inference().unwrap();
    rnn
}

#[test]
fn test_train_and_predict_with_every_optimizer() {
    let text = "abc";
    let sequence = Vocabulary::sequence_with_end(text);
    let optimizers = [
        OptimizerConfig::Sgd { learning_rate: 0.1 },
        OptimizerConfig::default(),
        OptimizerConfig::RmsProp {
            learning_rate: 0.01,
            rho: 0.9,
            epsilon: 1e-8,
        },
        OptimizerConfig::AdaGrad {
            learning_rate: 0.05,
            epsilon: 1e-8,
        },
    ];

    for config in optimizers {
        let mut rnn = build(text, vec![4, 4, 4], 42);
        let mut optimizer = config.build().unwrap();
        let history = rnn.learn(&sequence, 30, optimizer.as_mut()).unwrap();
        assert_eq!(history.len(), 2 * 30);
        assert!(history.perplexity.iter().all(|p| p.is_finite() && *p >= 1.0));

        let mut rng = StdRng::seed_from_u64(1);
        let prediction = rnn
            .predict(
                &GenerationConfig {
                    max_len: 8,
                    ..GenerationConfig::default()
                },
                &mut rng,
            )
            .unwrap();
        assert!(prediction.sampled.chars().count() <= 8);
        assert!(prediction.greedy.chars().all(|c| "abc".contains(c)));
    }
}

#[test]
fn test_adam_fits_a_short_sequence() {
    let text = "ab";
    let mut rnn = build(text, vec![8], 7);
    let mut adam = Adam::new(0.05, 0.9, 0.999, 1e-8).unwrap();
    let history = rnn
        .learn(&Vocabulary::sequence_with_end(text), 200, &mut adam)
        .unwrap();
    // "ab" + END with steps 3 is a single window per pass
    assert_eq!(history.len(), 200);
    let first = history.cost[0];
    let last = history.cost[199];
    assert!(last < 0.5 * first, "cost went from {} to {}", first, last);

    let mut rng = StdRng::seed_from_u64(3);
    let greedy = rnn.generate(SamplingPolicy::Greedy, 10, &mut rng).unwrap();
    assert!(greedy.chars().count() <= 10);
}

#[test]
fn test_training_several_lines_shares_one_model() {
    let text = "abba\nbaab\n";
    let mut rnn = build(text, vec![6, 6], 5);
    let mut adam = Adam::new(0.01, 0.9, 0.999, 1e-8).unwrap();
    let before = rnn.model().store().get(rnn.model().whd()).unwrap().value().clone();
    for line in text.lines() {
        let history = rnn
            .learn(&Vocabulary::sequence_with_end(line), 2, &mut adam)
            .unwrap();
        assert_eq!(history.len(), 3 * 2);
    }
    let after = rnn.model().store().get(rnn.model().whd()).unwrap().value();
    assert_ne!(&before, after);
}
