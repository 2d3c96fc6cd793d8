use super::*;

/// Store with one parameter `w = [1, -1]` and gradient `g`
fn store_with_grad(g: [f32; 2]) -> (ParameterStore, ParamId) {
    let mut store = ParameterStore::new();
    let w = store.insert("w", array![1.0f32, -1.0].into_dyn()).unwrap();
    store
        .get_mut(w)
        .unwrap()
        .grad_mut()
        .assign(&array![g[0], g[1]].into_dyn());
    (store, w)
}

#[test]
fn test_sgd_step() {
    let (mut store, w) = store_with_grad([0.5, -2.0]);
    let mut sgd = SGD::new(0.1).unwrap();
    sgd.step(&mut store, &[w]).unwrap();
    let value = store.get(w).unwrap().value();
    assert_relative_eq!(value[[0]], 0.95, epsilon = 1e-6);
    assert_relative_eq!(value[[1]], -0.8, epsilon = 1e-6);
}

#[test]
fn test_sgd_clips_large_gradients() {
    let (mut store, w) = store_with_grad([100.0, -100.0]);
    let mut sgd = SGD::new(0.1).unwrap();
    sgd.step(&mut store, &[w]).unwrap();
    let value = store.get(w).unwrap().value();
    assert_relative_eq!(value[[0]], 0.5, epsilon = 1e-6);
    assert_relative_eq!(value[[1]], -0.5, epsilon = 1e-6);
}

#[test]
fn test_adam_first_step_moves_by_learning_rate() {
    // With bias correction the first Adam step is lr * sign(g)
    let (mut store, w) = store_with_grad([0.3, -0.01]);
    let mut adam = Adam::new(0.01, 0.9, 0.999, 1e-8).unwrap();
    adam.step(&mut store, &[w]).unwrap();
    assert_eq!(adam.timestep(), 1);
    let value = store.get(w).unwrap().value();
    assert_relative_eq!(value[[0]], 0.99, epsilon = 1e-5);
    assert_relative_eq!(value[[1]], -0.99, epsilon = 1e-5);
}

#[test]
fn test_rms_prop_step() {
    let (mut store, w) = store_with_grad([1.0, 0.0]);
    let mut rms = RMSprop::new(0.01, 0.9, 1e-8).unwrap();
    rms.step(&mut store, &[w]).unwrap();
    let value = store.get(w).unwrap().value();
    // cache = 0.1, update = 0.01 / sqrt(0.1)
    assert_relative_eq!(value[[0]], 1.0 - 0.01 / 0.1f32.sqrt(), epsilon = 1e-5);
    assert_relative_eq!(value[[1]], -1.0, epsilon = 1e-6);
}

#[test]
fn test_ada_grad_accumulates_squared_gradients() {
    let (mut store, w) = store_with_grad([2.0, 0.0]);
    let mut ada = AdaGrad::new(0.1, 1e-8).unwrap();
    ada.step(&mut store, &[w]).unwrap();
    assert_relative_eq!(store.get(w).unwrap().value()[[0]], 0.9, epsilon = 1e-5);
    ada.step(&mut store, &[w]).unwrap();
    // accumulator = 8, step = 0.1 * 2 / sqrt(8)
    assert_relative_eq!(
        store.get(w).unwrap().value()[[0]],
        0.9 - 0.2 / 8.0f32.sqrt(),
        epsilon = 1e-5
    );
}

#[test]
fn test_non_finite_gradient_is_an_optimizer_error() {
    let (mut store, w) = store_with_grad([f32::NAN, 0.0]);
    let mut optimizers: Vec<Box<dyn Optimizer>> = vec![
        Box::new(SGD::new(0.1).unwrap()),
        Box::new(Adam::new(0.01, 0.9, 0.999, 1e-8).unwrap()),
        Box::new(RMSprop::new(0.01, 0.9, 1e-8).unwrap()),
        Box::new(AdaGrad::new(0.01, 1e-8).unwrap()),
    ];
    for optimizer in optimizers.iter_mut() {
        let result = optimizer.step(&mut store, &[w]);
        assert!(
            matches!(result, Err(ModelError::Optimizer(_))),
            "{} accepted a NaN gradient",
            optimizer.name()
        );
    }
    // The failing update left the value untouched
    assert_eq!(store.get(w).unwrap().value(), &array![1.0f32, -1.0].into_dyn());
}

#[test]
fn test_invalid_hyperparameters_are_rejected() {
    assert!(SGD::new(0.0).is_err());
    assert!(SGD::new(f32::INFINITY).is_err());
    assert!(Adam::new(0.01, 1.0, 0.999, 1e-8).is_err());
    assert!(Adam::new(0.01, 0.9, -0.1, 1e-8).is_err());
    assert!(Adam::new(0.01, 0.9, 0.999, 0.0).is_err());
    assert!(RMSprop::new(0.01, 1.5, 1e-8).is_err());
    assert!(AdaGrad::new(-0.01, 1e-8).is_err());
}

#[test]
fn test_large_parameters_update_in_parallel_like_small_ones() {
    let mut store = ParameterStore::new();
    let big = store
        .insert("big", Tensor::from_elem(IxDyn(&[64, 32]), 1.0))
        .unwrap();
    store.get_mut(big).unwrap().grad_mut().fill(0.5);
    let mut sgd = SGD::new(0.2).unwrap();
    sgd.step(&mut store, &[big]).unwrap();
    assert!(
        store
            .get(big)
            .unwrap()
            .value()
            .iter()
            .all(|&v| (v - 0.9).abs() < 1e-6)
    );
}

#[test]
fn test_unknown_parameter_is_rejected() {
    let (mut store, _) = store_with_grad([0.0, 0.0]);
    let mut other = ParameterStore::new();
    other.insert("a", array![0.0f32].into_dyn()).unwrap();
    let foreign = other.insert("b", array![0.0f32].into_dyn()).unwrap();
    let mut sgd = SGD::new(0.1).unwrap();
    assert!(sgd.step(&mut store, &[foreign]).is_err());
}
