use super::*;

fn inference_window(seed: u64) -> (ModelParameters, UnrolledWindow) {
    let mut rng = StdRng::seed_from_u64(seed);
    let params = ModelParameters::new(4, 3, 4, &[5, 2], 0.5, &mut rng).unwrap();
    let window = UnrolledWindow::for_inference(&params).unwrap();
    (params, window)
}

fn carry_values(window: &UnrolledWindow) -> Vec<Tensor> {
    let carry = window.carry();
    (0..carry.depth())
        .flat_map(|layer| {
            [
                carry.hidden(window.slots(), layer).unwrap().clone(),
                carry.cell(window.slots(), layer).unwrap().clone(),
            ]
        })
        .collect()
}

#[test]
fn test_carry_starts_at_zero_and_is_named() {
    let (_, window) = inference_window(1);
    assert_eq!(window.carry().depth(), 2);
    for value in carry_values(&window) {
        assert!(value.iter().all(|&v| v == 0.0));
    }
    let names: Vec<&str> = window
        .graph()
        .nodes()
        .iter()
        .filter(|n| matches!(n.op(), Op::Slot(_)))
        .filter_map(|n| n.name())
        .collect();
    assert!(names.contains(&"prevHidden_0"));
    assert!(names.contains(&"prevCell_1"));
}

#[test]
fn test_feedback_copies_state_and_reset_zeroes_it() {
    let (mut params, mut window) = inference_window(2);
    window.set_input(0, Some(1)).unwrap();
    window.run(&mut params).unwrap();
    window.feedback(0).unwrap();

    let step = window.outputs()[0].clone();
    let carried = carry_values(&window);
    assert_eq!(&carried[0], window.machine().value(step.states[0].hidden).unwrap());
    assert_eq!(&carried[3], window.machine().value(step.states[1].cell).unwrap());
    assert!(carried.iter().any(|t| t.iter().any(|&v| v != 0.0)));

    // The carry is independent memory: re-running does not change it
    window.reset_machine();
    window.set_input(0, Some(2)).unwrap();
    window.run(&mut params).unwrap();
    assert_eq!(carry_values(&window), carried);

    window.reset_state().unwrap();
    for value in carry_values(&window) {
        assert!(value.iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_feedback_before_run_is_rejected() {
    let (_, mut window) = inference_window(3);
    assert!(matches!(window.feedback(0), Err(ModelError::InvalidMode(_))));
    assert!(window.feedback(1).is_err());
}

#[test]
fn test_carried_state_changes_the_next_output() {
    let (mut params, mut window) = inference_window(4);
    window.set_input(0, Some(0)).unwrap();
    window.run(&mut params).unwrap();
    let first = window.probs(0).unwrap().clone();

    window.feedback(0).unwrap();
    window.reset_machine();
    window.run(&mut params).unwrap();
    let second = window.probs(0).unwrap().clone();
    assert_ne!(first, second);

    window.reset_state().unwrap();
    window.reset_machine();
    window.run(&mut params).unwrap();
    assert_eq!(window.probs(0).unwrap(), &first);
}
