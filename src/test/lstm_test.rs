use super::*;
use crate::neural_network::recurrent_layer::weight_distribution;

fn filled_slot(slots: &mut SlotStore, name: &str, values: &[f32]) -> SlotId {
    let id = slots.alloc(name, &[values.len()]);
    slots
        .copy_from(id, &Array1::from(values.to_vec()).into_dyn())
        .unwrap();
    id
}

#[test]
fn test_gate_weights_are_named_and_ordered() {
    let mut rng = StdRng::seed_from_u64(1);
    let dist = weight_distribution(0.08).unwrap();
    let mut store = ParameterStore::new();
    let weights = GateWeights::new(&mut store, 2, 3, 5, &dist, &mut rng).unwrap();

    let names: Vec<&str> = weights
        .learnables()
        .iter()
        .map(|&id| store.get(id).unwrap().name())
        .collect();
    assert_eq!(
        names,
        vec![
            "wix_2", "wih_2", "bias_i_2", "wfx_2", "wfh_2", "bias_f_2", "wox_2", "woh_2",
            "bias_o_2", "wcx_2", "wch_2", "bias_c_2"
        ]
    );

    let kernel = store.get(weights.forget.kernel).unwrap().value();
    assert_eq!(kernel.shape(), &[5, 3]);
    let recurrent = store.get(weights.forget.recurrent_kernel).unwrap().value();
    assert_eq!(recurrent.shape(), &[5, 5]);
    let bias = store.get(weights.forget.bias).unwrap().value();
    assert_eq!(bias.shape(), &[5]);
    assert!(bias.iter().all(|&b| b == 0.0));
}

#[test]
fn test_zero_sized_gate_is_rejected() {
    let mut rng = StdRng::seed_from_u64(1);
    let dist = weight_distribution(0.08).unwrap();
    let mut store = ParameterStore::new();
    let result = GateWeights::new(&mut store, 0, 0, 5, &dist, &mut rng);
    assert!(matches!(result, Err(ModelError::InputValidationError(_))));
}

#[test]
fn test_cell_follows_lstm_equations() {
    let mut rng = StdRng::seed_from_u64(7);
    let dist = weight_distribution(0.5).unwrap();
    let mut store = ParameterStore::new();
    let weights = GateWeights::new(&mut store, 0, 3, 4, &dist, &mut rng).unwrap();

    let mut slots = SlotStore::new();
    let x_slot = filled_slot(&mut slots, "x", &[0.3, -1.2, 0.8]);
    let h_slot = filled_slot(&mut slots, "h", &[0.1, 0.2, -0.3, 0.4]);
    let c_slot = filled_slot(&mut slots, "c", &[-0.5, 0.5, 1.5, -2.0]);

    let mut graph = ExprGraph::new();
    let cell = LstmCell::bind(&mut graph, &store, &weights, 3, 4).unwrap();
    assert_eq!(cell.hidden_size(), 4);
    let x = graph.slot(&slots, x_slot).unwrap();
    let h = graph.slot(&slots, h_slot).unwrap();
    let c = graph.slot(&slots, c_slot).unwrap();
    let out = cell.fwd(&mut graph, x, h, c).unwrap();

    let mut machine = TapeMachine::new(&graph, ExecutionPlan::forward_only(&graph)).unwrap();
    machine.run_all(&graph, &mut store, &slots).unwrap();

    let value = |n: NodeId| machine.value(n).unwrap().clone();
    let (i, f, o, g) = (
        value(out.input_gate),
        value(out.forget_gate),
        value(out.output_gate),
        value(out.cell_write),
    );
    let (new_h, new_c) = (value(out.hidden), value(out.cell));

    for t in [&i, &f, &o, &g, &new_h, &new_c] {
        assert_eq!(t.shape(), &[4]);
    }
    for gate in [&i, &f, &o] {
        assert!(gate.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
    assert!(g.iter().all(|&v| (-1.0..=1.0).contains(&v)));

    let c_prev = slots.get(c_slot).unwrap().clone();
    let expected_c = &f * &c_prev + &i * &g;
    let expected_h = &o * &expected_c.mapv(f32::tanh);
    for k in 0..4 {
        assert_abs_diff_eq!(new_c[[k]], expected_c[[k]], epsilon = 1e-6);
        assert_abs_diff_eq!(new_h[[k]], expected_h[[k]], epsilon = 1e-6);
    }

    // Previous state is only read
    assert_eq!(
        slots.get(h_slot).unwrap(),
        &array![0.1f32, 0.2, -0.3, 0.4].into_dyn()
    );
    assert_eq!(c_prev, array![-0.5f32, 0.5, 1.5, -2.0].into_dyn());
}

#[test]
fn test_cell_rejects_wrong_input_length() {
    let mut rng = StdRng::seed_from_u64(7);
    let dist = weight_distribution(0.1).unwrap();
    let mut store = ParameterStore::new();
    let weights = GateWeights::new(&mut store, 0, 3, 4, &dist, &mut rng).unwrap();

    let mut slots = SlotStore::new();
    let x_slot = slots.alloc("x", &[2]);
    let h_slot = slots.alloc("h", &[4]);
    let c_slot = slots.alloc("c", &[4]);

    let mut graph = ExprGraph::new();
    let cell = LstmCell::bind(&mut graph, &store, &weights, 3, 4).unwrap();
    let x = graph.slot(&slots, x_slot).unwrap();
    let h = graph.slot(&slots, h_slot).unwrap();
    let c = graph.slot(&slots, c_slot).unwrap();
    assert!(matches!(
        cell.fwd(&mut graph, x, h, c),
        Err(ModelError::GraphConstruction(_))
    ));
}

#[test]
fn test_stack_feeds_each_layer_from_the_one_below() {
    let mut rng = StdRng::seed_from_u64(3);
    let params = ModelParameters::new(4, 5, 4, &[6, 3], 0.08, &mut rng).unwrap();

    let mut slots = SlotStore::new();
    let carry = CarryState::new(&mut slots, &params.hidden_sizes());
    let input = filled_slot(&mut slots, "embedded", &[0.1, 0.2, 0.3, 0.4, 0.5]);

    let mut graph = ExprGraph::new();
    let stack = LstmStack::bind(&mut graph, &params).unwrap();
    assert_eq!(stack.depth(), 2);
    assert_eq!(stack.cells()[1].prev_size(), 6);

    let prev = carry.bind(&mut graph, &slots).unwrap();
    let embedded = graph.slot(&slots, input).unwrap();
    let out = stack.step(&mut graph, embedded, &prev).unwrap();
    assert_eq!(out.states.len(), 2);
    assert_eq!(out.top_hidden, out.states[1].hidden);
    assert_eq!(graph.node(out.states[0].hidden).unwrap().shape(), &[6]);
    assert_eq!(graph.node(out.states[1].cell).unwrap().shape(), &[3]);

    // A second step reuses the same parameter nodes
    let nodes_before = graph.len();
    let again = stack.step(&mut graph, embedded, &out.states).unwrap();
    let params_in_graph = graph
        .nodes()
        .iter()
        .filter(|n| matches!(n.op(), Op::Parameter(_)))
        .count();
    assert_eq!(params_in_graph, 2 * 12);
    assert!(graph.len() > nodes_before);
    assert_ne!(again.top_hidden, out.top_hidden);

    assert!(matches!(
        stack.step(&mut graph, embedded, &prev[..1]),
        Err(ModelError::GraphConstruction(_))
    ));
}
