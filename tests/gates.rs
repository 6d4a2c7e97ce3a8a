use ferrite_gates::engine::{Interpreter, Workspace};
use ferrite_gates::error::{AllocationError, InferenceError, ModelError};
use ferrite_gates::harness::{run_gate_test, Gate, GoldenVector, CANONICAL_INPUTS};
use ferrite_gates::kernels::OpKind;
use ferrite_gates::{classify, infer, infer_with_workspace, Model, OpRegistry, TENSOR_ARENA_SIZE};

fn edited_blob(gate: Gate, edit: impl FnOnce(&mut serde_json::Value)) -> Vec<u8> {
    let mut doc: serde_json::Value = serde_json::from_slice(gate.model_blob()).unwrap();
    edit(&mut doc);
    serde_json::to_vec(&doc).unwrap()
}

#[test]
fn all_twenty_gate_input_pairs_classify_correctly() {
    for gate in Gate::ALL {
        for (&(x0, x1), &expected) in CANONICAL_INPUTS.iter().zip(gate.labels().iter()) {
            let p = infer(gate.model_blob(), x0, x1).unwrap();
            assert_eq!(classify(p), expected, "{gate} ({x0}, {x1}) -> {p}");
        }
    }
}

#[test]
fn harness_reports_four_passes_per_gate() {
    for gate in Gate::ALL {
        let report = run_gate_test(gate.model_blob(), &gate.golden_vectors()).unwrap();
        assert_eq!(report.total(), 4);
        assert!(report.all_passed(), "{gate}:\n{report}");
        for (record, vector) in report.records.iter().zip(gate.golden_vectors()) {
            assert_eq!(record.inputs, vector.input);
            assert_eq!(record.expected, vector.expected_label);
            assert_eq!(record.predicted_label, classify(record.predicted_probability));
        }
    }
}

#[test]
fn harness_flags_mismatched_expectations() {
    let inverted = GoldenVector::truth_table([1, 1, 1, 0]);
    let report = run_gate_test(Gate::And.model_blob(), &inverted).unwrap();
    assert_eq!(report.passed, 0);
    assert!(report.to_string().contains("-> Fail"));
}

#[test]
fn repeated_calls_return_identical_probabilities() {
    for gate in Gate::ALL {
        for &(x0, x1) in &CANONICAL_INPUTS {
            let first = infer(gate.model_blob(), x0, x1).unwrap();
            let second = infer(gate.model_blob(), x0, x1).unwrap();
            assert_eq!(first.to_bits(), second.to_bits());
        }
    }
}

#[test]
fn undersized_workspace_always_fails_allocation() {
    for capacity in [0usize, 16, 64, 100] {
        for _ in 0..3 {
            let mut arena = vec![0u8; capacity];
            let err = infer_with_workspace(Gate::And.model_blob(), 1.0, 1.0, &mut arena).unwrap_err();
            assert!(
                matches!(err, InferenceError::AllocationFailed(AllocationError::ArenaExhausted { .. })),
                "capacity {capacity}: {err:?}"
            );
        }
    }
}

#[test]
fn exact_workspace_is_enough() {
    let model = Model::from_bytes(Gate::Xor.model_blob()).unwrap();
    let registry = OpRegistry::for_gates().unwrap();
    let mut big = [0u8; TENSOR_ARENA_SIZE];
    let mut interpreter = Interpreter::new(&model, &registry, Workspace::new(&mut big));
    interpreter.allocate_tensors().unwrap();
    let needed = interpreter.arena_used_bytes();
    drop(interpreter);

    let mut exact = vec![0u8; needed];
    let p = infer_with_workspace(Gate::Xor.model_blob(), 0.0, 1.0, &mut exact).unwrap();
    assert_eq!(classify(p), 1);

    let mut short = vec![0u8; needed - 1];
    assert!(infer_with_workspace(Gate::Xor.model_blob(), 0.0, 1.0, &mut short).is_err());
}

#[test]
fn schema_version_mismatch_still_runs() {
    let blob = edited_blob(Gate::Or, |doc| doc["version"] = 2.into());
    let drifted = infer(&blob, 0.0, 1.0).unwrap();
    let original = infer(Gate::Or.model_blob(), 0.0, 1.0).unwrap();
    assert_eq!(drifted, original);
}

#[test]
fn missing_output_fails_binding() {
    let blob = edited_blob(Gate::And, |doc| doc["outputs"] = serde_json::json!([]));
    let err = infer(&blob, 1.0, 1.0).unwrap_err();
    assert!(matches!(err, InferenceError::TensorBindingFailed(_)), "{err:?}");
}

#[test]
fn missing_input_fails_binding() {
    let blob = edited_blob(Gate::Nor, |doc| doc["inputs"] = serde_json::json!([]));
    let err = infer(&blob, 1.0, 1.0).unwrap_err();
    assert!(matches!(err, InferenceError::TensorBindingFailed(_)), "{err:?}");
}

#[test]
fn operator_outside_registry_fails_allocation() {
    let model = Model::from_bytes(Gate::And.model_blob()).unwrap();
    let mut registry = OpRegistry::new();
    registry.register(OpKind::FullyConnected).unwrap();
    let mut arena = [0u8; TENSOR_ARENA_SIZE];
    let mut interpreter = Interpreter::new(&model, &registry, Workspace::new(&mut arena));
    let err = interpreter.allocate_tensors().unwrap_err();
    assert_eq!(err, AllocationError::UnregisteredOperator { op: 1, kind: OpKind::Logistic });
}

#[test]
fn invoke_before_allocation_is_an_execution_error() {
    let model = Model::from_bytes(Gate::And.model_blob()).unwrap();
    let registry = OpRegistry::for_gates().unwrap();
    let mut arena = [0u8; TENSOR_ARENA_SIZE];
    let mut interpreter = Interpreter::new(&model, &registry, Workspace::new(&mut arena));
    assert!(interpreter.invoke().is_err());
    assert!(interpreter.input(0).is_none());
}

#[test]
fn unquantized_activation_fails_allocation() {
    let blob = edited_blob(Gate::And, |doc| {
        doc["tensors"][3].as_object_mut().unwrap().remove("quantization");
    });
    let err = infer(&blob, 0.0, 0.0).unwrap_err();
    assert!(
        matches!(err, InferenceError::AllocationFailed(AllocationError::MissingQuantization { tensor: 3 })),
        "{err:?}"
    );
}

#[test]
fn out_of_range_inputs_saturate_instead_of_wrapping() {
    // 3.0 encodes past 127 and is clamped there.
    let p = infer(Gate::And.model_blob(), 3.0, 3.0).unwrap();
    assert_eq!(classify(p), 1);
}

#[test]
fn unrepresentable_rescale_fails_allocation() {
    let blob = edited_blob(Gate::And, |doc| doc["tensors"][3]["quantization"]["scale"] = 1e-20.into());
    let err = infer(&blob, 1.0, 1.0).unwrap_err();
    assert!(
        matches!(err, InferenceError::AllocationFailed(AllocationError::MultiplierOutOfRange { op: 0, .. })),
        "{err:?}"
    );
}

#[test]
fn overflowing_shape_is_an_invalid_model() {
    let blob = edited_blob(Gate::And, |doc| doc["tensors"][3]["shape"] = serde_json::json!([u64::MAX, 2]));
    let err = infer(&blob, 1.0, 1.0).unwrap_err();
    assert!(
        matches!(err, InferenceError::InvalidModel(ModelError::ShapeOverflow { .. })),
        "{err:?}"
    );
}

#[test]
fn extreme_bias_saturates_the_accumulator() {
    let blob = edited_blob(Gate::And, |doc| doc["tensors"][2]["data"] = serde_json::json!([i32::MAX]));
    let p = infer(&blob, 0.0, 0.0).unwrap();
    assert_eq!(classify(p), 1);

    let blob = edited_blob(Gate::And, |doc| doc["tensors"][2]["data"] = serde_json::json!([i32::MIN]));
    let p = infer(&blob, 1.0, 1.0).unwrap();
    assert_eq!(classify(p), 0);
}

#[test]
fn zero_point_outside_int8_fails_allocation() {
    let blob = edited_blob(Gate::And, |doc| {
        doc["tensors"][1]["quantization"]["zero_point"] = i32::MIN.into();
    });
    let err = infer(&blob, 1.0, 1.0).unwrap_err();
    assert!(
        matches!(
            err,
            InferenceError::AllocationFailed(AllocationError::InvalidZeroPoint { tensor: 1, zero_point: i32::MIN })
        ),
        "{err:?}"
    );
}

#[test]
fn in_place_logistic_is_an_execution_failure() {
    let blob = edited_blob(Gate::And, |doc| {
        doc["operators"][1]["outputs"] = serde_json::json!([3]);
        doc["outputs"] = serde_json::json!([3]);
    });
    let err = infer(&blob, 1.0, 1.0).unwrap_err();
    assert!(matches!(err, InferenceError::ExecutionFailed(_)), "{err:?}");
}
