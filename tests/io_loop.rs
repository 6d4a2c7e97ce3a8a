use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use ferrite_gates::harness::{Gate, CANONICAL_INPUTS};
use ferrite_gates::io_loop::{
    run_io_loop, Direction, GpioPort, LoopConfig, NoDelay, Pull, SimulatedBoard, DEFAULT_INPUT_PINS,
    DEFAULT_OUTPUT_PIN,
};

#[test]
fn pins_are_configured_before_the_first_cycle() {
    let mut board = SimulatedBoard::new();
    let config = LoopConfig::new().with_max_cycles(0);
    let summary = run_io_loop(&mut board, &mut NoDelay, Gate::And.model_blob(), &config);

    assert_eq!(summary.cycles, 0);
    for pin in DEFAULT_INPUT_PINS {
        assert_eq!(board.configuration(pin), Some((Direction::Input, Pull::Down)));
    }
    assert_eq!(board.configuration(DEFAULT_OUTPUT_PIN), Some((Direction::Output, Pull::None)));
    assert_eq!(board.level(DEFAULT_OUTPUT_PIN), Some(false));
    assert_eq!(board.writes(), 1);
}

#[test]
fn output_follows_the_gate_for_every_input_pair() {
    for gate in Gate::ALL {
        for (&(x0, x1), &label) in CANONICAL_INPUTS.iter().zip(gate.labels().iter()) {
            let mut board = SimulatedBoard::new();
            board.set_input(DEFAULT_INPUT_PINS[0], x0 > 0.5);
            board.set_input(DEFAULT_INPUT_PINS[1], x1 > 0.5);

            let config = LoopConfig::new().with_max_cycles(2);
            let summary = run_io_loop(&mut board, &mut NoDelay, gate.model_blob(), &config);

            assert_eq!(summary.actuations, 2);
            assert_eq!(board.level(DEFAULT_OUTPUT_PIN), Some(label == 1), "{gate} ({x0}, {x1})");
        }
    }
}

#[test]
fn failed_inference_leaves_the_output_at_its_safe_default() {
    let mut board = SimulatedBoard::new();
    board.write_pin(DEFAULT_OUTPUT_PIN, true);

    let config = LoopConfig::new().with_max_cycles(5);
    let summary = run_io_loop(&mut board, &mut NoDelay, b"not a model", &config);

    assert_eq!(summary.cycles, 5);
    assert_eq!(summary.failures, 5);
    assert_eq!(summary.actuations, 0);
    assert_eq!(board.level(DEFAULT_OUTPUT_PIN), Some(false));
    // One write before the loop, one initial low level, none from the cycles.
    assert_eq!(board.writes(), 2);
}

#[test]
fn nan_toggle_probability_does_not_crash_the_loop() {
    let mut board = SimulatedBoard::with_button_presses(9, f64::NAN);
    let config = LoopConfig::new().with_max_cycles(4);
    let summary = run_io_loop(&mut board, &mut NoDelay, Gate::Nor.model_blob(), &config);

    assert_eq!(summary.actuations, 4);
    assert_eq!(board.level(DEFAULT_OUTPUT_PIN), Some(true));
}

#[test]
fn progress_reports_every_cycle() {
    let (tx, rx) = mpsc::channel();
    let mut board = SimulatedBoard::new();
    board.set_input(DEFAULT_INPUT_PINS[0], true);

    let config = LoopConfig::new().with_max_cycles(3).with_progress(tx);
    run_io_loop(&mut board, &mut NoDelay, Gate::Or.model_blob(), &config);
    drop(config);

    let stats: Vec<_> = rx.iter().collect();
    assert_eq!(stats.len(), 3);
    for (i, s) in stats.iter().enumerate() {
        assert_eq!(s.cycle, i as u64 + 1);
        assert_eq!(s.inputs, (true, false));
        assert_eq!(s.output, Some(true));
        assert!(s.probability.is_some_and(|p| p > 0.5));
    }
}

#[test]
fn dropped_receiver_stops_the_loop() {
    let (tx, rx) = mpsc::channel();
    drop(rx);
    let mut board = SimulatedBoard::new();
    let config = LoopConfig::new().with_progress(tx);

    let summary = run_io_loop(&mut board, &mut NoDelay, Gate::Xor.model_blob(), &config);
    assert_eq!(summary.cycles, 1);
}

#[test]
fn preset_stop_flag_runs_no_cycles() {
    let flag = Arc::new(AtomicBool::new(true));
    let mut board = SimulatedBoard::new();
    let config = LoopConfig::new().with_stop_flag(flag);

    let summary = run_io_loop(&mut board, &mut NoDelay, Gate::And.model_blob(), &config);
    assert_eq!(summary.cycles, 0);
    assert_eq!(board.writes(), 1);
    assert_eq!(board.level(DEFAULT_OUTPUT_PIN), Some(false));
}

#[test]
fn stop_flag_ends_an_unbounded_loop() {
    let flag = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();
    let config = LoopConfig::new().with_stop_flag(flag.clone()).with_progress(tx);

    let worker = thread::spawn(move || {
        let mut board = SimulatedBoard::with_button_presses(3, 0.3);
        run_io_loop(&mut board, &mut NoDelay, Gate::Xnor.model_blob(), &config)
    });

    for _ in 0..10 {
        rx.recv().unwrap();
    }
    flag.store(true, Ordering::Relaxed);
    let summary = worker.join().unwrap();

    assert!(summary.cycles >= 10);
    assert_eq!(summary.failures, 0);
    assert_eq!(summary.actuations, summary.cycles);
}
