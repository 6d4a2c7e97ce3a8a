use std::sync::atomic::Ordering;
use std::time::Instant;

use tracing::{debug, error, info};

use crate::decision::threshold::classify;
use crate::io_loop::cycle_stats::{CycleStats, LoopSummary};
use crate::io_loop::gpio::{Delay, Direction, GpioPort, Pull};
use crate::io_loop::loop_config::LoopConfig;
use crate::pipeline::infer::infer;

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Samples two input pins, classifies them with `model_blob`, and drives
/// the output pin, once per `config.period`.
///
/// # Termination
/// With no stop condition configured the loop never returns. It exits when:
/// - `config.max_cycles` cycles have run,
/// - `config.stop_flag` is set (checked before each cycle), **or**
/// - the `progress_tx` receiver has been dropped.
///
/// # Failures
/// The output pin is driven low right after configuration. If inference
/// fails in a cycle, the pin keeps its previous level and the loop carries
/// on with the next cycle.
pub fn run_io_loop<G: GpioPort, D: Delay>(
    gpio: &mut G,
    delay: &mut D,
    model_blob: &[u8],
    config: &LoopConfig,
) -> LoopSummary {
    configure_pins(gpio, config);
    info!(
        inputs = %format!("{}/{}", config.input_pins[0], config.input_pins[1]),
        output = %config.output_pin,
        period_ms = config.period.as_millis() as u64,
        "io loop started"
    );

    let mut summary = LoopSummary::default();

    loop {
        if let Some(max) = config.max_cycles {
            if summary.cycles >= max {
                break;
            }
        }
        if let Some(ref flag) = config.stop_flag {
            if flag.load(Ordering::Relaxed) {
                break;
            }
        }

        let stats = run_one_cycle(gpio, model_blob, config, summary.cycles + 1);
        summary.cycles += 1;
        match stats.output {
            Some(_) => summary.actuations += 1,
            None => summary.failures += 1,
        }

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop looping.
            if tx.send(stats).is_err() {
                break;
            }
        }

        delay.delay(config.period);
    }

    info!(
        cycles = summary.cycles,
        actuations = summary.actuations,
        failures = summary.failures,
        "io loop stopped"
    );
    summary
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn configure_pins<G: GpioPort>(gpio: &mut G, config: &LoopConfig) {
    for pin in config.input_pins {
        gpio.configure_pin(pin, Direction::Input, config.input_pull);
    }
    gpio.configure_pin(config.output_pin, Direction::Output, Pull::None);
    gpio.write_pin(config.output_pin, false);
}

/// Read → infer → classify → write. The write is skipped when inference
/// fails, so the pin keeps its previous level.
fn run_one_cycle<G: GpioPort>(
    gpio: &mut G,
    model_blob: &[u8],
    config: &LoopConfig,
    cycle: u64,
) -> CycleStats {
    let a = gpio.read_pin(config.input_pins[0]);
    let b = gpio.read_pin(config.input_pins[1]);

    let t_start = Instant::now();
    let result = infer(model_blob, level(a), level(b));
    let elapsed_us = t_start.elapsed().as_micros() as u64;

    match result {
        Ok(probability) => {
            let high = classify(probability) == 1;
            gpio.write_pin(config.output_pin, high);
            debug!(cycle, a, b, probability, high, "cycle");
            CycleStats { cycle, inputs: (a, b), probability: Some(probability), output: Some(high), elapsed_us }
        }
        Err(e) => {
            error!(cycle, "inference failed, output left unchanged: {e}");
            CycleStats { cycle, inputs: (a, b), probability: None, output: None, elapsed_us }
        }
    }
}

fn level(high: bool) -> f32 {
    if high {
        1.0
    } else {
        0.0
    }
}
