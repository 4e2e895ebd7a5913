//! Estimator Service Concurrency Tests
//!
//! Multi-threaded scenarios against `EstimatorService`:
//! - Concurrent producers give the same result as sequential processing
//! - Readers never observe non-finite or out-of-window state
//! - Intake accounting when the channel overflows
//! - Reset ordering and change notification
//!
//! Run with: `cargo test --test service_concurrency`

use disha::core::math::heading_in_window;
use disha::{
    EstimatorConfig, EstimatorService, EstimatorState, InertialEstimator, RawSample,
    ServiceConfig,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

// ============================================================================
// Helpers
// ============================================================================

const STEP_US: u64 = 10_000;
const SAMPLES: u64 = 500;

fn accel_component(i: u64) -> f64 {
    ((i % 17) as f64 - 8.0) * 0.05
}

fn spawn(capacity: usize) -> EstimatorService {
    EstimatorService::spawn(
        EstimatorConfig::default(),
        &ServiceConfig {
            channel_capacity: capacity,
        },
    )
    .unwrap()
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_concurrent_streams_match_sequential_run() {
    let service = spawn(4 * SAMPLES as usize);
    let handle = service.handle();

    let accel_handle = handle.clone();
    let accel_thread = thread::spawn(move || {
        for i in 0..SAMPLES {
            let a = accel_component(i);
            assert!(accel_handle.on_acceleration_sample(a, -a, 9.81, i * STEP_US).unwrap());
        }
    });
    let gyro_handle = handle.clone();
    let gyro_thread = thread::spawn(move || {
        for i in 0..SAMPLES {
            // Zero yaw keeps the result independent of interleaving
            assert!(gyro_handle.on_angular_rate_sample(0.01, 0.02, 0.0, i * STEP_US).unwrap());
        }
    });
    accel_thread.join().unwrap();
    gyro_thread.join().unwrap();
    handle.sync().unwrap();

    let mut reference = InertialEstimator::new(EstimatorConfig::default());
    for i in 0..SAMPLES {
        let a = accel_component(i);
        reference.on_acceleration_sample(&RawSample::from_components(a, -a, 9.81, i * STEP_US));
    }

    let state = handle.snapshot();
    assert_eq!(state.position, reference.position());
    assert_eq!(state.velocity, reference.state().velocity);
    assert_eq!(state.heading, 0.0);
    assert_eq!(state.raw_angular_rate.x, 0.01);
    assert_eq!(state.last_angular_rate_us, Some((SAMPLES - 1) * STEP_US));

    let diag = handle.diagnostics();
    assert_eq!(diag.acceleration_samples, SAMPLES);
    assert_eq!(diag.angular_rate_samples, SAMPLES);
    assert_eq!(diag.dropped_samples, 0);

    service.shutdown().unwrap();
}

// ============================================================================
// Readers
// ============================================================================

#[test]
fn test_readers_see_consistent_state() {
    let service = spawn(1024);
    let handle = service.handle();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let handle = handle.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut watcher = handle.watcher();
                let mut last_revision = 0;
                let mut reads = 0u64;
                while !done.load(Ordering::Relaxed) {
                    let state = handle.snapshot();
                    assert!(state.position.iter().all(|v| v.is_finite()));
                    assert!(heading_in_window(state.heading));
                    if let Some(update) = watcher.poll() {
                        assert!(update.revision > last_revision);
                        last_revision = update.revision;
                    }
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    for i in 0..2_000u64 {
        handle
            .on_angular_rate_sample(0.0, 0.0, 25.0, i * STEP_US)
            .unwrap();
        handle
            .on_acceleration_sample(1.0, 0.5, 9.81, i * STEP_US)
            .unwrap();
    }
    handle.sync().unwrap();
    done.store(true, Ordering::Relaxed);

    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
    service.shutdown().unwrap();
}

#[test]
fn test_watcher_sees_final_position() {
    let service = spawn(1024);
    let handle = service.handle();
    let mut watcher = handle.watcher();
    let mut last_seen = None;

    for i in 0..300u64 {
        handle
            .on_acceleration_sample(0.3, 0.0, 9.81, i * STEP_US)
            .unwrap();
        if i % 50 == 0
            && let Some(update) = watcher.poll()
        {
            last_seen = Some(update.state.position);
        }
    }
    handle.sync().unwrap();
    if let Some(update) = watcher.poll() {
        last_seen = Some(update.state.position);
    }

    assert_eq!(last_seen, Some(handle.snapshot().position));
    assert!(!watcher.has_changed());
    service.shutdown().unwrap();
}

// ============================================================================
// Back-pressure
// ============================================================================

#[test]
fn test_overflow_accounting() {
    let service = spawn(4);
    let handle = service.handle();

    let mut accepted = 0u64;
    let mut dropped = 0u64;
    for i in 0..5_000u64 {
        if handle
            .on_acceleration_sample(0.1, 0.0, 9.81, i * STEP_US)
            .unwrap()
        {
            accepted += 1;
        } else {
            dropped += 1;
        }
    }
    handle.sync().unwrap();

    let diag = handle.diagnostics();
    assert_eq!(diag.acceleration_samples, accepted);
    assert_eq!(diag.dropped_samples, dropped);
    assert_eq!(accepted + dropped, 5_000);
    service.shutdown().unwrap();
}

// ============================================================================
// Reset
// ============================================================================

#[test]
fn test_reset_applies_after_queued_samples() {
    let service = spawn(8192);
    let handle = service.handle();
    let mut watcher = handle.watcher();

    for i in 0..1_000u64 {
        handle
            .on_acceleration_sample(1.0, 1.0, 9.81, i * STEP_US)
            .unwrap();
        handle
            .on_angular_rate_sample(0.0, 0.0, 0.5, i * STEP_US)
            .unwrap();
    }
    // No sync: reset must still land after every queued sample
    handle.reset().unwrap();

    assert_eq!(handle.snapshot(), EstimatorState::initial(1.0));
    let diag = handle.diagnostics();
    assert_eq!(diag.acceleration_samples, 1_000);
    assert_eq!(diag.angular_rate_samples, 1_000);
    assert_eq!(diag.resets, 1);

    let update = watcher.poll().unwrap();
    assert!(update.reset);
    assert_eq!(update.state.position, nalgebra::Vector2::zeros());

    service.shutdown().unwrap();
}

#[test]
fn test_reset_from_many_threads() {
    let service = spawn(1024);
    let handle = service.handle();

    let threads: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            thread::spawn(move || {
                for i in 0..50u64 {
                    handle
                        .on_acceleration_sample(0.2, 0.0, 9.81, i * STEP_US)
                        .unwrap();
                    handle.reset().unwrap();
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    handle.reset().unwrap();
    assert_eq!(handle.snapshot(), EstimatorState::initial(1.0));
    assert_eq!(handle.diagnostics().resets, 201);
    service.shutdown().unwrap();
}
