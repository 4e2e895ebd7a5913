//! Disha demo - simulated IMU streams through the estimator service
//!
//! Spawns one producer thread per sensor stream, each feeding scripted
//! samples into an [`EstimatorService`], while the main thread follows
//! position changes into a trajectory and logs status once per second.
//!
//! # Usage
//!
//! ```bash
//! # With default config
//! cargo run --release
//!
//! # With custom config file and overrides
//! cargo run --release -- --config disha.toml --motion figure-eight --filter covariant
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use clap::Parser;

use disha::{
    DishaConfig, DishaError, EstimatorHandle, EstimatorService, FilterKind, MotionScript, Result,
    SensorStream, StreamSimulator, TrajectoryRecorder,
};

#[derive(Parser, Debug)]
#[command(name = "disha")]
#[command(about = "Inertial state estimator driven by a simulated IMU")]
struct Args {
    /// Configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "disha.toml")]
    config: PathBuf,

    /// Override simulation duration (seconds)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Override position filter
    #[arg(long, value_enum)]
    filter: Option<FilterKind>,

    /// Override scripted motion
    #[arg(long, value_enum)]
    motion: Option<MotionScript>,

    /// Override random seed (0 = entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Feed samples as fast as possible instead of in real time
    #[arg(long)]
    fast: bool,
}

fn main() {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .format(|buf, record| {
        writeln!(
            buf,
            "[{}] {} - {}",
            record.level(),
            record.target(),
            record.args()
        )
    })
    .init();

    log::info!("disha starting");
    log::info!("  Config: {}", args.config.display());
    log::info!(
        "  Filter: {} (q={}, r={})",
        config.estimator.filter,
        config.estimator.process_noise,
        config.estimator.measurement_noise
    );
    log::info!(
        "  Motion: {} for {:.1}s (accel {} Hz, gyro {} Hz, seed {})",
        config.simulation.motion,
        config.simulation.duration_s,
        config.simulation.acceleration_rate_hz,
        config.simulation.angular_rate_hz,
        config.simulation.seed
    );

    // Setup signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    }) {
        log::warn!("Could not set Ctrl-C handler: {}", e);
    }

    if let Err(e) = run(&config, running) {
        log::error!("disha error: {}", e);
        std::process::exit(1);
    }

    log::info!("disha shutdown complete");
}

fn load_config(args: &Args) -> Result<DishaConfig> {
    let mut config = DishaConfig::load_or_default(&args.config)?;

    if let Some(duration) = args.duration {
        config.simulation.duration_s = duration;
    }
    if let Some(filter) = args.filter {
        config.estimator.filter = filter;
    }
    if let Some(motion) = args.motion {
        config.simulation.motion = motion;
    }
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if args.fast {
        config.simulation.realtime = false;
    }

    config.validate()?;
    Ok(config)
}

fn run(config: &DishaConfig, running: Arc<AtomicBool>) -> Result<()> {
    let service = EstimatorService::spawn(config.estimator, &config.service)?;
    let handle = service.handle();

    let producers = [SensorStream::Acceleration, SensorStream::AngularRate]
        .into_iter()
        .map(|stream| {
            let sim = StreamSimulator::new(stream, &config.simulation)?;
            spawn_producer(
                sim,
                handle.clone(),
                running.clone(),
                config.simulation.realtime,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let mut watcher = handle.watcher();
    let mut trajectory = TrajectoryRecorder::new(config.trajectory);
    let mut last_status = Instant::now();

    // Consumer loop: follow position changes until both streams are done
    while running.load(Ordering::Relaxed) && producers.iter().any(|p| !p.is_finished()) {
        if let Some(update) = watcher.poll() {
            trajectory.apply(&update);
        }

        if last_status.elapsed() >= Duration::from_secs(1) {
            let state = handle.snapshot();
            let diag = handle.diagnostics();
            if state.is_pristine() {
                log::info!("waiting for samples (dropped={})", diag.dropped_samples);
            } else {
                log::info!(
                    "pos=({:.3}, {:.3}) heading={:.1}° samples={} dropped={} path={:.2}",
                    state.position.x,
                    state.position.y,
                    state.heading_degrees(),
                    diag.processed_samples(),
                    diag.dropped_samples,
                    trajectory.path_length()
                );
            }
            last_status = Instant::now();
        }

        thread::sleep(Duration::from_millis(10));
    }

    for producer in producers {
        producer
            .join()
            .map_err(|_| DishaError::Simulation("producer thread panicked".into()))?;
    }

    handle.sync()?;
    if let Some(update) = watcher.poll() {
        trajectory.apply(&update);
    }

    print_summary(config, &handle, &trajectory);
    service.shutdown()
}

fn spawn_producer(
    sim: StreamSimulator,
    handle: EstimatorHandle,
    running: Arc<AtomicBool>,
    realtime: bool,
) -> Result<JoinHandle<()>> {
    let stream = sim.stream();
    let producer = thread::Builder::new()
        .name(format!("{}-sim", stream))
        .spawn(move || {
            let start = Instant::now();
            let mut sent = 0u64;

            for sample in sim {
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                if realtime
                    && let Some(wait) =
                        Duration::from_micros(sample.timestamp_us).checked_sub(start.elapsed())
                {
                    thread::sleep(wait);
                }
                match handle.submit(stream, sample) {
                    Ok(_) => sent += 1,
                    Err(e) => {
                        log::warn!("{} producer stopping: {}", stream, e);
                        break;
                    }
                }
            }

            log::debug!("{} producer finished after {} samples", stream, sent);
        })?;

    Ok(producer)
}

fn print_summary(config: &DishaConfig, handle: &EstimatorHandle, trajectory: &TrajectoryRecorder) {
    let state = handle.snapshot();
    let diag = handle.diagnostics();
    let sim = &config.simulation;
    let true_heading = sim.motion.heading_at(sim, sim.duration_s) as f32;

    log::info!("=== Summary ===");
    log::info!(
        "  Position: ({:.3}, {:.3}) ± ({:.4}, {:.4})",
        state.position.x,
        state.position.y,
        state.position_uncertainty[(0, 0)].sqrt(),
        state.position_uncertainty[(1, 1)].sqrt()
    );
    log::info!(
        "  Heading: {:.2}° (script {:.2}°)",
        state.heading_degrees(),
        disha::core::math::normalize_angle(true_heading).to_degrees()
    );
    log::info!(
        "  Trajectory: {} points, {:.2} path length",
        trajectory.len(),
        trajectory.path_length()
    );
    log::info!(
        "  Samples: {} accel, {} gyro, {} dropped, {} rejected, {} discarded updates",
        diag.acceleration_samples,
        diag.angular_rate_samples,
        diag.dropped_samples,
        diag.rejected_samples,
        diag.discarded_updates
    );
}
