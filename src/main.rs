use breath_guide::config::BreathConfig;
use breath_guide::devices::LoggedAudio;
use breath_guide::error::BreathError;
use breath_guide::session::BreathSession;
use breath_guide::units::Seconds;
use breath_guide::HandSide;
use clap::Parser;
use glam::Vec3;
use instant::Instant;
use log::{debug, error, info};
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::time::Duration;
use strum::IntoEnumIterator;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON session configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Named breath pattern: vertical, horizontal or circle
    #[arg(long)]
    pattern: Option<String>,

    /// Stop after this many full breaths
    #[arg(long)]
    cycles: Option<u32>,

    /// Inhale duration in seconds
    #[arg(long)]
    inhale: Option<f32>,

    /// Exhale duration in seconds
    #[arg(long)]
    exhale: Option<f32>,

    /// Simulation step in seconds
    #[arg(long, default_value_t = 0.02)]
    step: f32,

    /// Seed for the simulated hands' tremor
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Give up after this much simulated time
    #[arg(long, default_value_t = 120.0)]
    max_seconds: f32,

    /// Pace the simulation to the wall clock
    #[arg(long)]
    realtime: bool,
}

/// Hands that chase the tip of their own beam, with a little tremor
struct SimulatedHands {
    rng: ChaCha8Rng,
    left: Vec3,
    right: Vec3,
}

const HAND_REST: Vec3 = Vec3::new(0.0, 1.0, 0.3);
const HAND_FOLLOW_RATE: f32 = 6.0;
const TREMOR: f32 = 0.02;

impl SimulatedHands {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            left: HAND_REST,
            right: HAND_REST,
        }
    }

    fn step(&mut self, session: &mut BreathSession, dt: Seconds) {
        for side in HandSide::iter() {
            let target = session
                .controller()
                .beams()
                .segments()
                .filter(|segment| segment.side() == side && !segment.has_completed())
                .max_by(|a, b| a.elapsed().total_cmp(&b.elapsed()))
                .map(|segment| segment.control_points().0)
                .unwrap_or(HAND_REST);
            let tremor = Vec3::new(
                self.rng.random_range(-TREMOR..TREMOR),
                self.rng.random_range(-TREMOR..TREMOR),
                self.rng.random_range(-TREMOR..TREMOR),
            );
            let hand = if side.is_left() {
                &mut self.left
            } else {
                &mut self.right
            };
            let follow = (HAND_FOLLOW_RATE * *dt).min(1.0);
            *hand += (target - *hand) * follow + tremor;
            session.hands_mut().update(side, Some(*hand));
        }
    }
}

fn main() {
    env_logger::init();
    if let Err(error) = run(Args::parse()) {
        error!("{error}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), BreathError> {
    let mut config = match &args.config {
        Some(path) => BreathConfig::load(path)?,
        None => BreathConfig::default(),
    };
    if let Some(pattern) = args.pattern {
        config.pattern = Some(pattern);
    }
    if let Some(cycles) = args.cycles {
        config.rhythm.target_cycles = Some(cycles.max(1));
    }
    if let Some(inhale) = args.inhale {
        config.rhythm.inhale = Seconds(inhale);
    }
    if let Some(exhale) = args.exhale {
        config.rhythm.exhale = Seconds(exhale);
    }

    let mut session = BreathSession::new(config, Box::new(LoggedAudio))?;
    let mut hands = SimulatedHands::new(args.seed);
    let dt = Seconds(args.step).at_least(Seconds(0.001));
    let limit = Seconds(args.max_seconds);
    let started = Instant::now();
    let mut simulated = Seconds(0.0);

    session.start();
    info!(
        "Session started, beams take {} to arrive",
        session.controller().beam_travel_time()
    );
    while session.is_running() && simulated < limit {
        hands.step(&mut session, dt);
        session.step(dt);
        simulated += dt;
        let pulses = session.hands_mut().drain_haptics();
        if !pulses.is_empty() {
            debug!("{} haptic pulses at {simulated}", pulses.len());
        }
        if args.realtime {
            let ahead = Duration::from_secs_f32(*simulated).saturating_sub(started.elapsed());
            if !ahead.is_zero() {
                std::thread::sleep(ahead);
            }
        }
    }
    if session.is_running() {
        info!("Stopping after {simulated}");
    }
    session.teardown();

    let stats = session.stats();
    println!("Full breaths: {}", stats.full_breaths);
    for side in HandSide::iter() {
        let tally = stats.hand(side);
        println!(
            "{side} hand: {} of {} beams touched",
            tally.touched, tally.completed
        );
    }
    println!("Hit rate: {:.0}%", stats.hit_rate() * 100.0);
    Ok(())
}
