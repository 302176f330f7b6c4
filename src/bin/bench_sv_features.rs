//! Benchmark secondary-vertex feature extraction on synthetic events.
//!
//! Run with: cargo run --release --features bench --bin bench_sv_features
//!
//! Usage:
//!   bench_sv_features                  Run default event count (10k)
//!   bench_sv_features 10k 100k         Run multiple event counts
//!   bench_sv_features --jet-radius 0.4 Use AK4-sized cones
//!   bench_sv_features -n 10            Run 10 iterations (for profiling)
//!   bench_sv_features --validate       Check the filled buffer after each run

use clap::Parser;
use glam::DVec3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;
use sv_features::validation::validate;
use sv_features::{
    fill_event, Covariance3, FeatureBuffer, Jet, PrimaryVertex, SecondaryVertex, SvEvent,
    SvFiller, SvFillerConfig,
};

fn parse_count(s: &str) -> Result<usize, String> {
    let s = s.to_lowercase();
    let (num_str, multiplier) = if s.ends_with('m') {
        (&s[..s.len() - 1], 1_000_000)
    } else if s.ends_with('k') {
        (&s[..s.len() - 1], 1_000)
    } else {
        (s.as_str(), 1)
    };

    num_str
        .parse::<f64>()
        .map(|n| (n * multiplier as f64) as usize)
        .map_err(|e| format!("Invalid number '{}': {}", s, e))
}

#[derive(Parser)]
#[command(name = "bench_sv_features")]
#[command(about = "Benchmark secondary-vertex feature extraction on synthetic events")]
struct Args {
    /// Event counts to benchmark (e.g., 10k, 1m)
    #[arg(value_parser = parse_count)]
    events: Vec<usize>,

    /// Random seed
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Jets per event
    #[arg(long, default_value_t = 2)]
    jets: usize,

    /// Secondary-vertex candidates per event
    #[arg(long, default_value_t = 8)]
    svs: usize,

    /// Jet-vertex association cone
    #[arg(long, default_value_t = sv_features::DEFAULT_JET_RADIUS)]
    jet_radius: f64,

    /// Validate the filled buffer
    #[arg(long)]
    validate: bool,

    /// Number of iterations to run (useful for profiling)
    #[arg(short = 'n', long, default_value_t = 1)]
    repeat: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

struct SyntheticEvent {
    jets: Vec<Jet>,
    pvs: Vec<PrimaryVertex>,
    svs: Vec<SecondaryVertex>,
}

/// Jets uniformly in the tracker acceptance; each SV is displaced toward a random jet.
fn generate_event<R: Rng>(rng: &mut R, num_jets: usize, num_svs: usize) -> SyntheticEvent {
    use std::f64::consts::PI;

    let jets: Vec<Jet> = (0..num_jets)
        .map(|i| {
            let pt: f64 = rng.gen_range(200.0..1500.0);
            let eta: f64 = rng.gen_range(-2.4..2.4);
            let phi = rng.gen_range(-PI..PI);
            Jet::from_pt_eta_phi_e(i, pt, eta, phi, pt * eta.cosh() * 1.05)
        })
        .collect();

    let pv_sigma: f64 = rng.gen_range(0.0005..0.003);
    let pvs = vec![PrimaryVertex::new(
        DVec3::new(0.0, 0.0, rng.gen_range(-5.0..5.0)),
        Covariance3::isotropic(pv_sigma),
    )];

    let svs = (0..num_svs)
        .map(|_| {
            let (eta, phi) = match jets.get(rng.gen_range(0..num_jets.max(1))) {
                Some(jet) => (
                    jet.eta + rng.gen_range(-0.9..0.9),
                    jet.phi + rng.gen_range(-0.9..0.9),
                ),
                None => (rng.gen_range(-2.4..2.4), rng.gen_range(-PI..PI)),
            };
            let dir = DVec3::new(phi.cos(), phi.sin(), eta.sinh());
            let flight: f64 = rng.gen_range(0.005..3.0);
            let pt: f64 = rng.gen_range(1.0..80.0);
            let momentum = dir * pt;
            let mass: f64 = rng.gen_range(0.3..6.0);
            let energy = (momentum.length_squared() + mass * mass).sqrt();
            let ndof = rng.gen_range(1..8u32) as f64;
            SecondaryVertex::new(
                pvs[0].position + dir * flight,
                Covariance3::isotropic(rng.gen_range(0.002..0.08)),
                momentum,
                energy,
            )
            .with_fit(rng.gen_range(2..8), rng.gen_range(0.0..4.0) * ndof, ndof)
        })
        .collect();

    SyntheticEvent { jets, pvs, svs }
}

fn run(args: &Args, filler: &SvFiller, num_events: usize) {
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let t = Instant::now();
    let events: Vec<SyntheticEvent> = (0..num_events)
        .map(|_| generate_event(&mut rng, args.jets, args.svs))
        .collect();
    let gen_time = t.elapsed();

    for iter in 0..args.repeat {
        let mut buffer = FeatureBuffer::new();
        if let Err(e) = filler.book(&mut buffer) {
            eprintln!("failed to declare schema: {}", e);
            std::process::exit(1);
        }

        let t = Instant::now();
        let mut vertices = 0usize;
        for ev in &events {
            match fill_event(filler, &ev.jets, &SvEvent::new(&ev.pvs, &ev.svs), &mut buffer) {
                Ok(summary) => vertices += summary.vertices_written,
                Err(e) => {
                    eprintln!("fill failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        let elapsed = t.elapsed();

        let per_jet_ns = elapsed.as_nanos() as f64 / buffer.num_jets().max(1) as f64;
        println!(
            "events={:>8} iter={} jets={:>8} svs/jet={:.2} gen={:>8.2?} fill={:>8.2?} ({:.0} ns/jet)",
            num_events,
            iter,
            buffer.num_jets(),
            vertices as f64 / buffer.num_jets().max(1) as f64,
            gen_time,
            elapsed,
            per_jet_ns,
        );

        if args.validate {
            let report = validate(&buffer);
            println!("  {}", report);
            if !report.is_valid() {
                eprintln!("WARNING: validation failed");
            }
        }
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let filler = match SvFiller::new(SvFillerConfig {
        jet_radius: args.jet_radius,
    }) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    let sizes = if args.events.is_empty() {
        vec![10_000]
    } else {
        args.events.clone()
    };

    for &n in &sizes {
        run(&args, &filler, n);
    }
}
