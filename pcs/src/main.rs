//! Experiment driver: loads the curve corpus, generates per-test keys and
//! runs the solver over the selected store back-ends, appending metrics
//! under `results/`.

use std::num::NonZeroUsize;
use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::Instant;

use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{error, info};

use dpstore::StoreKind;
use weierstrass::scalar;

use pcs::corpus;
use pcs::engine::{PcsContext, PcsParams};
use pcs::error::{Error, Result};
use pcs::results::{ResultsLog, RunLabel};
use pcs::walk::AddingWalk;

#[derive(Debug, Parser)]
#[command(name = "pcs", about = "Parallel collision search for the ECDLP", version)]
struct Args {
    /// Bit size of the curve (a multiple of 5 in 35..=115)
    #[arg(short = 'f', default_value_t = 35)]
    nb_bits: u32,

    /// Number of worker threads (default: available cores)
    #[arg(short = 't')]
    nb_threads: Option<usize>,

    /// Number of runs with different random secret keys
    #[arg(short = 'n', default_value_t = 10)]
    nb_tests: usize,

    /// Storage structure (PRTL or hash_unix); repeat to test both in turn
    #[arg(short = 's', value_parser = clap::value_parser!(StoreKind))]
    stores: Vec<StoreKind>,

    /// Level of the radix tree / hash-table size exponent (0 = auto for hash_unix)
    #[arg(short = 'l', default_value_t = 7)]
    level: u8,

    /// Trailing zero bits of a distinguished point (default: f/4)
    #[arg(short = 'd')]
    trailing_bits: Option<u32>,

    /// Number of collisions to find before stopping
    #[arg(short = 'c', default_value_t = 1)]
    nb_collisions: u32,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn default_thread_count() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

fn validate(args: &Args) -> Result<(usize, u32, Vec<StoreKind>)> {
    if args.nb_bits < 35 || args.nb_bits > 115 || args.nb_bits % 5 != 0 {
        return Err(Error::UnsupportedBitSize(args.nb_bits));
    }

    let nb_threads = args.nb_threads.unwrap_or_else(default_thread_count);
    if !(1..=2000).contains(&nb_threads) {
        return Err(Error::ThreadCount(nb_threads));
    }

    if args.nb_tests < 1 {
        return Err(Error::Runs(args.nb_tests));
    }

    let trailing_bits = args.trailing_bits.unwrap_or(args.nb_bits / 4);
    if trailing_bits > args.nb_bits {
        return Err(Error::TrailingBits {
            trailing_bits,
            nb_bits: args.nb_bits,
        });
    }

    let stores = if args.stores.is_empty() {
        info!("no storage structure chosen, defaulting to PRTL");
        vec![StoreKind::Prtl]
    } else {
        args.stores.clone()
    };

    let word_len = args.nb_bits - trailing_bits;
    if u32::from(args.level) > word_len {
        return Err(Error::Level {
            level: args.level,
            word_len,
        });
    }

    if args.nb_collisions < 1 {
        return Err(Error::Collisions(args.nb_collisions));
    }

    Ok((nb_threads, trailing_bits, stores))
}

fn run(args: Args) -> Result<()> {
    let (nb_threads, trailing_bits, stores) = validate(&args)?;

    let record = corpus::load_curve(Path::new("curves"), args.nb_bits)?;
    info!(curve = %record.curve, order = %record.order, "loaded {}-bit curve", record.nb_bits);

    let mut rng = StdRng::from_entropy();
    let (coeff_a, coeff_b) = AddingWalk::random_coefficients(&mut rng, &record.order);

    let results = ResultsLog::new("results");
    results.update_conf("f", &args.nb_bits.to_string())?;
    results.update_conf("t", &nb_threads.to_string())?;
    results.update_conf("theta", &trailing_bits.to_string())?;
    results.update_conf("l", &args.level.to_string())?;
    for kind in &stores {
        results.update_conf("s", kind.as_str())?;
    }

    for test_i in 0..args.nb_tests {
        let point_index = (test_i % corpus::POINTS_PER_CURVE as usize) as u64;
        let p = corpus::load_point(Path::new("points"), args.nb_bits, point_index, &record.curve)?;
        let key = scalar::random_key(&mut rng, u64::from(args.nb_bits), &record.order);
        let q = record.curve.double_and_add(&p, &key);

        info!("*** Test {} ***", test_i + 1);
        for kind in stores.iter().copied() {
            info!(structure = %kind, "solving");
            let ctx = PcsContext::new(
                record.curve.clone(),
                p.clone(),
                q.clone(),
                record.order.clone(),
                coeff_a.clone(),
                coeff_b.clone(),
                &PcsParams {
                    nb_bits: args.nb_bits,
                    trailing_bits,
                    store: kind,
                    level: args.level,
                    memory_cap: None,
                },
            );

            let started = Instant::now();
            let recovered = ctx.run(nb_threads, args.nb_collisions);
            let elapsed = started.elapsed();
            let stats = ctx.store_stats();

            if recovered != key {
                // incorrect result: logged, run continues with the next test
                error!(%recovered, %key, "error in PCS computation");
                break;
            }

            info!(
                time_ms = elapsed.as_millis() as u64,
                points = stats.points,
                "recovered the key"
            );

            let label = RunLabel {
                nb_bits: args.nb_bits,
                store: kind.as_str(),
                nb_threads,
                trailing_bits,
                level: args.level,
            };
            results.record_run(&label, elapsed.as_micros(), &stats)?;
        }
    }
    Ok(())
}
