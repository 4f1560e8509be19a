//! futurelib - CLI demo driver
//!
//! Runs small generated-program-shaped workloads against the global future
//! runtime, the way a compiled async program would.

use anyhow::Result;
use clap::{Parser, Subcommand};
use futurelib::abi;
use futurelib::util::logger;
use futurelib::{NAME, VERSION};

/// Future runtime for asynchronous function calls
#[derive(Parser, Debug)]
#[command(name = "futurelib")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch one recursive sum asynchronously and retrieve it
    Sum {
        /// Upper bound of the sum
        #[arg(value_name = "N", default_value_t = 15)]
        n: i64,
    },

    /// Combine several gets on two futures (returns 393 for 15 and 16)
    Pair,

    /// Run a slow and a fast summing worker in parallel; each prints its
    /// own total
    Parallel,

    /// Launch many futures at once and retrieve them all
    Stress {
        /// Number of futures to launch
        #[arg(value_name = "COUNT", default_value_t = 100)]
        count: usize,
    },

    /// Print version information
    Version,
}

/// Recursive sum 1..=x, the canonical generated workload.
fn summ(x: i64) -> i64 {
    if x == 1 {
        1
    } else {
        x + summ(x - 1)
    }
}

/// Busy loop proportional to x, to keep a worker running for a while.
fn slow(x: i64) -> i64 {
    let mut t = 0;
    let mut i = 0;
    while i < x * 1000 {
        i += 1;
        t += 2 * i + x;
    }
    t
}

/// Slow sum, printing its own total before returning it.
fn summandprint(x: i64) -> i64 {
    let _ = slow(x);
    let ret = summ(x);
    println!("{}", ret);
    ret
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        logger::init_debug();
    } else {
        logger::init_cli();
    }

    match args.command {
        Commands::Sum { n } => {
            let f = abi::async_call(summ, n);
            println!("{}", abi::get(f));
        }
        Commands::Pair => {
            let f = abi::async_call(summ, 15);
            let g = abi::async_call(summ, 16);
            let val = abi::get(f) + abi::get(g) + (abi::get(g) + 1);
            println!("{}", val);
        }
        Commands::Parallel => {
            let f = abi::async_call(summandprint, 500);
            let g = abi::async_call(summandprint, 2);
            let _ = abi::get(f) + abi::get(g);
        }
        Commands::Stress { count } => {
            let handles: Vec<_> = (0..count)
                .map(|i| abi::async_call(summ, (i as i64 % 100) + 1))
                .collect();
            let total: i64 = handles.iter().map(|&f| abi::get(f)).sum();
            println!("{} futures, total {}", count, total);
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    abi::free_all_futures();
    Ok(())
}
