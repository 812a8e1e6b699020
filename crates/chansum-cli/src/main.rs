use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::Rng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use chansum_kernels::{block_sum, par_block_sum_with, sine_sum, KernelConfig};
use ndarray::{Array1, Array3};

#[derive(Parser)]
#[command(
    name = "chansum",
    about = "Block-wise channel sum kernels",
    long_about = "Sequential and rayon-parallel channel sums over (H, W, C) arrays,\nplus a sum-of-sines reduction. Use `bench` to time every approach per block size.",
    version,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show build and runtime info
    Info,
    /// Time sequential and parallel block sums for each ksize
    Bench {
        /// Array height
        #[arg(long, default_value = "1024")]
        height: usize,
        /// Array width
        #[arg(long, default_value = "1024")]
        width: usize,
        /// Number of channels
        #[arg(long, default_value = "3")]
        channels: usize,
        /// Block sizes to benchmark (comma-separated)
        #[arg(long, default_value = "1,2,4,8,16,32,64,128,256")]
        ksizes: String,
        /// Iterations per measurement
        #[arg(long, default_value = "10")]
        iters: usize,
        /// Worker threads for the parallel variant (overrides --config)
        #[arg(long)]
        threads: Option<usize>,
        /// JSON kernel config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write timings (seconds per call) as CSV, one row per ksize
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info => {
            cmd_info();
            Ok(())
        }
        Commands::Bench {
            height,
            width,
            channels,
            ksizes,
            iters,
            threads,
            config,
            output,
        } => {
            let mut cfg = match config {
                Some(path) => load_config(&path)?,
                None => KernelConfig::default(),
            };
            if let Some(n) = threads {
                cfg = cfg.with_threads(n);
            }
            let ksizes = parse_ksizes(&ksizes)?;
            cmd_bench(
                [height, width, channels],
                &ksizes,
                iters,
                &cfg,
                output.as_deref(),
            )
        }
    }
}

fn cmd_info() {
    println!("chansum v{}", env!("CARGO_PKG_VERSION"));

    println!("\nPlatform");
    println!("  OS:      {}", std::env::consts::OS);
    println!("  Arch:    {}", std::env::consts::ARCH);
    println!("  Threads: {}", rayon::current_num_threads());

    println!("\nDTypes");
    println!("  block sums: any ndarray element with + (Python: i32, i64, f32, f64; others cast)");
    println!("  sine sum:   anything widening to f64");

    println!("\nCrates");
    let crates = [
        ("kernels", "block_sum, par_block_sum, sine_sum, KernelConfig"),
        ("python", "PyO3 bindings"),
        ("cli", "This CLI"),
    ];
    for (name, desc) in crates {
        println!("  chansum-{:<8} {}", name, desc);
    }
}

fn load_config(path: &Path) -> Result<KernelConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    debug!(?cfg, "loaded kernel config");
    Ok(cfg)
}

fn parse_ksizes(s: &str) -> Result<Vec<usize>> {
    let ksizes = s
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<usize>().with_context(|| format!("invalid ksize `{p}`")))
        .collect::<Result<Vec<_>>>()?;
    if ksizes.is_empty() {
        bail!("no block sizes given");
    }
    Ok(ksizes)
}

/// Mean wall time per call, in seconds.
fn time_per_call(iters: usize, mut f: impl FnMut() -> Result<()>) -> Result<f64> {
    let iters = iters.max(1);
    let start = Instant::now();
    for _ in 0..iters {
        f()?;
    }
    Ok(start.elapsed().as_secs_f64() / iters as f64)
}

fn cmd_bench(
    [h, w, c]: [usize; 3],
    ksizes: &[usize],
    iters: usize,
    cfg: &KernelConfig,
    output: Option<&Path>,
) -> Result<()> {
    let mut rng = rand::thread_rng();
    let input = Array3::from_shape_fn((h, w, c), |_| rng.gen_range(0i32..1000));
    info!(height = h, width = w, channels = c, iters, threads = ?cfg.num_threads, "benchmarking block sums");

    println!("{:<8} {:>14} {:>14} {:>10}", "ksize", "sum (ms)", "par_sum (ms)", "Speedup");
    println!("{}", "-".repeat(50));

    let mut rows = Vec::with_capacity(ksizes.len());
    for &ksize in ksizes {
        let seq = time_per_call(iters, || {
            block_sum(input.view(), ksize)?;
            Ok(())
        })?;
        let par = time_per_call(iters, || {
            par_block_sum_with(input.view(), ksize, cfg)?;
            Ok(())
        })?;
        println!(
            "{:<8} {:>14.3} {:>14.3} {:>9.2}x",
            ksize,
            seq * 1e3,
            par * 1e3,
            seq / par
        );
        rows.push((ksize, seq, par));
    }

    let values = Array1::from_shape_fn(10_000, |_| f64::from(rng.gen_range(0..1000i32)));
    let kernel = time_per_call(iters, || {
        std::hint::black_box(sine_sum(values.view()));
        Ok(())
    })?;
    let naive = time_per_call(iters, || {
        std::hint::black_box(values.iter().map(|v| v.sin()).sum::<f64>());
        Ok(())
    })?;
    println!(
        "\nsum_of_sines ({} values): kernel {:.3} us, naive {:.3} us",
        values.len(),
        kernel * 1e6,
        naive * 1e6
    );

    if let Some(path) = output {
        std::fs::write(path, timings_csv(&rows))
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote timings");
    }
    Ok(())
}

/// CSV with `ksize` as the index column and one column per approach.
fn timings_csv(rows: &[(usize, f64, f64)]) -> String {
    let body: String = rows
        .iter()
        .map(|(ksize, seq, par)| format!("{ksize},{seq:e},{par:e}\n"))
        .collect();
    format!("ksize,sum,par_sum\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ksizes() {
        assert_eq!(parse_ksizes("1, 2,4,,8").unwrap(), vec![1, 2, 4, 8]);
        assert!(parse_ksizes("1,x").is_err());
        assert!(parse_ksizes("").is_err());
    }

    #[test]
    fn test_timings_csv() {
        let csv = timings_csv(&[(1, 0.5, 0.25), (2, 0.125, 0.0625)]);
        assert_eq!(csv, "ksize,sum,par_sum\n1,5e-1,2.5e-1\n2,1.25e-1,6.25e-2\n");

        let fields: Vec<f64> = csv.lines().nth(2).unwrap().split(',').skip(1).map(|v| v.parse().unwrap()).collect();
        assert_eq!(fields, vec![0.125, 0.0625]);
    }

    #[test]
    fn test_timings_csv_header_only() {
        assert_eq!(timings_csv(&[]), "ksize,sum,par_sum\n");
    }

    #[test]
    fn test_cli_parses_bench() {
        let cli = Cli::try_parse_from(["chansum", "bench", "--height", "8", "--ksizes", "2,4", "--threads", "2"]).unwrap();
        match cli.command {
            Commands::Bench { height, ksizes, threads, width, .. } => {
                assert_eq!(height, 8);
                assert_eq!(width, 1024);
                assert_eq!(ksizes, "2,4");
                assert_eq!(threads, Some(2));
            }
            Commands::Info => panic!("expected bench"),
        }
    }

    #[test]
    fn test_small_bench_runs() {
        let cfg = KernelConfig::default();
        cmd_bench([4, 6, 2], &[1, 4], 1, &cfg, None).unwrap();
    }

    #[test]
    fn test_bench_writes_csv() {
        let path = std::env::temp_dir().join(format!("chansum-bench-{}.csv", std::process::id()));
        let cfg = KernelConfig::default().with_threads(2);
        cmd_bench([5, 3, 2], &[1, 2, 8], 1, &cfg, Some(&path)).unwrap();

        let csv = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        let ksizes: Vec<&str> = csv.lines().skip(1).map(|l| l.split(',').next().unwrap()).collect();
        assert_eq!(csv.lines().next(), Some("ksize,sum,par_sum"));
        assert_eq!(ksizes, vec!["1", "2", "8"]);
    }
}
