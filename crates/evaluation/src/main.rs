use clap::{Args, Parser, Subcommand, ValueEnum};
use common::instances::{generate_pair, Layout};
use common::io::{read_dataset, write_instance};
use kpartite_matching::{prepare, CheckConfig, Policy};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(name = "kpm", about = "Perfect matchings in k-partite graphs")]
struct Cli {
    #[arg(long, global = true)]
    log_level: Option<Level>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decide every graph of one or more datasets.
    Check(CheckArgs),
    /// Write a dataset of perfect and one of not perfect graphs.
    Generate(GenerateArgs),
    /// Time satisfiability solvers on random formulas.
    Sat(SatArgs),
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum)]
enum PolicyArg {
    #[default]
    AdjacentPairs,
    AllPairs,
}

impl From<PolicyArg> for Policy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::AdjacentPairs => Policy::AdjacentPairs,
            PolicyArg::AllPairs => Policy::AllPairs,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum)]
enum SolverArg {
    /// Enumerate all assignments.
    #[default]
    Brute,
    /// Unit propagation, pure literals and branching.
    Smart,
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[arg(long, required = true)]
    input: Vec<PathBuf>,
    #[arg(long, value_enum, default_value_t)]
    policy: PolicyArg,
    /// Skip the forced edge reduction.
    #[arg(long)]
    no_reduce: bool,
    /// Check partition pairs in parallel.
    #[arg(long)]
    parallel: bool,
    /// Append one JSON line per graph.
    #[arg(long)]
    stats: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u32).range(2..))]
    min_k: u32,
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u32).range(2..))]
    max_k: u32,
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..))]
    min_n: u32,
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    max_n: u32,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum, default_value_t)]
    layout: Layout,
}

#[derive(Debug, Args)]
struct SatArgs {
    /// Cases as `vars,clauses,lits_per_clause,trials`.
    #[arg(long, num_args = 1..)]
    cases: Vec<SatCase>,
    #[arg(long, default_value_t = 3)]
    seed: u64,
    #[arg(long, value_enum, default_value_t)]
    solver: SolverArg,
    #[arg(long)]
    output: PathBuf,
    /// Also write every formula in DIMACS CNF.
    #[arg(long)]
    cnf: Option<PathBuf>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct SatCase {
    vars: u32,
    clauses: usize,
    lits_per_clause: usize,
    trials: usize,
}

const DEFAULT_SAT_CASES: [SatCase; 8] = [
    SatCase::new(4, 10, 2, 10),
    SatCase::new(8, 16, 2, 10),
    SatCase::new(12, 24, 2, 10),
    SatCase::new(16, 32, 2, 10),
    SatCase::new(18, 36, 2, 10),
    SatCase::new(20, 40, 2, 10),
    SatCase::new(22, 44, 2, 10),
    SatCase::new(24, 48, 2, 10),
];

impl SatCase {
    const fn new(vars: u32, clauses: usize, lits_per_clause: usize, trials: usize) -> Self {
        Self { vars, clauses, lits_per_clause, trials }
    }
}

#[derive(Error, Debug)]
enum ParseSatCaseError {
    #[error("expected 4 comma separated values (got {0})")]
    WrongLength(usize),
    #[error("parse int error")]
    ParseInt(#[from] std::num::ParseIntError),
}

impl FromStr for SatCase {
    type Err = ParseSatCaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<&str> = s.split(',').map(str::trim).collect();
        let [vars, clauses, lits_per_clause, trials] = values.as_slice() else {
            return Err(ParseSatCaseError::WrongLength(values.len()));
        };
        Ok(Self::new(vars.parse()?, clauses.parse()?, lits_per_clause.parse()?, trials.parse()?))
    }
}

/// Escapes `"` and `\\` for a JSON string literal.
fn escape_json(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn write_stats(
    out: &mut Option<BufWriter<File>>,
    input: &Path,
    graph: usize,
    k: usize,
    n: usize,
    perfect: bool,
    time: f64,
) -> Result<(), Box<dyn Error>> {
    let Some(out) = out else { return Ok(()); };
    let input = escape_json(&input.file_name().map(|name| name.to_string_lossy()).unwrap_or_default());
    writeln!(
        out,
        "{{\"input\": \"{input}\", \"graph\": {graph}, \"k\": {k}, \"n\": {n}, \"perfect\": {perfect}, \"time\": {time}}}"
    )?;
    Ok(())
}

fn run_check(args: CheckArgs) -> Result<(), Box<dyn Error>> {
    let config = CheckConfig::new(args.policy.into()).with_reduce(!args.no_reduce).with_parallel(args.parallel);
    let mut stats = args.stats.map(|path| File::options().create(true).append(true).open(path).map(BufWriter::new)).transpose()?;

    for input in &args.input {
        let instances = read_dataset(input)?;
        info!(input = %input.display(), graphs = instances.len(), "read dataset");
        for (i, instance) in instances.iter().enumerate() {
            let start = Instant::now();
            let check = prepare(&instance.partitions, &instance.edges)?.check(&config);
            let t = start.elapsed().as_secs_f64();

            let status = if check.perfect { "Perfect" } else { "Not Perfect" };
            println!(
                "Graph {}: k = {}, n = {}, Status: {status} (Execution Time: {t:.6} seconds)",
                i + 1,
                check.k,
                check.reference_size
            );
            write_stats(&mut stats, input, i + 1, check.k, check.reference_size, check.perfect, t)?;
        }
    }
    if let Some(mut stats) = stats {
        stats.flush()?;
    }
    Ok(())
}

fn run_generate(args: GenerateArgs) -> Result<(), Box<dyn Error>> {
    if args.min_k > args.max_k || args.min_n > args.max_n {
        return Err(format!(
            "empty range: k in {}..={}, n in {}..={}",
            args.min_k, args.max_k, args.min_n, args.max_n
        )
        .into());
    }
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut perfect = BufWriter::new(File::create(args.output_dir.join("perfect_k_partite_graph.csv"))?);
    let mut not_perfect = BufWriter::new(File::create(args.output_dir.join("not_perfect_k_partite_graph.csv"))?);

    let mut count = 0;
    for k in args.min_k..=args.max_k {
        for n in args.min_n..=args.max_n {
            let (a, b) = generate_pair(args.layout, k, n, &mut rng).ok_or_else(|| format!("no imperfect graph for k = {k}, n = {n}"))?;
            write_instance(&mut perfect, &a)?;
            write_instance(&mut not_perfect, &b)?;
            count += 1;
        }
    }
    perfect.flush()?;
    not_perfect.flush()?;
    info!(count, layout = ?args.layout, "generated graphs");
    println!("{count} perfect and {count} not perfect graphs written to {}", args.output_dir.display());
    Ok(())
}

fn run_sat(args: SatArgs) -> Result<(), Box<dyn Error>> {
    let cases = if args.cases.is_empty() { DEFAULT_SAT_CASES.to_vec() } else { args.cases };
    let mut table = BufWriter::new(File::create(&args.output)?);
    let mut cnf = args.cnf.map(|path| File::create(path).map(BufWriter::new)).transpose()?;

    writeln!(table, "Clauses, SAT Time Taken (us), UNSAT Time Taken (us)")?;
    let mut problem = args.seed;
    for case in cases {
        for _ in 0..case.trials {
            let mut rng = StdRng::seed_from_u64(problem);
            let formula = sat::random_formula(case.vars, case.clauses, case.lits_per_clause, &mut rng)?;
            if let Some(cnf) = &mut cnf {
                writeln!(cnf, "c problem {problem}")?;
                sat::write_dimacs(cnf, &formula)?;
            }

            let start = Instant::now();
            let assignment = match args.solver {
                SolverArg::Brute => sat::solve_brute_force(&formula)?,
                SolverArg::Smart => sat::solve_smart(&formula),
            };
            let t = start.elapsed().as_micros();

            let size = case.clauses * case.vars as usize;
            match assignment {
                Some(_) => writeln!(table, "{size},{t},")?,
                None => writeln!(table, "{size},,{t}")?,
            }
            problem += 1;
        }
    }
    table.flush()?;
    if let Some(mut cnf) = cnf {
        cnf.flush()?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(level) = cli.log_level {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(std::io::stderr)
            .finish();

        subscriber.init();
    };

    match cli.command {
        Command::Check(args) => run_check(args),
        Command::Generate(args) => run_generate(args),
        Command::Sat(args) => run_sat(args),
    }
}
