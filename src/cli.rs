use std::env;
use std::path::PathBuf;

pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub input: Option<PathBuf>,
    pub seed: Option<u64>,
    pub log_level: Option<String>,
    pub out_dir: PathBuf,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut config = None;
    let mut input = None;
    let mut seed = None;
    let mut log_level = None;
    let mut out_dir = PathBuf::from("out");

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --config (expected a file path)")?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--input" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --input (expected a file path)")?;
                if input.replace(PathBuf::from(path)).is_some() {
                    return Err("--input provided more than once".to_string());
                }
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let parsed: u64 = raw
                    .parse()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                if seed.replace(parsed).is_some() {
                    return Err("--seed provided more than once".to_string());
                }
            }
            "--log-level" => {
                i += 1;
                let level =
                    args.next_or_err(i, "missing value for --log-level (expected error|warn|info|debug|trace)")?;
                if log_level.replace(level.to_string()).is_some() {
                    return Err("--log-level provided more than once".to_string());
                }
            }
            "--out-dir" => {
                i += 1;
                let path = args.next_or_err(i, "missing value for --out-dir (expected a directory path)")?;
                out_dir = PathBuf::from(path);
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(CliOptions {
        config,
        input,
        seed,
        log_level,
        out_dir,
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index).map(String::as_str).ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  ev-fleet-scheduler [--config <path>] [--input <path>] [--seed <u64>] \
         [--log-level <level>] [--out-dir <path>]"
    );
}
