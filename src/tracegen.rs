use anyhow::{Context, Result};
use rzpl::trace::io::write_groups;
use rzpl::{TraceGroup, VirtualTraceGenerator};
use std::env;
use std::path::PathBuf;

struct Config {
    num_groups: usize,
    num_inferences: usize,
    seed: u64,
    output_file: Option<String>,
    use_brotli: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            num_groups: 1,
            num_inferences: 4,
            seed: 42,
            output_file: None,
            use_brotli: false,
        }
    }
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    match args.get(*i) {
        Some(value) => Ok(value),
        None => anyhow::bail!("{} requires an argument", flag),
    }
}

fn parse_args(args: &[String]) -> Result<Config> {
    let mut config = Config::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-groups" => {
                config.num_groups = next_value(args, &mut i, "-groups")?.parse()?;
            }
            "-inferences" => {
                config.num_inferences = next_value(args, &mut i, "-inferences")?.parse()?;
            }
            "-seed" => {
                config.seed = next_value(args, &mut i, "-seed")?.parse()?;
            }
            "-out" => {
                config.output_file = Some(next_value(args, &mut i, "-out")?.to_string());
            }
            "-brotli" => {
                config.use_brotli = true;
            }
            "-h" | "-help" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                log::warn!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    if config.num_groups == 0 {
        anyhow::bail!("-groups must be at least 1");
    }
    Ok(config)
}

fn print_help() {
    println!("Trace Group Generator");
    println!("Usage: zpl-tracegen [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -groups <N>            Number of groups to generate (default: 1)");
    println!("  -inferences <N>        Inference runs per group (default: 4)");
    println!("  -seed <N>              Seed of the first group; group k uses seed + k (default: 42)");
    println!("  -out <FILE>            Output file path (default: groups.json)");
    println!("  -brotli                Write compressed groups using Brotli (output: *.json.br)");
    println!("  -h, -help, --help      Show this help message");
}

/// Generates `config.num_groups` groups named `virtual-1`, `virtual-2`, ...
fn generate_groups(config: &Config) -> Vec<TraceGroup> {
    (0..config.num_groups)
        .map(|k| {
            let name = format!("virtual-{}", k + 1);
            VirtualTraceGenerator::with_config(config.num_inferences, config.seed + k as u64).generate(&name)
        })
        .collect()
}

fn output_path(config: &Config) -> PathBuf {
    let default = if config.use_brotli { "groups.json.br" } else { "groups.json" };
    let path = config.output_file.clone().unwrap_or_else(|| default.to_string());
    if config.use_brotli && !path.ends_with(".br") {
        PathBuf::from(format!("{}.br", path))
    } else {
        PathBuf::from(path)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let config = parse_args(&args)?;

    let groups = generate_groups(&config);
    let path = output_path(&config);
    let refs: Vec<&TraceGroup> = groups.iter().collect();
    write_groups(&path, &refs).with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Groups written to: {}", path.display());
    Ok(())
}
