//! Thin translation layer: parse arguments into an `EngineConfig`, construct an `Engine`, pace
//! `iterate()` with an inter-iteration sleep, and finalize.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use latticechem::{ConfigError, Engine, EngineConfig, EngineError};

const USAGE: &str = "\
latticechem-cli [options]

Options:
  -a, --atoms <n>          initial atom count (default 64)
  -i, --iters <n>          iteration count (default 100000)
  -s, --seed <n>           RNG seed (default: time-based)
  -x, --x <n>              world width (default 16)
  -y, --y <n>              world height (default 16)
  -l, --sleep-ms <n>       inter-iteration sleep, in milliseconds (default 0)
      --load <file>        chemistry file to load (§4.7 grammar)
      --config-out <file>  echo the resolved configuration and chemistry
      --census-out <file>  periodic element-count log
      --diffusion-out <file>  per-atom diffusion summary at termination
      --rand-out <file>    first 10 raw RNG words, for cross-implementation checks
      --census-interval <n>  iterations between census rows (default 8)
      --no-reactions       disable the reaction sweep
      --shuffle            reshuffle atom positions every iteration
  -h, --help               print this message and exit
  -v, --version            print the version and exit
";

fn time_based_seed() -> u32 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    nanos as u32
}

fn parse_number<T: std::str::FromStr>(option: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::MalformedNumber {
        option: option.to_string(),
        value: value.to_string(),
    })
}

fn take_value(
    option: &str,
    args: &mut impl Iterator<Item = String>,
) -> Result<String, ConfigError> {
    args.next().ok_or_else(|| ConfigError::MalformedNumber {
        option: option.to_string(),
        value: String::new(),
    })
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<EngineConfig>, ConfigError> {
    let mut config = EngineConfig {
        seed: time_based_seed(),
        ..EngineConfig::default()
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print!("{USAGE}");
                return Ok(None);
            }
            "-v" | "--version" => {
                println!("latticechem-cli {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            "-a" | "--atoms" => {
                config.atom_count = parse_number("--atoms", &take_value("--atoms", &mut args)?)?;
            }
            "-i" | "--iters" => {
                config.max_iters = parse_number("--iters", &take_value("--iters", &mut args)?)?;
            }
            "-s" | "--seed" => {
                config.seed = parse_number("--seed", &take_value("--seed", &mut args)?)?;
            }
            "-x" | "--x" => {
                config.world_x = parse_number("--x", &take_value("--x", &mut args)?)?;
            }
            "-y" | "--y" => {
                config.world_y = parse_number("--y", &take_value("--y", &mut args)?)?;
            }
            "--load" => config.load_file = Some(PathBuf::from(take_value("--load", &mut args)?)),
            "--config-out" => {
                config.config_file = Some(PathBuf::from(take_value("--config-out", &mut args)?))
            }
            "--census-out" => {
                config.census_file = Some(PathBuf::from(take_value("--census-out", &mut args)?))
            }
            "--diffusion-out" => {
                config.diffusion_file =
                    Some(PathBuf::from(take_value("--diffusion-out", &mut args)?))
            }
            "--rand-out" => config.rand_file = Some(PathBuf::from(take_value("--rand-out", &mut args)?)),
            "--census-interval" => {
                config.census_interval =
                    parse_number("--census-interval", &take_value("--census-interval", &mut args)?)?;
            }
            "--no-reactions" => config.do_reactions = false,
            "--shuffle" => config.do_shuffle = true,
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        }
    }

    Ok(Some(config))
}

/// Parses arguments into `(config, sleep)`, handling `--sleep-ms` outside of `parse_args` since
/// it governs the CLI's pacing loop rather than any `EngineConfig` field.
fn parse_cli(args: Vec<String>) -> Result<Option<(EngineConfig, Duration)>, ConfigError> {
    let mut sleep_ms: u64 = 0;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        if arg == "-l" || arg == "--sleep-ms" {
            let value = iter.next().ok_or_else(|| ConfigError::MalformedNumber {
                option: "--sleep-ms".to_string(),
                value: String::new(),
            })?;
            sleep_ms = parse_number("--sleep-ms", &value)?;
        } else {
            rest.push(arg);
        }
    }
    Ok(parse_args(rest.into_iter())?.map(|config| (config, Duration::from_millis(sleep_ms))))
}

fn run() -> Result<(), EngineError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, sleep) = match parse_cli(args).map_err(EngineError::Config)? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    let mut engine = Engine::new(config)?;
    while engine.iterate() {
        if !sleep.is_zero() {
            std::thread::sleep(sleep);
        }
    }

    if let Err(err) = engine.finalize() {
        eprintln!("warning: {err:#}");
    }

    Ok(())
}

fn main() {
    color_eyre::install().ok();

    match run() {
        Ok(()) => std::process::exit(0),
        Err(EngineError::Config(err)) => {
            eprintln!("{err}");
            eprint!("{USAGE}");
            std::process::exit(2);
        }
        Err(EngineError::Load(err)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err @ EngineError::Io { .. }) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
