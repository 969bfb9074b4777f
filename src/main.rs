use marblemaze::{init_logging, load_config, LogFormat, Puzzle, BUILD_DATE, VERSION};
use std::path::PathBuf;

const USAGE: &str = "usage: marblemaze [--json-log] [--seed <n>] [--layout] [config.{json,toml}]";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    seed: Option<u64>,
    json_log: bool,
    layout: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json-log" => args.json_log = true,
            "--layout" => args.layout = true,
            "--seed" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed needs a value\n{USAGE}"))?;
                args.seed = Some(value.parse()?);
            }
            "-h" | "--help" => {
                println!("marblemaze {VERSION} ({BUILD_DATE})\n{USAGE}");
                std::process::exit(0);
            }
            other if other.starts_with('-') => anyhow::bail!("unknown option {other}\n{USAGE}"),
            other => args.config = Some(PathBuf::from(other)),
        }
    }
    Ok(args)
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    init_logging(if args.json_log { LogFormat::Json } else { LogFormat::Pretty })?;
    tracing::info!(version = VERSION, build_date = BUILD_DATE, "marblemaze starting");

    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let puzzle = Puzzle::generate(&config)?;
    let output = if args.layout {
        serde_json::to_string_pretty(puzzle.layout())?
    } else {
        serde_json::to_string_pretty(&puzzle.summary())?
    };
    println!("{output}");
    Ok(())
}
