use std::{error::Error, path::PathBuf};

use clap::Parser;
use scale_core::{
    address::{AddressFamily, Network},
    config::{FamilyConfig, ScaleConfig},
    sequencer::DualStackSequencer,
};

/// Print the addresses a scale run would provision, either for a single `addr/prefix` or a JSON scale config.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Starting address and prefix, e.g. 10.0.0.0/24
    cidr: Option<String>,

    #[arg(long, default_value_t = 1)]
    step: i64,

    #[arg(short = 'n', long, default_value_t = 10)]
    count: usize,

    #[arg(long, default_value_t = false)]
    include_start: bool,

    /// JSON scale config, used instead of the positional address
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match (args.config, args.cidr) {
        (Some(path), _) => serde_json::from_str::<ScaleConfig>(&std::fs::read_to_string(path)?)?,
        (None, Some(cidr)) => {
            let net = Network::parse_cidr(&cidr)?;
            let family = Some(FamilyConfig::new(net.start().to_string(), net.prefix_len(), args.step));
            let (v4, v6) = match net.family() {
                AddressFamily::V4 => (family, None),
                AddressFamily::V6 => (None, family),
            };
            ScaleConfig {
                v4,
                v6,
                count: args.count,
                include_start: args.include_start,
                on_malformed: Default::default(),
            }
        }
        (None, None) => return Err("Pass an addr/prefix or --config (see -h)".into()),
    };

    let generation = DualStackSequencer::from_config(&config).generate(config.count)?;
    for (i, pair) in generation.pairs().iter().enumerate() {
        println!("{i}: {pair}");
    }
    if let Some(family) = generation.exhausted_family() {
        eprintln!(
            "{family} space exhausted after {} of {} addresses",
            generation.len(),
            generation.requested()
        );
    }
    for (family, err) in generation.malformed() {
        eprintln!("{family} input ignored: {err}");
    }
    Ok(())
}
