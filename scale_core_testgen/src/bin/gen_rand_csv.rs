use std::error::Error;

use clap::Parser;
use csv::WriterBuilder;
use log::info;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use scale_core_testgen::{
    gen_in_category, gen_rate_case, rate_records, variant_prefix_lens, FamilyVariant, RandomCategory,
    WalkTestCaseSerDe,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The filename to output generated tests into
    #[arg(short)]
    out_file: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    /// Number of cases to generate for each category and prefix length.
    #[arg(short, long, default_value_t = 10)]
    n_per_category: usize,

    /// Number of addresses each walk asks for.
    #[arg(long, default_value_t = 32)]
    walk_len: usize,

    #[arg(long, default_value = "v6")]
    family: FamilyVariant,

    #[arg(long, default_value_t = false)]
    gen_small_step: bool,
    #[arg(long, default_value_t = false)]
    gen_large_step: bool,
    #[arg(long, default_value_t = false)]
    gen_exhausting: bool,

    /// Generate rate-verification cases instead of walks
    #[arg(long, default_value_t = false)]
    rates: bool,
    #[arg(long, default_value_t = 8)]
    max_paths: usize,

    #[arg(long, default_value_t = false)]
    shuffle: bool,
}

fn writer(out_file: Option<String>) -> Result<csv::Writer<Box<dyn std::io::Write>>, Box<dyn Error>> {
    let io_wtr: Box<dyn std::io::Write> = match out_file {
        Some(real_file) => Box::new(std::fs::File::create(real_file)?),
        None => Box::new(std::io::stdout()),
    };
    Ok(WriterBuilder::new().delimiter(b':').from_writer(io_wtr))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    if args.rates {
        let mut cases: Vec<_> = (0..args.n_per_category)
            .flat_map(|_| [false, true])
            .map(|skewed| gen_rate_case(&mut rng, skewed, args.max_paths))
            .collect();
        if args.shuffle {
            cases.shuffle(&mut rng);
        }
        info!("Generated {} rate cases", cases.len());
        let mut wtr = writer(args.out_file)?;
        for (case_id, case) in cases.iter().enumerate() {
            for record in rate_records(case_id, case) {
                wtr.serialize(record)?;
            }
        }
        wtr.flush()?;
        return Ok(());
    }

    let categories = {
        let mut cs = vec![];
        if args.gen_small_step {
            cs.push(RandomCategory::SmallStep);
        }
        if args.gen_large_step {
            cs.push(RandomCategory::LargeStep);
        }
        if args.gen_exhausting {
            cs.push(RandomCategory::Exhausting);
        }
        cs
    };
    if categories.is_empty() {
        return Err("Please select at least one walk category to generate using cmdline options (see -h)".into());
    }

    let mut tests = vec![];
    let n_expected = variant_prefix_lens(args.family).len() * categories.len() * args.n_per_category;

    for prefix_len in variant_prefix_lens(args.family) {
        for category in &categories {
            for _ in 0..args.n_per_category {
                tests.push(gen_in_category(&mut rng, args.family, *category, prefix_len, args.walk_len)?);
            }
        }
        log::debug!("{}/{n_expected} walks generated", tests.len());
    }
    info!("Generated {} walks", tests.len());

    if args.shuffle {
        tests.shuffle(&mut rng);
    }
    let mut wtr = writer(args.out_file)?;
    for test in tests {
        let serde_test: WalkTestCaseSerDe = test.into();
        wtr.serialize(serde_test)?;
    }
    wtr.flush()?;

    Ok(())
}
