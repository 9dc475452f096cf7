//! `logcodec generate` — sample logs for every event of an ABI.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use logcodec_evm::{generate_logs, SampleOptions};
use std::path::PathBuf;

pub struct Args {
    pub abi: PathBuf,
    pub count: usize,
    pub start_block: u64,
    pub start_log_index: u64,
    pub address: Option<String>,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
}

pub fn run(args: Args) -> Result<()> {
    let abi = crate::load_abi(&args.abi)?;

    let mut opts = SampleOptions {
        count_per_event: args.count,
        start_block: args.start_block,
        start_log_index: args.start_log_index,
        seed: args.seed,
        ..Default::default()
    };
    if let Some(a) = &args.address {
        opts.emitter = a
            .parse::<Address>()
            .with_context(|| format!("invalid address '{a}'"))?;
    }

    let logs = generate_logs(&abi, &opts);
    let json = serde_json::to_string_pretty(&logs)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("Wrote {} logs to {}", logs.len(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
