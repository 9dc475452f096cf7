//! `logcodec decode` — parallel batch decode of a log file.

use anyhow::{Context, Result};
use logcodec_core::{ErrorMode, LogDecoder};
use logcodec_evm::EvmDecoder;
use logcodec_feem::map_event;
use logcodec_pipeline::{encode_record, source::parse_logs, OutputFormat};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

pub fn run(
    abi_path: &Path,
    input: &Path,
    output: Option<&Path>,
    format: OutputFormat,
    threads: usize,
) -> Result<()> {
    let abi = Arc::new(crate::load_abi(abi_path)?);

    let text = std::fs::read_to_string(input)
        .with_context(|| format!("read log file '{}'", input.display()))?;
    let mut logs = Vec::new();
    let mut malformed = 0usize;
    for item in parse_logs(&text, &input.display().to_string()) {
        match item {
            Ok(log) => logs.push(log),
            Err(e) => {
                warn!(error = %e, "skipping malformed log");
                malformed += 1;
            }
        }
    }

    let decoder = EvmDecoder::new(abi);
    let start = Instant::now();
    let result = if threads > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("build thread pool")?;
        pool.install(|| decoder.decode_batch(&logs, ErrorMode::Collect, None))?
    } else {
        decoder.decode_batch(&logs, ErrorMode::Collect, None)?
    };
    let elapsed = start.elapsed();

    for (idx, err) in &result.errors {
        warn!(
            index = idx,
            log = %logs[*idx].dedup_key(),
            error = %err,
            "skipping undecodable log"
        );
    }

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            std::fs::File::create(path)
                .with_context(|| format!("create output '{}'", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let mut written = 0usize;
    let mut unhandled = 0usize;
    for decoded in &result.decoded {
        match map_event(decoded) {
            Ok(event) => {
                let record = encode_record(&event, format, false)?;
                serde_json::to_writer(&mut writer, &record)?;
                writer.write_all(b"\n")?;
                written += 1;
            }
            Err(e) => {
                warn!(error = %e, "skipping unhandled event");
                unhandled += 1;
            }
        }
    }
    writer.flush()?;

    eprintln!("Results:");
    eprintln!("  Logs:       {}", logs.len() + malformed);
    eprintln!("  Written:    {}", written);
    eprintln!("  Unmatched:  {}", result.unmatched.len());
    eprintln!("  Errors:     {}", result.errors.len());
    eprintln!("  Unhandled:  {}", unhandled);
    if malformed > 0 {
        eprintln!("  Malformed:  {}", malformed);
    }
    eprintln!("  Decode time: {:.3}s", elapsed.as_secs_f64());
    Ok(())
}
