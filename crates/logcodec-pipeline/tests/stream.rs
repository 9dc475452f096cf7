//! Runs the pipeline over the recorded FeeM log stream fixture.

use alloy_primitives::address;
use logcodec_evm::AbiHandle;
use logcodec_pipeline::{
    Deduplicator, FileSource, LogProcessor, MemorySink, OutputFormat, Pipeline, PipelineConfig,
    PipelineMetrics, SinkConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

fn workspace_path(rel: &str) -> PathBuf {
    let mut p = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../..");
    p.push(rel);
    p
}

fn feem_abi() -> Arc<AbiHandle> {
    Arc::new(AbiHandle::load(workspace_path("abi/feem.json")).expect("failed to load feem.json"))
}

#[tokio::test]
async fn stream_fixture_counts() {
    let main = MemorySink::new();
    let dups = MemorySink::new();
    let processor = LogProcessor::new(feem_abi())
        .with_contract(Some(address!("0b5f073135df3f5671710f08b08c0c9258aecc35")));
    let mut pipeline = Pipeline::new(processor, Box::new(main.clone()))
        .with_duplicate_sink(Box::new(dups.clone()))
        .with_dedup(Deduplicator::new(100));

    let source = FileSource::new(workspace_path("fixtures/feem/stream.jsonl"));
    let metrics = pipeline.run(&source).await.unwrap();

    assert_eq!(
        metrics,
        PipelineMetrics {
            received: 8,
            emitted: 4,
            unmatched: 2,
            decode_errors: 1,
            unhandled: 0,
            duplicates: 1,
            malformed: 0,
            reconnections: 0,
        }
    );

    let names: Vec<_> = main.events().iter().map(|e| e.event_name()).collect();
    assert_eq!(
        names,
        ["FundsAdded", "ProjectAdded", "RoleGranted", "RewardClaimCompleted"]
    );
    assert_eq!(dups.events()[0].event_name(), "FundsAdded");
    assert_eq!(dups.events()[0].meta.log_index, 3);
}

#[tokio::test]
async fn without_dedup_the_redelivery_is_emitted() {
    let main = MemorySink::new();
    let mut pipeline = Pipeline::new(LogProcessor::new(feem_abi()), Box::new(main.clone()));
    let source = FileSource::new(workspace_path("fixtures/feem/stream.jsonl"));
    let metrics = pipeline.run(&source).await.unwrap();
    assert_eq!(metrics.emitted, 5);
    assert_eq!(metrics.duplicates, 0);
}

#[tokio::test]
async fn configured_pipeline_writes_rows_file() {
    let out_dir = std::env::temp_dir().join(format!("logcodec-rows-{}", std::process::id()));
    let out = out_dir.join("rows.jsonl");
    let dup_out = out_dir.join("dups.jsonl");

    let mut config = PipelineConfig::from_file_source(
        workspace_path("abi/feem.json"),
        workspace_path("fixtures/feem/stream.jsonl"),
    );
    config.sink = SinkConfig::File {
        path: out.clone(),
        format: OutputFormat::Rows,
    };
    config.duplicate_sink = Some(SinkConfig::File {
        path: dup_out.clone(),
        format: OutputFormat::Rows,
    });

    let source = logcodec_pipeline::source_from_config(&config).unwrap();
    let mut pipeline = Pipeline::from_config(&config).await.unwrap();
    let metrics = pipeline.run(source.as_ref()).await.unwrap();
    assert_eq!(metrics.emitted, 4);

    let rows: Vec<serde_json::Value> = std::fs::read_to_string(&out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[3]["event_name"], "RewardClaimCompleted");
    assert_eq!(rows[3]["project_id"], "42");
    assert_eq!(rows[3]["epoch_number"], "311");
    assert_eq!(rows[3]["amount"], "777");

    let dup_rows = std::fs::read_to_string(&dup_out).unwrap();
    assert_eq!(dup_rows.lines().count(), 1);
    assert!(dup_rows.contains("duplicate_detection_time"));

    let _ = std::fs::remove_dir_all(&out_dir);
}

#[test]
fn example_config_is_valid() {
    let config = PipelineConfig::load(workspace_path("config/pipeline.example.yaml")).unwrap();
    assert!(config.contract().unwrap().is_some());
    assert!(config.duplicate_sink.is_some());
}
