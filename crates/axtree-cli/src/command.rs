use crate::cli::DumpArgs;
use anyhow::{bail, Context, Result};
use axtree::{
    extract_windows, format_forest, select_main_window, to_json, Element, ExtractionConfig,
    RecordedProvider, RecordedSnapshot, SegmentationRenderer,
};
use std::sync::Arc;
use tracing::{info, warn};

fn load_config(args: &DumpArgs) -> Result<ExtractionConfig> {
    let config = match &args.config {
        Some(path) => ExtractionConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ExtractionConfig::default(),
    };
    let mut config = config.with_env_overrides();
    if args.max_depth.is_some() {
        config.max_depth = args.max_depth;
    }
    if args.hit_test {
        config.hit_test = true;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

pub async fn handle_dump_command(args: DumpArgs) -> Result<()> {
    let config = load_config(&args)?;
    let snapshot = RecordedSnapshot::from_file(&args.snapshot)
        .with_context(|| format!("Failed to read snapshot {}", args.snapshot.display()))?;
    let provider = Arc::new(RecordedProvider::new(snapshot));

    let handles = if args.roots.is_empty() {
        provider.roots().to_vec()
    } else {
        args.roots.clone()
    };
    if handles.is_empty() {
        bail!("Snapshot has no roots; pass --root <id>");
    }
    info!("Extracting {} windows", handles.len());

    let extraction = extract_windows(Arc::clone(&provider), handles, &config).await;
    for failure in &extraction.failures {
        warn!("Window #{} skipped: {}", failure.index, failure.reason);
    }
    if extraction.windows.is_empty() {
        bail!("No window could be extracted");
    }

    let main_window = select_main_window(&extraction.windows).cloned();
    let windows: Vec<Element> = match (&main_window, args.main_window_only) {
        (Some(main), true) => vec![main.clone()],
        _ => extraction.windows.clone(),
    };

    if args.print {
        eprint!("{}", format_forest(&windows));
    }

    if let Some(output) = &args.segment {
        let Some(main) = &main_window else {
            bail!("No window to segment");
        };
        let stats = SegmentationRenderer::new(config.display_scale)
            .segment_to_file(main, args.segment_base.as_deref(), output)
            .with_context(|| format!("Failed to write segmentation to {}", output.display()))?;
        info!(
            "Segmentation: {} drawn, {} skipped, {} failed",
            stats.drawn, stats.skipped, stats.failed
        );
    }

    let json = if args.event {
        serde_json::to_string_pretty(&extraction.envelope_for(&windows))?
    } else {
        to_json(&windows)?
    };

    match &args.out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Tree written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
