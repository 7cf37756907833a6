use crate::{
    artifacts::{
        android::listing::reset_related_files,
        collection::{ExtractContext, default_roots, extract_all, selected_artifacts},
    },
    decoder::{Abx2XmlDecoder, PreferenceDecoder},
    error::TomlError,
    output::write_report,
    search::{
        cancel::CancelToken,
        deep::{SearchEvent, SearchOptions, search_corpus, spawn_deep_search},
        patterns::pattern_scan,
        representations::build_anchors,
    },
    source::{SourceAccessor, open_source},
    structs::toml::WipetraceToml,
    utils::{logging::create_log_file, uuid::generate_uuid},
};
use chrono::{TimeDelta, Utc};
use common::{
    android::TimestampCandidate,
    report::{AnalysisReport, ReportMetadata},
    search::DeepSearchMatch,
};
use log::{error, info, warn};
use simplelog::{Config, WriteLogger};
use std::{fs::read, sync::Arc};
use timeline::timeline::{consistency, correlate, summary};

/// Parse a TOML file at provided path and run the analysis. Returns the report path
pub async fn parse_toml_file(path: &str) -> Result<String, TomlError> {
    let buffer = match read(path) {
        Ok(results) => results,
        Err(err) => {
            error!("[wipetrace] Could not read TOML file {path}: {err:?}");
            return Err(TomlError::NoFile);
        }
    };

    let config = WipetraceToml::parse_wipetrace_toml(&buffer)?;
    wipetrace_analysis(&config).await
}

/// Parse an already read TOML file
pub async fn parse_toml_data(data: &[u8]) -> Result<String, TomlError> {
    let config = WipetraceToml::parse_wipetrace_toml(data)?;
    wipetrace_analysis(&config).await
}

/// Open the configured source, analyze it and write the report
pub async fn wipetrace_analysis(config: &WipetraceToml) -> Result<String, TomlError> {
    if let Ok((log_file, level)) = create_log_file(&config.output) {
        let _ = WriteLogger::init(level, Config::default(), log_file);
    }

    let source = match open_source(&config.source) {
        Ok(result) => result,
        Err(err) => {
            error!("[wipetrace] Could not open source {}: {err:?}", config.source.path);
            return Err(TomlError::Source);
        }
    };
    let decoder = Arc::new(Abx2XmlDecoder::new(&config.decoder));

    // Ctrl-C stops the deep search between files. Everything found so far is still written
    let cancel = CancelToken::new();
    let signal_token = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("[wipetrace] Interrupt received. Stopping deep search");
            signal_token.cancel();
        }
    });

    let report = analyze(config, source, decoder, cancel).await;
    watcher.abort();
    let report = report?;

    match write_report(&report, &config.output) {
        Ok(path) => {
            info!("[wipetrace] Report written to {path}");
            Ok(path)
        }
        Err(err) => {
            error!("[wipetrace] Failed to write report: {err:?}");
            Err(TomlError::Output)
        }
    }
}

/// Run extraction, correlation, listing, pattern scan and deep search against `source`
pub async fn analyze(
    config: &WipetraceToml,
    source: Arc<dyn SourceAccessor>,
    decoder: Arc<dyn PreferenceDecoder>,
    cancel: CancelToken,
) -> Result<AnalysisReport, TomlError> {
    let start_time = Utc::now();
    let offset = TimeDelta::minutes(config.timezone.device_offset);

    // Extractors and scans do blocking file, process and SQLite work
    let blocking_source = source.clone();
    let timezone = config.timezone.clone();
    let kinds = selected_artifacts(&config.artifacts);
    let max_size = config.deep_search.max_size;
    let collected = tokio::task::spawn_blocking(move || {
        let context = ExtractContext {
            source: blocking_source.as_ref(),
            decoder: decoder.as_ref(),
            timezone: &timezone,
        };
        let (candidates, diagnostics) = extract_all(&context, &kinds);

        let roots = default_roots();
        let files = reset_related_files(blocking_source.as_ref(), &roots);
        let patterns = match pattern_scan(blocking_source.as_ref(), &roots, max_size) {
            Ok(result) => result,
            Err(err) => {
                warn!("[wipetrace] Pattern scan failed: {err:?}");
                Vec::new()
            }
        };
        (candidates, diagnostics, files, patterns)
    })
    .await;
    let (candidates, diagnostics, files, patterns) = match collected {
        Ok(result) => result,
        Err(err) => {
            error!("[wipetrace] Extraction task failed: {err:?}");
            return Err(TomlError::Extraction);
        }
    };
    info!(
        "[wipetrace] Extracted {} timestamps with {} diagnostics",
        candidates.len(),
        diagnostics.entries().len()
    );

    let correlation = correlate(&candidates);
    let consistency = consistency(&candidates, &Utc::now());
    let summary = summary(&candidates);

    let mut deep_search = Vec::new();
    let mut deep_search_cancelled = false;
    if config.deep_search.enabled && !candidates.is_empty() {
        let (matches, cancelled) =
            run_deep_search(config, source.clone(), &candidates, cancel).await?;
        deep_search = matches;
        deep_search_cancelled = cancelled;
    }

    Ok(AnalysisReport {
        metadata: ReportMetadata {
            uuid: generate_uuid(),
            source: format!(
                "{}:{}",
                format!("{:?}", config.source.kind).to_lowercase(),
                config.source.path
            ),
            start_time,
            complete_time: Utc::now(),
            device_offset: offset.num_minutes(),
            deep_search_cancelled,
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        candidates,
        correlation,
        consistency,
        summary,
        diagnostics: diagnostics.into_entries(),
        files,
        patterns,
        deep_search,
    })
}

async fn run_deep_search(
    config: &WipetraceToml,
    source: Arc<dyn SourceAccessor>,
    candidates: &[TimestampCandidate],
    cancel: CancelToken,
) -> Result<(Vec<DeepSearchMatch>, bool), TomlError> {
    let options = SearchOptions::from_config(&config.deep_search, &config.timezone);
    let anchors = build_anchors(candidates, &options.device_offset);
    let corpus = search_corpus(source.as_ref(), &config.deep_search.prefixes);
    info!(
        "[wipetrace] Deep search for {} anchors across {} files",
        anchors.len(),
        corpus.len()
    );

    let (handle, mut receiver) = spawn_deep_search(source, anchors, corpus, options, cancel);
    let mut matches = Vec::new();
    let mut cancelled = false;
    while let Some(event) = receiver.recv().await {
        match event {
            SearchEvent::Match(entry) => matches.push(entry),
            SearchEvent::Progress { processed, total } => {
                info!("[wipetrace] Deep search progress {processed}/{total}");
            }
            SearchEvent::Finished {
                processed,
                matches: count,
                cancelled: stopped,
            } => {
                info!("[wipetrace] Deep search finished {processed} files with {count} matches");
                cancelled = stopped;
            }
        }
    }

    match handle.await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!("[wipetrace] Deep search stopped early: {err:?}"),
        Err(err) => {
            error!("[wipetrace] Deep search task failed: {err:?}");
            return Err(TomlError::Search);
        }
    }
    Ok((matches, cancelled))
}
