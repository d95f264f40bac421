use anyhow::{anyhow, Context};
use clap::Parser;
use record_seeder::backend::memory::InMemoryTable;
use record_seeder::backend::sql_script::SqlScriptBackend;
use record_seeder::config::{BackendKind, CliArgs, Command, SeederConfig};
use record_seeder::domain::table::Table;
use record_seeder::pipeline::{run_batch_pipeline, BatchPlan};
use record_seeder::progress::ConsoleProgress;
use record_seeder::source::{RecordGenerator, TableGenerator, TsvRecordSource};
use record_seeder::stream::{write_tsv_file, TsvFileOptions};
use record_seeder::telemetry::{get_subscriber, init_metrics, init_tracing_with_subscriber};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = SeederConfig::load(&args)?;

    // logs go to stderr, stdout belongs to the progress line
    let subscriber = get_subscriber(
        config.service_name.clone(),
        config.log_filter.clone(),
        std::io::stderr,
        config.otlp,
    )?;
    init_tracing_with_subscriber(subscriber)?;
    let meter_provider = if config.otlp {
        Some(init_metrics(config.service_name.clone())?)
    } else {
        None
    };

    let result = match &args.command {
        Command::Generate {
            table,
            count,
            output,
            no_header,
        } => generate(&config, *table, *count, output, *no_header).await,
        Command::Ingest {
            table,
            count,
            from_tsv,
            no_header,
            backend,
            script,
        } => {
            let target = Target {
                table: *table,
                backend: *backend,
                script: script.as_deref(),
            };
            match from_tsv {
                Some(path) => ingest_tsv(target, path, *no_header).await,
                None => match count {
                    Some(count) => ingest(&config, target, *count).await,
                    None => Err(anyhow!("--count is required without --from-tsv")),
                },
            }
        }
    };

    if let Some(provider) = meter_provider {
        provider.shutdown()?;
        opentelemetry::global::shutdown_tracer_provider();
    }
    result
}

async fn generate(
    config: &SeederConfig,
    table: Table,
    count: u64,
    output: &Path,
    no_header: bool,
) -> anyhow::Result<()> {
    let mut generator =
        TableGenerator::new(table, config.seed).with_limits(config.reservation_limits());
    let options = TsvFileOptions {
        header: if no_header { None } else { Some(table.columns()) },
        high_water_mark: config.high_water_mark,
        logging_step: config.logging_step,
    };

    let start = Instant::now();
    let summary = write_tsv_file(
        output,
        options,
        || generator.next_line(),
        count,
        &mut ConsoleProgress::stdout(),
    )
    .await?;

    info!(
        "Wrote {} {} rows to {} in {} ms ({} pauses for drain)",
        summary.lines_written,
        table,
        output.display(),
        start.elapsed().as_millis(),
        summary.pauses
    );
    Ok(())
}

/// Where ingested rows end up.
struct Target<'a> {
    table: Table,
    backend: BackendKind,
    script: Option<&'a Path>,
}

async fn ingest(config: &SeederConfig, target: Target<'_>, count: u64) -> anyhow::Result<()> {
    let generator = TableGenerator::new(target.table, config.seed)
        .with_limits(config.reservation_limits());
    load(target, generator, count).await
}

async fn ingest_tsv(target: Target<'_>, path: &Path, no_header: bool) -> anyhow::Result<()> {
    let source = TsvRecordSource::open(path, !no_header)?
        .with_expected_fields(target.table.columns().len());
    let count = source.records();
    load(target, source, count).await
}

async fn load<G>(target: Target<'_>, generator: G, count: u64) -> anyhow::Result<()>
where
    G: RecordGenerator,
{
    // reject bad quantities before a script file gets created
    let plan = BatchPlan::new(count)?;
    info!("Ingesting {} {} rows: {:?}", count, target.table, plan);

    let mut progress = ConsoleProgress::stdout();
    let start = Instant::now();

    let summary = match target.backend {
        BackendKind::Memory => {
            let store = InMemoryTable::new();
            let summary = run_batch_pipeline(generator, store.clone(), count, &mut progress).await?;
            info!("In-memory table holds {} rows", store.len().await);
            summary
        }
        BackendKind::SqlScript => {
            let path: PathBuf = target
                .script
                .map(Path::to_path_buf)
                .context("--script is required for the sql-script backend")?;
            let store = SqlScriptBackend::create(&path, target.table).await?;
            let result = run_batch_pipeline(generator, store.clone(), count, &mut progress).await;
            // statements of settled segments stay in the script even when the run fails
            let flushed = store.flush().await;
            let summary = result?;
            flushed?;
            info!("Insert statements written to {}", path.display());
            summary
        }
    };

    info!(
        "Inserted {} rows in {} batches / {} segments in {} ms",
        summary.inserted,
        summary.batches,
        summary.segments,
        start.elapsed().as_millis()
    );
    Ok(())
}
