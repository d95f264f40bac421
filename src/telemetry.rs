use anyhow::Context;
use opentelemetry::{global, KeyValue};
use opentelemetry_otlp::{ExportConfig, WithExportConfig};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::{runtime, Resource};
use std::sync::OnceLock;
use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_log::LogTracer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Ensures that the `tracing` stack is only initialised once
pub fn init_test_tracing() {
    static TRACING: OnceLock<()> = OnceLock::new();
    TRACING.get_or_init(|| {
        let default_filter_level = "info".to_string();
        let subscriber_name = "record_seeder_test".to_string();

        let result = if std::env::var("TEST_LOG").is_ok_and(|x| x.to_lowercase().contains("true"))
        {
            get_subscriber(subscriber_name, default_filter_level, std::io::stdout, false)
                .and_then(init_tracing_with_subscriber)
        } else {
            get_subscriber(subscriber_name, default_filter_level, std::io::sink, false)
                .and_then(init_tracing_with_subscriber)
        };
        if let Err(e) = result {
            eprintln!("test tracing not initialised: {:#}", e);
        }
    });
}

/// Compose multiple layers into a `tracing`'s subscriber.
/// set level via env variable "RUST_LOG", `env_filter` is the fallback.
/// With `otlp` enabled spans are additionally exported to the OTLP endpoint
/// configured through the usual `OTEL_EXPORTER_OTLP_*` variables.
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: String,
    sink: Sink,
    otlp: bool,
) -> anyhow::Result<impl Subscriber + Send + Sync>
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    // layer to output to i.e stout
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(sink)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::CLOSE);

    let telemetry_layer = if otlp {
        global::set_text_map_propagator(TraceContextPropagator::new());
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(
                opentelemetry_sdk::trace::config()
                    .with_sampler(opentelemetry_sdk::trace::Sampler::AlwaysOn)
                    .with_resource(Resource::new(vec![KeyValue::new(
                        opentelemetry_semantic_conventions::resource::SERVICE_NAME,
                        name,
                    )])),
            )
            .install_batch(runtime::Tokio)
            .context("Couldn't create OTLP tracer")?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));

    Ok(tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(telemetry_layer))
}

/// inits a meter provider exporting to the OTLP endpoint
pub fn init_metrics(meter_name: String) -> anyhow::Result<SdkMeterProvider> {
    let provider = opentelemetry_otlp::new_pipeline()
        .metrics(runtime::Tokio)
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_export_config(ExportConfig::default()),
        )
        .with_resource(Resource::new(vec![KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            meter_name,
        )]))
        .build()
        .context("Couldn't create OTLP meter provider")?;

    global::set_meter_provider(provider.clone());
    Ok(provider)
}

/// Register a subscriber as global default to process span data.
///
/// It should only be called once!
pub fn init_tracing_with_subscriber(
    subscriber: impl Subscriber + Send + Sync,
) -> anyhow::Result<()> {
    // Redirect all `log`'s events to subscriber
    LogTracer::init().context("Failed to set logger")?;
    set_global_default(subscriber).context("Failed to set subscriber")?;
    Ok(())
}
