/// Errors surfaced by the writer, the batch pipeline and the configuration layer.
#[derive(thiserror::Error)]
pub enum SeederError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Bulk insert failed in segment {segment}")]
    InsertFailure {
        segment: u64,
        #[source]
        source: anyhow::Error,
    },
    #[error("Reading records failed in segment {segment}")]
    SourceFailure {
        segment: u64,
        #[source]
        source: anyhow::Error,
    },
    #[error("Writing to the sink failed")]
    SinkWriteFailure(#[from] std::io::Error),
    #[error("Configuration could not be loaded")]
    Config(#[source] anyhow::Error),
}

impl SeederError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        SeederError::InvalidArgument(msg.into())
    }
}

impl std::fmt::Debug for SeederError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
