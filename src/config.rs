use crate::domain::fake_rows::ReservationLimits;
use crate::domain::table::Table;
use crate::error::SeederError;
use crate::sink::DEFAULT_HIGH_WATER_MARK;
use crate::stream::LOGGING_STEP;
use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SeederConfig {
    pub logging_step: u64,
    pub high_water_mark: usize,
    pub max_users: u32,
    pub max_restaurants: u32,
    pub seed: Option<u64>,
    pub log_filter: String,
    pub service_name: String,
    pub otlp: bool,
}

impl Default for SeederConfig {
    fn default() -> Self {
        let limits = ReservationLimits::default();
        SeederConfig {
            logging_step: LOGGING_STEP,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            max_users: limits.max_users,
            max_restaurants: limits.max_restaurants,
            seed: None,
            log_filter: "info".to_string(),
            service_name: "record-seeder".to_string(),
            otlp: false,
        }
    }
}

impl SeederConfig {
    pub fn from_file(path: &Path) -> Result<Self, SeederError> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))
            .map_err(SeederError::Config)?;
        serde_json::from_str(&contents)
            .with_context(|| format!("could not parse {}", path.display()))
            .map_err(SeederError::Config)
    }

    /// Loads the file given on the command line (or the defaults) and applies CLI overrides.
    pub fn load(args: &CliArgs) -> Result<Self, SeederError> {
        let mut config = match &args.config {
            Some(path) => SeederConfig::from_file(path)?,
            None => SeederConfig::default(),
        };
        config.merge_cli(args);
        config.validate()?;
        Ok(config)
    }

    pub fn merge_cli(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.seed = Some(seed);
        }
        if args.otlp {
            self.otlp = true;
        }
    }

    pub fn validate(&self) -> Result<(), SeederError> {
        if self.logging_step == 0 {
            return Err(SeederError::invalid_argument("logging_step must be > 0"));
        }
        if self.high_water_mark == 0 {
            return Err(SeederError::invalid_argument("high_water_mark must be > 0"));
        }
        if self.max_users == 0 || self.max_restaurants == 0 {
            return Err(SeederError::invalid_argument(
                "max_users and max_restaurants must be > 0",
            ));
        }
        Ok(())
    }

    pub fn reservation_limits(&self) -> ReservationLimits {
        ReservationLimits {
            max_users: self.max_users,
            max_restaurants: self.max_restaurants,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Seed for reproducible output
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Export traces and metrics via OTLP
    #[arg(long, global = true)]
    pub otlp: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stream generated rows into a tab separated file
    Generate {
        #[arg(value_enum)]
        table: Table,
        #[arg(short = 'n', long)]
        count: u64,
        #[arg(short, long)]
        output: PathBuf,
        /// Leave out the column header line
        #[arg(long)]
        no_header: bool,
    },
    /// Bulk insert generated rows, or the rows of a TSV file, into a backend
    Ingest {
        #[arg(value_enum)]
        table: Table,
        /// Must be a multiple of 10
        #[arg(
            short = 'n',
            long,
            required_unless_present = "from_tsv",
            conflicts_with = "from_tsv"
        )]
        count: Option<u64>,
        /// Read the rows from a TSV file instead of generating them
        #[arg(long)]
        from_tsv: Option<PathBuf>,
        /// The TSV file has no column header line
        #[arg(long, requires = "from_tsv")]
        no_header: bool,
        #[arg(long, value_enum, default_value_t = BackendKind::Memory)]
        backend: BackendKind,
        /// Script file for the sql-script backend
        #[arg(long)]
        script: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    Memory,
    SqlScript,
}

#[cfg(test)]
mod test {
    use crate::config::{CliArgs, Command, SeederConfig};
    use crate::domain::table::Table;
    use crate::error::SeederError;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_load_json_config_with_defaults() {
        let json = r#"{ "logging_step": 500, "max_users": 10, "seed": 42 }"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", json).unwrap();

        let config = SeederConfig::from_file(file.path()).unwrap();

        assert_eq!(config.logging_step, 500);
        assert_eq!(config.max_users, 10);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.max_restaurants, 20_000);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_cli_overrides_and_validation() {
        let args = CliArgs::parse_from([
            "record-seeder",
            "--seed",
            "7",
            "generate",
            "users",
            "-n",
            "100",
            "-o",
            "users.tsv",
        ]);
        let config = SeederConfig::load(&args).unwrap();
        assert_eq!(config.seed, Some(7));
        assert!(matches!(
            args.command,
            Command::Generate {
                table: Table::Users,
                count: 100,
                ..
            }
        ));

        let broken = SeederConfig {
            high_water_mark: 0,
            ..SeederConfig::default()
        };
        assert!(matches!(
            broken.validate(),
            Err(SeederError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_ingest_from_tsv_takes_no_count() {
        let args = CliArgs::parse_from([
            "record-seeder",
            "ingest",
            "documents",
            "--from-tsv",
            "documents.tsv",
        ]);
        match args.command {
            Command::Ingest {
                table,
                count,
                from_tsv,
                no_header,
                ..
            } => {
                assert_eq!(table, Table::Documents);
                assert_eq!(count, None);
                assert_eq!(from_tsv.unwrap().to_str(), Some("documents.tsv"));
                assert!(!no_header);
            }
            other => panic!("unexpected command {:?}", other),
        }

        let both = CliArgs::try_parse_from([
            "record-seeder",
            "ingest",
            "users",
            "-n",
            "100",
            "--from-tsv",
            "users.tsv",
        ]);
        assert!(both.is_err());
        assert!(CliArgs::try_parse_from(["record-seeder", "ingest", "users"]).is_err());
    }

    #[test]
    fn test_unreadable_config_is_config_error() {
        let result = SeederConfig::from_file(std::path::Path::new("/does/not/exist.json"));
        assert!(matches!(result, Err(SeederError::Config(_))));
    }
}
