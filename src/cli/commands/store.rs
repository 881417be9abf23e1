use crate::store::{firestore::DEFAULT_DATABASE, firestore::DEFAULT_FIRESTORE_URL};
use clap::{builder::PossibleValuesParser, Arg, ArgMatches, Command};

pub const ARG_STORE: &str = "store";
pub const ARG_FIRESTORE_PROJECT: &str = "firestore-project";
pub const ARG_FIRESTORE_DATABASE: &str = "firestore-database";
pub const ARG_FIRESTORE_URL: &str = "firestore-url";
pub const ARG_DSN: &str = "dsn";

pub const STORE_MEMORY: &str = "memory";
pub const STORE_FIRESTORE: &str = "firestore";
pub const STORE_POSTGRES: &str = "postgres";

/// Which vehicle store to run against, with its connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Options {
    Memory,
    Firestore {
        url: String,
        project: String,
        database: String,
    },
    Postgres {
        dsn: String,
    },
}

impl Options {
    /// Parse store arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the selected backend is missing its settings.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let get_non_empty = |id: &str| {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };
        let read_required = |id: &str| -> anyhow::Result<String> {
            get_non_empty(id).ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        match matches
            .get_one::<String>(ARG_STORE)
            .map_or(STORE_FIRESTORE, String::as_str)
        {
            STORE_MEMORY => Ok(Self::Memory),
            STORE_POSTGRES => Ok(Self::Postgres {
                dsn: read_required(ARG_DSN)?,
            }),
            STORE_FIRESTORE => Ok(Self::Firestore {
                url: get_non_empty(ARG_FIRESTORE_URL)
                    .unwrap_or_else(|| DEFAULT_FIRESTORE_URL.to_string()),
                project: read_required(ARG_FIRESTORE_PROJECT)?,
                database: get_non_empty(ARG_FIRESTORE_DATABASE)
                    .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            }),
            other => anyhow::bail!("unknown store: {other}"),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Memory => STORE_MEMORY,
            Self::Firestore { .. } => STORE_FIRESTORE,
            Self::Postgres { .. } => STORE_POSTGRES,
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_STORE)
                .long(ARG_STORE)
                .help("Vehicle store backend")
                .env("TYRETRACK_STORE")
                .default_value(STORE_FIRESTORE)
                .value_parser(PossibleValuesParser::new([
                    STORE_MEMORY,
                    STORE_FIRESTORE,
                    STORE_POSTGRES,
                ])),
        )
        .arg(
            Arg::new(ARG_FIRESTORE_PROJECT)
                .long(ARG_FIRESTORE_PROJECT)
                .help("Google Cloud project holding the Firestore database")
                .env("TYRETRACK_FIRESTORE_PROJECT"),
        )
        .arg(
            Arg::new(ARG_FIRESTORE_DATABASE)
                .long(ARG_FIRESTORE_DATABASE)
                .help("Firestore database id")
                .env("TYRETRACK_FIRESTORE_DATABASE")
                .default_value(DEFAULT_DATABASE),
        )
        .arg(
            Arg::new(ARG_FIRESTORE_URL)
                .long(ARG_FIRESTORE_URL)
                .help("Firestore REST base URL")
                .env("TYRETRACK_FIRESTORE_URL")
                .default_value(DEFAULT_FIRESTORE_URL),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long(ARG_DSN)
                .help("Database connection string (postgres store)")
                .env("TYRETRACK_DSN"),
        )
}
