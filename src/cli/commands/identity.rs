use crate::identity::firebase::DEFAULT_IDENTITY_URL;
use clap::{builder::PossibleValuesParser, Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_IDENTITY: &str = "identity";
pub const ARG_FIREBASE_API_KEY: &str = "firebase-api-key";
pub const ARG_IDENTITY_URL: &str = "identity-url";

pub const IDENTITY_FIREBASE: &str = "firebase";
pub const IDENTITY_LOCAL: &str = "local";

#[derive(Debug, Clone)]
pub enum Options {
    Firebase { url: String, api_key: SecretString },
    Local,
}

impl Options {
    /// Parse identity provider arguments from matches.
    ///
    /// # Errors
    /// Returns an error if Firebase is selected without an API key.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        match matches
            .get_one::<String>(ARG_IDENTITY)
            .map_or(IDENTITY_FIREBASE, String::as_str)
        {
            IDENTITY_LOCAL => Ok(Self::Local),
            IDENTITY_FIREBASE => {
                let api_key = matches
                    .get_one::<String>(ARG_FIREBASE_API_KEY)
                    .cloned()
                    .filter(|v| !v.trim().is_empty())
                    .ok_or_else(|| {
                        anyhow::anyhow!("missing required argument: --{ARG_FIREBASE_API_KEY}")
                    })?;
                let url = matches
                    .get_one::<String>(ARG_IDENTITY_URL)
                    .cloned()
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_IDENTITY_URL.to_string());

                Ok(Self::Firebase {
                    url,
                    api_key: SecretString::from(api_key),
                })
            }
            other => anyhow::bail!("unknown identity provider: {other}"),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Firebase { .. } => IDENTITY_FIREBASE,
            Self::Local => IDENTITY_LOCAL,
        }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDENTITY)
                .long(ARG_IDENTITY)
                .help("Identity provider")
                .long_help(
                    "Identity provider. `local` keeps accounts in process memory and is meant for development.",
                )
                .env("TYRETRACK_IDENTITY")
                .default_value(IDENTITY_FIREBASE)
                .value_parser(PossibleValuesParser::new([IDENTITY_FIREBASE, IDENTITY_LOCAL])),
        )
        .arg(
            Arg::new(ARG_FIREBASE_API_KEY)
                .long(ARG_FIREBASE_API_KEY)
                .help("Firebase Web API key")
                .env("TYRETRACK_FIREBASE_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_IDENTITY_URL)
                .long(ARG_IDENTITY_URL)
                .help("Identity Toolkit REST base URL")
                .env("TYRETRACK_IDENTITY_URL")
                .default_value(DEFAULT_IDENTITY_URL),
        )
}
