//! Command-line argument dispatch.
//!
//! Validated matches are mapped to an [`Action`] carrying the backend
//! selections the server needs.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{identity, session, store};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    crate::cli::commands::validate(matches).map_err(|e| anyhow::anyhow!(e))?;

    Ok(Action::Server(Args {
        port,
        store: store::Options::parse(matches)?,
        identity: identity::Options::parse(matches)?,
        session: session::Options::parse(matches),
    }))
}
