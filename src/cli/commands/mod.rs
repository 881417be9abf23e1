pub mod identity;
pub mod logging;
pub mod session;
pub mod store;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

use self::{
    identity::{ARG_FIREBASE_API_KEY, ARG_IDENTITY, IDENTITY_FIREBASE},
    store::{ARG_DSN, ARG_FIRESTORE_PROJECT, ARG_STORE, STORE_FIRESTORE, STORE_POSTGRES},
};

/// Check that the selected backends have the settings they need.
///
/// # Errors
/// Returns an error string naming the first missing argument.
pub fn validate(matches: &clap::ArgMatches) -> Result<(), String> {
    let is_set = |id: &str| {
        matches
            .get_one::<String>(id)
            .is_some_and(|v| !v.trim().is_empty())
    };
    let selected = |id: &str| matches.get_one::<String>(id).map(String::as_str);

    match selected(ARG_STORE) {
        Some(STORE_FIRESTORE) if !is_set(ARG_FIRESTORE_PROJECT) => {
            return Err(format!(
                "Missing required argument: --{ARG_FIRESTORE_PROJECT} (required for the firestore store)"
            ));
        }
        Some(STORE_POSTGRES) if !is_set(ARG_DSN) => {
            return Err(format!(
                "Missing required argument: --{ARG_DSN} (required for the postgres store)"
            ));
        }
        _ => {}
    }

    if selected(ARG_IDENTITY) == Some(IDENTITY_FIREBASE) && !is_set(ARG_FIREBASE_API_KEY) {
        return Err(format!(
            "Missing required argument: --{ARG_FIREBASE_API_KEY} (required for the firebase identity provider)"
        ));
    }

    Ok(())
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("tyretrack")
        .about("Vehicle and tyre maintenance tracker")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("TYRETRACK_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = store::with_args(command);
    let command = identity::with_args(command);
    let command = session::with_args(command);
    logging::with_args(command)
}
