use crate::cli::{
    actions::{server::Args, Action},
    commands::{ARG_APPLY_SCHEMA, ARG_DSN, ARG_MAX_CONNECTIONS, ARG_PORT},
};
use anyhow::{Context, Result};

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .cloned()
        .context("missing required argument: --dsn")?;
    let max_connections = matches
        .get_one::<u32>(ARG_MAX_CONNECTIONS)
        .copied()
        .unwrap_or(5);
    let apply_schema = matches.get_flag(ARG_APPLY_SCHEMA);

    Ok(Action::Server(Args {
        port,
        dsn,
        max_connections,
        apply_schema,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn builds_server_action() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec![
            "passgen",
            "--dsn",
            "postgres://passgen@localhost/passgen",
            "-p",
            "3000",
            "--max-connections",
            "8",
        ])?;

        let Action::Server(args) = handler(&matches)?;
        assert_eq!(args.port, 3000);
        assert_eq!(args.dsn, "postgres://passgen@localhost/passgen");
        assert_eq!(args.max_connections, 8);
        Ok(())
    }
}
