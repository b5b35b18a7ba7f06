//! Log output for the `linkcart` binary.
//!
//! Events go to stderr so `list` output on stdout stays machine-readable.
//! `RUST_LOG` wins over `LINKCART_LOG`; with neither set, [`DEFAULT_FILTER`] applies.

use std::io::IsTerminal as _;

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

/// Used when no filter variable is set: our own events at info, dependencies only when they warn.
pub const DEFAULT_FILTER: &str = "warn,linkcart=info";

pub const LOG_ENV: &str = "LINKCART_LOG";

pub fn init() -> anyhow::Result<()> {
    let directives = filter_directives(|key| std::env::var(key).ok());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("build log filter from {directives:?}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}

fn filter_directives(lookup: impl Fn(&str) -> Option<String>) -> String {
    [EnvFilter::DEFAULT_ENV, LOG_ENV]
        .into_iter()
        .filter_map(|key| lookup(key))
        .map(|value| value.trim().to_owned())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_owned())
        }
    }

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        assert_eq!(filter_directives(lookup(&[])), DEFAULT_FILTER);
    }

    #[test]
    fn rust_log_takes_precedence_over_linkcart_log() {
        let vars = [("RUST_LOG", "debug"), ("LINKCART_LOG", "linkcart=trace")];
        assert_eq!(filter_directives(lookup(&vars)), "debug");
    }

    #[test]
    fn blank_rust_log_falls_through() {
        let vars = [("RUST_LOG", "  "), ("LINKCART_LOG", "linkcart=trace")];
        assert_eq!(filter_directives(lookup(&vars)), "linkcart=trace");
    }
}
