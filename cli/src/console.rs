//! Verbosity-gated console sink and `core::error::Error` -> process exit
//! code mapping (`spec.md` §6.6). `main` is the only place that calls
//! `std::process::exit`; `core` never does.

use desflow_core::error::Error;
use log::LevelFilter;

/// The three console verbosity levels named in §6.6: quiet (errors only),
/// normal (the default — warnings and results), and verbose (everything
/// `core` logs at debug/trace through the `log` facade).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Verbosity::Normal,
            _ => Verbosity::Verbose,
        }
    }

    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Error,
            Verbosity::Normal => LevelFilter::Warn,
            Verbosity::Verbose => LevelFilter::Trace,
        }
    }
}

/// Install `env_logger` at the level implied by `verbosity`. Called once
/// from `main` before any subcommand runs.
pub fn init_logging(verbosity: Verbosity) {
    env_logger::Builder::new()
        .filter_level(verbosity.level_filter())
        .format_timestamp(None)
        .init();
}

/// Print an error the way a quiet-mode console still wants to see it, and
/// return the process exit code §6.6 assigns it: `0` never reaches here
/// (success doesn't call this), cancellation is its own code, everything
/// else collapses to the generic failure code `1`.
pub fn report_and_exit_code(err: &Error) -> i32 {
    eprintln!("desflow: error: {err}");
    if err.is_cancelled() {
        130 // conventional SIGINT-style code for a cancelled run
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_escalates_with_repeated_flag() {
        assert_eq!(Verbosity::from_count(0), Verbosity::Normal);
        assert_eq!(Verbosity::from_count(1), Verbosity::Verbose);
        assert_eq!(Verbosity::from_count(5), Verbosity::Verbose);
    }

    #[test]
    fn cancelled_error_maps_to_its_own_code() {
        assert_eq!(report_and_exit_code(&Error::cancelled()), 130);
        assert_eq!(report_and_exit_code(&Error::tau_loop()), 1);
    }
}
