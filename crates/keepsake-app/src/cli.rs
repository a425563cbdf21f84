#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parses args by hand. `KEEPSAKE_*` environment variables supply defaults
//! and explicit flags override them. Invalid environment values are ignored;
//! invalid flags are errors.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::process;

use keepsake_widgets::LetterPresentation;

use crate::app::{AppConfig, DEFAULT_REASONS_LIMIT};
use crate::navigation::{NavError, NavigationState};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
keepsake: a time-gated birthday surprise for the terminal

USAGE:
    keepsake [OPTIONS]

OPTIONS:
    --store=PATH          JSON document backing the surprise (default: keepsake.json)
    --store-url=URL       Fetch the document over HTTP(S) instead (http builds only)
    --route=ROUTE         Start on a route, e.g. / or /memories?from=dashboard
    --letter=STYLE        Letter presentation: 'slide' (default) or 'overlay'
    --reasons-limit=N     Reasons listed on the Reasons screen (default: 10)
    --seed=N              Seed the dashboard's random reason picker
    --exit-after-ms=N     Quit after N milliseconds
    --help, -h            Show this help message
    --version, -V         Show version

ROUTES:
    /            Countdown (leaves on its own at the unlock time)
    /welcome     Welcome
    /cake        Blow out the candle
    /card        The letter
    /reasons     Reasons
    /memories    Photo gallery
    /final       The Story of Us
    /dashboard   Keepsakes

KEYBINDINGS:
    Enter / n    Continue
    ?            Toggle help overlay
    q / Ctrl+C   Quit

ENVIRONMENT VARIABLES:
    KEEPSAKE_STORE            Override --store
    KEEPSAKE_STORE_URL        Override --store-url
    KEEPSAKE_ROUTE            Override --route
    KEEPSAKE_LETTER           Override --letter
    KEEPSAKE_REASONS_LIMIT    Override --reasons-limit
    KEEPSAKE_SEED             Override --seed
    KEEPSAKE_EXIT_AFTER_MS    Override --exit-after-ms
    KEEPSAKE_LOG              Log filter (default: info)
    KEEPSAKE_LOG_FILE         Write logs to this file (logging is off otherwise)
    KEEPSAKE_DEBUG_TRACE      Set to 1 for runtime traces on stderr";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub store: PathBuf,
    pub store_url: Option<String>,
    pub start: NavigationState,
    pub letter: LetterPresentation,
    pub reasons_limit: usize,
    pub seed: Option<u64>,
    /// Auto-exit after this many milliseconds (0 = disabled).
    pub exit_after_ms: u64,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            store: PathBuf::from("keepsake.json"),
            store_url: None,
            start: NavigationState::default(),
            letter: LetterPresentation::Slide,
            reasons_limit: DEFAULT_REASONS_LIMIT,
            seed: None,
            exit_after_ms: 0,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(Opts),
    Help,
    Version,
}

/// A rejected flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    InvalidValue { flag: &'static str, value: String },
    InvalidRoute(NavError),
    UnknownArgument(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidValue { flag, value } => write!(f, "Invalid {flag} value: {value}"),
            CliError::InvalidRoute(err) => write!(f, "Invalid --route: {err}"),
            CliError::UnknownArgument(arg) => write!(f, "Unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for CliError {}

fn parse_letter(value: &str) -> Option<LetterPresentation> {
    match value {
        "slide" => Some(LetterPresentation::Slide),
        "overlay" => Some(LetterPresentation::Overlay),
        _ => None,
    }
}

fn invalid(flag: &'static str, value: &str) -> CliError {
    CliError::InvalidValue {
        flag,
        value: value.to_string(),
    }
}

impl Opts {
    /// Parse the process arguments and environment.
    ///
    /// Prints help or version and exits when asked to; prints the error and
    /// exits with status 1 on a bad flag.
    pub fn parse() -> Self {
        match Self::parse_from(|key| env::var(key).ok(), env::args().skip(1)) {
            Ok(Command::Run(opts)) => opts,
            Ok(Command::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Command::Version) => {
                println!("keepsake {VERSION}");
                process::exit(0);
            }
            Err(err) => {
                eprintln!("{err}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse from an environment lookup and an argument list.
    pub fn parse_from<E, I>(env: E, args: I) -> Result<Command, CliError>
    where
        E: Fn(&str) -> Option<String>,
        I: IntoIterator<Item = String>,
    {
        let mut opts = Self::default();

        // Environment first; bad values fall back to the default.
        if let Some(val) = env("KEEPSAKE_STORE") {
            opts.store = PathBuf::from(val);
        }
        if let Some(val) = env("KEEPSAKE_STORE_URL") {
            opts.store_url = Some(val);
        }
        if let Some(val) = env("KEEPSAKE_ROUTE")
            && let Ok(start) = NavigationState::from_route(&val)
        {
            opts.start = start;
        }
        if let Some(val) = env("KEEPSAKE_LETTER")
            && let Some(letter) = parse_letter(&val)
        {
            opts.letter = letter;
        }
        if let Some(val) = env("KEEPSAKE_REASONS_LIMIT")
            && let Ok(n) = val.parse()
        {
            opts.reasons_limit = n;
        }
        if let Some(val) = env("KEEPSAKE_SEED")
            && let Ok(n) = val.parse()
        {
            opts.seed = Some(n);
        }
        if let Some(val) = env("KEEPSAKE_EXIT_AFTER_MS")
            && let Ok(n) = val.parse()
        {
            opts.exit_after_ms = n;
        }

        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Command::Help),
                "--version" | "-V" => return Ok(Command::Version),
                other => {
                    if let Some(val) = other.strip_prefix("--store=") {
                        opts.store = PathBuf::from(val);
                    } else if let Some(val) = other.strip_prefix("--store-url=") {
                        opts.store_url = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--route=") {
                        opts.start =
                            NavigationState::from_route(val).map_err(CliError::InvalidRoute)?;
                    } else if let Some(val) = other.strip_prefix("--letter=") {
                        opts.letter = parse_letter(val).ok_or_else(|| invalid("--letter", val))?;
                    } else if let Some(val) = other.strip_prefix("--reasons-limit=") {
                        opts.reasons_limit =
                            val.parse().map_err(|_| invalid("--reasons-limit", val))?;
                    } else if let Some(val) = other.strip_prefix("--seed=") {
                        opts.seed = Some(val.parse().map_err(|_| invalid("--seed", val))?);
                    } else if let Some(val) = other.strip_prefix("--exit-after-ms=") {
                        opts.exit_after_ms =
                            val.parse().map_err(|_| invalid("--exit-after-ms", val))?;
                    } else {
                        return Err(CliError::UnknownArgument(other.to_string()));
                    }
                }
            }
        }

        Ok(Command::Run(opts))
    }

    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            start: self.start,
            letter: self.letter,
            reasons_limit: self.reasons_limit,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{ReturnContext, ScreenId};
    use pretty_assertions::assert_eq;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn run(cmd: Result<Command, CliError>) -> Opts {
        match cmd {
            Ok(Command::Run(opts)) => opts,
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn default_opts() {
        let opts = run(Opts::parse_from(no_env, args(&[])));
        assert_eq!(opts, Opts::default());
        assert_eq!(opts.store, PathBuf::from("keepsake.json"));
        assert_eq!(opts.reasons_limit, 10);
        assert_eq!(opts.exit_after_ms, 0);
    }

    #[test]
    fn flags_override_env() {
        let env = |key: &str| match key {
            "KEEPSAKE_LETTER" => Some("overlay".to_string()),
            "KEEPSAKE_SEED" => Some("3".to_string()),
            "KEEPSAKE_REASONS_LIMIT" => Some("5".to_string()),
            _ => None,
        };
        let opts = run(Opts::parse_from(env, args(&["--seed=9", "--letter=slide"])));
        assert_eq!(opts.seed, Some(9));
        assert_eq!(opts.letter, LetterPresentation::Slide);
        assert_eq!(opts.reasons_limit, 5);
    }

    #[test]
    fn invalid_env_value_is_ignored() {
        let env = |key: &str| (key == "KEEPSAKE_REASONS_LIMIT").then(|| "lots".to_string());
        assert_eq!(run(Opts::parse_from(env, args(&[]))).reasons_limit, 10);
    }

    #[test]
    fn route_with_context() {
        let opts = run(Opts::parse_from(
            no_env,
            args(&["--route=/memories?from=dashboard"]),
        ));
        assert_eq!(opts.start.current, ScreenId::Memories);
        assert_eq!(opts.start.return_context, Some(ReturnContext::Dashboard));
        assert_eq!(opts.app_config().start, opts.start);
    }

    #[test]
    fn route_context_on_a_linear_screen_is_rejected() {
        assert!(matches!(
            Opts::parse_from(no_env, args(&["--route=/welcome?from=dashboard"])),
            Err(CliError::InvalidRoute(NavError::UnknownRoute(_)))
        ));
        let env = |key: &str| {
            (key == "KEEPSAKE_ROUTE").then(|| "/reasons?from=dashboard".to_string())
        };
        let opts = run(Opts::parse_from(env, args(&[])));
        assert_eq!(opts.start, NavigationState::default());
    }

    #[test]
    fn bad_flags_are_errors() {
        assert_eq!(
            Opts::parse_from(no_env, args(&["--letter=scroll"])),
            Err(CliError::InvalidValue {
                flag: "--letter",
                value: "scroll".into()
            })
        );
        assert!(matches!(
            Opts::parse_from(no_env, args(&["--route=/nope"])),
            Err(CliError::InvalidRoute(_))
        ));
        assert_eq!(
            Opts::parse_from(no_env, args(&["--frobnicate"])),
            Err(CliError::UnknownArgument("--frobnicate".into()))
        );
    }

    #[test]
    fn help_and_version() {
        assert_eq!(Opts::parse_from(no_env, args(&["-h"])), Ok(Command::Help));
        assert_eq!(
            Opts::parse_from(no_env, args(&["--version"])),
            Ok(Command::Version)
        );
        assert!(HELP_TEXT.contains("KEEPSAKE_STORE"));
        assert!(!VERSION.is_empty());
    }
}
