//! Invocation parameters → immutable session configuration.
//!
//! The command line follows the Go `flag` conventions the tool has always
//! used: a bare sub-command name first, then single-dash long flags
//! (`-timeout=60`, `-max-depth 5`). Those flags are rewritten to their
//! double-dash form and parsed with clap.
//!
//! Nothing here validates beyond types and defaults. Once built, a
//! [`Config`] is only ever handed out by shared reference.

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};

// ============================================================================
// DEFAULTS
// ============================================================================

/// Environment file read by the analysis engine when none is given.
pub const DEFAULT_ENV_PATH: &str = "./.env";

/// Per-step scan timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Maximum recursion / crawl depth.
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Layout of the generated analysis ID: YYMMDD_HHMM.
const ANALYSIS_ID_FORMAT: &str = "%y%m%d_%H%M";

// ============================================================================
// CLI SURFACE
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "blobphish")]
#[command(about = "Interactive front end for phishing and threat analysis")]
#[command(version)]
struct Cli {
    /// Sub-command to run (e.g. scan)
    command: Option<String>,

    /// Analysis ID (default: YYMMDD_HHMM)
    #[arg(long)]
    id: Option<String>,

    /// Path to .env file
    #[arg(long = "env", value_name = "PATH", default_value = DEFAULT_ENV_PATH)]
    env_path: PathBuf,

    /// Enable verbose output
    #[arg(
        long,
        action = ArgAction::Set,
        value_parser = parse_go_bool,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    verbose: bool,

    /// Input file path
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output file path
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Comma-separated email addresses
    #[arg(long, value_name = "LIST")]
    emails: Option<String>,

    /// Comma-separated IP addresses
    #[arg(long, value_name = "LIST")]
    ips: Option<String>,

    /// Comma-separated URLs
    #[arg(long, value_name = "LIST")]
    urls: Option<String>,

    /// Comma-separated webpage URLs
    #[arg(long, value_name = "LIST")]
    webpages: Option<String>,

    /// Combine multiple threats
    #[arg(
        long,
        action = ArgAction::Set,
        value_parser = parse_go_bool,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    combine: bool,

    /// Use active reconnaissance
    #[arg(
        long = "active_recon",
        action = ArgAction::Set,
        value_parser = parse_go_bool,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    active_recon: bool,

    /// Scan timeout in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Maximum scan depth
    #[arg(long = "max-depth", value_name = "DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: u32,
}

// ============================================================================
// CONFIGURATION RECORD
// ============================================================================

/// One of the four target categories accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Emails,
    Ips,
    Urls,
    Webpages,
}

impl TargetKind {
    /// Every category, in the order workflows visit them.
    pub const ALL: [TargetKind; 4] = [
        TargetKind::Emails,
        TargetKind::Ips,
        TargetKind::Urls,
        TargetKind::Webpages,
    ];

    /// Human label for a group of targets of this kind.
    pub fn label(self) -> &'static str {
        match self {
            TargetKind::Emails => "email addresses",
            TargetKind::Ips => "IP addresses",
            TargetKind::Urls => "URLs",
            TargetKind::Webpages => "webpages",
        }
    }
}

/// Session configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Analysis identifier; generated from the clock when not supplied.
    pub id: String,
    pub env_path: PathBuf,
    pub verbose: bool,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    /// Raw comma-separated lists, exactly as given.
    pub emails: String,
    pub ips: String,
    pub urls: String,
    pub webpages: String,
    pub combine: bool,
    pub active_recon: bool,
    pub timeout_secs: u64,
    pub max_depth: u32,
    /// Sub-command name; empty when none was given.
    pub command: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            id: default_analysis_id(),
            env_path: PathBuf::from(DEFAULT_ENV_PATH),
            verbose: false,
            input: None,
            output: None,
            emails: String::new(),
            ips: String::new(),
            urls: String::new(),
            webpages: String::new(),
            combine: false,
            active_recon: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_depth: DEFAULT_MAX_DEPTH,
            command: String::new(),
        }
    }
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            id: cli.id.unwrap_or_else(default_analysis_id),
            env_path: cli.env_path,
            verbose: cli.verbose,
            input: cli.input,
            output: cli.output,
            emails: cli.emails.unwrap_or_default(),
            ips: cli.ips.unwrap_or_default(),
            urls: cli.urls.unwrap_or_default(),
            webpages: cli.webpages.unwrap_or_default(),
            combine: cli.combine,
            active_recon: cli.active_recon,
            timeout_secs: cli.timeout,
            max_depth: cli.max_depth,
            command: cli.command.unwrap_or_default(),
        }
    }
}

impl Config {
    /// Parse a full argument vector (program name first).
    ///
    /// With no arguments beyond the program name the result holds only
    /// defaults.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = normalize_flags(args);
        if args.len() < 2 {
            return Ok(Config::default());
        }
        Cli::try_parse_from(args).map(Config::from)
    }

    /// Parse the process arguments, terminating on malformed input.
    ///
    /// Help and version requests exit 0. Any other parse failure prints
    /// the error, then usage on stdout, and exits with status 1.
    pub fn from_args() -> Self {
        match Self::try_parse_from(std::env::args_os()) {
            Ok(config) => config,
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
                _ => {
                    eprint!("{}", err);
                    println!("{}", Cli::command().render_help());
                    std::process::exit(1);
                }
            },
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Split one category's list into trimmed, non-empty entries.
    pub fn target_list(&self, kind: TargetKind) -> Vec<&str> {
        let raw = match kind {
            TargetKind::Emails => &self.emails,
            TargetKind::Ips => &self.ips,
            TargetKind::Urls => &self.urls,
            TargetKind::Webpages => &self.webpages,
        };
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect()
    }

    /// Whether the configured environment file exists.
    pub fn env_file_present(&self) -> bool {
        self.env_path.is_file()
    }
}

/// Analysis ID derived from the local clock.
pub fn default_analysis_id() -> String {
    Local::now().format(ANALYSIS_ID_FORMAT).to_string()
}

// ============================================================================
// GO-STYLE FLAG NORMALIZATION
// ============================================================================

/// Rewrite `-name[=value]` to `--name[=value]` ahead of a `--` terminator.
///
/// Single-character flags (`-h`, `-V`) and a lone `-` are left alone.
fn normalize_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut terminated = false;
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            let arg: OsString = arg.into();
            if i == 0 || terminated {
                return arg;
            }
            match arg.to_str() {
                Some("--") => {
                    terminated = true;
                    arg
                }
                Some(flag) if is_single_dash_long_flag(flag) => OsString::from(format!("-{flag}")),
                _ => arg,
            }
        })
        .collect()
}

/// Boolean spellings accepted by Go's `strconv.ParseBool`.
fn parse_go_bool(value: &str) -> Result<bool, String> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        other => Err(format!("invalid boolean value '{other}'")),
    }
}

fn is_single_dash_long_flag(arg: &str) -> bool {
    match arg.strip_prefix('-') {
        Some(rest) if !rest.starts_with('-') => {
            let name = rest.split('=').next().unwrap_or_default();
            name.chars().count() > 1
        }
        _ => false,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn parse(args: &[&str]) -> Config {
        Config::try_parse_from(args.iter().copied()).expect("arguments should parse")
    }

    #[test]
    fn no_subcommand_yields_defaults() {
        let config = parse(&["blobphish"]);
        assert_eq!(config.command, "");
        assert_eq!(config.timeout_secs, 300);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.env_path, PathBuf::from("./.env"));
        assert!(!config.verbose);
        assert!(config.input.is_none());
        assert!(config.emails.is_empty());
    }

    #[test]
    fn empty_argument_vector_yields_defaults() {
        let config = Config::try_parse_from(Vec::<String>::new()).unwrap();
        assert_eq!(config.command, "");
        assert_eq!(config.timeout(), Duration::from_secs(300));
    }

    #[test]
    fn scan_with_go_style_flags() {
        let config = parse(&[
            "blobphish",
            "scan",
            "-timeout=60",
            "-max-depth=5",
            "-emails=a@x.com,b@y.com",
        ]);
        assert_eq!(config.command, "scan");
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.emails, "a@x.com,b@y.com");
    }

    #[test]
    fn space_separated_and_double_dash_values() {
        let config = parse(&["blobphish", "scan", "-max-depth", "7", "--ips", "10.0.0.1"]);
        assert_eq!(config.max_depth, 7);
        assert_eq!(config.ips, "10.0.0.1");
    }

    #[test]
    fn boolean_flags_accept_bare_and_explicit_forms() {
        let config = parse(&["blobphish", "scan", "-verbose", "-combine=false", "-active_recon"]);
        assert!(config.verbose);
        assert!(!config.combine);
        assert!(config.active_recon);
    }

    #[test]
    fn boolean_flags_accept_go_spellings() {
        let config = parse(&["blobphish", "scan", "-verbose=0", "-combine=T", "-active_recon=1"]);
        assert!(!config.verbose);
        assert!(config.combine);
        assert!(config.active_recon);

        let config = parse(&["blobphish", "scan", "-verbose=TRUE", "-combine=f"]);
        assert!(config.verbose);
        assert!(!config.combine);
    }

    #[test]
    fn unrecognised_boolean_is_an_error() {
        let err = Config::try_parse_from(["blobphish", "scan", "-verbose=yes"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn path_flags_are_captured() {
        let config = parse(&[
            "blobphish",
            "scan",
            "-env=/etc/blobphish.env",
            "-input=targets.txt",
            "-output=report.json",
        ]);
        assert_eq!(config.env_path, PathBuf::from("/etc/blobphish.env"));
        assert_eq!(config.input, Some(PathBuf::from("targets.txt")));
        assert_eq!(config.output, Some(PathBuf::from("report.json")));
    }

    #[test]
    fn explicit_id_is_kept() {
        let config = parse(&["blobphish", "scan", "-id=case-42"]);
        assert_eq!(config.id, "case-42");
    }

    #[test]
    fn generated_id_has_date_and_time_parts() {
        let id = default_analysis_id();
        assert_eq!(id.len(), 11);
        assert_eq!(id.as_bytes()[6], b'_');
        assert!(id.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn malformed_integer_is_an_error() {
        let err = Config::try_parse_from(["blobphish", "scan", "-timeout=soon"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn negative_depth_is_an_error() {
        assert!(Config::try_parse_from(["blobphish", "scan", "-max-depth=-1"]).is_err());
    }

    #[test]
    fn unknown_flag_is_an_error() {
        let err = Config::try_parse_from(["blobphish", "scan", "-bogus"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn normalization_skips_short_flags_and_terminator_tail() {
        let args = normalize_flags(["blobphish", "-h", "-timeout=1", "--", "-raw"]);
        let args: Vec<_> = args.iter().map(|a| a.to_str().unwrap()).collect();
        assert_eq!(args, vec!["blobphish", "-h", "--timeout=1", "--", "-raw"]);
    }

    #[test]
    fn target_list_trims_and_drops_empty_entries() {
        let config = Config {
            urls: " https://a.example , ,https://b.example,".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.target_list(TargetKind::Urls),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.target_list(TargetKind::Emails).is_empty());
    }

    #[test]
    fn env_file_presence_is_checked_on_disk() {
        let file = NamedTempFile::new().unwrap();
        let present = Config {
            env_path: file.path().to_path_buf(),
            ..Config::default()
        };
        assert!(present.env_file_present());

        let missing = Config {
            env_path: file.path().with_extension("missing"),
            ..Config::default()
        };
        assert!(!missing.env_file_present());
    }
}
