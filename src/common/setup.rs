use clap::{builder::EnumValueParser, Arg, ArgAction, Command, ValueEnum};
use env_logger::{Builder, Env};
use serde::Deserialize;
use std::ffi::OsString;
use std::io::Write;

use crate::inference::{EnumerationOptions, DEFAULT_PRECISION};

/// How each answered query is printed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize, ValueEnum)]
pub enum OutputFormat {
    /// `P(v1) = p1, P(v2) = p2, ...` followed by a blank line
    #[serde(rename = "text")]
    Text,

    /// One JSON object per line
    #[serde(rename = "json")]
    Json,
}

/// These options define the inputs from the user.
/// Everything is owned by basic data types so this can be passed around freely.
#[derive(Deserialize, Clone, Debug)]
pub struct CommandLineOptions {
    pub network_file: String,
    pub queries: Vec<String>,
    pub format: OutputFormat,
    pub precision: usize,
    pub exhaustive: bool,
}

impl CommandLineOptions {
    pub fn enumeration_options(&self) -> EnumerationOptions {
        EnumerationOptions {
            prune_unobserved_leaves: !self.exhaustive,
        }
    }

    /// Queries come from the command line instead of standard input.
    pub fn is_batch(&self) -> bool {
        !self.queries.is_empty()
    }
}

/// Logs go to stderr as `LEVEL [file:line] message`; `RUST_LOG` overrides
/// the default `warn` filter.
pub fn init_logging() {
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format(|buf, record| {
            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);
            writeln!(
                buf,
                "{} [{}:{}] {}",
                record.level(),
                file,
                line,
                record.args()
            )
        })
        .init();
}

fn command() -> Command {
    Command::new("bayesenum")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Exact inference in discrete Bayesian networks by enumeration.")
        .arg(
            Arg::new("network_file")
                .value_name("FILE")
                .help("Network definition file")
                .required(true),
        )
        .arg(
            Arg::new("query")
                .long("query")
                .short('q')
                .value_name("QUERY")
                .help("Answer this query (e.g. \"B | A = true\") instead of reading standard input; repeatable")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_parser(EnumValueParser::<OutputFormat>::new())
                .help("Output format: 'text' or 'json'")
                .default_value("text"),
        )
        .arg(
            Arg::new("precision")
                .long("precision")
                .value_name("DIGITS")
                .value_parser(clap::value_parser!(usize))
                .help("Decimal places printed for each probability"),
        )
        .arg(
            Arg::new("exhaustive")
                .long("exhaustive")
                .help("Sum over unobserved leaf variables instead of skipping them")
                .action(ArgAction::SetTrue),
        )
}

pub fn parse_configuration_options() -> CommandLineOptions {
    match parse_configuration_options_from(std::env::args_os()) {
        Ok(options) => options,
        Err(e) => e.exit(),
    }
}

pub fn parse_configuration_options_from<I, T>(args: I) -> Result<CommandLineOptions, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;

    let network_file = matches
        .get_one::<String>("network_file")
        .cloned()
        .unwrap_or_default(); // required, so clap has already rejected a missing one
    let queries = matches
        .get_many::<String>("query")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let format = matches
        .get_one::<OutputFormat>("format")
        .copied()
        .unwrap_or(OutputFormat::Text);
    let precision = matches
        .get_one::<usize>("precision")
        .copied()
        .unwrap_or(DEFAULT_PRECISION);
    let exhaustive = matches.get_flag("exhaustive");

    Ok(CommandLineOptions {
        network_file,
        queries,
        format,
        precision,
        exhaustive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = parse_configuration_options_from(["bayesenum", "alarm.bn"]).unwrap();
        assert_eq!(options.network_file, "alarm.bn");
        assert!(options.queries.is_empty());
        assert!(!options.is_batch());
        assert_eq!(options.format, OutputFormat::Text);
        assert_eq!(options.precision, DEFAULT_PRECISION);
        assert!(options.enumeration_options().prune_unobserved_leaves);
    }

    #[test]
    fn test_batch_queries_and_flags() {
        let options = parse_configuration_options_from([
            "bayesenum",
            "net.bn",
            "-q",
            "A",
            "--query",
            "B | A = true",
            "--format",
            "json",
            "--precision",
            "2",
            "--exhaustive",
        ])
        .unwrap();
        assert_eq!(options.queries, vec!["A".to_string(), "B | A = true".to_string()]);
        assert_eq!(options.format, OutputFormat::Json);
        assert_eq!(options.precision, 2);
        assert!(!options.enumeration_options().prune_unobserved_leaves);
    }

    #[test]
    fn test_missing_file_argument_rejected() {
        assert!(parse_configuration_options_from(["bayesenum"]).is_err());
        assert!(parse_configuration_options_from(["bayesenum", "x.bn", "--format", "xml"]).is_err());
    }
}
