use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use log::debug;

use crate::common::errors::NetworkError;
use crate::common::setup::OutputFormat;
use crate::inference::{Distribution, InferenceEngine, Query};

/// Input line that ends the session.
pub const QUIT_COMMAND: &str = "quit";

/// Counts reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub answered: usize,
    pub failed: usize,
}

/// Reads query lines, answers each against one network, prints the result.
///
/// A query that fails (unknown variable, impossible evidence, ...) is
/// reported and the session moves on to the next line.
pub struct Session<'a> {
    engine: InferenceEngine<'a>,
    format: OutputFormat,
    precision: usize,
    summary: SessionSummary,
}

impl<'a> Session<'a> {
    pub fn new(engine: InferenceEngine<'a>, format: OutputFormat, precision: usize) -> Self {
        Session {
            engine,
            format,
            precision,
            summary: SessionSummary::default(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    /// Answers one line. Blank lines give `Ok(None)`.
    pub fn answer(&self, line: &str) -> Result<Option<Distribution>, NetworkError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let query: Query = line.parse()?;
        debug!("query: {}", query);
        self.engine.query(&query).map(Some)
    }

    pub fn render(&self, distribution: &Distribution) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(format!("{:.*}\n", self.precision, distribution)),
            OutputFormat::Json => distribution
                .to_json()
                .context("failed to serialize distribution"),
        }
    }

    /// Handles one line, writing the answer to `output`. Returns `false` once
    /// the quit command is seen.
    pub fn process_line<W: Write>(&mut self, line: &str, output: &mut W) -> Result<bool> {
        if line.trim() == QUIT_COMMAND {
            return Ok(false);
        }
        match self.answer(line) {
            Ok(Some(distribution)) => {
                writeln!(output, "{}", self.render(&distribution)?)?;
                output.flush()?;
                self.summary.answered += 1;
            }
            Ok(None) => {}
            Err(e) => {
                debug!("query '{}' failed: {}", line.trim(), e);
                crate::eprint_red!("error: {}", e);
                self.summary.failed += 1;
            }
        }
        Ok(true)
    }

    /// Runs until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> Result<SessionSummary> {
        for line in input.lines() {
            let line = line.context("failed to read query line")?;
            if !self.process_line(&line, output)? {
                break;
            }
        }
        Ok(self.summary)
    }

    /// Answers each query in turn, as if typed on separate lines.
    pub fn run_queries<W: Write>(&mut self, queries: &[String], output: &mut W) -> Result<SessionSummary> {
        for query in queries {
            if !self.process_line(query, output)? {
                break;
            }
        }
        Ok(self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::BayesianNetwork;

    const CHAIN: &str = "A true false\nB true false\n#\nB A\n#\nA\n0.3\nB\ntrue 0.8\nfalse 0.1\n";

    #[test]
    fn test_run_stops_at_quit() {
        let network = BayesianNetwork::from_definition(CHAIN).unwrap();
        let mut session = Session::new(InferenceEngine::new(&network), OutputFormat::Text, 2);
        let input = "B\n\nA | B = true\nquit\nA\n";
        let mut output = Vec::new();
        let summary = session.run(input.as_bytes(), &mut output).unwrap();

        assert_eq!(summary, SessionSummary { answered: 2, failed: 0 });
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "P(true) = 0.31, P(false) = 0.69\n\nP(true) = 0.77, P(false) = 0.23\n\n"
        );
    }

    #[test]
    fn test_failures_do_not_end_session() {
        let network = BayesianNetwork::from_definition(CHAIN).unwrap();
        let mut session = Session::new(InferenceEngine::new(&network), OutputFormat::Json, 4);
        let queries = vec!["Z".to_string(), "A | B = maybe".to_string(), "A".to_string()];
        let mut output = Vec::new();
        let summary = session.run_queries(&queries, &mut output).unwrap();

        assert_eq!(summary, SessionSummary { answered: 1, failed: 2 });
        let text = String::from_utf8(output).unwrap();
        let json: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(json["variable"], "A");
        assert_eq!(json["distribution"][0]["probability"], 0.3);
    }
}
