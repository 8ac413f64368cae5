use std::io;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bayesenum::common::setup::{init_logging, parse_configuration_options, CommandLineOptions};
use bayesenum::session::SessionSummary;
use bayesenum::{eprint_red, print_blue, print_yellow};
use bayesenum::{BayesianNetwork, InferenceEngine, Session};
use log::info;

fn main() -> ExitCode {
    let options = parse_configuration_options();
    init_logging();

    match run(&options) {
        // In batch mode a failed query is a failed run.
        Ok(summary) if options.is_batch() && summary.failed > 0 => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprint_red!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(options: &CommandLineOptions) -> Result<SessionSummary> {
    if !options.is_batch() {
        print_blue!("\nLoading file \"{}\"\n", options.network_file);
    }
    let network = BayesianNetwork::from_file(&options.network_file)
        .context("failed to load network")?;

    let engine = InferenceEngine::with_options(&network, options.enumeration_options());
    let mut session = Session::new(engine, options.format, options.precision);
    let mut stdout = io::stdout().lock();

    let summary = if options.is_batch() {
        session.run_queries(&options.queries, &mut stdout)?
    } else {
        print_yellow!(
            "Variables: {}. Enter a query such as \"X | Y = y\", or \"quit\".\n",
            network.declaration_order().join(", ")
        );
        session.run(io::stdin().lock(), &mut stdout)?
    };

    info!(
        "session finished: {} answered, {} failed",
        summary.answered, summary.failed
    );
    Ok(summary)
}
