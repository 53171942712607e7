//! Command implementations for the Mailroom CLI.

use std::io;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::Result;
use crate::ml::categorize;
use crate::pipeline::{self, NoopObserver};

/// Execute a CLI command.
pub fn execute_command(args: MailroomArgs) -> Result<()> {
    match &args.command {
        Command::Run(run_args) => run_pipeline(run_args, &args),
        Command::Categorize(categorize_args) => categorize_texts(categorize_args, &args),
    }
}

/// Run the full pipeline and report on stdout.
fn run_pipeline(args: &RunArgs, cli_args: &MailroomArgs) -> Result<()> {
    let config = args.to_config();

    match cli_args.output_format {
        OutputFormat::Human => {
            let mut observer = HumanObserver::new(io::stdout());
            pipeline::run(&config, &mut observer)?;
            observer.finish()
        }
        OutputFormat::Json => {
            let summary = pipeline::run(&config, &mut NoopObserver)?;
            output_json(&summary, cli_args)
        }
    }
}

/// Label each text with the keyword rules.
fn categorize_texts(args: &CategorizeArgs, cli_args: &MailroomArgs) -> Result<()> {
    let results: Vec<CategorizedText> = args
        .texts
        .iter()
        .map(|text| CategorizedText {
            category: categorize(text),
            text: text.clone(),
        })
        .collect();

    output_categorized(&results, cli_args)
}
