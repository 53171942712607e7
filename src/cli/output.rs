//! Output formatting for CLI commands.

use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::args::{MailroomArgs, OutputFormat};
use crate::error::Result;
use crate::ml::{Category, ClassificationReport};
use crate::pipeline::{CategoryCount, RunObserver};

/// Result of labelling one text with the keyword rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizedText {
    pub category: Category,
    pub text: String,
}

/// Prints pipeline progress as it happens.
pub struct HumanObserver<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> HumanObserver<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// First write failure, if any.
    pub fn finish(self) -> Result<()> {
        match self.error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn write(&mut self, f: impl FnOnce(&mut W) -> io::Result<()>) {
        if self.error.is_none()
            && let Err(e) = f(&mut self.out)
        {
            self.error = Some(e);
        }
    }
}

impl<W: Write> RunObserver for HumanObserver<W> {
    fn on_distribution(&mut self, distribution: &[CategoryCount]) {
        self.write(|out| write_distribution(out, distribution));
    }

    fn on_report(&mut self, report: &ClassificationReport) {
        self.write(|out| {
            writeln!(out)?;
            writeln!(out, "Classification Report:")?;
            writeln!(out)?;
            write!(out, "{report}")
        });
    }

    fn on_saved(&mut self, path: &Path, _rows: usize) {
        self.write(|out| {
            writeln!(out)?;
            writeln!(out, "Predictions saved to {}", path.display())
        });
    }
}

/// Write label counts as an aligned two-column table.
pub fn write_distribution<W: Write>(out: &mut W, distribution: &[CategoryCount]) -> io::Result<()> {
    writeln!(out, "Category distribution:")?;
    let width = distribution
        .iter()
        .map(|c| c.category.as_str().len())
        .max()
        .unwrap_or_default();
    for entry in distribution {
        writeln!(
            out,
            "{:<width$}    {}",
            entry.category.as_str(),
            entry.count
        )?;
    }
    Ok(())
}

/// Write keyword labels for the given texts.
pub fn output_categorized(results: &[CategorizedText], args: &MailroomArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for result in results {
                writeln!(out, "{}\t{}", result.category, result.text)?;
            }
            Ok(())
        }
        OutputFormat::Json => output_json(results, args),
    }
}

/// Output a serializable result as JSON.
pub fn output_json<T: Serialize + ?Sized>(result: &T, args: &MailroomArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}
