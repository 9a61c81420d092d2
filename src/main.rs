use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use clap::Parser;

use linemerge::{
    amend_line, cli::Cli, DecisionSource, Difference, DiffFormatter, FixedSource, MergeWorkflow,
    PromptSource, Resolution, ScriptedSource,
};

static INTERRUPT: Interrupt = Interrupt::new();

/// Ctrl-C state. While files are being written the interrupt is held back
/// so temporary files are always renamed or cleaned up.
struct Interrupt {
    saving: AtomicBool,
    pending: AtomicBool,
}

impl Interrupt {
    const fn new() -> Self {
        Self {
            saving: AtomicBool::new(false),
            pending: AtomicBool::new(false),
        }
    }

    /// Returns true when the process should stop right away.
    fn handle(&self) -> bool {
        if self.saving.load(Ordering::SeqCst) {
            self.pending.store(true, Ordering::SeqCst);
            false
        } else {
            true
        }
    }

    fn begin_saving(&self) {
        self.saving.store(true, Ordering::SeqCst);
    }

    /// Leave the saving window; returns true if an interrupt arrived in it.
    fn finish_saving(&self) -> bool {
        self.saving.store(false, Ordering::SeqCst);
        self.pending.swap(false, Ordering::SeqCst)
    }
}

/// Forwards decisions and opens the saving window once the last one is made.
struct SaveAfterLast<'a> {
    inner: &'a mut dyn DecisionSource,
    remaining: usize,
    interrupt: &'a Interrupt,
}

impl<'a> SaveAfterLast<'a> {
    fn new(inner: &'a mut dyn DecisionSource, differences: usize, interrupt: &'a Interrupt) -> Self {
        if differences == 0 {
            interrupt.begin_saving();
        }
        Self {
            inner,
            remaining: differences,
            interrupt,
        }
    }
}

impl DecisionSource for SaveAfterLast<'_> {
    fn decide(&mut self, difference: &Difference) -> linemerge::Result<Resolution> {
        let resolution = self.inner.decide(difference)?;
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.interrupt.begin_saving();
        }
        Ok(resolution)
    }

    fn remaining(&self) -> Option<usize> {
        self.inner.remaining()
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = cli.validate() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    cli.setup_logging();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.resolve_config().context("Loading configuration")?;

    ctrlc::set_handler(|| {
        if INTERRUPT.handle() {
            eprintln!("\nInterrupted, nothing saved");
            std::process::exit(130);
        }
    })
    .context("Installing interrupt handler")?;

    let mut decisions = decision_source(cli)?;

    let mut workflow = MergeWorkflow::new(&config);
    let differences = workflow
        .compare(&config.paths.left, &config.paths.right)
        .context("Comparing files")?;

    if cli.report {
        let report = DiffFormatter::format(differences, cli.format, &config.paths.left, &config.paths.right)?;
        println!("{}", report);
        return Ok(());
    }

    if differences.is_empty() {
        println!("No differences found");
    }

    let mut source = SaveAfterLast::new(decisions.as_mut(), differences.len(), &INTERRUPT);
    let result = workflow
        .merge(&mut source, &config.paths.output)
        .map_err(|err| {
            let step = err.merge_step();
            anyhow::Error::new(err).context(step)
        })
        .and_then(|summary| {
            for (line_number, content) in &cli.amend {
                amend_line(&summary.output, *line_number, content)
                    .with_context(|| format!("Amending line {}", line_number))?;
            }
            Ok(summary)
        });

    if INTERRUPT.finish_saving() {
        eprintln!("\nInterrupted");
        std::process::exit(130);
    }

    let summary = result?;
    println!("Output saved to {}", summary.output.display());
    Ok(())
}

fn decision_source(cli: &Cli) -> Result<Box<dyn DecisionSource>> {
    if let Some(list) = &cli.decisions {
        let scripted = ScriptedSource::parse(list).context("Parsing --decisions")?;
        return Ok(Box::new(scripted));
    }

    if let Some(side) = cli.prefer {
        return Ok(Box::new(FixedSource::new(side.into())));
    }

    let prompt = PromptSource::new(std::io::stdin().lock(), std::io::stdout()).with_color(cli.use_color());
    Ok(Box::new(prompt))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diffs() -> Vec<Difference> {
        vec![
            Difference::new(1, "a", "b").unwrap(),
            Difference::new(3, "c", "d").unwrap(),
        ]
    }

    #[test]
    fn test_interrupt_outside_saving_stops_immediately() {
        let interrupt = Interrupt::new();
        assert!(interrupt.handle());
        assert!(!interrupt.finish_saving());
    }

    #[test]
    fn test_interrupt_while_saving_is_deferred() {
        let interrupt = Interrupt::new();
        interrupt.begin_saving();

        assert!(!interrupt.handle());
        assert!(interrupt.finish_saving());
        assert!(interrupt.handle());
    }

    #[test]
    fn test_saving_window_opens_after_last_decision() {
        let interrupt = Interrupt::new();
        let mut fixed = FixedSource::new(Resolution::KeepLeft);
        let mut source = SaveAfterLast::new(&mut fixed, 2, &interrupt);
        let diffs = diffs();

        source.decide(&diffs[0]).unwrap();
        assert!(interrupt.handle());

        source.decide(&diffs[1]).unwrap();
        assert!(!interrupt.handle());
        assert!(interrupt.finish_saving());
    }

    #[test]
    fn test_saving_window_opens_at_once_without_differences() {
        let interrupt = Interrupt::new();
        let mut fixed = FixedSource::new(Resolution::KeepLeft);
        let _source = SaveAfterLast::new(&mut fixed, 0, &interrupt);

        assert!(!interrupt.handle());
    }
}
