use std::io::{BufRead, Write};

use super::{DecisionSource, Resolution};
use crate::diff::Difference;
use crate::error::{MergeError, Result};

/// Interactive prompt: shows both candidates and reads `1` or `2`,
/// re-asking until a valid choice arrives. End of input cancels.
pub struct PromptSource<R, W> {
    input: R,
    output: W,
    color: bool,
}

impl<R: BufRead, W: Write> PromptSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            color: false,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn show(&mut self, difference: &Difference) -> std::io::Result<()> {
        writeln!(self.output, "Line {} differs:", difference.line_number())?;
        if self.color {
            writeln!(self.output, "\x1b[31m1: {}\x1b[0m", difference.left())?;
            writeln!(self.output, "\x1b[32m2: {}\x1b[0m", difference.right())?;
        } else {
            writeln!(self.output, "1: {}", difference.left())?;
            writeln!(self.output, "2: {}", difference.right())?;
        }
        write!(self.output, "Choose which line to save (1/2): ")?;
        self.output.flush()
    }

    fn read_choice(&mut self) -> std::io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

impl<R: BufRead, W: Write> DecisionSource for PromptSource<R, W> {
    fn decide(&mut self, difference: &Difference) -> Result<Resolution> {
        let line_number = difference.line_number();
        let prompt_failed = |source: std::io::Error| MergeError::Prompt {
            line_number,
            source,
        };

        self.show(difference).map_err(prompt_failed)?;
        loop {
            let Some(choice) = self.read_choice().map_err(prompt_failed)? else {
                return Err(MergeError::Cancelled { line_number });
            };

            match choice.trim() {
                "1" => return Ok(Resolution::KeepLeft),
                "2" => return Ok(Resolution::KeepRight),
                other => {
                    tracing::warn!("Rejected choice '{}' for line {}", other, line_number);
                    write!(self.output, "Invalid choice. Please enter 1 or 2: ")
                        .and_then(|_| self.output.flush())
                        .map_err(prompt_failed)?;
                }
            }
        }
    }
}

/// Pre-supplied decisions consumed in order (batch / headless mode).
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    decisions: std::vec::IntoIter<Resolution>,
    supplied: usize,
}

impl ScriptedSource {
    pub fn new(decisions: Vec<Resolution>) -> Self {
        Self {
            supplied: decisions.len(),
            decisions: decisions.into_iter(),
        }
    }

    /// Parse a comma or whitespace separated list such as `1,2,left`.
    /// Any unrecognized token fails with [`MergeError::InvalidResolution`].
    pub fn parse(list: &str) -> Result<Self> {
        let decisions = list
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<Resolution>>>()?;
        Ok(Self::new(decisions))
    }

}

impl DecisionSource for ScriptedSource {
    fn decide(&mut self, difference: &Difference) -> Result<Resolution> {
        self.decisions
            .next()
            .ok_or(MergeError::DecisionsExhausted {
                line_number: difference.line_number(),
                supplied: self.supplied,
            })
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.decisions.len())
    }
}

/// Answers every difference with the same side.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource {
    resolution: Resolution,
}

impl FixedSource {
    pub fn new(resolution: Resolution) -> Self {
        Self { resolution }
    }
}

impl DecisionSource for FixedSource {
    fn decide(&mut self, _difference: &Difference) -> Result<Resolution> {
        Ok(self.resolution)
    }
}

/// Adapts a closure, e.g. one reading UI state.
pub struct CallbackSource<F> {
    callback: F,
}

impl<F> CallbackSource<F>
where
    F: FnMut(&Difference) -> Result<Resolution>,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> DecisionSource for CallbackSource<F>
where
    F: FnMut(&Difference) -> Result<Resolution>,
{
    fn decide(&mut self, difference: &Difference) -> Result<Resolution> {
        (self.callback)(difference)
    }
}
