//! Operator interaction: free-text questions, yes/no confirmations, single choices.

use std::io::{self, BufRead, Stderr, Write};

use crate::error::ProvisionError;

pub trait Console {
    /// Free-text answer; an empty answer takes `default` when there is one.
    fn ask(&mut self, prompt: &str, default: Option<&str>) -> Result<String, ProvisionError>;

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ProvisionError>;

    /// Index into `labels` of the chosen entry.
    fn choice(&mut self, prompt: &str, labels: &[String]) -> Result<usize, ProvisionError>;

    /// One-line notice of an action being taken.
    fn announce(&mut self, label: &str, detail: &str) -> Result<(), ProvisionError>;
}

/// Pick one of `items` by its label.
pub fn choose_from<'a, T, C, F>(
    console: &mut C,
    prompt: &str,
    items: &'a [T],
    label: F,
) -> Result<&'a T, ProvisionError>
where
    C: Console + ?Sized,
    F: Fn(&T) -> &str,
{
    let labels: Vec<String> = items.iter().map(|i| label(i).to_string()).collect();
    let index = console.choice(prompt, &labels)?;
    Ok(&items[index])
}

/// Line-oriented console over any reader/writer pair.
pub struct TerminalConsole<R, W> {
    input: R,
    output: W,
}

impl TerminalConsole<io::StdinLock<'static>, Stderr> {
    /// Prompts go to stderr so stdout carries only results.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn read_answer(&mut self, prompt: &str) -> Result<String, ProvisionError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(ProvisionError::InputClosed);
        }
        Ok(line.trim().to_string())
    }
}

fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Some(true),
        "n" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

impl<R: BufRead, W: Write> Console for TerminalConsole<R, W> {
    fn ask(&mut self, prompt: &str, default: Option<&str>) -> Result<String, ProvisionError> {
        let line = match default {
            Some(d) => format!("{prompt} [{d}]: "),
            None => format!("{prompt}: "),
        };
        loop {
            let answer = self.read_answer(&line)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            if let Some(d) = default {
                return Ok(d.to_string());
            }
        }
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool, ProvisionError> {
        let line = format!("{prompt} {} ", if default { "(Y/n)" } else { "(y/N)" });
        loop {
            let answer = self.read_answer(&line)?;
            if answer.is_empty() {
                return Ok(default);
            }
            if let Some(yes) = parse_yes_no(&answer) {
                return Ok(yes);
            }
            writeln!(self.output, "Please answer yes or no.")?;
        }
    }

    fn choice(&mut self, prompt: &str, labels: &[String]) -> Result<usize, ProvisionError> {
        writeln!(self.output, "{prompt}")?;
        for (i, label) in labels.iter().enumerate() {
            writeln!(self.output, "  [{}] {label}", i + 1)?;
        }
        let line = format!("Choice [1-{}]: ", labels.len());
        loop {
            let answer = self.read_answer(&line)?;
            if let Ok(n) = answer.parse::<usize>()
                && (1..=labels.len()).contains(&n)
            {
                return Ok(n - 1);
            }
            if let Some(index) = labels.iter().position(|l| *l == answer) {
                return Ok(index);
            }
            writeln!(self.output, "Invalid choice: {answer}")?;
        }
    }

    fn announce(&mut self, label: &str, detail: &str) -> Result<(), ProvisionError> {
        writeln!(self.output, "{label}: {detail}")?;
        Ok(())
    }
}
