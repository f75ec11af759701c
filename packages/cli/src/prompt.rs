//! Operator input seam.
//!
//! Reconciliation and review take a [`Prompter`] so their loop logic can be
//! exercised with scripted input. The console implementation sits on
//! dialoguer; any prompt failure (EOF, interrupt) is explicit cancellation
//! and aborts the command.

use dialoguer::{Input, Password};

use crate::error::{CliError, Result};

/// Interactive input provider.
pub trait Prompter {
    /// Free-text input; `default` is offered as the pre-filled value.
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Numeric input; `default` is used on empty input. Range checking is
    /// the caller's business.
    fn select_number(&mut self, prompt: &str, default: usize) -> Result<usize>;
}

/// Terminal-backed prompter.
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn input(&mut self, prompt: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input
            .interact_text()
            .map_err(|_| CliError::SelectionCancelled(prompt.to_string()))
    }

    fn select_number(&mut self, prompt: &str, default: usize) -> Result<usize> {
        Input::<usize>::new()
            .with_prompt(prompt)
            .default(default)
            .interact_text()
            .map_err(|_| CliError::SelectionCancelled(prompt.to_string()))
    }
}

/// Hidden password prompt, used by the login command only.
pub fn password(prompt: &str) -> Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|_| CliError::SelectionCancelled(prompt.to_string()))
}

/// Scripted prompter for loop-logic tests. Runs out of script = cancelled.
#[cfg(test)]
pub struct ScriptedPrompter {
    inputs: std::collections::VecDeque<String>,
    selections: std::collections::VecDeque<usize>,
    pub input_prompts: Vec<String>,
    pub selection_prompts: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompter {
    pub fn new(inputs: &[&str], selections: &[usize]) -> Self {
        Self {
            inputs: inputs.iter().map(|s| (*s).to_string()).collect(),
            selections: selections.iter().copied().collect(),
            input_prompts: Vec::new(),
            selection_prompts: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Prompter for ScriptedPrompter {
    fn input(&mut self, prompt: &str, _default: Option<&str>) -> Result<String> {
        self.input_prompts.push(prompt.to_string());
        self.inputs
            .pop_front()
            .ok_or_else(|| CliError::SelectionCancelled(prompt.to_string()))
    }

    fn select_number(&mut self, prompt: &str, _default: usize) -> Result<usize> {
        self.selection_prompts.push(prompt.to_string());
        self.selections
            .pop_front()
            .ok_or_else(|| CliError::SelectionCancelled(prompt.to_string()))
    }
}
