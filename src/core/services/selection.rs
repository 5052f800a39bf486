use crate::core::errors::{EnvsyncError, Result};
use crate::core::traits::prompt::Prompter;

/// The only answer accepted as confirmation.
pub const CONFIRM_ANSWER: &str = "yes";

/// Turn a 1-based answer into a 0-based index below `count`.
pub fn parse_index(input: &str, count: usize) -> Result<usize> {
    let invalid = || EnvsyncError::InvalidSelection {
        input: input.to_string(),
        max: count,
    };

    let number: usize = input.trim().parse().map_err(|_| invalid())?;
    if number == 0 || number > count {
        return Err(invalid());
    }
    Ok(number - 1)
}

/// Ask for one of `options` by number and return the chosen option.
pub fn choose<'o>(
    prompter: &mut dyn Prompter,
    question: &str,
    options: &'o [String],
) -> Result<&'o str> {
    let answer = prompter.ask(question)?;
    let index = parse_index(&answer, options.len())?;
    Ok(&options[index])
}

/// Ask a yes/no question. Anything but exactly `yes` declines.
pub fn confirm(prompter: &mut dyn Prompter, question: &str) -> Result<bool> {
    Ok(prompter.ask(question)? == CONFIRM_ANSWER)
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;

    use super::*;

    /// Prompter that replays canned answers and records the questions.
    pub struct ScriptedPrompter {
        answers: VecDeque<String>,
        pub questions: Vec<String>,
    }

    impl ScriptedPrompter {
        pub fn new(answers: &[&str]) -> Self {
            Self {
                answers: answers.iter().map(|a| a.to_string()).collect(),
                questions: Vec::new(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, question: &str) -> Result<String> {
            self.questions.push(question.to_string());
            Ok(self.answers.pop_front().unwrap_or_default())
        }
    }
}
