use crate::core::errors::Result;

/// Port for asking the operator a free-text question.
pub trait Prompter {
    /// Show `question` and return the raw answer without the line ending.
    fn ask(&mut self, question: &str) -> Result<String>;
}
