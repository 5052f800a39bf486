use std::io::{self, BufRead, Write};

use crate::core::errors::Result;
use crate::core::traits::prompt::Prompter;

/// Reads answers from standard input.
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn ask(&mut self, question: &str) -> Result<String> {
        print!("{question}");
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }
}
