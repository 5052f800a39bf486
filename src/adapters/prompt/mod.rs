pub mod console_prompter;
