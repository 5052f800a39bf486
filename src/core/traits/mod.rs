pub mod audit;
pub mod prompt;
pub mod remote;
pub mod sealer;
