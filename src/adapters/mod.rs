pub mod audit;
pub mod cipher;
pub mod github;
pub mod prompt;
pub mod remote;
