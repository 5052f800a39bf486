pub mod apply_pipeline;
pub mod check_service;
pub mod merge;
pub mod resolver;
pub mod selection;
pub mod versioner;
