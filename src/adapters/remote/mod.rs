#[cfg(test)]
pub mod mock;
