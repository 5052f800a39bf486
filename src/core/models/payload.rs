use super::document::ValueMap;

/// Secrets or variables split by the scope they are uploaded to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopedValues {
    pub environment: ValueMap,
    pub repository: ValueMap,
}

/// Everything one apply run pushes for a repository/environment pair.
///
/// Built fresh for each selection and dropped after the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedPayload {
    pub repository: String,
    pub environment: String,
    pub secrets: ScopedValues,
    pub variables: ScopedValues,
}

impl ResolvedPayload {
    /// Total number of remote uploads the payload will cause.
    pub fn upload_count(&self) -> usize {
        self.secrets.environment.len()
            + self.secrets.repository.len()
            + self.variables.environment.len()
            + self.variables.repository.len()
    }
}
