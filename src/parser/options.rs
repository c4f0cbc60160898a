//! Options for opening documents.

/// Options for opening PDF documents.
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// Password for encrypted documents, tried as both user and owner password
    pub password: Option<String>,
}

impl OpenOptions {
    /// Create new open options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set password for encrypted documents.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set or clear the password.
    pub fn with_optional_password(mut self, password: Option<&str>) -> Self {
        self.password = password.map(str::to_string);
        self
    }
}
