use crate::text::TextFormat;

/// Settings shared by the host adapter and the text-run engine.
#[derive(Debug, Clone, Default)]
pub struct ReconcilerConfig {
    log_operations: bool,
    default_format: TextFormat,
}

impl ReconcilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a `debug!` event for every structural operation
    pub fn with_log_operations(mut self, enabled: bool) -> Self {
        self.log_operations = enabled;
        self
    }

    /// Formatting used for text blocks with no enclosing text provider
    pub fn with_default_format(mut self, format: TextFormat) -> Self {
        self.default_format = format;
        self
    }

    pub fn log_operations(&self) -> bool {
        self.log_operations
    }

    pub fn default_format(&self) -> &TextFormat {
        &self.default_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Alignment;

    #[test]
    fn test_defaults() {
        let config = ReconcilerConfig::new();
        assert!(!config.log_operations());
        assert_eq!(config.default_format(), &TextFormat::default());
    }

    #[test]
    fn test_builder() {
        let format = TextFormat {
            alignment: Alignment::Center,
            ..Default::default()
        };
        let config = ReconcilerConfig::new()
            .with_log_operations(true)
            .with_default_format(format.clone());
        assert!(config.log_operations());
        assert_eq!(config.default_format(), &format);
    }
}
