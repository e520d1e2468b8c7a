//! Translation service contract.

use crate::error::{Result, VoxbridgeError};
use std::sync::Arc;

/// Trait for text translation services.
pub trait Translator: Send + Sync {
    /// Translates source-language text to the target language.
    fn translate(&self, text: &str) -> Result<String>;

    /// Target language code (e.g. "en").
    fn target_language(&self) -> &str;
}

/// Implement Translator for Arc<T> to allow sharing across stages.
impl<T: Translator> Translator for Arc<T> {
    fn translate(&self, text: &str) -> Result<String> {
        (**self).translate(text)
    }

    fn target_language(&self) -> &str {
        (**self).target_language()
    }
}

/// Mock translator for testing.
///
/// Without a fixed response it echoes the input with a marker prefix, so
/// tests can tell translated text from untranslated text.
#[derive(Debug, Clone)]
pub struct MockTranslator {
    target_language: String,
    response: Option<String>,
    should_fail: bool,
}

impl MockTranslator {
    /// Creates a new mock translator.
    pub fn new(target_language: &str) -> Self {
        Self {
            target_language: target_language.to_string(),
            response: None,
            should_fail: false,
        }
    }

    /// Configures a fixed translation response.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = Some(response.to_string());
        self
    }

    /// Configures the mock to fail on translate.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Translator for MockTranslator {
    fn translate(&self, text: &str) -> Result<String> {
        if self.should_fail {
            return Err(VoxbridgeError::Translation {
                message: "mock translation failure".to_string(),
            });
        }
        Ok(match &self.response {
            Some(response) => response.clone(),
            None => format!("[{}] {}", self.target_language, text),
        })
    }

    fn target_language(&self) -> &str {
        &self.target_language
    }
}
