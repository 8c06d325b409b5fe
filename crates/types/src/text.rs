//! Qualified names and localized text.

use std::fmt;

/// A name qualified by a namespace index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QualifiedName {
    pub namespace: u16,
    pub name: String,
}

impl QualifiedName {
    pub fn new(namespace: u16, name: impl Into<String>) -> QualifiedName {
        QualifiedName {
            namespace,
            name: name.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// Human-readable text with a locale tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LocalizedText {
    pub locale: String,
    pub text: String,
}

impl LocalizedText {
    pub fn new(locale: impl Into<String>, text: impl Into<String>) -> LocalizedText {
        LocalizedText {
            locale: locale.into(),
            text: text.into(),
        }
    }

    /// Text without a locale tag.
    pub fn from_text(text: impl Into<String>) -> LocalizedText {
        LocalizedText {
            locale: String::new(),
            text: text.into(),
        }
    }
}

impl fmt::Display for LocalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        let name = QualifiedName::new(2, "Temperature");
        assert_eq!(name.to_string(), "2:Temperature");
        assert!(!name.is_empty());
        assert!(QualifiedName::default().is_empty());
    }

    #[test]
    fn test_localized_text() {
        let text = LocalizedText::new("en", "Boiler");
        assert_eq!(text.locale, "en");
        assert_eq!(text.to_string(), "Boiler");
        assert_eq!(LocalizedText::from_text("x").locale, "");
    }
}
