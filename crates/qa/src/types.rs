//! QA provider types.

/// Provider type enum for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    HuggingFace,
    Lexical,
}

impl ProviderType {
    /// Parse provider type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "huggingface" | "hf" => Some(Self::HuggingFace),
            "lexical" => Some(Self::Lexical),
            _ => None,
        }
    }

    /// Get the canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HuggingFace => "huggingface",
            Self::Lexical => "lexical",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!(ProviderType::parse("huggingface"), Some(ProviderType::HuggingFace));
        assert_eq!(ProviderType::parse("HF"), Some(ProviderType::HuggingFace));
        assert_eq!(ProviderType::parse("lexical"), Some(ProviderType::Lexical));
        assert_eq!(ProviderType::parse("unknown"), None);
    }

    #[test]
    fn test_canonical_names() {
        assert_eq!(ProviderType::HuggingFace.as_str(), "huggingface");
        assert_eq!(ProviderType::Lexical.as_str(), "lexical");
    }
}
