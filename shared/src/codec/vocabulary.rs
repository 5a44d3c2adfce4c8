//! Category vocabularies fixed at training time

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{AdvisorError, AdvisorResult};

/// Ordered set of known category strings for one field.
///
/// A category's code is its position in the list. The list is fixed by the
/// training run and never extended at serving time.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryVocabulary {
    field: String,
    categories: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, u32>,
}

impl CategoryVocabulary {
    /// Build a vocabulary, preserving the given order.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the list is empty or contains duplicates.
    pub fn new(field: impl Into<String>, categories: Vec<String>) -> Result<Self, String> {
        let field = field.into();
        if categories.is_empty() {
            return Err(format!("vocabulary for '{}' is empty", field));
        }
        let mut index = HashMap::with_capacity(categories.len());
        for (code, category) in categories.iter().enumerate() {
            let code = u32::try_from(code)
                .map_err(|_| format!("vocabulary for '{}' is too large", field))?;
            if index.insert(category.clone(), code).is_some() {
                return Err(format!(
                    "vocabulary for '{}' lists '{}' more than once",
                    field, category
                ));
            }
        }
        Ok(Self {
            field,
            categories,
            index,
        })
    }

    /// Convenience constructor from string literals
    pub fn from_strs(field: impl Into<String>, categories: &[&str]) -> Result<Self, String> {
        Self::new(field, categories.iter().map(|c| c.to_string()).collect())
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.index.contains_key(value)
    }

    /// Code for a known category. Unseen values fail, there is no fallback.
    pub fn encode(&self, value: &str) -> AdvisorResult<u32> {
        self.index
            .get(value)
            .copied()
            .ok_or_else(|| AdvisorError::unknown_category(&self.field, value))
    }

    /// Category for a code in `[0, len)`
    pub fn decode(&self, code: u32) -> AdvisorResult<&str> {
        self.categories
            .get(code as usize)
            .map(String::as_str)
            .ok_or_else(|| AdvisorError::unknown_category(&self.field, code.to_string()))
    }
}

impl PartialEq for CategoryVocabulary {
    fn eq(&self, other: &Self) -> bool {
        self.field == other.field && self.categories == other.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crops() -> CategoryVocabulary {
        CategoryVocabulary::from_strs("previous_crop", &["beans", "maize", "others"]).unwrap()
    }

    #[test]
    fn test_codes_follow_declared_order() {
        let vocab = crops();
        assert_eq!(vocab.encode("beans").unwrap(), 0);
        assert_eq!(vocab.encode("maize").unwrap(), 1);
        assert_eq!(vocab.encode("others").unwrap(), 2);
    }

    #[test]
    fn test_unknown_category_fails() {
        let err = crops().encode("rice").unwrap_err();
        assert_eq!(err, AdvisorError::unknown_category("previous_crop", "rice"));
    }

    #[test]
    fn test_encode_is_case_sensitive() {
        assert!(crops().encode("Maize").is_err());
    }

    #[test]
    fn test_decode_out_of_range() {
        let vocab = crops();
        assert_eq!(vocab.decode(2).unwrap(), "others");
        assert!(matches!(
            vocab.decode(3),
            Err(AdvisorError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert!(CategoryVocabulary::from_strs("previous_crop", &["maize", "maize"]).is_err());
        assert!(CategoryVocabulary::new("previous_crop", Vec::new()).is_err());
    }
}
