//! Image prompt preparation: sensitive-word filtering, length cap, style suffix.

use regex::{NoExpand, Regex};
use std::sync::OnceLock;

/// Words kept out of image prompts, paired with their substitutes.
const STANDARD_SENSITIVE_WORDS: [(&str, &str); 11] = [
    ("murdered", "missing"),
    ("murder", "mystery"),
    ("corpse", "empty room"),
    ("dead body", "empty room"),
    ("blood", "red ink"),
    ("killed", "gone"),
    ("kill", "find"),
    ("gun", "pocket watch"),
    ("knife", "letter opener"),
    ("weapon", "object"),
    ("poison", "perfume"),
];

/// Whole-word, case-insensitive replacements applied before a description
/// reaches the image service.
#[derive(Debug, Clone)]
pub struct SensitiveFilter {
    rules: Vec<(Regex, String)>,
}

impl SensitiveFilter {
    /// Build a filter from `(word, substitute)` pairs. Words match whole
    /// words only, ignoring case.
    pub fn new<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, regex::Error> {
        let rules = pairs
            .into_iter()
            .map(|(word, substitute)| -> Result<(Regex, String), regex::Error> {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(word));
                Ok((Regex::new(&pattern)?, substitute.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// A filter that changes nothing.
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in word list.
    pub fn standard() -> Self {
        static STANDARD: OnceLock<SensitiveFilter> = OnceLock::new();
        STANDARD
            .get_or_init(|| {
                SensitiveFilter::new(STANDARD_SENSITIVE_WORDS)
                    .expect("static sensitive word patterns")
            })
            .clone()
    }

    /// Replace every listed word in `text`.
    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |filtered, (pattern, substitute)| {
                pattern
                    .replace_all(&filtered, NoExpand(substitute.as_str()))
                    .into_owned()
            })
    }
}

impl Default for SensitiveFilter {
    fn default() -> Self {
        Self::standard()
    }
}

/// Configuration for image prompts.
#[derive(Debug, Clone)]
pub struct ImageryConfig {
    /// Maximum length of the scene description, in characters, before the suffix.
    pub max_description_chars: usize,

    /// Style appended to every description.
    pub style_suffix: String,

    pub sensitive_words: SensitiveFilter,
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            max_description_chars: 300,
            style_suffix: ", vintage detective illustration, muted colors, soft cinematic lighting"
                .to_string(),
            sensitive_words: SensitiveFilter::standard(),
        }
    }
}

impl ImageryConfig {
    /// Replace every sensitive word with its substitute.
    pub fn filter_sensitive(&self, text: &str) -> String {
        self.sensitive_words.apply(text)
    }

    /// Build the final image prompt from a scene summary.
    pub fn scene_prompt(&self, summary: &str) -> String {
        let filtered = self.filter_sensitive(summary.trim());
        let mut description: String = filtered.chars().take(self.max_description_chars).collect();
        description.truncate(description.trim_end().len());
        description.push_str(&self.style_suffix);
        description
    }
}
