//! Keyword intent classifier

/// Coarse category of a message, independent of conversation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Greeting,
    Bye,
    Help,
    Python,
}

/// Intent keywords, checked in declaration order
const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::Greeting, &["hello", "hi", "hey"]),
    (Intent::Bye, &["bye", "goodbye"]),
    (Intent::Help, &["help", "commands", "menu"]),
    (Intent::Python, &["python", "coding", "programming"]),
];

/// Classify lowercased text.
///
/// Returns the first intent with a keyword contained anywhere in `text`.
/// Containment is plain substring matching, so "hi" matches inside "this".
/// `None` means no intent.
pub fn classify(text: &str) -> Option<Intent> {
    INTENT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(intent, _)| *intent)
}
