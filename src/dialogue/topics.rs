//! Static topic lookup tables

/// Ordered trigger → answer table.
///
/// Lookups scan entries in declaration order and return the first trigger
/// contained in the text, so an earlier trigger shadows any later one it
/// overlaps with.
#[derive(Debug)]
pub struct TopicTable {
    name: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

impl TopicTable {
    pub const fn new(name: &'static str, entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { name, entries }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// First answer whose trigger is a substring of `text`
    pub fn lookup(&self, text: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(trigger, _)| text.contains(trigger))
            .map(|(_, answer)| *answer)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().copied()
    }
}

/// Religious-info topics, answered while a sender is in the Islamic topic menu
pub static ISLAMIC_TOPICS: TopicTable = TopicTable::new(
    "islamic_topics",
    &[
        (
            "namaz",
            "Namaz is an obligatory prayer performed five times daily.",
        ),
        ("roza", "Roza (fasting) is observed during the month of Ramadan."),
        ("zakat", "Zakat is a form of obligatory charity in Islam."),
    ],
);

/// Language/framework FAQ, answered in any state
pub static LANGUAGE_FAQ: TopicTable = TopicTable::new(
    "language_faq",
    &[
        (
            "what is python",
            "Python is a popular programming language used for web development, AI, and automation.",
        ),
        (
            "what is flask",
            "Flask is a lightweight Python web framework commonly used to build APIs.",
        ),
    ],
);
