//! Canned reply texts and greeting selection

use rand::Rng;

pub const GREETINGS: [&str; 3] = [
    "Hello! How can I help you?",
    "Hi there! What can I do for you?",
    "Hey! Need any help?",
];

/// Accepted spellings of the Islamic greeting
pub const ISLAMIC_GREETINGS: [&str; 2] = ["assalamoalaikum", "a o a"];

pub const ISLAMIC_GREETING_REPLY: &str = "Wa Alaikum Assalam. How can I assist you?";

pub const MAIN_MENU: &str = "Main Menu:\n\
    1. Python Help\n\
    2. Islamic Info\n\
    3. About Bot\n\
    \n\
    Reply with 1, 2, or 3";

pub const LANGUAGE_HELP: &str = "You can ask me questions about Python or Flask.";

pub const ISLAMIC_TOPICS_PROMPT: &str = "You can ask about Namaz, Roza, or Zakat.";

pub const ABOUT_BOT: &str =
    "I am a WhatsApp chatbot built using Flask and the WhatsApp Cloud API.";

pub const RELIGION_PROMPT: &str =
    "I am Muslim. Would you like to know more about Islam? (yes/no)";

pub const RELIGION_ACCEPTED: &str = "Great! Type 'menu' to explore Islamic topics.";

pub const RELIGION_DECLINED: &str = "No problem. Let me know if you need help with anything else.";

pub const FAREWELL: &str = "Goodbye! Have a great day.";

pub const FALLBACK: &str = "I didn't understand that. You can try:\n\
    - hello\n\
    - menu\n\
    - /help";

/// Source of the greeting variant index
pub trait GreetingPicker: Send + Sync {
    /// Pick an index in `0..choices`; `choices` is never zero
    fn pick(&self, choices: usize) -> usize;
}

/// Uniform pick from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGreeting;

impl GreetingPicker for RandomGreeting {
    fn pick(&self, choices: usize) -> usize {
        rand::thread_rng().gen_range(0..choices)
    }
}

/// Always the same variant
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct FixedGreeting(pub usize);

#[cfg(test)]
impl GreetingPicker for FixedGreeting {
    fn pick(&self, _choices: usize) -> usize {
        self.0
    }
}

/// Greeting chosen by `picker`; out-of-range picks wrap around
pub fn greeting(picker: &dyn GreetingPicker) -> &'static str {
    GREETINGS[picker.pick(GREETINGS.len()) % GREETINGS.len()]
}
