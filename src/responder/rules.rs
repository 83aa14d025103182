//! Canned reply table
//!
//! Rule order is significant: the first rule with a matching trigger wins.

/// What a matching rule answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// A fixed sentence
    Fixed(&'static str),
    /// A sentence that embeds the wall-clock time at generation
    CurrentTime,
}

/// A keyword rule
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    /// Lowercase substrings; any one of them triggers the rule
    pub triggers: &'static [&'static str],
    pub reply: Reply,
}

impl Rule {
    /// `normalized` must already be case-folded
    pub fn matches(&self, normalized: &str) -> bool {
        self.triggers.iter().any(|t| normalized.contains(t))
    }
}

pub const GREETING_REPLY: &str = "Hello! It's great to meet you. How can I assist you today?";
pub const WELLBEING_REPLY: &str = "I'm doing well, thank you for asking! I'm here and ready to help you with whatever you need.";
pub const WEATHER_REPLY: &str = "I don't have access to real-time weather data, but I'd recommend checking a weather app or website for the most current conditions in your area.";
pub const HELP_REPLY: &str = "I'm here to help! You can ask me questions, have a conversation, or just chat. I can respond both in text and voice. What would you like to know?";

pub const RULES: &[Rule] = &[
    Rule {
        name: "greeting",
        triggers: &["hello", "hi"],
        reply: Reply::Fixed(GREETING_REPLY),
    },
    Rule {
        name: "wellbeing",
        triggers: &["how are you"],
        reply: Reply::Fixed(WELLBEING_REPLY),
    },
    Rule {
        name: "weather",
        triggers: &["weather"],
        reply: Reply::Fixed(WEATHER_REPLY),
    },
    Rule {
        name: "time",
        triggers: &["time"],
        reply: Reply::CurrentTime,
    },
    Rule {
        name: "help",
        triggers: &["help"],
        reply: Reply::Fixed(HELP_REPLY),
    },
];

/// Generic acknowledgements used when no rule matches
pub const FALLBACK_TEMPLATES: &[&str] = &[
    "That's an interesting question! Let me think about that for you.",
    "I understand what you're asking. Here's my perspective on that topic.",
    "Great point! I'd be happy to help you with that.",
    "That's a thoughtful question. Based on what you've shared, I think...",
    "I appreciate you asking that. Let me provide you with some insights.",
    "Excellent question! Here's what I can tell you about that.",
    "I'm glad you brought that up. From my understanding...",
    "That's something I can definitely help you with. Here's my take:",
];

pub fn time_reply(formatted_time: &str) -> String {
    format!(
        "The current time is {}. Is there anything specific you'd like to know about time or scheduling?",
        formatted_time
    )
}

pub fn fallback_reply(template: &str, utterance: &str) -> String {
    format!(
        "{} You mentioned: \"{}\". That's quite interesting to discuss!",
        template, utterance
    )
}

/// First rule whose trigger occurs in the case-folded utterance
pub fn first_match(normalized: &str) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.matches(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order_is_canonical() {
        let names: Vec<&str> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, ["greeting", "wellbeing", "weather", "time", "help"]);
    }

    #[test]
    fn test_greeting_outranks_wellbeing() {
        let rule = first_match("hi there, how are you?").unwrap();
        assert_eq!(rule.name, "greeting");
    }

    #[test]
    fn test_triggers_are_plain_substrings() {
        // "this" contains "hi"
        assert_eq!(first_match("is this thing on").unwrap().name, "greeting");
        assert_eq!(first_match("sometimes").unwrap().name, "time");
        assert!(first_match("tell me a joke").is_none());
    }

    #[test]
    fn test_time_outranks_help() {
        assert_eq!(first_match("help me with the time").unwrap().name, "time");
    }
}
