//! Pure trigger decision: should the bot reply to a message?
//!
//! No I/O and no await points; used by the router on every incoming message.

/// Decides whether a message warrants an automated reply, based on the bot's
/// display name and a configured set of trigger words.
#[derive(Debug, Clone)]
pub struct Responder {
    trigger_words: Vec<String>,
}

impl Responder {
    /// Creates a responder with the given trigger words. Empty entries are
    /// dropped so they can never match every message.
    pub fn new(trigger_words: Vec<String>) -> Self {
        Self {
            trigger_words: trigger_words
                .into_iter()
                .filter(|w| !w.trim().is_empty())
                .collect(),
        }
    }

    /// Returns true if the lower-cased message contains the bot's name (with
    /// any leading `@` stripped) or any configured trigger word.
    pub fn should_respond(&self, text: &str, bot_username: Option<&str>) -> bool {
        let text_lower = text.to_lowercase();

        if let Some(username) = bot_username {
            let name = username.trim_start_matches('@').to_lowercase();
            if !name.is_empty() && text_lower.contains(&name) {
                return true;
            }
        }

        self.trigger_words
            .iter()
            .any(|word| text_lower.contains(&word.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responder() -> Responder {
        Responder::new(vec!["test".to_string(), "bot".to_string()])
    }

    #[test]
    fn test_mention_triggers() {
        assert!(responder().should_respond("hello @test_bot", Some("test_bot")));
    }

    #[test]
    fn test_mention_with_at_prefix_in_config() {
        assert!(Responder::new(vec![]).should_respond("hi vika_bot!", Some("@vika_bot")));
    }

    #[test]
    fn test_trigger_word_triggers() {
        assert!(responder().should_respond("hey bot help me", Some("other_bot")));
    }

    #[test]
    fn test_no_trigger() {
        assert!(!Responder::new(vec!["ping".to_string()])
            .should_respond("just random text", Some("test_bot")));
    }

    #[test]
    fn test_empty_message() {
        assert!(!responder().should_respond("", Some("test_bot")));
        assert!(!responder().should_respond("", None));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(responder().should_respond("HEY BOT", None));
        assert!(Responder::new(vec![]).should_respond("ask MyBot", Some("mybot")));
    }

    #[test]
    fn test_no_name_no_words_never_responds() {
        let r = Responder::new(vec![]);
        assert!(!r.should_respond("anything at all", None));
    }

    #[test]
    fn test_empty_trigger_words_filtered() {
        let r = Responder::new(vec!["".to_string(), "  ".to_string()]);
        assert!(!r.should_respond("a perfectly normal message", None));
    }
}
