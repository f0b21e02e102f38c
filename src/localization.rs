//! Display string lookup used when composing presence text

use std::fmt::Display;

/// Whose language a string is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// The game client's language; everything other players see
    Client,
    /// The plugin UI language
    Plugin,
}

/// String table lookup. Templates use `{0}`, `{1}`, ... placeholders.
pub trait Localizer: Send {
    fn localize(&self, key: &str, audience: Audience) -> String;
}

pub mod keys {
    pub const IN_MENUS: &str = "RichPresenceInMenus";
    pub const IN_LOGIN_QUEUE: &str = "RichPresenceInLoginQueue";
    pub const QUEUE_ESTIMATE: &str = "RichPresenceQueueEstimate";
    pub const THE_SOURCE: &str = "RichPresenceTheSource";
    pub const VOID: &str = "RichPresenceVoid";
    pub const ONLINE: &str = "RichPresenceOnline";
    pub const UNKNOWN: &str = "RichPresenceUnknown";
    pub const LEVEL: &str = "RichPresenceLevel";
    pub const IN_A_DUTY: &str = "RichPresenceInADuty";
}

/// Built-in English table
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLocalizer;

impl Localizer for EnglishLocalizer {
    fn localize(&self, key: &str, _audience: Audience) -> String {
        let text = match key {
            keys::IN_MENUS => "In Menus",
            keys::IN_LOGIN_QUEUE => "In Login Queue: #{0}",
            keys::QUEUE_ESTIMATE => "Est. time left: {0}",
            keys::THE_SOURCE => "The Source",
            keys::VOID => "Void",
            keys::ONLINE => "Online",
            keys::UNKNOWN => "Unknown",
            keys::LEVEL => "Level {0}",
            keys::IN_A_DUTY => "In a duty",
            _ => {
                tracing::debug!("Missing localization key: {}", key);
                key
            }
        };
        text.to_string()
    }
}

/// Substitute `{n}` placeholders with the matching argument
pub fn fill(template: &str, args: &[&dyn Display]) -> String {
    let mut text = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        text = text.replace(&format!("{{{}}}", i), &arg.to_string());
    }
    text
}

/// Upper-case the first letter of every space-separated word
pub fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_replaces_numbered_placeholders() {
        assert_eq!(fill("Level {0}", &[&90]), "Level 90");
        assert_eq!(fill("{1} before {0}", &[&"b", &"a"]), "a before b");
        assert_eq!(fill("no placeholders", &[&1]), "no placeholders");
    }

    #[test]
    fn title_case_capitalizes_words() {
        assert_eq!(title_case("white mage"), "White Mage");
        assert_eq!(title_case("dark  knight"), "Dark  Knight");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn unknown_keys_fall_back_to_the_key() {
        let localizer = EnglishLocalizer;
        assert_eq!(localizer.localize("NoSuchKey", Audience::Plugin), "NoSuchKey");
        assert_eq!(localizer.localize(keys::IN_A_DUTY, Audience::Client), "In a duty");
    }
}
