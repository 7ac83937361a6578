//! Reaction type code to display asset.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmojiSource {
    /// Bundled animation, path relative to the app's asset root.
    Animated(&'static str),
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emoji {
    pub code: &'static str,
    pub label: &'static str,
    pub source: EmojiSource,
    /// Shown when the animation can't be played. Never empty.
    pub fallback_text: &'static str,
}

const fn animated(
    code: &'static str,
    label: &'static str,
    asset: &'static str,
    fallback_text: &'static str,
) -> Emoji {
    Emoji {
        code,
        label,
        source: EmojiSource::Animated(asset),
        fallback_text,
    }
}

const REACTIONS: &[Emoji] = &[
    animated("like", "Like", "reactions/like.json", "👍"),
    animated("love", "Love", "reactions/love.json", "❤️"),
    animated("haha", "Haha", "reactions/haha.json", "😂"),
    animated("wow", "Wow", "reactions/wow.json", "😮"),
    animated("sad", "Sad", "reactions/sad.json", "😢"),
    animated("angry", "Angry", "reactions/angry.json", "😡"),
    animated("celebrate", "Celebrate", "reactions/celebrate.json", "🎉"),
    animated("support", "Support", "reactions/support.json", "🤝"),
];

// Codes stored by older app versions before animated reactions shipped.
const LEGACY: &[(&str, &str, &str)] = &[
    ("thumbsup", "Like", "👍"),
    ("heart", "Love", "❤️"),
    ("laugh", "Haha", "😂"),
    ("surprised", "Wow", "😮"),
    ("cry", "Sad", "😢"),
    ("fire", "Fire", "🔥"),
    ("clap", "Clap", "👏"),
    ("party", "Celebrate", "🎉"),
    ("100", "Hundred", "💯"),
];

const DEFAULT: Emoji = Emoji {
    code: "unknown",
    label: "Reaction",
    source: EmojiSource::Text,
    fallback_text: "👍",
};

pub fn get_emoji_by_code(code: &str) -> Emoji {
    let code = code.trim().to_ascii_lowercase();

    if let Some(entry) = REACTIONS.iter().find(|e| e.code == code) {
        return *entry;
    }

    if let Some(&(legacy_code, label, text)) = LEGACY.iter().find(|(c, _, _)| *c == code) {
        return Emoji {
            code: legacy_code,
            label,
            source: EmojiSource::Text,
            fallback_text: text,
        };
    }

    log::debug!("No emoji for reaction code {:?}", code);
    DEFAULT
}

/// Codes offered by the reaction picker, in display order.
pub fn reaction_codes() -> impl Iterator<Item = &'static str> {
    REACTIONS.iter().map(|e| e.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_code_uses_table_entry() {
        let like = get_emoji_by_code("like");
        assert_eq!(like.code, "like");
        assert_eq!(like.source, EmojiSource::Animated("reactions/like.json"));
        assert_eq!(get_emoji_by_code("  LIKE "), like);
    }

    #[test]
    fn legacy_code_is_text_only() {
        let fire = get_emoji_by_code("fire");
        assert_eq!(fire.source, EmojiSource::Text);
        assert_eq!(fire.fallback_text, "🔥");
    }

    #[test]
    fn unknown_code_falls_back_to_default_glyph() {
        let unknown = get_emoji_by_code("unknown");
        assert!(!unknown.fallback_text.is_empty());
        assert_eq!(unknown.source, EmojiSource::Text);
        assert!(!get_emoji_by_code("").fallback_text.is_empty());
    }

    #[test]
    fn every_picker_code_resolves_to_itself() {
        for code in reaction_codes() {
            let emoji = get_emoji_by_code(code);
            assert_eq!(emoji.code, code);
            assert!(!emoji.fallback_text.is_empty());
        }
    }
}
