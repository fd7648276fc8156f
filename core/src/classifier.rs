//! Span classification: decides which strings must never reach the translator.
//!
//! The rule set is a list of exclusions. Free prose passes through, while
//! anything that looks machine-readable (formatting codes, placeholders,
//! identifiers, URLs) is kept verbatim. Prose that happens to look technical
//! is left untranslated rather than risking a mangled token.

use once_cell::sync::Lazy;
use regex::Regex;

// Minecraft formatting codes: &a, §l, &r. Style letters are lowercase only.
static COLOR_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[&§][0-9a-fk-orA-F]$").expect("valid color code regex")
});

// Whole-string exclusions, tested against the trimmed text.
static IGNORE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)^(?:
            %[^%]*%                       # %player%
          | <[^<>]*>                      # <tag>
          | \{[^{}]*\}                    # {0}, {name}
          | \[[^\[\]]*\]                  # [key]
          | minecraft:[a-zA-Z0-9_]+       # minecraft:stone
          | \b(?:sound|particle|block|entity|item|effect|enchantment|potion|biome|dimension)\.[a-zA-Z0-9_.]+\b
          | [=+\-*/]                      # lone operator
          | \b[a-zA-Z0-9_]+\.[a-zA-Z0-9_.]+\b   # dotted identifier
          | https?://\S+                  # URL
          | \d+                           # digits only
          | \W+                           # no word characters
          | \w                            # single character
        )$",
    )
    .expect("valid ignore regex")
});

/// Returns `true` when `text` must pass through untouched.
pub fn should_ignore(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() <= 2 {
        return true;
    }

    is_color_code(trimmed) || IGNORE_REGEX.is_match(trimmed)
}

/// Exact match against a two-character color/style marker.
pub fn is_color_code(text: &str) -> bool {
    COLOR_CODE_REGEX.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_blank_strings_are_ignored() {
        for input in ["", "   ", "ab", " x ", "\t\n"] {
            assert!(should_ignore(input), "expected {input:?} to be ignored");
        }
    }

    #[test]
    fn color_codes_are_ignored() {
        assert!(should_ignore("&a"));
        assert!(should_ignore(" §l "));
        assert!(is_color_code("&r"));
        assert!(is_color_code("§F"));
        assert!(!is_color_code("&z"));
        assert!(!is_color_code("&R"));
        assert!(!is_color_code("§K"));
        assert!(!is_color_code("&ab"));
    }

    #[test]
    fn placeholders_and_tags_are_ignored() {
        for input in [
            "%player%",
            "<br>",
            "{count}",
            "[Shift]",
            "minecraft:diamond_sword",
            "entity.player.hurt",
            "sound.block.chest.open",
            "https://example.com/wiki?page=1",
            "12345",
            "!!!",
            "... ---",
            "config.client.enabled",
        ] {
            assert!(should_ignore(input), "expected {input:?} to be ignored");
        }
    }

    #[test]
    fn prose_is_not_ignored() {
        for input in [
            "Hello world",
            "You died!",
            "Press the button to continue.",
            "Welcome, %player%!",
            "Diamonds",
        ] {
            assert!(!should_ignore(input), "expected {input:?} to be translatable");
        }
    }

    #[test]
    fn partial_matches_do_not_count() {
        // Only whole-string matches exclude text.
        assert!(!should_ignore("Visit https://example.com today"));
        assert!(!should_ignore("Level 42 reached"));
    }
}
