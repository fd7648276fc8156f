//! Lossless tokenization of mixed prose/markup strings.
//!
//! `split` cuts a string at every protected span (formatting codes,
//! placeholders, tags, namespaced ids, URLs, commands, dotted identifiers).
//! The protected spans become [`TokenKind::Preserve`] tokens and the text in
//! between becomes [`TokenKind::Candidate`] tokens, unless the classifier says
//! that text is not worth translating either. Concatenating the token texts
//! always reproduces the input.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classifier::{is_color_code, should_ignore};

static SPLIT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
            [&§][0-9a-fk-orA-F]           # color / style code
          | %[^%]*%                       # %player%
          | <[^<>]*>                      # <tag>
          | \{[^{}]*\}                    # {0}, {name}
          | \[[^\[\]]*\]                  # [key]
          | minecraft:[a-zA-Z0-9_]+       # namespaced id
          | https?://\S+                  # URL
          | /\w+                          # command
          | \b[a-zA-Z0-9_.]+\.[a-zA-Z0-9_.]+\b   # dotted identifier
        ",
    )
    .expect("valid split regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Preserve,
    Candidate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Set on a candidate that directly follows a color code with no
    /// whitespace in between. The translation of such a token is glued to the
    /// code without leading whitespace.
    pub glued: bool,
}

impl Token {
    pub fn preserve(text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Preserve,
            text: text.into(),
            glued: false,
        }
    }

    pub fn candidate(text: impl Into<String>) -> Self {
        Self {
            kind: TokenKind::Candidate,
            text: text.into(),
            glued: false,
        }
    }

    pub fn is_candidate(&self) -> bool {
        self.kind == TokenKind::Candidate
    }
}

pub fn split(text: &str) -> Vec<Token> {
    if text.is_empty() {
        return Vec::new();
    }
    if should_ignore(text) {
        return vec![Token::preserve(text)];
    }

    let mut tokens = Vec::new();
    let mut cursor = 0usize;
    for mat in SPLIT_REGEX.find_iter(text) {
        if mat.start() > cursor {
            tokens.push(classify_free_text(&text[cursor..mat.start()]));
        }
        tokens.push(Token::preserve(mat.as_str()));
        cursor = mat.end();
    }
    if cursor < text.len() {
        tokens.push(classify_free_text(&text[cursor..]));
    }

    for index in 1..tokens.len() {
        let follows_code = is_color_code(&tokens[index - 1].text);
        let token = &mut tokens[index];
        if follows_code
            && token.is_candidate()
            && !token.text.starts_with(char::is_whitespace)
        {
            token.glued = true;
        }
    }

    tokens
}

/// Concatenates token texts back into a single string.
pub fn join(tokens: &[Token]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

fn classify_free_text(text: &str) -> Token {
    if should_ignore(text) {
        Token::preserve(text)
    } else {
        Token::candidate(text)
    }
}
