//! Sentence preprocessing and tokenization module.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::ScoreError;

/// Tokenization applied to a line before it is split on whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tokenization {
    /// Leave the line untouched.
    #[default]
    None,
    /// mteval-v13a, the WMT standard tokenizer.
    Mteval13a,
    /// mteval-v14 international, based on Unicode punctuation and symbol classes.
    International,
    /// One token per character.
    Char,
}

// mteval-v13a, language-dependent part
static RE_13A_SYMBOLS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([{-~\[-` -&(-+:-@/])").expect("valid 13a symbol pattern"));
static RE_13A_PERIOD_COMMA_AFTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^0-9])([.,])").expect("valid 13a pattern"));
static RE_13A_PERIOD_COMMA_BEFORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([.,])([^0-9])").expect("valid 13a pattern"));
static RE_13A_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"([0-9])(-)").expect("valid 13a pattern"));

// mteval-v14 international
static RE_NONDIGIT_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\d])(\p{P})").expect("valid punctuation pattern"));
static RE_PUNCT_NONDIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{P})([^\d])").expect("valid punctuation pattern"));
static RE_SYMBOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{S})").expect("valid symbol pattern"));

impl Tokenization {
    /// Tokenizes one line, returning a whitespace-separated string.
    pub fn tokenize_line(&self, line: &str) -> String {
        match self {
            Tokenization::None => line.to_string(),
            Tokenization::Mteval13a => tokenize_13a(line),
            Tokenization::International => tokenize_international(line),
            Tokenization::Char => line
                .trim()
                .chars()
                .map(String::from)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Tokenizes one line and splits it into tokens.
    pub fn tokens(&self, line: &str) -> Vec<String> {
        match self {
            Tokenization::None => line.split_whitespace().map(String::from).collect(),
            _ => self
                .tokenize_line(line)
                .split_whitespace()
                .map(String::from)
                .collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tokenization::None => "none",
            Tokenization::Mteval13a => "13a",
            Tokenization::International => "intl",
            Tokenization::Char => "char",
        }
    }
}

impl fmt::Display for Tokenization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tokenization {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Tokenization::None),
            "13a" | "mteval_13a" => Ok(Tokenization::Mteval13a),
            "intl" | "international" | "mteval_v14_international" => {
                Ok(Tokenization::International)
            }
            "char" => Ok(Tokenization::Char),
            other => Err(ScoreError::Config(format!("unknown tokenization '{}'", other))),
        }
    }
}

fn tokenize_13a(line: &str) -> String {
    let mut norm = line
        .replace("<skipped>", "")
        .replace("-\n", "")
        .replace('\n', " ");
    if norm.contains('&') {
        norm = norm
            .replace("&quot;", "\"")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">");
    }

    let norm = format!(" {} ", norm);
    let norm = RE_13A_SYMBOLS.replace_all(&norm, " ${1} ");
    let norm = RE_13A_PERIOD_COMMA_AFTER.replace_all(&norm, "${1} ${2} ");
    let norm = RE_13A_PERIOD_COMMA_BEFORE.replace_all(&norm, " ${1} ${2}");
    let norm = RE_13A_DASH.replace_all(&norm, "${1} ${2} ");

    norm.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn tokenize_international(line: &str) -> String {
    let s = RE_NONDIGIT_PUNCT.replace_all(line, "${1} ${2} ");
    let s = RE_PUNCT_NONDIGIT.replace_all(&s, " ${1} ${2}");
    let s = RE_SYMBOL.replace_all(&s, " ${1} ");
    s.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_keeps_line() {
        let t = Tokenization::None;
        assert_eq!(t.tokenize_line("Hello, world!"), "Hello, world!");
        assert_eq!(t.tokens("  a  b "), vec!["a", "b"]);
    }

    #[test]
    fn test_13a_splits_punctuation() {
        let t = Tokenization::Mteval13a;
        assert_eq!(t.tokenize_line("Hello, world!"), "Hello , world !");
        assert_eq!(t.tokenize_line("It costs 3.50 dollars."), "It costs 3.50 dollars .");
        assert_eq!(t.tokenize_line("a &amp; b"), "a & b");
        assert_eq!(t.tokenize_line("1990-2000"), "1990 - 2000");
    }

    #[test]
    fn test_international_splits_symbols() {
        let t = Tokenization::International;
        assert_eq!(t.tokens("Hello, world!"), vec!["Hello", ",", "world", "!"]);
        assert_eq!(t.tokenize_line("5$"), "5 $");
    }

    #[test]
    fn test_char_tokenization() {
        let t = Tokenization::Char;
        assert_eq!(t.tokenize_line(" abc "), "a b c");
        assert_eq!(t.tokens("ab"), vec!["a", "b"]);
    }

    #[test]
    fn test_parse() {
        assert_eq!("13a".parse::<Tokenization>().unwrap(), Tokenization::Mteval13a);
        assert_eq!("none".parse::<Tokenization>().unwrap(), Tokenization::None);
        assert!("moses".parse::<Tokenization>().is_err());
        assert_eq!(Tokenization::Char.to_string(), "char");
    }
}
