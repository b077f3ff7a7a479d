//! End-of-line detection, normalisation, and translation.
//!
//! The buffer keeps its in-memory text normalised to `'\n'`; the EOL tag
//! only decides how terminators are written out (and how a foreign buffer
//! is folded back to `'\n'`).

use std::borrow::Cow;
use std::str::FromStr;

use crate::error::Error;

/// The three recognised line-terminator conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EolType {
    /// `"\n"`
    #[default]
    Unix,
    /// `"\r\n"`
    Windows,
    /// `"\r"` (classic Mac OS)
    Mac,
}

impl EolType {
    /// Returns the terminator string for this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            EolType::Unix => "\n",
            EolType::Windows => "\r\n",
            EolType::Mac => "\r",
        }
    }

    /// Detects the dominant convention in `text`.
    ///
    /// Any `"\r\n"` makes it Windows; a `"\r"` with no `"\n"` anywhere
    /// makes it Mac; everything else is Unix.
    pub fn detect(text: &str) -> EolType {
        if text.contains("\r\n") {
            EolType::Windows
        } else if text.contains('\r') && !text.contains('\n') {
            EolType::Mac
        } else {
            EolType::Unix
        }
    }

    /// Folds every `"\r\n"` and `"\r"` in `text` down to `"\n"`.
    pub fn normalize(text: &str) -> Cow<'_, str> {
        if !text.contains('\r') {
            return Cow::Borrowed(text);
        }
        let mut out = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '\r' {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push('\n');
            } else {
                out.push(ch);
            }
        }
        Cow::Owned(out)
    }

    /// Translates every `'\n'` in (already normalised) `text` into this
    /// tag's terminator.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match self {
            EolType::Unix => Cow::Borrowed(text),
            EolType::Windows => Cow::Owned(text.replace('\n', "\r\n")),
            EolType::Mac => Cow::Owned(text.replace('\n', "\r")),
        }
    }

    /// Converts `text` (in any mix of conventions) to this tag's form.
    pub fn convert<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match EolType::normalize(text) {
            Cow::Borrowed(s) => self.apply(s),
            Cow::Owned(s) => Cow::Owned(self.apply(&s).into_owned()),
        }
    }
}

impl FromStr for EolType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "\n" => Ok(EolType::Unix),
            "\r\n" => Ok(EolType::Windows),
            "\r" => Ok(EolType::Mac),
            other => Err(Error::InvalidEol(other.to_string())),
        }
    }
}
