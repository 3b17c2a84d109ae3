//! App ID normalization.
//!
//! App IDs arrive as free-form text: pasted lists with commas, stray
//! whitespace or control characters, and occasionally digits typed in a
//! non-ASCII numbering system (full-width, Arabic-Indic, Devanagari, ...).
//! Parsing folds every Unicode decimal digit to its ASCII value, then keeps
//! the maximal digit runs in input order. Non-digit runs act purely as
//! delimiters.

use std::sync::LazyLock;

use regex::Regex;

/// Maximal runs of ASCII digits after folding.
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new("[0-9]+").unwrap());

/// Zero code points of the Unicode decimal-digit (Nd) blocks.
///
/// Every Nd block is ten contiguous code points starting at its zero, so a
/// digit's ASCII value is its offset from the block start.
const DIGIT_ZEROS: &[u32] = &[
    0x0660, // Arabic-Indic
    0x06F0, // Extended Arabic-Indic
    0x07C0, // NKo
    0x0966, // Devanagari
    0x09E6, // Bengali
    0x0A66, // Gurmukhi
    0x0AE6, // Gujarati
    0x0B66, // Oriya
    0x0BE6, // Tamil
    0x0C66, // Telugu
    0x0CE6, // Kannada
    0x0D66, // Malayalam
    0x0DE6, // Sinhala Lith
    0x0E50, // Thai
    0x0ED0, // Lao
    0x0F20, // Tibetan
    0x1040, // Myanmar
    0x1090, // Myanmar Shan
    0x17E0, // Khmer
    0x1810, // Mongolian
    0x1946, // Limbu
    0x19D0, // New Tai Lue
    0x1A80, // Tai Tham Hora
    0x1A90, // Tai Tham Tham
    0x1B50, // Balinese
    0x1BB0, // Sundanese
    0x1C40, // Lepcha
    0x1C50, // Ol Chiki
    0xA620, // Vai
    0xA8D0, // Saurashtra
    0xA900, // Kayah Li
    0xA9D0, // Javanese
    0xA9F0, // Myanmar Tai Laing
    0xAA50, // Cham
    0xABF0, // Meetei Mayek
    0xFF10, // Fullwidth
    0x104A0,  // Osmanya
    0x10D30,  // Hanifi Rohingya
    0x11066,  // Brahmi
    0x110F0,  // Sora Sompeng
    0x11136,  // Chakma
    0x111D0,  // Sharada
    0x112F0,  // Khudawadi
    0x11450,  // Newa
    0x114D0,  // Tirhuta
    0x11650,  // Modi
    0x116C0,  // Takri
    0x11730,  // Ahom
    0x118E0,  // Warang Citi
    0x11950,  // Dives Akuru
    0x11C50,  // Bhaiksuki
    0x11D50,  // Masaram Gondi
    0x11DA0,  // Gunjala Gondi
    0x16A60,  // Mro
    0x16B50,  // Pahawh Hmong
    0x1D7CE,  // Mathematical Bold
    0x1D7D8,  // Mathematical Double-Struck
    0x1D7E2,  // Mathematical Sans-Serif
    0x1D7EC,  // Mathematical Sans-Serif Bold
    0x1D7F6,  // Mathematical Monospace
    0x1E140,  // Nyiakeng Puachue Hmong
    0x1E2F0,  // Wancho
    0x1E950,  // Adlam
    0x1FBF0,  // Segmented
];

/// An ordered sequence of validated App ID tokens.
///
/// Insertion order is preserved and duplicates are kept: the wrapped
/// generator receives the IDs exactly as the user listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppIdSet {
    ids: Vec<String>,
}

impl AppIdSet {
    /// Parse free-form input text into App ID tokens.
    ///
    /// Returns an empty set when the input contains no digits; the caller
    /// decides whether to re-prompt or fail.
    pub fn parse(input: &str) -> Self {
        let folded: String = input.chars().map(fold_digit).collect();
        let ids = DIGIT_RUN
            .find_iter(&folded)
            .map(|m| m.as_str().to_string())
            .collect();
        AppIdSet { ids }
    }

    /// Parse a list of pre-split tokens (e.g. CLI positionals).
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = tokens
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        Self::parse(&joined)
    }

    /// Whether no valid IDs were found.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of IDs, duplicates included.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Iterate the IDs in input order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// The IDs as a slice, in input order.
    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }
}

impl std::fmt::Display for AppIdSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ids.join(", "))
    }
}

/// Fold a Unicode decimal digit to its ASCII equivalent; other characters
/// pass through unchanged.
fn fold_digit(c: char) -> char {
    if c.is_ascii() {
        return c;
    }
    let cp = c as u32;
    for &zero in DIGIT_ZEROS {
        if (zero..zero + 10).contains(&cp) {
            return char::from(b'0' + (cp - zero) as u8);
        }
    }
    c
}
