//! Month names and abbreviations.

/// One recognized spelling of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWord {
    /// 1-based month number.
    pub number: u32,
    /// Abbreviations may carry a trailing `.` in prose (`Sept.`).
    pub abbreviated: bool,
}

const MONTH_WORDS: &[(&str, u32, bool)] = &[
    ("january", 1, false),
    ("jan", 1, true),
    ("february", 2, false),
    ("feb", 2, true),
    ("march", 3, false),
    ("mar", 3, true),
    ("april", 4, false),
    ("apr", 4, true),
    ("may", 5, false),
    ("june", 6, false),
    ("jun", 6, true),
    ("july", 7, false),
    ("jul", 7, true),
    ("august", 8, false),
    ("aug", 8, true),
    ("september", 9, false),
    ("sep", 9, true),
    ("sept", 9, true),
    ("october", 10, false),
    ("oct", 10, true),
    ("november", 11, false),
    ("nov", 11, true),
    ("december", 12, false),
    ("dec", 12, true),
];

/// Looks up a bare alphabetic word, case-insensitively.
pub fn lookup(word: &str) -> Option<MonthWord> {
    MONTH_WORDS
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(word))
        .map(|&(_, number, abbreviated)| MonthWord {
            number,
            abbreviated,
        })
}

/// Resolves a month token as written (`March`, `sept.`) to its number.
pub fn month_number(token: &str) -> Option<u32> {
    let bare = token.strip_suffix('.').unwrap_or(token);
    lookup(bare).map(|word| word.number)
}
