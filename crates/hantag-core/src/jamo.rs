//! Hangul syllable composition and decomposition.
//!
//! A precomposed syllable (U+AC00..U+D7A3) is encoded as
//! `BASE + lead * 588 + vowel * 28 + trailing`, where the three indices
//! point into the fixed lead/vowel/trailing inventories below. Jamo are
//! represented with Hangul Compatibility Jamo (U+3131..U+3163), the form
//! dictionaries and endings such as `ㅂ니다` are written in.

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;
const LEAD_STRIDE: u32 = 588;
const VOWEL_STRIDE: u32 = 28;

pub const LEADS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ',
    'ㅌ', 'ㅍ', 'ㅎ',
];

pub const VOWELS: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ', 'ㅞ',
    'ㅟ', 'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

/// Trailing consonants. Index 0 ("no trailing consonant") is `None` in
/// the public API, so this table starts at index 1.
pub const TRAILINGS: [char; 27] = [
    'ㄱ', 'ㄲ', 'ㄳ', 'ㄴ', 'ㄵ', 'ㄶ', 'ㄷ', 'ㄹ', 'ㄺ', 'ㄻ', 'ㄼ', 'ㄽ', 'ㄾ', 'ㄿ', 'ㅀ', 'ㅁ',
    'ㅂ', 'ㅄ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅊ', 'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JamoError {
    #[error("invalid jamo combination: lead={lead:?} vowel={vowel:?} trailing={trailing:?}")]
    InvalidJamo {
        lead: char,
        vowel: char,
        trailing: Option<char>,
    },
}

/// The three components of a precomposed syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Syllable {
    pub lead: char,
    pub vowel: char,
    /// `None` when the syllable has no trailing consonant.
    pub trailing: Option<char>,
}

impl Syllable {
    pub fn to_char(self) -> Result<char, JamoError> {
        compose(self.lead, self.vowel, self.trailing)
    }

    /// Same lead and vowel, different trailing consonant.
    pub fn with_trailing(self, trailing: Option<char>) -> Result<char, JamoError> {
        compose(self.lead, self.vowel, trailing)
    }

    /// Same lead and trailing consonant, different vowel.
    pub fn with_vowel(self, vowel: char) -> Result<char, JamoError> {
        compose(self.lead, vowel, self.trailing)
    }
}

/// Result of decomposing a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decomposed {
    Syllable(Syllable),
    /// An isolated consonant jamo (ㄱ..ㅎ).
    Consonant(char),
    /// An isolated vowel jamo (ㅏ..ㅣ).
    Vowel(char),
    /// Anything that is not Hangul.
    Other(char),
}

impl Decomposed {
    pub fn syllable(self) -> Option<Syllable> {
        match self {
            Decomposed::Syllable(s) => Some(s),
            _ => None,
        }
    }
}

pub fn is_syllable(c: char) -> bool {
    (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&(c as u32))
}

pub fn is_consonant_jamo(c: char) -> bool {
    ('\u{3131}'..='\u{314E}').contains(&c)
}

pub fn is_vowel_jamo(c: char) -> bool {
    ('\u{314F}'..='\u{3163}').contains(&c)
}

/// Split a character into its jamo. Total: non-Hangul input comes back
/// as `Decomposed::Other`.
pub fn decompose(c: char) -> Decomposed {
    if is_consonant_jamo(c) {
        return Decomposed::Consonant(c);
    }
    if is_vowel_jamo(c) {
        return Decomposed::Vowel(c);
    }
    if !is_syllable(c) {
        return Decomposed::Other(c);
    }
    let offset = c as u32 - SYLLABLE_BASE;
    let lead = offset / LEAD_STRIDE;
    let vowel = (offset % LEAD_STRIDE) / VOWEL_STRIDE;
    let trailing = offset % VOWEL_STRIDE;
    Decomposed::Syllable(Syllable {
        lead: LEADS[lead as usize],
        vowel: VOWELS[vowel as usize],
        trailing: match trailing {
            0 => None,
            t => Some(TRAILINGS[t as usize - 1]),
        },
    })
}

/// Build a syllable from its jamo.
pub fn compose(lead: char, vowel: char, trailing: Option<char>) -> Result<char, JamoError> {
    let invalid = || JamoError::InvalidJamo {
        lead,
        vowel,
        trailing,
    };
    let l = LEADS.iter().position(|&j| j == lead).ok_or_else(invalid)? as u32;
    let v = VOWELS.iter().position(|&j| j == vowel).ok_or_else(invalid)? as u32;
    let t = match trailing {
        None => 0,
        Some(tc) => TRAILINGS.iter().position(|&j| j == tc).ok_or_else(invalid)? as u32 + 1,
    };
    char::from_u32(SYLLABLE_BASE + l * LEAD_STRIDE + v * VOWEL_STRIDE + t).ok_or_else(invalid)
}
