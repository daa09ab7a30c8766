//! The closed ARPABET phoneme inventory the reference table covers.
//!
//! Symbols arrive from grapheme-to-phoneme tooling as strings, sometimes with
//! CMUdict stress digits (`AH0`, `EY1`); parsing strips the digit and rejects
//! anything outside the inventory so every later stage can assume a known
//! phoneme.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScoreError;

/// Broad articulatory class, used for duration priors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhonemeClass {
    Vowel,
    Approximant,
    Nasal,
    Fricative,
    Affricate,
    Stop,
}

macro_rules! phonemes {
    ($($variant:ident => $symbol:literal : $class:ident),+ $(,)?) => {
        /// One phoneme of the 39-symbol ARPABET inventory.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Phoneme {
            $($variant),+
        }

        impl Phoneme {
            /// Every phoneme, in a fixed canonical order.
            pub const ALL: &'static [Phoneme] = &[$(Phoneme::$variant),+];

            /// Canonical ARPABET symbol, without stress digits.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Phoneme::$variant => $symbol),+
                }
            }

            pub fn class(&self) -> PhonemeClass {
                match self {
                    $(Phoneme::$variant => PhonemeClass::$class),+
                }
            }

            fn from_symbol(symbol: &str) -> Option<Phoneme> {
                match symbol {
                    $($symbol => Some(Phoneme::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

phonemes! {
    Aa => "AA" : Vowel,
    Ae => "AE" : Vowel,
    Ah => "AH" : Vowel,
    Ao => "AO" : Vowel,
    Aw => "AW" : Vowel,
    Ay => "AY" : Vowel,
    Eh => "EH" : Vowel,
    Er => "ER" : Vowel,
    Ey => "EY" : Vowel,
    Ih => "IH" : Vowel,
    Iy => "IY" : Vowel,
    Ow => "OW" : Vowel,
    Oy => "OY" : Vowel,
    Uh => "UH" : Vowel,
    Uw => "UW" : Vowel,
    L  => "L"  : Approximant,
    R  => "R"  : Approximant,
    W  => "W"  : Approximant,
    Y  => "Y"  : Approximant,
    M  => "M"  : Nasal,
    N  => "N"  : Nasal,
    Ng => "NG" : Nasal,
    Dh => "DH" : Fricative,
    F  => "F"  : Fricative,
    Hh => "HH" : Fricative,
    S  => "S"  : Fricative,
    Sh => "SH" : Fricative,
    Th => "TH" : Fricative,
    V  => "V"  : Fricative,
    Z  => "Z"  : Fricative,
    Zh => "ZH" : Fricative,
    Ch => "CH" : Affricate,
    Jh => "JH" : Affricate,
    B  => "B"  : Stop,
    D  => "D"  : Stop,
    G  => "G"  : Stop,
    K  => "K"  : Stop,
    P  => "P"  : Stop,
    T  => "T"  : Stop,
}

impl Phoneme {
    pub fn is_vowel(&self) -> bool {
        self.class() == PhonemeClass::Vowel
    }
}

impl fmt::Display for Phoneme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phoneme {
    type Err = ScoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let stripped = raw.trim_end_matches(|c: char| c.is_ascii_digit());
        Phoneme::from_symbol(stripped).ok_or_else(|| ScoreError::UnknownPhoneme {
            symbol: raw.to_string(),
        })
    }
}

impl Serialize for Phoneme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct SymbolVisitor;

impl<'de> Visitor<'de> for SymbolVisitor {
    type Value = Phoneme;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an ARPABET phoneme symbol")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Phoneme, E> {
        value.parse().map_err(|_| {
            de::Error::invalid_value(de::Unexpected::Str(value), &self)
        })
    }
}

impl<'de> Deserialize<'de> for Phoneme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(SymbolVisitor)
    }
}

/// Parses a whitespace-separated symbol string, e.g. `"DH AH K AE T"`.
pub fn parse_sequence(raw: &str) -> crate::error::Result<Vec<Phoneme>> {
    raw.split_whitespace().map(Phoneme::from_str).collect()
}
