use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ParseValueError;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimplificationLevel {
    #[default]
    Simple,
    Moderate,
    Advanced,
}

impl SimplificationLevel {
    pub const ALL: [SimplificationLevel; 3] = [Self::Simple, Self::Moderate, Self::Advanced];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for SimplificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimplificationLevel {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseValueError::new("simplification level", value))
    }
}

/// Target languages offered by the translation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Hindi,
    Bengali,
    Telugu,
    Marathi,
    Tamil,
    Urdu,
    Gujarati,
    Kannada,
    Odia,
    Punjabi,
    Malayalam,
    Assamese,
    Maithili,
    Santali,
    Konkani,
    Manipuri,
    Bodo,
    Dogri,
    Kashmiri,
    Sindhi,
    Sanskrit,
}

impl Language {
    pub const ALL: [Language; 21] = [
        Self::Hindi,
        Self::Bengali,
        Self::Telugu,
        Self::Marathi,
        Self::Tamil,
        Self::Urdu,
        Self::Gujarati,
        Self::Kannada,
        Self::Odia,
        Self::Punjabi,
        Self::Malayalam,
        Self::Assamese,
        Self::Maithili,
        Self::Santali,
        Self::Konkani,
        Self::Manipuri,
        Self::Bodo,
        Self::Dogri,
        Self::Kashmiri,
        Self::Sindhi,
        Self::Sanskrit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hindi => "Hindi",
            Self::Bengali => "Bengali",
            Self::Telugu => "Telugu",
            Self::Marathi => "Marathi",
            Self::Tamil => "Tamil",
            Self::Urdu => "Urdu",
            Self::Gujarati => "Gujarati",
            Self::Kannada => "Kannada",
            Self::Odia => "Odia",
            Self::Punjabi => "Punjabi",
            Self::Malayalam => "Malayalam",
            Self::Assamese => "Assamese",
            Self::Maithili => "Maithili",
            Self::Santali => "Santali",
            Self::Konkani => "Konkani",
            Self::Manipuri => "Manipuri",
            Self::Bodo => "Bodo",
            Self::Dogri => "Dogri",
            Self::Kashmiri => "Kashmiri",
            Self::Sindhi => "Sindhi",
            Self::Sanskrit => "Sanskrit",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|language| language.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseValueError::new("language", value))
    }
}

/// Risk categories the annotation engine tags clauses with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Obligation,
    Penalty,
    Condition,
    Right,
    Definition,
    Limitation,
    Termination,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 7] = [
        Self::Obligation,
        Self::Penalty,
        Self::Condition,
        Self::Right,
        Self::Definition,
        Self::Limitation,
        Self::Termination,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Obligation => "obligation",
            Self::Penalty => "penalty",
            Self::Condition => "condition",
            Self::Right => "right",
            Self::Definition => "definition",
            Self::Limitation => "limitation",
            Self::Termination => "termination",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Obligation => "Obligation",
            Self::Penalty => "Penalty",
            Self::Condition => "Condition",
            Self::Right => "Right",
            Self::Definition => "Definition",
            Self::Limitation => "Limitation",
            Self::Termination => "Termination",
        }
    }

    /// Legend colour as an `#RRGGBB` string.
    pub fn color_hex(self) -> &'static str {
        match self {
            Self::Obligation => "#3B82F6",
            Self::Penalty => "#EF4444",
            Self::Condition => "#F97316",
            Self::Right => "#10B981",
            Self::Definition => "#8B5CF6",
            Self::Limitation => "#6366F1",
            Self::Termination => "#EC4899",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        let hex = &self.color_hex()[1..];
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        (channel(0), channel(2), channel(4))
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskCategory {
    type Err = ParseValueError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseValueError::new("risk category", value))
    }
}
