use std::fmt;

/// Canonical column order of a parsed review table.
pub const REVIEW_COLUMNS: [&str; 8] = [
    "date",
    "stars",
    "employed",
    "technical",
    "recommends",
    "outlook",
    "ceo_opinion",
    "years",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Date,
    Integer,
    Flag,
    Opinion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewColumn {
    Date,
    Stars,
    Employed,
    Technical,
    Recommends,
    Outlook,
    CeoOpinion,
    Years,
}

impl ReviewColumn {
    pub const ALL: [ReviewColumn; 8] = [
        ReviewColumn::Date,
        ReviewColumn::Stars,
        ReviewColumn::Employed,
        ReviewColumn::Technical,
        ReviewColumn::Recommends,
        ReviewColumn::Outlook,
        ReviewColumn::CeoOpinion,
        ReviewColumn::Years,
    ];

    pub fn canonical_name(&self) -> &'static str {
        match self {
            ReviewColumn::Date => "date",
            ReviewColumn::Stars => "stars",
            ReviewColumn::Employed => "employed",
            ReviewColumn::Technical => "technical",
            ReviewColumn::Recommends => "recommends",
            ReviewColumn::Outlook => "outlook",
            ReviewColumn::CeoOpinion => "ceo_opinion",
            ReviewColumn::Years => "years",
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ReviewColumn::Date => ColumnKind::Date,
            ReviewColumn::Stars | ReviewColumn::Years => ColumnKind::Integer,
            ReviewColumn::Employed | ReviewColumn::Technical | ReviewColumn::Recommends => {
                ColumnKind::Flag
            }
            ReviewColumn::Outlook | ReviewColumn::CeoOpinion => ColumnKind::Opinion,
        }
    }

    /// Matches a header cell against the canonical names and the spellings
    /// found in exported review sheets.
    pub fn from_header(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "date" | "review_date" => Some(ReviewColumn::Date),
            "stars" | "rating" => Some(ReviewColumn::Stars),
            "employed" | "current_employee" => Some(ReviewColumn::Employed),
            "technical" => Some(ReviewColumn::Technical),
            "recommends" | "recommend" => Some(ReviewColumn::Recommends),
            "outlook" => Some(ReviewColumn::Outlook),
            "ceo_opinion" | "ceo" | "ceo_approval" => Some(ReviewColumn::CeoOpinion),
            "years" | "years_employed" => Some(ReviewColumn::Years),
            _ => None,
        }
    }
}

impl fmt::Display for ReviewColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}
