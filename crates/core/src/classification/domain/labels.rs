use std::fmt;

/// A fixed, ordered set of classes. Index `i` of a model's score vector
/// belongs to `Self::ALL[i]`.
pub trait Category: Copy + fmt::Debug + fmt::Display + 'static {
    const ALL: &'static [Self];

    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Category for Gender {
    const ALL: &'static [Self] = &[Gender::Male, Gender::Female];
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        })
    }
}

/// Age ranges in the positional order of the age model's output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeBracket {
    Infant,
    Toddler,
    Child,
    Teen,
    YoungAdult,
    Adult,
    MiddleAged,
    Senior,
}

impl Category for AgeBracket {
    const ALL: &'static [Self] = &[
        AgeBracket::Infant,
        AgeBracket::Toddler,
        AgeBracket::Child,
        AgeBracket::Teen,
        AgeBracket::YoungAdult,
        AgeBracket::Adult,
        AgeBracket::MiddleAged,
        AgeBracket::Senior,
    ];
}

impl AgeBracket {
    /// Range text without delimiters, e.g. `"8-12"`.
    pub fn range(self) -> &'static str {
        match self {
            AgeBracket::Infant => "0-2",
            AgeBracket::Toddler => "4-6",
            AgeBracket::Child => "8-12",
            AgeBracket::Teen => "15-20",
            AgeBracket::YoungAdult => "20-25",
            AgeBracket::Adult => "30-40",
            AgeBracket::MiddleAged => "40-50",
            AgeBracket::Senior => "60-100",
        }
    }
}

/// Displays the bracket label as drawn on frames, e.g. `"(8-12)"`.
impl fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.range())
    }
}

/// Index of the highest score. Ties resolve to the first index; NaN
/// scores never win.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    scores
        .iter()
        .enumerate()
        .filter(|(_, s)| !s.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, &s)| match best {
            Some((_, b)) if b >= s => best,
            _ => Some((i, s)),
        })
        .map(|(i, _)| i)
}

/// A label together with the score vector it was read from.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassPrediction<L> {
    pub label: L,
    pub scores: Vec<f32>,
}

impl<L: Category> ClassPrediction<L> {
    /// Maps the argmax of `scores` onto `L::ALL`.
    ///
    /// Returns `None` when the vector is empty, all-NaN, or its length
    /// differs from the category count.
    pub fn from_scores(scores: Vec<f32>) -> Option<Self> {
        if scores.len() != L::ALL.len() {
            return None;
        }
        let label = L::from_index(argmax(&scores)?)?;
        Some(Self { label, scores })
    }

    pub fn confidence(&self) -> f32 {
        argmax(&self.scores).map_or(0.0, |i| self.scores[i])
    }
}
