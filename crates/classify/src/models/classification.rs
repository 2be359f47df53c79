use super::Category;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Outcome of classifying a single image.
///
/// Produced fresh for each file by [`classify`](crate::classify); no rule
/// matching is an ordinary outcome rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// A rule matched: the image belongs in `category` and its destination
    /// filename ends with `suffix`.
    Matched { category: Category, suffix: &'static str },
    /// No rule matched; the image is not organized.
    NoMatch,
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Matched { category, suffix } => write!(f, "{category}/{suffix}"),
            Self::NoMatch => write!(f, "no match"),
        }
    }
}
