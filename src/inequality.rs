//! Constraint relation tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relation between a constraint's left-hand side and its right-hand side.
///
/// The strict variants [`Le`](Inequality::Le) and [`Gr`](Inequality::Gr) are
/// accepted but relaxed to their non-strict counterparts inside the tableau:
/// a linear objective attains the same optimum on a closed polytope as on
/// the closure of its interior, so the distinction is lost on purpose. The
/// strict symbols survive in serialised fixtures and in [`inversion`].
///
/// [`inversion`]: Inequality::inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Inequality {
    /// Equality, `=`.
    #[serde(rename = "=")]
    Eq,
    /// Less than or equal, `<=`.
    #[serde(rename = "<=")]
    Lq,
    /// Strictly less than, `<`.
    #[serde(rename = "<")]
    Le,
    /// Greater than or equal, `>=`.
    #[serde(rename = ">=")]
    Ge,
    /// Strictly greater than, `>`.
    #[serde(rename = ">")]
    Gr,
}

impl Inequality {
    /// The relation that holds after a row is multiplied by -1.
    #[must_use]
    pub fn inversion(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Lq => Self::Ge,
            Self::Ge => Self::Lq,
            Self::Le => Self::Gr,
            Self::Gr => Self::Le,
        }
    }

    /// The serialised symbol of this relation.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lq => "<=",
            Self::Le => "<",
            Self::Ge => ">=",
            Self::Gr => ">",
        }
    }

    /// Collapses the strict variants onto their non-strict counterparts.
    pub(crate) fn relaxed(self) -> Self {
        match self {
            Self::Le => Self::Lq,
            Self::Gr => Self::Ge,
            other => other,
        }
    }
}

impl fmt::Display for Inequality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
