use serde::{Deserialize, Serialize};

/// A single named opening line: an ECO code, a human-readable name and
/// the sequence of SAN move tokens that defines it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    pub eco: String,
    pub name: String,
    pub moves: Vec<String>,
}

impl Opening {
    pub fn new(
        eco: impl Into<String>,
        name: impl Into<String>,
        moves: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Opening {
            eco: eco.into(),
            name: name.into(),
            moves: moves.into_iter().map(Into::into).collect(),
        }
    }
}
