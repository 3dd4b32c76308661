//! Left/right mirror tables.
//!
//! A table registers pairs of side tokens (`L_`/`R_`, `_lf`/`_rt`,
//! `left`/`right`...) and the attributes whose values flip sign when
//! mirrored. Tables are authored as JSON:
//!
//! ```text
//! {
//!     "leftRight": [["L_", "R_"], ["Left", "Right"]],
//!     "mirrorAxis": ["translateX", "rotateY", "rotateZ"],
//!     "mode": "swap"
//! }
//! ```

use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::TypedValue;
use crate::naming::short_name;
use crate::util::{json, Error, Result};

/// How mirrored values are written back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MirrorMode {
    /// Left values go to right objects and back, axis attributes negated
    #[default]
    Swap,
    /// Every value goes back onto its own object, axis attributes negated
    MirrorOnSelf,
    /// Like `Swap` without negation (behaviour-mirrored rigs)
    Exchange,
}

impl MirrorMode {
    /// Axis attributes are negated in this mode.
    pub fn inverts(&self) -> bool {
        matches!(self, Self::Swap | Self::MirrorOnSelf)
    }

    /// Values move to the opposite side's objects.
    pub fn swaps_sides(&self) -> bool {
        matches!(self, Self::Swap | Self::Exchange)
    }
}

/// Side of a name according to a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Center,
}

/// Which stored sides a mirrored restore applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MirrorOption {
    /// Both sides (and center objects)
    #[default]
    Both,
    /// Only left-side sources, landing on the right
    LeftToRight,
    /// Only right-side sources, landing on the left
    RightToLeft,
}

impl MirrorOption {
    /// Center objects always participate.
    pub fn applies_to(&self, side: Side) -> bool {
        match (self, side) {
            (_, Side::Center) | (Self::Both, _) => true,
            (Self::LeftToRight, Side::Left) | (Self::RightToLeft, Side::Right) => true,
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
struct Token {
    text: String,
    counterpart: String,
    side: Side,
}

/// On-disk table layout.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MirrorTableFile {
    left_right: Vec<(String, String)>,
    #[serde(default)]
    mirror_axis: Vec<String>,
    #[serde(default)]
    mode: MirrorMode,
}

/// Left/right token pairs, sign-inverted attributes and a mirror mode.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "MirrorTableFile", into = "MirrorTableFile")]
pub struct MirrorTable {
    pairs: Vec<(String, String)>,
    mirror_axis: IndexSet<String>,
    mode: MirrorMode,
    /// Both sides' tokens, longest first
    tokens: Vec<Token>,
}

/// Character class used for boundary checks and pair validation.
fn edge_class(c: char) -> u8 {
    if c.is_uppercase() {
        0
    } else if c.is_lowercase() {
        1
    } else if c.is_alphanumeric() {
        2
    } else {
        3
    }
}

impl MirrorTable {
    /// Build a table, validating the token pairs.
    ///
    /// Tokens must be non-empty and distinct, and both tokens of a pair must
    /// start and end with the same kind of character so that mirroring a
    /// name twice gives it back.
    pub fn new<I, S>(pairs: I, mirror_axis: &[S], mode: MirrorMode) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
        S: AsRef<str>,
    {
        let pairs: Vec<(String, String)> = pairs.into_iter().collect();
        let mut seen = IndexSet::new();
        let mut tokens = Vec::with_capacity(pairs.len() * 2);

        for (left, right) in &pairs {
            if left.is_empty() || right.is_empty() {
                return Err(Error::format("mirror table has an empty side token"));
            }
            if left == right {
                return Err(Error::format(format!("mirror token {} pairs with itself", left)));
            }
            let edges = |s: &str| (s.chars().next().map(edge_class), s.chars().last().map(edge_class));
            if edges(left.as_str()) != edges(right.as_str()) {
                return Err(Error::format(format!(
                    "mirror tokens {} and {} have different boundaries",
                    left, right
                )));
            }
            for token in [left, right] {
                if !seen.insert(token.clone()) {
                    return Err(Error::format(format!("mirror token {} registered twice", token)));
                }
            }
            tokens.push(Token {
                text: left.clone(),
                counterpart: right.clone(),
                side: Side::Left,
            });
            tokens.push(Token {
                text: right.clone(),
                counterpart: left.clone(),
                side: Side::Right,
            });
        }

        // Stable sort keeps table order among equal lengths.
        tokens.sort_by(|a, b| b.text.len().cmp(&a.text.len()));

        Ok(Self {
            pairs,
            mirror_axis: mirror_axis.iter().map(|a| a.as_ref().to_string()).collect(),
            mode,
            tokens,
        })
    }

    /// Load a table file (`//` comments allowed).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file: MirrorTableFile = json::read_json(path.as_ref(), true)?;
        let table = Self::try_from(file)?;
        debug!(
            "Loaded mirror table {} ({} pairs, {} axis attributes)",
            path.as_ref().display(),
            table.pairs.len(),
            table.mirror_axis.len()
        );
        Ok(table)
    }

    /// Parse a table from JSON text.
    pub fn parse(text: &str) -> Result<Self> {
        let file: MirrorTableFile = serde_json::from_str(&json::strip_comments(text))
            .map_err(|e| Error::format(e.to_string()))?;
        Self::try_from(file)
    }

    /// Atomically write the table.
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        json::write_json_atomic(path.as_ref(), self, true)
    }

    pub fn mode(&self) -> MirrorMode {
        self.mode
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_mirror_axis(&self, attr: &str) -> bool {
        self.mirror_axis.contains(attr)
    }

    /// Token match at `start`, if the token sits on name boundaries.
    fn token_at(&self, name: &str, start: usize) -> Option<&Token> {
        let rest = &name[start..];
        let prev = name[..start].chars().next_back();

        self.tokens.iter().find(|token| {
            if !rest.starts_with(token.text.as_str()) {
                return false;
            }
            let next = rest[token.text.len()..].chars().next();
            let (Some(first), Some(last)) = (token.text.chars().next(), token.text.chars().last())
            else {
                return false;
            };
            let leading_ok = match prev {
                Some(p) if first.is_alphanumeric() && p.is_alphanumeric() => {
                    p.is_lowercase() && first.is_uppercase()
                }
                _ => true,
            };
            let trailing_ok = match next {
                Some(n) if last.is_alphanumeric() && n.is_alphanumeric() => {
                    last.is_lowercase() && n.is_uppercase()
                }
                _ => true,
            };
            leading_ok && trailing_ok
        })
    }

    /// Swap every registered side token in `path` for its counterpart.
    ///
    /// Tokens are tried longest first at each position and only match on
    /// name boundaries, so `L_` never matches inside `ALL_`.
    pub fn match_object(&self, path: &str) -> String {
        let mut out = String::with_capacity(path.len());
        let mut i = 0;
        while let Some(ch) = path[i..].chars().next() {
            match self.token_at(path, i) {
                Some(token) => {
                    out.push_str(&token.counterpart);
                    i += token.text.len();
                }
                None => {
                    out.push(ch);
                    i += ch.len_utf8();
                }
            }
        }
        out
    }

    /// Side of the object's short name: the first boundary token decides.
    pub fn side_of(&self, path: &str) -> Side {
        let name = short_name(path);
        let mut i = 0;
        while let Some(ch) = name[i..].chars().next() {
            if let Some(token) = self.token_at(name, i) {
                return token.side;
            }
            i += ch.len_utf8();
        }
        Side::Center
    }

    /// Destination of a mirrored value under this table's mode.
    pub fn mirror_target(&self, path: &str) -> String {
        if self.mode.swaps_sides() {
            self.match_object(path)
        } else {
            path.to_string()
        }
    }

    /// Negate `value` if `attr` is an axis attribute and the mode inverts.
    pub fn mirror_value(&self, attr: &str, value: &TypedValue) -> TypedValue {
        if self.mode.inverts() && self.is_mirror_axis(attr) {
            value.negated()
        } else {
            value.clone()
        }
    }
}

impl TryFrom<MirrorTableFile> for MirrorTable {
    type Error = Error;

    fn try_from(file: MirrorTableFile) -> Result<Self> {
        Self::new(file.left_right, &file.mirror_axis, file.mode)
    }
}

impl From<MirrorTable> for MirrorTableFile {
    fn from(table: MirrorTable) -> Self {
        Self {
            left_right: table.pairs,
            mirror_axis: table.mirror_axis.into_iter().collect(),
            mode: table.mode,
        }
    }
}
