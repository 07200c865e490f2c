use crate::geom::Coord;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// An invariant of the planar arrangement was violated, usually because
    /// noding at the current precision was not robust enough.
    #[error("topology error: {msg}{}", fmt_at(.at))]
    Topology { msg: String, at: Option<Coord> },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A geometric predicate contradicted itself.
    #[error("internal error: {0}")]
    Internal(String),

    #[error("infinity")]
    Infinity,

    #[error("not a number")]
    NaN,
}

impl Error {
    pub(crate) fn topology(msg: impl Into<String>, at: Option<Coord>) -> Self {
        Error::Topology {
            msg: msg.into(),
            at,
        }
    }

    pub fn is_topology(&self) -> bool {
        matches!(self, Error::Topology { .. })
    }
}

fn fmt_at(at: &Option<Coord>) -> String {
    at.map(|c| format!(" at {c:?}")).unwrap_or_default()
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Rejects non-finite coordinates at the public entry points.
pub(crate) fn check_finite<'a>(coords: impl IntoIterator<Item = &'a Coord>) -> Result<()> {
    for c in coords {
        if c.x.is_nan() || c.y.is_nan() {
            return Err(Error::NaN);
        }
        if c.x.is_infinite() || c.y.is_infinite() {
            return Err(Error::Infinity);
        }
    }
    Ok(())
}
