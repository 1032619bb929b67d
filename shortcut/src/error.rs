use crate::{action::Arity, host::HostError};
use smol_str::SmolStr;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("action `{name}` is already registered")]
    DuplicateName { name: SmolStr },

    #[error("unknown action `{name}`")]
    UnknownAction { name: SmolStr },

    #[error("action `{name}` takes {expected} argument(s), got {got}")]
    ArityMismatch {
        name: SmolStr,
        expected: Arity,
        got: usize,
    },

    #[error("action `{name}` has no query form")]
    NoQuery { name: SmolStr },

    #[error(transparent)]
    Host(#[from] HostError),
}
