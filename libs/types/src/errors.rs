//! Error taxonomy
//!
//! Validation failures travel through rejection callbacks as readable
//! strings; only ledger operations have typed errors.

use crate::ids::ParticipantId;
use thiserror::Error;

/// Errors from the portfolio ledger
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
    #[error("participant not found: {0}")]
    ParticipantNotFound(ParticipantId),
}
