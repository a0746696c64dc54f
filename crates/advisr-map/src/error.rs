use thiserror::Error;

use advisr_api::ApiError;
use advisr_core::ValidationError;

/// Failure to submit a create-location or create-category form.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Field-scoped validation failed; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The backend refused the write or could not be reached.
    #[error(transparent)]
    Backend(#[from] ApiError),
}
