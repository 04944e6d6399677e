/// Error types shared across the crate
///
/// Compression failures are terminal for the call that produced them and
/// carry no retry policy; retrying is the caller's decision. Session-side
/// failures are mostly recovered in place (see `session::authority`), so
/// the types here describe what went wrong rather than what to do next.

use thiserror::Error;

/// Failures of the photo compression pipeline.
#[derive(Error, Debug)]
pub enum CompressError {
    /// The underlying byte source could not be read.
    #[error("failed to read image source: {0}")]
    Read(#[from] std::io::Error),

    /// The source bytes could not be interpreted as an image.
    #[error("image bytes could not be decoded: {0}")]
    Decode(#[source] image::ImageError),

    /// Every re-encode and fallback tier failed to produce output.
    #[error("all re-encode fallback tiers failed")]
    Compression,

    /// The background pipeline task died before resolving.
    #[error("compression task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Sign-in rejected or failed at the identity provider.
#[derive(Error, Debug)]
pub enum SignInError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("identity provider error: {0}")]
    Backend(String),
}

/// The identity provider's sign-out call failed.
///
/// Local session state is cleared regardless; the remote session may
/// outlive the local one.
#[derive(Error, Debug)]
#[error("provider sign-out failed: {0}")]
pub struct SignOutError(pub String);

/// The profile store could not produce a profile for a signed-in identity.
#[derive(Error, Debug)]
pub enum ProfileFetchError {
    /// No profile document exists for the identity id.
    #[error("no profile document for identity {0}")]
    NotFound(String),

    #[error("profile store error: {0}")]
    Backend(String),
}
