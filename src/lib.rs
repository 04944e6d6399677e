//! Core engines for a small club-management application.
//!
//! Everything persistent lives in the hosted document database and object
//! storage; the screens around them are thin CRUD. What this crate owns
//! are the two stateful pieces in between:
//!
//! - [`photo`]: the gallery upload pipeline, which decodes, downscales,
//!   flattens and re-encodes an image to a JPEG data-URL under a byte
//!   budget, with fixed fallback tiers and progress reporting.
//! - [`session`]: the session authority, which owns identity and profile
//!   lifecycle, the inactivity timeout, hierarchical role checks, and
//!   redirect signaling for the route guard.
//!
//! The hosted auth platform and profile store are consumed through the
//! traits in [`session::provider`]; the UI layer and router are expected
//! to inject implementations at startup.

pub mod error;
pub mod photo;
pub mod session;

pub use error::{CompressError, ProfileFetchError, SignInError, SignOutError};
pub use photo::{compress, CompressedImage, CompressionOptions, ImageSource};
pub use session::{
    Credential, Identity, IdentityProvider, Profile, ProfileStore, Role, SessionAuthority,
    SessionConfig, SessionEvent, SessionPhase, SessionSnapshot,
};
