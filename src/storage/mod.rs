//! Ephemeral on-disk storage for in-flight audio files

mod artifact;
mod cookies;
mod workspace;

pub use artifact::{Artifact, ArtifactKind, ArtifactStream, remove_if_exists};
pub use cookies::CookieFile;
pub use workspace::{RequestScope, Workspace};
