//! Archive naming, assembly, remapping and verification.
//!
//! # Sub-modules
//!
//! - [`assembler`] - Reproducible jar writing (`JarAssembler`).
//! - [`assembly_error`] - Error types for assembly failures.
//! - [`digest`] - SHA-256 digests (`Sha256Digest`).
//! - [`layout`] - Output paths for one build (`ArtifactLayout`).
//! - [`naming`] - Archive naming policy (`ArchiveName`).
//! - [`remap`] - Dev-to-final archive transformation (`Remapper`).
//! - [`source_set`] - Source-set groups and their entries.

pub mod assembler;
pub mod assembly_error;
pub mod digest;
pub mod layout;
pub mod naming;
pub mod remap;
pub mod source_set;
