#![forbid(unsafe_code)]

//! Transform chain for XML-DSig references.
//!
//! A reference URI selects a node-set ([`uri`]); the transforms then run in
//! list order, each consuming the previous output ([`pipeline`]). The chain
//! used for fiscal documents is enveloped-signature removal followed by
//! Canonical XML 1.0.

pub mod enveloped;
pub mod pipeline;
pub mod uri;

pub use enveloped::EnvelopedSignatureTransform;
pub use pipeline::{C14nTransform, Transform, TransformData, TransformPipeline};
