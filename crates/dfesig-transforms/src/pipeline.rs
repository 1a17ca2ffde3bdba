#![forbid(unsafe_code)]

//! Transform pipeline and trait definitions.

use dfesig_c14n::{C14nMode, Canonicalizer, InclusiveC14n};
use dfesig_core::{algorithm, Error};
use dfesig_xml::NodeSet;

/// Data flowing through the transform pipeline.
#[derive(Debug, Clone)]
pub enum TransformData {
    /// A node-set over `xml_text` (`None` means the whole document).
    Xml {
        xml_text: String,
        node_set: Option<NodeSet>,
    },
    /// Octets, the output of canonicalization.
    Binary(Vec<u8>),
}

impl TransformData {
    /// Convert to octets. A node-set still pending at the end of the chain
    /// is serialized with Canonical XML 1.0 (without comments).
    pub fn into_binary(self) -> Result<Vec<u8>, Error> {
        match self {
            TransformData::Binary(data) => Ok(data),
            TransformData::Xml { xml_text, node_set } => {
                let doc = dfesig_xml::parse(&xml_text)?;
                InclusiveC14n::default().canonicalize(&doc, node_set.as_ref())
            }
        }
    }
}

/// Trait for individual transforms.
pub trait Transform: Send + Sync {
    /// The algorithm URI for this transform.
    fn uri(&self) -> &'static str;

    /// Execute the transform on the given data.
    fn execute(&self, input: TransformData) -> Result<TransformData, Error>;
}

/// A pipeline of transforms executed in sequence.
#[derive(Default)]
pub struct TransformPipeline {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline from `Transform` algorithm URIs, in order.
    pub fn from_uris<S: AsRef<str>>(uris: &[S]) -> Result<Self, Error> {
        let mut pipeline = Self::new();
        for uri in uris {
            pipeline.push(transform_from_uri(uri.as_ref())?);
        }
        Ok(pipeline)
    }

    /// Add a transform to the pipeline.
    pub fn push(&mut self, transform: Box<dyn Transform>) {
        self.transforms.push(transform);
    }

    /// Execute all transforms in order.
    pub fn execute(&self, input: TransformData) -> Result<TransformData, Error> {
        let mut data = input;
        for transform in &self.transforms {
            tracing::trace!(transform = transform.uri(), "applying transform");
            data = transform.execute(data)?;
        }
        Ok(data)
    }

    /// Algorithm URIs, in execution order.
    pub fn uris(&self) -> Vec<&'static str> {
        self.transforms.iter().map(|t| t.uri()).collect()
    }
}

/// Create a transform from its algorithm URI.
pub fn transform_from_uri(uri: &str) -> Result<Box<dyn Transform>, Error> {
    if uri == algorithm::ENVELOPED_SIGNATURE {
        return Ok(Box::new(crate::enveloped::EnvelopedSignatureTransform));
    }
    match C14nMode::from_uri(uri) {
        Some(mode) => Ok(Box::new(C14nTransform::new(mode.canonicalizer()))),
        None => Err(Error::UnsupportedAlgorithm(format!("transform: {uri}"))),
    }
}

// ── C14N Transform ───────────────────────────────────────────────────

/// A canonicalization transform: node-set in, octets out.
pub struct C14nTransform {
    canonicalizer: Box<dyn Canonicalizer>,
}

impl C14nTransform {
    pub fn new(canonicalizer: impl Canonicalizer + 'static) -> Self {
        Self {
            canonicalizer: Box::new(canonicalizer),
        }
    }
}

impl Transform for C14nTransform {
    fn uri(&self) -> &'static str {
        self.canonicalizer.uri()
    }

    fn execute(&self, input: TransformData) -> Result<TransformData, Error> {
        let bytes = match input {
            TransformData::Xml { xml_text, node_set } => {
                let doc = dfesig_xml::parse(&xml_text)?;
                self.canonicalizer.canonicalize(&doc, node_set.as_ref())?
            }
            TransformData::Binary(data) => {
                let text = std::str::from_utf8(&data)
                    .map_err(|e| Error::Transform(format!("invalid UTF-8: {e}")))?;
                let doc = dfesig_xml::parse(text)?;
                self.canonicalizer.canonicalize(&doc, None)?
            }
        };
        Ok(TransformData::Binary(bytes))
    }
}
