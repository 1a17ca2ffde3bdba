#![forbid(unsafe_code)]

//! Turning the content to sign into XML text.

use dfesig_core::Error;
use dfesig_xml::XmlDocument;
use serde::Serialize;

/// Content that can be written out as XML text.
pub trait XmlSerializer {
    fn to_xml(&self) -> Result<String, Error>;
}

impl XmlSerializer for str {
    fn to_xml(&self) -> Result<String, Error> {
        Ok(self.to_owned())
    }
}

impl XmlSerializer for String {
    fn to_xml(&self) -> Result<String, Error> {
        Ok(self.clone())
    }
}

impl XmlSerializer for XmlDocument {
    fn to_xml(&self) -> Result<String, Error> {
        Ok(self.text().to_owned())
    }
}

/// Any `serde::Serialize` value, written with `quick-xml`.
///
/// The root element name comes from the type name or its
/// `#[serde(rename = "...")]`; fields renamed with a leading `@` become
/// attributes.
#[derive(Debug, Clone, Copy)]
pub struct SerdeXml<'a, T: ?Sized>(pub &'a T);

impl<T: Serialize + ?Sized> XmlSerializer for SerdeXml<'_, T> {
    fn to_xml(&self) -> Result<String, Error> {
        quick_xml::se::to_string(self.0).map_err(|e| Error::Serialization(e.to_string()))
    }
}
