//! CastXML document loading and id-indexed lookup.

use crate::error::{CastXmlError, Result};
use std::collections::HashMap;

const ROOT_TAG: &str = "CastXML";

/// A parsed CastXML document. Cross-references inside the document are by
/// document-unique `id` attributes; [`CastXmlDocument::index`] builds the
/// id table in one pass so lookups are O(1) afterwards.
#[derive(Debug)]
pub struct CastXmlDocument<'input> {
    doc: roxmltree::Document<'input>,
}

impl<'input> CastXmlDocument<'input> {
    /// Parses the XML text and checks the root element tag. A document whose
    /// root is not `<CastXML>` is rejected as structurally invalid.
    pub fn parse(text: &'input str) -> Result<Self> {
        let doc = roxmltree::Document::parse(text)?;

        let root = doc.root_element();
        if root.tag_name().name() != ROOT_TAG {
            return Err(CastXmlError::UnexpectedRoot(
                root.tag_name().name().to_string(),
            ));
        }

        Ok(Self { doc })
    }

    pub fn root(&self) -> roxmltree::Node<'_, 'input> {
        self.doc.root_element()
    }

    /// Builds the id → element table for every element carrying an `id`
    /// attribute.
    pub fn index(&self) -> HashMap<&str, roxmltree::Node<'_, 'input>> {
        self.root()
            .descendants()
            .filter(|node| node.is_element())
            .filter_map(|node| node.attribute("id").map(|id| (id, node)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_castxml_root() {
        let doc = CastXmlDocument::parse(r#"<CastXML format="1.4.0"></CastXML>"#).unwrap();
        assert_eq!(doc.root().tag_name().name(), "CastXML");
    }

    #[test]
    fn rejects_unexpected_root() {
        let err = CastXmlDocument::parse("<GCC_XML></GCC_XML>").unwrap_err();
        assert!(matches!(err, CastXmlError::UnexpectedRoot(tag) if tag == "GCC_XML"));
    }

    #[test]
    fn indexes_elements_by_id() {
        let doc = CastXmlDocument::parse(
            r#"<CastXML><FundamentalType id="_1" name="int"/><File id="f0" name="a.h"/></CastXML>"#,
        )
        .unwrap();

        let index = doc.index();
        assert_eq!(index.len(), 2);
        assert_eq!(index["_1"].attribute("name"), Some("int"));
        assert_eq!(index["f0"].tag_name().name(), "File");
    }
}
