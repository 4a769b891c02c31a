//! Device-configuration XML handling for the ENC profile
//!
//! The plaintext input is an XML document rooted at `<device>`. The
//! companion pointer file derives from it: `<fullConfig>false</fullConfig>`,
//! the preserved children copied verbatim, an MD5 `<certHash>` of the
//! recipient certificate, and `<encrConfig>true</encrConfig>`.

use crate::error::SealError;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Children of `<device>` that the pointer file carries over, in input
/// order
const PRESERVED_ELEMENTS: [&str; 4] = [
    "ipAddressMode",
    "loadInformation",
    "capfAuthMode",
    "capfList",
];

/// The parsed device document: the preserved children with their inner
/// markup captured verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    preserved: Vec<(String, String)>,
}

fn xml_err(e: impl std::fmt::Display) -> SealError {
    SealError::BadConfigXml(e.to_string())
}

impl DeviceConfig {
    /// Parse the input document, asserting the `<device>` root
    pub fn parse(xml: &str) -> Result<Self, SealError> {
        let mut reader = Reader::from_str(xml);
        let mut preserved = Vec::new();

        // Locate the root element past any declaration or comments.
        loop {
            match reader.read_event().map_err(xml_err)? {
                Event::Start(root) => {
                    if root.name().as_ref() != b"device" {
                        return Err(SealError::BadConfigXml(format!(
                            "root element must be <device>, found <{}>",
                            String::from_utf8_lossy(root.name().as_ref())
                        )));
                    }
                    break;
                }
                Event::Decl(_) | Event::Comment(_) | Event::Text(_) | Event::PI(_)
                | Event::DocType(_) => {}
                Event::Eof => {
                    return Err(SealError::BadConfigXml(
                        "document has no root element".to_string(),
                    ));
                }
                other => {
                    return Err(SealError::BadConfigXml(format!(
                        "unexpected XML event before root: {other:?}"
                    )));
                }
            }
        }

        // Walk the direct children of <device>.
        loop {
            match reader.read_event().map_err(xml_err)? {
                Event::Start(child) => {
                    let name = String::from_utf8_lossy(child.name().as_ref()).into_owned();
                    let span = reader.read_to_end(child.name()).map_err(xml_err)?;
                    if PRESERVED_ELEMENTS.contains(&name.as_str()) {
                        preserved.push((name, xml[span].to_string()));
                    }
                }
                Event::Empty(child) => {
                    let name = String::from_utf8_lossy(child.name().as_ref()).into_owned();
                    if PRESERVED_ELEMENTS.contains(&name.as_str()) {
                        preserved.push((name, String::new()));
                    }
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(SealError::BadConfigXml(
                        "unterminated <device> element".to_string(),
                    ));
                }
                _ => {}
            }
        }

        Ok(DeviceConfig { preserved })
    }

    /// Preserved children and their verbatim inner markup
    pub fn preserved(&self) -> &[(String, String)] {
        &self.preserved
    }

    /// Emit the derived pointer document
    pub fn pointer_document(&self, cert_hash_hex: &str) -> Result<Vec<u8>, SealError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_err)?;
        writer
            .write_event(Event::Start(BytesStart::new("device")))
            .map_err(xml_err)?;

        write_text_element(&mut writer, "fullConfig", "false")?;
        for (name, inner) in &self.preserved {
            writer
                .write_event(Event::Start(BytesStart::new(name.as_str())))
                .map_err(xml_err)?;
            // Inner markup was captured verbatim and is re-emitted as-is.
            writer
                .write_event(Event::Text(BytesText::from_escaped(inner.as_str())))
                .map_err(xml_err)?;
            writer
                .write_event(Event::End(BytesEnd::new(name.as_str())))
                .map_err(xml_err)?;
        }
        write_text_element(&mut writer, "certHash", cert_hash_hex)?;
        write_text_element(&mut writer, "encrConfig", "true")?;

        writer
            .write_event(Event::End(BytesEnd::new("device")))
            .map_err(xml_err)?;
        Ok(writer.into_inner())
    }
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), SealError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_err)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_wrong_root() {
        let err = DeviceConfig::parse("<phone><x/></phone>").unwrap_err();
        assert!(err.to_string().contains("<device>"));
    }

    #[test]
    fn test_preserves_known_children_in_order() {
        let xml = "<device>\
            <deviceProtocol>SCCP</deviceProtocol>\
            <loadInformation>P0030301</loadInformation>\
            <ipAddressMode>0</ipAddressMode>\
            <capfList><capf><phonePort>3804</phonePort></capf></capfList>\
            </device>";
        let config = DeviceConfig::parse(xml).unwrap();
        let names: Vec<&str> = config.preserved().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["loadInformation", "ipAddressMode", "capfList"]);
        assert_eq!(config.preserved()[0].1, "P0030301");
        assert_eq!(
            config.preserved()[2].1,
            "<capf><phonePort>3804</phonePort></capf>"
        );
    }

    #[test]
    fn test_pointer_document_shape() {
        let xml = "<device><loadInformation>X</loadInformation></device>";
        let config = DeviceConfig::parse(xml).unwrap();
        let pointer = config.pointer_document("d41d8cd98f00b204e9800998ecf8427e").unwrap();
        let text = String::from_utf8(pointer).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<fullConfig>false</fullConfig>"));
        assert!(text.contains("<loadInformation>X</loadInformation>"));
        assert!(text.contains("<certHash>d41d8cd98f00b204e9800998ecf8427e</certHash>"));
        assert!(text.contains("<encrConfig>true</encrConfig>"));
        // Derived element order: fullConfig, preserved, certHash, encrConfig.
        let full = text.find("<fullConfig>").unwrap();
        let load = text.find("<loadInformation>").unwrap();
        let hash = text.find("<certHash>").unwrap();
        let encr = text.find("<encrConfig>").unwrap();
        assert!(full < load && load < hash && hash < encr);
    }

    #[test]
    fn test_unterminated_document() {
        assert!(DeviceConfig::parse("<device><a>").is_err());
    }
}
