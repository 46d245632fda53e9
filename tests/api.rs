#[macro_use]
extern crate pretty_assertions;

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io;

use rodtd::*;

struct MapResolver(HashMap<&'static str, &'static str>);

impl EntityResolver for MapResolver {
    fn resolve(
        &mut self,
        _public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> io::Result<Option<InputSource>> {
        Ok(system_id
            .and_then(|id| self.0.get(id))
            .map(|text| InputSource::from_str(text)))
    }
}

fn with_resolver(files: &[(&'static str, &'static str)]) -> ParseOptions {
    ParseOptions {
        resolver: Some(Box::new(MapResolver(files.iter().copied().collect()))),
        ..Default::default()
    }
}

#[test]
fn external_subset_01() {
    let dtd = Dtd::parse_external_subset("<!ELEMENT e EMPTY>").unwrap();
    assert_eq!(dtd.element_types().count(), 1);
    assert_eq!(
        dtd.element_type("e").unwrap().content_type(),
        Some(ContentType::Empty)
    );
}

#[test]
fn external_subset_02() {
    let data = "\
<?xml version='1.0' encoding='UTF-8'?>
<!-- a comment -->
<?pi is skipped?>
<!ELEMENT e EMPTY>
";

    let dtd = Dtd::parse_external_subset(data).unwrap();
    assert!(dtd.element_type("e").is_some());
}

#[test]
fn text_declaration_with_encoding_only() {
    let dtd = Dtd::parse_external_subset("<?xml encoding='ISO-8859-1'?><!ELEMENT e ANY>");
    assert!(dtd.is_ok());
}

#[test]
fn invalid_encoding_name() {
    let err = Dtd::parse_external_subset("<?xml encoding='8859'?>").unwrap_err();
    assert!(matches!(err, Error::InvalidEncodingName(_, _)));
}

#[test]
fn document_01() {
    let dtd = Dtd::parse_document("<!DOCTYPE e [<!ELEMENT e (#PCDATA)>]><e>text</e>").unwrap();
    assert_eq!(
        dtd.element_type("e").unwrap().content_type(),
        Some(ContentType::Pcdata)
    );
}

#[test]
fn document_without_doctype() {
    let dtd = Dtd::parse_document("<?xml version='1.0'?><e/>").unwrap();
    assert_eq!(dtd.element_types().count(), 0);
}

#[test]
fn document_rest_is_abandoned() {
    // Everything after the DOCTYPE declaration is not even
    // well-formedness checked.
    let dtd = Dtd::parse_document("<!DOCTYPE e [<!ELEMENT e EMPTY>]><e><broken").unwrap();
    assert!(dtd.element_type("e").is_some());
}

#[test]
fn document_misc_before_doctype() {
    let data = "\
<?xml version='1.0'?>
<!-- license header -->
<?xml-stylesheet href='style.css'?>
<!DOCTYPE e [<!ELEMENT e EMPTY>]>
<e/>
";

    let dtd = Dtd::parse_document(data).unwrap();
    assert!(dtd.element_type("e").is_some());
}

#[test]
fn reader_source() {
    let dtd = parse_external_subset(
        InputSource::from_reader("<!ELEMENT e EMPTY>".as_bytes()),
        ParseOptions::default(),
    )
    .unwrap();
    assert!(dtd.element_type("e").is_some());
}

#[test]
fn doctype_external_subset_via_resolver() {
    let opt = with_resolver(&[("book.dtd", "<!ELEMENT book (#PCDATA)>")]);
    let dtd = parse_xml_document(
        InputSource::from_str("<!DOCTYPE book SYSTEM 'book.dtd'><book/>"),
        opt,
    )
    .unwrap();

    assert_eq!(
        dtd.element_type("book").unwrap().content_type(),
        Some(ContentType::Pcdata)
    );
}

#[test]
fn system_id_source_via_resolver() {
    let opt = with_resolver(&[("root.dtd", "<!ELEMENT e EMPTY>")]);
    let dtd = parse_external_subset(InputSource::from_system_id("root.dtd"), opt).unwrap();
    assert!(dtd.element_type("e").is_some());
}

#[test]
fn external_parameter_entity_via_resolver() {
    let opt = with_resolver(&[("module.dtd", "<!ELEMENT x EMPTY>")]);
    let dtd = parse_external_subset(
        InputSource::from_str("<!ENTITY % module SYSTEM 'module.dtd'>%module;"),
        opt,
    )
    .unwrap();

    assert!(dtd.element_type("x").is_some());
}

#[test]
fn missing_resolver_fails() {
    let err = parse_xml_document(
        InputSource::from_str("<!DOCTYPE e SYSTEM 'missing.dtd'>"),
        ParseOptions::default(),
    )
    .unwrap_err();

    match err {
        Error::UnresolvedEntity(id) => assert_eq!(id, "missing.dtd"),
        _ => panic!("expected an unresolved entity error"),
    }
}

#[test]
fn resolver_without_answer_fails() {
    let opt = with_resolver(&[]);
    let err = parse_external_subset(InputSource::from_system_id("nope.dtd"), opt).unwrap_err();
    assert!(matches!(err, Error::UnresolvedEntity(_)));
}

#[test]
fn resolver_io_error_is_surfaced() {
    struct Failing;
    impl EntityResolver for Failing {
        fn resolve(
            &mut self,
            _public_id: Option<&str>,
            _system_id: Option<&str>,
        ) -> io::Result<Option<InputSource>> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such host"))
        }
    }

    let opt = ParseOptions {
        resolver: Some(Box::new(Failing)),
        ..Default::default()
    };
    let err = parse_external_subset(InputSource::from_system_id("x.dtd"), opt).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn internal_subset_declarations_win() {
    let opt = with_resolver(&[("ext.dtd", "<!ENTITY e 'external'>")]);
    let dtd = parse_xml_document(
        InputSource::from_str("<!DOCTYPE r SYSTEM 'ext.dtd' [<!ENTITY e 'internal'>]><r/>"),
        opt,
    )
    .unwrap();

    assert_eq!(dtd.general_entity("e").unwrap().value(), Some("internal"));
}

#[test]
fn xml_name_forms() {
    let name = XmlName::with_namespace(Some("http://example.com/ns"), Some("p"), "local").unwrap();
    assert_eq!(name.local(), "local");
    assert_eq!(name.prefix(), Some("p"));
    assert_eq!(name.namespace(), Some("http://example.com/ns"));
    assert_eq!(name.qualified(), "p:local");
    assert_eq!(name.universal(), "http://example.com/ns^local");
    assert!(name.is_namespace_aware());

    let plain = XmlName::new("a:b");
    assert_eq!(plain.local(), "a:b");
    assert_eq!(plain.qualified(), "a:b");
    assert_eq!(plain.universal(), "a:b");
    assert!(!plain.is_namespace_aware());
}

#[test]
fn xml_name_equality_ignores_prefix() {
    let a = XmlName::with_namespace(Some("u"), Some("p1"), "l").unwrap();
    let b = XmlName::with_namespace(Some("u"), Some("p2"), "l").unwrap();
    let c = XmlName::with_namespace(Some("other"), Some("p1"), "l").unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn xml_name_rejects_bad_locals() {
    assert!(XmlName::with_namespace(Some("u"), None, "a:b").is_err());
    assert!(XmlName::with_namespace(Some("u"), None, "a^b").is_err());
}

#[test]
fn caller_prefix_map_is_used_directly() {
    let mut prefixes = HashMap::new();
    prefixes.insert("db".to_string(), "http://docbook.org/ns".to_string());

    let opt = ParseOptions {
        prefixes: Some(prefixes),
        ..Default::default()
    };
    let dtd = parse_external_subset(InputSource::from_str("<!ELEMENT db:para EMPTY>"), opt).unwrap();

    let para = dtd.element_type(("http://docbook.org/ns", "para")).unwrap();
    assert_eq!(para.name().prefix(), Some("db"));
    assert_eq!(para.name().local(), "para");
}

#[test]
fn unknown_prefix_fails() {
    let err = Dtd::parse_external_subset("<!ELEMENT db:para EMPTY>").unwrap_err();
    match err {
        Error::UnknownNamespace(prefix) => assert_eq!(prefix, "db"),
        _ => panic!("expected an unknown namespace error"),
    }
}

#[test]
fn syntax_errors_carry_positions() {
    let err = Dtd::parse_external_subset("<!ELEMENT e\n<").unwrap_err();
    assert!(err.pos().is_some());

    let err = Dtd::parse_external_subset("<!BOGUS e>").unwrap_err();
    assert!(matches!(err, Error::UnknownDeclaration(_, _)));
}

#[test]
fn postprocessing_errors_carry_no_position() {
    let err = Dtd::parse_external_subset("<!ELEMENT a (b)>").unwrap_err();
    assert!(matches!(err, Error::UndeclaredElementType(_)));
    assert_eq!(err.pos(), None);
}

#[test]
fn error_display() {
    let err = Dtd::parse_external_subset("<!ELEMENT a EMPTY><!ELEMENT a EMPTY>").unwrap_err();
    let text = err.to_string();
    assert!(text.contains("duplicate element type declaration 'a'"), "{}", text);
    assert!(text.contains(" at 1:"), "{}", text);
}

#[test]
fn eof_mid_declaration() {
    let err = Dtd::parse_external_subset("<!ELEMENT e").unwrap_err();
    assert!(matches!(err, Error::UnexpectedEndOfStream));
}

#[test]
fn pi_content_is_opaque() {
    // `%` and `&` inside a PI are data, not references.
    let dtd = Dtd::parse_external_subset("<?props width=50% grid=a&b?><!ELEMENT e EMPTY>").unwrap();
    assert!(dtd.element_type("e").is_some());
}

#[test]
fn comment_content_is_opaque() {
    let dtd =
        Dtd::parse_external_subset("<!-- 100% & unparsed -->\n<!ELEMENT e EMPTY>").unwrap();
    assert!(dtd.element_type("e").is_some());
}

#[test]
fn comment_requires_closing() {
    let err = Dtd::parse_external_subset("<!-- a -- b -->").unwrap_err();
    assert!(matches!(err, Error::InvalidChar('>', _, _)));
}
