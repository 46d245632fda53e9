#[macro_use]
extern crate pretty_assertions;

use rodtd::*;

#[test]
fn internal_general_entity() {
    let dtd = Dtd::parse_external_subset("<!ENTITY title \"The Joy of Entities\">").unwrap();

    let entity = dtd.general_entity("title").unwrap();
    assert_eq!(entity.name(), "title");
    assert_eq!(entity.value(), Some("The Joy of Entities"));
    assert_eq!(entity.system_id(), None);
    assert_eq!(entity.public_id(), None);
}

#[test]
fn external_general_entity() {
    let dtd = Dtd::parse_external_subset(
        "<!ENTITY chap1 PUBLIC \"-//book//chapter 1//EN\" \"chap1.xml\">",
    )
    .unwrap();

    let entity = dtd.general_entity("chap1").unwrap();
    assert_eq!(entity.value(), None);
    assert_eq!(entity.public_id(), Some("-//book//chapter 1//EN"));
    assert_eq!(entity.system_id(), Some("chap1.xml"));
}

#[test]
fn predefined_entities_are_installed() {
    let dtd = Dtd::parse_external_subset("").unwrap();

    assert_eq!(dtd.general_entities().count(), 5);
    for name in ["lt", "gt", "amp", "apos", "quot"] {
        assert!(dtd.general_entity(name).is_some(), "{}", name);
    }
    assert_eq!(dtd.general_entity("lt").unwrap().value(), Some("&#60;"));
}

#[test]
fn parameter_entities_are_retained() {
    let dtd = Dtd::parse_external_subset("<!ENTITY % common \"id CDATA #IMPLIED\">").unwrap();

    let pe = dtd.parameter_entity("common").unwrap();
    assert_eq!(pe.name(), "common");
    assert_eq!(pe.value(), Some("id CDATA #IMPLIED"));
    assert!(dtd.general_entity("common").is_none());
}

#[test]
fn parameter_and_general_namespaces_are_separate() {
    let data = "\
<!ENTITY % shared \"parameter\">
<!ENTITY shared \"general\">
";

    let dtd = Dtd::parse_external_subset(data).unwrap();
    assert_eq!(dtd.parameter_entity("shared").unwrap().value(), Some("parameter"));
    assert_eq!(dtd.general_entity("shared").unwrap().value(), Some("general"));
}

#[test]
fn first_entity_declaration_wins() {
    let data = "\
<!ENTITY e \"first\">
<!ENTITY e \"second\">
<!ENTITY % p \"first\">
<!ENTITY % p \"second\">
";

    let dtd = Dtd::parse_external_subset(data).unwrap();
    assert_eq!(dtd.general_entity("e").unwrap().value(), Some("first"));
    assert_eq!(dtd.parameter_entity("p").unwrap().value(), Some("first"));
}

#[test]
fn unparsed_entity() {
    let data = "\
<!NOTATION gif SYSTEM \"viewer.exe\">
<!ENTITY logo SYSTEM \"logo.gif\" NDATA gif>
";

    let dtd = Dtd::parse_external_subset(data).unwrap();

    let logo = dtd.unparsed_entity("logo").unwrap();
    assert_eq!(logo.system_id(), Some("logo.gif"));
    assert_eq!(logo.notation(), "gif");
    assert!(dtd.general_entity("logo").is_none());
}

#[test]
fn unparsed_entity_notation_must_be_declared() {
    let err =
        Dtd::parse_external_subset("<!ENTITY logo SYSTEM \"logo.gif\" NDATA gif>").unwrap_err();
    match err {
        Error::UndeclaredNotation(name) => assert_eq!(name, "gif"),
        _ => panic!("expected an undeclared notation error"),
    }
}

#[test]
fn parsed_and_unparsed_share_a_namespace() {
    let data = "\
<!NOTATION gif SYSTEM \"viewer.exe\">
<!ENTITY pic SYSTEM \"pic.gif\" NDATA gif>
<!ENTITY pic \"replacement\">
";

    let dtd = Dtd::parse_external_subset(data).unwrap();
    assert!(dtd.unparsed_entity("pic").is_some());
    assert!(dtd.general_entity("pic").is_none());
}

#[test]
fn entity_value_keeps_general_references() {
    // General entity references are bypassed inside entity values.
    let dtd = Dtd::parse_external_subset(
        "<!ENTITY a \"x\"><!ENTITY b \"1&a;2\">",
    )
    .unwrap();
    assert_eq!(dtd.general_entity("b").unwrap().value(), Some("1&a;2"));
}

#[test]
fn entity_value_expands_char_references() {
    let dtd = Dtd::parse_external_subset("<!ENTITY e \"a&#x2D;b\">").unwrap();
    assert_eq!(dtd.general_entity("e").unwrap().value(), Some("a-b"));
}

#[test]
fn entity_value_quotes() {
    let dtd = Dtd::parse_external_subset("<!ENTITY e 'say \"hi\"'>").unwrap();
    assert_eq!(dtd.general_entity("e").unwrap().value(), Some("say \"hi\""));
}

#[test]
fn attribute_default_expands_entities() {
    let data = "\
<!ENTITY product \"rodtd\">
<!ELEMENT e EMPTY>
<!ATTLIST e tool CDATA \"built with &product;\">
";

    let dtd = Dtd::parse_external_subset(data).unwrap();
    let attr = dtd.element_type("e").unwrap().attribute("tool").unwrap();
    assert_eq!(attr.default_value(), Some("built with rodtd"));
}

#[test]
fn attribute_default_expands_nested_entities() {
    let data = "\
<!ENTITY inner \"x\">
<!ENTITY outer \"1&inner;2\">
<!ELEMENT e EMPTY>
<!ATTLIST e a CDATA \"&outer;\">
";

    let dtd = Dtd::parse_external_subset(data).unwrap();
    let attr = dtd.element_type("e").unwrap().attribute("a").unwrap();
    assert_eq!(attr.default_value(), Some("1x2"));
}

#[test]
fn attribute_default_with_predefined_entities() {
    let data = "\
<!ELEMENT e EMPTY>
<!ATTLIST e a CDATA \"&lt;&amp;&gt;\">
";

    let dtd = Dtd::parse_external_subset(data).unwrap();
    let attr = dtd.element_type("e").unwrap().attribute("a").unwrap();
    assert_eq!(attr.default_value(), Some("<&>"));
}

#[test]
fn attribute_default_unknown_entity() {
    let data = "\
<!ELEMENT e EMPTY>
<!ATTLIST e a CDATA \"&nope;\">
";

    let err = Dtd::parse_external_subset(data).unwrap_err();
    assert!(matches!(err, Error::UnknownEntityReference(_, _)));
}

#[test]
fn attribute_default_external_entity_fails() {
    let data = "\
<!ENTITY ext SYSTEM \"ext.xml\">
<!ELEMENT e EMPTY>
<!ATTLIST e a CDATA \"&ext;\">
";

    let err = Dtd::parse_external_subset(data).unwrap_err();
    assert!(matches!(err, Error::ExternalEntityInValue(_, _)));
}

#[test]
fn entity_reference_loop_is_detected() {
    let data = "\
<!ENTITY a \"&b;\">
<!ENTITY b \"&a;\">
<!ELEMENT e EMPTY>
<!ATTLIST e x CDATA \"&a;\">
";

    let err = Dtd::parse_external_subset(data).unwrap_err();
    assert!(matches!(err, Error::EntityReferenceLoop(_)));
}

#[test]
fn parameter_entity_must_be_declared_before_use() {
    let err = Dtd::parse_external_subset("<!ELEMENT a (%undefined;)>").unwrap_err();
    assert!(matches!(err, Error::UnknownEntityReference(_, _)));
}

#[test]
fn parameter_entity_in_entity_value() {
    let data = "\
<!ENTITY % suffix \"-ish\">
<!ENTITY word \"blue%suffix;\">
";

    let dtd = Dtd::parse_external_subset(data).unwrap();
    // Included in Literal: no added spaces.
    assert_eq!(dtd.general_entity("word").unwrap().value(), Some("blue-ish"));
}

#[test]
fn parameter_entity_spanning_declarations() {
    let data = "\
<!ENTITY % decls \"<!ELEMENT a EMPTY> <!ELEMENT b EMPTY>\">
%decls;
";

    // Entity values may not contain raw markup characters.
    let err = Dtd::parse_external_subset(data).unwrap_err();
    assert!(matches!(err, Error::MarkupInValue('<', _)));
}

#[test]
fn general_entity_reference_in_dtd_is_fatal() {
    let err = Dtd::parse_external_subset("<!ELEMENT a &ref; EMPTY>").unwrap_err();
    assert!(matches!(err, Error::UnexpectedGeneralReference(_)));
}
