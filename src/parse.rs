use std::collections::{HashMap, HashSet};

use thiserror::Error as ThisError;

use crate::chars::{is_encoding_name, XmlCharExt};
use crate::scanner::{keyword, EntityDef, EntityState, Keyword, Scanner};
use crate::{
    Attribute, AttributeType, ContentType, DefaultType, Dtd, ElementType, GeneralEntity,
    GroupKind, InputSource, Notation, ParameterEntity, ParseOptions, Particle, TextPos,
    UnparsedEntity, XmlName, NS_XMLNS_URI, NS_XML_URI,
};

type Result<T> = std::result::Result<T, Error>;

/// A list of all possible errors.
#[derive(Debug, ThisError)]
pub enum Error {
    /// An invalid/unexpected character.
    ///
    /// expected, actual, position
    #[error("expected '{0}' not '{1}' at {2}")]
    InvalidChar(char, char, TextPos),

    /// An invalid/unexpected character.
    ///
    /// expected, actual, position
    #[error("expected {0} not '{1}' at {2}")]
    InvalidChar2(&'static str, char, TextPos),

    /// An unexpected string.
    ///
    /// Contains what string was expected.
    #[error("expected '{0}' at {1}")]
    InvalidString(&'static str, TextPos),

    /// An invalid name.
    #[error("invalid name at {0}")]
    InvalidName(TextPos),

    /// A malformed decimal or hexadecimal character reference, or one
    /// past the 16-bit code-unit range.
    #[error("malformed character reference at {0}")]
    MalformedCharReference(TextPos),

    /// A general entity reference in a place the DTD grammar forbids.
    #[error("a general entity reference is not allowed here at {0}")]
    UnexpectedGeneralReference(TextPos),

    /// A reference to an entity that was not declared.
    #[error("unknown entity reference '{0}' at {1}")]
    UnknownEntityReference(String, TextPos),

    /// An external entity was referenced where only internal
    /// replacement text is allowed.
    #[error("external entity '{0}' is not allowed in a value at {1}")]
    ExternalEntityInValue(String, TextPos),

    /// A possible entity reference loop.
    #[error("a possible entity reference loop is detected at {0}")]
    EntityReferenceLoop(TextPos),

    /// A raw markup character inside an attribute or entity value.
    #[error("markup character '{0}' is not allowed in a value at {1}")]
    MarkupInValue(char, TextPos),

    /// An element type was declared twice.
    #[error("duplicate element type declaration '{0}' at {1}")]
    DuplicatedElementType(String, TextPos),

    /// A notation was declared twice.
    #[error("duplicate notation declaration '{0}' at {1}")]
    DuplicatedNotation(String, TextPos),

    /// An enumerated attribute listed the same token twice.
    #[error("duplicate enumeration value '{0}' at {1}")]
    DuplicatedEnumValue(String, TextPos),

    /// Mixed content listed the same element type twice.
    #[error("duplicate name '{0}' in mixed content at {1}")]
    DuplicatedMixedName(String, TextPos),

    /// `,` and `|` used within one content-model group.
    #[error("invalid mixture of ',' and '|' at {0}")]
    MixedSeparators(TextPos),

    /// An unknown `<!...>` declaration.
    #[error("unknown declaration '{0}' at {1}")]
    UnknownDeclaration(String, TextPos),

    /// An unknown attribute type keyword.
    #[error("unknown attribute type '{0}' at {1}")]
    UnknownAttributeType(String, TextPos),

    /// A conditional section other than INCLUDE/IGNORE.
    #[error("invalid conditional section '{0}' at {1}")]
    InvalidConditionalSection(String, TextPos),

    /// An encoding name outside `[A-Za-z][A-Za-z0-9._-]*`.
    #[error("invalid encoding name '{0}' at {1}")]
    InvalidEncodingName(String, TextPos),

    /// A content model referenced an element type that was never
    /// declared.
    #[error("reference to undeclared element type '{0}'")]
    UndeclaredElementType(String),

    /// A NOTATION enumeration or an unparsed entity referenced an
    /// undeclared notation.
    #[error("reference to undeclared notation '{0}'")]
    UndeclaredNotation(String),

    /// Namespaces cannot be undeclared in a DTD.
    #[error("namespace declaration for prefix '{0}' cannot be empty")]
    EmptyNamespaceValue(String),

    /// One prefix mapped to two different URIs.
    #[error("prefix '{0}' is mapped to more than one namespace")]
    ConflictingNamespace(String),

    /// Two different prefixes mapped to one URI.
    #[error("namespace '{0}' is mapped to more than one prefix")]
    DuplicatedNamespaceUri(String),

    /// A qualified name used a prefix with no known mapping.
    #[error("an unknown namespace prefix '{0}'")]
    UnknownNamespace(String),

    /// A namespace-aware local name containing `:` or `^`.
    #[error("invalid local name '{0}'")]
    InvalidLocalName(String),

    /// The entity resolver had no answer for an external identifier.
    #[error("could not resolve external entity '{0}'")]
    UnresolvedEntity(String),

    /// The input bytes are not valid UTF-8.
    #[error("the input is not a valid UTF-8 stream")]
    NonUtf8Input,

    /// EOF where more input was required.
    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,

    /// An error from the underlying reader or the entity resolver.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns the error position, if the error was raised while
    /// scanning. Post-processing errors carry no position.
    pub fn pos(&self) -> Option<TextPos> {
        match *self {
            Error::InvalidChar(_, _, pos) => Some(pos),
            Error::InvalidChar2(_, _, pos) => Some(pos),
            Error::InvalidString(_, pos) => Some(pos),
            Error::InvalidName(pos) => Some(pos),
            Error::MalformedCharReference(pos) => Some(pos),
            Error::UnexpectedGeneralReference(pos) => Some(pos),
            Error::UnknownEntityReference(_, pos) => Some(pos),
            Error::ExternalEntityInValue(_, pos) => Some(pos),
            Error::EntityReferenceLoop(pos) => Some(pos),
            Error::MarkupInValue(_, pos) => Some(pos),
            Error::DuplicatedElementType(_, pos) => Some(pos),
            Error::DuplicatedNotation(_, pos) => Some(pos),
            Error::DuplicatedEnumValue(_, pos) => Some(pos),
            Error::DuplicatedMixedName(_, pos) => Some(pos),
            Error::MixedSeparators(pos) => Some(pos),
            Error::UnknownDeclaration(_, pos) => Some(pos),
            Error::UnknownAttributeType(_, pos) => Some(pos),
            Error::InvalidConditionalSection(_, pos) => Some(pos),
            Error::InvalidEncodingName(_, pos) => Some(pos),
            _ => None,
        }
    }
}

/// What the parse loop is driving towards.
#[derive(Clone, Copy, PartialEq)]
pub(crate) enum ParseMode {
    /// An XML document; only the DOCTYPE declaration is processed and
    /// the rest of the document is abandoned.
    Document,
    /// A standalone external subset.
    ExternalSubset,
}

// Where a run of markup declarations ends.
#[derive(Clone, Copy, PartialEq)]
enum Until {
    /// End of input: the external-subset level.
    Eof,
    /// `]` closing an internal subset.
    InternalSubset,
    /// `]]>` closing an INCLUDE section.
    SectionEnd,
}

pub(crate) fn parse(source: InputSource, options: ParseOptions, mode: ParseMode) -> Result<Dtd> {
    let ParseOptions { prefixes, resolver } = options;
    let scanner = Scanner::new(source, resolver)?;

    let mut parser = Parser {
        scanner,
        dtd: Dtd::new(),
        prefixes,
    };

    match mode {
        ParseMode::Document => parser.parse_document()?,
        ParseMode::ExternalSubset => parser.parse_external_subset()?,
    }

    parser.postprocess()?;
    Ok(parser.dtd)
}

struct Parser {
    scanner: Scanner,
    dtd: Dtd,
    prefixes: Option<HashMap<String, String>>,
}

impl Parser {
    // document ::= prolog element Misc*
    //
    // Only the prolog matters here; everything after the DOCTYPE
    // declaration is abandoned.
    fn parse_document(&mut self) -> Result<()> {
        self.scanner.set_state(EntityState::OutsideDtd);

        // Skip an UTF-8 BOM.
        let _ = self.scanner.is_char('\u{FEFF}')?;

        self.parse_xml_declaration()?;

        loop {
            self.scanner.skip_whitespace()?;
            if self.scanner.is_string("<!DOCTYPE")? {
                self.parse_doctype()?;
                return Ok(());
            } else if self.scanner.is_string("<!--")? {
                self.parse_comment()?;
            } else if self.scanner.is_string("<?")? {
                self.discard_pi()?;
            } else {
                // The root element, stray text or EOF: no DOCTYPE,
                // so the DTD stays empty.
                return Ok(());
            }
        }
    }

    // extSubset ::= TextDecl? extSubsetDecl
    fn parse_external_subset(&mut self) -> Result<()> {
        self.scanner.set_state(EntityState::Dtd);

        let _ = self.scanner.is_char('\u{FEFF}')?;

        self.parse_xml_declaration()?;
        self.parse_markup_decls(Until::Eof)
    }

    // doctypedecl ::= '<!DOCTYPE' S Name (S ExternalID)? S?
    //                 ('[' intSubset ']' S?)? '>'
    //
    // '<!DOCTYPE' is already consumed. The internal subset is parsed
    // first, the external subset after the closing '>', so
    // first-declaration-wins favors the internal subset.
    fn parse_doctype(&mut self) -> Result<()> {
        self.scanner.set_state(EntityState::Dtd);

        self.scanner.require_whitespace()?;
        // The document element name plays no role in the model.
        let _ = self.scanner.scan_name()?;
        self.scanner.skip_whitespace()?;

        let mut external_id: Option<(Option<String>, Option<String>)> = None;

        let c = self.scanner.next_char()?;
        self.scanner.unread();
        if c != '[' && c != '>' {
            external_id = Some(self.parse_external_id(true)?);
            self.scanner.skip_whitespace()?;
        }

        if self.scanner.is_char('[')? {
            self.parse_markup_decls(Until::InternalSubset)?;
            self.scanner.skip_whitespace()?;
        }

        self.scanner.require_char('>')?;

        if let Some((public_id, system_id)) = external_id {
            let source = InputSource {
                text: None,
                reader: None,
                system_id,
                public_id,
            };
            self.scanner.reopen(source)?;
            self.scanner.set_state(EntityState::Dtd);
            self.parse_xml_declaration()?;
            self.parse_markup_decls(Until::Eof)?;
        }

        Ok(())
    }

    // ExternalID ::= 'SYSTEM' S SystemLiteral
    //              | 'PUBLIC' S PubidLiteral S SystemLiteral
    //
    // Returns (public ID, system ID). With `system_required` unset
    // (notations), 'PUBLIC' may omit the system literal.
    fn parse_external_id(
        &mut self,
        system_required: bool,
    ) -> Result<(Option<String>, Option<String>)> {
        let name = self.scanner.scan_name()?;
        match keyword(&name) {
            Some(Keyword::System) => {
                self.scanner.require_whitespace()?;
                let system_id = self.scanner.scan_system_literal()?;
                Ok((None, Some(system_id)))
            }
            Some(Keyword::Public) => {
                self.scanner.require_whitespace()?;
                let public_id = self.scanner.scan_pubid_literal()?;
                if system_required {
                    self.scanner.require_whitespace()?;
                    let system_id = self.scanner.scan_system_literal()?;
                    Ok((Some(public_id), Some(system_id)))
                } else {
                    self.scanner.skip_whitespace()?;
                    let c = match self.scanner.next_char() {
                        Ok(c) => c,
                        Err(Error::UnexpectedEndOfStream) => return Ok((Some(public_id), None)),
                        Err(e) => return Err(e),
                    };
                    self.scanner.unread();
                    if c == '"' || c == '\'' {
                        let system_id = self.scanner.scan_system_literal()?;
                        Ok((Some(public_id), Some(system_id)))
                    } else {
                        Ok((Some(public_id), None))
                    }
                }
            }
            _ => Err(Error::InvalidString("SYSTEM or PUBLIC", self.scanner.pos())),
        }
    }

    // extSubsetDecl ::= (markupdecl | conditionalSect | DeclSep)*
    fn parse_markup_decls(&mut self, until: Until) -> Result<()> {
        loop {
            match self.scanner.next_char() {
                Ok(c) if c.is_xml_space() => continue,
                Ok('<') => self.parse_markup_decl()?,
                Ok(']') if until == Until::InternalSubset => return Ok(()),
                Ok(']') if until == Until::SectionEnd => {
                    self.scanner.require_string("]>")?;
                    return Ok(());
                }
                Ok(c) => {
                    return Err(Error::InvalidChar2(
                        "a markup declaration",
                        c,
                        self.scanner.pos(),
                    ))
                }
                Err(Error::UnexpectedEndOfStream) if until == Until::Eof => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    // markupdecl ::= elementdecl | AttlistDecl | EntityDecl
    //              | NotationDecl | PI | Comment
    //
    // '<' is already consumed.
    fn parse_markup_decl(&mut self) -> Result<()> {
        let c = self.scanner.next_char()?;
        match c {
            '?' => self.discard_pi(),
            '!' => {
                if self.scanner.is_string("--")? {
                    self.parse_comment()
                } else if self.scanner.is_char('[')? {
                    self.parse_conditional_section()
                } else {
                    let name = self.scanner.scan_name()?;
                    match keyword(&name) {
                        Some(Keyword::Element) => self.parse_element_decl(),
                        Some(Keyword::Attlist) => self.parse_attlist_decl(),
                        Some(Keyword::Entity) => self.parse_entity_decl(),
                        Some(Keyword::Notation) => self.parse_notation_decl(),
                        _ => Err(Error::UnknownDeclaration(name, self.scanner.pos())),
                    }
                }
            }
            _ => Err(Error::InvalidChar2("'!' or '?'", c, self.scanner.pos())),
        }
    }

    // XMLDecl  ::= '<?xml' VersionInfo EncodingDecl? SDDecl? S? '?>'
    // TextDecl ::= '<?xml' VersionInfo? EncodingDecl S? '?>'
    //
    // Nothing from the declaration is kept; the encoding name is
    // validated and otherwise ignored (all input is UTF-8 here).
    // `<?xml-stylesheet` and friends fall through to the PI handler.
    fn parse_xml_declaration(&mut self) -> Result<()> {
        if !self.scanner.is_string("<?xml")? {
            return Ok(());
        }

        if !self.scanner.is_whitespace()? {
            // A PI whose target merely starts with `xml`.
            return self.discard_pi();
        }

        loop {
            self.scanner.skip_whitespace()?;
            if self.scanner.is_string("?>")? {
                return Ok(());
            }

            let name = self.scanner.scan_name()?;
            self.scanner.skip_whitespace()?;
            self.scanner.require_char('=')?;
            self.scanner.skip_whitespace()?;
            let value = self.scanner.scan_system_literal()?;

            match name.as_str() {
                "version" | "standalone" => {}
                "encoding" => {
                    if !is_encoding_name(&value) {
                        return Err(Error::InvalidEncodingName(value, self.scanner.pos()));
                    }
                }
                _ => {
                    return Err(Error::InvalidString(
                        "version, encoding or standalone",
                        self.scanner.pos(),
                    ))
                }
            }
        }
    }

    // PI ::= '<?' PITarget (S (Char* - (Char* '?>' Char*)))? '?>'
    //
    // Discarded through '?>'. Sigils inside are data.
    fn discard_pi(&mut self) -> Result<()> {
        let prev = self.scanner.state();
        self.scanner.set_state(EntityState::Comment);
        let result = loop {
            match self.scanner.next_char() {
                Ok('?') => {
                    if self.scanner.is_char('>')? {
                        break Ok(());
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e),
            }
        };
        self.scanner.set_state(prev);
        result
    }

    // Comment ::= '<!--' ((Char - '-') | ('-' (Char - '-')))* '-->'
    //
    // '<!--' is already consumed. '--' must be followed by '>'.
    fn parse_comment(&mut self) -> Result<()> {
        let prev = self.scanner.state();
        self.scanner.set_state(EntityState::Comment);
        let result = loop {
            match self.scanner.next_char() {
                Ok('-') => {
                    if self.scanner.is_char('-')? {
                        break self.scanner.require_char('>');
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e),
            }
        };
        self.scanner.set_state(prev);
        result
    }

    // conditionalSect ::= includeSect | ignoreSect
    //
    // '<![' is already consumed.
    fn parse_conditional_section(&mut self) -> Result<()> {
        self.scanner.skip_whitespace()?;
        let name = self.scanner.scan_name()?;
        self.scanner.skip_whitespace()?;

        match keyword(&name) {
            Some(Keyword::Include) => {
                self.scanner.require_char('[')?;
                self.parse_markup_decls(Until::SectionEnd)
            }
            Some(Keyword::Ignore) => {
                self.scanner.require_char('[')?;
                self.parse_ignore_section()
            }
            _ => Err(Error::InvalidConditionalSection(name, self.scanner.pos())),
        }
    }

    // ignoreSectContents ::= Ignore ('<![' ignoreSectContents ']]>' Ignore)*
    //
    // Nested sections count; the section ends at the matching ']]>'.
    // The '>' is tested only after ']]'.
    fn parse_ignore_section(&mut self) -> Result<()> {
        let prev = self.scanner.state();
        self.scanner.set_state(EntityState::Ignore);

        let mut depth = 1u32;
        let result = loop {
            match self.scanner.next_char() {
                Ok('<') => {
                    if self.scanner.is_string("![")? {
                        depth += 1;
                    }
                }
                Ok(']') => {
                    if self.scanner.is_string("]>")? {
                        depth -= 1;
                        if depth == 0 {
                            break Ok(());
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e),
            }
        };

        self.scanner.set_state(prev);
        result
    }

    fn scan_xml_name(&mut self) -> Result<XmlName> {
        let name = self.scanner.scan_name()?;
        Ok(XmlName::new(&name))
    }

    // Fetches or creates an element type; first references may
    // precede the declaration.
    fn element_entry(&mut self, name: &XmlName) -> &mut ElementType {
        self.dtd
            .element_types
            .entry(name.clone())
            .or_insert_with(|| ElementType::new(name.clone()))
    }

    fn link_child(&mut self, parent: &XmlName, child: &XmlName) {
        self.element_entry(child).parents.insert(parent.clone());
        self.element_entry(parent).children.insert(child.clone());
    }

    // elementdecl ::= '<!ELEMENT' S Name S contentspec S? '>'
    // contentspec ::= 'EMPTY' | 'ANY' | Mixed | children
    fn parse_element_decl(&mut self) -> Result<()> {
        self.scanner.require_whitespace()?;
        let name = self.scan_xml_name()?;
        self.scanner.require_whitespace()?;

        let declared = self
            .dtd
            .element_types
            .get(&name)
            .map_or(false, |e| e.content_type.is_some());
        if declared {
            return Err(Error::DuplicatedElementType(
                name.qualified(),
                self.scanner.pos(),
            ));
        }

        let (content_type, content) = if self.scanner.is_char('(')? {
            self.parse_content_model(&name)?
        } else {
            let kw = self.scanner.scan_name()?;
            match keyword(&kw) {
                Some(Keyword::Empty) => (ContentType::Empty, None),
                Some(Keyword::Any) => (ContentType::Any, None),
                _ => {
                    return Err(Error::InvalidString(
                        "EMPTY, ANY or '('",
                        self.scanner.pos(),
                    ))
                }
            }
        };

        self.scanner.skip_whitespace()?;
        self.scanner.require_char('>')?;

        let element = self.element_entry(&name);
        element.content_type = Some(content_type);
        element.content = content;

        Ok(())
    }

    // Mixed    ::= '(' S? '#PCDATA' (S? '|' S? Name)* S? ')*'
    //            | '(' S? '#PCDATA' S? ')'
    // children ::= (choice | seq) ('?' | '*' | '+')?
    //
    // Entered after the opening '('. The lookahead for '#' picks the
    // Mixed branch.
    fn parse_content_model(&mut self, name: &XmlName) -> Result<(ContentType, Option<Particle>)> {
        self.scanner.skip_whitespace()?;

        if self.scanner.is_char('#')? {
            self.scanner.require_string("PCDATA")?;
            self.parse_mixed_content(name)
        } else {
            let group = self.parse_group(name)?;
            Ok((ContentType::Element, Some(group)))
        }
    }

    // The `(S? '|' S? Name)*` tail of Mixed content; '#PCDATA' is
    // already consumed.
    fn parse_mixed_content(&mut self, name: &XmlName) -> Result<(ContentType, Option<Particle>)> {
        let mut members: Vec<Particle> = Vec::new();
        let mut seen: HashSet<XmlName> = HashSet::new();

        loop {
            self.scanner.skip_whitespace()?;
            let c = self.scanner.next_char()?;
            match c {
                ')' => break,
                '|' => {
                    self.scanner.skip_whitespace()?;
                    let child = self.scan_xml_name()?;
                    if !seen.insert(child.clone()) {
                        return Err(Error::DuplicatedMixedName(
                            child.qualified(),
                            self.scanner.pos(),
                        ));
                    }
                    self.link_child(name, &child);
                    members.push(Particle::Reference {
                        name: child,
                        required: true,
                        repeatable: false,
                    });
                }
                _ => return Err(Error::InvalidChar2("'|' or ')'", c, self.scanner.pos())),
            }
        }

        if members.is_empty() {
            // Both `(#PCDATA)` and `(#PCDATA)*` are plain PCDATA.
            let _ = self.scanner.is_char('*')?;
            return Ok((ContentType::Pcdata, None));
        }

        let c = self.scanner.next_char()?;
        if c != '*' {
            return Err(Error::InvalidChar('*', c, self.scanner.pos()));
        }

        let group = Particle::Group {
            kind: GroupKind::Choice,
            members,
            required: false,
            repeatable: true,
        };
        Ok((ContentType::Mixed, Some(group)))
    }

    // choice ::= '(' S? cp ( S? '|' S? cp )+ S? ')'
    // seq    ::= '(' S? cp ( S? ',' S? cp )* S? ')'
    // cp     ::= (Name | choice | seq) ('?' | '*' | '+')?
    //
    // Entered after the opening '('. The group kind is fixed by the
    // first separator; a single-member group is a sequence.
    fn parse_group(&mut self, decl: &XmlName) -> Result<Particle> {
        let mut kind: Option<GroupKind> = None;
        let mut members: Vec<Particle> = Vec::new();

        loop {
            self.scanner.skip_whitespace()?;

            let member = if self.scanner.is_char('(')? {
                self.parse_group(decl)?
            } else {
                let child = self.scan_xml_name()?;
                let (required, repeatable) = self.scan_frequency()?;
                self.link_child(decl, &child);
                Particle::Reference {
                    name: child,
                    required,
                    repeatable,
                }
            };
            members.push(member);

            self.scanner.skip_whitespace()?;
            let c = self.scanner.next_char()?;
            let sep = match c {
                ',' => GroupKind::Sequence,
                '|' => GroupKind::Choice,
                ')' => break,
                _ => {
                    return Err(Error::InvalidChar2(
                        "',', '|' or ')'",
                        c,
                        self.scanner.pos(),
                    ))
                }
            };

            match kind {
                None => kind = Some(sep),
                Some(k) if k == sep => {}
                Some(_) => return Err(Error::MixedSeparators(self.scanner.pos())),
            }
        }

        let (required, repeatable) = self.scan_frequency()?;
        Ok(Particle::Group {
            kind: kind.unwrap_or(GroupKind::Sequence),
            members,
            required,
            repeatable,
        })
    }

    // ('?' | '*' | '+')?
    fn scan_frequency(&mut self) -> Result<(bool, bool)> {
        if self.scanner.is_char('?')? {
            Ok((false, false))
        } else if self.scanner.is_char('+')? {
            Ok((true, true))
        } else if self.scanner.is_char('*')? {
            Ok((false, true))
        } else {
            Ok((true, false))
        }
    }

    // AttlistDecl ::= '<!ATTLIST' S Name AttDef* S? '>'
    // AttDef      ::= S Name S AttType S DefaultDecl
    fn parse_attlist_decl(&mut self) -> Result<()> {
        self.scanner.require_whitespace()?;
        let element_name = self.scan_xml_name()?;
        self.element_entry(&element_name);

        loop {
            self.scanner.skip_whitespace()?;
            if self.scanner.is_char('>')? {
                return Ok(());
            }

            let att_name = self.scan_xml_name()?;
            self.scanner.require_whitespace()?;
            let (attr_type, enums) = self.parse_attribute_type()?;
            self.scanner.require_whitespace()?;
            let (default_type, default_value) = self.parse_attribute_default()?;

            // The first definition of an attribute wins; later ones
            // are parsed and dropped.
            let element = self.element_entry(&element_name);
            if !element.attributes.contains_key(&att_name) {
                element.attributes.insert(
                    att_name.clone(),
                    Attribute {
                        name: att_name,
                        attr_type,
                        default_type,
                        default_value,
                        enums,
                        is_namespace_declaration: false,
                    },
                );
            }
        }
    }

    // AttType        ::= StringType | TokenizedType | EnumeratedType
    // EnumeratedType ::= NotationType | Enumeration
    // NotationType   ::= 'NOTATION' S '(' S? Name (S? '|' S? Name)* S? ')'
    // Enumeration    ::= '(' S? Nmtoken (S? '|' S? Nmtoken)* S? ')'
    fn parse_attribute_type(&mut self) -> Result<(AttributeType, Vec<String>)> {
        if self.scanner.is_char('(')? {
            let enums = self.parse_enumeration(false)?;
            return Ok((AttributeType::Enumerated, enums));
        }

        let name = self.scanner.scan_name()?;
        let attr_type = match keyword(&name) {
            Some(Keyword::Cdata) => AttributeType::Cdata,
            Some(Keyword::Id) => AttributeType::Id,
            Some(Keyword::Idref) => AttributeType::Idref,
            Some(Keyword::Idrefs) => AttributeType::Idrefs,
            Some(Keyword::Entity) => AttributeType::Entity,
            Some(Keyword::Entities) => AttributeType::Entities,
            Some(Keyword::Nmtoken) => AttributeType::Nmtoken,
            Some(Keyword::Nmtokens) => AttributeType::Nmtokens,
            Some(Keyword::Notation) => {
                self.scanner.require_whitespace()?;
                self.scanner.require_char('(')?;
                let enums = self.parse_enumeration(true)?;
                return Ok((AttributeType::Notation, enums));
            }
            _ => return Err(Error::UnknownAttributeType(name, self.scanner.pos())),
        };

        Ok((attr_type, Vec::new()))
    }

    // The '|'-separated token list of an enumerated type; the opening
    // '(' is already consumed. NOTATION lists hold Names, plain
    // enumerations hold Nmtokens.
    fn parse_enumeration(&mut self, names: bool) -> Result<Vec<String>> {
        let mut enums: Vec<String> = Vec::new();

        loop {
            self.scanner.skip_whitespace()?;
            let token = if names {
                self.scanner.scan_name()?
            } else {
                self.scanner.scan_nmtoken()?
            };

            if enums.contains(&token) {
                return Err(Error::DuplicatedEnumValue(token, self.scanner.pos()));
            }
            enums.push(token);

            self.scanner.skip_whitespace()?;
            let c = self.scanner.next_char()?;
            match c {
                '|' => continue,
                ')' => return Ok(enums),
                _ => return Err(Error::InvalidChar2("'|' or ')'", c, self.scanner.pos())),
            }
        }
    }

    // DefaultDecl ::= '#REQUIRED' | '#IMPLIED' | (('#FIXED' S)? AttValue)
    fn parse_attribute_default(&mut self) -> Result<(DefaultType, Option<String>)> {
        if self.scanner.is_char('#')? {
            let name = self.scanner.scan_name()?;
            match keyword(&name) {
                Some(Keyword::Required) => Ok((DefaultType::Required, None)),
                Some(Keyword::Implied) => Ok((DefaultType::Optional, None)),
                Some(Keyword::Fixed) => {
                    self.scanner.require_whitespace()?;
                    let value = self.scanner.scan_attvalue()?;
                    Ok((DefaultType::Fixed, Some(value)))
                }
                _ => Err(Error::InvalidString(
                    "REQUIRED, IMPLIED or FIXED",
                    self.scanner.pos(),
                )),
            }
        } else {
            let value = self.scanner.scan_attvalue()?;
            Ok((DefaultType::Default, Some(value)))
        }
    }

    // EntityDecl ::= GEDecl | PEDecl
    // GEDecl     ::= '<!ENTITY' S Name S EntityDef S? '>'
    // PEDecl     ::= '<!ENTITY' S '%' S Name S PEDef S? '>'
    // EntityDef  ::= EntityValue | (ExternalID NDataDecl?)
    // PEDef      ::= EntityValue | ExternalID
    // NDataDecl  ::= S 'NDATA' S Name
    fn parse_entity_decl(&mut self) -> Result<()> {
        self.scanner.require_whitespace()?;

        let is_pe = self.scanner.is_char('%')?;
        if is_pe {
            self.scanner.require_whitespace()?;
        }

        let name = self.scanner.scan_name()?;
        self.scanner.require_whitespace()?;

        let c = self.scanner.next_char()?;
        self.scanner.unread();

        let mut value: Option<String> = None;
        let mut public_id: Option<String> = None;
        let mut system_id: Option<String> = None;
        let mut notation: Option<String> = None;

        if c == '"' || c == '\'' {
            value = Some(self.scanner.scan_entity_value()?);
        } else {
            let (p, s) = self.parse_external_id(true)?;
            public_id = p;
            system_id = s;

            if !is_pe {
                self.scanner.skip_whitespace()?;
                if self.scanner.is_string("NDATA")? {
                    self.scanner.require_whitespace()?;
                    notation = Some(self.scanner.scan_name()?);
                }
            }
        }

        self.scanner.skip_whitespace()?;
        self.scanner.require_char('>')?;

        if is_pe {
            if !self.dtd.parameter_entities.contains_key(&name) {
                let def = match &value {
                    Some(v) => EntityDef::internal(v),
                    None => EntityDef::external(system_id.clone(), public_id.clone()),
                };
                self.scanner.define_parameter_entity(&name, def);
                self.dtd.parameter_entities.insert(
                    name.clone(),
                    ParameterEntity {
                        name,
                        value,
                        system_id,
                        public_id,
                    },
                );
            }
            return Ok(());
        }

        // Parsed general and unparsed entities share one namespace;
        // the first declaration of a name wins across both.
        let taken = self.dtd.general_entities.contains_key(&name)
            || self.dtd.unparsed_entities.contains_key(&name);
        if taken {
            return Ok(());
        }

        let def = match &value {
            Some(v) => EntityDef::internal(v),
            None => EntityDef::external(system_id.clone(), public_id.clone()),
        };
        self.scanner.define_general_entity(&name, def);

        match notation {
            Some(notation) => {
                self.dtd.unparsed_entities.insert(
                    name.clone(),
                    UnparsedEntity {
                        name,
                        system_id,
                        public_id,
                        notation,
                    },
                );
            }
            None => {
                self.dtd.general_entities.insert(
                    name.clone(),
                    GeneralEntity {
                        name,
                        value,
                        system_id,
                        public_id,
                    },
                );
            }
        }

        Ok(())
    }

    // NotationDecl ::= '<!NOTATION' S Name S (ExternalID | PublicID) S? '>'
    fn parse_notation_decl(&mut self) -> Result<()> {
        self.scanner.require_whitespace()?;
        let name = self.scanner.scan_name()?;
        self.scanner.require_whitespace()?;

        let (public_id, system_id) = self.parse_external_id(false)?;

        self.scanner.skip_whitespace()?;
        self.scanner.require_char('>')?;

        if self.dtd.notations.contains_key(&name) {
            return Err(Error::DuplicatedNotation(name, self.scanner.pos()));
        }

        self.dtd.notations.insert(
            name.clone(),
            Notation {
                name,
                system_id,
                public_id,
            },
        );

        Ok(())
    }

    // --- Post-processing ----------------------------------------------------

    fn postprocess(&mut self) -> Result<()> {
        self.close_any_content();
        self.check_element_references()?;
        self.check_notation_references()?;
        self.resolve_namespaces()?;
        self.flag_namespace_declarations();
        Ok(())
    }

    // ANY-typed element types relate to every element type in both
    // directions.
    fn close_any_content(&mut self) {
        let all: Vec<XmlName> = self.dtd.element_types.keys().cloned().collect();
        let any: Vec<XmlName> = self
            .dtd
            .element_types
            .values()
            .filter(|e| e.content_type == Some(ContentType::Any))
            .map(|e| e.name.clone())
            .collect();

        for any_name in &any {
            for name in &all {
                self.dtd
                    .element_types
                    .get_mut(any_name)
                    .unwrap()
                    .children
                    .insert(name.clone());
                self.dtd
                    .element_types
                    .get_mut(name)
                    .unwrap()
                    .parents
                    .insert(any_name.clone());
            }
        }
    }

    // Every element type referenced from a content model must be
    // declared somewhere.
    fn check_element_references(&self) -> Result<()> {
        for element in self.dtd.element_types.values() {
            for child in &element.children {
                let declared = self
                    .dtd
                    .element_types
                    .get(child)
                    .map_or(false, |e| e.content_type.is_some());
                if !declared {
                    return Err(Error::UndeclaredElementType(child.qualified()));
                }
            }
        }
        Ok(())
    }

    // NOTATION enumerations and unparsed entities must name declared
    // notations.
    fn check_notation_references(&self) -> Result<()> {
        for element in self.dtd.element_types.values() {
            for attribute in element.attributes.values() {
                if attribute.attr_type != AttributeType::Notation {
                    continue;
                }
                for token in &attribute.enums {
                    if !self.dtd.notations.contains_key(token) {
                        return Err(Error::UndeclaredNotation(token.clone()));
                    }
                }
            }
        }

        for entity in self.dtd.unparsed_entities.values() {
            if !self.dtd.notations.contains_key(&entity.notation) {
                return Err(Error::UndeclaredNotation(entity.notation.clone()));
            }
        }

        Ok(())
    }

    // Resolves qualified element-type and attribute names against the
    // caller's prefix table, or one derived from xmlns attribute
    // declarations.
    fn resolve_namespaces(&mut self) -> Result<()> {
        let table = match self.prefixes.take() {
            Some(table) => table,
            None => self.derive_prefix_table()?,
        };

        // Element-type renames first, since children/parents sets and
        // content models key on them.
        let mut renames: HashMap<XmlName, XmlName> = HashMap::new();
        for name in self.dtd.element_types.keys() {
            if name.local().contains(':') {
                renames.insert(name.clone(), resolve_qname(name, &table)?);
            }
        }

        if !renames.is_empty() {
            let mut element_types = HashMap::new();
            for (name, mut element) in self.dtd.element_types.drain() {
                let new_name = renames.get(&name).cloned().unwrap_or(name);
                element.name = new_name.clone();
                element.children = rename_set(element.children, &renames);
                element.parents = rename_set(element.parents, &renames);
                if let Some(content) = element.content.as_mut() {
                    rename_particle(content, &renames);
                }
                element_types.insert(new_name, element);
            }
            self.dtd.element_types = element_types;
        }

        // Attribute names resolve locally per element.
        for element in self.dtd.element_types.values_mut() {
            let needs_rename = element
                .attributes
                .keys()
                .any(|name| name.local().contains(':'));
            if !needs_rename {
                continue;
            }

            let mut attributes = HashMap::new();
            for (name, mut attribute) in element.attributes.drain() {
                let new_name = if name.local().contains(':') {
                    resolve_qname(&name, &table)?
                } else {
                    name
                };
                attribute.name = new_name.clone();
                attributes.insert(new_name, attribute);
            }
            element.attributes = attributes;
        }

        Ok(())
    }

    // Scans every element type's attributes for `xmlns` / `xmlns:p`
    // CDATA attributes with default values and derives a prefix table
    // from them.
    fn derive_prefix_table(&self) -> Result<HashMap<String, String>> {
        let mut table: HashMap<String, String> = HashMap::new();

        for element in self.dtd.element_types.values() {
            for attribute in element.attributes.values() {
                if attribute.attr_type != AttributeType::Cdata {
                    continue;
                }
                let value = match &attribute.default_value {
                    Some(v) => v,
                    None => continue,
                };

                let qualified = attribute.name.qualified();
                let prefix = if qualified == "xmlns" {
                    ""
                } else if let Some(p) = qualified.strip_prefix("xmlns:") {
                    p
                } else {
                    continue;
                };

                // Namespaces cannot be undeclared in a DTD.
                if value.is_empty() {
                    return Err(Error::EmptyNamespaceValue(prefix.to_string()));
                }

                if let Some(uri) = table.get(prefix) {
                    if uri != value {
                        return Err(Error::ConflictingNamespace(prefix.to_string()));
                    }
                    continue;
                }

                if table.values().any(|uri| uri == value) {
                    return Err(Error::DuplicatedNamespaceUri(value.clone()));
                }

                table.insert(prefix.to_string(), value.clone());
            }
        }

        Ok(table)
    }

    // Marks CDATA attributes with defaults whose name is `xmlns` or
    // has the `xmlns` prefix.
    fn flag_namespace_declarations(&mut self) {
        for element in self.dtd.element_types.values_mut() {
            for attribute in element.attributes.values_mut() {
                if attribute.attr_type != AttributeType::Cdata
                    || attribute.default_value.is_none()
                {
                    continue;
                }

                let name = &attribute.name;
                let is_xmlns = name.qualified() == "xmlns"
                    || name.prefix() == Some("xmlns")
                    || name.qualified().starts_with("xmlns:");
                if is_xmlns {
                    attribute.is_namespace_declaration = true;
                }
            }
        }
    }
}

// Resolves a `prefix:local` name against a prefix table. The `xml`
// and `xmlns` prefixes are always bound.
fn resolve_qname(name: &XmlName, table: &HashMap<String, String>) -> Result<XmlName> {
    let qualified = name.qualified();
    let (prefix, local) = match qualified.split_once(':') {
        Some(pair) => pair,
        None => return Ok(name.clone()),
    };

    let uri = match prefix {
        "xml" => NS_XML_URI,
        "xmlns" => NS_XMLNS_URI,
        _ => match table.get(prefix) {
            Some(uri) => uri.as_str(),
            None => return Err(Error::UnknownNamespace(prefix.to_string())),
        },
    };

    XmlName::with_namespace(Some(uri), Some(prefix), local)
}

fn rename_set(set: HashSet<XmlName>, renames: &HashMap<XmlName, XmlName>) -> HashSet<XmlName> {
    set.into_iter()
        .map(|name| renames.get(&name).cloned().unwrap_or(name))
        .collect()
}

fn rename_particle(particle: &mut Particle, renames: &HashMap<XmlName, XmlName>) {
    match particle {
        Particle::Reference { name, .. } => {
            if let Some(new_name) = renames.get(name) {
                *name = new_name.clone();
            }
        }
        Particle::Group { members, .. } => {
            for member in members {
                rename_particle(member, renames);
            }
        }
    }
}
