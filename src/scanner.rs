use std::collections::HashMap;
use std::io::Read;
use std::str;

use lazy_static::lazy_static;

use crate::chars::XmlCharExt;
use crate::{Error, InputSource, TextPos};

type Result<T> = std::result::Result<T, Error>;

/// Frames pushed past this depth indicate an entity reference loop.
const MAX_FRAME_DEPTH: usize = 64;

/// How many bytes are pulled from a stream source per refill.
const STREAM_CHUNK: usize = 4096;

/// Scopes how `&` and `%` are interpreted, per XML 1.0 §4.4.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum EntityState {
    OutsideDtd,
    Dtd,
    AttValue,
    EntityValue,
    Comment,
    Ignore,
}

/// DTD keywords recognized after name scanning.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Keyword {
    Doctype,
    Element,
    Attlist,
    Entity,
    Notation,
    System,
    Public,
    Ndata,
    Empty,
    Any,
    Pcdata,
    Cdata,
    Id,
    Idref,
    Idrefs,
    Entities,
    Nmtoken,
    Nmtokens,
    Required,
    Implied,
    Fixed,
    Include,
    Ignore,
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, Keyword> = {
        let mut m = HashMap::new();
        m.insert("DOCTYPE", Keyword::Doctype);
        m.insert("ELEMENT", Keyword::Element);
        m.insert("ATTLIST", Keyword::Attlist);
        m.insert("ENTITY", Keyword::Entity);
        m.insert("NOTATION", Keyword::Notation);
        m.insert("SYSTEM", Keyword::System);
        m.insert("PUBLIC", Keyword::Public);
        m.insert("NDATA", Keyword::Ndata);
        m.insert("EMPTY", Keyword::Empty);
        m.insert("ANY", Keyword::Any);
        m.insert("PCDATA", Keyword::Pcdata);
        m.insert("CDATA", Keyword::Cdata);
        m.insert("ID", Keyword::Id);
        m.insert("IDREF", Keyword::Idref);
        m.insert("IDREFS", Keyword::Idrefs);
        m.insert("ENTITIES", Keyword::Entities);
        m.insert("NMTOKEN", Keyword::Nmtoken);
        m.insert("NMTOKENS", Keyword::Nmtokens);
        m.insert("REQUIRED", Keyword::Required);
        m.insert("IMPLIED", Keyword::Implied);
        m.insert("FIXED", Keyword::Fixed);
        m.insert("INCLUDE", Keyword::Include);
        m.insert("IGNORE", Keyword::Ignore);
        m
    };

    // XML 1.0 §4.6, with the double-escaped replacement texts, so that
    // the expansion of `&lt;` yields a markup-ignoring `<` via the
    // character-reference path.
    static ref PREDEFINED_ENTITIES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("lt", "&#60;");
        m.insert("gt", "&#62;");
        m.insert("amp", "&#38;");
        m.insert("apos", "&#39;");
        m.insert("quot", "&#34;");
        m
    };
}

/// Looks up a scanned name in the keyword table.
pub fn keyword(name: &str) -> Option<Keyword> {
    KEYWORDS.get(name).copied()
}

/// An entity definition as the expansion layer sees it.
///
/// `value` is the replacement text of an internal entity;
/// external entities carry IDs instead.
#[derive(Clone, Debug)]
pub struct EntityDef {
    pub value: Option<String>,
    pub system_id: Option<String>,
    pub public_id: Option<String>,
}

impl EntityDef {
    pub fn internal(value: &str) -> Self {
        EntityDef {
            value: Some(value.to_string()),
            system_id: None,
            public_id: None,
        }
    }

    pub fn external(system_id: Option<String>, public_id: Option<String>) -> Self {
        EntityDef {
            value: None,
            system_id,
            public_id,
        }
    }
}

enum FrameSource {
    Text,
    Stream {
        reader: Box<dyn Read>,
        carry: Vec<u8>,
        done: bool,
    },
}

/// One suspended or active character source.
///
/// Line and column start at (1, 1) for every new frame and are saved
/// and restored exactly across push/pop.
struct Frame {
    source: FrameSource,
    buf: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
    system_id: Option<String>,
    public_id: Option<String>,
    ignore_quote: bool,
    ignore_markup: bool,
}

impl Frame {
    fn text(text: &str, ignore_quote: bool, ignore_markup: bool) -> Self {
        Frame {
            source: FrameSource::Text,
            buf: text.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            system_id: None,
            public_id: None,
            ignore_quote,
            ignore_markup,
        }
    }

    fn stream(reader: Box<dyn Read>) -> Self {
        Frame {
            source: FrameSource::Stream {
                reader,
                carry: Vec::new(),
                done: false,
            },
            buf: Vec::new(),
            pos: 0,
            line: 1,
            col: 1,
            system_id: None,
            public_id: None,
            ignore_quote: false,
            ignore_markup: false,
        }
    }

    /// Pulls the next chunk from a stream source into the char buffer.
    ///
    /// Returns `false` once the source is drained.
    fn refill(&mut self) -> Result<bool> {
        let (reader, carry, done) = match &mut self.source {
            FrameSource::Text => return Ok(false),
            FrameSource::Stream {
                reader,
                carry,
                done,
            } => (reader, carry, done),
        };

        if *done {
            return Ok(false);
        }

        let mut chunk = [0u8; STREAM_CHUNK];
        loop {
            let n = reader.read(&mut chunk).map_err(Error::Io)?;
            if n == 0 {
                *done = true;
                if !carry.is_empty() {
                    return Err(Error::NonUtf8Input);
                }
                return Ok(false);
            }

            carry.extend_from_slice(&chunk[..n]);

            let valid = match str::from_utf8(carry) {
                Ok(_) => carry.len(),
                Err(e) => {
                    if e.error_len().is_some() {
                        return Err(Error::NonUtf8Input);
                    }
                    e.valid_up_to()
                }
            };

            if valid == 0 {
                // An incomplete sequence only; read more.
                continue;
            }

            // `valid` is a checked UTF-8 boundary.
            let text = str::from_utf8(&carry[..valid]).unwrap();
            self.buf.clear();
            self.buf.extend(text.chars());
            self.pos = 0;
            carry.drain(..valid);
            return Ok(true);
        }
    }
}

/// The character source stack with the entity-expansion layer on top.
///
/// All reading goes through [`Scanner::next_char`], which interprets
/// `&` and `%` according to the current [`EntityState`] and the flags
/// of the frame the sigil was read from.
pub struct Scanner {
    frame: Frame,
    stack: Vec<Frame>,
    state: EntityState,
    // Position before the last returned char, for `unread`.
    last_line: u32,
    last_col: u32,
    general_entities: HashMap<String, EntityDef>,
    parameter_entities: HashMap<String, EntityDef>,
    resolver: Option<Box<dyn crate::EntityResolver>>,
}

impl Scanner {
    pub fn new(
        source: InputSource,
        resolver: Option<Box<dyn crate::EntityResolver>>,
    ) -> Result<Scanner> {
        let mut scanner = Scanner {
            frame: Frame::text("", false, false),
            stack: Vec::new(),
            state: EntityState::OutsideDtd,
            last_line: 1,
            last_col: 1,
            general_entities: HashMap::new(),
            parameter_entities: HashMap::new(),
            resolver,
        };

        for (name, value) in PREDEFINED_ENTITIES.iter() {
            scanner
                .general_entities
                .insert((*name).to_string(), EntityDef::internal(value));
        }

        scanner.frame = scanner.open_source(source)?;
        Ok(scanner)
    }

    /// Restarts this scanner over a new bottom source, keeping the
    /// entity tables and the resolver.
    ///
    /// Used when the DOCTYPE's external subset takes over from the
    /// document: the document frame is abandoned, not resumed.
    pub fn reopen(&mut self, source: InputSource) -> Result<()> {
        self.stack.clear();
        self.frame = self.open_source(source)?;
        self.last_line = 1;
        self.last_col = 1;
        Ok(())
    }

    fn open_source(&mut self, source: InputSource) -> Result<Frame> {
        let InputSource {
            text,
            reader,
            system_id,
            public_id,
        } = source;

        let mut frame = if let Some(text) = text {
            Frame::text(&text, false, false)
        } else if let Some(reader) = reader {
            Frame::stream(reader)
        } else {
            let resolved = self.resolve(public_id.as_deref(), system_id.as_deref())?;
            let mut frame = if let Some(text) = resolved.text {
                Frame::text(&text, false, false)
            } else if let Some(reader) = resolved.reader {
                Frame::stream(reader)
            } else {
                return Err(Error::UnresolvedEntity(
                    diagnostic_id(public_id.as_deref(), system_id.as_deref()),
                ));
            };
            frame.system_id = resolved.system_id.or(system_id.clone());
            frame.public_id = resolved.public_id.or(public_id.clone());
            return Ok(frame);
        };

        frame.system_id = system_id;
        frame.public_id = public_id;
        Ok(frame)
    }

    /// Resolves an external identifier through the caller's resolver.
    pub fn resolve(
        &mut self,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<InputSource> {
        let resolver = match self.resolver.as_mut() {
            Some(r) => r,
            None => {
                return Err(Error::UnresolvedEntity(diagnostic_id(
                    public_id, system_id,
                )))
            }
        };

        match resolver.resolve(public_id, system_id).map_err(Error::Io)? {
            Some(source) => Ok(source),
            None => Err(Error::UnresolvedEntity(diagnostic_id(
                public_id, system_id,
            ))),
        }
    }

    #[inline]
    pub fn state(&self) -> EntityState {
        self.state
    }

    #[inline]
    pub fn set_state(&mut self, state: EntityState) {
        self.state = state;
    }

    /// The position of the next unread character, as the innermost
    /// frame sees it.
    #[inline]
    pub fn pos(&self) -> TextPos {
        TextPos::new(self.frame.line, self.frame.col)
    }

    /// Whether the char just returned came from a frame that treats
    /// the enclosing literal's quote as data.
    #[inline]
    pub fn ignores_quote(&self) -> bool {
        self.frame.ignore_quote
    }

    /// Whether the char just returned came from a frame that treats
    /// markup characters as data.
    #[inline]
    pub fn ignores_markup(&self) -> bool {
        self.frame.ignore_markup
    }

    // Reads one buffered character, refilling and popping as needed.
    // No entity interpretation and no position accounting.
    fn read_raw(&mut self) -> Result<char> {
        loop {
            if self.frame.pos < self.frame.buf.len() {
                let c = self.frame.buf[self.frame.pos];
                self.frame.pos += 1;
                return Ok(c);
            }

            if self.frame.refill()? {
                continue;
            }

            match self.stack.pop() {
                Some(frame) => self.frame = frame,
                None => return Err(Error::UnexpectedEndOfStream),
            }
        }
    }

    // Steps the current frame back one character without touching the
    // position counters. Only valid right after a `read_raw`.
    fn unread_raw(&mut self) {
        debug_assert!(self.frame.pos > 0);
        self.frame.pos -= 1;
    }

    /// Reads the next character, expanding entity references.
    ///
    /// This is the only read primitive the rest of the parser uses.
    /// Line/column are advanced here, after entity processing, so they
    /// reflect the expanded position.
    pub fn next_char(&mut self) -> Result<char> {
        loop {
            let c = self.read_raw()?;

            // Sigils read out of an expansion that ignores markup are
            // data, never references.
            if (c == '&' || c == '%') && !self.frame.ignore_markup {
                if let Some(c) = self.process_sigil(c)? {
                    return Ok(self.advance_pos(c));
                }
                continue;
            }

            return Ok(self.advance_pos(c));
        }
    }

    fn advance_pos(&mut self, c: char) -> char {
        self.last_line = self.frame.line;
        self.last_col = self.frame.col;
        if c == '\n' {
            self.frame.line += 1;
            self.frame.col = 1;
        } else {
            self.frame.col += 1;
        }
        c
    }

    /// Puts the last character returned by `next_char` back.
    ///
    /// Must not be called twice in succession.
    pub fn unread(&mut self) {
        debug_assert!(self.frame.pos > 0);
        self.frame.pos -= 1;
        self.frame.line = self.last_line;
        self.frame.col = self.last_col;
    }

    /// Puts a whole string back by pushing a transient in-memory
    /// frame that inherits the current frame's flags.
    pub fn unread_string(&mut self, text: &str) {
        let frame = Frame::text(text, self.frame.ignore_quote, self.frame.ignore_markup);
        let prev = std::mem::replace(&mut self.frame, frame);
        self.stack.push(prev);
    }

    // The "Reference in ..." dispatch, XML 1.0 §4.4.
    //
    // Returns the character to hand out literally, or `None` when the
    // reference was expanded onto the frame stack.
    fn process_sigil(&mut self, sigil: char) -> Result<Option<char>> {
        use EntityState::*;

        if sigil == '&' {
            match self.state {
                Dtd => Err(Error::UnexpectedGeneralReference(self.pos())),
                AttValue => self.process_general_reference(true),
                EntityValue => self.process_general_reference(false),
                OutsideDtd | Comment | Ignore => Ok(Some('&')),
            }
        } else {
            match self.state {
                Dtd => self.process_parameter_reference(true),
                EntityValue => self.process_parameter_reference(false),
                OutsideDtd | AttValue | Comment | Ignore => Ok(Some('%')),
            }
        }
    }

    // `&` in an attribute or entity value.
    //
    // Character references expand in both; named general references
    // expand only in attribute values and are bypassed in entity
    // values (XML §4.4.7, Bypassed).
    fn process_general_reference(&mut self, expand_named: bool) -> Result<Option<char>> {
        let c = match self.read_raw() {
            Ok(c) => c,
            Err(Error::UnexpectedEndOfStream) => return Ok(Some('&')),
            Err(e) => return Err(e),
        };

        if c == '#' {
            let c = self.scan_char_reference()?;
            self.push_frame(Frame::text(&c.to_string(), true, true))?;
            return Ok(None);
        }

        if !expand_named {
            self.unread_raw();
            return Ok(Some('&'));
        }

        self.unread_raw();
        let name = self.scan_reference_name()?;

        let def = match self.general_entities.get(&name) {
            Some(def) => def.clone(),
            None => return Err(Error::UnknownEntityReference(name, self.pos())),
        };

        match def.value {
            Some(value) => {
                // Included: quotes are data, markup is not.
                self.push_frame(Frame::text(&value, true, false))?;
                Ok(None)
            }
            None => Err(Error::ExternalEntityInValue(name, self.pos())),
        }
    }

    // `%` in the DTD proper or in an entity value.
    //
    // In the DTD the replacement is surrounded with one-space frames
    // (Included as PE); in an entity value it is not (Included in
    // Literal).
    fn process_parameter_reference(&mut self, pad: bool) -> Result<Option<char>> {
        let c = match self.read_raw() {
            Ok(c) => c,
            Err(Error::UnexpectedEndOfStream) => return Ok(Some('%')),
            Err(e) => return Err(e),
        };
        self.unread_raw();

        // A declaration's `%`, as in `<!ENTITY % name ...>`.
        if !c.is_xml_name_start() {
            return Ok(Some('%'));
        }

        let name = self.scan_reference_name()?;

        let def = match self.parameter_entities.get(&name) {
            Some(def) => def.clone(),
            None => return Err(Error::UnknownEntityReference(name, self.pos())),
        };

        if pad {
            self.push_frame(Frame::text(" ", false, false))?;
        }

        match def.value {
            Some(value) => {
                self.push_frame(Frame::text(&value, false, false))?;
            }
            None => {
                let source =
                    self.resolve(def.public_id.as_deref(), def.system_id.as_deref())?;
                let mut frame = if let Some(text) = source.text {
                    Frame::text(&text, false, false)
                } else if let Some(reader) = source.reader {
                    Frame::stream(reader)
                } else {
                    return Err(Error::UnresolvedEntity(diagnostic_id(
                        def.public_id.as_deref(),
                        def.system_id.as_deref(),
                    )));
                };
                frame.system_id = source.system_id.or(def.system_id);
                frame.public_id = source.public_id.or(def.public_id);
                self.push_frame(frame)?;
            }
        }

        if pad {
            self.push_frame(Frame::text(" ", false, false))?;
        }

        Ok(None)
    }

    // CharRef ::= '&#' [0-9]+ ';' | '&#x' [0-9a-fA-F]+ ';'
    //
    // The leading '&#' is already consumed. Values past the 16-bit
    // code-unit range are malformed.
    fn scan_char_reference(&mut self) -> Result<char> {
        let mut radix = 10;
        let mut first = self.read_raw()?;
        if first == 'x' {
            radix = 16;
            first = self.read_raw()?;
        }

        let mut value: u32 = 0;
        let mut c = first;
        let mut digits = 0;
        loop {
            match c.to_digit(radix) {
                Some(d) => {
                    digits += 1;
                    value = value * radix + d;
                    if value > 0xFFFF {
                        return Err(Error::MalformedCharReference(self.pos()));
                    }
                }
                None if c == ';' && digits > 0 => break,
                None => return Err(Error::MalformedCharReference(self.pos())),
            }
            c = self.read_raw()?;
        }

        char::from_u32(value).ok_or_else(|| Error::MalformedCharReference(self.pos()))
    }

    // The Name of an entity reference, terminated by ';'.
    fn scan_reference_name(&mut self) -> Result<String> {
        let mut name = String::new();
        loop {
            let c = self.read_raw()?;
            if c == ';' {
                break;
            }

            let ok = if name.is_empty() {
                c.is_xml_name_start()
            } else {
                c.is_xml_name()
            };
            if !ok {
                return Err(Error::InvalidName(self.pos()));
            }
            name.push(c);
        }

        if name.is_empty() {
            return Err(Error::InvalidName(self.pos()));
        }
        Ok(name)
    }

    fn push_frame(&mut self, frame: Frame) -> Result<()> {
        if self.stack.len() >= MAX_FRAME_DEPTH {
            return Err(Error::EntityReferenceLoop(self.pos()));
        }

        let prev = std::mem::replace(&mut self.frame, frame);
        self.stack.push(prev);
        Ok(())
    }

    /// Registers a general entity; the first declaration wins.
    pub fn define_general_entity(&mut self, name: &str, def: EntityDef) {
        self.general_entities
            .entry(name.to_string())
            .or_insert(def);
    }

    /// Registers a parameter entity; the first declaration wins.
    pub fn define_parameter_entity(&mut self, name: &str, def: EntityDef) {
        self.parameter_entities
            .entry(name.to_string())
            .or_insert(def);
    }

    // --- Lexical primitives -------------------------------------------------

    /// Consumes one whitespace character, if present.
    pub fn is_whitespace(&mut self) -> Result<bool> {
        match self.next_char() {
            Ok(c) if c.is_xml_space() => Ok(true),
            Ok(_) => {
                self.unread();
                Ok(false)
            }
            Err(Error::UnexpectedEndOfStream) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Requires at least one whitespace character, then greedily
    /// consumes the rest.
    pub fn require_whitespace(&mut self) -> Result<()> {
        let c = self.next_char()?;
        if !c.is_xml_space() {
            return Err(Error::InvalidChar2("a whitespace", c, self.pos()));
        }

        self.skip_whitespace()
    }

    /// Consumes any amount of whitespace, including none.
    pub fn skip_whitespace(&mut self) -> Result<()> {
        while self.is_whitespace()? {}
        Ok(())
    }

    /// Peek-matches a single character, restoring on failure.
    pub fn is_char(&mut self, expect: char) -> Result<bool> {
        match self.next_char() {
            Ok(c) if c == expect => Ok(true),
            Ok(_) => {
                self.unread();
                Ok(false)
            }
            Err(Error::UnexpectedEndOfStream) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Peek-matches a string, restoring what was read on failure.
    pub fn is_string(&mut self, text: &str) -> Result<bool> {
        let mut read = String::new();
        for expect in text.chars() {
            match self.next_char() {
                Ok(c) => {
                    read.push(c);
                    if c != expect {
                        self.unread_string(&read);
                        return Ok(false);
                    }
                }
                Err(Error::UnexpectedEndOfStream) => {
                    if !read.is_empty() {
                        self.unread_string(&read);
                    }
                    return Ok(false);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(true)
    }

    pub fn require_char(&mut self, expect: char) -> Result<()> {
        let c = self.next_char()?;
        if c != expect {
            return Err(Error::InvalidChar(expect, c, self.pos()));
        }
        Ok(())
    }

    pub fn require_string(&mut self, text: &'static str) -> Result<()> {
        if !self.is_string(text)? {
            return Err(Error::InvalidString(text, self.pos()));
        }
        Ok(())
    }

    // Name ::= (Letter | '_' | ':') (NameChar)*
    //
    // `:` is allowed; the scanner does not enforce namespace validity.
    pub fn scan_name(&mut self) -> Result<String> {
        let c = self.next_char()?;
        if !c.is_xml_name_start() {
            return Err(Error::InvalidName(self.pos()));
        }

        let mut name = String::new();
        name.push(c);
        self.scan_name_rest(name)
    }

    // Nmtoken ::= (NameChar)+
    pub fn scan_nmtoken(&mut self) -> Result<String> {
        let c = self.next_char()?;
        if !c.is_xml_name() {
            return Err(Error::InvalidName(self.pos()));
        }

        let mut name = String::new();
        name.push(c);
        self.scan_name_rest(name)
    }

    fn scan_name_rest(&mut self, mut name: String) -> Result<String> {
        loop {
            match self.next_char() {
                Ok(c) if c.is_xml_name() => name.push(c),
                Ok(_) => {
                    self.unread();
                    break;
                }
                Err(Error::UnexpectedEndOfStream) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(name)
    }

    fn open_quote(&mut self) -> Result<char> {
        let c = self.next_char()?;
        if c == '"' || c == '\'' {
            Ok(c)
        } else {
            Err(Error::InvalidChar2("a quote", c, self.pos()))
        }
    }

    // AttValue ::= '"' ([^<&"] | Reference)* '"' | "'" ([^<&'] | Reference)* "'"
    //
    // References were already expanded by `next_char`; what remains is
    // the markup check against the originating frame's flags.
    pub fn scan_attvalue(&mut self) -> Result<String> {
        let quote = self.open_quote()?;
        let prev = self.state;
        self.state = EntityState::AttValue;
        let result = self.scan_value(quote, &['<', '&']);
        self.state = prev;
        result
    }

    // EntityValue ::= '"' ([^%&"] | PEReference | Reference)* '"'
    //               | "'" ([^%&'] | PEReference | Reference)* "'"
    pub fn scan_entity_value(&mut self) -> Result<String> {
        let quote = self.open_quote()?;
        let prev = self.state;
        self.state = EntityState::EntityValue;
        let result = self.scan_value(quote, &['<', '%']);
        self.state = prev;
        result
    }

    fn scan_value(&mut self, quote: char, markup: &[char]) -> Result<String> {
        let mut value = String::new();
        loop {
            let c = self.next_char()?;
            if c == quote && !self.ignores_quote() {
                break;
            }
            if markup.contains(&c) && !self.ignores_markup() {
                return Err(Error::MarkupInValue(c, self.pos()));
            }
            value.push(c);
        }
        Ok(value)
    }

    // SystemLiteral ::= ('"' [^"]* '"') | ("'" [^']* "'")
    pub fn scan_system_literal(&mut self) -> Result<String> {
        let quote = self.open_quote()?;
        let mut value = String::new();
        loop {
            let c = self.next_char()?;
            if c == quote && !self.ignores_quote() {
                break;
            }
            value.push(c);
        }
        Ok(value)
    }

    // PubidLiteral ::= '"' PubidChar* '"' | "'" (PubidChar - "'")* "'"
    pub fn scan_pubid_literal(&mut self) -> Result<String> {
        let quote = self.open_quote()?;
        let mut value = String::new();
        loop {
            let c = self.next_char()?;
            if c == quote && !self.ignores_quote() {
                break;
            }
            if !c.is_xml_pubid() {
                return Err(Error::InvalidChar2("a PubidChar", c, self.pos()));
            }
            value.push(c);
        }
        Ok(value)
    }
}

fn diagnostic_id(public_id: Option<&str>, system_id: Option<&str>) -> String {
    match (public_id, system_id) {
        (Some(p), _) => p.to_string(),
        (None, Some(s)) => s.to_string(),
        (None, None) => String::from("<no identifier>"),
    }
}
