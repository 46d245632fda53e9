/*!
Represent an [XML 1.0](https://www.w3.org/TR/2000/REC-xml-20001006) DTD
as a read-only model.

The root points of the documentation are [`Dtd::parse_external_subset`]
and [`Dtd::parse_document`], which accept an in-memory string, and
[`parse_external_subset`]/[`parse_xml_document`], which accept any
[`InputSource`] plus [`ParseOptions`].

The parser consumes a standalone external subset or the DOCTYPE
declaration of an XML document and produces the DTD's logical
structure: element types with their attributes and content models,
notations and entity tables. It does not validate instance documents
and it does not serialize a model back to text.

[`Dtd::parse_external_subset`]: struct.Dtd.html#method.parse_external_subset
[`Dtd::parse_document`]: struct.Dtd.html#method.parse_document
*/

#![doc(html_root_url = "https://docs.rs/rodtd/0.1.0")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Read;

mod chars;
mod parse;
mod scanner;

pub use parse::Error;

/// The <http://www.w3.org/XML/1998/namespace> URI.
pub const NS_XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// The <http://www.w3.org/2000/xmlns/> URI.
pub const NS_XMLNS_URI: &str = "http://www.w3.org/2000/xmlns/";

/// Position in text.
///
/// Position indicates a row/line and a column in the original text.
/// Starts from 1:1.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[allow(missing_docs)]
pub struct TextPos {
    pub row: u32,
    pub col: u32,
}

impl TextPos {
    /// Constructs a new `TextPos`.
    pub fn new(row: u32, col: u32) -> TextPos {
        TextPos { row, col }
    }
}

impl fmt::Display for TextPos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

/// A canonicalized XML name.
///
/// An `XmlName` has five observable forms: the local name, the
/// optional prefix, the optional namespace URI, the qualified form
/// (`prefix:local`) and the universal form (`uri^local`).
///
/// Names constructed in namespace-unaware mode keep the whole
/// qualified string as the local name, `:` included. Post-processing
/// replaces qualified names with namespace-aware ones.
///
/// Two names are equal iff their (URI, local) pairs are equal; the
/// prefix does not participate. The hash is derived from the
/// universal form.
///
/// # Examples
///
/// ```
/// use rodtd::XmlName;
///
/// let a = XmlName::with_namespace(Some("http://www.w3.org"), Some("n"), "e").unwrap();
/// let b = XmlName::with_namespace(Some("http://www.w3.org"), Some("m"), "e").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.universal(), "http://www.w3.org^e");
/// assert_eq!(a.qualified(), "n:e");
/// ```
#[derive(Clone)]
pub struct XmlName {
    local: String,
    prefix: Option<String>,
    uri: Option<String>,
    namespace_aware: bool,
}

impl XmlName {
    /// Constructs a namespace-unaware name.
    ///
    /// The whole string becomes the local name; `:` is kept as-is.
    pub fn new(name: &str) -> XmlName {
        XmlName {
            local: name.to_string(),
            prefix: None,
            uri: None,
            namespace_aware: false,
        }
    }

    /// Constructs a namespace-aware name.
    ///
    /// The local name must not contain `:` or `^`.
    pub fn with_namespace(
        uri: Option<&str>,
        prefix: Option<&str>,
        local: &str,
    ) -> Result<XmlName, Error> {
        if local.contains(':') || local.contains('^') {
            return Err(Error::InvalidLocalName(local.to_string()));
        }

        Ok(XmlName {
            local: local.to_string(),
            prefix: prefix.map(ToString::to_string),
            uri: uri.map(ToString::to_string),
            namespace_aware: true,
        })
    }

    /// Returns the local name.
    pub fn local(&self) -> &str {
        &self.local
    }

    /// Returns the prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the namespace URI, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// Checks whether the name was constructed in namespace-aware
    /// mode.
    pub fn is_namespace_aware(&self) -> bool {
        self.namespace_aware
    }

    /// Returns the qualified form: `prefix:local`, or the local name
    /// when there is no prefix.
    pub fn qualified(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }

    /// Returns the universal form: `uri^local`, or the local name
    /// when there is no namespace.
    pub fn universal(&self) -> String {
        match &self.uri {
            Some(uri) => format!("{}^{}", uri, self.local),
            None => self.local.clone(),
        }
    }
}

impl PartialEq for XmlName {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri && self.local == other.local
    }
}

impl Eq for XmlName {}

impl Hash for XmlName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.universal().hash(state);
    }
}

impl fmt::Debug for XmlName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.universal())
    }
}

impl fmt::Display for XmlName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.qualified())
    }
}

impl From<&str> for XmlName {
    fn from(name: &str) -> Self {
        XmlName::new(name)
    }
}

impl From<(&str, &str)> for XmlName {
    fn from((uri, local): (&str, &str)) -> Self {
        XmlName {
            local: local.to_string(),
            prefix: None,
            uri: Some(uri.to_string()),
            namespace_aware: true,
        }
    }
}

/// An element type's content model kind.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ContentType {
    /// `EMPTY`.
    Empty,
    /// `ANY`.
    Any,
    /// `(#PCDATA)`, with or without the trailing `*`.
    Pcdata,
    /// `(#PCDATA | Name | ...)*`.
    Mixed,
    /// Element content: a group of references and sub-groups.
    Element,
}

/// An attribute's declared type.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(missing_docs)]
pub enum AttributeType {
    Cdata,
    Id,
    Idref,
    Idrefs,
    Entity,
    Entities,
    Nmtoken,
    Nmtokens,
    /// A parenthesized list of nmtokens.
    Enumerated,
    /// `NOTATION (Name | ...)`.
    Notation,
}

/// An attribute's default declaration kind.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DefaultType {
    /// `#REQUIRED`.
    Required,
    /// `#IMPLIED`.
    Optional,
    /// `#FIXED "value"`.
    Fixed,
    /// A bare `"value"`.
    Default,
}

/// How the members of a content-model group combine.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GroupKind {
    /// `|`-separated.
    Choice,
    /// `,`-separated. Single-member groups are sequences.
    Sequence,
}

/// A node in a content-model tree: a reference to an element type or
/// a group of particles.
///
/// `required` and `repeatable` derive from the frequency modifier:
/// `?` is optional/non-repeatable, `+` required/repeatable,
/// `*` optional/repeatable, and none required/non-repeatable.
#[derive(Clone, PartialEq, Debug)]
pub enum Particle {
    /// A reference to an element type, by name.
    ///
    /// The name keys into [`Dtd::element_type`].
    #[allow(missing_docs)]
    Reference {
        name: XmlName,
        required: bool,
        repeatable: bool,
    },
    /// A parenthesized group with a single separator kind.
    #[allow(missing_docs)]
    Group {
        kind: GroupKind,
        members: Vec<Particle>,
        required: bool,
        repeatable: bool,
    },
}

impl Particle {
    /// Checks that the particle has no `?` or `*` modifier.
    pub fn is_required(&self) -> bool {
        match *self {
            Particle::Reference { required, .. } => required,
            Particle::Group { required, .. } => required,
        }
    }

    /// Checks that the particle has a `+` or `*` modifier.
    pub fn is_repeatable(&self) -> bool {
        match *self {
            Particle::Reference { repeatable, .. } => repeatable,
            Particle::Group { repeatable, .. } => repeatable,
        }
    }

    /// Returns every referenced element-type name, depth-first, in
    /// source order.
    pub fn references(&self) -> Vec<&XmlName> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references<'a>(&'a self, refs: &mut Vec<&'a XmlName>) {
        match self {
            Particle::Reference { name, .. } => refs.push(name),
            Particle::Group { members, .. } => {
                for member in members {
                    member.collect_references(refs);
                }
            }
        }
    }
}

/// A declared attribute.
#[derive(Clone, Debug)]
pub struct Attribute {
    pub(crate) name: XmlName,
    pub(crate) attr_type: AttributeType,
    pub(crate) default_type: DefaultType,
    pub(crate) default_value: Option<String>,
    pub(crate) enums: Vec<String>,
    pub(crate) is_namespace_declaration: bool,
}

impl Attribute {
    /// Returns the attribute's name.
    pub fn name(&self) -> &XmlName {
        &self.name
    }

    /// Returns the attribute's declared type.
    pub fn attribute_type(&self) -> AttributeType {
        self.attr_type
    }

    /// Returns the attribute's default declaration kind.
    pub fn default_type(&self) -> DefaultType {
        self.default_type
    }

    /// Returns the default value, present for `Fixed` and `Default`.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// Returns the enumerated tokens of an `Enumerated` or `Notation`
    /// attribute, in source order. Tokens are unique.
    pub fn enumerated_values(&self) -> &[String] {
        &self.enums
    }

    /// Checks whether the attribute declares an `xmlns` binding.
    ///
    /// Set during post-processing for CDATA attributes with a default
    /// value named `xmlns` or prefixed with `xmlns`.
    pub fn is_namespace_declaration(&self) -> bool {
        self.is_namespace_declaration
    }
}

/// A declared element type.
///
/// An element type may be created by a reference before its
/// declaration is seen; it is an error if a referenced element type
/// is never declared. An element type created only by an ATTLIST
/// declaration has no content type.
#[derive(Clone, Debug)]
pub struct ElementType {
    pub(crate) name: XmlName,
    pub(crate) content_type: Option<ContentType>,
    pub(crate) content: Option<Particle>,
    pub(crate) attributes: HashMap<XmlName, Attribute>,
    pub(crate) children: HashSet<XmlName>,
    pub(crate) parents: HashSet<XmlName>,
}

impl ElementType {
    pub(crate) fn new(name: XmlName) -> ElementType {
        ElementType {
            name,
            content_type: None,
            content: None,
            attributes: HashMap::new(),
            children: HashSet::new(),
            parents: HashSet::new(),
        }
    }

    /// Returns the element type's name.
    pub fn name(&self) -> &XmlName {
        &self.name
    }

    /// Returns the content model kind, or `None` when the element
    /// type was never declared with `<!ELEMENT>`.
    pub fn content_type(&self) -> Option<ContentType> {
        self.content_type
    }

    /// Returns the root content group, present for `Mixed` and
    /// `Element` content.
    pub fn content(&self) -> Option<&Particle> {
        self.content.as_ref()
    }

    /// Returns the element type's attributes.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Returns an attribute by name.
    ///
    /// # Examples
    ///
    /// ```
    /// let dtd = rodtd::Dtd::parse_external_subset(
    ///     "<!ELEMENT e EMPTY><!ATTLIST e a CDATA #IMPLIED>"
    /// ).unwrap();
    ///
    /// let e = dtd.element_type("e").unwrap();
    /// assert!(e.attribute("a").is_some());
    /// assert!(e.attribute("b").is_none());
    /// ```
    pub fn attribute<N>(&self, name: N) -> Option<&Attribute>
    where
        N: Into<XmlName>,
    {
        self.attributes.get(&name.into())
    }

    /// Returns the names of the element types this one directly
    /// contains.
    pub fn children(&self) -> impl Iterator<Item = &XmlName> {
        self.children.iter()
    }

    /// Checks for a direct child element type.
    pub fn has_child<N>(&self, name: N) -> bool
    where
        N: Into<XmlName>,
    {
        self.children.contains(&name.into())
    }

    /// Returns the names of the element types this one directly
    /// appears in.
    pub fn parents(&self) -> impl Iterator<Item = &XmlName> {
        self.parents.iter()
    }

    /// Checks for a direct parent element type.
    pub fn has_parent<N>(&self, name: N) -> bool
    where
        N: Into<XmlName>,
    {
        self.parents.contains(&name.into())
    }
}

/// A parameter entity: `<!ENTITY % name ...>`.
///
/// Parameter entities are consumed during parsing; they are retained
/// for introspection only.
#[derive(Clone, Debug)]
pub struct ParameterEntity {
    pub(crate) name: String,
    pub(crate) value: Option<String>,
    pub(crate) system_id: Option<String>,
    pub(crate) public_id: Option<String>,
}

/// A parsed general entity: `<!ENTITY name ...>` without `NDATA`.
///
/// The five predefined entities (`lt`, `gt`, `amp`, `apos`, `quot`)
/// are always present.
#[derive(Clone, Debug)]
pub struct GeneralEntity {
    pub(crate) name: String,
    pub(crate) value: Option<String>,
    pub(crate) system_id: Option<String>,
    pub(crate) public_id: Option<String>,
}

/// An unparsed entity: an external entity with an `NDATA` notation.
#[derive(Clone, Debug)]
pub struct UnparsedEntity {
    pub(crate) name: String,
    pub(crate) system_id: Option<String>,
    pub(crate) public_id: Option<String>,
    pub(crate) notation: String,
}

macro_rules! entity_accessors {
    ($t:ty) => {
        impl $t {
            /// Returns the entity's name.
            pub fn name(&self) -> &str {
                &self.name
            }

            /// Returns the system identifier of an external entity.
            pub fn system_id(&self) -> Option<&str> {
                self.system_id.as_deref()
            }

            /// Returns the public identifier of an external entity.
            pub fn public_id(&self) -> Option<&str> {
                self.public_id.as_deref()
            }
        }
    };
}

entity_accessors!(ParameterEntity);
entity_accessors!(GeneralEntity);
entity_accessors!(UnparsedEntity);

impl ParameterEntity {
    /// Returns the replacement text of an internal entity.
    ///
    /// Mutually exclusive with the identifiers.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl GeneralEntity {
    /// Returns the replacement text of an internal entity.
    ///
    /// Mutually exclusive with the identifiers.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl UnparsedEntity {
    /// Returns the name of the entity's notation.
    pub fn notation(&self) -> &str {
        &self.notation
    }
}

/// A declared notation.
///
/// At least one of the identifiers is present.
#[derive(Clone, Debug)]
pub struct Notation {
    pub(crate) name: String,
    pub(crate) system_id: Option<String>,
    pub(crate) public_id: Option<String>,
}

impl Notation {
    /// Returns the notation's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the system identifier.
    pub fn system_id(&self) -> Option<&str> {
        self.system_id.as_deref()
    }

    /// Returns the public identifier.
    pub fn public_id(&self) -> Option<&str> {
        self.public_id.as_deref()
    }
}

/// An XML DTD as a read-only model.
///
/// A `Dtd` owns every model object; element types refer to each other
/// by name through the element-type map, never by pointer.
#[derive(Clone, Debug)]
pub struct Dtd {
    pub(crate) element_types: HashMap<XmlName, ElementType>,
    pub(crate) notations: HashMap<String, Notation>,
    pub(crate) parameter_entities: HashMap<String, ParameterEntity>,
    pub(crate) general_entities: HashMap<String, GeneralEntity>,
    pub(crate) unparsed_entities: HashMap<String, UnparsedEntity>,
}

impl Dtd {
    pub(crate) fn new() -> Dtd {
        let mut general_entities = HashMap::new();
        for (name, value) in [
            ("lt", "&#60;"),
            ("gt", "&#62;"),
            ("amp", "&#38;"),
            ("apos", "&#39;"),
            ("quot", "&#34;"),
        ] {
            general_entities.insert(
                name.to_string(),
                GeneralEntity {
                    name: name.to_string(),
                    value: Some(value.to_string()),
                    system_id: None,
                    public_id: None,
                },
            );
        }

        Dtd {
            element_types: HashMap::new(),
            notations: HashMap::new(),
            parameter_entities: HashMap::new(),
            general_entities,
            unparsed_entities: HashMap::new(),
        }
    }

    /// Parses an in-memory string as a standalone external subset.
    ///
    /// This is a shorthand for [`parse_external_subset`] with default
    /// options.
    ///
    /// # Examples
    ///
    /// ```
    /// let dtd = rodtd::Dtd::parse_external_subset("<!ELEMENT e EMPTY>").unwrap();
    /// assert!(dtd.element_type("e").is_some());
    /// ```
    ///
    /// [`parse_external_subset`]: fn.parse_external_subset.html
    pub fn parse_external_subset(text: &str) -> Result<Dtd, Error> {
        crate::parse_external_subset(InputSource::from_str(text), ParseOptions::default())
    }

    /// Parses an in-memory string as an XML document, honoring only
    /// the prolog and the DOCTYPE declaration.
    ///
    /// # Examples
    ///
    /// ```
    /// let dtd = rodtd::Dtd::parse_document(
    ///     "<!DOCTYPE e [<!ELEMENT e EMPTY>]><e/>"
    /// ).unwrap();
    /// assert!(dtd.element_type("e").is_some());
    /// ```
    pub fn parse_document(text: &str) -> Result<Dtd, Error> {
        crate::parse_xml_document(InputSource::from_str(text), ParseOptions::default())
    }

    /// Returns an iterator over the declared element types.
    pub fn element_types(&self) -> impl Iterator<Item = &ElementType> {
        self.element_types.values()
    }

    /// Returns an element type by name.
    ///
    /// # Examples
    ///
    /// ```
    /// let dtd = rodtd::Dtd::parse_external_subset("<!ELEMENT e EMPTY>").unwrap();
    ///
    /// assert!(dtd.element_type("e").is_some());
    /// assert!(dtd.element_type("b").is_none());
    /// ```
    pub fn element_type<N>(&self, name: N) -> Option<&ElementType>
    where
        N: Into<XmlName>,
    {
        self.element_types.get(&name.into())
    }

    /// Returns an iterator over the declared notations.
    pub fn notations(&self) -> impl Iterator<Item = &Notation> {
        self.notations.values()
    }

    /// Returns a notation by name.
    pub fn notation(&self, name: &str) -> Option<&Notation> {
        self.notations.get(name)
    }

    /// Returns an iterator over the declared parameter entities.
    pub fn parameter_entities(&self) -> impl Iterator<Item = &ParameterEntity> {
        self.parameter_entities.values()
    }

    /// Returns a parameter entity by name.
    pub fn parameter_entity(&self, name: &str) -> Option<&ParameterEntity> {
        self.parameter_entities.get(name)
    }

    /// Returns an iterator over the parsed general entities,
    /// including the five predefined ones.
    pub fn general_entities(&self) -> impl Iterator<Item = &GeneralEntity> {
        self.general_entities.values()
    }

    /// Returns a parsed general entity by name.
    pub fn general_entity(&self, name: &str) -> Option<&GeneralEntity> {
        self.general_entities.get(name)
    }

    /// Returns an iterator over the unparsed entities.
    pub fn unparsed_entities(&self) -> impl Iterator<Item = &UnparsedEntity> {
        self.unparsed_entities.values()
    }

    /// Returns an unparsed entity by name.
    pub fn unparsed_entity(&self, name: &str) -> Option<&UnparsedEntity> {
        self.unparsed_entities.get(name)
    }
}

/// Where DTD text comes from.
///
/// A source carries at least one of: in-memory text, a byte stream
/// (decoded as UTF-8), or a system identifier to be resolved through
/// the [`EntityResolver`].
pub struct InputSource {
    pub(crate) text: Option<String>,
    pub(crate) reader: Option<Box<dyn Read>>,
    pub(crate) system_id: Option<String>,
    pub(crate) public_id: Option<String>,
}

impl InputSource {
    /// A source over an in-memory string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> InputSource {
        InputSource {
            text: Some(text.to_string()),
            reader: None,
            system_id: None,
            public_id: None,
        }
    }

    /// A source over a byte stream; the bytes must be UTF-8.
    pub fn from_reader<R: Read + 'static>(reader: R) -> InputSource {
        InputSource {
            text: None,
            reader: Some(Box::new(reader)),
            system_id: None,
            public_id: None,
        }
    }

    /// A source named only by a system identifier, to be opened by
    /// the entity resolver at parse start.
    pub fn from_system_id(system_id: &str) -> InputSource {
        InputSource {
            text: None,
            reader: None,
            system_id: Some(system_id.to_string()),
            public_id: None,
        }
    }

    /// Attaches a system identifier.
    pub fn with_system_id(mut self, system_id: &str) -> InputSource {
        self.system_id = Some(system_id.to_string());
        self
    }

    /// Attaches a public identifier.
    pub fn with_public_id(mut self, public_id: &str) -> InputSource {
        self.public_id = Some(public_id.to_string());
        self
    }
}

/// Maps external identifiers to input sources.
///
/// The resolver is the sole mechanism by which external subsets and
/// external entities are fetched; the parser never opens files or
/// URLs itself. Returning `Ok(None)` fails the parse with a
/// diagnostic naming whichever identifier was supplied.
pub trait EntityResolver {
    /// Opens the resource behind a (public ID, system ID) pair.
    fn resolve(
        &mut self,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> std::io::Result<Option<InputSource>>;
}

/// Parsing options.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
///
/// let mut prefixes = HashMap::new();
/// prefixes.insert("svg".to_string(), "http://www.w3.org/2000/svg".to_string());
///
/// let opt = rodtd::ParseOptions { prefixes: Some(prefixes), ..Default::default() };
/// let dtd = rodtd::parse_external_subset(
///     rodtd::InputSource::from_str("<!ELEMENT svg:rect EMPTY>"),
///     opt,
/// ).unwrap();
///
/// let rect = dtd.element_type(("http://www.w3.org/2000/svg", "rect")).unwrap();
/// assert_eq!(rect.name().prefix(), Some("svg"));
/// ```
#[derive(Default)]
pub struct ParseOptions {
    /// A prefix-to-URI table used directly for name resolution.
    ///
    /// The empty-string prefix denotes the default namespace. When
    /// present, the xmlns-scanning post-pass is skipped; when absent,
    /// the table is derived from `xmlns` attribute declarations.
    pub prefixes: Option<HashMap<String, String>>,

    /// Resolves external subsets and external entities.
    pub resolver: Option<Box<dyn EntityResolver>>,
}

/// Parses an XML document, honoring only the prolog and the DOCTYPE
/// declaration. The rest of the document is abandoned.
pub fn parse_xml_document(source: InputSource, options: ParseOptions) -> Result<Dtd, Error> {
    parse::parse(source, options, parse::ParseMode::Document)
}

/// Parses a standalone external DTD subset, optionally starting with
/// a text declaration.
pub fn parse_external_subset(source: InputSource, options: ParseOptions) -> Result<Dtd, Error> {
    parse::parse(source, options, parse::ParseMode::ExternalSubset)
}
