//! # Field Declarations
//!
//! A [`FieldDeclaration`] describes one document attribute: its type, its
//! constraints, and for objects and arrays its nested content. Declarations
//! are authored once per document type and shared immutably (`Arc`) by the
//! document type's field registry and by every schema emitted from them.
//!
//! ## Kind-specific constraints
//!
//! Constraints that only make sense for one kind are carried by that kind's
//! [`FieldType`] variant: numeric bounds live on `Integer`/`Number`, length
//! bounds on `String`, nested content on `Container`. A declaration with
//! length bounds on an integer cannot be constructed. Builder setters for a
//! constraint the kind does not carry are ignored with a warning, and so
//! are non-finite numeric bounds.
//!
//! Consistency between constraints (`minimum > maximum`, a default outside
//! the enum) is *not* checked here; the validation engine decides.
//!
//! ## Specialized strings
//!
//! | Constructor | Built-in pattern | `format` |
//! |---|---|---|
//! | [`date`](FieldDeclaration::date) | `YYYY-MM-DD`, `MM/DD/YYYY`, `MM/DD/YY` | |
//! | [`time`](FieldDeclaration::time) | `HH:MM`, `HH:MM:SS` | |
//! | [`datetime`](FieldDeclaration::datetime) | | `date-time` |
//! | [`duration`](FieldDeclaration::duration) | `<d>d <s>s <us>us` | |
//! | [`email`](FieldDeclaration::email) | | `email` |
//! | [`ip_address`](FieldDeclaration::ip_address) | | `ipv4` / `ipv6` |
//! | [`slug`](FieldDeclaration::slug) | `^[a-z0-9-]+$` | |
//! | [`url`](FieldDeclaration::url) | http(s)/ftp(s) URL | |
//!
//! A pattern passed to [`with_pattern`](FieldDeclaration::with_pattern)
//! replaces the built-in one.
//!
//! ## Fragment implementation
//!
//! [`with_codec`](FieldDeclaration::with_codec) attaches the [`Codec`] the
//! store uses to encode writes at this field. Fields without one use the
//! store's default.

use std::collections::BTreeMap;
use std::sync::Arc;

use jst_core::{Codec, Kind};
use serde_json::{Number, Value};

/// `YYYY-MM-DD`, `MM/DD/YYYY` or `MM/DD/YY`.
pub const DATE_PATTERN: &str = concat!(
    r"^(19|20)\d\d[-](0[1-9]|1[012])[-](0[1-9]|[12][0-9]|3[01])$|",
    r"^(0[1-9]|1[012])[/](0[1-9]|[12][0-9]|3[01])[/](19|20)\d\d$|",
    r"^(0[1-9]|1[012])[/](0[1-9]|[12][0-9]|3[01])[/]\d\d$"
);

/// `HH:MM` or `HH:MM:SS`.
pub const TIME_PATTERN: &str = concat!(
    r"^([0-1]?[0-9]|[2][0-3]):([0-5][0-9])$|",
    r"^([0-1]?[0-9]|[2][0-3]):([0-5][0-9]):([0-5][0-9])$"
);

/// `<days>d <seconds>s <microseconds>us`, matching `jst_core::temporal`.
pub const DURATION_PATTERN: &str = r"^(\d+)d (\d+)s (\d+)us$";

/// Lowercase ASCII letters, digits and hyphens.
pub const SLUG_PATTERN: &str = r"^[a-z0-9-]+$";

/// http, https, ftp or ftps URL with a domain, `localhost`, IPv4 or IPv6 host.
pub const URL_PATTERN: &str = concat!(
    r"^(http|ftp)s?://(([A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)",
    r"+([A-Za-z]{2,6}\.?|[A-Za-z0-9-]{2,}\.?)|localhost|\d{1,3}\.",
    r"\d{1,3}\.\d{1,3}\.\d{1,3}|\[?[a-fA-F0-9]*:[A-Fa-f0-9:]+\]?)",
    r"(:\d+)?(/?|[/?]\S+)$"
);

// ─── Numeric bounds ─────────────────────────────────────────────────

/// A numeric bound, kept as an integer when declared as one so that the
/// emitted schema reads `"minimum": 0` rather than `"minimum": 0.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Int(i64),
    Float(f64),
}

impl Bound {
    /// JSON form of the bound. Non-finite floats become `null`.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Int(i) => Value::from(*i),
            Self::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        }
    }

    /// Integers always; floats unless NaN or infinite.
    pub fn is_finite(&self) -> bool {
        match self {
            Self::Int(_) => true,
            Self::Float(f) => f.is_finite(),
        }
    }
}

impl From<i64> for Bound {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Bound {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for Bound {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Bound {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

/// `minimum`/`maximum` of an integer or number field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumericRange {
    pub minimum: Option<Bound>,
    pub maximum: Option<Bound>,
}

// ─── Strings ────────────────────────────────────────────────────────

/// Address family of an IP address field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IpProtocol {
    #[default]
    V4,
    V6,
}

impl IpProtocol {
    /// The JSON Schema `format` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V4 => "ipv4",
            Self::V6 => "ipv6",
        }
    }
}

/// Specialization of a string field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StringFormat {
    #[default]
    Plain,
    Date,
    Time,
    DateTime,
    Duration,
    Email,
    IpAddress(IpProtocol),
    Slug,
    Url,
}

impl StringFormat {
    /// Pattern applied when the caller does not supply one.
    pub fn builtin_pattern(&self) -> Option<&'static str> {
        match self {
            Self::Date => Some(DATE_PATTERN),
            Self::Time => Some(TIME_PATTERN),
            Self::Duration => Some(DURATION_PATTERN),
            Self::Slug => Some(SLUG_PATTERN),
            Self::Url => Some(URL_PATTERN),
            Self::Plain | Self::DateTime | Self::Email | Self::IpAddress(_) => None,
        }
    }

    /// The JSON Schema `format` keyword emitted for this specialization.
    pub fn format_tag(&self) -> Option<&'static str> {
        match self {
            Self::DateTime => Some("date-time"),
            Self::Email => Some("email"),
            Self::IpAddress(protocol) => Some(protocol.as_str()),
            Self::Plain | Self::Date | Self::Time | Self::Duration | Self::Slug | Self::Url => None,
        }
    }
}

/// Constraints of a string field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StringType {
    pub format: StringFormat,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
}

// ─── Containers ─────────────────────────────────────────────────────

/// Nested content of an object or array field.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// Named child declarations of an object field.
    Properties(BTreeMap<String, Arc<FieldDeclaration>>),
    /// Positional item declarations of an array field. Position `i` of the
    /// array is described by entry `i`; this is tuple validation, not one
    /// shared item schema.
    Items(Vec<Arc<FieldDeclaration>>),
}

impl Content {
    /// `Object` for properties, `Array` for items.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Properties(_) => Kind::Object,
            Self::Items(_) => Kind::Array,
        }
    }

    /// Number of child declarations.
    pub fn len(&self) -> usize {
        match self {
            Self::Properties(props) => props.len(),
            Self::Items(items) => items.len(),
        }
    }

    /// Whether there are no child declarations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Type of a declared field together with its kind-specific constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Boolean,
    Integer(NumericRange),
    Number(NumericRange),
    String(StringType),
    Container(Content),
}

impl FieldType {
    /// The JSON kind.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Boolean => Kind::Boolean,
            Self::Integer(_) => Kind::Integer,
            Self::Number(_) => Kind::Number,
            Self::String(_) => Kind::String,
            Self::Container(content) => content.kind(),
        }
    }
}

// ─── Declaration ────────────────────────────────────────────────────

/// Immutable description of one document attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    title: Option<String>,
    description: Option<String>,
    default: Option<Value>,
    optional: bool,
    nullable: bool,
    pattern: Option<String>,
    enum_values: Option<Vec<Value>>,
    codec: Option<Codec>,
    field_type: FieldType,
}

impl FieldDeclaration {
    /// A declaration of the given type with all defaults: required,
    /// non-nullable, no pattern, no enum.
    pub fn new(field_type: FieldType) -> Self {
        let pattern = match &field_type {
            FieldType::String(string) => string.format.builtin_pattern().map(str::to_string),
            _ => None,
        };
        Self {
            title: None,
            description: None,
            default: None,
            optional: false,
            nullable: false,
            pattern,
            enum_values: None,
            codec: None,
            field_type,
        }
    }

    pub fn boolean() -> Self {
        Self::new(FieldType::Boolean)
    }

    pub fn integer() -> Self {
        Self::new(FieldType::Integer(NumericRange::default()))
    }

    /// A `number` field (JSON floating point).
    pub fn number() -> Self {
        Self::new(FieldType::Number(NumericRange::default()))
    }

    pub fn string() -> Self {
        Self::string_with_format(StringFormat::Plain)
    }

    pub fn date() -> Self {
        Self::string_with_format(StringFormat::Date)
    }

    pub fn time() -> Self {
        Self::string_with_format(StringFormat::Time)
    }

    pub fn datetime() -> Self {
        Self::string_with_format(StringFormat::DateTime)
    }

    pub fn duration() -> Self {
        Self::string_with_format(StringFormat::Duration)
    }

    pub fn email() -> Self {
        Self::string_with_format(StringFormat::Email)
    }

    /// An IPv4 address field; see [`with_protocol`](Self::with_protocol).
    pub fn ip_address() -> Self {
        Self::string_with_format(StringFormat::IpAddress(IpProtocol::V4))
    }

    pub fn slug() -> Self {
        Self::string_with_format(StringFormat::Slug)
    }

    pub fn url() -> Self {
        Self::string_with_format(StringFormat::Url)
    }

    /// A string field with the given specialization and its built-in pattern.
    pub fn string_with_format(format: StringFormat) -> Self {
        Self::new(FieldType::String(StringType {
            format,
            ..StringType::default()
        }))
    }

    /// An object field with named child declarations.
    pub fn object<K, I>(properties: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldDeclaration)>,
    {
        let properties = properties
            .into_iter()
            .map(|(name, field)| (name.into(), Arc::new(field)))
            .collect();
        Self::new(FieldType::Container(Content::Properties(properties)))
    }

    /// An array field with positional item declarations.
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = FieldDeclaration>,
    {
        let items = items.into_iter().map(Arc::new).collect();
        Self::new(FieldType::Container(Content::Items(items)))
    }

    // ─── Builder setters ────────────────────────────────────────────

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Mark the field as optional (may be absent from its parent object).
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// Allow `null` in addition to the declared kind.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the regular expression the value must match, replacing any
    /// built-in pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Restrict the value to an ordered set of allowed values.
    pub fn with_enum<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Encode writes at this field with `codec` instead of the store's
    /// default.
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn with_minimum(mut self, minimum: impl Into<Bound>) -> Self {
        let minimum = minimum.into();
        if !minimum.is_finite() {
            non_finite_bound("minimum", &minimum);
            return self;
        }
        match &mut self.field_type {
            FieldType::Integer(range) | FieldType::Number(range) => {
                range.minimum = Some(minimum)
            }
            other => ignored_setter("minimum", other),
        }
        self
    }

    pub fn with_maximum(mut self, maximum: impl Into<Bound>) -> Self {
        let maximum = maximum.into();
        if !maximum.is_finite() {
            non_finite_bound("maximum", &maximum);
            return self;
        }
        match &mut self.field_type {
            FieldType::Integer(range) | FieldType::Number(range) => {
                range.maximum = Some(maximum)
            }
            other => ignored_setter("maximum", other),
        }
        self
    }

    pub fn with_min_length(mut self, min_length: u64) -> Self {
        match &mut self.field_type {
            FieldType::String(string) => string.min_length = Some(min_length),
            other => ignored_setter("minLength", other),
        }
        self
    }

    pub fn with_max_length(mut self, max_length: u64) -> Self {
        match &mut self.field_type {
            FieldType::String(string) => string.max_length = Some(max_length),
            other => ignored_setter("maxLength", other),
        }
        self
    }

    /// Choose the address family of an IP address field.
    pub fn with_protocol(mut self, protocol: IpProtocol) -> Self {
        match &mut self.field_type {
            FieldType::String(StringType {
                format: StringFormat::IpAddress(current),
                ..
            }) => *current = protocol,
            other => ignored_setter("protocol", other),
        }
        self
    }

    // ─── Accessors ──────────────────────────────────────────────────

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn enum_values(&self) -> Option<&[Value]> {
        self.enum_values.as_deref()
    }

    /// The field's own codec, if it overrides the store default.
    pub fn codec(&self) -> Option<&Codec> {
        self.codec.as_ref()
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn kind(&self) -> Kind {
        self.field_type.kind()
    }

    /// Nested content, for object and array fields.
    pub fn content(&self) -> Option<&Content> {
        match &self.field_type {
            FieldType::Container(content) => Some(content),
            _ => None,
        }
    }
}

fn non_finite_bound(constraint: &str, bound: &Bound) {
    tracing::warn!(constraint, bound = ?bound, "non-finite bound ignored");
}

fn ignored_setter(constraint: &str, field_type: &FieldType) {
    tracing::warn!(
        constraint,
        kind = %field_type.kind(),
        "constraint does not apply to this field kind; ignored"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_required_and_not_nullable() {
        let f = FieldDeclaration::integer();
        assert!(!f.is_optional());
        assert!(!f.is_nullable());
        assert!(f.pattern().is_none());
        assert!(f.enum_values().is_none());
        assert!(f.title().is_none());
        assert_eq!(f.kind(), Kind::Integer);
    }

    #[test]
    fn builder_records_common_attributes() {
        let f = FieldDeclaration::string()
            .with_title("event")
            .with_description("important historical event")
            .with_default("unknown")
            .with_optional(true)
            .with_nullable(true)
            .with_enum(["a", "b"]);
        assert_eq!(f.title(), Some("event"));
        assert_eq!(f.description(), Some("important historical event"));
        assert_eq!(f.default_value(), Some(&json!("unknown")));
        assert!(f.is_optional());
        assert!(f.is_nullable());
        assert_eq!(f.enum_values(), Some(&[json!("a"), json!("b")][..]));
    }

    #[test]
    fn numeric_bounds_recorded_on_numeric_kinds() {
        let f = FieldDeclaration::integer().with_minimum(0).with_maximum(100);
        assert_eq!(
            f.field_type(),
            &FieldType::Integer(NumericRange {
                minimum: Some(Bound::Int(0)),
                maximum: Some(Bound::Int(100)),
            })
        );

        let f = FieldDeclaration::number().with_minimum(0.5);
        assert_eq!(
            f.field_type(),
            &FieldType::Number(NumericRange {
                minimum: Some(Bound::Float(0.5)),
                maximum: None,
            })
        );
    }

    #[test]
    fn non_finite_bounds_are_ignored() {
        let f = FieldDeclaration::number()
            .with_minimum(f64::NAN)
            .with_maximum(f64::INFINITY);
        assert_eq!(f, FieldDeclaration::number());

        let f = FieldDeclaration::number().with_minimum(0.5).with_maximum(f64::NEG_INFINITY);
        assert_eq!(
            f.field_type(),
            &FieldType::Number(NumericRange {
                minimum: Some(Bound::Float(0.5)),
                maximum: None,
            })
        );
    }

    #[test]
    fn codec_is_recorded() {
        assert!(FieldDeclaration::duration().codec().is_none());
        let codec = Codec::temporal();
        let f = FieldDeclaration::duration().with_codec(codec.clone());
        assert_eq!(f.codec(), Some(&codec));
    }

    #[test]
    fn inconsistent_bounds_are_not_rejected() {
        let f = FieldDeclaration::integer().with_minimum(10).with_maximum(1);
        assert_eq!(f.kind(), Kind::Integer);
    }

    #[test]
    fn inapplicable_constraints_are_ignored() {
        let f = FieldDeclaration::string().with_minimum(3);
        assert_eq!(f, FieldDeclaration::string());

        let f = FieldDeclaration::integer().with_max_length(3);
        assert_eq!(f, FieldDeclaration::integer());

        let f = FieldDeclaration::email().with_protocol(IpProtocol::V6);
        assert_eq!(f, FieldDeclaration::email());
    }

    #[test]
    fn specialized_strings_carry_builtin_patterns() {
        assert_eq!(FieldDeclaration::date().pattern(), Some(DATE_PATTERN));
        assert_eq!(FieldDeclaration::time().pattern(), Some(TIME_PATTERN));
        assert_eq!(FieldDeclaration::duration().pattern(), Some(DURATION_PATTERN));
        assert_eq!(FieldDeclaration::slug().pattern(), Some(SLUG_PATTERN));
        assert_eq!(FieldDeclaration::url().pattern(), Some(URL_PATTERN));
        assert_eq!(FieldDeclaration::email().pattern(), None);
        assert_eq!(FieldDeclaration::datetime().pattern(), None);
    }

    #[test]
    fn caller_pattern_overrides_builtin() {
        let f = FieldDeclaration::date().with_pattern(r"^\d{8}$");
        assert_eq!(f.pattern(), Some(r"^\d{8}$"));
    }

    #[test]
    fn ip_protocol_defaults_to_v4() {
        let f = FieldDeclaration::ip_address();
        assert_eq!(
            f.field_type(),
            &FieldType::String(StringType {
                format: StringFormat::IpAddress(IpProtocol::V4),
                ..StringType::default()
            })
        );
        let f = f.with_protocol(IpProtocol::V6);
        let FieldType::String(string) = f.field_type() else {
            panic!("ip address field is not a string");
        };
        assert_eq!(string.format.format_tag(), Some("ipv6"));
    }

    #[test]
    fn containers_report_kind_and_content() {
        let obj = FieldDeclaration::object([
            ("title", FieldDeclaration::string()),
            ("importance", FieldDeclaration::integer()),
        ]);
        assert_eq!(obj.kind(), Kind::Object);
        assert_eq!(obj.content().map(Content::len), Some(2));

        let list = FieldDeclaration::list([FieldDeclaration::string()]);
        assert_eq!(list.kind(), Kind::Array);
        assert!(matches!(list.content(), Some(Content::Items(items)) if items.len() == 1));

        assert!(FieldDeclaration::boolean().content().is_none());
    }

    #[test]
    fn empty_containers() {
        let list = FieldDeclaration::list(Vec::new());
        assert!(list.content().is_some_and(Content::is_empty));
        let obj = FieldDeclaration::object(Vec::<(String, FieldDeclaration)>::new());
        assert!(obj.content().is_some_and(Content::is_empty));
    }

    #[test]
    fn bound_json_forms() {
        assert_eq!(Bound::Int(3).to_value(), json!(3));
        assert_eq!(Bound::Float(2.5).to_value(), json!(2.5));
        assert_eq!(Bound::Float(f64::INFINITY).to_value(), Value::Null);
    }
}
