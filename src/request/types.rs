use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

static PERSON_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{4,32}$").expect("person id pattern"));
static CALLBACK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_$]{1,128}$").expect("callback pattern"));
static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-_:;{}A-Za-z0-9]{1,32}$").expect("key pattern"));

/// Whether `name` may be used as a record key.
pub fn is_valid_key(name: &str) -> bool {
    KEY_PATTERN.is_match(name)
}

/// A single raw parameter value as it arrived.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Plain string, from a query string, form body or JSON string.
    Text(String),
    /// Anything else a JSON body can carry (arrays, objects, numbers...).
    Structured(Value),
}

impl ParamValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(text) => Some(text),
            ParamValue::Structured(_) => None,
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => ParamValue::Text(text),
            other => ParamValue::Structured(other),
        }
    }
}

/// Untrusted request parameters, in arrival order.
///
/// Names may repeat; lookups and payload extraction let the last
/// occurrence win.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParams(Vec<(String, ParamValue)>);

impl RawParams {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, name: impl Into<String>, value: ParamValue) {
        self.0.push((name.into(), value));
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.push(name, ParamValue::Text(value.into()));
    }

    /// Builds params from decoded query-string or form pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (name, value) in pairs {
            params.push_text(name, value);
        }
        params
    }

    /// Builds params from a JSON body. Only a top-level object is accepted.
    pub fn from_json(body: Value) -> Option<Self> {
        match body {
            Value::Object(map) => Some(Self(
                map.into_iter()
                    .map(|(name, value)| (name, ParamValue::from(value)))
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Last value supplied under `name`.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0
            .iter()
            .rev()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| value)
    }

    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn extend(&mut self, other: RawParams) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parameter batches collected for one request.
///
/// A request that never received a batch is a wiring mistake on the
/// transport side, not an empty request.
#[derive(Debug, Clone, Default)]
pub struct KvsRequest {
    params: Option<RawParams>,
}

impl KvsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a batch; later batches win for repeated names.
    pub fn add_parameters(&mut self, params: RawParams) -> &mut Self {
        match self.params.as_mut() {
            Some(existing) => existing.extend(params),
            None => self.params = Some(params),
        }
        self
    }

    pub fn with_parameters(mut self, params: RawParams) -> Self {
        self.add_parameters(params);
        self
    }

    pub fn params(&self) -> Option<&RawParams> {
        self.params.as_ref()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Fetch,
    Update,
    Remove,
}

impl Mode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "fetch" => Some(Mode::Fetch),
            "update" => Some(Mode::Update),
            "remove" => Some(Mode::Remove),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Fetch => "fetch",
            Mode::Update => "update",
            Mode::Remove => "remove",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque caller-chosen identifier of one record: `[A-Za-z0-9_]{4,32}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonId(String);

impl PersonId {
    pub fn parse(raw: &str) -> Option<Self> {
        PERSON_ID_PATTERN
            .is_match(raw)
            .then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of the function a JSONP response is wrapped in: `[A-Za-z0-9_$]{1,128}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackName(String);

impl CallbackName {
    pub fn parse(raw: &str) -> Option<Self> {
        CALLBACK_PATTERN
            .is_match(raw)
            .then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// What a request asks for, after validation.
///
/// `person_id` and `callback` are `None` when the parameter was missing or
/// malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub mode: Mode,
    pub person_id: Option<PersonId>,
    pub callback: Option<CallbackName>,
}
