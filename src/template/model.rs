use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// A message template as returned by the WhatsApp Business template listing API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub language: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub components: Vec<TemplateComponent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateComponent {
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: ComponentKind,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_kind")]
    pub format: Option<HeaderFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "positional_seq")]
    pub buttons: Vec<TemplateButton>,
}

impl TemplateComponent {
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateButton {
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: ButtonKind,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    Header,
    Body,
    Footer,
    Buttons,
    #[default]
    Unknown,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Header => "HEADER",
            ComponentKind::Body => "BODY",
            ComponentKind::Footer => "FOOTER",
            ComponentKind::Buttons => "BUTTONS",
            ComponentKind::Unknown => "UNKNOWN",
        }
    }
}

impl From<String> for ComponentKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "HEADER" => ComponentKind::Header,
            "BODY" => ComponentKind::Body,
            "FOOTER" => ComponentKind::Footer,
            "BUTTONS" => ComponentKind::Buttons,
            _ => ComponentKind::Unknown,
        }
    }
}

impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        kind.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HeaderFormat {
    Text,
    Image,
    Video,
    Document,
    Location,
    Unknown,
}

impl HeaderFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderFormat::Text => "TEXT",
            HeaderFormat::Image => "IMAGE",
            HeaderFormat::Video => "VIDEO",
            HeaderFormat::Document => "DOCUMENT",
            HeaderFormat::Location => "LOCATION",
            HeaderFormat::Unknown => "UNKNOWN",
        }
    }
}

impl From<String> for HeaderFormat {
    fn from(raw: String) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "TEXT" => HeaderFormat::Text,
            "IMAGE" => HeaderFormat::Image,
            "VIDEO" => HeaderFormat::Video,
            "DOCUMENT" => HeaderFormat::Document,
            "LOCATION" => HeaderFormat::Location,
            _ => HeaderFormat::Unknown,
        }
    }
}

impl From<HeaderFormat> for String {
    fn from(format: HeaderFormat) -> Self {
        format.as_str().to_string()
    }
}

/// Button subtype. Parsed case-insensitively; serialized in the lower snake case
/// form the send API expects for `sub_type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ButtonKind {
    QuickReply,
    Url,
    PhoneNumber,
    CopyCode,
    Catalog,
    Otp,
    Flow,
    #[default]
    Other,
}

impl ButtonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ButtonKind::QuickReply => "quick_reply",
            ButtonKind::Url => "url",
            ButtonKind::PhoneNumber => "phone_number",
            ButtonKind::CopyCode => "copy_code",
            ButtonKind::Catalog => "catalog",
            ButtonKind::Otp => "otp",
            ButtonKind::Flow => "flow",
            ButtonKind::Other => "other",
        }
    }
}

impl From<String> for ButtonKind {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "quick_reply" => ButtonKind::QuickReply,
            "url" => ButtonKind::Url,
            "phone_number" => ButtonKind::PhoneNumber,
            "copy_code" => ButtonKind::CopyCode,
            "catalog" => ButtonKind::Catalog,
            "otp" => ButtonKind::Otp,
            "flow" => ButtonKind::Flow,
            _ => ButtonKind::Other,
        }
    }
}

impl From<ButtonKind> for String {
    fn from(kind: ButtonKind) -> Self {
        kind.as_str().to_string()
    }
}

// Third-party template data: entries that don't decode are dropped instead of
// failing the whole template.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(decode_items(deserializer)?
        .into_iter()
        .filter_map(|item| match item {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                debug!("skipping undecodable template entry: {err}");
                None
            }
        })
        .collect())
}

/// Like `lenient_seq`, but an undecodable entry becomes `T::default()` so the
/// position of every later entry is kept.
fn positional_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(decode_items(deserializer)?
        .into_iter()
        .enumerate()
        .map(|(position, item)| {
            item.unwrap_or_else(|err| {
                debug!(position, "undecodable template entry kept as default: {err}");
                T::default()
            })
        })
        .collect())
}

fn decode_items<'de, D, T>(deserializer: D) -> Result<Vec<Result<T, serde_json::Error>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = raw else {
        return Ok(Vec::new());
    };
    Ok(items.into_iter().map(serde_json::from_value::<T>).collect())
}

// Non-string kinds map to the enum's fallback variant rather than failing the entry.
fn lenient_kind<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String> + Default,
{
    Ok(lenient_opt_string(deserializer)?.map(T::from).unwrap_or_default())
}

fn lenient_opt_kind<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    Ok(lenient_opt_string(deserializer)?.map(T::from))
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}
