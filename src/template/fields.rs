use crate::template::model::ButtonKind;
use crate::template::wire::ComponentType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Identity of one user-fillable slot.
///
/// Body indexes are the scan position of the placeholder in the body text and
/// button indexes are the button's declared position. The string form
/// (`body_0_currency_code`, `button_2_payload`, ...) only exists at the JSON
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldKey {
    HeaderImage,
    HeaderVideo,
    HeaderDocument,
    HeaderDocumentFilename,
    HeaderText,
    BodyText(usize),
    BodyCurrencyCode(usize),
    BodyCurrencyAmount(usize),
    BodyDateTime(usize),
    ButtonPayload(usize),
    ButtonUrlSuffix(usize),
    ButtonCopyCode(usize),
    ButtonOtp(usize),
}

impl FieldKey {
    pub fn component_type(&self) -> ComponentType {
        match self {
            FieldKey::HeaderImage
            | FieldKey::HeaderVideo
            | FieldKey::HeaderDocument
            | FieldKey::HeaderDocumentFilename
            | FieldKey::HeaderText => ComponentType::Header,
            FieldKey::BodyText(_)
            | FieldKey::BodyCurrencyCode(_)
            | FieldKey::BodyCurrencyAmount(_)
            | FieldKey::BodyDateTime(_) => ComponentType::Body,
            FieldKey::ButtonPayload(_)
            | FieldKey::ButtonUrlSuffix(_)
            | FieldKey::ButtonCopyCode(_)
            | FieldKey::ButtonOtp(_) => ComponentType::Button,
        }
    }

    /// Field holding the runtime value for a button of the given subtype.
    pub fn for_button(kind: ButtonKind, position: usize) -> Option<FieldKey> {
        match kind {
            ButtonKind::QuickReply => Some(FieldKey::ButtonPayload(position)),
            ButtonKind::Url => Some(FieldKey::ButtonUrlSuffix(position)),
            ButtonKind::CopyCode => Some(FieldKey::ButtonCopyCode(position)),
            ButtonKind::Otp => Some(FieldKey::ButtonOtp(position)),
            ButtonKind::PhoneNumber | ButtonKind::Catalog | ButtonKind::Flow | ButtonKind::Other => None,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKey::HeaderImage => f.write_str("header_image"),
            FieldKey::HeaderVideo => f.write_str("header_video"),
            FieldKey::HeaderDocument => f.write_str("header_document"),
            FieldKey::HeaderDocumentFilename => f.write_str("header_document_filename"),
            FieldKey::HeaderText => f.write_str("header_text"),
            FieldKey::BodyText(i) => write!(f, "body_{i}"),
            FieldKey::BodyCurrencyCode(i) => write!(f, "body_{i}_currency_code"),
            FieldKey::BodyCurrencyAmount(i) => write!(f, "body_{i}_currency_amount"),
            FieldKey::BodyDateTime(i) => write!(f, "body_{i}_datetime"),
            FieldKey::ButtonPayload(i) => write!(f, "button_{i}_payload"),
            FieldKey::ButtonUrlSuffix(i) => write!(f, "button_{i}_url_suffix"),
            FieldKey::ButtonCopyCode(i) => write!(f, "button_{i}_copy_code"),
            FieldKey::ButtonOtp(i) => write!(f, "button_{i}_otp"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field id: {0}")]
pub struct UnknownFieldId(pub String);

impl FromStr for FieldKey {
    type Err = UnknownFieldId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownFieldId(raw.to_string());
        match raw {
            "header_image" => return Ok(FieldKey::HeaderImage),
            "header_video" => return Ok(FieldKey::HeaderVideo),
            "header_document" => return Ok(FieldKey::HeaderDocument),
            "header_document_filename" => return Ok(FieldKey::HeaderDocumentFilename),
            "header_text" => return Ok(FieldKey::HeaderText),
            _ => {}
        }

        if let Some(rest) = raw.strip_prefix("body_") {
            let (index, slot) = split_index(rest).ok_or_else(unknown)?;
            return match slot {
                "" => Ok(FieldKey::BodyText(index)),
                "_currency_code" => Ok(FieldKey::BodyCurrencyCode(index)),
                "_currency_amount" => Ok(FieldKey::BodyCurrencyAmount(index)),
                "_datetime" => Ok(FieldKey::BodyDateTime(index)),
                _ => Err(unknown()),
            };
        }

        if let Some(rest) = raw.strip_prefix("button_") {
            let (index, slot) = split_index(rest).ok_or_else(unknown)?;
            return match slot {
                "_payload" => Ok(FieldKey::ButtonPayload(index)),
                "_url_suffix" => Ok(FieldKey::ButtonUrlSuffix(index)),
                "_copy_code" => Ok(FieldKey::ButtonCopyCode(index)),
                "_otp" => Ok(FieldKey::ButtonOtp(index)),
                _ => Err(unknown()),
            };
        }

        Err(unknown())
    }
}

fn split_index(rest: &str) -> Option<(usize, &str)> {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let index = rest[..digits].parse().ok()?;
    Some((index, &rest[digits..]))
}

impl TryFrom<String> for FieldKey {
    type Error = UnknownFieldId;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<FieldKey> for String {
    fn from(key: FieldKey) -> Self {
        key.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterType {
    Text,
    Currency,
    DateTime,
    Image,
    Video,
    Document,
    Payload,
    CouponCode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationKind {
    Url,
    Text,
    Email,
    Phone,
    Number,
    Currency,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(rename = "type")]
    pub kind: ValidationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl FieldValidation {
    pub fn new(kind: ValidationKind) -> Self {
        Self {
            kind,
            min_length: None,
            max_length: None,
            pattern: None,
        }
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }
}

/// Descriptor of one input the form layer has to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredField {
    pub id: FieldKey,
    pub component_type: ComponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_index: Option<usize>,
    pub parameter_type: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<ButtonKind>,
    pub label: String,
    pub placeholder: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    Number(f64),
    Text(String),
}

impl InputValue {
    pub fn as_text(&self) -> String {
        match self {
            InputValue::Text(s) => s.clone(),
            InputValue::Number(n) => n.to_string(),
        }
    }

    /// Blank strings count as "not supplied"; numbers always count as supplied.
    pub fn is_blank(&self) -> bool {
        match self {
            InputValue::Text(s) => s.trim().is_empty(),
            InputValue::Number(_) => false,
        }
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Text(value)
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Number(value)
    }
}

/// Values submitted by the form layer, keyed by field id.
///
/// Unknown ids and non-scalar values are dropped on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "HashMap<String, Value>")]
pub struct UserInputValues(HashMap<FieldKey, InputValue>);

impl UserInputValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: FieldKey, value: impl Into<InputValue>) {
        self.0.insert(key, value.into());
    }

    pub fn with(mut self, key: FieldKey, value: impl Into<InputValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: FieldKey) -> Option<&InputValue> {
        self.0.get(&key)
    }

    /// Value for `key` unless it is missing or blank.
    pub fn supplied(&self, key: FieldKey) -> Option<&InputValue> {
        self.get(key).filter(|value| !value.is_blank())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries of `overrides` replace entries of `self`.
    pub fn merged(&self, overrides: &UserInputValues) -> UserInputValues {
        let mut merged = self.0.clone();
        merged.extend(overrides.0.iter().map(|(k, v)| (*k, v.clone())));
        UserInputValues(merged)
    }
}

impl From<HashMap<String, Value>> for UserInputValues {
    fn from(raw: HashMap<String, Value>) -> Self {
        let mut values = HashMap::with_capacity(raw.len());
        for (id, value) in raw {
            let key = match id.parse::<FieldKey>() {
                Ok(key) => key,
                Err(err) => {
                    debug!("ignoring input value: {err}");
                    continue;
                }
            };
            let value = match value {
                Value::String(s) => InputValue::Text(s),
                Value::Number(n) => match n.as_f64() {
                    Some(n) => InputValue::Number(n),
                    None => continue,
                },
                _ => continue,
            };
            values.insert(key, value);
        }
        UserInputValues(values)
    }
}

impl FromIterator<(FieldKey, InputValue)> for UserInputValues {
    fn from_iter<I: IntoIterator<Item = (FieldKey, InputValue)>>(iter: I) -> Self {
        UserInputValues(iter.into_iter().collect())
    }
}
