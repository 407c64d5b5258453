//! Component/parameter payload accepted by the Cloud API "send template
//! message" call. The analyzer emits these with zeroed values as a skeleton and
//! the builder fills a copy of it.

use crate::template::model::ButtonKind;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DOCUMENT_FILENAME: &str = "document";
pub const GREGORIAN_CALENDAR: &str = "GREGORIAN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Header,
    Body,
    Button,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Header => "header",
            ComponentType::Body => "body",
            ComponentType::Button => "button",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageComponent {
    #[serde(rename = "type")]
    pub kind: ComponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<ButtonKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl MessageComponent {
    pub fn header(parameters: Vec<Parameter>) -> Self {
        Self {
            kind: ComponentType::Header,
            sub_type: None,
            index: None,
            parameters,
        }
    }

    pub fn body(parameters: Vec<Parameter>) -> Self {
        Self {
            kind: ComponentType::Body,
            sub_type: None,
            index: None,
            parameters,
        }
    }

    pub fn button(sub_type: ButtonKind, position: usize, parameter: Parameter) -> Self {
        Self {
            kind: ComponentType::Button,
            sub_type: Some(sub_type),
            index: Some(position.to_string()),
            parameters: vec![parameter],
        }
    }

    /// True when at least one parameter carries a value.
    pub fn has_values(&self) -> bool {
        self.parameters.iter().any(Parameter::is_filled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Parameter {
    Text { text: String },
    Currency { currency: CurrencyValue },
    DateTime { date_time: DateTimeValue },
    Image { image: MediaLink },
    Video { video: MediaLink },
    Document { document: DocumentLink },
    Payload { payload: String },
    CouponCode { coupon_code: String },
}

impl Parameter {
    pub fn empty_text() -> Self {
        Parameter::Text {
            text: String::new(),
        }
    }

    pub fn empty_currency() -> Self {
        Parameter::Currency {
            currency: CurrencyValue::default(),
        }
    }

    pub fn empty_date_time() -> Self {
        Parameter::DateTime {
            date_time: DateTimeValue::default(),
        }
    }

    pub fn empty_image() -> Self {
        Parameter::Image {
            image: MediaLink::default(),
        }
    }

    pub fn empty_video() -> Self {
        Parameter::Video {
            video: MediaLink::default(),
        }
    }

    pub fn empty_document() -> Self {
        Parameter::Document {
            document: DocumentLink::default(),
        }
    }

    pub fn empty_payload() -> Self {
        Parameter::Payload {
            payload: String::new(),
        }
    }

    pub fn empty_coupon_code() -> Self {
        Parameter::CouponCode {
            coupon_code: String::new(),
        }
    }

    pub fn is_filled(&self) -> bool {
        match self {
            Parameter::Text { text } => !text.trim().is_empty(),
            Parameter::Payload { payload } => !payload.trim().is_empty(),
            Parameter::CouponCode { coupon_code } => !coupon_code.trim().is_empty(),
            Parameter::Image { image } => !image.link.trim().is_empty(),
            Parameter::Video { video } => !video.link.trim().is_empty(),
            Parameter::Document { document } => !document.link.trim().is_empty(),
            // a zero amount is still a value once the code was supplied
            Parameter::Currency { currency } => !currency.code.is_empty(),
            Parameter::DateTime { date_time } => !date_time.fallback_value.is_empty(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaLink {
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentLink {
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl Default for DocumentLink {
    fn default() -> Self {
        Self {
            link: String::new(),
            filename: Some(DEFAULT_DOCUMENT_FILENAME.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrencyValue {
    pub fallback_value: String,
    pub code: String,
    pub amount_1000: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateTimeValue {
    pub fallback_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<String>,
}
