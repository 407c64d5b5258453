use crate::template::fields::{FieldKey, InputValue, RequiredField, UserInputValues};
use crate::template::wire::{
    ComponentType, CurrencyValue, DateTimeValue, MessageComponent, Parameter, GREGORIAN_CALENDAR,
};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};

const DATE_TIME_FORMATS: [&str; 7] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%Y/%m/%d %H:%M",
];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
const FALLBACK_DATE_FORMAT: &str = "%d/%m/%Y";

/// Fills a copy of `skeleton` with `values` and drops components that end up
/// with nothing to send.
///
/// Only slots that have a matching entry in `fields` are filled. Missing or
/// unusable values leave the skeleton default in place. The output keeps the
/// skeleton's component order.
pub fn build_components(
    fields: &[RequiredField],
    values: &UserInputValues,
    skeleton: &[MessageComponent],
) -> Vec<MessageComponent> {
    let known: HashSet<FieldKey> = fields.iter().map(|f| f.id).collect();
    let lookup = Lookup { known: &known, values };

    skeleton
        .iter()
        .cloned()
        .filter_map(|mut component| {
            match component.kind {
                ComponentType::Header => fill_header(&mut component, &lookup),
                ComponentType::Body => fill_body(&mut component, &lookup),
                ComponentType::Button => fill_button(&mut component, &lookup),
            }
            if component.has_values() {
                Some(component)
            } else {
                debug!(kind = component.kind.as_str(), index = ?component.index, "dropping empty component");
                None
            }
        })
        .collect()
}

struct Lookup<'a> {
    known: &'a HashSet<FieldKey>,
    values: &'a UserInputValues,
}

impl Lookup<'_> {
    fn value(&self, key: FieldKey) -> Option<&InputValue> {
        if !self.known.contains(&key) {
            return None;
        }
        self.values.supplied(key)
    }

    fn text(&self, key: FieldKey) -> Option<String> {
        self.value(key).map(InputValue::as_text)
    }
}

fn fill_header(component: &mut MessageComponent, lookup: &Lookup<'_>) {
    let Some(parameter) = component.parameters.first_mut() else {
        return;
    };
    match parameter {
        Parameter::Document { document } => {
            if let Some(link) = lookup.text(FieldKey::HeaderDocument) {
                document.link = link;
            }
            if let Some(filename) = lookup.text(FieldKey::HeaderDocumentFilename) {
                document.filename = Some(filename);
            }
        }
        Parameter::Image { image } => {
            if let Some(link) = lookup.text(FieldKey::HeaderImage) {
                image.link = link;
            }
        }
        Parameter::Video { video } => {
            if let Some(link) = lookup.text(FieldKey::HeaderVideo) {
                video.link = link;
            }
        }
        Parameter::Text { text } => {
            if let Some(value) = lookup.text(FieldKey::HeaderText) {
                *text = value;
            }
        }
        Parameter::Currency { .. }
        | Parameter::DateTime { .. }
        | Parameter::Payload { .. }
        | Parameter::CouponCode { .. } => {}
    }
}

fn fill_body(component: &mut MessageComponent, lookup: &Lookup<'_>) {
    for (index, parameter) in component.parameters.iter_mut().enumerate() {
        match parameter {
            Parameter::Text { text } => {
                if let Some(value) = lookup.text(FieldKey::BodyText(index)) {
                    *text = value;
                }
            }
            Parameter::Currency { currency } => {
                let code = lookup.value(FieldKey::BodyCurrencyCode(index));
                let amount = lookup.value(FieldKey::BodyCurrencyAmount(index));
                if let (Some(code), Some(amount)) = (code, amount) {
                    if let Some(filled) = currency_value(code, amount) {
                        *currency = filled;
                    }
                }
            }
            Parameter::DateTime { date_time } => {
                if let Some(value) = lookup.value(FieldKey::BodyDateTime(index)) {
                    match parse_date_time(value) {
                        Some(parsed) => *date_time = date_time_value(parsed),
                        None => warn!(field = %FieldKey::BodyDateTime(index), "unparsable date value"),
                    }
                }
            }
            Parameter::Image { .. }
            | Parameter::Video { .. }
            | Parameter::Document { .. }
            | Parameter::Payload { .. }
            | Parameter::CouponCode { .. } => {}
        }
    }
}

fn fill_button(component: &mut MessageComponent, lookup: &Lookup<'_>) {
    let position = match component.index.as_deref().map(str::parse::<usize>) {
        Some(Ok(position)) => position,
        _ => {
            debug!(index = ?component.index, "button without a usable index, using 0");
            0
        }
    };
    let Some(key) = component.sub_type.and_then(|kind| FieldKey::for_button(kind, position)) else {
        return;
    };
    let Some(value) = lookup.text(key) else {
        return;
    };
    let Some(parameter) = component.parameters.first_mut() else {
        return;
    };

    match (key, parameter) {
        (FieldKey::ButtonPayload(_), Parameter::Payload { payload }) => *payload = value,
        (FieldKey::ButtonUrlSuffix(_) | FieldKey::ButtonOtp(_), Parameter::Text { text }) => *text = value,
        (FieldKey::ButtonCopyCode(_), Parameter::CouponCode { coupon_code }) => *coupon_code = value,
        (key, _) => debug!(field = %key, "button parameter shape does not match its subtype"),
    }
}

/// `code` is upper-cased for the API while the fallback text keeps the code as typed.
pub fn currency_value(code: &InputValue, amount: &InputValue) -> Option<CurrencyValue> {
    let raw_code = code.as_text().trim().to_string();
    let amount = match amount {
        InputValue::Number(n) => *n,
        InputValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => {
                warn!(value = %s, "currency amount is not a number");
                return None;
            }
        },
    };
    if !amount.is_finite() || raw_code.is_empty() {
        return None;
    }

    Some(CurrencyValue {
        fallback_value: format!("{raw_code} {amount:.2}"),
        code: raw_code.to_uppercase(),
        amount_1000: (amount * 1000.0).round() as i64,
    })
}

/// Reads a wall-clock date/time from user input. Numbers are Unix epoch
/// milliseconds (UTC); strings may be RFC 3339, ISO-like or day-first.
pub fn parse_date_time(value: &InputValue) -> Option<NaiveDateTime> {
    match value {
        InputValue::Number(millis) => {
            if !millis.is_finite() {
                return None;
            }
            DateTime::<Utc>::from_timestamp_millis(*millis as i64).map(|dt| dt.naive_utc())
        }
        InputValue::Text(raw) => {
            let raw = raw.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
                return Some(dt.naive_local());
            }
            if let Some(dt) = DATE_TIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            {
                return Some(dt);
            }
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        }
    }
}

pub fn date_time_value(dt: NaiveDateTime) -> DateTimeValue {
    DateTimeValue {
        fallback_value: dt.format(FALLBACK_DATE_FORMAT).to_string(),
        day_of_week: Some(dt.weekday().num_days_from_sunday()),
        year: Some(dt.year()),
        month: Some(dt.month()),
        day_of_month: Some(dt.day()),
        hour: Some(dt.hour()),
        minute: Some(dt.minute()),
        calendar: Some(GREGORIAN_CALENDAR.to_string()),
    }
}
