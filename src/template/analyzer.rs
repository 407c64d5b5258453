use crate::template::builder::build_components;
use crate::template::fields::{
    FieldKey, FieldValidation, ParameterType, RequiredField, UserInputValues, ValidationKind,
};
use crate::template::inference::infer_parameter_type;
use crate::template::model::{ButtonKind, ComponentKind, HeaderFormat, Template, TemplateButton, TemplateComponent};
use crate::template::validator::{validate_fields, ValidationReport};
use crate::template::wire::{ComponentType, MessageComponent, Parameter};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

pub const OTP_PATTERN: &str = "^[0-9]{4,8}$";
const URL_PLACEHOLDER: &str = "{{1}}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateAnalysis {
    pub name: String,
    pub language: String,
    pub category: String,
    pub status: String,
    pub required_fields: Vec<RequiredField>,
    pub components_template: Vec<MessageComponent>,
    pub metadata: TemplateMetadata,
}

impl TemplateAnalysis {
    pub fn build(&self, values: &UserInputValues) -> Vec<MessageComponent> {
        build_components(&self.required_fields, values, &self.components_template)
    }

    pub fn validate(&self, values: &UserInputValues) -> ValidationReport {
        validate_fields(&self.required_fields, values)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    pub has_header: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_format: Option<HeaderFormat>,
    pub body_parameter_count: usize,
    pub body_parameter_types: Vec<ParameterType>,
    pub button_count: usize,
    pub button_types: Vec<ButtonKind>,
    pub total_fields: usize,
}

#[derive(Default)]
struct Section {
    fields: Vec<RequiredField>,
    components: Vec<MessageComponent>,
}

impl Section {
    fn push_field(&mut self, field: RequiredField) {
        self.fields.push(field);
    }
}

pub fn analyze_templates(templates: &[Template]) -> Vec<TemplateAnalysis> {
    templates.iter().map(analyze_template).collect()
}

pub fn analyze_template(template: &Template) -> TemplateAnalysis {
    let mut required_fields = Vec::new();
    let mut components_template = Vec::new();
    let mut metadata = TemplateMetadata::default();
    let mut seen: Vec<ComponentKind> = Vec::new();

    for component in &template.components {
        if matches!(component.kind, ComponentKind::Header | ComponentKind::Body | ComponentKind::Buttons) {
            // field ids are only unique per section kind; the first section wins
            if seen.contains(&component.kind) {
                debug!(
                    template = %template.name,
                    kind = component.kind.as_str(),
                    "skipping repeated component"
                );
                continue;
            }
            seen.push(component.kind.clone());
        }
        let section = match component.kind {
            ComponentKind::Header => {
                let format = component.format.unwrap_or(HeaderFormat::Unknown);
                metadata.has_header = true;
                metadata.header_format = Some(format);
                analyze_header(format)
            }
            ComponentKind::Body => {
                let (section, types) = analyze_body(component);
                metadata.body_parameter_count = types.len();
                metadata.body_parameter_types = types;
                section
            }
            ComponentKind::Buttons => {
                let section = analyze_buttons(&component.buttons);
                metadata.button_count = section.components.len();
                metadata.button_types = section
                    .components
                    .iter()
                    .filter_map(|c| c.sub_type)
                    .collect();
                section
            }
            ComponentKind::Footer | ComponentKind::Unknown => continue,
        };
        required_fields.extend(section.fields);
        components_template.extend(section.components);
    }

    metadata.total_fields = required_fields.len();
    debug!(
        template = %template.name,
        fields = metadata.total_fields,
        components = components_template.len(),
        "analyzed template"
    );

    TemplateAnalysis {
        name: template.name.clone(),
        language: template.language.clone(),
        category: template.category.clone(),
        status: template.status.clone(),
        required_fields,
        components_template,
        metadata,
    }
}

fn header_field(id: FieldKey, parameter_type: ParameterType, label: &str, placeholder: &str) -> RequiredField {
    RequiredField {
        id,
        component_type: ComponentType::Header,
        component_index: None,
        parameter_type,
        sub_type: None,
        label: label.to_string(),
        placeholder: placeholder.to_string(),
        required: true,
        validation: None,
        hint: None,
    }
}

fn analyze_header(format: HeaderFormat) -> Section {
    let mut section = Section::default();
    let parameter = match format {
        HeaderFormat::Image => {
            section.push_field(RequiredField {
                validation: Some(FieldValidation::new(ValidationKind::Url).min_length(10)),
                hint: Some("Image URL (HTTPS required)".to_string()),
                ..header_field(
                    FieldKey::HeaderImage,
                    ParameterType::Image,
                    "Header image",
                    "https://example.com/image.jpg",
                )
            });
            Some(Parameter::empty_image())
        }
        HeaderFormat::Video => {
            section.push_field(RequiredField {
                validation: Some(FieldValidation::new(ValidationKind::Url)),
                hint: Some("Video URL (MP4 recommended)".to_string()),
                ..header_field(
                    FieldKey::HeaderVideo,
                    ParameterType::Video,
                    "Header video",
                    "https://example.com/video.mp4",
                )
            });
            Some(Parameter::empty_video())
        }
        HeaderFormat::Document => {
            section.push_field(RequiredField {
                validation: Some(FieldValidation::new(ValidationKind::Url)),
                hint: Some("Document URL (PDF recommended)".to_string()),
                ..header_field(
                    FieldKey::HeaderDocument,
                    ParameterType::Document,
                    "Header document",
                    "https://example.com/document.pdf",
                )
            });
            section.push_field(RequiredField {
                validation: Some(FieldValidation::new(ValidationKind::Text).max_length(255)),
                hint: Some("File name shown to the recipient".to_string()),
                ..header_field(
                    FieldKey::HeaderDocumentFilename,
                    ParameterType::Text,
                    "Document file name",
                    "my-document.pdf",
                )
            });
            Some(Parameter::empty_document())
        }
        HeaderFormat::Text => {
            section.push_field(RequiredField {
                validation: Some(FieldValidation::new(ValidationKind::Text).max_length(60)),
                ..header_field(FieldKey::HeaderText, ParameterType::Text, "Header text", "Type the text")
            });
            Some(Parameter::empty_text())
        }
        HeaderFormat::Location => {
            // present in the payload, nothing to fill
            section.components.push(MessageComponent::header(Vec::new()));
            None
        }
        HeaderFormat::Unknown => {
            debug!("header with unsupported format contributes no parameters");
            None
        }
    };

    if let Some(parameter) = parameter {
        section.components.push(MessageComponent::header(vec![parameter]));
    }
    section
}

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{(\d+)\}\}").expect("placeholder pattern is valid"))
}

fn body_field(id: FieldKey, parameter_type: ParameterType, label: String, placeholder: String, validation: FieldValidation) -> RequiredField {
    RequiredField {
        id,
        component_type: ComponentType::Body,
        component_index: None,
        parameter_type,
        sub_type: None,
        label,
        placeholder,
        required: true,
        validation: Some(validation),
        hint: None,
    }
}

/// Placeholders are taken in the order they appear in the text; the field ids
/// use that scan position, not the number written inside the braces.
fn analyze_body(component: &TemplateComponent) -> (Section, Vec<ParameterType>) {
    let text = component.text_or_empty();
    let mut section = Section::default();
    let mut parameters = Vec::new();
    let mut types = Vec::new();

    for (index, captures) in placeholder_regex().captures_iter(text).enumerate() {
        let literal = &captures[1];
        let parameter_type = match literal.parse::<u32>() {
            Ok(number) => infer_parameter_type(text, number),
            Err(_) => ParameterType::Text,
        };
        types.push(parameter_type);

        match parameter_type {
            ParameterType::Currency => {
                section.push_field(body_field(
                    FieldKey::BodyCurrencyCode(index),
                    ParameterType::Currency,
                    format!("Currency {literal} - code"),
                    "USD".to_string(),
                    FieldValidation::new(ValidationKind::Text).max_length(3),
                ));
                section.push_field(body_field(
                    FieldKey::BodyCurrencyAmount(index),
                    ParameterType::Currency,
                    format!("Currency {literal} - amount"),
                    "100.99".to_string(),
                    FieldValidation::new(ValidationKind::Number),
                ));
                parameters.push(Parameter::empty_currency());
            }
            ParameterType::DateTime => {
                section.push_field(body_field(
                    FieldKey::BodyDateTime(index),
                    ParameterType::DateTime,
                    format!("Date/time {literal}"),
                    "DD/MM/YYYY HH:MM".to_string(),
                    FieldValidation::new(ValidationKind::Date),
                ));
                parameters.push(Parameter::empty_date_time());
            }
            _ => {
                section.push_field(body_field(
                    FieldKey::BodyText(index),
                    ParameterType::Text,
                    format!("Body parameter {literal}"),
                    format!("Value for {{{{{literal}}}}}"),
                    FieldValidation::new(ValidationKind::Text).max_length(1024),
                ));
                parameters.push(Parameter::empty_text());
            }
        }
    }

    if !parameters.is_empty() {
        section.components.push(MessageComponent::body(parameters));
    }
    (section, types)
}

fn analyze_buttons(buttons: &[TemplateButton]) -> Section {
    let mut section = Section::default();

    for (position, button) in buttons.iter().enumerate() {
        let caption = button.text.as_deref().unwrap_or("Button");
        let url = button.url.as_deref().unwrap_or_default();
        let field = |id: FieldKey, parameter_type: ParameterType, suffix: &str, placeholder: &str| RequiredField {
            id,
            component_type: ComponentType::Button,
            component_index: Some(position),
            parameter_type,
            sub_type: Some(button.kind),
            label: format!("Button {}: {caption} ({suffix})", position + 1),
            placeholder: placeholder.to_string(),
            required: true,
            validation: None,
            hint: None,
        };

        let (required, parameter) = match button.kind {
            ButtonKind::QuickReply => (
                RequiredField {
                    required: false,
                    validation: Some(FieldValidation::new(ValidationKind::Text).max_length(256)),
                    hint: Some("Optional payload used to track the reply".to_string()),
                    ..field(FieldKey::ButtonPayload(position), ParameterType::Payload, "payload", "optional-payload")
                },
                Parameter::empty_payload(),
            ),
            ButtonKind::Url if url.contains(URL_PLACEHOLDER) => (
                RequiredField {
                    validation: Some(FieldValidation::new(ValidationKind::Text).max_length(2000)),
                    hint: Some(format!("Base URL: {}", url.replacen(URL_PLACEHOLDER, "", 1))),
                    ..field(FieldKey::ButtonUrlSuffix(position), ParameterType::Text, "URL", "url-suffix")
                },
                Parameter::empty_text(),
            ),
            ButtonKind::CopyCode => (
                RequiredField {
                    validation: Some(FieldValidation::new(ValidationKind::Text).max_length(15)),
                    hint: Some("Code the recipient can copy".to_string()),
                    ..field(FieldKey::ButtonCopyCode(position), ParameterType::CouponCode, "code", "ABC123")
                },
                Parameter::empty_coupon_code(),
            ),
            ButtonKind::Otp => (
                RequiredField {
                    validation: Some(FieldValidation::new(ValidationKind::Text).pattern(OTP_PATTERN)),
                    hint: Some("Numeric one-time code".to_string()),
                    ..field(FieldKey::ButtonOtp(position), ParameterType::Text, "OTP", "123456")
                },
                Parameter::empty_text(),
            ),
            ButtonKind::Url
            | ButtonKind::PhoneNumber
            | ButtonKind::Catalog
            | ButtonKind::Flow
            | ButtonKind::Other => continue,
        };

        section.push_field(required);
        section
            .components
            .push(MessageComponent::button(button.kind, position, parameter));
    }
    section
}
