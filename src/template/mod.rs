//! WhatsApp message template pipeline: analyze a template definition into
//! form fields plus an empty parameter skeleton, validate what the user typed,
//! then fill the skeleton into the `components` array of a send call.

pub mod analyzer;
pub mod builder;
pub mod fields;
pub mod inference;
pub mod model;
pub mod validator;
pub mod wire;

pub use analyzer::{analyze_template, analyze_templates, TemplateAnalysis, TemplateMetadata};
pub use builder::build_components;
pub use fields::{FieldKey, InputValue, RequiredField, UserInputValues};
pub use inference::infer_parameter_type;
pub use model::Template;
pub use validator::{validate_fields, ValidationReport};
pub use wire::{MessageComponent, Parameter};
