use serde_json::json;
use wa_templates::template::fields::{FieldKey, ParameterType, ValidationKind};
use wa_templates::template::model::{ButtonKind, HeaderFormat, Template};
use wa_templates::template::wire::{ComponentType, MessageComponent, Parameter};
use wa_templates::template::{analyze_template, analyze_templates};

fn template(components: serde_json::Value) -> Template {
    serde_json::from_value(json!({
        "name": "sample",
        "language": "en_US",
        "category": "UTILITY",
        "status": "APPROVED",
        "components": components
    }))
    .unwrap()
}

#[test]
fn test_three_text_placeholders() {
    let analysis = analyze_template(&template(json!([
        {"type": "BODY", "text": "{{1}}{{2}}{{3}}"}
    ])));
    let ids: Vec<FieldKey> = analysis.required_fields.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![FieldKey::BodyText(0), FieldKey::BodyText(1), FieldKey::BodyText(2)]);
    assert!(analysis
        .required_fields
        .iter()
        .all(|f| f.parameter_type == ParameterType::Text && f.required));
    assert_eq!(analysis.components_template.len(), 1);
    assert_eq!(analysis.components_template[0].parameters.len(), 3);
    assert_eq!(analysis.metadata.body_parameter_count, 3);
}

#[test]
fn test_ids_follow_scan_order() {
    let analysis = analyze_template(&template(json!([
        {"type": "BODY", "text": "Order {{2}} for {{1}}"}
    ])));
    assert_eq!(analysis.required_fields[0].id, FieldKey::BodyText(0));
    assert_eq!(analysis.required_fields[0].label, "Body parameter 2");
    assert_eq!(analysis.required_fields[1].id, FieldKey::BodyText(1));
    assert_eq!(analysis.required_fields[1].placeholder, "Value for {{1}}");
}

#[test]
fn test_lone_second_placeholder_is_position_zero() {
    let analysis = analyze_template(&template(json!([
        {"type": "BODY", "text": "Hello {{2}}"}
    ])));
    assert_eq!(analysis.required_fields.len(), 1);
    assert_eq!(analysis.required_fields[0].id, FieldKey::BodyText(0));
    assert_eq!(analysis.required_fields[0].id.to_string(), "body_0");
}

#[test]
fn test_static_body_contributes_nothing() {
    let analysis = analyze_template(&template(json!([
        {"type": "BODY", "text": "Thanks for your purchase!"}
    ])));
    assert!(analysis.required_fields.is_empty());
    assert!(analysis.components_template.is_empty());
    assert_eq!(analysis.metadata.body_parameter_count, 0);
}

#[test]
fn test_currency_and_date_placeholders() {
    let analysis = analyze_template(&template(json!([
        {"type": "BODY", "text": "Hi {{1}}, thanks for shopping with us today. Your total is ${{2}}. Delivery date: {{3}}"}
    ])));
    let ids: Vec<String> = analysis.required_fields.iter().map(|f| f.id.to_string()).collect();
    assert_eq!(
        ids,
        vec!["body_0", "body_1_currency_code", "body_1_currency_amount", "body_2_datetime"]
    );
    assert_eq!(
        analysis.metadata.body_parameter_types,
        vec![ParameterType::Text, ParameterType::Currency, ParameterType::DateTime]
    );
    assert_eq!(analysis.metadata.body_parameter_count, 3);

    let code = &analysis.required_fields[1];
    assert_eq!(code.validation.as_ref().unwrap().max_length, Some(3));
    let amount = &analysis.required_fields[2];
    assert_eq!(amount.validation.as_ref().unwrap().kind, ValidationKind::Number);

    let skeleton = serde_json::to_value(&analysis.components_template).unwrap();
    assert_eq!(
        skeleton,
        json!([{
            "type": "body",
            "parameters": [
                {"type": "text", "text": ""},
                {"type": "currency", "currency": {"fallback_value": "", "code": "", "amount_1000": 0}},
                {"type": "date_time", "date_time": {"fallback_value": ""}}
            ]
        }])
    );
}

#[test]
fn test_document_header_fields() {
    let analysis = analyze_template(&template(json!([
        {"type": "HEADER", "format": "DOCUMENT"}
    ])));
    let ids: Vec<FieldKey> = analysis.required_fields.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![FieldKey::HeaderDocument, FieldKey::HeaderDocumentFilename]);
    assert_eq!(
        analysis.required_fields[0].validation.as_ref().unwrap().kind,
        ValidationKind::Url
    );
    let filename = analysis.required_fields[1].validation.as_ref().unwrap();
    assert_eq!(filename.kind, ValidationKind::Text);
    assert_eq!(filename.max_length, Some(255));
    assert!(matches!(
        analysis.components_template[0].parameters[0],
        Parameter::Document { .. }
    ));
    assert_eq!(analysis.metadata.header_format, Some(HeaderFormat::Document));
}

#[test]
fn test_media_and_text_headers() {
    for (format, key, parameter_type) in [
        ("IMAGE", FieldKey::HeaderImage, ParameterType::Image),
        ("VIDEO", FieldKey::HeaderVideo, ParameterType::Video),
        ("TEXT", FieldKey::HeaderText, ParameterType::Text),
    ] {
        let analysis = analyze_template(&template(json!([
            {"type": "HEADER", "format": format, "text": "Hi"}
        ])));
        assert_eq!(analysis.required_fields.len(), 1, "{format}");
        assert_eq!(analysis.required_fields[0].id, key);
        assert_eq!(analysis.required_fields[0].parameter_type, parameter_type);
        assert_eq!(analysis.components_template[0].kind, ComponentType::Header);
    }
}

#[test]
fn test_text_header_limit() {
    let analysis = analyze_template(&template(json!([
        {"type": "HEADER", "format": "TEXT", "text": "News"}
    ])));
    let validation = analysis.required_fields[0].validation.as_ref().unwrap();
    assert_eq!(validation.max_length, Some(60));
}

#[test]
fn test_location_header_is_present_without_parameters() {
    let analysis = analyze_template(&template(json!([
        {"type": "HEADER", "format": "LOCATION"}
    ])));
    assert!(analysis.required_fields.is_empty());
    assert_eq!(analysis.components_template, vec![MessageComponent::header(vec![])]);
    assert!(analysis.metadata.has_header);
}

#[test]
fn test_buttons() {
    let analysis = analyze_template(&template(json!([
        {"type": "BUTTONS", "buttons": [
            {"type": "QUICK_REPLY", "text": "Stop"},
            {"type": "URL", "text": "Site", "url": "https://example.com"},
            {"type": "URL", "text": "Track", "url": "https://example.com/t/{{1}}"},
            {"type": "PHONE_NUMBER", "text": "Call", "phone_number": "+15550100"},
            {"type": "COPY_CODE", "text": "Copy"},
            {"type": "OTP", "text": "Code"}
        ]}
    ])));

    let ids: Vec<String> = analysis.required_fields.iter().map(|f| f.id.to_string()).collect();
    assert_eq!(
        ids,
        vec!["button_0_payload", "button_2_url_suffix", "button_4_copy_code", "button_5_otp"]
    );
    assert!(!analysis.required_fields[0].required);
    assert!(analysis.required_fields[1..].iter().all(|f| f.required));
    assert_eq!(analysis.required_fields[1].component_index, Some(2));
    assert_eq!(
        analysis.required_fields[3].validation.as_ref().unwrap().pattern.as_deref(),
        Some("^[0-9]{4,8}$")
    );

    let indexes: Vec<&str> = analysis
        .components_template
        .iter()
        .filter_map(|c| c.index.as_deref())
        .collect();
    assert_eq!(indexes, vec!["0", "2", "4", "5"]);
    assert_eq!(
        analysis.metadata.button_types,
        vec![ButtonKind::QuickReply, ButtonKind::Url, ButtonKind::CopyCode, ButtonKind::Otp]
    );
    assert_eq!(analysis.metadata.button_count, 4);

    let skeleton = serde_json::to_value(&analysis.components_template[2]).unwrap();
    assert_eq!(
        skeleton,
        json!({"type": "button", "sub_type": "copy_code", "index": "4",
               "parameters": [{"type": "coupon_code", "coupon_code": ""}]})
    );
}

#[test]
fn test_full_template_order_and_metadata() {
    let analysis = analyze_template(&template(json!([
        {"type": "HEADER", "format": "IMAGE"},
        {"type": "BODY", "text": "Hello {{1}}"},
        {"type": "FOOTER", "text": "Bye"},
        {"type": "BUTTONS", "buttons": [{"type": "QUICK_REPLY", "text": "Ok"}]}
    ])));
    let kinds: Vec<ComponentType> = analysis.components_template.iter().map(|c| c.kind).collect();
    assert_eq!(kinds, vec![ComponentType::Header, ComponentType::Body, ComponentType::Button]);
    assert_eq!(analysis.metadata.total_fields, 3);
    assert_eq!(analysis.name, "sample");
    assert_eq!(analysis.language, "en_US");
    assert_eq!(analysis.status, "APPROVED");
}

#[test]
fn test_analysis_is_deterministic() {
    let tpl = template(json!([
        {"type": "HEADER", "format": "VIDEO"},
        {"type": "BODY", "text": "Price {{1}} on {{2}} for {{3}}"}
    ]));
    assert_eq!(analyze_template(&tpl), analyze_template(&tpl));
}

#[test]
fn test_analysis_wire_names() {
    let analysis = analyze_template(&template(json!([
        {"type": "BUTTONS", "buttons": [{"type": "QUICK_REPLY", "text": "Ok"}]}
    ])));
    let value = serde_json::to_value(&analysis).unwrap();
    let field = &value["requiredFields"][0];
    assert_eq!(field["id"], "button_0_payload");
    assert_eq!(field["componentType"], "button");
    assert_eq!(field["componentIndex"], 0);
    assert_eq!(field["parameterType"], "payload");
    assert_eq!(field["subType"], "quick_reply");
    assert_eq!(field["validation"]["type"], "text");
    assert_eq!(field["validation"]["maxLength"], 256);
    assert_eq!(value["metadata"]["buttonTypes"], json!(["quick_reply"]));
    assert!(value["componentsTemplate"].is_array());
}

#[test]
fn test_analyze_many() {
    let analyses = analyze_templates(&[
        template(json!([{"type": "BODY", "text": "{{1}}"}])),
        template(json!([])),
    ]);
    assert_eq!(analyses.len(), 2);
    assert_eq!(analyses[0].metadata.total_fields, 1);
    assert_eq!(analyses[1].metadata.total_fields, 0);
}

#[test]
fn test_malformed_button_keeps_later_positions() {
    let analysis = analyze_template(&template(json!([
        {"type": "BUTTONS", "buttons": [
            {"type": 7, "text": "weird"},
            {"type": "URL", "text": "Track", "url": "https://example.com/t/{{1}}"}
        ]}
    ])));
    let indexes: Vec<Option<&str>> = analysis
        .components_template
        .iter()
        .map(|c| c.index.as_deref())
        .collect();
    assert_eq!(indexes, vec![Some("1")]);
    assert_eq!(analysis.required_fields[0].id, FieldKey::ButtonUrlSuffix(1));
    assert_eq!(analysis.required_fields[0].component_index, Some(1));
}

#[test]
fn test_non_object_button_keeps_later_positions() {
    let analysis = analyze_template(&template(json!([
        {"type": "BUTTONS", "buttons": [
            "garbage",
            {"type": "QUICK_REPLY", "text": "Stop"}
        ]}
    ])));
    assert_eq!(analysis.required_fields[0].id, FieldKey::ButtonPayload(1));
    assert_eq!(analysis.components_template[0].index.as_deref(), Some("1"));
}

#[test]
fn test_non_string_header_format_is_unknown() {
    let analysis = analyze_template(&template(json!([
        {"type": "HEADER", "format": 5},
        {"type": "BODY", "text": "Hi {{1}}"}
    ])));
    assert!(analysis.metadata.has_header);
    assert_eq!(analysis.metadata.header_format, Some(HeaderFormat::Unknown));
    assert_eq!(analysis.required_fields.len(), 1);
    assert_eq!(analysis.required_fields[0].id, FieldKey::BodyText(0));
}

#[test]
fn test_repeated_sections_are_skipped() {
    let analysis = analyze_template(&template(json!([
        {"type": "BODY", "text": "Hi {{1}}"},
        {"type": "BODY", "text": "Again {{1}} and {{2}}"},
        {"type": "BUTTONS", "buttons": [{"type": "QUICK_REPLY", "text": "Yes"}]},
        {"type": "BUTTONS", "buttons": [{"type": "QUICK_REPLY", "text": "No"}]}
    ])));
    let ids: Vec<FieldKey> = analysis.required_fields.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![FieldKey::BodyText(0), FieldKey::ButtonPayload(0)]);
    assert_eq!(analysis.metadata.body_parameter_count, 1);
    assert_eq!(analysis.metadata.button_count, 1);
    assert_eq!(analysis.components_template.len(), 2);
}
