use serde_json::json;
use wa_templates::cloud::{approved_templates, CloudApiClient, CloudApiError, TemplateMessage, TemplateSender};
use wa_templates::config::WhatsAppConfig;
use wa_templates::template::model::Template;
use wa_templates::template::wire::{MessageComponent, Parameter};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn whatsapp_config(server: &MockServer) -> WhatsAppConfig {
    WhatsAppConfig {
        graph_url: server.uri(),
        access_token: Some("test_access_token".to_string()),
        waba_id: Some("waba_1".to_string()),
        phone_number_id: Some("phone_1".to_string()),
        page_size: 2,
        ..WhatsAppConfig::default()
    }
}

fn client(config: WhatsAppConfig) -> CloudApiClient {
    CloudApiClient::new(reqwest::Client::new(), config)
}

fn template(name: &str, status: &str) -> Template {
    serde_json::from_value(json!({"name": name, "status": status})).unwrap()
}

#[tokio::test]
async fn test_list_templates_follows_paging() {
    let server = MockServer::start().await;
    let next = format!("{}/v24.0/waba_1/message_templates?after=cursor_2", server.uri());

    Mock::given(method("GET"))
        .and(path("/v24.0/waba_1/message_templates"))
        .and(query_param("limit", "2"))
        .and(header("authorization", "Bearer test_access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"name": "order_update", "language": "en_US", "status": "APPROVED",
                 "components": [{"type": "BODY", "text": "Order {{1}} shipped"}]},
                {"name": "promo", "language": "pt_BR", "status": "PENDING"}
            ],
            "paging": {"next": next}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v24.0/waba_1/message_templates"))
        .and(query_param("after", "cursor_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"name": "receipt", "language": "en_US", "status": "APPROVED"},
                "not a template"
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let templates = client(whatsapp_config(&server)).list_templates().await.unwrap();
    let names: Vec<&str> = templates.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["order_update", "promo", "receipt"]);
    assert_eq!(templates[0].components.len(), 1);
}

#[tokio::test]
async fn test_list_templates_stops_at_page_limit() {
    let server = MockServer::start().await;
    let next = format!("{}/v24.0/waba_1/message_templates?after=again", server.uri());

    Mock::given(method("GET"))
        .and(path("/v24.0/waba_1/message_templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"name": "looping", "status": "APPROVED"}],
            "paging": {"next": next}
        })))
        .expect(3)
        .mount(&server)
        .await;

    let config = WhatsAppConfig {
        max_pages: 3,
        ..whatsapp_config(&server)
    };
    let templates = client(config).list_templates().await.unwrap();
    assert_eq!(templates.len(), 3);
}

#[tokio::test]
async fn test_list_templates_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v24.0/waba_1/message_templates"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
        .mount(&server)
        .await;

    let err = client(whatsapp_config(&server)).list_templates().await.unwrap_err();
    match err {
        CloudApiError::Api { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(body, "invalid token");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_list_templates_without_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v24.0/waba_1/message_templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;

    let err = client(whatsapp_config(&server)).list_templates().await.unwrap_err();
    assert!(matches!(err, CloudApiError::UnexpectedResponse(_)));
}

#[tokio::test]
async fn test_list_templates_falls_back_to_phone_number_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v24.0/phone_1/message_templates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = WhatsAppConfig {
        waba_id: None,
        ..whatsapp_config(&server)
    };
    let templates = client(config).list_templates().await.unwrap();
    assert!(templates.is_empty());
}

#[tokio::test]
async fn test_missing_access_token() {
    let config = WhatsAppConfig {
        access_token: None,
        ..WhatsAppConfig::default()
    };
    let err = client(config).list_templates().await.unwrap_err();
    assert!(matches!(err, CloudApiError::MissingCredential("access token")));
}

#[tokio::test]
async fn test_send_template_returns_message_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v24.0/phone_1/messages"))
        .and(header("authorization", "Bearer test_access_token"))
        .and(body_partial_json(json!({
            "messaging_product": "whatsapp",
            "to": "5511987654321",
            "type": "template",
            "template": {
                "name": "order_update",
                "language": {"code": "pt_BR"},
                "components": [{"type": "body", "parameters": [{"type": "text", "text": "A-1042"}]}]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messaging_product": "whatsapp",
            "contacts": [{"input": "5511987654321", "wa_id": "5511987654321"}],
            "messages": [{"id": "wamid.HBgM"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let message = TemplateMessage {
        to: "+55 11 98765-4321".to_string(),
        name: "order_update".to_string(),
        language: "pt_BR".to_string(),
        components: vec![MessageComponent::body(vec![Parameter::Text {
            text: "A-1042".to_string(),
        }])],
    };
    let id = client(whatsapp_config(&server)).send_template(&message).await.unwrap();
    assert_eq!(id, "wamid.HBgM");
}

#[tokio::test]
async fn test_send_template_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v24.0/phone_1/messages"))
        .respond_with(ResponseTemplate::new(400).set_body_string("{\"error\":{\"code\":132000}}"))
        .mount(&server)
        .await;

    let message = TemplateMessage {
        to: "15550100".to_string(),
        name: "order_update".to_string(),
        language: "en_US".to_string(),
        components: vec![],
    };
    let err = client(whatsapp_config(&server)).send_template(&message).await.unwrap_err();
    assert!(matches!(err, CloudApiError::Api { .. }));
    assert!(err.to_string().contains("132000"));
}

#[tokio::test]
async fn test_send_template_without_phone_number_id() {
    let config = WhatsAppConfig {
        access_token: Some("token".to_string()),
        phone_number_id: None,
        ..WhatsAppConfig::default()
    };
    let message = TemplateMessage {
        to: "15550100".to_string(),
        name: "welcome".to_string(),
        language: "en_US".to_string(),
        components: vec![],
    };
    let err = client(config).send_template(&message).await.unwrap_err();
    assert!(matches!(err, CloudApiError::MissingCredential("phone number id")));
}

#[test]
fn test_approved_templates_filter() {
    let templates = vec![
        template("hello_world", "APPROVED"),
        template("order_update", "APPROVED"),
        template("promo", "REJECTED"),
        template("receipt", "APPROVED"),
    ];
    let approved = approved_templates(templates, &["hello_world".to_string()]);
    let names: Vec<&str> = approved.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["order_update", "receipt"]);
}
