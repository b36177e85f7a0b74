use actix_web::{test, web, App};
use backend::config::Settings;
use backend::documents::fetch::HttpDownloader;
use backend::documents::forms::LopdfFormFiller;
use backend::documents::store::FsBlobStore;
use backend::documents::submissions::MemorySubmissionLog;
use backend::services;
use backend::state::AppState;
use common::model::document::DocumentSummary;
use lopdf::{dictionary, Document, Object};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state(root: &Path) -> AppState {
    let template = root.join("Empty.docx");
    fs::write(&template, b"empty").unwrap();
    let settings = Settings {
        storage_path: root.join("docs"),
        storage_url: "http://files.local".into(),
        callback_base_url: "http://backend.local".into(),
        empty_template: template,
        ..Settings::default()
    };
    let store = Arc::new(FsBlobStore::open(&settings.storage_path).unwrap());
    AppState::with_parts(
        settings,
        store,
        Arc::new(HttpDownloader::new(Duration::from_secs(5)).unwrap()),
        Arc::new(LopdfFormFiller),
        Arc::new(MemorySubmissionLog::default()),
    )
}

/// A one-page PDF whose form holds a single empty text field `Name`.
fn form_pdf(path: &Path) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => [0, 0, 595, 842].map(Object::Integer).to_vec(),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let field_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => Object::Name(b"Tx".to_vec()),
        "T" => Object::string_literal("Name"),
        "V" => Object::string_literal(""),
        "P" => page_id,
        "Rect" => [50, 700, 250, 720].map(Object::Integer).to_vec(),
    });
    let form_id = doc.add_object(dictionary! { "Fields" => vec![Object::Reference(field_id)] });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => form_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .service(services::documents::configure_routes()),
        )
        .await
    };
}

#[actix_web::test]
async fn created_documents_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state(dir.path()));

    let req = test::TestRequest::post()
        .uri("/api/Document")
        .set_json(json!({ "title": "Minutes" }))
        .to_request();
    let created: DocumentSummary = test::call_and_read_body_json(&app, req).await;
    assert!(uuid::Uuid::parse_str(&created.id).is_ok());
    assert_eq!(created.file_name, format!("{}_Minutes.docx", created.id));

    let req = test::TestRequest::get().uri("/api/Document").to_request();
    let listed: Vec<DocumentSummary> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].file_name, created.file_name);
    assert_eq!(listed[0].id, format!("{}_Minutes", created.id));

    let req = test::TestRequest::get()
        .uri(&format!("/api/Document/{}?fileType=docx&mode=edit", created.id))
        .to_request();
    let config: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(config["document"]["title"], created.file_name.as_str());
}

#[actix_web::test]
async fn editor_config_for_fill_forms() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(dir.path());
    fs::write(dir.path().join("docs").join("f00d_Form.pdf"), b"%PDF").unwrap();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/Document/f00d?fileType=pdf&mode=FillForms")
        .to_request();
    let config: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(config["documentType"], "pdf");
    assert_eq!(config["type"], "desktop");
    assert_eq!(config["document"]["title"], "f00d_Form.pdf");
    assert_eq!(config["document"]["url"], "http://files.local/f00d_Form.pdf");
    assert_eq!(
        config["document"]["permissions"],
        json!({
            "download": true, "print": true, "copy": true,
            "edit": false, "review": false, "comment": false,
            "fillForms": true
        })
    );
    assert_eq!(
        config["editorConfig"]["callbackUrl"],
        "http://backend.local/api/Document/f00d/callback"
    );
    assert_eq!(config["editorConfig"]["customization"]["submitForm"], true);
    assert_eq!(config["document"]["key"].as_str().unwrap().len(), 40);
}

#[actix_web::test]
async fn editor_config_rejects_unknown_mode() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(dir.path());
    fs::write(dir.path().join("docs").join("abc.docx"), b"x").unwrap();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/Document/abc?fileType=docx&mode=view")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn editor_config_for_unknown_document_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state(dir.path()));

    let req = test::TestRequest::get()
        .uri("/api/Document/nope?fileType=docx&mode=edit")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn save_callback_downloads_the_document() {
    let editor = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cache/abc.docx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"edited".to_vec()))
        .mount(&editor)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let state = state(dir.path());
    let doc = dir.path().join("docs").join("abc_Report.docx");
    fs::write(&doc, b"original").unwrap();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/Document/abc/callback")
        .set_json(json!({
            "status": 2,
            "key": "k",
            "url": format!("{}/cache/abc.docx", editor.uri()),
            "users": ["u1"]
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({ "error": 0 }));
    assert_eq!(fs::read(&doc).unwrap(), b"edited");
}

#[actix_web::test]
async fn unknown_status_is_acknowledged() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(dir.path());
    let doc = dir.path().join("docs").join("abc.docx");
    fs::write(&doc, b"original").unwrap();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/Document/abc/callback")
        .set_json(json!({ "status": 99, "url": "http://unused/doc.docx" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({ "error": 0 }));
    assert_eq!(fs::read(&doc).unwrap(), b"original");
}

#[actix_web::test]
async fn callback_errors_carry_status_and_message() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(dir.path());
    fs::write(dir.path().join("docs").join("abc.docx"), b"x").unwrap();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/Document/zzz/callback")
        .set_json(json!({ "status": 2 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], 1);
    assert!(body["message"].as_str().unwrap().contains("zzz"));

    let req = test::TestRequest::post()
        .uri("/api/Document/abc/callback")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn fill_answers_with_store_name_and_url() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(dir.path());
    let docs = dir.path().join("docs");
    form_pdf(&docs.join("f1_Form.pdf"));
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/Document/f1/fill")
        .set_json(json!({ "Name": "Ada" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(
        body,
        json!({
            "fileName": "f1_Form_auto.pdf",
            "url": "http://files.local/f1_Form_auto.pdf"
        })
    );
    assert!(docs.join("f1_Form_auto.pdf").is_file());
}

#[actix_web::test]
async fn fill_for_unknown_document_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let state = state(dir.path());
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/Document/missing/fill")
        .set_json(json!({ "Name": "X" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);
}
