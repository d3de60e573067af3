mod common;

use common::{StubResponse, StubServer};
use contacts_etl::config::EtlConfig;
use contacts_etl::constants::NO_MATCHES_DESCRIPTION;
use contacts_etl::infra::html_source::HtmlTableSource;
use contacts_etl::infra::http_client::RetryingHttpClient;
use contacts_etl::infra::tracker_client::HttpRunTracker;
use contacts_etl::pipeline::processing::eligibility::EligibilityFilter;
use contacts_etl::pipeline::storage::{SqliteContactStore, SqliteStoreOpener};
use contacts_etl::pipeline::{Orchestrator, RunStage};
use contacts_etl::types::NaturalKey;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

const CONTACTS_PATH: &str = "/contacts";
const TRACKER_PATH: &str = "/api/etl";

fn contacts_page(rows: &[[&str; 6]]) -> String {
    let mut html = String::from(
        "<html><body><table><tr><th>Empresa</th><th>Nombre</th><th>Apellido</th>\
         <th>Puesto</th><th>Email</th><th>Primer contacto</th></tr>",
    );
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{cell}</td>"));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table></body></html>");
    html
}

fn acme_and_solocorp_page() -> String {
    contacts_page(&[
        ["Acme Tech", "Ana", "Lopez", "CEO", "ana@acme.com", "2024-01-15"],
        ["Acme Tech", "Luis", "Diaz", "Chief Technology Officer", "luis@acme.com", "15/01/2024"],
        ["Acme Tech", "Marta", "Gil", "Account Manager", "marta@acme.com", "2024-01-20"],
        ["SoloCorp", "Eva", "Moss", "CTO", "eva@solocorp.com", "2024-02-01"],
        ["SoloCorp", "Ben", "Hart", "Analyst", "ben@solocorp.com", "2024-02-02"],
    ])
}

fn orchestrator(server: &StubServer, db_path: &Path) -> Orchestrator {
    let mut config = EtlConfig::default();
    config.web_url = format!("{}{}", server.base_url, CONTACTS_PATH);
    config.api_base_url = server.base_url.clone();
    config.retry_attempts = 2;
    config.retry_backoff_ms = 1;
    config.http_timeout_secs = 5;

    let http = RetryingHttpClient::from_config(&config).unwrap();
    Orchestrator::new(
        Arc::new(HtmlTableSource::new(http.clone(), config.web_url.clone())),
        EligibilityFilter::new(&config.filter),
        Arc::new(SqliteStoreOpener::new(db_path)),
        Arc::new(HttpRunTracker::new(http, &config.api_base_url)),
    )
}

fn tracker_bodies(server: &StubServer) -> Vec<Value> {
    server
        .requests_to(TRACKER_PATH)
        .iter()
        .map(|r| {
            assert_eq!(r.method, "POST");
            serde_json::from_str(&r.body).unwrap()
        })
        .collect()
}

#[tokio::test]
async fn end_to_end_run_is_idempotent_across_runs() {
    let server = StubServer::start(vec![
        (CONTACTS_PATH, vec![StubResponse::new(200, acme_and_solocorp_page())]),
        (TRACKER_PATH, vec![StubResponse::new(201, r#"{"id": 1}"#)]),
    ])
    .await;
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("contacts.db");
    let etl = orchestrator(&server, &db_path);

    let first = etl.run().await;
    assert!(first.success);
    assert_eq!(first.extracted, 5);
    assert_eq!(first.eligible, 2);
    assert_eq!(first.inserted, 2);
    assert_eq!(first.reported, Some(true));

    let second = etl.run().await;
    assert!(second.success);
    assert_eq!(second.inserted, 0);

    let bodies = tracker_bodies(&server);
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0]["cantidadDatos"], 2);
    assert_eq!(bodies[1]["cantidadDatos"], 0);
    assert!(bodies[0]["descripcion"]
        .as_str()
        .unwrap()
        .contains(&first.run_id.to_string()));

    let store = SqliteContactStore::open(&db_path).unwrap();
    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(store.count_for_run(first.run_id).unwrap(), 2);
    assert_eq!(store.count_for_run(second.run_id).unwrap(), 0);

    let luis = store
        .find(&NaturalKey::new("Acme Tech", "luis@acme.com"))
        .unwrap()
        .unwrap();
    assert_eq!(luis.contact.title, "Chief Technology Officer");
    assert_eq!(luis.run_id, first.run_id);
    assert!(store
        .find(&NaturalKey::new("SoloCorp", "eva@solocorp.com"))
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn tracker_rejection_keeps_run_successful() {
    let server = StubServer::start(vec![
        (CONTACTS_PATH, vec![StubResponse::new(200, acme_and_solocorp_page())]),
        (TRACKER_PATH, vec![StubResponse::new(400, r#"{"error": "bad payload"}"#)]),
    ])
    .await;
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("contacts.db");

    let report = orchestrator(&server, &db_path).run().await;

    assert!(report.success);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.reported, Some(false));
    assert_eq!(server.requests_to(TRACKER_PATH).len(), 1);
}

#[tokio::test]
async fn transient_source_errors_are_retried() {
    let server = StubServer::start(vec![
        (
            CONTACTS_PATH,
            vec![
                StubResponse::new(503, "busy"),
                StubResponse::new(200, acme_and_solocorp_page()),
            ],
        ),
        (TRACKER_PATH, vec![StubResponse::new(201, "{}")]),
    ])
    .await;
    let dir = tempdir().unwrap();

    let report = orchestrator(&server, &dir.path().join("contacts.db")).run().await;

    assert!(report.success);
    assert_eq!(report.inserted, 2);
    assert_eq!(server.requests_to(CONTACTS_PATH).len(), 2);
}

#[tokio::test]
async fn unavailable_source_fails_without_store_or_tracker() {
    let server = StubServer::start(vec![
        (CONTACTS_PATH, vec![StubResponse::new(500, "boom")]),
        (TRACKER_PATH, vec![StubResponse::new(201, "{}")]),
    ])
    .await;
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("contacts.db");

    let report = orchestrator(&server, &db_path).run().await;

    assert!(!report.success);
    assert_eq!(report.stages, vec![RunStage::Start, RunStage::Done]);
    // initial attempt plus two retries
    assert_eq!(server.requests_to(CONTACTS_PATH).len(), 3);
    assert!(server.requests_to(TRACKER_PATH).is_empty());
    assert!(!db_path.exists());
}

#[tokio::test]
async fn page_without_table_is_an_empty_extraction() {
    let server = StubServer::start(vec![
        (CONTACTS_PATH, vec![StubResponse::new(200, "<html><body>down for maintenance</body></html>")]),
        (TRACKER_PATH, vec![StubResponse::new(201, "{}")]),
    ])
    .await;
    let dir = tempdir().unwrap();

    let report = orchestrator(&server, &dir.path().join("contacts.db")).run().await;

    assert!(!report.success);
    assert_eq!(report.extracted, 0);
    assert!(server.requests_to(TRACKER_PATH).is_empty());
}

#[tokio::test]
async fn no_matches_reports_zero_and_skips_store() {
    let page = contacts_page(&[
        ["Green Grocers", "Ann", "Poe", "CEO", "ann@grocers.com", "2024-01-01"],
        ["Green Grocers", "Bo", "Lin", "CTO", "bo@grocers.com", "2024-01-01"],
    ]);
    let server = StubServer::start(vec![
        (CONTACTS_PATH, vec![StubResponse::new(200, page)]),
        (TRACKER_PATH, vec![StubResponse::new(201, "{}")]),
    ])
    .await;
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("contacts.db");

    let report = orchestrator(&server, &db_path).run().await;

    assert!(report.success);
    assert_eq!(report.eligible, 0);
    assert!(!report.stages.contains(&RunStage::Persisted));
    assert!(!db_path.exists());

    let bodies = tracker_bodies(&server);
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["cantidadDatos"], 0);
    assert_eq!(bodies[0]["descripcion"], NO_MATCHES_DESCRIPTION);
}
