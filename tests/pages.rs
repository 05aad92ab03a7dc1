use axum::http::StatusCode;
use axum_test::TestServer;

use berryray_site::config::HOME_QUOTE_KEY;
use berryray_site::domain::{Banner, RecordId, Testimony};
use berryray_site::gateway::memory::Operation;
use berryray_site::gateway::MemoryGateway;
use berryray_site::testing::TestApp;

fn server(app: &TestApp) -> TestServer {
  TestServer::new(app.router()).unwrap()
}

fn banner() -> Banner {
  Banner {
    id: RecordId::Int(1),
    title: "Admissions open".into(),
    message: "POST-UTME forms are now available.".into(),
    link_url: Some("/services".into()),
  }
}

fn testimony() -> Testimony {
  Testimony {
    id: RecordId::Int(7),
    name: "Chiamaka".into(),
    message: "They handled my registration end to end.".into(),
    role: Some("Student".into()),
  }
}

#[tokio::test]
async fn test_home_renders_remote_content() {
  let gateway = MemoryGateway::demo()
    .with_banners(vec![banner()])
    .with_testimonies(vec![testimony()])
    .with_site_meta(HOME_QUOTE_KEY, r#"{"text": "Stay curious.", "author": "BerryRay"}"#);
  let app = TestApp::with_gateway(gateway);

  let page = server(&app).get("/").await;
  page.assert_status_ok();
  let html = page.text();
  assert!(html.contains("Admissions open"));
  assert!(html.contains("They handled my registration end to end."));
  assert!(html.contains("Stay curious."));
  assert!(!html.contains("No testimonials available yet."));
}

#[tokio::test]
async fn test_home_degrades_per_source() {
  let app = TestApp::new();
  app.gateway.fail(Operation::FetchBanners);
  app.gateway.fail(Operation::FetchSiteMeta);

  let page = server(&app).get("/").await;
  page.assert_status_ok();
  let html = page.text();
  assert!(html.contains("Failed to load news banners"));
  assert!(html.contains("No testimonials available yet."));
  assert!(html.contains("Science is a way of thinking"));
  assert!(html.contains("Using default quote"));
}

#[tokio::test]
async fn test_static_pages() {
  let app = TestApp::new();
  let server = server(&app);

  let about = server.get("/about").await;
  about.assert_status_ok();
  assert!(about.text().contains("Mission Statement"));
  assert!(about.text().contains("Integrity"));

  let portfolio = server.get("/portfolio").await;
  portfolio.assert_status_ok();
  assert!(portfolio.text().contains("Osuji Chinonso Charles"));
  assert!(portfolio.text().contains("K Asha Editor"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
  let app = TestApp::new();
  let page = server(&app).get("/courses").await;
  page.assert_status(StatusCode::NOT_FOUND);
  assert!(page.text().contains("Page not found"));
}
