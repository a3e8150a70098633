//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small award directory and run the
//! full crawl against it, checking the CSV table between runs.

use award_crawler::config::{Config, CrawlerConfig, EmptyCityPolicy, OutputConfig};
use award_crawler::crawler::{CompanyRecord, Coordinator};
use award_crawler::storage::{CsvStore, RecordStore, COLUMNS};
use award_crawler::{CrawlError, FetchError};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FULL_COMPANY: &str = r#"<html><body>
    <h1>Acme Plumbing</h1>
    <h2>Plumber</h2>
    <div class="winner-section__hero__details__social">
        <a href="https://facebook.com/acme">fb</a>
        <a href="https://x.com/acme">x</a>
    </div>
    <a class="winner-section__hero__details__footer__address" href="/map">
        <address>1 Main St, Testville</address>
    </a>
    <a class="winner-section__hero__details__footer__phone" href="tel:5550100">555-0100</a>
    <a class="winner-section__hero__details__footer__url" href="https://acme.test">acme.test</a>
    <div class="winner-section__hero__details__footer__google-reviews__rating">
        <strong>4.8</strong>
    </div>
</body></html>"#;

const MINIMAL_COMPANY: &str = "<html><body><h1>Bare Bakery</h1><h2>Bakery</h2></body></html>";

const MALFORMED_COMPANY: &str = "<html><body><h2>Nameless</h2></body></html>";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, table_path: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            root_url: format!("{}/award-winners/", base_url),
            request_delay_ms: 0,
            retry_delay_ms: 0,
            request_timeout_secs: 5,
            ..CrawlerConfig::default()
        },
        output: OutputConfig {
            table_path: table_path.to_string_lossy().into_owned(),
        },
        ..Config::default()
    }
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html")
}

fn nav_links<S: AsRef<str>>(links: &[(S, &str)]) -> String {
    let anchors: String = links
        .iter()
        .map(|(href, label)| {
            format!(
                r#"<a class="blogs-item-link" href="{}"><h3>{}</h3></a>"#,
                href.as_ref(),
                label
            )
        })
        .collect();
    format!("<html><body>{anchors}</body></html>")
}

fn business_links<S: AsRef<str>>(hrefs: &[S]) -> String {
    let headings: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<h3 class="winner-heading"><a href="{}">Company</a></h3>"#,
                href.as_ref()
            )
        })
        .collect();
    format!("<html><body>{headings}</body></html>")
}

/// Mounts a GET route expected to be hit exactly `times` times
async fn mount_page(server: &MockServer, route: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Mounts root → Testland → Testregion → Testville, fetched `runs` times each
async fn mount_hierarchy(server: &MockServer, runs: u64) {
    let base = server.uri();
    mount_page(
        server,
        "/award-winners/",
        nav_links(&[(format!("{base}/testland/"), "Testland")]),
        runs,
    )
    .await;
    mount_page(
        server,
        "/testland/",
        nav_links(&[(format!("{base}/testland/testregion/"), "Testregion")]),
        runs,
    )
    .await;
    mount_page(
        server,
        "/testland/testregion/",
        nav_links(&[(format!("{base}/testland/testregion/testville/"), "Testville")]),
        runs,
    )
    .await;
}

fn table_path(dir: &TempDir) -> PathBuf {
    dir.path().join("award_winners.csv")
}

fn read_rows(path: &Path) -> Vec<CompanyRecord> {
    let mut reader = csv::Reader::from_path(path).expect("Failed to open table");
    reader
        .deserialize()
        .collect::<Result<Vec<CompanyRecord>, _>>()
        .expect("Failed to read rows")
}

fn store_for(config: &Config) -> CsvStore {
    CsvStore::new(
        config.output.table_path(),
        config.output.empty_cities_path(),
    )
}

async fn run_crawl(config: &Config) -> Result<award_crawler::crawler::CrawlReport, CrawlError> {
    let mut coordinator = Coordinator::new(config.clone()).expect("Failed to create coordinator");
    coordinator.run().await
}

#[tokio::test]
async fn test_full_crawl_writes_one_row_per_company() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_hierarchy(&server, 1).await;
    mount_page(
        &server,
        "/testland/testregion/testville/",
        business_links(&[format!("{base}/acme/"), format!("{base}/bare/")]),
        1,
    )
    .await;
    mount_page(&server, "/acme/", FULL_COMPANY.to_string(), 1).await;
    mount_page(&server, "/bare/", MINIMAL_COMPANY.to_string(), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &table_path(&dir));

    let report = run_crawl(&config).await.expect("Crawl failed");

    let rows = read_rows(&table_path(&dir));
    assert_eq!(rows.len(), 2);
    for row in &rows {
        assert_eq!(row.country, "Testland");
        assert_eq!(row.state, "Testregion");
        assert_eq!(row.city, "Testville");
    }

    assert_eq!(rows[0].company_name, "Acme Plumbing");
    assert_eq!(rows[0].type_of_business, "Plumber");
    assert_eq!(
        rows[0].social_media_links,
        "https://facebook.com/acme, https://x.com/acme"
    );
    assert_eq!(rows[0].address, "1 Main St, Testville");
    assert_eq!(rows[0].phone, "555-0100");
    assert_eq!(rows[0].website, "acme.test");
    assert_eq!(rows[0].google_reviews, "4.8");

    assert_eq!(rows[1].company_name, "Bare Bakery");
    assert_eq!(rows[1].type_of_business, "Bakery");
    assert_eq!(rows[1].social_media_links, "");
    assert_eq!(rows[1].address, "");
    assert_eq!(rows[1].google_reviews, "");

    assert_eq!(report.rows_written, 2);
    assert_eq!(report.cities_flushed, 1);

    let completed = store_for(&config).load_completed().unwrap();
    assert!(completed.contains("Testville"));

    server.verify().await;
}

#[tokio::test]
async fn test_second_run_skips_completed_city() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_hierarchy(&server, 2).await;
    // City and company pages are only fetched by the first run
    mount_page(
        &server,
        "/testland/testregion/testville/",
        business_links(&[format!("{base}/acme/"), format!("{base}/bare/")]),
        1,
    )
    .await;
    mount_page(&server, "/acme/", FULL_COMPANY.to_string(), 1).await;
    mount_page(&server, "/bare/", MINIMAL_COMPANY.to_string(), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &table_path(&dir));

    run_crawl(&config).await.expect("First crawl failed");
    let report = run_crawl(&config).await.expect("Second crawl failed");

    assert_eq!(read_rows(&table_path(&dir)).len(), 2);
    assert_eq!(report.cities_skipped, 1);
    assert_eq!(report.rows_written, 0);

    server.verify().await;
}

#[tokio::test]
async fn test_existing_table_city_issues_no_company_fetches() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_hierarchy(&server, 1).await;
    mount_page(
        &server,
        "/testland/testregion/testville/",
        business_links(&[format!("{base}/acme/")]),
        0,
    )
    .await;
    mount_page(&server, "/acme/", FULL_COMPANY.to_string(), 0).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &table_path(&dir));

    let mut store = store_for(&config);
    let existing = CompanyRecord {
        company_name: "Earlier Co".to_string(),
        ..CompanyRecord::default()
    }
    .located("Testland", "Testregion", "Testville");
    store.append(&[existing.clone()]).unwrap();

    run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(read_rows(&table_path(&dir)), vec![existing]);
    server.verify().await;
}

#[tokio::test]
async fn test_malformed_company_is_skipped_without_affecting_siblings() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_hierarchy(&server, 1).await;
    mount_page(
        &server,
        "/testland/testregion/testville/",
        business_links(&[
            format!("{base}/acme/"),
            format!("{base}/nameless/"),
            format!("{base}/bare/"),
        ]),
        1,
    )
    .await;
    mount_page(&server, "/acme/", FULL_COMPANY.to_string(), 1).await;
    mount_page(&server, "/nameless/", MALFORMED_COMPANY.to_string(), 1).await;
    mount_page(&server, "/bare/", MINIMAL_COMPANY.to_string(), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &table_path(&dir));

    let report = run_crawl(&config).await.expect("Crawl failed");

    let names: Vec<_> = read_rows(&table_path(&dir))
        .into_iter()
        .map(|r| r.company_name)
        .collect();
    assert_eq!(names, ["Acme Plumbing", "Bare Bakery"]);
    assert_eq!(report.companies_failed, 1);
    assert_eq!(report.companies_extracted, 2);

    server.verify().await;
}

#[tokio::test]
async fn test_company_fetch_error_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_hierarchy(&server, 1).await;
    mount_page(
        &server,
        "/testland/testregion/testville/",
        business_links(&[format!("{base}/gone/"), format!("{base}/bare/")]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/bare/", MINIMAL_COMPANY.to_string(), 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &table_path(&dir));

    let report = run_crawl(&config).await.expect("Crawl failed");

    assert_eq!(read_rows(&table_path(&dir)).len(), 1);
    assert_eq!(report.companies_failed, 1);
    server.verify().await;
}

#[tokio::test]
async fn test_city_without_companies_is_retried_next_run() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_hierarchy(&server, 2).await;
    mount_page(
        &server,
        "/testland/testregion/testville/",
        "<html><body><p>No winners yet</p></body></html>".to_string(),
        2,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &table_path(&dir));

    let first = run_crawl(&config).await.expect("First crawl failed");
    let second = run_crawl(&config).await.expect("Second crawl failed");

    assert!(read_rows(&table_path(&dir)).is_empty());
    assert_eq!(first.empty_cities, 1);
    assert_eq!(second.empty_cities, 1);
    assert_eq!(second.cities_skipped, 0);
    assert!(!store_for(&config).load_completed().unwrap().contains("Testville"));

    server.verify().await;
}

#[tokio::test]
async fn test_mark_complete_policy_skips_empty_city_next_run() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_hierarchy(&server, 2).await;
    mount_page(
        &server,
        "/testland/testregion/testville/",
        "<html><body></body></html>".to_string(),
        1,
    )
    .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base, &table_path(&dir));
    config.crawler.empty_city_policy = EmptyCityPolicy::MarkComplete;

    run_crawl(&config).await.expect("First crawl failed");
    let second = run_crawl(&config).await.expect("Second crawl failed");

    assert!(read_rows(&table_path(&dir)).is_empty());
    assert!(config.output.empty_cities_path().exists());
    assert_eq!(second.cities_skipped, 1);

    server.verify().await;
}

#[tokio::test]
async fn test_transient_company_failure_is_retried() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_hierarchy(&server, 1).await;
    mount_page(
        &server,
        "/testland/testregion/testville/",
        business_links(&[format!("{base}/acme/")]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/acme/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/acme/", FULL_COMPANY.to_string(), 1).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&base, &table_path(&dir));
    config.crawler.max_retries = 1;

    run_crawl(&config).await.expect("Crawl failed");

    let rows = read_rows(&table_path(&dir));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].company_name, "Acme Plumbing");
    server.verify().await;
}

#[tokio::test]
async fn test_root_failure_aborts_run_with_table_initialized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/award-winners/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &table_path(&dir));

    let err = run_crawl(&config).await.unwrap_err();

    assert!(matches!(
        err,
        CrawlError::Fetch(FetchError::Status { status: 500, .. })
    ));
    let content = std::fs::read_to_string(table_path(&dir)).unwrap();
    assert_eq!(content, format!("{}\n", COLUMNS.join(",")));
    server.verify().await;
}

#[tokio::test]
async fn test_state_failure_keeps_earlier_cities() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/award-winners/",
        nav_links(&[(format!("{base}/testland/"), "Testland")]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/testland/",
        nav_links(&[
            (format!("{base}/testland/testregion/"), "Testregion"),
            (format!("{base}/testland/broken/"), "Brokenregion"),
        ]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/testland/testregion/",
        nav_links(&[(format!("{base}/testland/testregion/testville/"), "Testville")]),
        1,
    )
    .await;
    mount_page(
        &server,
        "/testland/testregion/testville/",
        business_links(&[format!("{base}/bare/")]),
        1,
    )
    .await;
    mount_page(&server, "/bare/", MINIMAL_COMPANY.to_string(), 1).await;
    Mock::given(method("GET"))
        .and(path("/testland/broken/"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&base, &table_path(&dir));

    let err = run_crawl(&config).await.unwrap_err();

    assert!(matches!(err, CrawlError::Fetch(_)));
    let rows = read_rows(&table_path(&dir));
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].city, "Testville");
    server.verify().await;
}
