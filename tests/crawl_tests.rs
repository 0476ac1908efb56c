//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the listings site and run the
//! whole search cycle end-to-end, with report files in temp directories.

use listing_grep::config::Config;
use listing_grep::crawler::Coordinator;
use listing_grep::{GrepError, OutputFormat, RunOutcome, RunPhase};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(server: &MockServer, output: &str) -> Config {
    Config {
        scheme: "http".to_string(),
        host: server.address().to_string(),
        section: "sss".to_string(),
        pattern: "mario|xbox".to_string(),
        output: output.to_string(),
        delay: 0.0,
        timeout: 5,
        retries: 1,
        user_agent: "TestAgent/1.0".to_string(),
        ..Config::default()
    }
}

fn detail_page(title: &str, body: &str) -> String {
    format!(
        r#"<html><head><title>{title}</title></head><body>
        <h1><span id="titletextonly">{title}</span></h1>
        <section id="postingbody">
            <div class="print-qrcode-container">QR Code Link to This Post</div>
            {body}
        </section>
        </body></html>"#
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

async fn mount_search_page(server: &MockServer, offset: &str, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<li><a href="{}">listing</a></li>"#, href))
        .collect();

    Mock::given(method("GET"))
        .and(path("/search/sss"))
        .and(query_param("s", offset))
        .respond_with(html(format!(
            r#"<html><body><ul>{}<li><a href="/about">About</a></li></ul></body></html>"#,
            anchors
        )))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, detail_path: &str, title: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(detail_path))
        .respond_with(html(detail_page(title, body)))
        .expect(1)
        .mount(server)
        .await;
}

fn report_path(dir: &TempDir) -> String {
    dir.path().join("report.txt").to_str().unwrap().to_string()
}

#[tokio::test]
async fn test_full_run_reports_matches() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = report_path(&dir);
    let base = server.uri();

    mount_search_page(
        &server,
        "0",
        &[
            "/sss/d/games/300.html",
            &format!("{}/sss/100.html", base),
            "/sss/200.html",
            "javascript:void(0)",
            "mailto:seller@example.org",
        ],
    )
    .await;
    mount_detail(&server, "/sss/100.html", "Mario Kart", "Like new, works on Xbox").await;
    mount_detail(&server, "/sss/200.html", "Garden hose", "Fifty feet<br>green").await;
    mount_detail(&server, "/sss/d/games/300.html", "XBOX controller", "xbox xbox").await;

    let mut coordinator = Coordinator::new(create_test_config(&server, &output));
    let outcome = coordinator.run().await.expect("run failed");

    let RunOutcome::Completed(summary) = outcome else {
        panic!("expected a completed run, got {:?}", outcome);
    };
    assert_eq!(summary.search_pages, 1);
    assert_eq!(summary.listings_found, 3);
    assert_eq!(summary.details_fetched, 3);
    assert_eq!(summary.details_failed, 0);
    assert_eq!(summary.matches, 2);
    assert_eq!(coordinator.phase(), RunPhase::Done);

    let report = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        report,
        format!(
            "Match! (Mario)(Xbox) {base}/sss/100.html - Mario Kart\n\
             Match! (XBOX) {base}/sss/d/games/300.html - XBOX controller\n"
        )
    );
}

#[tokio::test]
async fn test_print_urls_lists_without_fetching() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = report_path(&dir);
    let base = server.uri();

    mount_search_page(&server, "0", &["/sss/2.html", "/sss/1.html", "/sss/1.html#map"]).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/sss/"))
        .respond_with(html(detail_page("unused", "unused")))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config {
        urls_only: true,
        ..create_test_config(&server, &output)
    };
    let outcome = listing_grep::run(config).await.expect("run failed");

    assert_eq!(
        outcome,
        RunOutcome::UrlsListed(vec![
            format!("{base}/sss/1.html"),
            format!("{base}/sss/2.html"),
        ])
    );
    assert!(
        !std::path::Path::new(&output).exists(),
        "URL-only mode must not open the report"
    );
}

#[tokio::test]
async fn test_empty_crawl_is_usage_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = report_path(&dir);

    mount_search_page(&server, "0", &["/other/1.html", "#top"]).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/(sss|other)/"))
        .respond_with(html(detail_page("unused", "unused")))
        .expect(0)
        .mount(&server)
        .await;

    let mut coordinator = Coordinator::new(create_test_config(&server, &output));
    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(err, GrepError::NoListingsFound { pages: 1 }));
    assert!(err.is_usage());
    assert_eq!(coordinator.phase(), RunPhase::Failed);
    // The report was opened before the crawl and stays empty
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
}

#[tokio::test]
async fn test_failing_detail_page_does_not_abort_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = report_path(&dir);

    mount_search_page(&server, "0", &["/sss/1.html", "/sss/2.html"]).await;

    // One initial attempt plus one retry
    Mock::given(method("GET"))
        .and(path("/sss/1.html"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;
    mount_detail(&server, "/sss/2.html", "Mario party", "four controllers").await;

    let mut coordinator = Coordinator::new(create_test_config(&server, &output))
        .with_retry_backoff(Duration::from_millis(10));
    let outcome = coordinator.run().await.expect("run failed");

    let RunOutcome::Completed(summary) = outcome else {
        panic!("expected a completed run, got {:?}", outcome);
    };
    assert_eq!(summary.details_failed, 1);
    assert_eq!(summary.details_fetched, 1);
    assert_eq!(summary.matches, 1);

    let report = std::fs::read_to_string(&output).unwrap();
    assert_eq!(report.lines().count(), 1);
    assert!(report.contains("/sss/2.html - Mario party"));
}

#[tokio::test]
async fn test_not_found_detail_page_is_not_retried() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = report_path(&dir);

    mount_search_page(&server, "0", &["/sss/1.html"]).await;

    Mock::given(method("GET"))
        .and(path("/sss/1.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        retries: 3,
        ..create_test_config(&server, &output)
    };
    let outcome = Coordinator::new(config)
        .with_retry_backoff(Duration::from_millis(10))
        .run()
        .await
        .expect("run failed");

    let RunOutcome::Completed(summary) = outcome else {
        panic!("expected a completed run, got {:?}", outcome);
    };
    assert_eq!(summary.details_failed, 1);
    assert_eq!(summary.matches, 0);
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
}

#[tokio::test]
async fn test_unreachable_search_page_is_runtime_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = report_path(&dir);

    Mock::given(method("GET"))
        .and(path("/search/sss"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let err = Coordinator::new(create_test_config(&server, &output))
        .with_retry_backoff(Duration::from_millis(10))
        .run()
        .await
        .unwrap_err();

    match &err {
        GrepError::SearchPageFailed(failed) => {
            assert_eq!(failed.cause, listing_grep::FetchCause::Status(500));
            assert!(failed.url.contains("/search/sss?s=0"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!err.is_usage());
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
}

#[tokio::test]
async fn test_failed_run_truncates_previous_report() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = report_path(&dir);
    std::fs::write(&output, "https://old.example.org/sss/1.html\tStale\tmario\n").unwrap();

    Mock::given(method("GET"))
        .and(path("/search/sss"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = listing_grep::run(create_test_config(&server, &output))
        .await
        .unwrap_err();

    assert!(matches!(err, GrepError::SearchPageFailed(_)));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "");
}

#[tokio::test]
async fn test_unwritable_report_fails_before_network() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = dir
        .path()
        .join("no-such-dir")
        .join("report.txt")
        .display()
        .to_string();

    Mock::given(method("GET"))
        .respond_with(html(detail_page("unused", "unused")))
        .expect(0)
        .mount(&server)
        .await;

    let mut coordinator = Coordinator::new(create_test_config(&server, &output));
    let err = coordinator.run().await.unwrap_err();

    match &err {
        GrepError::SinkUnavailable { path, .. } => assert_eq!(path, &output),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.is_usage());
    assert_eq!(coordinator.phase(), RunPhase::Failed);
}

#[tokio::test]
async fn test_pagination_dedups_listings_across_pages() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = report_path(&dir);
    let base = server.uri();

    mount_search_page(&server, "0", &["/sss/1.html", "/sss/2.html"]).await;
    mount_search_page(
        &server,
        "120",
        &[&format!("{}/sss/2.html?utm_source=feed", base), "/sss/3.html"],
    )
    .await;

    let config = Config {
        pages: 2,
        urls_only: true,
        ..create_test_config(&server, &output)
    };
    let outcome = listing_grep::run(config).await.expect("run failed");

    assert_eq!(
        outcome,
        RunOutcome::UrlsListed(vec![
            format!("{base}/sss/1.html"),
            format!("{base}/sss/2.html"),
            format!("{base}/sss/3.html"),
        ])
    );
}

#[tokio::test]
async fn test_search_query_and_user_agent_are_sent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = report_path(&dir);

    Mock::given(method("GET"))
        .and(path("/search/sss"))
        .and(query_param("s", "240"))
        .and(query_param("sort", "priceasc"))
        .and(query_param("query", "mario kart"))
        .and(header("user-agent", "TestAgent/1.0"))
        .respond_with(html(
            r#"<a href="/sss/9.html">listing</a>"#.to_string(),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        start: 240,
        sort: "priceasc".to_string(),
        query: Some("mario kart".to_string()),
        urls_only: true,
        ..create_test_config(&server, &output)
    };
    let outcome = listing_grep::run(config).await.expect("run failed");

    assert!(matches!(outcome, RunOutcome::UrlsListed(urls) if urls.len() == 1));
}

#[tokio::test]
async fn test_redirected_detail_page_is_followed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = report_path(&dir);
    let base = server.uri();

    mount_search_page(&server, "0", &["/sss/1.html"]).await;

    Mock::given(method("GET"))
        .and(path("/sss/1.html"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/moved/1.html", base).as_str()),
        )
        .mount(&server)
        .await;
    mount_detail(&server, "/moved/1.html", "Xbox One", "with games").await;

    let outcome = Coordinator::new(create_test_config(&server, &output))
        .run()
        .await
        .expect("run failed");

    assert!(matches!(outcome, RunOutcome::Completed(ref s) if s.matches == 1));

    // Reported under the listing URL, not the redirect target
    let report = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        report,
        format!("Match! (Xbox) {base}/sss/1.html - Xbox One\n")
    );
}

#[tokio::test]
async fn test_append_keeps_previous_report() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let output = report_path(&dir);
    std::fs::write(&output, "previous run\n").unwrap();

    mount_search_page(&server, "0", &["/sss/1.html"]).await;
    mount_detail(&server, "/sss/1.html", "Mario", "").await;

    let config = Config {
        append: true,
        format: OutputFormat::Tsv,
        ..create_test_config(&server, &output)
    };
    listing_grep::run(config).await.expect("run failed");

    let report = std::fs::read_to_string(&output).unwrap();
    assert_eq!(
        report,
        format!(
            "previous run\nMatch!\t(Mario)\t{}/sss/1.html\tMario\n",
            server.uri()
        )
    );
}

#[cfg(all(
    feature = "backend-scraper",
    feature = "backend-lol-html",
    feature = "backend-kuchiki"
))]
#[tokio::test]
async fn test_every_backend_reports_the_same() {
    use listing_grep::BackendChoice;

    let mut reports = Vec::new();

    for backend in [
        BackendChoice::Scraper,
        BackendChoice::LolHtml,
        BackendChoice::Kuchiki,
    ] {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let output = report_path(&dir);

        mount_search_page(&server, "0", &["/sss/1.html", "/sss/d/x/2.html"]).await;
        mount_detail(
            &server,
            "/sss/1.html",
            "Mario &amp; Luigi",
            "Boxed <b>Xbox</b>   edition<br>  <i>mint</i>  ",
        )
        .await;
        mount_detail(&server, "/sss/d/x/2.html", "Lamp", "no games here").await;

        let config = Config {
            parser: backend,
            format: OutputFormat::Block,
            ..create_test_config(&server, &output)
        };
        listing_grep::run(config).await.expect("run failed");

        let report = std::fs::read_to_string(&output)
            .unwrap()
            .replace(&server.uri(), "BASE");
        reports.push((backend, report));
    }

    let (_, expected) = &reports[0];
    assert_eq!(
        expected,
        "Match! (Mario)(Xbox)\nURL:   BASE/sss/1.html\nTitle: Mario & Luigi\n\n"
    );
    for (backend, report) in &reports[1..] {
        assert_eq!(report, expected, "backend {} disagrees", backend);
    }
}
