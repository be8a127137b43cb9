use mockito::Matcher;
use std::time::{Duration, Instant};
use teamsync_api::client::{FetchError, PageFetcher};
use teamsync_api::{Sport, parse_page};

const FIXTURE: &str = include_str!("fixtures/girls_soccer.html");

#[tokio::test]
async fn fetch_sends_browser_headers_and_keeps_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/athletic-teams")
        .match_query(Matcher::UrlEncoded("Team".into(), "171408".into()))
        .match_header("user-agent", Matcher::Regex("^Mozilla/5.0".into()))
        .match_header("accept", Matcher::Regex("text/html".into()))
        .match_header("accept-language", "en-US,en;q=0.9")
        .match_header("cache-control", "no-cache")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(FIXTURE)
        .expect(1)
        .create_async()
        .await;

    let fetcher = PageFetcher::default();
    let page = fetcher
        .fetch(&format!("{}/athletic-teams?Team=171408", server.url()))
        .await
        .expect("fetch fixture");

    mock.assert_async().await;
    assert_eq!(page.content_type.as_deref(), Some("text/html; charset=utf-8"));
    assert_eq!(page.body, FIXTURE.as_bytes());

    let parsed = parse_page(&page.text(), Sport::Soccer, None);
    assert_eq!(parsed.games.len(), 4);
    assert_eq!(parsed.games[0].id, "soccer_boys_varsity-game-1");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    server.mock("GET", "/missing").with_status(404).create_async().await;

    let err = PageFetcher::default()
        .fetch(&format!("{}/missing", server.url()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert_eq!(err.to_string(), "HTTP 404: Not Found");
}

#[tokio::test]
async fn invalid_url_never_connects() {
    let err = PageFetcher::default().fetch("mailto:coach@example.org").await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl(_)));
}

#[tokio::test]
async fn unresponsive_upstream_hits_the_bound() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let bound = Duration::from_millis(150);
    let started = Instant::now();
    let err = PageFetcher::new(bound)
        .fetch(&format!("http://{addr}/never"))
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert!(started.elapsed() < bound * 2);
    assert_eq!(err.to_string(), "Upstream request timed out after 150ms");
}
