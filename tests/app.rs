use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use github_query_loader::{
    App, HttpFetcher, IndicatorMode, LoaderState, StartOutcome, UrlBuilder, ERROR_MESSAGE,
};
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::sync::Notify;
use url::Url;

/// Answers like the search API: a body for non-empty queries, an error
/// for an empty `q`.
struct FakeSearchApi {
    calls: AtomicUsize,
    body: String,
    gate: Option<Arc<Notify>>,
}

impl FakeSearchApi {
    fn new(body: &str) -> Arc<Self> {
        Arc::new(FakeSearchApi {
            calls: AtomicUsize::new(0),
            body: body.to_string(),
            gate: None,
        })
    }

    fn gated(body: &str, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(FakeSearchApi {
            calls: AtomicUsize::new(0),
            body: body.to_string(),
            gate: Some(gate),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HttpFetcher for FakeSearchApi {
    fn get_response_text(&self, url: Url) -> BoxFuture<'static, io::Result<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let query = url
            .query_pairs()
            .find(|(key, _)| key == "q")
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        let body = self.body.clone();
        let gate = self.gate.clone();
        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if query.is_empty() {
                Err(io::Error::other("422 Unprocessable Entity"))
            } else {
                Ok(body)
            }
        }
        .boxed()
    }
}

/// Output buffer that can be read while `App::run` still holds a writer.
#[derive(Clone, Default)]
struct SharedOutput(Arc<Mutex<Vec<u8>>>);

impl SharedOutput {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn builder() -> UrlBuilder {
    UrlBuilder::new(Url::parse("https://api.example.com/search").unwrap(), None)
}

fn app(fetcher: Arc<FakeSearchApi>) -> App<FakeSearchApi> {
    App::new(fetcher, builder(), IndicatorMode::Hidden)
}

#[tokio::test]
async fn square_search_shows_payload() {
    let fetcher = FakeSearchApi::new("{\"items\":[]}");
    let mut app = app(fetcher.clone());

    assert_eq!(app.submit("square"), StartOutcome::Started);
    let screen = app.screen().unwrap();
    assert_eq!(screen.url_display(), "https://api.example.com/search?q=square");
    assert!(screen.is_loading());

    app.pump().await;

    let screen = app.screen().unwrap();
    assert!(!screen.is_loading());
    assert!(screen.is_results_visible());
    assert!(!screen.is_error_visible());
    assert_eq!(screen.search_results(), "{\"items\":[]}");
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn empty_query_shows_error() {
    let fetcher = FakeSearchApi::new("{\"items\":[]}");
    let mut app = app(fetcher.clone());

    app.submit("");
    app.pump().await;

    let screen = app.screen().unwrap();
    assert_eq!(screen.url_display(), "https://api.example.com/search?q=");
    assert!(screen.is_error_visible());
    assert!(!screen.is_results_visible());
}

#[tokio::test]
async fn rotation_mid_flight_keeps_single_fetch_and_url() {
    let gate = Arc::new(Notify::new());
    let fetcher = FakeSearchApi::gated("{\"total_count\":1}", gate.clone());
    let mut app = app(fetcher.clone());

    app.submit("square");
    app.recreate_screen();

    let screen = app.screen().unwrap();
    assert_eq!(screen.url_display(), "https://api.example.com/search?q=square");
    assert!(screen.is_loading());
    assert!(!screen.is_results_visible());

    // Resubmitting from the new screen must not start another fetch.
    assert_eq!(app.submit("square"), StartOutcome::AlreadyInFlight);

    gate.notify_one();
    app.pump().await;

    let screen = app.screen().unwrap();
    assert_eq!(screen.search_results(), "{\"total_count\":1}");
    assert!(screen.is_results_visible());
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn rotation_after_completion_redelivers_cached_result() {
    let fetcher = FakeSearchApi::new("cached");
    let mut app = app(fetcher.clone());
    app.submit("square");
    app.pump().await;

    app.recreate_screen();

    let screen = app.screen().unwrap();
    assert!(screen.is_results_visible());
    assert_eq!(screen.search_results(), "cached");
    assert!(!screen.is_loading());
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn destroy_forgets_cache_and_url() {
    let fetcher = FakeSearchApi::new("payload");
    let mut app = app(fetcher.clone());
    app.submit("square");
    app.pump().await;

    app.destroy();

    assert_eq!(app.loader_state(), &LoaderState::NotStarted);
    let screen = app.screen().unwrap();
    assert_eq!(screen.url_display(), "");
    assert!(!screen.is_results_visible());

    assert_eq!(app.submit("square"), StartOutcome::Started);
    app.pump().await;
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn resubmitting_while_in_flight_keeps_running_url() {
    let gate = Arc::new(Notify::new());
    let fetcher = FakeSearchApi::gated("body for a", gate.clone());
    let mut app = app(fetcher.clone());

    assert_eq!(app.submit("a"), StartOutcome::Started);
    assert_eq!(app.submit("b"), StartOutcome::AlreadyInFlight);
    assert_eq!(
        app.screen().unwrap().url_display(),
        "https://api.example.com/search?q=a"
    );

    app.recreate_screen();
    assert_eq!(
        app.screen().unwrap().url_display(),
        "https://api.example.com/search?q=a"
    );

    gate.notify_one();
    app.pump().await;

    let screen = app.screen().unwrap();
    assert_eq!(screen.url_display(), "https://api.example.com/search?q=a");
    assert_eq!(screen.search_results(), "body for a");
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn try_pump_delivers_without_blocking() {
    let fetcher = FakeSearchApi::new("PAYLOAD");
    let mut app = app(fetcher.clone());
    app.submit("square");
    assert!(!app.try_pump());

    let mut delivered = false;
    for _ in 0..100 {
        if app.try_pump() {
            delivered = true;
            break;
        }
        tokio::task::yield_now().await;
    }

    assert!(delivered, "search never finished");
    let screen = app.screen().unwrap();
    assert!(screen.is_results_visible());
    assert!(!screen.is_loading());
    assert_eq!(screen.search_results(), "PAYLOAD");
    assert!(matches!(app.loader_state(), LoaderState::Completed { .. }));
}

#[tokio::test]
async fn run_renders_result_while_input_is_still_open() {
    let fetcher = FakeSearchApi::new("{\"items\":[]}");
    let mut app = app(fetcher.clone());
    let (mut input, reader) = tokio::io::duplex(64);
    let output = SharedOutput::default();
    let mut out = output.clone();

    let watch = output.clone();
    let user = async move {
        input.write_all(b"square\n").await.unwrap();
        let shown = tokio::time::timeout(Duration::from_secs(5), async {
            while !watch.text().contains("{\"items\":[]}") {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await;
        // Input only ends once the payload is already on screen.
        drop(input);
        shown
    };

    let (ran, shown) = tokio::join!(app.run(BufReader::new(reader), &mut out), user);
    ran.unwrap();
    assert!(shown.is_ok(), "payload was not rendered while input was open");

    let rendered = output.text();
    assert!(rendered.starts_with("URL: https://api.example.com/search?q=square\n"));
    assert!(rendered.ends_with("{\"items\":[]}\n"));
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn run_flushes_running_search_at_end_of_input() {
    let fetcher = FakeSearchApi::new("{\"items\":[]}");
    let mut app = app(fetcher.clone());
    let input: &[u8] = b"square\n";
    let mut out = Vec::new();

    app.run(input, &mut out).await.unwrap();

    let rendered = String::from_utf8(out).unwrap();
    assert!(rendered.starts_with("URL: https://api.example.com/search?q=square\n"));
    assert!(rendered.ends_with("{\"items\":[]}\n"));
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn run_handles_wait_rotate_and_quit() {
    let fetcher = FakeSearchApi::new("payload");
    let mut app = app(fetcher.clone());
    let input: &[u8] = b"\n:wait\n:rotate\n:quit\nnever\n";
    let mut out = Vec::new();

    app.run(input, &mut out).await.unwrap();

    let rendered = String::from_utf8(out).unwrap();
    assert!(rendered.contains(ERROR_MESSAGE));
    assert!(!rendered.contains("payload"));
    // The empty search ran once; nothing after :quit was read.
    assert_eq!(fetcher.calls(), 1);
    assert!(app.screen().unwrap().is_error_visible());
}
