use anyhow::{Context, Result};
use async_trait::async_trait;
use bmlt_geocoding::{
    CacheConfig, FailureKind, GeocodeClient, GeocodeContext, GeocodeError, GeocodeTransport,
    GeocoderConfig, NominatimTransport, Place, RetryClass, RetryPolicy,
};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

enum Reply {
    Respond { status: u16, body: &'static str },
    /// Read the request, then drop the connection with a TCP reset.
    Reset,
}

/// Serves one queued reply per connection and records each request head.
struct FakeNominatim {
    endpoint: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeNominatim {
    async fn start(replies: Vec<Reply>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let endpoint = format!("http://{}/search", listener.local_addr()?);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();
        let mut replies = VecDeque::from(replies);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let head = read_head(&mut socket).await;
                seen.lock().unwrap().push(head);
                match replies.pop_front() {
                    Some(Reply::Respond { status, body }) => {
                        let response = format!(
                            "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                            body.len()
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                    Some(Reply::Reset) | None => {
                        #[allow(deprecated)]
                        let _ = socket.set_linger(Some(Duration::ZERO));
                        drop(socket);
                    }
                }
            }
        });

        Ok(Self { endpoint, requests })
    }

    fn transport(&self) -> Result<NominatimTransport> {
        Ok(NominatimTransport::new(GeocoderConfig {
            endpoint: self.endpoint.clone(),
            ..GeocoderConfig::default()
        })?)
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let Ok(n) = socket.read(&mut chunk).await else { break };
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn query_of(head: &str) -> Result<Vec<(String, String)>> {
    let target = head
        .split_whitespace()
        .nth(1)
        .context("request line has no target")?;
    let url = reqwest::Url::parse(&format!("http://fake{target}"))?;
    Ok(url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}

fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
    head.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.eq_ignore_ascii_case(name).then(|| value.trim())
    })
}

const SPRINGFIELD: &str = r#"[{"lat":"39.7990175","lon":"-89.6439575","display_name":"Springfield, Illinois"}]"#;

#[tokio::test]
async fn http_statuses_map_to_geocode_errors() -> Result<()> {
    let server = FakeNominatim::start(vec![
        Reply::Respond { status: 429, body: "" },
        Reply::Respond { status: 503, body: "" },
        Reply::Respond { status: 200, body: SPRINGFIELD },
    ])
    .await?;
    let transport = server.transport()?;

    let err = transport.search("Main St, Springfield").await.unwrap_err();
    assert!(matches!(err, GeocodeError::RateLimited));
    assert_eq!(err.retry_class(), RetryClass::RateLimited);

    let err = transport.search("Main St, Springfield").await.unwrap_err();
    assert!(matches!(err, GeocodeError::Server { status: 503 }));
    assert_eq!(err.retry_class(), RetryClass::Transient);

    let places = transport.search("Main St, Springfield").await?;
    let hit = places[0].to_hit()?;
    assert!((hit.latitude - 39.799_017_5).abs() < 1e-9);
    assert_eq!(hit.display_name, "Springfield, Illinois");
    Ok(())
}

#[tokio::test]
async fn search_sends_nominatim_query_and_user_agent() -> Result<()> {
    let server = FakeNominatim::start(vec![Reply::Respond { status: 200, body: "[]" }]).await?;

    let places: Vec<Place> = server.transport()?.search("Main St, Springfield").await?;
    assert!(places.is_empty());

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].starts_with("GET /search?"));
    assert_eq!(
        query_of(&requests[0])?,
        vec![
            ("q".to_string(), "Main St, Springfield".to_string()),
            ("format".to_string(), "json".to_string()),
            ("limit".to_string(), "1".to_string()),
            ("countrycodes".to_string(), "us,ca".to_string()),
            ("addressdetails".to_string(), "1".to_string()),
        ]
    );
    let user_agent = header(&requests[0], "user-agent").context("no User-Agent header")?;
    assert!(
        user_agent.starts_with("BMLT-MCP-Server/"),
        "unexpected User-Agent: {user_agent}"
    );
    Ok(())
}

#[tokio::test]
async fn dropped_connection_is_a_retryable_network_error() -> Result<()> {
    let server = FakeNominatim::start(vec![Reply::Reset]).await?;

    let err = server.transport()?.search("Springfield").await.unwrap_err();

    assert!(
        matches!(err, GeocodeError::Network(_)),
        "expected a network error, got {err:?}"
    );
    assert_eq!(err.retry_class(), RetryClass::Transient);
    Ok(())
}

/// Counts dispatches to the wrapped transport.
struct Counting<T> {
    inner: T,
    calls: AtomicUsize,
}

#[async_trait]
impl<T: GeocodeTransport> GeocodeTransport for Counting<T> {
    async fn search(&self, query: &str) -> bmlt_geocoding::Result<Vec<Place>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.search(query).await
    }
}

#[tokio::test]
async fn refused_connection_fails_after_one_attempt() -> Result<()> {
    // Bind then release a port so nothing is listening on it.
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let transport = NominatimTransport::new(GeocoderConfig {
        endpoint: format!("http://{addr}/search"),
        ..GeocoderConfig::default()
    })?;
    let err = transport.search("Springfield").await.unwrap_err();
    assert!(
        matches!(err, GeocodeError::Connect(ref detail) if !detail.is_empty()),
        "expected a connect error, got {err:?}"
    );
    assert_eq!(err.retry_class(), RetryClass::Fatal);

    let client = GeocodeClient::new(
        Counting {
            inner: transport,
            calls: AtomicUsize::new(0),
        },
        Arc::new(GeocodeContext::default()),
    );
    let started = Instant::now();
    let outcome = client.geocode("Springfield").await;

    assert_eq!(outcome.failure_kind(), Some(FailureKind::UnknownError));
    assert_eq!(client.transport().calls.load(Ordering::SeqCst), 1);
    assert!(
        started.elapsed() < Duration::from_secs(2),
        "no backoff expected, took {:?}",
        started.elapsed()
    );
    Ok(())
}

#[tokio::test]
async fn client_retries_through_rate_limit_over_http() -> Result<()> {
    let server = FakeNominatim::start(vec![
        Reply::Respond { status: 429, body: "" },
        Reply::Respond { status: 200, body: SPRINGFIELD },
    ])
    .await?;
    let policy = RetryPolicy {
        rate_limit_base: Duration::from_millis(5),
        rate_limit_cap: Duration::from_millis(20),
        network_step: Duration::from_millis(5),
        ..RetryPolicy::default()
    };
    let context = Arc::new(GeocodeContext::new(
        Duration::from_millis(1),
        CacheConfig::default(),
    ));
    let client = GeocodeClient::new(server.transport()?, context).with_policy(policy);

    let outcome = client.geocode("Springfield").await;

    assert!(outcome.is_success(), "unexpected outcome: {outcome:?}");
    assert_eq!(server.requests().len(), 2);
    Ok(())
}
