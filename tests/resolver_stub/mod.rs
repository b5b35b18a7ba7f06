use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How long the `/slow` product keeps the stub busy before answering.
#[allow(dead_code)]
pub const SLOW_RESPONSE: Duration = Duration::from_millis(800);

/// Scrape endpoint stand-in. The product link's last path segment picks the reply.
pub struct ResolverStub {
    pub endpoint: String,
    seen_links: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ResolverStub {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start resolver stub server");
        let addr = server.server_addr();
        let endpoint = format!("http://{addr}/api/scrape");

        let seen_links = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&seen_links);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let full = url::Url::parse(&format!("http://{addr}{}", request.url()))
                    .expect("parse request url");
                if request.method() != &tiny_http::Method::Get || full.path() != "/api/scrape" {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                }

                let Some(link) = full
                    .query_pairs()
                    .find(|(key, _)| key == "url")
                    .map(|(_, value)| value.into_owned())
                else {
                    let _ = request.respond(
                        tiny_http::Response::from_string("missing url").with_status_code(400),
                    );
                    continue;
                };
                seen.lock().expect("lock seen links").push(link.clone());

                let product = link.rsplit('/').next().unwrap_or_default().to_owned();
                let (status, body) = match product.as_str() {
                    "shoes" => (200, r#"{"title":"Shoes","image":"http://img/1"}"#.to_owned()),
                    "apple" => (200, r#"{"title":"Apple","image":"http://img/apple"}"#.to_owned()),
                    "banana" => (
                        200,
                        r#"{"title":"Banana","image":"http://img/banana"}"#.to_owned(),
                    ),
                    "grape" => (200, r#"{"title":"Grape","image":"http://img/grape"}"#.to_owned()),
                    "untitled" => (200, r#"{"title":"  ","image":"http://img/u"}"#.to_owned()),
                    "imageless" => (200, r#"{"title":"Teapot"}"#.to_owned()),
                    "broken" => (500, r#"{"title":"Should not be used"}"#.to_owned()),
                    "garbage" => (200, "<html>not json</html>".to_owned()),
                    "array" => (200, "[1,2,3]".to_owned()),
                    "slow" => {
                        thread::sleep(SLOW_RESPONSE);
                        (200, r#"{"title":"Too Late","image":"http://img/late"}"#.to_owned())
                    }
                    _ => (404, r#"{"error":"unknown product"}"#.to_owned()),
                };

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("build header");
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            endpoint,
            seen_links,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    #[allow(dead_code)]
    pub fn seen_links(&self) -> Vec<String> {
        self.seen_links.lock().expect("lock seen links").clone()
    }
}

impl Drop for ResolverStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
