use indoc::indoc;
use pinhole::{CorrelatedPair, LegRegistry, PairObserver, ProxyConfig, Server};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;

#[derive(Default)]
struct Pairs {
    pairs: Mutex<Vec<CorrelatedPair>>,
    notify: Notify,
}

impl PairObserver for Pairs {
    fn on_pair(&self, pair: &CorrelatedPair) {
        self.pairs.lock().unwrap().push(pair.clone());
        self.notify.notify_one();
    }
}

fn crlf(str: &str) -> Vec<u8> {
    str.replace('\n', "\r\n").into_bytes()
}

async fn read_head(stream: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        stream.read_exact(&mut byte).await.unwrap();
        head.push(byte[0]);
    }
    String::from_utf8(head).unwrap()
}

/// Accepts one connection, answers every request head it reads with `response`, then closes.
async fn upstream(requests: usize, response: Vec<u8>) -> (SocketAddr, tokio::task::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut heads = Vec::new();
        for _ in 0..requests {
            heads.push(read_head(&mut stream).await);
            stream.write_all(&response).await.unwrap();
        }
        stream.shutdown().await.unwrap();
        heads
    });

    (addr, handle)
}

async fn start_proxy(upstream: SocketAddr, observer: Arc<Pairs>, registry: LegRegistry) -> SocketAddr {
    let config = ProxyConfig::new(0, upstream.ip().to_string(), upstream.port());
    let server = Server::bind(config).await.unwrap().with_observer(observer).with_registry(registry);
    let port = server.local_addr().unwrap().port();
    tokio::spawn(server.run());
    SocketAddr::from(([127, 0, 0, 1], port))
}

#[tokio::test]
async fn forwards_rewrites_and_pairs() {
    let response = crlf("HTTP/1.1 200 OK\nTransfer-Encoding: chunked\n\n4\nWiki\n5\npedia\nE\n in\n\nchunks.\n0\n\n");
    let (upstream_addr, upstream) = upstream(2, response).await;
    let pairs = Arc::new(Pairs::default());
    let proxy_addr = start_proxy(upstream_addr, Arc::clone(&pairs), LegRegistry::new()).await;

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    let request = crlf(indoc! {r#"
    GET /first HTTP/1.1
    Host: localhost

    GET /second HTTP/1.1
    Host: localhost

    "#});
    for piece in request.chunks(11) {
        client.write_all(piece).await.unwrap();
    }

    let mut received = Vec::new();
    client.read_to_end(&mut received).await.unwrap();

    let single = "HTTP/1.1 200 OK\r\nContent-Length: 23\r\n\r\nWikipedia in\r\n\r\nchunks.";
    assert_eq!(String::from_utf8(received).unwrap(), single.repeat(2));

    let heads = upstream.await.unwrap();
    let host = format!("Host: 127.0.0.1:{}\r\n", upstream_addr.port());
    assert_eq!(heads.len(), 2);
    assert!(heads[0].starts_with("GET /first HTTP/1.1\r\n"));
    assert!(heads[1].starts_with("GET /second HTTP/1.1\r\n"));
    assert!(heads.iter().all(|head| head.contains(&host)));

    tokio::time::timeout(Duration::from_secs(5), async {
        while pairs.pairs.lock().unwrap().len() < 2 {
            pairs.notify.notified().await;
        }
    })
    .await
    .unwrap();

    let pairs = pairs.pairs.lock().unwrap();
    let paths: Vec<_> = pairs.iter().map(|pair| pair.request.request_line().unwrap().path.clone()).collect();
    assert_eq!(paths, ["/first", "/second"]);
    assert!(pairs.iter().all(|pair| pair.response.headers.get("transfer-encoding") == Some("chunked")));
}

#[tokio::test]
async fn unreachable_upstream_drops_client_only() {
    let unused = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let upstream_addr = unused.local_addr().unwrap();
    drop(unused);

    let proxy_addr = start_proxy(upstream_addr, Arc::default(), LegRegistry::new()).await;

    for _ in 0..2 {
        let mut client = TcpStream::connect(proxy_addr).await.unwrap();
        let mut received = Vec::new();
        let _ = client.read_to_end(&mut received).await;
        assert!(received.is_empty());
    }
}

#[tokio::test]
async fn legs_are_released_when_both_sides_close() {
    let (upstream_addr, upstream) = upstream(1, crlf("HTTP/1.1 200 OK\nContent-Length: 2\n\nok")).await;
    let registry = LegRegistry::new();
    let proxy_addr = start_proxy(upstream_addr, Arc::default(), registry.clone()).await;

    let mut client = TcpStream::connect(proxy_addr).await.unwrap();
    client.write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();

    let mut received = Vec::new();
    client.read_to_end(&mut received).await.unwrap();
    assert_eq!(received, b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok");
    assert!(registry.active() >= 1);

    upstream.await.unwrap();
    drop(client);

    tokio::time::timeout(Duration::from_secs(5), async {
        while registry.active() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}
