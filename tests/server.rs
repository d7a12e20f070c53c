//! End-to-end tests against a live server on a loopback port.

use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use hosts_server::catalog::{Catalog, UBUNTU_DEFAULT_HOSTS, load_default_hosts};
use hosts_server::lists::load_lists;
use hosts_server::server::{Server, ServerConfig, WORKERS};

const DEFAULT_HOSTS: &str = "127.0.0.1 localhost\n";

fn write_lists(dir: &std::path::Path) {
    fs::write(
        dir.join("1_ads"),
        "# ads\n0.0.0.0 ads.example.com\n127.0.0.1 x.test\n127.0.0.1 localhost\n",
    )
    .unwrap();
    fs::write(
        dir.join("2_trackers"),
        "0.0.0.0 x.test # shared\n0.0.0.0 trackers.example.org\n0.0.0.0 0.0.0.0\n",
    )
    .unwrap();
    fs::write(dir.join("README.md"), "0.0.0.0 ignored.test\n").unwrap();
}

async fn start(default_hosts: String) -> SocketAddr {
    let dir = tempfile::tempdir().unwrap();
    write_lists(dir.path());
    let catalog = Arc::new(Catalog::new(load_lists(dir.path()).unwrap(), default_hosts));

    let config = ServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        ..Default::default()
    };
    let server = Server::bind(&config).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run(catalog));
    addr
}

async fn get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

fn split(response: &str) -> (&str, &str) {
    response.split_once("\r\n\r\n").unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn serves_combined_lists() {
    let addr = start(DEFAULT_HOSTS.to_string()).await;

    let response = get(addr, "/2-1").await;
    let (head, body) = split(&response);

    assert!(head.starts_with("HTTP/1.0 200 OK\r\n"));
    assert!(head.contains("Content-Type: text/plain; charset=utf-8"));
    assert_eq!(
        body,
        "127.0.0.1 localhost\n\
         # uAdBlock generated block list (1-2)\n\
         0.0.0.0 ads.example.com\n\
         0.0.0.0 trackers.example.org\n\
         0.0.0.0 x.test\n"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_ids_collapse() {
    let addr = start(DEFAULT_HOSTS.to_string()).await;

    let once = get(addr, "/1").await;
    let twice = get(addr, "/1-1-1").await;

    assert_eq!(once, twice);
    assert!(split(&once).1.contains("# uAdBlock generated block list (1)\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rejects_unknown_and_malformed_selectors() {
    let addr = start(DEFAULT_HOSTS.to_string()).await;

    let response = get(addr, "/5").await;
    assert!(response.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert_eq!(split(&response).1, "invalid list id: 5");

    let response = get(addr, "/1-9999").await;
    assert_eq!(split(&response).1, "invalid list id: 9999");

    let response = get(addr, "/abc").await;
    assert!(response.starts_with("HTTP/1.0 404 Not Found\r\n"));
    assert_eq!(split(&response).1, "invalid identifier");

    let response = get(addr, "/").await;
    assert_eq!(split(&response).1, "invalid identifier");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn builtin_default_hosts_lead_the_body() {
    let addr = start(load_default_hosts(None).unwrap()).await;

    let response = get(addr, "/1").await;
    let body = split(&response).1;

    assert!(body.starts_with(UBUNTU_DEFAULT_HOSTS));
    assert_eq!(
        &body[UBUNTU_DEFAULT_HOSTS.len()..],
        "# uAdBlock generated block list (1)\n\
         0.0.0.0 ads.example.com\n\
         0.0.0.0 x.test\n"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_clients_get_identical_responses() {
    let addr = start(DEFAULT_HOSTS.to_string()).await;

    let clients: Vec<_> = (0..3 * WORKERS)
        .map(|_| tokio::spawn(get(addr, "/1-2")))
        .collect();

    let mut responses = Vec::new();
    for client in clients {
        responses.push(client.await.unwrap());
    }

    assert!(responses.iter().all(|r| r == &responses[0]));
    assert!(responses[0].starts_with("HTTP/1.0 200 OK\r\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn idle_client_only_holds_its_own_worker() {
    let addr = start(DEFAULT_HOSTS.to_string()).await;

    // Connects but never sends a request.
    let _idle = TcpStream::connect(addr).await.unwrap();

    let response = tokio::time::timeout(Duration::from_secs(5), get(addr, "/2"))
        .await
        .expect("other workers keep serving");

    assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn client_hanging_up_early_does_not_stop_the_server() {
    let addr = start(DEFAULT_HOSTS.to_string()).await;

    for _ in 0..WORKERS {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(b"GET /1-2 HTTP/1.1\r\n\r\n").await.unwrap();
        drop(stream);
    }

    let response = get(addr, "/1").await;

    assert!(response.starts_with("HTTP/1.0 200 OK\r\n"));
}
