//! AUTH TLS upgrade of a live control connection.

mod common;

use common::*;
use rustls::pki_types::ServerName;
use sorng_ftpd::FtpdErrorKind;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_rustls::TlsConnector;

type TlsClient = BufReader<tokio_rustls::client::TlsStream<tokio::io::DuplexStream>>;

async fn tls_command(client: &mut TlsClient, line: &str) -> String {
    let stream = client.get_mut();
    stream.write_all(format!("{}\r\n", line).as_bytes()).await.unwrap();
    stream.flush().await.unwrap();
    read_reply(client).await
}

fn driver() -> Arc<MemoryDriver> {
    Arc::new(MemoryDriver::new().with_file("hello.txt", b"hello"))
}

#[tokio::test]
async fn test_auth_tls_upgrades_control_channel() {
    let (server_config, client_config) = tls_configs();
    let (mut client, task) = start(hash_settings(), TestServer::with_tls(server_config), driver()).await;

    client.get_mut().write_all(b"AUTH TLS\r\n").await.unwrap();
    let mut line = String::new();
    client.read_line(&mut line).await.unwrap();
    assert_eq!(line, "234 AUTH command ok. Expecting TLS Negotiation.\r\n");
    assert!(client.buffer().is_empty());

    let stream = client.into_inner();
    let server_name = ServerName::try_from("localhost").unwrap();
    let tls = TlsConnector::from(client_config)
        .connect(server_name, stream)
        .await
        .unwrap();
    let mut client = BufReader::new(tls);

    for (cmd, expected) in [
        ("PBSZ 0", "200 Whatever\r\n"),
        ("PROT P", "200 OK\r\n"),
        ("AUTH TLS", "503 TLS is already active\r\n"),
        (
            "XCRC hello.txt",
            "250-Computing CRC32 digest\r\n250 3610a686\r\n",
        ),
    ] {
        assert_eq!(tls_command(&mut client, cmd).await, expected, "{}", cmd);
    }

    assert!(tls_command(&mut client, "FEAT").await.contains(" AUTH TLS\r\n"));
    assert_eq!(tls_command(&mut client, "QUIT").await, "221 Goodbye\r\n");

    let (handler, result) = task.await.unwrap();
    assert!(result.is_ok(), "{:?}", result.err());
    assert!(handler.transfer_tls());
    assert!(handler.is_closed());
}

#[tokio::test]
async fn test_plaintext_after_auth_fails_the_handshake() {
    let (server_config, _) = tls_configs();
    let (mut client, task) = start(hash_settings(), TestServer::with_tls(server_config), driver()).await;

    client.get_mut().write_all(b"AUTH TLS\r\n").await.unwrap();
    let mut line = String::new();
    client.read_line(&mut line).await.unwrap();
    assert!(line.starts_with("234 "));

    client.get_mut().write_all(b"NOOP\r\n").await.unwrap();
    let (handler, result) = task.await.unwrap();
    assert_eq!(result.unwrap_err().kind, FtpdErrorKind::TlsFailed);
    assert!(!handler.control_tls());
}
