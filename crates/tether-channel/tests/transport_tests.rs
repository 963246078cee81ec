//! Wire-level tests for tonic-built channels
//!
//! A bare TCP listener stands in for the server; the first bytes the
//! channel writes show whether it opened a TLS session or spoke cleartext
//! HTTP/2.

use std::time::Duration;
use tether_channel::{ManagedChannelBuilder, TonicChannel, TonicChannelBuilder};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tonic::codegen::http::uri::PathAndQuery;

/// TLS record content type for a handshake
const TLS_HANDSHAKE: u8 = 0x16;

/// Start of the HTTP/2 client connection preface
const H2_PREFACE: &[u8] = b"PRI * HTTP/2.0";

/// Build a channel to a local listener, issue one call and return the first
/// `len` bytes the server side receives
async fn first_bytes_sent(plaintext: bool, len: usize) -> Vec<u8> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut builder = TonicChannelBuilder::for_target(addr.to_string());
    if plaintext {
        builder.use_plaintext().unwrap();
    }
    let handle = builder.build().unwrap();
    let channel = handle
        .downcast_ref::<TonicChannel>()
        .expect("tonic builder should produce a TonicChannel")
        .channel();

    let call = tokio::spawn(async move {
        let mut client = tonic::client::Grpc::new(channel);
        if client.ready().await.is_err() {
            return;
        }
        let _ = client
            .unary::<(), (), _>(
                tonic::Request::new(()),
                PathAndQuery::from_static("/tether.Test/Ping"),
                tonic::codec::ProstCodec::default(),
            )
            .await;
    });

    let (mut socket, _) = tokio::time::timeout(Duration::from_secs(5), listener.accept())
        .await
        .expect("channel should connect")
        .unwrap();
    let mut buf = vec![0u8; len];
    tokio::time::timeout(Duration::from_secs(5), socket.read_exact(&mut buf))
        .await
        .expect("channel should send its opening bytes")
        .unwrap();

    call.abort();
    buf
}

#[tokio::test]
async fn test_secure_channel_opens_tls_session() {
    let sent = first_bytes_sent(false, H2_PREFACE.len()).await;

    assert_eq!(sent[0], TLS_HANDSHAKE, "expected a TLS record, got {:?}", sent);
    assert_ne!(&sent[..], H2_PREFACE);
}

#[tokio::test]
async fn test_plaintext_channel_speaks_cleartext_http2() {
    let sent = first_bytes_sent(true, H2_PREFACE.len()).await;

    assert_eq!(&sent[..], H2_PREFACE);
}
