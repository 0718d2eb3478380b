// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::time::Duration;

use anyhow::Result;
use bytes::Bytes;
use cirrus_core::ErrorKind;
use cirrus_transport::{EventLoopGroup, HttpClient};
use http::StatusCode;
use pretty_assertions::assert_eq;

use super::init_logger;
use crate::peer::{Peer, Reply};

fn client(group: &EventLoopGroup) -> HttpClient {
    HttpClient::builder()
        .user_agent("cirrus-test/1.0")
        .build(group)
        .expect("client must build")
}

#[tokio::test]
async fn test_get_round_trip() -> Result<()> {
    init_logger();
    let mut peer = Peer::serve(vec![Reply::new(
        "HTTP/1.1 200 OK\r\nContent-Type: application/xml\r\nContent-Length: 4\r\n\r\nabcd",
    )])
    .await;
    let group = EventLoopGroup::new(1)?;
    let client = client(&group);

    let req = http::Request::get(peer.url("/bucket?list-type=2"))
        .header("User-Agent", "curl/8")
        .body(Bytes::new())?;
    let resp = client.execute(req)?.await?;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.content_type(), Some("application/xml"));
    assert_eq!(resp.body(), b"abcd");

    let recorded = peer.next_request().await;
    assert_eq!(recorded.request_line(), "GET /bucket?list-type=2 HTTP/1.1");
    assert_eq!(recorded.header("host"), Some(peer.addr.to_string().as_str()));
    assert_eq!(recorded.header("user-agent"), Some("cirrus-test/1.0"));
    assert_eq!(recorded.header("accept"), Some("*/*"));
    assert_eq!(recorded.header("content-length"), Some("0"));
    assert_eq!(recorded.header("connection"), Some("close"));

    group.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_put_sends_exact_body() -> Result<()> {
    init_logger();
    let mut peer = Peer::serve(vec![Reply::new(
        "HTTP/1.1 204 No Content\r\nx-amz-request-id: 4442587FB7D0A2F9\r\n\r\n",
    )])
    .await;
    let group = EventLoopGroup::new(1)?;
    let client = client(&group);

    let req = http::Request::put(peer.url("/bucket/key"))
        .header("x-amz-meta-owner", "cirrus")
        .body(Bytes::from_static(b"hello, world"))?;
    let resp = client.call(req).await?;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()["x-amz-request-id"], "4442587FB7D0A2F9");
    assert!(!resp.body_received());

    let recorded = peer.next_request().await;
    assert_eq!(recorded.request_line(), "PUT /bucket/key HTTP/1.1");
    assert_eq!(recorded.header("content-length"), Some("12"));
    assert_eq!(recorded.header("x-amz-meta-owner"), Some("cirrus"));
    assert_eq!(recorded.body, b"hello, world");

    group.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_chunked_body_is_concatenated() -> Result<()> {
    init_logger();
    let peer = Peer::serve(vec![Reply::new(
        "HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nab\r\n2\r\ncd\r\n0\r\n\r\n",
    )])
    .await;
    let group = EventLoopGroup::new(1)?;
    let client = client(&group);

    let req = http::Request::get(peer.url("/")).body(Bytes::new())?;
    let resp = client.call(req).await?;
    assert_eq!(resp.body(), b"abcd");

    group.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_error_status_is_a_response() -> Result<()> {
    init_logger();
    let body = "<Error><Code>NoSuchKey</Code></Error>";
    let peer = Peer::serve(vec![Reply::new(format!(
        "HTTP/1.1 404 Not Found\r\nContent-Type: application/xml\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    ))])
    .await;
    let group = EventLoopGroup::new(1)?;
    let client = client(&group);

    let req = http::Request::get(peer.url("/bucket/missing")).body(Bytes::new())?;
    let resp = client.call(req).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.body(), body.as_bytes());

    group.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_truncated_body_is_transport_error() -> Result<()> {
    init_logger();
    let peer = Peer::serve(vec![Reply::new(
        "HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc",
    )])
    .await;
    let group = EventLoopGroup::new(1)?;
    let client = client(&group);

    let req = http::Request::get(peer.url("/")).body(Bytes::new())?;
    let err = client.call(req).await.expect_err("body is truncated");
    assert_eq!(err.kind(), ErrorKind::Transport);

    group.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() -> Result<()> {
    init_logger();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let group = EventLoopGroup::new(1)?;
    let client = client(&group);

    let req = http::Request::get(format!("http://{addr}/")).body(Bytes::new())?;
    let err = client.call(req).await.expect_err("nothing listens");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.is_retryable());

    group.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_concurrent_calls() -> Result<()> {
    init_logger();
    let replies = (0..4)
        .map(|_| Reply::new("HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok"))
        .collect();
    let peer = Peer::serve(replies).await;
    let group = EventLoopGroup::new(2)?;
    let client = client(&group);

    let pending = (0..4)
        .map(|i| -> Result<_> {
            let req = http::Request::get(peer.url(&format!("/object-{i}"))).body(Bytes::new())?;
            Ok(client.execute(req)?)
        })
        .collect::<Result<Vec<_>>>()?;

    for p in pending {
        assert_eq!(p.await?.body(), b"ok");
    }

    group.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn test_shutdown_waits_for_in_flight_call() -> Result<()> {
    init_logger();
    let peer = Peer::serve(vec![Reply::new(
        "HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nslow",
    )
    .delayed(Duration::from_millis(200))])
    .await;
    let group = EventLoopGroup::new(1)?;
    let client = client(&group);

    let req = http::Request::get(peer.url("/")).body(Bytes::new())?;
    let pending = client.execute(req)?;

    let (resp, shutdown) = tokio::join!(pending, group.shutdown());
    shutdown?;
    assert_eq!(resp?.body(), b"slow");
    Ok(())
}

#[tokio::test]
async fn test_execute_after_shutdown_fails() -> Result<()> {
    init_logger();
    let group = EventLoopGroup::new(1)?;
    let client = client(&group);
    group.shutdown().await?;

    let req = http::Request::get("http://127.0.0.1:1/").body(Bytes::new())?;
    let err = client.execute(req).expect_err("group is shut down");
    assert_eq!(err.kind(), ErrorKind::Transport);
    Ok(())
}
