#![cfg(unix)]

use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::rc::Rc;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use http::StatusCode;
use tunnelkit_client::{HttpTunneler, PollReactor, TunneledTransport};

const DEADLINE: Duration = Duration::from_secs(10);

/// One-shot proxy: reads a request head, sends `reply`, then closes.
fn spawn_proxy(reply: &'static [u8]) -> (TcpStream, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept client");
        let mut request = Vec::new();
        let mut buf = [0u8; 256];
        while !request.ends_with(b"\r\n\r\n") {
            let n = stream.read(&mut buf).expect("read request");
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        if !reply.is_empty() {
            stream.write_all(reply).expect("write reply");
        }
        request
    });

    let client = TcpStream::connect(addr).expect("connect to proxy");
    client.set_nonblocking(true).expect("non-blocking client");
    (client, handle)
}

fn read_until(transport: &mut TunneledTransport<Rc<TcpStream>>, len: usize) -> Vec<u8> {
    let mut received = Vec::new();
    let mut buf = [0u8; 64];
    for _ in 0..500 {
        match transport.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => received.extend_from_slice(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => panic!("unexpected read error: {e}"),
        }
        if received.len() >= len {
            break;
        }
    }
    received
}

#[test]
fn test_tunnel_through_loopback_proxy() {
    let (client, proxy) = spawn_proxy(b"HTTP/1.1 200 Connection established\r\n\r\nhello");
    let reactor = Rc::new(PollReactor::new().expect("create poller"));
    let tunneler = HttpTunneler::new(Rc::clone(&reactor));

    let future = tunneler.tunnel(Rc::new(client), "origin.test:443");
    let mut transport = reactor
        .run(future, Some(DEADLINE))
        .expect("reactor turns until settled")
        .expect("proxy accepted the tunnel");

    assert_eq!(
        proxy.join().expect("proxy thread"),
        b"CONNECT origin.test:443 HTTP/1.1\r\n\r\n"
    );
    assert_eq!(transport.authority(), "origin.test:443");
    assert_eq!(read_until(&mut transport, 5), b"hello");
    assert_eq!(reactor.outstanding(), 0);
}

#[test]
fn test_proxy_refusal_over_loopback() {
    let (client, proxy) =
        spawn_proxy(b"HTTP/1.1 407 Proxy Authentication Required\r\nContent-Length: 0\r\n\r\n");
    let reactor = Rc::new(PollReactor::new().expect("create poller"));
    let tunneler = HttpTunneler::new(Rc::clone(&reactor));

    let future = tunneler.tunnel(Rc::new(client), "origin.test:443");
    let err = reactor
        .block_on(future, Some(DEADLINE))
        .expect("reactor turns until settled")
        .expect_err("407 is not a tunnel");

    assert_eq!(err.status(), Some(StatusCode::PROXY_AUTHENTICATION_REQUIRED));
    assert_eq!(reactor.outstanding(), 0);
    proxy.join().expect("proxy thread");
}

#[test]
fn test_proxy_hanging_up_over_loopback() {
    let (client, proxy) = spawn_proxy(b"");
    let reactor = Rc::new(PollReactor::new().expect("create poller"));
    let tunneler = HttpTunneler::new(Rc::clone(&reactor));

    let future = tunneler.tunnel(Rc::new(client), "origin.test:443");
    let err = reactor
        .block_on(future, Some(DEADLINE))
        .expect("reactor turns until settled")
        .expect_err("proxy closed the connection");

    assert!(err.is_read_phase());
    assert_eq!(reactor.outstanding(), 0);
    proxy.join().expect("proxy thread");
}

#[test]
fn test_deadline_aborts_a_silent_proxy() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let (release, held) = mpsc::channel::<()>();
    let proxy = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept client");
        // keep the connection open without answering
        held.recv().ok();
        drop(stream);
    });

    let client = TcpStream::connect(addr).expect("connect to proxy");
    client.set_nonblocking(true).expect("non-blocking client");
    let socket = Rc::new(client);

    let reactor = Rc::new(PollReactor::new().expect("create poller"));
    let tunneler = HttpTunneler::new(Rc::clone(&reactor));
    let future = tunneler.tunnel(Rc::clone(&socket), "origin.test:443");

    let err = reactor
        .run(future, Some(Duration::from_millis(100)))
        .expect_err("the proxy never answers");
    assert_eq!(err.kind(), io::ErrorKind::TimedOut);

    assert_eq!(reactor.outstanding(), 0);
    assert_eq!(Rc::strong_count(&socket), 1);
    assert_eq!(tunneler.stats().snapshot().aborted, 1);

    release.send(()).expect("proxy thread is waiting");
    proxy.join().expect("proxy thread");
}
