mod common;

use std::error::Error as _;
use std::io;
use std::rc::Rc;

use futures::FutureExt;
use tunnelkit_client::{HttpTunneler, ManualReactor, Readiness};

use common::{AUTHORITY, REQUEST, ScriptedTransport, WriteStep};

fn setup() -> (Rc<ManualReactor>, HttpTunneler<ManualReactor>, Rc<ScriptedTransport>) {
    let reactor = Rc::new(ManualReactor::new());
    let tunneler = HttpTunneler::new(Rc::clone(&reactor));
    (reactor, tunneler, Rc::new(ScriptedTransport::new()))
}

#[test]
fn test_full_write_moves_straight_to_reading() {
    let (reactor, tunneler, socket) = setup();

    let mut future = tunneler.tunnel(Rc::clone(&socket), AUTHORITY);

    assert_eq!(socket.written(), REQUEST);
    assert_eq!(socket.offered(), vec![REQUEST.len()]);
    assert_eq!(reactor.registrations(Readiness::Writable), 0);
    assert_eq!(reactor.live(Readiness::Readable).len(), 1);
    assert!((&mut future).now_or_never().is_none());
}

#[test]
fn test_short_write_retries_with_the_remainder() {
    let (reactor, tunneler, socket) = setup();
    socket.on_write(WriteStep::Accept(10));

    let mut future = tunneler.tunnel(Rc::clone(&socket), AUTHORITY);

    assert_eq!(socket.written(), &REQUEST[..10]);
    assert_eq!(reactor.live(Readiness::Writable).len(), 1);
    assert!(reactor.live(Readiness::Readable).is_empty());

    assert_eq!(reactor.fire_writable(), 1);

    assert_eq!(socket.offered(), vec![REQUEST.len(), REQUEST.len() - 10]);
    assert_eq!(socket.written(), REQUEST);
    assert!(reactor.live(Readiness::Writable).is_empty());
    assert_eq!(reactor.live(Readiness::Readable).len(), 1);
    assert!((&mut future).now_or_never().is_none());
}

#[test]
fn test_repeated_short_writes_keep_a_single_watcher() {
    let (reactor, tunneler, socket) = setup();
    socket
        .on_write(WriteStep::Accept(5))
        .on_write(WriteStep::Accept(5))
        .on_write(WriteStep::WouldBlock)
        .on_write(WriteStep::Accept(3));

    let _future = tunneler.tunnel(Rc::clone(&socket), AUTHORITY);

    for _ in 0..3 {
        assert_eq!(reactor.live(Readiness::Writable).len(), 1);
        reactor.fire_writable();
    }

    // 5, 5, would-block, 3
    assert_eq!(socket.written(), &REQUEST[..13]);
    assert_eq!(
        socket.offered(),
        vec![
            REQUEST.len(),
            REQUEST.len() - 5,
            REQUEST.len() - 10,
            REQUEST.len() - 10,
        ]
    );

    reactor.fire_writable();
    assert_eq!(socket.written(), REQUEST);
    assert_eq!(socket.offered().last(), Some(&(REQUEST.len() - 13)));
    assert_eq!(reactor.registrations(Readiness::Writable), 1);
    assert_eq!(reactor.live(Readiness::Readable).len(), 1);
}

#[test]
fn test_interrupted_write_is_retried_in_the_same_call() {
    let (reactor, tunneler, socket) = setup();
    socket
        .on_write(WriteStep::Interrupted)
        .on_write(WriteStep::Interrupted);

    let mut future = tunneler.tunnel(Rc::clone(&socket), AUTHORITY);

    assert_eq!(socket.written(), REQUEST);
    assert_eq!(socket.offered(), vec![REQUEST.len(); 3]);
    assert_eq!(reactor.registrations(Readiness::Writable), 0);
    assert_eq!(reactor.live(Readiness::Readable).len(), 1);
    assert!((&mut future).now_or_never().is_none());
}

#[test]
fn test_would_block_waits_indefinitely() {
    let (reactor, tunneler, socket) = setup();
    for _ in 0..4 {
        socket.on_write(WriteStep::WouldBlock);
    }

    let mut future = tunneler.tunnel(Rc::clone(&socket), AUTHORITY);
    for _ in 0..3 {
        assert_eq!(reactor.fire_writable(), 1);
        assert!((&mut future).now_or_never().is_none());
    }

    assert!(socket.written().is_empty());
    assert_eq!(reactor.outstanding(), 1);
    assert_eq!(reactor.registrations(Readiness::Writable), 1);
}

#[test]
fn test_dead_socket_fails_before_any_read_is_armed() {
    let (reactor, tunneler, socket) = setup();
    socket.kill();

    let future = tunneler.tunnel(Rc::clone(&socket), AUTHORITY);

    let err = future
        .now_or_never()
        .expect("a dead socket settles synchronously")
        .expect_err("nothing can be tunneled over a dead socket");
    assert!(err.is_write_phase());
    assert_eq!(err.authority(), Some(AUTHORITY));
    assert_eq!(
        err.to_string(),
        "proxy CONNECT failed: socket went away while writing tunneling request"
    );
    assert_eq!(reactor.registrations(Readiness::Readable), 0);
    assert_eq!(reactor.outstanding(), 0);
}

#[test]
fn test_socket_dying_mid_write_cancels_the_watcher() {
    let (reactor, tunneler, socket) = setup();
    socket
        .on_write(WriteStep::Accept(10))
        .on_write(WriteStep::Fail(io::ErrorKind::ConnectionReset));

    let mut future = tunneler.tunnel(Rc::clone(&socket), AUTHORITY);
    assert!((&mut future).now_or_never().is_none());

    reactor.fire_writable();

    let err = future
        .now_or_never()
        .expect("failure settles the future")
        .expect_err("socket died");
    assert!(err.is_write_phase());
    let cause = err
        .source()
        .and_then(|source| source.downcast_ref::<io::Error>())
        .expect("the write error is kept as the cause");
    assert_eq!(cause.kind(), io::ErrorKind::ConnectionReset);

    assert_eq!(reactor.outstanding(), 0);
    assert_eq!(reactor.cancellations(), 1);
    assert_eq!(reactor.registrations(Readiness::Readable), 0);
    assert_eq!(tunneler.stats().snapshot().died_writing, 1);
}

#[test]
fn test_refused_registration_fails_the_attempt() {
    let (reactor, tunneler, socket) = setup();
    socket.on_write(WriteStep::Accept(10));
    reactor.refuse_next_registration(io::ErrorKind::OutOfMemory);

    let future = tunneler.tunnel(Rc::clone(&socket), AUTHORITY);

    let err = future
        .now_or_never()
        .expect("failed registration settles the future")
        .expect_err("the write could never resume");
    assert!(err.is_write_phase());
    assert!(err.source().is_some());
    assert_eq!(reactor.outstanding(), 0);
}
