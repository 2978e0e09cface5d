use std::io;

/// Decides whether a TCP peer is gone from a pending socket error and the
/// result of a one-byte non-blocking `peek`.
///
/// A zero-byte peek is end-of-stream. `WouldBlock` and `Interrupted` only say
/// nothing is buffered right now; any other error means the socket is unusable.
pub fn peer_gone(pending: io::Result<Option<io::Error>>, peek: io::Result<usize>) -> bool {
    match pending {
        Ok(None) => {}
        Ok(Some(_)) | Err(_) => return true,
    }

    match peek {
        Ok(0) => true,
        Ok(_) => false,
        Err(e) => !matches!(
            e.kind(),
            io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_error_is_dead() {
        let pending = Ok(Some(io::Error::from(io::ErrorKind::ConnectionReset)));
        assert!(peer_gone(pending, Ok(1)));
    }

    #[test]
    fn test_eof_is_dead() {
        assert!(peer_gone(Ok(None), Ok(0)));
    }

    #[test]
    fn test_would_block_is_alive() {
        let peek = Err(io::Error::from(io::ErrorKind::WouldBlock));
        assert!(!peer_gone(Ok(None), peek));
    }

    #[test]
    fn test_buffered_data_is_alive() {
        assert!(!peer_gone(Ok(None), Ok(1)));
    }

    #[test]
    fn test_not_connected_is_dead() {
        let peek = Err(io::Error::from(io::ErrorKind::NotConnected));
        assert!(peer_gone(Ok(None), peek));
    }
}
