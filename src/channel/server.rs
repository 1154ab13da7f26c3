// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::{self, Read, Write};

use super::{MAX_COMMAND_LEN, Request};

/// Reads one request, hands it to `handler` and writes back its result.
///
/// Returns `Ok(None)` when the peer closed without sending anything; no reply
/// is written in that case.
pub fn serve_connection<S, H>(stream: &mut S, handler: H) -> io::Result<Option<(Request, i32)>>
where
    S: Read + Write,
    H: FnOnce(&Request) -> i32,
{
    // One read is the whole request. Clients send the name in a single write
    // and never half-close, so a name split across reads is unrecognized.
    let mut buf = [0u8; MAX_COMMAND_LEN];
    let len = stream.read(&mut buf)?;
    if len == 0 {
        return Ok(None);
    }

    let request = Request::decode(&buf[..len]);
    let result = handler(&request);

    stream.write_all(&result.to_ne_bytes())?;
    stream.flush()?;

    Ok(Some((request, result)))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::channel::{Command, code};

    /// Each chunk arrives as a separate read, as if written separately.
    struct Duplex {
        chunks: VecDeque<Vec<u8>>,
        reply: Vec<u8>,
    }

    impl Duplex {
        fn new(incoming: &[u8]) -> Self {
            Self::chunked(&[incoming])
        }

        fn chunked(chunks: &[&[u8]]) -> Self {
            Self {
                chunks: chunks.iter().map(|c| c.to_vec()).collect(),
                reply: Vec::new(),
            }
        }
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some(chunk) = self.chunks.front_mut() else {
                return Ok(0);
            };
            let len = chunk.len().min(buf.len());
            buf[..len].copy_from_slice(&chunk[..len]);
            *chunk = chunk.split_off(len);
            if chunk.is_empty() {
                self.chunks.pop_front();
            }
            Ok(len)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.reply.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn answers_known_command() {
        let mut stream = Duplex::new(b"mount_spoof");

        let served = serve_connection(&mut stream, |request| {
            assert_eq!(request, &Request::Known(Command::ActivateSubstitution));
            code::SUCCESS
        })
        .expect("serve");

        assert_eq!(
            served,
            Some((Request::Known(Command::ActivateSubstitution), 0))
        );
        assert_eq!(stream.reply, 0i32.to_ne_bytes());
    }

    #[test]
    fn empty_connection_gets_no_reply() {
        let mut stream = Duplex::new(b"");

        let served = serve_connection(&mut stream, |_| panic!("handler must not run"))
            .expect("serve");

        assert_eq!(served, None);
        assert!(stream.reply.is_empty());
    }

    #[test]
    fn oversized_input_is_truncated_and_unrecognized() {
        let long = vec![b'x'; MAX_COMMAND_LEN * 2];
        let mut stream = Duplex::new(&long);

        let served = serve_connection(&mut stream, |request| match request {
            Request::Known(_) => code::SUCCESS,
            Request::Unrecognized(raw) => {
                assert_eq!(raw.len(), MAX_COMMAND_LEN);
                code::FAILURE
            }
        })
        .expect("serve");

        assert_eq!(served.map(|(_, result)| result), Some(code::FAILURE));
        assert_eq!(stream.reply, code::FAILURE.to_ne_bytes());
    }

    #[test]
    fn split_command_is_not_reassembled() {
        let mut stream = Duplex::chunked(&[b"mount_", b"spoof"]);

        let served = serve_connection(&mut stream, |request| match request {
            Request::Known(_) => code::SUCCESS,
            Request::Unrecognized(_) => code::FAILURE,
        })
        .expect("serve");

        assert_eq!(
            served,
            Some((Request::Unrecognized("mount_".to_string()), code::FAILURE))
        );
        assert_eq!(stream.reply, code::FAILURE.to_ne_bytes());
        // the tail is left unread
        assert_eq!(stream.chunks.len(), 1);
    }
}
