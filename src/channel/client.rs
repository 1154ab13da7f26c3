// Copyright 2026 CPU Guard Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::{Read, Write};

use super::{ChannelError, Command, RESULT_LEN};

/// Sends `command` and blocks until the companion answers.
///
/// The stream is expected to carry its own read/write timeouts.
pub fn request<S>(stream: &mut S, command: Command) -> Result<i32, ChannelError>
where
    S: Read + Write,
{
    stream
        .write_all(command.wire_name().as_bytes())
        .and_then(|()| stream.flush())
        .map_err(ChannelError::Write)?;

    let mut buf = [0u8; RESULT_LEN];
    stream.read_exact(&mut buf).map_err(ChannelError::Read)?;

    Ok(i32::from_ne_bytes(buf))
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use super::*;

    struct Duplex {
        reply: Cursor<Vec<u8>>,
        sent: Vec<u8>,
    }

    impl Read for Duplex {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reply.read(buf)
        }
    }

    impl Write for Duplex {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.sent.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sends_name_and_reads_result() {
        let mut stream = Duplex {
            reply: Cursor::new(libc::EBUSY.to_ne_bytes().to_vec()),
            sent: Vec::new(),
        };

        let result = request(&mut stream, Command::SuppressSubstitution).expect("request");

        assert_eq!(stream.sent, b"unmount_spoof");
        assert_eq!(result, libc::EBUSY);
    }

    #[test]
    fn short_reply_is_a_read_error() {
        let mut stream = Duplex {
            reply: Cursor::new(vec![0, 0]),
            sent: Vec::new(),
        };

        let err = request(&mut stream, Command::ActivateSubstitution).unwrap_err();
        assert!(matches!(err, ChannelError::Read(_)));
    }
}
