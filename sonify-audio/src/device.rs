// Sonify Audio - Device output
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Nonblocking output to device nodes, FIFOs and files.
//!
//! Devices are opened with `O_NONBLOCK`, so a FIFO without a reader fails
//! at open time and a sink that stops draining turns into a timeout
//! instead of a stalled poll loop.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use sonify::PlaybackError;
use tokio::time::Instant;

/// How long one write may wait on a full device
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

const RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// Open `path` for nonblocking writes.
///
/// With `create`, missing files are created and existing ones appended to.
pub fn open_nonblocking(path: &Path, create: bool) -> Result<File, PlaybackError> {
    let mut options = OpenOptions::new();
    options.write(true);
    if create {
        options.create(true).append(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NONBLOCK);
    }
    options
        .open(path)
        .map_err(|e| PlaybackError::Device(format!("{}: {}", path.display(), e)))
}

/// Write all of `buf`, yielding while the sink reports `WouldBlock`.
///
/// Fails with [`PlaybackError::Device`] once `timeout` passes without the
/// sink taking the rest.
pub async fn write_all_within<W: Write + ?Sized>(
    out: &mut W,
    mut buf: &[u8],
    timeout: Duration,
) -> Result<(), PlaybackError> {
    let deadline = Instant::now() + timeout;
    while !buf.is_empty() {
        match out.write(buf) {
            Ok(0) => {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "output closed").into());
            }
            Ok(n) => buf = &buf[n..],
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    return Err(PlaybackError::Device(format!(
                        "output not draining, {} bytes left after {:?}",
                        buf.len(),
                        timeout
                    )));
                }
                tokio::time::sleep(RETRY_INTERVAL).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
    out.flush()?;
    Ok(())
}
