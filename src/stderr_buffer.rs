use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Activate buffering. While active, log lines are stored instead of being
/// printed to stderr, so they cannot corrupt the TUI.
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

/// Write a message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn emit(msg: String) {
    let mut guard = buffer();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// Per-event writer handed to the log subscriber. Collects one formatted
/// record and emits it through the buffer when dropped.
#[derive(Debug, Default)]
pub struct BufferedStderr {
    pending: Vec<u8>,
}

impl Write for BufferedStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for BufferedStderr {
    fn drop(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let msg = String::from_utf8_lossy(&self.pending).trim_end().to_string();
        emit(msg);
    }
}

/// `MakeWriter` entry point for `tracing_subscriber::fmt`
pub fn writer() -> BufferedStderr {
    BufferedStderr::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the buffer is process-global
    #[test]
    fn test_buffer_collects_while_active() {
        activate();
        emit("first".to_string());
        {
            let mut w = writer();
            writeln!(w, "second line").unwrap();
        }
        let drained = drain();
        assert_eq!(drained, vec!["first".to_string(), "second line".to_string()]);
        assert!(drain().is_empty());
    }
}
