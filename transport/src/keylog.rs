use rustls::KeyLog;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

pub const KEYLOG_ENV: &str = "SSLKEYLOGFILE";

/// Writes TLS secrets in NSS key log format so captures can be decrypted in
/// Wireshark. Build one per process and share it between connectors.
pub struct KeyLogSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl KeyLogSink {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    pub fn open(path: &Path) -> io::Result<Self> {
        let mut options = OpenOptions::new();
        options.append(true).create(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let file = options.open(path)?;
        info!(path = %path.display(), "enabled keylog");
        Ok(Self::new(file))
    }

    /// Opens the file named by `SSLKEYLOGFILE`, if set.
    pub fn from_env() -> io::Result<Option<Self>> {
        match std::env::var_os(KEYLOG_ENV) {
            Some(path) if !path.is_empty() => Self::open(Path::new(&path)).map(Some),
            _ => Ok(None),
        }
    }
}

impl fmt::Debug for KeyLogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyLogSink").finish_non_exhaustive()
    }
}

impl KeyLog for KeyLogSink {
    fn log(&self, label: &str, client_random: &[u8], secret: &[u8]) {
        let line = format!("{} {} {}\n", label, hex(client_random), hex(secret));

        let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = writer.write_all(line.as_bytes()).and_then(|_| writer.flush()) {
            warn!("keylog write failed: {}", e);
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    use fmt::Write as _;

    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{:02x}", b);
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn nss_line_format() {
        let out = Shared::default();
        let sink = KeyLogSink::new(out.clone());

        sink.log("CLIENT_RANDOM", &[0x01, 0xab], &[0x00, 0xff, 0x10]);
        sink.log("EXPORTER_SECRET", &[0x02], &[0x03]);

        let written = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert_eq!(
            written,
            "CLIENT_RANDOM 01ab 00ff10\nEXPORTER_SECRET 02 03\n"
        );
    }

    #[test]
    fn appends_to_file() {
        let path = std::env::temp_dir().join(format!("keylog-{}.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);

        KeyLogSink::open(&path).unwrap().log("A", &[1], &[2]);
        KeyLogSink::open(&path).unwrap().log("B", &[3], &[4]);

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(contents, "A 01 02\nB 03 04\n");
    }

    #[test]
    fn from_env_follows_variable() {
        let path = std::env::temp_dir().join(format!("keylog-env-{}.txt", std::process::id()));
        let _ = std::fs::remove_file(&path);

        std::env::set_var(KEYLOG_ENV, &path);
        let sink = KeyLogSink::from_env().unwrap();
        assert!(sink.is_some());
        sink.unwrap().log("CLIENT_RANDOM", &[0xaa], &[0xbb]);

        std::env::set_var(KEYLOG_ENV, "");
        assert!(KeyLogSink::from_env().unwrap().is_none());

        std::env::remove_var(KEYLOG_ENV);
        assert!(KeyLogSink::from_env().unwrap().is_none());

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(contents, "CLIENT_RANDOM aa bb\n");
    }
}
