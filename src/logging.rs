use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

const MAX_LOG_BYTES: u64 = 2 * 1024 * 1024;

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Writes every record to stderr and mirrors it into the log file.
struct TeeWriter {
    file: Mutex<File>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Ok(mut file) = self.file.lock() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Ok(mut file) = self.file.lock() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Initialise `env_logger`. Falls back to stderr-only when the log file
/// cannot be opened. Safe to call more than once.
pub fn init(data_dir: &Path) {
    let env = env_logger::Env::default().default_filter_or("assetdesk_lib=info");
    let mut builder = env_logger::Builder::from_env(env);
    builder.format_timestamp_millis();

    match open_log_file(data_dir) {
        Ok((file, path)) => {
            builder.target(env_logger::Target::Pipe(Box::new(TeeWriter {
                file: Mutex::new(file),
            })));
            let _ = LOG_PATH.set(path);
        }
        Err(e) => eprintln!("[assetdesk] Could not open log file: {}", e),
    }

    if builder.try_init().is_err() {
        return;
    }

    log::info!("=== assetdesk v{} started ===", env!("CARGO_PKG_VERSION"));
    log::info!("OS: {} / {}", std::env::consts::OS, std::env::consts::ARCH);
    if let Some(path) = log_path() {
        log::info!("Log file: {}", path);
    }
}

pub fn log_path() -> Option<String> {
    LOG_PATH.get().map(|p| p.display().to_string())
}

fn open_log_file(data_dir: &Path) -> io::Result<(File, PathBuf)> {
    std::fs::create_dir_all(data_dir)?;
    let log_path = data_dir.join("assetdesk.log");

    // Rotate: if file is > 2MB, rename to .old and start fresh
    if let Ok(meta) = std::fs::metadata(&log_path) {
        if meta.len() > MAX_LOG_BYTES {
            let _ = std::fs::rename(&log_path, data_dir.join("assetdesk.old.log"));
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    Ok((file, log_path))
}
