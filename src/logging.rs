// File logging. Everything written with eprintln! also lands in a
// timestamped file under the app data directory:
//   <data_dir>/com.quirky.inspiration/logs/inspiration-2026-10-18_09-12-00.log
//
// One file per launch; older files beyond the configured count are removed.

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::io::FromRawFd;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::SystemTime;

const LOG_PREFIX: &str = "inspiration-";

static INIT: Once = Once::new();

/// Initialize file logging. Call once at startup, before other output.
///
/// stderr is redirected into a pipe; a tee thread copies each line to the
/// original stderr and, timestamped, to the log file.
pub fn init(logs_dir: &Path, keep: usize) {
    INIT.call_once(|| {
        if let Err(e) = setup_logging(logs_dir, keep) {
            eprintln!("Warning: Failed to initialize file logging: {}", e);
        }
    });
}

fn setup_logging(logs_dir: &Path, keep: usize) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(logs_dir)?;

    // Make room for the file we are about to create
    rotate_logs(logs_dir, keep.saturating_sub(1))?;

    let log_file_path = logs_dir.join(log_file_name(chrono::Local::now()));
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)?;

    eprintln!("Logging: Writing to {}", log_file_path.display());

    let (read_file, original_stderr) = redirect_stderr()?;
    std::thread::spawn(move || tee_lines(read_file, original_stderr, log_file));

    Ok(())
}

fn log_file_name(now: chrono::DateTime<chrono::Local>) -> String {
    format!("{}{}.log", LOG_PREFIX, now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Point fd 2 at a new pipe. Returns the pipe's read end and a handle to
/// the original stderr.
fn redirect_stderr() -> Result<(fs::File, fs::File), Box<dyn std::error::Error>> {
    let mut pipe_fds = [0i32; 2];
    if unsafe { libc::pipe(pipe_fds.as_mut_ptr()) } != 0 {
        return Err("Failed to create pipe".into());
    }
    let read_fd = pipe_fds[0];
    let write_fd = pipe_fds[1];

    let original_stderr_fd = unsafe { libc::dup(2) };
    if original_stderr_fd < 0 {
        return Err("Failed to dup stderr".into());
    }

    if unsafe { libc::dup2(write_fd, 2) } < 0 {
        return Err("Failed to redirect stderr".into());
    }
    unsafe { libc::close(write_fd) };

    let read_file = unsafe { fs::File::from_raw_fd(read_fd) };
    let original_stderr = unsafe { fs::File::from_raw_fd(original_stderr_fd) };
    Ok((read_file, original_stderr))
}

fn tee_lines(source: impl io::Read, mut terminal: impl Write, mut log: impl Write) {
    let reader = BufReader::new(source);
    for line in reader.lines() {
        let Ok(line) = line else { break };
        let _ = writeln!(terminal, "{}", line);
        let ts = chrono::Local::now().format("%H:%M:%S%.3f");
        let _ = writeln!(log, "[{}] {}", ts, line);
        let _ = log.flush();
    }
}

/// Delete old log files, keeping the most recent `keep` files.
fn rotate_logs(logs_dir: &Path, keep: usize) -> Result<(), io::Error> {
    let mut log_files: Vec<(PathBuf, SystemTime)> = Vec::new();

    for entry in fs::read_dir(logs_dir)? {
        let entry = entry?;
        let path = entry.path();
        if is_log_file(&path) {
            if let Ok(metadata) = entry.metadata() {
                let modified = metadata.modified().unwrap_or(std::time::UNIX_EPOCH);
                log_files.push((path, modified));
            }
        }
    }

    // Newest first; equal mtimes fall back to the name, which embeds the timestamp
    log_files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    for (path, _) in log_files.iter().skip(keep) {
        eprintln!("Logging: Removing old log {}", path.display());
        let _ = fs::remove_file(path);
    }

    Ok(())
}

fn is_log_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("log")
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.starts_with(LOG_PREFIX))
            .unwrap_or(false)
}

/// Get the logs directory path.
pub fn logs_dir() -> Option<PathBuf> {
    crate::app_data_dir().map(|d| d.join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_rotate_keeps_newest_matching_files() {
        let dir = TempDir::new().unwrap();
        for day in 1..=4 {
            touch(dir.path(), &format!("inspiration-2026-10-0{}_09-00-00.log", day));
        }
        touch(dir.path(), "other-2026-10-01_09-00-00.log");
        touch(dir.path(), "inspiration-notes.txt");

        rotate_logs(dir.path(), 2).unwrap();

        let mut remaining: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();

        assert_eq!(
            remaining,
            vec![
                "inspiration-2026-10-03_09-00-00.log",
                "inspiration-2026-10-04_09-00-00.log",
                "inspiration-notes.txt",
                "other-2026-10-01_09-00-00.log",
            ]
        );
    }

    #[test]
    fn test_log_file_name_format() {
        let now = chrono::Local.with_ymd_and_hms(2026, 10, 18, 9, 5, 7).unwrap();
        assert_eq!(log_file_name(now), "inspiration-2026-10-18_09-05-07.log");
    }

    #[test]
    fn test_tee_writes_both_sinks() {
        let mut terminal = Vec::new();
        let mut log = Vec::new();
        tee_lines(&b"first\nsecond\n"[..], &mut terminal, &mut log);

        assert_eq!(String::from_utf8(terminal).unwrap(), "first\nsecond\n");
        let log = String::from_utf8(log).unwrap();
        assert_eq!(log.lines().count(), 2);
        assert!(log.lines().all(|l| l.starts_with('[')));
        assert!(log.ends_with("] second\n"));
    }
}
