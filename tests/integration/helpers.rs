//! Shared fixtures: a Messages-shaped SQLite file, a one-shot HTTP stub and
//! a binary runner.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use assert_cmd::Command;
use chrono::{Duration, Utc};
use imsg::TimestampCodec;
use rusqlite::Connection;
use tempfile::TempDir;

/// One message row for [`chat_db`].
pub struct Row<'a> {
    pub text: Option<&'a str>,
    pub minutes_ago: i64,
    pub from_me: bool,
    pub handle: Option<&'a str>,
}

pub fn row<'a>(text: &'a str, minutes_ago: i64, from_me: bool, handle: Option<&'a str>) -> Row<'a> {
    Row {
        text: Some(text),
        minutes_ago,
        from_me,
        handle,
    }
}

/// Create `chat.db` in `dir` with the `message` and `handle` tables.
///
/// Dates are encoded relative to now with the local-time codec, matching
/// what the binary uses.
pub fn chat_db(dir: &TempDir, rows: &[Row<'_>]) -> PathBuf {
    let path = dir.path().join("chat.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE handle (ROWID INTEGER PRIMARY KEY, id TEXT);
         CREATE TABLE message (
             ROWID INTEGER PRIMARY KEY,
             text TEXT,
             date INTEGER,
             is_from_me INTEGER,
             handle_id INTEGER
         );",
    )
    .unwrap();

    let codec = TimestampCodec::default();
    let now = Utc::now();
    let mut handles: Vec<&str> = Vec::new();

    for r in rows {
        let handle_id = match r.handle {
            Some(id) => match handles.iter().position(|h| *h == id) {
                Some(pos) => pos as i64 + 1,
                None => {
                    handles.push(id);
                    conn.execute(
                        "INSERT INTO handle (ROWID, id) VALUES (?1, ?2)",
                        rusqlite::params![handles.len() as i64, id],
                    )
                    .unwrap();
                    handles.len() as i64
                }
            },
            None => 0,
        };
        let date = codec.to_native(now - Duration::minutes(r.minutes_ago));
        conn.execute(
            "INSERT INTO message (text, date, is_from_me, handle_id) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![r.text, date, r.from_me as i64, handle_id],
        )
        .unwrap();
    }
    path
}

/// A fixture with two contacts and a few recent messages.
pub fn small_chat_db(dir: &TempDir) -> PathBuf {
    chat_db(
        dir,
        &[
            row("are we still on for friday?", 300, false, Some("+15550001111")),
            row("yes, 7pm", 290, true, Some("+15550001111")),
            row("happy birthday!!", 120, false, Some("friend@example.com")),
            row("thank you :)", 110, true, Some("friend@example.com")),
            row("see you there", 60, false, Some("+15550001111")),
        ],
    )
}

/// Command for the `imsg` binary with colors off and an isolated config.
pub fn imsg_cmd(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("imsg").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("IMSG_LOG")
        .arg("--config")
        .arg(config_dir.join("config.toml"));
    cmd
}

/// Captured request seen by [`serve_once`].
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

/// Serve a single HTTP response on an ephemeral port.
///
/// Returns the base URL and a receiver yielding the request that was served.
pub fn serve_once(status: u16, body: &str) -> (String, Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);

        let mut head = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            let lower = line.to_ascii_lowercase();
            if let Some(value) = lower.strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap();
            }
            head.push_str(&line);
        }

        let mut request_body = vec![0u8; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let response = format!(
            "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        let _ = tx.send(CapturedRequest {
            head,
            body: String::from_utf8_lossy(&request_body).into_owned(),
        });
    });

    (format!("http://{}", addr), rx)
}
