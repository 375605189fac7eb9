use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{Datelike, Timelike};
use common::DateTime;
use log::{debug, error, info, warn};
use nmea::Nmea;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

#[cfg(feature = "pi")]
pub mod uart;

/// NMEA 0183 caps sentences at 82 characters
pub const MAX_SENTENCE_LEN: usize = 128;

/// Feeds navigation module bytes into the NMEA parser and keeps the latest
/// fix date and time.
pub struct GpsReceiver {
    parser: Nmea,
    line: String,
    overflowed: bool,
    sentences: usize,
}

impl Default for GpsReceiver {
    fn default() -> Self {
        Self {
            parser: Nmea::default(),
            line: String::with_capacity(MAX_SENTENCE_LEN),
            overflowed: false,
            sentences: 0,
        }
    }
}

impl GpsReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.encode(byte);
        }
    }

    /// Push a single byte, parsing the buffered sentence at end of line
    pub fn encode(&mut self, byte: u8) {
        match byte {
            b'\n' => {
                if !self.overflowed && !self.line.is_empty() {
                    self.parse_line();
                }
                self.line.clear();
                self.overflowed = false;
            }
            b'\r' => {}
            byte if byte.is_ascii() && !self.overflowed => {
                if self.line.len() < MAX_SENTENCE_LEN {
                    self.line.push(byte as char);
                } else {
                    debug!("GPS: dropping overlong sentence");
                    self.overflowed = true;
                }
            }
            _ => self.overflowed = true,
        }
    }

    fn parse_line(&mut self) {
        match self.parser.parse(&self.line) {
            Ok(sentence) => {
                self.sentences += 1;
                debug!("GPS: parsed {:?}", sentence);
            }
            Err(e) => debug!("GPS: ignoring {:?}: {:?}", self.line, e),
        }
    }

    /// Sentences accepted by the parser so far
    pub fn sentences(&self) -> usize {
        self.sentences
    }

    /// Latest UTC date and time, once the module has reported both
    pub fn utc(&self) -> Option<DateTime> {
        let date = self.parser.fix_date?;
        let time = self.parser.fix_time?;

        Some(DateTime {
            year: date.year(),
            month: date.month() as i32,
            day: date.day() as i32,
            hour: time.hour() as i32,
            minute: time.minute() as i32,
            second: time.second() as i32,
        })
    }
}

/// Non-blocking byte source for the navigation module
pub trait GpsSource {
    /// Append whatever is buffered right now to `buf` without waiting.
    /// Returns the number of bytes appended.
    fn read_available(&mut self, buf: &mut Vec<u8>) -> io::Result<usize>;
}

impl<T: GpsSource + ?Sized> GpsSource for Box<T> {
    fn read_available(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        (**self).read_available(buf)
    }
}

/// Bytes pushed by a background reader task
pub struct ChannelGpsSource {
    rx: mpsc::Receiver<Vec<u8>>,
    closed: bool,
}

impl ChannelGpsSource {
    pub fn new(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self { rx, closed: false }
    }

    /// Play back a file of NMEA sentences, one line every `line_delay`.
    /// With `repeat` the file starts over at the end.
    pub fn replay(path: PathBuf, line_delay: Duration, repeat: bool) -> Self {
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            loop {
                if let Err(e) = replay_file(&path, line_delay, &tx).await {
                    error!("GPS: replay of {} failed: {}", path.display(), e);
                    break;
                }
                if !repeat || tx.is_closed() {
                    break;
                }
                debug!("GPS: restarting replay of {}", path.display());
            }
        });

        Self::new(rx)
    }

    /// Stream raw bytes from a device or pipe as they arrive
    pub fn stream(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            if let Err(e) = stream_device(&path, &tx).await {
                error!("GPS: reading {} failed: {}", path.display(), e);
            }
        });

        Self::new(rx)
    }
}

impl GpsSource for ChannelGpsSource {
    fn read_available(&mut self, buf: &mut Vec<u8>) -> io::Result<usize> {
        let start = buf.len();
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => buf.extend_from_slice(&chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.closed {
                        warn!("GPS: source closed");
                        self.closed = true;
                    }
                    break;
                }
            }
        }
        Ok(buf.len() - start)
    }
}

async fn replay_file(
    path: &Path,
    line_delay: Duration,
    tx: &mpsc::Sender<Vec<u8>>,
) -> io::Result<()> {
    let file = tokio::fs::File::open(path).await?;
    let mut lines = BufReader::new(file).lines();
    info!("GPS: replaying {}", path.display());

    while let Some(line) = lines.next_line().await? {
        let mut chunk = line.into_bytes();
        chunk.extend_from_slice(b"\r\n");
        if tx.send(chunk).await.is_err() {
            return Ok(());
        }
        tokio::time::sleep(line_delay).await;
    }

    Ok(())
}

async fn stream_device(path: &Path, tx: &mpsc::Sender<Vec<u8>>) -> io::Result<()> {
    let mut file = tokio::fs::File::open(path).await?;
    info!("GPS: reading {}", path.display());

    let mut buf = [0u8; 256];
    loop {
        let read = file.read(&mut buf).await?;
        if read == 0 {
            return Ok(());
        }
        if tx.send(buf[..read].to_vec()).await.is_err() {
            return Ok(());
        }
    }
}
