//! Animated single-line status indicator.
//!
//! The reporter runs on its own thread and is fed through an ordered channel,
//! so a stop request is always handled after every message sent before it.
//! Dropping a reporter stops it as well, which keeps error paths from leaving
//! the animation running.

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::io::{self, Stdout, Write};
use std::thread::JoinHandle;
use std::time::Duration;

const GLYPHS: [char; 4] = ['|', '/', '-', '\\'];
const INITIAL_MESSAGE: &str = "Loading";

/// Glyph plus the space that follows it.
const GLYPH_WIDTH: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Message(String),
    Stop,
}

pub struct ProgressReporter<W: Write + Send + 'static> {
    sender: Sender<ProgressEvent>,
    handle: Option<JoinHandle<io::Result<W>>>,
}

impl ProgressReporter<Stdout> {
    pub fn stdout(interval: Duration) -> Self {
        Self::start(io::stdout(), interval)
    }
}

impl<W: Write + Send + 'static> ProgressReporter<W> {
    pub fn start(writer: W, interval: Duration) -> Self {
        let (sender, receiver) = unbounded();
        let handle = std::thread::spawn(move || spin(writer, receiver, interval));

        Self {
            sender,
            handle: Some(handle),
        }
    }

    /// Replaces the displayed status. Never blocks.
    pub fn set_message<S: Into<String>>(&self, message: S) {
        // A reporter whose thread has already exited has nothing left to draw.
        let _ = self.sender.send(ProgressEvent::Message(message.into()));
    }

    /// Stops the animation, erases the line and hands back the writer.
    pub fn finish(mut self) -> io::Result<W> {
        let _ = self.sender.send(ProgressEvent::Stop);
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("progress reporter panicked"))),
            None => Err(io::Error::other("progress reporter already stopped")),
        }
    }
}

impl<W: Write + Send + 'static> Drop for ProgressReporter<W> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.sender.send(ProgressEvent::Stop);
            let _ = handle.join();
        }
    }
}

fn spin<W: Write>(
    mut writer: W,
    receiver: Receiver<ProgressEvent>,
    interval: Duration,
) -> io::Result<W> {
    let mut message = INITIAL_MESSAGE.to_string();
    let mut max_len = message.len();
    let mut frame = 0usize;

    loop {
        draw(&mut writer, GLYPHS[frame % GLYPHS.len()], &message, max_len)?;

        match receiver.recv_timeout(interval) {
            Ok(ProgressEvent::Message(next)) => {
                max_len = max_len.max(next.len());
                message = next;
            }
            Ok(ProgressEvent::Stop) | Err(RecvTimeoutError::Disconnected) => {
                clear_line(&mut writer, max_len + GLYPH_WIDTH)?;
                return Ok(writer);
            }
            Err(RecvTimeoutError::Timeout) => frame += 1,
        }
    }
}

fn draw<W: Write>(writer: &mut W, glyph: char, message: &str, max_len: usize) -> io::Result<()> {
    let blank = " ".repeat(max_len + GLYPH_WIDTH);
    write!(writer, "\r{blank}\r{glyph} {message}")?;
    writer.flush()
}

fn clear_line<W: Write>(writer: &mut W, width: usize) -> io::Result<()> {
    write!(writer, "\r{}\r", " ".repeat(width))?;
    writer.flush()
}
