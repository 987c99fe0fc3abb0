//! Rich presence reporting over the Discord local IPC socket.
//!
//! Each frame is a little-endian `u32` opcode, a little-endian `u32` payload length and a
//! UTF-8 JSON payload. The connection is opened lazily on the first update and dropped on
//! any I/O failure so the next update reconnects.

use std::{
    io::{Read, Write},
    sync::Mutex,
};

use serde_json::{json, Value};
use thiserror::Error;

const FRAME_HEADER_LEN: usize = 8;
const MAX_FRAME_LEN: usize = 64 * 1024;
const IPC_PROTOCOL_VERSION: u32 = 1;
const IPC_PIPE_PREFIX: &str = "discord-ipc-";
const IPC_PIPE_COUNT: u32 = 10;

#[derive(Debug, Error)]
pub enum PresenceError {
    #[error("rich presence is not configured")]
    Disabled,
    #[error("no rich presence IPC endpoint is listening")]
    NoEndpoint,
    #[error("rich presence I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid rich presence payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("rich presence frame of {0} bytes exceeds the limit")]
    FrameTooLarge(usize),
    #[error("unknown rich presence opcode {0}")]
    UnknownOpcode(u32),
    #[error("rich presence handshake rejected: {0}")]
    HandshakeRejected(String),
    #[error("rich presence command failed: {0}")]
    CommandFailed(String),
    #[error("rich presence connection closed by peer")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Opcode {
    Handshake = 0,
    Frame = 1,
    Close = 2,
    Ping = 3,
    Pong = 4,
}

impl TryFrom<u32> for Opcode {
    type Error = PresenceError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Opcode::Handshake),
            1 => Ok(Opcode::Frame),
            2 => Ok(Opcode::Close),
            3 => Ok(Opcode::Ping),
            4 => Ok(Opcode::Pong),
            other => Err(PresenceError::UnknownOpcode(other)),
        }
    }
}

pub fn encode_frame(opcode: Opcode, payload: &Value) -> Result<Vec<u8>, PresenceError> {
    let body = serde_json::to_vec(payload)?;
    if body.len() > MAX_FRAME_LEN {
        return Err(PresenceError::FrameTooLarge(body.len()));
    }

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + body.len());
    frame.extend_from_slice(&(opcode as u32).to_le_bytes());
    frame.extend_from_slice(&(body.len() as u32).to_le_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

pub fn decode_frame_header(header: [u8; FRAME_HEADER_LEN]) -> Result<(Opcode, usize), PresenceError> {
    let opcode = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
    if len > MAX_FRAME_LEN {
        return Err(PresenceError::FrameTooLarge(len));
    }
    Ok((Opcode::try_from(opcode)?, len))
}

fn read_frame<R: Read + ?Sized>(reader: &mut R) -> Result<(Opcode, Value), PresenceError> {
    let mut header = [0u8; FRAME_HEADER_LEN];
    reader.read_exact(&mut header).map_err(|error| match error.kind() {
        std::io::ErrorKind::UnexpectedEof => PresenceError::Closed,
        _ => PresenceError::Io(error),
    })?;
    let (opcode, len) = decode_frame_header(header)?;

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    let payload = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)?
    };
    Ok((opcode, payload))
}

fn write_frame<W: Write + ?Sized>(
    writer: &mut W,
    opcode: Opcode,
    payload: &Value,
) -> Result<(), PresenceError> {
    writer.write_all(&encode_frame(opcode, payload)?)?;
    writer.flush()?;
    Ok(())
}

/// Activity reported by the client; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceUpdate {
    pub details: Option<String>,
    pub state: Option<String>,
    pub started_at: Option<i64>,
    pub party_size: Option<u32>,
    pub party_max: Option<u32>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl PresenceUpdate {
    pub fn to_activity(&self, now_unix_seconds: i64) -> Value {
        let mut activity = serde_json::Map::new();
        if let Some(details) = non_blank(&self.details) {
            activity.insert("details".to_string(), json!(details));
        }
        if let Some(state) = non_blank(&self.state) {
            activity.insert("state".to_string(), json!(state));
        }
        activity.insert(
            "timestamps".to_string(),
            json!({ "start": self.started_at.unwrap_or(now_unix_seconds) }),
        );
        if let (Some(size), Some(max)) = (self.party_size, self.party_max) {
            if size > 0 && max >= size {
                activity.insert("party".to_string(), json!({ "size": [size, max] }));
            }
        }
        activity.insert(
            "assets".to_string(),
            json!({ "large_image": "parley", "large_text": crate::PRODUCT_NAME }),
        );
        Value::Object(activity)
    }
}

pub fn set_activity_command(pid: u32, activity: Option<Value>, nonce: &str) -> Value {
    json!({
        "cmd": "SET_ACTIVITY",
        "args": { "pid": pid, "activity": activity },
        "nonce": nonce,
    })
}

pub trait IpcStream: Read + Write + Send {}

impl<T: Read + Write + Send> IpcStream for T {}

type Connector = fn() -> Result<Box<dyn IpcStream>, PresenceError>;

#[cfg(unix)]
fn connect_ipc() -> Result<Box<dyn IpcStream>, PresenceError> {
    use std::{os::unix::net::UnixStream, path::PathBuf, time::Duration};

    let mut dirs: Vec<PathBuf> = ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"]
        .iter()
        .filter_map(|key| std::env::var_os(key).map(PathBuf::from))
        .collect();
    dirs.push(PathBuf::from("/tmp"));

    for dir in dirs {
        for index in 0..IPC_PIPE_COUNT {
            let path = dir.join(format!("{IPC_PIPE_PREFIX}{index}"));
            if let Ok(stream) = UnixStream::connect(&path) {
                stream.set_read_timeout(Some(Duration::from_secs(2)))?;
                stream.set_write_timeout(Some(Duration::from_secs(2)))?;
                return Ok(Box::new(stream));
            }
        }
    }
    Err(PresenceError::NoEndpoint)
}

#[cfg(windows)]
fn connect_ipc() -> Result<Box<dyn IpcStream>, PresenceError> {
    for index in 0..IPC_PIPE_COUNT {
        let path = format!(r"\\.\pipe\{IPC_PIPE_PREFIX}{index}");
        if let Ok(pipe) = std::fs::OpenOptions::new().read(true).write(true).open(&path) {
            return Ok(Box::new(pipe));
        }
    }
    Err(PresenceError::NoEndpoint)
}

#[cfg(not(any(unix, windows)))]
fn connect_ipc() -> Result<Box<dyn IpcStream>, PresenceError> {
    Err(PresenceError::NoEndpoint)
}

pub struct PresenceClient {
    client_id: String,
    connector: Connector,
    stream: Option<Box<dyn IpcStream>>,
}

impl PresenceClient {
    pub fn new(client_id: String) -> Self {
        Self::with_connector(client_id, connect_ipc)
    }

    fn with_connector(client_id: String, connector: Connector) -> Self {
        Self {
            client_id,
            connector,
            stream: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn connected_stream(&mut self) -> Result<&mut Box<dyn IpcStream>, PresenceError> {
        if self.stream.is_none() {
            let mut stream = (self.connector)()?;
            write_frame(
                &mut stream,
                Opcode::Handshake,
                &json!({ "v": IPC_PROTOCOL_VERSION, "client_id": self.client_id }),
            )?;
            let (opcode, reply) = read_frame(&mut stream)?;
            match (opcode, reply.get("evt").and_then(Value::as_str)) {
                (Opcode::Frame, Some("READY")) => {}
                (Opcode::Close, _) => {
                    let message = reply
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("closed during handshake");
                    return Err(PresenceError::HandshakeRejected(message.to_string()));
                }
                (opcode, evt) => {
                    return Err(PresenceError::HandshakeRejected(format!(
                        "unexpected reply {opcode:?} evt={evt:?}"
                    )));
                }
            }
            self.stream = Some(stream);
        }

        self.stream.as_mut().ok_or(PresenceError::Closed)
    }

    fn send_command(&mut self, command: &Value) -> Result<Value, PresenceError> {
        let stream = self.connected_stream()?;
        write_frame(stream, Opcode::Frame, command)?;
        loop {
            match read_frame(stream)? {
                (Opcode::Ping, payload) => write_frame(stream, Opcode::Pong, &payload)?,
                (Opcode::Close, _) => return Err(PresenceError::Closed),
                (_, reply) => return Ok(reply),
            }
        }
    }

    /// Sets (`Some`) or clears (`None`) the activity; failures other than an ERROR reply drop
    /// the connection.
    pub fn set_activity(&mut self, activity: Option<Value>) -> Result<(), PresenceError> {
        let nonce = uuid::Uuid::new_v4().to_string();
        let command = set_activity_command(std::process::id(), activity, &nonce);
        let result = self.send_command(&command).and_then(|reply| {
            if reply.get("evt").and_then(Value::as_str) == Some("ERROR") {
                let message = reply
                    .pointer("/data/message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error");
                return Err(PresenceError::CommandFailed(message.to_string()));
            }
            Ok(())
        });

        // Only an ERROR reply leaves the stream at a frame boundary; anything else desyncs it.
        if matches!(result, Err(ref error) if !matches!(error, PresenceError::CommandFailed(_))) {
            self.stream = None;
        }
        result
    }
}

/// Managed wrapper; `None` when no client id is configured.
pub(crate) struct PresenceState {
    client: Mutex<Option<PresenceClient>>,
}

impl PresenceState {
    pub(crate) fn new(client_id: Option<String>) -> Self {
        Self {
            client: Mutex::new(client_id.map(PresenceClient::new)),
        }
    }

    pub(crate) fn update(&self, update: Option<&PresenceUpdate>) -> Result<(), PresenceError> {
        let mut guard = self
            .client
            .lock()
            .map_err(|_| PresenceError::CommandFailed("presence state poisoned".to_string()))?;
        let client = guard.as_mut().ok_or(PresenceError::Disabled)?;
        let activity = update.map(|update| update.to_activity(chrono::Utc::now().timestamp()));
        client.set_activity(activity)
    }

    /// Clears the activity on exit without opening a new connection.
    /// A busy lock means an update is still blocked on the peer; exit does not wait for it.
    pub(crate) fn clear_if_connected(&self) -> Result<(), PresenceError> {
        let Ok(mut guard) = self.client.try_lock() else {
            return Ok(());
        };
        match guard.as_mut() {
            Some(client) if client.is_connected() => client.set_activity(None),
            _ => Ok(()),
        }
    }
}
