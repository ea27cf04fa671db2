use std::io;

/// The error taxonomy for the wire protocol and binlog decoder.
///
/// `Protocol` and `UnexpectedPacketKind` are fatal to the enclosing session;
/// `Server` is fatal only to the operation that produced it.
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("transport error: {0}")]
  Io(#[from] io::Error),

  #[error("protocol invariant violated: {context}")]
  Protocol { context: String },

  #[error("server error {code}: {message}")]
  Server { code: u16, message: String },

  #[error("unexpected packet kind: {context}")]
  UnexpectedPacketKind { context: String },
}

impl Error {
  pub fn protocol(context: impl Into<String>) -> Self {
    Error::Protocol { context: context.into() }
  }

  pub fn unexpected_packet_kind(context: impl Into<String>) -> Self {
    Error::UnexpectedPacketKind { context: context.into() }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
