use super::binlog::{BinlogEvent, BinlogEventHeader, SessionState, TableMapEvent};
use super::buf_ext::BufExt;
use super::buf_ext::BufMutExt;
use super::constants::{
  BinlogDumpFlags, CapabilityFlags, CharacterSet, Command, StatusFlags, MYSQL_NATIVE_PASSWORD_PLUGIN_NAME,
  MAX_PAYLOAD_LEN,
};
use super::debug::DebugBytesRef;
use super::error::{Error, Result};
use super::query::{Column, QueryResults, RowValue};
use super::scramble;
use super::stream::Stream;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::cmp::max;
use std::collections::BTreeMap;
use std::net::{SocketAddr, SocketAddrV4, SocketAddrV6};
use std::str::FromStr;
use std::time::Duration;
use std::{fmt, io};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net;
use url::Url;

#[cfg(feature = "ssl")]
use openssl::ssl::SslConnector;

#[derive(Debug, Clone)]
pub struct ConnectionOptions {
  pub user: String,
  pub password: Option<String>,
  pub database: Option<String>,
  pub connect_timeout: Option<Duration>,
  pub read_timeout: Option<Duration>,
  pub write_timeout: Option<Duration>,
}

impl Default for ConnectionOptions {
  fn default() -> Self {
    Self {
      user: "mysql".to_string(),
      password: None,
      database: None,
      connect_timeout: None,
      read_timeout: None,
      write_timeout: None,
    }
  }
}

impl TryFrom<&Url> for ConnectionOptions {
  type Error = Error;

  fn try_from(url: &Url) -> Result<Self> {
    let user = match url.username() {
      "" => "mysql".to_string(),
      user => user.to_string(),
    };
    let password = url.password().map(ToString::to_string);

    let query_pairs = url.query_pairs().collect::<BTreeMap<_, _>>();
    let database = query_pairs.get("database").map(|v| v.to_string());

    let connect_timeout = query_pairs
      .get("connect_timeout_ms")
      .and_then(|v| v.parse().ok())
      .map(Duration::from_millis);

    let read_timeout = query_pairs
      .get("read_timeout_ms")
      .and_then(|v| v.parse().ok())
      .map(Duration::from_millis);

    let write_timeout = query_pairs
      .get("write_timeout_ms")
      .and_then(|v| v.parse().ok())
      .map(Duration::from_millis);

    Ok(Self {
      user,
      password,
      database,
      connect_timeout,
      read_timeout,
      write_timeout,
    })
  }
}

#[derive(Debug)]
pub struct Connection {
  stream: Stream,
  capabilities: CapabilityFlags,
  status_flags: StatusFlags,
  server_character_set: CharacterSet,
  sequence_id: u8,
  last_command_id: u8,
  options: ConnectionOptions,
  max_packet_size: u32,
  warnings: u16,
  affected_rows: u64,
  last_inserted_id: u64,
  checksum_enabled: bool,
  session_state: SessionState,
}

impl Connection {
  pub async fn connect_from_url(url: &Url) -> Result<Self> {
    match url.scheme() {
      "tcp" => {
        let port = url.port().unwrap_or(3306);
        let addrs = match url.host() {
          Some(url::Host::Domain(domain)) => net::lookup_host(format!("{}:{}", domain, port))
            .await
            .map(|v| v.collect::<Vec<_>>())?,
          Some(url::Host::Ipv4(ip)) => vec![SocketAddrV4::new(ip, port).into()],
          Some(url::Host::Ipv6(ip)) => vec![SocketAddrV6::new(ip, port, 0, 0).into()],
          None => return Err(Error::protocol("url has no host")),
        };
        let options = url.try_into()?;
        Self::connect_tcp(addrs, options).await
      }
      scheme => Err(Error::protocol(format!("{} is not supported", scheme))),
    }
  }

  #[cfg(feature = "ssl")]
  pub async fn connect_ssl_from_url(url: &Url, ssl_connector: SslConnector) -> Result<Self> {
    match url.scheme() {
      "tcp" => {
        let port = url.port().unwrap_or(3306);
        let (domain, addrs) = match url.host() {
          Some(url::Host::Domain(domain)) => net::lookup_host(format!("{}:{}", domain, port))
            .await
            .map(|v| (domain.to_string(), v.collect::<Vec<_>>()))?,
          Some(url::Host::Ipv4(ip)) => (ip.to_string(), vec![SocketAddrV4::new(ip, port).into()]),
          Some(url::Host::Ipv6(ip)) => (ip.to_string(), vec![SocketAddrV6::new(ip, port, 0, 0).into()]),
          None => return Err(Error::protocol("url has no host")),
        };
        let options = url.try_into()?;
        Self::connect_ssl(addrs, domain, options, ssl_connector).await
      }
      scheme => Err(Error::protocol(format!("{} is not supported", scheme))),
    }
  }

  pub async fn connect_tcp(addrs: impl Into<Vec<SocketAddr>>, options: ConnectionOptions) -> Result<Self> {
    let stream = Stream::connect_tcp(addrs).await?;
    Self::connect(stream, options).await
  }

  #[cfg(feature = "ssl")]
  pub async fn connect_ssl(
    _addrs: impl Into<Vec<SocketAddr>>,
    _domain: impl Into<String>,
    _options: ConnectionOptions,
    _ssl_connector: SslConnector,
  ) -> Result<Self> {
    todo!("TLS handshake over an established TCP stream")
  }

  async fn connect(stream: Stream, options: ConnectionOptions) -> Result<Self> {
    let capabilities = CapabilityFlags::empty();
    let status_flags = StatusFlags::empty();
    let server_character_set = CharacterSet::UTF8MB4;

    let mut connection = Self {
      stream,
      capabilities,
      sequence_id: 0,
      last_command_id: 0,
      last_inserted_id: 0,
      warnings: 0,
      affected_rows: 0,
      max_packet_size: 16_777_216, // 16MB
      options,
      status_flags,
      server_character_set,
      checksum_enabled: false,
      session_state: SessionState::default(),
    };

    connection.handshake().await?;

    tracing::info!(user = %connection.options.user, "connected");

    Ok(connection)
  }

  pub async fn duplicate(&self) -> Result<Self> {
    let stream = self.stream.duplicate().await?;
    Self::connect(stream, self.options.clone()).await
  }

  pub async fn close(mut self) -> Result<()> {
    self.write_command(Command::COM_QUIT, &[]).await?;
    let payload = self.read_payload().await;

    match payload {
      Ok(payload) => Err(self.parse_and_handle_server_error(payload)),
      Err(Error::Io(err)) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(()),
      Err(err) => Err(err),
    }
  }

  async fn handshake(&mut self) -> Result<()> {
    // https://dev.mysql.com/doc/internals/en/connection-phase-packets.html
    let payload = self.read_payload().await?;

    match payload.first() {
      Some(0xFF) => Err(self.parse_and_handle_server_error(payload)),
      Some(_) => {
        let handshake = Handshake::parse(payload)?;
        self.handle_handshake(handshake).await
      }
      None => Err(Error::protocol("unexpected EOF while parsing handshake response")),
    }
  }

  fn handle_server_error(&mut self, err: ServerError) -> Error {
    tracing::debug!(code = err.error_code, message = %err.error_message, "server error");
    Error::Server { code: err.error_code, message: err.error_message }
  }

  async fn handle_handshake(&mut self, p: Handshake) -> Result<()> {
    // https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_connection_phase.html
    if p.protocol_version != 10u8 {
      return Err(Error::protocol("unsupported handshake protocol version"));
    }

    if !p.capabilities.contains(CapabilityFlags::CLIENT_PROTOCOL_41) {
      return Err(Error::protocol("server does not support CLIENT_PROTOCOL_41"));
    }

    if p.auth_plugin != MYSQL_NATIVE_PASSWORD_PLUGIN_NAME {
      return Err(Error::protocol(format!(
        "unsupported auth plugin {:?}; only mysql_native_password is implemented",
        p.auth_plugin
      )));
    }

    // Intersection between what the server supports, and what our client supports.
    self.capabilities = p.capabilities & default_client_capabilities(&self.options);
    self.status_flags = p.status_flags;
    self.server_character_set = p.character_set;

    self
      .write_handshake_response(p.auth_plugin.as_str(), p.nonce().chunk())
      .await?;
    self.read_auth_switch_request().await?;

    tracing::debug!("handshake complete");

    Ok(())
  }

  pub async fn read_auth_switch_request(&mut self) -> Result<()> {
    loop {
      let mut payload = self.read_payload().await?;

      match payload.first() {
        Some(0x00) => return self.parse_and_handle_server_ok(payload),
        // AuthMoreData
        Some(0x01) => {
          if payload.chunk() == [0x01, 0x04] {
            return Err(Error::protocol("server requires SSL for this auth plugin"));
          }

          return Err(Error::protocol("AuthMoreData is not supported"));
        }
        // AuthNextFactor
        Some(0x02) => return Err(Error::protocol("multi-factor authentication is not supported")),
        // AuthSwitch
        Some(0xFE) => {
          payload.advance(1);
          let auth_plugin = payload.mysql_get_null_terminated_string()?;
          let nonce = payload.mysql_get_null_terminated_string()?;

          if auth_plugin != MYSQL_NATIVE_PASSWORD_PLUGIN_NAME {
            return Err(Error::protocol(format!(
              "server switched to unsupported auth plugin {:?}",
              auth_plugin
            )));
          }

          self
            .write_auth_switch_response(auth_plugin.as_str(), nonce.as_bytes())
            .await?;
        }
        Some(0xFF) => return Err(self.parse_and_handle_server_error(payload)),
        Some(other) => return Err(Error::unexpected_packet_kind(format!("0x{:02x}", other))),
        None => return Err(Error::protocol("unexpected EOF while parsing login response")),
      }
    }
  }

  /// Send a text query to MYSQL and returns a result set.
  pub async fn query(&mut self, query: impl AsRef<str>) -> Result<QueryResults> {
    self
      .write_command(Command::COM_QUERY, query.as_ref().as_bytes())
      .await?;
    self.read_results().await
  }

  pub async fn ping(&mut self) -> Result<()> {
    self.write_command(Command::COM_PING, &[]).await?;

    let payload = self.read_payload().await?;
    match payload.first() {
      Some(0x00) => self.parse_and_handle_server_ok(payload),
      _ => Err(Error::unexpected_packet_kind("response to COM_PING")),
    }
  }

  async fn write_command(&mut self, cmd: Command, payload: &[u8]) -> Result<()> {
    self.sequence_id = 0;
    self.last_command_id = cmd as u8;

    let mut b = BytesMut::with_capacity(1 + payload.len());
    b.put_u8(cmd as u8);
    b.put(payload);

    self.write_payload(b.into()).await
  }

  async fn write_payload(&mut self, payload: Bytes) -> Result<()> {
    for chunk in payload.chunks(MAX_PAYLOAD_LEN) {
      let mut b = BytesMut::with_capacity(4 + chunk.len());
      b.put_uint_le(chunk.len() as u64, 3);
      b.put_u8(self.sequence_id);
      b.put(chunk);

      tracing::trace!(payload = ?DebugBytesRef(chunk), "write");

      self.sequence_id = self.sequence_id.wrapping_add(1);
      self.stream.write_all(&b[..]).await?;
      self.stream.flush().await?;
    }

    Ok(())
  }

  async fn read_generic_reponse(&mut self) -> Result<()> {
    let payload = self.read_payload().await?;

    match payload.first() {
      Some(0x00) => self.parse_and_handle_server_ok(payload),
      Some(0xFF) => Err(self.parse_and_handle_server_error(payload)),
      Some(_) => Err(Error::unexpected_packet_kind("generic response")),
      None => Err(Error::protocol("unexpected EOF while parsing generic response")),
    }
  }

  async fn read_results(&mut self) -> Result<QueryResults> {
    // https://dev.mysql.com/doc/internals/en/com-query-response.html
    let mut payload = self.read_payload().await?;

    match payload.first() {
      Some(0x00) => {
        self.parse_and_handle_server_ok(payload)?;
        Ok(QueryResults::default())
      }
      Some(0xFF) => Err(self.parse_and_handle_server_error(payload)),
      Some(0xFB) => Err(Error::protocol("LOCAL INFILE requests are not supported")),
      Some(_) => {
        let column_count = payload
          .mysql_get_lenc_uint_not_null()?
          .try_into()
          .map_err(|_| Error::protocol("column count out of range"))?;
        let columns = self.read_columns(column_count).await?;
        let values = self.read_row_values(&columns).await?;
        let query_results = QueryResults { columns, values };
        Ok(query_results)
      }
      None => Err(Error::protocol("unexpected EOF while parsing query result response")),
    }
  }

  async fn read_columns(&mut self, column_count: usize) -> Result<Vec<Column>> {
    // https://dev.mysql.com/doc/internals/en/com-query-response.html#packet-ProtocolText::Resultset
    let mut columns = Vec::with_capacity(column_count);
    for _i in 0..column_count {
      let payload = self.read_payload().await?;
      match payload.first() {
        Some(0x00) => {
          self.parse_and_handle_server_ok(payload)?;
          break;
        }
        Some(_) => {
          let column = Column::parse(payload)?;
          columns.push(column);
        }
        None => return Err(Error::protocol("unexpected EOF while parsing query column response")),
      }
    }
    Ok(columns)
  }

  async fn read_row_values(&mut self, columns: &Vec<Column>) -> Result<Vec<RowValue>> {
    // https://dev.mysql.com/doc/internals/en/com-query-response.html#packet-ProtocolText::ResultsetRow
    let mut row_values = Vec::new();
    loop {
      let mut payload = self.read_payload().await?;

      match payload.first() {
        Some(0x00) | Some(0xFE) => {
          self.parse_and_handle_server_ok(payload)?;
          break;
        }
        Some(_) => {
          for _i in 0..columns.len() {
            match payload.first() {
              Some(0xFB) => {
                payload.advance(1);
                row_values.push(None);
              }
              Some(_) => {
                let value = payload.mysql_get_lenc_string()?;
                row_values.push(Some(value));
              }
              None => return Err(Error::protocol("unexpected EOF while parsing query row value")),
            }
          }
        }
        None => return Err(Error::protocol("unexpected EOF while parsing query row")),
      }
    }
    Ok(row_values)
  }

  fn handle_server_ok(&mut self, ok: ServerOk) {
    self.affected_rows = ok.affected_rows;
    self.last_inserted_id = ok.last_inserted_id;
    self.status_flags = ok.status_flags.unwrap_or(StatusFlags::empty());
    self.warnings = ok.warnings.unwrap_or(0);
  }

  async fn read_payload(&mut self) -> Result<Bytes> {
    let (sequence_id, payload) = self.read_packet().await?;
    if self.sequence_id != sequence_id {
      return Err(Error::protocol("packet is out of sync"));
    }
    self.sequence_id = self.sequence_id.wrapping_add(1);
    tracing::trace!(payload = ?DebugBytesRef(payload.chunk()), "read");
    Ok(payload)
  }

  fn scramble_password(&self, auth_plugin: &str, nonce: &[u8]) -> Result<Vec<u8>> {
    if auth_plugin != MYSQL_NATIVE_PASSWORD_PLUGIN_NAME {
      return Err(Error::protocol(format!("{} is not supported", auth_plugin)));
    }

    let password = self.options.password.as_ref().map(String::as_bytes).unwrap_or_default();
    Ok(scramble::scramble_native(nonce, password).map(|v| v.to_vec()).unwrap_or_default())
  }

  async fn write_auth_switch_response(&mut self, auth_plugin: &str, nonce: &[u8]) -> Result<()> {
    let scrambled_data = self.scramble_password(auth_plugin, nonce)?;
    self.write_payload(scrambled_data.into()).await
  }

  async fn write_handshake_response(&mut self, auth_plugin: &str, nonce: &[u8]) -> Result<()> {
    let mut b = BytesMut::new();
    b.put_u32_le(self.capabilities.bits());
    b.put_u32_le(self.max_packet_size);
    b.put_u8(CharacterSet::UTF8 as u8);
    b.put(&[0; 23][..]);
    b.put(self.options.user.as_bytes());
    b.put_u8(0);

    let scrambled_data = self.scramble_password(auth_plugin, nonce)?;

    b.mysql_put_lenc_uint(scrambled_data.len() as u64);
    b.put(scrambled_data.as_slice());

    if let Some(db_name) = self.options.database.as_ref() {
      b.put(db_name.as_bytes());
      b.put_u8(0);
    }

    b.put(auth_plugin.as_bytes());
    b.put_u8(0);

    self.write_payload(b.into()).await
  }

  async fn read_packet(&mut self) -> Result<(u8, Bytes)> {
    let mut header = vec![0; 4];
    self.stream.read_exact(&mut header).await?;

    let mut header = header.as_slice();

    let payload_len = header.get_uint_le(3).try_into().unwrap();
    let sequence_id = header.get_u8();

    let mut payload = vec![0; payload_len];
    self.stream.read_exact(&mut payload).await?;

    Ok((sequence_id, payload.into()))
  }

  pub async fn binlog_cursor(&mut self) -> Result<BinlogCursor> {
    let mut values = self.query("SHOW MASTER STATUS").await.map(|mut v| {
      v.values.reverse();
      v.values
    })?;
    let log_file = values
      .pop()
      .flatten()
      .ok_or_else(|| Error::protocol("SHOW MASTER STATUS returned no log file"))?;
    let log_position = values
      .pop()
      .flatten()
      .ok_or_else(|| Error::protocol("SHOW MASTER STATUS returned no log position"))?
      .parse()
      .map_err(|_| Error::protocol("SHOW MASTER STATUS returned a non-numeric log position"))?;
    Ok(BinlogCursor { log_file, log_position })
  }

  // Returns a stream that yields binlog events, starting from a given position and binlog file.
  pub async fn binlog_stream(
    mut self,
    server_id: u32,
    binlog_cursor: impl Into<BinlogCursor>,
  ) -> Result<BinlogStream> {
    let binlog_cursor = binlog_cursor.into();
    self.source_configuration_check().await?;
    self.register_as_replica(server_id).await?;
    self.dump_binlog(server_id, &binlog_cursor).await?;
    tracing::info!(cursor = %binlog_cursor, server_id, "binlog dump started");
    let conn = self;
    Ok(BinlogStream { conn })
  }

  async fn read_binlog_event_packet(&mut self) -> Result<(BinlogEventHeader, BinlogEvent)> {
    let payload = self.read_payload().await?;

    match payload.first() {
      Some(0x00) => {
        let (header, event) =
          BinlogEventHeader::parse(payload, self.checksum_enabled, &mut self.session_state)?;
        tracing::debug!(?header, "binlog event");
        Ok((header, event))
      }
      Some(0xFF) => Err(self.parse_and_handle_server_error(payload)),
      Some(_) => Err(Error::unexpected_packet_kind("binlog event response")),
      None => Err(Error::protocol("unexpected EOF while parsing binlog event response")),
    }
  }

  fn parse_and_handle_server_ok(&mut self, payload: Bytes) -> Result<()> {
    ServerOk::parse(payload, self.capabilities).map(|ok| self.handle_server_ok(ok))
  }

  fn parse_and_handle_server_error(&mut self, payload: Bytes) -> Error {
    match ServerError::parse(payload, self.capabilities) {
      Ok(err) => self.handle_server_error(err),
      Err(err) => err,
    }
  }

  /// Negotiates whether the source appends a trailing CRC32 checksum to each binlog event, per
  /// https://dev.mysql.com/doc/refman/8.0/en/replication-binlog-event-checksum.html.
  async fn source_configuration_check(&mut self) -> Result<()> {
    let checksum = self
      .query("SHOW GLOBAL VARIABLES LIKE 'BINLOG_CHECKSUM'")
      .await?
      .values
      .get(1)
      .cloned()
      .flatten();

    self.checksum_enabled = checksum.as_deref().map(|v| v != "NONE").unwrap_or(false);

    if self.checksum_enabled {
      self.query("SET @master_binlog_checksum = @@global.binlog_checksum").await?;
    }

    tracing::debug!(checksum_enabled = self.checksum_enabled, "checksum negotiated");

    Ok(())
  }

  async fn register_as_replica(&mut self, server_id: u32) -> Result<()> {
    // Host, user and password are intentionally left empty: the source only uses these fields
    // for `SHOW SLAVE HOSTS` bookkeeping, which this crate does not participate in.
    let mut b = BytesMut::new();
    b.put_u32_le(server_id);
    b.put_u8(0); // hostname length
    b.put_u8(0); // user length
    b.put_u8(0); // password length
    b.put_u16_le(0); // port
    b.put_u32(0); // replication_rank, ignored by the server
    b.put_u32(0); // master id, usually 0

    self.write_command(Command::COM_REGISTER_SLAVE, &b[..]).await?;
    self.read_generic_reponse().await
  }

  async fn dump_binlog(&mut self, server_id: u32, binlog_cursor: &BinlogCursor) -> Result<()> {
    let file = binlog_cursor.log_file.as_bytes();

    let mut b = BytesMut::new();
    b.put_u32_le(binlog_cursor.log_position);
    b.put_u16_le(BinlogDumpFlags::empty().bits());
    b.put_u32_le(server_id);
    b.put(file);

    self.write_command(Command::COM_BINLOG_DUMP, &b[..]).await
  }
}

// Defines the default capabilities that our client support.
fn default_client_capabilities(opts: &ConnectionOptions) -> CapabilityFlags {
  let mut capabilities = CapabilityFlags::CLIENT_PROTOCOL_41
        | CapabilityFlags::CLIENT_LONG_PASSWORD
        | CapabilityFlags::CLIENT_PLUGIN_AUTH
        | CapabilityFlags::CLIENT_LONG_FLAG
        | CapabilityFlags::CLIENT_PLUGIN_AUTH_LENENC_CLIENT_DATA
        | CapabilityFlags::CLIENT_RESERVED2
        | CapabilityFlags::CLIENT_DEPRECATE_EOF;

  if opts.database.as_ref().filter(|v| !v.is_empty()).is_some() {
    capabilities.insert(CapabilityFlags::CLIENT_CONNECT_WITH_DB);
  }

  capabilities
}

#[derive(Debug)]
pub struct Handshake {
  capabilities: CapabilityFlags,
  protocol_version: u8,
  scramble_1: Bytes,
  scramble_2: Option<Bytes>,
  auth_plugin: String,
  character_set: CharacterSet,
  status_flags: StatusFlags,
}

impl Handshake {
  fn parse(mut b: Bytes) -> Result<Self> {
    // https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_connection_phase_packets_protocol_handshake_response.html
    let protocol_version = b.get_u8();
    let _server_version = b.mysql_get_null_terminated_string()?;
    let _connection_id = b.get_u32_le();
    let scramble_1 = b.split_to(8);
    b.advance(1);
    let capabilities_1 = b.get_u16_le();
    let character_set = b
      .get_u8()
      .try_into()
      .map_err(|_| Error::protocol("unknown server character set"))?;
    let status_flags = StatusFlags::from_bits_truncate(b.get_u16_le());
    let capabilities_2 = b.get_u16_le();

    let capabilities = CapabilityFlags::from_bits_truncate(capabilities_1 as u32 | ((capabilities_2 as u32) << 16));

    if !capabilities.contains(CapabilityFlags::CLIENT_PLUGIN_AUTH) {
      return Err(Error::protocol("CLIENT_PLUGIN_AUTH flag is not set"));
    }

    let scramble_len: i16 = b.get_u8().into();
    b.advance(10);

    let scramble_2_len = max(12, scramble_len - 9)
      .try_into()
      .map_err(|_| Error::protocol("negative scramble length"))?;
    let scramble_2 = Some(b.split_to(scramble_2_len));
    b.advance(1);

    let auth_plugin = b.mysql_get_null_terminated_string()?;

    Ok(Self {
      capabilities,
      protocol_version,
      scramble_1,
      scramble_2,
      auth_plugin,
      status_flags,
      character_set,
    })
  }

  fn nonce(&self) -> Bytes {
    let mut out = BytesMut::new();
    out.extend_from_slice(self.scramble_1.chunk());

    if let Some(scramble_2) = self.scramble_2.as_ref().map(Bytes::chunk) {
      out.extend_from_slice(scramble_2);
    }

    out.freeze()
  }
}

// https://dev.mysql.com/doc/internals/en/packet-OK_Packet.html
#[derive(Debug)]
struct ServerOk {
  affected_rows: u64,
  last_inserted_id: u64,
  status_flags: Option<StatusFlags>,
  warnings: Option<u16>,
  info: String,
  session_state_changes: Option<String>,
}

impl ServerOk {
  fn parse(mut b: Bytes, capability_flags: CapabilityFlags) -> Result<Self> {
    let _header = b.get_u8();
    let affected_rows = b.mysql_get_lenc_uint_not_null()?;
    let last_inserted_id = b.mysql_get_lenc_uint_not_null()?;

    let mut status_flags = None;
    let mut warnings = None;
    if capability_flags.contains(CapabilityFlags::CLIENT_PROTOCOL_41) {
      status_flags = Some(StatusFlags::from_bits_truncate(b.get_u16_le()));
      warnings = Some(b.get_u16_le());
    } else if capability_flags.contains(CapabilityFlags::CLIENT_TRANSACTIONS) {
      status_flags = Some(StatusFlags::from_bits_truncate(b.get_u16_le()));
    }

    let (info, session_state_changes) = if capability_flags.contains(CapabilityFlags::CLIENT_SESSION_TRACK) {
      let info = b.mysql_get_lenc_string()?;

      let has_session_state_changes = status_flags
        .map(|f| f.contains(StatusFlags::SERVER_SESSION_STATE_CHANGED))
        .unwrap_or(false);

      let mut session_state_changes = None;
      if has_session_state_changes {
        session_state_changes = Some(b.mysql_get_lenc_string()?)
      }

      (info, session_state_changes)
    } else {
      let info = b.mysql_get_eof_string()?;
      (info, None)
    };

    Ok(Self {
      affected_rows,
      last_inserted_id,
      status_flags,
      warnings,
      info,
      session_state_changes,
    })
  }
}

// https://dev.mysql.com/doc/internals/en/packet-ERR_Packet.html
#[derive(Debug)]
pub struct ServerError {
  error_code: u16,
  state_marker: Option<String>,
  state: Option<String>,
  error_message: String,
}

impl ServerError {
  fn parse(mut b: Bytes, capability_flags: CapabilityFlags) -> Result<Self> {
    let _header = b.get_u8();
    let error_code = b.get_u16_le();

    let mut state_marker = None;
    let mut state = None;

    if capability_flags.contains(CapabilityFlags::CLIENT_PROTOCOL_41) {
      state_marker = Some(b.mysql_get_fixed_length_string(1)?);
      state = Some(b.mysql_get_fixed_length_string(5)?);
    }

    let error_message = b.mysql_get_eof_string()?;
    Ok(Self {
      error_code,
      state_marker,
      state,
      error_message,
    })
  }
}

#[derive(Debug, PartialEq, PartialOrd, Clone)]
pub struct BinlogCursor {
  pub log_file: String,
  pub log_position: u32,
}

impl fmt::Display for BinlogCursor {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.log_file, self.log_position)
  }
}

impl FromStr for BinlogCursor {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    let (log_file, log_position) = s
      .split_once('/')
      .ok_or_else(|| "Failed to parse binlog cursor. Expected format is <prefix>.<file>/<position>".to_string())?;
    let log_file = log_file.to_string();
    let log_position = log_position
      .parse()
      .map_err(|_| "Failed to parse binlog cursor position. Expected format is u32.".to_string())?;
    Ok(Self { log_file, log_position })
  }
}

#[derive(Debug)]
pub struct BinlogStream {
  conn: Connection,
}

impl BinlogStream {
  /// The most recent table-map event seen for `table_id`, tracked internally since
  /// `recv()` absorbs `TABLE_MAP` events rather than surfacing them.
  pub fn table_map(&self, table_id: u64) -> Option<&TableMapEvent> {
    self.conn.session_state.table(table_id)
  }

  pub async fn close(mut self) -> Result<()> {
    // force shutdown the underlying stream since the stream is no longer in duplex mode.
    self.conn.stream.shutdown().await?;
    Ok(())
  }

  pub async fn recv(&mut self) -> Option<Result<(BinlogEventHeader, BinlogEvent)>> {
    // TODO: handle disconnects and reconnect here...
    loop {
      let (header, event) = match self.conn.read_binlog_event_packet().await {
        Ok(pair) => pair,
        Err(err) => return Some(Err(err)),
      };

      // Bookkeeping events are absorbed here rather than handed to the caller; only the
      // first user-facing event terminates the loop.
      match event {
        BinlogEvent::FormatDescription(_)
        | BinlogEvent::StartV3(_)
        | BinlogEvent::Rotate(_)
        | BinlogEvent::TableMap(_)
        | BinlogEvent::Xid(_)
        | BinlogEvent::Stop
        | BinlogEvent::Slave
        | BinlogEvent::Ignorable
        | BinlogEvent::Heartbeat
        | BinlogEvent::Incident(_)
        | BinlogEvent::Gtid(_)
        | BinlogEvent::PreviousGtid(_)
        | BinlogEvent::AnonymousGtid(_)
        | BinlogEvent::Unknown(_) => continue,
        _ => return Some(Ok((header, event))),
      }
    }
  }
}
