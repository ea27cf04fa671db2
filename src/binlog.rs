use super::constants::{
  CharacterSet, ColumnMetadataType, ColumnType, DELETE_ROWS_V1_HEADER_LEN_INDEX, UPDATE_ROWS_V1_HEADER_LEN_INDEX,
  WRITE_ROWS_V1_HEADER_LEN_INDEX,
};
use super::decimal;
use super::error::{Error, Result};
use super::{buf_ext::BufExt, constants::BinlogEventType};
use bigdecimal::BigDecimal;
use bytes::{Buf, Bytes};
use std::collections::HashMap;

/// Which row-event family a `table_id` width lookup is for. WRITE/UPDATE/DELETE_ROWS all
/// share a v1 post-header length entry regardless of which of v0/v1/v2 is actually on the
/// wire; FORMAT_DESCRIPTION never publishes separate entries for v0/v2.
#[derive(Debug, Clone, Copy)]
enum RowEventKind {
  Insert,
  Update,
  Delete,
}

/// Carries forward state a single binlog event cannot be decoded without: the post-header
/// length table published by the stream's `FORMAT_DESCRIPTION_EVENT`, and the most recent
/// `TABLE_MAP_EVENT` seen for each table id.
#[derive(Debug, Default)]
pub struct SessionState {
  event_type_header_lengths: Vec<u8>,
  tables: HashMap<u64, TableMapEvent>,
}

impl SessionState {
  /// Row events encode `table_id` in 4 bytes when their v1 post-header length is 6, and 6
  /// bytes otherwise; a table shorter than 24 bytes (or absent, before the first
  /// FORMAT_DESCRIPTION_EVENT) defaults to 8, i.e. the common 6-byte case.
  fn row_table_id_width(&self, kind: RowEventKind) -> usize {
    let idx = match kind {
      RowEventKind::Insert => WRITE_ROWS_V1_HEADER_LEN_INDEX,
      RowEventKind::Update => UPDATE_ROWS_V1_HEADER_LEN_INDEX,
      RowEventKind::Delete => DELETE_ROWS_V1_HEADER_LEN_INDEX,
    };
    match self.event_type_header_lengths.get(idx).copied().unwrap_or(8) {
      6 => 4,
      _ => 6,
    }
  }

  pub fn table(&self, table_id: u64) -> Option<&TableMapEvent> {
    self.tables.get(&table_id)
  }
}

#[derive(Debug)]
pub struct BinlogEventHeader {
  pub timestamp: u32,
  pub server_id: u32,
  pub log_position: u32,
  pub flags: u16,
  pub checksum: Option<u32>,
}

impl BinlogEventHeader {
  pub fn parse(
    mut b: Bytes,
    checksum_enabled: bool,
    session: &mut SessionState,
  ) -> Result<(BinlogEventHeader, BinlogEvent)> {
    if b.get_u8() != 0x00 {
      return Err(Error::protocol("binlog event packet is missing its leading OK marker"));
    }

    let timestamp = b.get_u32_le();
    let event_type_byte = b.get_u8();
    let event_type = BinlogEventType::from_u8(event_type_byte);
    let server_id = b.get_u32_le();
    b.advance(4); // event_size, recoverable from the enclosing packet length
    let log_position = b.get_u32_le();
    let flags = b.get_u16_le();

    if checksum_enabled && b.remaining() < 4 {
      return Err(Error::protocol("binlog event is shorter than its checksum trailer"));
    }
    let payload_len = b.remaining() - if checksum_enabled { 4 } else { 0 };
    let mut payload = b.split_to(payload_len);
    let checksum = if checksum_enabled { Some(b.get_u32_le()) } else { None };

    let header = BinlogEventHeader { timestamp, server_id, log_position, flags, checksum };

    let event = match event_type {
      Some(BinlogEventType::START_EVENT_V3) => StartEventV3::parse(payload).map(BinlogEvent::StartV3)?,
      Some(BinlogEventType::QUERY_EVENT) => QueryEvent::parse(payload).map(BinlogEvent::Query)?,
      Some(BinlogEventType::STOP_EVENT) => BinlogEvent::Stop,
      Some(BinlogEventType::ROTATE_EVENT) => {
        // NOTE: the checksum-looking trailer is actually the suffix of the binlog file name;
        // ROTATE_EVENT is exempt from the checksum trim above on real servers, but since this
        // crate already split the trailer off, splice it back on before parsing.
        let mut whole = payload.clone();
        whole.extend_from_slice(&checksum.map(|c| c.to_le_bytes()).unwrap_or_default());
        RotateEvent::parse(whole).map(BinlogEvent::Rotate)?
      }
      Some(BinlogEventType::INTVAR_EVENT) => IntVarEvent::parse(payload).map(BinlogEvent::IntVar)?,
      Some(BinlogEventType::SLAVE_EVENT) => BinlogEvent::Slave,
      Some(BinlogEventType::APPEND_BLOCK_EVENT) => AppendBlockEvent::parse(payload).map(BinlogEvent::AppendBlock)?,
      Some(BinlogEventType::RAND_EVENT) => RandEvent::parse(payload).map(BinlogEvent::Rand)?,
      Some(BinlogEventType::USER_VAR_EVENT) => UserVarEvent::parse(payload).map(BinlogEvent::UserVar)?,
      Some(BinlogEventType::FORMAT_DESCRIPTION_EVENT) => {
        let format_description = FormatDescriptionEvent::parse(payload)?;
        session.event_type_header_lengths = format_description.event_type_header_lengths.to_vec();
        BinlogEvent::FormatDescription(format_description)
      }
      Some(BinlogEventType::XID_EVENT) => XidEvent::parse(payload).map(BinlogEvent::Xid)?,
      Some(BinlogEventType::BEGIN_LOAD_QUERY_EVENT) => {
        BeginLoadQueryEvent::parse(payload).map(BinlogEvent::BeginLoadQuery)?
      }
      Some(BinlogEventType::EXECUTE_LOAD_QUERY_EVENT) => {
        ExecuteLoadQueryEvent::parse(payload).map(BinlogEvent::ExecuteLoadQuery)?
      }
      Some(BinlogEventType::TABLE_MAP_EVENT) => {
        let table_map = TableMapEvent::parse(payload)?;
        session.tables.insert(table_map.table_id, table_map.clone());
        BinlogEvent::TableMap(table_map)
      }
      Some(BinlogEventType::WRITE_ROWS_EVENTV0) | Some(BinlogEventType::WRITE_ROWS_EVENTV1) => {
        InsertRowEvent::parse(&mut payload, session.row_table_id_width(RowEventKind::Insert), false)
          .map(BinlogEvent::Insert)?
      }
      Some(BinlogEventType::WRITE_ROWS_EVENTV2) => {
        InsertRowEvent::parse(&mut payload, session.row_table_id_width(RowEventKind::Insert), true)
          .map(BinlogEvent::Insert)?
      }
      Some(BinlogEventType::UPDATE_ROWS_EVENTV0) | Some(BinlogEventType::UPDATE_ROWS_EVENTV1) => {
        UpdateRowEvent::parse(&mut payload, session.row_table_id_width(RowEventKind::Update), false)
          .map(BinlogEvent::Update)?
      }
      Some(BinlogEventType::UPDATE_ROWS_EVENTV2) => {
        UpdateRowEvent::parse(&mut payload, session.row_table_id_width(RowEventKind::Update), true)
          .map(BinlogEvent::Update)?
      }
      Some(BinlogEventType::DELETE_ROWS_EVENTV0) | Some(BinlogEventType::DELETE_ROWS_EVENTV1) => {
        DeleteRowEvent::parse(&mut payload, session.row_table_id_width(RowEventKind::Delete), false)
          .map(BinlogEvent::Delete)?
      }
      Some(BinlogEventType::DELETE_ROWS_EVENTV2) => {
        DeleteRowEvent::parse(&mut payload, session.row_table_id_width(RowEventKind::Delete), true)
          .map(BinlogEvent::Delete)?
      }
      Some(BinlogEventType::INCIDENT_EVENT) => IncidentEvent::parse(payload).map(BinlogEvent::Incident)?,
      Some(BinlogEventType::HEARTBEAT_EVENT) => BinlogEvent::Heartbeat,
      Some(BinlogEventType::IGNORABLE_EVENT) | Some(BinlogEventType::ROWS_QUERY_EVENT) => BinlogEvent::Ignorable,
      Some(BinlogEventType::GTID_EVENT) => GtidEvent::parse(payload).map(BinlogEvent::Gtid)?,
      Some(BinlogEventType::PREVIOUS_GTIDS_EVENT) => {
        PreviousGtidEvent::parse(payload).map(BinlogEvent::PreviousGtid)?
      }
      Some(BinlogEventType::ANONYMOUS_GTID_EVENT) => {
        AnonymousGtidEvent::parse(payload).map(BinlogEvent::AnonymousGtid)?
      }
      Some(BinlogEventType::UNKNOWN_EVENT) | None => BinlogEvent::Unknown(event_type_byte),
      // Remaining pre-5.0 load-data event family: absorbed, no downstream consumer needs them.
      Some(_) => BinlogEvent::Unknown(event_type_byte),
    };

    Ok((header, event))
  }
}

#[derive(Debug)]
pub enum BinlogEvent {
  StartV3(StartEventV3),
  Query(QueryEvent),
  Stop,
  Rotate(RotateEvent),
  IntVar(IntVarEvent),
  Slave,
  AppendBlock(AppendBlockEvent),
  Rand(RandEvent),
  UserVar(UserVarEvent),
  FormatDescription(FormatDescriptionEvent),
  Xid(XidEvent),
  BeginLoadQuery(BeginLoadQueryEvent),
  ExecuteLoadQuery(ExecuteLoadQueryEvent),
  TableMap(TableMapEvent),
  Insert(InsertRowEvent),
  Update(UpdateRowEvent),
  Delete(DeleteRowEvent),
  Incident(IncidentEvent),
  Heartbeat,
  Ignorable,
  Gtid(GtidEvent),
  PreviousGtid(PreviousGtidEvent),
  AnonymousGtid(AnonymousGtidEvent),
  /// An event type this crate does not recognize. Bookkeeping (position tracking) still
  /// advances normally; the payload itself is discarded.
  Unknown(u8),
}

#[derive(Debug)]
pub struct StartEventV3 {
  pub binlog_version: u16,
  pub server_version: String,
  pub create_timestamp: u32,
}

impl StartEventV3 {
  fn parse(mut b: Bytes) -> Result<Self> {
    let binlog_version = b.get_u16_le();
    let server_version = b.mysql_get_fixed_length_string(50)?;
    let server_version = server_version.trim_end_matches('\0').to_string();
    let create_timestamp = b.get_u32_le();
    Ok(Self { binlog_version, server_version, create_timestamp })
  }
}

#[derive(Debug)]
pub struct QueryEvent {
  pub slave_proxy_id: u32,
  pub execution_time: u32,
  pub error_code: u16,
  pub status_vars: Bytes,
  pub schema: String,
  pub query: String,
}

impl QueryEvent {
  fn parse(mut b: Bytes) -> Result<Self> {
    let slave_proxy_id = b.get_u32_le();
    let execution_time = b.get_u32_le();
    let schema_len: usize = b.get_u8().into();
    let error_code = b.get_u16_le();
    let status_vars_len: usize = b.get_u16_le().into();
    let status_vars = b.split_to(status_vars_len);
    let schema = b.split_to(schema_len);
    let schema = std::str::from_utf8(schema.chunk())
      .map_err(|_| Error::protocol("non-utf8 query event schema"))?
      .to_string();
    b.advance(1); // trailing 0x00 after schema
    let query = String::from_utf8(b.to_vec()).map_err(|_| Error::protocol("non-utf8 query event text"))?;

    Ok(Self { slave_proxy_id, execution_time, error_code, status_vars, schema, query })
  }
}

#[derive(Debug)]
pub struct IntVarEvent {
  pub kind: u8,
  pub value: u64,
}

impl IntVarEvent {
  fn parse(mut b: Bytes) -> Result<Self> {
    let kind = b.get_u8();
    let value = b.get_u64_le();
    Ok(Self { kind, value })
  }
}

#[derive(Debug)]
pub struct RandEvent {
  pub seed1: u64,
  pub seed2: u64,
}

impl RandEvent {
  fn parse(mut b: Bytes) -> Result<Self> {
    let seed1 = b.get_u64_le();
    let seed2 = b.get_u64_le();
    Ok(Self { seed1, seed2 })
  }
}

#[derive(Debug)]
pub struct UserVarEvent {
  pub name: String,
  pub value: Option<Bytes>,
  pub value_type: Option<u8>,
  pub charset: Option<u32>,
}

impl UserVarEvent {
  fn parse(mut b: Bytes) -> Result<Self> {
    let name_len = b.get_u32_le() as usize;
    let name = b.mysql_get_fixed_length_string(name_len)?;
    let is_null = b.get_u8();

    if is_null != 0 {
      return Ok(Self { name, value: None, value_type: None, charset: None });
    }

    let value_type = b.get_u8();
    let charset = b.get_u32_le();
    let value_len = b.get_u32_le() as usize;
    let value = b.copy_to_bytes(value_len);

    Ok(Self { name, value: Some(value), value_type: Some(value_type), charset: Some(charset) })
  }
}

#[derive(Debug)]
pub struct AppendBlockEvent {
  pub file_id: u32,
  pub block_data: Bytes,
}

impl AppendBlockEvent {
  fn parse(mut b: Bytes) -> Result<Self> {
    let file_id = b.get_u32_le();
    let block_data = b;
    Ok(Self { file_id, block_data })
  }
}

#[derive(Debug)]
pub struct BeginLoadQueryEvent {
  pub file_id: u32,
  pub block_data: Bytes,
}

impl BeginLoadQueryEvent {
  fn parse(mut b: Bytes) -> Result<Self> {
    let file_id = b.get_u32_le();
    let block_data = b;
    Ok(Self { file_id, block_data })
  }
}

#[derive(Debug)]
pub struct ExecuteLoadQueryEvent {
  pub slave_proxy_id: u32,
  pub execution_time: u32,
  pub error_code: u16,
  pub file_id: u32,
  pub start_pos: u32,
  pub end_pos: u32,
  pub dup_handling_flags: u8,
  pub status_vars: Bytes,
  pub schema: String,
  pub query: String,
}

impl ExecuteLoadQueryEvent {
  fn parse(mut b: Bytes) -> Result<Self> {
    let slave_proxy_id = b.get_u32_le();
    let execution_time = b.get_u32_le();
    let schema_len: usize = b.get_u8().into();
    let error_code = b.get_u16_le();
    let status_vars_len: usize = b.get_u16_le().into();
    let file_id = b.get_u32_le();
    let start_pos = b.get_u32_le();
    let end_pos = b.get_u32_le();
    let dup_handling_flags = b.get_u8();
    let status_vars = b.split_to(status_vars_len);
    let schema = b.split_to(schema_len);
    let schema = std::str::from_utf8(schema.chunk())
      .map_err(|_| Error::protocol("non-utf8 execute-load-query event schema"))?
      .to_string();
    b.advance(1);
    let query = String::from_utf8(b.to_vec()).map_err(|_| Error::protocol("non-utf8 execute-load-query text"))?;

    Ok(Self {
      slave_proxy_id,
      execution_time,
      error_code,
      file_id,
      start_pos,
      end_pos,
      dup_handling_flags,
      status_vars,
      schema,
      query,
    })
  }
}

#[derive(Debug)]
pub struct IncidentEvent {
  pub incident_type: u16,
  pub message: String,
}

impl IncidentEvent {
  fn parse(mut b: Bytes) -> Result<Self> {
    let incident_type = b.get_u16_le();
    let message = b.mysql_get_lenc_string()?;
    Ok(Self { incident_type, message })
  }
}

#[derive(Debug)]
pub struct RotateEvent {
  pub next_log_position: u32,
  pub next_log_file: String,
}

impl RotateEvent {
  fn parse(mut b: Bytes) -> Result<Self> {
    let next_log_position = b.get_u64_le() as u32;
    let next_log_file = String::from_utf8(b.to_vec()).map_err(|_| Error::protocol("non-utf8 rotate file name"))?;

    Ok(Self { next_log_position, next_log_file })
  }
}

#[derive(Debug, Clone)]
pub struct TableMapEvent {
  pub table_id: u64,
  pub flags: u16,
  pub schema: String,
  pub table: String,
  pub column_count: usize,
  pub column_types: Vec<ColumnType>,
  pub column_metas: Vec<u32>,
  pub null_bitmap: Bytes,
  pub metadata: TableMapEventMetadata,
}

#[derive(Debug, Default, Clone)]
pub struct TableMapEventMetadata {
  pub is_unsigned_integer_bitmap: Option<Bytes>,
  pub default_charset: Option<(CharacterSet, Vec<(usize, CharacterSet)>)>,
  pub enum_and_set_default_charsets: Option<(CharacterSet, Vec<(usize, CharacterSet)>)>,
  pub column_charsets: Option<Vec<CharacterSet>>,
  pub enum_and_set_column_charsets: Option<Vec<CharacterSet>>,
  pub column_names: Option<Vec<String>>,
  pub set_str_values: Option<Vec<String>>,
  pub enum_str_values: Option<Vec<String>>,
  pub geometry_types: Option<Vec<u64>>,
  pub simple_primary_keys: Option<Vec<u64>>,
  pub primary_keys_with_prefixes: Option<Vec<(u64, u64)>>,
}

impl TableMapEventMetadata {
  fn parse(mut b: Bytes) -> Result<Self> {
    fn parse_default_charset(mut b: Bytes) -> Result<(CharacterSet, Vec<(usize, CharacterSet)>)> {
      let default_charset = b.mysql_get_lenc_uint_not_null()?;
      let default_charset = (default_charset as u8)
        .try_into()
        .map_err(|_| Error::protocol("unknown default charset"))?;

      let mut pairs = Vec::new();
      while b.remaining() > 0 {
        let index = b
          .mysql_get_lenc_uint_not_null()?
          .try_into()
          .map_err(|_| Error::protocol("charset column index out of range"))?;

        let charset = b.mysql_get_lenc_uint_not_null()?;
        let charset = (charset as u8).try_into().map_err(|_| Error::protocol("unknown column charset"))?;

        pairs.push((index, charset))
      }
      Ok((default_charset, pairs))
    }

    fn parse_column_charsets(mut b: Bytes) -> Result<Vec<CharacterSet>> {
      let mut column_charsets = Vec::new();
      while b.remaining() > 0 {
        let column_charset = b.mysql_get_lenc_uint_not_null()?;
        let column_charset =
          (column_charset as u8).try_into().map_err(|_| Error::protocol("unknown column charset"))?;
        column_charsets.push(column_charset);
      }
      Ok(column_charsets)
    }

    fn parse_strings(mut b: Bytes) -> Result<Vec<String>> {
      let length = b
        .mysql_get_lenc_uint_not_null()?
        .try_into()
        .map_err(|_| Error::protocol("string list length out of range"))?;
      let mut strings = Vec::with_capacity(length);
      for _i in 0..length {
        strings.push(b.mysql_get_lenc_string()?);
      }
      if b.remaining() != 0 {
        return Err(Error::protocol("trailing bytes after string list metadata"));
      }
      Ok(strings)
    }

    fn parse_ints(mut b: Bytes) -> Result<Vec<u64>> {
      let mut ints = Vec::new();
      while b.remaining() > 0 {
        ints.push(b.mysql_get_lenc_uint_not_null()?);
      }
      Ok(ints)
    }

    fn parse_column_names(mut b: Bytes) -> Result<Vec<String>> {
      let mut column_names = Vec::new();
      while b.remaining() > 0 {
        column_names.push(b.mysql_get_lenc_string()?);
      }
      Ok(column_names)
    }

    fn parse_keys_with_prefixes(mut b: Bytes) -> Result<Vec<(u64, u64)>> {
      let mut primary_keys_with_prefixes = Vec::new();
      while b.remaining() > 0 {
        let index = b.mysql_get_lenc_uint_not_null()?;
        let prefix = b.mysql_get_lenc_uint_not_null()?;
        primary_keys_with_prefixes.push((index, prefix));
      }
      Ok(primary_keys_with_prefixes)
    }

    let mut metadata = Self::default();

    while b.remaining() > 0 {
      let metadata_type: ColumnMetadataType =
        b.get_u8().try_into().map_err(|_| Error::protocol("unknown table-map metadata field type"))?;
      let metadata_len: usize = b
        .mysql_get_lenc_uint_not_null()?
        .try_into()
        .map_err(|_| Error::protocol("table-map metadata field length out of range"))?;
      let metadata_value = b.split_to(metadata_len);

      // https://github.com/mysql/mysql-server/blob/8.0/libbinlogevents/src/rows_event.cpp#L141
      match metadata_type {
        ColumnMetadataType::SIGNEDNESS => metadata.is_unsigned_integer_bitmap = Some(metadata_value),
        ColumnMetadataType::DEFAULT_CHARSET => {
          metadata.default_charset = Some(parse_default_charset(metadata_value)?)
        }
        ColumnMetadataType::COLUMN_CHARSET => metadata.column_charsets = Some(parse_column_charsets(metadata_value)?),
        ColumnMetadataType::COLUMN_NAME => metadata.column_names = Some(parse_column_names(metadata_value)?),
        ColumnMetadataType::SET_STR_VALUE => metadata.set_str_values = Some(parse_strings(metadata_value)?),
        ColumnMetadataType::ENUM_STR_VALUE => metadata.enum_str_values = Some(parse_strings(metadata_value)?),
        ColumnMetadataType::GEOMETRY_TYPE => metadata.geometry_types = Some(parse_ints(metadata_value)?),
        ColumnMetadataType::SIMPLE_PRIMARY_KEY => metadata.simple_primary_keys = Some(parse_ints(metadata_value)?),
        ColumnMetadataType::PRIMARY_KEY_WITH_PREFIX => {
          metadata.primary_keys_with_prefixes = Some(parse_keys_with_prefixes(metadata_value)?)
        }
        ColumnMetadataType::ENUM_AND_SET_DEFAULT_CHARSET => {
          metadata.enum_and_set_default_charsets = Some(parse_default_charset(metadata_value)?)
        }
        ColumnMetadataType::ENUM_AND_SET_COLUMN_CHARSET => {
          metadata.enum_and_set_column_charsets = Some(parse_column_charsets(metadata_value)?)
        }
        ColumnMetadataType::COLUMN_VISIBILITY => {}
      }
    }

    Ok(metadata)
  }
}

impl TableMapEvent {
  fn parse(mut b: Bytes) -> Result<Self> {
    let table_id = b.mysql_get_be_width_le(6)?;
    let flags = b.get_u16_le();

    let schema_len: usize = b.get_u8().into();
    let schema = b.split_to(schema_len);
    let schema = std::str::from_utf8(schema.chunk())
      .map_err(|_| Error::protocol("non-utf8 table-map schema name"))?
      .to_string();

    if b.get_u8() != 0x00 {
      return Err(Error::protocol("table-map schema name is missing its null terminator"));
    }

    let table_len: usize = b
      .mysql_get_lenc_uint_not_null()?
      .try_into()
      .map_err(|_| Error::protocol("table name length out of range"))?;
    let table = b.split_to(table_len);
    let table = std::str::from_utf8(table.chunk())
      .map_err(|_| Error::protocol("non-utf8 table-map table name"))?
      .to_string();

    if b.get_u8() != 0x00 {
      return Err(Error::protocol("table-map table name is missing its null terminator"));
    }

    let column_count: usize = b
      .mysql_get_lenc_uint_not_null()?
      .try_into()
      .map_err(|_| Error::protocol("column count out of range"))?;
    let mut column_types = Vec::with_capacity(column_count);
    for _ in 0..column_count {
      column_types.push(b.get_u8().try_into().map_err(|_| Error::protocol("unknown column type"))?);
    }

    let column_metas_buffer_len: usize = b
      .mysql_get_lenc_uint_not_null()?
      .try_into()
      .map_err(|_| Error::protocol("column metadata length out of range"))?;
    let mut column_metas_buffer = b.split_to(column_metas_buffer_len);
    let mut column_metas = vec![0u32; column_count];

    // https://dev.mysql.com/doc/dev/mysql-server/latest/classbinary__log_1_1Table__map__event.html#a1b84e5b226c76eaf9c0df8ed03ba1393
    for (i, t) in column_types.iter().enumerate() {
      match t {
        ColumnType::MYSQL_TYPE_FLOAT
        | ColumnType::MYSQL_TYPE_DOUBLE
        | ColumnType::MYSQL_TYPE_BLOB
        | ColumnType::MYSQL_TYPE_GEOMETRY
        | ColumnType::MYSQL_TYPE_JSON
        | ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB => {
          column_metas[i] = column_metas_buffer.get_u8().into();
        }

        ColumnType::MYSQL_TYPE_VARCHAR
        | ColumnType::MYSQL_TYPE_BIT
        | ColumnType::MYSQL_TYPE_VAR_STRING
        | ColumnType::MYSQL_TYPE_STRING
        | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
          column_metas[i] = column_metas_buffer.get_u16_le().into();
        }

        ColumnType::MYSQL_TYPE_TIMESTAMP2 | ColumnType::MYSQL_TYPE_DATETIME2 | ColumnType::MYSQL_TYPE_TIME2 => {
          // fsp, 0-6
          column_metas[i] = column_metas_buffer.get_u8().into();
        }

        ColumnType::MYSQL_TYPE_ENUM | ColumnType::MYSQL_TYPE_SET => {
          // value byte width, when not folded into MYSQL_TYPE_STRING
          column_metas[i] = column_metas_buffer.get_u8().into();
        }

        ColumnType::MYSQL_TYPE_DECIMAL
        | ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_NULL
        | ColumnType::MYSQL_TYPE_TIMESTAMP
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_DATE
        | ColumnType::MYSQL_TYPE_TIME
        | ColumnType::MYSQL_TYPE_DATETIME
        | ColumnType::MYSQL_TYPE_YEAR => {
          column_metas[i] = 0;
        }
      }
    }

    if column_metas_buffer.remaining() != 0 {
      return Err(Error::protocol("trailing bytes after column metadata block"));
    }
    let bitmap_len = (column_count + 7) / 8;
    let null_bitmap = b.split_to(bitmap_len);

    let metadata = TableMapEventMetadata::parse(b)?;

    Ok(Self {
      table_id,
      flags,
      schema,
      table,
      column_count,
      column_types,
      column_metas,
      null_bitmap,
      metadata,
    })
  }

  pub fn columns(&self) -> Result<Vec<Column>> {
    let column_names = self.metadata.column_names.as_ref();
    let enum_values = self.metadata.enum_str_values.as_ref();
    let set_values = self.metadata.set_str_values.as_ref();

    let mut signed_scan = 0usize;
    let mut out = Vec::with_capacity(self.column_count);

    for i in 0..self.column_count {
      let column_name = column_names.and_then(|v| v.get(i)).cloned().unwrap_or_default();
      let column_type = self.column_types[i];
      let column_meta = self.column_metas[i];
      let is_nullable = self.null_bitmap[i / 8] & (1 << (i % 8)) != 0;

      let column_type_definition = match column_type {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG => {
          let is_unsigned = self
            .metadata
            .is_unsigned_integer_bitmap
            .as_ref()
            .map(|bitmap| bitmap[signed_scan / 8] & (0x80 >> (signed_scan % 8)) != 0)
            .unwrap_or(false);

          let t = match column_type {
            ColumnType::MYSQL_TYPE_TINY if is_unsigned => ColumnTypeDefinition::U64 { pack_length: 1 },
            ColumnType::MYSQL_TYPE_TINY => ColumnTypeDefinition::I64 { pack_length: 1 },
            ColumnType::MYSQL_TYPE_SHORT if is_unsigned => ColumnTypeDefinition::U64 { pack_length: 2 },
            ColumnType::MYSQL_TYPE_SHORT => ColumnTypeDefinition::I64 { pack_length: 2 },
            ColumnType::MYSQL_TYPE_INT24 if is_unsigned => ColumnTypeDefinition::U64 { pack_length: 3 },
            ColumnType::MYSQL_TYPE_INT24 => ColumnTypeDefinition::I64 { pack_length: 3 },
            ColumnType::MYSQL_TYPE_LONG if is_unsigned => ColumnTypeDefinition::U64 { pack_length: 4 },
            ColumnType::MYSQL_TYPE_LONG => ColumnTypeDefinition::I64 { pack_length: 4 },
            ColumnType::MYSQL_TYPE_LONGLONG if is_unsigned => ColumnTypeDefinition::U64 { pack_length: 8 },
            ColumnType::MYSQL_TYPE_LONGLONG => ColumnTypeDefinition::I64 { pack_length: 8 },
            _ => unreachable!(),
          };

          signed_scan += 1;
          t
        }

        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
          let bytes = column_meta.to_le_bytes();
          ColumnTypeDefinition::Decimal { precision: bytes[0], scale: bytes[1] }
        }

        ColumnType::MYSQL_TYPE_FLOAT => ColumnTypeDefinition::F64 { pack_length: 4 },
        ColumnType::MYSQL_TYPE_DOUBLE => ColumnTypeDefinition::F64 { pack_length: 8 },

        ColumnType::MYSQL_TYPE_BLOB
        | ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB => {
          ColumnTypeDefinition::Blob { pack_length: column_meta as usize }
        }

        ColumnType::MYSQL_TYPE_DATE => ColumnTypeDefinition::Date(ColumnTypeDefinitionDate::U24),
        ColumnType::MYSQL_TYPE_DATETIME => ColumnTypeDefinition::Date(ColumnTypeDefinitionDate::U64),
        ColumnType::MYSQL_TYPE_DATETIME2 => {
          ColumnTypeDefinition::Date(ColumnTypeDefinitionDate::Arbitrary(column_meta as u8))
        }
        ColumnType::MYSQL_TYPE_TIME => ColumnTypeDefinition::Time(ColumnTypeDefinitionTime::U24),
        ColumnType::MYSQL_TYPE_TIME2 => {
          ColumnTypeDefinition::Time(ColumnTypeDefinitionTime::Arbitrary(column_meta as u8))
        }
        ColumnType::MYSQL_TYPE_YEAR => ColumnTypeDefinition::Year,
        ColumnType::MYSQL_TYPE_TIMESTAMP => ColumnTypeDefinition::Timestamp,
        ColumnType::MYSQL_TYPE_TIMESTAMP2 => ColumnTypeDefinition::Timestamp2 { fsp: column_meta as u8 },

        ColumnType::MYSQL_TYPE_JSON => ColumnTypeDefinition::Json { pack_length: column_meta as usize },
        ColumnType::MYSQL_TYPE_ENUM => {
          let values = enum_values.cloned().unwrap_or_default();
          ColumnTypeDefinition::Enum { value_width: column_meta as usize, values }
        }
        ColumnType::MYSQL_TYPE_SET => {
          let values = set_values.cloned().unwrap_or_default();
          ColumnTypeDefinition::Set { value_width: column_meta as usize, values }
        }
        ColumnType::MYSQL_TYPE_NULL => ColumnTypeDefinition::Blob { pack_length: 0 },
        ColumnType::MYSQL_TYPE_BIT => {
          let bytes = column_meta.to_le_bytes();
          let extra_bits = bytes[0]; // bits beyond whole bytes
          let whole_bytes = bytes[1];
          // Width in bits, not the naive `bits * 8 + bits`.
          let width_bits = 8 * whole_bytes as u32 + extra_bits as u32;
          ColumnTypeDefinition::Bit { width_bits }
        }
        ColumnType::MYSQL_TYPE_VARCHAR => {
          let pack_length = if column_meta > 255 { 2 } else { 1 };
          ColumnTypeDefinition::String { pack_length }
        }
        ColumnType::MYSQL_TYPE_VAR_STRING | ColumnType::MYSQL_TYPE_STRING => {
          // https://dev.mysql.com/doc/dev/mysql-server/latest/classbinary__log_1_1Table__map__event.html
          // Metadata is a combined (b1, b2) pair dual-purposed to also carry ENUM/SET's real
          // type when this table-map's column was collapsed into MYSQL_TYPE_STRING by the
          // source. b1 must be widened to the result type *before* shifting, or the high bits
          // of a string length above 255 are silently truncated.
          let bytes = column_meta.to_le_bytes();
          let (b1, b2) = (bytes[0], bytes[1]);

          if b1 & 0x30 != 0x30 {
            let combined_len = ((b1 as u16 & 0x30) ^ 0x30) << 4 | b2 as u16;
            let pack_length = if combined_len > 255 { 2 } else { 1 };
            ColumnTypeDefinition::String { pack_length }
          } else {
            match b1 {
              0xF7 => {
                let values = enum_values.cloned().unwrap_or_default();
                ColumnTypeDefinition::Enum { value_width: b2 as usize, values }
              }
              0xF8 => {
                let values = set_values.cloned().unwrap_or_default();
                ColumnTypeDefinition::Set { value_width: b2 as usize, values }
              }
              _ => ColumnTypeDefinition::String { pack_length: 1 },
            }
          }
        }
        ColumnType::MYSQL_TYPE_GEOMETRY => ColumnTypeDefinition::Blob { pack_length: column_meta as usize },
      };

      out.push(Column { column_name, is_nullable, column_type_definition });
    }

    Ok(out)
  }
}

#[derive(Debug)]
pub struct FormatDescriptionEvent {
  pub version: u16,
  pub server_version: String,
  pub create_timestamp: u32,
  pub event_header_length: u8,
  pub event_type_header_lengths: Bytes,
}

impl FormatDescriptionEvent {
  fn parse(mut b: Bytes) -> Result<Self> {
    let version = b.get_u16_le();
    // The 50-byte server-version field IS the null-padded version string; it is not a fixed
    // field followed by a second, separately null-terminated one.
    let server_version = b.mysql_get_fixed_length_string(50)?;
    let server_version = server_version.trim_end_matches('\0').to_string();
    let create_timestamp = b.get_u32_le();
    let event_header_length = b.get_u8();
    let event_type_header_lengths = b;

    Ok(Self { version, server_version, create_timestamp, event_header_length, event_type_header_lengths })
  }
}

#[derive(Debug)]
pub struct InsertRowEvent {
  pub table_id: u64,
  pub flags: u16,
  extras: Option<Bytes>,
  column_count: usize,
  columns_after_image: Bytes,
  rows: Bytes,
}

impl InsertRowEvent {
  fn parse(b: &mut Bytes, table_id_width: usize, use_extras: bool) -> Result<Self> {
    let RowEventHeader { table_id, flags, extras, column_count } =
      RowEventHeader::parse(b, table_id_width, use_extras)?;
    let bitmap_len = (column_count + 7) / 8;
    let columns_after_image = b.split_to(bitmap_len);
    let rows = b.split_off(0);
    Ok(Self { table_id, flags, extras, column_count, columns_after_image, rows })
  }

  pub fn rows(&self, columns: &[Column]) -> Result<Vec<Value>> {
    parse_rows(&mut self.rows.clone(), columns, &self.columns_after_image)
  }
}

struct RowEventHeader {
  table_id: u64,
  flags: u16,
  extras: Option<Bytes>,
  column_count: usize,
}

impl RowEventHeader {
  fn parse(b: &mut Bytes, table_id_width: usize, use_extras: bool) -> Result<Self> {
    let table_id = b.mysql_get_be_width_le(table_id_width)?;
    let flags = b.get_u16_le();
    let mut extras = None;
    if use_extras {
      let extras_len: usize = b
        .get_u16_le()
        .checked_sub(2)
        .ok_or_else(|| Error::protocol("row event extras length underflow"))?
        .into();
      extras = Some(b.split_to(extras_len))
    }
    let column_count: usize = b
      .mysql_get_lenc_uint_not_null()?
      .try_into()
      .map_err(|_| Error::protocol("column count out of range"))?;
    Ok(RowEventHeader { table_id, flags, extras, column_count })
  }
}

fn parse_rows(b: &mut Bytes, columns: &[Column], column_present: &Bytes) -> Result<Vec<Value>> {
  let mut rows = vec![];
  while b.remaining() > 0 {
    rows.append(&mut parse_row(b, columns, column_present)?);
  }
  Ok(rows)
}

fn parse_row(b: &mut Bytes, columns: &[Column], column_present: &Bytes) -> Result<Vec<Value>> {
  let null_bitmap = b.split_to(column_present.len());
  let mut values = Vec::with_capacity(columns.len());

  for (i, c) in columns.iter().enumerate() {
    let is_present = column_present[i / 8] & (1 << (i % 8)) != 0;
    if !is_present {
      continue;
    }

    let Column { column_type_definition, .. } = c;

    let is_null = null_bitmap[i / 8] & (1 << (i % 8)) != 0;

    if is_null {
      values.push(Value::Null);
      continue;
    }

    values.push(match column_type_definition {
        ColumnTypeDefinition::U64 { pack_length } => Value::U64(b.get_uint_le(*pack_length)),
        ColumnTypeDefinition::I64 { pack_length } => Value::I64(b.get_int_le(*pack_length)),
        ColumnTypeDefinition::F64 { pack_length } => match *pack_length {
          4 => Value::F64(b.get_f32_le().into()),
          8 => Value::F64(b.get_f64_le()),
          _ => return Err(Error::protocol("unsupported floating point pack length")),
        },
        ColumnTypeDefinition::Decimal { precision, scale } => {
          Value::Decimal(decimal::parse_decimal(b, *precision, *scale)?)
        }
        ColumnTypeDefinition::String { pack_length } => {
          let len: usize = b
            .get_uint_le(*pack_length)
            .try_into()
            .map_err(|_| Error::protocol("string length out of range"))?;
          let buffer = b.copy_to_bytes(len);
          Value::String(String::from_utf8(buffer.into()).map_err(|_| Error::protocol("non-utf8 string value"))?)
        }
        ColumnTypeDefinition::Blob { pack_length } => {
          let len: usize = if *pack_length == 0 {
            0
          } else {
            b.get_uint_le(*pack_length).try_into().map_err(|_| Error::protocol("blob length out of range"))?
          };
          Value::Blob(b.copy_to_bytes(len))
        }
        ColumnTypeDefinition::Json { pack_length } => {
          let len: usize =
            b.get_uint_le(*pack_length).try_into().map_err(|_| Error::protocol("json length out of range"))?;
          Value::Json(b.copy_to_bytes(len))
        }
        ColumnTypeDefinition::Year => {
          let year: u16 = b.get_u8().into();
          Value::Year(1900 + year)
        }
        ColumnTypeDefinition::Timestamp => {
          let seconds = b.get_u32_le();
          Value::Timestamp { seconds, micro_seconds: 0 }
        }
        ColumnTypeDefinition::Timestamp2 { fsp } => {
          let seconds = b.mysql_get_be_uint(4)? as u32;
          let micro_seconds = read_fractional_seconds(b, *fsp)?;
          Value::Timestamp { seconds, micro_seconds }
        }
        ColumnTypeDefinition::Date(ColumnTypeDefinitionDate::U24) => {
          let tmp = b.get_uint_le(3);
          if tmp == 0 {
            Value::Date { year: 0, month: 0, day: 0, hour: 0, minute: 0, second: 0, micro_second: 0 }
          } else {
            let day = (tmp & 31) as u8;
            let month = ((tmp >> 5) & 15) as u8;
            let year = (tmp >> 9) as u16;
            Value::Date { year, month, day, hour: 0, minute: 0, second: 0, micro_second: 0 }
          }
        }
        ColumnTypeDefinition::Date(ColumnTypeDefinitionDate::U64) => {
          let tmp = b.get_u64_le();
          if tmp == 0 {
            Value::Date { year: 0, month: 0, day: 0, hour: 0, minute: 0, second: 0, micro_second: 0 }
          } else {
            let date = tmp / 1_000_000;
            let time = tmp % 1_000_000;
            Value::Date {
              year: (date / 10000) as u16,
              month: ((date % 10000) / 100) as u8,
              day: (date % 100) as u8,
              hour: (time / 10000) as u8,
              minute: ((time % 10000) / 100) as u8,
              second: (time % 100) as u8,
              micro_second: 0,
            }
          }
        }
        ColumnTypeDefinition::Date(ColumnTypeDefinitionDate::Arbitrary(fsp)) => parse_datetime2(b, *fsp)?,
        ColumnTypeDefinition::Time(ColumnTypeDefinitionTime::U24) => {
          // Legacy TIME: a signed 24-bit HHMMSS integer, no fractional component. Sign-extend
          // from bit 23 before widening to i32.
          let raw = b.get_uint_le(3) as u32;
          let raw = if raw & 0x0080_0000 != 0 { (raw | 0xFF00_0000) as i32 } else { raw as i32 };
          let negative = raw < 0;
          let tmp = raw.unsigned_abs();
          Value::Time {
            negative,
            hours: (tmp / 10000) as u32,
            minutes: ((tmp % 10000) / 100) as u8,
            seconds: (tmp % 100) as u8,
            micro_seconds: 0,
          }
        }
        ColumnTypeDefinition::Time(ColumnTypeDefinitionTime::Arbitrary(fsp)) => parse_time2(b, *fsp)?,
        ColumnTypeDefinition::Set { value_width, values } => {
          let raw = b.mysql_get_uint_checked(*value_width)?;
          Value::Set { raw, values: values.clone() }
        }
        ColumnTypeDefinition::Enum { value_width, values } => {
          let raw = b.mysql_get_uint_checked(*value_width)?;
          Value::Enum { raw, values: values.clone() }
        }
        ColumnTypeDefinition::Bit { width_bits } => {
          let width_bytes = ((*width_bits + 7) / 8) as usize;
          Value::Bit(b.copy_to_bytes(width_bytes))
        }
      });
  }

  Ok(values)
}

/// DATETIME2: a 40-bit big-endian sign-biased integer packing
/// `(year*13+month)<<22 | day<<17 | hour<<12 | minute<<6 | second`, followed by an fsp-width
/// fractional-seconds suffix.
fn parse_datetime2(b: &mut Bytes, fsp: u8) -> Result<Value> {
  let raw = b.mysql_get_be_uint(5)?;
  let packed = raw.wrapping_sub(1u64 << 39);
  let ym = (packed >> 22) & 0x1FFFF;
  let year = (ym / 13) as u16;
  let month = (ym % 13) as u8;
  let day = ((packed >> 17) & 0x1F) as u8;
  let hour = ((packed >> 12) & 0x1F) as u8;
  let minute = ((packed >> 6) & 0x3F) as u8;
  let second = (packed & 0x3F) as u8;
  let micro_second = read_fractional_seconds(b, fsp)?;

  Ok(Value::Date { year, month, day, hour, minute, second, micro_second })
}

/// TIME2: a 24-bit big-endian sign-biased integer packing `hour<<12 | minute<<6 | second`,
/// followed by an fsp-width fractional-seconds suffix.
fn parse_time2(b: &mut Bytes, fsp: u8) -> Result<Value> {
  let raw = b.mysql_get_be_uint(3)? as i64;
  let packed = raw - (1i64 << 23);
  let negative = packed < 0;
  let abs = packed.unsigned_abs();
  let hours = ((abs >> 12) & 0x3FF) as u32;
  let minutes = ((abs >> 6) & 0x3F) as u8;
  let seconds = (abs & 0x3F) as u8;
  let micro_seconds = read_fractional_seconds(b, fsp)?;

  Ok(Value::Time { negative, hours, minutes, seconds, micro_seconds })
}

/// Reads the fsp-dependent fractional-seconds suffix shared by TIMESTAMP2/DATETIME2/TIME2:
/// `ceil(fsp/2)` big-endian bytes, scaled up to whole microseconds.
fn read_fractional_seconds(b: &mut Bytes, fsp: u8) -> Result<u32> {
  let bytes = ((fsp + 1) / 2) as usize;
  if bytes == 0 {
    return Ok(0);
  }
  let raw = b.mysql_get_be_uint(bytes)? as u32;
  let scale = 10u32.pow(6 - 2 * bytes as u32);
  Ok(raw * scale)
}

#[derive(Debug)]
pub struct UpdateRowEvent {
  pub table_id: u64,
  pub flags: u16,
  extras: Option<Bytes>,
  column_count: usize,
  columns_before_image: Bytes,
  columns_after_image: Bytes,
  rows: Bytes,
}

impl UpdateRowEvent {
  fn parse(b: &mut Bytes, table_id_width: usize, use_extras: bool) -> Result<Self> {
    let RowEventHeader { table_id, flags, extras, column_count } =
      RowEventHeader::parse(b, table_id_width, use_extras)?;
    let bitmap_len = (column_count + 7) / 8;
    let columns_before_image = b.split_to(bitmap_len);
    let columns_after_image = b.split_to(bitmap_len);
    let rows = b.split_off(0);
    Ok(Self { table_id, flags, extras, column_count, columns_before_image, columns_after_image, rows })
  }

  pub fn rows(&self, columns: &[Column]) -> Result<(Vec<Value>, Vec<Value>)> {
    let mut before = vec![];
    let mut after = vec![];

    let mut b = self.rows.clone();
    while b.remaining() > 0 {
      before.append(&mut parse_row(&mut b, columns, &self.columns_before_image)?);
      after.append(&mut parse_row(&mut b, columns, &self.columns_after_image)?);
    }

    Ok((before, after))
  }
}

#[derive(Debug)]
pub struct DeleteRowEvent {
  pub table_id: u64,
  pub flags: u16,
  extras: Option<Bytes>,
  column_count: usize,
  columns_before_image: Bytes,
  rows: Bytes,
}

impl DeleteRowEvent {
  fn parse(b: &mut Bytes, table_id_width: usize, use_extras: bool) -> Result<Self> {
    let RowEventHeader { table_id, flags, extras, column_count } =
      RowEventHeader::parse(b, table_id_width, use_extras)?;
    let bitmap_len = (column_count + 7) / 8;
    let columns_before_image = b.split_to(bitmap_len);
    let rows = b.split_off(0);
    Ok(Self { table_id, flags, extras, column_count, columns_before_image, rows })
  }

  pub fn rows(&self, columns: &[Column]) -> Result<Vec<Value>> {
    parse_rows(&mut self.rows.clone(), columns, &self.columns_before_image)
  }
}

#[derive(Debug)]
pub struct GtidEvent {}

impl GtidEvent {
  fn parse(_b: Bytes) -> Result<Self> {
    Ok(GtidEvent {})
  }
}

#[derive(Debug)]
pub struct PreviousGtidEvent {}

impl PreviousGtidEvent {
  fn parse(_b: Bytes) -> Result<Self> {
    Ok(PreviousGtidEvent {})
  }
}

#[derive(Debug)]
pub struct XidEvent {
  pub xid: u64,
}

impl XidEvent {
  fn parse(mut b: Bytes) -> Result<Self> {
    let xid = b.get_u64_le();
    Ok(Self { xid })
  }
}

#[derive(Debug)]
pub struct AnonymousGtidEvent {
  #[allow(dead_code)]
  b: Bytes,
}

impl AnonymousGtidEvent {
  fn parse(b: Bytes) -> Result<Self> {
    Ok(Self { b })
  }
}

#[derive(Debug, PartialEq)]
pub enum Value {
  Null,
  U64(u64),
  I64(i64),
  F64(f64),
  Decimal(BigDecimal),
  String(String),
  Blob(Bytes),
  Json(Bytes),
  Year(u16),
  Date {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    micro_second: u32,
  },
  Time {
    negative: bool,
    hours: u32,
    minutes: u8,
    seconds: u8,
    micro_seconds: u32,
  },
  Timestamp {
    seconds: u32,
    micro_seconds: u32,
  },
  Bit(Bytes),
  Enum {
    raw: u64,
    values: Vec<String>,
  },
  Set {
    raw: u64,
    values: Vec<String>,
  },
}

#[derive(Debug)]
pub struct Column {
  pub column_name: String,
  pub is_nullable: bool,
  pub column_type_definition: ColumnTypeDefinition,
}

#[derive(Debug)]
pub enum ColumnTypeDefinitionDate {
  U24,
  U64,
  Arbitrary(u8),
}

#[derive(Debug)]
pub enum ColumnTypeDefinitionTime {
  U24,
  Arbitrary(u8),
}

#[derive(Debug)]
pub enum ColumnTypeDefinition {
  U64 { pack_length: usize },
  I64 { pack_length: usize },
  F64 { pack_length: usize },
  Decimal { precision: u8, scale: u8 },
  Json { pack_length: usize },
  String { pack_length: usize },
  Blob { pack_length: usize },
  Date(ColumnTypeDefinitionDate),
  Year,
  Time(ColumnTypeDefinitionTime),
  Timestamp,
  Timestamp2 { fsp: u8 },
  Bit { width_bits: u32 },
  Set { value_width: usize, values: Vec<String> },
  Enum { value_width: usize, values: Vec<String> },
}

/// Little- and big-endian width-prefixed integer readers shared by the row/table-map codecs,
/// sized either statically (4 or 6 bytes for `table_id`) or from table-map metadata.
trait BufBinlogExt: Buf {
  fn mysql_get_be_width_le(&mut self, width: usize) -> Result<u64> {
    if self.remaining() < width {
      return Err(Error::protocol("buffer underrun reading table id"));
    }
    Ok(self.get_uint_le(width))
  }
}

impl<T> BufBinlogExt for T where T: Buf {}

#[cfg(test)]
mod test {
  use super::*;

  fn parse(bytes: &[u8]) -> (BinlogEventHeader, BinlogEvent) {
    let mut session = SessionState::default();
    BinlogEventHeader::parse(Bytes::copy_from_slice(bytes), false, &mut session).unwrap()
  }

  #[test]
  fn parses_rotate() {
    const ROTATE_EVENT: &[u8] = b"\x00\x00\x00\x00\x00\x04\x01\x00\x00\x00\x2d\x00\x00\x00\x00\x00\x00\
                                       \x00\x20\x00\x96\x00\x00\x00\x00\x00\x00\x00\x73\x68\x6f\x70\x69\x66\
                                       \x79\x2d\x62\x69\x6e\x2e\x30\x30\x30\x30\x30\x35";

    let (_header, event) = parse(ROTATE_EVENT);
    match event {
      BinlogEvent::Rotate(packet) => {
        assert_eq!(150, packet.next_log_position);
        assert_eq!("shopify-bin.000005", packet.next_log_file);
      }
      unexpected => panic!("unexpected {:?}", unexpected),
    }
  }

  #[test]
  fn parses_format_description() {
    const FORMAT_DESCRIPTION_EVENT: &[u8] = b"\x00\xf2\x43\x5d\x5d\x0f\x01\x00\x00\x00\x77\x00\x00\x00\x00\x00\x00\
                                                   \x00\x00\x00\x04\x00\x35\x2e\x37\x2e\x31\x38\x2d\x31\x36\x2d\x6c\x6f\
                                                   \x67\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
                                                   \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
                                                   \x00\x00\x00\x00\x00\x00\x00\x00\x13\x38\x0d\x00\x08\x00\x12\x00\x04\
                                                   \x04\x04\x04\x12\x00\x00\x5f\x00\x04\x1a\x08\x00\x00\x00\x08\x08\x08\
                                                   \x02\x00\x00\x00\x0a\x0a\x0a\x2a\x2a\x00\x12\x34\x00\x00\xc2\x36\x0c\
                                                   \xdf";

    let (_header, event) = parse(FORMAT_DESCRIPTION_EVENT);
    match event {
      BinlogEvent::FormatDescription(packet) => {
        assert_eq!(4, packet.version);
        assert_eq!("5.7.18-16-log", packet.server_version);
        assert_eq!(0, packet.create_timestamp);
      }
      unexpected => panic!("unexpected {:?}", unexpected),
    }
  }

  #[test]
  fn parses_anonymous_gtid() {
    const ANONYMOUS_GTID_EVENT: &[u8] = b"\x00\xfc\x5a\x5d\x5d\x22\x01\x00\x00\x00\x3d\x00\x00\x00\xd3\x00\x00\
                                               \x00\x00\x00\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\
                                               \x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x02\x00\x00\x00\x00\x00\
                                               \x00\x00\x00\x01\x00\x00\x00\x00\x00\x00\x00";

    let (_header, event) = parse(ANONYMOUS_GTID_EVENT);
    match event {
      BinlogEvent::AnonymousGtid(_) => {}
      unexpected => panic!("unexpected {:?}", unexpected),
    }
  }

  #[test]
  fn parses_query() {
    const QUERY_EVENT: &[u8] = b"\x00\xfc\x5a\x5d\x5d\x02\x01\x00\x00\x00\x44\x00\x00\x00\x17\x01\x00\
                                      \x00\x08\x00\x3b\x18\x00\x00\x00\x00\x00\x00\x04\x00\x00\x1a\x00\x00\
                                      \x00\x00\x00\x00\x01\x00\x00\x00\x40\x00\x00\x00\x00\x06\x03\x73\x74\
                                      \x64\x04\x21\x00\x21\x00\x2d\x00\x70\x65\x74\x73\x00\x42\x45\x47\x49\
                                      \x4e";

    let (_header, event) = parse(QUERY_EVENT);
    match event {
      BinlogEvent::Query(packet) => {
        assert_eq!("pets", packet.schema);
        assert_eq!("BEGIN", packet.query);
      }
      unexpected => panic!("unexpected {:?}", unexpected),
    }
  }

  #[test]
  fn parses_table_map() {
    const TABLE_MAP_EVENT: &[u8] = b"\x00\xfc\x5a\x5d\x5d\x13\x01\x00\x00\x00\x32\x00\x00\x00\x49\x01\x00\
                                          \x00\x00\x00\x2d\x0a\x00\x00\x00\x00\x01\x00\x04\x70\x65\x74\x73\x00\
                                          \x04\x63\x61\x74\x73\x00\x04\x03\x0f\x0f\x0a\x04\x58\x02\x58\x02\x00";

    let (_header, event) = parse(TABLE_MAP_EVENT);
    match event {
      BinlogEvent::TableMap(packet) => {
        assert_eq!(2605, packet.table_id);
        assert_eq!(1, packet.flags);
        assert_eq!(4, packet.column_count);
        assert_eq!("pets", packet.schema);
        assert_eq!("cats", packet.table);
      }
      unexpected => panic!("unexpected {:?}", unexpected),
    }
  }

  #[test]
  fn parses_insert_row() {
    const INSERT_ROW_EVENT: &[u8] = b"\x00\xfc\x5a\x5d\x5d\x1e\x01\x00\x00\x00\x37\x00\x00\x00\x80\x01\x00\
                                           \x00\x00\x00\x2d\x0a\x00\x00\x00\x00\x01\x00\x02\x00\x04\xff\xf0\x04\
                                           \x00\x00\x00\x07\x00\x43\x68\x61\x72\x6c\x69\x65\x05\x00\x52\x69\x76\
                                           \x65\x72\xb5\xc0\x0f";

    let (_header, event) = parse(INSERT_ROW_EVENT);
    match event {
      BinlogEvent::Insert(packet) => {
        assert_eq!(2605, packet.table_id);
        assert_eq!(1, packet.flags);
      }
      unexpected => panic!("unexpected {:?}", unexpected),
    }
  }

  #[test]
  fn parses_xid_event() {
    const XID_EVENT: &[u8] = b"\x00\xfc\x5a\x5d\x5d\x10\x01\x00\x00\x00\x1b\x00\x00\x00\x9b\x01\x00\
                                    \x00\x00\x00\x72\x0e\x00\x00\x00\x00\x00\x00";

    let (_header, event) = parse(XID_EVENT);
    match event {
      BinlogEvent::Xid(packet) => assert_eq!(0x0e72, packet.xid),
      unexpected => panic!("unexpected {:?}", unexpected),
    }
  }

  #[test]
  fn decodes_insert_row_values() {
    const INSERT_ROW_EVENT: &[u8] = b"\x00\xfc\x5a\x5d\x5d\x1e\x01\x00\x00\x00\x37\x00\x00\x00\x80\x01\x00\
                                           \x00\x00\x00\x2d\x0a\x00\x00\x00\x00\x01\x00\x02\x00\x04\xff\xf0\x04\
                                           \x00\x00\x00\x07\x00\x43\x68\x61\x72\x6c\x69\x65\x05\x00\x52\x69\x76\
                                           \x65\x72\xb5\xc0\x0f";

    let (_header, event) = parse(INSERT_ROW_EVENT);
    let BinlogEvent::Insert(packet) = event else { panic!("expected insert") };

    let columns = vec![
      Column {
        column_name: "id".into(),
        is_nullable: false,
        column_type_definition: ColumnTypeDefinition::U64 { pack_length: 4 },
      },
      Column {
        column_name: "first_name".into(),
        is_nullable: false,
        column_type_definition: ColumnTypeDefinition::String { pack_length: 1 },
      },
      Column {
        column_name: "last_name".into(),
        is_nullable: false,
        column_type_definition: ColumnTypeDefinition::String { pack_length: 1 },
      },
    ];

    let rows = packet.rows(&columns).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1], Value::String("Charlie".into()));
    assert_eq!(rows[2], Value::String("River".into()));
  }

  #[test]
  fn decimal_round_trips_through_row_decode() {
    let mut b = Bytes::from_static(&[0x80, 0x00, 0x30, 0x39, 0x43]);
    let value = decimal::parse_decimal(&mut b, 10, 2).unwrap();
    assert_eq!(value, "12345.67".parse().unwrap());
  }
}
