use std::slice::{ChunksExact, ChunksExactMut};

use bytes::{Buf, Bytes};

use super::{
  buf_ext::BufExt,
  constants::{CharacterSet, ColumnFlags, ColumnType},
  error::{Error, Result},
};

/// Owned results for 0..N rows.
#[derive(Debug, Default)]
pub struct QueryResults {
  pub columns: Vec<Column>,
  pub values: Vec<RowValue>,
}

impl QueryResults {
  pub fn columns_len(&self) -> usize {
    self.columns.len()
  }

  pub fn row(&self, i: usize) -> &[RowValue] {
    let len = self.columns.len();
    let start = i * len;
    let end = start + len;
    &self.values[start..end]
  }

  pub fn row_mut(&mut self, i: usize) -> &mut [RowValue] {
    let len = self.columns.len();
    let start = i * len;
    let end = start + len;
    &mut self.values[start..end]
  }

  pub fn rows_len(&self) -> usize {
    if !self.columns.is_empty() {
      self.values.len() / self.columns.len()
    } else {
      0
    }
  }

  pub fn rows(&self) -> Option<ChunksExact<'_, RowValue>> {
    if !self.columns.is_empty() {
      Some(self.values.chunks_exact(self.columns.len()))
    } else {
      None
    }
  }

  pub fn rows_mut(&mut self) -> Option<ChunksExactMut<'_, RowValue>> {
    if !self.columns.is_empty() {
      Some(self.values.chunks_exact_mut(self.columns.len()))
    } else {
      None
    }
  }
}

// https://mariadb.com/kb/en/connection/#sslrequest-packet
// https://dev.mysql.com/doc/refman/8.0/en/charset-connection.html
pub type RowValue = Option<String>;

#[derive(Debug)]
pub struct Column {
  catalog: String,
  schema: String,
  table: String,
  name: String,
  org_table: String,
  character_set: CharacterSet,
  column_length: u32,
  column_type: ColumnType,
  flags: ColumnFlags,
  decimals: u8,
}

impl Column {
  pub(crate) fn parse(mut b: Bytes) -> Result<Self> {
    let catalog = b.mysql_get_lenc_string()?;
    if catalog != "def" {
      return Err(Error::protocol("column definition catalog is not \"def\""));
    }
    let schema = b.mysql_get_lenc_string()?;
    let table = b.mysql_get_lenc_string()?;
    let org_table = b.mysql_get_lenc_string()?;
    let name = b.mysql_get_lenc_string()?;
    let _org_name = b.mysql_get_lenc_string()?;
    let fixed_len = b.mysql_get_lenc_uint_not_null()?;
    if fixed_len != 0x0C {
      return Err(Error::protocol("column definition fixed-length field is not 0x0c"));
    }
    let character_set = (b.get_u16_le() as u8)
      .try_into()
      .map_err(|_| Error::protocol("unknown column character set"))?;
    let column_length = b.get_u32_le();
    let column_type = b
      .get_u8()
      .try_into()
      .map_err(|_| Error::protocol("unknown column type"))?;
    let flags = ColumnFlags::from_bits_truncate(b.get_u16_le());
    let decimals = b.get_u8();

    Ok(Self {
      catalog,
      schema,
      table,
      name,
      org_table,
      character_set,
      column_length,
      column_type,
      flags,
      decimals,
    })
  }
}
