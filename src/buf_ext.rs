use crate::error::{Error, Result};
use bytes::{Buf, BufMut};

pub trait BufExt: Buf {
  fn mysql_get_eof_string(&mut self) -> Result<String> {
    self.mysql_get_fixed_length_string(self.remaining())
  }

  /// Returns a utf-8 encoded string terminated by `\0`.
  fn mysql_get_null_terminated_string(&mut self) -> Result<String> {
    match self.chunk().iter().position(|x| *x == 0x00) {
      Some(len) => {
        let mut buffer = vec![0; len];
        self.copy_to_slice(buffer.as_mut_slice());
        self.advance(1);
        String::from_utf8(buffer).map_err(|_| Error::protocol("non-utf8 string"))
      }
      None => Err(Error::protocol("missing null terminator")),
    }
  }

  /// Returns a utf-8 encoded string of length N, where N are in bytes.
  fn mysql_get_fixed_length_string(&mut self, len: usize) -> Result<String> {
    if self.remaining() < len {
      return Err(Error::protocol("buffer underrun reading fixed-length string"));
    }
    let mut bytes = vec![0; len];
    self.copy_to_slice(bytes.as_mut_slice());
    String::from_utf8(bytes).map_err(|_| Error::protocol("non-utf8 string"))
  }

  /// Returns a utf-8 encoded string of variable length. See `BufExt::mysql_get_lenc_uint`.
  fn mysql_get_lenc_string(&mut self) -> Result<String> {
    let len = self
      .mysql_get_lenc_uint()?
      .ok_or_else(|| Error::protocol("unexpected NULL length-encoded string"))?;
    let len = len.try_into().map_err(|_| Error::protocol("length-encoded string too long"))?;
    self.mysql_get_fixed_length_string(len)
  }

  /// Length-encoded integer, distinguishing the out-of-band NULL marker (`0xFB`) from a value.
  ///
  /// `0xFF` is reserved and is always a fatal protocol violation, never a value.
  fn mysql_get_lenc_uint(&mut self) -> Result<Option<u64>> {
    if !self.has_remaining() {
      return Err(Error::protocol("buffer underrun reading length-encoded integer"));
    }
    match self.get_u8() {
      0xfb => Ok(None),
      0xfc => self.mysql_get_uint_checked(2).map(Some),
      0xfd => self.mysql_get_uint_checked(3).map(Some),
      0xfe => self.mysql_get_uint_checked(8).map(Some),
      0xff => Err(Error::protocol("reserved length-encoded integer marker 0xff")),
      x => Ok(Some(x.into())),
    }
  }

  /// Like `mysql_get_lenc_uint`, but NULL is not a valid value in this context.
  fn mysql_get_lenc_uint_not_null(&mut self) -> Result<u64> {
    self
      .mysql_get_lenc_uint()?
      .ok_or_else(|| Error::protocol("unexpected NULL length-encoded integer"))
  }

  fn mysql_get_uint_checked(&mut self, bytes: usize) -> Result<u64> {
    if self.remaining() < bytes {
      return Err(Error::protocol("buffer underrun reading little-endian integer"));
    }
    Ok(self.get_uint_le(bytes))
  }

  /// Reads a big-endian unsigned integer of exactly `bytes` width, used by the packed-decimal
  /// and 5.6+ temporal wire formats.
  fn mysql_get_be_uint(&mut self, bytes: usize) -> Result<u64> {
    if self.remaining() < bytes {
      return Err(Error::protocol("buffer underrun reading big-endian integer"));
    }
    Ok(self.get_uint(bytes))
  }
}

pub trait BufMutExt: BufMut {
  fn mysql_put_lenc_uint(&mut self, v: u64) {
    if v < 251 {
      self.put_u8(v as u8);
      return;
    }

    if v < 2_u64.pow(16) {
      self.put_u8(0xFC);
      self.put_uint_le(v, 2);
      return;
    }

    if v < 2_u64.pow(24) {
      self.put_u8(0xFD);
      self.put_uint_le(v, 3);
      return;
    }

    self.put_u8(0xFE);
    self.put_uint_le(v, 8);
  }

  fn mysql_put_lenc_string(&mut self, v: &str) {
    self.mysql_put_lenc_uint(v.len() as u64);
    self.put_slice(v.as_bytes());
  }
}

// Blanket implementations
impl<T> BufExt for T where T: Buf {}
impl<T> BufMutExt for T where T: BufMut {}

#[cfg(test)]
mod test {
  use super::*;
  use bytes::Bytes;

  #[test]
  fn lenc_uint_raw() {
    let mut b = Bytes::from_static(&[0x05]);
    assert_eq!(b.mysql_get_lenc_uint().unwrap(), Some(5));
  }

  #[test]
  fn lenc_uint_null() {
    let mut b = Bytes::from_static(&[0xfb]);
    assert_eq!(b.mysql_get_lenc_uint().unwrap(), None);
  }

  #[test]
  fn lenc_uint_reserved_marker_is_fatal() {
    let mut b = Bytes::from_static(&[0xff]);
    assert!(b.mysql_get_lenc_uint().is_err());
  }

  #[test]
  fn lenc_uint_two_byte() {
    let mut b = Bytes::from_static(&[0xfc, 0x2c, 0x01]);
    assert_eq!(b.mysql_get_lenc_uint().unwrap(), Some(300));
  }

  #[test]
  fn null_terminated_string_requires_terminator() {
    let mut b = Bytes::from_static(b"no-terminator");
    assert!(b.mysql_get_null_terminated_string().is_err());
  }
}
