use crate::error::{Error, Result};
use bigdecimal::BigDecimal;
use bytes::{Buf, Bytes};
use std::str::FromStr;

const DIGITS_PER_INT: u8 = 9;
const COMPRESSED_BYTES: [u8; 10] = [0, 1, 1, 2, 2, 3, 3, 4, 4, 4];

struct Layout {
  length: usize,
  compressed_integral: u8,
  compressed_fractional: u8,
  uncompressed_integral: u8,
  uncompressed_fractional: u8,
}

fn layout(precision: u8, scale: u8) -> Layout {
  let integral = precision - scale;

  let uncompressed_integral = integral / DIGITS_PER_INT;
  let uncompressed_fractional = scale / DIGITS_PER_INT;
  let compressed_integral = integral - uncompressed_integral * DIGITS_PER_INT;
  let compressed_fractional = scale - uncompressed_fractional * DIGITS_PER_INT;

  let length = (uncompressed_integral * 4) as usize
    + COMPRESSED_BYTES[compressed_integral as usize] as usize
    + (uncompressed_fractional * 4) as usize
    + COMPRESSED_BYTES[compressed_fractional as usize] as usize;

  Layout { length, compressed_integral, compressed_fractional, uncompressed_integral, uncompressed_fractional }
}

/// Decodes a MySQL `NEWDECIMAL` wire value into an exact, arbitrary-precision decimal.
///
/// Format (big-endian, sign-biased): a leading compressed group, zero or more full 4-byte
/// uncompressed integer groups, a decimal point, zero or more uncompressed fractional groups, and
/// a trailing compressed fractional group.
pub fn parse_decimal(b: &mut Bytes, precision: u8, scale: u8) -> Result<BigDecimal> {
  let l = layout(precision, scale);
  if b.remaining() < l.length {
    return Err(Error::protocol("truncated decimal value"));
  }
  let mut value = b.copy_to_bytes(l.length).to_vec();

  let negative = (value[0] & 0x80) == 0;
  value[0] ^= 0x80;
  if negative {
    for byte in value.iter_mut() {
      *byte ^= 0xFF;
    }
  }

  let mut buf = Bytes::from(value);
  let mut digits = String::new();
  let mut started = false;

  let leading = COMPRESSED_BYTES[l.compressed_integral as usize] as usize;
  if leading > 0 {
    let n = read_be_uint(&mut buf, leading)?;
    if n > 0 {
      started = true;
      digits.push_str(&n.to_string());
    }
  }
  for _ in 0..l.uncompressed_integral {
    let n = buf.get_u32();
    if started {
      digits.push_str(&format!("{:09}", n));
    } else if n > 0 {
      started = true;
      digits.push_str(&n.to_string());
    }
  }
  if !started {
    digits.push('0');
  }

  if scale > 0 {
    digits.push('.');
  }
  for _ in 0..l.uncompressed_fractional {
    let n = buf.get_u32();
    digits.push_str(&format!("{:09}", n));
  }
  let trailing = COMPRESSED_BYTES[l.compressed_fractional as usize] as usize;
  if trailing > 0 {
    let n = read_be_uint(&mut buf, trailing)?;
    digits.push_str(&format!("{:0width$}", n, width = l.compressed_fractional as usize));
  }

  if negative {
    digits.insert(0, '-');
  }

  BigDecimal::from_str(&digits).map_err(|_| Error::protocol("malformed decimal digit string"))
}

fn read_be_uint(b: &mut Bytes, width: usize) -> Result<u32> {
  if b.remaining() < width {
    return Err(Error::protocol("truncated decimal group"));
  }
  let mut v: u32 = 0;
  for _ in 0..width {
    v = (v << 8) | b.get_u8() as u32;
  }
  Ok(v)
}

#[cfg(test)]
mod test {
  use super::*;
  use std::str::FromStr;

  fn decode(bytes: &[u8], precision: u8, scale: u8) -> BigDecimal {
    let mut b = Bytes::copy_from_slice(bytes);
    parse_decimal(&mut b, precision, scale).unwrap()
  }

  #[test]
  fn parses_positive_integer() {
    // decimal(10,2), value 12345.67: 4-byte compressed integral group (00012345) + 1-byte
    // compressed fractional group (67), sign bit flipped on the leading byte.
    let value: Vec<u8> = vec![0x80, 0x00, 0x30, 0x39, 0x43];
    let got = decode(&value, 10, 2);
    assert_eq!(got, BigDecimal::from_str("12345.67").unwrap());
  }

  #[test]
  fn parses_negative_integer() {
    let positive: Vec<u8> = vec![0x80, 0x00, 0x30, 0x39, 0x43];
    let mut negative = positive.clone();
    for b in negative.iter_mut() {
      *b ^= 0xFF;
    }
    let got = decode(&negative, 10, 2);
    assert_eq!(got, BigDecimal::from_str("-12345.67").unwrap());
  }
}
