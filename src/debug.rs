use std::fmt::{self, Debug};

pub struct DebugBytesRef<'a>(pub &'a [u8]);

impl Debug for DebugBytesRef<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "b\"")?;
    for &b in self.0 {
      // https://doc.rust-lang.org/reference/tokens.html#byte-escapes
      if b == b'\n' {
        write!(f, "\\n")?;
      } else if b == b'\r' {
        write!(f, "\\r")?;
      } else if b == b'\t' {
        write!(f, "\\t")?;
      } else if b == b'\\' || b == b'"' {
        write!(f, "\\{}", b as char)?;
      } else if b == b'\0' {
        write!(f, "\\0")?;
      // ASCII printable
      } else if (0x20..0x7f).contains(&b) {
        write!(f, "{}", b as char)?;
      } else {
        write!(f, "\\x{:02x}", b)?;
      }
    }
    write!(f, "\"")?;
    Ok(())
  }
}
