use sha1::{Digest, Sha1};

/// `mysql_native_password` scramble: `SHA1(password) XOR SHA1(nonce || SHA1(SHA1(password)))`.
///
/// Returns `None` for an empty password, matching the server's own convention of accepting an
/// empty auth-response in that case rather than a 20-byte digest of nothing.
pub fn scramble_native(nonce: &[u8], password: &[u8]) -> Option<[u8; 20]> {
  if password.is_empty() {
    return None;
  }

  let password_sha1 = Sha1::digest(password);
  let password_sha1_sha1 = Sha1::digest(password_sha1);

  let mut hasher = Sha1::new();
  hasher.update(nonce);
  hasher.update(password_sha1_sha1);
  let salted = hasher.finalize();

  let mut out = [0u8; 20];
  for i in 0..20 {
    out[i] = password_sha1[i] ^ salted[i];
  }
  Some(out)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn empty_password_scrambles_to_none() {
    assert_eq!(scramble_native(b"01234567890123456789", b""), None);
  }

  #[test]
  fn scramble_is_deterministic_and_nonce_dependent() {
    let a = scramble_native(b"01234567890123456789", b"hunter2").unwrap();
    let b = scramble_native(b"01234567890123456789", b"hunter2").unwrap();
    assert_eq!(a, b);

    let c = scramble_native(b"98765432109876543210", b"hunter2").unwrap();
    assert_ne!(a, c);
  }
}
