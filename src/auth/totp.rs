// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::Debug;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use chrono::Utc;

use data_encoding::BASE32_NOPAD;

use hmac::Hmac;
use hmac::Mac as _;

use sha1::Sha1;

use crate::Error;

type HmacSha1 = Hmac<Sha1>;

/// The time step, in seconds.
const STEP: u64 = 30;
/// The number of digits of generated codes.
const DIGITS: u32 = 6;


/// A generator of time based one-time passwords as described by
/// RFC 6238, as used by authenticator apps.
#[derive(Clone)]
pub struct Totp {
  mac: HmacSha1,
  digits: u32,
}

impl Totp {
  /// Create a `Totp` object from a base32 encoded secret.
  ///
  /// Case, whitespace, and padding of the secret are ignored.
  pub fn from_base32(secret: &str) -> Result<Self, Error> {
    let secret = secret
      .chars()
      .filter(|c| !c.is_whitespace() && *c != '=')
      .map(|c| c.to_ascii_uppercase())
      .collect::<String>();

    let key = BASE32_NOPAD
      .decode(secret.as_bytes())
      .map_err(|err| Error::Str(format!("invalid authenticator secret: {err}").into()))?;
    if key.is_empty() {
      return Err(Error::Str("authenticator secret is empty".into()))
    }

    let mac = HmacSha1::new_from_slice(&key)
      .map_err(|err| Error::Str(format!("invalid authenticator secret: {err}").into()))?;

    Ok(Self {
      mac,
      digits: DIGITS,
    })
  }

  #[cfg(test)]
  fn with_digits(mut self, digits: u32) -> Self {
    self.digits = digits;
    self
  }

  /// Generate the code valid at the given Unix time.
  pub fn generate(&self, time: u64) -> String {
    let counter = time / STEP;

    let mut mac = self.mac.clone();
    mac.update(&counter.to_be_bytes());
    let hash = mac.finalize().into_bytes();

    let offset = usize::from(hash[hash.len() - 1] & 0x0f);
    let binary = u32::from_be_bytes([
      hash[offset] & 0x7f,
      hash[offset + 1],
      hash[offset + 2],
      hash[offset + 3],
    ]);
    let code = binary % 10u32.pow(self.digits);
    format!("{code:0width$}", width = self.digits as usize)
  }

  /// Generate the code valid now.
  pub fn now(&self) -> String {
    let time = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
    self.generate(time)
  }
}

impl Debug for Totp {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_struct("Totp")
      .field("secret", &"<masked>")
      .field("digits", &self.digits)
      .finish()
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  /// The secret "12345678901234567890" used by the RFC's test vectors.
  const SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";


  /// Check the SHA-1 test vectors of RFC 6238.
  #[test]
  fn rfc6238_vectors() {
    let totp = Totp::from_base32(SECRET).unwrap().with_digits(8);
    assert_eq!(totp.generate(59), "94287082");
    assert_eq!(totp.generate(1111111109), "07081804");
    assert_eq!(totp.generate(1111111111), "14050471");
    assert_eq!(totp.generate(1234567890), "89005924");
    assert_eq!(totp.generate(2000000000), "69279037");
    assert_eq!(totp.generate(20000000000), "65353130");
  }

  /// Check that six digit codes are the tail of the eight digit ones.
  #[test]
  fn six_digits() {
    let totp = Totp::from_base32(SECRET).unwrap();
    assert_eq!(totp.generate(59), "287082");
    assert_eq!(totp.generate(1111111109), "081804");
    assert_eq!(totp.generate(1234567890), "005924");
    assert_eq!(totp.now().len(), 6);
  }

  /// Check that secrets are normalized before decoding.
  #[test]
  fn normalize_secret() {
    let totp = Totp::from_base32("gezd gnbv gy3t qojq gezd gnbv gy3t qojq").unwrap();
    assert_eq!(totp.generate(59), "287082");

    let totp = Totp::from_base32("JBSWY3DPEHPK3PXP====").unwrap();
    let _code = totp.now();
  }

  /// Make sure that invalid secrets are rejected.
  #[test]
  fn invalid_secret() {
    assert!(Totp::from_base32("not base32!").is_err());
    assert!(Totp::from_base32("").is_err());
  }

  /// Make sure that the secret is not leaked in `Debug` output.
  #[test]
  fn debug_masks_secret() {
    let totp = Totp::from_base32(SECRET).unwrap();
    let string = format!("{totp:?}");
    assert!(!string.contains(SECRET), "{string}");
  }
}
