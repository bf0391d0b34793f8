//! Stored-name generation for uploads.
//!
//! A stored name has the shape `<unix-millis>-<nonce>-<original>`, e.g.
//! `1718000000000-482913377-report.pdf`. The original name stays as a readable suffix (so the
//! extension and any client-side type sniffing are unaffected) and can be recovered with
//! [`original_name`] for download hints.
//!
//! Uniqueness is probabilistic: two uploads of the same name collide only if they land in the
//! same millisecond *and* draw the same nonce out of 10^9. The store does not check for this;
//! it opens with `create_new` so a collision fails the upload instead of overwriting a file.

use chrono::Utc;
use rand::prelude::RngExt;
use rand::rng;

/// Exclusive upper bound of the random component
const NONCE_SPACE: u32 = 1_000_000_000;

/// Digits in a Unix millisecond timestamp from September 2001 onwards
const MIN_MILLIS_DIGITS: usize = 13;

/// Build a fresh stored name for an upload called `original_name`.
pub fn generate(original_name: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let nonce = rng().random_range(0..NONCE_SPACE);
    format!("{millis}-{nonce}-{original_name}")
}

/// Recover the client-facing name from a stored name.
///
/// Names that do not carry a generator prefix (e.g. files renamed by a user) are returned as-is.
/// The timestamp field must have at least [`MIN_MILLIS_DIGITS`] digits, so user names such as
/// `2024-01-notes.txt` keep their leading date.
pub fn original_name(stored_name: &str) -> &str {
    let mut parts = stored_name.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(millis), Some(nonce), Some(rest))
            if millis.len() >= MIN_MILLIS_DIGITS && is_number(millis) && is_number(nonce) && !rest.is_empty() =>
        {
            rest
        }
        _ => stored_name,
    }
}

/// Reduce a multipart `filename` to its final path segment.
///
/// Browsers normally send a bare name, but nothing stops a client from sending
/// `../../x` or `C:\Users\me\x`; only the last segment is kept. Returns `None` when no usable
/// segment remains.
pub fn upload_base_name(client_name: &str) -> Option<&str> {
    let base = client_name.rsplit(['/', '\\']).next()?.trim();
    match base {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
