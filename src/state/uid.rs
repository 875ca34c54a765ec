//! Connection identifiers.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a connection (SID + 6 base-36 characters).
pub type Uid = String;

/// Generates connection ids of the form `SID` + `AAAAAA`.
///
/// Example: "001AAAAAB"
pub struct UidGenerator {
    sid: String,
    counter: AtomicU64,
}

impl UidGenerator {
    pub fn new(sid: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Generate the next unique id.
    pub fn next(&self) -> Uid {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.sid, base36_encode_6(n))
    }
}

/// Encode a number as a 6-character base36 string (wraps after 36^6).
fn base36_encode_6(mut n: u64) -> String {
    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut result = [b'A'; 6];

    for slot in result.iter_mut().rev() {
        *slot = CHARS[(n % 36) as usize];
        n /= 36;
    }

    String::from_utf8_lossy(&result).into_owned()
}
