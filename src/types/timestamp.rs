//! The timestamp extension (type -1).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut};

use crate::error::PackError;

/// Extension type reserved for timestamps.
pub const TIMESTAMP_TYPE: i8 = -1;

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// A point in time as seconds and nanoseconds since the Unix epoch.
///
/// `nanoseconds` is always below one second; instants before the epoch have
/// negative `seconds` and a non-negative nanosecond offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp {
    seconds: i64,
    nanoseconds: u32,
}

impl Timestamp {
    pub fn new(seconds: i64, nanoseconds: u32) -> Result<Self, PackError> {
        if nanoseconds >= NANOS_PER_SEC {
            return Err(PackError::InvalidTimestamp(format!(
                "nanoseconds out of range: {nanoseconds}"
            )));
        }
        Ok(Self {
            seconds,
            nanoseconds,
        })
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    /// Encodes the smallest official layout: 4, 8 or 12 bytes.
    pub fn to_ext_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(12);
        if self.seconds >> 34 == 0 {
            let packed = (u64::from(self.nanoseconds) << 34) | self.seconds as u64;
            if packed & 0xFFFF_FFFF_0000_0000 == 0 {
                // timestamp 32
                out.put_u32(packed as u32);
            } else {
                // timestamp 64
                out.put_u64(packed);
            }
        } else {
            // timestamp 96
            out.put_u32(self.nanoseconds);
            out.put_i64(self.seconds);
        }
        out
    }

    pub fn from_ext_bytes(mut data: &[u8]) -> Result<Self, PackError> {
        match data.len() {
            4 => Self::new(i64::from(data.get_u32()), 0),
            8 => {
                let packed = data.get_u64();
                let nanos = (packed >> 34) as u32;
                Self::new((packed & 0x0000_0003_FFFF_FFFF) as i64, nanos)
            }
            12 => {
                let nanos = data.get_u32();
                Self::new(data.get_i64(), nanos)
            }
            n => Err(PackError::InvalidTimestamp(format!(
                "payload must be 4, 8 or 12 bytes, got {n}"
            ))),
        }
    }

    pub fn to_system_time(&self) -> Option<SystemTime> {
        let nanos = Duration::from_nanos(u64::from(self.nanoseconds));
        if self.seconds >= 0 {
            UNIX_EPOCH.checked_add(Duration::from_secs(self.seconds as u64) + nanos)
        } else {
            UNIX_EPOCH
                .checked_sub(Duration::from_secs(self.seconds.unsigned_abs()))?
                .checked_add(nanos)
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(t: SystemTime) -> Self {
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => Self {
                seconds: d.as_secs() as i64,
                nanoseconds: d.subsec_nanos(),
            },
            Err(e) => {
                let d = e.duration();
                let mut seconds = -(d.as_secs() as i64);
                let mut nanoseconds = d.subsec_nanos();
                if nanoseconds > 0 {
                    seconds -= 1;
                    nanoseconds = NANOS_PER_SEC - nanoseconds;
                }
                Self {
                    seconds,
                    nanoseconds,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp32() {
        let ts = Timestamp::new(1, 0).unwrap();
        assert_eq!(ts.to_ext_bytes(), vec![0, 0, 0, 1]);
        assert_eq!(Timestamp::from_ext_bytes(&[0, 0, 0, 1]).unwrap(), ts);

        let ts = Timestamp::new(i64::from(u32::MAX), 0).unwrap();
        assert_eq!(ts.to_ext_bytes().len(), 4);
    }

    #[test]
    fn timestamp64() {
        let ts = Timestamp::new(1, 1).unwrap();
        let bytes = ts.to_ext_bytes();
        assert_eq!(bytes, (1u64 << 34 | 1).to_be_bytes().to_vec());
        assert_eq!(Timestamp::from_ext_bytes(&bytes).unwrap(), ts);

        // Seconds above u32 but within 34 bits.
        let ts = Timestamp::new(1 << 33, 0).unwrap();
        assert_eq!(ts.to_ext_bytes().len(), 8);
    }

    #[test]
    fn timestamp96() {
        let ts = Timestamp::new(-1, 500).unwrap();
        let bytes = ts.to_ext_bytes();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[..4], &500u32.to_be_bytes());
        assert_eq!(&bytes[4..], &(-1i64).to_be_bytes());
        assert_eq!(Timestamp::from_ext_bytes(&bytes).unwrap(), ts);

        let ts = Timestamp::new(1 << 34, 0).unwrap();
        assert_eq!(ts.to_ext_bytes().len(), 12);
    }

    #[test]
    fn rejects_bad_payloads() {
        assert!(Timestamp::from_ext_bytes(&[0; 5]).is_err());
        let mut bad = Vec::new();
        bad.put_u32(NANOS_PER_SEC);
        bad.put_i64(0);
        assert!(matches!(
            Timestamp::from_ext_bytes(&bad),
            Err(PackError::InvalidTimestamp(_))
        ));
        assert!(Timestamp::new(0, NANOS_PER_SEC).is_err());
    }

    #[test]
    fn system_time_before_epoch() {
        let t = UNIX_EPOCH - Duration::from_millis(1500);
        let ts = Timestamp::from(t);
        assert_eq!(ts.seconds(), -2);
        assert_eq!(ts.nanoseconds(), 500_000_000);
        assert_eq!(ts.to_system_time(), Some(t));
    }

    #[test]
    fn system_time_after_epoch() {
        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 42);
        let ts = Timestamp::from(t);
        assert_eq!(ts.seconds(), 1_700_000_000);
        assert_eq!(ts.nanoseconds(), 42);
        assert_eq!(ts.to_system_time(), Some(t));
    }
}
