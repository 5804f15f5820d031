// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{Error, Result};

/// UTC instant with millisecond precision. Serializes as RFC 3339 on the
/// wire; stored as unix milliseconds in SQLite.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(#[serde(with = "time::serde::rfc3339")] OffsetDateTime);

impl Timestamp {
    #[must_use]
    pub fn now() -> Self {
        // Truncate to milliseconds so a value survives a store round trip
        // unchanged.
        let now = OffsetDateTime::now_utc();
        let nanos = now.unix_timestamp_nanos();
        Self::from_nanos_lossy(nanos - nanos.rem_euclid(1_000_000))
    }

    pub fn from_unix_millis(unix_millis: i64) -> Result<Self> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(unix_millis) * 1_000_000)
            .map(Self)
            .map_err(|_| Error::InvalidTimestamp { unix_millis })
    }

    #[must_use]
    pub fn unix_millis(self) -> i64 {
        (self.0.unix_timestamp_nanos() / 1_000_000) as i64
    }

    fn from_nanos_lossy(nanos: i128) -> Self {
        Self(OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH))
    }
}
