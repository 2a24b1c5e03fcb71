//! Item expiration state.

use chrono::{DateTime, Duration, Utc};

use super::MAX_TTL_SECS;
use crate::error::{CacheError, Result};

// == Expiration ==
/// Expiration as known by a [`super::CacheItem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Not assigned locally and not read from the backend yet
    Unknown,
    /// Stored permanently
    Never,
    /// Expires at this UTC instant
    At(DateTime<Utc>),
}

impl Expiration {
    /// Expiration `ttl` from now.
    ///
    /// Fails with [`CacheError::InvalidTtl`] when `ttl` exceeds
    /// [`MAX_TTL_SECS`] or the deadline is not representable.
    pub fn after(ttl: Duration) -> Result<Self> {
        if ttl > max_ttl() {
            return Err(CacheError::InvalidTtl(format!(
                "TTL of {}s exceeds the maximum of {}s",
                ttl.num_seconds(),
                MAX_TTL_SECS
            )));
        }

        Utc::now()
            .checked_add_signed(ttl)
            .map(Expiration::At)
            .ok_or_else(|| {
                CacheError::InvalidTtl(format!("TTL of {}s is out of range", ttl.num_seconds()))
            })
    }

    /// Expiration `secs` seconds from now.
    pub fn after_secs(secs: u64) -> Result<Self> {
        if secs > MAX_TTL_SECS {
            return Err(CacheError::InvalidTtl(format!(
                "TTL of {}s exceeds the maximum of {}s",
                secs, MAX_TTL_SECS
            )));
        }
        Self::after(Duration::seconds(secs as i64))
    }

    /// Expiration derived from a pool default TTL, `Never` when there is none.
    ///
    /// The TTL is bounded by [`MAX_TTL_SECS`] when the pool is built, so the
    /// deadline always fits.
    pub(crate) fn from_ttl(ttl: Option<Duration>) -> Self {
        ttl.and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .map_or(Expiration::Never, Expiration::At)
    }

    /// The absolute instant, if one is known.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Expiration::At(at) => Some(*at),
            Expiration::Unknown | Expiration::Never => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Expiration::Unknown)
    }
}

/// [`MAX_TTL_SECS`] as a duration.
pub(crate) fn max_ttl() -> Duration {
    Duration::seconds(MAX_TTL_SECS as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ttl() {
        assert_eq!(Expiration::from_ttl(None), Expiration::Never);

        let at = Expiration::from_ttl(Some(Duration::seconds(3600)))
            .instant()
            .unwrap();
        let delta = (at - Utc::now()).num_seconds();
        assert!((3599..=3600).contains(&delta));
    }

    #[test]
    fn test_after_secs() {
        let at = Expiration::after_secs(60).unwrap().instant().unwrap();
        let delta = (at - Utc::now()).num_seconds();
        assert!((59..=60).contains(&delta));

        assert!(Expiration::after_secs(MAX_TTL_SECS).is_ok());
    }

    #[test]
    fn test_out_of_range_ttl_is_rejected() {
        for secs in [MAX_TTL_SECS + 1, 100_000_000_000_000_000, u64::MAX] {
            assert!(
                matches!(Expiration::after_secs(secs), Err(CacheError::InvalidTtl(_))),
                "accepted {}",
                secs
            );
        }
        assert!(matches!(
            Expiration::after(Duration::max_value()),
            Err(CacheError::InvalidTtl(_))
        ));
        assert!(matches!(
            Expiration::after(Duration::min_value()),
            Err(CacheError::InvalidTtl(_))
        ));
    }

    #[test]
    fn test_unknown_is_distinct_from_never() {
        assert!(!Expiration::Unknown.is_known());
        assert!(Expiration::Never.is_known());
        assert_ne!(Expiration::Unknown, Expiration::Never);
        assert_eq!(Expiration::Never.instant(), None);
    }
}
