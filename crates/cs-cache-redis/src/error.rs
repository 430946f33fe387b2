//! Redis cache error conversion.

use cs_cache::CacheError;

/// Converts a `fred` Redis error to a `CacheError`.
#[allow(clippy::needless_pass_by_value)]
pub fn from_redis_error(err: fred::error::Error) -> CacheError {
    match err.kind() {
        fred::error::ErrorKind::IO => CacheError::Connection(err.to_string()),
        fred::error::ErrorKind::Timeout => CacheError::Timeout,
        fred::error::ErrorKind::Config | fred::error::ErrorKind::Url => {
            CacheError::Configuration(err.to_string())
        }
        _ => CacheError::Internal(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fred::error::{Error, ErrorKind};

    #[test]
    fn io_errors_are_connection_failures() {
        let err = from_redis_error(Error::new(ErrorKind::IO, "connection refused"));
        assert!(matches!(err, CacheError::Connection(ref msg) if msg.contains("refused")));
        assert!(err.is_unavailable());
    }

    #[test]
    fn timeouts_map_to_timeout() {
        let err = from_redis_error(Error::new(ErrorKind::Timeout, "too slow"));
        assert_eq!(err, CacheError::Timeout);
    }

    #[test]
    fn config_errors_map_to_configuration() {
        let err = from_redis_error(Error::new(ErrorKind::Config, "bad"));
        assert!(matches!(err, CacheError::Configuration(_)));
    }

    #[test]
    fn other_errors_are_internal() {
        let err = from_redis_error(Error::new(ErrorKind::Parse, "garbled"));
        assert!(matches!(err, CacheError::Internal(_)));
    }
}
