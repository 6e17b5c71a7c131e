use core::str::FromStr;

use crate::app::errors::ApiError;

/// Parse a path id, rejecting anything that is not a positive integer.
pub fn parse_id<T: FromStr>(raw: &str) -> Result<T, ApiError> {
    raw.parse().map_err(|_| ApiError::invalid_id())
}
