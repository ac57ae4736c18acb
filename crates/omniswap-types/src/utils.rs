//! Small shared helpers.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or_default()
		.as_secs()
}

/// Truncates a hex id for log display: first 8 characters plus "..".
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 8 {
		id.to_string()
	} else {
		format!("{}..", &id[..8])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn truncate_short_ids_untouched() {
		assert_eq!(truncate_id("abcd"), "abcd");
	}

	#[test]
	fn truncate_long_ids() {
		assert_eq!(truncate_id("0123456789abcdef"), "01234567..");
	}

}
