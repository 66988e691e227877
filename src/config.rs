//! Application-wide settings.
//!
//! ```toml
//! close_delay = 2.5        # seconds a success overlay stays open
//! results_per_page = 10
//! icons = "img/icons.svg"
//! ```

use crate::Error;
use core::time::Duration;
use serde::{Deserialize, Deserializer};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	#[serde(deserialize_with = "seconds")]
	close_delay: Duration,
	pub results_per_page: usize,
	/// Path of the SVG sprite that `<use href="…#icon-…">` references point into.
	pub icons: String,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			close_delay: Duration::from_millis(2500),
			results_per_page: 10,
			icons: "img/icons.svg".to_owned(),
		}
	}
}

impl Config {
	/// Parses TOML. Missing keys keep their defaults.
	///
	/// # Errors
	///
	/// Iff `source` isn't valid TOML, has unknown keys, has a `close_delay` that isn't a representable non-negative duration, or sets zero results per page.
	pub fn from_toml(source: &str) -> Result<Self, Error> {
		let config: Self = toml::from_str(source)?;
		if config.results_per_page == 0 {
			return Err(Error::Config(serde::de::Error::custom("results_per_page must be at least 1")));
		}
		debug!(?config, "Loaded configuration.");
		Ok(config)
	}

	/// How long a transient success overlay stays visible before it hides itself.
	#[must_use]
	pub fn close_delay(&self) -> Duration {
		self.close_delay
	}

	#[must_use]
	pub fn with_close_delay(mut self, close_delay: Duration) -> Self {
		self.close_delay = close_delay;
		self
	}

	/// `href` for the icon named `icon` in the sprite.
	#[must_use]
	pub fn icon(&self, icon: &str) -> String {
		icon_href(&self.icons, icon)
	}
}

/// `href` for the icon named `icon` in the sprite at `icons`.
#[must_use]
pub fn icon_href(icons: &str, icon: &str) -> String {
	format!("{}#icon-{}", icons, icon)
}

/// A non-negative number of seconds that fits a [`Duration`].
fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
	let seconds = f64::deserialize(deserializer)?;
	Duration::try_from_secs_f64(seconds).map_err(|error| {
		<D::Error as serde::de::Error>::custom(format!("close_delay must be a non-negative number of seconds, not {}: {}", seconds, error))
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_fill_missing_keys() {
		let config = Config::from_toml("results_per_page = 20").unwrap();
		assert_eq!(config.results_per_page, 20);
		assert_eq!(config.close_delay(), Duration::from_millis(2500));
		assert_eq!(config.icon("loader"), "img/icons.svg#icon-loader");
	}

	#[test]
	fn close_delay_keeps_its_precision() {
		let config = Config::from_toml("close_delay = 3").unwrap();
		assert_eq!(config.close_delay(), Duration::from_secs(3));

		let delay = Duration::new(1, 123_456_789);
		assert_eq!(Config::default().with_close_delay(delay).close_delay(), delay);
	}

	#[test]
	fn rejects_bad_values() {
		assert!(matches!(Config::from_toml("close_delay = -1.0"), Err(Error::Config(_))));
		assert!(matches!(Config::from_toml("close_delay = 1e30"), Err(Error::Config(_))));
		assert!(matches!(Config::from_toml("close_delay = nan"), Err(Error::Config(_))));
		assert!(matches!(Config::from_toml("close_delay = inf"), Err(Error::Config(_))));
		assert!(matches!(Config::from_toml("results_per_page = 0"), Err(Error::Config(_))));
		assert!(matches!(Config::from_toml("colour = \"red\""), Err(Error::Config(_))));
	}
}
