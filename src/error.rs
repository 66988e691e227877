use crate::{host::HostError, markup::ParseError};

/// What a [`Markup`](`crate::view::Markup`) producer may fail with. Passed through to the caller unchanged.
pub type ProducerError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("markup producer failed: {0}")]
	Producer(#[source] ProducerError),

	#[error("producer returned malformed markup: {0}")]
	Markup(#[from] ParseError),

	#[error("host failed to render: {0}")]
	Host(#[from] HostError),

	#[error("invalid configuration: {0}")]
	Config(#[from] toml::de::Error),
}
