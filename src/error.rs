use std::fmt;

/// Failures reported to the host of a graph view.
///
/// Missing data and a missing section marker are not errors: they resolve
/// to the sample graph and an empty graph respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
	/// The mount element does not exist or is no longer attached.
	MountMissing { mount_id: String },
	/// The canvas 2D context could not be obtained.
	Canvas(String),
	/// Building or downloading the SVG export failed.
	Export(String),
	/// The supplied [`GraphConfig`](crate::GraphConfig) is unusable.
	Config(ConfigError),
}

impl fmt::Display for RenderError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::MountMissing { mount_id } => {
				write!(f, "mount element '{mount_id}' not found in the document")
			}
			Self::Canvas(msg) => write!(f, "canvas unavailable: {msg}"),
			Self::Export(msg) => write!(f, "export failed: {msg}"),
			Self::Config(err) => write!(f, "{err}"),
		}
	}
}

impl std::error::Error for RenderError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Config(err) => Some(err),
			_ => None,
		}
	}
}

impl From<ConfigError> for RenderError {
	fn from(err: ConfigError) -> Self {
		Self::Config(err)
	}
}

/// A configuration value outside the range the view can handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
	field: &'static str,
	reason: String,
}

impl ConfigError {
	pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
		Self {
			field,
			reason: reason.into(),
		}
	}

	/// Dotted path of the offending field, e.g. `view.min_scale`.
	pub fn field(&self) -> &'static str {
		self.field
	}
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "invalid graph config: {}: {}", self.field, self.reason)
	}
}

impl std::error::Error for ConfigError {}

/// A host message that could not be decoded.
#[derive(Debug)]
pub struct MessageError(serde_json::Error);

impl fmt::Display for MessageError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "invalid host message: {}", self.0)
	}
}

impl std::error::Error for MessageError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		Some(&self.0)
	}
}

impl From<serde_json::Error> for MessageError {
	fn from(err: serde_json::Error) -> Self {
		Self(err)
	}
}
