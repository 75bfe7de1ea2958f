pub type ServiceResult<T, E = ServiceError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl From<grist_storage::Error> for ServiceError {
	fn from(err: grist_storage::Error) -> Self {
		match err {
			grist_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			grist_storage::Error::NotFound(message) => Self::Storage { message },
		}
	}
}

impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn storage_errors_map_by_variant() {
		let invalid: ServiceError =
			grist_storage::Error::InvalidArgument("empty uid".to_string()).into();
		let missing: ServiceError = grist_storage::Error::NotFound("metric 9".to_string()).into();

		assert_eq!(invalid.to_string(), "Invalid request: empty uid");
		assert_eq!(missing.to_string(), "Storage error: metric 9");
	}

	#[test]
	fn provider_reports_keep_their_message() {
		let err: ServiceError = color_eyre::eyre::eyre!("timeout").into();

		assert_eq!(err.to_string(), "Provider error: timeout");
	}
}
