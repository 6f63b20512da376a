use super::types::OracleError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub retryable: bool,
}

impl OracleError {
    /// Classify this error to determine its type and whether it can be retried.
    ///
    /// Only a rate-limit signature is transient. Every other transport or
    /// parse failure surfaces immediately.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            OracleError::RateLimited(_) => ErrorClassification {
                error_type: "RateLimitError",
                retryable: true,
            },
            OracleError::Network(_) => ErrorClassification {
                error_type: "NetworkError",
                retryable: false,
            },
            OracleError::Authentication(_) => ErrorClassification {
                error_type: "AuthenticationError",
                retryable: false,
            },
            OracleError::Api(_) => ErrorClassification {
                error_type: "OracleApiError",
                retryable: false,
            },
            OracleError::MalformedResponse { .. } => ErrorClassification {
                error_type: "MalformedResponseError",
                retryable: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_retryable() {
        let err = OracleError::RateLimited("429 Too Many Requests".into());
        let class = err.classify();
        assert!(class.retryable);
        assert_eq!(class.error_type, "RateLimitError");
    }

    #[test]
    fn test_network_error_not_retryable() {
        let err = OracleError::Network("connection refused".into());
        assert!(!err.classify().retryable);
    }

    #[test]
    fn test_auth_error_not_retryable() {
        let err = OracleError::Authentication("bad key".into());
        let class = err.classify();
        assert!(!class.retryable);
        assert_eq!(class.error_type, "AuthenticationError");
    }

    #[test]
    fn test_malformed_response_not_retryable() {
        let err = OracleError::MalformedResponse {
            reason: "expected value".into(),
            raw: "Sure! Here is the JSON".into(),
        };
        let class = err.classify();
        assert!(!class.retryable);
        assert_eq!(class.error_type, "MalformedResponseError");
        assert_eq!(err.raw_response(), Some("Sure! Here is the JSON"));
    }

    #[test]
    fn test_api_error_has_no_raw_response() {
        let err = OracleError::Api("model overloaded".into());
        assert!(err.raw_response().is_none());
    }
}
