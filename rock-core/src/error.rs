use thiserror::Error;

/// Coarse classification of a failed fetch, used to pick a retry delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Service unreachable or answered with a non-2xx status.
    Network,
    /// Response body was not the JSON we expected.
    Decode,
    /// Response decoded but a field we rely on was absent.
    AttributeMissing,
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            FetchErrorKind::Network => "network",
            FetchErrorKind::Decode => "decode",
            FetchErrorKind::AttributeMissing => "attribute missing",
        })
    }
}

/// Failure talking to a forecast or calendar service.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to reach {service}: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} request failed with status {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse {service} JSON: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} response is missing `{field}`")]
    AttributeMissing {
        service: &'static str,
        field: &'static str,
    },
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Network { .. } | FetchError::Status { .. } => FetchErrorKind::Network,
            FetchError::Decode { .. } => FetchErrorKind::Decode,
            FetchError::AttributeMissing { .. } => FetchErrorKind::AttributeMissing,
        }
    }

    pub fn missing(service: &'static str, field: &'static str) -> Self {
        FetchError::AttributeMissing { service, field }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

/// Sends `request` and returns the body of a 2xx response.
pub(crate) async fn send_for_body(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<String, FetchError> {
    let res = request
        .send()
        .await
        .map_err(|source| FetchError::Network { service, source })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| FetchError::Network { service, source })?;

    if !status.is_success() {
        return Err(FetchError::Status {
            service,
            status,
            body: truncate_body(&body),
        });
    }

    Ok(body)
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    service: &'static str,
    body: &str,
) -> Result<T, FetchError> {
    serde_json::from_str(body).map_err(|source| FetchError::Decode { service, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_counts_as_network() {
        let err = FetchError::Status {
            service: "darksky",
            status: reqwest::StatusCode::FORBIDDEN,
            body: "denied".into(),
        };
        assert_eq!(err.kind(), FetchErrorKind::Network);
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn decode_and_missing_kinds() {
        let err = decode::<u32>("openmeteo", "not json").unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::Decode);

        let err = FetchError::missing("darksky", "daily");
        assert_eq!(err.kind(), FetchErrorKind::AttributeMissing);
        assert_eq!(err.to_string(), "darksky response is missing `daily`");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
