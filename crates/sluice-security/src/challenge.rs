//! Authorization header parsing and 401/403 responses.

use http::header::WWW_AUTHENTICATE;
use sluice_core::{ErrorCategory, Exchange, Outcome};

/// Credentials following `scheme` in the `Authorization` header.
///
/// The scheme name is matched case-insensitively. `None` when the header is
/// absent or names another scheme.
pub(crate) fn credentials<'a>(exchange: &'a Exchange, scheme: &str) -> Option<&'a str> {
    let header = exchange.request().header("authorization")?;
    let (name, rest) = header.trim().split_once(' ')?;
    name.eq_ignore_ascii_case(scheme).then(|| rest.trim())
}

/// Halts with 401 and a `WWW-Authenticate` challenge.
pub(crate) fn unauthorized(
    exchange: Exchange,
    scheme: &str,
    realm: &str,
    error: Option<&str>,
    message: &str,
) -> Outcome {
    let challenge = match error {
        Some(error) => format!("{scheme} realm=\"{realm}\", error=\"{error}\""),
        None => format!("{scheme} realm=\"{realm}\""),
    };
    exchange
        .with_header(WWW_AUTHENTICATE, &challenge)
        .fail(
            ErrorCategory::Authentication,
            [("authorization".to_string(), message.to_string())],
        )
}

/// Halts with 403.
pub(crate) fn forbidden(exchange: Exchange, message: &str) -> Outcome {
    exchange.fail(
        ErrorCategory::Authorization,
        [("authorization".to_string(), message.to_string())],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode, Uri};
    use sluice_core::Request;

    fn exchange(authorization: Option<&str>) -> Exchange {
        let request = Request::new(Method::GET, Uri::from_static("/"));
        let request = match authorization {
            Some(value) => request.with_header("authorization", value),
            None => request,
        };
        Exchange::new(request)
    }

    #[test]
    fn test_credentials_match_scheme_case_insensitively() {
        let ex = exchange(Some("bearer abc"));
        assert_eq!(credentials(&ex, "Bearer"), Some("abc"));
        assert_eq!(credentials(&ex, "Basic"), None);
    }

    #[test]
    fn test_credentials_absent() {
        assert_eq!(credentials(&exchange(None), "Bearer"), None);
        assert_eq!(credentials(&exchange(Some("Bearer")), "Bearer"), None);
    }

    #[test]
    fn test_unauthorized_sets_challenge() {
        let outcome = unauthorized(exchange(None), "Bearer", "api", Some("invalid_token"), "nope");
        assert!(outcome.is_halted());

        let ex = outcome.into_exchange();
        assert_eq!(ex.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ex.response().header("www-authenticate"),
            Some("Bearer realm=\"api\", error=\"invalid_token\"")
        );
        assert_eq!(ex.errors()["authorization"], "nope");
    }

    #[test]
    fn test_forbidden() {
        let ex = forbidden(exchange(None), "Insufficient scope").into_exchange();
        assert_eq!(ex.status(), StatusCode::FORBIDDEN);
        assert!(ex.response().header("www-authenticate").is_none());
    }
}
