use ::log::*;
use ::warp::{Filter, Reply};

use crate::config::AuthSettings;

pub const REALM: &str = "PortGuard";

#[derive(Debug)]
pub struct Unauthorized;

impl ::warp::reject::Reject for Unauthorized {}

/// Decodes an `Authorization: Basic ...` header value into a username and
/// password. The password may itself contain colons.
pub fn parse_basic_credentials(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = ::base64::decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some((username.to_string(), password.to_string()))
}

pub fn credentials_match(
    settings: &AuthSettings,
    username: &str,
    password: &str,
) -> bool {
    // Both fields are always compared.
    let username_match = ::constant_time_eq::constant_time_eq(
        username.as_bytes(),
        settings.username.as_bytes(),
    );
    let password_match = ::constant_time_eq::constant_time_eq(
        password.as_bytes(),
        settings.password.as_bytes(),
    );

    username_match & password_match
}

pub fn authorize(
    settings: &AuthSettings,
    header: Option<&str>,
) -> Result<(), Unauthorized> {
    if !settings.is_armed() {
        return Ok(());
    }

    let (username, password) =
        match header.and_then(parse_basic_credentials) {
            Some(credentials) => credentials,
            None => {
                warn!("request without usable basic credentials");
                return Err(Unauthorized);
            }
        };

    if credentials_match(settings, &username, &password) {
        Ok(())
    } else {
        warn!("rejected credentials for user {:?}", username);
        Err(Unauthorized)
    }
}

/// Gate placed in front of a route. Passes through untouched unless
/// authentication is armed, otherwise rejects with [`Unauthorized`].
pub fn with_auth(
    settings: AuthSettings,
) -> impl Filter<Extract = (), Error = ::warp::Rejection> + Clone {
    let settings = ::std::sync::Arc::new(settings);

    ::warp::header::headers_cloned()
        .and_then(move |headers: ::warp::http::HeaderMap| {
            let settings = settings.clone();

            async move {
                // Undecodable header bytes count as no credentials.
                let header = headers
                    .get(::warp::http::header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok());

                authorize(&settings, header).map_err(::warp::reject::custom)
            }
        })
        .untuple_one()
}

pub fn unauthorized_reply() -> ::warp::reply::Response {
    ::warp::reply::with_header(
        ::warp::reply::with_status(
            "Unauthorized",
            ::warp::http::StatusCode::UNAUTHORIZED,
        ),
        "WWW-Authenticate",
        format!("Basic realm=\"{}\"", REALM),
    )
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_settings(enabled: bool, username: &str, password: &str) -> AuthSettings {
        AuthSettings {
            enabled,
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    fn basic(username: &str, password: &str) -> String {
        format!(
            "Basic {}",
            ::base64::encode(format!("{}:{}", username, password))
        )
    }

    #[test]
    fn parse_basic_credentials_accepts_valid_header() {
        assert_eq!(
            parse_basic_credentials(&basic("admin", "pa:ss")),
            Some(("admin".to_string(), "pa:ss".to_string()))
        );
        assert_eq!(
            parse_basic_credentials(&format!(
                "basic {}",
                ::base64::encode("a:b")
            )),
            Some(("a".to_string(), "b".to_string()))
        );
    }

    #[test]
    fn parse_basic_credentials_rejects_malformed_headers() {
        assert_eq!(parse_basic_credentials("Bearer abc"), None);
        assert_eq!(parse_basic_credentials("Basic !!!not-base64!!!"), None);
        assert_eq!(
            parse_basic_credentials(&format!(
                "Basic {}",
                ::base64::encode("no-colon")
            )),
            None
        );
        assert_eq!(parse_basic_credentials("Basic"), None);
    }

    #[test]
    fn authorize_passes_when_disabled() {
        let settings = make_settings(false, "admin", "secret");
        assert!(authorize(&settings, None).is_ok());
        assert!(authorize(&settings, Some(&basic("x", "y"))).is_ok());
    }

    #[test]
    fn authorize_passes_when_credentials_not_configured() {
        assert!(authorize(&make_settings(true, "", "secret"), None).is_ok());
        assert!(authorize(&make_settings(true, "admin", ""), None).is_ok());
    }

    #[test]
    fn authorize_checks_both_fields() {
        let settings = make_settings(true, "admin", "secret");

        assert!(authorize(&settings, None).is_err());
        assert!(authorize(&settings, Some(&basic("admin", "wrong"))).is_err());
        assert!(authorize(&settings, Some(&basic("wrong", "secret"))).is_err());
        assert!(authorize(&settings, Some(&basic("admin", "secret1"))).is_err());
        assert!(authorize(&settings, Some(&basic("admin", "secret"))).is_ok());
    }

    #[tokio::test]
    async fn with_auth_rejects_missing_header() {
        let filter = with_auth(make_settings(true, "admin", "secret"))
            .map(|| "inner");

        let rejection = ::warp::test::request()
            .path("/health")
            .filter(&filter)
            .await
            .unwrap_err();

        assert!(rejection.find::<Unauthorized>().is_some());
    }

    #[tokio::test]
    async fn with_auth_delegates_on_match() {
        let filter = with_auth(make_settings(true, "admin", "secret"))
            .map(|| "inner");

        let reply = ::warp::test::request()
            .path("/health")
            .header("authorization", basic("admin", "secret"))
            .filter(&filter)
            .await
            .unwrap();

        assert_eq!(reply, "inner");
    }

    #[tokio::test]
    async fn with_auth_rejects_undecodable_header() {
        let filter = with_auth(make_settings(true, "admin", "secret"))
            .map(|| "inner");

        let rejection = ::warp::test::request()
            .path("/health")
            .header(
                "authorization",
                ::warp::http::HeaderValue::from_bytes(b"Basic \xff\xfe")
                    .unwrap(),
            )
            .filter(&filter)
            .await
            .unwrap_err();

        assert!(rejection.find::<Unauthorized>().is_some());
    }

    #[test]
    fn unauthorized_reply_carries_challenge() {
        let response = unauthorized_reply();

        assert_eq!(response.status(), ::warp::http::StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()["www-authenticate"],
            "Basic realm=\"PortGuard\""
        );
    }
}
