use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Holds the anti-CSRF state of an in-flight login.
pub const STATE_COOKIE: &str = "spotify_auth_state";
/// Holds the access token for scripts in the browser.
pub const ACCESS_TOKEN_COOKIE: &str = "spotify-ac-key";
/// Holds the id of the caller's session.
pub const SESSION_COOKIE: &str = "spotify-relay-session";

pub fn state_cookie(value: String) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .into()
}

/// Readable from scripts, the browser client forwards it itself.
pub fn access_token_cookie(token: String) -> Cookie<'static> {
    Cookie::build((ACCESS_TOKEN_COOKIE, token)).path("/").into()
}

pub fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .into()
}

pub fn clear_state_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(STATE_COOKIE).path("/"))
}

pub fn stored_state(jar: &CookieJar) -> Option<String> {
    jar.get(STATE_COOKIE).map(|c| c.value().to_string())
}

pub fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
