//! One-shot flash messages, carried in a cookie between the redirect and
//! the next page view.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "dm_flash";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub message: String,
    pub category: String,
}

impl Flash {
    pub fn message(text: impl Into<String>) -> Self {
        Self { message: text.into(), category: "message".into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { message: text.into(), category: "error".into() }
    }
}

fn read(jar: &CookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| {
            let decoded: String = form_urlencoded::parse(
                format!("v={}", cookie.value()).as_bytes(),
            )
            .next()
            .map(|(_, v)| v.into_owned())?;
            serde_json::from_str(&decoded).ok()
        })
        .unwrap_or_default()
}

fn write(jar: CookieJar, flashes: &[Flash]) -> CookieJar {
    let encoded: String = form_urlencoded::byte_serialize(
        serde_json::to_string(flashes).unwrap_or_default().as_bytes(),
    )
    .collect();
    let mut cookie = Cookie::new(FLASH_COOKIE, encoded);
    cookie.set_path("/");
    cookie.set_http_only(true);
    jar.add(cookie)
}

/// Queue a flash for the next rendered page.
pub fn push(jar: CookieJar, flash: Flash) -> CookieJar {
    let mut flashes = read(&jar);
    flashes.push(flash);
    write(jar, &flashes)
}

/// Consume all queued flashes.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<Flash>) {
    let flashes = read(&jar);
    let mut removal = Cookie::from(FLASH_COOKIE);
    removal.set_path("/");
    (jar.remove(removal), flashes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_take_round_trips() {
        let jar = CookieJar::new();
        let jar = push(jar, Flash::message("status_updated"));
        let jar = push(jar, Flash::error("bad_status"));
        let (_, flashes) = take(jar);
        assert_eq!(
            flashes,
            vec![Flash::message("status_updated"), Flash::error("bad_status")]
        );
    }

    #[test]
    fn messages_survive_characters_cookies_dislike() {
        let jar = push(
            CookieJar::new(),
            Flash::error("Error trying to retrieve service with ID: 1<img src=a>"),
        );
        let (_, flashes) = take(jar);
        assert_eq!(
            flashes[0].message,
            "Error trying to retrieve service with ID: 1<img src=a>"
        );
    }

    #[test]
    fn empty_jar_yields_no_flashes() {
        let (_, flashes) = take(CookieJar::new());
        assert!(flashes.is_empty());
    }
}
