use crate::cycle::ControlPanel;
use crate::regions::RegionBoard;
use axum::http::{header::COOKIE, HeaderMap};
use std::sync::Arc;
use uuid::Uuid;

pub const VISITOR_COOKIE: &str = "attendance_visitor";

/// Busy controls and result regions of one browser. Cycles only compete with
/// other cycles of the same visitor.
#[derive(Default)]
pub struct Visitor {
    pub controls: Arc<ControlPanel>,
    pub regions: RegionBoard,
}

impl Visitor {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorKey {
    pub id: String,
    pub fresh: bool,
}

impl VisitorKey {
    /// Reads the visitor cookie, or mints a new id when it is missing or not
    /// one of ours.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let known = cookie_pairs(headers)
            .find(|(name, _)| *name == VISITOR_COOKIE)
            .and_then(|(_, value)| Uuid::parse_str(value).ok());
        match known {
            Some(id) => Self {
                id: id.to_string(),
                fresh: false,
            },
            None => Self {
                id: Uuid::new_v4().to_string(),
                fresh: true,
            },
        }
    }

    pub fn set_cookie(&self) -> Option<String> {
        self.fresh
            .then(|| format!("{VISITOR_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id))
    }
}

/// The browser's cookies minus the visitor cookie, ready to send upstream.
pub fn browser_cookies(headers: &HeaderMap) -> Option<String> {
    let kept: Vec<String> = cookie_pairs(headers)
        .filter(|(name, _)| *name != VISITOR_COOKIE)
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    if kept.is_empty() {
        None
    } else {
        Some(kept.join("; "))
    }
}

fn cookie_pairs(headers: &HeaderMap) -> impl Iterator<Item = (&str, &str)> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            Some((name.trim(), value.trim()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    #[test]
    fn known_visitor_is_reused() {
        let id = Uuid::new_v4().to_string();
        let key = VisitorKey::from_headers(&headers(&format!("session=abc; {VISITOR_COOKIE}={id}")));
        assert_eq!(key.id, id);
        assert!(!key.fresh);
        assert_eq!(key.set_cookie(), None);
    }

    #[test]
    fn missing_or_forged_visitor_gets_a_new_id() {
        let key = VisitorKey::from_headers(&headers(&format!("{VISITOR_COOKIE}=../../etc")));
        assert!(key.fresh);
        assert!(Uuid::parse_str(&key.id).is_ok());
        assert!(key.set_cookie().unwrap().starts_with(VISITOR_COOKIE));

        assert!(VisitorKey::from_headers(&HeaderMap::new()).fresh);
    }

    #[test]
    fn upstream_cookies_drop_the_visitor_cookie() {
        let id = Uuid::new_v4();
        let map = headers(&format!("session=abc; {VISITOR_COOKIE}={id}; theme=dark"));
        assert_eq!(browser_cookies(&map), Some("session=abc; theme=dark".to_string()));
        assert_eq!(browser_cookies(&headers(&format!("{VISITOR_COOKIE}={id}"))), None);
    }
}
