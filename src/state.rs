use crate::client::AttendanceClient;
use crate::config::Config;
use crate::errors::ClientError;
use crate::visitor::{Visitor, VisitorKey};
use moka::future::Cache;
use std::{sync::Arc, time::Duration};

/// Who is using the page. Fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct Session {
    pub faculty_id: String,
    pub course_id: String,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: AttendanceClient,
    pub session: Arc<Session>,
    visitors: Cache<String, Arc<Visitor>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let client = AttendanceClient::new(&config)?;
        let session = Session {
            faculty_id: config.faculty_id.clone(),
            course_id: config.course_id.clone(),
        };
        let visitors = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(Duration::from_secs(60 * 60))
            .build();
        Ok(Self {
            config: Arc::new(config),
            client,
            session: Arc::new(session),
            visitors,
        })
    }

    /// Busy controls and result regions for one browser, created on first use.
    pub async fn visitor(&self, key: &VisitorKey) -> Arc<Visitor> {
        self.visitors
            .get_with(key.id.clone(), async { Arc::new(Visitor::new()) })
            .await
    }

    /// The cookie to send upstream for this request under the configured policy.
    pub fn upstream_cookie(&self, browser_cookie: Option<&str>) -> Option<String> {
        self.config.credentials.forward(browser_cookie)
    }
}
