use crate::config::Config;
use crate::errors::ClientError;
use crate::models::{AttendanceSubmission, NewStudent};
use reqwest::{header::COOKIE, Client, Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// The decoded envelope of one backend response. The body is parsed whatever
/// the status, so error replies can still carry their `message`.
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn message(&self) -> Option<&str> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
    }
}

#[derive(Clone)]
pub struct AttendanceClient {
    http: Client,
    origin: Url,
}

impl AttendanceClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            origin: config.backend_origin.clone(),
        })
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Probes `/health`; only the status matters.
    pub async fn health(&self) -> Result<StatusCode, ClientError> {
        let url = self.endpoint(&["health"])?;
        let response = self.http.get(url).send().await?;
        Ok(response.status())
    }

    pub async fn mark_attendance(
        &self,
        submission: &AttendanceSubmission,
        cookie: Option<&str>,
    ) -> Result<ApiReply, ClientError> {
        self.send(Method::POST, &["api", "mark_attendance"], Some(submission), cookie)
            .await
    }

    pub async fn report(&self, enroll_no: &str, cookie: Option<&str>) -> Result<ApiReply, ClientError> {
        self.send::<()>(Method::GET, &["api", "report", enroll_no], None, cookie)
            .await
    }

    pub async fn add_student(
        &self,
        student: &NewStudent<'_>,
        cookie: Option<&str>,
    ) -> Result<ApiReply, ClientError> {
        self.send(Method::POST, &["api", "add_student"], Some(student), cookie)
            .await
    }

    pub async fn list_students(&self, cookie: Option<&str>) -> Result<ApiReply, ClientError> {
        self.send::<()>(Method::GET, &["api", "list_students"], None, cookie)
            .await
    }

    pub async fn fix_student_names(&self, cookie: Option<&str>) -> Result<ApiReply, ClientError> {
        self.send::<()>(Method::POST, &["api", "fix_student_names"], None, cookie)
            .await
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.origin.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(self.origin.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        cookie: Option<&str>,
    ) -> Result<ApiReply, ClientError> {
        let url = self.endpoint(segments)?;
        info!("{method} {}", url.path());

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode {
            status: status.as_u16(),
            reason: err.to_string(),
        })?;
        debug!("reply {status}: {body}");

        Ok(ApiReply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve_backend_origin;

    fn client_for(origin: &str) -> AttendanceClient {
        let mut config = crate::config::Config::from_lookup(|_| None).unwrap();
        config.backend_origin = resolve_backend_origin(origin, "example.test").unwrap();
        AttendanceClient::new(&config).unwrap()
    }

    #[test]
    fn endpoints_escape_enrollment_numbers() {
        let client = client_for("https://api.example.test");
        let url = client.endpoint(&["api", "report", "S 10/01"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/api/report/S%2010%2F01");
    }

    #[test]
    fn endpoints_keep_origin_prefix() {
        let client = client_for("https://api.example.test/attendance/");
        let url = client.endpoint(&["api", "list_students"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.test/attendance/api/list_students");
    }

    #[test]
    fn reply_message_skips_empty_strings() {
        let reply = ApiReply {
            status: StatusCode::NOT_FOUND,
            body: serde_json::json!({ "message": "" }),
        };
        assert_eq!(reply.message(), None);
        assert!(!reply.is_success());
    }
}
