//! Blocking HTTP implementation of [`TaskApi`].

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::client::{ApiError, TaskApi};
use crate::task::{NewTask, NewUser, Task, User};

/// Client for the task backend rooted at `base_url`.
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    client: Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder, action: &str) -> Result<Response, ApiError> {
        debug!(action, "sending request");
        let response = request.send().map_err(|source| {
            warn!(action, error = %source, "request failed");
            ApiError::Transport {
                action: action.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(action, status = status.as_u16(), "request rejected");
            return Err(ApiError::Status {
                action: action.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, action: &str) -> Result<T, ApiError> {
        let response = self.send(self.client.get(self.url(path)), action)?;
        response.json::<T>().map_err(|source| ApiError::Decode {
            action: action.to_string(),
            source,
        })
    }
}

impl TaskApi for HttpApi {
    fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.get_json("/api/tasks", "GET /api/tasks")
    }

    fn get_task(&self, id: u64) -> Result<Task, ApiError> {
        self.get_json(&format!("/api/tasks/{id}"), &format!("GET /api/tasks/{id}"))
    }

    fn create_task(&self, task: &NewTask) -> Result<(), ApiError> {
        let request = self.client.post(self.url("/api/tasks")).json(task);
        self.send(request, "POST /api/tasks").map(drop)
    }

    fn update_task(&self, task: &Task) -> Result<(), ApiError> {
        let path = format!("/api/tasks/{}", task.id);
        let request = self.client.put(self.url(&path)).json(task);
        self.send(request, &format!("PUT {path}")).map(drop)
    }

    fn delete_task(&self, id: u64) -> Result<(), ApiError> {
        let path = format!("/api/tasks/{id}");
        let request = self.client.delete(self.url(&path));
        self.send(request, &format!("DELETE {path}")).map(drop)
    }

    fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/api/users", "GET /api/users")
    }

    fn get_user(&self, id: u64) -> Result<User, ApiError> {
        self.get_json(&format!("/api/users/{id}"), &format!("GET /api/users/{id}"))
    }

    fn create_user(&self, user: &NewUser) -> Result<(), ApiError> {
        let request = self.client.post(self.url("/api/users")).json(user);
        self.send(request, "POST /api/users").map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Status;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    #[derive(Debug)]
    struct Recorded {
        method: String,
        path: String,
        body: String,
    }

    /// Serve one canned response per connection, recording each request.
    fn stub(responses: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<Recorded>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let request = read_request(&mut stream);
                tx.send(request).unwrap();
                let reply = format!(
                    "HTTP/1.1 {status} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
        });
        (format!("http://{addr}"), rx)
    }

    fn read_request(stream: &mut std::net::TcpStream) -> Recorded {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut chunk).unwrap();
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            assert!(n > 0, "connection closed before headers");
        };
        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        while buf.len() < header_end + content_length {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let mut request_line = head.lines().next().unwrap_or_default().split_whitespace();
        Recorded {
            method: request_line.next().unwrap_or_default().to_string(),
            path: request_line.next().unwrap_or_default().to_string(),
            body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
        }
    }

    fn api(url: &str) -> HttpApi {
        HttpApi::new(format!("{url}/"), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = HttpApi::new("http://localhost:5201///", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "http://localhost:5201");
    }

    #[test]
    fn test_list_tasks_decodes_body() {
        let (url, rx) = stub(vec![(
            200,
            r#"[{"id":1,"title":"Plan","status":"nao_iniciada","userId":2},
                {"id":2,"title":"Build","status":"concluida","userId":2,
                 "initial_date":"2024-01-01T00:00:00Z","finished_date":"2024-01-02T00:00:00Z"}]"#,
        )]);
        let tasks = api(&url).list_tasks().unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].status, Status::Done);

        let request = rx.recv().unwrap();
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/api/tasks");
    }

    #[test]
    fn test_get_user_hits_id_path() {
        let (url, rx) = stub(vec![(200, r#"{"id":5,"name":"Ana","email":"ana@example.com"}"#)]);
        let user = api(&url).get_user(5).unwrap();
        assert_eq!(user.name, "Ana");
        assert_eq!(rx.recv().unwrap().path, "/api/users/5");
    }

    #[test]
    fn test_update_task_puts_full_task() {
        let (url, rx) = stub(vec![(204, "")]);
        let task = Task {
            id: 9,
            title: "Review".into(),
            description: Some("PR 12".into()),
            status: Status::InProgress,
            user_id: 3,
            user: None,
            initial_date: None,
            finished_date: None,
        };
        api(&url).update_task(&task).unwrap();

        let request = rx.recv().unwrap();
        assert_eq!(request.method, "PUT");
        assert_eq!(request.path, "/api/tasks/9");
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["id"], 9);
        assert_eq!(body["status"], "em_progresso");
        assert_eq!(body["userId"], 3);
        assert_eq!(body["description"], "PR 12");
    }

    #[test]
    fn test_create_task_posts_wire_body() {
        let (url, rx) = stub(vec![(201, r#"{"id":1}"#), (201, r#"{"id":2}"#)]);
        let api = api(&url);
        let mut task = NewTask {
            title: "Plan".into(),
            description: String::new(),
            status: Status::NotStarted,
            user_id: 2,
            initial_date: None,
            finished_date: None,
        };
        api.create_task(&task).unwrap();

        let request = rx.recv().unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/tasks");
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["userId"], 2);
        assert_eq!(body["status"], "nao_iniciada");
        assert!(body.get("user_id").is_none());
        assert!(body.get("initial_date").is_none());
        assert!(body.get("finished_date").is_none());

        task.status = Status::InProgress;
        task.initial_date = crate::fields::timestamp::parse("2024-03-01T10:30:00Z");
        api.create_task(&task).unwrap();
        let body: serde_json::Value = serde_json::from_str(&rx.recv().unwrap().body).unwrap();
        assert_eq!(body["initial_date"], "2024-03-01T10:30:00.000Z");
        assert!(body.get("finished_date").is_none());
    }

    #[test]
    fn test_create_user_posts_body() {
        let (url, rx) = stub(vec![(201, r#"{"id":1}"#)]);
        let user = NewUser {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            birthday_date: None,
            working: Some("QA".into()),
        };
        api(&url).create_user(&user).unwrap();

        let request = rx.recv().unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/users");
        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["working"], "QA");
    }

    #[test]
    fn test_delete_task_maps_status_errors() {
        let (url, rx) = stub(vec![(404, "")]);
        let err = api(&url).delete_task(3).unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
        assert_eq!(err.to_string(), "DELETE /api/tasks/3 failed: HTTP 404");
        assert_eq!(rx.recv().unwrap().method, "DELETE");
    }

    #[test]
    fn test_unreadable_body_is_decode_error() {
        let (url, _rx) = stub(vec![(200, "not json")]);
        let err = api(&url).list_users().unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn test_unreachable_server_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = api(&format!("http://{addr}")).list_tasks().unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }
}
