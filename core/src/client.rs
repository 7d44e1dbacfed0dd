//! Request dispatcher for the catalog API.
//!
//! # Design
//! `ApiClient` holds a base URL, a `Transport`, and the injected
//! `SessionStore`; it keeps no other state between calls. A call is split
//! in two: `build_request` produces an `HttpRequest`,
//! the transport executes it, and `parse_response` classifies the result.
//! Both halves are public so they can be exercised without a network.
//!
//! Every outcome becomes an `ApiResponse`, malformed calls included. Only an
//! unknown method name, given to `execute_named`, is rejected with `Err`.
//!
//! Concurrent calls may race on the session: one call can evict it after a
//! 401 while another is still in flight with the old token. That is
//! accepted; the second call simply sees its own 401.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::envelope::ApiResponse;
use crate::error::{DispatchError, Fault, StoreError};
use crate::http::{Content, HttpMethod, HttpRequest, HttpResponse, AUTHORIZATION, CONTENT_TYPE};
use crate::session::SessionStore;
use crate::transport::Transport;

/// Request body accepted by `ApiClient::execute`.
#[derive(Debug, Clone)]
pub enum Body {
    /// Encoded as JSON for POST and PUT.
    Json(serde_json::Value),
    /// Passed through unserialised; UPLOAD only.
    Binary(Content),
}

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    sessions: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: &str, transport: Arc<dyn Transport>, sessions: SessionStore) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
            sessions,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn get<T: DeserializeOwned>(&self, uri: &str) -> ApiResponse<T> {
        self.dispatch(HttpMethod::Get, uri, None)
    }

    pub fn post<T, B>(&self, uri: &str, body: &B) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.dispatch_json(HttpMethod::Post, uri, body)
    }

    pub fn put<T, B>(&self, uri: &str, body: &B) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.dispatch_json(HttpMethod::Put, uri, body)
    }

    pub fn upload<T: DeserializeOwned>(&self, uri: &str, content: Content) -> ApiResponse<T> {
        self.dispatch(HttpMethod::Upload, uri, Some(content))
    }

    pub fn delete<T: DeserializeOwned>(&self, uri: &str) -> ApiResponse<T> {
        self.dispatch(HttpMethod::Delete, uri, None)
    }

    /// Dispatch a call described at runtime.
    ///
    /// POST and PUT need a JSON body, UPLOAD needs binary content, and any
    /// body given to GET or DELETE is ignored. A call that breaks these rules,
    /// or has an empty URI, comes back as a fault envelope without touching
    /// the network.
    pub fn execute<T: DeserializeOwned>(
        &self,
        uri: &str,
        method: HttpMethod,
        body: Option<Body>,
    ) -> ApiResponse<T> {
        if uri.trim().is_empty() {
            return faulted(method, uri, &Fault::EmptyUri);
        }
        if !method.requires_body() {
            return self.dispatch(method, uri, None);
        }
        match (method, body) {
            (_, None) => faulted(method, uri, &Fault::MissingBody(method)),
            (HttpMethod::Upload, Some(Body::Binary(content))) => {
                self.dispatch(method, uri, Some(content))
            }
            (HttpMethod::Upload, Some(Body::Json(_))) => faulted(method, uri, &Fault::JsonBody),
            (_, Some(Body::Json(value))) => self.dispatch_json(method, uri, &value),
            (_, Some(Body::Binary(_))) => faulted(method, uri, &Fault::BinaryBody(method)),
        }
    }

    /// `execute` with the method given by name, matched case-insensitively.
    /// An unknown name is the only call rejected with `Err`.
    pub fn execute_named<T: DeserializeOwned>(
        &self,
        uri: &str,
        method: &str,
        body: Option<Body>,
    ) -> Result<ApiResponse<T>, DispatchError> {
        Ok(self.execute(uri, method.parse()?, body))
    }

    /// Build the outbound request, attaching the cached bearer token if any.
    pub fn build_request(
        &self,
        method: HttpMethod,
        uri: &str,
        content: Option<Content>,
    ) -> Result<HttpRequest, StoreError> {
        let mut headers = Vec::new();
        if let Some(session) = self.sessions.current()? {
            headers.push((AUTHORIZATION.to_string(), format!("bearer {}", session.token)));
        }
        let body = content.map(|content| {
            headers.push((CONTENT_TYPE.to_string(), content.content_type));
            content.bytes
        });
        Ok(HttpRequest {
            method,
            url: self.resolve(uri),
            headers,
            body,
        })
    }

    /// Classify a response into an envelope.
    ///
    /// 2xx bodies are trusted to already be envelopes. Anything else becomes
    /// one `"{reason} - {body}"` entry; a 401 also evicts the cached session.
    pub fn parse_response<T: DeserializeOwned>(&self, response: HttpResponse) -> ApiResponse<T> {
        if response.is_success() {
            return match ApiResponse::from_json(&response.body) {
                Ok(envelope) => envelope,
                Err(e) => {
                    let fault = Fault::Decode(e);
                    warn!(status = response.status, error = %fault, "undecodable response envelope");
                    ApiResponse::fault(&fault)
                }
            };
        }

        if response.is_unauthorized() {
            info!("server rejected the session; evicting cached credentials");
            if let Err(e) = self.sessions.clear() {
                warn!(error = %e, "failed to evict cached session");
            }
        }
        ApiResponse::failure(response.reason_phrase(), &response.body)
    }

    fn dispatch_json<T, B>(&self, method: HttpMethod, uri: &str, body: &B) -> ApiResponse<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        match Content::json(body) {
            Ok(content) => self.dispatch(method, uri, Some(content)),
            Err(e) => faulted(method, uri, &Fault::Encode(e)),
        }
    }

    fn dispatch<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        uri: &str,
        content: Option<Content>,
    ) -> ApiResponse<T> {
        let request = match self.build_request(method, uri, content) {
            Ok(request) => request,
            Err(e) => return faulted(method, uri, &Fault::from(e)),
        };
        debug!(method = %method, url = %request.url, "dispatching request");
        match self.transport.send(&request) {
            Ok(response) => self.parse_response(response),
            Err(e) => faulted(method, &request.url, &Fault::from(e)),
        }
    }

    fn resolve(&self, uri: &str) -> String {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            uri.to_string()
        } else {
            format!("{}/{}", self.base_url, uri.trim_start_matches('/'))
        }
    }
}

fn faulted<T>(method: HttpMethod, url: &str, fault: &Fault) -> ApiResponse<T> {
    warn!(method = %method, url, error = %fault, "request faulted");
    ApiResponse::fault(fault)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use serde::Deserialize;
    use uuid::Uuid;

    use super::*;
    use crate::cache::TokenCache;
    use crate::error::TransportError;
    use crate::http::JSON_CONTENT_TYPE;
    use crate::session::Session;
    use crate::storage::{MemoryStorage, Storage};

    type Reply = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync>;

    /// Answers every request with a scripted reply and records what it saw.
    struct StubTransport {
        reply: Reply,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl StubTransport {
        fn new(
            reply: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
        ) -> Arc<Self> {
            Arc::new(Self {
                reply: Box::new(reply),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn responding(status: u16, body: &'static str) -> Arc<Self> {
            Self::new(move |_| {
                Ok(HttpResponse {
                    status,
                    headers: Vec::new(),
                    body: body.to_string(),
                })
            })
        }

        fn last(&self) -> HttpRequest {
            self.seen.lock().last().cloned().unwrap()
        }

        fn calls(&self) -> usize {
            self.seen.lock().len()
        }
    }

    impl Transport for StubTransport {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().push(request.clone());
            (self.reply)(request)
        }
    }

    /// Memory storage that counts removals.
    #[derive(Default)]
    struct CountingStorage {
        inner: MemoryStorage,
        removals: AtomicUsize,
    }

    impl Storage for CountingStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: String) -> Result<(), StoreError> {
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), StoreError> {
            self.removals.fetch_add(1, Ordering::SeqCst);
            self.inner.remove_item(key)
        }
    }

    #[derive(Debug, Deserialize)]
    struct Item {
        id: u32,
    }

    fn session() -> Session {
        Session {
            id: Uuid::nil(),
            email: "rider@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            token: "tok-123".to_string(),
        }
    }

    fn client_with(transport: Arc<StubTransport>, storage: Arc<dyn Storage>) -> ApiClient {
        ApiClient::new(
            "http://localhost:3000/api/",
            transport,
            SessionStore::new(TokenCache::new(storage)),
        )
    }

    fn client(transport: Arc<StubTransport>) -> ApiClient {
        client_with(transport, Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn relative_uris_resolve_against_base() {
        let transport = StubTransport::responding(200, "");
        let c = client(transport.clone());
        let _: ApiResponse = c.get("/products");
        assert_eq!(transport.last().url, "http://localhost:3000/api/products");

        let _: ApiResponse = c.get("http://elsewhere/ping");
        assert_eq!(transport.last().url, "http://elsewhere/ping");
    }

    #[test]
    fn no_session_means_no_authorization_header() {
        let transport = StubTransport::responding(200, "");
        let _: ApiResponse = client(transport.clone()).get("products");
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.header(AUTHORIZATION).is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn cached_session_is_sent_as_bearer() {
        let transport = StubTransport::responding(200, "");
        let c = client(transport.clone());
        c.sessions().save(&session()).unwrap();

        let _: ApiResponse = c.delete("products/1");
        assert_eq!(transport.last().header("Authorization"), Some("bearer tok-123"));
    }

    #[test]
    fn post_encodes_json_body() {
        let transport = StubTransport::responding(200, "");
        let _: ApiResponse = client(transport.clone()).post("account/register", &serde_json::json!({ "email": "a@b.c" }));
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header(CONTENT_TYPE), Some(JSON_CONTENT_TYPE));
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["email"], "a@b.c");
    }

    #[test]
    fn upload_passes_content_through() {
        let transport = StubTransport::responding(200, "");
        let bytes = vec![0x89, 0x50, 0x4e, 0x47];
        let _: ApiResponse = client(transport.clone()).upload("products/1/image", Content::binary("image/png", bytes.clone()));
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Upload);
        assert_eq!(req.header(CONTENT_TYPE), Some("image/png"));
        assert_eq!(req.body, Some(bytes));
    }

    #[test]
    fn success_body_is_returned_verbatim() {
        let transport = StubTransport::responding(200, r#"{"data": {"id": 1}, "errors": []}"#);
        let response: ApiResponse<Item> = client(transport).get("products/1");
        assert!(response.success());
        assert_eq!(response.data().unwrap().id, 1);
    }

    #[test]
    fn success_status_with_server_errors_is_not_success() {
        let transport = StubTransport::responding(200, r#"{"errors": ["stock exhausted"]}"#);
        let response: ApiResponse<Item> = client(transport).get("products/1");
        assert!(!response.success());
        assert_eq!(response.errors(), ["stock exhausted"]);
    }

    #[test]
    fn unauthorized_evicts_session_once() {
        let storage = Arc::new(CountingStorage::default());
        let transport = StubTransport::responding(401, "token expired");
        let c = client_with(transport, storage.clone());
        c.sessions().save(&session()).unwrap();

        let response: ApiResponse<Item> = c.get("products");
        assert_eq!(storage.removals.load(Ordering::SeqCst), 1);
        assert!(c.sessions().current().unwrap().is_none());
        assert_eq!(response.errors().len(), 1);
        assert!(response.errors()[0].contains("Unauthorized"));
        assert!(response.errors()[0].contains("token expired"));
    }

    #[test]
    fn other_failures_keep_the_session() {
        let storage = Arc::new(CountingStorage::default());
        let transport = StubTransport::responding(500, "boom");
        let c = client_with(transport, storage.clone());
        c.sessions().save(&session()).unwrap();

        let response: ApiResponse = c.get("products");
        assert_eq!(response.errors(), ["Internal Server Error - boom"]);
        assert_eq!(storage.removals.load(Ordering::SeqCst), 0);
        assert!(c.sessions().current().unwrap().is_some());
    }

    #[test]
    fn transport_fault_becomes_envelope() {
        let transport = StubTransport::new(|_| Err(TransportError::new("timeout")));
        let response: ApiResponse<Item> = client(transport).get("products");
        assert!(!response.success());
        assert_eq!(response.errors().len(), 1);
        assert!(response.errors()[0].contains("timeout"));
        assert!(response.errors()[0].starts_with("Unhandled - "));
    }

    #[test]
    fn undecodable_success_body_becomes_fault() {
        let transport = StubTransport::responding(200, "<html>");
        let response: ApiResponse<Item> = client(transport).get("products");
        assert_eq!(response.errors().len(), 1);
        assert!(response.errors()[0].starts_with("Unhandled - "));
    }

    #[test]
    fn unencodable_body_faults_before_sending() {
        let transport = StubTransport::responding(200, "");
        let mut body = BTreeMap::new();
        body.insert((1u8, 2u8), "tuple keys are not JSON");

        let response: ApiResponse = client(transport.clone()).post("products", &body);
        assert!(!response.success());
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn malformed_calls_fold_into_fault_envelopes() {
        let transport = StubTransport::responding(200, "");
        let c = client(transport.clone());
        let json = || Some(Body::Json(serde_json::json!({})));
        let binary = || Some(Body::Binary(Content::binary("image/png", vec![1])));

        let cases: [(ApiResponse<Item>, &str); 4] = [
            (c.execute("", HttpMethod::Get, None), "request URI must not be empty"),
            (c.execute("products", HttpMethod::Post, None), "POST requires a request body"),
            (c.execute("products", HttpMethod::Put, binary()), "PUT takes a JSON body"),
            (c.execute("products/1/image", HttpMethod::Upload, json()), "UPLOAD takes pre-built"),
        ];
        for (response, message) in cases {
            assert!(!response.success());
            assert_eq!(response.errors().len(), 1);
            assert!(response.errors()[0].starts_with("Unhandled - "));
            assert!(response.errors()[0].contains(message), "{}", response.errors()[0]);
        }
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn execute_ignores_body_on_get() {
        let transport = StubTransport::responding(200, "");
        let c = client(transport.clone());
        let response: ApiResponse<Item> =
            c.execute("products", HttpMethod::Get, Some(Body::Json(serde_json::json!({ "x": 1 }))));
        assert!(response.success());
        assert!(transport.last().body.is_none());
    }

    #[test]
    fn execute_named_parses_the_method() {
        let transport = StubTransport::responding(200, r#"{"data":{"id":9}}"#);
        let c = client(transport.clone());
        let response = c
            .execute_named::<Item>("products/9", "put", Some(Body::Json(serde_json::json!({ "rate": 2.5 }))))
            .unwrap();
        assert_eq!(response.data().unwrap().id, 9);
        assert_eq!(transport.last().method, HttpMethod::Put);
    }

    #[test]
    fn unknown_method_name_is_the_only_err() {
        let transport = StubTransport::responding(200, "");
        let c = client(transport.clone());
        let result = c.execute_named::<Item>("products", "PATCH", None);
        assert!(matches!(result, Err(DispatchError::UnsupportedMethod(ref m)) if m == "PATCH"));
        assert_eq!(transport.calls(), 0);
    }
}
