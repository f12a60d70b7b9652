use std::rc::Rc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use super::result::{ApiResult, Body};
use crate::config::ApiConfig;
use crate::error::ValidationError;
use crate::models::{
    normalize_balance, normalize_created, normalize_login, normalize_transactions, Balance,
    Created, LoginGrant, NewTransaction, Status, Transaction, TransactionFilter, TransactionId,
    TransactionPatch,
};
use crate::session::SessionStore;
use crate::transport::{HttpRequest, HttpTransport, Method};

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";

#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    /// Skip the stored bearer token.
    pub anonymous: bool,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
            anonymous: false,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    pub fn delete() -> Self {
        Self::new(Method::Delete)
    }

    pub fn post(body: Value) -> Self {
        Self::new(Method::Post).json(body)
    }

    pub fn put(body: Value) -> Self {
        Self::new(Method::Put).json(body)
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(key, _)| key.eq_ignore_ascii_case(name))
    }
}

/// Typed access to the operaciones backend. Cheap to clone; every clone
/// shares the transport and the session store.
#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    transport: Rc<dyn HttpTransport>,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: ApiConfig, transport: Rc<dyn HttpTransport>, session: SessionStore) -> Self {
        Self {
            config,
            transport,
            session,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn request(&self, path: &str, options: RequestOptions) -> ApiResult<Body> {
        let mut headers = options.headers.clone();
        if !options.anonymous && !options.has_header(AUTHORIZATION) {
            if let Some(token) = self.session.token() {
                headers.push((AUTHORIZATION.to_string(), format!("Bearer {}", token)));
            }
        }
        let body = options.body.as_ref().map(Value::to_string);
        if body.is_some() && !options.has_header(CONTENT_TYPE) {
            headers.push((CONTENT_TYPE.to_string(), "application/json".to_string()));
        }

        let request = HttpRequest {
            method: options.method,
            url: self.config.url(path),
            headers,
            body,
        };
        log::debug!("{} {}", options.method.as_str(), path);

        match self.transport.send(request).await {
            Ok(response) => {
                let status = response.status;
                let body = Body::parse(response.text);
                if (200..300).contains(&status) && !body.declares_failure() {
                    ApiResult::Success { status, data: body }
                } else {
                    log::warn!("{} {} failed with HTTP {}", options.method.as_str(), path, status);
                    ApiResult::Failure {
                        status,
                        data: body.data,
                        text: body.text,
                    }
                }
            }
            Err(e) => {
                log::warn!("{} {} network error: {}", options.method.as_str(), path, e);
                ApiResult::NetworkError {
                    message: e.to_string(),
                }
            }
        }
    }

    pub async fn login(&self, username: &str, pin: &str) -> ApiResult<LoginGrant> {
        let options = RequestOptions::post(json!({ "username": username, "pin": pin })).anonymous();
        self.request("/login", options)
            .await
            .decode(|body| body.data.as_ref().and_then(normalize_login))
    }

    pub async fn list_transactions(&self, filter: TransactionFilter) -> ApiResult<Vec<Transaction>> {
        if filter.fecha.is_some() {
            return self.fetch_daily(filter.fecha).await;
        }
        self.request("/operaciones", RequestOptions::get())
            .await
            .map(|body| normalize_transactions(body.data.as_ref()))
    }

    pub async fn fetch_history(&self) -> ApiResult<Vec<Transaction>> {
        self.request("/historial", RequestOptions::get())
            .await
            .map(|body| normalize_transactions(body.data.as_ref()))
    }

    pub async fn fetch_daily(&self, fecha: Option<NaiveDate>) -> ApiResult<Vec<Transaction>> {
        let path = match fecha {
            Some(date) => format!("/daily?fecha={}", date.format("%Y-%m-%d")),
            None => "/daily".to_string(),
        };
        self.request(&path, RequestOptions::get())
            .await
            .map(|body| normalize_transactions(body.data.as_ref()))
    }

    pub async fn create_transaction(
        &self,
        payload: &NewTransaction,
    ) -> Result<ApiResult<Created>, ValidationError> {
        validate_new(payload)?;
        let result = self
            .request("/operaciones", RequestOptions::post(to_json(payload)))
            .await
            .map(|body| normalize_created(body.data.as_ref()));
        Ok(result)
    }

    pub async fn update_transaction(
        &self,
        id: &TransactionId,
        patch: &TransactionPatch,
    ) -> Result<ApiResult<()>, ValidationError> {
        validate_patch(patch)?;
        Ok(self.send_patch(id, patch).await)
    }

    pub async fn set_status(&self, id: &TransactionId, estado: Status) -> ApiResult<()> {
        self.send_patch(id, &TransactionPatch::status(estado)).await
    }

    async fn send_patch(&self, id: &TransactionId, patch: &TransactionPatch) -> ApiResult<()> {
        let path = format!("/operaciones/{}", id);
        self.request(&path, RequestOptions::put(to_json(patch)))
            .await
            .map(|_| ())
    }

    pub async fn delete_transaction(&self, id: &TransactionId) -> ApiResult<()> {
        let path = format!("/operaciones/{}", id);
        self.request(&path, RequestOptions::delete())
            .await
            .map(|_| ())
    }

    pub async fn fetch_balance(&self) -> ApiResult<Balance> {
        self.request("/caja", RequestOptions::get())
            .await
            .map(|body| normalize_balance(body.data.as_ref()))
    }

    /// Opaque snapshot for export. A non-JSON success body is a Failure.
    pub async fn fetch_backup(&self) -> ApiResult<Value> {
        self.request("/backup", RequestOptions::get())
            .await
            .decode(|body| body.data.clone())
    }

    pub async fn health(&self) -> ApiResult<()> {
        self.request("/health", RequestOptions::get().anonymous())
            .await
            .map(|_| ())
    }
}

impl PartialEq for ApiClient {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.transport, &other.transport)
            && self.session == other.session
            && self.config == other.config
    }
}

fn to_json<T: Serialize>(value: &T) -> Value {
    // Plain structs of strings and finite numbers always serialize.
    serde_json::to_value(value).unwrap_or(Value::Null)
}

pub fn validate_amount(importe: f64) -> Result<(), ValidationError> {
    if importe.is_finite() && importe > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidAmount)
    }
}

pub fn validate_new(payload: &NewTransaction) -> Result<(), ValidationError> {
    if payload.tipo.trim().is_empty() {
        return Err(ValidationError::MissingField("tipo"));
    }
    validate_amount(payload.importe)
}

pub fn validate_patch(patch: &TransactionPatch) -> Result<(), ValidationError> {
    if patch.is_empty() {
        return Err(ValidationError::EmptyPatch);
    }
    if let Some(tipo) = &patch.tipo {
        if tipo.trim().is_empty() {
            return Err(ValidationError::MissingField("tipo"));
        }
    }
    if let Some(importe) = patch.importe {
        validate_amount(importe)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::transport::mock::RecordingTransport;
    use futures::executor::block_on;

    fn client() -> (Rc<RecordingTransport>, ApiClient) {
        let transport = Rc::new(RecordingTransport::new());
        let session = SessionStore::new(Rc::new(MemoryStorage::new()));
        let api = ApiClient::new(
            ApiConfig::new("https://eaxy.test/api"),
            transport.clone(),
            session,
        );
        (transport, api)
    }

    #[test]
    fn bearer_token_matches_the_session() {
        let (transport, api) = client();
        api.session().save("abc", "ana", "Barcelona");
        transport.reply(200, r#"{"total": 10}"#);

        block_on(api.fetch_balance());

        let request = transport.last_request().unwrap();
        let expected = format!("Bearer {}", api.session().token().unwrap());
        assert_eq!(request.header("authorization"), Some(expected.as_str()));
        assert_eq!(request.url, "https://eaxy.test/api/caja");
        assert_eq!(request.method, Method::Get);
    }

    #[test]
    fn no_session_means_no_authorization_header() {
        let (transport, api) = client();
        transport.reply(200, "[]");

        block_on(api.list_transactions(TransactionFilter::default()));

        assert_eq!(transport.last_request().unwrap().header(AUTHORIZATION), None);
    }

    #[test]
    fn explicit_authorization_header_wins() {
        let (transport, api) = client();
        api.session().save("abc", "ana", "Barcelona");
        transport.reply(200, "{}");

        let options = RequestOptions::get().header("Authorization", "Bearer other");
        block_on(api.request("/backup", options));

        let request = transport.last_request().unwrap();
        let auth: Vec<_> = request
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(AUTHORIZATION))
            .collect();
        assert_eq!(auth.len(), 1);
        assert_eq!(request.header(AUTHORIZATION), Some("Bearer other"));
    }

    #[test]
    fn login_is_sent_without_a_token() {
        let (transport, api) = client();
        api.session().save("stale", "ana", "Barcelona");
        transport.reply(200, r#"{"token":"abc","tienda":"Barcelona"}"#);

        let result = block_on(api.login("ana", "1234"));

        let request = transport.last_request().unwrap();
        assert_eq!(request.header(AUTHORIZATION), None);
        assert_eq!(request.header(CONTENT_TYPE), Some("application/json"));
        let sent: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"username": "ana", "pin": "1234"}));
        assert_eq!(result.data().map(|g| g.token.as_str()), Some("abc"));
    }

    #[test]
    fn malformed_json_is_a_value_not_a_panic() {
        let (transport, api) = client();
        transport.reply(200, "<html>oops</html>");
        transport.reply(500, "{\"error\": ");

        let ok = block_on(api.request("/caja", RequestOptions::get()));
        assert_eq!(
            ok,
            ApiResult::Success {
                status: 200,
                data: Body {
                    data: None,
                    text: "<html>oops</html>".to_string()
                }
            }
        );

        let failed = block_on(api.request("/caja", RequestOptions::get()));
        assert_eq!(
            failed,
            ApiResult::Failure {
                status: 500,
                data: None,
                text: "{\"error\": ".to_string()
            }
        );
    }

    #[test]
    fn transport_failure_is_a_network_error() {
        let (transport, api) = client();
        transport.fail("connection refused");

        let result = block_on(api.fetch_history());

        assert_eq!(
            result,
            ApiResult::NetworkError {
                message: "connection refused".to_string()
            }
        );
        assert_eq!(result.status(), None);
    }

    #[test]
    fn wrong_pin_surfaces_backend_message() {
        let (transport, api) = client();
        transport.reply(401, r#"{"ok":false,"msg":"PIN incorrecto"}"#);

        let result = block_on(api.login("ana", "0000"));

        assert_eq!(result.status(), Some(401));
        assert_eq!(
            result.error_message("Usuario o PIN incorrectos").as_deref(),
            Some("PIN incorrecto")
        );
    }

    #[test]
    fn bare_and_wrapped_lists_render_the_same() {
        let (transport, api) = client();
        let item = r#"{"id":1,"tipo":"cash","importe":50,"moneda":"EUR","estado":"pendiente"}"#;
        transport.reply(200, &format!("[{}]", item));
        transport.reply(200, &format!(r#"{{"operaciones":[{}]}}"#, item));

        let bare = block_on(api.list_transactions(TransactionFilter::default()));
        let wrapped = block_on(api.list_transactions(TransactionFilter::default()));

        assert!(bare.is_ok());
        assert_eq!(bare, wrapped);
        assert_eq!(bare.data().unwrap().len(), 1);
    }

    #[test]
    fn daily_filter_hits_the_daily_endpoint() {
        let (transport, api) = client();
        transport.reply(200, r#"{"daily":[]}"#);

        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let result = block_on(api.list_transactions(TransactionFilter::daily(date)));

        assert_eq!(result.data(), Some(&Vec::new()));
        assert_eq!(
            transport.last_request().unwrap().url,
            "https://eaxy.test/api/daily?fecha=2024-03-09"
        );
    }

    #[test]
    fn invalid_payloads_never_reach_the_network() {
        let (transport, api) = client();

        let zero = NewTransaction::new("cash", 0.0);
        let empty_tipo = NewTransaction::new("  ", 50.0);
        let nan = NewTransaction::new("cash", f64::NAN);

        assert_eq!(
            block_on(api.create_transaction(&zero)).unwrap_err(),
            ValidationError::InvalidAmount
        );
        assert_eq!(
            block_on(api.create_transaction(&empty_tipo)).unwrap_err(),
            ValidationError::MissingField("tipo")
        );
        assert_eq!(
            block_on(api.create_transaction(&nan)).unwrap_err(),
            ValidationError::InvalidAmount
        );
        let id = TransactionId::new("1");
        assert_eq!(
            block_on(api.update_transaction(&id, &TransactionPatch::default())).unwrap_err(),
            ValidationError::EmptyPatch
        );
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn create_posts_the_payload_and_reads_the_id() {
        let (transport, api) = client();
        api.session().save("abc", "ana", "Barcelona");
        transport.reply(201, r#"{"ok":true,"id":"42"}"#);

        let mut payload = NewTransaction::new("cash", 50.0);
        payload.moneda = "EUR".to_string();
        let result = block_on(api.create_transaction(&payload)).unwrap();

        assert_eq!(
            result,
            ApiResult::Success {
                status: 201,
                data: Created {
                    id: Some(TransactionId::new("42")),
                    fecha: None
                }
            }
        );
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, Method::Post);
        let sent: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"tipo": "cash", "importe": 50.0, "moneda": "EUR"}));
    }

    #[test]
    fn amount_patch_puts_only_the_importe() {
        let (transport, api) = client();
        api.session().save("abc", "ana", "Barcelona");
        transport.reply(200, r#"{"ok":true}"#);
        let id = TransactionId::new("12");
        let patch = TransactionPatch {
            importe: Some(75.5),
            ..TransactionPatch::default()
        };

        let result = block_on(api.update_transaction(&id, &patch)).unwrap();

        assert!(result.is_ok());
        let request = transport.last_request().unwrap();
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.url, "https://eaxy.test/api/operaciones/12");
        assert_eq!(request.header(AUTHORIZATION), Some("Bearer abc"));
        let sent: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(sent, json!({"importe": 75.5}));
    }

    #[test]
    fn bad_patch_amounts_never_reach_the_network() {
        let (transport, api) = client();
        let id = TransactionId::new("12");

        for importe in [0.0, -3.0, f64::NAN] {
            let patch = TransactionPatch {
                importe: Some(importe),
                ..TransactionPatch::default()
            };
            assert_eq!(
                block_on(api.update_transaction(&id, &patch)).unwrap_err(),
                ValidationError::InvalidAmount
            );
        }
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn ok_false_in_a_success_status_is_a_failure() {
        let (transport, api) = client();
        transport.reply(200, r#"{"ok":false,"error":"tipo desconocido"}"#);

        let result = block_on(api.create_transaction(&NewTransaction::new("cash", 5.0))).unwrap();

        assert!(!result.is_ok());
        assert_eq!(result.error_message("x").as_deref(), Some("tipo desconocido"));
    }

    #[test]
    fn status_change_and_delete_target_the_item() {
        let (transport, api) = client();
        transport.reply(200, r#"{"success":true}"#);
        transport.reply(200, r#"{"success":true}"#);
        let id = TransactionId::new("9");

        assert!(block_on(api.set_status(&id, Status::RecogidaPendiente)).is_ok());
        assert!(block_on(api.delete_transaction(&id)).is_ok());

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::Put);
        assert_eq!(requests[0].url, "https://eaxy.test/api/operaciones/9");
        assert_eq!(
            requests[0].body.as_deref(),
            Some(r#"{"estado":"recogida_pendiente"}"#)
        );
        assert_eq!(requests[1].method, Method::Delete);
        assert_eq!(requests[1].body, None);
        assert_eq!(requests[1].header(CONTENT_TYPE), None);
    }

    #[test]
    fn backup_is_returned_untouched() {
        let (transport, api) = client();
        transport.reply(200, r#"{"users":[{"username":"Dani"}],"operaciones":[]}"#);
        transport.reply(200, "not json");

        let snapshot = block_on(api.fetch_backup());
        assert_eq!(
            snapshot.data(),
            Some(&json!({"users": [{"username": "Dani"}], "operaciones": []}))
        );

        let broken = block_on(api.fetch_backup());
        assert!(!broken.is_ok());
        assert_eq!(broken.status(), Some(200));
    }

    #[test]
    fn health_check_is_anonymous() {
        let (transport, api) = client();
        api.session().save("abc", "ana", "Barcelona");
        transport.reply(200, r#"{"ok":true}"#);

        assert!(block_on(api.health()).is_ok());
        let request = transport.last_request().unwrap();
        assert_eq!(request.url, "https://eaxy.test/api/health");
        assert_eq!(request.header(AUTHORIZATION), None);
    }
}
