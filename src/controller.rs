//! What the pages do once a form is submitted or a list is opened. Views
//! call these and only deal with rendering the outcome.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::api::ApiClient;
use crate::error::{ClientError, ValidationError, LOGIN_FAILED_MESSAGE, OPERATION_FAILED_MESSAGE};
use crate::models::{
    Balance, NewTransaction, Status, Transaction, TransactionFilter, TransactionId,
    DEFAULT_CURRENCY,
};
use crate::session::{Session, SessionStore, DEFAULT_BRANCH};

const RECENT_MOVEMENTS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Login,
    Home,
    Operaciones,
    CajaFuerte,
    Daily,
    Historial,
    Ajustes,
}

impl Page {
    pub const NAV: [Page; 6] = [
        Page::Home,
        Page::Operaciones,
        Page::CajaFuerte,
        Page::Daily,
        Page::Historial,
        Page::Ajustes,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Login => "Acceso",
            Page::Home => "Inicio",
            Page::Operaciones => "Operaciones",
            Page::CajaFuerte => "Caja fuerte",
            Page::Daily => "Daily",
            Page::Historial => "Historial",
            Page::Ajustes => "Ajustes",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Navigate(Page),
    ReloadList,
}

pub async fn login(api: &ApiClient, username: &str, pin: &str) -> Result<Effect, ClientError> {
    let username = username.trim();
    let pin = pin.trim();
    if username.is_empty() {
        return Err(ValidationError::MissingField("usuario").into());
    }
    if pin.is_empty() {
        return Err(ValidationError::MissingField("pin").into());
    }

    let grant = api
        .login(username, pin)
        .await
        .into_result(LOGIN_FAILED_MESSAGE)?;
    let name = grant.username.unwrap_or_else(|| username.to_string());
    let branch = grant.branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string());
    api.session().save(&grant.token, &name, &branch);
    log::info!("Logged in as {} ({})", name, branch);

    Ok(Effect::Navigate(Page::Home))
}

pub fn logout(session: &SessionStore) -> Effect {
    session.clear();
    log::info!("Logged out");
    Effect::Navigate(Page::Login)
}

/// Raw values of the create form, exactly as typed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionForm {
    pub tipo: String,
    pub cliente: String,
    pub importe: String,
    pub moneda: String,
}

impl TransactionForm {
    pub fn to_payload(&self, session: Option<&Session>) -> Result<NewTransaction, ValidationError> {
        let tipo = self.tipo.trim();
        if tipo.is_empty() {
            return Err(ValidationError::MissingField("tipo"));
        }
        let importe = parse_amount(&self.importe).ok_or(ValidationError::InvalidAmount)?;
        crate::api::validate_amount(importe)?;

        let cliente = Some(self.cliente.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let moneda = match self.moneda.trim() {
            "" => DEFAULT_CURRENCY.to_string(),
            code => code.to_uppercase(),
        };

        Ok(NewTransaction {
            tipo: tipo.to_string(),
            cliente,
            importe,
            moneda,
            usuario: session.map(|s| s.username.clone()),
            oficina: session.map(|s| s.branch.clone()),
        })
    }
}

/// Accepts a decimal comma as well as a point.
fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse().ok()
}

pub async fn create_transaction(
    api: &ApiClient,
    form: &TransactionForm,
) -> Result<Effect, ClientError> {
    let session = api.session().load();
    let payload = form.to_payload(session.as_ref())?;
    let created = api
        .create_transaction(&payload)
        .await?
        .into_result(OPERATION_FAILED_MESSAGE)?;
    if let Some(id) = created.id {
        log::info!("Created operación {}", id);
    }
    Ok(Effect::ReloadList)
}

pub async fn change_status(
    api: &ApiClient,
    id: &TransactionId,
    estado: Status,
) -> Result<Effect, ClientError> {
    api.set_status(id, estado)
        .await
        .into_result(OPERATION_FAILED_MESSAGE)?;
    Ok(Effect::ReloadList)
}

pub async fn delete_transaction(api: &ApiClient, id: &TransactionId) -> Result<Effect, ClientError> {
    api.delete_transaction(id)
        .await
        .into_result(OPERATION_FAILED_MESSAGE)?;
    Ok(Effect::ReloadList)
}

pub async fn load_operations(api: &ApiClient) -> Result<Vec<Transaction>, ClientError> {
    api.list_transactions(TransactionFilter::default())
        .await
        .into_result(OPERATION_FAILED_MESSAGE)
}

pub async fn load_history(api: &ApiClient) -> Result<Vec<Transaction>, ClientError> {
    api.fetch_history()
        .await
        .into_result(OPERATION_FAILED_MESSAGE)
}

pub async fn load_daily(
    api: &ApiClient,
    fecha: Option<NaiveDate>,
) -> Result<Vec<Transaction>, ClientError> {
    api.fetch_daily(fecha)
        .await
        .into_result(OPERATION_FAILED_MESSAGE)
}

#[derive(Clone, Debug, PartialEq)]
pub struct SafeSummary {
    pub balance: Balance,
    pub recent: Vec<Transaction>,
}

pub async fn load_safe(api: &ApiClient) -> Result<SafeSummary, ClientError> {
    let balance = api
        .fetch_balance()
        .await
        .into_result(OPERATION_FAILED_MESSAGE)?;
    let mut recent = load_history(api).await?;
    recent.truncate(RECENT_MOVEMENTS);
    Ok(SafeSummary { balance, recent })
}

#[derive(Clone, Debug, PartialEq)]
pub struct BackupFile {
    pub filename: String,
    pub contents: String,
}

pub fn backup_filename(now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(&[':', 'T'][..], "_");
    format!("eaxy_backup_{}.json", stamp)
}

pub async fn export_backup(api: &ApiClient, now: DateTime<Utc>) -> Result<BackupFile, ClientError> {
    let snapshot = api
        .fetch_backup()
        .await
        .into_result("Error al exportar")?;
    let contents = serde_json::to_string_pretty(&snapshot).unwrap_or_else(|_| snapshot.to_string());
    Ok(BackupFile {
        filename: backup_filename(now),
        contents,
    })
}
