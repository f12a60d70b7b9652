use wasm_bindgen::JsValue;

const DEFAULT_API_PATH: &str = "/api";

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolves the backend base URL once at startup: an injected
    /// `window.FRONTEND_API_URL`, then `EAXY_API_URL` at build time, then
    /// same-origin `/api`.
    pub fn resolve() -> Self {
        if let Some(url) = injected_api_url() {
            log::info!("Using injected API base URL: {}", url);
            return Self::new(url);
        }
        if let Some(url) = option_env!("EAXY_API_URL").filter(|u| !u.trim().is_empty()) {
            return Self::new(url);
        }
        let origin = web_sys::window()
            .and_then(|window| window.location().origin().ok())
            .unwrap_or_default();
        Self::new(format!("{}{}", origin, DEFAULT_API_PATH))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn injected_api_url() -> Option<String> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str("FRONTEND_API_URL")).ok()?;
    value.as_string().filter(|url| !url.trim().is_empty())
}
