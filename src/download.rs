use gloo_timers::callback::Timeout;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::controller::BackupFile;

const REVOKE_DELAY_MS: u32 = 1_000;

/// Offers `file` to the user through a temporary object URL.
pub fn download_file(file: &BackupFile) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let parts = js_sys::Array::of1(&JsValue::from_str(&file.contents));
    let mut options = BlobPropertyBag::new();
    options.type_("application/json");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(&file.filename);
    anchor.click();

    // Revoking in the same tick can cancel the download in some browsers.
    Timeout::new(REVOKE_DELAY_MS, move || {
        if let Err(e) = Url::revoke_object_url(&url) {
            log::warn!("Could not revoke backup URL: {:?}", e);
        }
    })
    .forget();
    Ok(())
}
