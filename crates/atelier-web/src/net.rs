use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Fetch a same-origin JSON document and decode it. Network failures, HTTP
/// errors and parse errors all come back as one `Err` so callers can show a
/// single inline message.
pub async fn fetch_json<T: DeserializeOwned>(url: &str) -> anyhow::Result<T> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| anyhow::anyhow!("fetch {url}: {:?}", e))?;
    let response: web::Response = response
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("fetch {url} returned a non-response: {:?}", e))?;
    if !response.ok() {
        return Err(anyhow::anyhow!("fetch {url}: HTTP {}", response.status()));
    }
    let text = JsFuture::from(
        response
            .text()
            .map_err(|e| anyhow::anyhow!("read {url}: {:?}", e))?,
    )
    .await
    .map_err(|e| anyhow::anyhow!("read {url}: {:?}", e))?
    .as_string()
    .ok_or_else(|| anyhow::anyhow!("read {url}: body was not text"))?;
    let decoded = serde_json::from_str(&text).map_err(|e| anyhow::anyhow!("parse {url}: {e}"))?;
    Ok(decoded)
}
