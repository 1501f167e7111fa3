use gloo_net::http::Request;
use leptos::task::spawn_local;

use crate::models::DeleteRequest;

/// Asks the server to delete message `id`.
pub async fn delete_message(id: u64) -> Result<(), String> {
    let resp = Request::post("/delete")
        .json(&DeleteRequest { id })
        .map_err(|e| format!("Serialize error: {e}"))?
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.ok() {
        return Err(format!("Server error: {}", resp.status()));
    }
    Ok(())
}

/// Fire-and-forget delete: the removal itself arrives as `message_deleted`.
pub fn request_delete(id: u64) {
    spawn_local(async move {
        if let Err(e) = delete_message(id).await {
            log::warn!("Delete of message {id} failed: {e}");
        }
    });
}

/// WebSocket URL on the same host that served the page.
pub fn ws_url() -> Result<String, String> {
    let location = leptos::prelude::window().location();
    let host = location.host().map_err(|e| format!("No host: {e:?}"))?;
    let scheme = match location.protocol() {
        Ok(protocol) if protocol == "https:" => "wss",
        _ => "ws",
    };
    Ok(format!("{scheme}://{host}/ws"))
}
