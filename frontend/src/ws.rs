use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use crate::api::ws_url;
use crate::models::{ClientEvent, ServerEvent};

/// The page's single real-time channel. Closes the socket on drop.
pub struct ChatSocket {
    ws: WebSocket,
}

impl ChatSocket {
    /// Opens the connection. Every parsed server event goes to `on_event`;
    /// `on_close` fires once when the connection ends or fails to open.
    pub fn connect(
        on_open: impl Fn() + 'static,
        on_event: impl Fn(ServerEvent) + 'static,
        on_close: impl Fn() + 'static,
    ) -> Result<Self, String> {
        let url = ws_url()?;
        let ws = WebSocket::new(&url).map_err(|e| format!("Failed to connect: {e:?}"))?;
        ws.set_binary_type(web_sys::BinaryType::Arraybuffer);

        // --- onopen ---
        let onopen = Closure::<dyn Fn()>::new(move || {
            log::info!("WebSocket connected");
            on_open();
        });
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();

        // --- onmessage: dispatch ServerEvent ---
        let onmessage = Closure::<dyn Fn(MessageEvent)>::new(move |ev: MessageEvent| {
            let Some(text) = ev.data().as_string() else {
                return;
            };
            match serde_json::from_str::<ServerEvent>(&text) {
                Ok(event) => on_event(event),
                Err(e) => log::warn!("Ignoring unparsable server event: {e}"),
            }
        });
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();

        // --- onerror: logged only, a close always follows ---
        let onerror = Closure::<dyn Fn()>::new(move || {
            log::error!("WebSocket connection error");
        });
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        let onclose = Closure::<dyn Fn(CloseEvent)>::new(move |ev: CloseEvent| {
            log::warn!("WebSocket closed (code {})", ev.code());
            on_close();
        });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();

        Ok(Self { ws })
    }

    /// Fire-and-forget send. Returns `false` if the event did not go out.
    pub fn emit(&self, event: &ClientEvent) -> bool {
        if self.ws.ready_state() != WebSocket::OPEN {
            log::debug!("Socket not open, holding {event:?}");
            return false;
        }
        match serde_json::to_string(event) {
            Ok(json) => match self.ws.send_with_str(&json) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("WebSocket send failed: {e:?}");
                    false
                }
            },
            Err(e) => {
                log::error!("Failed to encode {event:?}: {e}");
                true
            }
        }
    }
}

impl Drop for ChatSocket {
    fn drop(&mut self) {
        // A replaced socket must not schedule another reconnect.
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onclose(None);
        let _ = self.ws.close();
    }
}
