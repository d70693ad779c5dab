//! Messages exchanged between the controller and the rendering surface.
//!
//! The two sides never share state. Each message travels as a JSON envelope
//! `{"type": ..., ...payload}` over an in-process channel, and each side
//! decodes what it receives, dropping anything it does not recognize.
//! A channel preserves FIFO order, so the last `setTheme` sent is the one the
//! surface ends up showing.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::keyboard::code::KeyIdentifier;
use crate::keyboard::layout::KeyboardLayout;
use crate::prefs::Theme;

/// Controller to surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceCommand {
    #[serde(rename = "keydown")]
    KeyDown {
        #[serde(rename = "keyIdentifier")]
        key_identifier: KeyIdentifier,
    },
    #[serde(rename = "keyup")]
    KeyUp {
        #[serde(rename = "keyIdentifier")]
        key_identifier: KeyIdentifier,
    },
    #[serde(rename = "blur")]
    Blur,
    #[serde(rename = "setTheme")]
    SetTheme { theme: Theme },
    #[serde(rename = "toggleTheme")]
    ToggleTheme,
}

/// Surface to controller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceRequest {
    #[serde(rename = "close")]
    Close,
    #[serde(rename = "saveTheme")]
    SaveTheme { theme: Theme },
    #[serde(rename = "saveKeyboardLayout")]
    SaveKeyboardLayout { layout: KeyboardLayout },
    #[serde(rename = "requestTheme")]
    RequestTheme,
}

/// Decode one envelope, or `None` for unknown types and bad payloads.
pub fn decode<T: DeserializeOwned>(envelope: Value) -> Option<T> {
    match serde_json::from_value(envelope) {
        Ok(message) => Some(message),
        Err(e) => {
            log::debug!("ignoring unrecognized message: {e}");
            None
        }
    }
}

/// One side of the controller/surface channel. Sends `Out`, receives `In`.
pub struct Endpoint<Out, In> {
    tx: Sender<Value>,
    rx: Receiver<Value>,
    _types: std::marker::PhantomData<fn(Out) -> In>,
}

pub type ControllerEndpoint = Endpoint<SurfaceCommand, SurfaceRequest>;
pub type SurfaceEndpoint = Endpoint<SurfaceRequest, SurfaceCommand>;

/// A connected pair of endpoints.
pub fn channel() -> (ControllerEndpoint, SurfaceEndpoint) {
    let (to_surface, surface_inbox) = mpsc::channel();
    let (to_controller, controller_inbox) = mpsc::channel();
    (
        Endpoint::new(to_surface, controller_inbox),
        Endpoint::new(to_controller, surface_inbox),
    )
}

impl<Out: Serialize, In: DeserializeOwned> Endpoint<Out, In> {
    fn new(tx: Sender<Value>, rx: Receiver<Value>) -> Self {
        Self {
            tx,
            rx,
            _types: std::marker::PhantomData,
        }
    }

    /// Fire and forget. A peer that has gone away is not an error.
    pub fn post(&self, message: &Out) {
        match serde_json::to_value(message) {
            Ok(envelope) => self.post_raw(envelope),
            Err(e) => log::warn!("could not encode message: {e}"),
        }
    }

    pub fn post_raw(&self, envelope: Value) {
        let _ = self.tx.send(envelope);
    }

    /// Everything received so far, in arrival order, minus what failed to decode.
    pub fn drain(&self) -> Vec<In> {
        let mut messages = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(envelope) => messages.extend(decode(envelope)),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shapes() {
        let down = SurfaceCommand::KeyDown {
            key_identifier: KeyIdentifier::new("t"),
        };
        assert_eq!(
            serde_json::to_value(&down).unwrap(),
            json!({"type": "keydown", "keyIdentifier": "t"})
        );
        assert_eq!(
            serde_json::to_value(&SurfaceCommand::Blur).unwrap(),
            json!({"type": "blur"})
        );
        assert_eq!(
            serde_json::to_value(&SurfaceCommand::SetTheme { theme: Theme::Dark }).unwrap(),
            json!({"type": "setTheme", "theme": "dark"})
        );
        assert_eq!(
            serde_json::to_value(&SurfaceRequest::SaveKeyboardLayout {
                layout: KeyboardLayout::Mac
            })
            .unwrap(),
            json!({"type": "saveKeyboardLayout", "layout": "mac"})
        );
        assert_eq!(
            serde_json::to_value(&SurfaceRequest::RequestTheme).unwrap(),
            json!({"type": "requestTheme"})
        );
    }

    #[test]
    fn test_decode_ignores_unknown_and_malformed() {
        assert_eq!(decode::<SurfaceRequest>(json!({"type": "launchRockets"})), None);
        assert_eq!(decode::<SurfaceRequest>(json!({"theme": "dark"})), None);
        assert_eq!(
            decode::<SurfaceRequest>(json!({"type": "saveTheme", "theme": "sepia"})),
            None
        );
        assert_eq!(decode::<SurfaceCommand>(json!("keydown")), None);
        assert_eq!(
            decode::<SurfaceRequest>(json!({"type": "close", "extra": 1})),
            Some(SurfaceRequest::Close)
        );
    }

    #[test]
    fn test_channel_preserves_order_and_drops_garbage() {
        let (controller, surface) = channel();
        controller.post(&SurfaceCommand::SetTheme { theme: Theme::Light });
        controller.post_raw(json!({"type": "nonsense"}));
        controller.post(&SurfaceCommand::SetTheme { theme: Theme::Dark });

        assert_eq!(
            surface.drain(),
            vec![
                SurfaceCommand::SetTheme { theme: Theme::Light },
                SurfaceCommand::SetTheme { theme: Theme::Dark },
            ]
        );
        assert!(surface.drain().is_empty());
    }

    #[test]
    fn test_post_to_dropped_peer_is_silent() {
        let (controller, surface) = channel();
        drop(surface);
        controller.post(&SurfaceCommand::Blur);
        assert!(controller.drain().is_empty());
    }
}
