//! Commands for the QR context.

use qrmenu_core::command::Command;
use uuid::Uuid;

use super::options::RenderOptions;

/// Command to render a menu's code and cache it in the artifact store.
#[derive(Debug, Clone)]
pub struct SaveQrCode {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The menu whose code is saved.
    pub menu_id: Uuid,
    /// How to render it.
    pub options: RenderOptions,
}

impl Command for SaveQrCode {
    fn command_type(&self) -> &'static str {
        "qr.save_qr_code"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
