//! Backend commands queued from UI to backend worker.

use client_core::StoreCommand;

#[derive(Debug, Clone)]
pub enum BackendCommand {
    Store(StoreCommand),
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Store(command) => command.name(),
            Self::Shutdown => "shutdown",
        }
    }
}
