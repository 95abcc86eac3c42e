//! Infrastructure layer - Store backends, repository implementations and logging

pub mod logging;
pub mod role_binding;
pub mod storage;
