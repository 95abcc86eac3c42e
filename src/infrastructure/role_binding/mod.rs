//! Role binding infrastructure implementations

mod repository;

pub use repository::StorageRoleBindingRepository;
