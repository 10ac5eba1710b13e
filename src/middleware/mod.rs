pub mod update_key;

pub use update_key::UpdateKeyMiddleware;
