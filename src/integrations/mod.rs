//! External service integrations.

pub mod llm_client {
    pub use crate::llm_client::*;
}

pub mod queue {
    pub use crate::queue::*;
}

pub mod supabase_client {
    pub use crate::supabase_client::*;
}

pub mod webhook_models {
    pub use crate::webhook_models::*;
}
