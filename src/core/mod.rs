// Domain-layer modules and shared errors/models
pub mod extraction {
    pub use crate::extraction::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod phone {
    pub use crate::phone::*;
}

pub mod worker {
    pub use crate::worker::*;
}

pub mod errors {
    pub use crate::errors::*;
}
