// Wizard domain modules and shared errors/models
pub mod form {
    pub use crate::form::*;
}

pub mod slot {
    pub use crate::slot::*;
}

pub mod wizard {
    pub use crate::wizard::*;
}

pub mod messages {
    pub use crate::messages::*;
}

pub mod submission {
    pub use crate::submission::*;
}

pub mod onboarding {
    pub use crate::onboarding::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
