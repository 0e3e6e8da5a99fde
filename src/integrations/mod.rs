//! KYC backend integration.

pub mod kyc_client {
    pub use crate::kyc_client::*;
}

pub mod backend_models {
    pub use crate::backend_models::*;
}

pub mod circuit_breaker {
    pub use crate::circuit_breaker::*;
}
