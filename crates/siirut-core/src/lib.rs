//! Core of siirut: RUT normalisation, taxpayer types, and extraction of the
//! SII "situación tributaria" page.

pub mod extract;
pub mod model;
pub mod response;
pub mod rut;

pub use extract::{ExtractError, extract};
pub use model::{Activity, TaxpayerRecord};
pub use response::TaxpayerResponse;
pub use rut::{CANONICAL_RUT_LEN, NormalizedRut, RutError, normalize};
