//! Domain types: catalogs, parameter rows, form state, the request payload.

pub mod catalog;
pub mod error;
pub mod form;
pub mod params;
pub mod request;

pub use catalog::{CatalogId, Catalogs, Coin, Indicator};
pub use error::FormError;
pub use form::{FormState, ScalarField};
pub use params::{ParamField, ParameterList, ParameterRow};
pub use request::BacktestRequest;
