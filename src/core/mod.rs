pub mod constant;
pub mod validator;

mod error;
pub use error::{Error, ErrorKind};
