pub mod casing;
pub mod descriptor;
pub mod integral;
pub mod lookup;
pub mod resolver;
pub mod types;

pub use casing::{alter_casing, InvalidConfiguration};
pub use descriptor::{compile, compile_with_cancel};
pub use integral::Integral;
pub use lookup::{lookup, lookup_with_separator, LookupError};
pub use resolver::{resolve_cases, CaseResolution};
pub use types::*;

pub use tokio_util::sync::CancellationToken;
