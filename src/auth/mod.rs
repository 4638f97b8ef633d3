//! Authentication: password hashing, bearer tokens and the request extractor
//! that turns an `Authorization` header into the acting user.

pub mod extractor;
pub mod password;
pub mod token;

pub use extractor::CurrentUser;
pub use token::{Claims, TokenService};
