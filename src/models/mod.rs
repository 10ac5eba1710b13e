pub mod row;
pub mod response;

pub use row::*;
pub use response::*;
