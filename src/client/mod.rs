pub mod error;
pub mod options;
pub mod response;
pub mod tripletex;

pub use error::{ClientError, Result};
pub use options::ClientOptions;
pub use response::{ListResponse, ResponseWrapper, WhoAmI};
pub use tripletex::TripletexClient;
