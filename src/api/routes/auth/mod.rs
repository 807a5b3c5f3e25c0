pub mod public;
pub mod router;
pub use router::{me_handler, oauth2callback_handler, router};
