//! # flash-session
//!
//! One-shot "flash" messages for post-redirect-get flows, as request
//! middleware. Nothing more. Nothing less.
//!
//! ## The contract
//!
//! Your session layer owns sessions: cookies, storage, expiry, signing.
//! flash-session does not. It reads and writes exactly one field, `"flash"`,
//! on whatever [`Session`] the host attached to the [`Request`].
//!
//! - [`FlashLayer`](middleware::FlashLayer) binds a [`Flash`] accessor to every request
//! - [`Flash::queue`] formats a message (`%s`, `%d`, ...) and stores it under a kind
//! - [`Flash::peek`] reads one kind without consuming it
//! - [`Flash::drain`] reads every kind and clears the field
//!
//! ## Quick start
//!
//! ```rust
//! use flash_session::middleware::FlashLayer;
//! use flash_session::{FlashError, MemorySession, Pipeline, Request, Response, Session};
//! use http::{Method, StatusCode, Uri};
//!
//! async fn save(req: Request) -> Result<Response, FlashError> {
//!     let flash = req.flash().ok_or(FlashError::MissingSession)?;
//!     flash.queue("info", "saved %s", ["draft"])?;
//!     Ok(Response::builder()
//!         .status(StatusCode::SEE_OTHER)
//!         .header("location", "/")
//!         .no_body())
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let app = Pipeline::new(save).layer(FlashLayer::default());
//! let session = Session::new(MemorySession::new());
//!
//! let req = Request::new(Method::POST, Uri::from_static("/save")).with_session(session.clone());
//! let res = app.call(req).await;
//!
//! assert_eq!(res.status_code(), StatusCode::SEE_OTHER);
//! assert_eq!(session.get("flash"), Some(serde_json::json!({"info": ["saved draft"]})));
//! # }
//! ```

mod error;
mod flash;
mod handler;
mod request;
mod response;
mod session;

pub mod middleware;

pub use error::FlashError;
pub use flash::{FLASH_SESSION_KEY, Flash, FlashOp, FlashOutcome, FlashStore, format_message};
pub use handler::{BoxFuture, Handler};
pub use middleware::Pipeline;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use session::{MemorySession, Session, SessionStore};
