//! SketchCalc Client
//!
//! Sends canvas snapshots to the recognition service and turns its answers
//! into results on the canvas.
//!
//! ## Protocol
//!
//! `POST {api_url}/calculate` with a JPEG data URL of the canvas and the
//! variables bound so far; see [`protocol`].

pub mod client;
pub mod config;
pub mod encode;
pub mod protocol;
pub mod session;

pub use client::{ClientError, ClientResult, RecognitionClient, RecognitionEvent};
pub use config::ClientConfig;
pub use encode::{EncodeError, encode_canvas};
pub use protocol::{CalculateRequest, CalculateResponse, ResponseItem, Variables};
pub use session::Session;
