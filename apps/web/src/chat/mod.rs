// Chat assistant: message log, two-phase send, reply normalization and fallback.
// Every outbound chat call goes through `transport`; views never build requests themselves.

pub mod conversation;
pub mod fallback;
pub mod normalizer;
pub mod replies;
pub mod session;
pub mod transport;
pub mod ws;
