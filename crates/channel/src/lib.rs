//! Command dispatch for the native host bridge.
//!
//! The UI layer sends named commands with a key/value argument bag over a
//! reliable request/response channel (transport supplied externally). This
//! crate routes each call to its handler — `log` or `saveImage` — and maps
//! handler outcomes back onto response frames. Unknown method names get a
//! distinguished not-implemented response, never an error.

pub mod methods;
pub mod state;

pub use {
    methods::{HandlerFn, MethodContext, MethodRegistry, MethodResult},
    state::ChannelState,
};
