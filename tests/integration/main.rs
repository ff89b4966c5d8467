//! Integration tests for the relay's HTTP surface and observer socket.

mod api_test;
mod helpers;
mod ws_test;
