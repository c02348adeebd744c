//! End-to-end protocol tests for fontshortcuts-lsp
//!
//! These tests spawn the language server as a subprocess and communicate
//! with it via JSON-RPC over stdio, testing the full protocol.
//!
//! Run with: `cargo test --test e2e`
//!
//! Set FONTSHORTCUTS_LSP_BINARY to override the binary path:
//! `FONTSHORTCUTS_LSP_BINARY=./target/release/fontshortcuts-lsp cargo test --test e2e`
