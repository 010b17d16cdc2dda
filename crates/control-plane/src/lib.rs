// Gatherly Control Plane Library
// Decision: Shared library for binaries (API server, OpenAPI export) and router tests

// API routes and types (shared for OpenAPI generation)
pub mod api;

// Application wiring
pub mod app;
pub use app::Gatherly;

// Authentication module
pub mod auth;

// Server configuration
pub mod config;
pub use config::ServerConfig;

// Services layer
pub mod services;

// Storage layer
pub mod storage;

// OpenAPI spec generation
pub mod openapi;
