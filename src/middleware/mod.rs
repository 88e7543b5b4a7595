/*
 * Responsibility
 * - axum adapters for the token stages (extract_token, verify_token)
 * - HTTP-level layers used by the demo host
 */
mod body;
pub mod extract_token;
pub mod http;
pub mod verify_token;
