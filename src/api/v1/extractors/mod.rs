/*!
 * Handler-side access to what the token stages left on the request.
 */
mod fields;

pub use fields::Fields;
