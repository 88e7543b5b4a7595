/*
 * Responsibility
 * - What the token stages see of a request (query / body / headers)
 * - Where they leave their results (RequestFields, in request extensions)
 */
mod context;
mod fields;

pub use context::{FieldMap, RequestContext, parse_body, parse_query};
pub use fields::RequestFields;
