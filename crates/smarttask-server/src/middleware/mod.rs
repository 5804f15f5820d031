pub mod identity;
pub(crate) mod request_span;
