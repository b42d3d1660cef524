pub(crate) mod bytes;

pub mod encoding;
