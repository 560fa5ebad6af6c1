pub mod extractor;
pub mod jwt;

#[cfg(feature = "test-utils")]
pub mod test_utils;
