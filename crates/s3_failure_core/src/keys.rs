use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const FAILURE_PREFIX: &str = "FAILURE/";

/// Unreserved URI characters plus `/`, which separates key segments.
const COPY_SOURCE_KEY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'/');

pub fn failure_object_key(key: &str) -> String {
    format!("{FAILURE_PREFIX}{key}")
}

/// Value of the `x-amz-copy-source` header for an object in `bucket`.
pub fn copy_source(bucket: &str, key: &str) -> String {
    format!("{bucket}/{}", utf8_percent_encode(key, COPY_SOURCE_KEY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_key_prefixes_original_key_verbatim() {
        assert_eq!(
            failure_object_key("INCOMING/ALL_EMAILS/batch-01.csv"),
            "FAILURE/INCOMING/ALL_EMAILS/batch-01.csv"
        );
        assert_eq!(failure_object_key("/leading"), "FAILURE//leading");
        assert_eq!(
            failure_object_key("FAILURE/already"),
            "FAILURE/FAILURE/already"
        );
    }

    #[test]
    fn copy_source_keeps_separators_and_escapes_the_rest() {
        assert_eq!(
            copy_source("uploads", "INCOMING/monthly report+v2.csv"),
            "uploads/INCOMING/monthly%20report%2Bv2.csv"
        );
        assert_eq!(copy_source("uploads", "a/b_c-d.e~f"), "uploads/a/b_c-d.e~f");
    }
}
