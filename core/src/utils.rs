// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Utility functions and types.

use std::fmt::Debug;

use http::Uri;

use crate::{Error, Result};

/// Redacts a string by replacing all but the first and last three characters with asterisks.
///
/// - If the input string has fewer than 12 characters, it should be entirely redacted.
/// - If the input string has 12 or more characters, only the first three and the last three.
///
/// This design is to allow users to distinguish between different redacted strings but avoid
/// leaking sensitive information.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        match value {
            None => Redact(""),
            Some(v) => Redact(v),
        }
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let length = self.0.len();
        if length == 0 {
            f.write_str("EMPTY")
        } else if length < 12 {
            f.write_str("***")
        } else {
            // Cuts inside a multi-byte character hide the whole value.
            match (self.0.get(..3), self.0.get(length - 3..)) {
                (Some(head), Some(tail)) => {
                    f.write_str(head)?;
                    f.write_str("***")?;
                    f.write_str(tail)
                }
                _ => f.write_str("***"),
            }
        }
    }
}

/// Value of the `Host` header for the given uri: the host, followed by
/// `:port` when the uri carries an explicit port.
///
/// Both the signer and the transport use this, so the header that gets
/// signed is byte-identical to the header that gets sent.
pub fn host_header(uri: &Uri) -> Result<String> {
    if uri.scheme().is_none() {
        return Err(Error::malformed_url("url has no scheme").with_context(format!("url: {uri}")));
    }
    let authority = uri
        .authority()
        .filter(|a| !a.host().is_empty())
        .ok_or_else(|| Error::malformed_url("url has no host").with_context(format!("url: {uri}")))?;

    Ok(match authority.port() {
        Some(port) => format!("{}:{}", authority.host(), port.as_str()),
        None => authority.host().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use test_case::test_case;

    #[test]
    fn test_redact() {
        let cases = vec![
            ("Short", "***"),
            ("Hello World!", "Hel***ld!"),
            ("This is a longer string", "Thi***ing"),
            ("", "EMPTY"),
            ("HelloWorld", "***"),
        ];

        for (input, expected) in cases {
            assert_eq!(
                format!("{:?}", Redact(input)),
                expected,
                "Failed on input: {}",
                input
            );
        }
    }

    #[test]
    fn test_redact_multibyte() {
        assert_eq!(format!("{:?}", Redact("ééabcdefghijk")), "***");
        assert_eq!(format!("{:?}", Redact("abcdefghijkéé")), "***");
        assert_eq!(format!("{:?}", Redact("abcdefghijklé")), "abc***lé");
    }

    #[test_case("https://iam.amazonaws.com/", "iam.amazonaws.com"; "no port")]
    #[test_case("http://127.0.0.1:9000/hello", "127.0.0.1:9000"; "explicit port")]
    #[test_case("https://user@s3.amazonaws.com/bucket", "s3.amazonaws.com"; "userinfo dropped")]
    fn test_host_header(input: &str, expected: &str) {
        let uri: Uri = input.parse().expect("uri must be valid");
        assert_eq!(host_header(&uri).expect("host must exist"), expected);
    }

    #[test]
    fn test_host_header_requires_scheme_and_host() {
        let uri: Uri = "/relative/path".parse().expect("uri must be valid");
        let err = host_header(&uri).expect_err("relative uri has no host");
        assert_eq!(err.kind(), ErrorKind::MalformedUrl);
    }
}
