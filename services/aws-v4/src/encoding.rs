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

//! URI encoding rules used by SigV4 canonicalization.

use percent_encoding::{percent_decode_str, percent_encode, utf8_percent_encode};

use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET};

/// Encode a string with the [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html) rule.
///
/// Unreserved characters pass through, every other byte becomes `%XX` with
/// uppercase hex digits. `/` is only encoded when `encode_slash` is set.
///
/// ```
/// use cirrus_aws_v4::aws_uri_encode;
///
/// assert_eq!(aws_uri_encode("/foo bar/baz", false), "/foo%20bar/baz");
/// assert_eq!(aws_uri_encode("/foo bar/baz", true), "%2Ffoo%20bar%2Fbaz");
/// ```
pub fn aws_uri_encode(s: &str, encode_slash: bool) -> String {
    if encode_slash {
        utf8_percent_encode(s, &AWS_QUERY_ENCODE_SET).to_string()
    } else {
        utf8_percent_encode(s, &AWS_URI_ENCODE_SET).to_string()
    }
}

/// Decode `%XX` escapes then encode again with the given rule.
///
/// Works on bytes so escapes that are not valid UTF-8 survive unchanged.
/// A `+` is a literal plus sign, not a space.
pub(crate) fn reencode(s: &str, encode_slash: bool) -> String {
    let decoded: Vec<u8> = percent_decode_str(s).collect();
    if encode_slash {
        percent_encode(&decoded, &AWS_QUERY_ENCODE_SET).to_string()
    } else {
        percent_encode(&decoded, &AWS_URI_ENCODE_SET).to_string()
    }
}

/// Canonical form of a request path.
pub fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    reencode(path, false)
}

/// Canonical form of a raw query string.
///
/// Every name and value is decoded and re-encoded, pairs are sorted by
/// name then value, and a bare `name` is rendered as `name=`.
pub fn canonical_query_string(query: &str) -> String {
    let mut pairs: Vec<(String, String)> = query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let (k, v) = s.split_once('=').unwrap_or((s, ""));
            (reencode(k, true), reencode(v, true))
        })
        .collect();
    pairs.sort();

    let mut s = String::with_capacity(query.len() + pairs.len());
    for (idx, (k, v)) in pairs.iter().enumerate() {
        if idx != 0 {
            s.push('&');
        }
        s.push_str(k);
        s.push('=');
        s.push_str(v);
    }
    s
}
