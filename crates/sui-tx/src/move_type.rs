//! Move type-string helpers
//!
//! Object types come back from the fullnode as strings such as
//! `0xabc::bucket::Bucket<0x2::sui::SUI>`; these helpers pull the generic
//! parameters out without a full parse.

/// Top-level generic parameters of a type string.
///
/// `"0x1::tank::Tank<A, B<C>>"` gives `["A", "B<C>"]`; a non-generic type gives `[]`.
pub fn type_params(type_str: &str) -> Vec<String> {
    let open = match type_str.find('<') {
        Some(i) => i,
        None => return Vec::new(),
    };
    let inner = match type_str.rfind('>') {
        Some(close) if close > open => &type_str[open + 1..close],
        _ => return Vec::new(),
    };

    let mut params = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                params.push(inner[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = inner[start..].trim();
    if !last.is_empty() {
        params.push(last.to_string());
    }
    params
}

/// Coin type carried by a bucket/tank object type: the last parameter of
/// the innermost generic list.
///
/// `"..::Tank<0x..::buck::BUCK, 0x2::sui::SUI>"` gives `"0x2::sui::SUI"`.
pub fn coin_type_from_object_type(type_str: &str) -> Option<String> {
    let tail = type_str.rsplit('<').next()?;
    if tail.len() == type_str.len() {
        return None;
    }
    let coin = tail.trim_end_matches('>').rsplit(',').next()?.trim();
    (!coin.is_empty()).then(|| coin.to_string())
}

/// Compare two coin types, tolerating short and long address forms.
pub fn same_type(a: &str, b: &str) -> bool {
    normalize_type(a) == normalize_type(b)
}

/// Expand every address in a type string to its 64-hex-char form.
pub fn normalize_type(type_str: &str) -> String {
    let mut out = String::with_capacity(type_str.len());
    let mut token = String::new();

    let flush = |token: &mut String, out: &mut String| {
        if let Some((addr, rest)) = token.split_once("::") {
            out.push_str(&bucket_core::normalize_sui_address(addr));
            out.push_str("::");
            out.push_str(rest);
        } else {
            out.push_str(token);
        }
        token.clear();
    };

    for c in type_str.chars() {
        match c {
            '<' | '>' | ',' => {
                flush(&mut token, &mut out);
                out.push(c);
            }
            ' ' => {}
            _ => token.push(c),
        }
    }
    flush(&mut token, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUCK: &str = "0xce7ff77a83ea0cb6fd39bd8748e2ec89a3f41e8efdc3f4eb123e0ca37b184db2::buck::BUCK";

    #[test]
    fn test_type_params() {
        assert_eq!(
            type_params("0x1::tank::Tank<0x2::a::A, 0x3::b::B<0x4::c::C>>"),
            vec!["0x2::a::A", "0x3::b::B<0x4::c::C>"]
        );
        assert!(type_params("0x2::sui::SUI").is_empty());
        assert!(type_params("0x1::x::X<>").is_empty());
    }

    #[test]
    fn test_coin_type_from_bucket() {
        assert_eq!(
            coin_type_from_object_type("0x1::bucket::Bucket<0x2::sui::SUI>").as_deref(),
            Some("0x2::sui::SUI")
        );
    }

    #[test]
    fn test_coin_type_from_tank() {
        let tank = format!("0x1::tank::Tank<{}, 0x2::sui::SUI>", BUCK);
        assert_eq!(
            coin_type_from_object_type(&tank).as_deref(),
            Some("0x2::sui::SUI")
        );
    }

    #[test]
    fn test_coin_type_from_wrapped_field() {
        let field = "0x2::dynamic_field::Field<0x1::buck::BucketType<0x2::sui::SUI>, 0x1::bucket::Bucket<0x2::sui::SUI>>";
        assert_eq!(
            coin_type_from_object_type(field).as_deref(),
            Some("0x2::sui::SUI")
        );
        assert_eq!(coin_type_from_object_type("0x2::sui::SUI"), None);
    }

    #[test]
    fn test_same_type() {
        assert!(same_type(
            "0x2::sui::SUI",
            "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI"
        ));
        assert!(same_type(
            "0x1::tank::Tank<0x2::a::A,0x2::b::B>",
            "0x01::tank::Tank<0x2::a::A, 0x2::b::B>"
        ));
        assert!(!same_type("0x2::sui::SUI", "0x2::sui::SUIX"));
    }
}
