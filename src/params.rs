use std::collections::HashMap;

/// One or more values stored under a single parameter key.
///
/// OAuth1 signing must keep every occurrence of a repeated key
/// (`a=1&a=2`, array-style `a[]=1&a[]=2`), so a second insertion
/// promotes the scalar to a list instead of overwriting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// Consumes the value, returning the first (or only) entry.
    pub fn into_first(self) -> String {
        match self {
            ParamValue::Single(value) => value,
            ParamValue::Many(values) => values.into_iter().next().unwrap_or_default(),
        }
    }
}

/// A multi-valued parameter mapping, decoded form.
///
/// Keys and values are stored fully percent-decoded; encoding happens
/// once, during base-string construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamSet {
    entries: HashMap<String, ParamValue>,
}

impl ParamSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a value under `key`, accumulating instead of replacing when
    /// the key is already present.
    pub fn append<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        let value = value.into();
        let merged = match self.entries.remove(&key) {
            None => ParamValue::Single(value),
            Some(ParamValue::Single(existing)) => ParamValue::Many(vec![existing, value]),
            Some(ParamValue::Many(mut values)) => {
                values.push(value);
                ParamValue::Many(values)
            }
        };
        self.entries.insert(key, merged);
    }

    /// Merges `other` into `self`; every value of `other` is appended, so
    /// colliding keys end up with entries from both sets.
    pub fn extend(&mut self, other: ParamSet) {
        for (key, value) in other.entries {
            match value {
                ParamValue::Single(single) => self.append(key, single),
                ParamValue::Many(values) => {
                    for single in values {
                        self.append(key.clone(), single);
                    }
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl IntoIterator for ParamSet {
    type Item = (String, ParamValue);
    type IntoIter = std::collections::hash_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Parses a raw (still encoded) query or urlencoded-body string into a
/// [`ParamSet`].
///
/// Splitting rules, matching what the Etsy servers sign against:
/// - segments are separated by `&`; each segment splits on the FIRST `=`
///   only, so values may contain literal `=` after decoding
/// - a segment without `=` becomes a key with an empty value
/// - a segment whose key decodes to the empty string is dropped entirely
///   (`a=b&=c` keeps only `a=b`)
/// - repeated keys accumulate in order of appearance
///
/// There is no failure mode; malformed input degrades to empty or partial
/// values.
pub fn parse_query(query: &str) -> ParamSet {
    let mut params = ParamSet::new();

    for segment in query.split('&') {
        let (raw_key, raw_value) = match segment.find('=') {
            Some(pos) => (&segment[..pos], &segment[pos + 1..]),
            None => (segment, ""),
        };

        let key = decode_component(raw_key);
        if key.is_empty() {
            continue;
        }

        params.append(key, decode_component(raw_value));
    }

    params
}

/// Percent-decodes one key or value, with `+` treated as an encoded space
/// as in form-urlencoded payloads.
fn decode_component(raw: &str) -> String {
    let unplussed = raw.replace('+', " ");
    percent_encoding::percent_decode_str(&unplussed)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::percent_encode;

    #[test]
    fn parse_simple_pairs() {
        let params = parse_query("a=b&c=d");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a"), Some(&ParamValue::Single("b".into())));
        assert_eq!(params.get("c"), Some(&ParamValue::Single("d".into())));
    }

    #[test]
    fn parse_repeated_key_preserves_order() {
        let params = parse_query("a=1&a=2");
        assert_eq!(
            params.get("a"),
            Some(&ParamValue::Many(vec!["1".into(), "2".into()]))
        );
    }

    #[test]
    fn parse_array_style_keys() {
        let params = parse_query("a%5B%5D=1&a%5B%5D=2");
        assert_eq!(
            params.get("a[]"),
            Some(&ParamValue::Many(vec!["1".into(), "2".into()]))
        );
    }

    #[test]
    fn parse_drops_empty_key_segments() {
        let params = parse_query("a=b&=c");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("a"), Some(&ParamValue::Single("b".into())));
    }

    #[test]
    fn parse_segment_without_equals() {
        let params = parse_query("foo");
        assert_eq!(params.get("foo"), Some(&ParamValue::Single(String::new())));
    }

    #[test]
    fn parse_empty_query() {
        assert!(parse_query("").is_empty());
    }

    #[test]
    fn parse_splits_on_first_equals_only() {
        let params = parse_query("a=b=c");
        assert_eq!(params.get("a"), Some(&ParamValue::Single("b=c".into())));
    }

    #[test]
    fn parse_decodes_key_and_value() {
        let params = parse_query("a%20b=c%26d%3De");
        assert_eq!(params.get("a b"), Some(&ParamValue::Single("c&d=e".into())));
    }

    #[test]
    fn parse_decodes_plus_as_space() {
        let params = parse_query("status=Hello+Ladies+%2B+Gentlemen");
        assert_eq!(
            params.get("status"),
            Some(&ParamValue::Single("Hello Ladies + Gentlemen".into()))
        );
    }

    #[test]
    fn reserialize_then_reparse_is_idempotent() {
        let inputs = [
            "a=b&c=d",
            "a=1&a=2&b=%26%3D",
            "foo&bar=baz",
            "key=with+space&other=%E7%B5%82",
        ];
        for input in inputs {
            let first = parse_query(input);
            let mut pairs = Vec::new();
            for (key, value) in first.iter() {
                match value {
                    ParamValue::Single(v) => {
                        pairs.push(format!("{}={}", percent_encode(key), percent_encode(v)))
                    }
                    ParamValue::Many(vs) => {
                        for v in vs {
                            pairs.push(format!("{}={}", percent_encode(key), percent_encode(v)))
                        }
                    }
                }
            }
            pairs.sort();
            let reparsed = parse_query(&pairs.join("&"));
            assert_eq!(first, reparsed, "not idempotent for {:?}", input);
        }
    }
}
