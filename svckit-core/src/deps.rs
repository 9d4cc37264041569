//! Dependency-list codec — the NUL-delimited wire format of the SCM.
//!
//! A dependency list travels as `name\0name\0...\0\0`: single-NUL separators
//! with a double-NUL terminator. An empty list is the empty string, which the
//! gateway passes to the native API as an absent value.

/// Encode an ordered dependency list to the wire string.
///
/// Names must not contain NUL; the engine validates that before calling in.
pub fn encode(names: &[String]) -> String {
    if names.is_empty() {
        return String::new();
    }
    let mut wire = names.join("\0");
    wire.push_str("\0\0");
    wire
}

/// Decode a wire string back into a dependency list.
///
/// Splits on NUL and drops empty segments, which absorbs the trailing
/// double terminator. `decode(&encode(xs)) == xs` for any list of non-empty,
/// NUL-free names.
pub fn decode(wire: &str) -> Vec<String> {
    wire.split('\0')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_with_double_nul_terminator() {
        let wire = encode(&["Dep1".to_string(), "Dep2".to_string()]);
        assert_eq!(wire, "Dep1\0Dep2\0\0");
    }

    #[test]
    fn empty_list_encodes_to_empty_string() {
        assert_eq!(encode(&[]), "");
        assert!(decode("").is_empty());
    }

    #[test]
    fn decode_absorbs_terminator() {
        assert_eq!(decode("Dep1\0Dep2\0\0"), vec!["Dep1", "Dep2"]);
    }

    #[test]
    fn roundtrip() {
        let names: Vec<String> = ["EventLog", "Tcpip", "RpcSs"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(decode(&encode(&names)), names);

        let single = vec!["OnlyOne".to_string()];
        assert_eq!(decode(&encode(&single)), single);
    }
}
