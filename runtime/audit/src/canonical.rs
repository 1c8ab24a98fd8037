use serde_json::Value;
use sha2::{Digest, Sha256};

/// Serialize a JSON value canonically: object keys in ascending order,
/// no insignificant whitespace.
///
/// Two snapshots that differ only in key ordering produce the same
/// canonical form, so their hashes match. Kept separate from the digest
/// step so canonicalization is testable on its own.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // serde_json handles string escaping.
                out.push_str(&Value::String((*key).clone()).to_string());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        // Scalars already have a stable textual form.
        other => out.push_str(&other.to_string()),
    }
}

/// Hex-encoded SHA-256 of arbitrary bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Hex-encoded SHA-256 of a snapshot's canonical serialization.
pub fn content_hash(value: &Value) -> String {
    sha256_hex(canonical_json(value).as_bytes())
}

/// Recompute a snapshot's canonical hash and compare to the recorded one.
///
/// The tamper-detection primitive: any change to any field of the snapshot
/// flips the result to false.
pub fn verify_hash(value: &Value, expected: &str) -> bool {
    content_hash(value) == expected
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_sorts_keys() {
        let value = json!({"b": 1, "a": 2, "c": {"z": true, "y": false}});
        assert_eq!(
            canonical_json(&value),
            r#"{"a":2,"b":1,"c":{"y":false,"z":true}}"#
        );
    }

    #[test]
    fn test_canonical_preserves_array_order() {
        let value = json!([3, 1, 2]);
        assert_eq!(canonical_json(&value), "[3,1,2]");
    }

    #[test]
    fn test_canonical_scalars() {
        assert_eq!(canonical_json(&json!(null)), "null");
        assert_eq!(canonical_json(&json!(true)), "true");
        assert_eq!(canonical_json(&json!(42)), "42");
        assert_eq!(canonical_json(&json!("text")), "\"text\"");
    }

    #[test]
    fn test_canonical_escapes_strings() {
        let value = json!({"msg": "line\nbreak \"quoted\""});
        let canonical = canonical_json(&value);
        assert!(canonical.contains(r#"\n"#));
        assert!(canonical.contains(r#"\""#));
    }

    #[test]
    fn test_key_order_independent_hash() {
        let a = json!({"total": 100000, "recipients": 3});
        let b = json!({"recipients": 3, "total": 100000});
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_hash_roundtrip() {
        let snapshot = json!({
            "challenge_id": 7,
            "total_amount": 100000,
            "recipient_count": 3,
        });
        let hash = content_hash(&snapshot);
        assert!(verify_hash(&snapshot, &hash));
    }

    #[test]
    fn test_tampered_snapshot_fails_verification() {
        let snapshot = json!({"challenge_id": 7, "total_amount": 100000});
        let hash = content_hash(&snapshot);

        let tampered = json!({"challenge_id": 7, "total_amount": 100001});
        assert!(!verify_hash(&tampered, &hash));

        let field_removed = json!({"challenge_id": 7});
        assert!(!verify_hash(&field_removed, &hash));
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = content_hash(&json!({}));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        // sha256 of "{}"
        assert_eq!(
            hash,
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }
}
