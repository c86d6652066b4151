// Text primary keys: "<prefix>-<base36 millis>-<random suffix>"

use chrono::Utc;
use rand::Rng;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 6;

pub const SENSOR_PREFIX: &str = "sensor";
pub const BINDING_PREFIX: &str = "bind";
pub const RULE_PREFIX: &str = "rule";
pub const ALERT_PREFIX: &str = "alert";
pub const VISION_EVENT_PREFIX: &str = "vision";

/// Generate a new id with the given prefix.
pub fn next_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}-{}-{}", prefix, to_base36(millis), suffix)
}

/// Use the client-supplied id when present and non-blank, otherwise generate one.
pub fn or_generate(id: Option<String>, prefix: &str) -> String {
    match id {
        Some(id) if !id.trim().is_empty() => id,
        _ => next_id(prefix),
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(ALPHABET[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}
