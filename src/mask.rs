use serde::Serialize;

#[derive(Debug)]
pub struct Masked;

pub trait MaskPolicy {
    fn mask(secret: &str) -> String;
}

impl MaskPolicy for Masked {
    /// Keeps the last 4 characters of long values, hides short ones entirely.
    fn mask(secret: &str) -> String {
        let len = secret.chars().count();
        if len > 8 {
            let tail: String = secret.chars().skip(len - 4).collect();
            "*".repeat(len - 4) + &tail
        } else {
            "***".to_string()
        }
    }
}

/// Return true if a key name likely holds a credential.
fn is_secret_key(key: &str) -> bool {
    let k = key.to_lowercase();
    k.contains("token")
        || k.contains("secret")
        || k.contains("password")
        || k.contains("authorization")
        || k == "nonce"
}

pub fn secure_serializable(v: impl Serialize) -> serde_json::Value {
    match serde_json::to_value(v) {
        Ok(value) => secure_value(&value),
        Err(_) => serde_json::Value::Null,
    }
}

pub fn secure_value(v: &serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match v {
        Value::Object(map) => {
            let mut new = serde_json::Map::with_capacity(map.len());
            for (k, val) in map {
                let new_val = match val {
                    Value::String(s) if is_secret_key(k) => Value::String(Masked::mask(s)),
                    Value::Number(_) | Value::Bool(_) => val.clone(),
                    _ if is_secret_key(k) => Value::String("***".to_string()),
                    _ => secure_value(val),
                };
                new.insert(k.clone(), new_val);
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(secure_value).collect()),
        other => other.clone(),
    }
}
