use polyform::jwt;
use polyform::{Object, Value};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn claims() -> Value {
    let mut payload = Object::new();
    payload.insert("sub", "user-1");
    payload.insert("name", "Ada Lovelace");
    payload.insert("iat", 1_516_239_022i32);
    Value::Object(payload)
}

#[test]
fn sign_decode_verify_roundtrip() -> TestResult {
    let token = jwt::sign_hs256(&claims(), b"top secret")?;
    assert_eq!(token.split('.').count(), 3);
    // JWS forbids padding in the serialized form.
    assert!(!token.contains('='));

    let decoded = jwt::decode(&token)?;
    assert_eq!(decoded.algorithm(), Some("HS256"));
    assert_eq!(decoded.payload, claims());

    assert!(jwt::verify(&token, b"top secret")?);
    assert!(!jwt::verify(&token, b"not the secret")?);
    Ok(())
}

#[test]
fn decoded_claims_flow_into_conversion() -> TestResult {
    let token = jwt::sign_hs256(&claims(), b"k")?;
    let decoded = jwt::decode(&token)?;

    // The payload is an ordinary canonical value; any codec can render it.
    let yaml = polyform::convert::serialize(&decoded.payload, polyform::Format::Yaml)?;
    assert!(yaml.contains("name: Ada Lovelace"));
    Ok(())
}

#[test]
fn surrounding_whitespace_is_tolerated() -> TestResult {
    let token = jwt::sign_hs256(&claims(), b"k")?;
    let padded = format!("  {token}\n");
    assert!(jwt::verify(&padded, b"k")?);
    Ok(())
}

#[test]
fn garbage_tokens_are_malformed_not_panics() {
    for garbage in ["", "x", "x.y", "....", "a b c.d.e"] {
        assert!(jwt::decode(garbage).is_err(), "token: {garbage}");
    }
}
