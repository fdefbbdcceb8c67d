// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Key material and token helpers shared by the auth and API tests.

use std::sync::OnceLock;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;
use serde_json::{json, Value};

pub const TEST_DOMAIN: &str = "coffee.auth0.test";
pub const TEST_AUDIENCE: &str = "coffee-shop";
pub const TEST_KID: &str = "test-key";

pub struct KeyMaterial {
    pub encoding: EncodingKey,
    pub modulus: String,
    pub exponent: String,
}

/// RSA key pair generated once per test binary.
pub fn key_material() -> &'static KeyMaterial {
    static MATERIAL: OnceLock<KeyMaterial> = OnceLock::new();
    MATERIAL.get_or_init(|| {
        let mut rng = OsRng;
        let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("key generation");
        let public_key = private_key.to_public_key();

        let private_pem = private_key
            .to_pkcs1_pem(LineEnding::LF)
            .expect("private pem");
        let encoding = EncodingKey::from_rsa_pem(private_pem.as_bytes()).expect("encoding key");

        KeyMaterial {
            encoding,
            modulus: URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
            exponent: URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
        }
    })
}

/// JWKS body publishing the test key under `kid`.
pub fn jwks_document(kid: &str) -> Value {
    let material = key_material();
    json!({
        "keys": [{
            "alg": "RS256",
            "kty": "RSA",
            "use": "sig",
            "kid": kid,
            "n": material.modulus,
            "e": material.exponent
        }]
    })
}

pub fn now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs() as i64
}

/// Claims a correctly configured verifier accepts.
pub fn valid_claims(permissions: &[&str]) -> Value {
    json!({
        "iss": format!("https://{TEST_DOMAIN}/"),
        "sub": "auth0|barista",
        "aud": TEST_AUDIENCE,
        "iat": now(),
        "exp": now() + 600,
        "permissions": permissions
    })
}

/// Sign `claims` with RS256, optionally setting `kid`.
pub fn issue_token(encoding: &EncodingKey, kid: Option<&str>, claims: Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    encode(&header, &claims, encoding).expect("sign token")
}

/// Token with arbitrary header JSON and a junk signature.
pub fn unsigned_token(header: Value, claims: Value) -> String {
    format!(
        "{}.{}.fake_signature",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}
