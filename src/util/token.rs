//! Verification of the bearer tokens issued by the user service

use crate::{core::Error, Config};
use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The claims the relay relies on; everything else in the token is ignored
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
}

/// Used to verify token
pub struct JwtToken {
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtToken {
    pub fn new(config: &Config) -> Self {
        let mut validation = Validation::default();
        if let Some(iss) = &config.jwt_issuer {
            validation.set_issuer(&[iss]);
        }
        match &config.jwt_audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.into_kind() {
                ErrorKind::ExpiredSignature => Error::ExpiredToken,
                _ => Error::Unauthorized,
            }
        })?;

        Ok(data.claims)
    }
}

impl Default for JwtToken {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

// ============================== // tests // ============================== //
