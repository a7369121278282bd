use crate::entity::user;
use crate::model::auth::Claims;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::env;

pub struct JwtUtils;

pub enum TokenVerifyResult {
    Valid(Claims),
    Expired,
    Invalid,
}

impl JwtUtils {
    fn get_secret() -> String {
        env::var("JWT_SECRET").expect("JWT_SECRET must be set")
    }

    pub fn generate_token(user: &user::Model) -> Result<String, JwtError> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::hours(12))
            .expect("token expiry overflowed")
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            team: user.team_id,
            exp: expiration,
            iat: Utc::now().timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(Self::get_secret().as_bytes()),
        )
    }

    pub fn verify_token(token: &str) -> TokenVerifyResult {
        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(Self::get_secret().as_bytes()),
            &Validation::default(),
        ) {
            Ok(data) => TokenVerifyResult::Valid(data.claims),
            Err(err) => match *err.kind() {
                ErrorKind::ExpiredSignature => TokenVerifyResult::Expired,
                _ => TokenVerifyResult::Invalid,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::user::Role;

    fn sample_user() -> user::Model {
        user::Model {
            id: 7,
            username: "tech1".into(),
            email: "tech1@example.com".into(),
            password: "hash".into(),
            role: Role::Technician,
            phone: None,
            team_id: Some(3),
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn token_round_trips_identity_and_team() {
        unsafe { std::env::set_var("JWT_SECRET", "test-secret") };

        let token = JwtUtils::generate_token(&sample_user()).unwrap();
        match JwtUtils::verify_token(&token) {
            TokenVerifyResult::Valid(claims) => {
                assert_eq!(claims.sub, "7");
                assert_eq!(claims.role, Role::Technician);
                assert_eq!(claims.team, Some(3));
            }
            _ => panic!("expected valid token"),
        }
    }

    #[test]
    fn garbage_token_is_invalid() {
        unsafe { std::env::set_var("JWT_SECRET", "test-secret") };

        assert!(matches!(
            JwtUtils::verify_token("not-a-token"),
            TokenVerifyResult::Invalid
        ));
    }
}
