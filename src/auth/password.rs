use crate::auth::ApiError;

const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    Ok(bcrypt::hash(password, BCRYPT_COST)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    Ok(bcrypt::verify(password, hash)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(verify_password("hunter2", "not-a-bcrypt-hash").is_err());
    }
}
