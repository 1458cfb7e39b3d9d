// bcrypt is deliberately slow, so both operations run on the blocking pool.

use super::ModelError;

/// Lowest cost accepted by bcrypt
pub const MIN_COST: u32 = 4;

pub async fn hash(password: &str, cost: u32) -> Result<String, ModelError> {
    let password = password.to_owned();
    let cost = cost.max(MIN_COST);
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hashed)
}

/// Ok(false) on mismatch. A malformed stored hash is an error, never a match.
pub async fn verify(password: &str, hashed: &str) -> Result<bool, ModelError> {
    let password = password.to_owned();
    let hashed = hashed.to_owned();
    let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed)).await??;
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() -> anyhow::Result<()> {
        let hashed = hash("pa$$word", MIN_COST).await?;
        assert_ne!(hashed, "pa$$word");
        assert!(verify("pa$$word", &hashed).await?);
        assert!(!verify("wrong", &hashed).await?);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_hash_fails_closed() {
        let result = verify("pa$$word", "not-a-bcrypt-hash").await;
        assert!(matches!(result, Err(ModelError::Hash(_))));
    }

    #[tokio::test]
    async fn cost_is_clamped() -> anyhow::Result<()> {
        let hashed = hash("pa$$word", 1).await?;
        assert!(hashed.starts_with("$2b$04$"));
        Ok(())
    }
}
