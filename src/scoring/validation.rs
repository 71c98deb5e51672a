use super::config::ScoringWeights;

/// Validate scoring weights at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_weights(weights: &ScoringWeights) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (key, weight) in weights.entries() {
        if !weight.is_finite() || weight < 0.0 {
            errors.push(format!(
                "scoring.{}: must be finite and non-negative (got {})",
                key, weight
            ));
        }
    }

    // Only meaningful once every weight is individually valid
    if errors.is_empty() && weights.total() <= 0.0 {
        errors.push("scoring: weights must not all be zero".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
