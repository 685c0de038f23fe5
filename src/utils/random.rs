use rand::{distributions::Alphanumeric, Rng};

/// Length of the anti-CSRF state value sent with each login.
pub const STATE_LENGTH: usize = 16;

/// Returns `length` characters drawn uniformly from `[A-Za-z0-9]`.
pub fn generate_random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_requested_length_and_alphabet() {
        let value = generate_random_string(STATE_LENGTH);
        assert_eq!(value.len(), STATE_LENGTH);
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn zero_length_is_empty() {
        assert!(generate_random_string(0).is_empty());
    }

    #[test]
    fn consecutive_values_differ() {
        assert_ne!(
            generate_random_string(STATE_LENGTH),
            generate_random_string(STATE_LENGTH)
        );
    }
}
