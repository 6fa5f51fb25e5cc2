use rand::Rng;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Generate a random email confirmation token (65 alphanumeric chars)
pub fn generate_email_token() -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(65)
        .map(char::from)
        .collect()
}

/// Generate a random referral code (8 alphanumeric chars)
pub fn generate_referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..8)
        .map(|_| {
            let idx = rng.gen_range(0..36);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect()
}

/// Current UTC time as a stored timestamp string.
pub fn now_string() -> String {
    chrono::Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Expiry timestamp `minutes` from now, as a stored timestamp string.
pub fn expiry_string(minutes: i64) -> String {
    (chrono::Utc::now() + chrono::Duration::minutes(minutes))
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

/// True while `expire` has not passed. Compares the formatted strings, which
/// for this fixed-width format orders the same as the underlying datetimes.
pub fn not_expired(expire: &str) -> bool {
    expire >= now_string().as_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_token_shape() {
        let token = generate_email_token();
        assert_eq!(token.len(), 65);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn referral_code_shape() {
        let code = generate_referral_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn email_tokens_are_unique() {
        assert_ne!(generate_email_token(), generate_email_token());
    }

    #[test]
    fn future_expiry_is_not_expired() {
        assert!(not_expired(&expiry_string(60)));
    }

    #[test]
    fn past_expiry_is_expired() {
        assert!(!not_expired(&expiry_string(-1)));
    }

    #[test]
    fn string_order_matches_chronology() {
        // the stored format is fixed-width, so lexicographic comparison
        // agrees with datetime comparison
        assert!("2026-01-02 00:00:00" > "2026-01-01 23:59:59");
        assert!("2025-12-31 23:59:59" < "2026-01-01 00:00:00");
    }
}
