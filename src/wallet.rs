//! Currency-specific wallet address format checks. These are shape checks
//! only; no checksum or on-chain validation.

pub const SUPPORTED_CURRENCIES: &[&str] = &["btc", "eth", "ltc", "xrp", "usdt"];

pub fn validate_address(address: &str, currency: &str) -> bool {
    let address = address.trim();
    match currency.to_lowercase().as_str() {
        "btc" => is_btc(address),
        "ltc" => is_ltc(address),
        // USDT here means the ERC-20 issue, same address space as ETH
        "eth" | "usdt" => is_eth(address),
        "xrp" => is_xrp(address),
        _ => false,
    }
}

fn is_base58(s: &str) -> bool {
    // Bitcoin's base58 alphabet excludes 0, O, I and l
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l'))
}

fn is_btc(address: &str) -> bool {
    if let Some(rest) = address.strip_prefix("bc1") {
        return (11..=87).contains(&rest.len())
            && rest
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    }
    (26..=35).contains(&address.len())
        && (address.starts_with('1') || address.starts_with('3'))
        && is_base58(address)
}

fn is_ltc(address: &str) -> bool {
    if let Some(rest) = address.strip_prefix("ltc1") {
        return (11..=87).contains(&rest.len());
    }
    (26..=35).contains(&address.len())
        && (address.starts_with('L') || address.starts_with('M') || address.starts_with('3'))
        && is_base58(address)
}

fn is_eth(address: &str) -> bool {
    address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit())
}

fn is_xrp(address: &str) -> bool {
    (25..=35).contains(&address.len()) && address.starts_with('r') && is_base58(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_good_addresses() {
        assert!(validate_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", "btc"));
        assert!(validate_address("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy", "btc"));
        assert!(validate_address("bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq", "BTC"));
        assert!(validate_address("0x52908400098527886E0F7030069857D2E4169EE7", "eth"));
        assert!(validate_address("0x52908400098527886E0F7030069857D2E4169EE7", "usdt"));
        assert!(validate_address("LcHKxGvjJdKkGeRxUpDpDgHkEnDpDzGnhT", "ltc"));
        assert!(validate_address("rN7n7otQDd6FczFgLdSqtcsAUxDkw6fzRH", "xrp"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        // 0/O/I/l are outside the base58 alphabet
        assert!(!validate_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfN0", "btc"));
        assert!(!validate_address("1short", "btc"));
        assert!(!validate_address("0x5290840009852788", "eth"));
        assert!(!validate_address("0xZZ908400098527886E0F7030069857D2E4169EE7", "eth"));
        assert!(!validate_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", "eth"));
    }

    #[test]
    fn unknown_currency_is_invalid() {
        assert!(!validate_address("anything-goes-here", "doge"));
        assert!(!validate_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", "doge"));
    }
}
