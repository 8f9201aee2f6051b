use once_cell::sync::Lazy;
use regex::Regex;

static CONTRACT_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^0x[a-fA-F0-9]{40}$").expect("valid address regex"));

/// Whether the input is exactly a `0x`-prefixed 40 hex character address.
///
/// The input is not trimmed; anything else is treated as literal source.
pub fn is_contract_address(input: &str) -> bool {
    CONTRACT_ADDRESS.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        assert!(is_contract_address(&format!("0x{}", "a".repeat(40))));
        assert!(is_contract_address(
            "0xdAC17F958D2ee523a2206206994597C13D831ec7"
        ));
        assert!(is_contract_address(&format!("0x{}", "0".repeat(40))));
    }

    #[test]
    fn test_non_addresses() {
        assert!(!is_contract_address(&format!("0x{}", "a".repeat(39))));
        assert!(!is_contract_address(&format!("0x{}", "a".repeat(41))));
        assert!(!is_contract_address(&format!("0X{}", "a".repeat(40))));
        assert!(!is_contract_address(&format!("0x{}g", "a".repeat(39))));
        assert!(!is_contract_address(&format!(" 0x{}", "a".repeat(40))));
        assert!(!is_contract_address(&format!("0x{}\n", "a".repeat(40))));
        assert!(!is_contract_address("contract C { function f() public {} }"));
    }
}
