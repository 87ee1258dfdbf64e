//! Wei <-> decimal-ETH string conversion
//!
//! Display strings are trimmed ("1.5", not "1.500000000000000000") so they
//! round-trip through `parse_ether` back to the same base-unit value.

use alloy::primitives::utils::parse_ether;
use alloy_primitives::U256;

const ETH_DECIMALS: usize = 18;

/// Parse a decimal ETH string ("1.5") into wei.
pub fn eth_to_wei(value: &str) -> anyhow::Result<U256> {
    parse_ether(value.trim()).map_err(|err| anyhow::anyhow!("invalid ETH amount '{value}': {err}"))
}

/// Format wei as a decimal ETH string with trailing zeros trimmed.
pub fn wei_to_eth_string(wei: U256) -> String {
    let divisor = U256::from(10u64).pow(U256::from(ETH_DECIMALS as u64));
    let whole = wei / divisor;
    let frac = wei % divisor;

    if frac.is_zero() {
        return whole.to_string();
    }

    let frac_str = format!("{:0>width$}", frac, width = ETH_DECIMALS);
    let trimmed = frac_str.trim_end_matches('0');
    if trimmed.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, trimmed)
    }
}

/// Approximate wei as f64 ETH, for progress bars and sorting only.
pub fn wei_to_eth_f64(wei: U256) -> f64 {
    let divisor = U256::from(10u64).pow(U256::from(ETH_DECIMALS as u64));
    let whole = wei / divisor;
    let frac = wei % divisor;

    let whole_f64: f64 = whole.to_string().parse().unwrap_or(0.0);
    let frac_f64: f64 = frac.to_string().parse().unwrap_or(0.0);

    whole_f64 + frac_f64 / 1e18
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_trims_trailing_zeros() {
        let wei = eth_to_wei("1.5").unwrap();
        assert_eq!(wei_to_eth_string(wei), "1.5");

        let wei = eth_to_wei("2").unwrap();
        assert_eq!(wei_to_eth_string(wei), "2");

        let wei = eth_to_wei("0.05").unwrap();
        assert_eq!(wei_to_eth_string(wei), "0.05");
    }

    #[test]
    fn test_round_trip_identity() {
        for value in ["0", "1", "1.0", "32.5", "0.000000000000000001", "78.2"] {
            let wei = eth_to_wei(value).unwrap();
            let display = wei_to_eth_string(wei);
            let back = eth_to_wei(&display).unwrap();
            assert_eq!(wei, back, "round trip failed for {value}");
        }
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(eth_to_wei("not-a-number").is_err());
        assert!(eth_to_wei("").is_err());
    }
}
