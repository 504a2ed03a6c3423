use codec_utils::{bin_to_hex, HexTrimMode};
use sha3::{Digest, Keccak256};

/// Derives the 4-byte function selector from a canonical prototype string
/// such as `"transfer(address,uint256)"` (`uint` is spelled `uint256`).
pub fn function_selector(prototype: &str) -> [u8; 4] {
    let digest = Keccak256::digest(prototype.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&digest[..4]);
    selector
}

/// Builds the `data` field of an `eth_call`: `0x`, the function selector,
/// then the ABI-encoded parameter bytes, all untrimmed.
///
/// Parameter encoding itself is the caller's concern; this only frames the
/// byte stream the node expects.
pub fn call_data(prototype: &str, params: &[u8]) -> String {
    let selector = function_selector(prototype);
    let mut data = bin_to_hex(&selector, HexTrimMode::No, true, false);
    data.push_str(&bin_to_hex(params, HexTrimMode::No, false, false));
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_selector_is_the_known_value() {
        assert_eq!(
            function_selector("transfer(address,uint256)"),
            [0xa9, 0x05, 0x9c, 0xbb]
        );
    }

    #[test]
    fn balance_of_selector_is_the_known_value() {
        assert_eq!(
            function_selector("balanceOf(address)"),
            [0x70, 0xa0, 0x82, 0x31]
        );
    }

    #[test]
    fn call_data_frames_selector_and_params() {
        let params = [0x00u8, 0x00, 0x00, 0x2a];
        let data = call_data("balanceOf(address)", &params);
        assert_eq!(data, "0x70a082310000002a");
    }

    #[test]
    fn call_data_without_params_is_just_the_selector() {
        let data = call_data("totalSupply()", &[]);
        assert_eq!(data, "0x18160ddd");
    }

    #[test]
    fn leading_zero_params_are_not_trimmed() {
        let params = [0x00u8; 8];
        let data = call_data("balanceOf(address)", &params);
        assert_eq!(data.len(), 2 + 8 + 16);
        assert!(data.ends_with("0000000000000000"));
    }
}
