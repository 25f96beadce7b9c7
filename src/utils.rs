use tracing_subscriber::{EnvFilter, fmt};

// RUST_LOG wins when set, otherwise info for everything
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

pub fn to_hex_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

// 0x + 20 bytes of hex, checksum casing is not checked
pub fn is_address(s: &str) -> bool {
    let body = match s.strip_prefix("0x") {
        Some(b) => b,
        None    => return false,
    };
    body.len() == 40 && body.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_shape() {
        assert!(is_address("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"));
        assert!(!is_address("e7f1725E7734CE288F8367e1Bb143E90bb3F0512"));
        assert!(!is_address("0xe7f1725E7734CE288F8367e1Bb143E90bb3F05"));
        assert!(!is_address("0xz7f1725E7734CE288F8367e1Bb143E90bb3F0512"));
    }

    #[test]
    fn hex_helpers() {
        assert_eq!(strip_0x("0xdead"), "dead");
        assert_eq!(strip_0x("beef"), "beef");
        assert_eq!(to_hex_prefixed(&[0xde, 0xad]), "0xdead");
    }
}
