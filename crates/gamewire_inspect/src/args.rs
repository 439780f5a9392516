//! CLI args

use std::path::PathBuf;

use clap::Parser;

/// Decode a wire dump against the standard type registry.
#[derive(Parser)]
pub(crate) struct InspectArgs {
    /// File containing raw wire bytes.
    #[clap(short, long)]
    pub file: Option<PathBuf>,

    /// Inline hex string of wire bytes (whitespace allowed).
    #[clap(short = 'x', long)]
    pub hex: Option<String>,

    /// Stop after this many decoded values.
    #[clap(short, long)]
    pub limit: Option<usize>,
}

/// Parse a hex dump, ignoring whitespace.
pub(crate) fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();

    if digits.len() % 2 != 0 {
        return Err("odd number of hex digits".to_owned());
    }

    digits
        .chunks(2)
        .map(|pair| {
            let s: String = pair.iter().collect();
            u8::from_str_radix(&s, 16).map_err(|_| format!("invalid hex byte {:?}", s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("14").unwrap(), vec![0x14]);
        assert_eq!(parse_hex("de ad BE EF").unwrap(), vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }
}
