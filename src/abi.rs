use sha3::{Digest, Keccak256};

const WORD: usize = 32;

// Argument values the medical contracts take. Every numeric column is a uint256
// on-chain, every text column a dynamic string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Uint(u64),
    Str(String),
}

impl Token {
    pub fn abi_type(&self) -> &'static str {
        match self {
            Token::Uint(_) => "uint256",
            Token::Str(_)  => "string",
        }
    }
}

/// Canonical signature, e.g. `deletePatient(uint256)`.
pub fn signature(method: &str, args: &[Token]) -> String {
    let types: Vec<&str> = args.iter().map(Token::abi_type).collect();
    format!("{}({})", method, types.join(","))
}

/// First four bytes of keccak256(signature).
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

pub fn encode_call(method: &str, args: &[Token]) -> Vec<u8> {
    let mut out = selector(&signature(method, args)).to_vec();
    out.extend_from_slice(&encode_args(args));
    out
}

// head/tail layout: static words inline, dynamic values as an offset into the tail
pub fn encode_args(args: &[Token]) -> Vec<u8> {
    let mut head = Vec::with_capacity(args.len() * WORD);
    let mut tail = Vec::new();
    let head_len = args.len() * WORD;

    for arg in args {
        match arg {
            Token::Uint(v) => head.extend_from_slice(&uint_word(*v)),
            Token::Str(s) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u64));
                tail.extend_from_slice(&uint_word(s.len() as u64));
                tail.extend_from_slice(s.as_bytes());
                let pad = (WORD - s.len() % WORD) % WORD;
                tail.extend(std::iter::repeat_n(0u8, pad));
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

fn uint_word(v: u64) -> [u8; WORD] {
    let mut w = [0u8; WORD];
    w[WORD - 8..].copy_from_slice(&v.to_be_bytes());
    w
}
