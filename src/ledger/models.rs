use super::{LedgerError, Receipt, TxStatus};
use crate::utils::strip_0x;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id:      u64,
    pub method:  &'a str,
    pub params:  Value,
}

// `result` stays a raw Value so a JSON null (pending receipt) is distinguishable
// from a typed payload
#[derive(Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error:  Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
pub struct RpcErrorBody {
    pub code:    i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionRequest {
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to:   Option<String>,
    pub data: String,                       // 0x-hex calldata or init code
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: String,
    pub gas_used:         String,           // hex quantity
    #[serde(default)]
    pub status:           Option<String>,   // 0x1 ok, 0x0 reverted; absent before byzantium
    #[serde(default)]
    pub contract_address: Option<String>,
}

impl TryFrom<RpcReceipt> for Receipt {
    type Error = LedgerError;

    fn try_from(r: RpcReceipt) -> Result<Self, Self::Error> {
        let status = match r.status.as_deref() {
            None => TxStatus::Success,
            Some(s) if parse_quantity(s)? == 0 => TxStatus::Reverted,
            Some(_) => TxStatus::Success,
        };
        Ok(Receipt {
            gas_used: parse_quantity(&r.gas_used)?,
            tx_hash: r.transaction_hash,
            status,
            contract_address: r.contract_address,
        })
    }
}

pub fn parse_quantity(s: &str) -> Result<u64, LedgerError> {
    let digits = strip_0x(s);
    if digits.is_empty() {
        return Err(LedgerError::Malformed(format!("empty quantity `{}`", s)));
    }
    u64::from_str_radix(digits, 16)
        .map_err(|e| LedgerError::Malformed(format!("quantity `{}`: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quantities() {
        assert_eq!(parse_quantity("0x0").unwrap(), 0);
        assert_eq!(parse_quantity("0x5208").unwrap(), 21_000);
        assert!(parse_quantity("0x").is_err());
        assert!(parse_quantity("0xzz").is_err());
    }

    #[test]
    fn receipt_status_is_decoded() {
        let raw: RpcReceipt = serde_json::from_value(json!({
            "transactionHash": "0x01",
            "gasUsed": "0x2dc6c0",
            "status": "0x0",
            "contractAddress": null
        }))
        .unwrap();
        let r = Receipt::try_from(raw).unwrap();
        assert_eq!(r.gas_used, 3_000_000);
        assert_eq!(r.status, TxStatus::Reverted);

        let raw: RpcReceipt = serde_json::from_value(json!({
            "transactionHash": "0x02",
            "gasUsed": "0x5208",
            "status": "0x1",
            "contractAddress": "0x5fbdb2315678afecb367f032d93f642f64180aa3"
        }))
        .unwrap();
        let r = Receipt::try_from(raw).unwrap();
        assert_eq!(r.status, TxStatus::Success);
        assert_eq!(r.contract_address.as_deref(), Some("0x5fbdb2315678afecb367f032d93f642f64180aa3"));
    }

    #[test]
    fn creation_request_omits_to() {
        let req = TransactionRequest { from: "0xaa".into(), to: None, data: "0x6080".into() };
        assert_eq!(serde_json::to_value(req).unwrap(), json!({ "from": "0xaa", "data": "0x6080" }));
    }

    #[test]
    fn null_result_survives_decoding() {
        let resp: RpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert!(resp.result.is_null());
        assert!(resp.error.is_none());
    }
}
