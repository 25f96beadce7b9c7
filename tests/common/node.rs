use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

pub const ACCOUNT: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const CONTRACT: &str = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512";
pub const RECEIPT_GAS: u64 = 187_204;

/// Stand-in JSON-RPC node with one unlocked account. Receipt lookups are
/// numbered globally: the first `failing_lookups` answer HTTP `fail_status`,
/// the next `pending_lookups` answer null, everything after gets a receipt.
#[derive(Default)]
pub struct Node {
    pub requests:        Mutex<Vec<Value>>,
    pub lookups:         Mutex<u32>,
    pub accounts:        Vec<String>,
    pub revert:          bool,
    pub pending_lookups: u32,
    pub failing_lookups: u32,
    pub fail_status:     u16,
}

impl Node {
    pub fn with_account() -> Self {
        Self { accounts: vec![ACCOUNT.to_string()], ..Default::default() }
    }

    pub fn lookup_count(&self) -> u32 {
        *self.lookups.lock().unwrap()
    }

    pub fn sent_transactions(&self) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r["method"] == "eth_sendTransaction")
            .map(|r| r["params"][0].clone())
            .collect()
    }
}

async fn rpc(State(node): State<Arc<Node>>, Json(req): Json<Value>) -> Response {
    node.requests.lock().unwrap().push(req.clone());
    let id = req["id"].clone();

    let result = match req["method"].as_str().unwrap_or_default() {
        "eth_accounts" => json!(node.accounts),
        "eth_sendTransaction" => {
            let n = node.requests.lock().unwrap().len();
            json!(format!("0x{:064x}", n))
        }
        "eth_getTransactionReceipt" => {
            let n = {
                let mut lookups = node.lookups.lock().unwrap();
                *lookups += 1;
                *lookups
            };
            if n <= node.failing_lookups {
                let status = StatusCode::from_u16(node.fail_status).unwrap();
                return (status, "node unavailable").into_response();
            }
            if n <= node.failing_lookups + node.pending_lookups {
                Value::Null
            } else {
                let status = if node.revert { "0x0" } else { "0x1" };
                json!({
                    "transactionHash": req["params"][0],
                    "gasUsed": format!("0x{:x}", RECEIPT_GAS),
                    "status": status,
                    "contractAddress": null
                })
            }
        }
        other => {
            return Json(json!({
                "jsonrpc": "2.0", "id": id,
                "error": { "code": -32601, "message": format!("method {other} not found") }
            }))
            .into_response();
        }
    };
    Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })).into_response()
}

pub async fn spawn_node(node: Arc<Node>) -> String {
    let app = Router::new().route("/", post(rpc)).with_state(node);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}
