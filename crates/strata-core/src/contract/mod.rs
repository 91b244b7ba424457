//! Read-only contract-call adapter.
//!
//! Outbound arguments pass through [`encode_all`]; the upstream's response
//! passes through [`decode`] (or [`decode_strict`]) before being returned,
//! so callers only ever see application-native values.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::{
    error::Error,
    upstream::{ApiClient, CallClass, UpstreamError},
    values::{decode, decode_strict, encode_all, CodecError, DecodedValue, WireValue},
};

/// A read-only function call against a deployed contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadOnlyCall {
    /// Fully-qualified contract identifier, `address.contract-name`.
    pub contract_id: String,
    pub function: String,
    /// Principal the call is evaluated as.
    pub sender: String,
    /// JSON `{"type": ..., "value": ...}` argument descriptors.
    #[serde(default)]
    pub arguments: Vec<Value>,
}

/// How a batch of queued calls is drained.
///
/// `Sequential` mirrors the historical dispatcher: one call at a time, in
/// queue order, so the upstream never sees more than one in-flight call per
/// batch. `Parallel` fans the whole batch out at once; opt in via
/// configuration when ordering doesn't matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchMode {
    #[default]
    Sequential,
    Parallel,
}

impl ReadOnlyCall {
    /// Upstream path for this call.
    ///
    /// # Errors
    ///
    /// Fails when `contract_id` is not an `address.contract-name` pair.
    pub fn path(&self) -> Result<String, CodecError> {
        let (address, name) = self.contract_id.split_once('.').ok_or_else(|| {
            CodecError::malformed(
                "principal",
                format!("contract id is not address.name: {}", self.contract_id),
            )
        })?;
        if address.is_empty() || name.is_empty() {
            return Err(CodecError::malformed(
                "principal",
                format!("contract id is not address.name: {}", self.contract_id),
            ));
        }
        Ok(format!("/v2/contracts/call-read/{address}/{name}/{}", self.function))
    }

    /// Builds the POST body, encoding every argument. Returns the body and
    /// how many arguments were dropped as unencodable.
    #[must_use]
    pub fn request_body(&self) -> (Value, usize) {
        let encoded = encode_all(&self.arguments);
        let dropped = self.arguments.len() - encoded.len();
        (json!({ "sender": self.sender, "arguments": encoded }), dropped)
    }
}

/// Executes a read-only call, decoding the result permissively: a contract
/// err decodes to null and is logged, never raised.
///
/// # Errors
///
/// Codec errors for a malformed contract id, upstream errors from the
/// executor, `InvalidResponse` when the result isn't a tagged value.
pub async fn call_read_only(
    client: &ApiClient,
    call: &ReadOnlyCall,
) -> Result<DecodedValue, Error> {
    let wire = fetch_wire_result(client, call).await?;
    Ok(decode(&wire))
}

/// Executes a read-only call, raising [`Error::Contract`] when the contract
/// reports failure.
///
/// # Errors
///
/// As [`call_read_only`], plus the contract's err payload in strict form.
pub async fn call_read_only_strict(
    client: &ApiClient,
    call: &ReadOnlyCall,
) -> Result<DecodedValue, Error> {
    let wire = fetch_wire_result(client, call).await?;
    decode_strict(&wire).map_err(Error::from)
}

async fn fetch_wire_result(
    client: &ApiClient,
    call: &ReadOnlyCall,
) -> Result<WireValue, Error> {
    let path = call.path()?;
    let (body, dropped) = call.request_body();
    if dropped > 0 {
        warn!(
            contract_id = %call.contract_id,
            function = %call.function,
            dropped,
            "arguments dropped during encoding"
        );
    }
    let response = client.post_json(&path, &body, CallClass::Entity).await?;
    serde_json::from_value::<WireValue>(response).map_err(|e| {
        Error::Upstream(UpstreamError::InvalidResponse(format!(
            "contract result is not a tagged value: {e}"
        )))
    })
}

/// Drains a batch of queued calls.
///
/// Each call's outcome is reported independently; one failed call doesn't
/// abort the rest.
pub async fn call_read_only_batch(
    client: &ApiClient,
    calls: &[ReadOnlyCall],
    mode: BatchMode,
) -> Vec<Result<DecodedValue, Error>> {
    match mode {
        BatchMode::Sequential => {
            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                results.push(call_read_only(client, call).await);
            }
            results
        }
        BatchMode::Parallel => {
            futures::future::join_all(calls.iter().map(|call| call_read_only(client, call)))
                .await
        }
    }
}
