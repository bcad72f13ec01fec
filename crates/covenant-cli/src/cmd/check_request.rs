use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use covenant_core::codec::{Codec, Decoded, Incoming, JsonCodec, RpcRequest};
use covenant_core::convert::ConverterRegistry;
use covenant_core::errors::RpcResult;
use covenant_core::validate::Validator;
use covenant_handlers::config::ServerConfig;

use crate::io::input;
use crate::output::{self, ErrorOut};

#[derive(Debug, Serialize)]
pub struct CallOut {
    pub id: Value,
    pub method: Option<String>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOut>,
}

#[derive(Debug, Serialize)]
pub struct CheckRequestOut {
    pub ok: bool,
    pub batch: bool,
    pub calls: Vec<CallOut>,
}

pub fn run(idl: &Path, request: &Path, cfg: &ServerConfig) -> Result<ExitCode> {
    let converters = ConverterRegistry::builtin();
    let contract = input::load_contract(idl, cfg, &converters)?;
    let bytes = input::read_bytes(request)?;

    let codec = JsonCodec::new(cfg.core.limits.clone());
    let validator = Validator::new(&contract, &converters).with_limits(&cfg.core.limits);

    let (batch, calls) = match codec.decode_request(&bytes) {
        Ok(Incoming::Single(d)) => (false, vec![check(&validator, d)]),
        Ok(Incoming::Batch(items)) if items.len() > cfg.max_batch_size => {
            anyhow::bail!(
                "batch of {} calls exceeds limit {}",
                items.len(),
                cfg.max_batch_size
            )
        }
        Ok(Incoming::Batch(items)) => (
            true,
            items
                .into_iter()
                .map(|d| check(&validator, d))
                .collect(),
        ),
        Err(e) => (
            false,
            vec![CallOut {
                id: Value::Null,
                method: None,
                ok: false,
                error: Some(ErrorOut::from(&e)),
            }],
        ),
    };

    let ok = calls.iter().all(|c| c.ok);
    for c in &calls {
        let label = c.method.as_deref().unwrap_or("<undecodable>");
        match &c.error {
            None => output::verdict(true, label)?,
            Some(e) => output::verdict(false, &format!("{label}: {} ({})", e.message, e.kind))?,
        }
    }
    output::print(&CheckRequestOut { ok, batch, calls })?;
    Ok(super::exit_code(ok))
}

fn check(validator: &Validator<'_>, decoded: Decoded) -> CallOut {
    match decoded {
        Decoded::Request(req) => {
            let result = check_params(validator, &req);
            CallOut {
                id: req.id,
                method: Some(req.method),
                ok: result.is_ok(),
                error: result.err().as_ref().map(ErrorOut::from),
            }
        }
        Decoded::Rejected(resp) => CallOut {
            id: resp.id,
            method: None,
            ok: false,
            error: resp.outcome.err().as_ref().map(ErrorOut::from),
        },
    }
}

fn check_params(validator: &Validator<'_>, req: &RpcRequest) -> RpcResult<()> {
    let (interface, function) = req.split_method().unwrap_or((req.method.as_str(), ""));
    let func = validator.contract().function(interface, function)?;
    validator.validate_params(func, &req.params)?;
    Ok(())
}
