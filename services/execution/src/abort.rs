//! Move abort decoding
//!
//! A failed transaction reports its status as a debug-formatted string. When
//! the failure is an abort raised by a Move module it has this shape:
//!
//! ```text
//! MoveAbort(MoveLocation { module: ModuleId { address: <hex>, name: Identifier("<module>") },
//!     function: <u16>, instruction: <u16>, function_name: Some("<function>") }, <code>)
//!     [in command <n>]
//! ```
//!
//! `function_name: None` decodes to the function `"unknown"`. Anything that
//! does not match decodes to `None` and callers surface the raw string.
//! The grammar is tied to the node's error formatting; a node upgrade that
//! changes it shows up as undecoded raw messages, never as a wrong decode.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

const MOVE_ABORT_PATTERN: &str = concat!(
    r"MoveAbort\(\s*MoveLocation\s*\{\s*",
    r"module:\s*ModuleId\s*\{\s*address:\s*(?P<address>(?:0x)?[0-9a-fA-F]+),\s*",
    r#"name:\s*Identifier\("(?P<module>[A-Za-z_][A-Za-z0-9_]*)"\)\s*\},\s*"#,
    r"function:\s*\d+,\s*instruction:\s*\d+,\s*",
    r#"function_name:\s*(?:Some\("(?P<function>[A-Za-z_][A-Za-z0-9_]*)"\)|None)\s*\},\s*"#,
    r"(?P<code>\d+)\s*\)",
    r"(?:\s+in command (?P<command>\d+))?",
);

static MOVE_ABORT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(MOVE_ABORT_PATTERN).ok());

/// Abort codes raised by the pool and factory modules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbortReason {
    PoolAlreadyExists,
    InsufficientLiquidity,
    ExcessiveSlippage,
    FeeExceedsMaximum,
    CreationLocked,
    Unauthorized,
    ZeroAmount,
    Unknown(u64),
}

impl AbortReason {
    pub fn from_code(code: u64) -> Self {
        match code {
            1 => AbortReason::PoolAlreadyExists,
            2 => AbortReason::InsufficientLiquidity,
            3 => AbortReason::ExcessiveSlippage,
            4 => AbortReason::FeeExceedsMaximum,
            5 => AbortReason::CreationLocked,
            6 => AbortReason::Unauthorized,
            7 => AbortReason::ZeroAmount,
            other => AbortReason::Unknown(other),
        }
    }

    /// User-facing text for a known code
    pub fn message(&self) -> Option<&'static str> {
        let text = match self {
            AbortReason::PoolAlreadyExists => "A pool for this token pair already exists",
            AbortReason::InsufficientLiquidity => "Insufficient liquidity in the pool for this trade",
            AbortReason::ExcessiveSlippage => {
                "Slippage tolerance exceeded: the price moved before your transaction executed"
            }
            AbortReason::FeeExceedsMaximum => "Fee exceeds the maximum allowed",
            AbortReason::CreationLocked => "Pool creation is currently locked",
            AbortReason::Unauthorized => "You are not authorized to perform this action",
            AbortReason::ZeroAmount => "Amount must be greater than zero",
            AbortReason::Unknown(_) => return None,
        };
        Some(text)
    }
}

/// A decoded Move abort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortInfo {
    pub address: String,
    pub module: String,
    pub function: String,
    pub code: u64,
    /// Index of the failing command in the transaction, when reported
    pub command: Option<u32>,
}

impl AbortInfo {
    pub fn reason(&self) -> AbortReason {
        AbortReason::from_code(self.code)
    }

    /// Specific message for known codes, generic location otherwise
    pub fn message(&self) -> String {
        match self.reason().message() {
            Some(text) => text.to_string(),
            None => format!(
                "{}::{} failed with code {}",
                self.module, self.function, self.code
            ),
        }
    }
}

impl fmt::Display for AbortInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Parse a raw failure string; `None` when it is not a Move abort
pub fn decode_abort(raw: &str) -> Option<AbortInfo> {
    let pattern = MOVE_ABORT.as_ref()?;
    let captures = pattern.captures(raw)?;

    Some(AbortInfo {
        address: captures.name("address")?.as_str().to_string(),
        module: captures.name("module")?.as_str().to_string(),
        function: captures
            .name("function")
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        code: captures.name("code")?.as_str().parse().ok()?,
        command: captures
            .name("command")
            .and_then(|m| m.as_str().parse().ok()),
    })
}

/// Most specific message available for a failed transaction
pub fn describe_failure(raw: &str) -> (Option<AbortInfo>, String) {
    match decode_abort(raw) {
        Some(info) => {
            let message = info.message();
            (Some(info), message)
        }
        None => (None, raw.to_string()),
    }
}
