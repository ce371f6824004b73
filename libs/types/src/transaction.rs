//! Programmable transaction payload
//!
//! A payload is an ordered list of inputs plus an ordered list of commands
//! that reference those inputs (or earlier command results) by index. The
//! builder in `sluice-execution` assembles these; the wallet signer turns them
//! into a [`SignedTransaction`].

use crate::coin::CoinType;
use crate::object::{ObjectId, ObjectRef, SharedObject};
use serde::{Deserialize, Serialize};

/// Pure (non-object) input value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum PureArg {
    U64(u64),
    Bool(bool),
    Address(ObjectId),
    String(String),
}

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CallArg {
    Pure(PureArg),
    Owned(ObjectRef),
    Shared(SharedObject),
}

/// Reference to an input, the gas coin, or a previous command's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Argument {
    GasCoin,
    Input(u16),
    Result(u16),
    NestedResult(u16, u16),
}

/// Entry-function call on a published package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<CoinType>,
    pub arguments: Vec<Argument>,
}

impl MoveCall {
    /// `package::module::function` as it appears in explorers and abort locations
    pub fn target(&self) -> String {
        format!("{}::{}::{}", self.package, self.module, self.function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    MoveCall(MoveCall),
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },
    MergeCoins {
        destination: Argument,
        sources: Vec<Argument>,
    },
    TransferObjects {
        objects: Vec<Argument>,
        recipient: Argument,
    },
}

/// Fully built, unsigned transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPayload {
    pub sender: ObjectId,
    pub gas_payment: Vec<ObjectRef>,
    pub gas_budget: u64,
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

impl TransactionPayload {
    /// The last Move call in the payload (the operation being performed)
    pub fn move_call(&self) -> Option<&MoveCall> {
        self.commands.iter().rev().find_map(|command| match command {
            Command::MoveCall(call) => Some(call),
            _ => None,
        })
    }

    /// Resolve an `Argument::Input` to its value
    pub fn input(&self, argument: Argument) -> Option<&CallArg> {
        match argument {
            Argument::Input(index) => self.inputs.get(index as usize),
            _ => None,
        }
    }

    /// Pure `u64` bound to an argument, if it is one
    pub fn pure_u64(&self, argument: Argument) -> Option<u64> {
        match self.input(argument) {
            Some(CallArg::Pure(PureArg::U64(value))) => Some(*value),
            _ => None,
        }
    }
}

/// Signer output ready for submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedTransaction {
    /// Base64 transaction bytes
    pub tx_bytes: String,
    /// Base64 serialized signatures
    pub signatures: Vec<String>,
}
