//! Programmable transaction assembly
//!
//! One Move call per operation. Minimums and amounts arrive already computed
//! by the quote engine; the builder only places them, in the order the entry
//! functions declare:
//!
//! | function | arguments |
//! |---|---|
//! | `swap_a_for_b` / `swap_b_for_a` | pool, coin_in, min_out, clock |
//! | `add_liquidity` | pool, coin_a, coin_b, min_lp_out, clock |
//! | `remove_liquidity` | pool, lp_coin, min_a_out, min_b_out, clock |
//! | `deposit_lp` | pool, lp_coin, clock |
//! | `create_pool` | factory, coin_a, coin_b, four fees, royalty wallet, clock |

use crate::coin_selection::{CoinPayment, FundingPlan, FundingSource};
use crate::error::{ExecutionError, Result};
use sluice_adapters::PoolObject;
use sluice_amm::{FeeSchedule, SwapDirection};
use sluice_config::protocol::modules;
use types::{
    Argument, CallArg, CoinType, Command, MoveCall, ObjectId, PureArg, SharedObject,
    TransactionPayload,
};

pub const CREATE_POOL: &str = "create_pool";
pub const ADD_LIQUIDITY: &str = "add_liquidity";
pub const REMOVE_LIQUIDITY: &str = "remove_liquidity";
pub const DEPOSIT_LP: &str = "deposit_lp";

/// LP token struct name in the pool module
const LP_TOKEN: &str = "LP";

pub struct TransactionBuilder {
    package: ObjectId,
    sender: ObjectId,
    gas_budget: u64,
}

impl TransactionBuilder {
    pub fn new(package: ObjectId, sender: ObjectId, gas_budget: u64) -> Self {
        Self {
            package,
            sender,
            gas_budget,
        }
    }

    pub fn gas_budget(&self) -> u64 {
        self.gas_budget
    }

    /// `<package>::pool::LP<A, B>` for a pool's coin pair
    pub fn lp_coin_type(&self, coin_a: &CoinType, coin_b: &CoinType) -> Result<CoinType> {
        let tag = format!(
            "{}::{}::{}<{}, {}>",
            self.package,
            modules::POOL,
            LP_TOKEN,
            coin_a,
            coin_b
        );
        CoinType::parse(&tag).map_err(|e| ExecutionError::Build(e.to_string()))
    }

    pub fn swap(
        &self,
        pool: &PoolObject,
        direction: SwapDirection,
        funding: &FundingPlan,
        min_out: u128,
    ) -> Result<TransactionPayload> {
        let coin_in_type = match direction {
            SwapDirection::AToB => &pool.coin_a,
            SwapDirection::BToA => &pool.coin_b,
        };
        let payments = expect_payments(funding, &[coin_in_type])?;

        let mut ptb = ProgrammableBuilder::default();
        let pool_arg = ptb.shared(&pool.shared)?;
        let coin_in = ptb.coin(&payments[0])?;
        let min_out = ptb.pure_u64(to_u64(min_out, "min_out")?)?;
        let clock = ptb.shared(&SharedObject::clock())?;

        ptb.move_call(self.call(
            modules::POOL,
            direction.function_name(),
            pool,
            vec![pool_arg, coin_in, min_out, clock],
        ));
        Ok(self.finish(ptb, funding))
    }

    pub fn add_liquidity(
        &self,
        pool: &PoolObject,
        funding: &FundingPlan,
        min_lp_out: u128,
    ) -> Result<TransactionPayload> {
        let payments = expect_payments(funding, &[&pool.coin_a, &pool.coin_b])?;

        let mut ptb = ProgrammableBuilder::default();
        let pool_arg = ptb.shared(&pool.shared)?;
        let coin_a = ptb.coin(&payments[0])?;
        let coin_b = ptb.coin(&payments[1])?;
        let min_lp_out = ptb.pure_u64(to_u64(min_lp_out, "min_lp_out")?)?;
        let clock = ptb.shared(&SharedObject::clock())?;

        ptb.move_call(self.call(
            modules::POOL,
            ADD_LIQUIDITY,
            pool,
            vec![pool_arg, coin_a, coin_b, min_lp_out, clock],
        ));
        Ok(self.finish(ptb, funding))
    }

    pub fn remove_liquidity(
        &self,
        pool: &PoolObject,
        funding: &FundingPlan,
        min_a_out: u128,
        min_b_out: u128,
    ) -> Result<TransactionPayload> {
        let lp_type = self.lp_coin_type(&pool.coin_a, &pool.coin_b)?;
        let payments = expect_payments(funding, &[&lp_type])?;

        let mut ptb = ProgrammableBuilder::default();
        let pool_arg = ptb.shared(&pool.shared)?;
        let lp_coin = ptb.coin(&payments[0])?;
        let min_a_out = ptb.pure_u64(to_u64(min_a_out, "min_a_out")?)?;
        let min_b_out = ptb.pure_u64(to_u64(min_b_out, "min_b_out")?)?;
        let clock = ptb.shared(&SharedObject::clock())?;

        ptb.move_call(self.call(
            modules::POOL,
            REMOVE_LIQUIDITY,
            pool,
            vec![pool_arg, lp_coin, min_a_out, min_b_out, clock],
        ));
        Ok(self.finish(ptb, funding))
    }

    /// Burn LP tokens into the pool
    pub fn deposit_lp(&self, pool: &PoolObject, funding: &FundingPlan) -> Result<TransactionPayload> {
        let lp_type = self.lp_coin_type(&pool.coin_a, &pool.coin_b)?;
        let payments = expect_payments(funding, &[&lp_type])?;

        let mut ptb = ProgrammableBuilder::default();
        let pool_arg = ptb.shared(&pool.shared)?;
        let lp_coin = ptb.coin(&payments[0])?;
        let clock = ptb.shared(&SharedObject::clock())?;

        ptb.move_call(self.call(
            modules::POOL,
            DEPOSIT_LP,
            pool,
            vec![pool_arg, lp_coin, clock],
        ));
        Ok(self.finish(ptb, funding))
    }

    pub fn create_pool(
        &self,
        factory: &SharedObject,
        coin_a: &CoinType,
        coin_b: &CoinType,
        funding: &FundingPlan,
        fees: &FeeSchedule,
        creator_royalty_wallet: ObjectId,
    ) -> Result<TransactionPayload> {
        let payments = expect_payments(funding, &[coin_a, coin_b])?;

        let mut ptb = ProgrammableBuilder::default();
        let factory_arg = ptb.shared(factory)?;
        let coin_a_arg = ptb.coin(&payments[0])?;
        let coin_b_arg = ptb.coin(&payments[1])?;
        let mut arguments = vec![factory_arg, coin_a_arg, coin_b_arg];
        for fee in [
            fees.lp_builder_bps,
            fees.burn_bps,
            fees.creator_royalty_bps,
            fees.rewards_bps,
        ] {
            arguments.push(ptb.pure_u64(u64::from(fee))?);
        }
        arguments.push(ptb.input(CallArg::Pure(PureArg::Address(creator_royalty_wallet)))?);
        arguments.push(ptb.shared(&SharedObject::clock())?);

        ptb.move_call(MoveCall {
            package: self.package,
            module: modules::FACTORY.to_string(),
            function: CREATE_POOL.to_string(),
            type_arguments: vec![coin_a.clone(), coin_b.clone()],
            arguments,
        });
        Ok(self.finish(ptb, funding))
    }

    fn call(&self, module: &str, function: &str, pool: &PoolObject, arguments: Vec<Argument>) -> MoveCall {
        MoveCall {
            package: self.package,
            module: module.to_string(),
            function: function.to_string(),
            type_arguments: vec![pool.coin_a.clone(), pool.coin_b.clone()],
            arguments,
        }
    }

    fn finish(&self, ptb: ProgrammableBuilder, funding: &FundingPlan) -> TransactionPayload {
        TransactionPayload {
            sender: self.sender,
            gas_payment: funding.gas_payment.clone(),
            gas_budget: self.gas_budget,
            inputs: ptb.inputs,
            commands: ptb.commands,
        }
    }
}

/// Inputs and commands accumulated in order
#[derive(Default)]
struct ProgrammableBuilder {
    inputs: Vec<CallArg>,
    commands: Vec<Command>,
}

impl ProgrammableBuilder {
    fn input(&mut self, arg: CallArg) -> Result<Argument> {
        let index = index_u16(self.inputs.len())?;
        self.inputs.push(arg);
        Ok(Argument::Input(index))
    }

    fn pure_u64(&mut self, value: u64) -> Result<Argument> {
        self.input(CallArg::Pure(PureArg::U64(value)))
    }

    fn shared(&mut self, object: &SharedObject) -> Result<Argument> {
        self.input(CallArg::Shared(object.clone()))
    }

    fn command(&mut self, command: Command) -> Result<u16> {
        let index = index_u16(self.commands.len())?;
        self.commands.push(command);
        Ok(index)
    }

    fn move_call(&mut self, call: MoveCall) {
        self.commands.push(Command::MoveCall(call));
    }

    /// Emit merge/split commands and return the exact-amount coin
    fn coin(&mut self, payment: &CoinPayment) -> Result<Argument> {
        let source = match &payment.source {
            FundingSource::GasCoin => Argument::GasCoin,
            FundingSource::Owned { primary, extras } => {
                let primary_arg = self.input(CallArg::Owned(primary.clone()))?;
                if !extras.is_empty() {
                    let mut sources = Vec::with_capacity(extras.len());
                    for extra in extras {
                        sources.push(self.input(CallArg::Owned(extra.clone()))?);
                    }
                    self.command(Command::MergeCoins {
                        destination: primary_arg,
                        sources,
                    })?;
                }
                primary_arg
            }
        };

        let amount = self.pure_u64(payment.amount)?;
        let split = self.command(Command::SplitCoins {
            coin: source,
            amounts: vec![amount],
        })?;
        Ok(Argument::NestedResult(split, 0))
    }
}

fn expect_payments<'a>(funding: &'a FundingPlan, expected: &[&CoinType]) -> Result<&'a [CoinPayment]> {
    let matches = funding.payments.len() == expected.len()
        && funding
            .payments
            .iter()
            .zip(expected)
            .all(|(payment, coin_type)| payment.coin_type.normalized() == coin_type.normalized());
    if !matches {
        let wanted: Vec<String> = expected.iter().map(|c| c.to_string()).collect();
        return Err(ExecutionError::Build(format!(
            "funding plan does not pay [{}]",
            wanted.join(", ")
        )));
    }
    Ok(&funding.payments)
}

fn to_u64(value: u128, name: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| ExecutionError::Build(format!("{} {} exceeds u64", name, value)))
}

fn index_u16(len: usize) -> Result<u16> {
    u16::try_from(len).map_err(|_| ExecutionError::Build("too many transaction inputs".to_string()))
}
