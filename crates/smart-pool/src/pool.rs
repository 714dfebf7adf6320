//! The smart pool controller.
//!
//! [`SmartPool`] owns the underlying [`Ledger`], the controller's
//! [`Wallet`], the pool share supply and the stored gradual update. Every
//! mutating operation first checks the pool's capabilities, then plans the
//! complete change against a copy of the controller state and only writes to
//! the ledger once every bound has been checked, so failed operations leave
//! the pool untouched.

use {
    crate::{
        TokenId,
        constants::{
            DEFAULT_ADD_TOKEN_TIME_LOCK_IN_BLOCKS,
            DEFAULT_MIN_WEIGHT_CHANGE_BLOCK_PERIOD,
            MAX_ASSET_LIMIT,
            MAX_POOL_SUPPLY,
            MIN_ASSET_LIMIT,
            MIN_POOL_SUPPLY,
        },
        error::{Asset, Error},
        ledger::{Ledger, MemoryLedger, Record, Resync},
        math::{self, Transfer},
        rights::{Capabilities, Operation, PoolKind, Rights},
        schedule::GradualUpdate,
        wallet::Wallet,
    },
    itertools::{Itertools, izip},
    number::Bfp,
};

/// Tokens, initial balances and weights the pool is created with.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolParams {
    pub tokens: Vec<TokenId>,
    pub balances: Vec<Bfp>,
    pub weights: Vec<Bfp>,
    pub swap_fee: Bfp,
}

/// Pool shares minted to or burned from the controller by a weight change.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShareChange {
    None,
    Mint(Bfp),
    Burn(Bfp),
}

/// A weight change applied to the ledger.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WeightChange {
    pub token: TokenId,
    pub before: Record,
    pub after: Record,
    pub transfer: Transfer,
    pub shares: ShareChange,
}

/// Weight changes checked against a simulated controller state.
struct Plan {
    changes: Vec<WeightChange>,
    controller: Wallet,
    total_supply: Bfp,
}

#[derive(Clone, Debug)]
pub struct SmartPool<L = MemoryLedger> {
    capabilities: Capabilities,
    params: PoolParams,
    ledger: L,
    controller: Wallet,
    total_supply: Bfp,
    cap: Option<Bfp>,
    min_weight_change_block_period: u64,
    add_token_time_lock_in_blocks: u64,
    schedule: Option<GradualUpdate>,
    /// Latest block passed to a scheduling call. Time never moves backwards.
    last_block: Option<u64>,
    created: bool,
}

impl<L: Ledger> SmartPool<L> {
    /// Sets up a controller for a pool that is not created yet. `ledger`
    /// must not have any tokens bound.
    pub fn new(
        kind: PoolKind,
        rights: Rights,
        params: PoolParams,
        ledger: L,
        controller: Wallet,
    ) -> Result<Self, Error> {
        let count = params.tokens.len();
        if !(MIN_ASSET_LIMIT..=MAX_ASSET_LIMIT).contains(&count) {
            return Err(Error::AssetLimit {
                min: MIN_ASSET_LIMIT,
                max: MAX_ASSET_LIMIT,
                actual: count,
            });
        }
        for len in [params.balances.len(), params.weights.len()] {
            if len != count {
                return Err(Error::LengthMismatch {
                    expected: count,
                    actual: len,
                });
            }
        }
        if let Some(token) = params.tokens.iter().duplicates().next() {
            return Err(Error::DuplicateToken(*token));
        }
        math::ensure_swap_fee(params.swap_fee)?;
        for (token, balance, weight) in
            izip!(&params.tokens, &params.balances, &params.weights)
        {
            math::ensure_weight(*weight)?;
            math::ensure_balance(*token, *balance)?;
        }
        math::ensure_total_weight(math::total(params.weights.iter().copied())?)?;
        if !ledger.tokens().is_empty() {
            return Err(Error::PoolAlreadyCreated);
        }

        Ok(Self {
            capabilities: Capabilities::new(kind, rights),
            params,
            ledger,
            controller,
            total_supply: Bfp::zero(),
            cap: None,
            min_weight_change_block_period: DEFAULT_MIN_WEIGHT_CHANGE_BLOCK_PERIOD,
            add_token_time_lock_in_blocks: DEFAULT_ADD_TOKEN_TIME_LOCK_IN_BLOCKS,
            schedule: None,
            last_block: None,
            created: false,
        })
    }

    /// Creates the pool with the default block periods.
    pub fn create_pool(&mut self, initial_supply: Bfp) -> Result<(), Error> {
        self.create(
            initial_supply,
            DEFAULT_MIN_WEIGHT_CHANGE_BLOCK_PERIOD,
            DEFAULT_ADD_TOKEN_TIME_LOCK_IN_BLOCKS,
        )
    }

    pub fn create_pool_with_periods(
        &mut self,
        initial_supply: Bfp,
        min_weight_change_block_period: u64,
        add_token_time_lock_in_blocks: u64,
    ) -> Result<(), Error> {
        self.capabilities
            .ensure(Operation::CreatePoolWithPeriods)?;
        if add_token_time_lock_in_blocks > min_weight_change_block_period {
            return Err(Error::InconsistentTimeLock);
        }
        self.create(
            initial_supply,
            min_weight_change_block_period,
            add_token_time_lock_in_blocks,
        )
    }

    fn create(
        &mut self,
        initial_supply: Bfp,
        min_weight_change_block_period: u64,
        add_token_time_lock_in_blocks: u64,
    ) -> Result<(), Error> {
        if self.created {
            return Err(Error::PoolAlreadyCreated);
        }
        if !(MIN_POOL_SUPPLY..=MAX_POOL_SUPPLY).contains(&initial_supply) {
            return Err(Error::InvalidSupply(initial_supply));
        }
        self.ensure_within_cap(initial_supply)?;

        let mut controller = self.controller.clone();
        for (token, balance) in self.params.tokens.iter().zip(&self.params.balances) {
            controller.debit(Asset::Token(*token), *balance)?;
        }
        controller.credit(Asset::PoolShares, initial_supply)?;

        for (token, balance, weight) in izip!(
            &self.params.tokens,
            &self.params.balances,
            &self.params.weights
        ) {
            self.ledger.bind(
                *token,
                Record {
                    balance: *balance,
                    weight: *weight,
                },
            )?;
        }
        self.ledger.set_swap_fee(self.params.swap_fee)?;
        self.ledger.set_public_swap(true);

        self.controller = controller;
        self.total_supply = initial_supply;
        self.min_weight_change_block_period = min_weight_change_block_period;
        self.add_token_time_lock_in_blocks = add_token_time_lock_in_blocks;
        self.created = true;
        tracing::info!(
            kind = %self.capabilities.kind,
            %initial_supply,
            min_weight_change_block_period,
            "created pool"
        );
        Ok(())
    }

    /// Sets the weight of a single token, moving tokens between the
    /// controller and the pool so that spot prices stay the same. Returns
    /// `None` if the token already has that weight.
    pub fn update_weight(
        &mut self,
        token: TokenId,
        weight: Bfp,
    ) -> Result<Option<WeightChange>, Error> {
        self.capabilities.ensure(Operation::UpdateWeight)?;
        self.ensure_created()?;
        self.ensure_no_pending_update()?;

        let plan = self.plan(&[(token, weight)])?;
        let change = plan.changes.first().copied();
        self.commit(plan)?;
        Ok(change)
    }

    /// Sets the weights of all tokens at once, given in token order. This is
    /// equivalent to calling [`SmartPool::update_weight`] for every token,
    /// lowering weights before raising others, except that either all of the
    /// changes are applied or none.
    pub fn update_weights(&mut self, weights: &[Bfp]) -> Result<Vec<WeightChange>, Error> {
        self.capabilities.ensure(Operation::UpdateWeight)?;
        self.ensure_created()?;
        self.ensure_no_pending_update()?;

        let targets = self.decreases_first(weights)?;
        let plan = self.plan(&targets)?;
        let changes = plan.changes.clone();
        self.commit(plan)?;
        Ok(changes)
    }

    /// Schedules a linear move from the current weights to `new_weights`,
    /// replacing any previously stored update. The update starts at
    /// `start_block` or `now`, whichever is later.
    pub fn update_weights_gradually(
        &mut self,
        new_weights: &[Bfp],
        start_block: u64,
        end_block: u64,
        now: u64,
    ) -> Result<(), Error> {
        self.capabilities
            .ensure(Operation::UpdateWeightsGradually)?;
        self.ensure_created()?;
        self.ensure_not_stale(now)?;
        if end_block < start_block {
            return Err(Error::InvalidRange {
                start: start_block,
                end: end_block,
            });
        }
        let start_block = start_block.max(now);
        let period = end_block
            .checked_sub(start_block)
            .ok_or(Error::InvalidRange {
                start: start_block,
                end: end_block,
            })?;
        if period < self.min_weight_change_block_period {
            return Err(Error::WeightChangeTooFast {
                actual: period,
                minimum: self.min_weight_change_block_period,
            });
        }

        let current = self.weights()?;
        if new_weights.len() != current.len() {
            return Err(Error::LengthMismatch {
                expected: current.len(),
                actual: new_weights.len(),
            });
        }
        for weight in new_weights {
            math::ensure_weight(*weight)?;
        }
        math::ensure_total_weight(math::total(new_weights.iter().copied())?)?;

        let update = GradualUpdate::new(current, new_weights.to_vec(), start_block, end_block)?;
        tracing::debug!(
            start_block,
            end_block,
            weights = ?update.end_weights(),
            "scheduled gradual weight update"
        );
        self.schedule = Some(update);
        self.last_block = Some(now);
        Ok(())
    }

    /// Moves the weights to where the stored gradual update puts them at
    /// block `now` and returns the new weights. Once the end block has been
    /// reached the weights equal the end weights exactly and further pokes
    /// are no-ops.
    pub fn poke_weights(&mut self, now: u64) -> Result<Vec<Bfp>, Error> {
        self.capabilities.ensure(Operation::PokeWeights)?;
        self.ensure_created()?;
        self.ensure_not_stale(now)?;
        let schedule = self.schedule.as_ref().ok_or(Error::NoActiveSchedule)?;
        if schedule.is_finished() {
            return self.weights();
        }
        let terminal = schedule.is_terminal(now);
        let targets = schedule.weights_at(now)?;

        let ordered = self.decreases_first(&targets)?;
        let plan = self.plan(&ordered)?;
        self.commit(plan)?;

        if terminal && let Some(schedule) = self.schedule.as_mut() {
            schedule.finish();
        }
        self.last_block = Some(now);
        let weights = self.weights()?;
        tracing::debug!(block = now, ?weights, terminal, "poked weights");
        Ok(weights)
    }

    /// Absorbs an out-of-band balance change of `token` into its weight.
    pub fn resync_weight(&mut self, token: TokenId) -> Result<Resync, Error> {
        self.capabilities.ensure(Operation::ResyncWeight)?;
        self.ensure_created()?;
        let resync = self.ledger.apply_resync(token)?;
        tracing::debug!(
            %token,
            balance = %resync.after.balance,
            weight_before = %resync.before.weight,
            weight_after = %resync.after.weight,
            "resynced weight"
        );
        Ok(resync)
    }

    pub fn set_swap_fee(&mut self, swap_fee: Bfp) -> Result<(), Error> {
        self.capabilities.ensure(Operation::SetSwapFee)?;
        self.ensure_created()?;
        math::ensure_swap_fee(swap_fee)?;
        self.ledger.set_swap_fee(swap_fee)?;
        tracing::info!(%swap_fee, "set swap fee");
        Ok(())
    }

    pub fn set_public_swap(&mut self, public: bool) -> Result<(), Error> {
        self.capabilities.ensure(Operation::SetPublicSwap)?;
        self.ensure_created()?;
        self.ledger.set_public_swap(public);
        tracing::info!(public, "set public swap");
        Ok(())
    }

    /// Caps the pool share supply. `None` removes the cap.
    pub fn set_cap(&mut self, cap: Option<Bfp>) -> Result<(), Error> {
        self.capabilities.ensure(Operation::SetCap)?;
        if let Some(cap) = cap
            && cap < self.total_supply
        {
            return Err(Error::CapExceeded(cap));
        }
        self.cap = cap;
        tracing::info!(?cap, "set pool share cap");
        Ok(())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable access to the underlying ledger, e.g. to simulate transfers
    /// that bypass the pool.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn controller(&self) -> &Wallet {
        &self.controller
    }

    pub fn total_supply(&self) -> Bfp {
        self.total_supply
    }

    pub fn cap(&self) -> Option<Bfp> {
        self.cap
    }

    pub fn min_weight_change_block_period(&self) -> u64 {
        self.min_weight_change_block_period
    }

    pub fn add_token_time_lock_in_blocks(&self) -> u64 {
        self.add_token_time_lock_in_blocks
    }

    pub fn schedule(&self) -> Option<&GradualUpdate> {
        self.schedule.as_ref()
    }

    /// The latest block a gradual update was scheduled or poked at.
    pub fn last_block(&self) -> Option<u64> {
        self.last_block
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.params.tokens
    }

    /// Current denormalized weights in token order.
    pub fn weights(&self) -> Result<Vec<Bfp>, Error> {
        self.ledger
            .tokens()
            .into_iter()
            .map(|token| self.ledger.weight(token))
            .collect()
    }

    fn ensure_created(&self) -> Result<(), Error> {
        if self.created {
            Ok(())
        } else {
            Err(Error::PoolNotCreated)
        }
    }

    fn ensure_not_stale(&self, now: u64) -> Result<(), Error> {
        match self.last_block {
            Some(last) if now < last => Err(Error::StaleBlock { block: now, last }),
            _ => Ok(()),
        }
    }

    fn ensure_no_pending_update(&self) -> Result<(), Error> {
        match &self.schedule {
            Some(schedule) if !schedule.is_finished() => Err(Error::GradualUpdateInProgress),
            _ => Ok(()),
        }
    }

    /// Pairs target weights with their tokens, ordering weight decreases
    /// before increases so the total weight stays bounded in between.
    fn decreases_first(&self, targets: &[Bfp]) -> Result<Vec<(TokenId, Bfp)>, Error> {
        let tokens = self.ledger.tokens();
        if targets.len() != tokens.len() {
            return Err(Error::LengthMismatch {
                expected: tokens.len(),
                actual: targets.len(),
            });
        }
        let current = self.weights()?;
        Ok(izip!(tokens, current, targets.iter().copied())
            .sorted_by_key(|(_, current, target)| target > current)
            .map(|(token, _, target)| (token, target))
            .collect_vec())
    }

    fn ensure_within_cap(&self, total_supply: Bfp) -> Result<(), Error> {
        match self.cap {
            Some(cap) if total_supply > cap => Err(Error::CapExceeded(cap)),
            _ => Ok(()),
        }
    }

    /// Checks a sequence of weight changes without touching any state.
    /// Changes are simulated in order, so every change sees the total weight
    /// and share supply left by the previous ones.
    fn plan(&self, targets: &[(TokenId, Bfp)]) -> Result<Plan, Error> {
        let mut controller = self.controller.clone();
        let mut total_supply = self.total_supply;
        let mut total_weight = self.ledger.total_weight()?;
        let mut changes = Vec::with_capacity(targets.len());

        for &(token, weight) in targets {
            let before = self.ledger.record(token)?;
            if weight == before.weight {
                continue;
            }
            math::ensure_weight(weight)?;
            let (balance, transfer) = math::rebalance(before.balance, before.weight, weight)?;
            math::ensure_balance(token, balance)?;
            let new_total_weight = total_weight.sub(before.weight)?.add(weight)?;
            math::ensure_total_weight(new_total_weight)?;

            let shares = if weight > before.weight {
                let minted =
                    math::shares_to_mint(total_supply, weight.sub(before.weight)?, total_weight)?;
                total_supply = total_supply.add(minted)?;
                self.ensure_within_cap(total_supply)?;
                controller.credit(Asset::PoolShares, minted)?;
                ShareChange::Mint(minted)
            } else {
                let burned =
                    math::shares_to_burn(total_supply, before.weight.sub(weight)?, total_weight)?;
                controller.debit(Asset::PoolShares, burned)?;
                total_supply = total_supply.sub(burned)?;
                ShareChange::Burn(burned)
            };
            match transfer {
                Transfer::Deposit(amount) => controller.debit(Asset::Token(token), amount)?,
                Transfer::Withdrawal(amount) => controller.credit(Asset::Token(token), amount)?,
                Transfer::None => (),
            }

            total_weight = new_total_weight;
            changes.push(WeightChange {
                token,
                before,
                after: Record { balance, weight },
                transfer,
                shares,
            });
        }

        Ok(Plan {
            changes,
            controller,
            total_supply,
        })
    }

    fn commit(&mut self, plan: Plan) -> Result<(), Error> {
        for change in &plan.changes {
            let transfer = self
                .ledger
                .apply_weight_change(change.token, change.after.weight)?;
            debug_assert_eq!(transfer, change.transfer);
            tracing::debug!(
                token = %change.token,
                before = %change.before.weight,
                after = %change.after.weight,
                transfer = ?change.transfer,
                shares = ?change.shares,
                "changed weight"
            );
        }
        self.controller = plan.controller;
        self.total_supply = plan.total_supply;
        Ok(())
    }
}
