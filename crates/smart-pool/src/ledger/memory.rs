use {
    super::{Ledger, Record},
    crate::{
        TokenId,
        constants::MIN_FEE,
        error::Error,
        math::{self, Transfer},
    },
    number::Bfp,
    std::collections::HashMap,
};

/// In-process ledger standing in for the pool contract.
#[derive(Clone, Debug)]
pub struct MemoryLedger {
    tokens: Vec<TokenId>,
    entries: HashMap<TokenId, Entry>,
    swap_fee: Bfp,
    public_swap: bool,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    record: Record,
    holdings: Bfp,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self {
            tokens: Vec::new(),
            entries: HashMap::new(),
            swap_fee: MIN_FEE,
            public_swap: false,
        }
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a plain token transfer to the pool address, e.g. a rebase
    /// or a direct deposit. Only the holdings change, the recorded balance
    /// stays as is until the next `gulp`.
    pub fn transfer_in(&mut self, token: TokenId, amount: Bfp) -> Result<(), Error> {
        let entry = self.entry_mut(token)?;
        entry.holdings = entry.holdings.add(amount)?;
        Ok(())
    }

    /// Simulates tokens leaving the pool without the pool's involvement, e.g.
    /// a negative rebase.
    pub fn transfer_out(&mut self, token: TokenId, amount: Bfp) -> Result<(), Error> {
        let entry = self.entry_mut(token)?;
        entry.holdings = entry.holdings.sub(amount)?;
        Ok(())
    }

    fn entry(&self, token: TokenId) -> Result<&Entry, Error> {
        self.entries.get(&token).ok_or(Error::UnknownToken(token))
    }

    fn entry_mut(&mut self, token: TokenId) -> Result<&mut Entry, Error> {
        self.entries
            .get_mut(&token)
            .ok_or(Error::UnknownToken(token))
    }

    fn check_record(&self, token: TokenId, record: Record) -> Result<(), Error> {
        math::ensure_weight(record.weight)?;
        math::ensure_balance(token, record.balance)?;
        let others = self
            .entries
            .iter()
            .filter(|(other, _)| **other != token)
            .map(|(_, entry)| entry.record.weight);
        math::ensure_total_weight(math::total(others)?.add(record.weight)?)
    }
}

impl Ledger for MemoryLedger {
    fn tokens(&self) -> Vec<TokenId> {
        self.tokens.clone()
    }

    fn record(&self, token: TokenId) -> Result<Record, Error> {
        Ok(self.entry(token)?.record)
    }

    fn holdings(&self, token: TokenId) -> Result<Bfp, Error> {
        Ok(self.entry(token)?.holdings)
    }

    fn swap_fee(&self) -> Bfp {
        self.swap_fee
    }

    fn public_swap(&self) -> bool {
        self.public_swap
    }

    fn bind(&mut self, token: TokenId, record: Record) -> Result<(), Error> {
        if self.entries.contains_key(&token) {
            return Err(Error::DuplicateToken(token));
        }
        self.check_record(token, record)?;
        self.tokens.push(token);
        self.entries.insert(
            token,
            Entry {
                record,
                holdings: record.balance,
            },
        );
        Ok(())
    }

    fn rebind(&mut self, token: TokenId, record: Record) -> Result<Transfer, Error> {
        self.check_record(token, record)?;
        let entry = self.entry(token)?;
        let (holdings, transfer) = if record.balance > entry.record.balance {
            let amount = record.balance.sub(entry.record.balance)?;
            (entry.holdings.add(amount)?, Transfer::Deposit(amount))
        } else if record.balance < entry.record.balance {
            let amount = entry.record.balance.sub(record.balance)?;
            (entry.holdings.sub(amount)?, Transfer::Withdrawal(amount))
        } else {
            (entry.holdings, Transfer::None)
        };

        let entry = self.entry_mut(token)?;
        entry.record = record;
        entry.holdings = holdings;
        Ok(transfer)
    }

    fn gulp(&mut self, token: TokenId) -> Result<(), Error> {
        let entry = self.entry_mut(token)?;
        entry.record.balance = entry.holdings;
        Ok(())
    }

    fn set_swap_fee(&mut self, swap_fee: Bfp) -> Result<(), Error> {
        math::ensure_swap_fee(swap_fee)?;
        self.swap_fee = swap_fee;
        Ok(())
    }

    fn set_public_swap(&mut self, public: bool) {
        self.public_swap = public;
    }
}
