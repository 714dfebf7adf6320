//! Assets owned by the pool controller.

use {
    crate::{
        TokenId,
        error::{Asset, Error},
    },
    number::Bfp,
    std::collections::BTreeMap,
};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Wallet {
    tokens: BTreeMap<TokenId, Bfp>,
    shares: Bfp,
}

impl Wallet {
    pub fn new(tokens: impl IntoIterator<Item = (TokenId, Bfp)>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
            shares: Bfp::zero(),
        }
    }

    pub fn balance(&self, asset: Asset) -> Bfp {
        match asset {
            Asset::Token(token) => self.tokens.get(&token).copied().unwrap_or_default(),
            Asset::PoolShares => self.shares,
        }
    }

    pub fn credit(&mut self, asset: Asset, amount: Bfp) -> Result<(), Error> {
        let balance = self.slot(asset);
        *balance = balance.add(amount)?;
        Ok(())
    }

    pub fn debit(&mut self, asset: Asset, amount: Bfp) -> Result<(), Error> {
        let balance = self.slot(asset);
        if *balance < amount {
            return Err(Error::InsufficientFunds {
                asset,
                required: amount,
            });
        }
        *balance = balance.sub(amount)?;
        Ok(())
    }

    fn slot(&mut self, asset: Asset) -> &mut Bfp {
        match asset {
            Asset::Token(token) => self.tokens.entry(token).or_default(),
            Asset::PoolShares => &mut self.shares,
        }
    }
}
