//! Capabilities of a pool. Every mutating operation is checked once against
//! the pool's [`Capabilities`] before any state is read or written.

use crate::error::Error;

/// Flags selected by the pool creator that enable optional operations.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Rights {
    pub can_pause_swapping: bool,
    pub can_change_swap_fee: bool,
    pub can_change_weights: bool,
    pub can_change_cap: bool,
}

/// The flavour of smart pool.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
pub enum PoolKind {
    /// Configurable rights pool whose weights are changed by the controller,
    /// either one token at a time or through a gradual update.
    Standard,
    /// Pool holding rebasing tokens. Its only rebalancing primitive is
    /// resynchronizing a weight to an out-of-band balance change.
    ElasticSupply,
}

/// Operations gated by capabilities.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumIter)]
pub enum Operation {
    UpdateWeight,
    UpdateWeightsGradually,
    PokeWeights,
    ResyncWeight,
    CreatePoolWithPeriods,
    SetSwapFee,
    SetPublicSwap,
    SetCap,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Capabilities {
    pub kind: PoolKind,
    pub rights: Rights,
}

impl Capabilities {
    pub fn new(kind: PoolKind, rights: Rights) -> Self {
        Self { kind, rights }
    }

    pub fn permits(&self, operation: Operation) -> bool {
        use self::{Operation::*, PoolKind::*};
        match (self.kind, operation) {
            (Standard, UpdateWeight | UpdateWeightsGradually | PokeWeights) => {
                self.rights.can_change_weights
            }
            (Standard, CreatePoolWithPeriods) => true,
            (Standard, ResyncWeight) => false,
            (ElasticSupply, ResyncWeight) => true,
            (
                ElasticSupply,
                UpdateWeight | UpdateWeightsGradually | PokeWeights | CreatePoolWithPeriods,
            ) => false,
            (_, SetSwapFee) => self.rights.can_change_swap_fee,
            (_, SetPublicSwap) => self.rights.can_pause_swapping,
            (_, SetCap) => self.rights.can_change_cap,
        }
    }

    pub fn ensure(&self, operation: Operation) -> Result<(), Error> {
        if self.permits(operation) {
            Ok(())
        } else {
            Err(Error::CapabilityDenied(operation))
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, strum::IntoEnumIterator};

    fn all_rights() -> Rights {
        Rights {
            can_pause_swapping: true,
            can_change_swap_fee: true,
            can_change_weights: true,
            can_change_cap: true,
        }
    }

    #[test]
    fn elastic_supply_pools_only_resync() {
        let capabilities = Capabilities::new(PoolKind::ElasticSupply, all_rights());
        for operation in [
            Operation::UpdateWeight,
            Operation::UpdateWeightsGradually,
            Operation::PokeWeights,
            Operation::CreatePoolWithPeriods,
        ] {
            assert_eq!(
                capabilities.ensure(operation),
                Err(Error::CapabilityDenied(operation))
            );
        }
        assert!(capabilities.permits(Operation::ResyncWeight));
        assert!(capabilities.permits(Operation::SetSwapFee));
    }

    #[test]
    fn standard_pools_never_resync() {
        let capabilities = Capabilities::new(PoolKind::Standard, all_rights());
        for operation in Operation::iter() {
            assert_eq!(
                capabilities.permits(operation),
                operation != Operation::ResyncWeight
            );
        }
    }

    #[test]
    fn rights_gate_optional_operations() {
        let capabilities = Capabilities::new(PoolKind::Standard, Rights::default());
        for operation in Operation::iter() {
            assert_eq!(
                capabilities.permits(operation),
                operation == Operation::CreatePoolWithPeriods
            );
        }
    }

    #[test]
    fn denial_names_the_operation() {
        let capabilities = Capabilities::new(PoolKind::ElasticSupply, Rights::default());
        assert_eq!(
            capabilities
                .ensure(Operation::PokeWeights)
                .unwrap_err()
                .to_string(),
            "operation PokeWeights is not supported by this pool"
        );
    }
}
