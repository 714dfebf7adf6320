//! Presale configuration loaded from a TOML file.

use {
    alloy_primitives::Address,
    anyhow::{Context, Result, bail},
    number::Bfp,
    serde::Deserialize,
    serde_with::{DisplayFromStr, serde_as},
    smart_pool::{
        ExponentialCurve,
        PoolKind,
        PoolParams,
        Rights,
        TokenId,
        Wallet,
        constants::{
            DEFAULT_ADD_TOKEN_TIME_LOCK_IN_BLOCKS,
            DEFAULT_MIN_WEIGHT_CHANGE_BLOCK_PERIOD,
        },
    },
    std::path::Path,
    tokio::fs,
};

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct File {
    /// Which kind of smart pool to simulate.
    #[serde(default)]
    kind: Kind,

    #[serde_as(as = "DisplayFromStr")]
    swap_fee: Bfp,

    /// Pool shares minted to the controller when the pool is created.
    #[serde_as(as = "DisplayFromStr")]
    initial_supply: Bfp,

    /// Creates the pool with custom block periods when either of these is
    /// set. Elastic supply pools do not support this.
    min_weight_change_block_period: Option<u64>,
    add_token_time_lock_in_blocks: Option<u64>,

    /// Optional cap on the pool share supply.
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    cap: Option<Bfp>,

    #[serde(default)]
    rights: RightsFile,

    tokens: Vec<TokenFile>,

    /// Weight curve driving the manual presale steps.
    curve: Option<CurveFile>,

    /// Number of curve steps applied one block at a time.
    #[serde(default)]
    manual_steps: u64,

    /// Length of the gradual update following the manual steps. Zero skips
    /// the gradual update.
    #[serde(default)]
    gradual_blocks: u64,

    /// Weights the gradual update ends at, in token order. Defaults to the
    /// initial weights in reverse token order.
    #[serde_as(as = "Option<Vec<DisplayFromStr>>")]
    #[serde(default)]
    gradual_end_weights: Option<Vec<Bfp>>,

    /// Out-of-band balance changes resynchronized into the weights, in order.
    #[serde(default)]
    rebases: Vec<RebaseFile>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum Kind {
    #[default]
    Standard,
    ElasticSupply,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
struct RightsFile {
    can_pause_swapping: bool,
    can_change_swap_fee: bool,
    can_change_weights: bool,
    can_change_cap: bool,
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct TokenFile {
    address: Address,

    /// Balance bound when the pool is created.
    #[serde_as(as = "DisplayFromStr")]
    balance: Bfp,

    /// Denormalized weight bound when the pool is created.
    #[serde_as(as = "DisplayFromStr")]
    weight: Bfp,

    /// Tokens owned by the controller before the pool is created. Must cover
    /// the initial balance plus whatever weight increases pull in.
    #[serde_as(as = "DisplayFromStr")]
    controller_balance: Bfp,
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct CurveFile {
    /// Token sold during the presale. Its share follows the curve.
    selling_token: Address,

    #[serde_as(as = "DisplayFromStr")]
    initial_pct: Bfp,

    #[serde_as(as = "DisplayFromStr")]
    steepness: Bfp,

    #[serde_as(as = "DisplayFromStr")]
    base: Bfp,

    /// Blocks after which the share has been divided by `base` once, for a
    /// steepness of one.
    period: u64,

    /// Decimals the share is floored to.
    #[serde(default = "default_precision")]
    precision: u32,
}

fn default_precision() -> u32 {
    4
}

#[serde_as]
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RebaseFile {
    token: Address,

    #[serde_as(as = "DisplayFromStr")]
    amount: Bfp,

    direction: Direction,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Tokens arrive at the pool without it being involved.
    Expand,
    /// Tokens leave the pool without it being involved.
    Contract,
}

/// A validated presale configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub kind: PoolKind,
    pub rights: Rights,
    pub params: PoolParams,
    pub controller: Wallet,
    pub initial_supply: Bfp,
    /// Minimum weight change block period and add token time lock, if the
    /// pool is created with custom periods.
    pub periods: Option<(u64, u64)>,
    pub cap: Option<Bfp>,
    pub curve: Option<Curve>,
    pub manual_steps: u64,
    pub gradual_blocks: u64,
    pub gradual_end_weights: Vec<Bfp>,
    pub rebases: Vec<Rebase>,
}

#[derive(Clone, Copy, Debug)]
pub struct Curve {
    pub curve: ExponentialCurve,
    pub selling_token: TokenId,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rebase {
    pub token: TokenId,
    pub amount: Bfp,
    pub direction: Direction,
}

/// Parses and validates a configuration from a TOML string.
pub fn load_string(data: &str) -> Result<Config> {
    let file = toml::de::from_str::<File>(data).context("TOML syntax error")?;
    file.try_into()
}

/// Loads the configuration from a TOML file.
pub async fn load_path(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .await
        .with_context(|| format!("I/O error while reading {path:?}"))?;
    load_string(&data).with_context(|| format!("invalid configuration in {path:?}"))
}

impl TryFrom<File> for Config {
    type Error = anyhow::Error;

    fn try_from(file: File) -> Result<Self> {
        if file.manual_steps > 0 && file.curve.is_none() {
            bail!("`manual-steps` requires a `curve` section");
        }

        let curve = file
            .curve
            .map(|curve| -> Result<_> {
                if !file.tokens.iter().any(|token| token.address == curve.selling_token) {
                    bail!("selling token {} is not a pool token", curve.selling_token);
                }
                Ok(Curve {
                    curve: ExponentialCurve::new(
                        curve.initial_pct,
                        curve.steepness,
                        curve.base,
                        curve.period,
                        curve.precision,
                    )?,
                    selling_token: curve.selling_token,
                })
            })
            .transpose()?;

        let gradual_end_weights = match file.gradual_end_weights {
            Some(weights) if weights.len() != file.tokens.len() => bail!(
                "`gradual-end-weights` has {} weights for {} tokens",
                weights.len(),
                file.tokens.len()
            ),
            Some(weights) => weights,
            None => file.tokens.iter().rev().map(|token| token.weight).collect(),
        };

        let periods = match (
            file.min_weight_change_block_period,
            file.add_token_time_lock_in_blocks,
        ) {
            (None, None) => None,
            (min_period, time_lock) => Some((
                min_period.unwrap_or(DEFAULT_MIN_WEIGHT_CHANGE_BLOCK_PERIOD),
                time_lock.unwrap_or(DEFAULT_ADD_TOKEN_TIME_LOCK_IN_BLOCKS),
            )),
        };

        Ok(Self {
            kind: match file.kind {
                Kind::Standard => PoolKind::Standard,
                Kind::ElasticSupply => PoolKind::ElasticSupply,
            },
            rights: Rights {
                can_pause_swapping: file.rights.can_pause_swapping,
                can_change_swap_fee: file.rights.can_change_swap_fee,
                can_change_weights: file.rights.can_change_weights,
                can_change_cap: file.rights.can_change_cap,
            },
            params: PoolParams {
                tokens: file.tokens.iter().map(|token| token.address).collect(),
                balances: file.tokens.iter().map(|token| token.balance).collect(),
                weights: file.tokens.iter().map(|token| token.weight).collect(),
                swap_fee: file.swap_fee,
            },
            controller: Wallet::new(
                file.tokens
                    .iter()
                    .map(|token| (token.address, token.controller_balance)),
            ),
            initial_supply: file.initial_supply,
            periods,
            cap: file.cap,
            curve,
            manual_steps: file.manual_steps,
            gradual_blocks: file.gradual_blocks,
            gradual_end_weights,
            rebases: file
                .rebases
                .into_iter()
                .map(|rebase| Rebase {
                    token: rebase.token,
                    amount: rebase.amount,
                    direction: rebase.direction,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, number::bfp, smart_pool::Asset};

    const EXAMPLE: &str = include_str!("../config/example.toml");

    #[test]
    fn loads_example_config() {
        let config = load_string(EXAMPLE).unwrap();
        assert_eq!(config.kind, PoolKind::Standard);
        assert!(config.rights.can_change_weights);
        assert_eq!(config.params.weights, vec![bfp!("36"), bfp!("4")]);
        assert_eq!(config.params.swap_fee, bfp!("0.003"));
        assert_eq!(config.periods, Some((10, 10)));
        assert_eq!(config.manual_steps, 5);
        assert_eq!(config.gradual_blocks, 15);
        assert_eq!(config.gradual_end_weights, vec![bfp!("4"), bfp!("36")]);
        let curve = config.curve.unwrap();
        assert_eq!(curve.selling_token, config.params.tokens[0]);
        assert_eq!(curve.curve.precision(), 4);
        assert_eq!(
            config
                .controller
                .balance(Asset::Token(config.params.tokens[1])),
            bfp!("12000000")
        );
    }

    #[test]
    fn gradual_end_weights_can_be_set() {
        let data = EXAMPLE.replace(
            "gradual-blocks = 15",
            "gradual-blocks = 15\ngradual-end-weights = [\"20\", \"20\"]",
        );
        let config = load_string(&data).unwrap();
        assert_eq!(config.gradual_end_weights, vec![bfp!("20"), bfp!("20")]);

        let data = EXAMPLE.replace(
            "gradual-blocks = 15",
            "gradual-blocks = 15\ngradual-end-weights = [\"20\"]",
        );
        let err = load_string(&data).unwrap_err();
        assert!(err.to_string().contains("gradual-end-weights"));
    }

    #[test]
    fn loads_elastic_supply_config() {
        let config = load_string(
            r#"
            kind = "elastic-supply"
            swap-fee = "0.003"
            initial-supply = "100"

            [[tokens]]
            address = "0xa1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1"
            balance = "10000"
            weight = "1"
            controller-balance = "10000"

            [[tokens]]
            address = "0xc2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2"
            balance = "10000"
            weight = "1"
            controller-balance = "10000"

            [[rebases]]
            token = "0xc2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2"
            amount = "1000"
            direction = "expand"
            "#,
        )
        .unwrap();
        assert_eq!(config.kind, PoolKind::ElasticSupply);
        assert_eq!(config.rights, Rights::default());
        assert_eq!(config.periods, None);
        assert!(config.curve.is_none());
        assert_eq!(
            config.rebases,
            vec![Rebase {
                token: Address::repeat_byte(0xc2),
                amount: bfp!("1000"),
                direction: Direction::Expand,
            }]
        );
    }

    #[test]
    fn rejects_unknown_fields() {
        let data = format!("{EXAMPLE}\nunknown-field = 1\n");
        assert!(load_string(&data).is_err());
    }

    #[test]
    fn manual_steps_need_a_curve() {
        let err = load_string(
            r#"
            swap-fee = "0.003"
            initial-supply = "100"
            manual-steps = 1
            tokens = []
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("curve"));
    }

    #[test]
    fn rejects_unknown_selling_token() {
        let data = EXAMPLE.replace(
            "selling-token = \"0x1111111111111111111111111111111111111111\"",
            "selling-token = \"0x3333333333333333333333333333333333333333\"",
        );
        let err = load_string(&data).unwrap_err();
        assert!(err.to_string().contains("not a pool token"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        assert!(load_path(Path::new("does/not/exist.toml")).await.is_err());
    }
}
