use {
    crate::{
        cli,
        config::{self, Config, Direction},
    },
    anyhow::{Context, Result},
    clap::Parser,
    number::Bfp,
    itertools::Itertools,
    smart_pool::{Asset, Ledger, MemoryLedger, SmartPool},
    tracing::level_filters::LevelFilter,
};

/// State of the pool at the end of a presale.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Report {
    pub weights: Vec<Bfp>,
    pub balances: Vec<Bfp>,
    pub total_supply: Bfp,
    /// The last block the presale touched.
    pub block: u64,
}

pub async fn start(args: impl IntoIterator<Item = String>) -> Result<()> {
    let args = cli::Args::parse_from(args);
    observe::tracing::initialize(&args.log, LevelFilter::ERROR);
    tracing::info!("running presale with {args:#?}");

    let config = config::load_path(&args.config).await?;
    let report = run(config)?;
    tracing::info!(?report, "presale finished");
    Ok(())
}

/// Creates the pool, walks the curve for the configured manual steps, moves
/// the weights gradually to the configured end weights and finally
/// resynchronizes any rebases.
pub fn run(config: Config) -> Result<Report> {
    let mut pool = SmartPool::new(
        config.kind,
        config.rights,
        config.params.clone(),
        MemoryLedger::new(),
        config.controller.clone(),
    )
    .context("invalid pool parameters")?;
    if config.cap.is_some() {
        pool.set_cap(config.cap)?;
    }
    let created = match config.periods {
        Some((min_period, time_lock)) => {
            pool.create_pool_with_periods(config.initial_supply, min_period, time_lock)
        }
        None => pool.create_pool(config.initial_supply),
    };
    created.context("failed to create pool")?;
    log_block(&pool, 0)?;

    let mut block = 0;
    if let Some(curve) = &config.curve {
        let selling = pool
            .tokens()
            .iter()
            .position(|token| *token == curve.selling_token)
            .context("selling token is not a pool token")?;
        for step in 1..=config.manual_steps {
            let target = curve.curve.weights(step, &pool.weights()?, selling)?;
            pool.update_weights(&target)
                .with_context(|| format!("failed to apply curve step {step}"))?;
            block = step;
            log_block(&pool, block)?;
        }
    }

    if config.gradual_blocks > 0 {
        let end = block
            .checked_add(config.gradual_blocks)
            .context("gradual update ends after the last block")?;
        pool.update_weights_gradually(&config.gradual_end_weights, block, end, block)
            .context("failed to schedule gradual update")?;
        for now in block + 1..=end {
            pool.poke_weights(now)
                .with_context(|| format!("failed to poke weights at block {now}"))?;
            log_block(&pool, now)?;
        }
        block = end;
    }

    for rebase in &config.rebases {
        let ledger = pool.ledger_mut();
        match rebase.direction {
            Direction::Expand => ledger.transfer_in(rebase.token, rebase.amount)?,
            Direction::Contract => ledger.transfer_out(rebase.token, rebase.amount)?,
        }
        let resync = pool
            .resync_weight(rebase.token)
            .with_context(|| format!("failed to resync {}", rebase.token))?;
        tracing::info!(
            token = %rebase.token,
            direction = ?rebase.direction,
            amount = %rebase.amount,
            weight = %resync.after.weight,
            "resynced rebase"
        );
    }

    let ledger = pool.ledger();
    Ok(Report {
        weights: pool.weights()?,
        balances: pool
            .tokens()
            .iter()
            .map(|token| ledger.balance(*token))
            .collect::<Result<_, _>>()?,
        total_supply: pool.total_supply(),
        block,
    })
}

fn log_block(pool: &SmartPool, block: u64) -> Result<()> {
    let ledger = pool.ledger();
    let weights = pool.weights()?;
    let balances = pool
        .tokens()
        .iter()
        .map(|token| ledger.balance(*token))
        .collect::<Result<Vec<_>, _>>()?;
    let holdings = pool
        .tokens()
        .iter()
        .map(|token| ledger.holdings(*token))
        .collect::<Result<Vec<_>, _>>()?;
    let controller = pool
        .tokens()
        .iter()
        .map(|token| pool.controller().balance(Asset::Token(*token)))
        .collect_vec();
    let shares = pool.controller().balance(Asset::PoolShares);
    // Price of the first token denominated in the second one.
    let price = match pool.tokens() {
        [first, second, ..] => ledger.spot_price(*second, *first)?,
        _ => Bfp::zero(),
    };
    tracing::info!(
        block,
        ?weights,
        ?balances,
        ?holdings,
        ?controller,
        %shares,
        %price,
        "pool state"
    );
    Ok(())
}
