use mmplot::prelude::*;

mod common;

use common::{InventorySkewPolicy, SymmetricPolicy, ToyGenerator, ToyMarket};

#[test]
fn same_seed_yields_identical_trajectory_arrays() {
    let market = ToyMarket::default().with_rollouts(3);
    let mut policy = SymmetricPolicy { half_spread: 0.9 };

    let a = trajectory_view(&market, &mut policy, &mut ToyGenerator::new(market, 1), Some(42))
        .expect("first view");
    let b = trajectory_view(&market, &mut policy, &mut ToyGenerator::new(market, 2), Some(42))
        .expect("second view");

    assert_eq!(a.cum_rewards, b.cum_rewards);
    assert_eq!(a.inventory, b.inventory);

    let c = trajectory_view(&market, &mut policy, &mut ToyGenerator::new(market, 1), Some(43))
        .expect("third view");
    assert_ne!(a.cum_rewards, c.cum_rewards);
}

#[test]
fn trajectory_view_is_consistent_with_time_axis() {
    let market = ToyMarket::default().with_rollouts(2).with_steps(30);
    let mut policy = InventorySkewPolicy {
        half_spread: 0.8,
        skew: 0.1,
    };
    let view = trajectory_view(&market, &mut policy, &mut ToyGenerator::new(market, 4), Some(9))
        .expect("view");

    assert_eq!(view.timestamps.len(), 31);
    assert_eq!(view.cum_rewards.dim(), (2, 30));
    assert_eq!(view.asset_prices.dim(), (2, 31));
    assert_eq!(view.cash_holdings.dim(), (2, 31));
    assert_eq!(view.ask_half_spreads.dim(), (2, 30));

    // Every rollout starts flat at the initial price and cash.
    for r in 0..2 {
        assert_eq!(view.inventory[[r, 0]], 0.0);
        assert_eq!(view.asset_prices[[r, 0]], 100.0);
        assert_eq!(view.cash_holdings[[r, 0]], 100.0);
    }

    // Cumulative reward telescopes to the change in marked-to-market wealth.
    for r in 0..2 {
        let wealth = |t: usize| view.cash_holdings[[r, t]] + view.inventory[[r, t]] * view.asset_prices[[r, t]];
        let total = view.cum_rewards[[r, 29]];
        assert!((total - (wealth(30) - wealth(0))).abs() < 1e-9);
    }
}

#[test]
fn plot_trajectory_and_policy_actions_on_memory_canvas() {
    let market = ToyMarket::default().with_rollouts(2).with_steps(12);
    let mut canvas = MemoryCanvas::new();
    let mut policy = InventorySkewPolicy {
        half_spread: 1.0,
        skew: 0.2,
    };

    plot_trajectory(
        &mut canvas,
        &market,
        &mut policy,
        &mut ToyGenerator::new(market, 0),
        Some(5),
    )
    .expect("trajectory plot");
    let surface = plot_policy_actions(&mut canvas, &mut policy, &market).expect("action plot");

    assert_eq!(canvas.figures().len(), 3);
    assert_eq!(surface.curves().len(), 7);
    for curve in surface.curves().values() {
        assert_eq!(curve.dim(), (13, 2));
    }

    // Long inventory widens the bid and tightens the ask.
    let bid_long = surface.bid(3).expect("bid curve");
    let bid_short = surface.bid(-3).expect("bid curve");
    assert!(bid_long[0] > bid_short[0]);
}

#[test]
fn pnl_histogram_series_count_follows_baseline() {
    let market = ToyMarket::default().with_steps(10);
    let cfg = MonteCarloConfig::default()
        .with_episodes(50)
        .with_progress(false);

    let policy_run = run_monte_carlo(
        &market,
        &mut InventorySkewPolicy {
            half_spread: 0.8,
            skew: 0.1,
        },
        &mut ToyGenerator::new(market, 1),
        &cfg,
    )
    .expect("policy run");
    let baseline_run = run_monte_carlo(
        &market,
        &mut SymmetricPolicy { half_spread: 0.8 },
        &mut ToyGenerator::new(market, 2),
        &cfg,
    )
    .expect("baseline run");

    assert_eq!(plot_pnl(&policy_run.rewards, None).histogram_count(), 1);
    assert_eq!(
        plot_pnl(&policy_run.rewards, Some(baseline_run.rewards.as_slice())).histogram_count(),
        2
    );
}

#[test]
fn mismatched_environment_is_rejected() {
    let market = ToyMarket::default().with_rollouts(2);
    let wrong = ToyMarket::default().with_rollouts(3);
    let mut policy = SymmetricPolicy { half_spread: 1.0 };

    // Generator simulates two rollouts but the environment claims three.
    struct Fixed(ToyGenerator);
    impl TrajectoryGenerator for Fixed {
        fn generate(
            &mut self,
            _env: &dyn Environment,
            agent: &mut dyn Policy,
            seed: Option<u64>,
        ) -> PlotResult<Trajectory> {
            let two = ToyMarket::default().with_rollouts(2);
            self.0.generate(&two, agent, seed)
        }
    }

    let err = trajectory_view(&wrong, &mut policy, &mut Fixed(ToyGenerator::new(market, 0)), None)
        .expect_err("shape mismatch");
    assert!(matches!(err, PlotError::Data(DataError::Shape { .. })));
}

#[test]
fn asset_price_increments_follow_market_volatility() {
    let market = ToyMarket::default().with_rollouts(200).with_steps(50);
    // Quotes this wide never fill, so only the price diffusion moves the book.
    let mut policy = SymmetricPolicy { half_spread: 50.0 };
    let view = trajectory_view(&market, &mut policy, &mut ToyGenerator::new(market, 0), Some(17))
        .expect("view");

    let increments = view
        .asset_prices
        .rows()
        .into_iter()
        .flat_map(|row| row.windows(2).into_iter().map(|w| w[1] - w[0]).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    assert_eq!(increments.len(), 200 * 50);
    assert!(view.inventory.iter().all(|&q| q == 0.0));

    let expected = market.volatility * (market.terminal_time / 50.0).sqrt();
    assert!(common::mean(&increments).abs() < 0.1 * expected);
    assert!((common::population_std(&increments) - expected).abs() < 0.05 * expected);
}
